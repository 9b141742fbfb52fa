//! Keypad calculator whose display value feeds the conversion.
//!
//! The calculator keeps the number being typed as text, one stored left
//! operand and at most one pending operator. Pressing a second operator
//! resolves the first, so `5 + 3 ×` shows `8` before the next operand.

use std::fmt::Display;
use std::str::FromStr;

use super::conversion::{NO_VALUE, parse_amount};
use super::format;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Operation {
    #[default]
    None,
    Add,
    Subtract,
    Multiply,
    Divide,
    Percent,
}

impl Operation {
    pub fn symbol(&self) -> &'static str {
        match self {
            Operation::None => "",
            Operation::Add => "+",
            Operation::Subtract => "-",
            Operation::Multiply => "×",
            Operation::Divide => "÷",
            Operation::Percent => "%",
        }
    }

    /// Applies the operator to `a` (stored) and `b` (displayed).
    ///
    /// Division by zero yields 0.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        match self {
            Operation::Add => a + b,
            Operation::Subtract => a - b,
            Operation::Multiply => a * b,
            Operation::Divide => {
                if b != 0.0 {
                    a / b
                } else {
                    0.0
                }
            }
            Operation::Percent => a * (b / 100.0),
            Operation::None => b,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// Computes `a <op> b` for the pending operation.
pub fn calculate_result(operation: Operation, a: f64, b: f64) -> f64 {
    operation.apply(a, b)
}

/// A single keypad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Digit(u8),
    Decimal,
    Operator(Operation),
    Percent,
    Equals,
    Delete,
    Clear,
}

impl FromStr for Key {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s.trim() {
            d if d.len() == 1 && d.as_bytes()[0].is_ascii_digit() => {
                Key::Digit(d.as_bytes()[0] - b'0')
            }
            "." | "," => Key::Decimal,
            "+" => Key::Operator(Operation::Add),
            "-" | "−" => Key::Operator(Operation::Subtract),
            "*" | "x" | "×" => Key::Operator(Operation::Multiply),
            "/" | "÷" => Key::Operator(Operation::Divide),
            "%" => Key::Percent,
            "=" => Key::Equals,
            "<" | "⌫" | "DEL" | "del" => Key::Delete,
            "C" | "c" | "AC" | "ac" => Key::Clear,
            other => return Err(anyhow::anyhow!("Invalid calculator key: {}", other)),
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalculatorState {
    pub display_value: String,
    pub pending_operation: Operation,
    pub stored_value: f64,
    pub awaiting_new_operand: bool,
    pub history: String,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            display_value: "0".to_string(),
            pending_operation: Operation::None,
            stored_value: 0.0,
            awaiting_new_operand: false,
            history: String::new(),
        }
    }
}

impl CalculatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&mut self, key: Key) {
        match key {
            Key::Digit(d) => self.append_digit(d),
            Key::Decimal => self.append_decimal(),
            Key::Operator(op) => self.perform_operation(op),
            Key::Percent => self.perform_operation(Operation::Percent),
            Key::Equals => self.perform_equals(),
            Key::Delete => self.delete_last(),
            Key::Clear => self.clear(),
        }
    }

    pub fn append_digit(&mut self, digit: u8) {
        let digit = char::from(b'0' + digit.min(9));
        if self.awaiting_new_operand {
            self.display_value = digit.to_string();
            self.awaiting_new_operand = false;
        } else if self.display_value == "0" {
            self.display_value = digit.to_string();
        } else {
            self.display_value.push(digit);
        }
    }

    pub fn append_decimal(&mut self) {
        if self.awaiting_new_operand {
            self.display_value = "0.".to_string();
            self.awaiting_new_operand = false;
        } else if !self.display_value.contains('.') {
            self.display_value.push('.');
        }
    }

    /// Handles an operator key. `Percent` rewrites the display in place and
    /// leaves any pending operation alone.
    pub fn perform_operation(&mut self, operation: Operation) {
        let Some(current) = self.current_value() else {
            return;
        };

        if operation == Operation::Percent {
            self.display_value = format::trimmed(current / 100.0, format::CALCULATOR_DIGITS);
            return;
        }

        if self.pending_operation != Operation::None {
            let result = calculate_result(self.pending_operation, self.stored_value, current);
            if !result.is_finite() {
                self.show_overflow(current);
                return;
            }
            self.display_value = format::trimmed(result, format::CALCULATOR_DIGITS);
            self.stored_value = result;
        } else {
            self.stored_value = current;
        }

        self.pending_operation = operation;
        self.awaiting_new_operand = true;
        self.history = format!(
            "{} {}",
            format::trimmed(self.stored_value, format::CALCULATOR_DIGITS),
            operation
        );
    }

    pub fn perform_equals(&mut self) {
        if self.pending_operation == Operation::None {
            return;
        }
        let Some(current) = self.current_value() else {
            return;
        };

        let result = calculate_result(self.pending_operation, self.stored_value, current);
        if !result.is_finite() {
            self.show_overflow(current);
            return;
        }
        self.history = format!(
            "{} {} {} = {}",
            format::trimmed(self.stored_value, format::CALCULATOR_DIGITS),
            self.pending_operation,
            format::trimmed(current, format::CALCULATOR_DIGITS),
            format::trimmed(result, format::CALCULATOR_DIGITS)
        );
        self.display_value = format::trimmed(result, format::CALCULATOR_DIGITS);
        self.pending_operation = Operation::None;
        self.awaiting_new_operand = true;
    }

    pub fn delete_last(&mut self) {
        if self.display_value == NO_VALUE {
            self.display_value = "0".to_string();
            return;
        }
        self.display_value.pop();
        if self.display_value.is_empty() || self.display_value == "-" {
            self.display_value = "0".to_string();
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Replaces the display with [`NO_VALUE`] and drops the chain; the
    /// next digit starts a fresh operand.
    fn show_overflow(&mut self, current: f64) {
        self.history = format!(
            "{} {} {} = {}",
            format::trimmed(self.stored_value, format::CALCULATOR_DIGITS),
            self.pending_operation,
            format::trimmed(current, format::CALCULATOR_DIGITS),
            NO_VALUE
        );
        self.display_value = NO_VALUE.to_string();
        self.pending_operation = Operation::None;
        self.stored_value = 0.0;
        self.awaiting_new_operand = true;
    }

    fn current_value(&self) -> Option<f64> {
        parse_amount(&self.display_value).ok()
    }
}
