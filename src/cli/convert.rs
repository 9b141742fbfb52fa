use super::ui;
use crate::core::{Converter, Key};
use anyhow::{Context, Result};

/// Renders the converter screen: rate line, calculator, result.
pub fn render_conversion(converter: &Converter) -> String {
    let conversion = converter.conversion();
    let calculator = converter.calculator();

    let mut output = format!(
        "{}\n\n",
        ui::style_text(&conversion.rate_line(), ui::StyleType::Subtle)
    );
    if !calculator.history.is_empty() {
        output.push_str(&format!(
            "{}\n",
            ui::style_text(&calculator.history, ui::StyleType::Subtle)
        ));
    }
    output.push_str(&format!(
        "{} {} {}\n{} {} {}",
        conversion.from.flag(),
        ui::style_text(&conversion.display_value, ui::StyleType::Label),
        conversion.from.code,
        conversion.to.flag(),
        ui::style_text(&conversion.converted_value, ui::StyleType::Value),
        conversion.to.code
    ));
    output
}

/// Feeds keypad presses into the converter, one key per entry.
pub fn replay_keys(converter: &mut Converter, keys: &[String]) -> Result<()> {
    for key in keys {
        let key: Key = key
            .parse()
            .with_context(|| format!("Cannot replay key sequence at {key:?}"))?;
        converter.press(key);
    }
    Ok(())
}

/// Splits `12+3=` style input into single keys, keeping `DEL`/`AC` words.
pub fn split_keys(input: &[String]) -> Vec<String> {
    input
        .iter()
        .flat_map(|chunk| {
            let chunk = chunk.trim();
            if chunk.eq_ignore_ascii_case("del") || chunk.eq_ignore_ascii_case("ac") {
                vec![chunk.to_string()]
            } else {
                chunk
                    .chars()
                    .filter(|c| !c.is_whitespace())
                    .map(|c| c.to_string())
                    .collect()
            }
        })
        .collect()
}
