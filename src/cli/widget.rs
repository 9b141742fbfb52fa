use super::ui;
use crate::core::{WidgetSnapshot, format};
use anyhow::{Context, Result};
use comfy_table::Cell;

pub fn render_widget(snapshot: &WidgetSnapshot, live: bool) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Currency"),
        ui::header_cell("RUB"),
    ]);

    for rate in &snapshot.rates {
        table.add_row(vec![
            Cell::new(&rate.flag),
            Cell::new(format!("{} {}", rate.code, rate.name)),
            ui::number_cell(format::fixed(rate.rate, format::AMOUNT_DIGITS)),
        ]);
    }

    format!(
        "{}\n{}",
        table,
        ui::last_updated_line(&snapshot.last_updated, live)
    )
}

/// Machine-readable form of the snapshot for widget hosts.
pub fn render_widget_json(snapshot: &WidgetSnapshot) -> Result<String> {
    serde_json::to_string_pretty(snapshot).context("Failed to serialize widget snapshot")
}
