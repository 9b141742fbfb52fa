use super::ui;
use crate::core::currency::{CATALOG, RUB};
use crate::core::{Converter, format};
use comfy_table::Cell;

/// Renders every catalog currency against USD and RUB.
pub fn render_rates(converter: &Converter) -> String {
    let book = converter.rates();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell(""),
        ui::header_cell("Code"),
        ui::header_cell("Currency"),
        ui::header_cell("USD quote"),
        ui::header_cell("RUB per unit"),
    ]);

    for currency in CATALOG {
        let rub_per_unit = converter.rate_between(currency.code, RUB);
        table.add_row(vec![
            Cell::new(currency.flag()),
            Cell::new(currency.code),
            Cell::new(currency.name),
            ui::number_cell(converter.usd_quote(&currency)),
            ui::number_cell(format::fixed(rub_per_unit, format::RATE_DIGITS)),
        ]);
    }

    let last_updated = book
        .last_updated
        .as_ref()
        .map_or_else(|| "never (backup rates)".to_string(), format::last_updated);

    format!(
        "{}\n\n{}\n\n{}",
        ui::style_text("Exchange rates", ui::StyleType::Title),
        table,
        ui::last_updated_line(&last_updated, book.live)
    )
}
