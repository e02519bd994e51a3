use crate::core::config::NumberFormat;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    TotalLabel,
    TotalValue,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::TotalLabel => style(text).bold(),
        StyleType::TotalValue => style(text).green().bold(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned cell for numbers.
pub fn value_cell(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

/// Creates a cell for displaying percentage change with color coding.
pub fn change_cell(change: f64, format: &NumberFormat) -> Cell {
    let text = format!("{}%", format_number(change, 2, format));
    if change >= 0.0 {
        Cell::new(text)
            .fg(Color::Green)
            .set_alignment(CellAlignment::Right)
    } else {
        Cell::new(text)
            .fg(Color::Red)
            .set_alignment(CellAlignment::Right)
    }
}

/// Creates a cell for "N/A" values with an explanation.
pub fn na_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Formats `value` with `decimals` digits using the configured separators.
pub fn format_number(value: f64, decimals: usize, format: &NumberFormat) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));

    let mut grouped = String::with_capacity(fixed.len() + int_part.len() / 3);
    for (i, digit) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            if let Some(sep) = format.thousands_separator {
                grouped.push(sep);
            }
        }
        grouped.push(digit);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if value.is_sign_negative() && !is_zero {
        "-"
    } else {
        ""
    };

    if frac_part.is_empty() {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}{}{frac_part}", format.decimal_separator)
    }
}

/// Formats a monetary amount, e.g. `1.234,56 EUR`.
pub fn format_money(value: f64, currency: &str, format: &NumberFormat) -> String {
    format!("{} {currency}", format_number(value, 2, format))
}
