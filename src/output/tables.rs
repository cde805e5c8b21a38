use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color as TableColor, ContentArrangement, Table};

/// Table and cell creation helpers
pub fn create_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn cyan_header(labels: &[&str]) -> Vec<Cell> {
    labels
        .iter()
        .map(|label| Cell::new(*label).fg(TableColor::Cyan))
        .collect()
}

/// Level cells shaded from green (fast) to red (slow).
pub fn level_cells(levels: Option<[f64; 4]>, format: impl Fn(f64) -> String) -> Vec<Cell> {
    const COLORS: [TableColor; 4] = [
        TableColor::Green,
        TableColor::Cyan,
        TableColor::Yellow,
        TableColor::Red,
    ];

    match levels {
        Some(levels) => levels
            .iter()
            .zip(COLORS)
            .map(|(value, color)| Cell::new(format(*value)).fg(color))
            .collect(),
        None => (0..4).map(|_| Cell::new("-")).collect(),
    }
}
