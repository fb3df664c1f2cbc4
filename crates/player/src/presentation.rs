//! Plain-text views of idol sets for the terminal

use std::fmt::Write;

use idolplanner_domain::{GridPosition, GridTab, IdolSet, GRID_HEIGHT, GRID_WIDTH};

/// One character per cell: `#` blocked, `.` free, letters for placements in
/// placement order.
pub fn render_grid(set: &IdolSet, tab: GridTab) -> String {
    let blocked = set.blocked_cells();
    let mut cells = [['.'; GRID_WIDTH]; GRID_HEIGHT];
    for (y, row) in cells.iter_mut().enumerate() {
        for (x, cell) in row.iter_mut().enumerate() {
            if blocked.contains(x as i32, y as i32) {
                *cell = '#';
            }
        }
    }

    for (index, placement) in set.placements_on(tab).enumerate() {
        let Some(entry) = set.find_inventory_idol(&placement.inventory_idol_id) else {
            continue;
        };
        let label = placement_label(index);
        let base = entry.idol.base_type;
        for dy in 0..base.height() {
            for dx in 0..base.width() {
                let GridPosition { x, y } = placement.position;
                if let Some(cell) = usize::try_from(y + dy)
                    .ok()
                    .and_then(|y| cells.get_mut(y))
                    .and_then(|row| usize::try_from(x + dx).ok().and_then(|x| row.get_mut(x)))
                {
                    *cell = label;
                }
            }
        }
    }

    cells
        .iter()
        .map(|row| row.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("\n")
}

fn placement_label(index: usize) -> char {
    const LABELS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";
    LABELS.get(index).map(|&b| b as char).unwrap_or('*')
}

/// Set header, every tab's grid with a legend, and the unplaced inventory.
pub fn render_set(set: &IdolSet) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", set.name(), set.id());
    let _ = writeln!(
        out,
        "{} idol(s) in inventory, {} placed",
        set.inventory().len(),
        set.placements().len()
    );

    for tab in GridTab::ALL {
        let _ = writeln!(out, "\n[{}]", tab);
        let _ = writeln!(out, "{}", render_grid(set, tab));
        for (index, placement) in set.placements_on(tab).enumerate() {
            let name = set
                .find_inventory_idol(&placement.inventory_idol_id)
                .map(|entry| entry.idol.base_type.display_name())
                .unwrap_or("?");
            let _ = writeln!(
                out,
                "  {} {} at {} placement={}",
                placement_label(index),
                name,
                placement.position,
                placement.id
            );
        }
    }

    let unplaced: Vec<_> = set.unplaced_inventory().collect();
    if !unplaced.is_empty() {
        let _ = writeln!(out, "\nUnplaced:");
        for entry in unplaced {
            let _ = writeln!(
                out,
                "  {} {} ilvl {} id={}",
                entry.idol.rarity,
                entry.idol.base_type.display_name(),
                entry.idol.item_level,
                entry.id
            );
        }
    }
    out
}
