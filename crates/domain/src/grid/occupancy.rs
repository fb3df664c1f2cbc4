//! Occupancy grid for one tab of an idol set.
//!
//! The grid is never stored. It is rebuilt from the authoritative placement
//! list every time a placement is checked, so there is no incremental state to
//! drift out of sync with the set.

use thiserror::Error;

use super::layout::{in_bounds, BlockedCells, GridPosition, GridTab, GRID_HEIGHT, GRID_WIDTH};
use crate::idol::IdolBaseType;
use crate::ids::PlacementId;
use crate::set::{IdolPlacement, InventoryIdol};

/// Why a footprint cannot go where it was asked to
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlacementRejection {
    #[error("{width}x{height} idol at ({x}, {y}) does not fit inside the grid")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },

    #[error("cell ({x}, {y}) is blocked")]
    BlockedCell { x: i32, y: i32 },

    #[error("cell ({x}, {y}) is already occupied")]
    Occupied { x: i32, y: i32 },
}

/// Cells covered by a base anchored at `position`: `[x, x+w) x [y, y+h)`,
/// clipped at `i32::MAX`.
pub fn footprint(
    base_type: IdolBaseType,
    position: GridPosition,
) -> impl Iterator<Item = (i32, i32)> {
    let (width, height) = (base_type.width(), base_type.height());
    let x_end = position.x.saturating_add(width);
    (position.y..position.y.saturating_add(height))
        .flat_map(move |y| (position.x..x_end).map(move |x| (x, y)))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    cells: [[bool; GRID_WIDTH]; GRID_HEIGHT],
}

impl OccupancyGrid {
    pub fn empty() -> Self {
        Self {
            cells: [[false; GRID_WIDTH]; GRID_HEIGHT],
        }
    }

    /// Mark every cell covered by a placement on `tab`.
    ///
    /// `exclude` leaves one placement out so it does not collide with itself
    /// while being moved. Placements whose inventory entry is missing are
    /// skipped.
    pub fn build(
        placements: &[IdolPlacement],
        inventory: &[InventoryIdol],
        tab: GridTab,
        exclude: Option<&PlacementId>,
    ) -> Self {
        let mut grid = Self::empty();
        for placement in placements {
            if placement.tab != tab || exclude == Some(&placement.id) {
                continue;
            }
            let Some(entry) = inventory
                .iter()
                .find(|entry| entry.id == placement.inventory_idol_id)
            else {
                continue;
            };
            grid.occupy(entry.idol.base_type, placement.position);
        }
        grid
    }

    /// Mark a footprint as occupied. Cells outside the grid are ignored.
    pub fn occupy(&mut self, base_type: IdolBaseType, position: GridPosition) {
        for (x, y) in footprint(base_type, position) {
            if in_bounds(x, y) {
                self.cells[y as usize][x as usize] = true;
            }
        }
    }

    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        in_bounds(x, y) && self.cells[y as usize][x as usize]
    }

    pub fn rows(&self) -> &[[bool; GRID_WIDTH]; GRID_HEIGHT] {
        &self.cells
    }

    pub fn occupied_count(&self) -> usize {
        self.cells.iter().flatten().filter(|cell| **cell).count()
    }

    /// Bounds and occupancy only.
    pub fn can_place(&self, base_type: IdolBaseType, position: GridPosition) -> bool {
        self.check_placement(base_type, position, &BlockedCells::none())
            .is_ok()
    }

    /// Bounds, blocked cells and occupancy, stopping at the first violation.
    pub fn check_placement(
        &self,
        base_type: IdolBaseType,
        position: GridPosition,
        blocked: &BlockedCells,
    ) -> Result<(), PlacementRejection> {
        let (width, height) = (base_type.width(), base_type.height());
        let fits = position.x >= 0
            && position.y >= 0
            && i64::from(position.x) + i64::from(width) <= GRID_WIDTH as i64
            && i64::from(position.y) + i64::from(height) <= GRID_HEIGHT as i64;
        if !fits {
            return Err(PlacementRejection::OutOfBounds {
                x: position.x,
                y: position.y,
                width,
                height,
            });
        }

        for (x, y) in footprint(base_type, position) {
            if blocked.contains(x, y) {
                return Err(PlacementRejection::BlockedCell { x, y });
            }
            if self.is_occupied(x, y) {
                return Err(PlacementRejection::Occupied { x, y });
            }
        }
        Ok(())
    }

    /// First legal anchor in row-major order, if any.
    pub fn find_free_position(
        &self,
        base_type: IdolBaseType,
        blocked: &BlockedCells,
    ) -> Option<GridPosition> {
        (0..GRID_HEIGHT as i32)
            .flat_map(|y| (0..GRID_WIDTH as i32).map(move |x| GridPosition::new(x, y)))
            .find(|&position| self.check_placement(base_type, position, blocked).is_ok())
    }
}

impl Default for OccupancyGrid {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::idol::{IdolInstance, Rarity};
    use crate::set::IdolSource;
    use chrono::Utc;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn entry(base_type: IdolBaseType) -> InventoryIdol {
        InventoryIdol::new(
            IdolInstance::new(base_type, 80, Rarity::Rare),
            IdolSource::Manual,
            Utc::now(),
        )
    }

    fn placed(entry: &InventoryIdol, x: i32, y: i32, tab: GridTab) -> IdolPlacement {
        IdolPlacement::new(entry.id.clone(), GridPosition::new(x, y), tab)
    }

    mod bounds {
        use super::*;

        #[test]
        fn conqueror_fits_at_bottom_right_corner() {
            let grid = OccupancyGrid::empty();
            assert!(grid.can_place(IdolBaseType::Conqueror, GridPosition::new(4, 5)));
            assert!(!grid.can_place(IdolBaseType::Conqueror, GridPosition::new(5, 5)));
            assert!(!grid.can_place(IdolBaseType::Conqueror, GridPosition::new(4, 6)));
        }

        #[test]
        fn anchors_near_i32_max_rejected() {
            let grid = OccupancyGrid::empty();
            for base_type in IdolBaseType::ALL {
                assert!(!grid.can_place(base_type, GridPosition::new(i32::MAX, 0)));
                assert!(!grid.can_place(base_type, GridPosition::new(0, i32::MAX)));
                assert!(!grid.can_place(base_type, GridPosition::new(i32::MAX - 1, i32::MAX - 1)));
            }
            let cells: Vec<_> =
                footprint(IdolBaseType::Conqueror, GridPosition::new(i32::MAX - 1, 0)).collect();
            assert_eq!(cells, vec![(i32::MAX - 1, 0), (i32::MAX - 1, 1)]);
        }

        #[test]
        fn negative_anchors_rejected() {
            let grid = OccupancyGrid::empty();
            for base_type in IdolBaseType::ALL {
                assert!(!grid.can_place(base_type, GridPosition::new(-1, 0)));
                assert!(!grid.can_place(base_type, GridPosition::new(0, -1)));
            }
        }

        #[test]
        fn every_base_every_anchor_matches_footprint_arithmetic() {
            let grid = OccupancyGrid::empty();
            for base_type in IdolBaseType::ALL {
                for y in -2..10 {
                    for x in -2..9 {
                        let expected = x >= 0
                            && y >= 0
                            && x + base_type.width() <= 6
                            && y + base_type.height() <= 7;
                        assert_eq!(
                            grid.can_place(base_type, GridPosition::new(x, y)),
                            expected,
                            "{:?} at ({}, {})",
                            base_type,
                            x,
                            y
                        );
                    }
                }
            }
        }

        #[test]
        fn out_of_bounds_reason_reported() {
            let err = OccupancyGrid::empty()
                .check_placement(
                    IdolBaseType::Burial,
                    GridPosition::new(4, 0),
                    &BlockedCells::none(),
                )
                .unwrap_err();
            assert!(matches!(err, PlacementRejection::OutOfBounds { width: 3, .. }));
        }
    }

    mod building {
        use super::*;

        #[test]
        fn only_placements_on_requested_tab_are_marked() {
            let a = entry(IdolBaseType::Conqueror);
            let b = entry(IdolBaseType::Minor);
            let placements = vec![
                placed(&a, 0, 0, GridTab::Tab1),
                placed(&b, 5, 6, GridTab::Tab2),
            ];
            let inventory = vec![a, b];

            let grid = OccupancyGrid::build(&placements, &inventory, GridTab::Tab1, None);
            assert_eq!(grid.occupied_count(), 4);
            assert!(grid.is_occupied(1, 1));
            assert!(!grid.is_occupied(5, 6));
        }

        #[test]
        fn excluded_placement_is_not_marked() {
            let a = entry(IdolBaseType::Totemic);
            let placements = vec![placed(&a, 2, 0, GridTab::Tab1)];
            let excluded = placements[0].id.clone();
            let inventory = vec![a];

            let grid =
                OccupancyGrid::build(&placements, &inventory, GridTab::Tab1, Some(&excluded));
            assert_eq!(grid.occupied_count(), 0);
        }

        #[test]
        fn dangling_placement_is_skipped() {
            let orphan = entry(IdolBaseType::Noble);
            let placements = vec![placed(&orphan, 0, 0, GridTab::Tab1)];
            let grid = OccupancyGrid::build(&placements, &[], GridTab::Tab1, None);
            assert_eq!(grid.occupied_count(), 0);
        }
    }

    mod rules {
        use super::*;

        #[test]
        fn overlap_reports_first_occupied_cell() {
            let mut grid = OccupancyGrid::empty();
            grid.occupy(IdolBaseType::Noble, GridPosition::new(1, 1));
            let err = grid
                .check_placement(
                    IdolBaseType::Kamasan,
                    GridPosition::new(2, 0),
                    &BlockedCells::none(),
                )
                .unwrap_err();
            assert_eq!(err, PlacementRejection::Occupied { x: 2, y: 1 });
        }

        #[test]
        fn blocked_cells_only_apply_to_layout_check() {
            let grid = OccupancyGrid::empty();
            let origin = GridPosition::new(0, 0);
            assert!(grid.can_place(IdolBaseType::Minor, origin));
            assert_eq!(
                grid.check_placement(IdolBaseType::Minor, origin, &BlockedCells::default()),
                Err(PlacementRejection::BlockedCell { x: 0, y: 0 })
            );
        }

        #[test]
        fn free_position_skips_blocked_and_occupied_cells() {
            let mut grid = OccupancyGrid::empty();
            grid.occupy(IdolBaseType::Minor, GridPosition::new(1, 0));
            let found = grid.find_free_position(IdolBaseType::Minor, &BlockedCells::default());
            assert_eq!(found, Some(GridPosition::new(2, 0)));
        }

        #[test]
        fn full_grid_has_no_free_position() {
            let mut grid = OccupancyGrid::empty();
            for y in 0..7 {
                grid.occupy(IdolBaseType::Burial, GridPosition::new(0, y));
                grid.occupy(IdolBaseType::Burial, GridPosition::new(3, y));
            }
            assert_eq!(
                grid.find_free_position(IdolBaseType::Minor, &BlockedCells::none()),
                None
            );
        }
    }

    #[test]
    fn random_accepted_placements_never_overlap() {
        let mut rng = StdRng::seed_from_u64(0x1d01);
        for _ in 0..50 {
            let mut grid = OccupancyGrid::empty();
            let mut covered: Vec<(i32, i32)> = Vec::new();
            for _ in 0..40 {
                let base_type = IdolBaseType::ALL[rng.gen_range(0..6)];
                let position = GridPosition::new(rng.gen_range(-1..7), rng.gen_range(-1..8));
                let cells: Vec<(i32, i32)> = footprint(base_type, position).collect();
                let overlaps = cells.iter().any(|cell| covered.contains(cell));

                if grid.can_place(base_type, position) {
                    assert!(!overlaps, "accepted overlapping {:?} at {}", base_type, position);
                    grid.occupy(base_type, position);
                    covered.extend(cells);
                }
            }
            assert_eq!(grid.occupied_count(), covered.len());
        }
    }
}
