//! Fixed idol grid layout: dimensions, tabs, blocked cells and the cells gated
//! behind unlock conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

pub const GRID_WIDTH: usize = 6;
pub const GRID_HEIGHT: usize = 7;

/// Cells that can never hold an idol, mirroring the in-game idol window
/// (four corners and the 2x3 block in the middle).
pub const INVALID_CELLS: [(i32, i32); 10] = [
    (0, 0),
    (5, 0),
    (2, 2),
    (3, 2),
    (2, 3),
    (3, 3),
    (2, 4),
    (3, 4),
    (0, 6),
    (5, 6),
];

/// A condition that opens a group of grid cells once completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnlockCondition {
    pub id: &'static str,
    pub label: &'static str,
    pub cells: &'static [(i32, i32)],
}

pub const UNLOCK_CONDITIONS: [UnlockCondition; 4] = [
    UnlockCondition {
        id: "kill-searing-exarch",
        label: "Defeat the Searing Exarch",
        cells: &[(1, 0), (4, 0)],
    },
    UnlockCondition {
        id: "kill-maven",
        label: "Defeat the Maven",
        cells: &[(0, 1), (5, 1)],
    },
    UnlockCondition {
        id: "kill-uber-elder",
        label: "Defeat the Uber Elder",
        cells: &[(0, 5), (5, 5)],
    },
    UnlockCondition {
        id: "kill-eater-of-worlds",
        label: "Defeat the Eater of Worlds",
        cells: &[(1, 6), (4, 6)],
    },
];

/// Ids of every unlock condition, used as the default "everything unlocked" list.
pub fn all_unlock_condition_ids() -> Vec<String> {
    UNLOCK_CONDITIONS.iter().map(|c| c.id.to_string()).collect()
}

pub fn find_unlock_condition(id: &str) -> Option<&'static UnlockCondition> {
    UNLOCK_CONDITIONS.iter().find(|c| c.id == id)
}

/// One of the three independent grid layouts in a set
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum GridTab {
    #[default]
    #[serde(rename = "tab1")]
    Tab1,
    #[serde(rename = "tab2")]
    Tab2,
    #[serde(rename = "tab3")]
    Tab3,
}

impl GridTab {
    pub const ALL: [GridTab; 3] = [Self::Tab1, Self::Tab2, Self::Tab3];

    /// 1-based tab number as shown to users.
    pub fn number(self) -> u8 {
        match self {
            Self::Tab1 => 1,
            Self::Tab2 => 2,
            Self::Tab3 => 3,
        }
    }

    pub fn from_number(number: u8) -> Result<Self, DomainError> {
        match number {
            1 => Ok(Self::Tab1),
            2 => Ok(Self::Tab2),
            3 => Ok(Self::Tab3),
            other => Err(DomainError::parse(format!("Unknown grid tab: {}", other))),
        }
    }
}

impl fmt::Display for GridTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tab{}", self.number())
    }
}

/// Anchor (top-left cell) of a placement.
///
/// Signed so that candidate positions left of or above the grid can be
/// represented and rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: i32,
    pub y: i32,
}

impl GridPosition {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for GridPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

pub(crate) fn in_bounds(x: i32, y: i32) -> bool {
    x >= 0 && y >= 0 && (x as usize) < GRID_WIDTH && (y as usize) < GRID_HEIGHT
}

/// Cells a set's layout refuses: the invalid cells plus cells whose unlock
/// condition has not been completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedCells {
    cells: [[bool; GRID_WIDTH]; GRID_HEIGHT],
}

impl BlockedCells {
    /// No blocked cells at all; bounds and occupancy are the only rules.
    pub fn none() -> Self {
        Self {
            cells: [[false; GRID_WIDTH]; GRID_HEIGHT],
        }
    }

    /// Blocked cells for a set with the given unlocked condition ids.
    pub fn for_unlocked<S: AsRef<str>>(unlocked: &[S]) -> Self {
        let mut blocked = Self::none();
        for (x, y) in INVALID_CELLS {
            blocked.block(x, y);
        }
        for condition in &UNLOCK_CONDITIONS {
            let is_unlocked = unlocked.iter().any(|id| id.as_ref() == condition.id);
            if !is_unlocked {
                for &(x, y) in condition.cells {
                    blocked.block(x, y);
                }
            }
        }
        blocked
    }

    fn block(&mut self, x: i32, y: i32) {
        if in_bounds(x, y) {
            self.cells[y as usize][x as usize] = true;
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        in_bounds(x, y) && self.cells[y as usize][x as usize]
    }
}

impl Default for BlockedCells {
    fn default() -> Self {
        Self::for_unlocked(&all_unlock_condition_ids())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_cells_are_inside_grid_and_distinct() {
        for (i, &(x, y)) in INVALID_CELLS.iter().enumerate() {
            assert!(in_bounds(x, y));
            assert!(!INVALID_CELLS[i + 1..].contains(&(x, y)));
        }
    }

    #[test]
    fn gated_cells_never_overlap_invalid_cells() {
        for condition in &UNLOCK_CONDITIONS {
            for cell in condition.cells {
                assert!(!INVALID_CELLS.contains(cell), "{:?}", cell);
            }
        }
    }

    #[test]
    fn locked_condition_blocks_its_cells() {
        let all_but_maven: Vec<String> = all_unlock_condition_ids()
            .into_iter()
            .filter(|id| id != "kill-maven")
            .collect();
        let blocked = BlockedCells::for_unlocked(&all_but_maven);
        assert!(blocked.contains(0, 1));
        assert!(blocked.contains(5, 1));
        assert!(!blocked.contains(1, 1));

        let open = BlockedCells::default();
        assert!(!open.contains(0, 1));
        assert!(open.contains(0, 0));
    }

    #[test]
    fn tab_numbers() {
        assert_eq!(GridTab::from_number(2).unwrap(), GridTab::Tab2);
        assert!(GridTab::from_number(4).is_err());
        assert_eq!(GridTab::Tab3.to_string(), "tab3");
        assert_eq!(serde_json::to_value(GridTab::Tab1).unwrap(), "tab1");
    }
}
