//! Static idol base table
//!
//! Every idol is one of six base types. The base decides the footprint an idol
//! occupies on the grid; nothing about a base changes at runtime.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Dimensions and display data for one base type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdolBase {
    pub base_type: IdolBaseType,
    pub name: &'static str,
    pub width: i32,
    pub height: i32,
    pub implicit_count: u8,
}

/// The six idol shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdolBaseType {
    Minor,
    Kamasan,
    Totemic,
    Noble,
    Burial,
    Conqueror,
}

pub static IDOL_BASES: [IdolBase; 6] = [
    IdolBase {
        base_type: IdolBaseType::Minor,
        name: "Minor Idol",
        width: 1,
        height: 1,
        implicit_count: 1,
    },
    IdolBase {
        base_type: IdolBaseType::Kamasan,
        name: "Kamasan Idol",
        width: 1,
        height: 2,
        implicit_count: 1,
    },
    IdolBase {
        base_type: IdolBaseType::Totemic,
        name: "Totemic Idol",
        width: 1,
        height: 3,
        implicit_count: 1,
    },
    IdolBase {
        base_type: IdolBaseType::Noble,
        name: "Noble Idol",
        width: 2,
        height: 1,
        implicit_count: 1,
    },
    IdolBase {
        base_type: IdolBaseType::Burial,
        name: "Burial Idol",
        width: 3,
        height: 1,
        implicit_count: 1,
    },
    IdolBase {
        base_type: IdolBaseType::Conqueror,
        name: "Conqueror Idol",
        width: 2,
        height: 2,
        implicit_count: 1,
    },
];

impl IdolBaseType {
    pub const ALL: [IdolBaseType; 6] = [
        Self::Minor,
        Self::Kamasan,
        Self::Totemic,
        Self::Noble,
        Self::Burial,
        Self::Conqueror,
    ];

    /// Static dimensions for this base.
    pub fn base(self) -> &'static IdolBase {
        // IDOL_BASES is ordered like the enum
        &IDOL_BASES[self as usize]
    }

    pub fn width(self) -> i32 {
        self.base().width
    }

    pub fn height(self) -> i32 {
        self.base().height
    }

    pub fn display_name(self) -> &'static str {
        self.base().name
    }

    pub fn key(self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Kamasan => "kamasan",
            Self::Totemic => "totemic",
            Self::Noble => "noble",
            Self::Burial => "burial",
            Self::Conqueror => "conqueror",
        }
    }

    /// Find the base whose display name ("Conqueror Idol") appears in a line of
    /// item text. Magic idols embed the base between affix names.
    pub fn from_base_name(line: &str) -> Option<Self> {
        let lowered = line.to_lowercase();
        Self::ALL
            .into_iter()
            .find(|base| lowered.contains(&base.display_name().to_lowercase()))
    }
}

impl fmt::Display for IdolBaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

impl std::str::FromStr for IdolBaseType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|base| base.key() == s)
            .ok_or_else(|| DomainError::parse(format!("Unknown idol base type: {}", s)))
    }
}
