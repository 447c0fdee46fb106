//! Boundary-condition catalogue of the Neutral Map File format.
//!
//! Names are compared after normalisation: upper-cased, with `-` read as `_`.
//! `SYMMETRY` is accepted as an input alias of [`BoundaryCondition::Sym`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::{NmfError, Result};

/// Interface and boundary kinds understood by the neutral map.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(into = "&'static str")]
pub enum BoundaryCondition {
    Collapsed,
    OneToOne,
    Patched,
    PoleDir1,
    PoleDir2,
    SymX,
    SymY,
    SymZ,
    Unprocessed,
    Wall,
    Sym,
    Inflow,
    Outflow,
}

use BoundaryCondition as Bc;

/// Canonical `(kind, code, name)` triples. One row per kind.
const CATALOG: [(BoundaryCondition, i32, &str); 13] = [
    (Bc::Collapsed, 1, "COLLAPSED"),
    (Bc::OneToOne, 2, "ONE_TO_ONE"),
    (Bc::Patched, 3, "PATCHED"),
    (Bc::PoleDir1, 4, "POLE_DIR1"),
    (Bc::PoleDir2, 5, "POLE_DIR2"),
    (Bc::SymX, 6, "SYM_X"),
    (Bc::SymY, 7, "SYM_Y"),
    (Bc::SymZ, 8, "SYM_Z"),
    (Bc::Unprocessed, 9, "UNPROCESSED"),
    (Bc::Wall, 10, "WALL"),
    (Bc::Sym, 11, "SYM"),
    (Bc::Inflow, 12, "INFLOW"),
    (Bc::Outflow, 13, "OUTFLOW"),
];

/// Input-only spellings.
const ALIASES: [(&str, BoundaryCondition); 1] = [("SYMMETRY", Bc::Sym)];

/// Upper-case `name` and turn hyphens into underscores.
pub fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .map(|c| if c == '-' { '_' } else { c.to_ascii_uppercase() })
        .collect()
}

impl BoundaryCondition {
    /// Every kind, in code order.
    pub fn all() -> impl Iterator<Item = Self> {
        CATALOG.iter().map(|row| row.0)
    }

    /// Numeric code (1..=13).
    pub fn code(self) -> i32 {
        CATALOG[self as usize].1
    }

    /// Canonical upper-case name.
    pub fn name(self) -> &'static str {
        CATALOG[self as usize].2
    }

    pub fn from_code(code: i32) -> Result<Self> {
        CATALOG
            .iter()
            .find(|row| row.1 == code)
            .map(|row| row.0)
            .ok_or_else(|| NmfError::UnknownBoundaryCondition(code.to_string()))
    }

    pub fn from_name(name: &str) -> Result<Self> {
        let key = normalize_name(name);
        CATALOG
            .iter()
            .find(|row| row.2 == key)
            .map(|row| row.0)
            .or_else(|| ALIASES.iter().find(|a| a.0 == key).map(|a| a.1))
            .ok_or_else(|| NmfError::UnknownBoundaryCondition(name.to_string()))
    }

    /// True for the only kind that pairs two windows.
    pub fn is_connectivity(self) -> bool {
        self == Bc::OneToOne
    }
}

impl fmt::Display for BoundaryCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // `pad` keeps width/alignment flags working for the writer.
        f.pad(self.name())
    }
}

impl FromStr for BoundaryCondition {
    type Err = NmfError;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_name(s)
    }
}

impl TryFrom<i32> for BoundaryCondition {
    type Error = NmfError;

    fn try_from(code: i32) -> Result<Self> {
        Self::from_code(code)
    }
}

impl From<BoundaryCondition> for &'static str {
    fn from(bc: BoundaryCondition) -> Self {
        bc.name()
    }
}

/// True when `code` names a boundary condition.
pub fn is_valid_code(code: i32) -> bool {
    BoundaryCondition::from_code(code).is_ok()
}

/// True when `name` (after normalisation) names a boundary condition.
pub fn is_valid_name(name: &str) -> bool {
    BoundaryCondition::from_name(name).is_ok()
}

/// Canonical name for `code`.
pub fn to_name(code: i32) -> Result<&'static str> {
    BoundaryCondition::from_code(code).map(BoundaryCondition::name)
}

/// Numeric code for `name`.
pub fn to_code(name: &str) -> Result<i32> {
    BoundaryCondition::from_name(name).map(BoundaryCondition::code)
}
