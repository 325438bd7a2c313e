use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Whole CSS pixels, as reported by layout (`offsetHeight`) and written back
/// into style properties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Px(pub u32);

impl Px {
    pub const ZERO: Px = Px(0);

    /// Layout APIs hand out signed integers; anything below zero is treated as zero.
    pub fn clamped(value: i32) -> Self {
        Px(u32::try_from(value).unwrap_or(0))
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Add for Px {
    type Output = Px;

    fn add(self, rhs: Px) -> Px {
        Px(self.0.saturating_add(rhs.0))
    }
}

impl fmt::Display for Px {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}px", self.0)
    }
}

/// Measured heights that make up the published offset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Offset {
    pub header: Px,

    /// Present only when a banner was found below the header.
    pub banner: Option<Px>,
}

impl Offset {
    pub fn new(header: Px, banner: Option<Px>) -> Self {
        Self { header, banner }
    }

    /// Value written to the root custom property.
    pub fn total(&self) -> Px {
        self.banner.map_or(self.header, |banner| self.header + banner)
    }
}
