//! Currency-agnostic price value object.

use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// A non-negative, finite price.
///
/// The unit is whatever the catalog uses; the core never converts or rounds.
/// `-0.0` is normalised to `0.0` so equality and ordering agree.
#[derive(Debug, Copy, Clone, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

impl Price {
    pub const ZERO: Price = Price(0.0);

    pub fn new(value: f64) -> DomainResult<Self> {
        if !value.is_finite() {
            return Err(DomainError::validation(format!(
                "price must be finite, got {value}"
            )));
        }
        if value < 0.0 {
            return Err(DomainError::validation(format!(
                "price must be non-negative, got {value}"
            )));
        }
        Ok(Self(value + 0.0))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    /// Line amount for `quantity` units at this price.
    pub fn times(self, quantity: u32) -> f64 {
        self.0 * f64::from(quantity)
    }

    /// Inclusive range check against raw bounds (bounds may be infinite).
    pub fn within(self, min: f64, max: f64) -> bool {
        self.0 >= min && self.0 <= max
    }
}

impl TryFrom<f64> for Price {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Price::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> Self {
        value.0
    }
}

impl PartialEq for Price {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Price {}

impl PartialOrd for Price {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Price {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl ValueObject for Price {}
