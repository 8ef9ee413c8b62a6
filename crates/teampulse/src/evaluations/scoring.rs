//! Rating-level scoring rules: the stored 1-4 scale, its "higher is
//! better" inversion, threshold suggestions for quantitative KPIs, and
//! performance tiers over mean scores.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Evaluator rating on the stored scale: 1 is best, 4 is worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("rating must be an integer between 1 and 4, got {0}")]
pub struct InvalidRating(pub u8);

impl Rating {
    pub const BEST: Rating = Rating(1);
    pub const WORST: Rating = Rating(4);

    pub fn new(value: u8) -> Result<Self, InvalidRating> {
        if (1..=4).contains(&value) {
            Ok(Self(value))
        } else {
            Err(InvalidRating(value))
        }
    }

    pub const fn value(self) -> u8 {
        self.0
    }

    /// Inverted score, `5 - rating`. Every aggregate operates on this so
    /// that higher always means better, even though the stored scale is
    /// the other way around.
    pub const fn score(self) -> u8 {
        5 - self.0
    }

    pub const fn label(self) -> &'static str {
        match self.0 {
            1 => "Excellent",
            2 => "Good",
            3 => "Regular",
            _ => "Deficient",
        }
    }
}

impl TryFrom<u8> for Rating {
    type Error = InvalidRating;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Suggested rating for a quantitative KPI completion percentage.
/// Advisory only: the evaluator may override it, and whatever the
/// evaluator confirms is what gets stored.
pub fn suggest_rating(percentage: f64) -> Rating {
    if percentage >= 90.0 {
        Rating(1)
    } else if percentage >= 75.0 {
        Rating(2)
    } else if percentage >= 50.0 {
        Rating(3)
    } else {
        Rating(4)
    }
}

/// Performance band over a mean score. Boundaries are closed from above:
/// a mean of exactly 3.5 is Excellent, exactly 2.5 is Good, exactly 1.5
/// is Regular.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PerformanceTier {
    Excellent,
    Good,
    Regular,
    Deficient,
}

impl PerformanceTier {
    pub fn from_mean_score(mean_score: f64) -> Self {
        if mean_score >= 3.5 {
            Self::Excellent
        } else if mean_score >= 2.5 {
            Self::Good
        } else if mean_score >= 1.5 {
            Self::Regular
        } else {
            Self::Deficient
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Excellent => "Excellent",
            Self::Good => "Good",
            Self::Regular => "Regular",
            Self::Deficient => "Deficient",
        }
    }
}
