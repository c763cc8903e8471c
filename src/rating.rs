use std::ops::{Add, Mul, Sub};

use crate::Score;

/// Number representing playing strength, such that the difference between two
/// ratings can be used to predict an expected score. Higher is better.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RatingScalar(pub f64);

impl From<RatingScalar> for f64 {
    #[inline]
    fn from(RatingScalar(rating): RatingScalar) -> f64 {
        rating
    }
}

impl From<f64> for RatingScalar {
    #[inline]
    fn from(rating: f64) -> RatingScalar {
        RatingScalar(rating)
    }
}

impl From<i32> for RatingScalar {
    #[inline]
    fn from(rating: i32) -> RatingScalar {
        RatingScalar(f64::from(rating))
    }
}

impl RatingScalar {
    /// Expected score of a player with this rating against a player rated
    /// `reference`, using the logistic Elo curve with a 400 point scale.
    #[inline]
    pub fn expected_score(self, reference: RatingScalar) -> Score {
        (self - reference).expected_score()
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.0.is_finite()
    }
}

impl Sub<RatingScalar> for RatingScalar {
    type Output = RatingDifference;

    #[inline]
    fn sub(self, rhs: RatingScalar) -> RatingDifference {
        RatingDifference(self.0 - rhs.0)
    }
}

impl Add<RatingDifference> for RatingScalar {
    type Output = RatingScalar;

    #[inline]
    fn add(self, RatingDifference(difference): RatingDifference) -> RatingScalar {
        RatingScalar(self.0 + difference)
    }
}

impl Sub<RatingDifference> for RatingScalar {
    type Output = RatingScalar;

    #[inline]
    fn sub(self, RatingDifference(difference): RatingDifference) -> RatingScalar {
        RatingScalar(self.0 - difference)
    }
}

/// A difference between two ratings.
#[derive(Debug, Copy, Clone, PartialEq, PartialOrd, Default)]
pub struct RatingDifference(pub f64);

impl From<RatingDifference> for f64 {
    #[inline]
    fn from(RatingDifference(difference): RatingDifference) -> f64 {
        difference
    }
}

impl RatingDifference {
    /// Rating difference corresponding to a tenfold change in odds.
    pub const ODDS_SCALE: RatingDifference = RatingDifference(400.0);

    /// Rating difference that makes the odds of winning `odds` to one.
    #[inline]
    pub fn from_odds(odds: f64) -> RatingDifference {
        RatingDifference(Self::ODDS_SCALE.0 * odds.log10())
    }

    #[inline]
    pub fn expected_score(self) -> Score {
        Score(1.0 / (1.0 + 10f64.powf(-self.0 / Self::ODDS_SCALE.0)))
    }
}

impl Mul<RatingDifference> for f64 {
    type Output = RatingDifference;

    #[inline]
    fn mul(self, RatingDifference(difference): RatingDifference) -> RatingDifference {
        RatingDifference(self * difference)
    }
}
