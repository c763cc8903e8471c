//! Tournament performance rating (TPR), with a continuous substitute (CPR)
//! for perfect and zero scores.

use thiserror::Error;

use crate::{RatingDifference, RatingScalar};

/// Points scored over a number of games against opponents with a known
/// average rating.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceRatingInput {
    /// Points scored, between `0` and `games`.
    pub score: f64,
    pub games: u32,
    pub avg_opponent_rating: RatingScalar,
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum PerformanceRatingError {
    #[error("score {score} is not between 0 and the number of games {games}")]
    InvalidScore { score: f64, games: u32 },
    #[error("number of games must be positive")]
    InvalidGameCount,
}

impl PerformanceRatingInput {
    pub fn new(score: f64, games: u32, avg_opponent_rating: RatingScalar) -> PerformanceRatingInput {
        PerformanceRatingInput {
            score,
            games,
            avg_opponent_rating,
        }
    }

    fn validate(&self) -> Result<(f64, f64), PerformanceRatingError> {
        let m = self.score;
        let n = f64::from(self.games);
        // Negated comparisons also reject NaN.
        if !(m >= 0.0 && m <= n) {
            return Err(PerformanceRatingError::InvalidScore {
                score: m,
                games: self.games,
            });
        }
        if self.games == 0 {
            return Err(PerformanceRatingError::InvalidGameCount);
        }
        Ok((m, n))
    }

    /// Whether the score is perfect or zero, where the plain formula is
    /// undefined.
    pub fn is_boundary(&self) -> bool {
        self.score == 0.0 || self.score == f64::from(self.games)
    }

    /// Performance rating: `B - 400 log10((n - m) / m)`, switching to
    /// [`PerformanceRatingInput::continuous_rating()`] for perfect and zero
    /// scores.
    pub fn rating(&self) -> Result<RatingScalar, PerformanceRatingError> {
        let (m, n) = self.validate()?;
        if self.is_boundary() {
            return self.continuous_rating();
        }
        Ok(self.avg_opponent_rating - RatingDifference::from_odds((n - m) / m))
    }

    /// Continuous performance rating:
    /// `B - (n + 1) / n * 400 log10((n + 0.5 - m) / (m + 0.5))`.
    ///
    /// Finite for every valid input, including perfect and zero scores.
    pub fn continuous_rating(&self) -> Result<RatingScalar, PerformanceRatingError> {
        let (m, n) = self.validate()?;
        Ok(self.avg_opponent_rating
            - ((n + 1.0) / n) * RatingDifference::from_odds((n + 0.5 - m) / (m + 0.5)))
    }
}

/// Shorthand for [`PerformanceRatingInput::rating()`].
pub fn performance_rating(
    score: f64,
    games: u32,
    avg_opponent_rating: RatingScalar,
) -> Result<RatingScalar, PerformanceRatingError> {
    PerformanceRatingInput::new(score, games, avg_opponent_rating).rating()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_even_score_is_average_opponent() {
        assert_eq!(
            performance_rating(5.0, 10, RatingScalar(2000.0)),
            Ok(RatingScalar(2000.0))
        );
    }

    #[test]
    fn test_plain_formula() {
        let RatingScalar(rating) = performance_rating(7.5, 10, RatingScalar(2000.0)).unwrap();
        assert!((rating - (2000.0 + 400.0 * 3f64.log10())).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_scores_are_finite_and_symmetric() {
        let RatingScalar(zero) = performance_rating(0.0, 10, RatingScalar(2000.0)).unwrap();
        let RatingScalar(perfect) = performance_rating(10.0, 10, RatingScalar(2000.0)).unwrap();
        assert!(zero.is_finite() && perfect.is_finite());
        assert!(zero < 2000.0 && perfect > 2000.0);
        assert!(((2000.0 - zero) - (perfect - 2000.0)).abs() < 1e-9);
        assert!((perfect - (2000.0 + 1.1 * 400.0 * 21f64.log10())).abs() < 1e-9);
    }

    #[test]
    fn test_single_game() {
        let RatingScalar(won) = performance_rating(1.0, 1, RatingScalar(1500.0)).unwrap();
        assert!((won - (1500.0 + 800.0 * 3f64.log10())).abs() < 1e-9);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            performance_rating(-0.5, 10, RatingScalar(2000.0)),
            Err(PerformanceRatingError::InvalidScore {
                score: -0.5,
                games: 10
            })
        );
        assert_eq!(
            performance_rating(11.0, 10, RatingScalar(2000.0)),
            Err(PerformanceRatingError::InvalidScore {
                score: 11.0,
                games: 10
            })
        );
        assert_eq!(
            performance_rating(0.0, 0, RatingScalar(2000.0)),
            Err(PerformanceRatingError::InvalidGameCount)
        );
        assert!(matches!(
            performance_rating(f64::NAN, 3, RatingScalar(2000.0)),
            Err(PerformanceRatingError::InvalidScore { .. })
        ));
    }
}
