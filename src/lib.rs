//! Scores engine-annotated chess games by how many expected points each side
//! gave away, and derives Game Intelligence and performance ratings.
//!
//! ```
//! use quickgi::{score_game, EvaluationSample, GameRecord, GameResult, ScoringConfig};
//!
//! let samples = vec![
//!     EvaluationSample::from_eval(0.3),
//!     EvaluationSample::from_eval(0.3),
//!     EvaluationSample::from_eval(0.2),
//! ];
//! let record = GameRecord::new(samples, GameResult::Draw);
//! let report = score_game(&record, &ScoringConfig::default()).unwrap();
//! assert_eq!(report.white.moves, 1);
//! ```

mod clock;
mod config;
mod game;
mod payout;
mod performance;
mod ply;
mod rating;
mod score;
mod side;
mod wdl;

pub use clock::{full_move_number, ClockDeltaReconstructor, InvalidTimeControl, TimeControl};
pub use config::{
    ClassificationThresholds, GiNormalization, InvalidThresholds, ScoringConfig,
    ScoringConfigBuilder, TimeFlagThresholds,
};
pub use game::{
    adjust_for_opponent, score_game, score_game_with, EvaluationSample, GameQualityReport,
    GameRecord, GameResult, GameScoreAggregator, MoveCounts, NotAnalyzable, SideReport,
};
pub use payout::{orient, ExpectedValue, InvalidPayoutScheme, PayoutScheme};
pub use performance::{performance_rating, PerformanceRatingError, PerformanceRatingInput};
pub use ply::{Classification, EventKind, FlaggedEvent, PlyOutcome, PlyScorer, TimeFlag};
pub use rating::{RatingDifference, RatingScalar};
pub use score::Score;
pub use side::{BySide, Side};
pub use wdl::{
    AnnotatedWdl, EvalSource, InvalidEvalSource, ProbabilityModel, SourceModel, StockfishWdl, Wdl,
    DEFAULT_EVAL_CAP,
};
