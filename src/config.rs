use std::{str::FromStr, time::Duration};

use thiserror::Error;

use crate::{
    wdl::{SourceModel, StockfishWdl, DEFAULT_EVAL_CAP},
    BySide, EvalSource, PayoutScheme, RatingScalar,
};

/// Minimum point loss, as a fraction of the win value, for each move quality
/// class.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassificationThresholds {
    inaccuracy: f64,
    mistake: f64,
    blunder: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid thresholds {inaccuracy}/{mistake}/{blunder} (expected 0 < inaccuracy < mistake < blunder)")]
pub struct InvalidThresholds {
    pub inaccuracy: f64,
    pub mistake: f64,
    pub blunder: f64,
}

impl ClassificationThresholds {
    pub const STOCKFISH: ClassificationThresholds = ClassificationThresholds {
        inaccuracy: 0.05,
        mistake: 0.20,
        blunder: 0.50,
    };

    pub const LC0_WHITE: ClassificationThresholds = ClassificationThresholds {
        inaccuracy: 0.07,
        mistake: 0.15,
        blunder: 0.30,
    };

    pub const LC0_BLACK: ClassificationThresholds = ClassificationThresholds {
        inaccuracy: 0.07,
        mistake: 0.20,
        blunder: 0.23,
    };

    pub fn new(
        inaccuracy: f64,
        mistake: f64,
        blunder: f64,
    ) -> Result<ClassificationThresholds, InvalidThresholds> {
        if 0.0 < inaccuracy && inaccuracy < mistake && mistake < blunder && blunder.is_finite() {
            Ok(ClassificationThresholds {
                inaccuracy,
                mistake,
                blunder,
            })
        } else {
            Err(InvalidThresholds {
                inaccuracy,
                mistake,
                blunder,
            })
        }
    }

    pub fn inaccuracy(&self) -> f64 {
        self.inaccuracy
    }

    pub fn mistake(&self) -> f64 {
        self.mistake
    }

    pub fn blunder(&self) -> f64 {
        self.blunder
    }

    fn is_monotonic(&self) -> bool {
        ClassificationThresholds::new(self.inaccuracy, self.mistake, self.blunder).is_ok()
    }
}

impl FromStr for ClassificationThresholds {
    type Err = InvalidThresholds;

    /// Parses `inaccuracy,mistake,blunder`, for example `0.05,0.2,0.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| part.trim().parse::<f64>().unwrap_or(f64::NAN))
            .collect::<Vec<_>>();
        match *values.as_slice() {
            [inaccuracy, mistake, blunder] => {
                ClassificationThresholds::new(inaccuracy, mistake, blunder)
            }
            _ => Err(InvalidThresholds {
                inaccuracy: f64::NAN,
                mistake: f64::NAN,
                blunder: f64::NAN,
            }),
        }
    }
}

/// Minimum think time for a ply to be flagged.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeFlagThresholds {
    pub critical: Duration,
    pub deep_think: Duration,
}

impl Default for TimeFlagThresholds {
    fn default() -> TimeFlagThresholds {
        TimeFlagThresholds {
            critical: Duration::from_secs(15 * 60),
            deep_think: Duration::from_secs(30 * 60),
        }
    }
}

/// Affine map from raw Game Intelligence onto the reporting scale.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GiNormalization {
    pub offset: f64,
    pub scale: f64,
}

impl Default for GiNormalization {
    fn default() -> GiNormalization {
        GiNormalization {
            offset: 157.57,
            scale: 18.55,
        }
    }
}

impl GiNormalization {
    #[inline]
    pub fn apply(&self, gi: f64) -> f64 {
        self.offset + self.scale * gi
    }
}

#[derive(Debug, Clone)]
pub struct ScoringConfigBuilder {
    source: EvalSource,
    payout: PayoutScheme,
    thresholds: BySide<ClassificationThresholds>,
    time_flags: TimeFlagThresholds,
    normalization: GiNormalization,
    reference_rating: RatingScalar,
    eval_cap: f64,
    model_ply: u32,
    black_move_offset: i32,
}

impl Default for ScoringConfigBuilder {
    fn default() -> ScoringConfigBuilder {
        ScoringConfigBuilder::new(EvalSource::Stockfish)
    }
}

impl ScoringConfigBuilder {
    /// Starts from the defaults of the given evaluation source.
    pub fn new(source: EvalSource) -> ScoringConfigBuilder {
        let (thresholds, black_move_offset) = match source {
            EvalSource::Stockfish => (BySide::splat(ClassificationThresholds::STOCKFISH), 0),
            EvalSource::Lc0 => (
                BySide::new(
                    ClassificationThresholds::LC0_WHITE,
                    ClassificationThresholds::LC0_BLACK,
                ),
                -1,
            ),
        };

        ScoringConfigBuilder {
            source,
            payout: PayoutScheme::STANDARD,
            thresholds,
            time_flags: TimeFlagThresholds::default(),
            normalization: GiNormalization::default(),
            reference_rating: RatingScalar(2800.0),
            eval_cap: DEFAULT_EVAL_CAP,
            model_ply: StockfishWdl::DEFAULT_PLY,
            black_move_offset,
        }
    }

    pub fn payout(&mut self, payout: PayoutScheme) -> &mut Self {
        self.payout = payout;
        self
    }

    pub fn white_thresholds(&mut self, thresholds: ClassificationThresholds) -> &mut Self {
        self.thresholds.white = thresholds;
        self
    }

    pub fn black_thresholds(&mut self, thresholds: ClassificationThresholds) -> &mut Self {
        self.thresholds.black = thresholds;
        self
    }

    pub fn time_flags(&mut self, time_flags: TimeFlagThresholds) -> &mut Self {
        self.time_flags = time_flags;
        self
    }

    pub fn normalization(&mut self, normalization: GiNormalization) -> &mut Self {
        assert!(normalization.offset.is_finite() && normalization.scale.is_finite());
        self.normalization = normalization;
        self
    }

    pub fn reference_rating(&mut self, reference_rating: RatingScalar) -> &mut Self {
        assert!(reference_rating.is_finite());
        self.reference_rating = reference_rating;
        self
    }

    pub fn eval_cap(&mut self, eval_cap: f64) -> &mut Self {
        assert!(eval_cap > 0.0 && eval_cap.is_finite());
        self.eval_cap = eval_cap;
        self
    }

    pub fn model_ply(&mut self, model_ply: u32) -> &mut Self {
        self.model_ply = model_ply;
        self
    }

    pub fn black_move_offset(&mut self, black_move_offset: i32) -> &mut Self {
        self.black_move_offset = black_move_offset;
        self
    }

    pub fn build(&self) -> ScoringConfig {
        assert!(self.thresholds.white.is_monotonic());
        assert!(self.thresholds.black.is_monotonic());
        assert!(self.time_flags.critical <= self.time_flags.deep_think);

        ScoringConfig {
            source: self.source,
            payout: self.payout,
            thresholds: self.thresholds.clone(),
            time_flags: self.time_flags,
            normalization: self.normalization,
            reference_rating: self.reference_rating,
            eval_cap: self.eval_cap,
            model_ply: self.model_ply,
            black_move_offset: self.black_move_offset,
        }
    }
}

/// Everything that parameterizes the scoring of a game.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    source: EvalSource,
    payout: PayoutScheme,
    thresholds: BySide<ClassificationThresholds>,
    time_flags: TimeFlagThresholds,
    normalization: GiNormalization,
    reference_rating: RatingScalar,
    eval_cap: f64,
    model_ply: u32,
    black_move_offset: i32,
}

impl Default for ScoringConfig {
    fn default() -> ScoringConfig {
        ScoringConfig::new(EvalSource::Stockfish)
    }
}

impl ScoringConfig {
    pub fn builder(source: EvalSource) -> ScoringConfigBuilder {
        ScoringConfigBuilder::new(source)
    }

    pub fn new(source: EvalSource) -> ScoringConfig {
        ScoringConfig::builder(source).build()
    }

    pub fn source(&self) -> EvalSource {
        self.source
    }

    pub fn payout(&self) -> &PayoutScheme {
        &self.payout
    }

    pub fn thresholds(&self) -> &BySide<ClassificationThresholds> {
        &self.thresholds
    }

    pub fn time_flags(&self) -> &TimeFlagThresholds {
        &self.time_flags
    }

    pub fn normalization(&self) -> &GiNormalization {
        &self.normalization
    }

    pub fn reference_rating(&self) -> RatingScalar {
        self.reference_rating
    }

    pub fn eval_cap(&self) -> f64 {
        self.eval_cap
    }

    pub fn black_move_offset(&self) -> i32 {
        self.black_move_offset
    }

    /// The probability model for the configured evaluation source.
    pub fn model(&self) -> SourceModel {
        SourceModel::new(self.source, StockfishWdl::new(self.eval_cap, self.model_ply))
    }
}
