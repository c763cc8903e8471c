//! Win/draw/loss probabilities and the models that produce them.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::EvaluationSample;

/// Win/draw/loss probabilities of a position, always from White's point of
/// view. The three components sum to `1.0`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wdl {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl Default for Wdl {
    fn default() -> Wdl {
        Wdl::UNKNOWN
    }
}

impl Wdl {
    /// Used when nothing is known about a position.
    pub const UNKNOWN: Wdl = Wdl {
        win: 0.33,
        draw: 0.34,
        loss: 0.33,
    };

    /// Builds a triple from White's point of view, rescaling it to sum to
    /// `1.0`. Negative or non-finite components are treated as `0.0`, and a
    /// triple with no mass falls back to [`Wdl::UNKNOWN`].
    pub fn new(win: f64, draw: f64, loss: f64) -> Wdl {
        let sanitize = |p: f64| if p.is_finite() && p > 0.0 { p } else { 0.0 };
        let (win, draw, loss) = (sanitize(win), sanitize(draw), sanitize(loss));
        let total = win + draw + loss;
        if total > 0.0 && total.is_finite() {
            Wdl {
                win: win / total,
                draw: draw / total,
                loss: loss / total,
            }
        } else {
            Wdl::UNKNOWN
        }
    }

    /// The same triple rescaled to sum to `1.0`.
    #[must_use]
    pub fn normalized(self) -> Wdl {
        Wdl::new(self.win, self.draw, self.loss)
    }

    pub fn total(&self) -> f64 {
        self.win + self.draw + self.loss
    }
}

/// Converts an evaluation sample to win/draw/loss probabilities.
pub trait ProbabilityModel {
    fn wdl(&self, sample: &EvaluationSample) -> Wdl;

    /// Clamped scalar evaluation in pawns, from White's point of view, as used
    /// for centipawn loss.
    fn pawns(&self, sample: &EvaluationSample) -> Option<f64>;
}

/// Scalar evaluations are capped at this many pawns, representing a
/// certain win or loss.
pub const DEFAULT_EVAL_CAP: f64 = 100.0;

/// Logistic conversion of centipawn evaluations, fitted by Stockfish to
/// self-play results (as shipped with Stockfish 16.1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct StockfishWdl {
    eval_cap: f64,
    ply: u32,
}

impl Default for StockfishWdl {
    fn default() -> StockfishWdl {
        StockfishWdl::new(DEFAULT_EVAL_CAP, StockfishWdl::DEFAULT_PLY)
    }
}

impl StockfishWdl {
    /// Game phase the model is evaluated at when the actual ply is not taken
    /// into account.
    pub const DEFAULT_PLY: u32 = 30;

    const NORMALIZE_TO_PAWN_VALUE: f64 = 356.0;
    const AS: [f64; 4] = [-2.00568292, 10.45906746, 1.67438883, 334.45864705];
    const BS: [f64; 4] = [-4.97134419, 36.15096345, -82.25513499, 117.35186805];

    pub fn new(eval_cap: f64, ply: u32) -> StockfishWdl {
        assert!(eval_cap > 0.0);
        StockfishWdl { eval_cap, ply }
    }

    pub fn eval_cap(&self) -> f64 {
        self.eval_cap
    }

    fn clamp(&self, pawns: f64) -> Option<f64> {
        if pawns.is_nan() {
            None
        } else {
            Some(pawns.clamp(-self.eval_cap, self.eval_cap))
        }
    }

    /// Probability that White wins from an evaluation in centipawns.
    fn win_rate(&self, centipawns: f64) -> f64 {
        let m = (f64::from(self.ply) / 2.0 + 1.0).clamp(8.0, 120.0) / 32.0;
        let a = ((Self::AS[0] * m + Self::AS[1]) * m + Self::AS[2]) * m + Self::AS[3];
        let b = ((Self::BS[0] * m + Self::BS[1]) * m + Self::BS[2]) * m + Self::BS[3];
        let x = (centipawns * Self::NORMALIZE_TO_PAWN_VALUE / 100.0).clamp(-4000.0, 4000.0);
        1.0 / (1.0 + ((a - x) / b).exp())
    }

    /// Win/draw/loss probabilities for an evaluation in pawns from White's
    /// point of view.
    pub fn from_pawns(&self, pawns: f64) -> Wdl {
        let Some(pawns) = self.clamp(pawns) else {
            return Wdl::UNKNOWN;
        };
        let win = self.win_rate(100.0 * pawns);
        let loss = self.win_rate(-100.0 * pawns);
        Wdl {
            win,
            draw: 1.0 - win - loss,
            loss,
        }
    }
}

impl ProbabilityModel for StockfishWdl {
    fn wdl(&self, sample: &EvaluationSample) -> Wdl {
        match (self.pawns(sample), sample.wdl) {
            (Some(pawns), _) => self.from_pawns(pawns),
            (None, Some(wdl)) => wdl.normalized(),
            (None, None) => Wdl::UNKNOWN,
        }
    }

    fn pawns(&self, sample: &EvaluationSample) -> Option<f64> {
        sample.eval.and_then(|pawns| self.clamp(pawns))
    }
}

/// Uses the win/draw/loss probabilities annotated by the evaluation source
/// (as reported by Leela Chess Zero), falling back to the scalar model for
/// samples that carry only a scalar evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct AnnotatedWdl {
    fallback: StockfishWdl,
}

impl AnnotatedWdl {
    pub fn new(fallback: StockfishWdl) -> AnnotatedWdl {
        AnnotatedWdl { fallback }
    }
}

impl ProbabilityModel for AnnotatedWdl {
    fn wdl(&self, sample: &EvaluationSample) -> Wdl {
        match sample.wdl {
            Some(wdl) => wdl.normalized(),
            None => self.fallback.wdl(sample),
        }
    }

    fn pawns(&self, sample: &EvaluationSample) -> Option<f64> {
        self.fallback.pawns(sample)
    }
}

/// The evaluation source a game was annotated with. Selects the probability
/// model and the default thresholds.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EvalSource {
    /// Scalar centipawn evaluations.
    Stockfish,
    /// Annotated win/draw/loss probabilities.
    Lc0,
}

#[derive(Debug, Error)]
#[error("invalid evaluation source (expected stockfish or lc0)")]
pub struct InvalidEvalSource;

impl FromStr for EvalSource {
    type Err = InvalidEvalSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_ascii_lowercase().as_str() {
            "stockfish" | "sf" => EvalSource::Stockfish,
            "lc0" | "leela" => EvalSource::Lc0,
            _ => return Err(InvalidEvalSource),
        })
    }
}

impl fmt::Display for EvalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EvalSource::Stockfish => "stockfish",
            EvalSource::Lc0 => "lc0",
        })
    }
}

/// The probability model selected by an [`EvalSource`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum SourceModel {
    Stockfish(StockfishWdl),
    Annotated(AnnotatedWdl),
}

impl SourceModel {
    pub fn new(source: EvalSource, scalar: StockfishWdl) -> SourceModel {
        match source {
            EvalSource::Stockfish => SourceModel::Stockfish(scalar),
            EvalSource::Lc0 => SourceModel::Annotated(AnnotatedWdl::new(scalar)),
        }
    }
}

impl ProbabilityModel for SourceModel {
    fn wdl(&self, sample: &EvaluationSample) -> Wdl {
        match self {
            SourceModel::Stockfish(model) => model.wdl(sample),
            SourceModel::Annotated(model) => model.wdl(sample),
        }
    }

    fn pawns(&self, sample: &EvaluationSample) -> Option<f64> {
        match self {
            SourceModel::Stockfish(model) => model.pawns(sample),
            SourceModel::Annotated(model) => model.pawns(sample),
        }
    }
}
