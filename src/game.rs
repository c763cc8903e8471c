//! Folding per-move outcomes into a per-game quality report.

use std::{convert::Infallible, fmt, str::FromStr, time::Duration};

use thiserror::Error;

use crate::{
    BySide, Classification, ClockDeltaReconstructor, ExpectedValue, FlaggedEvent, PlyOutcome,
    PlyScorer, ProbabilityModel, RatingScalar, Score, ScoringConfig, Side, TimeControl, TimeFlag,
    Wdl,
};

/// Engine assessment of one position in a game.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EvaluationSample {
    /// Evaluation in pawns from White's point of view.
    pub eval: Option<f64>,
    /// Win/draw/loss probabilities from White's point of view.
    pub wdl: Option<Wdl>,
    /// The position in Forsyth-Edwards notation.
    pub fen: Option<String>,
    /// The move that led to this position.
    pub last_move: Option<String>,
}

impl EvaluationSample {
    pub fn new(eval: Option<f64>, wdl: Option<Wdl>) -> EvaluationSample {
        EvaluationSample {
            eval,
            wdl,
            ..EvaluationSample::default()
        }
    }

    pub fn from_eval(pawns: f64) -> EvaluationSample {
        EvaluationSample::new(Some(pawns), None)
    }

    pub fn from_wdl(wdl: Wdl) -> EvaluationSample {
        EvaluationSample::new(None, Some(wdl))
    }

    #[must_use]
    pub fn with_position(mut self, fen: impl Into<String>, last_move: Option<&str>) -> EvaluationSample {
        self.fen = Some(fen.into());
        self.last_move = last_move.map(str::to_owned);
        self
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum GameResult {
    WhiteWins,
    BlackWins,
    Draw,
    #[default]
    Unknown,
}

impl FromStr for GameResult {
    type Err = Infallible;

    /// Anything but `1-0`, `0-1` and `1/2-1/2` is an unknown result.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim() {
            "1-0" => GameResult::WhiteWins,
            "0-1" => GameResult::BlackWins,
            "1/2-1/2" => GameResult::Draw,
            _ => GameResult::Unknown,
        })
    }
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            GameResult::WhiteWins => "1-0",
            GameResult::BlackWins => "0-1",
            GameResult::Draw => "1/2-1/2",
            GameResult::Unknown => "*",
        })
    }
}

impl GameResult {
    pub fn white_score(self) -> Option<Score> {
        Some(match self {
            GameResult::WhiteWins => Score::WIN,
            GameResult::BlackWins => Score::LOSS,
            GameResult::Draw => Score::DRAW,
            GameResult::Unknown => return None,
        })
    }

    pub fn score_for(self, side: Side) -> Option<Score> {
        self.white_score().map(|score| match side {
            Side::White => score,
            Side::Black => score.opposite(),
        })
    }
}

/// A finished game as handed over for scoring.
#[derive(Debug, Clone, Default)]
pub struct GameRecord {
    /// One sample per position, starting with the initial position.
    pub samples: Vec<EvaluationSample>,
    pub result: GameResult,
    pub white_rating: Option<i32>,
    pub black_rating: Option<i32>,
    /// Adjust Game Intelligence for opponent strength.
    pub weighted: bool,
    /// Remaining time of the mover after each ply.
    pub clock: Option<Vec<Option<Duration>>>,
    pub time_control: Option<TimeControl>,
}

impl GameRecord {
    pub fn new(samples: Vec<EvaluationSample>, result: GameResult) -> GameRecord {
        GameRecord {
            samples,
            result,
            ..GameRecord::default()
        }
    }

    #[must_use]
    pub fn with_ratings(mut self, white: Option<i32>, black: Option<i32>) -> GameRecord {
        self.white_rating = white;
        self.black_rating = black;
        self
    }

    #[must_use]
    pub fn weighted(mut self, weighted: bool) -> GameRecord {
        self.weighted = weighted;
        self
    }

    #[must_use]
    pub fn with_clock(
        mut self,
        readings: Vec<Option<Duration>>,
        time_control: Option<TimeControl>,
    ) -> GameRecord {
        self.clock = Some(readings);
        self.time_control = time_control;
        self
    }

    pub fn rating(&self, side: Side) -> Option<i32> {
        match side {
            Side::White => self.white_rating,
            Side::Black => self.black_rating,
        }
    }
}

/// The game has no move with an evaluation before and after it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("game is not analyzable: {samples} evaluation samples, at least 2 needed")]
pub struct NotAnalyzable {
    pub samples: usize,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveCounts {
    pub inaccuracies: u32,
    pub mistakes: u32,
    pub blunders: u32,
    pub critical: u32,
    pub deep_think: u32,
}

impl MoveCounts {
    fn count(&mut self, outcome: &PlyOutcome) {
        match outcome.classification {
            Some(Classification::Inaccuracy) => self.inaccuracies += 1,
            Some(Classification::Mistake) => self.mistakes += 1,
            Some(Classification::Blunder) => self.blunders += 1,
            None => (),
        }
        match outcome.time_flag {
            Some(TimeFlag::Critical) => self.critical += 1,
            Some(TimeFlag::DeepThink) => self.deep_think += 1,
            None => (),
        }
    }
}

#[derive(Debug, Copy, Clone, Default)]
struct SideTally {
    point_loss: f64,
    centipawn_loss: f64,
    plies: usize,
    counts: MoveCounts,
}

/// Quality metrics of one side in one game.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SideReport {
    /// Game point loss on the canonical 1/0.5/0 scale.
    pub gpl: f64,
    pub gpl_per_move: f64,
    /// Average centipawn loss.
    pub acpl: f64,
    /// Game Intelligence before rescaling (after rating adjustment, if any).
    pub gi_raw: f64,
    /// Game Intelligence on the reporting scale.
    pub gi: f64,
    pub gi_per_move: f64,
    /// Reported move count, including the configured offset for Black.
    pub moves: usize,
    pub counts: MoveCounts,
    /// Points from the game result, on the canonical scale.
    pub points: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameQualityReport {
    pub white: SideReport,
    pub black: SideReport,
    /// Blunders and long thinks, in game order.
    pub events: Vec<FlaggedEvent>,
    /// Whether think times could be reconstructed.
    pub timed: bool,
}

impl GameQualityReport {
    pub fn side(&self, side: Side) -> &SideReport {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }
}

/// Running totals over the moves of a game. Passed through the fold by
/// value.
#[derive(Debug, Clone)]
pub struct GameScoreAggregator {
    tallies: BySide<SideTally>,
    final_expected: ExpectedValue,
    events: Vec<FlaggedEvent>,
    timed: bool,
}

impl GameScoreAggregator {
    /// Starts from the expected value of the initial position.
    pub fn new(initial: ExpectedValue) -> GameScoreAggregator {
        GameScoreAggregator {
            tallies: BySide::default(),
            final_expected: initial,
            events: Vec::new(),
            timed: false,
        }
    }

    #[must_use]
    pub fn push(mut self, outcome: PlyOutcome) -> GameScoreAggregator {
        let tally = self.tallies.get_mut(outcome.mover);
        tally.point_loss += outcome.point_loss;
        tally.centipawn_loss += outcome.centipawn_loss;
        tally.plies += 1;
        tally.counts.count(&outcome);

        self.final_expected = outcome.expected_after;
        self.timed |= outcome.think_time.is_some();
        self.events.extend(outcome.events);
        self
    }

    pub fn finish(self, record: &GameRecord, config: &ScoringConfig) -> GameQualityReport {
        let report = |side: Side, tally: SideTally| {
            let payout = config.payout();

            // Points actually scored, or the engine's final assessment if the
            // game has no result.
            let target = match record.result.score_for(side) {
                Some(score) => payout.points(score),
                None => self.final_expected.for_side(side),
            };
            let mut gi_raw = payout.normalize(target - tally.point_loss);

            if record.weighted {
                if let (Some(_), Some(opponent)) =
                    (record.rating(side), record.rating(side.opposite()))
                {
                    gi_raw = adjust_for_opponent(
                        gi_raw,
                        RatingScalar::from(opponent),
                        config.reference_rating(),
                    );
                }
            }

            let moves = match side {
                Side::White => tally.plies,
                Side::Black => apply_offset(tally.plies, config.black_move_offset()),
            };
            let per_move = |total: f64| if moves > 0 { total / moves as f64 } else { 0.0 };

            let gpl = payout.normalize(tally.point_loss);
            let gi = config.normalization().apply(gi_raw);
            SideReport {
                gpl,
                gpl_per_move: per_move(gpl),
                acpl: if tally.plies > 0 {
                    tally.centipawn_loss / tally.plies as f64
                } else {
                    0.0
                },
                gi_raw,
                gi,
                gi_per_move: per_move(gi),
                moves,
                counts: tally.counts,
                points: record.result.score_for(side).map(Score::value),
            }
        };

        let BySide { white, black } = self.tallies.map(report);
        GameQualityReport {
            white,
            black,
            events: self.events,
            timed: self.timed,
        }
    }
}

fn apply_offset(count: usize, offset: i32) -> usize {
    if offset < 0 {
        count.saturating_sub(offset.unsigned_abs() as usize)
    } else {
        count + offset as usize
    }
}

/// Pulls Game Intelligence towards what it would be against an opponent of
/// the reference rating.
pub fn adjust_for_opponent(gi: f64, opponent: RatingScalar, reference: RatingScalar) -> f64 {
    let expected = opponent.expected_score(reference);
    gi - (1.0 - 2.0 * expected.value()) * gi.abs()
}

/// Scores a game with the probability model of the configured evaluation
/// source.
pub fn score_game(
    record: &GameRecord,
    config: &ScoringConfig,
) -> Result<GameQualityReport, NotAnalyzable> {
    score_game_with(record, config, &config.model())
}

/// Scores a game with an explicit probability model.
pub fn score_game_with<M: ProbabilityModel>(
    record: &GameRecord,
    config: &ScoringConfig,
    model: &M,
) -> Result<GameQualityReport, NotAnalyzable> {
    if record.samples.len() < 2 {
        let err = NotAnalyzable {
            samples: record.samples.len(),
        };
        tracing::debug!(%err, "skipping game");
        return Err(err);
    }

    let think_times = record.clock.as_deref().and_then(|readings| {
        let think_times = ClockDeltaReconstructor::new(record.time_control).think_times(readings);
        if think_times.is_none() {
            tracing::debug!("no clock readings, skipping think time reconstruction");
        }
        think_times
    });

    let scorer = PlyScorer::new(config, model);
    let aggregator = record.samples.windows(2).enumerate().fold(
        GameScoreAggregator::new(scorer.expected(&record.samples[0])),
        |aggregator, (ply, pair)| {
            let think_time = think_times
                .as_ref()
                .and_then(|times| times.get(ply).copied());
            aggregator.push(scorer.score(ply, &pair[0], &pair[1], think_time))
        },
    );

    Ok(aggregator.finish(record, config))
}
