use std::time::Duration;

use crate::{
    clock::full_move_number,
    config::{ClassificationThresholds, TimeFlagThresholds},
    payout::orient,
    EvaluationSample, ExpectedValue, ProbabilityModel, ScoringConfig, Side,
};

/// Move quality class, by point loss.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Classification {
    Inaccuracy,
    Mistake,
    Blunder,
}

impl ClassificationThresholds {
    /// Classifies a point loss given as a fraction of the win value.
    pub fn classify(&self, relative_loss: f64) -> Option<Classification> {
        if relative_loss >= self.blunder() {
            Some(Classification::Blunder)
        } else if relative_loss >= self.mistake() {
            Some(Classification::Mistake)
        } else if relative_loss >= self.inaccuracy() {
            Some(Classification::Inaccuracy)
        } else {
            None
        }
    }
}

/// Long think on a single move.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TimeFlag {
    Critical,
    DeepThink,
}

impl TimeFlagThresholds {
    pub fn flag(&self, think_time: Duration) -> Option<TimeFlag> {
        if think_time >= self.deep_think {
            Some(TimeFlag::DeepThink)
        } else if think_time >= self.critical {
            Some(TimeFlag::Critical)
        } else {
            None
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventKind {
    Blunder,
    Critical,
    DeepThink,
}

impl From<TimeFlag> for EventKind {
    fn from(flag: TimeFlag) -> EventKind {
        match flag {
            TimeFlag::Critical => EventKind::Critical,
            TimeFlag::DeepThink => EventKind::DeepThink,
        }
    }
}

/// A blunder or long think, with enough board context to inspect it later.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FlaggedEvent {
    pub kind: EventKind,
    pub mover: Side,
    pub ply: usize,
    pub move_number: usize,
    /// Position before the flagged move.
    pub fen: Option<String>,
    pub previous_move: Option<String>,
    pub flagged_move: Option<String>,
    pub think_time: Option<Duration>,
    /// Point loss on the canonical 1/0.5/0 scale. Never negative for time
    /// events.
    pub point_loss: f64,
}

/// Assessment of a single move.
#[derive(Debug, Clone, PartialEq)]
pub struct PlyOutcome {
    pub ply: usize,
    pub mover: Side,
    /// Expected points the mover gave away, in payout scheme units. Negative
    /// if the move improved the mover's prospects.
    pub point_loss: f64,
    pub centipawn_loss: f64,
    pub classification: Option<Classification>,
    pub think_time: Option<Duration>,
    pub time_flag: Option<TimeFlag>,
    /// Expected points of both sides after the move.
    pub expected_after: ExpectedValue,
    pub events: Vec<FlaggedEvent>,
}

/// Scores individual moves from the evaluations before and after them.
#[derive(Debug, Copy, Clone)]
pub struct PlyScorer<'a, M> {
    config: &'a ScoringConfig,
    model: &'a M,
}

impl<'a, M: ProbabilityModel> PlyScorer<'a, M> {
    pub fn new(config: &'a ScoringConfig, model: &'a M) -> PlyScorer<'a, M> {
        PlyScorer { config, model }
    }

    pub fn expected(&self, sample: &EvaluationSample) -> ExpectedValue {
        self.config.payout().expected(self.model.wdl(sample))
    }

    /// Scores the move with zero-based index `ply`, which leads from
    /// `before` to `after`.
    pub fn score(
        &self,
        ply: usize,
        before: &EvaluationSample,
        after: &EvaluationSample,
        think_time: Option<Duration>,
    ) -> PlyOutcome {
        let mover = Side::of_ply(ply);
        let payout = self.config.payout();

        let expected_after = self.expected(after);
        let point_loss = self.expected(before).loss_for(mover, &expected_after);

        let centipawn_loss = match (self.model.pawns(before), self.model.pawns(after)) {
            (Some(before), Some(after)) => 100.0 * (orient(mover, before) - orient(mover, after)),
            _ => 0.0,
        };

        let classification = self
            .config
            .thresholds()
            .get(mover)
            .classify(payout.normalize(point_loss));
        let time_flag = think_time.and_then(|t| self.config.time_flags().flag(t));

        let mut events = Vec::new();
        let mut record = |kind: EventKind, point_loss: f64| {
            let event = FlaggedEvent {
                kind,
                mover,
                ply,
                move_number: full_move_number(ply),
                fen: before.fen.clone(),
                previous_move: before.last_move.clone(),
                flagged_move: after.last_move.clone(),
                think_time,
                point_loss,
            };
            tracing::trace!(kind = ?event.kind, ply, mover = %mover, point_loss, "flagged move");
            events.push(event);
        };
        if classification == Some(Classification::Blunder) {
            record(EventKind::Blunder, payout.normalize(point_loss));
        }
        if let Some(flag) = time_flag {
            record(flag.into(), payout.normalize(point_loss).max(0.0));
        }

        PlyOutcome {
            ply,
            mover,
            point_loss,
            centipawn_loss,
            classification,
            think_time,
            time_flag,
            expected_after,
            events,
        }
    }
}
