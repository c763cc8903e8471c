use std::str::FromStr;

use thiserror::Error;

use crate::{Score, Side, Wdl};

/// Points awarded for a win, a draw and a loss.
///
/// All derived quantities are divided by the win value, so proportional
/// schemes such as 3/1.5/0 and 1/0.5/0 produce identical reports.
#[derive(Debug, Copy, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PayoutScheme {
    win: f64,
    draw: f64,
    loss: f64,
}

#[derive(Debug, Error, Clone, PartialEq)]
#[error("invalid payout scheme {win}/{draw}/{loss} (expected win > loss >= 0)")]
pub struct InvalidPayoutScheme {
    pub win: f64,
    pub draw: f64,
    pub loss: f64,
}

impl Default for PayoutScheme {
    fn default() -> PayoutScheme {
        PayoutScheme::STANDARD
    }
}

impl PayoutScheme {
    pub const STANDARD: PayoutScheme = PayoutScheme {
        win: 1.0,
        draw: 0.5,
        loss: 0.0,
    };

    pub fn new(win: f64, draw: f64, loss: f64) -> Result<PayoutScheme, InvalidPayoutScheme> {
        if win.is_finite() && draw.is_finite() && loss >= 0.0 && win > loss {
            Ok(PayoutScheme { win, draw, loss })
        } else {
            Err(InvalidPayoutScheme { win, draw, loss })
        }
    }

    pub fn win(&self) -> f64 {
        self.win
    }

    pub fn draw(&self) -> f64 {
        self.draw
    }

    pub fn loss(&self) -> f64 {
        self.loss
    }

    /// Points for a game result with the given canonical score.
    pub fn points(&self, score: Score) -> f64 {
        if score == Score::WIN {
            self.win
        } else if score == Score::LOSS {
            self.loss
        } else {
            self.draw
        }
    }

    /// Rescales points in this scheme to the canonical 1/0.5/0 scale.
    #[inline]
    pub fn normalize(&self, points: f64) -> f64 {
        points / self.win
    }

    /// Expected points for both sides in a position.
    pub fn expected(&self, wdl: Wdl) -> ExpectedValue {
        ExpectedValue {
            white: wdl.win * self.win + wdl.draw * self.draw + wdl.loss * self.loss,
            black: wdl.loss * self.win + wdl.draw * self.draw + wdl.win * self.loss,
        }
    }
}

impl FromStr for PayoutScheme {
    type Err = InvalidPayoutScheme;

    /// Parses `win,draw,loss`, for example `3,1.25,0`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = InvalidPayoutScheme {
            win: f64::NAN,
            draw: f64::NAN,
            loss: f64::NAN,
        };
        let mut parts = s.split(',').map(|part| part.trim().parse::<f64>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(win)), Some(Ok(draw)), Some(Ok(loss)), None) => {
                PayoutScheme::new(win, draw, loss)
            }
            _ => Err(invalid),
        }
    }
}

/// Expected points of both sides in a position, in payout scheme units.
///
/// This is the only place that decides whose point of view a value is
/// seen from.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ExpectedValue {
    pub white: f64,
    pub black: f64,
}

impl ExpectedValue {
    #[inline]
    pub fn for_side(&self, side: Side) -> f64 {
        match side {
            Side::White => self.white,
            Side::Black => self.black,
        }
    }

    /// Points `side` gave away by going from `self` to `after`. Negative if
    /// the position improved for `side`.
    #[inline]
    pub fn loss_for(&self, side: Side, after: &ExpectedValue) -> f64 {
        self.for_side(side) - after.for_side(side)
    }
}

/// Orients a White-relative scalar (such as a pawn evaluation) towards
/// `side`.
#[inline]
pub fn orient(side: Side, white_relative: f64) -> f64 {
    match side {
        Side::White => white_relative,
        Side::Black => -white_relative,
    }
}
