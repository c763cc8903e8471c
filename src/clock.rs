//! Think time reconstruction from remaining-time clock readings.

use std::{fmt, str::FromStr, time::Duration};

use thiserror::Error;

use crate::Side;

const MINUTE: Duration = Duration::from_secs(60);

/// Classical time control with an increment per move and an optional
/// periodic bonus, such as 90 minutes plus 30 minutes after move 40, with 30
/// seconds per move from move one.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeControl {
    pub base: Duration,
    /// Added once the move count trigger is reached.
    pub bonus: Duration,
    /// Added after every move.
    pub increment: Duration,
    /// Full-move number after which the bonus is added. If unknown, a bonus
    /// is assumed whenever a clock reading grows by more than the increment.
    pub bonus_after_move: Option<u32>,
}

#[derive(Debug, Error)]
#[error("invalid time control")]
pub struct InvalidTimeControl;

impl FromStr for TimeControl {
    type Err = InvalidTimeControl;

    /// Parses `base+bonus+increment[/move]` (minutes, minutes, seconds, full
    /// move number), or `base+increment` (minutes, seconds) without a
    /// periodic bonus.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (clock, trigger) = match s.split_once('/') {
            Some((clock, trigger)) => (
                clock,
                Some(trigger.trim().parse().map_err(|_| InvalidTimeControl)?),
            ),
            None => (s, None),
        };

        let parts = clock
            .split('+')
            .map(|part| part.trim().parse::<u32>().map_err(|_| InvalidTimeControl))
            .collect::<Result<Vec<_>, _>>()?;

        let (base, bonus, increment) = match *parts.as_slice() {
            [base, increment] if trigger.is_none() => (base, 0, increment),
            [base, bonus, increment] => (base, bonus, increment),
            _ => return Err(InvalidTimeControl),
        };

        Ok(TimeControl {
            base: MINUTE * base,
            bonus: MINUTE * bonus,
            increment: Duration::from_secs(u64::from(increment)),
            bonus_after_move: trigger,
        })
    }
}

impl fmt::Display for TimeControl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}+{}+{}",
            self.base.as_secs() / 60,
            self.bonus.as_secs() / 60,
            self.increment.as_secs()
        )?;
        if let Some(trigger) = self.bonus_after_move {
            write!(f, "/{trigger}")?;
        }
        Ok(())
    }
}

impl TimeControl {
    /// Whether the bonus is known to be added after the move with the given
    /// ply index.
    fn bonus_due(&self, ply: usize) -> bool {
        !self.bonus.is_zero()
            && self
                .bonus_after_move
                .is_some_and(|trigger| full_move_number(ply) == trigger as usize)
    }

    /// Whether a grown clock may be explained by the bonus, when it is not
    /// known after which move the bonus is added.
    fn bonus_guessed(&self) -> bool {
        !self.bonus.is_zero() && self.bonus_after_move.is_none()
    }
}

/// Full-move number of the move with the given zero-based ply index.
#[inline]
pub fn full_move_number(ply: usize) -> usize {
    ply / 2 + 1
}

#[inline]
fn abs_diff(a: Duration, b: Duration) -> Duration {
    if a >= b {
        a - b
    } else {
        b - a
    }
}

/// Converts per-ply remaining-time readings into per-ply think times.
///
/// `readings[k]` is the mover's remaining time after ply `k`. Missing
/// readings are carried forward from the same side's previous reading, so
/// that later plies can still be measured.
#[derive(Debug, Copy, Clone, Default)]
pub struct ClockDeltaReconstructor {
    time_control: TimeControl,
}

impl ClockDeltaReconstructor {
    /// Without a time control, neither increment nor bonus is added back.
    pub fn new(time_control: Option<TimeControl>) -> ClockDeltaReconstructor {
        ClockDeltaReconstructor {
            time_control: time_control.unwrap_or_default(),
        }
    }

    /// Think time for every ply, or `None` if the game has no clock readings
    /// at all.
    pub fn think_times(&self, readings: &[Option<Duration>]) -> Option<Vec<Duration>> {
        if readings.iter().all(Option::is_none) {
            return None;
        }

        let filled = fill_forward(readings);
        Some(
            (0..readings.len())
                .map(|ply| {
                    if readings[ply].is_none() {
                        Duration::ZERO
                    } else {
                        self.think_time(&filled, ply)
                    }
                })
                .collect(),
        )
    }

    fn think_time(&self, filled: &[Option<Duration>], ply: usize) -> Duration {
        if ply < 2 {
            return Duration::ZERO;
        }
        let (Some(previous), Some(current)) = (filled[ply - 2], filled[ply]) else {
            return Duration::ZERO;
        };

        let credited = previous.saturating_add(self.time_control.increment);
        let with_bonus = credited.saturating_add(self.time_control.bonus);
        if self.time_control.bonus_due(ply) {
            abs_diff(with_bonus, current)
        } else if current <= credited {
            credited - current
        } else if self.time_control.bonus_guessed() {
            // The clock grew by more than the increment: the bonus was added.
            abs_diff(with_bonus, current)
        } else {
            current - credited
        }
    }
}

/// Replaces missing readings with the same side's most recent known reading.
fn fill_forward(readings: &[Option<Duration>]) -> Vec<Option<Duration>> {
    let mut last = [None; 2];
    readings
        .iter()
        .enumerate()
        .map(|(ply, reading)| {
            let slot = &mut last[Side::of_ply(ply) as usize];
            if reading.is_some() {
                *slot = *reading;
            }
            *slot
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mins(m: u64) -> Option<Duration> {
        Some(Duration::from_secs(60 * m))
    }

    fn classical() -> TimeControl {
        "90+30+30/40".parse().unwrap()
    }

    #[test]
    fn test_parse_time_control() {
        let tc = classical();
        assert_eq!(tc.base, Duration::from_secs(90 * 60));
        assert_eq!(tc.bonus, Duration::from_secs(30 * 60));
        assert_eq!(tc.increment, Duration::from_secs(30));
        assert_eq!(tc.bonus_after_move, Some(40));
        assert_eq!(tc.to_string(), "90+30+30/40");

        let rapid: TimeControl = "15+10".parse().unwrap();
        assert_eq!(rapid.bonus, Duration::ZERO);
        assert_eq!(rapid.increment, Duration::from_secs(10));

        assert!("15".parse::<TimeControl>().is_err());
        assert!("15+10/40".parse::<TimeControl>().is_err());
        assert!("a+b+c".parse::<TimeControl>().is_err());
    }

    #[test]
    fn test_no_readings() {
        let reconstructor = ClockDeltaReconstructor::new(Some(classical()));
        assert_eq!(reconstructor.think_times(&[None, None, None]), None);
        assert_eq!(reconstructor.think_times(&[]), None);
    }

    #[test]
    fn test_first_two_plies_are_zero() {
        let reconstructor = ClockDeltaReconstructor::new(None);
        let times = reconstructor.think_times(&[mins(80), mins(70)]).unwrap();
        assert_eq!(times, vec![Duration::ZERO, Duration::ZERO]);
    }

    #[test]
    fn test_increment_is_added_back() {
        let reconstructor = ClockDeltaReconstructor::new(Some(classical()));
        let readings = [mins(90), mins(90), mins(80), mins(85)];
        let times = reconstructor.think_times(&readings).unwrap();
        assert_eq!(times[2], Duration::from_secs(10 * 60 + 30));
        assert_eq!(times[3], Duration::from_secs(5 * 60 + 30));
    }

    #[test]
    fn test_bonus_is_added_back() {
        let reconstructor = ClockDeltaReconstructor::new(Some(classical()));
        // White's 40th move is ply 78. 20 minutes left before it, 45 after.
        let mut readings = vec![None; 80];
        readings[76] = mins(20);
        readings[78] = mins(45);
        let times = reconstructor.think_times(&readings).unwrap();
        assert_eq!(times[78], Duration::from_secs(5 * 60 + 30));
    }

    #[test]
    fn test_bonus_is_credited_when_clock_drops() {
        let reconstructor = ClockDeltaReconstructor::new(Some(classical()));
        // 35 minutes spent on move 40, more than the bonus it earned.
        let mut readings = vec![None; 80];
        readings[76] = mins(40);
        readings[78] = Some(Duration::from_secs(35 * 60 + 30));
        let times = reconstructor.think_times(&readings).unwrap();
        assert_eq!(times[78], Duration::from_secs(35 * 60));
    }

    #[test]
    fn test_bonus_only_on_trigger_move() {
        let reconstructor = ClockDeltaReconstructor::new(Some(classical()));
        // Move 41 for White: the bonus was already credited on move 40.
        let mut readings = vec![None; 82];
        readings[78] = mins(20);
        readings[80] = mins(50);
        let times = reconstructor.think_times(&readings).unwrap();
        assert_eq!(times[80], Duration::from_secs(30 * 60 - 30));
    }

    #[test]
    fn test_bonus_guessed_without_trigger() {
        let tc: TimeControl = "90+30+30".parse().unwrap();
        let reconstructor = ClockDeltaReconstructor::new(Some(tc));
        let readings = [mins(30), mins(30), mins(50)];
        let times = reconstructor.think_times(&readings).unwrap();
        assert_eq!(times[2], Duration::from_secs(10 * 60 + 30));
    }

    #[test]
    fn test_huge_readings_do_not_overflow() {
        let reconstructor = ClockDeltaReconstructor::new(Some("90+30+30".parse().unwrap()));
        let readings = [Some(Duration::MAX), Some(Duration::MAX), Some(Duration::MAX)];
        let times = reconstructor.think_times(&readings).unwrap();
        assert_eq!(times[2], Duration::ZERO);
    }

    #[test]
    fn test_bonus_not_before_trigger() {
        let reconstructor = ClockDeltaReconstructor::new(Some(classical()));
        let readings = [mins(30), mins(30), mins(40)];
        let times = reconstructor.think_times(&readings).unwrap();
        // Out of order readings yield the absolute difference.
        assert_eq!(times[2], Duration::from_secs(10 * 60 - 30));
    }

    #[test]
    fn test_missing_readings_are_filled_forward() {
        let reconstructor = ClockDeltaReconstructor::new(None);
        let readings = [mins(90), mins(90), None, mins(88), mins(60)];
        let times = reconstructor.think_times(&readings).unwrap();
        assert_eq!(times[2], Duration::ZERO);
        assert_eq!(times[3], Duration::from_secs(2 * 60));
        // Measured against White's last known reading at ply 0.
        assert_eq!(times[4], Duration::from_secs(30 * 60));
    }
}
