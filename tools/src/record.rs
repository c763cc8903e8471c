use std::{str::FromStr, time::Duration};

use chrono::{NaiveTime, Timelike as _};
use quickgi::{EvaluationSample, GameRecord, GameResult, TimeControl, Wdl};
use serde::Deserialize;
use serde_with::{serde_as, DisplayFromStr};
use thiserror::Error;

/// One row of the per-ply input table. The row with `ply` 0 describes the
/// initial position, the row with `ply` k the position after the k-th move.
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct RawPly {
    pub game_id: String,
    pub white: String,
    pub black: String,
    #[serde_as(as = "DisplayFromStr")]
    pub result: GameResult,
    pub white_elo: Option<i32>,
    pub black_elo: Option<i32>,
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub time_control: Option<TimeControl>,
    pub ply: usize,
    pub eval: Option<f64>,
    pub wdl_win: Option<f64>,
    pub wdl_draw: Option<f64>,
    pub wdl_loss: Option<f64>,
    /// Remaining time of the side that just moved.
    #[serde_as(as = "Option<DisplayFromStr>")]
    pub clock: Option<ClockReading>,
    pub fen: Option<String>,
    #[serde(rename = "move")]
    pub last_move: Option<String>,
}

impl RawPly {
    fn wdl(&self) -> Option<Wdl> {
        match (self.wdl_win, self.wdl_draw, self.wdl_loss) {
            (Some(win), Some(draw), Some(loss)) => Some(Wdl::new(win, draw, loss)),
            _ => None,
        }
    }
}

/// Remaining time on a clock, written as `[h:]mm:ss[.fff]` or as plain
/// seconds.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ClockReading(pub Duration);

#[derive(Debug, Error)]
#[error("invalid clock reading")]
pub struct InvalidClockReading;

impl FromStr for ClockReading {
    type Err = InvalidClockReading;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if !s.contains(':') {
            let seconds = s.parse::<f64>().map_err(|_| InvalidClockReading)?;
            return Duration::try_from_secs_f64(seconds)
                .map(ClockReading)
                .map_err(|_| InvalidClockReading);
        }

        let time = match s.matches(':').count() {
            1 => NaiveTime::parse_from_str(&format!("0:{s}"), "%H:%M:%S%.f"),
            2 => NaiveTime::parse_from_str(s, "%H:%M:%S%.f"),
            _ => return Err(InvalidClockReading),
        }
        .map_err(|_| InvalidClockReading)?;

        Ok(ClockReading(Duration::new(
            u64::from(time.num_seconds_from_midnight()),
            time.nanosecond(),
        )))
    }
}

/// A game assembled from consecutive rows with the same `game_id`.
#[derive(Debug, Clone)]
pub struct Game {
    pub id: String,
    pub white: String,
    pub black: String,
    pub record: GameRecord,
}

impl Game {
    /// Builds a game from its rows. Missing evaluations are carried forward
    /// from the previous position. An initial position without evaluation
    /// takes the first evaluation that is available.
    pub fn from_rows(mut rows: Vec<RawPly>, weighted: bool) -> Option<Game> {
        rows.sort_by_key(|row| row.ply);
        let first = rows.first()?;

        let (id, white, black) = (first.game_id.clone(), first.white.clone(), first.black.clone());
        let result = first.result;
        let (white_elo, black_elo) = (first.white_elo, first.black_elo);
        let time_control = first.time_control;

        let mut eval = rows.iter().find_map(|row| row.eval);
        let mut wdl = rows.iter().find_map(RawPly::wdl);
        let mut samples = Vec::with_capacity(rows.len());
        let mut clock = Vec::with_capacity(rows.len());
        for row in rows {
            eval = row.eval.or(eval);
            wdl = row.wdl().or(wdl);
            if row.ply > 0 {
                clock.push(row.clock.map(|ClockReading(remaining)| remaining));
            }
            samples.push(EvaluationSample {
                eval,
                wdl,
                fen: row.fen,
                last_move: row.last_move,
            });
        }

        let mut record = GameRecord::new(samples, result)
            .with_ratings(white_elo, black_elo)
            .weighted(weighted);
        if clock.iter().any(Option::is_some) {
            record = record.with_clock(clock, time_control);
        }

        Some(Game {
            id,
            white,
            black,
            record,
        })
    }
}

/// Collects consecutive rows into games.
#[derive(Debug, Default)]
pub struct GameGrouper {
    rows: Vec<RawPly>,
    weighted: bool,
}

impl GameGrouper {
    pub fn new(weighted: bool) -> GameGrouper {
        GameGrouper {
            rows: Vec::new(),
            weighted,
        }
    }

    /// Adds a row, returning the previous game if this row starts a new one.
    pub fn push(&mut self, row: RawPly) -> Option<Game> {
        let finished = match self.rows.last() {
            Some(last) if last.game_id != row.game_id => self.finish(),
            _ => None,
        };
        self.rows.push(row);
        finished
    }

    pub fn finish(&mut self) -> Option<Game> {
        Game::from_rows(std::mem::take(&mut self.rows), self.weighted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INPUT: &str = "\
game_id,white,black,result,white_elo,black_elo,time_control,ply,eval,wdl_win,wdl_draw,wdl_loss,clock,fen,move
g1,Alice,Bob,1-0,2700,2650,90+30+30/40,0,,,,,,startpos,
g1,Alice,Bob,1-0,2700,2650,90+30+30/40,1,0.3,,,,1:29:30,fen1,e4
g1,Alice,Bob,1-0,2700,2650,90+30+30/40,2,,,,,1:28:00,fen2,e5
g1,Alice,Bob,1-0,2700,2650,90+30+30/40,3,1.2,,,,1:20:00,fen3,Nf3
g2,Carol,Dave,*,,2500,,0,,0.2,0.6,0.2,,startpos,
g2,Carol,Dave,*,,2500,,1,,0.1,0.6,0.3,,fen1,d4
";

    fn games() -> Vec<Game> {
        let mut reader = csv::Reader::from_reader(INPUT.as_bytes());
        let mut grouper = GameGrouper::new(false);
        let mut games = Vec::new();
        for row in reader.deserialize() {
            let row: RawPly = row.unwrap();
            games.extend(grouper.push(row));
        }
        games.extend(grouper.finish());
        games
    }

    #[test]
    fn test_parse_clock_reading() {
        let secs = |s: u64| ClockReading(Duration::from_secs(s));
        assert_eq!("1:29:30".parse::<ClockReading>().unwrap(), secs(5370));
        assert_eq!("05:07".parse::<ClockReading>().unwrap(), secs(307));
        assert_eq!("42".parse::<ClockReading>().unwrap(), secs(42));
        assert_eq!(
            "0:00:01.5".parse::<ClockReading>().unwrap(),
            ClockReading(Duration::from_millis(1500))
        );
        assert!("-3".parse::<ClockReading>().is_err());
        assert!("1:2:3:4".parse::<ClockReading>().is_err());
        assert!("soon".parse::<ClockReading>().is_err());
    }

    #[test]
    fn test_grouping() {
        let games = games();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].id, "g1");
        assert_eq!(games[0].record.samples.len(), 4);
        assert_eq!(games[0].record.result, GameResult::WhiteWins);
        assert_eq!(games[0].record.black_rating, Some(2650));
        assert_eq!(games[1].white, "Carol");
        assert_eq!(games[1].record.white_rating, None);
        assert_eq!(games[1].record.result, GameResult::Unknown);
    }

    #[test]
    fn test_evaluations_are_carried_forward() {
        let games = games();
        let evals = games[0]
            .record
            .samples
            .iter()
            .map(|sample| sample.eval)
            .collect::<Vec<_>>();
        assert_eq!(evals, vec![Some(0.3), Some(0.3), Some(0.3), Some(1.2)]);
        assert_eq!(games[0].record.samples[3].last_move.as_deref(), Some("Nf3"));

        assert_eq!(games[1].record.samples[1].wdl, Some(Wdl::new(0.1, 0.6, 0.3)));
    }

    #[test]
    fn test_clock_readings() {
        let games = games();
        let clock = games[0].record.clock.as_ref().unwrap();
        assert_eq!(
            *clock,
            vec![
                Some(Duration::from_secs(5370)),
                Some(Duration::from_secs(5280)),
                Some(Duration::from_secs(4800)),
            ]
        );
        assert_eq!(
            games[0].record.time_control.map(|tc| tc.to_string()),
            Some("90+30+30/40".to_owned())
        );
        assert!(games[1].record.clock.is_none());
    }
}
