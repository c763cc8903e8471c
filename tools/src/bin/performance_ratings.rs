use std::{error::Error as StdError, io};

use clap::Parser as _;
use ordered_float::OrderedFloat;
use quickgi::RatingScalar;
use quickgi_tools::{player::Leaderboard, report::ReportedGame, telemetry};
use serde::Serialize;
use tracing::{debug, info};

/// Reads game reports from stdin and prints the performance rating of every
/// player with at least one rated, finished game.
#[derive(clap::Parser)]
struct Opt {
    /// Only list players with at least this many counted games.
    #[clap(long, default_value = "1")]
    min_games: u32,
    #[clap(long, default_value = "info")]
    log_level: String,
}

#[derive(Serialize)]
struct PerformanceRow<'a> {
    player: &'a str,
    games: u32,
    points: f64,
    avg_opponent_rating: f64,
    performance: f64,
}

fn main() -> Result<(), Box<dyn StdError>> {
    let opt = Opt::parse();
    telemetry::init(&opt.log_level)?;

    let mut reader = csv::Reader::from_reader(io::stdin().lock());
    let mut leaderboard = Leaderboard::default();
    let mut games = 0u64;
    for game in reader.deserialize() {
        let game: ReportedGame = game?;
        leaderboard.record(&game);
        games += 1;
    }
    info!(games, players = leaderboard.players.len(), "tallied reports");

    let mut rows = Vec::new();
    for (id, tally) in leaderboard.tallies.iter() {
        if tally.games < opt.min_games.max(1) {
            continue;
        }
        let (Some(RatingScalar(avg_opponent_rating)), Ok(RatingScalar(performance))) =
            (tally.avg_opponent_rating(), tally.performance())
        else {
            debug!(player = leaderboard.players.name(id), "no performance rating");
            continue;
        };
        rows.push(PerformanceRow {
            player: leaderboard.players.name(id),
            games: tally.games,
            points: tally.points,
            avg_opponent_rating,
            performance,
        });
    }
    rows.sort_by_key(|row| OrderedFloat(-row.performance));

    let mut writer = csv::Writer::from_writer(io::stdout().lock());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
