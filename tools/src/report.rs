use quickgi::{
    score_game, EventKind, FlaggedEvent, GameQualityReport, GameResult, NotAnalyzable,
    ScoringConfig, Side,
};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};

use crate::record::Game;

/// Scores a batch of games in parallel. Results are in input order.
pub fn score_batch(
    games: &[Game],
    config: &ScoringConfig,
) -> Vec<Result<GameQualityReport, NotAnalyzable>> {
    games
        .par_iter()
        .map(|game| score_game(&game.record, config))
        .collect()
}

/// Per-side columns of the report, flattened by hand since CSV rows cannot
/// nest.
#[derive(Serialize, Debug)]
pub struct ReportRow<'a> {
    pub game_id: &'a str,
    pub white: &'a str,
    pub black: &'a str,
    pub result: String,
    pub white_elo: Option<i32>,
    pub black_elo: Option<i32>,
    pub white_points: Option<f64>,
    pub black_points: Option<f64>,
    pub white_moves: usize,
    pub black_moves: usize,
    pub white_gpl: f64,
    pub black_gpl: f64,
    pub white_gpl_per_move: f64,
    pub black_gpl_per_move: f64,
    pub white_acpl: f64,
    pub black_acpl: f64,
    pub white_gi_raw: f64,
    pub black_gi_raw: f64,
    pub white_gi: f64,
    pub black_gi: f64,
    pub white_gi_per_move: f64,
    pub black_gi_per_move: f64,
    pub white_inaccuracies: u32,
    pub black_inaccuracies: u32,
    pub white_mistakes: u32,
    pub black_mistakes: u32,
    pub white_blunders: u32,
    pub black_blunders: u32,
    pub white_critical: u32,
    pub black_critical: u32,
    pub white_deep_think: u32,
    pub black_deep_think: u32,
}

impl<'a> ReportRow<'a> {
    pub fn new(game: &'a Game, report: &GameQualityReport) -> ReportRow<'a> {
        let (w, b) = (&report.white, &report.black);
        ReportRow {
            game_id: &game.id,
            white: &game.white,
            black: &game.black,
            result: game.record.result.to_string(),
            white_elo: game.record.white_rating,
            black_elo: game.record.black_rating,
            white_points: w.points,
            black_points: b.points,
            white_moves: w.moves,
            black_moves: b.moves,
            white_gpl: w.gpl,
            black_gpl: b.gpl,
            white_gpl_per_move: w.gpl_per_move,
            black_gpl_per_move: b.gpl_per_move,
            white_acpl: w.acpl,
            black_acpl: b.acpl,
            white_gi_raw: w.gi_raw,
            black_gi_raw: b.gi_raw,
            white_gi: w.gi,
            black_gi: b.gi,
            white_gi_per_move: w.gi_per_move,
            black_gi_per_move: b.gi_per_move,
            white_inaccuracies: w.counts.inaccuracies,
            black_inaccuracies: b.counts.inaccuracies,
            white_mistakes: w.counts.mistakes,
            black_mistakes: b.counts.mistakes,
            white_blunders: w.counts.blunders,
            black_blunders: b.counts.blunders,
            white_critical: w.counts.critical,
            black_critical: b.counts.critical,
            white_deep_think: w.counts.deep_think,
            black_deep_think: b.counts.deep_think,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct EventRow<'a> {
    pub game_id: &'a str,
    pub kind: &'static str,
    pub side: &'static str,
    pub player: &'a str,
    pub ply: usize,
    pub move_number: usize,
    pub fen: Option<&'a str>,
    pub previous_move: Option<&'a str>,
    pub flagged_move: Option<&'a str>,
    pub think_time: Option<f64>,
    pub point_loss: f64,
}

impl<'a> EventRow<'a> {
    pub fn new(game: &'a Game, event: &'a FlaggedEvent) -> EventRow<'a> {
        EventRow {
            game_id: &game.id,
            kind: match event.kind {
                EventKind::Blunder => "blunder",
                EventKind::Critical => "critical",
                EventKind::DeepThink => "deep_think",
            },
            side: match event.mover {
                Side::White => "white",
                Side::Black => "black",
            },
            player: match event.mover {
                Side::White => &game.white,
                Side::Black => &game.black,
            },
            ply: event.ply,
            move_number: event.move_number,
            fen: event.fen.as_deref(),
            previous_move: event.previous_move.as_deref(),
            flagged_move: event.flagged_move.as_deref(),
            think_time: event.think_time.map(|t| t.as_secs_f64()),
            point_loss: event.point_loss,
        }
    }
}

/// The columns of a report row needed to tally results per player.
#[serde_as]
#[derive(Deserialize, Debug, Clone)]
pub struct ReportedGame {
    pub white: String,
    pub black: String,
    #[serde_as(as = "DisplayFromStr")]
    pub result: GameResult,
    pub white_elo: Option<i32>,
    pub black_elo: Option<i32>,
    pub white_points: Option<f64>,
    pub black_points: Option<f64>,
}
