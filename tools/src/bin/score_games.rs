use std::{error::Error as StdError, fs::File, io, path::PathBuf, time::Duration};

use clap::Parser as _;
use quickgi::{
    ClassificationThresholds, EvalSource, GiNormalization, PayoutScheme, RatingScalar,
    ScoringConfig, TimeFlagThresholds,
};
use quickgi_tools::{
    record::{Game, GameGrouper, RawPly},
    report::{score_batch, EventRow, ReportRow},
    telemetry,
};
use tracing::{info, warn};

#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

/// Scores engine-annotated games read as per-ply CSV rows from stdin, and
/// writes one report row per game to stdout.
#[derive(clap::Parser)]
struct Opt {
    /// Evaluation source the games were annotated with (stockfish or lc0).
    #[clap(long, default_value = "stockfish")]
    source: EvalSource,
    /// Points for win, draw and loss.
    #[clap(long, default_value = "1,0.5,0")]
    payout: PayoutScheme,
    /// Inaccuracy, mistake and blunder thresholds for White, as fractions of
    /// the win value. Defaults depend on the source.
    #[clap(long)]
    white_thresholds: Option<ClassificationThresholds>,
    #[clap(long)]
    black_thresholds: Option<ClassificationThresholds>,
    /// Think time in seconds that makes a move critical.
    #[clap(long, default_value = "900")]
    critical_seconds: u64,
    #[clap(long, default_value = "1800")]
    deep_think_seconds: u64,
    #[clap(long, default_value = "157.57")]
    gi_offset: f64,
    #[clap(long, default_value = "18.55")]
    gi_scale: f64,
    /// Adjust Game Intelligence for opponent strength relative to this rating.
    #[clap(long)]
    weighted: bool,
    #[clap(long, default_value = "2800")]
    reference_rating: f64,
    /// Evaluations are capped at this many pawns.
    #[clap(long, default_value = "100")]
    eval_cap: f64,
    #[clap(long, default_value = "30")]
    model_ply: u32,
    /// Added to the reported number of moves of Black. Defaults depend on the
    /// source.
    #[clap(long, allow_hyphen_values = true)]
    black_move_offset: Option<i32>,
    #[clap(long, default_value = "10000")]
    batch_size: usize,
    /// Also write flagged moves to this CSV file.
    #[clap(long)]
    events: Option<PathBuf>,
    #[clap(long, default_value = "info")]
    log_level: String,
}

impl Opt {
    fn config(&self) -> Result<ScoringConfig, Box<dyn StdError>> {
        if !(self.eval_cap > 0.0 && self.eval_cap.is_finite()) {
            return Err("--eval-cap must be positive".into());
        }
        if !(self.gi_offset.is_finite() && self.gi_scale.is_finite()) {
            return Err("--gi-offset and --gi-scale must be finite".into());
        }
        if !self.reference_rating.is_finite() {
            return Err("--reference-rating must be finite".into());
        }
        if self.critical_seconds > self.deep_think_seconds {
            return Err("--critical-seconds must not exceed --deep-think-seconds".into());
        }

        let mut builder = ScoringConfig::builder(self.source);
        builder
            .payout(self.payout)
            .time_flags(TimeFlagThresholds {
                critical: Duration::from_secs(self.critical_seconds),
                deep_think: Duration::from_secs(self.deep_think_seconds),
            })
            .normalization(GiNormalization {
                offset: self.gi_offset,
                scale: self.gi_scale,
            })
            .reference_rating(RatingScalar(self.reference_rating))
            .eval_cap(self.eval_cap)
            .model_ply(self.model_ply);
        if let Some(thresholds) = self.white_thresholds {
            builder.white_thresholds(thresholds);
        }
        if let Some(thresholds) = self.black_thresholds {
            builder.black_thresholds(thresholds);
        }
        if let Some(offset) = self.black_move_offset {
            builder.black_move_offset(offset);
        }
        Ok(builder.build())
    }
}

struct Output<W: io::Write> {
    report: csv::Writer<W>,
    events: Option<csv::Writer<File>>,
    scored: u64,
    skipped: u64,
}

impl<W: io::Write> Output<W> {
    fn batch(&mut self, games: &mut Vec<Game>, config: &ScoringConfig) -> Result<(), csv::Error> {
        let results = score_batch(games, config);

        for (game, result) in games.iter().zip(results) {
            match result {
                Ok(report) => {
                    self.report.serialize(ReportRow::new(game, &report))?;
                    if let Some(events) = &mut self.events {
                        for event in &report.events {
                            events.serialize(EventRow::new(game, event))?;
                        }
                    }
                    self.scored += 1;
                }
                Err(err) => {
                    warn!(game_id = %game.id, %err, "skipping game");
                    self.skipped += 1;
                }
            }
        }

        self.report.flush()?;
        if let Some(events) = &mut self.events {
            events.flush()?;
        }

        info!(batch = games.len(), scored = self.scored, skipped = self.skipped, "batch done");
        games.clear();
        Ok(())
    }
}

fn main() -> Result<(), Box<dyn StdError>> {
    let opt = Opt::parse();
    telemetry::init(&opt.log_level)?;

    let config = opt.config()?;
    info!(source = %config.source(), weighted = opt.weighted, "scoring games");

    let mut output = Output {
        report: csv::Writer::from_writer(io::stdout().lock()),
        events: opt.events.as_ref().map(csv::Writer::from_path).transpose()?,
        scored: 0,
        skipped: 0,
    };

    let mut reader = csv::Reader::from_reader(io::stdin().lock());
    let mut grouper = GameGrouper::new(opt.weighted);
    let mut batch = Vec::new();

    for row in reader.deserialize() {
        let row: RawPly = row?;
        if let Some(game) = grouper.push(row) {
            batch.push(game);
            if batch.len() >= opt.batch_size {
                output.batch(&mut batch, &config)?;
            }
        }
    }
    batch.extend(grouper.finish());
    output.batch(&mut batch, &config)?;

    Ok(())
}
