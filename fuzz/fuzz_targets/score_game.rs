#![no_main]

use std::time::Duration;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quickgi::{
    score_game, EvalSource, EvaluationSample, GameRecord, GameResult, PayoutScheme, ScoringConfig,
    TimeControl, Wdl,
};

#[derive(Arbitrary, Debug)]
struct Sample {
    eval: Option<f64>,
    wdl: Option<(f64, f64, f64)>,
    clock: Option<u32>,
}

#[derive(Arbitrary, Debug)]
struct Input {
    lc0: bool,
    payout: (u8, u8, u8),
    result: u8,
    ratings: (Option<i16>, Option<i16>),
    weighted: bool,
    time_control: Option<(u8, u8, u8, Option<u8>)>,
    samples: Vec<Sample>,
}

fuzz_target!(|input: Input| {
    let Ok(payout) = PayoutScheme::new(
        f64::from(input.payout.0),
        f64::from(input.payout.1),
        f64::from(input.payout.2),
    ) else {
        return;
    };
    let source = if input.lc0 {
        EvalSource::Lc0
    } else {
        EvalSource::Stockfish
    };
    let config = ScoringConfig::builder(source).payout(payout).build();

    let result = match input.result % 4 {
        0 => GameResult::WhiteWins,
        1 => GameResult::BlackWins,
        2 => GameResult::Draw,
        _ => GameResult::Unknown,
    };
    let time_control = input
        .time_control
        .map(|(base, bonus, increment, trigger)| TimeControl {
            base: Duration::from_secs(60 * u64::from(base)),
            bonus: Duration::from_secs(60 * u64::from(bonus)),
            increment: Duration::from_secs(u64::from(increment)),
            bonus_after_move: trigger.map(u32::from),
        });

    let clock = input
        .samples
        .iter()
        .skip(1)
        .map(|sample| sample.clock.map(|secs| Duration::from_secs(u64::from(secs))))
        .collect();
    let samples = input
        .samples
        .iter()
        .map(|sample| EvaluationSample {
            eval: sample.eval,
            wdl: sample.wdl.map(|(w, d, l)| Wdl::new(w, d, l)),
            ..EvaluationSample::default()
        })
        .collect::<Vec<_>>();
    let analyzable = samples.len() >= 2;

    let record = GameRecord::new(samples, result)
        .with_ratings(
            input.ratings.0.map(i32::from),
            input.ratings.1.map(i32::from),
        )
        .weighted(input.weighted)
        .with_clock(clock, time_control);

    match score_game(&record, &config) {
        Ok(report) => {
            assert!(analyzable);
            for side in [&report.white, &report.black] {
                assert!(side.gpl.is_finite(), "{report:?}");
                assert!(side.gi.is_finite(), "{report:?}");
                assert!(side.acpl.is_finite(), "{report:?}");
            }
        }
        Err(_) => assert!(!analyzable),
    }
});
