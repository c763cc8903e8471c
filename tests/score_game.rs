use std::time::Duration;

use quickgi::{
    adjust_for_opponent, performance_rating, score_game, ClassificationThresholds, EvalSource,
    EvaluationSample, EventKind, GameRecord, GameResult, PayoutScheme, RatingScalar, ScoringConfig,
    Side, TimeControl, Wdl,
};

fn swinging_game() -> Vec<EvaluationSample> {
    [0.2, 0.3, -0.4, -0.3, 1.5, 1.4, -2.0, 0.0, 0.1, 4.0]
        .into_iter()
        .map(EvaluationSample::from_eval)
        .collect()
}

fn assert_close(a: f64, b: f64) {
    assert!((a - b).abs() < 1e-9, "{a} != {b}");
}

#[test]
fn test_payout_scale_invariance() {
    for result in [GameResult::WhiteWins, GameResult::Draw, GameResult::Unknown] {
        let record = GameRecord::new(swinging_game(), result);
        let base = ScoringConfig::builder(EvalSource::Stockfish)
            .payout(PayoutScheme::new(1.0, 0.5, 0.1).unwrap())
            .build();
        let scaled = ScoringConfig::builder(EvalSource::Stockfish)
            .payout(PayoutScheme::new(3.0, 1.5, 0.3).unwrap())
            .build();

        let base = score_game(&record, &base).unwrap();
        let scaled = score_game(&record, &scaled).unwrap();
        for side in Side::ALL {
            assert_close(base.side(side).gpl, scaled.side(side).gpl);
            assert_close(base.side(side).gi_raw, scaled.side(side).gi_raw);
            assert_close(base.side(side).gi, scaled.side(side).gi);
        }
        assert_eq!(base.events.len(), scaled.events.len());
    }
}

#[test]
fn test_constant_evaluation_loses_nothing() {
    for source in [EvalSource::Stockfish, EvalSource::Lc0] {
        let samples = vec![EvaluationSample::from_eval(0.7); 21];
        let record = GameRecord::new(samples, GameResult::Draw);
        let report = score_game(&record, &ScoringConfig::new(source)).unwrap();

        for side in Side::ALL {
            let side = report.side(side);
            assert_eq!(side.gpl, 0.0);
            assert_eq!(side.acpl, 0.0);
            assert_eq!(side.counts.inaccuracies + side.counts.mistakes + side.counts.blunders, 0);
        }
        assert!(report.events.is_empty());
    }
}

#[test]
fn test_flawless_win() {
    let samples = vec![EvaluationSample::from_wdl(Wdl::new(0.4, 0.5, 0.1)); 31];
    let record = GameRecord::new(samples, GameResult::WhiteWins);
    let config = ScoringConfig::new(EvalSource::Lc0);
    let report = score_game(&record, &config).unwrap();

    assert_eq!(report.white.gi_raw, 1.0);
    assert_close(report.white.gi, 157.57 + 18.55);
    assert_eq!(report.white.points, Some(1.0));
    assert_eq!(report.black.gi_raw, 0.0);
    assert_eq!(report.black.points, Some(0.0));
}

#[test]
fn test_without_clock_nothing_is_timed() {
    let record = GameRecord::new(swinging_game(), GameResult::Draw);
    let report = score_game(&record, &ScoringConfig::default()).unwrap();
    assert!(!report.timed);
    assert!(report.events.iter().all(|e| e.kind == EventKind::Blunder));
    assert!(report.events.iter().all(|e| e.think_time.is_none()));
    assert_eq!(report.white.counts.critical + report.white.counts.deep_think, 0);

    // Clock column present, but empty throughout.
    let record = record.with_clock(vec![None; 9], Some("90+30+30/40".parse().unwrap()));
    let report = score_game(&record, &ScoringConfig::default()).unwrap();
    assert!(!report.timed);
    assert_eq!(report.black.counts.critical + report.black.counts.deep_think, 0);
}

#[test]
fn test_long_think_is_flagged() {
    let mins = |m: u64| Some(Duration::from_secs(60 * m));
    let samples = vec![EvaluationSample::from_eval(0.0); 5];
    let tc: TimeControl = "90+30+30/40".parse().unwrap();
    let record = GameRecord::new(samples, GameResult::Draw)
        .with_clock(vec![mins(90), mins(90), mins(70), mins(55), mins(30)], Some(tc));
    let report = score_game(&record, &ScoringConfig::default()).unwrap();

    assert!(report.timed);
    // White: 20:30 then 40:30, Black: 35:30.
    assert_eq!(report.white.counts.critical, 1);
    assert_eq!(report.white.counts.deep_think, 1);
    assert_eq!(report.black.counts.deep_think, 1);
    let kinds = report.events.iter().map(|e| (e.ply, e.kind)).collect::<Vec<_>>();
    assert_eq!(
        kinds,
        vec![
            (2, EventKind::Critical),
            (3, EventKind::DeepThink),
            (4, EventKind::DeepThink)
        ]
    );
    assert!(report.events.iter().all(|e| e.point_loss == 0.0));
}

#[test]
fn test_rating_adjustment_at_reference_is_noop() {
    let reference = RatingScalar(2800.0);
    assert_eq!(reference.expected_score(reference).value(), 0.5);

    let record = GameRecord::new(swinging_game(), GameResult::BlackWins)
        .with_ratings(Some(2800), Some(2800));
    let config = ScoringConfig::default();
    let plain = score_game(&record, &config).unwrap();
    let weighted = score_game(&record.clone().weighted(true), &config).unwrap();
    assert_eq!(plain, weighted);

    for gi in [-1.3, -0.2, 0.0, 0.4, 1.0] {
        assert_eq!(adjust_for_opponent(gi, reference, reference), gi);
    }
}

#[test]
fn test_rating_adjustment_needs_both_ratings() {
    let config = ScoringConfig::default();
    let record = GameRecord::new(swinging_game(), GameResult::WhiteWins);
    let plain = score_game(&record, &config).unwrap();

    let one_rating = record.clone().with_ratings(Some(2500), None).weighted(true);
    assert_eq!(score_game(&one_rating, &config).unwrap(), plain);

    let both = record.with_ratings(Some(2500), Some(2400)).weighted(true);
    let weighted = score_game(&both, &config).unwrap();
    assert_ne!(weighted.white.gi_raw, plain.white.gi_raw);
    assert_eq!(weighted.white.gpl, plain.white.gpl);
}

#[test]
fn test_performance_rating_boundaries() {
    let zero = performance_rating(0.0, 10, RatingScalar(2000.0)).unwrap();
    let perfect = performance_rating(10.0, 10, RatingScalar(2000.0)).unwrap();
    assert!(zero.is_finite() && perfect.is_finite());
    assert_close(2000.0 - zero.0, perfect.0 - 2000.0);
    assert_eq!(
        performance_rating(5.0, 10, RatingScalar(2000.0)).unwrap(),
        RatingScalar(2000.0)
    );
}

#[test]
fn test_default_thresholds_are_monotonic() {
    for thresholds in [
        ClassificationThresholds::STOCKFISH,
        ClassificationThresholds::LC0_WHITE,
        ClassificationThresholds::LC0_BLACK,
    ] {
        assert!(thresholds.blunder() > thresholds.mistake());
        assert!(thresholds.mistake() > thresholds.inaccuracy());
        assert!(thresholds.inaccuracy() > 0.0);
    }
}

#[test]
fn test_too_short_to_score() {
    let record = GameRecord::new(vec![EvaluationSample::from_eval(0.1)], GameResult::WhiteWins);
    let err = score_game(&record, &ScoringConfig::default()).unwrap_err();
    assert_eq!(err.samples, 1);
}

fn short_wdl_game() -> Vec<EvaluationSample> {
    [(0.2, 0.6, 0.2), (0.0, 0.6, 0.4), (0.0, 0.8, 0.2)]
        .into_iter()
        .map(|(win, draw, loss)| EvaluationSample::from_wdl(Wdl::new(win, draw, loss)))
        .collect()
}

#[test]
fn test_draw_subtracts_loss_from_draw_value() {
    let record = GameRecord::new(short_wdl_game(), GameResult::Draw);
    let report = score_game(&record, &ScoringConfig::new(EvalSource::Lc0)).unwrap();

    assert_close(report.white.gpl, 0.2);
    assert_close(report.white.gi_raw, 0.3);
    assert_close(report.white.gi, 157.57 + 18.55 * 0.3);
    assert_close(report.black.gpl, 0.1);
    assert_close(report.black.gi_raw, 0.4);
    assert_close(report.black.gi, 157.57 + 18.55 * 0.4);
    assert_eq!(report.white.points, Some(0.5));
    assert_eq!(report.black.points, Some(0.5));
}

#[test]
fn test_black_win_under_custom_payout() {
    let record = GameRecord::new(short_wdl_game(), GameResult::BlackWins);
    let config = ScoringConfig::builder(EvalSource::Lc0)
        .payout(PayoutScheme::new(3.0, 1.25, 0.0).unwrap())
        .build();
    let report = score_game(&record, &config).unwrap();

    // White drops from 1.35 to 0.75 points, Black from 1.95 to 1.6.
    assert_close(report.white.gpl, 0.6 / 3.0);
    assert_close(report.white.gi_raw, -0.2);
    assert_close(report.white.gi, 157.57 - 18.55 * 0.2);
    assert_close(report.black.gpl, 0.35 / 3.0);
    assert_close(report.black.gi_raw, 2.65 / 3.0);
    assert_close(report.black.gi, 157.57 + 18.55 * 2.65 / 3.0);
    assert_eq!(report.white.points, Some(0.0));
    assert_eq!(report.black.points, Some(1.0));
}
