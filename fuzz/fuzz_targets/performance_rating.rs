#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use quickgi::{performance_rating, PerformanceRatingError, RatingScalar};

#[derive(Arbitrary, Debug)]
struct Tally {
    half_points: u32,
    games: u32,
    avg_opponent_rating: f64,
}

fuzz_target!(|tally: Tally| {
    if !tally.avg_opponent_rating.is_finite() || tally.avg_opponent_rating.abs() > 10000.0 {
        return;
    }

    let score = f64::from(tally.half_points) / 2.0;
    match performance_rating(
        score,
        tally.games,
        RatingScalar(tally.avg_opponent_rating),
    ) {
        Ok(RatingScalar(rating)) => {
            assert!(rating.is_finite(), "{tally:?}");
        }
        Err(PerformanceRatingError::InvalidScore { .. }) => {
            assert!(score > f64::from(tally.games));
        }
        Err(PerformanceRatingError::InvalidGameCount) => {
            assert_eq!(tally.games, 0);
        }
    }
});
