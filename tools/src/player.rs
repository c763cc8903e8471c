use quickgi::{PerformanceRatingError, PerformanceRatingInput, RatingScalar};
use rustc_hash::FxHashMap;

use crate::report::ReportedGame;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct PlayerId(usize);

#[derive(Default)]
pub struct PlayerIds {
    inner: FxHashMap<Box<str>, PlayerId>,
    names: Vec<Box<str>>,
}

impl PlayerIds {
    pub fn get_or_insert(&mut self, name: &str) -> PlayerId {
        if let Some(&id) = self.inner.get(name) {
            return id;
        }
        let id = PlayerId(self.names.len());
        self.names.push(name.into());
        self.inner.insert(name.into(), id);
        id
    }

    pub fn get(&self, name: &str) -> Option<PlayerId> {
        self.inner.get(name).copied()
    }

    pub fn name(&self, PlayerId(id): PlayerId) -> &str {
        &self.names[id]
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

pub struct ByPlayerId<T> {
    inner: Vec<Option<T>>,
}

impl<T> Default for ByPlayerId<T> {
    fn default() -> Self {
        ByPlayerId { inner: Vec::new() }
    }
}

impl<T> ByPlayerId<T> {
    pub fn get(&self, PlayerId(id): PlayerId) -> Option<&T> {
        match self.inner.get(id) {
            Some(Some(t)) => Some(t),
            _ => None,
        }
    }

    pub fn get_mut_or_insert_with<F>(&mut self, PlayerId(id): PlayerId, f: F) -> &mut T
    where
        F: FnOnce() -> T,
    {
        if self.inner.len() <= id {
            self.inner.resize_with(id + 1, || None);
        }
        self.inner[id].get_or_insert_with(f)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        self.inner
            .iter()
            .enumerate()
            .filter_map(|(id, t)| t.as_ref().map(|t| (PlayerId(id), t)))
    }
}

/// Results of one player against rated opponents.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerTally {
    pub points: f64,
    pub games: u32,
    opponent_rating_total: f64,
}

impl PlayerTally {
    pub fn record(&mut self, points: f64, opponent_rating: i32) {
        self.points += points;
        self.games += 1;
        self.opponent_rating_total += f64::from(opponent_rating);
    }

    pub fn avg_opponent_rating(&self) -> Option<RatingScalar> {
        (self.games > 0).then(|| RatingScalar(self.opponent_rating_total / f64::from(self.games)))
    }

    pub fn performance_input(&self) -> Option<PerformanceRatingInput> {
        self.avg_opponent_rating()
            .map(|avg| PerformanceRatingInput::new(self.points, self.games, avg))
    }

    pub fn performance(&self) -> Result<RatingScalar, PerformanceRatingError> {
        match self.performance_input() {
            Some(input) => input.rating(),
            None => Err(PerformanceRatingError::InvalidGameCount),
        }
    }
}

/// Tallies of every player seen in a report.
#[derive(Default)]
pub struct Leaderboard {
    pub players: PlayerIds,
    pub tallies: ByPlayerId<PlayerTally>,
}

impl Leaderboard {
    /// Counts a game for both players. Only games with a known result count,
    /// and only for players whose opponent is rated.
    pub fn record(&mut self, game: &ReportedGame) {
        for (player, points, opponent_rating) in [
            (&game.white, game.white_points, game.black_elo),
            (&game.black, game.black_points, game.white_elo),
        ] {
            let id = self.players.get_or_insert(player);
            let tally = self.tallies.get_mut_or_insert_with(id, PlayerTally::default);
            if let (Some(points), Some(opponent_rating)) = (points, opponent_rating) {
                tally.record(points, opponent_rating);
            }
        }
    }

    pub fn tally(&self, name: &str) -> Option<&PlayerTally> {
        self.players.get(name).and_then(|id| self.tallies.get(id))
    }
}
