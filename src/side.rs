use std::{fmt, ops::Not};

/// One of the two players.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    White,
    Black,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::White, Side::Black];

    /// The side that makes the move with the given zero-based ply index.
    /// White makes the even plies.
    #[inline]
    pub fn of_ply(ply: usize) -> Side {
        if ply % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    #[inline]
    pub fn opposite(self) -> Side {
        !self
    }

}

impl Not for Side {
    type Output = Side;

    #[inline]
    fn not(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Side::White => "white",
            Side::Black => "black",
        })
    }
}

/// A value for each side.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BySide<T> {
    pub white: T,
    pub black: T,
}

impl<T> BySide<T> {
    pub fn new(white: T, black: T) -> BySide<T> {
        BySide { white, black }
    }

    pub fn get(&self, side: Side) -> &T {
        match side {
            Side::White => &self.white,
            Side::Black => &self.black,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut T {
        match side {
            Side::White => &mut self.white,
            Side::Black => &mut self.black,
        }
    }

    pub fn map<U, F>(self, mut f: F) -> BySide<U>
    where
        F: FnMut(Side, T) -> U,
    {
        BySide {
            white: f(Side::White, self.white),
            black: f(Side::Black, self.black),
        }
    }
}

impl<T: Clone> BySide<T> {
    pub fn splat(value: T) -> BySide<T> {
        BySide {
            white: value.clone(),
            black: value,
        }
    }
}
