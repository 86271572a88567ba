use std::{fmt, str::FromStr, sync::LazyLock};

use itertools::Itertools;
use thiserror::Error;

use crate::cubie::{
    Corner::{Dbl, Dfr, Dlf, Drb, Ubr, Ufl, Ulb, Urf},
    CubieCube,
    Edge::{Bl, Br, Db, Df, Dl, Dr, Fl, Fr, Ub, Uf, Ul, Ur},
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Face {
    U,
    R,
    F,
    D,
    L,
    B,
}

impl Face {
    pub const ALL: [Self; 6] = {
        use Face::*;
        let v = [U, R, F, D, L, B];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };

    #[must_use]
    pub const fn letter(self) -> char {
        match self {
            Face::U => 'U',
            Face::R => 'R',
            Face::F => 'F',
            Face::D => 'D',
            Face::L => 'L',
            Face::B => 'B',
        }
    }
}

impl FromStr for Face {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(Face::U),
            "R" => Ok(Face::R),
            "F" => Ok(Face::F),
            "D" => Ok(Face::D),
            "L" => Ok(Face::L),
            "B" => Ok(Face::B),
            _ => Err(ParseMoveError::UnknownFace(s.to_string())),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseMoveError {
    #[error("Unknown face `{0}`")]
    UnknownFace(String),
    #[error("Unknown move suffix in `{0}`")]
    UnknownSuffix(String),
}

/// A clockwise face turn of one, two or three quarter turns, indexed
/// `3 * face + quarter_turns - 1`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move(u8);

impl Move {
    pub const ALL: [Self; 18] = {
        let mut v = [Move(0); 18];
        let mut i = 0;
        while i < v.len() {
            v[i] = Move(i as u8);
            i += 1;
        }
        v
    };

    /// The moves that keep the cube inside `<U, D, R2, F2, L2, B2>`, in index
    /// order.
    pub const PHASE2: [Self; 10] = {
        let mut v = [Move(0); 10];
        let mut i = 0;
        let mut n = 0;
        while i < Self::ALL.len() {
            if Self::ALL[i].is_phase2() {
                v[n] = Self::ALL[i];
                n += 1;
            }
            i += 1;
        }
        assert!(n == v.len());
        v
    };

    /// # Panics
    ///
    /// Panics if `quarter_turns` is not 1, 2 or 3.
    #[must_use]
    pub const fn new(face: Face, quarter_turns: u8) -> Self {
        assert!(quarter_turns >= 1 && quarter_turns <= 3);
        Move(face as u8 * 3 + quarter_turns - 1)
    }

    #[must_use]
    pub const fn from_index(index: usize) -> Option<Self> {
        if index < Self::ALL.len() {
            Some(Self::ALL[index])
        } else {
            None
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[must_use]
    pub const fn face(self) -> Face {
        Face::ALL[self.0 as usize / 3]
    }

    #[must_use]
    pub const fn quarter_turns(self) -> u8 {
        self.0 % 3 + 1
    }

    #[must_use]
    pub const fn is_phase2(self) -> bool {
        matches!(self.face(), Face::U | Face::D) || self.quarter_turns() == 2
    }

    #[must_use]
    pub const fn inverse(self) -> Self {
        Move(self.0 / 3 * 3 + 2 - self.0 % 3)
    }

    /// Whether `self` is pruned when it directly follows `prev`: turns of the
    /// same face always are, and on each axis the U, R, F turns must come
    /// before the opposite D, L, B turns.
    #[must_use]
    pub const fn is_redundant_after(self, prev: Self) -> bool {
        let diff = (prev.0 / 3) as i8 - (self.0 / 3) as i8;
        diff == 0 || diff == 3
    }

    /// The half turn of the same face.
    #[must_use]
    pub const fn half_turn(self) -> Self {
        Move(self.0 / 3 * 3 + 1)
    }

    /// Internal name such as `U1`, `R3`.
    #[must_use]
    pub fn code(self) -> String {
        format!("{}{}", self.face().letter(), self.quarter_turns())
    }

    /// The cubie-level effect of the move.
    #[must_use]
    pub fn cubie(self) -> &'static CubieCube {
        &MOVE_CUBES[self.index()]
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = match self.quarter_turns() {
            1 => "",
            2 => "2",
            _ => "'",
        };
        write!(f, "{}{suffix}", self.face().letter())
    }
}

impl FromStr for Move {
    type Err = ParseMoveError;

    /// Accepts both `U`, `U2`, `U'` and the internal `U1`, `U2`, `U3`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let face = chars
            .next()
            .ok_or_else(|| ParseMoveError::UnknownFace(String::new()))?;
        let face: Face = face.encode_utf8(&mut [0; 4]).parse()?;
        let quarter_turns = match chars.as_str() {
            "" | "1" => 1,
            "2" => 2,
            "'" | "3" => 3,
            _ => return Err(ParseMoveError::UnknownSuffix(s.to_string())),
        };
        Ok(Move::new(face, quarter_turns))
    }
}

const BASIC_MOVE_CUBES: [CubieCube; 6] = [
    // U
    CubieCube {
        cp: [Ubr, Urf, Ufl, Ulb, Dfr, Dlf, Dbl, Drb],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [Ub, Ur, Uf, Ul, Dr, Df, Dl, Db, Fr, Fl, Bl, Br],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // R
    CubieCube {
        cp: [Dfr, Ufl, Ulb, Urf, Drb, Dlf, Dbl, Ubr],
        co: [2, 0, 0, 1, 1, 0, 0, 2],
        ep: [Fr, Uf, Ul, Ub, Br, Df, Dl, Db, Dr, Fl, Bl, Ur],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // F
    CubieCube {
        cp: [Ufl, Dlf, Ulb, Ubr, Urf, Dfr, Dbl, Drb],
        co: [1, 2, 0, 0, 2, 1, 0, 0],
        ep: [Ur, Fl, Ul, Ub, Dr, Fr, Dl, Db, Uf, Df, Bl, Br],
        eo: [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0],
    },
    // D
    CubieCube {
        cp: [Urf, Ufl, Ulb, Ubr, Dlf, Dbl, Drb, Dfr],
        co: [0, 0, 0, 0, 0, 0, 0, 0],
        ep: [Ur, Uf, Ul, Ub, Df, Dl, Db, Dr, Fr, Fl, Bl, Br],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // L
    CubieCube {
        cp: [Urf, Ulb, Dbl, Ubr, Dfr, Ufl, Dlf, Drb],
        co: [0, 1, 2, 0, 0, 2, 1, 0],
        ep: [Ur, Uf, Bl, Ub, Dr, Df, Fl, Db, Fr, Ul, Dl, Br],
        eo: [0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    },
    // B
    CubieCube {
        cp: [Urf, Ufl, Ubr, Drb, Dfr, Dlf, Ulb, Dbl],
        co: [0, 0, 1, 2, 0, 0, 2, 1],
        ep: [Ur, Uf, Ul, Br, Dr, Df, Dl, Bl, Fr, Fl, Ub, Db],
        eo: [0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 1, 1],
    },
];

static MOVE_CUBES: LazyLock<[CubieCube; 18]> = LazyLock::new(|| {
    std::array::from_fn(|i| {
        let basic = &BASIC_MOVE_CUBES[i / 3];
        let mut cube = basic.clone();
        for _ in 0..i % 3 {
            cube.multiply(basic);
        }
        cube
    })
});

/// A sequence of moves, printed and parsed as space separated notation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Maneuver(pub Vec<Move>);

impl Maneuver {
    #[must_use]
    pub fn moves(&self) -> &[Move] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The maneuver that undoes `self`. Reversing a solution yields a
    /// scramble for the cube it solves.
    #[must_use]
    pub fn reversed_inverse(&self) -> Self {
        self.0.iter().rev().map(|mv| mv.inverse()).collect()
    }
}

impl FromIterator<Move> for Maneuver {
    fn from_iter<I: IntoIterator<Item = Move>>(iter: I) -> Self {
        Maneuver(iter.into_iter().collect())
    }
}

impl From<Vec<Move>> for Maneuver {
    fn from(moves: Vec<Move>) -> Self {
        Maneuver(moves)
    }
}

impl fmt::Display for Maneuver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().format(" "))
    }
}

impl FromStr for Maneuver {
    type Err = ParseMoveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split_whitespace().map(str::parse::<Move>).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_indices() {
        for (i, mv) in Move::ALL.into_iter().enumerate() {
            assert_eq!(mv.index(), i);
            assert_eq!(Move::new(mv.face(), mv.quarter_turns()), mv);
            assert_eq!(mv.inverse().inverse(), mv);
            assert_eq!(mv.inverse().face(), mv.face());
            assert_eq!(mv.quarter_turns() + mv.inverse().quarter_turns(), 4);
        }
        assert_eq!(Move::from_index(18), None);
        assert_eq!(Move::new(Face::R, 3).index(), 5);
        assert_eq!(Move::new(Face::R, 3).half_turn(), Move::new(Face::R, 2));
    }

    #[test]
    fn test_phase2_moves() {
        let names = Move::PHASE2.iter().map(|mv| mv.code()).join(" ");
        assert_eq!(names, "U1 U2 U3 R2 F2 D1 D2 D3 L2 B2");
        assert_eq!(Move::ALL.iter().filter(|mv| mv.is_phase2()).count(), 10);
    }

    #[test]
    fn test_move_ordering() {
        let mv = |s: &str| s.parse::<Move>().unwrap();
        assert!(mv("U2").is_redundant_after(mv("U")));
        assert!(mv("U").is_redundant_after(mv("D")));
        assert!(!mv("D").is_redundant_after(mv("U")));
        assert!(mv("R'").is_redundant_after(mv("L2")));
        assert!(!mv("L").is_redundant_after(mv("R")));
        assert!(!mv("R").is_redundant_after(mv("U")));
        assert!(!mv("B").is_redundant_after(mv("U")));
        assert!(!mv("U").is_redundant_after(mv("B")));
    }

    #[test]
    fn test_notation() {
        let maneuver: Maneuver = "U R2 F' D1 L3 B2".parse().unwrap();
        assert_eq!(maneuver.to_string(), "U R2 F' D L' B2");
        assert_eq!(maneuver.reversed_inverse().to_string(), "B2 L D' F R2 U'");
        assert_eq!("".parse::<Maneuver>(), Ok(Maneuver::default()));
        assert_eq!(
            "U X".parse::<Maneuver>(),
            Err(ParseMoveError::UnknownFace("X".to_string()))
        );
        assert_eq!(
            "U4".parse::<Move>(),
            Err(ParseMoveError::UnknownSuffix("U4".to_string()))
        );
    }

    #[test]
    fn test_quarter_turn_cubes() {
        for face in Face::ALL {
            let mut cube = CubieCube::SOLVED;
            cube.apply_move(Move::new(face, 1));
            cube.apply_move(Move::new(face, 1));
            assert_eq!(&cube, Move::new(face, 2).cubie());
            cube.apply_move(Move::new(face, 1));
            assert_eq!(&cube, Move::new(face, 3).cubie());
            assert_eq!(cube.verify(), Ok(()));
        }
    }
}
