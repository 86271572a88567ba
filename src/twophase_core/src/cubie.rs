use std::{fmt, str::FromStr};

use itertools::Itertools;
use thiserror::Error;

use crate::{
    coord::{CoordinateError, N_CORNERS, N_EDGES, N_FLIP, N_TWIST},
    moves::{Maneuver, Move},
};

/// Corner positions and the corner cubies that start there, in the usual
/// Kociemba order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Corner {
    Urf,
    Ufl,
    Ulb,
    Ubr,
    Dfr,
    Dlf,
    Dbl,
    Drb,
}

impl Corner {
    pub const ALL: [Self; 8] = {
        use Corner::*;
        let v = [Urf, Ufl, Ulb, Ubr, Dfr, Dlf, Dbl, Drb];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };

    /// The sticker colours of the cubie, U/D sticker first: W=U, Y=D, G=F,
    /// R=R, O=L, B=B.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Corner::Urf => "WRG",
            Corner::Ufl => "WGO",
            Corner::Ulb => "WOB",
            Corner::Ubr => "WBR",
            Corner::Dfr => "YGR",
            Corner::Dlf => "YOG",
            Corner::Dbl => "YBO",
            Corner::Drb => "YRB",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|corner| corner.label() == label)
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Edge positions and the edge cubies that start there.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Edge {
    Ur,
    Uf,
    Ul,
    Ub,
    Dr,
    Df,
    Dl,
    Db,
    Fr,
    Fl,
    Bl,
    Br,
}

impl Edge {
    pub const ALL: [Self; 12] = {
        use Edge::*;
        let v = [Ur, Uf, Ul, Ub, Dr, Df, Dl, Db, Fr, Fl, Bl, Br];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Edge::Ur => "WR",
            Edge::Uf => "WG",
            Edge::Ul => "WO",
            Edge::Ub => "WB",
            Edge::Dr => "YR",
            Edge::Df => "YG",
            Edge::Dl => "YO",
            Edge::Db => "YB",
            Edge::Fr => "GR",
            Edge::Fl => "GO",
            Edge::Bl => "BO",
            Edge::Br => "BR",
        }
    }

    #[must_use]
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|edge| edge.label() == label)
    }

    /// One of the four U-layer edges.
    #[must_use]
    pub const fn is_up(self) -> bool {
        (self as u8) < 4
    }

    /// One of the four D-layer edges.
    #[must_use]
    pub const fn is_down(self) -> bool {
        matches!(self as u8, 4..8)
    }

    /// One of the four UD-slice edges (FR, FL, BL, BR).
    #[must_use]
    pub const fn is_slice(self) -> bool {
        (self as u8) >= 8
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A cube on the cubie level. `cp[i]` is the corner cubie sitting at corner
/// position `i` and `co[i]` its twist; `ep`/`eo` likewise for edges.
///
/// Corner orientations are 0..3 for regular cubes and 3..6 for the mirrored
/// cubes that show up when conjugating by reflections.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CubieCube {
    pub cp: [Corner; 8],
    pub co: [u8; 8],
    pub ep: [Edge; 12],
    pub eo: [u8; 12],
}

/// The four coordinates drawn by [`CubieCube::scramble`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ScrambleCoords {
    pub edges: u32,
    pub corners: u16,
    pub flip: u16,
    pub twist: u16,
}

impl ScrambleCoords {
    /// Rebuilds the cube these coordinates describe.
    ///
    /// # Errors
    ///
    /// Returns an error if any coordinate is out of range.
    pub fn to_cube(&self) -> Result<CubieCube, CoordinateError> {
        let mut cube = CubieCube::SOLVED;
        cube.set_edges(self.edges)?;
        cube.set_corners(self.corners)?;
        cube.set_flip(self.flip)?;
        cube.set_twist(self.twist)?;
        Ok(cube)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("Missing corners: {}", .0.iter().join(", "))]
    MissingCorners(Vec<Corner>),
    #[error("Missing edges: {}", .0.iter().join(", "))]
    MissingEdges(Vec<Edge>),
    #[error("Corner at {position} has orientation {orientation}, expected 0, 1 or 2")]
    CornerOrientation { position: Corner, orientation: u8 },
    #[error("Edge at {position} has orientation {orientation}, expected 0 or 1")]
    EdgeOrientation { position: Edge, orientation: u8 },
    #[error("Total edge flip is odd")]
    OddEdgeFlips,
    #[error("Total corner twist is not divisible by 3")]
    CornerTwistNotDivisibleBy3,
    #[error("Corner and edge permutation parities differ")]
    ParityMismatch,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseCubeError {
    #[error("Expected a corner line followed by an edge line")]
    MissingLine,
    #[error("Malformed cubie `{0}`, expected `(LABEL,ORIENTATION)`")]
    MalformedCubie(String),
    #[error("Unknown {kind} label `{label}`")]
    UnknownLabel { kind: &'static str, label: String },
    #[error("Expected {expected} {kind}s but found {found}")]
    WrongCount {
        kind: &'static str,
        expected: usize,
        found: usize,
    },
}

/// Number of inversions of `perm`, mod 2.
fn parity<T: Ord>(perm: &[T]) -> u8 {
    (perm
        .iter()
        .tuple_combinations()
        .filter(|(earlier, later)| earlier > later)
        .count()
        % 2) as u8
}

impl Default for CubieCube {
    fn default() -> Self {
        Self::SOLVED
    }
}

impl CubieCube {
    pub const SOLVED: Self = Self {
        cp: Corner::ALL,
        co: [0; 8],
        ep: Edge::ALL,
        eo: [0; 12],
    };

    #[must_use]
    pub fn is_solved(&self) -> bool {
        *self == Self::SOLVED
    }

    /// Replaces the corners of `self` with those of `self * other`.
    pub fn corner_multiply(&mut self, other: &Self) {
        let mut cp = self.cp;
        let mut co = self.co;
        for (i, (&from, &ori_b)) in other.cp.iter().zip(&other.co).enumerate() {
            let from = from as usize;
            cp[i] = self.cp[from];
            let ori_a = self.co[from];
            co[i] = match (ori_a < 3, ori_b < 3) {
                // Two regular cubes.
                (true, true) => (ori_a + ori_b) % 3,
                // Regular * mirrored is mirrored.
                (true, false) => {
                    let ori = ori_a + ori_b;
                    if ori >= 6 { ori - 3 } else { ori }
                }
                // Mirrored * regular is mirrored.
                (false, true) => {
                    let ori = ori_a - ori_b;
                    if ori < 3 { ori + 3 } else { ori }
                }
                // Two mirrored cubes give a regular one.
                (false, false) => {
                    if ori_a < ori_b {
                        ori_a + 3 - ori_b
                    } else {
                        ori_a - ori_b
                    }
                }
            };
        }
        self.cp = cp;
        self.co = co;
    }

    /// Replaces the edges of `self` with those of `self * other`.
    pub fn edge_multiply(&mut self, other: &Self) {
        let mut ep = self.ep;
        let mut eo = self.eo;
        for (i, (&from, &ori_b)) in other.ep.iter().zip(&other.eo).enumerate() {
            let from = from as usize;
            ep[i] = self.ep[from];
            eo[i] = (ori_b + self.eo[from]) % 2;
        }
        self.ep = ep;
        self.eo = eo;
    }

    /// `self = self * other`, i.e. apply `other` after `self`.
    pub fn multiply(&mut self, other: &Self) {
        self.corner_multiply(other);
        self.edge_multiply(other);
    }

    pub fn apply_move(&mut self, mv: Move) {
        self.multiply(mv.cubie());
    }

    pub fn apply_maneuver(&mut self, maneuver: &Maneuver) {
        for &mv in maneuver.moves() {
            self.apply_move(mv);
        }
    }

    #[must_use]
    pub fn inverse(&self) -> Self {
        let mut inv = Self::SOLVED;
        for (&edge, position) in self.ep.iter().zip(Edge::ALL) {
            inv.ep[edge as usize] = position;
        }
        for (eo, &from) in inv.eo.iter_mut().zip(&inv.ep) {
            *eo = self.eo[from as usize];
        }
        for (&corner, position) in self.cp.iter().zip(Corner::ALL) {
            inv.cp[corner as usize] = position;
        }
        for (co, &from) in inv.co.iter_mut().zip(&inv.cp) {
            let ori = self.co[from as usize];
            *co = if ori >= 3 { ori } else { (3 - ori) % 3 };
        }
        inv
    }

    #[must_use]
    pub fn corner_parity(&self) -> u8 {
        parity(&self.cp)
    }

    #[must_use]
    pub fn edge_parity(&self) -> u8 {
        parity(&self.ep)
    }

    /// Checks the laws every cube reachable by face turns obeys.
    ///
    /// # Errors
    ///
    /// Returns the first law the cube violates.
    pub fn verify(&self) -> Result<(), CubeError> {
        let missing_corners = Corner::ALL
            .into_iter()
            .filter(|corner| !self.cp.contains(corner))
            .collect_vec();
        if !missing_corners.is_empty() {
            return Err(CubeError::MissingCorners(missing_corners));
        }

        let missing_edges = Edge::ALL
            .into_iter()
            .filter(|edge| !self.ep.contains(edge))
            .collect_vec();
        if !missing_edges.is_empty() {
            return Err(CubeError::MissingEdges(missing_edges));
        }

        // Orientations 3 to 5 only arise for mirrored cubes during symmetry
        // conjugation; no sequence of face turns produces them.
        if let Some((position, &orientation)) =
            Corner::ALL.into_iter().zip(&self.co).find(|&(_, &ori)| ori >= 3)
        {
            return Err(CubeError::CornerOrientation {
                position,
                orientation,
            });
        }
        if let Some((position, &orientation)) =
            Edge::ALL.into_iter().zip(&self.eo).find(|&(_, &ori)| ori >= 2)
        {
            return Err(CubeError::EdgeOrientation {
                position,
                orientation,
            });
        }

        if self.eo.iter().map(|&o| u32::from(o)).sum::<u32>() % 2 != 0 {
            return Err(CubeError::OddEdgeFlips);
        }

        if self.co.iter().map(|&o| u32::from(o)).sum::<u32>() % 3 != 0 {
            return Err(CubeError::CornerTwistNotDivisibleBy3);
        }

        if self.corner_parity() != self.edge_parity() {
            return Err(CubeError::ParityMismatch);
        }

        Ok(())
    }

    #[must_use]
    pub fn is_solvable(&self) -> bool {
        self.verify().is_ok()
    }

    /// Turns `self` into a uniformly random solvable cube and returns the
    /// coordinates that were drawn.
    pub fn scramble(&mut self, rng: &mut fastrand::Rng) -> ScrambleCoords {
        let edges = rng.u32(..N_EDGES);
        self.set_edges_unchecked(edges);
        let edge_parity = self.edge_parity();

        let corners = loop {
            let corners = rng.u16(..N_CORNERS);
            self.set_corners_unchecked(corners);
            if self.corner_parity() == edge_parity {
                break corners;
            }
        };

        let flip = rng.u16(..N_FLIP);
        self.set_flip_unchecked(flip);
        let twist = rng.u16(..N_TWIST);
        self.set_twist_unchecked(twist);

        ScrambleCoords {
            edges,
            corners,
            flip,
            twist,
        }
    }

    #[must_use]
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        let mut cube = Self::SOLVED;
        cube.scramble(rng);
        cube
    }
}

impl fmt::Display for CubieCube {
    /// Two lines: `(WRG,0)(WGO,0)...` for the corners, then the edges.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (corner, ori) in self.cp.iter().zip(&self.co) {
            write!(f, "({corner},{ori})")?;
        }
        writeln!(f)?;
        for (edge, ori) in self.ep.iter().zip(&self.eo) {
            write!(f, "({edge},{ori})")?;
        }
        Ok(())
    }
}

fn parse_cubies<T, const N: usize>(
    line: &str,
    kind: &'static str,
    max_orientation: u8,
    from_label: fn(&str) -> Option<T>,
) -> Result<([T; N], [u8; N]), ParseCubeError> {
    let (perm, ori): (Vec<T>, Vec<u8>) = line
        .split(')')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(|token| -> Result<(T, u8), ParseCubeError> {
            let malformed = || ParseCubeError::MalformedCubie(format!("{token})"));
            let (label, ori) = token
                .strip_prefix('(')
                .and_then(|inner| inner.split_once(','))
                .ok_or_else(malformed)?;
            let cubie = from_label(label.trim()).ok_or_else(|| ParseCubeError::UnknownLabel {
                kind,
                label: label.trim().to_string(),
            })?;
            let ori = ori
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|&ori| ori < max_orientation)
                .ok_or_else(malformed)?;
            Ok((cubie, ori))
        })
        .collect::<Result<Vec<_>, _>>()?
        .into_iter()
        .unzip();

    let wrong_count = |found| ParseCubeError::WrongCount {
        kind,
        expected: N,
        found,
    };
    let found = perm.len();
    let perm = <[T; N]>::try_from(perm).map_err(|_| wrong_count(found))?;
    let ori = <[u8; N]>::try_from(ori).map_err(|_| wrong_count(found))?;
    Ok((perm, ori))
}

impl FromStr for CubieCube {
    type Err = ParseCubeError;

    /// Parses the two-line format produced by `Display`. The result is not
    /// verified; call [`CubieCube::verify`] for that.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut lines = s.lines().map(str::trim).filter(|line| !line.is_empty());
        let corner_line = lines.next().ok_or(ParseCubeError::MissingLine)?;
        let edge_line = lines.next().ok_or(ParseCubeError::MissingLine)?;

        let (cp, co) = parse_cubies(corner_line, "corner", 3, Corner::from_label)?;
        let (ep, eo) = parse_cubies(edge_line, "edge", 2, Edge::from_label)?;
        Ok(Self { cp, co, ep, eo })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_from(maneuver: &str) -> CubieCube {
        let mut cube = CubieCube::SOLVED;
        cube.apply_maneuver(&maneuver.parse().unwrap());
        cube
    }

    #[test]
    fn test_quarter_turn_order() {
        for mv in Move::ALL {
            let mut cube = CubieCube::SOLVED;
            for _ in 0..4 {
                cube.apply_move(mv);
            }
            assert!(cube.is_solved(), "{mv} has order 4");
        }
    }

    #[test]
    fn test_r_u_order() {
        let mut cube = CubieCube::SOLVED;
        for i in 1..=105 {
            cube.apply_maneuver(&"R U".parse().unwrap());
            assert_eq!(cube.is_solved(), i == 105);
        }
    }

    #[test]
    fn test_sexy_move_order() {
        let sexy: Maneuver = "R U R' U'".parse().unwrap();
        let mut cube = CubieCube::SOLVED;
        for i in 1..=6 {
            cube.apply_maneuver(&sexy);
            assert_eq!(cube.is_solved(), i == 6);
        }
    }

    #[test]
    fn test_inverse() {
        let cube = cube_from("R U F' L2 D B' R2 U' F L D2 B2");
        let mut product = cube.clone();
        product.multiply(&cube.inverse());
        assert!(product.is_solved());

        let mut product = cube.inverse();
        product.multiply(&cube);
        assert!(product.is_solved());
    }

    #[test]
    fn test_inverse_matches_reversed_maneuver() {
        let maneuver: Maneuver = "F R' D2 B L' U".parse().unwrap();
        let cube = cube_from(&maneuver.to_string());
        let mut undone = CubieCube::SOLVED;
        undone.apply_maneuver(&maneuver.reversed_inverse());
        assert_eq!(cube.inverse(), undone);
    }

    #[test]
    fn test_multiply_leaves_argument_alone() {
        let r = Move::ALL[3].cubie().clone();
        let mut cube = cube_from("F");
        cube.multiply(&r);
        assert_eq!(&r, Move::ALL[3].cubie());
    }

    #[test]
    fn test_edge_orientation_after_f() {
        let cube = cube_from("F");
        assert_eq!(cube.eo, [0, 1, 0, 0, 0, 1, 0, 0, 1, 1, 0, 0]);
        let cube = cube_from("F F");
        assert!(cube.eo.iter().all(|&o| o == 0));
    }

    #[test]
    fn test_parity() {
        let cube = cube_from("U");
        assert_eq!(cube.corner_parity(), 1);
        assert_eq!(cube.edge_parity(), 1);
        let cube = cube_from("U2");
        assert_eq!(cube.corner_parity(), 0);
        assert_eq!(cube.edge_parity(), 0);
        assert_eq!(CubieCube::SOLVED.corner_parity(), 0);
    }

    #[test]
    fn test_verify_laws() {
        assert_eq!(CubieCube::SOLVED.verify(), Ok(()));
        assert_eq!(cube_from("R U F' D2 L B").verify(), Ok(()));

        let mut cube = CubieCube::SOLVED;
        cube.cp[1] = Corner::Urf;
        assert_eq!(
            cube.verify(),
            Err(CubeError::MissingCorners(vec![Corner::Ufl]))
        );

        let mut cube = CubieCube::SOLVED;
        cube.ep[11] = Edge::Ur;
        assert_eq!(cube.verify(), Err(CubeError::MissingEdges(vec![Edge::Br])));

        let mut cube = CubieCube::SOLVED;
        cube.co[0] = 3;
        assert_eq!(
            cube.verify(),
            Err(CubeError::CornerOrientation {
                position: Corner::Urf,
                orientation: 3
            })
        );

        let mut cube = CubieCube::SOLVED;
        cube.co[2] = 4;
        cube.co[5] = 5;
        assert_eq!(
            cube.verify(),
            Err(CubeError::CornerOrientation {
                position: Corner::Ulb,
                orientation: 4
            })
        );

        let mut cube = CubieCube::SOLVED;
        cube.eo[9] = 2;
        assert_eq!(
            cube.verify(),
            Err(CubeError::EdgeOrientation {
                position: Edge::Fl,
                orientation: 2
            })
        );

        let mut cube = CubieCube::SOLVED;
        cube.eo[0] = 1;
        assert_eq!(cube.verify(), Err(CubeError::OddEdgeFlips));

        let mut cube = CubieCube::SOLVED;
        cube.co[0] = 1;
        assert_eq!(cube.verify(), Err(CubeError::CornerTwistNotDivisibleBy3));

        let mut cube = CubieCube::SOLVED;
        cube.ep.swap(0, 1);
        assert_eq!(cube.verify(), Err(CubeError::ParityMismatch));
        assert!(!cube.is_solvable());
    }

    #[test]
    fn test_scramble_is_solvable() {
        let mut rng = fastrand::Rng::with_seed(0x7f4a_7c15);
        for _ in 0..1000 {
            let mut cube = CubieCube::SOLVED;
            let coords = cube.scramble(&mut rng);
            assert_eq!(cube.verify(), Ok(()));
            assert_eq!(cube.get_edges(), coords.edges);
            assert_eq!(cube.get_corners(), coords.corners);
            assert_eq!(cube.get_flip(), coords.flip);
            assert_eq!(cube.get_twist(), coords.twist);
            assert_eq!(coords.to_cube().unwrap(), cube);
        }
    }

    #[test]
    fn test_text_format() {
        assert_eq!(
            CubieCube::SOLVED.to_string(),
            "(WRG,0)(WGO,0)(WOB,0)(WBR,0)(YGR,0)(YOG,0)(YBO,0)(YRB,0)\n\
             (WR,0)(WG,0)(WO,0)(WB,0)(YR,0)(YG,0)(YO,0)(YB,0)(GR,0)(GO,0)(BO,0)(BR,0)"
        );

        let cube = cube_from("R U2 F' D L' B2");
        assert_eq!(cube.to_string().parse::<CubieCube>(), Ok(cube));
    }

    #[test]
    fn test_text_format_errors() {
        assert_eq!(
            "(WRG,0)".parse::<CubieCube>(),
            Err(ParseCubeError::MissingLine)
        );
        assert_eq!(
            "(WRG,0)(WGO,0)\n(WR,0)".parse::<CubieCube>(),
            Err(ParseCubeError::WrongCount {
                kind: "corner",
                expected: 8,
                found: 2
            })
        );
        assert!(matches!(
            "(XXX,0)\n(WR,0)".parse::<CubieCube>(),
            Err(ParseCubeError::UnknownLabel { kind: "corner", .. })
        ));
        assert!(matches!(
            "WRG,0\n(WR,0)".parse::<CubieCube>(),
            Err(ParseCubeError::MalformedCubie(_))
        ));

        let mirrored = CubieCube::SOLVED.to_string().replacen("(WRG,0)", "(WRG,3)", 1);
        assert_eq!(
            mirrored.parse::<CubieCube>(),
            Err(ParseCubeError::MalformedCubie("(WRG,3)".to_string()))
        );
    }

    #[test]
    fn test_labels() {
        for corner in Corner::ALL {
            assert_eq!(Corner::from_label(corner.label()), Some(corner));
        }
        for edge in Edge::ALL {
            assert_eq!(Edge::from_label(edge.label()), Some(edge));
        }
        assert_eq!(Edge::ALL.iter().filter(|e| e.is_up()).count(), 4);
        assert_eq!(Edge::ALL.iter().filter(|e| e.is_down()).count(), 4);
        assert_eq!(Edge::ALL.iter().filter(|e| e.is_slice()).count(), 4);
    }
}
