//! Coordinates: integer encodings of the parts of a [`CubieCube`] the search
//! cares about. Every getter has a setter with `set(get(c)) == c` over the
//! whole range. Setters only touch the cubies their coordinate describes, so
//! the rest of the cube keeps whatever state it had.

use std::fmt;

use thiserror::Error;

use crate::cubie::{Corner, CubieCube, Edge};

pub const N_MOVE: usize = 18;
pub const N_TWIST: u16 = 2187;
pub const N_FLIP: u16 = 2048;
pub const N_SLICE: u16 = 495;
pub const N_SLICE_SORTED: u16 = 11880;
pub const N_PERM_4: u16 = 24;
/// `u_edges` stays below this inside the phase-2 subgroup.
pub const N_U_EDGES_PHASE2: u16 = 1680;
pub const N_CORNERS: u16 = 40320;
pub const N_UD_EDGES: u16 = 40320;
pub const N_EDGES: u32 = 479_001_600;

const SLICE_EDGES: [Edge; 4] = [Edge::Fr, Edge::Fl, Edge::Bl, Edge::Br];
const UP_EDGES: [Edge; 4] = [Edge::Ur, Edge::Uf, Edge::Ul, Edge::Ub];
const DOWN_EDGES: [Edge; 4] = [Edge::Dr, Edge::Df, Edge::Dl, Edge::Db];

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Coordinate {
    Twist,
    Flip,
    Slice,
    SliceSorted,
    Corners,
    Edges,
    UEdges,
    DEdges,
    UdEdges,
}

impl Coordinate {
    /// Number of values the coordinate takes.
    #[must_use]
    pub const fn size(self) -> u32 {
        match self {
            Coordinate::Twist => N_TWIST as u32,
            Coordinate::Flip => N_FLIP as u32,
            Coordinate::Slice => N_SLICE as u32,
            Coordinate::SliceSorted | Coordinate::UEdges | Coordinate::DEdges => {
                N_SLICE_SORTED as u32
            }
            Coordinate::Corners => N_CORNERS as u32,
            Coordinate::Edges => N_EDGES,
            Coordinate::UdEdges => N_UD_EDGES as u32,
        }
    }

    /// # Errors
    ///
    /// Returns [`CoordinateError::OutOfRange`] unless `value < self.size()`.
    pub fn check(self, value: u32) -> Result<(), CoordinateError> {
        if value < self.size() {
            Ok(())
        } else {
            Err(CoordinateError::OutOfRange {
                coordinate: self,
                value,
                size: self.size(),
            })
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Coordinate::Twist => "twist",
            Coordinate::Flip => "flip",
            Coordinate::Slice => "slice",
            Coordinate::SliceSorted => "slice_sorted",
            Coordinate::Corners => "corners",
            Coordinate::Edges => "edges",
            Coordinate::UEdges => "u_edges",
            Coordinate::DEdges => "d_edges",
            Coordinate::UdEdges => "ud_edges",
        })
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinateError {
    #[error("The {coordinate} coordinate must be below {size}, got {value}")]
    OutOfRange {
        coordinate: Coordinate,
        value: u32,
        size: u32,
    },
}

/// Binomial coefficient, 0 when `n < k`.
#[must_use]
pub const fn c_nk(n: u32, k: u32) -> u32 {
    if n < k {
        return 0;
    }
    let k = if k > n / 2 { n - k } else { k };
    let mut s = 1;
    let mut i = n;
    let mut j = 1;
    while i != n - k {
        s *= i;
        s /= j;
        i -= 1;
        j += 1;
    }
    s
}

/// Ranks `perm` relative to `solved`: walking from the last position down,
/// count the left rotations of the prefix that bring the solved cubie home.
fn rotation_rank<T: Copy + PartialEq>(perm: &mut [T], solved: &[T]) -> u32 {
    let mut rank = 0;
    for j in (0..perm.len()).rev() {
        let mut k = 0;
        // Bounded so that a cube with duplicate cubies cannot spin forever.
        while perm[j] != solved[j] && k <= j {
            perm[..=j].rotate_left(1);
            k += 1;
        }
        rank = (j as u32 + 1) * rank + k as u32;
    }
    rank
}

/// Inverse of [`rotation_rank`] applied to a prefix that starts solved.
fn rotation_unrank<T>(perm: &mut [T], mut rank: u32) {
    for j in 0..perm.len() {
        let radix = j as u32 + 1;
        perm[..=j].rotate_right((rank % radix) as usize);
        rank /= radix;
    }
}

impl CubieCube {
    /// Corner orientations of the first seven corners, base 3, most
    /// significant first.
    #[must_use]
    pub fn get_twist(&self) -> u16 {
        self.co[..7]
            .iter()
            .fold(0, |twist, &ori| 3 * twist + u16::from(ori))
    }

    pub(crate) fn set_twist_unchecked(&mut self, mut twist: u16) {
        let mut twist_parity = 0;
        for ori in self.co[..7].iter_mut().rev() {
            *ori = (twist % 3) as u8;
            twist_parity += *ori;
            twist /= 3;
        }
        self.co[7] = (3 - twist_parity % 3) % 3;
    }

    /// Edge orientations of the first eleven edges, base 2.
    #[must_use]
    pub fn get_flip(&self) -> u16 {
        self.eo[..11]
            .iter()
            .fold(0, |flip, &ori| 2 * flip + u16::from(ori))
    }

    pub(crate) fn set_flip_unchecked(&mut self, mut flip: u16) {
        let mut flip_parity = 0;
        for ori in self.eo[..11].iter_mut().rev() {
            *ori = (flip % 2) as u8;
            flip_parity += *ori;
            flip /= 2;
        }
        self.eo[11] = (2 - flip_parity % 2) % 2;
    }

    /// Positions of the four UD-slice edges, ignoring their order.
    #[must_use]
    pub fn get_slice(&self) -> u16 {
        let mut a = 0;
        let mut x = 0;
        for (j, edge) in self.ep.iter().enumerate().rev() {
            if edge.is_slice() {
                a += c_nk(11 - j as u32, x + 1);
                x += 1;
            }
        }
        a as u16
    }

    fn set_slice_unchecked(&mut self, slice: u16) {
        const OTHER_EDGES: [Edge; 8] = [
            Edge::Ur,
            Edge::Uf,
            Edge::Ul,
            Edge::Ub,
            Edge::Dr,
            Edge::Df,
            Edge::Dl,
            Edge::Db,
        ];
        self.place_edges(u32::from(slice), SLICE_EDGES, OTHER_EDGES);
    }

    /// Puts `chosen` at the positions encoded by the combination rank `a`
    /// (in the order given) and fills the rest with `others`.
    fn place_edges(&mut self, mut a: u32, chosen: [Edge; 4], others: [Edge; 8]) {
        let mut placed = [false; 12];
        let mut x = 4;
        for (j, is_placed) in placed.iter_mut().enumerate() {
            if x == 0 {
                break;
            }
            let c = c_nk(11 - j as u32, x);
            if a >= c {
                self.ep[j] = chosen[4 - x as usize];
                *is_placed = true;
                a -= c;
                x -= 1;
            }
        }

        let free = self
            .ep
            .iter_mut()
            .zip(placed)
            .filter(|(_, is_placed)| !is_placed)
            .map(|(slot, _)| slot);
        for (slot, edge) in free.zip(others) {
            *slot = edge;
        }
    }

    /// `24 * a + b` where `a` is the combination rank of the positions holding
    /// a member of `solved` and `b` the rank of their order.
    fn edge_subset_coordinate(ep: &[Edge; 12], solved: [Edge; 4]) -> u16 {
        let mut a = 0;
        let mut x = 0;
        let mut subset = solved;
        for (j, &edge) in ep.iter().enumerate().rev() {
            if solved.contains(&edge) {
                if x < 4 {
                    a += c_nk(11 - j as u32, x + 1);
                    subset[3 - x as usize] = edge;
                }
                x += 1;
            }
        }
        let b = rotation_rank(&mut subset, &solved);
        (24 * a + b) as u16
    }

    fn set_edge_subset(&mut self, idx: u16, mut chosen: [Edge; 4], others: [Edge; 8]) {
        let a = idx / N_PERM_4;
        rotation_unrank(&mut chosen, u32::from(idx % N_PERM_4));
        self.place_edges(u32::from(a), chosen, others);
    }

    /// Positions and order of the four UD-slice edges. Zero exactly when the
    /// slice edges are home and in order.
    #[must_use]
    pub fn get_slice_sorted(&self) -> u16 {
        Self::edge_subset_coordinate(&self.ep, SLICE_EDGES)
    }

    fn set_slice_sorted_unchecked(&mut self, idx: u16) {
        self.set_edge_subset(idx, SLICE_EDGES, [
            Edge::Ur,
            Edge::Uf,
            Edge::Ul,
            Edge::Ub,
            Edge::Dr,
            Edge::Df,
            Edge::Dl,
            Edge::Db,
        ]);
    }

    /// Positions and order of the four U edges, counted with the slice
    /// positions moved to the front. 1656 on the solved cube.
    #[must_use]
    pub fn get_u_edges(&self) -> u16 {
        let mut ep = self.ep;
        ep.rotate_right(4);
        Self::edge_subset_coordinate(&ep, UP_EDGES)
    }

    fn set_u_edges_unchecked(&mut self, idx: u16) {
        self.set_edge_subset(idx, UP_EDGES, [
            Edge::Dr,
            Edge::Df,
            Edge::Dl,
            Edge::Db,
            Edge::Fr,
            Edge::Fl,
            Edge::Bl,
            Edge::Br,
        ]);
        self.ep.rotate_left(4);
    }

    /// Positions and order of the four D edges, counted like `u_edges`. Zero
    /// on the solved cube.
    #[must_use]
    pub fn get_d_edges(&self) -> u16 {
        let mut ep = self.ep;
        ep.rotate_right(4);
        Self::edge_subset_coordinate(&ep, DOWN_EDGES)
    }

    fn set_d_edges_unchecked(&mut self, idx: u16) {
        self.set_edge_subset(idx, DOWN_EDGES, [
            Edge::Fr,
            Edge::Fl,
            Edge::Bl,
            Edge::Br,
            Edge::Ur,
            Edge::Uf,
            Edge::Ul,
            Edge::Ub,
        ]);
        self.ep.rotate_left(4);
    }

    #[must_use]
    pub fn get_corners(&self) -> u16 {
        let mut perm = self.cp;
        rotation_rank(&mut perm, &Corner::ALL) as u16
    }

    pub(crate) fn set_corners_unchecked(&mut self, idx: u16) {
        self.cp = Corner::ALL;
        rotation_unrank(&mut self.cp, u32::from(idx));
    }

    /// Permutation of the eight U and D edges. Only meaningful inside the
    /// phase-2 subgroup, where they occupy the first eight positions.
    #[must_use]
    pub fn get_ud_edges(&self) -> u16 {
        let mut perm = [Edge::Ur; 8];
        perm.copy_from_slice(&self.ep[..8]);
        rotation_rank(&mut perm, &Edge::ALL[..8]) as u16
    }

    fn set_ud_edges_unchecked(&mut self, idx: u16) {
        self.ep[..8].copy_from_slice(&Edge::ALL[..8]);
        rotation_unrank(&mut self.ep[..8], u32::from(idx));
    }

    #[must_use]
    pub fn get_edges(&self) -> u32 {
        let mut perm = self.ep;
        rotation_rank(&mut perm, &Edge::ALL)
    }

    pub(crate) fn set_edges_unchecked(&mut self, idx: u32) {
        self.ep = Edge::ALL;
        rotation_unrank(&mut self.ep, idx);
    }
}

macro_rules! checked_setters {
    ($($(#[$meta:meta])* $name:ident($ty:ty) => $unchecked:ident, $coordinate:expr;)*) => {
        impl CubieCube {
            $(
                $(#[$meta])*
                ///
                /// # Errors
                ///
                /// Returns [`CoordinateError::OutOfRange`] if `value` is not a
                /// valid coordinate.
                pub fn $name(&mut self, value: $ty) -> Result<(), CoordinateError> {
                    $coordinate.check(u32::from(value))?;
                    self.$unchecked(value);
                    Ok(())
                }
            )*
        }
    };
}

checked_setters! {
    /// Sets all corner orientations; the last one is forced by the others.
    set_twist(u16) => set_twist_unchecked, Coordinate::Twist;
    /// Sets all edge orientations; the last one is forced by the others.
    set_flip(u16) => set_flip_unchecked, Coordinate::Flip;
    /// Rearranges all edges so the slice edges sit at the encoded positions.
    set_slice(u16) => set_slice_unchecked, Coordinate::Slice;
    /// Rearranges all edges so the slice edges sit at the encoded positions
    /// in the encoded order.
    set_slice_sorted(u16) => set_slice_sorted_unchecked, Coordinate::SliceSorted;
    /// Rearranges all edges so the U edges sit as encoded.
    set_u_edges(u16) => set_u_edges_unchecked, Coordinate::UEdges;
    /// Rearranges all edges so the D edges sit as encoded.
    set_d_edges(u16) => set_d_edges_unchecked, Coordinate::DEdges;
    /// Sets the corner permutation.
    set_corners(u16) => set_corners_unchecked, Coordinate::Corners;
    /// Sets the first eight edge positions; the slice positions are left
    /// untouched.
    set_ud_edges(u16) => set_ud_edges_unchecked, Coordinate::UdEdges;
    /// Sets the edge permutation.
    set_edges(u32) => set_edges_unchecked, Coordinate::Edges;
}
