//! The move, symmetry and pruning tables the search runs on. They are produced
//! elsewhere and handed to [`Tables::load`] as raw little-endian arrays through
//! a [`TableProvider`].

mod packed;
mod provider;

use std::{borrow::Cow, fmt, io, path::PathBuf, time::Instant};

use log::info;
use thiserror::Error;
use twophase_core::{
    CoordinateError,
    coord::{
        N_CORNERS, N_FLIP, N_MOVE, N_PERM_4, N_SLICE, N_SLICE_SORTED, N_TWIST, N_U_EDGES_PHASE2,
        N_UD_EDGES,
    },
};

pub use packed::PackedDepthTable;
pub use provider::{DirectoryTables, InMemoryTables};

use crate::{start, success};

/// Number of flipslice equivalence classes under the 16 symmetries of D4h.
pub const N_FLIPSLICE_CLASS: u32 = 64430;
/// Number of corner permutation equivalence classes under D4h.
pub const N_CORNERS_CLASS: u32 = 2768;
pub const N_SYM_D4H: u32 = 16;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ElementWidth {
    U8 = 1,
    U16 = 2,
    U32 = 4,
}

impl ElementWidth {
    #[must_use]
    pub const fn bytes(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum TableName {
    FlipsliceClassidx,
    FlipsliceSym,
    Phase1Prun,
    ConjTwist,
    MoveTwist,
    MoveFlip,
    MoveSliceSorted,
    MoveCorners,
    Phase2CornerSlicePrun,
    Phase2EdgeMerge,
    Phase2Prun,
    CornerClassidx,
    CornerSym,
    ConjUdEdges,
    MoveUdEdges,
    MoveUEdges,
    MoveDEdges,
}

impl TableName {
    pub const ALL: [Self; 17] = {
        use TableName::*;
        let v = [
            FlipsliceClassidx,
            FlipsliceSym,
            Phase1Prun,
            ConjTwist,
            MoveTwist,
            MoveFlip,
            MoveSliceSorted,
            MoveCorners,
            Phase2CornerSlicePrun,
            Phase2EdgeMerge,
            Phase2Prun,
            CornerClassidx,
            CornerSym,
            ConjUdEdges,
            MoveUdEdges,
            MoveUEdges,
            MoveDEdges,
        ];

        let mut i = 0;
        while i < v.len() {
            assert!(i == v[i] as usize);
            i += 1;
        }

        v
    };

    /// File name of the table inside a table directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            TableName::FlipsliceClassidx => "fs_classidx",
            TableName::FlipsliceSym => "fs_sym",
            TableName::Phase1Prun => "phase1_prun",
            TableName::ConjTwist => "conj_twist",
            TableName::MoveTwist => "move_twist",
            TableName::MoveFlip => "move_flip",
            TableName::MoveSliceSorted => "move_slice_sorted",
            TableName::MoveCorners => "move_corners",
            TableName::Phase2CornerSlicePrun => "phase2_cornsliceprun",
            TableName::Phase2EdgeMerge => "phase2_edgemerge",
            TableName::Phase2Prun => "phase2_prun",
            TableName::CornerClassidx => "co_classidx",
            TableName::CornerSym => "co_sym",
            TableName::ConjUdEdges => "conj_ud_edges",
            TableName::MoveUdEdges => "move_ud_edges",
            TableName::MoveUEdges => "move_u_edges",
            TableName::MoveDEdges => "move_d_edges",
        }
    }

    #[must_use]
    pub const fn width(self) -> ElementWidth {
        match self {
            TableName::FlipsliceSym | TableName::Phase2CornerSlicePrun | TableName::CornerSym => {
                ElementWidth::U8
            }
            TableName::Phase1Prun | TableName::Phase2Prun => ElementWidth::U32,
            _ => ElementWidth::U16,
        }
    }

    /// Number of elements the table must hold.
    #[must_use]
    pub const fn entry_count(self) -> usize {
        const MOVE: usize = N_MOVE;
        const SYM: usize = N_SYM_D4H as usize;
        const FLIPSLICE: usize = N_FLIP as usize * N_SLICE as usize;
        match self {
            TableName::FlipsliceClassidx | TableName::FlipsliceSym => FLIPSLICE,
            TableName::Phase1Prun => N_FLIPSLICE_CLASS as usize * N_TWIST as usize / 16 + 1,
            TableName::ConjTwist => N_TWIST as usize * SYM,
            TableName::MoveTwist => N_TWIST as usize * MOVE,
            TableName::MoveFlip => N_FLIP as usize * MOVE,
            TableName::MoveSliceSorted | TableName::MoveUEdges | TableName::MoveDEdges => {
                N_SLICE_SORTED as usize * MOVE
            }
            TableName::MoveCorners | TableName::MoveUdEdges => N_CORNERS as usize * MOVE,
            TableName::Phase2CornerSlicePrun => N_CORNERS as usize * N_PERM_4 as usize,
            TableName::Phase2EdgeMerge => N_U_EDGES_PHASE2 as usize * N_PERM_4 as usize,
            TableName::Phase2Prun => N_CORNERS_CLASS as usize * N_UD_EDGES as usize / 16 + 1,
            TableName::CornerClassidx | TableName::CornerSym => N_CORNERS as usize,
            TableName::ConjUdEdges => N_UD_EDGES as usize * SYM,
        }
    }

    /// Exclusive upper bound on the values of the table, for the tables whose
    /// values index other tables.
    #[must_use]
    pub const fn value_bound(self) -> Option<u32> {
        match self {
            TableName::FlipsliceClassidx => Some(N_FLIPSLICE_CLASS),
            TableName::CornerClassidx => Some(N_CORNERS_CLASS),
            TableName::FlipsliceSym | TableName::CornerSym => Some(N_SYM_D4H),
            TableName::ConjTwist | TableName::MoveTwist => Some(N_TWIST as u32),
            TableName::MoveFlip => Some(N_FLIP as u32),
            TableName::MoveSliceSorted | TableName::MoveUEdges | TableName::MoveDEdges => {
                Some(N_SLICE_SORTED as u32)
            }
            TableName::MoveCorners => Some(N_CORNERS as u32),
            TableName::Phase2EdgeMerge | TableName::ConjUdEdges | TableName::MoveUdEdges => {
                Some(N_UD_EDGES as u32)
            }
            TableName::Phase1Prun | TableName::Phase2Prun | TableName::Phase2CornerSlicePrun => {
                None
            }
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_name())
    }
}

#[derive(Debug, Error)]
pub enum TableError {
    #[error("Could not read table {name} from {}", .path.display())]
    Io {
        name: TableName,
        path: PathBuf,
        source: io::Error,
    },
    #[error("Table {0} was not provided")]
    Missing(TableName),
    #[error("No table directory was configured and no cache directory is available")]
    NoDirectory,
    #[error("Table {name} is {len} bytes long, which is not a multiple of {width}")]
    MisalignedBytes {
        name: TableName,
        len: usize,
        width: usize,
    },
    #[error("Table {name} has {actual} entries but {expected} were expected")]
    WrongLength {
        name: TableName,
        expected: usize,
        actual: usize,
    },
    #[error("Table {name} holds {value} at index {index} but its values must be below {bound}")]
    ValueOutOfRange {
        name: TableName,
        index: usize,
        value: u32,
        bound: u32,
    },
    #[error("Table {0} is inconsistent: no move leads one step closer to the goal")]
    Inconsistent(TableName),
    #[error("Table lookup with an invalid coordinate: {0}")]
    InvalidCoordinate(#[from] CoordinateError),
}

/// Source of raw table bytes.
pub trait TableProvider {
    /// Returns the little-endian bytes of table `name`, whose elements are
    /// `width` bytes wide.
    ///
    /// # Errors
    ///
    /// Returns an error if the table is unavailable.
    fn load(&self, name: TableName, width: ElementWidth) -> Result<Cow<'_, [u8]>, TableError>;
}

trait TableElement: Copy + Into<u32> {
    const WIDTH: ElementWidth;

    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! table_element {
    ($($ty:ty => $width:expr),*) => {
        $(
            impl TableElement for $ty {
                const WIDTH: ElementWidth = $width;

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0; size_of::<$ty>()];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

table_element!(u8 => ElementWidth::U8, u16 => ElementWidth::U16, u32 => ElementWidth::U32);

fn load_table<T: TableElement>(
    provider: &impl TableProvider,
    name: TableName,
) -> Result<Box<[T]>, TableError> {
    debug_assert_eq!(name.width(), T::WIDTH);
    let bytes = provider.load(name, T::WIDTH)?;
    let width = T::WIDTH.bytes();
    if bytes.len() % width != 0 {
        return Err(TableError::MisalignedBytes {
            name,
            len: bytes.len(),
            width,
        });
    }
    let actual = bytes.len() / width;
    if actual != name.entry_count() {
        return Err(TableError::WrongLength {
            name,
            expected: name.entry_count(),
            actual,
        });
    }

    let table = bytes
        .chunks_exact(width)
        .map(T::from_le_slice)
        .collect::<Box<[T]>>();
    if let Some(bound) = name.value_bound()
        && let Some((index, value)) = table
            .iter()
            .map(|&value| -> u32 { value.into() })
            .enumerate()
            .find(|&(_, value)| value >= bound)
    {
        return Err(TableError::ValueOutOfRange {
            name,
            index,
            value,
            bound,
        });
    }
    Ok(table)
}

/// All tables, resident and validated. Immutable once loaded and freely
/// shared between solvers.
pub struct Tables {
    pub(crate) flipslice_classidx: Box<[u16]>,
    pub(crate) flipslice_sym: Box<[u8]>,
    pub(crate) flipslice_twist_depth3: PackedDepthTable,
    pub(crate) twist_conj: Box<[u16]>,
    pub(crate) twist_move: Box<[u16]>,
    pub(crate) flip_move: Box<[u16]>,
    pub(crate) slice_sorted_move: Box<[u16]>,
    pub(crate) corners_move: Box<[u16]>,
    pub(crate) corner_slice_depth: Box<[u8]>,
    pub(crate) edge_merge: Box<[u16]>,
    pub(crate) corners_ud_edges_depth3: PackedDepthTable,
    pub(crate) corner_classidx: Box<[u16]>,
    pub(crate) corner_sym: Box<[u8]>,
    pub(crate) ud_edges_conj: Box<[u16]>,
    pub(crate) ud_edges_move: Box<[u16]>,
    pub(crate) u_edges_move: Box<[u16]>,
    pub(crate) d_edges_move: Box<[u16]>,
}

impl fmt::Debug for Tables {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tables").finish_non_exhaustive()
    }
}

impl Tables {
    /// Loads and validates every table. Returns only once all of them are
    /// resident.
    ///
    /// # Errors
    ///
    /// Fails if a table is unavailable, has the wrong size, or holds a value
    /// that would index past the table it points into.
    pub fn load(provider: &impl TableProvider) -> Result<Self, TableError> {
        info!(start!("Loading {} tables"), TableName::ALL.len());
        let start = Instant::now();

        let tables = Tables {
            flipslice_classidx: load_table(provider, TableName::FlipsliceClassidx)?,
            flipslice_sym: load_table(provider, TableName::FlipsliceSym)?,
            flipslice_twist_depth3: PackedDepthTable::new(load_table(
                provider,
                TableName::Phase1Prun,
            )?),
            twist_conj: load_table(provider, TableName::ConjTwist)?,
            twist_move: load_table(provider, TableName::MoveTwist)?,
            flip_move: load_table(provider, TableName::MoveFlip)?,
            slice_sorted_move: load_table(provider, TableName::MoveSliceSorted)?,
            corners_move: load_table(provider, TableName::MoveCorners)?,
            corner_slice_depth: load_table(provider, TableName::Phase2CornerSlicePrun)?,
            edge_merge: load_table(provider, TableName::Phase2EdgeMerge)?,
            corners_ud_edges_depth3: PackedDepthTable::new(load_table(
                provider,
                TableName::Phase2Prun,
            )?),
            corner_classidx: load_table(provider, TableName::CornerClassidx)?,
            corner_sym: load_table(provider, TableName::CornerSym)?,
            ud_edges_conj: load_table(provider, TableName::ConjUdEdges)?,
            ud_edges_move: load_table(provider, TableName::MoveUdEdges)?,
            u_edges_move: load_table(provider, TableName::MoveUEdges)?,
            d_edges_move: load_table(provider, TableName::MoveDEdges)?,
        };

        info!(
            success!("Loaded tables in {:.3}s"),
            start.elapsed().as_secs_f64()
        );
        Ok(tables)
    }

    /// Convenience for [`Tables::load`] with a [`DirectoryTables`] provider.
    ///
    /// # Errors
    ///
    /// See [`Tables::load`].
    pub fn load_from_dir(dir: impl Into<PathBuf>) -> Result<Self, TableError> {
        Self::load(&DirectoryTables::new(dir))
    }
}
