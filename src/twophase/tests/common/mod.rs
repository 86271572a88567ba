//! Tables built from the cube model itself, small enough to generate inside a
//! test. The move tables are complete. The pruning tables only know the
//! states within [`RADIUS`] moves of their goal and hold the "too far" entry
//! 3 everywhere else, so a search that never needs more than `RADIUS` moves
//! per phase runs exactly as it would on the full tables.

use std::{
    collections::{HashMap, hash_map::Entry},
    hash::Hash,
    sync::Arc,
};

use twophase::{
    InMemoryTables, SolverConfig, TableName, Tables,
    tables::{N_CORNERS_CLASS, N_FLIPSLICE_CLASS, N_SYM_D4H},
};
use twophase_core::{
    CubieCube, Move,
    coord::{
        N_CORNERS, N_FLIP, N_MOVE, N_PERM_4, N_SLICE, N_SLICE_SORTED, N_TWIST, N_U_EDGES_PHASE2,
        N_UD_EDGES,
    },
};

pub const RADIUS: u8 = 3;

/// Class shared by every flipslice value farther than `RADIUS` from H.
const FAR_FLIPSLICE_CLASS: u16 = (N_FLIPSLICE_CLASS - 1) as u16;
/// Class shared by every corner permutation farther than `RADIUS` from solved.
const FAR_CORNERS_CLASS: u16 = (N_CORNERS_CLASS - 1) as u16;

pub struct SmallTables {
    pub tables: Arc<Tables>,
    /// Phase-1 distance of every `(flip, slice, twist)` within `RADIUS`.
    pub phase1_depths: HashMap<(u16, u16, u16), u8>,
    /// Phase-2 distance of every `(corners, ud_edges)` within `RADIUS`.
    pub phase2_depths: HashMap<(u16, u16), u8>,
}

/// Keeps both phases within `RADIUS` moves.
pub fn config() -> SolverConfig {
    SolverConfig {
        max_depth: RADIUS + 1,
        phase2_max_depth: RADIUS + 1,
        ..SolverConfig::default()
    }
}

fn move_table(
    size: u16,
    moves: &[Move],
    set: fn(&mut CubieCube, u16),
    get: fn(&CubieCube) -> u16,
) -> Vec<u16> {
    let mut table = vec![0; usize::from(size) * N_MOVE];
    for coord in 0..size {
        let mut cube = CubieCube::SOLVED;
        set(&mut cube, coord);
        for &mv in moves {
            let mut moved = cube.clone();
            moved.apply_move(mv);
            table[N_MOVE * usize::from(coord) + mv.index()] = get(&moved);
        }
    }
    table
}

fn at(table: &[u16], coord: u16, mv: Move) -> u16 {
    table[N_MOVE * usize::from(coord) + mv.index()]
}

fn breadth_first<S: Copy + Eq + Hash>(
    start: S,
    moves: &[Move],
    apply: impl Fn(S, Move) -> S,
) -> HashMap<S, u8> {
    let mut depths = HashMap::from([(start, 0)]);
    let mut frontier = vec![start];
    for depth in 1..=RADIUS {
        let mut next = Vec::new();
        for &state in &frontier {
            for &mv in moves {
                if let Entry::Vacant(entry) = depths.entry(apply(state, mv)) {
                    next.push(*entry.key());
                    entry.insert(depth);
                }
            }
        }
        frontier = next;
    }
    depths
}

fn set_depth3(words: &mut [u32], index: usize, depth: u8) {
    let shift = (index % 16) * 2;
    let word = &mut words[index / 16];
    *word = (*word & !(3 << shift)) | (u32::from(depth % 3) << shift);
}

fn identity_conj(size: u16) -> Vec<u16> {
    (0..size)
        .flat_map(|coord| [coord; N_SYM_D4H as usize])
        .collect()
}

fn u16_bytes(table: &[u16]) -> Vec<u8> {
    table.iter().flat_map(|value| value.to_le_bytes()).collect()
}

fn u32_bytes(table: &[u32]) -> Vec<u8> {
    table.iter().flat_map(|value| value.to_le_bytes()).collect()
}

/// `ud_edges` of the phase-2 cube whose U edges are described by `u_edges`
/// and whose D edges fill the remaining U/D positions in the order
/// `d_edges % 24` encodes.
fn edge_merge() -> Vec<u16> {
    let down_positions = |cube: &CubieCube| {
        (0..12)
            .filter(|&i| cube.ep[i].is_down())
            .collect::<Vec<_>>()
    };

    let mut table = vec![0; TableName::Phase2EdgeMerge.entry_count()];
    for u_edges in 0..N_U_EDGES_PHASE2 {
        let mut up = CubieCube::SOLVED;
        up.set_u_edges(u_edges).unwrap();
        let free = (0..8).filter(|&i| !up.ep[i].is_up()).collect::<Vec<_>>();
        let combination = (0..N_SLICE)
            .find(|&a| {
                let mut down = CubieCube::SOLVED;
                down.set_d_edges(a * N_PERM_4).unwrap();
                down_positions(&down) == free
            })
            .unwrap();

        for order in 0..N_PERM_4 {
            let mut down = CubieCube::SOLVED;
            down.set_d_edges(combination * N_PERM_4 + order).unwrap();
            let mut merged = CubieCube::SOLVED;
            for i in 0..8 {
                merged.ep[i] = if up.ep[i].is_up() {
                    up.ep[i]
                } else {
                    down.ep[i]
                };
            }
            table[usize::from(N_PERM_4 * u_edges + order)] = merged.get_ud_edges();
        }
    }
    table
}

impl SmallTables {
    pub fn build() -> Self {
        let twist_move = move_table(
            N_TWIST,
            &Move::ALL,
            |cube, twist| cube.set_twist(twist).unwrap(),
            CubieCube::get_twist,
        );
        let flip_move = move_table(
            N_FLIP,
            &Move::ALL,
            |cube, flip| cube.set_flip(flip).unwrap(),
            CubieCube::get_flip,
        );
        let slice_sorted_move = move_table(
            N_SLICE_SORTED,
            &Move::ALL,
            |cube, slice_sorted| cube.set_slice_sorted(slice_sorted).unwrap(),
            CubieCube::get_slice_sorted,
        );
        let u_edges_move = move_table(
            N_SLICE_SORTED,
            &Move::ALL,
            |cube, u_edges| cube.set_u_edges(u_edges).unwrap(),
            CubieCube::get_u_edges,
        );
        let d_edges_move = move_table(
            N_SLICE_SORTED,
            &Move::ALL,
            |cube, d_edges| cube.set_d_edges(d_edges).unwrap(),
            CubieCube::get_d_edges,
        );
        let corners_move = move_table(
            N_CORNERS,
            &Move::ALL,
            |cube, corners| cube.set_corners(corners).unwrap(),
            CubieCube::get_corners,
        );
        // Outside H the U/D edge permutation is meaningless; those entries
        // stay 0.
        let ud_edges_move = move_table(
            N_UD_EDGES,
            &Move::PHASE2,
            |cube, ud_edges| cube.set_ud_edges(ud_edges).unwrap(),
            CubieCube::get_ud_edges,
        );

        let phase1_depths = breadth_first((0, 0, 0), &Move::ALL, |(flip, slice, twist), mv| {
            (
                at(&flip_move, flip, mv),
                at(&slice_sorted_move, slice * N_PERM_4, mv) / N_PERM_4,
                at(&twist_move, twist, mv),
            )
        });
        let mut flipslice_classidx =
            vec![FAR_FLIPSLICE_CLASS; usize::from(N_FLIP) * usize::from(N_SLICE)];
        let mut phase1_prun = vec![u32::MAX; TableName::Phase1Prun.entry_count()];
        let mut classes = 0;
        for (&(flip, slice, twist), &depth) in &phase1_depths {
            let flipslice = usize::from(N_FLIP) * usize::from(slice) + usize::from(flip);
            if flipslice_classidx[flipslice] == FAR_FLIPSLICE_CLASS {
                flipslice_classidx[flipslice] = classes;
                classes += 1;
            }
            let index = usize::from(N_TWIST) * usize::from(flipslice_classidx[flipslice])
                + usize::from(twist);
            set_depth3(&mut phase1_prun, index, depth);
        }
        assert!(classes < FAR_FLIPSLICE_CLASS);

        let phase2_depths = breadth_first((0, 0), &Move::PHASE2, |(corners, ud_edges), mv| {
            (at(&corners_move, corners, mv), at(&ud_edges_move, ud_edges, mv))
        });
        let mut corner_classidx = vec![FAR_CORNERS_CLASS; usize::from(N_CORNERS)];
        let mut phase2_prun = vec![u32::MAX; TableName::Phase2Prun.entry_count()];
        let mut classes = 0;
        for (&(corners, ud_edges), &depth) in &phase2_depths {
            let corners = usize::from(corners);
            if corner_classidx[corners] == FAR_CORNERS_CLASS {
                corner_classidx[corners] = classes;
                classes += 1;
            }
            let index = usize::from(N_UD_EDGES) * usize::from(corner_classidx[corners])
                + usize::from(ud_edges);
            set_depth3(&mut phase2_prun, index, depth);
        }
        assert!(classes < FAR_CORNERS_CLASS);

        // Unvisited states are more than `RADIUS` away, which makes
        // `RADIUS + 1` an exact lower bound for them.
        let corner_slice_depths =
            breadth_first((0, 0), &Move::PHASE2, |(corners, slice_sorted), mv| {
                (
                    at(&corners_move, corners, mv),
                    at(&slice_sorted_move, slice_sorted, mv),
                )
            });
        let mut corner_slice_prun =
            vec![RADIUS + 1; TableName::Phase2CornerSlicePrun.entry_count()];
        for (&(corners, slice_sorted), &depth) in &corner_slice_depths {
            corner_slice_prun
                [usize::from(N_PERM_4) * usize::from(corners) + usize::from(slice_sorted)] = depth;
        }

        let mut provider = InMemoryTables::new();
        provider.insert(TableName::FlipsliceClassidx, u16_bytes(&flipslice_classidx));
        provider.insert(
            TableName::FlipsliceSym,
            vec![0; TableName::FlipsliceSym.entry_count()],
        );
        provider.insert(TableName::Phase1Prun, u32_bytes(&phase1_prun));
        provider.insert(TableName::ConjTwist, u16_bytes(&identity_conj(N_TWIST)));
        provider.insert(TableName::MoveTwist, u16_bytes(&twist_move));
        provider.insert(TableName::MoveFlip, u16_bytes(&flip_move));
        provider.insert(TableName::MoveSliceSorted, u16_bytes(&slice_sorted_move));
        provider.insert(TableName::MoveCorners, u16_bytes(&corners_move));
        provider.insert(TableName::Phase2CornerSlicePrun, corner_slice_prun);
        provider.insert(TableName::Phase2EdgeMerge, u16_bytes(&edge_merge()));
        provider.insert(TableName::Phase2Prun, u32_bytes(&phase2_prun));
        provider.insert(TableName::CornerClassidx, u16_bytes(&corner_classidx));
        provider.insert(
            TableName::CornerSym,
            vec![0; TableName::CornerSym.entry_count()],
        );
        provider.insert(TableName::ConjUdEdges, u16_bytes(&identity_conj(N_UD_EDGES)));
        provider.insert(TableName::MoveUdEdges, u16_bytes(&ud_edges_move));
        provider.insert(TableName::MoveUEdges, u16_bytes(&u_edges_move));
        provider.insert(TableName::MoveDEdges, u16_bytes(&d_edges_move));

        SmallTables {
            tables: Arc::new(Tables::load(&provider).unwrap()),
            phase1_depths,
            phase2_depths,
        }
    }
}
