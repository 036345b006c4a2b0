//! Move engine and terminal detection.
//!
//! Every direction is reduced to "slide left": the grid is rotated so that
//! the requested direction points left, each row is compacted and merged by
//! [`slide_lane`], and the result is rotated back.

use crate::grid::{Cell, Grid};
use crate::Direction;

/// Outcome of sliding a grid in one direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    /// The grid after the slide (no tile spawned yet).
    pub grid: Grid,
    /// Sum of the values created by merges.
    pub gained: u64,
    /// False when the slide left every cell unchanged.
    pub moved: bool,
}

impl Direction {
    /// Clockwise quarter turns that make this direction point left.
    fn turns(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Right => 2,
            Direction::Up => 3,
            Direction::Down => 1,
        }
    }
}

/// Compact and merge one lane towards index 0.
///
/// Empty cells are dropped, equal neighbouring tiles merge once per pass,
/// and the lane is padded back to its width with empty cells. Power-up
/// markers slide like tiles but never merge, and neither do two
/// [`MAX_TILE`](crate::grid::MAX_TILE) tiles. Returns the new lane and the
/// points earned.
pub fn slide_lane(lane: &[Cell]) -> (Vec<Cell>, u64) {
    let packed: Vec<Cell> = lane.iter().copied().filter(|c| !c.is_empty()).collect();

    let mut out = Vec::with_capacity(lane.len());
    let mut gained = 0;
    let mut i = 0;
    while i < packed.len() {
        let cell = packed[i];
        match packed.get(i + 1).and_then(|&next| cell.merged_with(next)) {
            Some(merged) => {
                gained += u64::from(merged);
                out.push(Cell::Tile(merged));
                i += 2;
            }
            None => {
                out.push(cell);
                i += 1;
            }
        }
    }

    out.resize(lane.len(), Cell::Empty);
    (out, gained)
}

fn slide_left(grid: &Grid) -> (Grid, u64) {
    let mut cells = Vec::with_capacity(grid.cells().len());
    let mut gained = 0;
    for row in grid.rows() {
        let (lane, points) = slide_lane(row);
        cells.extend(lane);
        gained += points;
    }
    (Grid::from_cells(grid.size(), cells), gained)
}

/// Slide `grid` in `direction` without touching the input.
pub fn shift(grid: &Grid, direction: Direction) -> MoveResult {
    let turns = direction.turns();
    let (slid, gained) = slide_left(&grid.rotated(turns));
    let out = slid.rotated(4 - turns);
    debug_assert!(out.is_valid(), "move produced an invalid grid:\n{}", out);

    let moved = out != *grid;
    MoveResult {
        grid: out,
        gained,
        moved,
    }
}

/// Apply a move to a (grid, score) pair.
///
/// On a no-op the inputs come back unchanged with `moved = false`. Spawning
/// a new tile, checking for game over and snapshotting for undo are left to
/// the caller.
pub fn apply_move(grid: &Grid, score: u64, direction: Direction) -> (Grid, u64, bool) {
    let result = shift(grid, direction);
    if result.moved {
        (result.grid, score + result.gained, true)
    } else {
        (grid.clone(), score, false)
    }
}

/// Whether any move is still possible: an empty cell, or two orthogonally
/// adjacent tiles that merge.
pub fn has_move(grid: &Grid) -> bool {
    if grid.cells().iter().any(|c| c.is_empty()) {
        return true;
    }

    let n = grid.size();
    let pairs = |a: Cell, b: Cell| a.merged_with(b).is_some();
    for r in 0..n {
        for c in 0..n {
            let here = grid.get(r, c);
            if c + 1 < n && pairs(here, grid.get(r, c + 1)) {
                return true;
            }
            if r + 1 < n && pairs(here, grid.get(r + 1, c)) {
                return true;
            }
        }
    }
    false
}

pub fn is_game_over(grid: &Grid) -> bool {
    !has_move(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{PowerUp, MAX_TILE};
    use proptest::prelude::*;

    fn lane(values: &[u32]) -> Vec<Cell> {
        values.iter().map(|&v| Cell::from_value(v).unwrap()).collect()
    }

    fn grid(rows: &[[u32; 4]; 4]) -> Grid {
        Grid::from_rows(rows).unwrap()
    }

    // -------------------------------------------------------------------------
    // Lane reduction
    // -------------------------------------------------------------------------

    #[test]
    fn test_slide_compacts_without_merge() {
        let (out, gained) = slide_lane(&lane(&[0, 2, 0, 4]));
        assert_eq!(out, lane(&[2, 4, 0, 0]));
        assert_eq!(gained, 0);
    }

    #[test]
    fn test_slide_all_empty() {
        let (out, gained) = slide_lane(&lane(&[0, 0, 0, 0]));
        assert_eq!(out, lane(&[0, 0, 0, 0]));
        assert_eq!(gained, 0);
    }

    #[test]
    fn test_slide_merge_across_gap() {
        let (out, gained) = slide_lane(&lane(&[0, 2, 0, 2]));
        assert_eq!(out, lane(&[4, 0, 0, 0]));
        assert_eq!(gained, 4);
    }

    #[test]
    fn test_slide_no_double_merge_chain() {
        let (out, gained) = slide_lane(&lane(&[2, 2, 2, 2]));
        assert_eq!(out, lane(&[4, 4, 0, 0]));
        assert_eq!(gained, 8);
    }

    #[test]
    fn test_slide_merged_tile_does_not_remerge() {
        let (out, gained) = slide_lane(&lane(&[4, 2, 2, 0]));
        assert_eq!(out, lane(&[4, 4, 0, 0]));
        assert_eq!(gained, 4);
    }

    #[test]
    fn test_slide_odd_run_merges_leading_pair() {
        let (out, gained) = slide_lane(&lane(&[2, 2, 2, 0]));
        assert_eq!(out, lane(&[4, 2, 0, 0]));
        assert_eq!(gained, 4);
    }

    #[test]
    fn test_slide_power_ups_never_merge() {
        let d = Cell::PowerUp(PowerUp::DoubleScore);
        let (out, gained) = slide_lane(&[Cell::Empty, d, d, Cell::Tile(2)]);
        assert_eq!(out, vec![d, d, Cell::Tile(2), Cell::Empty]);
        assert_eq!(gained, 0);

        let (out, _) = slide_lane(&[Cell::Tile(2), d, Cell::Tile(2), Cell::Empty]);
        assert_eq!(out, vec![Cell::Tile(2), d, Cell::Tile(2), Cell::Empty]);
    }

    #[test]
    fn test_slide_reaches_max_tile() {
        let half = Cell::Tile(MAX_TILE / 2);
        let (out, gained) = slide_lane(&[half, Cell::Empty, half, Cell::Empty]);
        assert_eq!(out[0], Cell::Tile(MAX_TILE));
        assert_eq!(gained, u64::from(MAX_TILE));
    }

    #[test]
    fn test_slide_max_tiles_do_not_merge() {
        let top = Cell::Tile(MAX_TILE);
        let (out, gained) = slide_lane(&[Cell::Empty, top, top, Cell::Tile(2)]);
        assert_eq!(out, vec![top, top, Cell::Tile(2), Cell::Empty]);
        assert_eq!(gained, 0);
    }

    // -------------------------------------------------------------------------
    // Four directions
    // -------------------------------------------------------------------------

    #[test]
    fn test_move_left() {
        let g = grid(&[[2, 2, 0, 0], [0, 4, 4, 0], [2, 0, 2, 0], [8, 8, 8, 8]]);
        let result = shift(&g, Direction::Left);
        assert_eq!(
            result.grid,
            grid(&[[4, 0, 0, 0], [8, 0, 0, 0], [4, 0, 0, 0], [16, 16, 0, 0]])
        );
        assert_eq!(result.gained, 4 + 8 + 4 + 32);
        assert!(result.moved);
    }

    #[test]
    fn test_move_right() {
        let g = grid(&[[2, 2, 0, 0], [0, 4, 4, 0], [2, 0, 2, 0], [8, 8, 8, 8]]);
        let result = shift(&g, Direction::Right);
        assert_eq!(
            result.grid,
            grid(&[[0, 0, 0, 4], [0, 0, 0, 8], [0, 0, 0, 4], [0, 0, 16, 16]])
        );
        assert_eq!(result.gained, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_move_up() {
        let g = grid(&[[2, 0, 2, 8], [2, 4, 0, 8], [0, 4, 2, 8], [0, 0, 0, 8]]);
        let result = shift(&g, Direction::Up);
        assert_eq!(
            result.grid,
            grid(&[[4, 8, 4, 16], [0, 0, 0, 16], [0, 0, 0, 0], [0, 0, 0, 0]])
        );
        assert_eq!(result.gained, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_move_down() {
        let g = grid(&[[2, 0, 2, 8], [2, 4, 0, 8], [0, 4, 2, 8], [0, 0, 0, 8]]);
        let result = shift(&g, Direction::Down);
        assert_eq!(
            result.grid,
            grid(&[[0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 16], [4, 8, 4, 16]])
        );
        assert_eq!(result.gained, 4 + 8 + 4 + 32);
    }

    #[test]
    fn test_up_keeps_column_order() {
        let g = grid(&[[0, 0, 0, 0], [2, 0, 0, 0], [0, 0, 0, 0], [4, 0, 0, 0]]);
        let result = shift(&g, Direction::Up);
        assert_eq!(
            result.grid,
            grid(&[[2, 0, 0, 0], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]])
        );
    }

    #[test]
    fn test_scenario_pair_in_first_row() {
        let g = grid(&[[2, 2, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let (out, score, moved) = apply_move(&g, 10, Direction::Left);
        assert!(moved);
        assert_eq!(
            out,
            grid(&[[4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]])
        );
        assert_eq!(score, 14);
    }

    #[test]
    fn test_noop_move_returns_input() {
        let g = grid(&[[2, 0, 0, 0], [4, 0, 0, 0], [8, 0, 0, 0], [16, 0, 0, 0]]);
        let (out, score, moved) = apply_move(&g, 7, Direction::Left);
        assert!(!moved);
        assert_eq!(out, g);
        assert_eq!(score, 7);
        let (_, _, moved_again) = apply_move(&out, score, Direction::Left);
        assert!(!moved_again);
    }

    #[test]
    fn test_compaction_alone_is_a_move() {
        let g = grid(&[[0, 2, 0, 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let result = shift(&g, Direction::Left);
        assert!(result.moved);
        assert_eq!(result.gained, 0);
    }

    #[test]
    fn test_shift_on_other_sizes() {
        let g = Grid::from_rows(&[[2, 2, 4], [0, 0, 0], [4, 0, 4]]).unwrap();
        let result = shift(&g, Direction::Right);
        assert_eq!(
            result.grid,
            Grid::from_rows(&[[0, 4, 4], [0, 0, 0], [0, 0, 8]]).unwrap()
        );
        assert_eq!(result.gained, 12);
    }

    #[test]
    fn test_max_tiles_in_one_row() {
        let g = Grid::from_rows(&[[MAX_TILE, MAX_TILE], [0, 0]]).unwrap();
        let left = shift(&g, Direction::Left);
        assert!(!left.moved);
        assert_eq!(left.gained, 0);

        let down = shift(&g, Direction::Down);
        assert!(down.moved);
        assert_eq!(
            down.grid,
            Grid::from_rows(&[[0, 0], [MAX_TILE, MAX_TILE]]).unwrap()
        );
        assert_eq!(down.gained, 0);
    }

    // -------------------------------------------------------------------------
    // Terminal detection
    // -------------------------------------------------------------------------

    #[test]
    fn test_full_board_without_pairs_is_terminal() {
        let g = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        assert!(!has_move(&g));
        assert!(is_game_over(&g));
        for dir in Direction::ALL {
            assert!(!shift(&g, dir).moved);
        }
    }

    #[test]
    fn test_empty_cell_keeps_game_alive() {
        let g = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 0, 4], [4, 2, 4, 2]]);
        assert!(has_move(&g));
    }

    #[test]
    fn test_horizontal_pair_keeps_game_alive() {
        let g = grid(&[[2, 2, 4, 8], [4, 8, 16, 32], [8, 16, 32, 64], [16, 32, 64, 128]]);
        assert!(has_move(&g));
    }

    #[test]
    fn test_vertical_pair_keeps_game_alive() {
        let g = grid(&[[2, 4, 8, 16], [2, 8, 16, 32], [4, 16, 32, 64], [8, 32, 64, 128]]);
        assert!(has_move(&g));
    }

    #[test]
    fn test_equal_power_ups_do_not_pair() {
        let d = Cell::PowerUp(PowerUp::DoubleScore);
        let mut g = grid(&[[2, 4, 2, 4], [4, 2, 4, 2], [2, 4, 2, 4], [4, 2, 4, 2]]);
        g.set(0, 0, d);
        g.set(0, 1, d);
        assert!(!has_move(&g));
    }

    #[test]
    fn test_equal_max_tiles_do_not_pair() {
        let g = Grid::from_rows(&[[MAX_TILE, MAX_TILE], [2, 4]]).unwrap();
        assert!(!has_move(&g));
        assert!(Direction::ALL.iter().all(|&d| !shift(&g, d).moved));
    }

    /// Every 2×2 grid over {0, 2, 4}: `has_move` agrees with "some direction
    /// changes the board".
    #[test]
    fn test_has_move_exhaustive_small_grids() {
        let values = [0u32, 2, 4];
        for code in 0..values.len().pow(4) {
            let mut rest = code;
            let mut cells = [0u32; 4];
            for cell in cells.iter_mut() {
                *cell = values[rest % values.len()];
                rest /= values.len();
            }
            let g = Grid::from_rows(&[[cells[0], cells[1]], [cells[2], cells[3]]]).unwrap();
            let any_moves = Direction::ALL.iter().any(|&d| shift(&g, d).moved);
            let full = cells.iter().all(|&v| v != 0);
            let adjacent_equal = cells[0] == cells[1]
                || cells[2] == cells[3]
                || cells[0] == cells[2]
                || cells[1] == cells[3];
            assert_eq!(has_move(&g), !full || adjacent_equal, "{:?}", cells);
            if full {
                assert_eq!(has_move(&g), any_moves, "{:?}", cells);
            }
        }
    }

    // -------------------------------------------------------------------------
    // Properties
    // -------------------------------------------------------------------------

    fn arb_grid() -> impl Strategy<Value = Grid> {
        prop::collection::vec(prop_oneof![Just(0u32), (1u32..8).prop_map(|e| 1 << e)], 16)
            .prop_map(|values| {
                let rows: Vec<&[u32]> = values.chunks(4).collect();
                Grid::from_rows(&rows).unwrap()
            })
    }

    fn arb_direction() -> impl Strategy<Value = Direction> {
        prop_oneof![
            Just(Direction::Left),
            Just(Direction::Right),
            Just(Direction::Up),
            Just(Direction::Down),
        ]
    }

    /// Lanes of raw values read in the direction tiles travel, nearest to
    /// the destination wall first.
    fn lanes(g: &Grid, dir: Direction) -> Vec<Vec<u32>> {
        let n = g.size();
        let value = |r: usize, c: usize| g.get(r, c).value().unwrap_or(0);
        (0..n)
            .map(|k| {
                (0..n)
                    .map(|i| match dir {
                        Direction::Left => value(k, i),
                        Direction::Right => value(k, n - 1 - i),
                        Direction::Up => value(i, k),
                        Direction::Down => value(n - 1 - i, k),
                    })
                    .collect()
            })
            .collect()
    }

    /// Points a move should earn: every equal pair met while scanning the
    /// compacted lane scores its merged value, and both tiles are consumed.
    fn expected_gain(g: &Grid, dir: Direction) -> u64 {
        let mut total = 0;
        for lane in lanes(g, dir) {
            let tiles: Vec<u64> = lane.into_iter().filter(|&v| v != 0).map(u64::from).collect();
            let mut i = 0;
            while i < tiles.len() {
                if i + 1 < tiles.len() && tiles[i] == tiles[i + 1] {
                    total += 2 * tiles[i];
                    i += 2;
                } else {
                    i += 1;
                }
            }
        }
        total
    }

    #[test]
    fn test_gain_counts_each_pair_once() {
        let g = grid(&[[2, 2, 4, 4], [0, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]);
        let result = shift(&g, Direction::Left);
        assert_eq!(result.gained, 12);
        assert_eq!(result.gained, expected_gain(&g, Direction::Left));
    }

    proptest! {
        #[test]
        fn prop_gain_equals_merged_values(g in arb_grid()) {
            for dir in Direction::ALL {
                let result = shift(&g, dir);
                prop_assert_eq!(result.gained, expected_gain(&g, dir), "{}", dir);
                // Two v-tiles become one 2v-tile.
                prop_assert_eq!(result.grid.tile_sum(), g.tile_sum());
            }
        }

        #[test]
        fn prop_each_tile_merges_at_most_once(values in prop::collection::vec(1u32..4, 4)) {
            let row: Vec<Cell> = values.iter().map(|&e| Cell::Tile(1 << e)).collect();
            let (out, gained) = slide_lane(&row);
            let max_in = row.iter().filter_map(|c| c.value()).max().unwrap();
            let max_out = out.iter().filter_map(|c| c.value()).max().unwrap();
            prop_assert!(max_out <= 2 * max_in);
            let nonempty = out.iter().filter(|c| !c.is_empty()).count();
            prop_assert!(nonempty >= 2);
            // Chained merges would score more than the tiles they consumed.
            let total: u64 = row.iter().filter_map(|c| c.value()).map(u64::from).sum();
            prop_assert!(gained <= total);
        }

        #[test]
        fn prop_rotation_round_trip(g in arb_grid()) {
            prop_assert_eq!(g.rotate_cw().rotate_cw().rotate_cw().rotate_cw(), g);
        }

        #[test]
        fn prop_left_right_mirror_symmetry(g in arb_grid()) {
            let left = shift(&g, Direction::Left);
            let right = shift(&g.mirror(), Direction::Right);
            prop_assert_eq!(left.grid.mirror(), right.grid);
            prop_assert_eq!(left.gained, right.gained);
        }

        #[test]
        fn prop_noop_is_stable(g in arb_grid(), dir in arb_direction()) {
            let (out, score, moved) = apply_move(&g, 0, dir);
            if !moved {
                prop_assert_eq!(&out, &g);
                prop_assert_eq!(score, 0);
                let (_, _, again) = apply_move(&out, score, dir);
                prop_assert!(!again);
            }
        }

        #[test]
        fn prop_shift_is_deterministic(g in arb_grid(), dir in arb_direction()) {
            prop_assert_eq!(shift(&g, dir), shift(&g, dir));
        }

        #[test]
        fn prop_has_move_matches_simulation(g in arb_grid()) {
            prop_assume!(g.empty_count() < g.cells().len());
            let any = Direction::ALL.iter().any(|&d| shift(&g, d).moved);
            prop_assert_eq!(has_move(&g), any);
        }
    }
}
