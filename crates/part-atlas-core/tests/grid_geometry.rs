use part_atlas_core::error::AtlasError;
use part_atlas_core::grid::{GridCell, GridLayout};
use std::collections::HashSet;

#[test]
fn zero_inputs_is_rejected() {
    let result = GridLayout::new(0);
    assert!(matches!(result, Err(AtlasError::NoEligibleFiles)));
}

#[test]
fn single_input_is_a_one_by_one_grid() {
    let grid = GridLayout::new(1).unwrap();
    assert_eq!(grid.tiles_per_row(), 1);
    assert_eq!(grid.tiles_per_col(), 1);
    assert_eq!(grid.cell(0), GridCell { row: 0, col: 0 });
    assert_eq!(grid.page_size(128), (128, 128));
}

#[test]
fn tiles_per_row_is_ceil_sqrt() {
    for (n, expected) in [(1, 1), (2, 2), (3, 2), (4, 2), (5, 3), (9, 3), (10, 4), (17, 5)] {
        let grid = GridLayout::new(n).unwrap();
        assert_eq!(grid.tiles_per_row(), expected, "n = {n}");
    }
}

#[test]
fn cells_tile_without_gaps_or_overlaps() {
    for n in [1usize, 2, 3, 7, 12, 16, 17, 50] {
        let grid = GridLayout::new(n).unwrap();
        let mut seen = HashSet::new();
        for i in 0..n {
            let cell = grid.cell(i);
            assert!(cell.row < grid.tiles_per_col(), "n = {n}, i = {i}");
            assert!(cell.col < grid.tiles_per_row(), "n = {n}, i = {i}");
            assert!(seen.insert(cell), "duplicate cell for n = {n}, i = {i}");
        }
        assert_eq!(seen.len(), n);
        // cells are assigned row-major from the top-left
        assert_eq!(grid.cell(0), GridCell { row: 0, col: 0 });
        let total = (grid.tiles_per_row() * grid.tiles_per_col()) as usize;
        assert!(total >= n);
        assert!(total - n < grid.tiles_per_row() as usize);
    }
}

#[test]
fn origin_scales_with_cell_size() {
    let grid = GridLayout::new(5).unwrap();
    // 3 tiles per row: index 4 lands at row 1, col 1
    let cell = grid.cell(4);
    assert_eq!(cell, GridCell { row: 1, col: 1 });
    assert_eq!(grid.origin(cell, 128), (128, 128));
    assert_eq!(grid.page_size(128), (384, 256));
}

#[test]
#[should_panic(expected = "out of range")]
fn cell_index_past_count_panics() {
    let grid = GridLayout::new(3).unwrap();
    let _ = grid.cell(3);
}
