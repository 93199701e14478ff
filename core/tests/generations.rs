//! Transition rule and well-known patterns.

use life_core::{
    cell::Cell,
    grid::Grid,
    next_generation::{active_set, calculate},
    patterns::Pattern,
    types::Coord,
};

fn grid_with(width: u32, height: u32, cells: &[(i64, i64)]) -> Grid {
    let mut g = Grid::new(width, height).expect("valid dimensions");
    for &(x, y) in cells {
        g.set_cell_at(x, y, Cell::Alive);
    }
    g
}

fn step_n(grid: &Grid, n: usize) -> Grid {
    (0..n).fold(grid.clone(), |g, _| calculate(&g))
}

#[test]
fn empty_grid_stays_empty() {
    let g = Grid::new(12, 7).unwrap();
    let next = calculate(&g);
    assert!(next.is_empty());
    assert_eq!((next.width(), next.height()), (12, 7));
}

#[test]
fn isolated_and_paired_cells_die() {
    assert!(calculate(&grid_with(5, 5, &[(2, 2)])).is_empty(), "0 neighbours");
    assert!(calculate(&grid_with(5, 5, &[(2, 2), (3, 2)])).is_empty(), "1 neighbour");
}

#[test]
fn cell_with_two_or_three_neighbors_survives() {
    // (2,2) has 2 neighbours.
    let two = calculate(&grid_with(5, 5, &[(1, 1), (2, 2), (3, 3)]));
    assert!(two.cell_at(2, 2).is_alive());

    // (2,2) has 3 neighbours.
    let three = calculate(&grid_with(5, 5, &[(1, 1), (2, 2), (3, 3), (1, 3)]));
    assert!(three.cell_at(2, 2).is_alive());
}

#[test]
fn overcrowded_cell_dies() {
    let g = grid_with(5, 5, &[(2, 2), (1, 1), (3, 1), (1, 3), (3, 3)]);
    assert_eq!(g.live_neighbors_count(2, 2), 4);
    assert!(calculate(&g).cell_at(2, 2).is_dead());
}

#[test]
fn dead_cell_with_three_neighbors_is_born() {
    let g = grid_with(5, 5, &[(1, 1), (3, 1), (2, 3)]);
    assert!(g.cell_at(2, 2).is_dead());
    assert!(calculate(&g).cell_at(2, 2).is_alive());
}

#[test]
fn blinker_oscillates_with_period_two() {
    let vertical = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
    let horizontal = grid_with(5, 5, &[(1, 2), (2, 2), (3, 2)]);

    let one = calculate(&vertical);
    assert_eq!(one, horizontal, "blinker should turn horizontal");
    assert_eq!(calculate(&one), vertical, "blinker should return after two steps");
}

#[test]
fn block_is_a_still_life() {
    let block = grid_with(4, 4, &[(1, 1), (2, 1), (1, 2), (2, 2)]);
    assert_eq!(calculate(&block), block);
}

#[test]
fn beacon_has_period_two() {
    let mut g = Grid::new(6, 6).unwrap();
    Pattern::find("beacon").unwrap().apply(&mut g, Coord::new(1, 1));
    let next = calculate(&g);
    assert_ne!(next, g);
    assert_eq!(calculate(&next), g);
}

#[test]
fn glider_translates_diagonally() {
    let mut g = Grid::new(10, 10).unwrap();
    let glider = Pattern::find("glider").unwrap();
    glider.apply(&mut g, Coord::new(1, 1));

    let mut expected = Grid::new(10, 10).unwrap();
    glider.apply(&mut expected, Coord::new(2, 2));
    assert_eq!(step_n(&g, 4), expected, "glider moves one cell down-right every 4 steps");
}

#[test]
fn no_wraparound_at_edges() {
    // Vertical blinker hugging the left edge: only the in-bounds half is born.
    let g = grid_with(5, 5, &[(0, 1), (0, 2), (0, 3)]);
    let next = calculate(&g);
    let expected = grid_with(5, 5, &[(0, 2), (1, 2)]);
    assert_eq!(next, expected);
    for y in 0..5 {
        assert!(next.cell_at(4, y).is_dead(), "nothing appears on the far edge");
    }
}

#[test]
fn input_grid_is_not_modified() {
    let g = grid_with(5, 5, &[(2, 1), (2, 2), (2, 3)]);
    let snapshot = g.clone();
    let _ = calculate(&g);
    assert_eq!(g, snapshot);
}

#[test]
fn active_set_covers_every_neighbor() {
    let g = grid_with(10, 10, &[(4, 4), (8, 8)]);
    let active = active_set(&g);
    assert_eq!(active.len(), 18, "two disjoint 3x3 neighbourhoods");
    for c in [Coord::new(3, 3), Coord::new(5, 5), Coord::new(9, 9), Coord::new(7, 7)] {
        assert!(active.contains(&c), "{c} missing from active set");
    }
}

#[test]
fn sparse_population_on_large_grid() {
    let mut g = Grid::new(1000, 1000).unwrap();
    Pattern::find("blinker").unwrap().apply(&mut g, Coord::new(500, 500));
    let next = calculate(&g);
    assert_eq!(next.living_count(), 3);
    assert_eq!(step_n(&g, 2), g);
}
