//! Simulation value semantics.

use life_core::{cell::Cell, error::LifeError, grid::Grid, simulation::Simulation};

fn blinker() -> Grid {
    let mut g = Grid::new(5, 5).unwrap();
    for y in 1..=3 {
        g.set_cell_at(2, y, Cell::Alive);
    }
    g
}

#[test]
fn create_starts_at_generation_zero_with_empty_grid() {
    let sim = Simulation::create(8, 6).unwrap();
    assert_eq!(sim.generation(), 0);
    assert!(sim.grid().is_empty());
    assert_eq!((sim.grid().width(), sim.grid().height()), (8, 6));
    assert_eq!(sim.created_at(), sim.updated_at());
    assert!(uuid_like(sim.id()), "id should be a uuid, got {}", sim.id());
}

#[test]
fn create_rejects_zero_size() {
    assert!(matches!(Simulation::create(0, 4), Err(LifeError::InvalidDimension { .. })));
}

#[test]
fn advance_increments_and_leaves_original_untouched() {
    let sim = Simulation::create(5, 5).unwrap();
    let next = sim.advance(blinker());

    assert_eq!(next.generation(), 1);
    assert_eq!(sim.generation(), 0, "original must not change");
    assert!(sim.grid().is_empty(), "original grid must not change");
    assert_eq!(next.grid(), &blinker());
    assert_eq!(next.id(), sim.id());
    assert_eq!(next.created_at(), sim.created_at());
    assert!(next.updated_at() >= sim.updated_at());
    assert!(next.same_simulation(&sim));
}

#[test]
fn reset_with_returns_to_generation_zero() {
    let sim = Simulation::create(5, 5).unwrap()
        .advance(blinker())
        .advance(blinker());
    assert_eq!(sim.generation(), 2);

    let reset = sim.reset_with(Grid::new(5, 5).unwrap());
    assert_eq!(reset.generation(), 0);
    assert!(reset.grid().is_empty());
    assert_eq!(reset.id(), sim.id());
    assert_eq!(sim.generation(), 2);
}

#[test]
fn replace_grid_keeps_generation() {
    let sim = Simulation::create(5, 5).unwrap().advance(Grid::new(5, 5).unwrap());
    let edited = sim.replace_grid(blinker());
    assert_eq!(edited.generation(), 1);
    assert_eq!(edited.grid().living_count(), 3);
    assert!(sim.grid().is_empty());
}

#[test]
fn separate_creates_have_distinct_ids() {
    let a = Simulation::create(3, 3).unwrap();
    let b = Simulation::create(3, 3).unwrap();
    assert_ne!(a.id(), b.id());
    assert!(!a.same_simulation(&b));
}

fn uuid_like(id: &str) -> bool {
    id.len() == 36 && id.chars().filter(|&c| c == '-').count() == 4
}
