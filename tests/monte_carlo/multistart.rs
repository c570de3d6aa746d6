extern crate nyx_launch as nyx;

use nyx::cosmic::TimeGrid;
use nyx::mc::MultiStart;
use nyx::md::opti::{OptimizerKind, SearchOptions};
use nyx::md::{DesignLayout, Pipeline};
use rstest::*;

#[fixture]
fn pipeline() -> Pipeline {
    let _ = pretty_env_logger::try_init();
    Pipeline::new(TimeGrid::new(60, 0.0, 43_200.0).unwrap()).unwrap()
}

#[rstest]
fn multistart_sweep(pipeline: Pipeline) {
    let layout = DesignLayout::circular();
    let mut sweep = MultiStart::new("circular launch", 7, 4);
    sweep.kind = OptimizerKind::NelderMead;
    sweep.search_opts = SearchOptions::builder().max_iterations(15).build();

    let results = sweep.run(&pipeline, &layout).unwrap();
    println!("{results}");
    assert_eq!(results.runs.len(), 4);
    assert_eq!(results.seed, 7);
    for (i, run) in results.runs.iter().enumerate() {
        assert_eq!(run.index, i);
    }
    assert_eq!(results.runs[0].guess, layout.initial_guess());
    assert_eq!(results.failures(), 0);

    let bounds = layout.bounds().unwrap();
    let best = results.best().unwrap();
    assert!(bounds.contains(&best.design));
    for sol in results.solutions() {
        assert!(best.objective <= sol.objective);
    }
}

#[rstest]
fn same_seed_same_guesses() {
    let layout = DesignLayout::linked_altitudes();
    let bounds = layout.bounds().unwrap();
    let guesses = MultiStart::new("a", 42, 10).generate_guesses(&layout).unwrap();
    let again = MultiStart::new("b", 42, 10).generate_guesses(&layout).unwrap();
    let other = MultiStart::new("c", 43, 10).generate_guesses(&layout).unwrap();

    assert_eq!(guesses, again);
    assert_ne!(guesses[1..], other[1..]);
    for (_, guess) in &guesses {
        assert!(bounds.contains(guess));
    }
}
