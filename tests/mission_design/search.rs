extern crate nyx_launch as nyx;

use nyx::cosmic::{OrbitalParameter, TimeGrid};
use nyx::md::opti::{
    minimize_bounded, LaunchObjective, OptimizerKind, OptimizerOptions, Search, SearchOptions,
    SearchState,
};
use nyx::md::{DesignLayout, DesignVariable, Pipeline};
use nyx::ErrorKind;
use rstest::*;

#[fixture]
fn pipeline() -> Pipeline {
    let _ = pretty_env_logger::try_init();
    Pipeline::new(TimeGrid::new(80, 0.0, 43_200.0).unwrap()).unwrap()
}

#[rstest]
#[case(OptimizerKind::NelderMead)]
#[case(OptimizerKind::ProjectedGradient)]
fn search_stays_within_bounds(pipeline: Pipeline, #[case] kind: OptimizerKind) {
    let layout = DesignLayout::circular();
    let bounds = layout.bounds().unwrap();
    let initial = pipeline
        .evaluate(&layout.to_parameters(&layout.initial_guess()).unwrap())
        .unwrap();

    let opts = SearchOptions::builder().max_iterations(40).build();
    let solution = Search::new(&pipeline, layout, kind, OptimizerOptions::default(), opts)
        .unwrap()
        .solve()
        .unwrap();

    println!("{solution}");
    assert!(bounds.contains(&solution.design));
    assert!(solution.iterations <= 40);
    assert!(matches!(
        solution.state,
        SearchState::Converged | SearchState::IterationLimitReached
    ));
    assert!(solution.objective <= initial.objective + 1e-9);
    assert_eq!(solution.objective, solution.evaluation.objective);
    // Linked altitudes remain circular
    assert_eq!(solution.params.alt_perigee_km, solution.params.alt_apogee_km);
    let (alt_min, alt_max) = OrbitalParameter::AltPerigee.default_bounds();
    assert!(solution.params.alt_perigee_km >= alt_min && solution.params.alt_perigee_km <= alt_max);
}

#[rstest]
#[case(-50.0)]
#[case(300.0)]
fn search_through_failed_evaluations(#[case] alt_guess_km: f64) {
    let _ = pretty_env_logger::try_init();
    let pipeline = Pipeline::new(TimeGrid::new(200, 0.0, 6_000.0).unwrap()).unwrap();
    // Altitudes below zero start under the surface and cannot be propagated
    let mut layout = DesignLayout::circular();
    layout.variables[0] = DesignVariable::altitude()
        .with_bounds(-400.0, 800.0)
        .with_initial_guess(alt_guess_km);
    let bounds = layout.bounds().unwrap();

    let opts = SearchOptions::builder().max_iterations(40).build();
    let solution = Search::new(
        &pipeline,
        layout,
        OptimizerKind::NelderMead,
        OptimizerOptions::default(),
        opts,
    )
    .unwrap()
    .solve()
    .unwrap();

    println!("{solution}");
    assert!(matches!(
        solution.state,
        SearchState::Converged | SearchState::IterationLimitReached
    ));
    if alt_guess_km < 0.0 {
        // The guess and the RAAN and inclination vertices of the first simplex all fail
        assert!(solution.failed_evaluations >= 3);
    }
    assert!(solution.failed_evaluations < solution.iterations);
    assert!(bounds.contains(&solution.design));
    assert!(solution.params.alt_perigee_km > 0.0);
    assert!(solution.objective.is_finite() && solution.objective < 1e6);
}

#[rstest]
fn stepping_search(pipeline: Pipeline) {
    let opts = SearchOptions::builder().max_iterations(5).build();
    let mut search = Search::new(
        &pipeline,
        DesignLayout::default(),
        OptimizerKind::NelderMead,
        OptimizerOptions::default(),
        opts,
    )
    .unwrap();
    assert_eq!(search.state(), SearchState::Initialized);
    assert!(search.best().is_none());

    assert_eq!(search.step().unwrap(), SearchState::Iterating);
    assert_eq!(search.iterations(), 1);
    assert!(search.best().is_some());

    assert_eq!(search.run().unwrap(), SearchState::IterationLimitReached);
    assert_eq!(search.iterations(), 5);
    // Stepping a finished search does nothing
    assert_eq!(search.step().unwrap(), SearchState::IterationLimitReached);
    assert_eq!(search.iterations(), 5);
}

#[rstest]
fn invalid_layouts(pipeline: Pipeline) {
    let build = |layout: DesignLayout| {
        Search::new(
            &pipeline,
            layout,
            OptimizerKind::default(),
            OptimizerOptions::default(),
            SearchOptions::default(),
        )
    };

    // Inverted bounds
    let mut layout = DesignLayout::circular();
    layout.variables[2] = DesignVariable::from(OrbitalParameter::Inc).with_bounds(90.0, 0.0);
    assert_eq!(build(layout).err().unwrap().kind(), ErrorKind::InvalidInput);

    // Guess out of bounds
    let mut layout = DesignLayout::circular();
    layout.variables[1] = DesignVariable::from(OrbitalParameter::Raan).with_initial_guess(270.0);
    assert_eq!(build(layout).err().unwrap().kind(), ErrorKind::InvalidInput);

    // Altitude driven twice
    let mut layout = DesignLayout::circular();
    layout.variables.push(OrbitalParameter::AltApogee.into());
    assert_eq!(build(layout).err().unwrap().kind(), ErrorKind::InvalidInput);
}

#[rstest]
fn external_minimizer(pipeline: Pipeline) {
    let layout = DesignLayout::circular();
    let objective = LaunchObjective::new(&pipeline, &layout, 1e6);
    let x0 = layout.initial_guess();
    let initial = objective.value(&x0);

    let result = minimize_bounded(
        |x| objective.value(x),
        &x0,
        layout.bounds().unwrap(),
        OptimizerKind::NelderMead,
        OptimizerOptions::default(),
        30,
    )
    .unwrap();
    assert!(result.evaluations <= 30);
    assert!(result.value <= initial + 1e-9);
    assert!(layout.bounds().unwrap().contains(&result.x));
}
