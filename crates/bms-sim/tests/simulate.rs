//! End-to-end simulation tests for `DynamicSystem`.

use std::f64::consts::PI;

use bms_blocks::{Block, ODE, Ramp, Saturation, SignalSource, Sinus};
use bms_core::{IntegratorType, VariableId};
use bms_sim::{
    DynamicSystem, RunState, SimError, SimOptions, SystemBuilder, TimeGrid, Variable,
};

struct Chain {
    system: DynamicSystem,
    sine: VariableId,
    amplified: VariableId,
    filtered: VariableId,
    saturated: VariableId,
}

/// sine -> x10 gain -> 0.5 Hz low-pass -> saturation at +/-2
fn saturation_chain(options: SimOptions) -> Chain {
    let mut b = SystemBuilder::new();
    let sine = b
        .signal("SineInput", Sinus::new(1.0, 2.0 * PI, 0.0, 0.0).unwrap())
        .unwrap();
    let amplified = b.variable("Amplified").unwrap();
    let filtered = b.variable("Filtered").unwrap();
    let saturated = b.variable("Saturated").unwrap();

    let tau = 1.0 / (2.0 * PI * 0.5);
    b.block(ODE::new(sine, amplified, &[10.0], &[1.0]).unwrap())
        .block(ODE::new(amplified, filtered, &[1.0], &[tau, 1.0]).unwrap())
        .block(Saturation::new(filtered, saturated, -2.0, 2.0).unwrap())
        .options(options);

    let system = b.build(TimeGrid::new(2.0, 1000).unwrap()).unwrap();
    Chain {
        system,
        sine,
        amplified,
        filtered,
        saturated,
    }
}

#[test]
fn saturation_chain_end_to_end() {
    let mut chain = saturation_chain(SimOptions::default());
    chain.system.simulate().unwrap();
    let sys = &chain.system;

    let t = sys.t();
    assert_eq!(t.len(), 1001);
    assert_eq!(t[0], 0.0);
    assert_eq!(t[1000], 2.0);

    for var in sys.variables() {
        assert_eq!(var.len(), 1001, "variable {}", var.name());
    }

    let sine = sys.values(chain.sine).unwrap();
    let amplified = sys.values(chain.amplified).unwrap();
    let filtered = sys.values(chain.filtered).unwrap();
    let saturated = sys.values(chain.saturated).unwrap();

    for i in 0..t.len() {
        assert_eq!(amplified[i], 10.0 * sine[i], "index {i}");
        assert!((-2.0..=2.0).contains(&saturated[i]), "index {i}");
        assert_eq!(saturated[i], filtered[i].clamp(-2.0, 2.0));
    }

    // The filter output (~4.5 peak) must actually hit the limits.
    assert!(filtered.iter().any(|y| y.abs() > 2.0));
    assert!(saturated.iter().any(|y| *y == 2.0));
    assert!(saturated.iter().any(|y| *y == -2.0));
}

#[test]
fn simulate_twice_is_rejected() {
    let mut chain = saturation_chain(SimOptions::default());
    chain.system.simulate().unwrap();
    assert_eq!(chain.system.state(), RunState::Completed);

    let err = chain.system.simulate().unwrap_err();
    assert!(matches!(err, SimError::InvalidState { .. }));
    // The completed trajectories are untouched by the rejected call.
    assert_eq!(chain.system.t().len(), 1001);
    assert_eq!(chain.system.values(chain.saturated).unwrap().len(), 1001);
}

#[test]
fn reset_then_simulate_reproduces_fresh_run() {
    let mut first = saturation_chain(SimOptions::default());
    first.system.simulate().unwrap();
    let reference: Vec<Vec<f64>> = first
        .system
        .variables()
        .iter()
        .map(|v| v.values().to_vec())
        .collect();

    first.system.reset();
    assert_eq!(first.system.state(), RunState::Configured);
    assert!(first.system.t().is_empty());
    assert!(first.system.variables().iter().all(|v| v.is_empty()));

    first.system.simulate().unwrap();
    for (var, expected) in first.system.variables().iter().zip(&reference) {
        assert_eq!(var.values(), expected.as_slice(), "variable {}", var.name());
    }

    let mut fresh = saturation_chain(SimOptions::default());
    fresh.system.simulate().unwrap();
    assert_eq!(
        fresh.system.values(fresh.filtered),
        first.system.values(first.filtered)
    );
}

#[test]
fn euler_and_rk4_agree_loosely() {
    let mut rk4 = saturation_chain(SimOptions::default());
    let mut euler = saturation_chain(SimOptions {
        integrator: IntegratorType::ForwardEuler,
        ..SimOptions::default()
    });
    rk4.system.simulate().unwrap();
    euler.system.simulate().unwrap();

    let a = rk4.system.values(rk4.filtered).unwrap();
    let b = euler.system.values(euler.filtered).unwrap();
    let max_diff = a
        .iter()
        .zip(b)
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max);
    assert!(max_diff > 0.0);
    assert!(max_diff < 0.05, "max diff {max_diff}");
}

fn diverging_system(options: SimOptions) -> (DynamicSystem, VariableId) {
    let mut b = SystemBuilder::new();
    let u = b.signal("u", Ramp::new(1.0, 0.0, 1.0).unwrap()).unwrap();
    let y = b.variable("y").unwrap();
    // 1 / (s - 40): unstable pole, overflows within the horizon
    b.block(ODE::new(u, y, &[1.0], &[1.0, -40.0]).unwrap())
        .options(options);
    (b.build(TimeGrid::new(30.0, 300).unwrap()).unwrap(), y)
}

#[test]
fn diverging_values_propagate_by_default() {
    let (mut system, y) = diverging_system(SimOptions::default());
    system.simulate().unwrap();
    let values = system.values(y).unwrap();
    assert_eq!(values.len(), 301);
    assert!(values.iter().any(|v| !v.is_finite()));
}

#[test]
fn diverging_values_rejected_when_requested() {
    let (mut system, y) = diverging_system(SimOptions {
        reject_non_finite: true,
        ..SimOptions::default()
    });
    let err = system.simulate().unwrap_err();
    assert!(matches!(err, SimError::InvalidState { .. }));
    assert!(format!("{err}").contains("'y'"));

    // No partial results survive the failure.
    assert!(system.t().is_empty());
    assert!(system.values(y).unwrap().is_empty());
    assert_eq!(system.state(), RunState::Configured);
}

#[test]
fn misordered_blocks_fail_before_running() {
    let x = VariableId::from_index(0);
    let y = VariableId::from_index(1);
    let blocks: Vec<Block> = vec![
        Saturation::new(x, y, -1.0, 1.0).unwrap().into(),
        // The producer of `x` comes after its consumer.
        SignalSource::new(x, Sinus::new(1.0, 1.0, 0.0, 0.0).unwrap())
            .unwrap()
            .into(),
    ];
    let variables = vec![Variable::new("x"), Variable::new("y")];
    let err = DynamicSystem::new(TimeGrid::new(1.0, 10).unwrap(), variables, blocks).unwrap_err();
    assert!(matches!(err, SimError::Configuration { .. }));
    assert!(format!("{err}").contains("reads 'x'"));
}

#[test]
fn prefilled_variable_rejected_at_construction() {
    let u = VariableId::from_index(0);
    let y = VariableId::from_index(1);
    let blocks: Vec<Block> = vec![
        SignalSource::new(u, Sinus::new(1.0, 1.0, 0.0, 0.0).unwrap())
            .unwrap()
            .into(),
        ODE::new(u, y, &[2.0], &[1.0]).unwrap().into(),
    ];
    let mut stale = Variable::new("y");
    stale.push(42.0);
    let variables = vec![Variable::new("u"), stale];

    let err = DynamicSystem::new(TimeGrid::new(1.0, 10).unwrap(), variables, blocks).unwrap_err();
    assert!(matches!(err, SimError::Configuration { .. }));
    assert!(format!("{err}").contains("'y' already holds 1 samples"));
}

#[test]
fn every_trajectory_aligns_with_time() {
    let mut chain = saturation_chain(SimOptions::default());
    chain.system.simulate().unwrap();
    let grid = *chain.system.grid();
    for (i, t) in grid.times().enumerate() {
        assert_eq!(chain.system.t()[i], t);
    }
    for var in chain.system.variables() {
        assert_eq!(var.len(), chain.system.t().len(), "variable {}", var.name());
    }
}
