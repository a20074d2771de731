mod events;
mod stm;

use crate::{jacobi_constant, lyapunov_seed, EM_MU};
use crtbp::api::PropagationRequest;
use crtbp::cosmic::{MassRatio, State};
use crtbp::dynamics::CrtbpDynamics;
use crtbp::propagators::{IntegMethod, PropOpts, Propagator};
use crtbp::CrtbpError;
use rstest::rstest;

#[rstest]
#[case(IntegMethod::Dormand45)]
#[case(IntegMethod::Fehlberg54)]
#[case(IntegMethod::Verner56)]
fn jacobi_constant_is_conserved(#[case] method: IntegMethod) {
    let _ = pretty_env_logger::try_init();
    let (seed, period) = lyapunov_seed();
    let traj = PropagationRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .duration(period)
        .samples(250)
        .method(method)
        .build()
        .execute()
        .unwrap();

    let c0 = jacobi_constant(&traj.states[0], EM_MU);
    for state in &traj.states {
        let drift = (jacobi_constant(state, EM_MU) - c0).abs();
        assert!(drift < 5e-9, "Jacobi drift {drift:e} with {method}");
    }
}

#[test]
fn sampling_grid_is_inclusive_and_exact() {
    let (seed, _) = lyapunov_seed();
    let traj = PropagationRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .duration(2.0)
        .samples(101)
        .build()
        .execute()
        .unwrap();

    assert_eq!(traj.len(), 101);
    assert_eq!(traj.times[0], 0.0);
    assert_eq!(*traj.times.last().unwrap(), 2.0);
    assert_eq!(traj.first().unwrap(), &seed);
}

#[test]
fn single_sample_returns_the_seed() {
    let (seed, _) = lyapunov_seed();
    let traj = PropagationRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .duration(1.0)
        .samples(1)
        .build()
        .execute()
        .unwrap();

    assert_eq!(traj.len(), 1);
    assert_eq!(traj.states[0], seed);
}

#[test]
fn methods_agree_on_the_end_state() {
    let (seed, period) = lyapunov_seed();
    let mu = MassRatio::new(EM_MU).unwrap();
    let dynamics = CrtbpDynamics::new(mu);
    let opts = PropOpts::default();

    let mut ends = Vec::new();
    for method in [
        IntegMethod::Dormand45,
        IntegMethod::Fehlberg54,
        IntegMethod::Verner56,
    ] {
        let prop = Propagator::from_method(dynamics, method, opts);
        let mut inst = prop.with(seed.to_vector());
        ends.push(inst.for_duration(period).unwrap());
    }

    assert!((&ends[0] - &ends[1]).norm() < 1e-8);
    assert!((&ends[0] - &ends[2]).norm() < 1e-8);
}

#[test]
fn fixed_step_tracks_the_adaptive_solution() {
    let (seed, _) = lyapunov_seed();
    let mu = MassRatio::new(EM_MU).unwrap();
    let dynamics = CrtbpDynamics::new(mu);

    let adaptive = Propagator::default(dynamics);
    let mut ia = adaptive.with(seed.to_vector());
    let ref_end = ia.for_duration(1.0).unwrap();

    let fixed = Propagator::dormand45(dynamics, PropOpts::with_fixed_step(1e-3));
    let mut ifx = fixed.with(seed.to_vector());
    let fixed_end = ifx.for_duration(1.0).unwrap();

    assert!((ref_end - fixed_end).norm() < 1e-6);
}

#[test]
fn singular_seed_fails_the_integration() {
    let primary = State::new(-EM_MU, 0.0, 0.0, 0.0, 0.0, 0.0);
    let result = PropagationRequest::builder()
        .mu(EM_MU)
        .state(primary)
        .duration(1.0)
        .build()
        .execute();

    assert!(matches!(
        result,
        Err(CrtbpError::IntegrationFailure { .. })
    ));
}
