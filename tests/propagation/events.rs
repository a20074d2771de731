use crate::{lyapunov_seed, EM_MU};
use crtbp::cosmic::MassRatio;
use crtbp::dynamics::{augment, CrtbpDynamics, VariationalDynamics};
use crtbp::md::events::PlaneCrossing;
use crtbp::propagators::Propagator;

#[test]
fn plane_crossing_is_refined_to_tolerance() {
    let _ = pretty_env_logger::try_init();
    let (seed, period) = lyapunov_seed();
    let prop = Propagator::default(CrtbpDynamics::new(MassRatio::new(EM_MU).unwrap()));
    let mut inst = prop.with(seed.to_vector());

    let crossings = inst.until_all_events(period, &PlaneCrossing).unwrap();
    assert!(!crossings.is_empty());

    // First return to the plane happens near half the period guess
    let first = &crossings[0];
    assert!(first.t > 1.0 && first.t < 1.7, "crossing at t = {}", first.t);
    assert!(first.state[1].abs() < 1e-9);
}

#[test]
fn departing_seed_is_not_a_crossing() {
    // The seed sits exactly on y = 0; leaving the plane must not count
    let (seed, _) = lyapunov_seed();
    let prop = Propagator::default(CrtbpDynamics::new(MassRatio::new(EM_MU).unwrap()));
    let mut inst = prop.with(seed.to_vector());

    let crossings = inst.until_all_events(0.1, &PlaneCrossing).unwrap();
    assert!(crossings.is_empty());
}

#[test]
fn crossing_agrees_between_plain_and_augmented() {
    // The same evaluator reads y from the trailing state block of either
    // integrated vector, so both propagations must report the same crossing
    let (seed, period) = lyapunov_seed();
    let mu = MassRatio::new(EM_MU).unwrap();
    let dynamics = CrtbpDynamics::new(mu);

    let plain = Propagator::default(dynamics);
    let mut ip = plain.with(seed.to_vector());
    let plain_crossings = ip.until_all_events(period, &PlaneCrossing).unwrap();

    let var = Propagator::default(VariationalDynamics::new(dynamics));
    let mut iv = var.with(augment(&seed.to_vector()));
    let aug_crossings = iv.until_all_events(period, &PlaneCrossing).unwrap();

    assert_eq!(plain_crossings.len(), aug_crossings.len());
    let (p, a) = (&plain_crossings[0], &aug_crossings[0]);
    assert!((p.t - a.t).abs() < 1e-10);
    assert!(a.state[37].abs() < 1e-9);
}
