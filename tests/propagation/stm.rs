use crate::{lyapunov_seed, EM_MU};
use crtbp::cosmic::MassRatio;
use crtbp::dynamics::{augment, split, CrtbpDynamics, VariationalDynamics};
use crtbp::propagators::Propagator;

#[test]
fn stm_matches_finite_differences() {
    let _ = pretty_env_logger::try_init();
    let mu = MassRatio::new(EM_MU).unwrap();
    let (seed, _) = lyapunov_seed();
    let x0 = seed.to_vector();

    let dynamics = CrtbpDynamics::new(mu);
    let prop = Propagator::default(VariationalDynamics::new(dynamics));
    let mut inst = prop.with(augment(&x0));
    let end = inst.for_duration(1.0).unwrap();
    let (stm, _) = split(&end);

    let plain = Propagator::default(dynamics);
    let h = 1e-6;
    for col in 0..6 {
        let mut plus = x0;
        plus[col] += h;
        let mut minus = x0;
        minus[col] -= h;

        let mut ip = plain.with(plus);
        let fp = ip.for_duration(1.0).unwrap();
        let mut im = plain.with(minus);
        let fm = im.for_duration(1.0).unwrap();
        let fd = (fp - fm) / (2.0 * h);

        for row in 0..6 {
            let delta = (stm[(row, col)] - fd[row]).abs();
            assert!(
                delta < 1e-4,
                "STM[({row}, {col})] = {} but finite difference is {}",
                stm[(row, col)],
                fd[row]
            );
        }
    }
}

#[test]
fn stm_stays_volume_preserving() {
    // trace(F) = 0 for these dynamics, so det(STM) = 1 along the flow
    let mu = MassRatio::new(EM_MU).unwrap();
    let (seed, period) = lyapunov_seed();
    let prop = Propagator::default(VariationalDynamics::new(CrtbpDynamics::new(mu)));
    let mut inst = prop.with(augment(&seed.to_vector()));
    let end = inst.for_duration(period).unwrap();
    let (stm, _) = split(&end);
    assert!((stm.determinant() - 1.0).abs() < 1e-6);
}
