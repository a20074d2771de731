use crate::{lyapunov_seed, EM_MU};
use crtbp::api::{CorrectionRequest, PropagationRequest};
use crtbp::cosmic::Frame;
use crtbp::io::{export_trajectory_csv, write_trajectory_csv, ConfigRepr};
use crtbp::propagators::IntegMethod;
use crtbp::CrtbpError;

#[test]
fn propagation_request_loads_from_yaml() {
    let yaml = r#"
mu: 0.0121505
state:
  x: 0.8234
  y: 0.0
  z: 0.0
  vx: 0.0
  vy: 0.1263
  vz: 0.0
duration: 2.743
samples: 50
method: Verner56
"#;
    let req = PropagationRequest::loads(yaml).unwrap();
    assert_eq!(req.samples, 50);
    assert_eq!(req.method, IntegMethod::Verner56);
    assert_eq!(req.frame, Frame::Barycentric);

    let traj = req.execute().unwrap();
    assert_eq!(traj.len(), 50);
}

#[test]
fn secondary_centered_trajectory_matches_barycentric() {
    let (seed, period) = lyapunov_seed();
    let bary = PropagationRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .duration(period)
        .samples(20)
        .build()
        .execute()
        .unwrap();

    let mut shifted_seed = seed;
    shifted_seed.x -= 1.0 - EM_MU;
    let shifted = PropagationRequest::builder()
        .mu(EM_MU)
        .state(shifted_seed)
        .frame(Frame::SecondaryCentered)
        .duration(period)
        .samples(20)
        .build()
        .execute()
        .unwrap();

    for (a, b) in bary.states.iter().zip(&shifted.states) {
        assert!(a.rss(b) < 1e-10);
    }
}

#[test]
fn trajectory_exports_as_csv() {
    let (seed, _) = lyapunov_seed();
    let traj = PropagationRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .duration(1.0)
        .samples(10)
        .build()
        .execute()
        .unwrap();

    let mut buf = Vec::new();
    write_trajectory_csv(&traj, &mut buf).unwrap();
    let text = String::from_utf8(buf).unwrap();
    assert_eq!(text.lines().count(), 11);
    assert!(text.starts_with("t,x,y,z,vx,vy,vz"));
}

#[test]
fn trajectory_export_writes_a_csv_file() {
    let (seed, _) = lyapunov_seed();
    let traj = PropagationRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .duration(0.5)
        .samples(5)
        .build()
        .execute()
        .unwrap();

    let path = std::env::temp_dir().join(format!("crtbp_export_{}.csv", std::process::id()));
    export_trajectory_csv(&traj, &path).unwrap();
    let text = std::fs::read_to_string(&path).unwrap();
    std::fs::remove_file(&path).unwrap();

    assert!(text.starts_with("t,x,y,z,vx,vy,vz"));
    assert_eq!(text.lines().count(), 6);
}

#[test]
fn correction_solution_serializes_as_yaml() {
    let sol = request_seed().correct_iterative().unwrap();
    let yaml = sol.dumps().unwrap();
    assert!(yaml.contains("corrected_state"));
    assert!(yaml.contains("period"));

    let reloaded = crtbp::md::CorrectionSolution::loads(&yaml).unwrap();
    assert!(reloaded.corrected_state.rss(&sol.corrected_state) < 1e-12);
}

#[test]
fn invalid_requests_are_rejected_before_integration() {
    let (seed, period) = lyapunov_seed();
    let bad_mu = PropagationRequest::builder()
        .mu(1.5)
        .state(seed)
        .duration(period)
        .build();
    assert!(matches!(
        bad_mu.execute(),
        Err(CrtbpError::InvalidInput { .. })
    ));

    let bad_period = CorrectionRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .period(-2.743)
        .build();
    assert!(matches!(
        bad_period.correct_iterative(),
        Err(CrtbpError::InvalidInput { .. })
    ));
}

fn request_seed() -> CorrectionRequest {
    let (seed, period) = lyapunov_seed();
    CorrectionRequest::builder()
        .mu(EM_MU)
        .state(seed)
        .period(period)
        .build()
}
