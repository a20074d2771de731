use crtbp::cosmic::MassRatio;
use crtbp::tools::{collinear_points, sphere_mesh};

#[test]
fn sun_earth_collinear_points() {
    let mu = MassRatio::new(3.003e-6).unwrap();
    let points = collinear_points(mu);
    assert!((points.l1 - 0.990027).abs() < 1e-4);
    assert!((points.l2 - 1.010034).abs() < 1e-4);
    assert!((points.l3 + 1.0000013).abs() < 1e-4);

    let positions = points.positions();
    assert_eq!(positions[0][0], points.l1);
    assert_eq!(positions[2][1], 0.0);
}

#[test]
fn sphere_mesh_closes_at_the_poles() {
    let center = [1.0 - 0.0121505, 0.0, 0.0];
    let radius = 4.5e-3;
    let mesh = sphere_mesh(radius, center, 12).unwrap();
    let (rows, cols) = mesh.grid_shape();
    assert_eq!((rows, cols), (24, 12));

    for i in 0..rows {
        // North pole repeats on every azimuth row
        assert_eq!(mesh.x[i][0], center[0]);
        assert_eq!(mesh.y[i][0], center[1]);
        assert_eq!(mesh.z[i][0], center[2] + radius);
        // South pole, up to the roundoff of sin(pi)
        assert!((mesh.z[i][cols - 1] - (center[2] - radius)).abs() < 1e-12);
    }

    // The azimuth seam closes: first and last rows coincide
    for j in 0..cols {
        assert!((mesh.x[0][j] - mesh.x[rows - 1][j]).abs() < 1e-12);
        assert!((mesh.y[0][j] - mesh.y[rows - 1][j]).abs() < 1e-12);
    }
}
