//! Cross-check forward projections against proj4rs.

use approx::assert_relative_eq;
use proj4rs::Proj;

use _rust::{reproject_points, ProjectionInfo};

const WGS84_LONGLAT: &str = "+proj=longlat +datum=WGS84 +no_defs";

fn proj4rs_forward(definition: &str, lon: f64, lat: f64) -> (f64, f64) {
    let src = Proj::from_proj_string(WGS84_LONGLAT).unwrap();
    let dst = Proj::from_proj_string(definition).unwrap();
    let mut point = (lon.to_radians(), lat.to_radians());
    proj4rs::transform::transform(&src, &dst, &mut point).unwrap();
    point
}

fn forward(definition: &str, lon: f64, lat: f64) -> (f64, f64) {
    let src = ProjectionInfo::from_proj4_string(WGS84_LONGLAT).unwrap();
    let dst = ProjectionInfo::from_proj4_string(definition).unwrap();
    let mut xy = [lon, lat];
    reproject_points(&mut xy, None, &src, &dst, 0, 1).unwrap();
    (xy[0], xy[1])
}

#[test_log::test]
fn test_projections_agree_with_proj4rs() {
    let cases = [
        ("+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs", [(15.0, 52.0), (13.2, 47.5), (16.9, 60.1)]),
        ("+proj=merc +lon_0=0 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs", [(-71.0, 42.3), (139.7, 35.7), (0.0, -60.0)]),
        (
            "+proj=lcc +lat_1=49 +lat_2=44 +lat_0=46.5 +lon_0=3 +x_0=700000 +y_0=6600000 +datum=WGS84 +units=m +no_defs",
            [(2.35, 48.85), (-1.5, 43.5), (7.7, 48.6)],
        ),
        (
            "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +datum=WGS84 +units=m +no_defs",
            [(13.5, 51.3), (-8.0, 40.0), (25.0, 65.0)],
        ),
        (
            "+proj=aea +lat_1=29.5 +lat_2=45.5 +lat_0=23 +lon_0=-96 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs",
            [(-96.0, 23.0), (-77.0, 39.0), (-122.4, 37.8)],
        ),
        (
            "+proj=stere +lat_0=90 +lat_ts=70 +lon_0=-45 +k=1 +x_0=0 +y_0=0 +datum=WGS84 +units=m +no_defs",
            [(-45.0, 75.0), (10.0, 80.0), (120.0, 65.0)],
        ),
    ];

    for (definition, points) in cases {
        for (lon, lat) in points {
            let (x, y) = forward(definition, lon, lat);
            let (x_ref, y_ref) = proj4rs_forward(definition, lon, lat);
            assert_relative_eq!(x, x_ref, epsilon = 1e-3);
            assert_relative_eq!(y, y_ref, epsilon = 1e-3);
        }
    }
}

#[test_log::test]
fn test_helmert_shift_agrees_with_proj4rs() {
    let osgb = "+proj=longlat +ellps=airy +towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489 +no_defs";
    let src = Proj::from_proj_string(osgb).unwrap();
    let dst = Proj::from_proj_string(WGS84_LONGLAT).unwrap();

    for (lon, lat) in [(-1.0665_f64, 51.4253_f64), (-3.2, 55.95), (1.3, 52.6)] {
        let mut point = (lon.to_radians(), lat.to_radians());
        proj4rs::transform::transform(&src, &dst, &mut point).unwrap();

        let mut xy = [lon, lat];
        reproject_points(
            &mut xy,
            None,
            &ProjectionInfo::from_proj4_string(osgb).unwrap(),
            &ProjectionInfo::from_proj4_string(WGS84_LONGLAT).unwrap(),
            0,
            1,
        )
        .unwrap();
        assert_relative_eq!(xy[0], point.0.to_degrees(), epsilon = 1e-8);
        assert_relative_eq!(xy[1], point.1.to_degrees(), epsilon = 1e-8);
    }
}
