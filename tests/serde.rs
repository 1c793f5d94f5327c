#![cfg(feature = "serde")]

use _rust::{AffineTransform, ProjectionInfo, ProjectionMethod};

#[test]
fn test_projection_info_json_round_trip() {
    let info = ProjectionInfo::from_epsg_code(27700).unwrap();
    let json = serde_json::to_string(&info).unwrap();
    let back: ProjectionInfo = serde_json::from_str(&json).unwrap();
    assert_eq!(back, info);
    assert_eq!(back.to_proj4_string(), info.to_proj4_string());
    assert_eq!(back.authority, info.authority);
}

#[test]
fn test_grid_shift_datum_survives() {
    let info = ProjectionInfo::from_epsg_code(3857).unwrap().with_over(true);
    let back: ProjectionInfo = serde_json::from_str(&serde_json::to_string(&info).unwrap()).unwrap();
    assert_eq!(back.method, ProjectionMethod::Mercator);
    assert!(back.over);
    assert_eq!(back.datum(), info.datum());
}

#[test]
fn test_affine_transform() {
    let affine = AffineTransform::from_gdal(&[440_720.0, 60.0, 0.0, 3_751_320.0, 0.0, -60.0]);
    let json = serde_json::to_value(affine).unwrap();
    let back: AffineTransform = serde_json::from_value(json).unwrap();
    assert_eq!(back, affine);
}
