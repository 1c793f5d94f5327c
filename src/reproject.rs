//! In-place batch reprojection of interleaved coordinate arrays.

use rayon::prelude::*;

use crate::crs::ProjectionInfo;
use crate::error::{ProjError, Result};
use crate::proj::pipeline::{Pipeline, Staged};

/// Points per parallel work item.
const PAR_CHUNK_POINTS: usize = 4096;

fn check_range(xy: &[f64], z: Option<&[f64]>, start_index: usize, num_points: usize) -> Result<usize> {
    let overflow = || ProjError::InvalidParameter("point range overflows".to_string());
    let end = start_index.checked_add(num_points).ok_or_else(overflow)?;
    let needed = end.checked_mul(2).ok_or_else(overflow)?;
    if xy.len() < needed {
        return Err(ProjError::InvalidParameter(format!(
            "xy holds {} values, points {start_index}..{end} need {needed}",
            xy.len()
        )));
    }
    if let Some(z) = z {
        if z.len() < end {
            return Err(ProjError::InvalidParameter(format!(
                "z holds {} values, points {start_index}..{end} need {end}",
                z.len()
            )));
        }
    }
    Ok(end)
}

/// Reproject `num_points` points starting at `start_index`, in place.
///
/// `xy` holds interleaved pairs (`xy[2i]`, `xy[2i + 1]`) in the native units
/// of `source`; on return they hold the same points in `target`. Heights in
/// `z`, when given, are converted along with the datum.
pub fn reproject_points(
    xy: &mut [f64],
    z: Option<&mut [f64]>,
    source: &ProjectionInfo,
    target: &ProjectionInfo,
    start_index: usize,
    num_points: usize,
) -> Result<()> {
    let end = check_range(xy, z.as_deref(), start_index, num_points)?;
    if num_points == 0 {
        return Ok(());
    }
    let pipeline = Pipeline::new(source, target)?;
    let z = z.map(|z| &mut z[start_index..end]);
    pipeline.transform_slice(&mut xy[2 * start_index..2 * end], z)
}

/// Same contract as [`reproject_points`], with disjoint chunks of points
/// processed on the rayon thread pool. Results are identical to the serial
/// version.
pub fn par_reproject_points(
    xy: &mut [f64],
    z: Option<&mut [f64]>,
    source: &ProjectionInfo,
    target: &ProjectionInfo,
    start_index: usize,
    num_points: usize,
) -> Result<()> {
    let end = check_range(xy, z.as_deref(), start_index, num_points)?;
    if num_points == 0 {
        return Ok(());
    }
    let pipeline = Pipeline::new(source, target)?;
    if pipeline.is_identity() {
        return Ok(());
    }

    let xy = &mut xy[2 * start_index..2 * end];
    let mut z = z.map(|z| &mut z[start_index..end]);

    // Every chunk is staged before any point is written back.
    let staged: Vec<Staged> = match z.as_deref() {
        Some(z) => xy
            .par_chunks(2 * PAR_CHUNK_POINTS)
            .zip(z.par_chunks(PAR_CHUNK_POINTS))
            .map(|(xy, z)| pipeline.stage(xy, Some(z)))
            .collect::<Result<_>>()?,
        None => xy
            .par_chunks(2 * PAR_CHUNK_POINTS)
            .map(|xy| pipeline.stage(xy, None))
            .collect::<Result<_>>()?,
    };
    match z.as_deref_mut() {
        Some(z) => xy
            .par_chunks_mut(2 * PAR_CHUNK_POINTS)
            .zip(z.par_chunks_mut(PAR_CHUNK_POINTS))
            .zip(staged.par_iter())
            .for_each(|((xy, z), staged)| staged.commit(xy, Some(z))),
        None => xy
            .par_chunks_mut(2 * PAR_CHUNK_POINTS)
            .zip(staged.par_iter())
            .for_each(|(xy, staged)| staged.commit(xy, None)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn info(definition: &str) -> ProjectionInfo {
        definition.parse().unwrap()
    }

    #[test]
    fn test_only_requested_range_changes() {
        let mut xy = [10.0, 50.0, 11.0, 51.0, 12.0, 52.0];
        reproject_points(&mut xy, None, &info("EPSG:4326"), &info("EPSG:3857"), 1, 1).unwrap();
        assert_eq!(&xy[..2], &[10.0, 50.0]);
        assert_eq!(&xy[4..], &[12.0, 52.0]);
        assert_relative_eq!(xy[2], 11.0_f64.to_radians() * 6_378_137.0, epsilon = 1e-6);
    }

    #[test]
    fn test_range_validation() {
        let wgs84 = ProjectionInfo::wgs84();
        let mercator = info("EPSG:3857");
        let mut xy = [0.0; 4];
        assert!(matches!(
            reproject_points(&mut xy, None, &wgs84, &mercator, 1, 2),
            Err(ProjError::InvalidParameter(_))
        ));
        let mut z = [0.0; 1];
        assert!(matches!(
            reproject_points(&mut xy, Some(&mut z), &wgs84, &mercator, 0, 2),
            Err(ProjError::InvalidParameter(_))
        ));
        assert!(matches!(
            par_reproject_points(&mut xy, None, &wgs84, &mercator, usize::MAX, 2),
            Err(ProjError::InvalidParameter(_))
        ));
        reproject_points(&mut xy, None, &wgs84, &mercator, 2, 0).unwrap();
    }

    #[test]
    fn test_equal_systems_are_untouched() {
        let mut xy = [123.0, 456.0];
        let mut z = [7.0];
        let a = info("EPSG:32633");
        let b = info("+proj=utm +zone=33 +datum=WGS84");
        reproject_points(&mut xy, Some(&mut z), &a, &b, 0, 1).unwrap();
        assert_eq!((xy, z), ([123.0, 456.0], [7.0]));
    }

    #[test]
    fn test_parallel_matches_serial() {
        let n = 3 * PAR_CHUNK_POINTS + 17;
        let mut serial: Vec<f64> = (0..n)
            .flat_map(|i| [-10.0 + (i % 200) as f64 * 0.1, 40.0 + (i / 200) as f64 * 0.1])
            .collect();
        let mut parallel = serial.clone();
        let mut z_serial = vec![100.0; n];
        let mut z_parallel = z_serial.clone();
        let (src, dst) = (info("EPSG:4326"), info("EPSG:23030"));

        reproject_points(&mut serial, Some(&mut z_serial), &src, &dst, 5, n - 5).unwrap();
        par_reproject_points(&mut parallel, Some(&mut z_parallel), &src, &dst, 5, n - 5).unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(z_serial, z_parallel);
    }

    #[test]
    fn test_failed_batch_leaves_points_untouched() {
        let grid = crate::datum::gridshift::synthetic_ntv2((50.0, 52.0, 4.0, 6.0), 0.5, false, |_, _| (2.0, -1.0));
        crate::datum::register_grid("partial_cover.gsb", &grid).unwrap();
        let src = info("+proj=longlat +ellps=GRS80 +nadgrids=partial_cover.gsb +no_defs");
        let dst = info("EPSG:4326");

        // The first point is covered by the grid, the last one is not.
        let original = [5.0, 51.0, 40.0, 10.0];
        let mut xy = original;
        let mut z = [12.0, 34.0];
        let result = reproject_points(&mut xy, Some(&mut z), &src, &dst, 0, 2);
        assert!(matches!(result, Err(ProjError::OutsideGrid { .. })), "{result:?}");
        assert_eq!(xy, original);
        assert_eq!(z, [12.0, 34.0]);

        let n = 2 * PAR_CHUNK_POINTS + 3;
        let mut xy: Vec<f64> = (0..n).flat_map(|_| [5.0, 51.0]).collect();
        xy[2 * n - 2] = 40.0;
        let before = xy.clone();
        let result = par_reproject_points(&mut xy, None, &src, &dst, 0, n);
        assert!(matches!(result, Err(ProjError::OutsideGrid { .. })), "{result:?}");
        assert_eq!(xy, before);

        // The same batch without the stray point goes through.
        reproject_points(&mut xy, None, &src, &dst, 0, n - 1).unwrap();
        assert_relative_eq!(xy[0], 5.0 + 2.0 / 3600.0, epsilon = 1e-9);
        assert_relative_eq!(xy[1], 51.0 - 1.0 / 3600.0, epsilon = 1e-9);
    }
}
