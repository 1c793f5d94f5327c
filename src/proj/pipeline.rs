//! CRS-to-CRS transform chain: unproject the source, shift the
//! datum, project onto the target.

use crate::crs::ProjectionInfo;
use crate::datum::DatumTransform;
use crate::error::{ProjError, Result};
use crate::proj::common::adjlon;
use crate::proj::registry::{self, AnyProjection};
use crate::proj::Projection;

/// Describes a CRS endpoint in the pipeline.
enum CrsEndpoint {
    /// Geographic CRS: coordinates are in the CRS angular unit externally,
    /// radians internally.
    Geographic { radians_per_unit: f64 },
    /// Projected CRS: coordinates are in the CRS linear unit.
    Projected {
        projection: AnyProjection,
        lon_0: f64,
        meters_per_unit: f64,
        over: bool,
    },
}

impl CrsEndpoint {
    fn new(info: &ProjectionInfo) -> Result<Self> {
        Ok(match registry::build(info)? {
            None => CrsEndpoint::Geographic {
                radians_per_unit: info.geographic.unit.radians,
            },
            Some((projection, lon_0)) => CrsEndpoint::Projected {
                projection,
                lon_0,
                meters_per_unit: info.unit.meters,
                over: info.over,
            },
        })
    }

    /// Native coordinates → (λ, φ) radians relative to this CRS's prime meridian.
    #[inline]
    fn to_geographic(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            CrsEndpoint::Geographic { radians_per_unit } => Ok((x * radians_per_unit, y * radians_per_unit)),
            CrsEndpoint::Projected {
                projection,
                lon_0,
                meters_per_unit,
                over,
            } => {
                let (lam, phi) = projection.inverse(x * meters_per_unit, y * meters_per_unit)?;
                let lon = lon_0 + lam;
                Ok((if *over { lon } else { adjlon(lon) }, phi))
            }
        }
    }

    /// (λ, φ) radians relative to this CRS's prime meridian → native coordinates.
    #[inline]
    fn from_geographic(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match self {
            CrsEndpoint::Geographic { radians_per_unit } => Ok((lon / radians_per_unit, lat / radians_per_unit)),
            CrsEndpoint::Projected {
                projection,
                lon_0,
                meters_per_unit,
                over,
            } => {
                let lam = lon - lon_0;
                let lam = if *over { lam } else { adjlon(lam) };
                let (x, y) = projection.forward(lam, lat)?;
                Ok((x / meters_per_unit, y / meters_per_unit))
            }
        }
    }
}

impl CrsEndpoint {
    /// Batch form of [`to_geographic`](Self::to_geographic).
    fn to_geographic_batch(&self, points: &mut [(f64, f64)]) -> Result<()> {
        match self {
            CrsEndpoint::Geographic { radians_per_unit } => {
                for p in points.iter_mut() {
                    *p = (p.0 * radians_per_unit, p.1 * radians_per_unit);
                }
            }
            CrsEndpoint::Projected {
                projection,
                lon_0,
                meters_per_unit,
                over,
            } => {
                for p in points.iter_mut() {
                    *p = (p.0 * meters_per_unit, p.1 * meters_per_unit);
                }
                projection.inverse_batch(points)?;
                for p in points.iter_mut() {
                    let lon = lon_0 + p.0;
                    p.0 = if *over { lon } else { adjlon(lon) };
                }
            }
        }
        Ok(())
    }

    /// Batch form of [`from_geographic`](Self::from_geographic).
    fn from_geographic_batch(&self, points: &mut [(f64, f64)]) -> Result<()> {
        match self {
            CrsEndpoint::Geographic { radians_per_unit } => {
                for p in points.iter_mut() {
                    *p = (p.0 / radians_per_unit, p.1 / radians_per_unit);
                }
            }
            CrsEndpoint::Projected {
                projection,
                lon_0,
                meters_per_unit,
                over,
            } => {
                for p in points.iter_mut() {
                    let lam = p.0 - lon_0;
                    p.0 = if *over { lam } else { adjlon(lam) };
                }
                projection.forward_batch(points)?;
                for p in points.iter_mut() {
                    *p = (p.0 / meters_per_unit, p.1 / meters_per_unit);
                }
            }
        }
        Ok(())
    }
}

/// Transformed copies of a run of points, held until the whole run succeeds.
pub(crate) struct Staged {
    points: Vec<(f64, f64)>,
    heights: Option<Vec<f64>>,
}

impl Staged {
    /// Write the staged points back over `xy` (and `z`).
    pub(crate) fn commit(&self, xy: &mut [f64], z: Option<&mut [f64]>) {
        for (pair, &(x, y)) in xy.chunks_exact_mut(2).zip(&self.points) {
            pair[0] = x;
            pair[1] = y;
        }
        if let (Some(z), Some(heights)) = (z, &self.heights) {
            z[..heights.len()].copy_from_slice(heights);
        }
    }
}

enum Steps {
    /// Source and target describe the same computation.
    Identity,
    Chain {
        src: CrsEndpoint,
        dst: CrsEndpoint,
        src_pm: f64,
        dst_pm: f64,
        datum: DatumTransform,
    },
}

/// A CRS-to-CRS transform pipeline.
///
/// Built once per CRS pair and reusable from any thread. Invalid CRS
/// components and missing grids fail when the pipeline is built.
pub struct Pipeline {
    steps: Steps,
}

impl Pipeline {
    pub fn new(src: &ProjectionInfo, dst: &ProjectionInfo) -> Result<Self> {
        if src == dst {
            log::debug!("Source and target CRS are equal, pipeline is a no-op");
            return Ok(Self { steps: Steps::Identity });
        }

        let steps = Steps::Chain {
            src: CrsEndpoint::new(src)?,
            dst: CrsEndpoint::new(dst)?,
            src_pm: src.geographic.prime_meridian.radians(),
            dst_pm: dst.geographic.prime_meridian.radians(),
            datum: DatumTransform::new(src.datum(), dst.datum())?,
        };
        log::debug!(
            "Built pipeline {} -> {}",
            src.authority.as_ref().map_or_else(|| src.to_proj4_string(), |a| a.to_string()),
            dst.authority.as_ref().map_or_else(|| dst.to_proj4_string(), |a| a.to_string()),
        );
        Ok(Self { steps })
    }

    /// Convenience constructor from any supported definition string.
    pub fn from_definitions(src: &str, dst: &str) -> Result<Self> {
        Self::new(&src.parse::<ProjectionInfo>()?, &dst.parse::<ProjectionInfo>()?)
    }

    pub fn is_identity(&self) -> bool {
        matches!(self.steps, Steps::Identity)
    }

    /// Transform a single point. Coordinates use CRS native units (angular
    /// unit for geographic, linear unit for projected); `z` is metres.
    pub fn transform(&self, x: f64, y: f64, z: f64) -> Result<(f64, f64, f64)> {
        let Steps::Chain {
            src,
            dst,
            src_pm,
            dst_pm,
            datum,
        } = &self.steps
        else {
            return Ok((x, y, z));
        };

        let (lon, lat) = src.to_geographic(x, y)?;
        let (lon, lat, z) = datum.apply(lon + src_pm, lat, z)?;
        let (x, y) = dst.from_geographic(lon - dst_pm, lat)?;
        Ok((x, y, z))
    }

    /// Transform interleaved `[x0, y0, x1, y1, ...]` in place, with optional
    /// heights (one per point). On error the inputs are left untouched.
    pub fn transform_slice(&self, xy: &mut [f64], z: Option<&mut [f64]>) -> Result<()> {
        if self.is_identity() {
            return Ok(());
        }
        let staged = self.stage(xy, z.as_deref())?;
        staged.commit(xy, z);
        Ok(())
    }

    /// Transform a run of points into a new buffer, stage by stage, without
    /// touching the inputs.
    pub(crate) fn stage(&self, xy: &[f64], z: Option<&[f64]>) -> Result<Staged> {
        let mut points: Vec<(f64, f64)> = xy.chunks_exact(2).map(|pair| (pair[0], pair[1])).collect();
        let mut heights = match z {
            Some(z) if z.len() < points.len() => {
                return Err(ProjError::InvalidParameter(format!(
                    "{} heights for {} points",
                    z.len(),
                    points.len()
                )))
            }
            Some(z) => Some(z[..points.len()].to_vec()),
            None => None,
        };
        let Steps::Chain {
            src,
            dst,
            src_pm,
            dst_pm,
            datum,
        } = &self.steps
        else {
            return Ok(Staged { points, heights });
        };

        src.to_geographic_batch(&mut points)?;
        for (i, p) in points.iter_mut().enumerate() {
            let h = heights.as_ref().map_or(0.0, |h| h[i]);
            let (lon, lat, h) = datum.apply(p.0 + src_pm, p.1, h)?;
            *p = (lon - dst_pm, lat);
            if let Some(heights) = heights.as_mut() {
                heights[i] = h;
            }
        }
        dst.from_geographic_batch(&mut points)?;
        Ok(Staged { points, heights })
    }
}
