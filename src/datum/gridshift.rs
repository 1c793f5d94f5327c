//! NTv2 datum shift grids.
//!
//! A grid file holds one or more sub-grids of latitude/longitude corrections
//! in arc-seconds, longitudes positive west, nodes ordered from the south-east
//! corner westward then northward. Grids are loaded once per process and
//! shared; in-memory grids can be registered under a name.

use std::collections::HashMap;
use std::f64::consts::{FRAC_PI_2, PI};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use crate::config::{MissingGridPolicy, Settings};
use crate::error::{ProjError, Result};
use crate::proj::common::adjlon;

const ARCSEC_TO_RAD: f64 = PI / (180.0 * 3600.0);
const RECORD: usize = 16;
const INVERSE_ITERATIONS: usize = 10;
const INVERSE_TOLERANCE: f64 = 1e-12;

/// Name of the built-in identity grid.
pub const NULL_GRID: &str = "null";

#[derive(Debug)]
struct SubGrid {
    name: String,
    lon_min: f64,
    lat_min: f64,
    dlon: f64,
    dlat: f64,
    cols: usize,
    rows: usize,
    /// (Δλ east-positive, Δφ) in radians, row-major from the south-west node.
    shifts: Vec<[f64; 2]>,
}

impl SubGrid {
    fn node(&self, row: usize, col: usize) -> [f64; 2] {
        self.shifts[row * self.cols + col]
    }

    fn area(&self) -> f64 {
        self.dlon * self.dlat
    }

    /// Bilinear correction at (λ, φ), or `None` outside the sub-grid.
    fn interpolate(&self, lon: f64, lat: f64) -> Option<[f64; 2]> {
        let fx = (lon - self.lon_min) / self.dlon;
        let fy = (lat - self.lat_min) / self.dlat;
        let max_x = (self.cols - 1) as f64;
        let max_y = (self.rows - 1) as f64;
        const SLACK: f64 = 1e-9;
        if !(fx >= -SLACK && fx <= max_x + SLACK && fy >= -SLACK && fy <= max_y + SLACK) {
            return None;
        }
        let fx = fx.clamp(0.0, max_x);
        let fy = fy.clamp(0.0, max_y);
        let col = (fx.floor() as usize).min(self.cols - 2);
        let row = (fy.floor() as usize).min(self.rows - 2);
        let (x, y) = (fx - col as f64, fy - row as f64);

        let sw = self.node(row, col);
        let se = self.node(row, col + 1);
        let nw = self.node(row + 1, col);
        let ne = self.node(row + 1, col + 1);

        let (dx, dy) = (1.0 - x, 1.0 - y);
        let (xy, xdy, dxy, dxdy) = (x * y, x * dy, dx * y, dx * dy);
        let blend = |i: usize| sw[i] * dxdy + se[i] * xdy + nw[i] * dxy + ne[i] * xy;
        Some([blend(0), blend(1)])
    }
}

/// A loaded datum shift grid.
#[derive(Debug)]
pub struct Grid {
    name: String,
    subgrids: Vec<SubGrid>,
    identity: bool,
}

impl Grid {
    /// The identity grid: covers the whole world with zero shift.
    pub fn null() -> Self {
        Self {
            name: NULL_GRID.to_string(),
            subgrids: Vec::new(),
            identity: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subgrid_count(&self) -> usize {
        self.subgrids.len()
    }

    /// Parse an NTv2 file in either byte order.
    pub fn from_ntv2_bytes(name: &str, data: &[u8]) -> Result<Self> {
        let reader = Ntv2Reader::new(name, data)?;
        let num_orec = reader.count(0, "NUM_OREC")?;
        let num_srec = reader.count(1, "NUM_SREC")?;
        let num_file = reader.count(2, "NUM_FILE")?;
        if num_srec < 11 {
            return Err(reader.error(format!("sub-grid header has {num_srec} records, expected 11")));
        }

        let mut offset = reader.span(num_orec)?;
        let sub_header = reader.span(num_srec)?;
        // Every sub-grid needs at least its header and four nodes.
        if num_file > data.len() / (sub_header + 4 * RECORD) {
            return Err(reader.error(format!("NUM_FILE {num_file} exceeds the file size")));
        }
        let mut subgrids = Vec::with_capacity(num_file);
        for _ in 0..num_file {
            let header = reader.at(offset);
            let sub_name = header.text(0)?;
            let s_lat = header.float(4)?;
            let n_lat = header.float(5)?;
            let e_long = header.float(6)?;
            let w_long = header.float(7)?;
            let lat_inc = header.float(8)?;
            let long_inc = header.float(9)?;
            let count = header.count(10, "GS_COUNT")?;

            if !(lat_inc > 0.0 && long_inc > 0.0) {
                return Err(reader.error(format!("sub-grid {sub_name} has non-positive increments")));
            }
            let lattice = (lattice_len(s_lat, n_lat, lat_inc), lattice_len(e_long, w_long, long_inc));
            let (rows, cols) = match lattice {
                (Some(rows), Some(cols)) if rows >= 2 && cols >= 2 && rows.checked_mul(cols) == Some(count) => {
                    (rows, cols)
                }
                _ => {
                    return Err(reader.error(format!(
                        "sub-grid {sub_name} declares {count} nodes for extent {s_lat}..{n_lat}, {e_long}..{w_long}"
                    )))
                }
            };

            offset = offset
                .checked_add(sub_header)
                .ok_or_else(|| reader.error("sub-grid offset overflows".to_string()))?;
            let end = offset
                .checked_add(reader.span(count)?)
                .filter(|&end| end <= data.len())
                .ok_or_else(|| reader.error(format!("sub-grid {sub_name} is truncated")))?;

            let mut shifts = vec![[0.0; 2]; count];
            for row in 0..rows {
                for col_west in 0..cols {
                    let node = reader.node(offset + (row * cols + col_west) * RECORD)?;
                    let col = cols - 1 - col_west;
                    shifts[row * cols + col] = [-node[1] * ARCSEC_TO_RAD, node[0] * ARCSEC_TO_RAD];
                }
            }
            offset = end;

            subgrids.push(SubGrid {
                name: sub_name,
                lon_min: -w_long * ARCSEC_TO_RAD,
                lat_min: s_lat * ARCSEC_TO_RAD,
                dlon: long_inc * ARCSEC_TO_RAD,
                dlat: lat_inc * ARCSEC_TO_RAD,
                cols,
                rows,
                shifts,
            });
        }

        if subgrids.is_empty() {
            return Err(reader.error("file contains no sub-grids".to_string()));
        }
        Ok(Self {
            name: name.to_string(),
            subgrids,
            identity: false,
        })
    }

    /// Correction (Δλ, Δφ) in radians at (λ, φ), from the finest sub-grid
    /// that contains the point.
    pub fn shift_at(&self, lon: f64, lat: f64) -> Option<(f64, f64)> {
        if self.identity {
            return Some((0.0, 0.0));
        }
        let lon = adjlon(lon);
        self.subgrids
            .iter()
            .filter_map(|sub| sub.interpolate(lon, lat).map(|shift| (sub, shift)))
            .min_by(|(a, _), (b, _)| a.area().total_cmp(&b.area()))
            .map(|(sub, [dlon, dlat])| {
                log::trace!("Grid {} sub-grid {} covers ({lon}, {lat})", self.name, sub.name);
                (dlon, dlat)
            })
    }

    pub fn contains(&self, lon: f64, lat: f64) -> bool {
        self.shift_at(lon, lat).is_some()
    }
}

/// Node count along one axis of a sub-grid, `None` for a malformed extent.
fn lattice_len(from: f64, to: f64, step: f64) -> Option<usize> {
    let intervals = ((to - from) / step).round();
    if !(intervals >= 0.0 && intervals < u32::MAX as f64) {
        return None;
    }
    (intervals as usize).checked_add(1)
}

/// Byte-order aware view over an NTv2 buffer.
struct Ntv2Reader<'a> {
    name: &'a str,
    data: &'a [u8],
    base: usize,
    little_endian: bool,
}

impl<'a> Ntv2Reader<'a> {
    fn new(name: &'a str, data: &'a [u8]) -> Result<Self> {
        let not_ntv2 = || ProjError::GridNotLoaded {
            grid: name.to_string(),
            reason: "not an NTv2 grid".to_string(),
        };
        if data.len() < 11 * RECORD || &data[..8] != b"NUM_OREC" {
            return Err(not_ntv2());
        }
        let raw: [u8; 4] = [data[8], data[9], data[10], data[11]];
        let little_endian = if i32::from_le_bytes(raw) == 11 {
            true
        } else if i32::from_be_bytes(raw) == 11 {
            false
        } else {
            return Err(not_ntv2());
        };
        Ok(Self {
            name,
            data,
            base: 0,
            little_endian,
        })
    }

    fn at(&self, base: usize) -> Self {
        Self { base, ..*self }
    }

    fn error(&self, reason: String) -> ProjError {
        ProjError::GridNotLoaded {
            grid: self.name.to_string(),
            reason,
        }
    }

    fn bytes<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        offset
            .checked_add(N)
            .and_then(|end| self.data.get(offset..end))
            .and_then(|slice| slice.try_into().ok())
            .ok_or_else(|| self.error(format!("truncated at byte {offset}")))
    }

    fn value_offset(&self, record: usize) -> usize {
        self.base + record * RECORD + 8
    }

    fn int(&self, record: usize) -> Result<i32> {
        let raw = self.bytes::<4>(self.value_offset(record))?;
        Ok(if self.little_endian {
            i32::from_le_bytes(raw)
        } else {
            i32::from_be_bytes(raw)
        })
    }

    /// A non-negative count field.
    fn count(&self, record: usize, field: &str) -> Result<usize> {
        let value = self.int(record)?;
        usize::try_from(value).map_err(|_| self.error(format!("negative {field} ({value})")))
    }

    /// Byte length of `records` records, bounded by the buffer.
    fn span(&self, records: usize) -> Result<usize> {
        records
            .checked_mul(RECORD)
            .filter(|&bytes| bytes <= self.data.len())
            .ok_or_else(|| self.error(format!("{records} records exceed the file size")))
    }

    fn float(&self, record: usize) -> Result<f64> {
        let raw = self.bytes::<8>(self.value_offset(record))?;
        Ok(if self.little_endian {
            f64::from_le_bytes(raw)
        } else {
            f64::from_be_bytes(raw)
        })
    }

    fn text(&self, record: usize) -> Result<String> {
        let raw = self.bytes::<8>(self.value_offset(record))?;
        Ok(String::from_utf8_lossy(&raw).trim_end_matches(['\0', ' ']).to_string())
    }

    /// One node: latitude shift, longitude shift (both arc-seconds).
    fn node(&self, offset: usize) -> Result<[f64; 2]> {
        let read = |at: usize| -> Result<f64> {
            let raw = self.bytes::<4>(at)?;
            Ok(f64::from(if self.little_endian {
                f32::from_le_bytes(raw)
            } else {
                f32::from_be_bytes(raw)
            }))
        };
        Ok([read(offset)?, read(offset + 4)?])
    }
}

type Slot = Arc<Mutex<Option<Arc<Grid>>>>;

static GRID_CACHE: OnceLock<Mutex<HashMap<String, Slot>>> = OnceLock::new();

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

fn slot(name: &str) -> Slot {
    let cache = GRID_CACHE.get_or_init(|| Mutex::new(HashMap::new()));
    lock(cache).entry(name.to_string()).or_default().clone()
}

/// Register an in-memory NTv2 grid under `name`, replacing any grid already
/// cached under that name.
pub fn register_grid(name: &str, data: &[u8]) -> Result<()> {
    let grid = Arc::new(Grid::from_ntv2_bytes(name, data)?);
    let slot = slot(name);
    *lock(&slot) = Some(grid);
    log::info!("Registered datum shift grid {name}");
    Ok(())
}

fn find_grid_file(name: &str, search_paths: &[PathBuf]) -> Option<PathBuf> {
    let path = Path::new(name);
    if path.is_absolute() {
        return path.is_file().then(|| path.to_path_buf());
    }
    search_paths.iter().map(|dir| dir.join(name)).find(|candidate| candidate.is_file())
}

/// Load a grid by name, reading it from disk on first use. Concurrent callers
/// for the same name wait for a single load; failures are not cached.
pub fn load_grid(name: &str, search_paths: &[PathBuf]) -> Result<Arc<Grid>> {
    if name.eq_ignore_ascii_case(NULL_GRID) {
        return Ok(Arc::new(Grid::null()));
    }
    let slot = slot(name);
    let mut guard = lock(&slot);
    if let Some(grid) = guard.as_ref() {
        return Ok(grid.clone());
    }

    let path = find_grid_file(name, search_paths).ok_or_else(|| ProjError::GridNotLoaded {
        grid: name.to_string(),
        reason: format!("not found in {} search path(s)", search_paths.len()),
    })?;
    let data = std::fs::read(&path).map_err(|err| ProjError::GridNotLoaded {
        grid: name.to_string(),
        reason: err.to_string(),
    })?;
    let grid = Arc::new(Grid::from_ntv2_bytes(name, &data)?);
    log::info!(
        "Loaded datum shift grid {} from {} ({} sub-grid(s))",
        name,
        path.display(),
        grid.subgrid_count()
    );
    *guard = Some(grid.clone());
    Ok(grid)
}

/// The ordered grid list of one datum, resolved against the configuration.
#[derive(Debug)]
pub struct GridList {
    grids: Vec<Arc<Grid>>,
    names: String,
    required: bool,
}

impl GridList {
    /// Resolve `names`; a leading `@` marks a grid optional.
    pub(crate) fn load(names: &[String], settings: &Settings) -> Result<Self> {
        let mut grids = Vec::with_capacity(names.len());
        let mut required = false;
        let mut passthrough = false;

        for entry in names {
            let (optional, name) = match entry.strip_prefix('@') {
                Some(name) => (true, name),
                None => (false, entry.as_str()),
            };
            required |= !optional;
            match load_grid(name, &settings.grid_search_paths) {
                Ok(grid) => grids.push(grid),
                Err(err) if optional => log::debug!("Skipping optional grid: {err}"),
                Err(err) if settings.missing_grid_policy == MissingGridPolicy::Passthrough => {
                    log::warn!("{err}; coordinates outside the remaining grids are left unshifted");
                    passthrough = true;
                }
                Err(err) => return Err(err),
            }
        }

        Ok(Self {
            grids,
            names: names.join(","),
            required: required && !passthrough,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.grids.is_empty()
    }

    fn outside(&self, lon: f64, lat: f64) -> ProjError {
        ProjError::OutsideGrid {
            grids: self.names.clone(),
            lon: lon.to_degrees(),
            lat: lat.to_degrees(),
        }
    }

    fn covering(&self, lon: f64, lat: f64) -> Option<&Grid> {
        self.grids.iter().map(Arc::as_ref).find(|grid| grid.contains(lon, lat))
    }

    /// Apply the shift at (λ, φ).
    pub fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match self.covering(lon, lat).and_then(|grid| grid.shift_at(lon, lat)) {
            Some((dlon, dlat)) => Ok((lon + dlon, (lat + dlat).clamp(-FRAC_PI_2, FRAC_PI_2))),
            None if self.required => Err(self.outside(lon, lat)),
            None => Ok((lon, lat)),
        }
    }

    /// Undo the shift: find (λ₀, φ₀) whose forward shift lands on (λ, φ).
    pub fn inverse(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let Some(grid) = self.covering(lon, lat) else {
            return if self.required {
                Err(self.outside(lon, lat))
            } else {
                Ok((lon, lat))
            };
        };

        let (mut tlon, mut tlat) = (lon, lat);
        if let Some((dlon, dlat)) = grid.shift_at(lon, lat) {
            tlon -= dlon;
            tlat -= dlat;
        }
        for _ in 0..INVERSE_ITERATIONS {
            let Some((dlon, dlat)) = grid.shift_at(tlon, tlat) else {
                break;
            };
            let dif_lon = tlon + dlon - lon;
            let dif_lat = tlat + dlat - lat;
            tlon -= dif_lon;
            tlat -= dif_lat;
            if dif_lon.abs() < INVERSE_TOLERANCE && dif_lat.abs() < INVERSE_TOLERANCE {
                break;
            }
        }
        Ok((tlon, tlat.clamp(-FRAC_PI_2, FRAC_PI_2)))
    }
}

/// Build an NTv2 buffer with a single sub-grid. Used by tests and benchmarks.
///
/// `extent` is (south, north, west, east) in degrees, `step` the node spacing
/// in degrees, and `shift(lon, lat)` returns the correction in arc-seconds as
/// (Δλ east-positive, Δφ).
#[doc(hidden)]
pub fn synthetic_ntv2(
    extent: (f64, f64, f64, f64),
    step: f64,
    big_endian: bool,
    shift: impl Fn(f64, f64) -> (f64, f64),
) -> Vec<u8> {
    let (south, north, west, east) = extent;
    let rows = ((north - south) / step).round() as usize + 1;
    let cols = ((east - west) / step).round() as usize + 1;
    let mut out = Vec::new();

    let int = |v: i32| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let float = |v: f64| if big_endian { v.to_be_bytes() } else { v.to_le_bytes() };
    let key = |name: &str| {
        let mut k = [b' '; 8];
        k[..name.len()].copy_from_slice(name.as_bytes());
        k
    };
    let text = |value: &str| {
        let mut v = [b' '; 8];
        v[..value.len().min(8)].copy_from_slice(&value.as_bytes()[..value.len().min(8)]);
        v
    };
    let push_int = |out: &mut Vec<u8>, name: &str, v: i32| {
        out.extend_from_slice(&key(name));
        out.extend_from_slice(&int(v));
        out.extend_from_slice(&[0; 4]);
    };
    let push_float = |out: &mut Vec<u8>, name: &str, v: f64| {
        out.extend_from_slice(&key(name));
        out.extend_from_slice(&float(v));
    };
    let push_text = |out: &mut Vec<u8>, name: &str, v: &str| {
        out.extend_from_slice(&key(name));
        out.extend_from_slice(&text(v));
    };

    push_int(&mut out, "NUM_OREC", 11);
    push_int(&mut out, "NUM_SREC", 11);
    push_int(&mut out, "NUM_FILE", 1);
    push_text(&mut out, "GS_TYPE", "SECONDS");
    push_text(&mut out, "VERSION", "NTv2.0");
    push_text(&mut out, "SYSTEM_F", "TEST");
    push_text(&mut out, "SYSTEM_T", "WGS84");
    push_float(&mut out, "MAJOR_F", 6_378_137.0);
    push_float(&mut out, "MINOR_F", 6_356_752.314);
    push_float(&mut out, "MAJOR_T", 6_378_137.0);
    push_float(&mut out, "MINOR_T", 6_356_752.314);

    push_text(&mut out, "SUB_NAME", "TEST");
    push_text(&mut out, "PARENT", "NONE");
    push_text(&mut out, "CREATED", "");
    push_text(&mut out, "UPDATED", "");
    push_float(&mut out, "S_LAT", south * 3600.0);
    push_float(&mut out, "N_LAT", north * 3600.0);
    push_float(&mut out, "E_LONG", -east * 3600.0);
    push_float(&mut out, "W_LONG", -west * 3600.0);
    push_float(&mut out, "LAT_INC", step * 3600.0);
    push_float(&mut out, "LONG_INC", step * 3600.0);
    push_int(&mut out, "GS_COUNT", (rows * cols) as i32);

    for row in 0..rows {
        for col_west in 0..cols {
            let lon = east - col_west as f64 * step;
            let lat = south + row as f64 * step;
            let (dlon, dlat) = shift(lon, lat);
            for value in [dlat as f32, -dlon as f32, 0.0, 0.0] {
                out.extend_from_slice(&if big_endian { value.to_be_bytes() } else { value.to_le_bytes() });
            }
        }
    }
    push_text(&mut out, "END", "");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn linear_grid(big_endian: bool) -> Grid {
        // Δλ = 1" + 0.1"·lon, Δφ = -2" + 0.05"·lat
        let data = synthetic_ntv2((40.0, 50.0, -10.0, 5.0), 0.5, big_endian, |lon, lat| {
            (1.0 + 0.1 * lon, -2.0 + 0.05 * lat)
        });
        Grid::from_ntv2_bytes("linear", &data).unwrap()
    }

    fn settings() -> Settings {
        Settings::default()
    }

    #[test]
    fn test_parse_both_byte_orders() {
        for big_endian in [false, true] {
            let grid = linear_grid(big_endian);
            assert_eq!(grid.subgrid_count(), 1);
            let sub = &grid.subgrids[0];
            assert_eq!((sub.rows, sub.cols), (21, 31));
            assert_relative_eq!(sub.lon_min, (-10.0_f64).to_radians(), epsilon = 1e-15);
        }
    }

    #[test]
    fn test_bilinear_is_exact_for_linear_field() {
        let grid = linear_grid(false);
        let (lon, lat) = (-3.3_f64, 44.7_f64);
        let (dlon, dlat) = grid.shift_at(lon.to_radians(), lat.to_radians()).unwrap();
        assert_relative_eq!(dlon / ARCSEC_TO_RAD, 1.0 + 0.1 * lon, epsilon = 1e-5);
        assert_relative_eq!(dlat / ARCSEC_TO_RAD, -2.0 + 0.05 * lat, epsilon = 1e-5);
    }

    #[test]
    fn test_edges_and_outside() {
        let grid = linear_grid(false);
        assert!(grid.contains(5.0_f64.to_radians(), 50.0_f64.to_radians()));
        assert!(grid.contains((-10.0_f64).to_radians(), 40.0_f64.to_radians()));
        assert!(!grid.contains(5.1_f64.to_radians(), 45.0_f64.to_radians()));
        assert!(!grid.contains(0.0, 39.0_f64.to_radians()));
    }

    #[test]
    fn test_inverse_undoes_forward() {
        let list = GridList {
            grids: vec![Arc::new(linear_grid(true))],
            names: "linear".to_string(),
            required: true,
        };
        let (lon, lat) = (1.25_f64.to_radians(), 47.5_f64.to_radians());
        let (slon, slat) = list.forward(lon, lat).unwrap();
        assert!((slon - lon).abs() > 1e-7);
        let (ilon, ilat) = list.inverse(slon, slat).unwrap();
        assert_relative_eq!(ilon, lon, epsilon = 1e-12);
        assert_relative_eq!(ilat, lat, epsilon = 1e-12);
    }

    #[test]
    fn test_outside_required_and_optional() {
        let grid = Arc::new(linear_grid(false));
        let required = GridList {
            grids: vec![grid.clone()],
            names: "linear".to_string(),
            required: true,
        };
        assert!(matches!(required.forward(0.5, 0.1), Err(ProjError::OutsideGrid { .. })));
        let optional = GridList {
            grids: vec![grid],
            names: "@linear".to_string(),
            required: false,
        };
        assert_eq!(optional.forward(0.5, 0.1).unwrap(), (0.5, 0.1));
    }

    #[test]
    fn test_null_grid_is_identity_everywhere() {
        let list = GridList::load(&["@null".to_string()], &settings()).unwrap();
        assert_eq!(list.forward(3.0, -1.2).unwrap(), (3.0, -1.2));
        assert_eq!(list.inverse(-7.0, 0.3).unwrap(), (-7.0, 0.3));
    }

    #[test]
    fn test_missing_grid_policy() {
        let names = vec!["does_not_exist.gsb".to_string()];
        assert!(matches!(
            GridList::load(&names, &settings()),
            Err(ProjError::GridNotLoaded { grid, .. }) if grid == "does_not_exist.gsb"
        ));

        let lenient = Settings {
            missing_grid_policy: MissingGridPolicy::Passthrough,
            ..Settings::default()
        };
        let list = GridList::load(&names, &lenient).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.forward(0.1, 0.2).unwrap(), (0.1, 0.2));

        let optional = GridList::load(&["@does_not_exist.gsb".to_string()], &settings()).unwrap();
        assert!(optional.is_empty());
    }

    #[test]
    fn test_rejects_garbage() {
        assert!(matches!(
            Grid::from_ntv2_bytes("junk", b"definitely not a grid"),
            Err(ProjError::GridNotLoaded { .. })
        ));
        let mut data = synthetic_ntv2((0.0, 1.0, 0.0, 1.0), 0.5, false, |_, _| (0.0, 0.0));
        data.truncate(data.len() - 40);
        assert!(Grid::from_ntv2_bytes("short", &data).is_err());
    }

    #[test]
    fn test_malformed_header_fields_are_errors() {
        let valid = synthetic_ntv2((0.0, 1.0, 0.0, 1.0), 0.5, false, |_, _| (0.0, 0.0));
        let patch_int = |at: usize, value: i32| {
            let mut data = valid.clone();
            data[at..at + 4].copy_from_slice(&value.to_le_bytes());
            data
        };
        let patch_float = |at: usize, value: f64| {
            let mut data = valid.clone();
            data[at..at + 8].copy_from_slice(&value.to_le_bytes());
            data
        };
        // NUM_SREC, NUM_FILE, then the sub-grid GS_COUNT and S_LAT values.
        let cases = [
            patch_int(24, -1),
            patch_int(24, i32::MAX),
            patch_int(40, -1),
            patch_int(40, i32::MAX),
            patch_int(344, -1),
            patch_int(344, i32::MAX),
            patch_float(248, f64::NAN),
            patch_float(248, -1e300),
        ];
        for data in cases {
            let result = Grid::from_ntv2_bytes("malformed", &data);
            assert!(matches!(result, Err(ProjError::GridNotLoaded { .. })), "{result:?}");
        }
        assert!(Grid::from_ntv2_bytes("valid", &valid).is_ok());
    }

    #[test]
    fn test_register_grid() {
        let data = synthetic_ntv2((0.0, 2.0, 0.0, 2.0), 1.0, false, |_, _| (3.6, 0.0));
        register_grid("registered-unit-test", &data).unwrap();
        let grid = load_grid("registered-unit-test", &[]).unwrap();
        let (dlon, _) = grid.shift_at(0.01, 0.01).unwrap();
        assert_relative_eq!(dlon, 0.001_f64.to_radians(), epsilon = 1e-12);
    }
}
