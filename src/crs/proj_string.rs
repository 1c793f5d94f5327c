//! PROJ.4 definition strings.
//!
//! `+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy +towgs84=...`
//!
//! Keys may omit the leading `+`. The first occurrence of a key wins, so
//! explicit keys take precedence over an expanded `+init=authority:code`.
//! Angles are decimal degrees or DMS (`15d48'29.8"E`).

use crate::crs::datum::{Datum, DatumMethod};
use crate::crs::spheroid::Spheroid;
use crate::crs::units::{LinearUnit, PrimeMeridian};
use crate::crs::{epsg, GeographicInfo, ProjectionInfo, ProjectionParams};
use crate::error::{ProjError, Result};
use crate::proj::registry::ProjectionMethod;

/// Keys understood by the parser. Anything else is ignored.
const KNOWN_KEYS: &[&str] = &[
    "proj", "init", "ellps", "datum", "a", "b", "rf", "f", "es", "R", "towgs84", "nadgrids", "pm",
    "units", "to_meter", "lat_0", "lon_0", "lat_1", "lat_2", "lat_ts", "k", "k_0", "x_0", "y_0",
    "zone", "south", "over", "no_defs", "wktext", "type", "no_uoff",
];

struct ParamList<'a> {
    input: &'a str,
    entries: Vec<(String, Option<String>)>,
}

impl<'a> ParamList<'a> {
    fn tokenize(input: &'a str) -> Result<Self> {
        let mut entries = Vec::new();
        for token in input.split_whitespace() {
            let token = token.trim_start_matches('+');
            if token.is_empty() {
                continue;
            }
            let (key, value) = match token.split_once('=') {
                Some((key, value)) => (key, Some(value.to_string())),
                None => (token, None),
            };
            if key.is_empty() {
                return Err(ProjError::parse(input, format!("token '{token}' has no key")));
            }
            entries.push((key.to_string(), value));
        }
        if entries.is_empty() {
            return Err(ProjError::parse(input, "empty definition"));
        }
        Ok(Self { input, entries })
    }

    fn has(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref().unwrap_or(""))
    }

    fn number(&self, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|value| {
                parse_number(value)
                    .ok_or_else(|| ProjError::parse(self.input, format!("invalid number for +{key}: '{value}'")))
            })
            .transpose()
    }

    fn angle(&self, key: &str) -> Result<Option<f64>> {
        self.get(key)
            .map(|value| {
                parse_angle(value)
                    .ok_or_else(|| ProjError::parse(self.input, format!("invalid angle for +{key}: '{value}'")))
            })
            .transpose()
    }

    fn list(&self, key: &str) -> Result<Option<Vec<f64>>> {
        self.get(key)
            .map(|value| {
                value
                    .split(',')
                    .map(|item| {
                        parse_number(item.trim()).ok_or_else(|| {
                            ProjError::parse(self.input, format!("invalid value in +{key}: '{item}'"))
                        })
                    })
                    .collect::<Result<Vec<f64>>>()
            })
            .transpose()
    }
}

fn parse_number(text: &str) -> Option<f64> {
    if let Ok(value) = text.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    // PROJ accepts simple fractions for conversion factors.
    let (num, den) = text.split_once('/')?;
    let num = num.trim().parse::<f64>().ok()?;
    let den = den.trim().parse::<f64>().ok()?;
    Some(num / den).filter(|value| den != 0.0 && value.is_finite())
}

/// Parse decimal degrees or DMS such as `-15d48'29.8"`, `49dN` or `2d30W`.
pub(crate) fn parse_angle(text: &str) -> Option<f64> {
    if let Ok(value) = text.parse::<f64>() {
        return value.is_finite().then_some(value);
    }

    let mut sign = 1.0;
    let mut body = text.trim();
    if let Some(last) = body.chars().last() {
        match last.to_ascii_uppercase() {
            'N' | 'E' => body = &body[..body.len() - 1],
            'S' | 'W' => {
                sign = -sign;
                body = &body[..body.len() - 1];
            }
            _ => {}
        }
    }
    if let Some(rest) = body.strip_prefix('-') {
        sign = -sign;
        body = rest;
    } else if let Some(rest) = body.strip_prefix('+') {
        body = rest;
    }

    let mut value = 0.0;
    let mut scale = 1.0;
    let mut number = String::new();
    for c in body.chars() {
        match c {
            '0'..='9' | '.' => number.push(c),
            'd' | 'D' | '°' | '\'' | '"' => {
                let unit = match c {
                    '\'' => 60.0,
                    '"' => 3600.0,
                    _ => 1.0,
                };
                if !number.is_empty() {
                    value += number.parse::<f64>().ok()? / unit;
                    number.clear();
                }
                scale = unit * 60.0;
            }
            _ => return None,
        }
    }
    if !number.is_empty() {
        value += number.parse::<f64>().ok()? / scale;
    }
    Some(sign * value).filter(|value| value.is_finite())
}

pub(crate) fn parse(definition: &str) -> Result<ProjectionInfo> {
    let mut params = ParamList::tokenize(definition)?;

    if let Some(init) = params.get("init").map(str::to_string) {
        let (authority, code) = init
            .split_once(':')
            .and_then(|(authority, code)| Some((authority, code.parse::<u32>().ok()?)))
            .ok_or_else(|| ProjError::parse(definition, format!("invalid +init reference '{init}'")))?;
        let expanded = epsg::lookup(authority, code).ok_or_else(|| ProjError::UnknownAuthorityCode {
            authority: authority.to_uppercase(),
            code,
        })?;
        let base = ParamList::tokenize(&expanded.proj4)?;
        params.entries.extend(base.entries);
    }

    let proj = params
        .get("proj")
        .ok_or_else(|| ProjError::parse(definition, "missing +proj"))?;
    let method = ProjectionMethod::from_proj_name(proj)?;

    for (key, _) in &params.entries {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            log::debug!("Ignoring unsupported PROJ.4 parameter +{key}");
        }
    }

    let datum = parse_datum(&params)?;
    let prime_meridian = match params.get("pm") {
        None => PrimeMeridian::greenwich(),
        Some(pm) => PrimeMeridian::named(pm)
            .or_else(|| parse_angle(pm).map(PrimeMeridian::from_longitude))
            .ok_or_else(|| ProjError::parse(definition, format!("unknown prime meridian '{pm}'")))?,
    };

    let zone = params
        .get("zone")
        .map(|zone| {
            zone.parse::<u8>()
                .ok()
                .filter(|z| (1..=60).contains(z))
                .ok_or_else(|| ProjError::parse(definition, format!("invalid UTM zone '{zone}'")))
        })
        .transpose()?;

    let projection_params = ProjectionParams {
        lat_0: params.angle("lat_0")?,
        lon_0: params.angle("lon_0")?,
        lat_1: params.angle("lat_1")?,
        lat_2: params.angle("lat_2")?,
        lat_ts: params.angle("lat_ts")?,
        k_0: match params.number("k_0")? {
            Some(k) => Some(k),
            None => params.number("k")?,
        },
        x_0: params.number("x_0")?,
        y_0: params.number("y_0")?,
        zone,
        south: params.has("south"),
    };

    let unit = if method == ProjectionMethod::Geographic {
        LinearUnit::meter()
    } else if let Some(to_meter) = params.number("to_meter")? {
        LinearUnit::from_meters(to_meter)
    } else if let Some(units) = params.get("units") {
        LinearUnit::named(units).ok_or_else(|| ProjError::parse(definition, format!("unknown unit '{units}'")))?
    } else {
        LinearUnit::meter()
    };

    let geographic = GeographicInfo {
        name: datum.name.clone(),
        datum,
        prime_meridian,
        ..GeographicInfo::default()
    };

    Ok(ProjectionInfo {
        name: None,
        authority: None,
        geographic,
        method,
        params: if method == ProjectionMethod::Geographic {
            ProjectionParams::default()
        } else {
            projection_params
        },
        unit,
        over: params.has("over"),
    })
}

fn parse_datum(params: &ParamList<'_>) -> Result<Datum> {
    let named = params
        .get("datum")
        .map(|name| {
            Datum::named(name).ok_or_else(|| ProjError::parse(params.input, format!("unknown datum '{name}'")))
        })
        .transpose()?;

    let spheroid = parse_spheroid(params, named.as_ref())?;

    let method = if let Some(values) = params.list("towgs84")? {
        DatumMethod::from_towgs84(&values).map_err(|e| ProjError::parse(params.input, e.to_string()))?
    } else if let Some(grids) = params.get("nadgrids") {
        DatumMethod::from_nadgrids(grids)
    } else if let Some(datum) = &named {
        datum.method.clone()
    } else {
        DatumMethod::Unknown
    };

    let name = match &named {
        Some(datum) if datum.method == method && datum.spheroid == spheroid => datum.name.clone(),
        _ => Datum::identify(&spheroid, &method).unwrap_or("unknown").to_string(),
    };
    Ok(Datum::new(&name, spheroid, method))
}

fn parse_spheroid(params: &ParamList<'_>, datum: Option<&Datum>) -> Result<Spheroid> {
    if let Some(radius) = params.number("R")? {
        return Ok(Spheroid::sphere(radius));
    }

    let base = match params.get("ellps") {
        Some(name) => Some(
            Spheroid::named(name)
                .ok_or_else(|| ProjError::parse(params.input, format!("unknown ellipsoid '{name}'")))?,
        ),
        None => datum.map(|d| d.spheroid.clone()),
    };

    let a = params.number("a")?;
    let major = a.or(base.as_ref().map(|s| s.a)).unwrap_or_else(|| Spheroid::wgs84().a);
    let shape = if let Some(rf) = params.number("rf")? {
        Some(Spheroid::from_inverse_flattening(major, rf))
    } else if let Some(f) = params.number("f")? {
        Some(Spheroid::new(major, f))
    } else if let Some(b) = params.number("b")? {
        Some(Spheroid::from_semi_minor(major, b))
    } else {
        params
            .number("es")?
            .map(|es| Spheroid::new(major, 1.0 - (1.0 - es).sqrt()))
    };

    let spheroid = match (shape, a, base) {
        (Some(shape), _, _) => shape,
        (None, Some(a), Some(base)) => Spheroid::new(a, base.f),
        (None, Some(a), None) => Spheroid::sphere(a),
        (None, None, Some(base)) => base,
        (None, None, None) => Spheroid::wgs84(),
    };
    if !(spheroid.a > 0.0) || !(0.0..1.0).contains(&spheroid.e2) {
        return Err(ProjError::parse(params.input, "invalid ellipsoid axes"));
    }
    Ok(spheroid)
}

pub(crate) fn format(info: &ProjectionInfo) -> String {
    let mut out = vec![format!("+proj={}", info.method.proj_name())];

    if !info.is_geographic() {
        let p = &info.params;
        let values = [
            ("lat_0", p.lat_0),
            ("lon_0", p.lon_0),
            ("lat_1", p.lat_1),
            ("lat_2", p.lat_2),
            ("lat_ts", p.lat_ts),
            ("k", p.k_0),
            ("x_0", p.x_0),
            ("y_0", p.y_0),
        ];
        out.extend(values.iter().filter_map(|(key, value)| value.map(|v| format!("+{key}={v}"))));
        if let Some(zone) = p.zone {
            out.push(format!("+zone={zone}"));
        }
        if p.south {
            out.push("+south".to_string());
        }
    }

    let datum = info.datum();
    if datum.is_proj_named() {
        out.push(format!("+datum={}", datum.name));
    } else {
        let spheroid = &datum.spheroid;
        match &spheroid.name {
            Some(name) => out.push(format!("+ellps={name}")),
            None if spheroid.is_sphere() => out.push(format!("+R={}", spheroid.a)),
            None => {
                out.push(format!("+a={}", spheroid.a));
                out.push(format!("+rf={}", spheroid.inverse_flattening()));
            }
        }
        match &datum.method {
            DatumMethod::GridShift(grids) => out.push(format!("+nadgrids={}", grids.join(","))),
            DatumMethod::Unknown => {}
            method => {
                if let Some(values) = method.towgs84() {
                    let values: Vec<String> = values.iter().map(f64::to_string).collect();
                    out.push(format!("+towgs84={}", values.join(",")));
                }
            }
        }
    }

    let pm = &info.geographic.prime_meridian;
    if !pm.is_greenwich() {
        match PrimeMeridian::named(&pm.name) {
            Some(named) if named == *pm => out.push(format!("+pm={}", pm.name.to_lowercase())),
            _ => out.push(format!("+pm={}", pm.longitude)),
        }
    }

    if !info.is_geographic() {
        match info.unit.proj_id() {
            Some(id) => out.push(format!("+units={id}")),
            None => out.push(format!("+to_meter={}", info.unit.meters)),
        }
    }
    if info.over {
        out.push("+over".to_string());
    }
    out.push("+no_defs".to_string());
    out.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_parse_osgb() {
        let info = parse(
            "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000 +ellps=airy \
             +towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489 +units=m +no_defs",
        )
        .unwrap();
        assert_eq!(info.method, ProjectionMethod::TransverseMercator);
        assert_eq!(info.params.lat_0, Some(49.0));
        assert_eq!(info.params.k_0, Some(0.9996012717));
        assert_eq!(info.params.y_0, Some(-100_000.0));
        assert_eq!(info.spheroid().name.as_deref(), Some("airy"));
        assert_eq!(
            info.datum().method,
            DatumMethod::Param7([446.448, -125.157, 542.06, 0.15, 0.247, 0.842, -20.489])
        );
    }

    #[test]
    fn test_parse_without_plus_signs() {
        let info = parse("proj=longlat ellps=WGS84 datum=WGS84 no_defs").unwrap();
        assert!(info.is_geographic());
        assert_eq!(info.datum().method, DatumMethod::Wgs84);
        assert_eq!(info.datum().name, "WGS84");
    }

    #[test]
    fn test_round_trip() {
        for definition in [
            "+proj=longlat +datum=WGS84 +no_defs",
            "+proj=utm +zone=33 +south +ellps=GRS80 +towgs84=0,0,0 +units=m",
            "+proj=merc +a=6378137 +b=6378137 +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1 +units=m +nadgrids=@null +no_defs",
            "+proj=lcc +lat_1=33 +lat_2=45 +lat_0=39 +lon_0=-96 +x_0=0 +y_0=0 +datum=NAD27 +units=us-ft",
            "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000 +a=6378000 +rf=298.3 +to_meter=0.5",
            "+proj=longlat +ellps=bessel +pm=paris +towgs84=1,2,3 +over",
            "+proj=stere +lat_0=90 +lat_ts=70 +lon_0=-45 +datum=WGS84",
        ] {
            let info = parse(definition).unwrap();
            let written = format(&info);
            let again = parse(&written).unwrap();
            assert_eq!(info, again, "{definition} -> {written}");
        }
    }

    #[test]
    fn test_sphere_from_axes() {
        let info = parse("+proj=merc +a=6378137 +b=6378137 +nadgrids=@null").unwrap();
        assert!(info.spheroid().is_sphere());
        assert_eq!(info.datum().method, DatumMethod::GridShift(vec!["@null".to_string()]));
    }

    #[test]
    fn test_dms_angles() {
        assert_relative_eq!(parse_angle("15d48'29.8\"E").unwrap(), 15.0 + 48.0 / 60.0 + 29.8 / 3600.0);
        assert_relative_eq!(parse_angle("2d30W").unwrap(), -2.5);
        assert_relative_eq!(parse_angle("-49.5").unwrap(), -49.5);
        assert_relative_eq!(parse_angle("49dN").unwrap(), 49.0);
        assert!(parse_angle("north").is_none());
    }

    #[test]
    fn test_init_expansion() {
        let info = parse("+init=epsg:27700 +over").unwrap();
        assert!(info.over);
        assert_eq!(info.params.x_0, Some(400_000.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(""), Err(ProjError::Parse { .. })));
        assert!(matches!(parse("+ellps=WGS84"), Err(ProjError::Parse { .. })));
        assert!(matches!(parse("+proj=tmerc +lat_0=abc"), Err(ProjError::Parse { .. })));
        assert!(matches!(parse("+proj=tmerc +ellps=potato"), Err(ProjError::Parse { .. })));
        assert!(matches!(parse("+proj=utm +zone=61"), Err(ProjError::Parse { .. })));
        assert!(matches!(parse("+proj=longlat +towgs84=1,2"), Err(ProjError::Parse { .. })));
        assert!(matches!(parse("+proj=longlat +datum=mars"), Err(ProjError::Parse { .. })));
        assert!(matches!(parse("+proj=foo"), Err(ProjError::UnsupportedProjection(_))));
        assert!(matches!(parse("+=3"), Err(ProjError::Parse { .. })));
    }

    #[test]
    fn test_non_finite_numbers_rejected() {
        for definition in [
            "+proj=laea +lat_0=1e400 +ellps=WGS84",
            "+proj=tmerc +x_0=1e400 +ellps=WGS84",
            "+proj=tmerc +k=inf +ellps=WGS84",
            "+proj=tmerc +lon_0=NaN +ellps=WGS84",
            "+proj=longlat +ellps=WGS84 +towgs84=1,2,inf",
            "+proj=tmerc +ellps=WGS84 +to_meter=1/0",
        ] {
            assert!(matches!(parse(definition), Err(ProjError::Parse { .. })), "{definition}");
        }
    }

    #[test]
    fn test_unit_conversion_factor() {
        let info = parse("+proj=tmerc +to_meter=1/3.28 +ellps=GRS80").unwrap();
        assert_relative_eq!(info.unit.meters, 1.0 / 3.28);
        let info = parse("+proj=tmerc +units=us-ft +ellps=GRS80").unwrap();
        assert_eq!(info.unit.name, "us-ft");
    }
}
