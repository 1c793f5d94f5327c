//! OGC / ESRI WKT1 reader and writer.
//!
//! Reads `PROJCS`, `GEOGCS` and the horizontal part of `COMPD_CS`. A GDAL style
//! `EXTENSION["PROJ4", "..."]` node takes precedence over the structured
//! definition; the writer emits one whenever the structured form would lose
//! information (grid shift datums, the `over` flag).

use crate::crs::datum::{Datum, DatumMethod};
use crate::crs::proj_string;
use crate::crs::spheroid::Spheroid;
use crate::crs::units::{AngularUnit, LinearUnit, PrimeMeridian};
use crate::crs::{Authority, GeographicInfo, ProjectionInfo, ProjectionParams};
use crate::error::{ProjError, Result};
use crate::proj::registry::ProjectionMethod;

#[derive(Clone, Debug, PartialEq)]
enum Token {
    Open,
    Close,
    Comma,
    Str(String),
    Word(String),
}

#[derive(Clone, Debug, PartialEq)]
enum Value {
    Str(String),
    Num(f64),
    Word(String),
    Node(Node),
}

#[derive(Clone, Debug, PartialEq)]
struct Node {
    keyword: String,
    args: Vec<Value>,
}

impl Node {
    fn child<'a>(&'a self, keyword: &'a str) -> Option<&'a Node> {
        self.children(keyword).next()
    }

    fn children<'a>(&'a self, keyword: &'a str) -> impl Iterator<Item = &'a Node> + 'a {
        self.args.iter().filter_map(move |arg| match arg {
            Value::Node(node) if node.keyword.eq_ignore_ascii_case(keyword) => Some(node),
            _ => None,
        })
    }

    fn text(&self, index: usize) -> Option<&str> {
        match self.args.get(index)? {
            Value::Str(s) | Value::Word(s) => Some(s),
            _ => None,
        }
    }

    fn number(&self, index: usize) -> Option<f64> {
        match self.args.get(index)? {
            Value::Num(n) => Some(*n),
            Value::Str(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    fn numbers(&self) -> Vec<f64> {
        self.args
            .iter()
            .filter_map(|arg| match arg {
                Value::Num(n) => Some(*n),
                _ => None,
            })
            .collect()
    }
}

fn tokenize(input: &str) -> Result<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut chars = input.chars().peekable();
    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '[' | '(' => {
                chars.next();
                tokens.push(Token::Open);
            }
            ']' | ')' => {
                chars.next();
                tokens.push(Token::Close);
            }
            ',' => {
                chars.next();
                tokens.push(Token::Comma);
            }
            '"' => {
                chars.next();
                let mut text = String::new();
                loop {
                    match chars.next() {
                        Some('"') if chars.peek() == Some(&'"') => {
                            chars.next();
                            text.push('"');
                        }
                        Some('"') => break,
                        Some(c) => text.push(c),
                        None => return Err(ProjError::parse(input, "unterminated string")),
                    }
                }
                tokens.push(Token::Str(text));
            }
            _ => {
                let mut word = String::new();
                while let Some(&c) = chars.peek() {
                    if c.is_whitespace() || matches!(c, '[' | ']' | '(' | ')' | ',' | '"') {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                tokens.push(Token::Word(word));
            }
        }
    }
    Ok(tokens)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn error(&self, reason: impl Into<String>) -> ProjError {
        ProjError::parse(self.input, reason)
    }

    fn node(&mut self, keyword: String) -> Result<Node> {
        if self.next() != Some(Token::Open) {
            return Err(self.error(format!("expected '[' after {keyword}")));
        }
        let mut args = Vec::new();
        if self.peek() == Some(&Token::Close) {
            self.pos += 1;
            return Ok(Node { keyword, args });
        }
        loop {
            args.push(self.value()?);
            match self.next() {
                Some(Token::Comma) => continue,
                Some(Token::Close) => break,
                _ => return Err(self.error(format!("expected ',' or ']' in {keyword}"))),
            }
        }
        Ok(Node { keyword, args })
    }

    fn value(&mut self) -> Result<Value> {
        match self.next() {
            Some(Token::Str(s)) => Ok(Value::Str(s)),
            Some(Token::Word(word)) => {
                if self.peek() == Some(&Token::Open) {
                    return self.node(word).map(Value::Node);
                }
                match word.parse::<f64>() {
                    Ok(n) if n.is_finite() => Ok(Value::Num(n)),
                    Ok(_) => Err(self.error("non-finite number")),
                    Err(_) => Ok(Value::Word(word)),
                }
            }
            _ => Err(self.error("unexpected token")),
        }
    }

    fn root(mut self) -> Result<Node> {
        let keyword = match self.next() {
            Some(Token::Word(word)) => word,
            _ => return Err(self.error("expected a WKT keyword")),
        };
        let node = self.node(keyword)?;
        if self.pos < self.tokens.len() {
            return Err(self.error("trailing content after WKT"));
        }
        Ok(node)
    }
}

/// Cheap check used to route definitions to this parser.
pub(crate) fn looks_like_wkt(definition: &str) -> bool {
    let upper = definition.trim_start().to_ascii_uppercase();
    ["PROJCS", "GEOGCS", "COMPD_CS"].iter().any(|keyword| {
        upper
            .strip_prefix(*keyword)
            .is_some_and(|rest| rest.trim_start().starts_with(['[', '(']))
    })
}

pub(crate) fn parse(wkt: &str) -> Result<ProjectionInfo> {
    let tokens = tokenize(wkt)?;
    let root = Parser {
        input: wkt,
        tokens,
        pos: 0,
    }
    .root()?;

    let horizontal = if root.keyword.eq_ignore_ascii_case("COMPD_CS") {
        root.child("PROJCS")
            .or_else(|| root.child("GEOGCS"))
            .ok_or_else(|| ProjError::parse(wkt, "COMPD_CS without a horizontal CRS"))?
    } else {
        &root
    };

    let mut info = match horizontal.keyword.to_ascii_uppercase().as_str() {
        "PROJCS" => parse_projcs(wkt, horizontal)?,
        "GEOGCS" => ProjectionInfo {
            geographic: parse_geogcs(wkt, horizontal)?,
            ..ProjectionInfo::wgs84()
        },
        other => return Err(ProjError::parse(wkt, format!("unsupported WKT root {other}"))),
    };

    if let Some(extension) = horizontal
        .children("EXTENSION")
        .find(|node| node.text(0).is_some_and(|kind| kind.eq_ignore_ascii_case("PROJ4")))
    {
        let definition = extension
            .text(1)
            .ok_or_else(|| ProjError::parse(wkt, "empty PROJ4 extension"))?;
        log::debug!("Using PROJ4 extension of WKT definition");
        info = proj_string::parse(definition)?;
    }

    info.name = horizontal.text(0).map(str::to_string);
    info.authority = parse_authority(horizontal);
    Ok(info)
}

fn parse_authority(node: &Node) -> Option<Authority> {
    let authority = node.child("AUTHORITY")?;
    Some(Authority {
        name: authority.text(0)?.to_uppercase(),
        code: authority.number(1)? as u32,
    })
}

fn parse_geogcs(wkt: &str, node: &Node) -> Result<GeographicInfo> {
    let unit = match node.child("UNIT") {
        Some(unit) => {
            let radians = unit
                .number(1)
                .ok_or_else(|| ProjError::parse(wkt, "UNIT without a conversion factor"))?;
            AngularUnit::from_radians(unit.text(0).unwrap_or("Unknown"), radians)
        }
        None => AngularUnit::degree(),
    };

    let prime_meridian = match node.child("PRIMEM") {
        Some(primem) => {
            let longitude = primem.number(1).unwrap_or(0.0) * unit.radians.to_degrees();
            primem
                .text(0)
                .and_then(PrimeMeridian::named)
                .filter(|pm| (pm.longitude - longitude).abs() < 1e-9)
                .unwrap_or_else(|| PrimeMeridian::from_longitude(longitude))
        }
        None => PrimeMeridian::greenwich(),
    };

    let datum_node = node
        .child("DATUM")
        .ok_or_else(|| ProjError::parse(wkt, "GEOGCS without DATUM"))?;
    let datum = parse_datum(wkt, datum_node)?;

    Ok(GeographicInfo {
        name: node.text(0).unwrap_or(&datum.name).to_string(),
        datum,
        prime_meridian,
        unit,
    })
}

fn parse_datum(wkt: &str, node: &Node) -> Result<Datum> {
    let wkt_name = node.text(0).unwrap_or("unknown");
    let named = Datum::named(wkt_name);

    let spheroid = match node.child("SPHEROID").or_else(|| node.child("ELLIPSOID")) {
        Some(sph) => {
            let (a, rf) = match (sph.number(1), sph.number(2)) {
                (Some(a), Some(rf)) if a > 0.0 && rf >= 0.0 => (a, rf),
                _ => return Err(ProjError::parse(wkt, "invalid SPHEROID parameters")),
            };
            sph.text(0)
                .and_then(Spheroid::named)
                .filter(|known| *known == Spheroid::from_inverse_flattening(a, rf))
                .or_else(|| Spheroid::identify(a, rf))
                .unwrap_or_else(|| Spheroid::from_inverse_flattening(a, rf))
        }
        None => named
            .as_ref()
            .map(|datum| datum.spheroid.clone())
            .ok_or_else(|| ProjError::parse(wkt, "DATUM without SPHEROID"))?,
    };

    let method = match node.child("TOWGS84") {
        Some(towgs84) => DatumMethod::from_towgs84(&towgs84.numbers())?,
        None => match &named {
            Some(datum) => datum.method.clone(),
            None if spheroid == Spheroid::wgs84() => DatumMethod::Wgs84,
            None => {
                log::debug!("Datum {wkt_name} has no known relation to WGS84");
                DatumMethod::Unknown
            }
        },
    };

    let name = match &named {
        Some(datum) => datum.name.clone(),
        None => wkt_name.strip_prefix("D_").unwrap_or(wkt_name).to_string(),
    };
    Ok(Datum::new(&name, spheroid, method))
}

/// How a WKT projection name maps onto a projection method.
enum WktProjection {
    Method(ProjectionMethod),
    /// OGC polar stereographic: `latitude_of_origin` is the true-scale latitude.
    PolarStereographic,
    /// ESRI polar stereographic: `standard_parallel_1` is the true-scale latitude.
    PolarStereographicEsri { south: bool },
    /// Web Mercator: spherical Mercator on the semi-major axis.
    AuxiliarySphere,
}

fn projection_from_wkt(wkt: &str, name: &str) -> Result<WktProjection> {
    let key = name.to_ascii_lowercase().replace(' ', "_");
    let projection = match key.as_str() {
        "transverse_mercator" | "gauss_kruger" => WktProjection::Method(ProjectionMethod::TransverseMercator),
        "mercator" | "mercator_1sp" | "mercator_2sp" => WktProjection::Method(ProjectionMethod::Mercator),
        "mercator_auxiliary_sphere" | "popular_visualisation_pseudo_mercator" => WktProjection::AuxiliarySphere,
        "lambert_azimuthal_equal_area" => WktProjection::Method(ProjectionMethod::LambertAzimuthalEqualArea),
        "polar_stereographic" => WktProjection::PolarStereographic,
        "stereographic_north_pole" => WktProjection::PolarStereographicEsri { south: false },
        "stereographic_south_pole" => WktProjection::PolarStereographicEsri { south: true },
        "stereographic" => WktProjection::Method(ProjectionMethod::Stereographic),
        "oblique_stereographic" | "double_stereographic" => {
            WktProjection::Method(ProjectionMethod::ObliqueStereographic)
        }
        "lambert_conformal_conic"
        | "lambert_conformal_conic_1sp"
        | "lambert_conformal_conic_2sp"
        | "lambert_conformal_conic_2sp_belgium" => WktProjection::Method(ProjectionMethod::LambertConformalConic),
        "albers_conic_equal_area" | "albers" => WktProjection::Method(ProjectionMethod::AlbersEqualArea),
        "equirectangular" | "equidistant_cylindrical" | "plate_carree" => {
            WktProjection::Method(ProjectionMethod::Equirectangular)
        }
        "sinusoidal" => WktProjection::Method(ProjectionMethod::Sinusoidal),
        _ => {
            return Err(ProjError::UnsupportedProjection(format!(
                "WKT projection '{name}' in {wkt}"
            )))
        }
    };
    Ok(projection)
}

fn parse_projcs(wkt: &str, node: &Node) -> Result<ProjectionInfo> {
    let geogcs = node
        .child("GEOGCS")
        .ok_or_else(|| ProjError::parse(wkt, "PROJCS without GEOGCS"))?;
    let mut geographic = parse_geogcs(wkt, geogcs)?;

    let unit = match node.child("UNIT") {
        Some(unit) => {
            let meters = unit
                .number(1)
                .ok_or_else(|| ProjError::parse(wkt, "UNIT without a conversion factor"))?;
            unit.text(0)
                .and_then(LinearUnit::named)
                .filter(|known| (known.meters - meters).abs() < 1e-12 * meters.max(1.0))
                .unwrap_or_else(|| LinearUnit::from_meters(meters))
        }
        None => LinearUnit::meter(),
    };

    // The EXTENSION node, when present, supersedes whatever is below.
    let has_extension = node.child("EXTENSION").is_some();
    let projection_name = node
        .child("PROJECTION")
        .and_then(|projection| projection.text(0))
        .ok_or_else(|| ProjError::parse(wkt, "PROJCS without PROJECTION"))?;
    let projection = match projection_from_wkt(wkt, projection_name) {
        Ok(projection) => projection,
        Err(_) if has_extension => WktProjection::Method(ProjectionMethod::Mercator),
        Err(err) => return Err(err),
    };

    let mut params = ProjectionParams::default();
    for parameter in node.children("PARAMETER") {
        let (Some(name), Some(value)) = (parameter.text(0), parameter.number(1)) else {
            return Err(ProjError::parse(wkt, "malformed PARAMETER"));
        };
        match name.to_ascii_lowercase().replace(' ', "_").as_str() {
            "false_easting" => params.x_0 = Some(value * unit.meters),
            "false_northing" => params.y_0 = Some(value * unit.meters),
            "central_meridian" | "longitude_of_center" | "longitude_of_origin" | "longitude_of_natural_origin" => {
                params.lon_0 = Some(value)
            }
            "latitude_of_origin" | "latitude_of_center" | "latitude_of_natural_origin" => params.lat_0 = Some(value),
            "standard_parallel_1" => params.lat_1 = Some(value),
            "standard_parallel_2" => params.lat_2 = Some(value),
            "scale_factor" | "scale_factor_at_natural_origin" => params.k_0 = Some(value),
            "auxiliary_sphere_type" => {}
            other => log::debug!("Ignoring unsupported WKT parameter {other}"),
        }
    }

    let method = match projection {
        WktProjection::Method(method) => {
            match method {
                ProjectionMethod::Mercator | ProjectionMethod::Equirectangular => {
                    params.lat_ts = params.lat_1.take();
                }
                ProjectionMethod::LambertConformalConic if params.lat_1.is_none() => {
                    params.lat_1 = params.lat_0;
                }
                _ => {}
            }
            method
        }
        WktProjection::PolarStereographic => {
            let origin = params.lat_0.unwrap_or(90.0);
            params.lat_ts = Some(origin);
            params.lat_0 = Some(if origin < 0.0 { -90.0 } else { 90.0 });
            ProjectionMethod::Stereographic
        }
        WktProjection::PolarStereographicEsri { south } => {
            params.lat_ts = params.lat_1.take();
            params.lat_0 = Some(if south { -90.0 } else { 90.0 });
            ProjectionMethod::Stereographic
        }
        WktProjection::AuxiliarySphere => {
            let radius = geographic.datum.spheroid.a;
            geographic.datum = Datum::new(
                &geographic.datum.name,
                Spheroid::sphere(radius),
                DatumMethod::GridShift(vec!["@null".to_string()]),
            );
            params.lat_ts = params.lat_1.take();
            ProjectionMethod::Mercator
        }
    };

    Ok(ProjectionInfo {
        name: None,
        authority: None,
        geographic,
        method,
        params,
        unit,
        over: false,
    })
}

fn quote(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

fn format_geogcs(geographic: &GeographicInfo, authority: Option<&Authority>) -> String {
    let datum = &geographic.datum;
    let spheroid = &datum.spheroid;
    let mut datum_wkt = format!(
        "DATUM[{},SPHEROID[{},{},{}]",
        quote(&datum.wkt_name()),
        quote(&spheroid.description()),
        spheroid.a,
        spheroid.inverse_flattening()
    );
    if let Some(mut towgs84) = datum.method.towgs84() {
        towgs84.resize(7, 0.0);
        let values: Vec<String> = towgs84.iter().map(f64::to_string).collect();
        datum_wkt.push_str(&format!(",TOWGS84[{}]", values.join(",")));
    }
    datum_wkt.push(']');

    let unit = &geographic.unit;
    let mut out = format!(
        "GEOGCS[{},{},PRIMEM[{},{}],UNIT[{},{}]",
        quote(&geographic.name),
        datum_wkt,
        quote(&geographic.prime_meridian.name),
        geographic.prime_meridian.longitude.to_radians() / unit.radians,
        quote(&unit.name),
        unit.radians
    );
    if let Some(authority) = authority {
        out.push_str(&format!(",AUTHORITY[{},{}]", quote(&authority.name), quote(&authority.code.to_string())));
    }
    out.push(']');
    out
}

/// WKT projection name and parameters for a projected CRS.
fn projection_parameters(info: &ProjectionInfo) -> (&'static str, Vec<(&'static str, f64)>) {
    let (method, p) = info.resolved();
    let to_unit = |meters: f64| meters / info.unit.meters;
    let false_origin = [("false_easting", to_unit(p.x_0)), ("false_northing", to_unit(p.y_0))];
    let (name, mut parameters): (&'static str, Vec<(&'static str, f64)>) = match method {
        ProjectionMethod::Mercator if p.lat_ts != 0.0 => (
            "Mercator_2SP",
            vec![("standard_parallel_1", p.lat_ts), ("central_meridian", p.lon_0)],
        ),
        ProjectionMethod::Mercator => (
            "Mercator_1SP",
            vec![("central_meridian", p.lon_0), ("scale_factor", p.k_0)],
        ),
        ProjectionMethod::LambertAzimuthalEqualArea => (
            "Lambert_Azimuthal_Equal_Area",
            vec![("latitude_of_center", p.lat_0), ("longitude_of_center", p.lon_0)],
        ),
        ProjectionMethod::Stereographic if (p.lat_0.abs() - 90.0).abs() < 1e-10 => {
            let origin = if (p.lat_ts - p.lat_0).abs() < 1e-10 { p.lat_0 } else { p.lat_ts };
            (
                "Polar_Stereographic",
                vec![
                    ("latitude_of_origin", origin),
                    ("central_meridian", p.lon_0),
                    ("scale_factor", p.k_0),
                ],
            )
        }
        ProjectionMethod::Stereographic | ProjectionMethod::ObliqueStereographic => (
            if method == ProjectionMethod::Stereographic {
                "Stereographic"
            } else {
                "Oblique_Stereographic"
            },
            vec![
                ("latitude_of_origin", p.lat_0),
                ("central_meridian", p.lon_0),
                ("scale_factor", p.k_0),
            ],
        ),
        ProjectionMethod::LambertConformalConic if p.lat_1 == p.lat_2 && p.lat_0 == p.lat_1 => (
            "Lambert_Conformal_Conic_1SP",
            vec![
                ("latitude_of_origin", p.lat_0),
                ("central_meridian", p.lon_0),
                ("scale_factor", p.k_0),
            ],
        ),
        ProjectionMethod::LambertConformalConic => {
            let mut parameters = vec![
                ("standard_parallel_1", p.lat_1),
                ("standard_parallel_2", p.lat_2),
                ("latitude_of_origin", p.lat_0),
                ("central_meridian", p.lon_0),
            ];
            if p.k_0 != 1.0 {
                parameters.push(("scale_factor", p.k_0));
            }
            ("Lambert_Conformal_Conic_2SP", parameters)
        }
        ProjectionMethod::AlbersEqualArea => (
            "Albers_Conic_Equal_Area",
            vec![
                ("standard_parallel_1", p.lat_1),
                ("standard_parallel_2", p.lat_2),
                ("latitude_of_center", p.lat_0),
                ("longitude_of_center", p.lon_0),
            ],
        ),
        ProjectionMethod::Equirectangular => (
            "Equirectangular",
            vec![
                ("standard_parallel_1", p.lat_ts),
                ("central_meridian", p.lon_0),
                ("latitude_of_origin", p.lat_0),
            ],
        ),
        ProjectionMethod::Sinusoidal => ("Sinusoidal", vec![("central_meridian", p.lon_0)]),
        _ => (
            "Transverse_Mercator",
            vec![
                ("latitude_of_origin", p.lat_0),
                ("central_meridian", p.lon_0),
                ("scale_factor", p.k_0),
            ],
        ),
    };
    parameters.extend(false_origin);
    (name, parameters)
}

pub(crate) fn format(info: &ProjectionInfo) -> String {
    let needs_extension = info.over || matches!(info.datum().method, DatumMethod::GridShift(_));

    if info.is_geographic() {
        let mut out = format_geogcs(&info.geographic, info.authority.as_ref());
        if needs_extension {
            out.pop();
            out.push_str(&format!(",EXTENSION[\"PROJ4\",{}]]", quote(&info.to_proj4_string())));
        }
        return out;
    }

    let (projection, parameters) = projection_parameters(info);
    let name = info.name.clone().unwrap_or_else(|| "unnamed".to_string());
    let mut out = format!(
        "PROJCS[{},{},PROJECTION[{}]",
        quote(&name),
        format_geogcs(&info.geographic, None),
        quote(projection)
    );
    for (parameter, value) in parameters {
        out.push_str(&format!(",PARAMETER[{},{}]", quote(parameter), value));
    }
    out.push_str(&format!(",UNIT[{},{}]", quote(info.unit.wkt_name()), info.unit.meters));
    if let Some(authority) = &info.authority {
        out.push_str(&format!(",AUTHORITY[{},{}]", quote(&authority.name), quote(&authority.code.to_string())));
    }
    if needs_extension {
        out.push_str(&format!(",EXTENSION[\"PROJ4\",{}]", quote(&info.to_proj4_string())));
    }
    out.push(']');
    out
}
