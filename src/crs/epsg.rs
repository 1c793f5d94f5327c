//! Authority code registry (EPSG and ESRI).
//!
//! Definitions are stored as PROJ.4 strings. Families of zoned systems (UTM,
//! Japanese plane rectangular zones) are generated from their zone number.

/// A registered coordinate system.
#[derive(Clone, Debug, PartialEq)]
pub struct CrsDefinition {
    pub name: String,
    pub proj4: String,
}

const WGS84: &str = "+datum=WGS84";
const GRS80_ZERO: &str = "+ellps=GRS80 +towgs84=0,0,0,0,0,0,0";
const OSGB36: &str = "+ellps=airy +towgs84=446.448,-125.157,542.06,0.15,0.247,0.842,-20.489";
const ED50: &str = "+ellps=intl +towgs84=-87,-98,-121,0,0,0,0";
const RT90: &str = "+ellps=bessel +towgs84=414.1,41.3,603.1,-0.855,2.141,-7.023,0";
const AMERSFOORT: &str =
    "+ellps=bessel +towgs84=565.417,50.3319,465.552,-0.398957,0.343988,-1.8774,4.0725";

/// Geographic systems: (code, name, datum parameters).
const GEOGRAPHIC: &[(u32, &str, &str)] = &[
    (4326, "WGS 84", WGS84),
    (4258, "ETRS89", GRS80_ZERO),
    (4269, "NAD83", "+datum=NAD83"),
    (4267, "NAD27", "+datum=NAD27"),
    (4277, "OSGB 1936", OSGB36),
    (4230, "ED50", ED50),
    (4124, "RT90", RT90),
    (4619, "SWEREF99", GRS80_ZERO),
    (4612, "JGD2000", GRS80_ZERO),
    (6668, "JGD2011", GRS80_ZERO),
    (4301, "Tokyo", "+ellps=bessel +towgs84=-146.414,507.337,680.507,0,0,0,0"),
    (4289, "Amersfoort", AMERSFOORT),
    (4171, "RGF93", GRS80_ZERO),
];

/// Projected systems: (code, name, projection parameters, datum parameters).
const PROJECTED: &[(u32, &str, &str, &str)] = &[
    (
        3857,
        "WGS 84 / Pseudo-Mercator",
        "+proj=merc +lat_ts=0 +lon_0=0 +x_0=0 +y_0=0 +k=1",
        "+a=6378137 +b=6378137 +nadgrids=@null +wktext",
    ),
    (3395, "WGS 84 / World Mercator", "+proj=merc +lon_0=0 +k=1 +x_0=0 +y_0=0", WGS84),
    (
        4087,
        "WGS 84 / World Equidistant Cylindrical",
        "+proj=eqc +lat_ts=0 +lat_0=0 +lon_0=0 +x_0=0 +y_0=0",
        WGS84,
    ),
    (
        27700,
        "OSGB 1936 / British National Grid",
        "+proj=tmerc +lat_0=49 +lon_0=-2 +k=0.9996012717 +x_0=400000 +y_0=-100000",
        OSGB36,
    ),
    (3006, "SWEREF99 TM", "+proj=utm +zone=33", GRS80_ZERO),
    (
        3035,
        "ETRS89 / LAEA Europe",
        "+proj=laea +lat_0=52 +lon_0=10 +x_0=4321000 +y_0=3210000",
        GRS80_ZERO,
    ),
    (
        3034,
        "ETRS89 / LCC Europe",
        "+proj=lcc +lat_1=35 +lat_2=65 +lat_0=52 +lon_0=10 +x_0=4000000 +y_0=2800000",
        GRS80_ZERO,
    ),
    (
        2154,
        "RGF93 / Lambert-93",
        "+proj=lcc +lat_1=49 +lat_2=44 +lat_0=46.5 +lon_0=3 +x_0=700000 +y_0=6600000",
        GRS80_ZERO,
    ),
    (
        5070,
        "NAD83 / Conus Albers",
        "+proj=aea +lat_1=29.5 +lat_2=45.5 +lat_0=23 +lon_0=-96 +x_0=0 +y_0=0",
        "+datum=NAD83",
    ),
    (
        28992,
        "Amersfoort / RD New",
        "+proj=sterea +lat_0=52.15616055555555 +lon_0=5.38763888888889 +k=0.9999079 +x_0=155000 +y_0=463000",
        AMERSFOORT,
    ),
    (
        3031,
        "WGS 84 / Antarctic Polar Stereographic",
        "+proj=stere +lat_0=-90 +lat_ts=-71 +lon_0=0 +k=1 +x_0=0 +y_0=0",
        WGS84,
    ),
    (
        3413,
        "WGS 84 / NSIDC Sea Ice Polar Stereographic North",
        "+proj=stere +lat_0=90 +lat_ts=70 +lon_0=-45 +k=1 +x_0=0 +y_0=0",
        WGS84,
    ),
    (
        3995,
        "WGS 84 / Arctic Polar Stereographic",
        "+proj=stere +lat_0=90 +lat_ts=71 +lon_0=0 +k=1 +x_0=0 +y_0=0",
        WGS84,
    ),
    (32661, "WGS 84 / UPS North (N,E)", "+proj=ups", WGS84),
    (32761, "WGS 84 / UPS South (N,E)", "+proj=ups +south", WGS84),
];

/// ESRI-only codes: (code, name, projection parameters).
const ESRI: &[(u32, &str, &str)] = &[
    (54002, "World_Equidistant_Cylindrical", "+proj=eqc +lat_ts=0 +lat_0=0 +lon_0=0 +x_0=0 +y_0=0"),
    (54004, "World_Mercator", "+proj=merc +lat_ts=0 +lon_0=0 +k=1 +x_0=0 +y_0=0"),
    (54008, "World_Sinusoidal", "+proj=sinu +lon_0=0 +x_0=0 +y_0=0"),
    (102017, "North_Pole_Lambert_Azimuthal_Equal_Area", "+proj=laea +lat_0=90 +lon_0=0 +x_0=0 +y_0=0"),
    (102018, "North_Pole_Stereographic", "+proj=stere +lat_0=90 +lon_0=0 +k=1 +x_0=0 +y_0=0"),
    (102020, "South_Pole_Lambert_Azimuthal_Equal_Area", "+proj=laea +lat_0=-90 +lon_0=0 +x_0=0 +y_0=0"),
    (102021, "South_Pole_Stereographic", "+proj=stere +lat_0=-90 +lon_0=0 +k=1 +x_0=0 +y_0=0"),
];

/// SWEREF99 local projection zones 3007..=3018: (name suffix, central meridian).
const SWEREF99_ZONES: &[(&str, &str)] = &[
    ("12 00", "12"),
    ("13 30", "13.5"),
    ("15 00", "15"),
    ("16 30", "16.5"),
    ("18 00", "18"),
    ("14 15", "14.25"),
    ("15 45", "15.75"),
    ("17 15", "17.25"),
    ("18 45", "18.75"),
    ("20 15", "20.25"),
    ("21 45", "21.75"),
    ("23 15", "23.25"),
];

/// RT90 zones 3019..=3024: (name suffix, central meridian).
const RT90_ZONES: &[(&str, &str)] = &[
    ("7.5 gon V", "11.30827777777778"),
    ("5 gon V", "13.55827777777778"),
    ("2.5 gon V", "15.80827777777778"),
    ("0 gon", "18.05827777777778"),
    ("2.5 gon O", "20.30827777777778"),
    ("5 gon O", "22.55827777777778"),
];

/// Japan plane rectangular zones I..XIX: (latitude of origin, central meridian).
const JAPAN_ZONES: &[(&str, &str)] = &[
    ("33", "129.5"),
    ("33", "131"),
    ("36", "132.1666666666667"),
    ("33", "133.5"),
    ("36", "134.3333333333333"),
    ("36", "136"),
    ("36", "137.1666666666667"),
    ("36", "138.5"),
    ("36", "139.8333333333333"),
    ("40", "140.8333333333333"),
    ("44", "140.25"),
    ("44", "142.25"),
    ("44", "144.25"),
    ("26", "142"),
    ("26", "127.5"),
    ("26", "124"),
    ("26", "131"),
    ("20", "136"),
    ("26", "154"),
];

pub(crate) const ROMAN: [&str; 19] = [
    "I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X", "XI", "XII", "XIII", "XIV", "XV",
    "XVI", "XVII", "XVIII", "XIX",
];

fn definition(name: String, proj4: String) -> Option<CrsDefinition> {
    Some(CrsDefinition { name, proj4 })
}

fn utm(datum_name: &str, zone: u32, south: bool, datum: &str) -> Option<CrsDefinition> {
    let hemisphere = if south { "S" } else { "N" };
    let south = if south { " +south" } else { "" };
    definition(
        format!("{datum_name} / UTM zone {zone}{hemisphere}"),
        format!("+proj=utm +zone={zone}{south} {datum} +units=m +no_defs"),
    )
}

fn japan_zone(datum_name: &str, index: usize) -> Option<CrsDefinition> {
    let (lat_0, lon_0) = JAPAN_ZONES.get(index)?;
    definition(
        format!("{datum_name} / Japan Plane Rectangular CS {}", ROMAN[index]),
        format!("+proj=tmerc +lat_0={lat_0} +lon_0={lon_0} +k=0.9999 +x_0=0 +y_0=0 {GRS80_ZERO} +units=m +no_defs"),
    )
}

fn epsg(code: u32) -> Option<CrsDefinition> {
    if let Some((_, name, datum)) = GEOGRAPHIC.iter().find(|(c, _, _)| *c == code) {
        return definition(name.to_string(), format!("+proj=longlat {datum} +no_defs"));
    }
    if let Some((_, name, projection, datum)) = PROJECTED.iter().find(|(c, _, _, _)| *c == code) {
        return definition(name.to_string(), format!("{projection} {datum} +units=m +no_defs"));
    }

    match code {
        32601..=32660 => utm("WGS 84", code - 32600, false, WGS84),
        32701..=32760 => utm("WGS 84", code - 32700, true, WGS84),
        25828..=25838 => utm("ETRS89", code - 25800, false, GRS80_ZERO),
        23028..=23038 => utm("ED50", code - 23000, false, ED50),
        26901..=26923 => utm("NAD83", code - 26900, false, "+datum=NAD83"),
        26701..=26722 => utm("NAD27", code - 26700, false, "+datum=NAD27"),
        3007..=3018 => {
            let (suffix, lon_0) = SWEREF99_ZONES[(code - 3007) as usize];
            definition(
                format!("SWEREF99 {suffix}"),
                format!("+proj=tmerc +lat_0=0 +lon_0={lon_0} +k=1 +x_0=150000 +y_0=0 {GRS80_ZERO} +units=m +no_defs"),
            )
        }
        3019..=3024 => {
            let (suffix, lon_0) = RT90_ZONES[(code - 3019) as usize];
            definition(
                format!("RT90 {suffix}"),
                format!("+proj=tmerc +lat_0=0 +lon_0={lon_0} +k=1 +x_0=1500000 +y_0=0 {RT90} +units=m +no_defs"),
            )
        }
        2443..=2461 => japan_zone("JGD2000", (code - 2443) as usize),
        6669..=6687 => japan_zone("JGD2011", (code - 6669) as usize),
        _ => None,
    }
}

/// Look up `authority:code`. ESRI lookups fall back to EPSG codes, which
/// ESRI shares.
pub fn lookup(authority: &str, code: u32) -> Option<CrsDefinition> {
    if authority.eq_ignore_ascii_case("EPSG") {
        epsg(code)
    } else if authority.eq_ignore_ascii_case("ESRI") {
        ESRI.iter()
            .find(|(c, _, _)| *c == code)
            .and_then(|(_, name, projection)| {
                definition(name.to_string(), format!("{projection} {WGS84} +units=m +no_defs"))
            })
            .or_else(|| match code {
                102100 => epsg(3857).map(|d| CrsDefinition {
                    name: "WGS_1984_Web_Mercator_Auxiliary_Sphere".to_string(),
                    ..d
                }),
                _ => epsg(code),
            })
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_families() {
        let utm = lookup("EPSG", 32633).unwrap();
        assert_eq!(utm.name, "WGS 84 / UTM zone 33N");
        assert_eq!(utm.proj4, "+proj=utm +zone=33 +datum=WGS84 +units=m +no_defs");

        let south = lookup("epsg", 32756).unwrap();
        assert!(south.proj4.contains("+south"));

        let rt90 = lookup("EPSG", 3021).unwrap();
        assert_eq!(rt90.name, "RT90 2.5 gon V");
        assert!(rt90.proj4.contains("+lon_0=15.80827777777778"));

        let japan = lookup("EPSG", 6687).unwrap();
        assert_eq!(japan.name, "JGD2011 / Japan Plane Rectangular CS XIX");
        assert!(japan.proj4.contains("+lat_0=26 +lon_0=154"));
    }

    #[test]
    fn test_every_entry_parses() {
        let codes = [4326, 4258, 4269, 4267, 4277, 4230, 4124, 4619, 4612, 6668, 4301, 4289, 4171]
            .into_iter()
            .chain(PROJECTED.iter().map(|(c, _, _, _)| *c))
            .chain(3007..=3024)
            .chain(2443..=2461)
            .chain(6669..=6687)
            .chain([32601, 32760, 25832, 23030, 26910, 26715]);
        for code in codes {
            let info = crate::crs::ProjectionInfo::from_epsg_code(code);
            assert!(info.is_ok(), "EPSG:{code}: {info:?}");
        }
        for (code, _, _) in ESRI {
            assert!(crate::crs::ProjectionInfo::from_authority_code("ESRI", *code).is_ok());
        }
    }

    #[test]
    fn test_unknown_codes() {
        assert!(lookup("EPSG", 1).is_none());
        assert!(lookup("EPSG", 32800).is_none());
        assert!(lookup("IGNF", 4326).is_none());
        assert_eq!(lookup("ESRI", 4326), lookup("EPSG", 4326));
    }
}
