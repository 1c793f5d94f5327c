//! Catalog of well-known coordinate systems by name, grouped by category.
//!
//! Lookups ignore case, spaces and punctuation, so `"North Pole Stereographic"`
//! finds `NorthPoleStereographic`. Zoned families are matched by pattern:
//! `WGS1984UTMZone33N`, `ETRS1989UTMZone32N`, `EuropeanDatum1950UTMZone30N`,
//! `NAD1983UTMZone10N`, `NAD1927UTMZone15N`, `JGD2011PlaneRectangularCSIX`.

use crate::crs::epsg::ROMAN;
use crate::crs::{Authority, ProjectionInfo};
use crate::error::{ProjError, Result};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Source {
    Epsg(u32),
    Esri(u32),
}

const CATALOG: &[(&str, &str, Source)] = &[
    ("Geographic.World", "WGS1984", Source::Epsg(4326)),
    ("Geographic.World", "ETRS1989", Source::Epsg(4258)),
    ("Geographic.World", "NAD1983", Source::Epsg(4269)),
    ("Geographic.World", "NAD1927", Source::Epsg(4267)),
    ("Geographic.World", "OSGB1936", Source::Epsg(4277)),
    ("Geographic.World", "EuropeanDatum1950", Source::Epsg(4230)),
    ("Geographic.World", "RT90", Source::Epsg(4124)),
    ("Geographic.World", "SWEREF99", Source::Epsg(4619)),
    ("Geographic.World", "JGD2000", Source::Epsg(4612)),
    ("Geographic.World", "JGD2011", Source::Epsg(6668)),
    ("Geographic.World", "Tokyo", Source::Epsg(4301)),
    ("Projected.World", "WebMercator", Source::Epsg(3857)),
    ("Projected.World", "WebMercatorAuxiliarySphere", Source::Esri(102100)),
    ("Projected.World", "WorldMercator", Source::Epsg(3395)),
    ("Projected.World", "WorldSinusoidal", Source::Esri(54008)),
    ("Projected.World", "WorldEquidistantCylindrical", Source::Epsg(4087)),
    ("Projected.Polar", "NorthPoleStereographic", Source::Esri(102018)),
    ("Projected.Polar", "SouthPoleStereographic", Source::Esri(102021)),
    ("Projected.Polar", "NorthPoleLambertAzimuthalEqualArea", Source::Esri(102017)),
    ("Projected.Polar", "SouthPoleLambertAzimuthalEqualArea", Source::Esri(102020)),
    ("Projected.Polar", "NSIDCSeaIcePolarStereographicNorth", Source::Epsg(3413)),
    ("Projected.Polar", "AntarcticPolarStereographic", Source::Epsg(3031)),
    ("Projected.Polar", "ArcticPolarStereographic", Source::Epsg(3995)),
    ("Projected.Polar", "UPSNorth", Source::Epsg(32661)),
    ("Projected.Polar", "UPSSouth", Source::Epsg(32761)),
    ("Projected.NationalGrids", "BritishNationalGrid", Source::Epsg(27700)),
    ("Projected.NationalGrids", "RDNew", Source::Epsg(28992)),
    ("Projected.NationalGrids", "Lambert93", Source::Epsg(2154)),
    ("Projected.NationalGridsSweden", "RT9075gonV", Source::Epsg(3019)),
    ("Projected.NationalGridsSweden", "RT9050gonV", Source::Epsg(3020)),
    ("Projected.NationalGridsSweden", "RT9025gonV", Source::Epsg(3021)),
    ("Projected.NationalGridsSweden", "RT900gon", Source::Epsg(3022)),
    ("Projected.NationalGridsSweden", "RT9025gonO", Source::Epsg(3023)),
    ("Projected.NationalGridsSweden", "RT9050gonO", Source::Epsg(3024)),
    ("Projected.NationalGridsSweden", "SWEREF99TM", Source::Epsg(3006)),
    ("Projected.NationalGridsSweden", "SWEREF991200", Source::Epsg(3007)),
    ("Projected.NationalGridsSweden", "SWEREF991330", Source::Epsg(3008)),
    ("Projected.NationalGridsSweden", "SWEREF991500", Source::Epsg(3009)),
    ("Projected.NationalGridsSweden", "SWEREF991630", Source::Epsg(3010)),
    ("Projected.NationalGridsSweden", "SWEREF991800", Source::Epsg(3011)),
    ("Projected.NationalGridsSweden", "SWEREF991415", Source::Epsg(3012)),
    ("Projected.NationalGridsSweden", "SWEREF991545", Source::Epsg(3013)),
    ("Projected.NationalGridsSweden", "SWEREF991715", Source::Epsg(3014)),
    ("Projected.NationalGridsSweden", "SWEREF991845", Source::Epsg(3015)),
    ("Projected.NationalGridsSweden", "SWEREF992015", Source::Epsg(3016)),
    ("Projected.NationalGridsSweden", "SWEREF992145", Source::Epsg(3017)),
    ("Projected.NationalGridsSweden", "SWEREF992315", Source::Epsg(3018)),
    ("Projected.Europe", "ETRS1989LAEA", Source::Epsg(3035)),
    ("Projected.Europe", "ETRS1989LCC", Source::Epsg(3034)),
    ("Projected.NorthAmerica", "NAD1983ConusAlbers", Source::Epsg(5070)),
];

/// Zoned UTM families: (name prefix, north base code, south base code).
const UTM_FAMILIES: &[(&str, u32, Option<u32>, u32)] = &[
    ("WGS1984UTMZone", 32600, Some(32700), 60),
    ("ETRS1989UTMZone", 25800, None, 38),
    ("EuropeanDatum1950UTMZone", 23000, None, 38),
    ("NAD1983UTMZone", 26900, None, 23),
    ("NAD1927UTMZone", 26700, None, 22),
];

const JAPAN_FAMILIES: &[(&str, u32)] = &[("JGD2000PlaneRectangularCS", 2443), ("JGD2011PlaneRectangularCS", 6669)];

fn normalize(name: &str) -> String {
    name.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

fn resolve_pattern(key: &str) -> Option<Source> {
    for (prefix, north, south, max_zone) in UTM_FAMILIES {
        if let Some(rest) = key.strip_prefix(&normalize(prefix)) {
            let (zone, hemisphere) = rest.split_at(rest.len().saturating_sub(1));
            let zone = zone.parse::<u32>().ok().filter(|z| (1..=*max_zone).contains(z))?;
            return match (hemisphere, south) {
                ("n", _) => Some(Source::Epsg(north + zone)),
                ("s", Some(south)) => Some(Source::Epsg(south + zone)),
                _ => None,
            };
        }
    }
    for (prefix, base) in JAPAN_FAMILIES {
        if let Some(rest) = key.strip_prefix(&normalize(prefix)) {
            let index = ROMAN.iter().position(|r| r.eq_ignore_ascii_case(rest))?;
            return Some(Source::Epsg(base + index as u32));
        }
    }
    None
}

/// Look up a catalog entry by name.
pub fn by_name(name: &str) -> Result<ProjectionInfo> {
    let key = normalize(name);
    let (catalog_name, source) = CATALOG
        .iter()
        .find(|(_, entry, _)| normalize(entry) == key)
        .map(|(_, entry, source)| (entry.to_string(), *source))
        .or_else(|| resolve_pattern(&key).map(|source| (name.to_string(), source)))
        .ok_or_else(|| ProjError::parse(name, "no well-known coordinate system with this name"))?;

    let (authority, code) = match source {
        Source::Epsg(code) => ("EPSG", code),
        Source::Esri(code) => ("ESRI", code),
    };
    let mut info = ProjectionInfo::from_authority_code(authority, code)?;
    info.name = Some(catalog_name);
    info.authority = Some(Authority {
        name: authority.to_string(),
        code,
    });
    Ok(info)
}

/// Names of the static catalog entries in `category` (e.g. `Projected.Polar`).
pub fn names_in(category: &str) -> Vec<&'static str> {
    CATALOG
        .iter()
        .filter(|(c, _, _)| c.eq_ignore_ascii_case(category))
        .map(|(_, name, _)| *name)
        .collect()
}

pub fn categories() -> Vec<&'static str> {
    let mut categories: Vec<&'static str> = CATALOG.iter().map(|(c, _, _)| *c).collect();
    categories.dedup();
    categories
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_entry_resolves() {
        for (_, name, _) in CATALOG {
            let info = by_name(name);
            assert!(info.is_ok(), "{name}: {info:?}");
        }
    }

    #[test]
    fn test_swedish_entries_carry_codes() {
        let rt90 = by_name("RT9025gonV").unwrap();
        assert_eq!(rt90.authority.as_ref().map(|a| a.code), Some(3021));
        assert_eq!(rt90, ProjectionInfo::from_epsg_code(3021).unwrap());

        let sweref = by_name("SWEREF99 15 45").unwrap();
        assert_eq!(sweref.authority.map(|a| a.code), Some(3013));
    }

    #[test]
    fn test_patterns() {
        let utm = by_name("WGS1984UTMZone33N").unwrap();
        assert_eq!(utm, ProjectionInfo::from_epsg_code(32633).unwrap());
        let south = by_name("WGS 1984 UTM Zone 56S").unwrap();
        assert_eq!(south.authority.map(|a| a.code), Some(32756));
        let ed50 = by_name("EuropeanDatum1950UTMZone30N").unwrap();
        assert_eq!(ed50.authority.map(|a| a.code), Some(23030));
        let japan = by_name("JGD2011PlaneRectangularCSIX").unwrap();
        assert_eq!(japan.authority.map(|a| a.code), Some(6677));

        assert!(by_name("WGS1984UTMZone61N").is_err());
        assert!(by_name("ETRS1989UTMZone32S").is_err());
        assert!(by_name("JGD2011PlaneRectangularCSXX").is_err());
    }

    #[test]
    fn test_categories() {
        assert!(categories().contains(&"Projected.Polar"));
        assert!(names_in("projected.polar").contains(&"NorthPoleStereographic"));
        assert!(by_name("NoSuchSystem").is_err());
    }
}
