use crate::crs::spheroid::Spheroid;
use crate::error::{ProjError, Result};

/// How a datum converts to WGS84.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DatumMethod {
    /// Coincides with WGS84.
    Wgs84,
    /// Geocentric translation (dx, dy, dz) in metres.
    Param3([f64; 3]),
    /// Helmert shift: translations in metres, rotations in arc-seconds
    /// (position vector convention), scale in parts per million.
    Param7([f64; 7]),
    /// Grid shift files, tried in order. A leading `@` marks a grid optional.
    GridShift(Vec<String>),
    /// No relation to WGS84 is known; datum conversion is skipped.
    Unknown,
}

impl DatumMethod {
    /// Build from `towgs84` values. Zero rotations and scale collapse to a
    /// 3-parameter shift.
    pub fn from_towgs84(values: &[f64]) -> Result<Self> {
        match values {
            [dx, dy, dz] => Ok(DatumMethod::Param3([*dx, *dy, *dz])),
            [dx, dy, dz, 0.0, 0.0, 0.0, 0.0] => Ok(DatumMethod::Param3([*dx, *dy, *dz])),
            [dx, dy, dz, rx, ry, rz, s] => Ok(DatumMethod::Param7([*dx, *dy, *dz, *rx, *ry, *rz, *s])),
            _ => Err(ProjError::InvalidParameter(format!(
                "towgs84 expects 3 or 7 values, got {}",
                values.len()
            ))),
        }
    }

    pub fn from_nadgrids(list: &str) -> Self {
        DatumMethod::GridShift(
            list.split(',')
                .map(str::trim)
                .filter(|grid| !grid.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    /// `towgs84` values, when the method is a Helmert family shift.
    pub fn towgs84(&self) -> Option<Vec<f64>> {
        match self {
            DatumMethod::Wgs84 => Some(vec![0.0, 0.0, 0.0]),
            DatumMethod::Param3(p) => Some(p.to_vec()),
            DatumMethod::Param7(p) => Some(p.to_vec()),
            DatumMethod::GridShift(_) | DatumMethod::Unknown => None,
        }
    }
}

/// A geodetic datum: reference ellipsoid plus its relation to WGS84.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Datum {
    pub name: String,
    pub spheroid: Spheroid,
    pub method: DatumMethod,
}

enum Shift {
    Towgs84(&'static [f64]),
    Grids(&'static str),
}

/// Named datums: (PROJ id, WKT name, ellipsoid, shift).
const KNOWN_DATUMS: &[(&str, &str, &str, Shift)] = &[
    ("WGS84", "WGS_1984", "WGS84", Shift::Towgs84(&[0.0, 0.0, 0.0])),
    ("NAD83", "North_American_Datum_1983", "GRS80", Shift::Towgs84(&[0.0, 0.0, 0.0])),
    ("NAD27", "North_American_Datum_1927", "clrk66", Shift::Grids("@conus,@alaska,@ntv2_0.gsb,@ntv1_can.dat")),
    ("GGRS87", "Greek_Geodetic_Reference_System_1987", "GRS80", Shift::Towgs84(&[-199.87, 74.79, 246.62])),
    ("potsdam", "Deutsches_Hauptdreiecksnetz", "bessel", Shift::Towgs84(&[598.1, 73.7, 418.2, 0.202, 0.045, -2.455, 6.7])),
    ("carthage", "Carthage", "clrk80ign", Shift::Towgs84(&[-263.0, 6.0, 431.0])),
    ("hermannskogel", "Militar_Geographische_Institut", "bessel", Shift::Towgs84(&[577.326, 90.129, 463.919, 5.137, 1.474, 5.297, 2.4232])),
    ("ire65", "TM65", "mod_airy", Shift::Towgs84(&[482.530, -130.596, 564.557, -1.042, -0.214, -0.631, 8.15])),
    ("nzgd49", "New_Zealand_Geodetic_Datum_1949", "intl", Shift::Towgs84(&[59.47, -5.04, 187.44, 0.47, -0.1, 1.024, -4.5993])),
    ("OSGB36", "OSGB_1936", "airy", Shift::Towgs84(&[446.448, -125.157, 542.060, 0.1502, 0.2470, 0.8421, -20.4894])),
    ("ETRS89", "European_Terrestrial_Reference_System_1989", "GRS80", Shift::Towgs84(&[0.0, 0.0, 0.0])),
    ("ED50", "European_Datum_1950", "intl", Shift::Towgs84(&[-87.0, -98.0, -121.0])),
    ("RT90", "Rikets_koordinatsystem_1990", "bessel", Shift::Towgs84(&[414.1, 41.3, 603.1, -0.855, 2.141, -7.023, 0.0])),
    ("SWEREF99", "SWEREF99", "GRS80", Shift::Towgs84(&[0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
    ("JGD2000", "Japanese_Geodetic_Datum_2000", "GRS80", Shift::Towgs84(&[0.0, 0.0, 0.0])),
    ("JGD2011", "Japanese_Geodetic_Datum_2011", "GRS80", Shift::Towgs84(&[0.0, 0.0, 0.0])),
    ("Tokyo", "Tokyo", "bessel", Shift::Towgs84(&[-146.414, 507.337, 680.507])),
    ("Amersfoort", "Amersfoort", "bessel", Shift::Towgs84(&[565.417, 50.3319, 465.552, -0.398957, 0.343988, -1.8774, 4.0725])),
    ("RGF93", "Reseau_Geodesique_Francais_1993", "GRS80", Shift::Towgs84(&[0.0, 0.0, 0.0])),
];

impl Datum {
    /// Create a datum, treating a zero shift on a WGS84-sized ellipsoid as WGS84.
    pub fn new(name: &str, spheroid: Spheroid, method: DatumMethod) -> Self {
        let method = match method {
            DatumMethod::Param3([0.0, 0.0, 0.0])
                if spheroid.a == 6_378_137.0 && (spheroid.e2 - 0.006_694_379_990).abs() < 5e-11 =>
            {
                DatumMethod::Wgs84
            }
            other => other,
        };
        Self {
            name: name.to_string(),
            spheroid,
            method,
        }
    }

    pub fn wgs84() -> Self {
        Self::new("WGS84", Spheroid::wgs84(), DatumMethod::Wgs84)
    }

    /// Look up a named datum by PROJ id or WKT name (with or without the ESRI `D_` prefix).
    pub fn named(name: &str) -> Option<Self> {
        let stripped = name.strip_prefix("D_").unwrap_or(name);
        KNOWN_DATUMS
            .iter()
            .find(|(id, wkt, _, _)| id.eq_ignore_ascii_case(name) || wkt.eq_ignore_ascii_case(stripped))
            .and_then(|(id, _, ellps, shift)| {
                let spheroid = Spheroid::named(ellps)?;
                let method = match shift {
                    Shift::Towgs84(values) => DatumMethod::from_towgs84(values).ok()?,
                    Shift::Grids(list) => DatumMethod::from_nadgrids(list),
                };
                Some(Self::new(id, spheroid, method))
            })
    }

    /// PROJ id of the named datum equal to this one, if any.
    pub fn identify(spheroid: &Spheroid, method: &DatumMethod) -> Option<&'static str> {
        let candidate = Datum::new("", spheroid.clone(), method.clone());
        KNOWN_DATUMS
            .iter()
            .map(|(id, _, _, _)| *id)
            .find(|id| Self::named(id).is_some_and(|known| known == candidate))
    }

    /// WKT name for this datum.
    pub fn wkt_name(&self) -> String {
        KNOWN_DATUMS
            .iter()
            .find(|(id, _, _, _)| id.eq_ignore_ascii_case(&self.name))
            .map(|(_, wkt, _, _)| wkt.to_string())
            .unwrap_or_else(|| self.name.clone())
    }

    /// True when this datum is usable as a PROJ `+datum=` shorthand.
    pub fn is_proj_named(&self) -> bool {
        matches!(self.name.as_str(), "WGS84" | "NAD83" | "NAD27" | "GGRS87" | "potsdam" | "carthage" | "hermannskogel" | "ire65" | "nzgd49" | "OSGB36")
            && Self::named(&self.name).is_some_and(|known| known == *self)
    }
}

/// Datums compare by spheroid and shift method; the name is a label.
impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        self.spheroid == other.spheroid && self.method == other.method
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::wgs84()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_towgs84_collapses_to_param3() {
        let method = DatumMethod::from_towgs84(&[-87.0, -98.0, -121.0, 0.0, 0.0, 0.0, 0.0]).unwrap();
        assert_eq!(method, DatumMethod::Param3([-87.0, -98.0, -121.0]));
        assert!(matches!(
            DatumMethod::from_towgs84(&[1.0, 2.0]),
            Err(ProjError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_zero_shift_on_grs80_is_wgs84() {
        let datum = Datum::new(
            "ETRS89",
            Spheroid::named("GRS80").unwrap(),
            DatumMethod::from_towgs84(&[0.0; 7]).unwrap(),
        );
        assert_eq!(datum.method, DatumMethod::Wgs84);

        let bessel = Datum::new("x", Spheroid::named("bessel").unwrap(), DatumMethod::Param3([0.0; 3]));
        assert_eq!(bessel.method, DatumMethod::Param3([0.0; 3]));
    }

    #[test]
    fn test_named_datums() {
        let osgb = Datum::named("OSGB36").unwrap();
        assert_eq!(osgb.spheroid.name.as_deref(), Some("airy"));
        assert!(matches!(osgb.method, DatumMethod::Param7(_)));
        assert_eq!(Datum::named("D_OSGB_1936"), Some(osgb.clone()));
        assert!(osgb.is_proj_named());

        let nad27 = Datum::named("NAD27").unwrap();
        assert_eq!(
            nad27.method,
            DatumMethod::GridShift(vec![
                "@conus".to_string(),
                "@alaska".to_string(),
                "@ntv2_0.gsb".to_string(),
                "@ntv1_can.dat".to_string()
            ])
        );
    }

    #[test]
    fn test_identify() {
        let ed50 = Datum::named("ED50").unwrap();
        assert_eq!(Datum::identify(&ed50.spheroid, &ed50.method), Some("ED50"));
        assert_eq!(Datum::identify(&Spheroid::wgs84(), &DatumMethod::Wgs84), Some("WGS84"));
        assert_eq!(Datum::identify(&Spheroid::wgs84(), &DatumMethod::Unknown), None);
    }

    #[test]
    fn test_equality_ignores_name() {
        let a = Datum::new("a", Spheroid::wgs84(), DatumMethod::Wgs84);
        let b = Datum::new("b", Spheroid::wgs84(), DatumMethod::Wgs84);
        assert_eq!(a, b);
        // GRS80 and WGS84 differ in e2 by less than the comparison tolerance.
        let grs80 = Datum::new("c", Spheroid::named("GRS80").unwrap(), DatumMethod::Wgs84);
        assert_eq!(a, grs80);
        let bessel = Datum::new("d", Spheroid::named("bessel").unwrap(), DatumMethod::Wgs84);
        assert_ne!(a, bessel);
    }
}
