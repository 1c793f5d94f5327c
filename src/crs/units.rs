//! Linear and angular units, plus prime meridians.

use std::f64::consts::PI;

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinearUnit {
    pub name: String,
    /// Size of one unit in metres.
    pub meters: f64,
}

/// (PROJ id, WKT name, metres)
const LINEAR_UNITS: &[(&str, &str, f64)] = &[
    ("m", "Meter", 1.0),
    ("km", "Kilometer", 1000.0),
    ("dm", "Decimeter", 0.1),
    ("cm", "Centimeter", 0.01),
    ("mm", "Millimeter", 0.001),
    ("ft", "Foot", 0.3048),
    ("us-ft", "Foot_US", 1200.0 / 3937.0),
    ("yd", "Yard", 0.9144),
    ("mi", "Mile", 1609.344),
    ("in", "Inch", 0.0254),
    ("link", "Link", 0.201_168),
    ("ch", "Chain", 20.1168),
    ("fath", "Fathom", 1.8288),
    ("kmi", "Nautical_Mile", 1852.0),
];

impl LinearUnit {
    pub fn meter() -> Self {
        Self {
            name: "m".to_string(),
            meters: 1.0,
        }
    }

    /// Look up a unit by PROJ id (`us-ft`) or WKT name (`Foot_US`).
    pub fn named(name: &str) -> Option<Self> {
        let name = if name.eq_ignore_ascii_case("metre") {
            "m"
        } else {
            name
        };
        LINEAR_UNITS
            .iter()
            .find(|(id, wkt, _)| id.eq_ignore_ascii_case(name) || wkt.eq_ignore_ascii_case(name))
            .map(|&(id, _, meters)| Self {
                name: id.to_string(),
                meters,
            })
    }

    /// Build from a conversion factor, reusing a known unit name when one matches.
    pub fn from_meters(meters: f64) -> Self {
        LINEAR_UNITS
            .iter()
            .find(|(_, _, m)| (m - meters).abs() < 1e-12 * m.max(1.0))
            .map(|&(id, _, m)| Self {
                name: id.to_string(),
                meters: m,
            })
            .unwrap_or(Self {
                name: "custom".to_string(),
                meters,
            })
    }

    /// PROJ id if this is a known unit.
    pub fn proj_id(&self) -> Option<&'static str> {
        LINEAR_UNITS
            .iter()
            .find(|(id, _, m)| *id == self.name && (m - self.meters).abs() < 1e-12 * m.max(1.0))
            .map(|(id, _, _)| *id)
    }

    pub fn wkt_name(&self) -> &str {
        LINEAR_UNITS
            .iter()
            .find(|(id, _, _)| *id == self.name)
            .map(|(_, wkt, _)| *wkt)
            .unwrap_or(&self.name)
    }
}

impl PartialEq for LinearUnit {
    fn eq(&self, other: &Self) -> bool {
        (self.meters - other.meters).abs() < 1e-12 * self.meters.abs().max(1.0)
    }
}

impl Default for LinearUnit {
    fn default() -> Self {
        Self::meter()
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AngularUnit {
    pub name: String,
    /// Size of one unit in radians.
    pub radians: f64,
}

impl AngularUnit {
    pub fn degree() -> Self {
        Self {
            name: "Degree".to_string(),
            radians: PI / 180.0,
        }
    }

    pub fn radian() -> Self {
        Self {
            name: "Radian".to_string(),
            radians: 1.0,
        }
    }

    pub fn grad() -> Self {
        Self {
            name: "Grad".to_string(),
            radians: PI / 200.0,
        }
    }

    pub fn from_radians(name: &str, radians: f64) -> Self {
        Self {
            name: name.to_string(),
            radians,
        }
    }
}

impl PartialEq for AngularUnit {
    fn eq(&self, other: &Self) -> bool {
        (self.radians - other.radians).abs() < 1e-15
    }
}

impl Default for AngularUnit {
    fn default() -> Self {
        Self::degree()
    }
}

#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PrimeMeridian {
    pub name: String,
    /// Longitude east of Greenwich, degrees.
    pub longitude: f64,
}

const PRIME_MERIDIANS: &[(&str, f64)] = &[
    ("greenwich", 0.0),
    ("lisbon", -9.131_906_111_111),
    ("paris", 2.337_229_166_667),
    ("bogota", -74.080_916_666_667),
    ("madrid", -3.687_938_888_889),
    ("rome", 12.452_333_333_333),
    ("bern", 7.439_583_333_333),
    ("jakarta", 106.807_719_444_444),
    ("ferro", -17.666_666_666_667),
    ("brussels", 4.367_975),
    ("stockholm", 18.058_277_777_778),
    ("athens", 23.716_337_5),
    ("oslo", 10.722_916_666_667),
];

impl PrimeMeridian {
    pub fn greenwich() -> Self {
        Self {
            name: "Greenwich".to_string(),
            longitude: 0.0,
        }
    }

    pub fn named(name: &str) -> Option<Self> {
        PRIME_MERIDIANS
            .iter()
            .find(|(id, _)| id.eq_ignore_ascii_case(name))
            .map(|&(id, longitude)| {
                let mut label = id.to_string();
                label[..1].make_ascii_uppercase();
                Self {
                    name: label,
                    longitude,
                }
            })
    }

    pub fn from_longitude(longitude: f64) -> Self {
        PRIME_MERIDIANS
            .iter()
            .find(|(_, lon)| (lon - longitude).abs() < 1e-9)
            .and_then(|(id, _)| Self::named(id))
            .unwrap_or(Self {
                name: "Custom".to_string(),
                longitude,
            })
    }

    pub fn is_greenwich(&self) -> bool {
        self.longitude == 0.0
    }

    pub fn radians(&self) -> f64 {
        self.longitude.to_radians()
    }
}

impl PartialEq for PrimeMeridian {
    fn eq(&self, other: &Self) -> bool {
        (self.longitude - other.longitude).abs() < 1e-10
    }
}

impl Default for PrimeMeridian {
    fn default() -> Self {
        Self::greenwich()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_linear_units() {
        let us_ft = LinearUnit::named("us-ft").unwrap();
        assert_relative_eq!(us_ft.meters, 0.304_800_609_601_219_2, epsilon = 1e-15);
        assert_eq!(LinearUnit::named("Foot_US").unwrap().name, "us-ft");
        assert_eq!(LinearUnit::named("metre").unwrap(), LinearUnit::meter());
        assert_eq!(LinearUnit::from_meters(0.3048).proj_id(), Some("ft"));
        assert_eq!(LinearUnit::from_meters(0.5).proj_id(), None);
    }

    #[test]
    fn test_prime_meridians() {
        let paris = PrimeMeridian::named("paris").unwrap();
        assert_eq!(paris.name, "Paris");
        assert_relative_eq!(paris.longitude, 2.337_229_166_667);
        assert_eq!(PrimeMeridian::from_longitude(2.337_229_166_667).name, "Paris");
        assert!(PrimeMeridian::default().is_greenwich());
    }
}
