/// Reference ellipsoid parameters.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spheroid {
    /// PROJ ellipsoid identifier (`WGS84`, `bessel`, ...), if the spheroid is a named one.
    pub name: Option<String>,
    /// Semi-major axis (metres)
    pub a: f64,
    /// Flattening (dimensionless)
    pub f: f64,
    /// Semi-minor axis: a * (1 - f)
    pub b: f64,
    /// First eccentricity squared
    pub e2: f64,
    /// Second eccentricity squared: e^2 / (1 - e^2)
    pub ep2: f64,
    /// Third flattening: f / (2 - f)
    pub n: f64,
}

/// Named ellipsoids: (PROJ id, description, a, 1/f). An inverse flattening of
/// zero marks a sphere.
const KNOWN_ELLIPSOIDS: &[(&str, &str, f64, f64)] = &[
    ("WGS84", "WGS_1984", 6_378_137.0, 298.257_223_563),
    ("GRS80", "GRS_1980", 6_378_137.0, 298.257_222_101),
    ("WGS72", "WGS_1972", 6_378_135.0, 298.26),
    ("GRS67", "GRS_1967", 6_378_160.0, 298.247_167_427),
    ("airy", "Airy_1830", 6_377_563.396, 299.324_964_6),
    ("mod_airy", "Airy_Modified", 6_377_340.189, 299.324_964_6),
    ("bessel", "Bessel_1841", 6_377_397.155, 299.152_812_8),
    ("bess_nam", "Bessel_Namibia", 6_377_483.865, 299.152_812_8),
    ("clrk66", "Clarke_1866", 6_378_206.4, 294.978_698_213_9),
    ("clrk80", "Clarke_1880_RGS", 6_378_249.145, 293.465),
    ("clrk80ign", "Clarke_1880_IGN", 6_378_249.2, 293.466_021_293_6),
    ("intl", "International_1924", 6_378_388.0, 297.0),
    ("krass", "Krasovsky_1940", 6_378_245.0, 298.3),
    ("helmert", "Helmert_1906", 6_378_200.0, 298.3),
    ("evrst30", "Everest_1830", 6_377_276.345, 300.801_7),
    ("aust_SA", "Australian", 6_378_160.0, 298.25),
    ("sphere", "Sphere", 6_370_997.0, 0.0),
];

impl Spheroid {
    pub fn new(a: f64, f: f64) -> Self {
        let b = a * (1.0 - f);
        let e2 = 2.0 * f - f * f;
        let ep2 = e2 / (1.0 - e2);
        let n = f / (2.0 - f);
        Self {
            name: None,
            a,
            f,
            b,
            e2,
            ep2,
            n,
        }
    }

    pub fn from_inverse_flattening(a: f64, rf: f64) -> Self {
        if rf == 0.0 {
            Self::sphere(a)
        } else {
            Self::new(a, 1.0 / rf)
        }
    }

    pub fn from_semi_minor(a: f64, b: f64) -> Self {
        Self::new(a, (a - b) / a)
    }

    pub fn sphere(radius: f64) -> Self {
        Self::new(radius, 0.0)
    }

    pub fn wgs84() -> Self {
        Self::named("WGS84").unwrap_or_else(|| Self::new(6_378_137.0, 1.0 / 298.257_223_563))
    }

    /// Look up a named ellipsoid by PROJ identifier or descriptive name.
    pub fn named(name: &str) -> Option<Self> {
        KNOWN_ELLIPSOIDS
            .iter()
            .find(|(id, description, _, _)| {
                id.eq_ignore_ascii_case(name) || description.eq_ignore_ascii_case(name)
            })
            .map(|&(id, _, a, rf)| Self {
                name: Some(id.to_string()),
                ..Self::from_inverse_flattening(a, rf)
            })
    }

    /// Find the named ellipsoid with these axis parameters.
    pub fn identify(a: f64, rf: f64) -> Option<Self> {
        KNOWN_ELLIPSOIDS
            .iter()
            .find(|(_, _, ka, krf)| (ka - a).abs() < 1e-3 && (krf - rf).abs() < 1e-6)
            .and_then(|(id, _, _, _)| Self::named(id))
    }

    /// Descriptive (WKT) name.
    pub fn description(&self) -> String {
        self.name
            .as_deref()
            .and_then(|id| KNOWN_ELLIPSOIDS.iter().find(|(kid, _, _, _)| *kid == id))
            .map(|(_, description, _, _)| description.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Get the first eccentricity.
    pub fn eccentricity(&self) -> f64 {
        self.e2.sqrt()
    }

    pub fn inverse_flattening(&self) -> f64 {
        if self.f == 0.0 {
            0.0
        } else {
            1.0 / self.f
        }
    }

    pub fn is_sphere(&self) -> bool {
        self.e2 == 0.0
    }
}

/// Spheroids compare by shape only; the name is a label.
impl PartialEq for Spheroid {
    fn eq(&self, other: &Self) -> bool {
        (self.a - other.a).abs() < 5e-11 * self.a.max(1.0) && (self.e2 - other.e2).abs() < 5e-11
    }
}

impl Default for Spheroid {
    fn default() -> Self {
        Self::wgs84()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_wgs84_constants() {
        let wgs84 = Spheroid::wgs84();
        assert_relative_eq!(wgs84.a, 6_378_137.0);
        assert_relative_eq!(wgs84.b, 6_356_752.314_245_179, epsilon = 0.001);
        assert_relative_eq!(wgs84.eccentricity(), 0.081_819_190_842_622, epsilon = 1e-12);
        assert_relative_eq!(wgs84.n, 0.001_679_220_386_383_705, epsilon = 1e-12);
    }

    #[test]
    fn test_grs80_equals_wgs84_within_tolerance() {
        let wgs84 = Spheroid::wgs84();
        let grs80 = Spheroid::named("GRS80").unwrap();
        assert_relative_eq!(wgs84.a, grs80.a);
        assert!((wgs84.f - grs80.f).abs() < 1e-8);
        assert_eq!(wgs84, grs80);
        assert_ne!(wgs84, Spheroid::named("bessel").unwrap());
    }

    #[test]
    fn test_named_lookup() {
        let bessel = Spheroid::named("bessel").unwrap();
        assert_eq!(bessel.name.as_deref(), Some("bessel"));
        assert_relative_eq!(bessel.inverse_flattening(), 299.152_812_8, epsilon = 1e-9);
        assert_eq!(Spheroid::named("Bessel_1841"), Some(bessel));
        assert!(Spheroid::named("potato").is_none());
    }

    #[test]
    fn test_identify() {
        let airy = Spheroid::identify(6_377_563.396, 299.324_964_6).unwrap();
        assert_eq!(airy.name.as_deref(), Some("airy"));
        assert_eq!(airy.description(), "Airy_1830");
        assert!(Spheroid::identify(6_000_000.0, 300.0).is_none());
    }

    #[test]
    fn test_sphere() {
        let sphere = Spheroid::named("sphere").unwrap();
        assert!(sphere.is_sphere());
        assert_relative_eq!(sphere.b, sphere.a);
        assert_eq!(sphere.inverse_flattening(), 0.0);
    }
}
