//! Static country coordinates.
//!
//! The map view needs a position for each country it draws. There is no
//! geocoding: positions come from a fixed table, and a country missing
//! from the table is simply not drawn.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::OnceLock;

/// A country's approximate geographic center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryCoordinate {
    pub name: String,
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lon: f64,
}

const BUILTIN: &[(&str, f64, f64)] = &[
    ("United States", 37.0902, -95.7129),
    ("China", 35.8617, 104.1954),
    ("Japan", 36.2048, 138.2529),
    ("Germany", 51.1657, 10.4515),
    ("United Kingdom", 55.3781, -3.4360),
    ("France", 46.2276, 2.2137),
    ("India", 20.5937, 78.9629),
    ("Italy", 41.8719, 12.5674),
    ("Brazil", -14.2350, -51.9253),
    ("Canada", 56.1304, -106.3468),
    ("Russia", 61.5240, 105.3188),
    ("Australia", -25.2744, 133.7751),
    ("South Korea", 35.9078, 127.7669),
    ("Mexico", 23.6345, -102.5528),
    ("Indonesia", -0.7893, 113.9213),
    ("South Africa", -30.5595, 22.9375),
    ("Saudi Arabia", 23.8859, 45.0792),
    ("Argentina", -38.4161, -63.6167),
    ("Turkey", 38.9637, 35.2433),
    ("Spain", 40.4637, -3.7492),
    ("Netherlands", 52.1326, 5.2913),
    ("Sweden", 60.1282, 18.6435),
    ("Switzerland", 46.8182, 8.2275),
    ("Poland", 51.9194, 19.1451),
    ("Egypt", 26.8206, 30.8025),
];

/// Read-only lookup from country name to coordinate.
///
/// Names match exactly and case-sensitively.
#[derive(Debug, Clone, Default)]
pub struct CoordinateRegistry {
    by_name: HashMap<String, CountryCoordinate>,
}

impl CoordinateRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in table, initialized once per process.
    pub fn builtin() -> &'static CoordinateRegistry {
        static REGISTRY: OnceLock<CoordinateRegistry> = OnceLock::new();
        REGISTRY.get_or_init(|| BUILTIN.iter().copied().collect())
    }

    /// Registers a country, replacing any previous entry of that name.
    pub fn insert(&mut self, name: impl Into<String>, lat: f64, lon: f64) {
        let name = name.into();
        self.by_name.insert(
            name.clone(),
            CountryCoordinate {
                name,
                lat: lat.clamp(-90.0, 90.0),
                lon: lon.clamp(-180.0, 180.0),
            },
        );
    }

    /// Looks up a country.
    pub fn get(&self, name: &str) -> Option<&CountryCoordinate> {
        self.by_name.get(name)
    }

    /// Whether the country has a coordinate.
    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl<'a> FromIterator<(&'a str, f64, f64)> for CoordinateRegistry {
    fn from_iter<T: IntoIterator<Item = (&'a str, f64, f64)>>(iter: T) -> Self {
        let mut registry = Self::new();
        for (name, lat, lon) in iter {
            registry.insert(name, lat, lon);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table() {
        let registry = CoordinateRegistry::builtin();

        assert_eq!(registry.len(), 25);
        let germany = registry.get("Germany").unwrap();
        assert_eq!(germany.lat, 51.1657);
        assert_eq!(germany.lon, 10.4515);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let registry = CoordinateRegistry::builtin();

        assert!(registry.contains("United States"));
        assert!(!registry.contains("united states"));
        assert!(registry.get("Atlantis").is_none());
    }

    #[test]
    fn test_builtin_coordinates_in_range() {
        for (name, _, _) in BUILTIN {
            let c = CoordinateRegistry::builtin().get(name).unwrap();
            assert!((-90.0..=90.0).contains(&c.lat), "{name}");
            assert!((-180.0..=180.0).contains(&c.lon), "{name}");
        }
    }

    #[test]
    fn test_custom_registry() {
        let registry: CoordinateRegistry = [("A", 10.0, 20.0), ("B", 95.0, -200.0)]
            .into_iter()
            .collect();

        assert_eq!(registry.len(), 2);
        let b = registry.get("B").unwrap();
        assert_eq!((b.lat, b.lon), (90.0, -180.0));
    }
}
