//! Static gazetteer of known London outcodes and common destinations.
//!
//! Sources that need a centroid (transit, crime, schools, amenities) resolve
//! names here. A name missing from the table has no centroid.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// WGS84 latitude/longitude pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Great-circle distance in kilometres (haversine).
    pub fn distance_km(&self, other: &Coordinates) -> f64 {
        const EARTH_RADIUS_KM: f64 = 6371.0;
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();
        let a = (d_lat / 2.0).sin().powi(2)
            + self.lat.to_radians().cos() * other.lat.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
    }
}

/// A named place with its centroid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub code: &'static str,
    pub name: &'static str,
    pub centroid: Coordinates,
}

const PLACES: &[(&str, &str, f64, f64)] = &[
    ("E1", "Whitechapel", 51.5154, -0.0616),
    ("E2", "Bethnal Green", 51.5272, -0.0559),
    ("E3", "Bow", 51.5266, -0.0188),
    ("E8", "Hackney", 51.5461, -0.0553),
    ("E9", "Homerton", 51.5539, -0.0427),
    ("E14", "Canary Wharf", 51.5045, -0.0194),
    ("E15", "Stratford", 51.5397, 0.0031),
    ("SE1", "Southwark", 51.5040, -0.0925),
    ("SE5", "Camberwell", 51.4736, -0.0903),
    ("SE8", "Deptford", 51.4786, -0.0270),
    ("SE10", "Greenwich", 51.4826, 0.0077),
    ("SE15", "Peckham", 51.4739, -0.0673),
    ("SE22", "East Dulwich", 51.4483, -0.0725),
    ("SW1", "Westminster", 51.4975, -0.1357),
    ("SW2", "Brixton", 51.4627, -0.1145),
    ("SW4", "Clapham", 51.4623, -0.1379),
    ("SW9", "Stockwell", 51.4733, -0.1233),
    ("SW11", "Battersea", 51.4643, -0.1647),
    ("SW18", "Wandsworth", 51.4571, -0.1877),
    ("N1", "Islington", 51.5392, -0.1030),
    ("N4", "Finsbury Park", 51.5697, -0.1064),
    ("N7", "Holloway", 51.5533, -0.1155),
    ("N8", "Crouch End", 51.5891, -0.1224),
    ("N16", "Stoke Newington", 51.5613, -0.0764),
    ("N19", "Archway", 51.5644, -0.1393),
    ("NW1", "Camden Town", 51.5362, -0.1426),
    ("W1", "Mayfair", 51.5155, -0.1445),
    ("W2", "Paddington", 51.5156, -0.1715),
    ("W6", "Hammersmith", 51.4927, -0.2241),
    ("W11", "Notting Hill", 51.5164, -0.1967),
    ("W12", "Shepherds Bush", 51.5055, -0.2243),
    // Destinations
    ("UCL", "University College London", 51.5246, -0.1340),
    ("KCL", "King's College London", 51.5115, -0.1160),
    ("LSE", "London School of Economics", 51.5145, -0.1167),
    ("IMPERIAL", "Imperial College", 51.4988, -0.1749),
];

static INDEX: Lazy<HashMap<&'static str, Place>> = Lazy::new(|| {
    PLACES
        .iter()
        .map(|&(code, name, lat, lon)| {
            (
                code,
                Place {
                    code,
                    name,
                    centroid: Coordinates::new(lat, lon),
                },
            )
        })
        .collect()
});

/// Read-only lookup over the built-in place table.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gazetteer;

impl Gazetteer {
    /// Looks up a place by code or destination name (case-insensitive).
    pub fn lookup(name: &str) -> Option<&'static Place> {
        INDEX.get(name.trim().to_ascii_uppercase().as_str())
    }

    pub fn centroid(name: &str) -> Option<Coordinates> {
        Self::lookup(name).map(|p| p.centroid)
    }

    /// Residential outcodes in table order (destinations excluded).
    pub fn residential_codes() -> impl Iterator<Item = &'static str> {
        PLACES
            .iter()
            .map(|(code, ..)| *code)
            .filter(|code| code.chars().any(|c| c.is_ascii_digit()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        let place = Gazetteer::lookup("imperial").unwrap();
        assert_eq!(place.name, "Imperial College");
        assert_eq!(Gazetteer::lookup("sw11").unwrap().name, "Battersea");
    }

    #[test]
    fn unknown_names_have_no_centroid() {
        assert_eq!(Gazetteer::centroid("ZZ9"), None);
        assert_eq!(Gazetteer::centroid(""), None);
    }

    #[test]
    fn residential_codes_exclude_destinations() {
        let codes: Vec<_> = Gazetteer::residential_codes().collect();
        assert_eq!(codes.len(), 31);
        assert!(!codes.contains(&"UCL"));
    }

    #[test]
    fn distance_between_whitechapel_and_ucl_is_a_few_km() {
        let e1 = Gazetteer::centroid("E1").unwrap();
        let ucl = Gazetteer::centroid("UCL").unwrap();
        let km = e1.distance_km(&ucl);
        assert!(km > 4.0 && km < 6.0, "got {km}");
    }
}
