//! Static table of city centres used to label an origin and pick its
//! density factor.

use crate::error::LocationError;
use crate::geo::{haversine_km, Coordinate};

/// Anchors farther than this from the origin never match.
pub const MAX_CITY_DISTANCE_KM: f64 = 50.0;

#[derive(Debug, Clone, PartialEq)]
pub struct CityAnchor {
    pub name: &'static str,
    pub region: &'static str,
    pub lat: f64,
    pub lng: f64,
    /// Multiplier on search radii; compact historic centres sit below 1.0,
    /// sprawling metros above.
    pub density_factor: f64,
}

const fn anchor(
    name: &'static str,
    region: &'static str,
    lat: f64,
    lng: f64,
    density_factor: f64,
) -> CityAnchor {
    CityAnchor {
        name,
        region,
        lat,
        lng,
        density_factor,
    }
}

pub const COLOMBIAN_CITIES: [CityAnchor; 20] = [
    anchor("Cartagena", "Bolívar", 10.4236, -75.5378, 0.8),
    anchor("Bogotá", "Cundinamarca", 4.7110, -74.0721, 1.2),
    anchor("Medellín", "Antioquia", 6.2442, -75.5812, 1.0),
    anchor("Cali", "Valle del Cauca", 3.4516, -76.5320, 1.1),
    anchor("Barranquilla", "Atlántico", 10.9685, -74.7813, 0.9),
    anchor("Santa Marta", "Magdalena", 11.2408, -74.2087, 0.8),
    anchor("Bucaramanga", "Santander", 7.1193, -73.1227, 1.0),
    anchor("Pereira", "Risaralda", 4.8133, -75.6961, 1.0),
    anchor("Manizales", "Caldas", 5.0700, -75.5138, 1.0),
    anchor("Cúcuta", "Norte de Santander", 7.8939, -72.5078, 1.0),
    anchor("Ibagué", "Tolima", 4.4389, -75.2322, 1.0),
    anchor("Pasto", "Nariño", 1.2136, -77.2811, 1.0),
    anchor("Villavicencio", "Meta", 4.1420, -73.6266, 1.0),
    anchor("Montería", "Córdoba", 8.7479, -75.8814, 1.0),
    anchor("Valledupar", "Cesar", 10.4631, -73.2532, 1.0),
    anchor("Neiva", "Huila", 2.9273, -75.2819, 1.0),
    anchor("Sincelejo", "Sucre", 9.3047, -75.3978, 1.0),
    anchor("Popayán", "Cauca", 2.4448, -76.6147, 1.0),
    anchor("Armenia", "Quindío", 4.5339, -75.6811, 1.0),
    anchor("Tunja", "Boyacá", 5.5353, -73.3678, 1.0),
];

#[derive(Debug, Clone)]
pub struct Gazetteer {
    anchors: Vec<CityAnchor>,
}

impl Gazetteer {
    #[must_use]
    pub fn new(anchors: Vec<CityAnchor>) -> Self {
        Self { anchors }
    }

    #[must_use]
    pub fn colombia() -> Self {
        Self::new(COLOMBIAN_CITIES.to_vec())
    }

    #[must_use]
    pub fn anchors(&self) -> &[CityAnchor] {
        &self.anchors
    }

    /// Closest anchor within [`MAX_CITY_DISTANCE_KM`]. Ties keep the anchor
    /// listed first.
    #[must_use]
    pub fn nearest_city(&self, coord: Coordinate) -> Option<&CityAnchor> {
        let mut best: Option<(&CityAnchor, f64)> = None;
        for city in &self.anchors {
            let distance = haversine_km(coord.lat(), coord.lng(), city.lat, city.lng);
            if best.is_none_or(|(_, min)| distance < min) {
                best = Some((city, distance));
            }
        }
        best.filter(|(_, distance)| *distance <= MAX_CITY_DISTANCE_KM)
            .map(|(city, _)| city)
    }

    /// Like [`Gazetteer::nearest_city`], but outside the service area is an
    /// error.
    ///
    /// # Errors
    ///
    /// Returns [`LocationError::NoCityMatch`] when no anchor is close enough.
    pub fn resolve(&self, coord: Coordinate) -> Result<&CityAnchor, LocationError> {
        self.nearest_city(coord).ok_or(LocationError::NoCityMatch {
            lat: coord.lat(),
            lng: coord.lng(),
            max_km: MAX_CITY_DISTANCE_KM,
        })
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::colombia()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coordinate {
        Coordinate::new(lat, lng).unwrap()
    }

    #[test]
    fn getsemani_resolves_to_cartagena() {
        let gazetteer = Gazetteer::colombia();
        let city = gazetteer.nearest_city(coord(10.4211, -75.5450)).unwrap();
        assert_eq!(city.name, "Cartagena");
        assert!((city.density_factor - 0.8).abs() < f64::EPSILON);
    }

    #[test]
    fn picks_the_closest_anchor() {
        let gazetteer = Gazetteer::colombia();
        // Poblado, Medellín.
        let city = gazetteer.nearest_city(coord(6.2088, -75.5673)).unwrap();
        assert_eq!(city.name, "Medellín");
    }

    #[test]
    fn far_from_every_anchor_is_none() {
        let gazetteer = Gazetteer::colombia();
        // Madrid.
        assert!(gazetteer.nearest_city(coord(40.4168, -3.7038)).is_none());
        let err = gazetteer.resolve(coord(40.4168, -3.7038)).unwrap_err();
        assert!(matches!(err, LocationError::NoCityMatch { .. }));
    }

    #[test]
    fn cutoff_is_inclusive_of_fifty_km() {
        let gazetteer = Gazetteer::new(vec![anchor("Origin", "Test", 0.0, 0.0, 1.0)]);
        // ~44.5 km north of the anchor.
        assert!(gazetteer.nearest_city(coord(0.4, 0.0)).is_some());
        // ~55.6 km north of the anchor.
        assert!(gazetteer.nearest_city(coord(0.5, 0.0)).is_none());
    }

    #[test]
    fn empty_table_matches_nothing() {
        let gazetteer = Gazetteer::new(Vec::new());
        assert!(gazetteer.nearest_city(coord(10.4, -75.5)).is_none());
    }

    #[test]
    fn table_has_twenty_cities_with_expected_density() {
        let gazetteer = Gazetteer::default();
        assert_eq!(gazetteer.anchors().len(), 20);
        let bogota = gazetteer
            .anchors()
            .iter()
            .find(|c| c.name == "Bogotá")
            .unwrap();
        assert!((bogota.density_factor - 1.2).abs() < f64::EPSILON);
    }
}
