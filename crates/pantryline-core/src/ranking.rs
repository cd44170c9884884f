//! Distance ranking — haversine great-circle distance over the candidate set.
//!
//! Distances stay un-rounded through ranking; rounding to one decimal happens
//! only at the presentation boundary via [`RankedPantry::display_distance`].

use crate::geocode::GeoCoordinate;
use crate::pantry::Pantry;

/// Earth radius in kilometers (spherical approximation).
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometers.
pub fn haversine_km(a: &GeoCoordinate, b: &GeoCoordinate) -> f64 {
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();
    let h = (d_lat / 2.0).sin().powi(2)
        + a.lat.to_radians().cos() * b.lat.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// A candidate that survived geocoding, with its distance from the caller.
#[derive(Debug, Clone)]
pub struct RankedPantry {
    pub pantry: Pantry,
    pub coordinate: GeoCoordinate,
    pub distance_km: f64,
}

impl RankedPantry {
    /// Distance rounded to one decimal, for spoken/printed output only.
    pub fn display_distance(&self) -> f64 {
        (self.distance_km * 10.0).round() / 10.0
    }
}

/// Rank candidates by ascending distance from `origin`.
///
/// Candidates whose geocode failed (`None`) are dropped. The sort is stable,
/// so equal distances keep the directory's original order. Status filtering
/// happens upstream, before geocoding is attempted at all.
pub fn rank(
    origin: &GeoCoordinate,
    candidates: Vec<(Pantry, Option<GeoCoordinate>)>,
) -> Vec<RankedPantry> {
    let mut ranked: Vec<RankedPantry> = candidates
        .into_iter()
        .filter_map(|(pantry, coordinate)| {
            let coordinate = coordinate?;
            Some(RankedPantry {
                distance_km: haversine_km(origin, &coordinate),
                pantry,
                coordinate,
            })
        })
        .collect();
    ranked.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geocode::ProviderKind;
    use crate::pantry::PantryStatus;

    fn coord(lat: f64, lng: f64) -> GeoCoordinate {
        GeoCoordinate::new(lat, lng, ProviderKind::Google).unwrap()
    }

    fn pantry(id: &str) -> Pantry {
        Pantry {
            id: id.to_string(),
            name: format!("Pantry {}", id),
            address: format!("{} Test St", id),
            phone_number: String::new(),
            inventory: String::new(),
            email: None,
            website: None,
            hours: Vec::new(),
            status: PantryStatus::Active,
        }
    }

    #[test]
    fn distance_is_symmetric_and_zero_on_self() {
        let syracuse = coord(43.0481, -76.1474);
        let rochester = coord(43.1566, -77.6088);
        let there = haversine_km(&syracuse, &rochester);
        let back = haversine_km(&rochester, &syracuse);
        assert!((there - back).abs() < 1e-9);
        assert_eq!(haversine_km(&syracuse, &syracuse), 0.0);
    }

    #[test]
    fn known_distance_syracuse_to_rochester() {
        // Roughly 120 km apart.
        let syracuse = coord(43.0481, -76.1474);
        let rochester = coord(43.1566, -77.6088);
        let km = haversine_km(&syracuse, &rochester);
        assert!((km - 119.0).abs() < 5.0, "got {}", km);
    }

    #[test]
    fn ranks_ascending_and_drops_failed_geocodes() {
        let origin = coord(43.0, -76.0);
        // A ~1.2 km north, B ~0.5 km north, C failed to geocode.
        let candidates = vec![
            (pantry("A"), Some(coord(43.011, -76.0))),
            (pantry("B"), Some(coord(43.0045, -76.0))),
            (pantry("C"), None),
        ];
        let ranked = rank(&origin, candidates);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].pantry.id, "B");
        assert_eq!(ranked[1].pantry.id, "A");
        assert!(ranked[0].distance_km <= ranked[1].distance_km);
    }

    #[test]
    fn equal_distances_keep_directory_order() {
        let origin = coord(43.0, -76.0);
        let spot = coord(43.01, -76.0);
        let candidates = vec![
            (pantry("first"), Some(spot)),
            (pantry("second"), Some(spot)),
            (pantry("third"), Some(spot)),
        ];
        let ranked = rank(&origin, candidates);
        let ids: Vec<&str> = ranked.iter().map(|r| r.pantry.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn display_distance_rounds_to_one_decimal() {
        let origin = coord(43.0, -76.0);
        let ranked = RankedPantry {
            pantry: pantry("A"),
            coordinate: origin,
            distance_km: 1.2499,
        };
        assert_eq!(ranked.display_distance(), 1.2);
        let ranked = RankedPantry {
            distance_km: 1.25,
            ..ranked
        };
        assert_eq!(ranked.display_distance(), 1.3);
    }

    #[test]
    fn empty_input_ranks_empty() {
        let origin = coord(43.0, -76.0);
        assert!(rank(&origin, Vec::new()).is_empty());
    }
}
