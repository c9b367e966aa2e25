// Copyright 2025 Cowboy AI, LLC.

//! Day-route optimization
//!
//! A pure nearest-neighbor pass over one day's activities. Day itineraries
//! are small (single digits to low tens of stops), so the O(n²) greedy
//! heuristic is close enough to optimal for user-facing ordering and keeps
//! this module free of any TSP machinery.

use crate::activity::GeoPoint;
use crate::ActivityId;

/// Mean Earth radius in kilometers
const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two coordinates, in kilometers
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat_a = a.lat.to_radians();
    let lat_b = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * h.sqrt().asin()
}

/// One stop on a day, as the optimizer sees it
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteStop {
    /// The day's activity reference
    pub activity_id: ActivityId,
    /// Coordinates, when the activity has any; stops without coordinates
    /// are fixed anchors and keep their original position
    pub coordinates: Option<GeoPoint>,
}

/// Reorder a day's stops to approximately minimize total travel distance
///
/// Nearest-neighbor from the first coordinate-bearing stop in the original
/// order: repeatedly append the unvisited stop closest (haversine) to the
/// current position. Ties break toward the earlier original position, so the
/// result is deterministic. Stops without coordinates keep their original
/// positions; with zero or one coordinate-bearing stops the input order is
/// returned unchanged.
pub fn optimize_route(stops: &[RouteStop]) -> Vec<ActivityId> {
    let located: Vec<(usize, GeoPoint)> = stops
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.coordinates.map(|c| (i, c)))
        .collect();

    if located.len() <= 1 {
        return stops.iter().map(|s| s.activity_id).collect();
    }

    let mut visited = vec![false; located.len()];
    let mut order = Vec::with_capacity(located.len());
    visited[0] = true;
    order.push(0);
    let mut current = located[0].1;

    while order.len() < located.len() {
        let mut best: Option<(usize, f64)> = None;
        for (k, (_, point)) in located.iter().enumerate() {
            if visited[k] {
                continue;
            }
            let distance = haversine_km(current, *point);
            // strict comparison keeps the earliest original position on ties
            if best.map_or(true, |(_, d)| distance < d) {
                best = Some((k, distance));
            }
        }
        let (next, _) = best.expect("an unvisited stop remains");
        visited[next] = true;
        order.push(next);
        current = located[next].1;
    }

    // anchors stay in place; located slots are refilled in visit order
    let mut result: Vec<ActivityId> = stops.iter().map(|s| s.activity_id).collect();
    for (slot, visit) in located.iter().map(|(i, _)| *i).zip(order) {
        result[slot] = stops[located[visit].0].activity_id;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stop(lat: f64, lon: f64) -> RouteStop {
        RouteStop {
            activity_id: ActivityId::new(),
            coordinates: Some(GeoPoint { lat, lon }),
        }
    }

    fn anchor() -> RouteStop {
        RouteStop {
            activity_id: ActivityId::new(),
            coordinates: None,
        }
    }

    fn ids(stops: &[RouteStop]) -> Vec<ActivityId> {
        stops.iter().map(|s| s.activity_id).collect()
    }

    #[test]
    fn test_haversine_known_distance() {
        // Galle Fort to Unawatuna Beach, roughly 4.5 km
        let fort = GeoPoint {
            lat: 6.0261,
            lon: 80.2168,
        };
        let beach = GeoPoint {
            lat: 6.0076,
            lon: 80.2476,
        };
        let d = haversine_km(fort, beach);
        assert!((4.0..5.0).contains(&d), "got {d} km");
    }

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint { lat: 6.0, lon: 80.0 };
        assert_eq!(haversine_km(p, p), 0.0);
    }

    #[test]
    fn test_empty_and_single_unchanged() {
        assert!(optimize_route(&[]).is_empty());

        let one = [stop(6.0, 80.0)];
        assert_eq!(optimize_route(&one), ids(&one));

        let anchors_only = [anchor(), anchor()];
        assert_eq!(optimize_route(&anchors_only), ids(&anchors_only));
    }

    #[test]
    fn test_reorders_by_proximity() {
        // start, far, near: nearest-neighbor should visit near before far
        let stops = [stop(0.0, 0.0), stop(0.0, 10.0), stop(0.0, 1.0)];
        let optimized = optimize_route(&stops);
        assert_eq!(
            optimized,
            vec![
                stops[0].activity_id,
                stops[2].activity_id,
                stops[1].activity_id
            ]
        );
    }

    #[test]
    fn test_preserves_stop_set() {
        let stops = [
            stop(6.03, 80.22),
            stop(6.01, 80.25),
            anchor(),
            stop(6.02, 80.21),
        ];
        let optimized = optimize_route(&stops);
        assert_eq!(optimized.len(), stops.len());
        let mut expected = ids(&stops);
        let mut actual = optimized.clone();
        expected.sort();
        actual.sort();
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_anchors_keep_their_slots() {
        let stops = [anchor(), stop(0.0, 10.0), stop(0.0, 11.0), anchor()];
        let optimized = optimize_route(&stops);
        assert_eq!(optimized[0], stops[0].activity_id);
        assert_eq!(optimized[3], stops[3].activity_id);
    }

    #[test]
    fn test_deterministic_on_ties() {
        // two stops equidistant from the start: the earlier one wins
        let stops = [stop(0.0, 0.0), stop(0.0, 1.0), stop(0.0, -1.0)];
        let first = optimize_route(&stops);
        let second = optimize_route(&stops);
        assert_eq!(first, second);
        assert_eq!(first[1], stops[1].activity_id);
    }
}
