//! Grid point generation for viewport sweeps.
//!
//! Lays a near-square grid over a geocoded viewport: `ceil(sqrt(n))` columns
//! by `ceil(n / cols)` rows, one point at the center of each cell, stopping
//! once `n` points are emitted. This trades search precision for cost
//! control — cell spacing follows the viewport's aspect ratio rather than
//! guaranteeing uniform physical distance.

use leadgrid_places::{LatLng, Viewport};

/// Generates up to `target` sample points covering `viewport`.
///
/// Returns an empty vector for `target == 0`.
#[must_use]
pub fn grid_points(viewport: &Viewport, target: u32) -> Vec<LatLng> {
    if target == 0 {
        return Vec::new();
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let cols = (f64::from(target).sqrt().ceil() as u32).max(1);
    let rows = target.div_ceil(cols);

    let lat_span = viewport.northeast.lat - viewport.southwest.lat;
    let lng_span = viewport.northeast.lng - viewport.southwest.lng;
    let lat_step = lat_span / f64::from(rows);
    let lng_step = lng_span / f64::from(cols);

    let mut points = Vec::with_capacity(target as usize);
    'rows: for row in 0..rows {
        for col in 0..cols {
            if points.len() as u32 == target {
                break 'rows;
            }
            points.push(LatLng {
                lat: viewport.southwest.lat + (f64::from(row) + 0.5) * lat_step,
                lng: viewport.southwest.lng + (f64::from(col) + 0.5) * lng_step,
            });
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport() -> Viewport {
        Viewport {
            southwest: LatLng {
                lat: -24.0,
                lng: -46.8,
            },
            northeast: LatLng {
                lat: -23.2,
                lng: -46.0,
            },
        }
    }

    #[test]
    fn zero_target_yields_no_points() {
        assert!(grid_points(&viewport(), 0).is_empty());
    }

    #[test]
    fn single_point_lands_at_the_viewport_center() {
        let points = grid_points(&viewport(), 1);
        assert_eq!(points.len(), 1);
        assert!((points[0].lat - (-23.6)).abs() < 1e-9);
        assert!((points[0].lng - (-46.4)).abs() < 1e-9);
    }

    #[test]
    fn emits_exactly_the_target_count() {
        for target in [2, 3, 4, 5, 7, 9, 10, 16, 25] {
            assert_eq!(grid_points(&viewport(), target).len() as u32, target);
        }
    }

    #[test]
    fn four_points_form_a_two_by_two_layout() {
        let points = grid_points(&viewport(), 4);
        let lats: std::collections::BTreeSet<String> =
            points.iter().map(|p| format!("{:.6}", p.lat)).collect();
        let lngs: std::collections::BTreeSet<String> =
            points.iter().map(|p| format!("{:.6}", p.lng)).collect();
        assert_eq!(lats.len(), 2);
        assert_eq!(lngs.len(), 2);
    }

    #[test]
    fn every_point_stays_inside_the_viewport() {
        let vp = viewport();
        for point in grid_points(&vp, 23) {
            assert!(point.lat > vp.southwest.lat && point.lat < vp.northeast.lat);
            assert!(point.lng > vp.southwest.lng && point.lng < vp.northeast.lng);
        }
    }
}
