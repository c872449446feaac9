//! Planar containment tests over place-registry polygons.
//!
//! Used to answer spatial-zone membership queries such as "is this pose on
//! stage", where the stage is a quadrilateral whose corners are symbolic
//! places.

use posekit_types::PoseError;

use crate::places::PlaceSource;

/// Even-odd ray-casting point-in-polygon test.
///
/// `polygon` is an ordered vertex list, implicitly closed (the last vertex
/// connects back to the first). It need not be convex or consistently
/// wound. Fewer than three vertices can enclose nothing and always yield
/// `false`.
///
/// A point exactly on an edge or vertex may report either side; callers
/// must not rely on boundary behavior.
pub fn contains(point: (f64, f64), polygon: &[(f64, f64)]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let (x, y) = point;
    let mut inside = false;

    let (mut p1x, mut p1y) = polygon[polygon.len() - 1];
    for &(p2x, p2y) in polygon {
        // Horizontal edges never cross a horizontal ray and are skipped.
        if y > p1y.min(p2y) && y <= p1y.max(p2y) && x <= p1x.max(p2x) && p1y != p2y {
            let xinters = (y - p1y) * (p2x - p1x) / (p2y - p1y) + p1x;
            if p1x == p2x || x <= xinters {
                inside = !inside;
            }
        }
        (p1x, p1y) = (p2x, p2y);
    }

    inside
}

/// Build a zone quadrilateral from four named registry places, in the given
/// corner order.
///
/// Fails with [`PoseError::UnresolvedReference`] naming the first missing
/// corner.
pub fn zone_polygon(
    places: &dyn PlaceSource,
    corners: [&str; 4],
) -> Result<Vec<(f64, f64)>, PoseError> {
    let snapshot = places.snapshot();
    corners
        .iter()
        .map(|name| {
            snapshot
                .get(*name)
                .map(|pose| pose.xy())
                .ok_or_else(|| PoseError::UnresolvedReference((*name).to_string()))
        })
        .collect()
}
