//! Planar polygon containment test.

use serde::{Deserialize, Serialize};

use crate::core::types::Point2D;
use crate::error::ConfigError;

/// Distance tolerance for treating a point as lying on an edge.
const ON_EDGE_EPSILON: f32 = 1e-5;

/// A convex or concave area polygon with a precomputed bounding box.
///
/// Vertex count is validated once at construction; queries are then
/// infallible. Points exactly on an edge count as inside.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<Point2D>,
    min_x: f32,
    max_x: f32,
    min_y: f32,
    max_y: f32,
}

impl Polygon {
    /// Build a polygon from at least 3 vertices.
    pub fn new(vertices: Vec<Point2D>) -> Result<Self, ConfigError> {
        if vertices.len() < 3 {
            return Err(ConfigError::DegeneratePolygon(vertices.len()));
        }

        let mut min_x = vertices[0].x;
        let mut max_x = min_x;
        let mut min_y = vertices[0].y;
        let mut max_y = min_y;
        for vertex in &vertices {
            min_x = min_x.min(vertex.x);
            max_x = max_x.max(vertex.x);
            min_y = min_y.min(vertex.y);
            max_y = max_y.max(vertex.y);
        }

        Ok(Self {
            vertices,
            min_x,
            max_x,
            min_y,
            max_y,
        })
    }

    /// Polygon vertices in order.
    pub fn vertices(&self) -> &[Point2D] {
        &self.vertices
    }

    /// Ray-casting containment test with bounding-box fast path.
    ///
    /// Casts a horizontal ray and counts edge crossings; a point on an
    /// edge (within [`ON_EDGE_EPSILON`]) returns `true` immediately.
    pub fn contains(&self, point: &Point2D) -> bool {
        if point.x < self.min_x
            || point.x > self.max_x
            || point.y < self.min_y
            || point.y > self.max_y
        {
            return false;
        }

        let mut inside = false;
        let mut j = self.vertices.len() - 1;

        for i in 0..self.vertices.len() {
            let vi = self.vertices[i];
            let vj = self.vertices[j];

            if on_segment(point, &vi, &vj) {
                return true;
            }

            if (vi.y > point.y) != (vj.y > point.y)
                && point.x < (vj.x - vi.x) * (point.y - vi.y) / (vj.y - vi.y) + vi.x
            {
                inside = !inside;
            }
            j = i;
        }

        inside
    }
}

/// Whether `point` lies on the segment from `start` to `end`.
///
/// Uses the distance-sum test: the point is on the segment when its
/// distances to both endpoints sum to the segment length.
fn on_segment(point: &Point2D, start: &Point2D, end: &Point2D) -> bool {
    let segment_length = start.distance(end);
    let d1 = point.distance(start);
    let d2 = point.distance(end);
    (d1 + d2 - segment_length).abs() < ON_EDGE_EPSILON
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> Polygon {
        Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(0.0, 1.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_degenerate_polygon_rejected() {
        let result = Polygon::new(vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        assert_eq!(result.unwrap_err(), ConfigError::DegeneratePolygon(2));
    }

    #[test]
    fn test_point_inside() {
        assert!(unit_square().contains(&Point2D::new(0.5, 0.5)));
    }

    #[test]
    fn test_point_outside_bounding_box() {
        assert!(!unit_square().contains(&Point2D::new(2.0, 0.5)));
        assert!(!unit_square().contains(&Point2D::new(-0.1, 0.5)));
    }

    #[test]
    fn test_point_on_edge_counts_as_inside() {
        assert!(unit_square().contains(&Point2D::new(0.5, 0.0)));
        assert!(unit_square().contains(&Point2D::new(1.0, 0.5)));
    }

    #[test]
    fn test_vertex_counts_as_inside() {
        assert!(unit_square().contains(&Point2D::new(0.0, 0.0)));
        assert!(unit_square().contains(&Point2D::new(1.0, 1.0)));
    }

    #[test]
    fn test_inside_bounding_box_outside_polygon() {
        // Triangle whose bounding box covers the unit square.
        let triangle = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(1.0, 0.0),
            Point2D::new(1.0, 1.0),
        ])
        .unwrap();
        assert!(!triangle.contains(&Point2D::new(0.1, 0.9)));
        assert!(triangle.contains(&Point2D::new(0.9, 0.1)));
    }

    #[test]
    fn test_concave_polygon() {
        // U-shape opening upward; the notch is outside.
        let u_shape = Polygon::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(3.0, 2.0),
            Point2D::new(2.0, 2.0),
            Point2D::new(2.0, 1.0),
            Point2D::new(1.0, 1.0),
            Point2D::new(1.0, 2.0),
            Point2D::new(0.0, 2.0),
        ])
        .unwrap();
        assert!(u_shape.contains(&Point2D::new(0.5, 1.5)));
        assert!(u_shape.contains(&Point2D::new(2.5, 1.5)));
        assert!(!u_shape.contains(&Point2D::new(1.5, 1.5)));
        assert!(u_shape.contains(&Point2D::new(1.5, 0.5)));
    }
}
