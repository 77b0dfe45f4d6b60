//! Oriented planes and the polygon classifier/splitter used by the BSP tree.

use crate::float_types::{Real, tolerance};
use crate::mesh::polygon::Polygon;
use crate::mesh::vertex::Vertex;
use nalgebra::{Point3, Vector3};

// Classification codes. A polygon's type is the bitwise OR of its vertices'
// types, so a polygon with vertices on both sides comes out as SPANNING.
pub const COPLANAR: i8 = 0;
pub const FRONT: i8 = 1;
pub const BACK: i8 = 2;
pub const SPANNING: i8 = 3;

/// A plane in 3D space in Hessian normal form: every point `p` on the plane
/// satisfies `normal · p == w`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<Real>,
    pub w: Real,
}

impl Plane {
    /// Create a plane through three points. The normal follows the right-hand
    /// rule: `(b - a) × (c - a)`.
    pub fn from_points(a: Point3<Real>, b: Point3<Real>, c: Point3<Real>) -> Plane {
        let n = (b - a).cross(&(c - a));
        let normal = n.try_normalize(Real::EPSILON).unwrap_or(n);
        Plane {
            normal,
            w: normal.dot(&a.coords),
        }
    }

    /// Build a new `Plane` from a (not‑necessarily‑unit) normal **n**
    /// and signed offset *o* (in the sense `n · p == o`).
    ///
    /// A zero normal yields the plane `z = 0`.
    pub fn from_normal(normal: Vector3<Real>, offset: Real) -> Self {
        let len = normal.norm();
        if len < Real::EPSILON {
            return Plane {
                normal: Vector3::z(),
                w: 0.0,
            };
        }
        Plane {
            normal: normal / len,
            w: offset / len,
        }
    }

    /// Supporting plane of a vertex loop, taken from its first three vertices.
    ///
    /// When those three are collinear the plane falls back to Newell's normal
    /// over the whole loop so that the winding is still honoured.
    pub fn from_vertices(vertices: &[Vertex]) -> Self {
        if vertices.len() < 3 {
            return Plane {
                normal: Vector3::z(),
                w: 0.0,
            };
        }

        let (a, b, c) = (vertices[0].pos, vertices[1].pos, vertices[2].pos);
        let n = (b - a).cross(&(c - a));
        if let Some(normal) = n.try_normalize(Real::EPSILON * Real::EPSILON) {
            return Plane {
                normal,
                w: normal.dot(&a.coords),
            };
        }

        // Newell
        let mut newell = Vector3::zeros();
        for (i, current) in vertices.iter().enumerate() {
            let next = vertices[(i + 1) % vertices.len()].pos;
            let p = current.pos;
            newell.x += (p.y - next.y) * (p.z + next.z);
            newell.y += (p.z - next.z) * (p.x + next.x);
            newell.z += (p.x - next.x) * (p.y + next.y);
        }
        match newell.try_normalize(Real::EPSILON * Real::EPSILON) {
            Some(normal) => Plane {
                normal,
                w: normal.dot(&a.coords),
            },
            None => Plane::from_points(a, b, c),
        }
    }

    /// Unit normal of the plane.
    pub const fn normal(&self) -> Vector3<Real> {
        self.normal
    }

    /// Signed offset of the plane from the origin along its normal.
    pub const fn offset(&self) -> Real {
        self.w
    }

    /// Signed distance from `point` to the plane: positive in front.
    #[inline]
    pub fn distance(&self, point: &Point3<Real>) -> Real {
        self.normal.dot(&point.coords) - self.w
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    pub fn flipped(&self) -> Plane {
        Plane {
            normal: -self.normal,
            w: -self.w,
        }
    }

    /// Classify a point as [`FRONT`], [`BACK`] or [`COPLANAR`] within [`tolerance`].
    #[inline]
    pub fn orient_point(&self, point: &Point3<Real>) -> i8 {
        Self::classify_distance(self.distance(point), tolerance())
    }

    #[inline]
    fn classify_distance(t: Real, eps: Real) -> i8 {
        if t < -eps {
            BACK
        } else if t > eps {
            FRONT
        } else {
            COPLANAR
        }
    }

    /// Classify a whole polygon: the OR of its vertex classifications.
    pub fn classify_polygon<S: Clone>(&self, polygon: &Polygon<S>) -> i8 {
        let eps = tolerance();
        polygon
            .vertices
            .iter()
            .fold(COPLANAR, |acc, v| acc | Self::classify_distance(self.distance(&v.pos), eps))
    }

    /// Splits `polygon` by this plane if needed, returning
    /// `(coplanar_front, coplanar_back, front, back)`.
    ///
    /// Coplanar polygons go to `coplanar_front` when they face the same way as
    /// this plane and to `coplanar_back` otherwise. Spanning polygons are cut
    /// along the plane; a fragment with fewer than three vertices is dropped.
    #[allow(clippy::type_complexity)]
    pub fn split_polygon<S: Clone>(
        &self,
        polygon: &Polygon<S>,
    ) -> (
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
        Vec<Polygon<S>>,
    ) {
        let mut coplanar_front = Vec::new();
        let mut coplanar_back = Vec::new();
        let mut front = Vec::new();
        let mut back = Vec::new();

        let eps = tolerance();

        // 1. classify all vertices
        let distances: Vec<Real> = polygon.vertices.iter().map(|v| self.distance(&v.pos)).collect();
        let types: Vec<i8> = distances
            .iter()
            .map(|&t| Self::classify_distance(t, eps))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        // 2. dispatch
        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    coplanar_front.push(polygon.clone());
                } else {
                    coplanar_back.push(polygon.clone());
                }
            },
            FRONT => front.push(polygon.clone()),
            BACK => back.push(polygon.clone()),
            _ => {
                let n = polygon.vertices.len();
                let mut split_front = Vec::<Vertex>::with_capacity(n + 1);
                let mut split_back = Vec::<Vertex>::with_capacity(n + 1);

                for i in 0..n {
                    let j = (i + 1) % n;
                    let (type_i, type_j) = (types[i], types[j]);
                    let vertex_i = &polygon.vertices[i];
                    let vertex_j = &polygon.vertices[j];

                    // coplanar vertices land in both halves
                    if type_i != BACK {
                        split_front.push(*vertex_i);
                    }
                    if type_i != FRONT {
                        split_back.push(*vertex_i);
                    }

                    // edge crosses the plane: the cut point is shared by both halves
                    if (type_i | type_j) == SPANNING {
                        let t = -distances[i] / (distances[j] - distances[i]);
                        let vertex_new = vertex_i.interpolate(vertex_j, t);
                        split_front.push(vertex_new);
                        split_back.push(vertex_new);
                    }
                }

                if split_front.len() >= 3 {
                    front.push(Polygon::with_plane(
                        split_front,
                        polygon.plane,
                        polygon.metadata.clone(),
                    ));
                }
                if split_back.len() >= 3 {
                    back.push(Polygon::with_plane(
                        split_back,
                        polygon.plane,
                        polygon.metadata.clone(),
                    ));
                }
            },
        }

        (coplanar_front, coplanar_back, front, back)
    }
}
