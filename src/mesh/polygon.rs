use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb};
use crate::mesh::plane::Plane;
use crate::mesh::vertex::Vertex;
use geo::{LineString, Polygon as GeoPolygon, coord};
use nalgebra::{Point3, Vector3};

/// A convex-or-not planar polygon, defined by a list of vertices.
/// - `S` is the generic metadata type, stored as `Option<S>`.
#[derive(Debug, Clone)]
pub struct Polygon<S: Clone> {
    pub vertices: Vec<Vertex>,
    /// Supporting plane, derived once at construction. It stays authoritative
    /// for classification even if later vertices drift within tolerance.
    pub plane: Plane,
    pub metadata: Option<S>,
}

impl<S: Clone> PartialEq for Polygon<S>
where
    S: PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.vertices == other.vertices
            && self.plane == other.plane
            && self.metadata == other.metadata
    }
}

impl<S: Clone> Polygon<S> {
    /// Create a polygon from vertices; the plane comes from the first three.
    ///
    /// Callers guarantee at least three vertices, see [`Polygon::try_new`]
    /// for untrusted input.
    pub fn new(vertices: Vec<Vertex>, metadata: Option<S>) -> Self {
        debug_assert!(vertices.len() >= 3, "degenerate polygon");
        let plane = Plane::from_vertices(&vertices);

        Polygon {
            vertices,
            plane,
            metadata,
        }
    }

    /// Like [`Polygon::new`] but rejects loops with fewer than three vertices.
    pub fn try_new(vertices: Vec<Vertex>, metadata: Option<S>) -> Result<Self, ValidationError> {
        if vertices.len() < 3 {
            return Err(ValidationError::TooFewPoints(vertices.len()));
        }
        Ok(Self::new(vertices, metadata))
    }

    /// Create a polygon that reuses an already known supporting plane.
    ///
    /// Fragments produced by splitting lie on their parent's plane, so they
    /// inherit it instead of re-deriving one from possibly near-collinear
    /// cut points.
    pub const fn with_plane(vertices: Vec<Vertex>, plane: Plane, metadata: Option<S>) -> Self {
        Polygon {
            vertices,
            plane,
            metadata,
        }
    }

    /// Reverses winding order, flips vertices normals, and flips the plane normal
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for v in &mut self.vertices {
            v.flip();
        }
        self.plane.flip();
    }

    /// Returns a flipped copy, leaving `self` untouched.
    pub fn flipped(&self) -> Self {
        let mut poly = self.clone();
        poly.flip();
        poly
    }

    /// Return an iterator over paired vertices each forming an edge of the polygon
    pub fn edges(&self) -> impl Iterator<Item = (&Vertex, &Vertex)> {
        self.vertices
            .iter()
            .zip(self.vertices.iter().cycle().skip(1))
    }

    /// Arithmetic mean of the vertex positions.
    pub fn centroid(&self) -> Point3<Real> {
        let sum = self
            .vertices
            .iter()
            .fold(Vector3::zeros(), |acc, v| acc + v.pos.coords);
        Point3::from(sum / self.vertices.len().max(1) as Real)
    }

    /// Area of the polygon, measured along its plane normal.
    pub fn area(&self) -> Real {
        let origin = match self.vertices.first() {
            Some(v) => v.pos,
            None => return 0.0,
        };
        let twice_area = self
            .vertices
            .windows(2)
            .skip(1)
            .fold(Vector3::zeros(), |acc, w| {
                acc + (w[0].pos - origin).cross(&(w[1].pos - origin))
            });
        0.5 * twice_area.dot(&self.plane.normal).abs()
    }

    /// Recompute the plane from all vertices (Newell fallback included) and
    /// assign its normal to every vertex.
    pub fn set_new_normal(&mut self) {
        self.plane = Plane::from_vertices(&self.vertices);
        for v in &mut self.vertices {
            v.normal = self.plane.normal;
        }
    }

    /// Axis-aligned bounds of the vertices.
    pub fn bounding_box(&self) -> Aabb {
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for v in &self.vertices {
            mins = mins.inf(&v.pos);
            maxs = maxs.sup(&v.pos);
        }
        Aabb::new(mins, maxs)
    }

    /// Triangulate this polygon into a list of triangles, each triangle is `[v0, v1, v2]`.
    ///
    /// Every triangle keeps the polygon's winding, and carries the plane
    /// normal on its vertices.
    pub fn triangulate(&self) -> Vec<[Vertex; 3]> {
        if self.vertices.len() < 3 {
            return Vec::new();
        }
        if self.vertices.len() == 3 {
            return vec![[self.vertices[0], self.vertices[1], self.vertices[2]]];
        }

        let normal_3d = self.plane.normal;
        let (u, v) = build_orthonormal_basis(normal_3d);
        let origin_3d = self.vertices[0].pos;

        // Flatten each vertex into the (u, v) frame of the plane
        let all_vertices_2d: Vec<_> = self
            .vertices
            .iter()
            .map(|vert| {
                let offset = vert.pos - origin_3d;
                coord! { x: offset.dot(&u), y: offset.dot(&v) }
            })
            .collect();
        let polygon_2d = GeoPolygon::new(LineString::new(all_vertices_2d), Vec::new());

        let lift = |x: Real, y: Real| Vertex::new(origin_3d + x * u + y * v, normal_3d);

        #[cfg(feature = "earcut")]
        let triangles_2d: Vec<[(Real, Real); 3]> = {
            use geo::TriangulateEarcut;
            let triangulation = polygon_2d.earcut_triangles_raw();
            let vertices = triangulation.vertices;
            triangulation
                .triangle_indices
                .chunks_exact(3)
                .map(|tri| {
                    let at = |i: usize| (vertices[2 * i], vertices[2 * i + 1]);
                    [at(tri[0]), at(tri[1]), at(tri[2])]
                })
                .collect()
        };

        #[cfg(feature = "delaunay")]
        let triangles_2d: Vec<[(Real, Real); 3]> = {
            use geo::TriangulateSpade;
            let Ok(tris) = polygon_2d.constrained_triangulation(Default::default()) else {
                return Vec::new();
            };
            tris.into_iter()
                .map(|tri| {
                    let (a, b, c) = (tri.v1(), tri.v2(), tri.v3());
                    [(a.x, a.y), (b.x, b.y), (c.x, c.y)]
                })
                .collect()
        };

        triangles_2d
            .into_iter()
            .map(|[a, b, c]| {
                // (u, v, normal) is right handed, so counter-clockwise in 2D
                // matches the polygon's winding in 3D.
                let cross = (b.0 - a.0) * (c.1 - a.1) - (b.1 - a.1) * (c.0 - a.0);
                if cross < 0.0 {
                    [lift(a.0, a.1), lift(c.0, c.1), lift(b.0, b.1)]
                } else {
                    [lift(a.0, a.1), lift(b.0, b.1), lift(c.0, c.1)]
                }
            })
            .collect()
    }

    /// Returns a reference to the metadata, if any.
    pub const fn metadata(&self) -> Option<&S> {
        self.metadata.as_ref()
    }

    /// Sets the metadata to the given value.
    pub fn set_metadata(&mut self, data: S) {
        self.metadata = Some(data);
    }
}

/// Build an orthonormal basis `(u, v)` spanning the plane with normal `n`,
/// such that `u × v == n`.
pub fn build_orthonormal_basis(n: Vector3<Real>) -> (Vector3<Real>, Vector3<Real>) {
    let n = n.normalize();

    // Pick the axis with the smallest component in `n` to cross against.
    let other = if n.x.abs() < n.y.abs() && n.x.abs() < n.z.abs() {
        Vector3::x()
    } else if n.y.abs() < n.z.abs() {
        Vector3::y()
    } else {
        Vector3::z()
    };

    // v = n × other
    let v = n.cross(&other).normalize();
    // u = v × n
    let u = v.cross(&n).normalize();

    (u, v)
}
