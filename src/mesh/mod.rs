//! `Mesh` struct and implementations of the `CSGOps` trait for `Mesh`

use crate::float_types::{
    Real,
    parry3d::{
        bounding_volume::Aabb,
        query::{Ray, RayCast},
        shape::Triangle,
    },
    tolerance,
};
use crate::mesh::{bsp::Node, plane::Plane, polygon::Polygon, vertex::Vertex};
use crate::traits::CSGOps;
use nalgebra::{Matrix4, Point3, Vector3};
use std::{fmt::Debug, sync::OnceLock};
use tracing::debug;

pub mod bsp;
pub mod plane;
pub mod polygon;
pub mod polyhedron;
pub mod vertex;

/// A solid bounded by a flat list of planar polygons.
///
/// Boolean operations build transient BSP trees from copies of the operands'
/// polygons and harvest a fresh polygon list; a `Mesh` is never changed in place by them.
#[derive(Clone, Debug)]
pub struct Mesh<S: Clone + Debug> {
    /// 3D polygons bounding the solid, outward facing
    pub polygons: Vec<Polygon<S>>,

    /// Lazily calculated AABB that spans `polygons`.
    pub bounding_box: OnceLock<Aabb>,

    /// Metadata
    pub metadata: Option<S>,
}

impl<S: Clone + Debug> Mesh<S> {
    /// Build a Mesh from an existing polygon list
    pub fn from_polygons(polygons: &[Polygon<S>], metadata: Option<S>) -> Self {
        Mesh {
            polygons: polygons.to_vec(),
            bounding_box: OnceLock::new(),
            metadata,
        }
    }

    /// Wrap a harvested polygon list, carrying over this mesh's metadata.
    fn with_polygons(&self, polygons: Vec<Polygon<S>>) -> Self {
        Mesh {
            polygons,
            bounding_box: OnceLock::new(),
            metadata: self.metadata.clone(),
        }
    }

    /// Helper to collect all vertices from the mesh.
    pub fn vertices(&self) -> Vec<Vertex> {
        self.polygons
            .iter()
            .flat_map(|p| p.vertices.iter().copied())
            .collect()
    }

    /// Triangulate each polygon in the Mesh returning a Mesh containing triangles
    pub fn triangulate(&self) -> Mesh<S> {
        let triangles = self
            .polygons
            .iter()
            .flat_map(|poly| {
                poly.triangulate().into_iter().map(move |triangle| {
                    Polygon::with_plane(triangle.to_vec(), poly.plane, poly.metadata.clone())
                })
            })
            .collect::<Vec<_>>();

        self.with_polygons(triangles)
    }

    /// Renormalize all polygons by re-computing each polygon’s plane
    /// and assigning that plane’s normal to all vertices.
    pub fn renormalize(&mut self) {
        for poly in &mut self.polygons {
            poly.set_new_normal();
        }
    }

    /// Signed volume enclosed by the polygons, via the divergence theorem
    /// over triangle fans. Positive when the polygons face outward.
    pub fn signed_volume(&self) -> Real {
        self.polygons
            .iter()
            .map(|poly| {
                let p0 = poly.vertices[0].pos.coords;
                poly.vertices
                    .windows(2)
                    .skip(1)
                    .map(|w| p0.dot(&w[0].pos.coords.cross(&w[1].pos.coords)))
                    .sum::<Real>()
            })
            .sum::<Real>()
            / 6.0
    }

    /// Enclosed volume (absolute value of [`Mesh::signed_volume`]).
    pub fn volume(&self) -> Real {
        self.signed_volume().abs()
    }

    /// Total area of all polygons.
    pub fn surface_area(&self) -> Real {
        self.polygons.iter().map(Polygon::area).sum()
    }

    /// Casts a ray defined by `origin` + t * `direction` against all triangles
    /// of this mesh and returns a list of (intersection_point, distance),
    /// sorted by ascending distance. Hits closer together than the tolerance
    /// are reported once.
    pub fn ray_intersections(
        &self,
        origin: &Point3<Real>,
        direction: &Vector3<Real>,
    ) -> Vec<(Point3<Real>, Real)> {
        let ray = Ray::new(*origin, *direction);

        let mut hits: Vec<(Point3<Real>, Real)> = self
            .polygons
            .iter()
            .flat_map(|poly| poly.triangulate())
            .filter_map(|[a, b, c]| {
                let triangle = Triangle::new(a.pos, b.pos, c.pos);
                triangle
                    .cast_local_ray(&ray, Real::MAX, true)
                    .map(|toi| (ray.point_at(toi), toi))
            })
            .collect();

        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        let eps = tolerance();
        hits.dedup_by(|a, b| (a.1 - b.1).abs() < eps);

        hits
    }

    /// Ray-parity test: is `point` strictly inside the solid?
    ///
    /// Points on the boundary give an unspecified answer.
    pub fn contains_point(&self, point: &Point3<Real>) -> bool {
        // skewed direction, unlikely to graze edges of axis-aligned input
        let direction = Vector3::new(0.577_215_664_9, 0.693_147_180_6, 0.434_294_481_9);
        self.ray_intersections(point, &direction).len() % 2 == 1
    }
}

impl<S: Clone + Debug> CSGOps for Mesh<S> {
    /// Returns a new empty Mesh
    fn new() -> Self {
        Mesh {
            polygons: Vec::new(),
            bounding_box: OnceLock::new(),
            metadata: None,
        }
    }

    /// Return a new Mesh representing union of the two Meshes.
    ///
    /// ```text
    /// let c = a.union(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |       +----+
    ///     +----+--+    |       +----+       |
    ///          |   b   |            |   c   |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn union(&self, other: &Mesh<S>) -> Mesh<S> {
        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());

        let result = self.with_polygons(a.all_polygons());
        debug!(
            lhs = self.polygons.len(),
            rhs = other.polygons.len(),
            result = result.polygons.len(),
            "union"
        );
        result
    }

    /// Return a new Mesh representing the difference of the two Meshes.
    ///
    /// ```text
    /// let c = a.subtract(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   c   |
    ///     |    +--+----+   =   |    +--+
    ///     +----+--+    |       +----+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn subtract(&self, other: &Mesh<S>) -> Mesh<S> {
        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(&b.all_polygons());
        a.invert();

        let result = self.with_polygons(a.all_polygons());
        debug!(
            lhs = self.polygons.len(),
            rhs = other.polygons.len(),
            result = result.polygons.len(),
            "subtract"
        );
        result
    }

    /// Return a new Mesh representing intersection of the two Meshes.
    ///
    /// ```text
    /// let c = a.intersect(b);
    ///     +-------+
    ///     |       |
    ///     |   a   |
    ///     |    +--+----+   =   +--+
    ///     +----+--+    |       +--+
    ///          |   b   |
    ///          |       |
    ///          +-------+
    /// ```
    fn intersect(&self, other: &Mesh<S>) -> Mesh<S> {
        let mut a = Node::from_polygons(&self.polygons);
        let mut b = Node::from_polygons(&other.polygons);

        a.invert();
        b.clip_to(&a);
        b.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        a.build(&b.all_polygons());
        a.invert();

        let result = self.with_polygons(a.all_polygons());
        debug!(
            lhs = self.polygons.len(),
            rhs = other.polygons.len(),
            result = result.polygons.len(),
            "intersect"
        );
        result
    }

    /// Return a new Mesh representing space in this Mesh excluding the space in the
    /// other Mesh plus the space in the other Mesh excluding the space in this Mesh.
    ///
    /// ```text
    /// let c = a.xor(b);
    ///     +-------+            +-------+
    ///     |       |            |       |
    ///     |   a   |            |   a   |
    ///     |    +--+----+   =   |    +--+----+
    ///     +----+--+    |       +----+--+    |
    ///          |   b   |            |       |
    ///          |       |            |       |
    ///          +-------+            +-------+
    /// ```
    fn xor(&self, other: &Mesh<S>) -> Mesh<S> {
        let a_sub_b = self.subtract(other);
        let b_sub_a = other.subtract(self);
        a_sub_b.union(&b_sub_a)
    }

    /// Apply an arbitrary 3D transform (as a 4x4 matrix) to the mesh.
    ///
    /// Normals are carried by the inverse transpose when the matrix is
    /// invertible. A mirroring transform (negative determinant) would turn
    /// the solid inside out, so vertex order is reversed to keep faces outward.
    fn transform(&self, mat: &Matrix4<Real>) -> Mesh<S> {
        let normal_matrix = mat.try_inverse().map(|inv| inv.transpose());
        let mirrored = mat.fixed_view::<3, 3>(0, 0).into_owned().determinant() < 0.0;
        let mut mesh = self.clone();

        for poly in &mut mesh.polygons {
            for vert in &mut poly.vertices {
                vert.pos = mat.transform_point(&vert.pos);
                if let Some(ref nm) = normal_matrix {
                    let n = nm.transform_vector(&vert.normal);
                    vert.normal = n.try_normalize(Real::EPSILON).unwrap_or(n);
                }
            }
            if mirrored {
                poly.vertices.reverse();
            }

            // keep the cached plane consistent with the new vertex positions
            poly.plane = Plane::from_vertices(&poly.vertices);
            if normal_matrix.is_none() {
                for vert in &mut poly.vertices {
                    vert.normal = poly.plane.normal;
                }
            }
        }

        mesh.bounding_box = OnceLock::new();
        mesh
    }

    /// Returns a [`Aabb`] indicating the 3D bounds of all `polygons`.
    fn bounding_box(&self) -> Aabb {
        *self.bounding_box.get_or_init(|| {
            let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
            let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);

            for v in self.polygons.iter().flat_map(|p| p.vertices.iter()) {
                mins = mins.inf(&v.pos);
                maxs = maxs.sup(&v.pos);
            }

            // no polygons: a trivial AABB at origin
            if mins.x > maxs.x {
                return Aabb::new(Point3::origin(), Point3::origin());
            }
            Aabb::new(mins, maxs)
        })
    }

    /// Invalidates object's cached bounding box.
    fn invalidate_bounding_box(&mut self) {
        self.bounding_box = OnceLock::new();
    }

    /// Invert this Mesh (flip inside vs. outside)
    fn inverse(&self) -> Mesh<S> {
        self.with_polygons(self.polygons.iter().map(Polygon::flipped).collect())
    }
}
