//! Face-vertex meshes and conversion to and from polygon soup.
//!
//! A [`Polyhedron`] stores shared points and faces as index loops. Importing
//! one into a [`Mesh`] gives one flat-shaded polygon per face; exporting welds
//! coincident vertices back together.

use crate::errors::ValidationError;
use crate::float_types::{Real, parry3d::bounding_volume::Aabb, tolerance};
use crate::mesh::{
    Mesh,
    plane::Plane,
    polygon::{Polygon, build_orthonormal_basis},
    vertex::Vertex,
};
use hashbrown::{HashMap, HashSet};
use nalgebra::{Point3, Vector3};
use std::fmt::Debug;
use tracing::warn;

/// Read access to a mesh stored as faces over ordered vertex loops.
pub trait FaceVertexMesh {
    /// Number of distinct points the faces index into
    fn point_count(&self) -> usize;
    /// Number of faces
    fn face_count(&self) -> usize;
    /// Positions of face `index`, in winding order
    fn face_vertices(&self, index: usize) -> Vec<Point3<Real>>;
}

/// A polyhedron as shared points plus faces of point indices.
///
/// Faces are wound counter-clockwise when seen from outside. Every face
/// index is checked against `points` on construction.
#[derive(Debug, Clone, PartialEq)]
pub struct Polyhedron {
    points: Vec<Point3<Real>>,
    faces: Vec<Vec<usize>>,
}

impl Polyhedron {
    /// Create a polyhedron, checking that every face index refers to a point
    /// and every point is finite.
    pub fn new(points: Vec<Point3<Real>>, faces: Vec<Vec<usize>>) -> Result<Self, ValidationError> {
        if let Some(bad) = points.iter().find(|p| !p.coords.iter().all(|c| c.is_finite())) {
            return Err(ValidationError::InvalidCoordinate(*bad));
        }
        for &index in faces.iter().flatten() {
            if index >= points.len() {
                return Err(ValidationError::IndexOutOfRange {
                    index,
                    len: points.len(),
                });
            }
        }
        Ok(Polyhedron { points, faces })
    }

    /// Convenience constructor from raw coordinate arrays.
    ///
    /// ```
    /// # use bspcsg::Polyhedron;
    /// let pts = &[
    ///     [0.0, 0.0, 0.0],
    ///     [1.0, 0.0, 0.0],
    ///     [1.0, 1.0, 0.0],
    ///     [0.0, 1.0, 0.0],
    ///     [0.5, 0.5, 1.0], // apex
    /// ];
    /// let fcs: &[&[usize]] = &[&[0, 3, 2, 1], &[0, 1, 4], &[1, 2, 4], &[2, 3, 4], &[3, 0, 4]];
    ///
    /// let pyramid = Polyhedron::from_arrays(pts, fcs).unwrap();
    /// assert!((pyramid.volume() - 1.0 / 3.0).abs() < 1e-9);
    /// ```
    pub fn from_arrays(points: &[[Real; 3]], faces: &[&[usize]]) -> Result<Self, ValidationError> {
        Self::new(
            points.iter().map(|&[x, y, z]| Point3::new(x, y, z)).collect(),
            faces.iter().map(|f| f.to_vec()).collect(),
        )
    }

    pub fn points(&self) -> &[Point3<Real>] {
        &self.points
    }

    pub fn faces(&self) -> &[Vec<usize>] {
        &self.faces
    }

    /// Number of distinct undirected edges over all face loops.
    pub fn edge_count(&self) -> usize {
        let mut edges = HashSet::new();
        for face in &self.faces {
            for (i, &a) in face.iter().enumerate() {
                let b = face[(i + 1) % face.len()];
                edges.insert((a.min(b), a.max(b)));
            }
        }
        edges.len()
    }

    /// Does `V - E + F == 2` hold, as for any closed genus-0 surface?
    pub fn is_valid_euler(&self) -> bool {
        self.points.len() as i64 - self.edge_count() as i64 + self.faces.len() as i64 == 2
    }

    /// Point furthest along `direction`; the first one wins ties.
    /// `None` for a polyhedron without points.
    pub fn support_point(&self, direction: &Vector3<Real>) -> Option<Point3<Real>> {
        let mut points = self.points.iter();
        let first = points.next()?;
        let mut best = (*first, first.coords.dot(direction));
        for p in points {
            let d = p.coords.dot(direction);
            if d > best.1 {
                best = (*p, d);
            }
        }
        Some(best.0)
    }

    /// Axis-aligned bounds of the points, a trivial box at the origin when empty.
    pub fn bounding_box(&self) -> Aabb {
        if self.points.is_empty() {
            return Aabb::new(Point3::origin(), Point3::origin());
        }
        let mut mins = Point3::new(Real::MAX, Real::MAX, Real::MAX);
        let mut maxs = Point3::new(-Real::MAX, -Real::MAX, -Real::MAX);
        for p in &self.points {
            mins = mins.inf(p);
            maxs = maxs.sup(p);
        }
        Aabb::new(mins, maxs)
    }

    /// Signed volume by the divergence theorem; positive for outward faces.
    pub fn signed_volume(&self) -> Real {
        let mut total = 0.0;
        for face in self.faces.iter().filter(|f| f.len() >= 3) {
            let p0 = self.points[face[0]].coords;
            for w in face[1..].windows(2) {
                let p1 = self.points[w[0]].coords;
                let p2 = self.points[w[1]].coords;
                total += p0.dot(&p1.cross(&p2));
            }
        }
        total / 6.0
    }

    /// Enclosed volume, regardless of face orientation.
    pub fn volume(&self) -> Real {
        self.signed_volume().abs()
    }

    /// Sum of the face areas (fan triangulation, so faces must be planar).
    pub fn surface_area(&self) -> Real {
        self.faces
            .iter()
            .filter(|f| f.len() >= 3)
            .map(|face| {
                let p0 = self.points[face[0]];
                let twice = face[1..].windows(2).fold(Vector3::zeros(), |acc, w| {
                    acc + (self.points[w[0]] - p0).cross(&(self.points[w[1]] - p0))
                });
                0.5 * twice.norm()
            })
            .sum()
    }

    /// Mean of all points.
    pub fn centroid(&self) -> Point3<Real> {
        let sum = self.points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
        Point3::from(sum / self.points.len().max(1) as Real)
    }

    /// Axis-aligned box spanning `min` to `max`.
    pub fn cuboid(min: [Real; 3], max: [Real; 3]) -> Self {
        let [x0, y0, z0] = min;
        let [x1, y1, z1] = max;
        let points = vec![
            Point3::new(x0, y0, z0),
            Point3::new(x1, y0, z0),
            Point3::new(x1, y1, z0),
            Point3::new(x0, y1, z0),
            Point3::new(x0, y0, z1),
            Point3::new(x1, y0, z1),
            Point3::new(x1, y1, z1),
            Point3::new(x0, y1, z1),
        ];
        let faces = vec![
            vec![0, 3, 2, 1], // -z
            vec![4, 5, 6, 7], // +z
            vec![0, 1, 5, 4], // -y
            vec![3, 7, 6, 2], // +y
            vec![0, 4, 7, 3], // -x
            vec![1, 2, 6, 5], // +x
        ];
        Polyhedron { points, faces }
    }

    /// Cube with unit edge length centered at the origin.
    pub fn cube() -> Self {
        Self::cuboid([-0.5; 3], [0.5; 3])
    }

    /// Regular tetrahedron with edge length 2 centered at the origin.
    pub fn tetrahedron() -> Self {
        let s = 1.0 / (2.0 as Real).sqrt();
        Self::convex(
            vec![
                Point3::new(1.0, 0.0, -s),
                Point3::new(-1.0, 0.0, -s),
                Point3::new(0.0, 1.0, s),
                Point3::new(0.0, -1.0, s),
            ],
            vec![vec![0, 1, 2], vec![0, 3, 1], vec![0, 2, 3], vec![1, 3, 2]],
        )
    }

    /// Regular octahedron with unit edge length centered at the origin.
    pub fn octahedron() -> Self {
        let s = 1.0 / (2.0 as Real).sqrt();
        Self::convex(
            vec![
                Point3::new(s, 0.0, 0.0),
                Point3::new(-s, 0.0, 0.0),
                Point3::new(0.0, s, 0.0),
                Point3::new(0.0, -s, 0.0),
                Point3::new(0.0, 0.0, s),
                Point3::new(0.0, 0.0, -s),
            ],
            vec![
                vec![0, 2, 4],
                vec![2, 1, 4],
                vec![1, 3, 4],
                vec![3, 0, 4],
                vec![2, 0, 5],
                vec![1, 2, 5],
                vec![3, 1, 5],
                vec![0, 3, 5],
            ],
        )
    }

    /// Regular icosahedron with edge length 2 centered at the origin.
    pub fn icosahedron() -> Self {
        let phi = (1.0 + (5.0 as Real).sqrt()) / 2.0;
        let points = vec![
            Point3::new(0.0, 1.0, phi),
            Point3::new(0.0, -1.0, phi),
            Point3::new(0.0, 1.0, -phi),
            Point3::new(0.0, -1.0, -phi),
            Point3::new(1.0, phi, 0.0),
            Point3::new(-1.0, phi, 0.0),
            Point3::new(1.0, -phi, 0.0),
            Point3::new(-1.0, -phi, 0.0),
            Point3::new(phi, 0.0, 1.0),
            Point3::new(-phi, 0.0, 1.0),
            Point3::new(phi, 0.0, -1.0),
            Point3::new(-phi, 0.0, -1.0),
        ];
        let faces: [[usize; 3]; 20] = [
            [0, 1, 8], [0, 8, 4], [0, 4, 5], [0, 5, 9], [0, 9, 1],
            [1, 6, 8], [8, 6, 10], [8, 10, 4], [4, 10, 2], [4, 2, 5],
            [5, 2, 11], [5, 11, 9], [9, 11, 7], [9, 7, 1], [1, 7, 6],
            [3, 6, 7], [3, 7, 11], [3, 11, 2], [3, 2, 10], [3, 10, 6],
        ];
        Self::convex(points, faces.iter().map(|f| f.to_vec()).collect())
    }

    /// Regular dodecahedron, the dual of [`Polyhedron::icosahedron`]: one point
    /// per icosahedron face centroid, one pentagon around each of its corners.
    pub fn dodecahedron() -> Self {
        let ico = Self::icosahedron();
        let points: Vec<Point3<Real>> = ico
            .faces
            .iter()
            .map(|face| {
                let sum = face.iter().fold(Vector3::zeros(), |acc, &i| acc + ico.points[i].coords);
                Point3::from(sum / face.len() as Real)
            })
            .collect();

        let faces = ico
            .points
            .iter()
            .enumerate()
            .map(|(corner, apex)| {
                let (u, v) = build_orthonormal_basis(apex.coords);
                let angle = |i: usize| {
                    let d = points[i] - *apex;
                    d.dot(&v).atan2(d.dot(&u))
                };
                // u × v points outward, so ascending angle is counter-clockwise from outside
                let mut ring: Vec<usize> = ico
                    .faces
                    .iter()
                    .enumerate()
                    .filter(|(_, face)| face.contains(&corner))
                    .map(|(i, _)| i)
                    .collect();
                ring.sort_by(|&a, &b| angle(a).total_cmp(&angle(b)));
                ring
            })
            .collect();

        Self::convex(points, faces)
    }

    /// Build a convex solid, re-winding any face whose normal points back
    /// toward the centroid.
    fn convex(points: Vec<Point3<Real>>, mut faces: Vec<Vec<usize>>) -> Self {
        let center = {
            let sum = points.iter().fold(Vector3::zeros(), |acc, p| acc + p.coords);
            Point3::from(sum / points.len() as Real)
        };
        for face in &mut faces {
            let plane = Plane::from_points(points[face[0]], points[face[1]], points[face[2]]);
            if plane.distance(&center) > 0.0 {
                face.reverse();
            }
        }
        Polyhedron { points, faces }
    }
}

impl FaceVertexMesh for Polyhedron {
    fn point_count(&self) -> usize {
        self.points.len()
    }

    fn face_count(&self) -> usize {
        self.faces.len()
    }

    fn face_vertices(&self, index: usize) -> Vec<Point3<Real>> {
        self.faces[index].iter().map(|&i| self.points[i]).collect()
    }
}

/// Welds positions that agree within a tolerance on every axis.
///
/// Points are bucketed on a grid whose cell size is the tolerance, so a match
/// can only sit in the 27 cells around a query. Among matches the earliest
/// inserted point wins, exactly as a front-to-back linear scan would pick.
struct VertexWelder {
    tolerance: Real,
    cells: HashMap<[i64; 3], Vec<usize>>,
    points: Vec<Point3<Real>>,
}

impl VertexWelder {
    fn new(tolerance: Real) -> Self {
        VertexWelder {
            tolerance,
            cells: HashMap::new(),
            points: Vec::new(),
        }
    }

    fn cell(&self, p: &Point3<Real>) -> [i64; 3] {
        [
            (p.x / self.tolerance).floor() as i64,
            (p.y / self.tolerance).floor() as i64,
            (p.z / self.tolerance).floor() as i64,
        ]
    }

    fn is_close(&self, a: &Point3<Real>, b: &Point3<Real>) -> bool {
        (a - b).iter().all(|d| d.abs() <= self.tolerance)
    }

    /// Index of the welded point for `p`, inserting it if new.
    fn insert(&mut self, p: Point3<Real>) -> usize {
        let [cx, cy, cz] = self.cell(&p);
        let mut found: Option<usize> = None;
        for dx in -1..=1 {
            for dy in -1..=1 {
                for dz in -1..=1 {
                    let Some(bucket) = self.cells.get(&[cx + dx, cy + dy, cz + dz]) else {
                        continue;
                    };
                    for &i in bucket {
                        if self.is_close(&self.points[i], &p) {
                            found = Some(found.map_or(i, |f| f.min(i)));
                        }
                    }
                }
            }
        }
        if let Some(i) = found {
            return i;
        }

        let index = self.points.len();
        self.points.push(p);
        self.cells.entry([cx, cy, cz]).or_default().push(index);
        index
    }
}

impl<S: Clone + Debug> Mesh<S> {
    /// Import a face-vertex mesh: one flat-shaded polygon per face.
    ///
    /// Faces with fewer than three vertices are skipped, and a source with
    /// fewer than three points yields an empty mesh.
    pub fn from_polyhedron<M: FaceVertexMesh>(source: &M, metadata: Option<S>) -> Mesh<S> {
        if source.point_count() < 3 {
            return Mesh::from_polygons(&[], metadata);
        }

        let mut skipped = 0usize;
        let mut polygons = Vec::with_capacity(source.face_count());
        for face in 0..source.face_count() {
            let positions = source.face_vertices(face);
            if positions.len() < 3 {
                skipped += 1;
                continue;
            }

            let vertices = positions
                .into_iter()
                .map(|pos| Vertex::new(pos, Vector3::zeros()))
                .collect();
            // flat shading: every vertex takes the polygon's own plane normal
            let mut polygon = Polygon::new(vertices, metadata.clone());
            for v in &mut polygon.vertices {
                v.normal = polygon.plane.normal;
            }
            polygons.push(polygon);
        }

        if skipped > 0 {
            warn!(skipped, "skipped faces with fewer than 3 vertices");
        }

        Mesh {
            polygons,
            bounding_box: Default::default(),
            metadata,
        }
    }

    /// Export as a face-vertex mesh, welding vertices within the tolerance.
    ///
    /// Repeated consecutive indices left by welding are collapsed, and faces
    /// that fall below three distinct indices are dropped.
    pub fn to_polyhedron(&self) -> Polyhedron {
        let mut welder = VertexWelder::new(tolerance());
        let mut faces = Vec::with_capacity(self.polygons.len());

        for poly in &self.polygons {
            let mut face: Vec<usize> = poly.vertices.iter().map(|v| welder.insert(v.pos)).collect();
            face.dedup();
            while face.len() > 1 && face.first() == face.last() {
                face.pop();
            }
            if face.len() >= 3 {
                faces.push(face);
            }
        }

        Polyhedron {
            points: welder.points,
            faces,
        }
    }

    /// Triangulate every polygon, then export as in [`Mesh::to_polyhedron`].
    pub fn to_triangle_polyhedron(&self) -> Polyhedron {
        self.triangulate().to_polyhedron()
    }
}

#[cfg(test)]
mod tests {
    use super::VertexWelder;
    use crate::float_types::Real;
    use nalgebra::Point3;

    #[test]
    fn welder_matches_linear_scan() {
        let tol: Real = 1e-5;
        let mut welder = VertexWelder::new(tol);
        let mut naive: Vec<Point3<Real>> = Vec::new();

        // points packed a fraction of the tolerance apart, straddling cell borders
        let mut seed: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = || {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((seed >> 33) % 16) as Real * 0.4 * tol - 3.0 * tol
        };

        for _ in 0..2000 {
            let p = Point3::new(next(), next(), next());
            let expected = match naive
                .iter()
                .position(|q| (q - p).iter().all(|d| d.abs() <= tol))
            {
                Some(i) => i,
                None => {
                    naive.push(p);
                    naive.len() - 1
                },
            };
            assert_eq!(welder.insert(p), expected);
        }
        assert_eq!(welder.points, naive);
    }
}
