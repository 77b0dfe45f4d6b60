//! Test support library
//! Provides various helper functions & utilities for tests.
#![allow(dead_code)]

use bspcsg::{
    float_types::Real,
    mesh::{Mesh, polygon::Polygon, polyhedron::Polyhedron, vertex::Vertex},
};
use nalgebra::{Point3, Vector3};

/// Returns the approximate bounding box `[min_x, min_y, min_z, max_x, max_y, max_z]`
/// for a set of polygons.
pub fn bounding_box<S: Clone>(polygons: &[Polygon<S>]) -> [Real; 6] {
    let mut bb = [Real::MAX, Real::MAX, Real::MAX, Real::MIN, Real::MIN, Real::MIN];
    for v in polygons.iter().flat_map(|p| p.vertices.iter()) {
        let p = v.pos;
        bb[0] = bb[0].min(p.x);
        bb[1] = bb[1].min(p.y);
        bb[2] = bb[2].min(p.z);
        bb[3] = bb[3].max(p.x);
        bb[4] = bb[4].max(p.y);
        bb[5] = bb[5].max(p.z);
    }
    bb
}

/// Quick helper to compare floating-point results with an acceptable tolerance.
pub fn approx_eq(a: Real, b: Real, eps: Real) -> bool {
    (a - b).abs() < eps
}

/// Helper to make a simple Polygon in 3D with given vertices.
pub fn make_polygon_3d(points: &[[Real; 3]]) -> Polygon<()> {
    let verts = points
        .iter()
        .map(|p| Vertex::new(Point3::new(p[0], p[1], p[2]), Vector3::z()))
        .collect();
    Polygon::new(verts, None)
}

/// Horizontal triangle at height `z`, facing +Z.
pub fn triangle_at(z: Real) -> Polygon<()> {
    make_polygon_3d(&[[0.0, 0.0, z], [1.0, 0.0, z], [0.0, 1.0, z]])
}

/// Axis-aligned box mesh from `min` to `max`.
pub fn cuboid(min: [Real; 3], max: [Real; 3]) -> Mesh<()> {
    Mesh::from_polyhedron(&Polyhedron::cuboid(min, max), None)
}

/// Is `p` inside the closed box `[min, max]`, allowing `eps` slack?
pub fn in_box(p: &Point3<Real>, min: [Real; 3], max: [Real; 3], eps: Real) -> bool {
    (0..3).all(|i| p[i] >= min[i] - eps && p[i] <= max[i] + eps)
}
