//! **Constructive Solid Geometry (CSG)** on polygon meshes,
//! built around Boolean operations (*union*, *subtract*, *intersect*, *xor*, *inverse*)
//! on sets of polygons stored in [BSP](mesh::bsp) trees.
//!
//! A solid is a [`Mesh`]: a flat list of outward-facing planar [`Polygon`]s.
//! Every Boolean operation clones both operands into transient BSP trees,
//! runs a fixed sequence of clip / invert / build passes, and returns a new
//! `Mesh`. Meshes are imported from and exported to face-vertex form through
//! [`Polyhedron`].
//!
//! ```
//! use bspcsg::{Mesh, Polyhedron, traits::CSGOps};
//!
//! let a: Mesh<()> = Mesh::from_polyhedron(&Polyhedron::cuboid([0.0; 3], [1.0; 3]), None);
//! let b: Mesh<()> = Mesh::from_polyhedron(&Polyhedron::cuboid([0.5; 3], [1.5; 3]), None);
//!
//! assert!((a.union(&b).volume() - 1.875).abs() < 1e-3);
//! assert!((a.subtract(&b).volume() - 0.875).abs() < 1e-3);
//! assert!((a.intersect(&b).volume() - 0.125).abs() < 1e-3);
//! ```
//!
//! # Features
//! #### Default
//! - **f64**: use f64 as Real
//! - **delaunay**: use `geo`s `spade` backend to triangulate polygons for export
//!
//! #### Optional
//! - **f32**: use f32 as Real, this conflicts with f64
//! - **earcut**: use `geo`s `earcutr` backend for triangulation

#![forbid(unsafe_code)]
#![deny(unused)]
#![warn(clippy::missing_const_for_fn, clippy::approx_constant, clippy::all)]

pub mod errors;
pub mod float_types;
pub mod mesh;
pub mod traits;

#[cfg(any(
    all(feature = "delaunay", feature = "earcut"),
    not(any(feature = "delaunay", feature = "earcut"))
))]
compile_error!("Either 'delaunay' or 'earcut' feature must be specified, but not both");

#[cfg(any(all(feature = "f64", feature = "f32"), not(any(feature = "f64", feature = "f32"))))]
compile_error!("Either 'f64' or 'f32' feature must be specified, but not both");

pub use errors::ValidationError;
pub use mesh::{
    Mesh,
    bsp::Node,
    plane::Plane,
    polygon::Polygon,
    polyhedron::{FaceVertexMesh, Polyhedron},
    vertex::Vertex,
};
pub use traits::CSGOps;
