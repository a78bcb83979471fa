//! Procedural generation for stylized fish meshes: splines, the ring/extrude/pole
//! sculpting kernel, surface frames, and the body assembly pipeline.

pub mod fish_mesh;
pub mod mesh_builder;
pub mod mouth;
pub mod spline;
pub mod surface;
pub mod topology;

pub use fish_mesh::*;
pub use mesh_builder::*;
pub use mouth::*;
pub use spline::*;
pub use surface::*;
pub use topology::*;
