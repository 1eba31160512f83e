//! # Keywell SCAD
//!
//! CSG scene-graph types and OpenSCAD emission.
//!
//! ## Architecture
//!
//! ```text
//! keywell-core (placement, walls, webs)
//!       ↓
//! Solid (CSG scene graph, this crate)
//!       ↓
//! writer::scad_source → .scad file → external renderer
//! ```
//!
//! The generator only ever *produces* this tree; evaluation into a mesh is
//! the external renderer's job.

pub mod solid;
pub mod writer;

pub use solid::Solid;
pub use writer::scad_source;
