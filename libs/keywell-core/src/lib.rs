//! # Keywell Core
//!
//! The placement and wall-generation engine for a split, curved keyboard
//! case. Everything here is a pure function of the immutable parameter
//! document: derived cluster properties are computed once, and placement,
//! tracing, and wall/web construction for different clusters or output
//! models share no mutable state, so whole models can be built in
//! parallel.
//!
//! ## Pipeline
//!
//! ```text
//! Params → KeyboardPlan (derived clusters, anchoring order)
//!        → key poses (place.rs)
//!        → perimeter trace (trace.rs)
//!        → web + wall solids (web.rs, wall.rs)
//!        → whole-case scene graph (body.rs, models.rs)
//! ```

pub mod accessory;
pub mod body;
pub mod cluster;
pub mod compass;
pub mod error;
pub mod key;
pub mod models;
pub mod place;
pub mod plan;
pub mod resolve;
pub mod trace;
pub mod wall;
pub mod web;

pub use cluster::{ClusterSpec, DerivedCluster};
pub use compass::{Corner, Direction, KeyCoordinate};
pub use error::{Error, Result};
pub use models::{build_models, Model};
pub use plan::KeyboardPlan;
