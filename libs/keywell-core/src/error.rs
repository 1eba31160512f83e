//! # Core Errors
//!
//! Error types for cluster derivation, placement and tracing. The
//! generator favors failing fast with a coordinate or key path over
//! producing a plausible-looking but wrong model; a bad wall hull is hard
//! to spot visually and fatal to a print.

use thiserror::Error;

use crate::compass::Direction;

/// Convenience result alias for the core crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while deriving or generating geometry.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Error {
    /// Parameter document access failed.
    #[error(transparent)]
    Param(#[from] config::ParamError),

    /// Cluster anchoring forms a cycle instead of a tree.
    #[error("cluster anchoring cycle: {}", cycle.join(" -> "))]
    AnchorCycle {
        /// The clusters participating in the cycle, in dependency order.
        cycle: Vec<String>,
    },

    /// The perimeter tracer hit two diagonally-touching cells with both
    /// orthogonal neighbours empty. No wall can be drawn through such a
    /// pinch point.
    #[error(
        "checkered occupancy landscape at column {column}, row {row}, facing {facing}"
    )]
    CheckeredLandscape {
        /// Column of the tracer position when the pinch was found.
        column: i32,
        /// Row of the tracer position.
        row: i32,
        /// Facing direction of the tracer.
        facing: Direction,
    },

    /// The perimeter trace failed to return to its stop state.
    #[error("perimeter trace did not close within {limit} steps")]
    UnclosedPerimeter {
        /// Step limit that was exhausted.
        limit: usize,
    },

    /// An outline has too few points to enclose any area.
    #[error("outline for {context} degenerates to {points} point(s)")]
    DegenerateOutline {
        /// What the outline was being built for.
        context: String,
        /// Number of points actually collected.
        points: usize,
    },

    /// A named cluster does not exist in the parameter document.
    #[error("unknown cluster: {name}")]
    UnknownCluster {
        /// The missing cluster name.
        name: String,
    },

    /// A key alias referenced for anchoring does not exist.
    #[error("unknown key alias {alias:?} in cluster {cluster:?}")]
    UnknownAlias {
        /// The cluster searched.
        cluster: String,
        /// The missing alias.
        alias: String,
    },

    /// A wall extent value is neither `"full"` nor an integer 0–4.
    #[error("invalid wall extent {value} (expected \"full\" or 0-4)")]
    InvalidWallExtent {
        /// Raw offending value, rendered as JSON.
        value: String,
    },

    /// A cluster names a curvature style the generator does not know.
    #[error("unknown curvature style {value:?} for cluster {cluster:?}")]
    UnknownCurvature {
        /// The cluster carrying the bad style.
        cluster: String,
        /// Raw offending value.
        value: String,
    },

    /// Fixed-style placement is missing literal data for a column.
    #[error("cluster {cluster:?} uses fixed curvature but has no entry for column {column}")]
    FixedPlacement {
        /// The cluster using fixed placement.
        cluster: String,
        /// Column with no literal placement configured.
        column: i32,
    },
}
