//! Centralized geometry constants shared across the generator crates.
//!
//! Each public item documents its purpose so that downstream crates can
//! remain declarative and avoid scattering literals.

/// Numerical tolerance used for pose and position comparisons.
///
/// # Examples
/// ```
/// use config::constants::EPSILON_TOLERANCE;
/// assert!(EPSILON_TOLERANCE < 1.0e-6);
/// ```
pub const EPSILON_TOLERANCE: f64 = 1.0e-9;

/// Width (x) of the mounting plate around one key switch, in mm.
///
/// Slightly narrower than the 19.05 mm unit pitch so that neighbouring
/// mounts leave room for the web that joins them.
pub const MOUNT_WIDTH: f64 = 17.5;

/// Depth (y) of the mounting plate around one key switch, in mm.
pub const MOUNT_DEPTH: f64 = 17.5;

/// Thickness (z) of the key mounting plate, in mm.
pub const MOUNT_THICKNESS: f64 = 4.0;

/// Side length of the small post solids hulled together to form webs
/// and walls, in mm.
pub const CORNER_POST_SIZE: f64 = 1.2;

/// Margin pulled in from the mount edge when placing a corner post, so
/// the post sits inside the plate outline rather than flush with it.
pub const CORNER_POST_MARGIN: f64 = 1.2;

/// Clearance above the mounting plate reserved for keycap travel, in mm.
///
/// Added to the curvature radius so swung keys clear their neighbours at
/// full depression. Matches a medium-profile cap at rest.
pub const KEYCAP_CLEARANCE: f64 = 12.7;

/// Default tessellation segment count for cylinders and spheres emitted
/// into the scene graph.
pub const DEFAULT_SEGMENTS: u32 = 32;

/// Number of wall cross-section segments, indexed 0 through 4.
pub const WALL_SEGMENT_COUNT: u8 = 5;
