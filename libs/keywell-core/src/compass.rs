//! # Compass and Matrix Utilities
//!
//! Cardinal direction arithmetic on the key matrix, coordinate walking,
//! and corner-offset reckoning for the roughly-square key mounts. These
//! are the primitives every higher layer (placement, tracing, walls,
//! bottom plate) is phrased in.

use std::f64::consts::FRAC_PI_2;
use std::fmt;

use glam::DVec3;
use serde::{Deserialize, Serialize};

// =============================================================================
// DIRECTION
// =============================================================================

/// A cardinal direction on the key matrix, cyclically ordered.
///
/// Columns increase eastward, rows increase northward (away from the
/// typist).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Away from the typist; +row.
    North,
    /// To the typist's right; +column.
    East,
    /// Toward the typist; −row.
    South,
    /// To the typist's left; −column.
    West,
}

impl Direction {
    /// All four directions in clockwise order.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// One step counterclockwise on the ring.
    pub fn turn_left(self) -> Self {
        match self {
            Self::North => Self::West,
            Self::West => Self::South,
            Self::South => Self::East,
            Self::East => Self::North,
        }
    }

    /// One step clockwise on the ring.
    pub fn turn_right(self) -> Self {
        match self {
            Self::North => Self::East,
            Self::East => Self::South,
            Self::South => Self::West,
            Self::West => Self::North,
        }
    }

    /// The opposite direction.
    pub fn reverse(self) -> Self {
        self.turn_right().turn_right()
    }

    /// Unit grid delta as (d-column, d-row).
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, 1),
            Self::East => (1, 0),
            Self::South => (0, -1),
            Self::West => (-1, 0),
        }
    }

    /// Rotation angle of the direction, north = 0, east = π/2.
    pub fn angle(self) -> f64 {
        match self {
            Self::North => 0.0,
            Self::East => FRAC_PI_2,
            Self::South => FRAC_PI_2 * 2.0,
            Self::West => -FRAC_PI_2,
        }
    }

    /// Lowercase name used as a parameter document key.
    pub fn key(self) -> &'static str {
        match self {
            Self::North => "north",
            Self::East => "east",
            Self::South => "south",
            Self::West => "west",
        }
    }

    /// Parse a parameter document key.
    pub fn from_key(name: &str) -> Option<Self> {
        match name {
            "north" => Some(Self::North),
            "east" => Some(Self::East),
            "south" => Some(Self::South),
            "west" => Some(Self::West),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// =============================================================================
// KEY COORDINATE
// =============================================================================

/// One key position in a cluster's matrix: (column, row).
///
/// Row 0 is the home row; positive rows are above (away from the typist),
/// negative rows below.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct KeyCoordinate {
    /// Column index, increasing eastward.
    pub column: i32,
    /// Row index, increasing northward.
    pub row: i32,
}

impl KeyCoordinate {
    /// Build a coordinate.
    pub fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// One step in a direction.
    pub fn step(self, direction: Direction) -> Self {
        let (dc, dr) = direction.delta();
        Self {
            column: self.column + dc,
            row: self.row + dr,
        }
    }

    /// Apply each direction's delta in sequence. With no directions this
    /// returns the coordinate unchanged.
    pub fn walk(self, directions: &[Direction]) -> Self {
        directions.iter().fold(self, |acc, d| acc.step(*d))
    }

    /// Document key of the form `"column,row"` used in `by-key` scopes.
    pub fn document_key(&self) -> String {
        format!("{},{}", self.column, self.row)
    }
}

impl fmt::Display for KeyCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

// =============================================================================
// CORNER
// =============================================================================

/// One of the 8 named corners of a mount, as an ordered pair of sides:
/// `Corner(North, East)` reads "north by northeast".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Corner(pub Direction, pub Direction);

impl Corner {
    /// Sign of the corner on the x axis: +1 east, −1 west, 0 if neither
    /// component names an east/west side.
    ///
    /// When both components sit on the same axis ("north, north"
    /// shorthand), the first matching component wins and the rest are
    /// fallbacks; well-formed corner pairs never error here.
    pub fn x_sign(&self) -> f64 {
        for side in [self.0, self.1] {
            match side {
                Direction::East => return 1.0,
                Direction::West => return -1.0,
                _ => {}
            }
        }
        0.0
    }

    /// Sign of the corner on the y axis: +1 north, −1 south, 0 otherwise.
    pub fn y_sign(&self) -> f64 {
        for side in [self.0, self.1] {
            match side {
                Direction::North => return 1.0,
                Direction::South => return -1.0,
                _ => {}
            }
        }
        0.0
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.0, self.1)
    }
}

// =============================================================================
// OFFSETS
// =============================================================================

/// Offset from mount center to the center of a corner post.
///
/// The post is pulled in from the mount edge by half the margin so it
/// sits inside the plate outline. The z component places the post's
/// vertical center so its top is flush with the top of the mount area
/// and does not depend on the corner.
pub fn corner_offset(
    mount_width: f64,
    mount_depth: f64,
    post_height: f64,
    area_thickness: f64,
    corner: Corner,
    margin: f64,
) -> DVec3 {
    DVec3::new(
        corner.x_sign() * (mount_width / 2.0 - margin / 2.0),
        corner.y_sign() * (mount_depth / 2.0 - margin / 2.0),
        (area_thickness - post_height) / 2.0,
    )
}

/// Offset from mount center to an exact vertex of the mount slab.
///
/// Unlike [`corner_offset`] there is no margin: this is for exact
/// reckoning (bottom-plate polygon vertices), not for placing a solid.
pub fn cube_vertex_offset(
    mount_width: f64,
    mount_depth: f64,
    thickness: f64,
    corner: Corner,
) -> DVec3 {
    DVec3::new(
        corner.x_sign() * mount_width / 2.0,
        corner.y_sign() * mount_depth / 2.0,
        -thickness / 2.0,
    )
}

// =============================================================================
// TESTS
// =============================================================================
