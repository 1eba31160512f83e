//! # Key Mount Plate
//!
//! The plate solid around one switch: a slab with the switch hole cut
//! out and, optionally, a pair of retention nubs protruding into the
//! hole. Also home to the small corner posts the web and wall hulls are
//! built from.
//!
//! All solids here are in the key's local frame, centered on the mount,
//! with the plate spanning z in ±`MOUNT_THICKNESS`/2. Placement onto the
//! curved surface is the caller's business.

use config::constants::{
    CORNER_POST_MARGIN, CORNER_POST_SIZE, DEFAULT_SEGMENTS, MOUNT_DEPTH, MOUNT_THICKNESS,
    MOUNT_WIDTH,
};
use config::ParamError;
use glam::DVec3;
use keywell_scad::Solid;

use crate::compass::{self, Corner, KeyCoordinate};
use crate::error::Result;
use crate::place;
use crate::plan::ClusterSite;
use crate::resolve::OptionResolver;

/// Side length of the square switch hole, in mm. MX-style switches clip
/// into a 14 mm opening.
const KEYHOLE_SIZE: f64 = 14.0;

/// Radius of the retention nub cylinder, in mm.
const NUB_RADIUS: f64 = 1.0;

/// Length of the nub along the hole edge, in mm.
const NUB_LENGTH: f64 = 2.75;

/// How far the nub's backing block reaches into the plate wall, in mm.
const NUB_DEPTH: f64 = 1.5;

/// Footprint of a 1u keycap, in mm.
const CAP_SIZE: f64 = 18.25;

/// Keycap proxy height, in mm.
const CAP_HEIGHT: f64 = 8.0;

/// Gap between the plate top and the proxy's underside, covering stem
/// and travel, in mm.
const CAP_RISE: f64 = 6.0;

// =============================================================================
// PLATE
// =============================================================================

/// The mount plate for one key, honoring the resolved `plate.switch-nub`
/// option for that coordinate.
pub fn key_plate(resolver: &OptionResolver, coord: KeyCoordinate) -> Result<Solid> {
    let nub_value = resolver.require(coord, &["plate", "switch-nub"])?;
    let with_nub = nub_value.as_bool().ok_or_else(|| ParamError::TypeMismatch {
        path: "plate.switch-nub".to_string(),
        expected: "boolean",
        found: nub_value.to_string(),
    })?;

    let slab = Solid::cube(DVec3::new(MOUNT_WIDTH, MOUNT_DEPTH, MOUNT_THICKNESS));
    // Overshoot the cut in z so the hole faces are never coplanar with
    // the slab faces.
    let hole = Solid::cube(DVec3::new(
        KEYHOLE_SIZE,
        KEYHOLE_SIZE,
        MOUNT_THICKNESS + 2.0,
    ));
    let frame = Solid::difference(slab, vec![hole]);

    if with_nub {
        Ok(Solid::union(vec![frame, nub_pair()]))
    } else {
        Ok(frame)
    }
}

/// Plate for one key, placed at its pose on the curved surface.
pub fn placed_key_plate(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
) -> Result<Solid> {
    place::place_solid(resolver, site, coord, key_plate(resolver, coord)?)
}

/// Both retention nubs, one on each side wall of the hole.
fn nub_pair() -> Solid {
    let east = switch_nub();
    let west = Solid::mirror(DVec3::new(1.0, 0.0, 0.0), east.clone());
    Solid::union(vec![east, west])
}

/// One retention nub on the east wall: a horizontal half-cylinder
/// reaching into the hole, hulled with a backing block inside the wall.
fn switch_nub() -> Solid {
    let ridge = Solid::translate(
        DVec3::new(KEYHOLE_SIZE / 2.0, 0.0, -1.0),
        Solid::Rotate {
            angles: [90.0, 0.0, 0.0],
            child: Box::new(Solid::Cylinder {
                height: NUB_LENGTH,
                radius1: NUB_RADIUS,
                radius2: NUB_RADIUS,
                center: true,
                segments: DEFAULT_SEGMENTS,
            }),
        },
    );
    let backing = Solid::translate(
        DVec3::new((KEYHOLE_SIZE + NUB_DEPTH) / 2.0, 0.0, 0.0),
        Solid::cube(DVec3::new(NUB_DEPTH, NUB_LENGTH, MOUNT_THICKNESS)),
    );
    Solid::hull(vec![ridge, backing])
}

/// A cap-sized slab floating at rest height over the mount. Preview
/// models union these over the case to eyeball keycap clearance.
pub fn keycap_proxy() -> Solid {
    Solid::translate(
        DVec3::new(
            0.0,
            0.0,
            MOUNT_THICKNESS / 2.0 + CAP_RISE + CAP_HEIGHT / 2.0,
        ),
        Solid::cube(DVec3::new(CAP_SIZE, CAP_SIZE, CAP_HEIGHT)),
    )
}

// =============================================================================
// CORNER POSTS
// =============================================================================

/// The bare post solid hulled into webs and walls.
pub fn post() -> Solid {
    Solid::cube(DVec3::new(
        CORNER_POST_SIZE,
        CORNER_POST_SIZE,
        MOUNT_THICKNESS,
    ))
}

/// A post moved to one of the mount's corners, still in the local frame.
pub fn corner_post(corner: Corner) -> Solid {
    Solid::translate(
        compass::corner_offset(
            MOUNT_WIDTH,
            MOUNT_DEPTH,
            MOUNT_THICKNESS,
            MOUNT_THICKNESS,
            corner,
            CORNER_POST_MARGIN,
        ),
        post(),
    )
}

/// A corner post placed at a key's pose.
pub fn placed_corner_post(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
    corner: Corner,
) -> Result<Solid> {
    place::place_solid(resolver, site, coord, corner_post(corner))
}

// =============================================================================
// TESTS
// =============================================================================
