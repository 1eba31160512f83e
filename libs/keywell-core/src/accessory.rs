//! # Microcontroller Holder
//!
//! An open-topped tray for the controller board, anchored to a mount
//! corner of one of the key clusters. The tray is sized from the
//! configured board dimensions plus a slide-in margin, with a cable slot
//! cut through its north wall.

use config::constants::{MOUNT_DEPTH, MOUNT_THICKNESS, MOUNT_WIDTH};
use config::ParamError;
use glam::DVec3;
use keywell_scad::Solid;

use crate::compass::{self, Corner, Direction, KeyCoordinate};
use crate::error::Result;
use crate::place;
use crate::plan::KeyboardPlan;

/// Tray shell thickness, in mm.
const SHELL: f64 = 2.0;

/// Build the holder, or `None` when the document excludes it.
pub fn mcu_holder(plan: &KeyboardPlan) -> Result<Option<Solid>> {
    let params = plan.params();
    if !params.get_bool(&["mcu", "include"])? {
        return Ok(None);
    }
    let cluster = params.get_str(&["mcu", "anchoring", "cluster"])?.to_string();
    let coord = anchor_coordinate(params)?;
    let corner = anchor_corner(params)?;
    let offset = DVec3::from_array(params.get_vec3(&["mcu", "anchoring", "offset"])?);
    let size = DVec3::from_array(params.get_vec3(&["mcu", "size"])?);
    let margin = params.get_f64(&["mcu", "margin"])?;

    let site = plan.site(&cluster)?;
    let resolver = plan.resolver(&cluster)?;
    let local = compass::cube_vertex_offset(MOUNT_WIDTH, MOUNT_DEPTH, MOUNT_THICKNESS, corner);
    let anchor = place::key_position(&resolver, site, coord, local)?;

    Ok(Some(Solid::translate(anchor + offset, tray(size, margin))))
}

/// The tray solid, centered on the origin: an outer shell minus the
/// board cavity (open on top) minus the cable slot.
fn tray(size: DVec3, margin: f64) -> Solid {
    let cavity = DVec3::new(
        size.x + 2.0 * margin,
        size.y + 2.0 * margin,
        size.z + 2.0 * margin,
    );
    let outer = Solid::cube(DVec3::new(
        cavity.x + 2.0 * SHELL,
        cavity.y + 2.0 * SHELL,
        cavity.z + SHELL,
    ));
    // Translated up a full shell so the cut clears the top face and
    // leaves the bottom intact.
    let pocket = Solid::translate(
        DVec3::new(0.0, 0.0, SHELL),
        Solid::cube(DVec3::new(cavity.x, cavity.y, cavity.z + SHELL)),
    );
    let slot = Solid::translate(
        DVec3::new(0.0, (cavity.y + SHELL) / 2.0, SHELL),
        Solid::cube(DVec3::new(cavity.x / 2.0, SHELL + 1.0, cavity.z + SHELL)),
    );
    Solid::difference(outer, vec![pocket, slot])
}

fn anchor_coordinate(params: &config::Params) -> Result<KeyCoordinate> {
    let mismatch = |found: String| ParamError::TypeMismatch {
        path: "mcu.anchoring.coordinates".to_string(),
        expected: "array of 2 integers",
        found,
    };
    let value = params.get(&["mcu", "anchoring", "coordinates"])?;
    let pair = value
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| mismatch(value.to_string()))?;
    match (pair[0].as_i64(), pair[1].as_i64()) {
        (Some(column), Some(row)) => Ok(KeyCoordinate::new(column as i32, row as i32)),
        _ => Err(mismatch(value.to_string()).into()),
    }
}

fn anchor_corner(params: &config::Params) -> Result<Corner> {
    let mismatch = |found: String| ParamError::TypeMismatch {
        path: "mcu.anchoring.corner".to_string(),
        expected: "array of 2 direction names",
        found,
    };
    let value = params.get(&["mcu", "anchoring", "corner"])?;
    let pair = value
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| mismatch(value.to_string()))?;
    let side = |item: &serde_json::Value| -> Option<Direction> {
        item.as_str().and_then(Direction::from_key)
    };
    match (side(&pair[0]), side(&pair[1])) {
        (Some(a), Some(b)) => Ok(Corner(a, b)),
        _ => Err(mismatch(value.to_string()).into()),
    }
}

// =============================================================================
// TESTS
// =============================================================================
