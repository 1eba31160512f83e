//! # Curvature and Placement Transform
//!
//! Maps a (column, row) coordinate to a pose on the curved key surface.
//! The whole pipeline is composed into a single affine matrix, so the
//! "place a solid" and "compute a bare position" paths cannot drift
//! apart: both apply exactly the same composition.
//!
//! Step order (applied to the subject first to last):
//!
//! 1. per-key intrinsic rotation and early translation
//! 2. column placement — progressive pitch over rows
//! 3. row placement — progressive roll over columns, in the cluster's
//!    curvature style
//! 4. mid translation and rotation overrides
//! 5. base pitch/roll/yaw (tenting)
//! 6. cluster neutral-row height
//! 7. late translation and rotation overrides
//! 8. cluster origin (anchoring already resolved by the plan)

use config::constants::{KEYCAP_CLEARANCE, MOUNT_DEPTH, MOUNT_WIDTH};
use glam::{DMat4, DVec3};
use keywell_scad::Solid;

use crate::compass::KeyCoordinate;
use crate::error::{Error, Result};
use crate::plan::ClusterSite;
use crate::resolve::OptionResolver;

// =============================================================================
// CURVATURE STYLE
// =============================================================================

/// How a cluster spreads its columns laterally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurvatureStyle {
    /// Progressive curvature: columns swing on a shared radius.
    Standard,
    /// Flattened rows: columns rotate in place and shift by a closed-form
    /// displacement, staying near-parallel. Trades curvature smoothness
    /// for less inter-column collision.
    Orthographic,
    /// Literal per-column placement from configuration.
    Fixed,
}

impl CurvatureStyle {
    /// Read a cluster's style from the parameter document.
    pub fn from_params(params: &config::Params, cluster: &str) -> Result<Self> {
        let raw = params.get_str(&["clusters", cluster, "curvature"])?;
        match raw {
            "standard" => Ok(Self::Standard),
            "orthographic" => Ok(Self::Orthographic),
            "fixed" => Ok(Self::Fixed),
            other => Err(Error::UnknownCurvature {
                cluster: cluster.to_string(),
                value: other.to_string(),
            }),
        }
    }
}

// =============================================================================
// POSE PIPELINE
// =============================================================================

/// Swing a subject as if on the rim of a wheel: rotate about a center
/// offset −radius in z, then translate back up by +radius.
fn swing(rotation: DMat4, radius: f64) -> DMat4 {
    DMat4::from_translation(DVec3::new(0.0, 0.0, radius))
        * rotation
        * DMat4::from_translation(DVec3::new(0.0, 0.0, -radius))
}

/// Curvature radius for a progressive angle factor over a given mount
/// pitch. Only legal for a nonzero factor; the zero case takes the flat
/// branch and never computes a radius.
fn curvature_radius(pitch: f64, factor: f64) -> f64 {
    KEYCAP_CLEARANCE + (pitch / 2.0) / (factor.abs() / 2.0).sin()
}

/// Column placement: front-to-back row curvature (pitch axis).
fn put_in_column(resolver: &OptionResolver, coord: KeyCoordinate) -> Result<DMat4> {
    let factor = resolver.require_f64(coord, &["layout", "pitch", "progressive"])?;
    let neutral = resolver.require_i64(coord, &["layout", "matrix", "neutral", "row"])?;
    let separation =
        resolver.require_f64(coord, &["layout", "matrix", "separation", "row"])?;
    let pitch = MOUNT_DEPTH + separation;
    let delta = (coord.row as i64 - neutral) as f64;
    if factor == 0.0 {
        // Flat rows: pure translation, no rotation, no radius. The swing
        // below would divide by sin(0).
        return Ok(DMat4::from_translation(DVec3::new(0.0, pitch * delta, 0.0)));
    }
    let radius = curvature_radius(pitch, factor);
    let angle = factor * delta;
    Ok(swing(DMat4::from_rotation_x(angle), radius))
}

/// Row placement: lateral column curvature (roll axis), in the cluster's
/// configured style.
fn put_in_row(
    resolver: &OptionResolver,
    site: &ClusterSite,
    style: CurvatureStyle,
    coord: KeyCoordinate,
) -> Result<DMat4> {
    let factor = resolver.require_f64(coord, &["layout", "roll", "progressive"])?;
    let neutral = resolver.require_i64(coord, &["layout", "matrix", "neutral", "column"])?;
    let separation =
        resolver.require_f64(coord, &["layout", "matrix", "separation", "column"])?;
    let pitch = MOUNT_WIDTH + separation;
    let delta = (coord.column as i64 - neutral) as f64;

    match style {
        CurvatureStyle::Fixed => fixed_placement(resolver, site, coord),
        _ if factor == 0.0 => {
            // Same flat branch as the column step, on the other axis.
            Ok(DMat4::from_translation(DVec3::new(pitch * delta, 0.0, 0.0)))
        }
        CurvatureStyle::Standard => {
            let radius = curvature_radius(pitch, factor);
            let angle = -factor * delta;
            Ok(swing(DMat4::from_rotation_y(angle), radius))
        }
        CurvatureStyle::Orthographic => {
            // Rotate in place, then displace by the closed form the swing
            // would have produced at one column pitch, keeping columns
            // near-parallel.
            let radius = curvature_radius(pitch, factor);
            let angle = -factor * delta;
            let x = delta * (1.0 + radius * factor.abs().sin());
            let z = radius * (1.0 - angle.cos());
            Ok(DMat4::from_translation(DVec3::new(x, 0.0, z))
                * DMat4::from_rotation_y(angle))
        }
    }
}

/// Literal placement for the fixed curvature style: a per-column roll
/// angle and x/z displacement straight out of the document.
fn fixed_placement(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
) -> Result<DMat4> {
    let params = resolver.params();
    let cluster = &site.name;
    let entry = |table: &str| -> Result<f64> {
        let index = coord.column.to_string();
        let path = ["clusters", cluster.as_str(), "fixed", table, index.as_str()];
        params.lookup(&path).and_then(|v| v.as_f64()).ok_or_else(|| {
            Error::FixedPlacement {
                cluster: cluster.to_string(),
                column: coord.column,
            }
        })
    };
    let angle = entry("angles")?;
    let x = entry("x")?;
    let z = entry("z")?;
    Ok(DMat4::from_translation(DVec3::new(x, 0.0, z)) * DMat4::from_rotation_y(angle))
}

/// Rotation at one pipeline stage: the `intrinsic`, `mid`, `late`, or
/// `base` entry of each axis table, composed yaw-over-roll-over-pitch.
fn rotation_step(
    resolver: &OptionResolver,
    coord: KeyCoordinate,
    which: &str,
) -> Result<DMat4> {
    let pitch = resolver.require_f64(coord, &["layout", "pitch", which])?;
    let roll = resolver.require_f64(coord, &["layout", "roll", which])?;
    let yaw = resolver.require_f64(coord, &["layout", "yaw", which])?;
    Ok(DMat4::from_rotation_z(yaw)
        * DMat4::from_rotation_y(roll)
        * DMat4::from_rotation_x(pitch))
}

fn translation_step(
    resolver: &OptionResolver,
    coord: KeyCoordinate,
    which: &str,
) -> Result<DMat4> {
    let offset = resolver.require_vec3(coord, &["layout", "translation", which])?;
    Ok(DMat4::from_translation(DVec3::from_array(offset)))
}

/// Compose the full pose matrix for one key.
pub fn key_pose(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
) -> Result<DMat4> {
    let params = resolver.params();
    let style = CurvatureStyle::from_params(params, &site.name)?;
    let height = match params.lookup(&["clusters", &site.name, "height"]) {
        Some(_) => params.get_f64(&["clusters", &site.name, "height"])?,
        None => 0.0,
    };

    let m1 = translation_step(resolver, coord, "early")? * rotation_step(resolver, coord, "intrinsic")?;
    let m2 = put_in_column(resolver, coord)?;
    let m3 = put_in_row(resolver, site, style, coord)?;
    let m4 = translation_step(resolver, coord, "mid")? * rotation_step(resolver, coord, "mid")?;
    let m5 = rotation_step(resolver, coord, "base")?;
    let m6 = DMat4::from_translation(DVec3::new(0.0, 0.0, height));
    let m7 = translation_step(resolver, coord, "late")? * rotation_step(resolver, coord, "late")?;
    let m8 = DMat4::from_translation(site.origin);

    Ok(m8 * m7 * m6 * m5 * m4 * m3 * m2 * m1)
}

/// Reduce the pose to a bare position: the image of a local offset.
///
/// Guaranteed to agree with [`place_solid`] because both run the same
/// [`key_pose`] composition.
pub fn key_position(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
    local: DVec3,
) -> Result<DVec3> {
    Ok(key_pose(resolver, site, coord)?.transform_point3(local))
}

/// Place a solid at a key's pose.
pub fn place_solid(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
    solid: Solid,
) -> Result<Solid> {
    Ok(Solid::transformed(key_pose(resolver, site, coord)?, solid))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::KeyboardPlan;
    use approx::assert_abs_diff_eq;
    use config::constants::EPSILON_TOLERANCE;
    use config::Params;
    use serde_json::json;

    fn flat_params() -> Params {
        // Strip all curvature and tilt from the main cluster.
        Params::from_user(json!({
            "clusters": {
                "main": {
                    "height": 0.0,
                    "parameters": {
                        "layout": {
                            "pitch": {"progressive": 0.0, "base": 0.0},
                            "roll": {"progressive": 0.0, "base": 0.0}
                        }
                    }
                }
            }
        }))
    }

    #[test]
    fn test_placement_and_position_agree_on_the_origin() {
        let plan = KeyboardPlan::new(Params::defaults()).unwrap();
        for site in plan.sites() {
            let resolver = plan.resolver(&site.name).unwrap();
            for &coord in site.derived.coordinates() {
                let pose = key_pose(&resolver, site, coord).unwrap();
                let placed = pose.transform_point3(DVec3::ZERO);
                let reckoned = key_position(&resolver, site, coord, DVec3::ZERO).unwrap();
                assert_abs_diff_eq!(placed.x, reckoned.x, epsilon = EPSILON_TOLERANCE);
                assert_abs_diff_eq!(placed.y, reckoned.y, epsilon = EPSILON_TOLERANCE);
                assert_abs_diff_eq!(placed.z, reckoned.z, epsilon = EPSILON_TOLERANCE);
            }
        }
    }

    #[test]
    fn test_zero_angle_factor_is_pure_translation() {
        let plan = KeyboardPlan::new(flat_params()).unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let pose = key_pose(&resolver, site, KeyCoordinate::new(3, 1)).unwrap();
        let cols = pose.to_cols_array_2d();
        // Upper-left 3x3 must be exactly the identity: no rotation crept
        // in and no NaN from a degenerate radius.
        for (i, col) in cols.iter().enumerate().take(3) {
            for (j, value) in col.iter().enumerate().take(3) {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(*value, expected, epsilon = EPSILON_TOLERANCE);
            }
        }
        assert!(pose.is_finite());
    }

    #[test]
    fn test_flat_rows_space_by_mount_pitch() {
        let plan = KeyboardPlan::new(flat_params()).unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let home = key_position(&resolver, site, KeyCoordinate::new(2, 0), DVec3::ZERO).unwrap();
        let above = key_position(&resolver, site, KeyCoordinate::new(2, 1), DVec3::ZERO).unwrap();
        let separation = 0.5; // default row separation
        assert_abs_diff_eq!(
            above.y - home.y,
            config::constants::MOUNT_DEPTH + separation,
            epsilon = EPSILON_TOLERANCE
        );
        assert_abs_diff_eq!(above.z, home.z, epsilon = EPSILON_TOLERANCE);
    }

    #[test]
    fn test_mid_rotation_turns_the_placed_grid() {
        // A quarter-turn mid yaw swings the column spread from x onto y,
        // so it must compose after row placement.
        let quarter = std::f64::consts::FRAC_PI_2;
        let turned = Params::from_user(json!({
            "clusters": {
                "main": {
                    "height": 0.0,
                    "parameters": {
                        "layout": {
                            "pitch": {"progressive": 0.0, "base": 0.0},
                            "roll": {"progressive": 0.0, "base": 0.0},
                            "yaw": {"mid": quarter}
                        }
                    }
                }
            }
        }));
        let plan = KeyboardPlan::new(turned).unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let a = key_position(&resolver, site, KeyCoordinate::new(2, 0), DVec3::ZERO).unwrap();
        let b = key_position(&resolver, site, KeyCoordinate::new(3, 0), DVec3::ZERO).unwrap();
        let pitch = config::constants::MOUNT_WIDTH + 1.5;
        assert_abs_diff_eq!(b.x - a.x, 0.0, epsilon = EPSILON_TOLERANCE);
        assert_abs_diff_eq!(b.y - a.y, pitch, epsilon = EPSILON_TOLERANCE);
    }

    #[test]
    fn test_mid_rotation_composes_before_base_tilt() {
        // A base yaw undoing the mid yaw must restore the spread along x.
        // That only holds when the mid stage sits between row placement
        // and the base tilt.
        let quarter = std::f64::consts::FRAC_PI_2;
        let cancelled = Params::from_user(json!({
            "clusters": {
                "main": {
                    "height": 0.0,
                    "parameters": {
                        "layout": {
                            "pitch": {"progressive": 0.0, "base": 0.0},
                            "roll": {"progressive": 0.0, "base": 0.0},
                            "yaw": {"mid": quarter, "base": -quarter}
                        }
                    }
                }
            }
        }));
        let plan = KeyboardPlan::new(cancelled).unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let a = key_position(&resolver, site, KeyCoordinate::new(2, 0), DVec3::ZERO).unwrap();
        let b = key_position(&resolver, site, KeyCoordinate::new(3, 0), DVec3::ZERO).unwrap();
        let pitch = config::constants::MOUNT_WIDTH + 1.5;
        assert_abs_diff_eq!(b.x - a.x, pitch, epsilon = EPSILON_TOLERANCE);
        assert_abs_diff_eq!(b.y - a.y, 0.0, epsilon = EPSILON_TOLERANCE);
    }

    #[test]
    fn test_progressive_pitch_lifts_far_rows() {
        let plan = KeyboardPlan::new(Params::defaults()).unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let neutral =
            key_position(&resolver, site, KeyCoordinate::new(2, 0), DVec3::ZERO).unwrap();
        let above =
            key_position(&resolver, site, KeyCoordinate::new(2, 1), DVec3::ZERO).unwrap();
        let below =
            key_position(&resolver, site, KeyCoordinate::new(2, -1), DVec3::ZERO).unwrap();
        // The key well is concave: rows away from neutral climb.
        assert!(above.z > neutral.z);
        assert!(below.z > neutral.z);
        assert!(above.y > neutral.y);
        assert!(below.y < neutral.y);
    }

    #[test]
    fn test_standard_roll_spreads_columns() {
        let plan = KeyboardPlan::new(Params::defaults()).unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let mut last_x = f64::NEG_INFINITY;
        for column in 0..5 {
            let pos =
                key_position(&resolver, site, KeyCoordinate::new(column, 0), DVec3::ZERO)
                    .unwrap();
            assert!(pos.x > last_x, "column {column} did not advance in x");
            last_x = pos.x;
        }
    }

    #[test]
    fn test_orthographic_columns_share_forward_axis() {
        // With flattened rows, rotating in place must not fan the columns
        // out in y the way a pure swing would under yawless tenting.
        let plan = KeyboardPlan::new(Params::from_user(json!({
            "clusters": {
                "thumb": {
                    "parameters": {
                        "layout": {
                            "roll": {"progressive": 0.2},
                            "pitch": {"base": 0.0},
                            "yaw": {"base": 0.0}
                        }
                    }
                }
            }
        })))
        .unwrap();
        let site = plan.site("thumb").unwrap();
        let resolver = plan.resolver("thumb").unwrap();
        let a = key_position(&resolver, site, KeyCoordinate::new(0, 0), DVec3::ZERO).unwrap();
        let b = key_position(&resolver, site, KeyCoordinate::new(2, 0), DVec3::ZERO).unwrap();
        assert_abs_diff_eq!(a.y, b.y, epsilon = EPSILON_TOLERANCE);
        assert!(b.x > a.x);
    }

    #[test]
    fn test_fixed_style_requires_column_entries() {
        let plan = KeyboardPlan::new(Params::from_user(json!({
            "clusters": {
                "main": {"curvature": "fixed"},
                // Detach the thumb so plan derivation does not need a
                // main-cluster pose for its anchor.
                "thumb": {"anchoring": {"cluster": null, "alias": null}}
            }
        })))
        .unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let err = key_pose(&resolver, site, KeyCoordinate::new(0, 0)).unwrap_err();
        assert_eq!(
            err,
            Error::FixedPlacement {
                cluster: "main".to_string(),
                column: 0
            }
        );
    }

    #[test]
    fn test_fixed_style_reads_literal_placement() {
        let plan = KeyboardPlan::new(Params::from_user(json!({
            "clusters": {
                "main": {
                    "columns": 2,
                    "curvature": "fixed",
                    "height": 0.0,
                    "parameters": {
                        "layout": {
                            "pitch": {"progressive": 0.0, "base": 0.0},
                            "roll": {"base": 0.0}
                        }
                    },
                    "fixed": {
                        "angles": {"0": 0.0, "1": 0.0},
                        "x": {"0": 0.0, "1": 21.0},
                        "z": {"0": 0.0, "1": 2.5}
                    }
                }
            }
        })))
        .unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let b = key_position(&resolver, site, KeyCoordinate::new(1, 0), DVec3::ZERO).unwrap();
        assert_abs_diff_eq!(b.x, 21.0, epsilon = EPSILON_TOLERANCE);
        assert_abs_diff_eq!(b.z, 2.5, epsilon = EPSILON_TOLERANCE);
    }

    #[test]
    fn test_unknown_curvature_style() {
        let plan = KeyboardPlan::new(Params::from_user(json!({
            "clusters": {
                "main": {"curvature": "spherical"},
                "thumb": {"anchoring": {"cluster": null, "alias": null}}
            }
        })))
        .unwrap();
        let site = plan.site("main").unwrap();
        let resolver = plan.resolver("main").unwrap();
        let err = key_pose(&resolver, site, KeyCoordinate::new(0, 0)).unwrap_err();
        assert!(matches!(err, Error::UnknownCurvature { .. }));
    }
}
