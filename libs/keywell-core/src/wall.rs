//! # Case Wall
//!
//! Builds the case wall by walking the cluster perimeter and hulling
//! chains of corner posts downward and outward from the mount edge. The
//! wall cross-section is five segments: the mount-edge post, a bevel, the
//! outward reach, the outer face at full thickness, and a closing bevel.
//! A wall can be truncated after any segment via the per-side `extent`
//! option; a full-extent wall is additionally grounded to the floor with
//! a projected skirt hull per part, so the hem runs unbroken between
//! neighbouring post chains.

use config::constants::{
    CORNER_POST_MARGIN, MOUNT_DEPTH, MOUNT_THICKNESS, MOUNT_WIDTH, WALL_SEGMENT_COUNT,
};
use glam::DVec3;
use keywell_scad::Solid;
use serde_json::Value;

use crate::compass::{self, Corner, Direction, KeyCoordinate};
use crate::error::{Error, Result};
use crate::key;
use crate::place;
use crate::plan::ClusterSite;
use crate::resolve::OptionResolver;
use crate::trace::{self, BoundaryEdge, CornerKind};

/// Height of the thin floor pad hulled into a grounded wall.
const FLOOR_PAD_HEIGHT: f64 = 0.1;

// =============================================================================
// EXTENT
// =============================================================================

/// How far down the cross-section a wall runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallExtent {
    /// All segments, grounded to the floor.
    Full,
    /// Segments 0 through the given index, not grounded.
    To(u8),
}

impl WallExtent {
    /// Parse a resolved `wall.<side>.extent` value.
    pub fn from_value(value: &Value) -> Result<Self> {
        if value.as_str() == Some("full") {
            return Ok(Self::Full);
        }
        if let Some(n) = value.as_u64() {
            if n < u64::from(WALL_SEGMENT_COUNT) {
                return Ok(Self::To(n as u8));
            }
        }
        Err(Error::InvalidWallExtent {
            value: value.to_string(),
        })
    }

    /// Segment indices included by this extent.
    fn segments(self) -> std::ops::RangeInclusive<u8> {
        match self {
            Self::Full => 0..=WALL_SEGMENT_COUNT - 1,
            Self::To(last) => 0..=last,
        }
    }
}

// =============================================================================
// ANCHORS AND BRACES
// =============================================================================

/// One end of a wall part: a mount corner and the direction the wall is
/// pushed away from the mount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WallAnchor {
    /// Key the anchor hangs off.
    pub coord: KeyCoordinate,
    /// Mount corner the post chain starts at.
    pub corner: Corner,
    /// Outward push direction of the chain.
    pub push: Direction,
}

/// One wall part, classified by how the boundary runs at that point.
/// Each variant carries the pair of anchors its post chains hang off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WallPart {
    /// Wall along one mount's own boundary edge.
    StraightBody(WallAnchor, WallAnchor),
    /// Bridge from a mount to its boundary successor.
    StraightJoin(WallAnchor, WallAnchor),
    /// Convex bend around a mount corner.
    OuterCorner(WallAnchor, WallAnchor),
    /// Concave bend across the gap to a diagonal mount.
    InnerCorner(WallAnchor, WallAnchor),
}

impl WallPart {
    /// The part's two anchors.
    pub fn anchors(self) -> (WallAnchor, WallAnchor) {
        match self {
            Self::StraightBody(a, b)
            | Self::StraightJoin(a, b)
            | Self::OuterCorner(a, b)
            | Self::InnerCorner(a, b) => (a, b),
        }
    }
}

/// Expand one traced boundary edge into wall parts.
///
/// A straight edge yields the body along its own mount plus the join to
/// the next mount; corners yield the single part that bends the wall
/// around the mount corner (outer) or across the concave gap (inner).
fn parts_for(edge: BoundaryEdge) -> Vec<WallPart> {
    let BoundaryEdge {
        coord,
        facing: d,
        corner,
    } = edge;
    let side = d.turn_left();
    match corner {
        None => {
            let body = WallPart::StraightBody(
                WallAnchor {
                    coord,
                    corner: Corner(side, d.reverse()),
                    push: side,
                },
                WallAnchor {
                    coord,
                    corner: Corner(side, d),
                    push: side,
                },
            );
            let join = WallPart::StraightJoin(
                WallAnchor {
                    coord,
                    corner: Corner(side, d),
                    push: side,
                },
                WallAnchor {
                    coord: coord.step(d),
                    corner: Corner(side, d.reverse()),
                    push: side,
                },
            );
            vec![body, join]
        }
        Some(CornerKind::Outer) => {
            // After the right turn the empty side is the old facing.
            let corner = Corner(side, d);
            vec![WallPart::OuterCorner(
                WallAnchor {
                    coord,
                    corner,
                    push: side,
                },
                WallAnchor {
                    coord,
                    corner,
                    push: d,
                },
            )]
        }
        Some(CornerKind::Inner) => {
            let diagonal = coord.walk(&[d, side]);
            vec![WallPart::InnerCorner(
                WallAnchor {
                    coord,
                    corner: Corner(side, d),
                    push: side,
                },
                WallAnchor {
                    coord: diagonal,
                    corner: Corner(d.reverse(), d.turn_right()),
                    push: d.reverse(),
                },
            )]
        }
    }
}

// =============================================================================
// POST CHAINS
// =============================================================================

/// Local offset of a cross-section segment relative to the corner post.
///
/// Segments march outward along the push direction and downward: bevel,
/// reach, outer face, closing bevel.
fn segment_offset(
    push: Direction,
    segment: u8,
    thickness: f64,
    bevel: f64,
    reach: f64,
) -> DVec3 {
    let (dc, dr) = push.delta();
    let out = DVec3::new(f64::from(dc), f64::from(dr), 0.0);
    match segment {
        0 => DVec3::ZERO,
        1 => out * bevel + DVec3::new(0.0, 0.0, -bevel),
        2 => out * reach + DVec3::new(0.0, 0.0, -2.0 * bevel),
        3 => out * (reach + thickness) + DVec3::new(0.0, 0.0, -(2.0 * bevel + thickness)),
        _ => {
            out * (reach + thickness - bevel)
                + DVec3::new(0.0, 0.0, -(2.0 * bevel + thickness + bevel))
        }
    }
}

fn anchor_extent(resolver: &OptionResolver, anchor: WallAnchor) -> Result<WallExtent> {
    let value = resolver.require(anchor.coord, &["wall", anchor.push.key(), "extent"])?;
    WallExtent::from_value(&value)
}

/// Placed posts for the given segment range of an anchor's chain.
fn chain_posts(
    resolver: &OptionResolver,
    site: &ClusterSite,
    anchor: WallAnchor,
    segments: std::ops::RangeInclusive<u8>,
) -> Result<Vec<Solid>> {
    let thickness = resolver.require_f64(anchor.coord, &["wall", "thickness"])?;
    let bevel = resolver.require_f64(anchor.coord, &["wall", "bevel"])?;
    let reach = resolver.require_f64(anchor.coord, &["wall", "reach"])?;
    let base = compass::corner_offset(
        MOUNT_WIDTH,
        MOUNT_DEPTH,
        MOUNT_THICKNESS,
        MOUNT_THICKNESS,
        anchor.corner,
        CORNER_POST_MARGIN,
    );
    segments
        .map(|segment| {
            let offset = base + segment_offset(anchor.push, segment, thickness, bevel, reach);
            place::place_solid(
                resolver,
                site,
                anchor.coord,
                Solid::translate(offset, key::post()),
            )
        })
        .collect()
}

/// Skirt hull grounding one wall part to the floor: the lower chain
/// segments of its grounded anchors, hulled with a thin pad extruded
/// from their projection. Spanning both chains in one hull is what
/// closes the hem between neighbouring anchors down to z = 0.
fn floor_hull(skirt: Vec<Solid>) -> Solid {
    let pad = Solid::extrude(
        FLOOR_PAD_HEIGHT,
        Solid::projection(Solid::union(skirt.clone())),
    );
    let mut children = skirt;
    children.push(pad);
    Solid::hull(children)
}

// =============================================================================
// WALL ASSEMBLY
// =============================================================================

/// All wall parts of a cluster: one hull per brace, and for every brace
/// with full-extent anchors a floor hull spanning their lower chains.
pub fn wall_parts(resolver: &OptionResolver, site: &ClusterSite) -> Result<Vec<Solid>> {
    let Some(start) = trace::start_state(site.derived.coordinates()) else {
        return Ok(Vec::new());
    };
    let edges = trace::trace_between(|c| site.derived.populated(c), start, start)?;

    let mut parts = Vec::new();
    for edge in edges {
        for part in parts_for(edge) {
            let (a, b) = part.anchors();
            let mut posts = Vec::new();
            let mut grounded = Vec::new();
            for anchor in [a, b] {
                let extent = anchor_extent(resolver, anchor)?;
                posts.extend(chain_posts(resolver, site, anchor, extent.segments())?);
                if extent == WallExtent::Full {
                    grounded.extend(chain_posts(
                        resolver,
                        site,
                        anchor,
                        2..=WALL_SEGMENT_COUNT - 1,
                    )?);
                }
            }
            parts.push(Solid::hull(posts));
            if !grounded.is_empty() {
                parts.push(floor_hull(grounded));
            }
        }
    }
    Ok(parts)
}

/// The whole wall as one union.
pub fn cluster_wall(resolver: &OptionResolver, site: &ClusterSite) -> Result<Solid> {
    Ok(Solid::union(wall_parts(resolver, site)?))
}

/// Floor-level outline under the wall's outer face, as a closed 2D
/// polygon in trace order.
///
/// Each anchor contributes the xy image of its mount vertex pushed out
/// to the outer wall face. The lap runs clockwise, so the points come
/// out in polygon order; consecutive duplicates (shared anchors of
/// adjacent parts) are dropped.
pub fn bottom_outline(
    resolver: &OptionResolver,
    site: &ClusterSite,
) -> Result<Vec<[f64; 2]>> {
    let Some(start) = trace::start_state(site.derived.coordinates()) else {
        return Err(Error::DegenerateOutline {
            context: site.name.clone(),
            points: 0,
        });
    };
    let edges = trace::trace_between(|c| site.derived.populated(c), start, start)?;

    let mut points: Vec<[f64; 2]> = Vec::new();
    let mut push_point = |p: [f64; 2]| {
        let duplicate = points
            .last()
            .is_some_and(|last| (last[0] - p[0]).abs() < 1.0e-6 && (last[1] - p[1]).abs() < 1.0e-6);
        if !duplicate {
            points.push(p);
        }
    };
    for edge in edges {
        for part in parts_for(edge) {
            let (a, b) = part.anchors();
            for anchor in [a, b] {
                let thickness = resolver.require_f64(anchor.coord, &["wall", "thickness"])?;
                let reach = resolver.require_f64(anchor.coord, &["wall", "reach"])?;
                let (dc, dr) = anchor.push.delta();
                let out = (reach + thickness) * DVec3::new(f64::from(dc), f64::from(dr), 0.0);
                let local = compass::cube_vertex_offset(
                    MOUNT_WIDTH,
                    MOUNT_DEPTH,
                    MOUNT_THICKNESS,
                    anchor.corner,
                ) + out;
                let world = place::key_position(resolver, site, anchor.coord, local)?;
                push_point([world.x, world.y]);
            }
        }
    }
    // The lap's last anchor is the first one again.
    if points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return Err(Error::DegenerateOutline {
            context: site.name.clone(),
            points: points.len(),
        });
    }
    Ok(points)
}

// =============================================================================
// TESTS
// =============================================================================
