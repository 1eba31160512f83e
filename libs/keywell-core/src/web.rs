//! # Web Between Mounts
//!
//! The connective tissue of a cluster: convex hulls of corner posts
//! spanning the gaps between neighbouring key mounts. Each populated key
//! looks north, east, and northeast only, so every gap is filled exactly
//! once over the whole matrix.

use keywell_scad::Solid;

use crate::compass::{Corner, Direction, KeyCoordinate};
use crate::error::Result;
use crate::key;
use crate::plan::ClusterSite;
use crate::resolve::OptionResolver;

use Direction::{East, North, South, West};

/// All web hulls of a cluster, one solid per filled gap.
pub fn web_hulls(resolver: &OptionResolver, site: &ClusterSite) -> Result<Vec<Solid>> {
    let mut hulls = Vec::new();
    for &coord in site.derived.coordinates() {
        if let Some(hull) = column_connector(resolver, site, coord)? {
            hulls.push(hull);
        }
        if let Some(hull) = row_connector(resolver, site, coord)? {
            hulls.push(hull);
        }
        if let Some(hull) = diagonal_fill(resolver, site, coord)? {
            hulls.push(hull);
        }
    }
    Ok(hulls)
}

/// The whole web as one union.
pub fn cluster_web(resolver: &OptionResolver, site: &ClusterSite) -> Result<Solid> {
    Ok(Solid::union(web_hulls(resolver, site)?))
}

/// Hull across the vertical gap to the eastern neighbour, if populated.
fn column_connector(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
) -> Result<Option<Solid>> {
    let east = coord.step(East);
    if !site.derived.populated(east) {
        return Ok(None);
    }
    Ok(Some(Solid::hull(vec![
        key::placed_corner_post(resolver, site, coord, Corner(East, North))?,
        key::placed_corner_post(resolver, site, coord, Corner(East, South))?,
        key::placed_corner_post(resolver, site, east, Corner(West, North))?,
        key::placed_corner_post(resolver, site, east, Corner(West, South))?,
    ])))
}

/// Hull across the horizontal gap to the northern neighbour, if populated.
fn row_connector(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
) -> Result<Option<Solid>> {
    let north = coord.step(North);
    if !site.derived.populated(north) {
        return Ok(None);
    }
    Ok(Some(Solid::hull(vec![
        key::placed_corner_post(resolver, site, coord, Corner(North, East))?,
        key::placed_corner_post(resolver, site, coord, Corner(North, West))?,
        key::placed_corner_post(resolver, site, north, Corner(South, East))?,
        key::placed_corner_post(resolver, site, north, Corner(South, West))?,
    ])))
}

/// Hull over the diagonal pocket between a key and its north, east, and
/// northeast neighbours. Only populated cells contribute posts; with
/// fewer than two posts there is no pocket and nothing is emitted. Two
/// posts give a degenerate sliver that the renderer accepts.
fn diagonal_fill(
    resolver: &OptionResolver,
    site: &ClusterSite,
    coord: KeyCoordinate,
) -> Result<Option<Solid>> {
    let cells = [
        (coord, Corner(North, East)),
        (coord.step(East), Corner(North, West)),
        (coord.step(North), Corner(South, East)),
        (coord.walk(&[North, East]), Corner(South, West)),
    ];
    let mut posts = Vec::new();
    for (cell, corner) in cells {
        if site.derived.populated(cell) {
            posts.push(key::placed_corner_post(resolver, site, cell, corner)?);
        }
    }
    if posts.len() < 2 {
        return Ok(None);
    }
    Ok(Some(Solid::hull(posts)))
}

// =============================================================================
// TESTS
// =============================================================================
