//! # Case Body Assembly
//!
//! Joins the per-key plates, the web between them, and the perimeter
//! wall into one case solid per cluster, then unions the clusters (and
//! the microcontroller holder, when included) into the full case half.
//! The matching bottom plate is extruded from the same traced perimeter
//! the wall is built from, so the two always agree in outline.

use config::Params;
use glam::DVec3;
use keywell_scad::Solid;
use log::debug;

use crate::accessory;
use crate::error::Result;
use crate::key;
use crate::plan::{ClusterSite, KeyboardPlan};
use crate::resolve::OptionResolver;
use crate::wall;
use crate::web;

/// One cluster's share of the case: plates, web, and wall.
pub fn cluster_body(resolver: &OptionResolver, site: &ClusterSite) -> Result<Solid> {
    let mut parts = Vec::new();
    for &coord in site.derived.coordinates() {
        parts.push(key::placed_key_plate(resolver, site, coord)?);
    }
    let plates = parts.len();
    parts.extend(web::web_hulls(resolver, site)?);
    let webs = parts.len() - plates;
    parts.extend(wall::wall_parts(resolver, site)?);
    debug!(
        "cluster {}: {} plates, {} web hulls, {} wall parts",
        site.name,
        plates,
        webs,
        parts.len() - plates - webs
    );
    Ok(Solid::union(parts))
}

/// The whole case half: every cluster body plus the microcontroller
/// holder when the document includes one.
pub fn case_body(plan: &KeyboardPlan) -> Result<Solid> {
    let mut parts = Vec::new();
    for site in plan.sites() {
        let resolver = plan.resolver(&site.name)?;
        parts.push(cluster_body(&resolver, site)?);
    }
    if let Some(holder) = accessory::mcu_holder(plan)? {
        parts.push(holder);
    }
    Ok(Solid::union(parts))
}

/// Bottom plate closing the case: each cluster's floor outline as a
/// polygon, extruded downward so the case itself rests on z = 0.
pub fn bottom_plate(plan: &KeyboardPlan) -> Result<Solid> {
    let thickness = plan
        .params()
        .get_f64(&["case", "bottom-plate", "thickness"])?;
    let mut outlines = Vec::new();
    for site in plan.sites() {
        let resolver = plan.resolver(&site.name)?;
        outlines.push(Solid::Polygon {
            points: wall::bottom_outline(&resolver, site)?,
            paths: None,
        });
    }
    Ok(Solid::translate(
        DVec3::new(0.0, 0.0, -thickness),
        Solid::extrude(thickness, Solid::union(outlines)),
    ))
}

/// Whether the document asks for a bottom plate at all.
pub fn bottom_plate_included(params: &Params) -> Result<bool> {
    Ok(params.get_bool(&["case", "bottom-plate", "include"])?)
}

/// Fit-check body: the case with keycap proxies floating over every
/// mount.
pub fn preview_body(plan: &KeyboardPlan, case: &Solid) -> Result<Solid> {
    let mut parts = vec![case.clone()];
    for site in plan.sites() {
        let resolver = plan.resolver(&site.name)?;
        for &coord in site.derived.coordinates() {
            parts.push(crate::place::place_solid(
                &resolver,
                site,
                coord,
                key::keycap_proxy(),
            )?);
        }
    }
    Ok(Solid::union(parts))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn default_plan() -> KeyboardPlan {
        KeyboardPlan::new(Params::defaults()).unwrap()
    }

    #[test]
    fn test_cluster_body_carries_every_plate() {
        let plan = default_plan();
        let site = plan.site("thumb").unwrap();
        let resolver = plan.resolver("thumb").unwrap();
        let body = cluster_body(&resolver, site).unwrap();
        let children = match body {
            Solid::Union { children } => children,
            other => panic!("expected Union, got {other:?}"),
        };
        // At minimum one part per key; web and wall come on top.
        assert!(children.len() > site.derived.coordinates().len());
    }

    #[test]
    fn test_case_body_unions_all_clusters() {
        let plan = default_plan();
        let body = case_body(&plan).unwrap();
        match body {
            // Two clusters plus the default-included holder.
            Solid::Union { children } => assert_eq!(children.len(), 3),
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn test_bottom_plate_sits_below_the_floor() {
        let plan = default_plan();
        let plate = bottom_plate(&plan).unwrap();
        match plate {
            Solid::Translate { offset, child } => {
                assert_eq!(offset, [0.0, 0.0, -2.0]);
                assert!(matches!(*child, Solid::LinearExtrude { height, .. } if height == 2.0));
            }
            other => panic!("expected Translate, got {other:?}"),
        }
    }

    #[test]
    fn test_bottom_plate_carries_one_outline_per_cluster() {
        let plan = default_plan();
        let plate = bottom_plate(&plan).unwrap();
        let mut polygons = 0;
        let mut stack = vec![&plate];
        while let Some(node) = stack.pop() {
            match node {
                Solid::Polygon { points, .. } => {
                    polygons += 1;
                    assert!(points.len() >= 3);
                }
                Solid::Union { children } => stack.extend(children),
                Solid::Translate { child, .. } | Solid::LinearExtrude { child, .. } => {
                    stack.push(child.as_ref())
                }
                _ => {}
            }
        }
        assert_eq!(polygons, 2);
    }

    #[test]
    fn test_preview_adds_a_cap_per_key() {
        let plan = default_plan();
        let case = case_body(&plan).unwrap();
        let preview = preview_body(&plan, &case).unwrap();
        let keys: usize = plan
            .sites()
            .map(|site| site.derived.coordinates().len())
            .sum();
        match preview {
            Solid::Union { children } => assert_eq!(children.len(), 1 + keys),
            other => panic!("expected Union, got {other:?}"),
        }
    }

    #[test]
    fn test_bottom_plate_toggle() {
        assert!(bottom_plate_included(&Params::defaults()).unwrap());
        let off = Params::from_user(serde_json::json!({
            "case": {"bottom-plate": {"include": false}}
        }));
        assert!(!bottom_plate_included(&off).unwrap());
    }
}
