//! # Keyboard Plan
//!
//! The derived, immutable description of the whole keyboard: every
//! cluster's lookup tables plus its resolved origin. Cluster origins may
//! be anchored to key aliases in other clusters, so they are resolved
//! here, in anchoring order, once per build — placement never has to
//! chase references.

use std::collections::HashMap;

use config::Params;
use glam::DVec3;

use crate::cluster::{anchoring_order, ClusterSpec, DerivedCluster};
use crate::compass::KeyCoordinate;
use crate::error::{Error, Result};
use crate::place;
use crate::resolve::OptionResolver;

/// One cluster, derived and pinned to its world origin.
#[derive(Debug, Clone)]
pub struct ClusterSite {
    /// Cluster name.
    pub name: String,
    /// Derived occupancy and index tables.
    pub derived: DerivedCluster,
    /// World-space origin of the cluster, anchoring already applied.
    pub origin: DVec3,
}

/// Fully derived keyboard: all cluster sites in anchoring order.
#[derive(Debug, Clone)]
pub struct KeyboardPlan {
    params: Params,
    order: Vec<String>,
    sites: HashMap<String, ClusterSite>,
}

impl KeyboardPlan {
    /// Derive every cluster from the parameter document.
    ///
    /// Fails on anchoring cycles, unknown parent clusters, and unknown
    /// key aliases.
    pub fn new(params: Params) -> Result<Self> {
        let order = anchoring_order(&params)?;
        let mut sites: HashMap<String, ClusterSite> = HashMap::new();
        for name in &order {
            let spec = ClusterSpec::from_params(&params, name)?;
            let derived = DerivedCluster::new(spec);
            let offset = DVec3::from_array(params.get_vec3(&[
                "clusters",
                name,
                "anchoring",
                "offset",
            ])?);
            let origin = match params.lookup(&["clusters", name, "anchoring", "cluster"]) {
                None => offset,
                Some(parent_value) => {
                    let parent_name =
                        parent_value.as_str().ok_or_else(|| Error::UnknownCluster {
                            name: parent_value.to_string(),
                        })?;
                    // Anchoring order guarantees the parent site exists.
                    let parent =
                        sites.get(parent_name).ok_or_else(|| Error::UnknownCluster {
                            name: parent_name.to_string(),
                        })?;
                    let alias = params.get_str(&["clusters", name, "anchoring", "alias"])?;
                    let alias_coord = alias_coordinate(&params, parent_name, alias)?;
                    let resolver = resolver_for(&params, parent);
                    place::key_position(&resolver, parent, alias_coord, DVec3::ZERO)? + offset
                }
            };
            sites.insert(
                name.clone(),
                ClusterSite {
                    name: name.clone(),
                    derived,
                    origin,
                },
            );
        }
        Ok(Self {
            params,
            order,
            sites,
        })
    }

    /// The parameter document the plan was derived from.
    pub fn params(&self) -> &Params {
        &self.params
    }

    /// Look up a cluster site by name.
    pub fn site(&self, name: &str) -> Result<&ClusterSite> {
        self.sites.get(name).ok_or_else(|| Error::UnknownCluster {
            name: name.to_string(),
        })
    }

    /// All sites in anchoring order (parents before children).
    pub fn sites(&self) -> impl Iterator<Item = &ClusterSite> {
        self.order.iter().filter_map(|name| self.sites.get(name))
    }

    /// Build an option resolver for one of the plan's clusters.
    pub fn resolver(&self, name: &str) -> Result<OptionResolver<'_>> {
        Ok(resolver_for(&self.params, self.site(name)?))
    }
}

fn resolver_for<'a>(params: &'a Params, site: &ClusterSite) -> OptionResolver<'a> {
    let (first, last) = site.derived.column_range();
    OptionResolver::new(params, &site.name, first, last)
}

fn alias_coordinate(params: &Params, cluster: &str, alias: &str) -> Result<KeyCoordinate> {
    let value = params
        .lookup(&["clusters", cluster, "aliases", alias])
        .ok_or_else(|| Error::UnknownAlias {
            cluster: cluster.to_string(),
            alias: alias.to_string(),
        })?;
    let pair = value
        .as_array()
        .filter(|items| items.len() == 2)
        .ok_or_else(|| Error::UnknownAlias {
            cluster: cluster.to_string(),
            alias: alias.to_string(),
        })?;
    match (pair[0].as_i64(), pair[1].as_i64()) {
        (Some(column), Some(row)) => Ok(KeyCoordinate::new(column as i32, row as i32)),
        _ => Err(Error::UnknownAlias {
            cluster: cluster.to_string(),
            alias: alias.to_string(),
        }),
    }
}

// =============================================================================
// TESTS
// =============================================================================
