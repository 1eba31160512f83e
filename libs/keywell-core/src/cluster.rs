//! # Cluster Derivation
//!
//! Turns the raw per-column row-count configuration of a key cluster into
//! the eagerly-computed lookup tables every other module queries: the set
//! of populated coordinates, row and column ranges, and per-row /
//! per-column indices. All of it is computed once per build and immutable
//! afterwards.

use std::collections::{HashMap, HashSet};

use config::Params;

use crate::compass::KeyCoordinate;
use crate::error::{Error, Result};

// =============================================================================
// CLUSTER SPEC
// =============================================================================

/// Raw shape of one named cluster: a column count and, per column, how
/// many rows extend above and below the home row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterSpec {
    /// Cluster name, as keyed in the parameter document.
    pub name: String,
    /// Number of columns; column indices run 0..columns.
    pub columns: u32,
    rows_above: Vec<u32>,
    rows_below: Vec<u32>,
}

impl ClusterSpec {
    /// Read a cluster's shape from the parameter document.
    ///
    /// Per-column row counts come from `rows-above-home.<column>` /
    /// `rows-below-home.<column>`, falling back to the cluster's
    /// `default` entry.
    pub fn from_params(params: &Params, name: &str) -> Result<Self> {
        if params.lookup(&["clusters", name]).is_none() {
            return Err(Error::UnknownCluster {
                name: name.to_string(),
            });
        }
        let columns = params.get_u32(&["clusters", name, "columns"])?;
        let per_column = |kind: &str| -> Result<Vec<u32>> {
            let default = params.get_u32(&["clusters", name, kind, "default"])?;
            (0..columns)
                .map(|column| {
                    let key = column.to_string();
                    match params.lookup(&["clusters", name, kind, &key]) {
                        Some(_) => Ok(params.get_u32(&["clusters", name, kind, &key])?),
                        None => Ok(default),
                    }
                })
                .collect()
        };
        Ok(Self {
            name: name.to_string(),
            columns,
            rows_above: per_column("rows-above-home")?,
            rows_below: per_column("rows-below-home")?,
        })
    }

    /// Build a spec directly; test and tooling convenience.
    pub fn from_counts(name: &str, rows_above: Vec<u32>, rows_below: Vec<u32>) -> Self {
        debug_assert_eq!(rows_above.len(), rows_below.len());
        Self {
            name: name.to_string(),
            columns: rows_above.len() as u32,
            rows_above,
            rows_below,
        }
    }

    /// Whether the configuration requests a key at this coordinate.
    ///
    /// A coordinate (c, r) is requested iff the column exists and r is
    /// the home row, within the rows above home, or within the rows
    /// below home for that column.
    pub fn requested(&self, coord: KeyCoordinate) -> bool {
        if coord.column < 0 || coord.column >= self.columns as i32 {
            return false;
        }
        let column = coord.column as usize;
        if coord.row == 0 {
            return true;
        }
        if coord.row > 0 {
            coord.row as u32 <= self.rows_above[column]
        } else {
            coord.row.unsigned_abs() <= self.rows_below[column]
        }
    }
}

// =============================================================================
// DERIVED CLUSTER
// =============================================================================

/// Eagerly-derived lookup tables for one cluster.
///
/// Write-once, read-many: constructed from a [`ClusterSpec`] at startup
/// and never mutated during geometry generation.
#[derive(Debug, Clone)]
pub struct DerivedCluster {
    /// The spec this was derived from.
    pub spec: ClusterSpec,
    coordinates: Vec<KeyCoordinate>,
    populated: HashSet<KeyCoordinate>,
    rows_by_column: HashMap<i32, Vec<i32>>,
    columns_by_row: HashMap<i32, Vec<i32>>,
    row_range: (i32, i32),
    column_range: (i32, i32),
}

impl DerivedCluster {
    /// Compute all lookup tables for a spec.
    pub fn new(spec: ClusterSpec) -> Self {
        let mut coordinates = Vec::new();
        let mut rows_by_column: HashMap<i32, Vec<i32>> = HashMap::new();
        let mut columns_by_row: HashMap<i32, Vec<i32>> = HashMap::new();
        let mut row_range = (0, 0);
        for column in 0..spec.columns as i32 {
            let above = spec.rows_above[column as usize] as i32;
            let below = spec.rows_below[column as usize] as i32;
            row_range = (row_range.0.min(-below), row_range.1.max(above));
            for row in -below..=above {
                let coord = KeyCoordinate::new(column, row);
                coordinates.push(coord);
                rows_by_column.entry(column).or_default().push(row);
                columns_by_row.entry(row).or_default().push(column);
            }
        }
        coordinates.sort();
        for rows in rows_by_column.values_mut() {
            rows.sort_unstable();
        }
        for columns in columns_by_row.values_mut() {
            columns.sort_unstable();
        }
        let populated = coordinates.iter().copied().collect();
        let column_range = (0, spec.columns as i32 - 1);
        Self {
            spec,
            coordinates,
            populated,
            rows_by_column,
            columns_by_row,
            row_range,
            column_range,
        }
    }

    /// All populated coordinates, sorted by column then row.
    pub fn coordinates(&self) -> &[KeyCoordinate] {
        &self.coordinates
    }

    /// Occupancy predicate.
    pub fn populated(&self, coord: KeyCoordinate) -> bool {
        self.populated.contains(&coord)
    }

    /// (lowest, highest) row across all columns.
    pub fn row_range(&self) -> (i32, i32) {
        self.row_range
    }

    /// (first, last) column.
    pub fn column_range(&self) -> (i32, i32) {
        self.column_range
    }

    /// Populated rows of a column, ascending.
    pub fn rows_in_column(&self, column: i32) -> &[i32] {
        self.rows_by_column
            .get(&column)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Populated columns of a row, ascending.
    pub fn columns_in_row(&self, row: i32) -> &[i32] {
        self.columns_by_row
            .get(&row)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

// =============================================================================
// ANCHORING ORDER
// =============================================================================

/// Order clusters so that every cluster appears after the cluster its
/// origin is anchored to.
///
/// A cluster with a null `anchoring.cluster` is a root. A cycle among
/// clusters is a configuration error naming the cycle; it is detected
/// here, at derivation time, so placement never loops.
pub fn anchoring_order(params: &Params) -> Result<Vec<String>> {
    let names = params.cluster_names();
    let mut order = Vec::with_capacity(names.len());
    let mut done: HashSet<String> = HashSet::new();

    for name in &names {
        if done.contains(name) {
            continue;
        }
        // Follow the anchoring chain, remembering the path for cycle
        // reporting.
        let mut chain = Vec::new();
        let mut current = name.clone();
        loop {
            if done.contains(&current) {
                break;
            }
            if chain.contains(&current) {
                let start = chain
                    .iter()
                    .position(|n| *n == current)
                    .unwrap_or(0);
                let mut cycle: Vec<String> = chain[start..].to_vec();
                cycle.push(current);
                return Err(Error::AnchorCycle { cycle });
            }
            chain.push(current.clone());
            if params.lookup(&["clusters", &current]).is_none() {
                return Err(Error::UnknownCluster { name: current });
            }
            match params.lookup(&["clusters", &current, "anchoring", "cluster"]) {
                Some(parent) => {
                    current = parent
                        .as_str()
                        .ok_or_else(|| Error::UnknownCluster {
                            name: parent.to_string(),
                        })?
                        .to_string();
                }
                // Null or absent parent: this chain ends at a root.
                None => break,
            }
        }
        // Emit the chain root-first.
        for cluster in chain.into_iter().rev() {
            if done.insert(cluster.clone()) {
                order.push(cluster);
            }
        }
    }
    Ok(order)
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn l_shaped() -> DerivedCluster {
        // Column 0: rows -1..=1, column 1: home row only.
        DerivedCluster::new(ClusterSpec::from_counts("test", vec![1, 0], vec![1, 0]))
    }

    #[test]
    fn test_single_key_cluster() {
        let derived =
            DerivedCluster::new(ClusterSpec::from_counts("one", vec![0], vec![0]));
        assert_eq!(derived.coordinates(), &[KeyCoordinate::new(0, 0)]);
        assert!(derived.populated(KeyCoordinate::new(0, 0)));
        assert!(!derived.populated(KeyCoordinate::new(0, 1)));
        assert!(!derived.populated(KeyCoordinate::new(-1, 0)));
    }

    #[test]
    fn test_l_shape_population() {
        let derived = l_shaped();
        assert_eq!(derived.coordinates().len(), 4);
        assert!(derived.populated(KeyCoordinate::new(0, 1)));
        assert!(!derived.populated(KeyCoordinate::new(1, 1)));
        assert!(!derived.populated(KeyCoordinate::new(1, -1)));
        assert_eq!(derived.row_range(), (-1, 1));
        assert_eq!(derived.column_range(), (0, 1));
        assert_eq!(derived.rows_in_column(0), &[-1, 0, 1]);
        assert_eq!(derived.rows_in_column(1), &[0]);
        assert_eq!(derived.columns_in_row(1), &[0]);
        assert_eq!(derived.columns_in_row(0), &[0, 1]);
    }

    #[test]
    fn test_spec_from_params_with_column_override() {
        let params = Params::from_user(json!({
            "clusters": {
                "main": {
                    "columns": 3,
                    "rows-above-home": {"default": 1, "2": 2},
                    "rows-below-home": {"default": 0}
                }
            }
        }));
        let spec = ClusterSpec::from_params(&params, "main").unwrap();
        assert!(spec.requested(KeyCoordinate::new(2, 2)));
        assert!(!spec.requested(KeyCoordinate::new(1, 2)));
        assert!(!spec.requested(KeyCoordinate::new(0, -1)));
    }

    #[test]
    fn test_unknown_cluster() {
        let params = Params::defaults();
        assert_eq!(
            ClusterSpec::from_params(&params, "pinky").unwrap_err(),
            Error::UnknownCluster {
                name: "pinky".to_string()
            }
        );
    }

    #[test]
    fn test_anchoring_order_parents_first() {
        let params = Params::defaults();
        let order = anchoring_order(&params).unwrap();
        let main = order.iter().position(|n| n == "main").unwrap();
        let thumb = order.iter().position(|n| n == "thumb").unwrap();
        assert!(main < thumb);
    }

    #[test]
    fn test_anchoring_cycle_detected() {
        let params = Params::from_user(json!({
            "clusters": {
                "main": {"anchoring": {"cluster": "thumb"}},
                "thumb": {"anchoring": {"cluster": "main"}}
            }
        }));
        match anchoring_order(&params).unwrap_err() {
            Error::AnchorCycle { cycle } => {
                assert!(cycle.len() >= 2);
                assert!(cycle.contains(&"main".to_string()));
                assert!(cycle.contains(&"thumb".to_string()));
            }
            other => panic!("expected AnchorCycle, got {other:?}"),
        }
    }
}
