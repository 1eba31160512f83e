//! # Most-Specific Option Resolver
//!
//! Per-key style options (layout curvature factors, wall extents) can be
//! overridden at four scopes. The resolver searches them in strict
//! priority order and returns the first value that both exists and is
//! non-null:
//!
//! 1. key level — `clusters.<c>.by-key."column,row".<end-path>`
//! 2. column level — `clusters.<c>.by-column.{first|last|<index>}.<end-path>`
//! 3. cluster level — `clusters.<c>.parameters.<end-path>`
//! 4. global — `parameters.<end-path>`
//!
//! The global default must always exist; a fall-through is a fatal
//! configuration error. Results are memoized per (end-path, coordinate):
//! the document is immutable, so the lookup is referentially transparent.

use std::cell::RefCell;
use std::collections::HashMap;

use config::{ParamError, Params};
use serde_json::Value;

use crate::compass::KeyCoordinate;
use crate::error::Result;

/// Override scopes in priority order, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    Key,
    ColumnFirst,
    ColumnLast,
    ColumnIndex,
    Cluster,
    Global,
}

const SCOPES: [Scope; 6] = [
    Scope::Key,
    Scope::ColumnFirst,
    Scope::ColumnLast,
    Scope::ColumnIndex,
    Scope::Cluster,
    Scope::Global,
];

/// Prioritized option lookup for one cluster.
pub struct OptionResolver<'a> {
    params: &'a Params,
    cluster: String,
    first_column: i32,
    last_column: i32,
    cache: RefCell<HashMap<(Vec<String>, KeyCoordinate), Option<Value>>>,
}

impl<'a> OptionResolver<'a> {
    /// Build a resolver for a cluster whose columns span
    /// `first_column..=last_column`.
    pub fn new(params: &'a Params, cluster: &str, first_column: i32, last_column: i32) -> Self {
        Self {
            params,
            cluster: cluster.to_string(),
            first_column,
            last_column,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Name of the cluster this resolver serves.
    pub fn cluster(&self) -> &str {
        &self.cluster
    }

    /// The raw parameter document.
    pub fn params(&self) -> &Params {
        self.params
    }

    /// Resolve an end path for a coordinate, or `None` if no scope
    /// carries a value.
    pub fn value(&self, coord: KeyCoordinate, end_path: &[&str]) -> Option<Value> {
        let cache_key = (
            end_path.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
            coord,
        );
        if let Some(hit) = self.cache.borrow().get(&cache_key) {
            return hit.clone();
        }
        let resolved = self.resolve(coord, end_path).cloned();
        self.cache
            .borrow_mut()
            .insert(cache_key, resolved.clone());
        resolved
    }

    fn resolve(&self, coord: KeyCoordinate, end_path: &[&str]) -> Option<&Value> {
        let key = coord.document_key();
        let column = coord.column.to_string();
        for scope in SCOPES {
            let prefix: Vec<&str> = match scope {
                Scope::Key => vec!["clusters", &self.cluster, "by-key", &key],
                Scope::ColumnFirst => {
                    if coord.column != self.first_column {
                        continue;
                    }
                    vec!["clusters", &self.cluster, "by-column", "first"]
                }
                Scope::ColumnLast => {
                    if coord.column != self.last_column {
                        continue;
                    }
                    vec!["clusters", &self.cluster, "by-column", "last"]
                }
                Scope::ColumnIndex => {
                    vec!["clusters", &self.cluster, "by-column", &column]
                }
                Scope::Cluster => vec!["clusters", &self.cluster, "parameters"],
                Scope::Global => vec!["parameters"],
            };
            let mut path = prefix;
            path.extend_from_slice(end_path);
            if let Some(value) = self.params.lookup(&path) {
                return Some(value);
            }
        }
        None
    }

    /// Missing-global error for an end path.
    fn no_default(&self, end_path: &[&str]) -> ParamError {
        let mut path = vec!["parameters"];
        path.extend_from_slice(end_path);
        ParamError::MissingKey {
            path: path.join("."),
        }
    }

    /// Resolve to a raw value, failing if even the global scope is empty.
    pub fn require(&self, coord: KeyCoordinate, end_path: &[&str]) -> Result<Value> {
        self.value(coord, end_path)
            .ok_or_else(|| self.no_default(end_path).into())
    }

    /// Resolve a number.
    pub fn require_f64(&self, coord: KeyCoordinate, end_path: &[&str]) -> Result<f64> {
        let value = self.require(coord, end_path)?;
        value.as_f64().ok_or_else(|| {
            ParamError::TypeMismatch {
                path: end_path.join("."),
                expected: "number",
                found: value.to_string(),
            }
            .into()
        })
    }

    /// Resolve an integer.
    pub fn require_i64(&self, coord: KeyCoordinate, end_path: &[&str]) -> Result<i64> {
        let value = self.require(coord, end_path)?;
        value.as_i64().ok_or_else(|| {
            ParamError::TypeMismatch {
                path: end_path.join("."),
                expected: "integer",
                found: value.to_string(),
            }
            .into()
        })
    }

    /// Resolve a 3-vector.
    pub fn require_vec3(&self, coord: KeyCoordinate, end_path: &[&str]) -> Result<[f64; 3]> {
        let value = self.require(coord, end_path)?;
        let mismatch = || ParamError::TypeMismatch {
            path: end_path.join("."),
            expected: "array of 3 numbers",
            found: value.to_string(),
        };
        let items = value.as_array().ok_or_else(mismatch)?;
        if items.len() != 3 {
            return Err(mismatch().into());
        }
        let mut out = [0.0; 3];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item.as_f64().ok_or_else(mismatch)?;
        }
        Ok(out)
    }
}

// =============================================================================
// TESTS
// =============================================================================
