//! # Parameter Document
//!
//! The nested key/value document driving the generator, stored as parsed
//! JSON. User documents are deep-merged over the built-in defaults, and
//! every lookup goes through an accessor that distinguishes a key that
//! does not exist from a key that is explicitly set to `null`.
//!
//! ## Document layout
//!
//! - `parameters` — global defaults for per-key style options (layout
//!   curvature factors, wall extents). The most-specific resolver in the
//!   core crate falls back to this scope, so every option it can ask for
//!   must have a value here.
//! - `clusters.<name>` — one entry per key cluster: column count, per
//!   column row counts, anchoring, aliases, and sparse `parameters` /
//!   `by-column` / `by-key` override scopes mirroring the global shape.
//! - `case`, `mcu` — accessory features built on top of the clusters.
//!
//! ## Example
//!
//! ```rust
//! use config::params::Params;
//!
//! let params = Params::defaults();
//! let extent = params
//!     .get(&["parameters", "wall", "north", "extent"])
//!     .unwrap();
//! assert_eq!(extent.as_str(), Some("full"));
//! ```

use serde_json::{json, Value};
use thiserror::Error;

// =============================================================================
// ERRORS
// =============================================================================

/// Errors raised by parameter document access.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParamError {
    /// The requested key path does not exist in the document.
    #[error("missing parameter key: {path}")]
    MissingKey {
        /// Full dotted key path that failed to resolve.
        path: String,
    },

    /// The key path exists but its value is explicitly `null`.
    #[error("parameter is unset (null): {path}")]
    UnsetValue {
        /// Full dotted key path of the unset value.
        path: String,
    },

    /// The value exists but has the wrong JSON type.
    #[error("parameter {path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// Full dotted key path of the offending value.
        path: String,
        /// Type the caller asked for.
        expected: &'static str,
        /// Raw value actually found, rendered as JSON.
        found: String,
    },
}

fn join_path(path: &[&str]) -> String {
    path.join(".")
}

// =============================================================================
// PARAMS
// =============================================================================

/// Merged user+default parameter document.
///
/// Immutable from the core's perspective: built once at startup, then
/// shared read-only by every placement, tracing, and wall function.
#[derive(Debug, Clone)]
pub struct Params {
    root: Value,
}

impl Params {
    /// Build a document containing only the built-in defaults.
    pub fn defaults() -> Self {
        Self {
            root: default_document(),
        }
    }

    /// Build a document from a user value merged over the defaults.
    ///
    /// Later documents win, object by object; non-object values replace
    /// wholesale.
    pub fn from_user(user: Value) -> Self {
        let mut params = Self::defaults();
        params.merge(user);
        params
    }

    /// Deep-merge another user document over this one.
    pub fn merge(&mut self, user: Value) {
        deep_merge(&mut self.root, user);
    }

    /// Resolve a key path to its raw value.
    ///
    /// ## Returns
    ///
    /// The value at `path`, [`ParamError::MissingKey`] if any path element
    /// does not exist, or [`ParamError::UnsetValue`] if the final value is
    /// `null`.
    pub fn get(&self, path: &[&str]) -> Result<&Value, ParamError> {
        let mut node = &self.root;
        for (depth, key) in path.iter().enumerate() {
            node = match node.get(key) {
                Some(child) => child,
                None => {
                    return Err(ParamError::MissingKey {
                        path: join_path(&path[..=depth]),
                    })
                }
            };
        }
        if node.is_null() {
            return Err(ParamError::UnsetValue {
                path: join_path(path),
            });
        }
        Ok(node)
    }

    /// Resolve a key path, treating both missing and unset as absent.
    ///
    /// This is the lookup the most-specific option resolver uses while
    /// falling through its scope priority list.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        self.get(path).ok()
    }

    /// Typed accessor for an `f64` value.
    pub fn get_f64(&self, path: &[&str]) -> Result<f64, ParamError> {
        let value = self.get(path)?;
        value.as_f64().ok_or_else(|| ParamError::TypeMismatch {
            path: join_path(path),
            expected: "number",
            found: value.to_string(),
        })
    }

    /// Typed accessor for an `i64` value.
    pub fn get_i64(&self, path: &[&str]) -> Result<i64, ParamError> {
        let value = self.get(path)?;
        value.as_i64().ok_or_else(|| ParamError::TypeMismatch {
            path: join_path(path),
            expected: "integer",
            found: value.to_string(),
        })
    }

    /// Typed accessor for a non-negative integer.
    pub fn get_u32(&self, path: &[&str]) -> Result<u32, ParamError> {
        let value = self.get_i64(path)?;
        u32::try_from(value).map_err(|_| ParamError::TypeMismatch {
            path: join_path(path),
            expected: "non-negative integer",
            found: value.to_string(),
        })
    }

    /// Typed accessor for a boolean.
    pub fn get_bool(&self, path: &[&str]) -> Result<bool, ParamError> {
        let value = self.get(path)?;
        value.as_bool().ok_or_else(|| ParamError::TypeMismatch {
            path: join_path(path),
            expected: "boolean",
            found: value.to_string(),
        })
    }

    /// Typed accessor for a string slice.
    pub fn get_str(&self, path: &[&str]) -> Result<&str, ParamError> {
        let value = self.get(path)?;
        value.as_str().ok_or_else(|| ParamError::TypeMismatch {
            path: join_path(path),
            expected: "string",
            found: value.to_string(),
        })
    }

    /// Typed accessor for a 3-element number array.
    pub fn get_vec3(&self, path: &[&str]) -> Result<[f64; 3], ParamError> {
        let value = self.get(path)?;
        let mismatch = || ParamError::TypeMismatch {
            path: join_path(path),
            expected: "array of 3 numbers",
            found: value.to_string(),
        };
        let items = value.as_array().ok_or_else(mismatch)?;
        if items.len() != 3 {
            return Err(mismatch());
        }
        let mut out = [0.0; 3];
        for (slot, item) in out.iter_mut().zip(items) {
            *slot = item.as_f64().ok_or_else(mismatch)?;
        }
        Ok(out)
    }

    /// Names of all configured clusters, sorted for deterministic builds.
    pub fn cluster_names(&self) -> Vec<String> {
        match self.root.get("clusters").and_then(Value::as_object) {
            Some(clusters) => {
                let mut names: Vec<String> = clusters.keys().cloned().collect();
                names.sort();
                names
            }
            None => Vec::new(),
        }
    }
}

fn deep_merge(base: &mut Value, user: Value) {
    match (base, user) {
        (Value::Object(base_map), Value::Object(user_map)) => {
            for (key, user_value) in user_map {
                match base_map.get_mut(&key) {
                    Some(base_value) => deep_merge(base_value, user_value),
                    None => {
                        base_map.insert(key, user_value);
                    }
                }
            }
        }
        (base_slot, user_value) => *base_slot = user_value,
    }
}

// =============================================================================
// DEFAULTS
// =============================================================================

/// The built-in default document.
///
/// Describes a small two-cluster split half: a 5-column main cluster with
/// one row above and below the home row, and a 3-key thumb cluster
/// anchored to the main cluster's inner bottom corner.
fn default_document() -> Value {
    json!({
        "parameters": {
            "layout": {
                "matrix": {
                    "neutral": {"column": 0, "row": 0},
                    "separation": {"column": 1.5, "row": 0.5}
                },
                "pitch": {"progressive": 0.0, "base": 0.0, "intrinsic": 0.0, "mid": 0.0, "late": 0.0},
                "roll": {"progressive": 0.0, "base": 0.0, "intrinsic": 0.0, "mid": 0.0, "late": 0.0},
                "yaw": {"base": 0.0, "intrinsic": 0.0, "mid": 0.0, "late": 0.0},
                "translation": {
                    "early": [0.0, 0.0, 0.0],
                    "mid": [0.0, 0.0, 0.0],
                    "late": [0.0, 0.0, 0.0]
                }
            },
            "wall": {
                "thickness": 3.0,
                "bevel": 0.5,
                "reach": 2.5,
                "north": {"extent": "full"},
                "east": {"extent": "full"},
                "south": {"extent": "full"},
                "west": {"extent": "full"}
            },
            "plate": {"switch-nub": true}
        },
        "clusters": {
            "main": {
                "columns": 5,
                "rows-above-home": {"default": 1},
                "rows-below-home": {"default": 1},
                "curvature": "standard",
                "height": 12.0,
                "anchoring": {"cluster": null, "alias": null, "offset": [0.0, 0.0, 0.0]},
                "aliases": {"thumb-anchor": [1, -1]},
                "parameters": {
                    "layout": {
                        "matrix": {"neutral": {"column": 2, "row": 0}},
                        "pitch": {"progressive": 0.26, "base": 0.26},
                        "roll": {"progressive": 0.09, "base": 0.31}
                    }
                },
                "by-column": {},
                "by-key": {}
            },
            "thumb": {
                "columns": 3,
                "rows-above-home": {"default": 0},
                "rows-below-home": {"default": 0},
                "curvature": "orthographic",
                "height": 0.0,
                "anchoring": {
                    "cluster": "main",
                    "alias": "thumb-anchor",
                    "offset": [-4.0, -28.0, 6.0]
                },
                "aliases": {},
                "parameters": {
                    "layout": {
                        "pitch": {"progressive": 0.12, "base": 0.35},
                        "roll": {"progressive": 0.0},
                        "yaw": {"base": -0.25}
                    },
                    "wall": {
                        "north": {"extent": 2}
                    }
                },
                "by-column": {},
                "by-key": {}
            }
        },
        "case": {
            "bottom-plate": {"include": true, "thickness": 2.0},
            "preview": {"include": false}
        },
        "mcu": {
            "include": true,
            "anchoring": {
                "cluster": "main",
                "coordinates": [0, 1],
                "corner": ["north", "west"],
                "offset": [-2.0, 0.0, -6.0]
            },
            "size": [18.0, 33.0, 1.6],
            "margin": 0.5
        }
    })
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_key_vs_unset_value() {
        let params = Params::defaults();
        assert_eq!(
            params.get(&["clusters", "main", "no-such-key"]),
            Err(ParamError::MissingKey {
                path: "clusters.main.no-such-key".to_string()
            })
        );
        // anchoring.cluster is explicitly null for the main cluster
        assert_eq!(
            params.get(&["clusters", "main", "anchoring", "cluster"]),
            Err(ParamError::UnsetValue {
                path: "clusters.main.anchoring.cluster".to_string()
            })
        );
    }

    #[test]
    fn test_missing_key_reports_failing_prefix() {
        let params = Params::defaults();
        let err = params.get(&["nowhere", "deeper"]).unwrap_err();
        assert_eq!(
            err,
            ParamError::MissingKey {
                path: "nowhere".to_string()
            }
        );
    }

    #[test]
    fn test_type_mismatch_carries_raw_value() {
        let params = Params::defaults();
        let err = params
            .get_f64(&["clusters", "main", "curvature"])
            .unwrap_err();
        match err {
            ParamError::TypeMismatch { path, found, .. } => {
                assert_eq!(path, "clusters.main.curvature");
                assert!(found.contains("standard"));
            }
            other => panic!("expected TypeMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_user_document_wins_on_merge() {
        let params = Params::from_user(json!({
            "clusters": {"main": {"columns": 6}}
        }));
        assert_eq!(params.get_u32(&["clusters", "main", "columns"]), Ok(6));
        // Sibling keys from the defaults survive the merge.
        assert_eq!(
            params.get_str(&["clusters", "main", "curvature"]),
            Ok("standard")
        );
    }

    #[test]
    fn test_merge_replaces_non_objects_wholesale() {
        let mut params = Params::defaults();
        params.merge(json!({
            "mcu": {"anchoring": {"offset": [1.0, 2.0, 3.0]}}
        }));
        assert_eq!(
            params.get_vec3(&["mcu", "anchoring", "offset"]),
            Ok([1.0, 2.0, 3.0])
        );
    }

    #[test]
    fn test_cluster_names_sorted() {
        let params = Params::defaults();
        assert_eq!(params.cluster_names(), vec!["main", "thumb"]);
    }

    #[test]
    fn test_vec3_accessor_rejects_short_arrays() {
        let params = Params::from_user(json!({"probe": [1.0, 2.0]}));
        assert!(matches!(
            params.get_vec3(&["probe"]),
            Err(ParamError::TypeMismatch { .. })
        ));
    }
}
