//! # Config Crate
//!
//! Shared constants and the nested parameter document for the keyboard
//! case generator. All tunable geometry literals live in `constants`;
//! everything a user can override lives in a JSON parameter document
//! accessed through [`params::Params`].
//!
//! ## Usage
//!
//! ```rust
//! use config::constants::EPSILON_TOLERANCE;
//! use config::params::Params;
//!
//! let params = Params::defaults();
//! let columns = params.get_u32(&["clusters", "main", "columns"]).unwrap();
//! assert!(columns >= 1);
//! assert!(EPSILON_TOLERANCE < 1.0e-6);
//! ```
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: defaults defined once, merged under user
//!   documents, used everywhere
//! - **Fail Fast**: a missing key and an explicitly-unset value are
//!   distinguishable errors carrying the full key path

pub mod constants;
pub mod params;

pub use params::{ParamError, Params};
