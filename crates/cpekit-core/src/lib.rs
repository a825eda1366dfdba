//! Cpekit Core - Foundation types for the CPE naming and matching engine
//!
//! This crate provides the building blocks shared by the naming and
//! applicability-language crates:
//! - `Attribute`: the eleven named fields of a CPE name
//! - `CpeVersion`: the specification version a name was written against
//! - `ComponentValue`: one attribute slot, either a concrete string or a
//!   logical value (ANY, NA, empty, undefined)
//! - `Relation`: the pairwise attribute comparison result used by matching
//! - `Error`, `Result`: the error taxonomy of the whole engine

pub mod attribute;
pub mod component;
pub mod encoding;
pub mod error;
pub mod pattern;
pub mod version;

// Re-export commonly used types at crate root
pub use attribute::Attribute;
pub use component::{ComponentValue, Encoding, SimpleValue};
pub use error::{Error, Result};
pub use pattern::Relation;
pub use version::CpeVersion;
