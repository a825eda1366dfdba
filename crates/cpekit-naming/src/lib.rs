//! Cpekit Naming - CPE names across every specification version
//!
//! This crate provides:
//! - `Name`: one CPE name parsed from any of the four textual grammars
//!   (WFN, 2.3 formatted string, 2.2/2.3 URI, 1.1 URI)
//! - Lossless conversion between the bindings through the canonical
//!   Well-Formed Name
//! - `NameSet`: a known-instance set with the name-matching algorithm
//! - The pairwise name relations (superset, subset, equal, disjoint)

pub mod fs;
pub mod legacy;
pub mod name;
pub mod set;
pub mod uri;
pub mod wfn;

// Re-export commonly used types at crate root
pub use name::{Element, Name};
pub use set::{compare_names, disjoint, equal, subset, superset, NameSet};
