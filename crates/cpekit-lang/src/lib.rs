//! Cpekit Lang - the CPE applicability language
//!
//! An applicability statement combines CPE name references with AND/OR
//! logic to describe a platform. This crate parses the two wire formats
//! of such statements and evaluates them against a known-instance set:
//! - The MITRE XML format (`cpe:platform-specification`)
//! - The NVD JSON configurations shape
//!
//! Parsing produces a flat `PlatformSpec` tree; evaluation is pure,
//! deterministic, and short-circuits in document order.

pub mod expr;
pub mod json;
pub mod xml;

// Re-export commonly used types at crate root
pub use expr::{Operand, Operator, Platform, PlatformSpec};
