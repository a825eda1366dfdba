//! Component values: one attribute slot of a CPE name
//!
//! A slot holds either a concrete string value or one of four logical
//! values. Concrete values keep both the text they were parsed from and
//! the decoded standard form; the standard form is what every comparison
//! and re-encoding works on, so a value decodes identically no matter
//! which binding it arrived in.

use std::fmt;

use tracing::trace;

use crate::attribute::Attribute;
use crate::encoding;
use crate::error::{Error, Result};
use crate::pattern::{self, Relation};

/// The binding an encoded value was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// Well-Formed Name: the text inside the double quotes
    Wfn,
    /// 2.3 URI percent encoding
    Uri,
    /// 2.2 URI (no percent forms, no wildcards)
    UriLegacy,
    /// 2.3 formatted string
    Fs,
    /// 1.1 element value
    V1,
}

/// A concrete attribute value
#[derive(Debug, Clone)]
pub struct SimpleValue {
    attribute: Attribute,
    /// Decoded form: quoted punctuation plus unquoted `?`/`*` wildcards
    standard: String,
    /// The text as it appeared in its source binding
    encoded: String,
    encoding: Encoding,
}

impl SimpleValue {
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// The decoded standard form
    pub fn standard(&self) -> &str {
        &self.standard
    }

    /// The value as written in its source binding
    pub fn encoded(&self) -> &str {
        &self.encoded
    }

    pub fn encoding(&self) -> Encoding {
        self.encoding
    }
}

impl PartialEq for SimpleValue {
    fn eq(&self, other: &Self) -> bool {
        self.attribute == other.attribute && self.standard == other.standard
    }
}

impl Eq for SimpleValue {}

/// One attribute slot of a CPE name
#[derive(Debug, Clone)]
pub enum ComponentValue {
    /// Matches anything
    Any,
    /// The attribute does not apply to the product
    NotApplicable,
    /// Written as an empty field; semantically ANY in 2.2 and 2.3
    Empty,
    /// Not provided by the caller at all
    Undefined,
    Simple(SimpleValue),
}

impl ComponentValue {
    fn new(encoded: &str, attribute: Attribute, encoding: Encoding) -> Result<Self> {
        let standard = match encoding {
            Encoding::Wfn => encoded.to_string(),
            Encoding::Uri => encoding::decode_uri(encoded, attribute)?,
            Encoding::UriLegacy => encoding::decode_uri_legacy(encoded, attribute)?,
            Encoding::Fs => encoding::decode_fs(encoded, attribute)?,
            Encoding::V1 => encoding::decode_v1(encoded, attribute)?,
        };

        // 2.2 and 1.1 values carry no wildcards, so the positional checks
        // of the generic grammar reduce to the charset already enforced
        // by their decoders. 2.2 still gets the part and language
        // grammars; the 1.1 grammar constrains nothing beyond its
        // charset and operators.
        match encoding {
            Encoding::V1 => {}
            Encoding::UriLegacy => {
                if attribute == Attribute::Part || attribute == Attribute::Language {
                    encoding::validate_standard(&standard, attribute)?;
                }
            }
            _ => encoding::validate_standard(&standard, attribute)?,
        }

        trace!(attribute = %attribute, standard = %standard, "decoded component value");

        Ok(ComponentValue::Simple(SimpleValue {
            attribute,
            standard,
            encoded: encoded.to_string(),
            encoding,
        }))
    }

    /// Parse a WFN value (the text inside the double quotes)
    pub fn from_wfn(encoded: &str, attribute: Attribute) -> Result<Self> {
        Self::new(encoded, attribute, Encoding::Wfn)
    }

    /// Parse a 2.3 URI value
    pub fn from_uri(encoded: &str, attribute: Attribute) -> Result<Self> {
        Self::new(encoded, attribute, Encoding::Uri)
    }

    /// Parse a 2.2 URI value
    pub fn from_uri_legacy(encoded: &str, attribute: Attribute) -> Result<Self> {
        Self::new(encoded, attribute, Encoding::UriLegacy)
    }

    /// Parse a 2.3 formatted-string value
    pub fn from_fs(encoded: &str, attribute: Attribute) -> Result<Self> {
        Self::new(encoded, attribute, Encoding::Fs)
    }

    /// Parse a 1.1 element value
    pub fn from_v1(encoded: &str, attribute: Attribute) -> Result<Self> {
        Self::new(encoded, attribute, Encoding::V1)
    }

    /// Replace the value in place, re-validating against the same
    /// attribute and binding. The old value survives a failed parse.
    pub fn set(&mut self, encoded: &str) -> Result<()> {
        let (attribute, encoding) = match self {
            ComponentValue::Simple(simple) => (simple.attribute, simple.encoding),
            _ => {
                return Err(Error::UnsupportedOperation(
                    "set on a logical component value".to_string(),
                ))
            }
        };
        *self = Self::new(encoded, attribute, encoding)?;
        Ok(())
    }

    pub fn is_logical(&self) -> bool {
        !matches!(self, ComponentValue::Simple(_))
    }

    /// The decoded standard form of a concrete value
    pub fn standard(&self) -> Option<&str> {
        match self {
            ComponentValue::Simple(simple) => Some(simple.standard()),
            _ => None,
        }
    }

    /// Emit the value as a WFN string (unquoted)
    pub fn as_wfn(&self) -> Result<&str> {
        match self {
            ComponentValue::Simple(simple) => Ok(simple.standard()),
            other => Err(Error::UnsupportedOperation(format!(
                "WFN emission of logical value {other}"
            ))),
        }
    }

    /// Emit the value as a 2.3 URI string
    pub fn as_uri(&self) -> Result<String> {
        match self {
            ComponentValue::Simple(simple) => Ok(encoding::emit_uri(simple.standard())),
            other => Err(Error::UnsupportedOperation(format!(
                "URI emission of logical value {other}"
            ))),
        }
    }

    /// Emit the value as a formatted-string string
    pub fn as_fs(&self) -> Result<String> {
        match self {
            ComponentValue::Simple(simple) => Ok(encoding::emit_fs(simple.standard())),
            other => Err(Error::UnsupportedOperation(format!(
                "formatted-string emission of logical value {other}"
            ))),
        }
    }

    /// The set relation of `self` (the source, which may carry
    /// wildcards) over `target`.
    ///
    /// Identical values compare equal even when both carry wildcards;
    /// beyond that, wildcards in the target make the relation undefined,
    /// ANY (and the values equivalent to it) is a superset of everything,
    /// NA is disjoint from every concrete value, and two concrete values
    /// fall to the pattern comparison.
    pub fn compare(&self, target: &ComponentValue) -> Relation {
        use ComponentValue::*;

        if self == target {
            return Relation::Equal;
        }

        if let Simple(t) = target {
            if pattern::has_unquoted_wildcard(t.standard()) {
                return Relation::Undefined;
            }
        }

        match (self, target) {
            (Any | Empty | Undefined, _) => Relation::Superset,
            (_, Any | Empty | Undefined) => Relation::Subset,
            (NotApplicable, _) | (_, NotApplicable) => Relation::Disjoint,
            (Simple(s), Simple(t)) => pattern::compare_strings(s.standard(), t.standard()),
        }
    }

    /// True when `self` covers `other`: the relation is Superset or
    /// Equal. This is the subset relation that drives name matching.
    pub fn contains(&self, other: &ComponentValue) -> bool {
        matches!(self.compare(other), Relation::Superset | Relation::Equal)
    }
}

impl PartialEq for ComponentValue {
    fn eq(&self, other: &Self) -> bool {
        use ComponentValue::*;
        match (self, other) {
            // ANY, an empty field, and an unset attribute are the same
            // value for comparison purposes
            (Any | Empty | Undefined, Any | Empty | Undefined) => true,
            (NotApplicable, NotApplicable) => true,
            (Simple(a), Simple(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for ComponentValue {}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComponentValue::Any => write!(f, "ANY"),
            ComponentValue::NotApplicable => write!(f, "NA"),
            ComponentValue::Empty => write!(f, "<empty>"),
            ComponentValue::Undefined => write!(f, "<undefined>"),
            ComponentValue::Simple(simple) => write!(f, "\"{}\"", simple.standard()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_fs(encoded: &str, att: Attribute) -> ComponentValue {
        ComponentValue::from_fs(encoded, att).unwrap()
    }

    #[test]
    fn test_invalid_part_value() {
        let err = ComponentValue::from_fs("j", Attribute::Part).unwrap_err();
        assert_eq!(err.code(), "INVALID_VALUE");
    }

    #[test]
    fn test_wildcard_part_value() {
        assert!(ComponentValue::from_fs("?", Attribute::Part).is_ok());
        assert!(ComponentValue::from_wfn("a", Attribute::Part).is_ok());
    }

    #[test]
    fn test_any_is_top() {
        let any = ComponentValue::Any;
        assert!(any.contains(&ComponentValue::NotApplicable));
        assert!(any.contains(&ComponentValue::Undefined));
        assert!(any.contains(&simple_fs("5.9", Attribute::Version)));
        assert!(any.contains(&ComponentValue::Any));
    }

    #[test]
    fn test_na_is_minimal() {
        let na = ComponentValue::NotApplicable;
        let simple = simple_fs("5.9", Attribute::Version);
        assert!(na.contains(&ComponentValue::NotApplicable));
        assert!(!na.contains(&simple));
        assert!(!simple.contains(&na));
        assert!(ComponentValue::Any.contains(&na));
    }

    #[test]
    fn test_reflexive_contains() {
        for value in [
            simple_fs("5.9", Attribute::Version),
            simple_fs("8.*", Attribute::Version),
            ComponentValue::Any,
            ComponentValue::NotApplicable,
            ComponentValue::Empty,
        ] {
            assert!(value.contains(&value), "{value} should contain itself");
        }
    }

    #[test]
    fn test_wildcard_containment() {
        let star = ComponentValue::from_wfn("*", Attribute::Version).unwrap();
        let concrete = simple_fs("8.1", Attribute::Version);
        assert!(star.contains(&concrete));
        assert!(!concrete.contains(&star));

        let prefix = simple_fs("8.*", Attribute::Version);
        assert!(prefix.contains(&simple_fs("8.1", Attribute::Version)));
        assert!(!prefix.contains(&simple_fs("9.1", Attribute::Version)));
    }

    #[test]
    fn test_target_wildcards_are_undefined() {
        let concrete = simple_fs("8.1", Attribute::Version);
        let pattern = simple_fs("8.*", Attribute::Version);
        assert_eq!(concrete.compare(&pattern), Relation::Undefined);
        assert!(!concrete.contains(&pattern));
    }

    #[test]
    fn test_compare_relations() {
        let concrete = simple_fs("5.9", Attribute::Version);
        assert_eq!(ComponentValue::Any.compare(&concrete), Relation::Superset);
        assert_eq!(concrete.compare(&ComponentValue::Any), Relation::Subset);
        assert_eq!(
            concrete.compare(&ComponentValue::NotApplicable),
            Relation::Disjoint
        );
        assert_eq!(concrete.compare(&simple_fs("5.9", Attribute::Version)), Relation::Equal);
        assert_eq!(
            concrete.compare(&simple_fs("5.8", Attribute::Version)),
            Relation::Disjoint
        );
    }

    #[test]
    fn test_logical_equivalence() {
        assert_eq!(ComponentValue::Any, ComponentValue::Empty);
        assert_eq!(ComponentValue::Empty, ComponentValue::Undefined);
        assert_ne!(ComponentValue::Any, ComponentValue::NotApplicable);
        assert_ne!(
            ComponentValue::Any,
            simple_fs("5.9", Attribute::Version)
        );
    }

    #[test]
    fn test_round_trip_encodings() {
        let value = ComponentValue::from_fs("8.*", Attribute::Version).unwrap();
        assert_eq!(value.as_wfn().unwrap(), r"8\.*");
        assert_eq!(value.as_fs().unwrap(), "8.*");
        assert_eq!(value.as_uri().unwrap(), "8.%02");

        let reparsed = ComponentValue::from_uri(&value.as_uri().unwrap(), Attribute::Version).unwrap();
        assert_eq!(value, reparsed);
    }

    #[test]
    fn test_logical_emission_is_unsupported() {
        assert!(ComponentValue::Any.as_wfn().is_err());
        assert!(ComponentValue::NotApplicable.as_fs().is_err());
        assert!(ComponentValue::Undefined.as_uri().is_err());
    }

    #[test]
    fn test_set_revalidates() {
        let mut value = simple_fs("5.9", Attribute::Version);
        value.set("6.0").unwrap();
        assert_eq!(value.standard(), Some(r"6\.0"));

        // a failed set keeps the old value
        assert!(value.set("a?b").is_err());
        assert_eq!(value.standard(), Some(r"6\.0"));

        let mut logical = ComponentValue::Any;
        assert!(logical.set("x").is_err());
    }
}
