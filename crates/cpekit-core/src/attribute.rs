//! The named fields of a CPE name

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// One of the eleven attributes a CPE name can carry.
///
/// The first seven exist in every version of the specification; the last
/// four (`sw_edition`, `target_sw`, `target_hw`, `other`) were introduced
/// in version 2.3.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribute {
    /// System class: application, operating system, or hardware
    Part,
    Vendor,
    Product,
    Version,
    /// Update or service pack information
    Update,
    Edition,
    /// Language tag (language subtag plus optional region)
    Language,
    SwEdition,
    TargetSw,
    TargetHw,
    Other,
}

impl Attribute {
    /// All eleven attributes in canonical serialization order
    pub const ALL: [Attribute; 11] = [
        Attribute::Part,
        Attribute::Vendor,
        Attribute::Product,
        Attribute::Version,
        Attribute::Update,
        Attribute::Edition,
        Attribute::Language,
        Attribute::SwEdition,
        Attribute::TargetSw,
        Attribute::TargetHw,
        Attribute::Other,
    ];

    /// The seven attributes shared by every specification version, in the
    /// order the URI binding serializes them
    pub const CORE: [Attribute; 7] = [
        Attribute::Part,
        Attribute::Vendor,
        Attribute::Product,
        Attribute::Version,
        Attribute::Update,
        Attribute::Edition,
        Attribute::Language,
    ];

    /// Position of this attribute in the canonical order
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// True for the four attributes introduced in version 2.3
    pub fn is_extended(&self) -> bool {
        matches!(
            self,
            Attribute::SwEdition | Attribute::TargetSw | Attribute::TargetHw | Attribute::Other
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Attribute::Part => "part",
            Attribute::Vendor => "vendor",
            Attribute::Product => "product",
            Attribute::Version => "version",
            Attribute::Update => "update",
            Attribute::Edition => "edition",
            Attribute::Language => "language",
            Attribute::SwEdition => "sw_edition",
            Attribute::TargetSw => "target_sw",
            Attribute::TargetHw => "target_hw",
            Attribute::Other => "other",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Attribute {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "part" => Ok(Attribute::Part),
            "vendor" => Ok(Attribute::Vendor),
            "product" => Ok(Attribute::Product),
            "version" => Ok(Attribute::Version),
            "update" => Ok(Attribute::Update),
            "edition" => Ok(Attribute::Edition),
            "language" => Ok(Attribute::Language),
            "sw_edition" => Ok(Attribute::SwEdition),
            "target_sw" => Ok(Attribute::TargetSw),
            "target_hw" => Ok(Attribute::TargetHw),
            "other" => Ok(Attribute::Other),
            _ => Err(Error::InvalidAttribute(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        assert_eq!(Attribute::Part.index(), 0);
        assert_eq!(Attribute::Other.index(), 10);
        assert_eq!(Attribute::ALL[4], Attribute::Update);
        assert_eq!(Attribute::CORE.len(), 7);
    }

    #[test]
    fn test_round_trip_names() {
        for att in Attribute::ALL {
            assert_eq!(att.as_str().parse::<Attribute>().unwrap(), att);
        }
    }

    #[test]
    fn test_unknown_attribute() {
        let err = "invented".parse::<Attribute>().unwrap_err();
        assert_eq!(err.code(), "INVALID_ATTRIBUTE");
    }

    #[test]
    fn test_extended_attributes() {
        assert!(Attribute::SwEdition.is_extended());
        assert!(!Attribute::Edition.is_extended());
    }
}
