//! Versions of the CPE specification

use std::fmt;

use serde::{Deserialize, Serialize};

/// Version of the CPE specification a name was written against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CpeVersion {
    /// Version 1.1: `cpe://` URIs with multi-element parts
    #[serde(rename = "1.1")]
    V1_1,
    /// Version 2.2: `cpe:/` URIs with seven colon-separated fields
    #[serde(rename = "2.2")]
    V2_2,
    /// Version 2.3: WFN, URI, and formatted-string bindings
    #[serde(rename = "2.3")]
    V2_3,
}

impl CpeVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            CpeVersion::V1_1 => "1.1",
            CpeVersion::V2_2 => "2.2",
            CpeVersion::V2_3 => "2.3",
        }
    }
}

impl fmt::Display for CpeVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(CpeVersion::V1_1.to_string(), "1.1");
        assert_eq!(CpeVersion::V2_3.to_string(), "2.3");
    }
}
