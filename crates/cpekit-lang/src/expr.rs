//! The applicability expression tree and its evaluator

use std::fmt;
use std::path::Path;

use tracing::debug;

use cpekit_core::{Error, Result};
use cpekit_naming::{Name, NameSet};

/// Logical operator of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    And,
    Or,
}

impl Operator {
    /// Parse the wire spelling, case-insensitively
    pub(crate) fn parse(text: &str, location: &str) -> Result<Self> {
        if text.eq_ignore_ascii_case("and") {
            Ok(Operator::And)
        } else if text.eq_ignore_ascii_case("or") {
            Ok(Operator::Or)
        } else {
            Err(Error::InvalidExpression {
                location: location.to_string(),
                reason: format!("unknown operator '{text}'"),
            })
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::And => "AND",
            Operator::Or => "OR",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One operand of a logical test: either a reference to a CPE name or a
/// nested test
#[derive(Debug, Clone)]
pub enum Operand {
    /// A fact reference: true when the known-instance set matches the name
    FactRef(Name),
    Test {
        operator: Operator,
        negate: bool,
        children: Vec<Operand>,
    },
}

impl Operand {
    /// Evaluate the operand against a known-instance set.
    ///
    /// Children evaluate left to right with short-circuit; `negate`
    /// inverts the folded result of its test.
    pub fn evaluate(&self, known: &NameSet) -> bool {
        match self {
            Operand::FactRef(name) => known.name_match(name),
            Operand::Test {
                operator,
                negate,
                children,
            } => {
                let result = match operator {
                    Operator::And => children.iter().all(|child| child.evaluate(known)),
                    Operator::Or => children.iter().any(|child| child.evaluate(known)),
                };
                if *negate {
                    !result
                } else {
                    result
                }
            }
        }
    }
}

/// A platform: a title and one root logical test
#[derive(Debug, Clone)]
pub struct Platform {
    pub id: Option<String>,
    pub title: Option<String>,
    pub test: Operand,
}

impl Platform {
    /// True when the platform's root test is satisfied by the set
    pub fn matches(&self, known: &NameSet) -> bool {
        let result = self.test.evaluate(known);
        debug!(
            platform = self.id.as_deref().unwrap_or("<unnamed>"),
            result, "evaluated platform"
        );
        result
    }
}

/// A parsed applicability document: zero or more platforms
#[derive(Debug, Clone, Default)]
pub struct PlatformSpec {
    pub platforms: Vec<Platform>,
}

impl PlatformSpec {
    /// Parse the MITRE applicability XML format
    pub fn from_xml(xml: &str) -> Result<Self> {
        crate::xml::parse(xml)
    }

    /// Load and parse an applicability XML document from disk
    pub fn from_xml_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_xml(&content)
    }

    /// Parse the NVD JSON configurations shape
    pub fn from_json(json: &str) -> Result<Self> {
        crate::json::parse(json)
    }

    /// Load and parse an NVD JSON document from disk
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Language matching: true when any platform evaluates true against
    /// the known-instance set. A document with no platforms never
    /// matches.
    pub fn matches(&self, known: &NameSet) -> bool {
        self.platforms.iter().any(|platform| platform.matches(known))
    }
}
