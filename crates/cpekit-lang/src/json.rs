//! NVD JSON configurations parser
//!
//! Reads the `{"configurations": {"nodes": [...]}}` shape: each node
//! carries an operator, an optional negate flag, and either nested
//! children or a `cpe_match` array of bound 2.3 names. Every top-level
//! node becomes one platform, so the document-level any-platform rule
//! gives the usual OR across nodes.

use serde::Deserialize;
use tracing::debug;

use cpekit_core::{Error, Result};
use cpekit_naming::Name;

use crate::expr::{Operand, Operator, Platform, PlatformSpec};

#[derive(Debug, Deserialize)]
struct Document {
    configurations: Configurations,
}

#[derive(Debug, Deserialize)]
struct Configurations {
    #[serde(default)]
    nodes: Vec<Node>,
}

#[derive(Debug, Deserialize)]
struct Node {
    operator: Option<String>,
    #[serde(default)]
    negate: bool,
    #[serde(default)]
    children: Vec<Node>,
    #[serde(default, rename = "cpe_match")]
    cpe_match: Vec<CpeMatch>,
}

#[derive(Debug, Deserialize)]
struct CpeMatch {
    #[serde(rename = "cpe23Uri")]
    cpe23_uri: String,
    #[serde(default)]
    vulnerable: bool,
}

fn expression_error(location: &str, reason: impl Into<String>) -> Error {
    Error::InvalidExpression {
        location: location.to_string(),
        reason: reason.into(),
    }
}

fn build_node(node: Node, location: &str) -> Result<Operand> {
    let operator_text = node
        .operator
        .ok_or_else(|| expression_error(location, "missing operator"))?;
    let operator = Operator::parse(&operator_text, location)?;

    let mut children = Vec::with_capacity(node.children.len() + node.cpe_match.len());
    for (idx, child) in node.children.into_iter().enumerate() {
        children.push(build_node(child, &format!("{location}.children[{idx}]"))?);
    }
    for (idx, entry) in node.cpe_match.into_iter().enumerate() {
        debug!(
            cpe = %entry.cpe23_uri,
            vulnerable = entry.vulnerable,
            "fact reference from cpe_match"
        );
        let name = Name::parse(&entry.cpe23_uri).map_err(|e| {
            expression_error(&format!("{location}.cpe_match[{idx}]"), e.to_string())
        })?;
        children.push(Operand::FactRef(name));
    }

    if children.is_empty() {
        return Err(expression_error(location, "node without operands"));
    }

    Ok(Operand::Test {
        operator,
        negate: node.negate,
        children,
    })
}

/// Parse an NVD JSON document into its platforms
pub fn parse(json: &str) -> Result<PlatformSpec> {
    let document: Document = serde_json::from_str(json)?;

    let mut platforms = Vec::with_capacity(document.configurations.nodes.len());
    for (idx, node) in document.configurations.nodes.into_iter().enumerate() {
        let location = format!("nodes[{idx}]");
        platforms.push(Platform {
            id: Some(location.clone()),
            title: None,
            test: build_node(node, &location)?,
        });
    }

    Ok(PlatformSpec { platforms })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cpekit_naming::NameSet;

    fn known(names: &[&str]) -> NameSet {
        names.iter().map(|n| Name::parse(n).unwrap()).collect()
    }

    #[test]
    fn test_parse_flat_node() {
        let document = r#"{
            "configurations": {
                "nodes": [
                    {
                        "operator": "OR",
                        "cpe_match": [
                            {"cpe23Uri": "cpe:2.3:a:bea:weblogic:8.*:*:*:*:*:*:*:*", "vulnerable": true}
                        ]
                    }
                ]
            }
        }"#;
        let spec = parse(document).unwrap();
        assert_eq!(spec.platforms.len(), 1);

        let k = known(&["cpe:2.3:a:bea:weblogic:8.1:*:*:*:*:*:*:*"]);
        assert!(spec.matches(&k));
        assert!(!spec.matches(&known(&["cpe:2.3:a:bea:weblogic:9.0:*:*:*:*:*:*:*"])));
    }

    #[test]
    fn test_parse_nested_nodes() {
        let document = r#"{
            "configurations": {
                "nodes": [
                    {
                        "operator": "AND",
                        "children": [
                            {
                                "operator": "OR",
                                "cpe_match": [
                                    {"cpe23Uri": "cpe:2.3:o:sun:solaris:5.8:*:*:*:*:*:*:*", "vulnerable": false},
                                    {"cpe23Uri": "cpe:2.3:o:sun:solaris:5.9:*:*:*:*:*:*:*", "vulnerable": false}
                                ]
                            },
                            {
                                "operator": "OR",
                                "cpe_match": [
                                    {"cpe23Uri": "cpe:2.3:a:bea:weblogic:8.1:*:*:*:*:*:*:*", "vulnerable": true}
                                ]
                            }
                        ]
                    }
                ]
            }
        }"#;
        let spec = parse(document).unwrap();

        let k = known(&[
            "cpe:2.3:o:sun:solaris:5.9:*:*:*:*:*:*:*",
            "cpe:2.3:a:bea:weblogic:8.1:*:*:*:*:*:*:*",
        ]);
        assert!(spec.matches(&k));
        assert!(!spec.matches(&known(&["cpe:2.3:o:sun:solaris:5.9:*:*:*:*:*:*:*"])));
    }

    #[test]
    fn test_negate_flag() {
        let document = r#"{
            "configurations": {
                "nodes": [
                    {
                        "operator": "OR",
                        "negate": true,
                        "cpe_match": [
                            {"cpe23Uri": "cpe:2.3:o:microsoft:windows_xp:*:*:*:*:*:*:*:*", "vulnerable": true}
                        ]
                    }
                ]
            }
        }"#;
        let spec = parse(document).unwrap();
        assert!(spec.matches(&known(&["cpe:2.3:o:sun:solaris:5.9:*:*:*:*:*:*:*"])));
        assert!(!spec.matches(&known(&["cpe:2.3:o:microsoft:windows_xp:*:*:*:*:*:*:*:*"])));
    }

    #[test]
    fn test_top_level_nodes_are_alternatives() {
        let document = r#"{
            "configurations": {
                "nodes": [
                    {"operator": "OR", "cpe_match": [{"cpe23Uri": "cpe:2.3:o:microsoft:windows_xp:*:*:*:*:*:*:*:*"}]},
                    {"operator": "OR", "cpe_match": [{"cpe23Uri": "cpe:2.3:o:sun:solaris:5.9:*:*:*:*:*:*:*"}]}
                ]
            }
        }"#;
        let spec = parse(document).unwrap();
        assert_eq!(spec.platforms.len(), 2);
        assert!(spec.matches(&known(&["cpe:2.3:o:sun:solaris:5.9:*:*:*:*:*:*:*"])));
    }

    #[test]
    fn test_unknown_operator_is_rejected() {
        let document = r#"{"configurations": {"nodes": [{"operator": "XOR", "cpe_match": [{"cpe23Uri": "cpe:2.3:a:x:y:*:*:*:*:*:*:*:*"}]}]}}"#;
        let err = parse(document).unwrap_err();
        assert_eq!(err.code(), "INVALID_EXPRESSION");
    }

    #[test]
    fn test_missing_operator_is_rejected() {
        let document = r#"{"configurations": {"nodes": [{"cpe_match": [{"cpe23Uri": "cpe:2.3:a:x:y:*:*:*:*:*:*:*:*"}]}]}}"#;
        assert!(parse(document).is_err());
    }

    #[test]
    fn test_empty_node_is_rejected() {
        let document = r#"{"configurations": {"nodes": [{"operator": "AND"}]}}"#;
        assert!(parse(document).is_err());
    }

    #[test]
    fn test_malformed_fact_ref_is_rejected() {
        let document = r#"{"configurations": {"nodes": [{"operator": "OR", "cpe_match": [{"cpe23Uri": "not a name"}]}]}}"#;
        let err = parse(document).unwrap_err();
        assert_eq!(err.code(), "INVALID_EXPRESSION");
    }

    #[test]
    fn test_invalid_json_surfaces_as_json_error() {
        let err = parse("{not json").unwrap_err();
        assert_eq!(err.code(), "JSON_ERROR");
    }
}
