//! The Well-Formed Name grammar: `wfn:[att=value, ...]`

use std::str::FromStr;

use cpekit_core::{Attribute, ComponentValue, CpeVersion, Error, Result};

use crate::name::{Element, Name};

const PREFIX: &str = "wfn:[";
const SUFFIX: &str = "]";

fn malformed(input: &str, reason: impl Into<String>) -> Error {
    Error::InvalidFormat {
        version: CpeVersion::V2_3,
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Parse a WFN. Missing attributes default to undefined; `ANY` and `NA`
/// are the only logical spellings.
pub fn parse(input: &str) -> Result<Name> {
    let source = input.to_lowercase();

    let content = source
        .strip_prefix(PREFIX)
        .ok_or_else(|| malformed(input, "WFN prefix not found"))?
        .strip_suffix(SUFFIX)
        .ok_or_else(|| malformed(input, "final bracket of WFN not found"))?;

    let mut element = Element::new();
    let mut seen: Vec<Attribute> = Vec::new();

    if !content.is_empty() {
        for pair in content.split(", ") {
            if pair.contains(' ') {
                return Err(malformed(input, "whitespace inside an attribute-value pair"));
            }

            let (att_name, att_value) = pair
                .split_once('=')
                .ok_or_else(|| malformed(input, format!("missing '=' in '{pair}'")))?;

            let attribute = Attribute::from_str(att_name)
                .map_err(|_| malformed(input, format!("invalid attribute name '{att_name}'")))?;

            if seen.contains(&attribute) {
                return Err(malformed(input, format!("attribute '{attribute}' repeated")));
            }
            seen.push(attribute);

            let value = if let Some(quoted) = att_value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
            {
                ComponentValue::from_wfn(quoted, attribute)
                    .map_err(|e| malformed(input, e.to_string()))?
            } else {
                // the source is lowercased, so the logical spellings are too
                match att_value {
                    "any" => ComponentValue::Any,
                    "na" => ComponentValue::NotApplicable,
                    other => {
                        return Err(malformed(input, format!("invalid logical value '{other}'")))
                    }
                }
            };

            element.set(attribute, value);
        }
    }

    Ok(Name::from_parts(CpeVersion::V2_3, source, vec![element]))
}

/// Emit a name as a WFN string: concrete values quoted, ANY and NA
/// spelled out, empty and undefined attributes omitted.
pub fn emit(name: &Name) -> Result<String> {
    name.ensure_convertible("2.3 WFN")?;
    let element = &name.elements()[0];

    let mut pairs = Vec::new();
    for (attribute, value) in element.iter() {
        match value {
            ComponentValue::Any => pairs.push(format!("{attribute}=ANY")),
            ComponentValue::NotApplicable => pairs.push(format!("{attribute}=NA")),
            ComponentValue::Empty | ComponentValue::Undefined => continue,
            ComponentValue::Simple(_) => {
                pairs.push(format!("{attribute}=\"{}\"", value.as_wfn()?))
            }
        }
    }

    Ok(format!("wfn:[{}]", pairs.join(", ")))
}
