//! The 1.1 URI grammar: `cpe://` with parts, elements, and operators
//!
//! A 1.1 name can describe several systems at once: up to three
//! `/`-separated parts (hardware, operating system, application), each a
//! `;`-separated list of elements, each element a `:`-separated list of
//! values. Values may carry the 1.1 operators: a leading `~` negates a
//! name, `!` separates alternatives. Both survive, quoted, in the
//! standard form and are interpreted by the 1.1 matching rules below.

use cpekit_core::{Attribute, ComponentValue, CpeVersion, Error, Result};

use crate::name::{Element, Name};

const PREFIX: &str = "cpe:/";

/// The system class each part position stands for
const PART_CLASSES: [&str; 3] = ["h", "o", "a"];

fn malformed(input: &str, reason: impl Into<String>) -> Error {
    Error::InvalidFormat {
        version: CpeVersion::V1_1,
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Parse a 1.1 URI
pub fn parse(input: &str) -> Result<Name> {
    let source = input.to_lowercase();

    if source.contains(' ') {
        return Err(malformed(input, "it must not have whitespaces"));
    }

    let rest = source
        .strip_prefix(PREFIX)
        .ok_or_else(|| malformed(input, "URI prefix not found"))?;

    let parts: Vec<&str> = rest.split('/').collect();
    if parts.len() > PART_CLASSES.len() {
        return Err(malformed(input, "more than three parts"));
    }

    let mut elements = Vec::new();
    for (part_text, class) in parts.iter().zip(PART_CLASSES) {
        if part_text.is_empty() {
            continue;
        }

        for element_text in part_text.split(';') {
            let mut element = Element::new();
            element.set(
                Attribute::Part,
                ComponentValue::from_wfn(class, Attribute::Part)
                    .map_err(|e| malformed(input, e.to_string()))?,
            );

            let values: Vec<&str> = element_text.split(':').collect();
            if values.len() > Attribute::CORE.len() - 1 {
                return Err(malformed(
                    input,
                    format!("element '{element_text}' has more than six components"),
                ));
            }

            // values map positionally onto vendor .. language
            for (value_text, attribute) in values.iter().zip(&Attribute::CORE[1..]) {
                let value = if value_text.is_empty() {
                    ComponentValue::Empty
                } else {
                    ComponentValue::from_v1(value_text, *attribute)
                        .map_err(|e| malformed(input, e.to_string()))?
                };
                element.set(*attribute, value);
            }

            elements.push(element);
        }
    }

    Ok(Name::from_parts(CpeVersion::V1_1, source, elements))
}

/// True when a standard-form value carries a 1.1 operator: a quoted `!`
/// anywhere or a quoted `~` at the front
pub(crate) fn uses_operators(standard: &str) -> bool {
    standard.contains(r"\!") || standard.starts_with(r"\~")
}

/// A 1.1 element value split into its operator structure
struct V1Value<'a> {
    negated: bool,
    names: Vec<&'a str>,
}

fn split_value(standard: &str) -> V1Value<'_> {
    let (negated, body) = match standard.strip_prefix(r"\~") {
        Some(body) => (true, body),
        None => (false, standard),
    };
    V1Value {
        negated,
        names: body.split(r"\!").collect(),
    }
}

/// The 1.1 component containment rules.
///
/// With `c` the candidate value and `k` the known value:
/// - an empty or unset `c` covers anything
/// - a singleton covers an equal value
/// - `~v` covers any value other than plain `v`
/// - `v1!v2!..!vn` covers any plain `v` among its alternatives
pub(crate) fn value_contains(c: &ComponentValue, k: &ComponentValue) -> bool {
    use ComponentValue::*;

    if c == k {
        return true;
    }

    match (c, k) {
        (Any | Empty | Undefined, _) => true,
        (Simple(cs), Simple(ks)) => {
            let c = split_value(cs.standard());
            let k = split_value(ks.standard());

            if c.names.len() == 1 {
                // the equal case returned above; a negated singleton
                // covers everything except its own plain name
                c.negated && !(k.names == c.names && !k.negated)
            } else {
                !c.negated && !k.negated && k.names.len() == 1 && c.names.contains(&k.names[0])
            }
        }
        _ => false,
    }
}
