//! The 2.3 formatted-string grammar: `cpe:2.3:` plus eleven fields

use cpekit_core::{Attribute, ComponentValue, CpeVersion, Error, Result};

use crate::name::{Element, Name};

const PREFIX: &str = "cpe:2.3:";

fn malformed(input: &str, reason: impl Into<String>) -> Error {
    Error::InvalidFormat {
        version: CpeVersion::V2_3,
        input: input.to_string(),
        reason: reason.into(),
    }
}

/// Split on the colons that are not protected by a quoting backslash
fn split_fields(rest: &str) -> Vec<&str> {
    let bytes = rest.as_bytes();
    let mut fields = Vec::with_capacity(11);
    let mut start = 0;
    for (idx, b) in bytes.iter().enumerate() {
        if *b == b':' && (idx == 0 || bytes[idx - 1] != b'\\') {
            fields.push(&rest[start..idx]);
            start = idx + 1;
        }
    }
    fields.push(&rest[start..]);
    fields
}

/// Parse a formatted string: exactly eleven fields, `*` for ANY and `-`
/// for NA
pub fn parse(input: &str) -> Result<Name> {
    let source = input.to_lowercase();

    if source.contains(' ') {
        return Err(malformed(input, "it must not have whitespaces"));
    }

    let rest = source
        .strip_prefix(PREFIX)
        .ok_or_else(|| malformed(input, "formatted string prefix not found"))?;

    let fields = split_fields(rest);
    if fields.len() != 11 {
        return Err(malformed(
            input,
            format!("expected 11 components, found {}", fields.len()),
        ));
    }

    let mut element = Element::new();
    for (field, attribute) in fields.iter().zip(Attribute::ALL) {
        let value = match *field {
            "*" => ComponentValue::Any,
            "-" => ComponentValue::NotApplicable,
            text => ComponentValue::from_fs(text, attribute)
                .map_err(|e| malformed(input, e.to_string()))?,
        };
        element.set(attribute, value);
    }

    // the bound forms only carry a system class letter in the part slot
    if let ComponentValue::Simple(part) = element.get(Attribute::Part) {
        if !matches!(part.standard(), "a" | "o" | "h") {
            return Err(malformed(
                input,
                format!("part value '{}' is invalid", part.standard()),
            ));
        }
    }

    Ok(Name::from_parts(CpeVersion::V2_3, source, vec![element]))
}

/// Emit a name as a formatted string: every attribute written, ANY and
/// the unset values as `*`, NA as `-`
pub fn emit(name: &Name) -> Result<String> {
    name.ensure_convertible("2.3 formatted string")?;
    name.ensure_concrete_part("2.3 formatted string")?;
    let element = &name.elements()[0];

    let mut fields = Vec::with_capacity(Attribute::ALL.len());
    for (_, value) in element.iter() {
        let field = match value {
            ComponentValue::Any | ComponentValue::Empty | ComponentValue::Undefined => {
                "*".to_string()
            }
            ComponentValue::NotApplicable => "-".to_string(),
            ComponentValue::Simple(_) => value.as_fs()?,
        };
        fields.push(field);
    }

    Ok(format!("{}{}", PREFIX, fields.join(":")))
}
