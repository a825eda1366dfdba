//! The URI grammar: `cpe:/part:vendor:product:version:update:edition:language`
//!
//! The same surface serves two bindings. The 2.3 URI binding percent
//! encodes punctuation, binds `%01`/`%02` to the wildcards, reads a bare
//! `-` field as NA, and may pack the four extended attributes into the
//! edition field. The 2.2 binding predates all of that: values are a
//! plain character set and every field is literal.

use cpekit_core::{Attribute, ComponentValue, CpeVersion, Error, Result};

use crate::name::{Element, Name};

const PREFIX: &str = "cpe:/";

/// The order the edition field packs its subfields in
const PACKED_ATTRIBUTES: [Attribute; 5] = [
    Attribute::Edition,
    Attribute::SwEdition,
    Attribute::TargetSw,
    Attribute::TargetHw,
    Attribute::Other,
];

fn malformed(version: CpeVersion, input: &str, reason: impl Into<String>) -> Error {
    Error::InvalidFormat {
        version,
        input: input.to_string(),
        reason: reason.into(),
    }
}

fn split_fields<'a>(version: CpeVersion, input: &str, source: &'a str) -> Result<Vec<&'a str>> {
    if source.contains(' ') {
        return Err(malformed(version, input, "it must not have whitespaces"));
    }

    let rest = source
        .strip_prefix(PREFIX)
        .ok_or_else(|| malformed(version, input, "URI prefix not found"))?;
    if rest.contains('/') {
        return Err(malformed(version, input, "slash outside the URI prefix"));
    }

    let fields: Vec<&str> = if rest.is_empty() {
        Vec::new()
    } else {
        rest.split(':').collect()
    };
    if fields.len() > 7 {
        return Err(malformed(version, input, "more than seven components"));
    }

    Ok(fields)
}

/// Unpack a `~`-led edition field into the five packed attributes
fn unpack_edition(
    version: CpeVersion,
    input: &str,
    field: &str,
    element: &mut Element,
    parse_value: &dyn Fn(&str, Attribute) -> Result<ComponentValue>,
) -> Result<()> {
    let pieces: Vec<&str> = field.split('~').collect();
    if pieces.len() != 6 || !pieces[0].is_empty() {
        return Err(malformed(
            version,
            input,
            format!("edition value '{field}' is not a valid packed edition"),
        ));
    }

    for (piece, attribute) in pieces[1..].iter().zip(PACKED_ATTRIBUTES) {
        let value = match *piece {
            "" => ComponentValue::Any,
            "-" => ComponentValue::NotApplicable,
            text => {
                parse_value(text, attribute).map_err(|e| malformed(version, input, e.to_string()))?
            }
        };
        element.set(attribute, value);
    }

    Ok(())
}

fn parse_with(
    input: &str,
    version: CpeVersion,
    parse_value: &dyn Fn(&str, Attribute) -> Result<ComponentValue>,
) -> Result<Name> {
    let source = input.to_lowercase();
    let fields = split_fields(version, input, &source)?;

    let mut element = Element::new();
    for (i, attribute) in Attribute::CORE.into_iter().enumerate() {
        let Some(field) = fields.get(i) else {
            break;
        };

        if field.is_empty() {
            element.set(attribute, ComponentValue::Empty);
        } else if *field == "-" && version == CpeVersion::V2_3 {
            element.set(attribute, ComponentValue::NotApplicable);
        } else if attribute == Attribute::Edition && field.starts_with('~') {
            unpack_edition(version, input, field, &mut element, parse_value)?;
        } else {
            let value = parse_value(field, attribute)
                .map_err(|e| malformed(version, input, e.to_string()))?;
            element.set(attribute, value);
        }
    }

    // the bound forms only carry a system class letter in the part slot
    if let ComponentValue::Simple(part) = element.get(Attribute::Part) {
        if !matches!(part.standard(), "a" | "o" | "h") {
            return Err(malformed(
                version,
                input,
                format!("part value '{}' is invalid", part.standard()),
            ));
        }
    }

    Ok(Name::from_parts(version, source, vec![element]))
}

/// Parse a 2.3 URI
pub fn parse(input: &str) -> Result<Name> {
    parse_with(input, CpeVersion::V2_3, &ComponentValue::from_uri)
}

/// Parse a 2.2 URI
pub fn parse_legacy(input: &str) -> Result<Name> {
    parse_with(input, CpeVersion::V2_2, &ComponentValue::from_uri_legacy)
}

/// Compute the edition field: packed when any extended attribute has a
/// value, the plain edition otherwise
fn pack_edition(element: &Element) -> Result<String> {
    let mut values = Vec::with_capacity(PACKED_ATTRIBUTES.len());
    for attribute in PACKED_ATTRIBUTES {
        let value = match element.get(attribute) {
            ComponentValue::Any | ComponentValue::Empty | ComponentValue::Undefined => {
                String::new()
            }
            ComponentValue::NotApplicable => "-".to_string(),
            simple @ ComponentValue::Simple(_) => simple.as_uri()?,
        };
        values.push(value);
    }

    if values[1..].iter().all(|v| v.is_empty()) {
        Ok(values[0].clone())
    } else {
        Ok(format!("~{}", values.join("~")))
    }
}

/// Emit a name as a 2.3 URI string with trailing empty fields trimmed
pub fn emit(name: &Name) -> Result<String> {
    name.ensure_convertible("2.3 URI")?;
    name.ensure_concrete_part("2.3 URI")?;
    let element = &name.elements()[0];

    let mut fields = Vec::with_capacity(Attribute::CORE.len());
    for attribute in Attribute::CORE {
        let field = if attribute == Attribute::Edition {
            pack_edition(element)?
        } else {
            match element.get(attribute) {
                ComponentValue::Any | ComponentValue::Empty | ComponentValue::Undefined => {
                    String::new()
                }
                ComponentValue::NotApplicable => "-".to_string(),
                simple @ ComponentValue::Simple(_) => simple.as_uri()?,
            }
        };
        fields.push(field);
    }

    let uri = format!("{}{}", PREFIX, fields.join(":"));
    Ok(uri.trim_end_matches(':').to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_uri() {
        let name = parse("cpe:/a:acme:product:1.0:update2:pro:en-us").unwrap();
        assert_eq!(name.version(), CpeVersion::V2_3);
        assert_eq!(name.vendor()[0].standard(), Some("acme"));
        assert_eq!(name.language()[0].standard(), Some(r"en\-us"));
    }

    #[test]
    fn test_sparse_fields() {
        let name = parse("cpe:/o:microsoft:windows_xp:::pro").unwrap();
        assert_eq!(name.product_version()[0], &ComponentValue::Empty);
        assert_eq!(name.update()[0], &ComponentValue::Empty);
        assert_eq!(name.edition()[0].standard(), Some("pro"));
        assert_eq!(name.language()[0], &ComponentValue::Undefined);
    }

    #[test]
    fn test_empty_uri_is_valid() {
        let name = parse("cpe:/").unwrap();
        assert_eq!(name.part()[0], &ComponentValue::Undefined);

        let name = parse("cpe:/::::").unwrap();
        assert_eq!(name.part()[0], &ComponentValue::Empty);
    }

    #[test]
    fn test_dash_is_not_applicable() {
        let name = parse("cpe:/a:hp:insight_diagnostics:7.4.0.1570:-").unwrap();
        assert_eq!(name.update()[0], &ComponentValue::NotApplicable);
    }

    #[test]
    fn test_packed_edition_unpacks() {
        let name = parse("cpe:/a:hp:insight_diagnostics:7.4.0.1570:-:~~online~win2003~x64~").unwrap();
        assert_eq!(name.edition()[0], &ComponentValue::Any);
        assert_eq!(name.sw_edition()[0].standard(), Some("online"));
        assert_eq!(name.target_sw()[0].standard(), Some("win2003"));
        assert_eq!(name.target_hw()[0].standard(), Some("x64"));
        assert_eq!(name.other()[0], &ComponentValue::Any);
    }

    #[test]
    fn test_bad_packed_edition_is_rejected() {
        let err = parse("cpe:/a:hp:insight_diagnostics:7.4.0.1570::~~online~win2003~x64~~~")
            .unwrap_err();
        assert_eq!(err.code(), "INVALID_FORMAT");
    }

    #[test]
    fn test_bad_part_is_rejected() {
        assert!(parse("cpe:/b::::").is_err());
        assert!(parse_legacy("cpe:/b::::").is_err());
    }

    #[test]
    fn test_legacy_accepts_raw_percent() {
        assert!(parse("cpe:/a:mozilla:firefox:2.0:%up:").is_err());
        let name = parse_legacy("cpe:/a:mozilla:firefox:2.0:%up:").unwrap();
        assert_eq!(name.update()[0].standard(), Some(r"\%up"));
        assert_eq!(name.edition()[0], &ComponentValue::Empty);
    }

    #[test]
    fn test_legacy_accepts_tilde_values() {
        let name = parse_legacy("cpe:/h:nvidia.buena_2~~pero_rara:11.0").unwrap();
        assert_eq!(
            name.vendor()[0].standard(),
            Some(r"nvidia\.buena_2\~\~pero_rara")
        );
    }

    #[test]
    fn test_round_trip_with_packing() {
        let text = "cpe:/a:hp:insight_diagnostics:7.4.0.1570:-:~~online~win2003~x64~";
        let name = parse(text).unwrap();
        assert_eq!(name.as_uri().unwrap(), text);
    }

    #[test]
    fn test_wildcard_part_does_not_lower() {
        // only the WFN can hold a wildcard part; the bound forms reject it
        assert!(crate::fs::parse("cpe:2.3:?:microsoft:ie:10:*:*:*:*:*:*:*").is_err());

        let name = crate::wfn::parse(r#"wfn:[part="?", vendor="microsoft"]"#).unwrap();
        assert_eq!(name.as_uri().unwrap_err().code(), "INCOMPATIBLE");
        assert_eq!(name.as_fs().unwrap_err().code(), "INCOMPATIBLE");
        assert!(name.as_wfn().is_ok());
    }

    #[test]
    fn test_round_trip_trims_trailing_fields() {
        let name = parse("cpe:/a:mozilla:firefox:2.0.0.6::osx:es-es").unwrap();
        assert_eq!(name.as_uri().unwrap(), "cpe:/a:mozilla:firefox:2.0.0.6::osx:es-es");

        let name = parse("cpe:/h:nvidia").unwrap();
        assert_eq!(name.as_uri().unwrap(), "cpe:/h:nvidia");
    }
}
