//! MITRE applicability XML parser
//!
//! Reads the `http://cpe.mitre.org/language/2.0` platform-specification
//! format: `cpe:platform` elements holding a title and one root
//! `cpe:logical-test`, with nested tests and `cpe:fact-ref` leaves.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::warn;

use cpekit_core::{Error, Result};
use cpekit_naming::Name;

use crate::expr::{Operand, Operator, Platform, PlatformSpec};

fn expression_error(location: &str, reason: impl Into<String>) -> Error {
    Error::InvalidExpression {
        location: location.to_string(),
        reason: reason.into(),
    }
}

struct PlatformBuilder {
    id: Option<String>,
    title: Option<String>,
    test: Option<Operand>,
}

struct TestFrame {
    operator: Operator,
    negate: bool,
    children: Vec<Operand>,
}

fn attribute_value(tag: &BytesStart<'_>, key: &[u8], location: &str) -> Result<Option<String>> {
    for attr in tag.attributes() {
        let attr = attr.map_err(|e| expression_error(location, e.to_string()))?;
        if attr.key.as_ref() == key {
            let value = attr
                .unescape_value()
                .map_err(|e| expression_error(location, e.to_string()))?;
            return Ok(Some(value.into_owned()));
        }
    }
    Ok(None)
}

fn open_test(tag: &BytesStart<'_>) -> Result<TestFrame> {
    let operator_text = attribute_value(tag, b"operator", "logical-test")?
        .ok_or_else(|| expression_error("logical-test", "missing operator attribute"))?;
    let operator = Operator::parse(&operator_text, "logical-test")?;

    let negate = attribute_value(tag, b"negate", "logical-test")?
        .map(|v| v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    Ok(TestFrame {
        operator,
        negate,
        children: Vec::new(),
    })
}

fn fact_ref(tag: &BytesStart<'_>) -> Result<Operand> {
    let name_text = attribute_value(tag, b"name", "fact-ref")?
        .ok_or_else(|| expression_error("fact-ref", "missing name attribute"))?;
    let name = Name::parse(&name_text)
        .map_err(|e| expression_error("fact-ref", e.to_string()))?;
    Ok(Operand::FactRef(name))
}

/// Parse an applicability XML document into its platforms
pub fn parse(xml: &str) -> Result<PlatformSpec> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    reader.trim_text(true);

    let mut platforms = Vec::new();
    let mut current: Option<PlatformBuilder> = None;
    let mut stack: Vec<TestFrame> = Vec::new();
    let mut in_title = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(tag)) => match tag.local_name().as_ref() {
                b"fact-ref" => {
                    let operand = fact_ref(&tag)?;
                    match stack.last_mut() {
                        Some(frame) => frame.children.push(operand),
                        None => {
                            return Err(expression_error(
                                "fact-ref",
                                "fact-ref outside a logical-test",
                            ))
                        }
                    }
                }
                b"check-fact-ref" => {
                    return Err(expression_error(
                        "check-fact-ref",
                        "check systems (OVAL/OCIL) are not supported",
                    ));
                }
                b"logical-test" => {
                    return Err(expression_error("logical-test", "test without operands"));
                }
                b"platform" => {
                    return Err(expression_error("platform", "platform without a logical-test"));
                }
                other => {
                    warn!(
                        element = %String::from_utf8_lossy(other),
                        "ignoring unknown element in applicability document"
                    );
                }
            },
            Ok(Event::Start(tag)) => {
                match tag.local_name().as_ref() {
                    b"platform-specification" => {}
                    b"platform" => {
                        if current.is_some() {
                            return Err(expression_error("platform", "nested platform element"));
                        }
                        current = Some(PlatformBuilder {
                            id: attribute_value(&tag, b"id", "platform")?,
                            title: None,
                            test: None,
                        });
                    }
                    b"title" => in_title = true,
                    b"logical-test" => {
                        if current.is_none() {
                            return Err(expression_error(
                                "logical-test",
                                "logical-test outside a platform",
                            ));
                        }
                        stack.push(open_test(&tag)?);
                    }
                    b"fact-ref" => {
                        let operand = fact_ref(&tag)?;
                        match stack.last_mut() {
                            Some(frame) => frame.children.push(operand),
                            None => {
                                return Err(expression_error(
                                    "fact-ref",
                                    "fact-ref outside a logical-test",
                                ))
                            }
                        }
                    }
                    b"check-fact-ref" => {
                        return Err(expression_error(
                            "check-fact-ref",
                            "check systems (OVAL/OCIL) are not supported",
                        ));
                    }
                    other => {
                        warn!(
                            element = %String::from_utf8_lossy(other),
                            "ignoring unknown element in applicability document"
                        );
                    }
                }
            }
            Ok(Event::End(tag)) => match tag.local_name().as_ref() {
                b"title" => in_title = false,
                b"logical-test" => {
                    let frame = stack
                        .pop()
                        .ok_or_else(|| expression_error("logical-test", "unbalanced end tag"))?;
                    if frame.children.is_empty() {
                        return Err(expression_error("logical-test", "test without operands"));
                    }
                    let operand = Operand::Test {
                        operator: frame.operator,
                        negate: frame.negate,
                        children: frame.children,
                    };
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(operand),
                        None => {
                            let platform = current.as_mut().ok_or_else(|| {
                                expression_error("logical-test", "logical-test outside a platform")
                            })?;
                            if platform.test.is_some() {
                                return Err(expression_error(
                                    "platform",
                                    "platform with more than one root logical-test",
                                ));
                            }
                            platform.test = Some(operand);
                        }
                    }
                }
                b"platform" => {
                    let builder = current
                        .take()
                        .ok_or_else(|| expression_error("platform", "unbalanced end tag"))?;
                    let test = builder.test.ok_or_else(|| {
                        expression_error("platform", "platform without a logical-test")
                    })?;
                    platforms.push(Platform {
                        id: builder.id,
                        title: builder.title,
                        test,
                    });
                }
                _ => {}
            },
            Ok(Event::Text(text)) => {
                if in_title {
                    if let Some(platform) = current.as_mut() {
                        let value = text
                            .unescape()
                            .map_err(|e| expression_error("title", e.to_string()))?;
                        platform.title = Some(value.into_owned());
                    }
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(expression_error(
                    &format!("byte {}", reader.buffer_position()),
                    e.to_string(),
                ))
            }
        }
        buf.clear();
    }

    Ok(PlatformSpec { platforms })
}
