//! CPE names: an ordered collection of component values per version

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use cpekit_core::{Attribute, ComponentValue, CpeVersion, Error, Result};

use crate::{fs, legacy, uri, wfn};

/// One element of a name: a full set of eleven attribute slots.
///
/// Names of version 2.2 and 2.3 always hold exactly one element; a 1.1
/// name holds one element per `;`-separated entry of its parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    slots: [ComponentValue; 11],
}

impl Element {
    pub(crate) fn new() -> Self {
        Element {
            slots: std::array::from_fn(|_| ComponentValue::Undefined),
        }
    }

    pub fn get(&self, attribute: Attribute) -> &ComponentValue {
        &self.slots[attribute.index()]
    }

    pub(crate) fn set(&mut self, attribute: Attribute, value: ComponentValue) {
        self.slots[attribute.index()] = value;
    }

    /// Iterate the slots in canonical attribute order
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &ComponentValue)> {
        Attribute::ALL.into_iter().map(move |att| (att, self.get(att)))
    }
}

impl Default for Element {
    fn default() -> Self {
        Self::new()
    }
}

/// A CPE name: a version tag plus its elements.
///
/// Names are case-insensitive; the stored source string and every
/// component value are folded to lowercase at parse time. A name is
/// immutable once parsed.
#[derive(Debug, Clone)]
pub struct Name {
    version: CpeVersion,
    source: String,
    elements: Vec<Element>,
}

impl Name {
    pub(crate) fn from_parts(version: CpeVersion, source: String, elements: Vec<Element>) -> Self {
        Name {
            version,
            source,
            elements,
        }
    }

    /// Parse a name, detecting its grammar.
    ///
    /// The grammars are tried newest first: 2.3 formatted string, WFN,
    /// 2.3 URI, 2.2 URI, then 1.1. When every grammar rejects the input
    /// the error carries each grammar's reason.
    pub fn parse(input: &str) -> Result<Self> {
        let attempts: [(&str, fn(&str) -> Result<Name>); 5] = [
            ("2.3 formatted string", fs::parse),
            ("2.3 WFN", wfn::parse),
            ("2.3 URI", uri::parse),
            ("2.2 URI", uri::parse_legacy),
            ("1.1 URI", legacy::parse),
        ];

        let mut reasons = Vec::with_capacity(attempts.len());
        for (label, parser) in attempts {
            match parser(input) {
                Ok(name) => {
                    debug!(version = %name.version(), input, "detected CPE name grammar");
                    return Ok(name);
                }
                Err(err) => reasons.push(format!("{label}: {err}")),
            }
        }

        let version = if input.starts_with("cpe:2.3:") || input.starts_with("wfn:[") {
            CpeVersion::V2_3
        } else if input.starts_with("cpe://") {
            CpeVersion::V1_1
        } else {
            CpeVersion::V2_2
        };

        Err(Error::InvalidFormat {
            version,
            input: input.to_string(),
            reason: format!("no grammar accepted the name ({})", reasons.join("; ")),
        })
    }

    /// Parse a Well-Formed Name (`wfn:[...]`)
    pub fn parse_wfn(input: &str) -> Result<Self> {
        wfn::parse(input)
    }

    /// Parse a 2.3 URI (`cpe:/...` with percent encoding)
    pub fn parse_uri(input: &str) -> Result<Self> {
        uri::parse(input)
    }

    /// Parse a 2.2 URI (`cpe:/...` without percent forms)
    pub fn parse_uri_legacy(input: &str) -> Result<Self> {
        uri::parse_legacy(input)
    }

    /// Parse a 2.3 formatted string (`cpe:2.3:...`)
    pub fn parse_fs(input: &str) -> Result<Self> {
        fs::parse(input)
    }

    /// Parse a 1.1 URI (`cpe://...` with parts and elements)
    pub fn parse_v1(input: &str) -> Result<Self> {
        legacy::parse(input)
    }

    pub fn version(&self) -> CpeVersion {
        self.version
    }

    /// The lowercased text this name was parsed from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The values of one attribute across all elements of the name.
    ///
    /// The list holds one entry per element, so it is a singleton for
    /// every 2.x name.
    pub fn get(&self, attribute: Attribute) -> Vec<&ComponentValue> {
        self.elements.iter().map(|e| e.get(attribute)).collect()
    }

    pub fn part(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Part)
    }

    pub fn vendor(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Vendor)
    }

    pub fn product(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Product)
    }

    pub fn product_version(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Version)
    }

    pub fn update(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Update)
    }

    pub fn edition(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Edition)
    }

    pub fn language(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Language)
    }

    pub fn sw_edition(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::SwEdition)
    }

    pub fn target_sw(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::TargetSw)
    }

    pub fn target_hw(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::TargetHw)
    }

    pub fn other(&self) -> Vec<&ComponentValue> {
        self.get(Attribute::Other)
    }

    fn has_part(&self, letter: &str) -> bool {
        self.elements.iter().any(|e| {
            matches!(e.get(Attribute::Part), ComponentValue::Simple(s) if s.standard() == letter)
        })
    }

    pub fn is_hardware(&self) -> bool {
        self.has_part("h")
    }

    pub fn is_operating_system(&self) -> bool {
        self.has_part("o")
    }

    pub fn is_application(&self) -> bool {
        self.has_part("a")
    }

    /// Check that the name can be expressed as a single 2.3 name.
    ///
    /// A 1.1 name with more than one element, or with element values
    /// using the 1.1 `!`/`~` operators, has no 2.3 counterpart.
    pub(crate) fn ensure_convertible(&self, target: &str) -> Result<()> {
        if self.elements.len() != 1 {
            return Err(Error::Incompatible {
                from_version: self.version,
                target: target.to_string(),
                reason: format!("name has {} elements", self.elements.len()),
            });
        }
        if self.version == CpeVersion::V1_1 {
            for (att, value) in self.elements[0].iter() {
                if let ComponentValue::Simple(simple) = value {
                    if legacy::uses_operators(simple.standard()) {
                        return Err(Error::Incompatible {
                            from_version: self.version,
                            target: target.to_string(),
                            reason: format!("attribute '{att}' uses a 1.1 operator"),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    /// Check that the part attribute carries no wildcard: the bound
    /// encodings only accept a system class letter there.
    pub(crate) fn ensure_concrete_part(&self, target: &str) -> Result<()> {
        if let ComponentValue::Simple(part) = self.elements[0].get(Attribute::Part) {
            if matches!(part.standard(), "?" | "*") {
                return Err(Error::Incompatible {
                    from_version: self.version,
                    target: target.to_string(),
                    reason: "wildcard in the part attribute".to_string(),
                });
            }
        }
        Ok(())
    }

    /// Lift the name to its canonical Well-Formed Name.
    ///
    /// The result is a 2.3 name with the same component values; it fails
    /// with `Incompatible` when the name has no single-element 2.3
    /// counterpart.
    pub fn to_wfn(&self) -> Result<Name> {
        let source = wfn::emit(self)?;
        Ok(Name {
            version: CpeVersion::V2_3,
            source,
            elements: self.elements.clone(),
        })
    }

    /// Emit the name as a Well-Formed Name string
    pub fn as_wfn(&self) -> Result<String> {
        wfn::emit(self)
    }

    /// Emit the name as a 2.3 URI string, packing the extended
    /// attributes into the edition field when any of them is set
    pub fn as_uri(&self) -> Result<String> {
        uri::emit(self)
    }

    /// Emit the name as a 2.3 formatted string
    pub fn as_fs(&self) -> Result<String> {
        fs::emit(self)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

impl FromStr for Name {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Name::parse(s)
    }
}

/// Names are equal when their canonical WFN forms are component-wise
/// equal, which makes equality encoding-agnostic. Names that have no
/// canonical form compare structurally.
impl PartialEq for Name {
    fn eq(&self, other: &Self) -> bool {
        match (self.to_wfn(), other.to_wfn()) {
            (Ok(a), Ok(b)) => a.elements == b.elements,
            _ => self.version == other.version && self.elements == other.elements,
        }
    }
}

impl Eq for Name {}
