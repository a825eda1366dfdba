//! Codecs between the bound encodings and the standard form
//!
//! Every parser lowers an encoded attribute value into the *standard
//! form*: lowercase text where every non-alphanumeric character carries a
//! quoting backslash and the only unquoted metacharacters are `?` and
//! `*`. Every emitter raises the standard form back into one of the
//! bound encodings, so conversion between encodings is always
//! decode-then-encode.

use std::sync::OnceLock;

use regex::Regex;

use crate::attribute::Attribute;
use crate::error::{Error, Result};

/// Percent encodings of the quotable punctuation, indexed by character
const PCT_TABLE: [(char, &str); 29] = [
    ('!', "%21"),
    ('"', "%22"),
    ('#', "%23"),
    ('$', "%24"),
    ('%', "%25"),
    ('&', "%26"),
    ('\'', "%27"),
    ('(', "%28"),
    (')', "%29"),
    ('*', "%2a"),
    ('+', "%2b"),
    (',', "%2c"),
    ('/', "%2f"),
    (':', "%3a"),
    (';', "%3b"),
    ('<', "%3c"),
    ('=', "%3d"),
    ('>', "%3e"),
    ('?', "%3f"),
    ('@', "%40"),
    ('[', "%5b"),
    ('\\', "%5c"),
    (']', "%5d"),
    ('^', "%5e"),
    ('`', "%60"),
    ('{', "%7b"),
    ('|', "%7c"),
    ('}', "%7d"),
    ('~', "%7e"),
];

/// Percent-encode one quotable character
fn pct_encode(c: char) -> Option<&'static str> {
    PCT_TABLE.iter().find(|(ch, _)| *ch == c).map(|(_, pce)| *pce)
}

/// Decode one three-character percent form back to its character
fn pct_decode(form: &str) -> Option<char> {
    PCT_TABLE.iter().find(|(_, pce)| *pce == form).map(|(ch, _)| *ch)
}

/// True for characters that pass through every encoding untouched
fn is_unreserved(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// True for characters that may follow a quoting backslash in the
/// standard form
fn is_quotable(c: char) -> bool {
    matches!(
        c,
        '!' | '"'
            | ';'
            | '#'
            | '$'
            | '%'
            | '&'
            | '\''
            | '('
            | ')'
            | '+'
            | ','
            | '.'
            | '/'
            | ':'
            | '<'
            | '='
            | '>'
            | '@'
            | '['
            | ']'
            | '^'
            | '`'
            | '{'
            | '|'
            | '}'
            | '~'
            | '-'
            | '\\'
            | '*'
            | '?'
    )
}

fn invalid(attribute: Attribute, value: &str) -> Error {
    Error::InvalidValue {
        attribute,
        value: value.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Decoders: encoded text -> standard form
// ---------------------------------------------------------------------------

/// Decode a formatted-string attribute value.
///
/// Alphanumerics pass untouched and quoted characters stay quoted. The
/// unreserved punctuation of the binding (`.` and `-`) acquires quoting.
/// An unquoted `*` is legal only at the ends; unquoted `?` only at the
/// ends or in a leading or trailing run.
pub fn decode_fs(encoded: &str, attribute: Attribute) -> Result<String> {
    let bytes = encoded.as_bytes();
    let mut out = String::with_capacity(encoded.len() + 4);
    let mut idx = 0;
    let mut embedded = false;

    while idx < bytes.len() {
        let c = bytes[idx] as char;

        if is_unreserved(c) {
            out.push(c);
            idx += 1;
            embedded = true;
        } else if c == '\\' {
            // Anything quoted in the bound string stays quoted
            let next = *bytes.get(idx + 1).ok_or_else(|| invalid(attribute, encoded))? as char;
            if !is_quotable(next) {
                return Err(invalid(attribute, encoded));
            }
            out.push('\\');
            out.push(next);
            idx += 2;
            embedded = true;
        } else if c == '.' || c == '-' {
            out.push('\\');
            out.push(c);
            idx += 1;
            embedded = true;
        } else if c == '*' {
            if idx == 0 || idx == bytes.len() - 1 {
                out.push(c);
                idx += 1;
                embedded = true;
            } else {
                return Err(invalid(attribute, encoded));
            }
        } else if c == '?' {
            let legal = idx == 0
                || idx == bytes.len() - 1
                || (!embedded && bytes[idx - 1] == b'?')
                || (embedded && bytes[idx + 1] == b'?');
            if legal {
                out.push(c);
                idx += 1;
                embedded = false;
            } else {
                return Err(invalid(attribute, encoded));
            }
        } else {
            return Err(invalid(attribute, encoded));
        }
    }

    Ok(out)
}

/// Decode a 2.3 URI attribute value.
///
/// Alphanumerics pass untouched; `.`, `-`, and `~` acquire quoting;
/// `%01` and `%02` decode to the unquoted wildcards subject to their
/// placement rules; the remaining percent forms decode to quoted
/// punctuation.
pub fn decode_uri(encoded: &str, attribute: Attribute) -> Result<String> {
    let len = encoded.len();
    let mut out = String::with_capacity(len + 4);
    let mut idx = 0;
    let mut embedded = false;

    while idx < len {
        let c = encoded.as_bytes()[idx] as char;

        if c == '.' || c == '-' || c == '~' {
            out.push('\\');
            out.push(c);
            idx += 1;
            embedded = true;
            continue;
        }

        if c != '%' {
            if is_unreserved(c) {
                out.push(c);
                idx += 1;
                embedded = true;
                continue;
            }
            return Err(invalid(attribute, encoded));
        }

        let form = encoded.get(idx..idx + 3).ok_or_else(|| invalid(attribute, encoded))?;

        if form == "%01" {
            // Legal at the ends, or contiguous with another %01 run
            let legal = idx == 0
                || idx == len - 3
                || (!embedded && idx >= 3 && &encoded[idx - 3..idx] == "%01")
                || (embedded && len >= idx + 6 && &encoded[idx + 3..idx + 6] == "%01");
            if !legal {
                return Err(invalid(attribute, encoded));
            }
            out.push('?');
            idx += 3;
        } else if form == "%02" {
            if idx != 0 && idx != len - 3 {
                return Err(invalid(attribute, encoded));
            }
            out.push('*');
            idx += 3;
            embedded = true;
        } else if let Some(ch) = pct_decode(form) {
            out.push('\\');
            out.push(ch);
            idx += 3;
            embedded = true;
        } else {
            return Err(invalid(attribute, encoded));
        }
    }

    Ok(out)
}

/// Decode a 2.2 URI attribute value.
///
/// The 2.2 binding has no percent forms and no wildcards: values are
/// alphanumerics plus `.`, `_`, `-`, `~`, `%`, and the non-alphanumerics
/// acquire quoting on the way to the standard form.
pub fn decode_uri_legacy(encoded: &str, attribute: Attribute) -> Result<String> {
    if encoded.is_empty() {
        return Err(invalid(attribute, encoded));
    }
    let mut out = String::with_capacity(encoded.len() + 4);
    for c in encoded.chars() {
        if is_unreserved(c) {
            out.push(c);
        } else if matches!(c, '.' | '-' | '~' | '%') {
            out.push('\\');
            out.push(c);
        } else {
            return Err(invalid(attribute, encoded));
        }
    }
    Ok(out)
}

/// Decode a 1.1 element value.
///
/// The 1.1 grammar permits alphanumerics plus `.`, `-`, `,`, `(`, `)`,
/// `@`, `#`, with `~` (negation) and `!` (alternation) as element
/// operators. Operators are preserved, quoted, in the standard form; the
/// 1.1 matcher interprets them.
pub fn decode_v1(encoded: &str, attribute: Attribute) -> Result<String> {
    static V1_RE: OnceLock<Regex> = OnceLock::new();
    let re = V1_RE.get_or_init(|| {
        Regex::new(r"^(~[\w.\-,()@#]+|[\w.\-,()@#]+(![\w.\-,()@#]+)*)$").expect("valid regex")
    });

    if !re.is_match(encoded) {
        return Err(invalid(attribute, encoded));
    }

    let mut out = String::with_capacity(encoded.len() + 4);
    for c in encoded.chars() {
        if is_unreserved(c) {
            out.push(c);
        } else {
            out.push('\\');
            out.push(c);
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Emitters: standard form -> encoded text
// ---------------------------------------------------------------------------

/// Emit the standard form as a formatted-string value.
///
/// Quoted `.`, `-`, and `_` drop their quoting; every other quoted
/// character keeps it, and wildcards pass through.
pub fn emit_fs(standard: &str) -> String {
    let bytes = standard.as_bytes();
    let mut out = String::with_capacity(standard.len());
    let mut idx = 0;

    while idx < bytes.len() {
        let c = bytes[idx] as char;
        if c != '\\' {
            out.push(c);
            idx += 1;
            continue;
        }
        let next = bytes[idx + 1] as char;
        if matches!(next, '.' | '-' | '_') {
            out.push(next);
        } else {
            out.push('\\');
            out.push(next);
        }
        idx += 2;
    }

    out
}

/// Emit the standard form as a 2.3 URI value.
///
/// Alphanumerics pass untouched, quoted `.` and `-` drop their quoting,
/// the remaining quoted punctuation percent-encodes, and the unquoted
/// wildcards bind to `%01` and `%02`.
pub fn emit_uri(standard: &str) -> String {
    let bytes = standard.as_bytes();
    let mut out = String::with_capacity(standard.len());
    let mut idx = 0;

    while idx < bytes.len() {
        let c = bytes[idx] as char;
        if is_unreserved(c) {
            out.push(c);
            idx += 1;
        } else if c == '\\' {
            let next = bytes[idx + 1] as char;
            if matches!(next, '.' | '-') {
                out.push(next);
            } else if let Some(pce) = pct_encode(next) {
                out.push_str(pce);
            }
            idx += 2;
        } else if c == '?' {
            out.push_str("%01");
            idx += 1;
        } else if c == '*' {
            out.push_str("%02");
            idx += 1;
        } else {
            idx += 1;
        }
    }

    out
}

// ---------------------------------------------------------------------------
// Standard-form validation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token {
    Body(char),
    Quoted(char),
    Quest,
    Star,
}

fn tokenize(standard: &str) -> Option<Vec<Token>> {
    let mut tokens = Vec::with_capacity(standard.len());
    let mut chars = standard.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            let next = chars.next()?;
            if !is_quotable(next) {
                return None;
            }
            tokens.push(Token::Quoted(next));
        } else if is_unreserved(c) {
            tokens.push(Token::Body(c));
        } else if c == '?' {
            tokens.push(Token::Quest);
        } else if c == '*' {
            tokens.push(Token::Star);
        } else {
            return None;
        }
    }
    Some(tokens)
}

/// Validate the standard form of a generic attribute value: quoted
/// punctuation anywhere, wildcards confined to the ends (a run of `?`
/// and/or one `*` on each side), and at least one token. A lone quoted
/// hyphen is not a value.
fn is_valid_generic(standard: &str) -> bool {
    let tokens = match tokenize(standard) {
        Some(t) if !t.is_empty() => t,
        _ => return false,
    };

    let mut start = 0;
    if tokens[0] == Token::Star {
        start = 1;
    } else {
        while start < tokens.len() && tokens[start] == Token::Quest {
            start += 1;
        }
    }

    let mut end = tokens.len();
    if end > start && tokens[end - 1] == Token::Star {
        end -= 1;
    } else {
        while end > start && tokens[end - 1] == Token::Quest {
            end -= 1;
        }
    }

    let body = &tokens[start..end];
    if body.iter().any(|t| matches!(t, Token::Quest | Token::Star)) {
        return false;
    }

    // A value opening with a quoted hyphen needs a second body token
    if start == 0 && body == [Token::Quoted('-')] {
        return false;
    }

    true
}

/// Validate the standard form of the part attribute: one system class
/// letter or a single wildcard
fn is_valid_part(standard: &str) -> bool {
    matches!(standard, "a" | "o" | "h" | "?" | "*")
}

/// Validate the standard form of the language attribute: a two or three
/// letter language subtag, optionally a quoted hyphen and a region of
/// two letters or three digits, with the wildcard substitutions the
/// grammar allows in either subtag
fn is_valid_language(standard: &str) -> bool {
    static LANG_RE: OnceLock<Regex> = OnceLock::new();
    static LANG_TAIL_RE: OnceLock<Regex> = OnceLock::new();
    static REGION_RE: OnceLock<Regex> = OnceLock::new();

    let lang = LANG_RE.get_or_init(|| {
        Regex::new(r"^(\*[a-z]{1,2}|\?([a-z][a-z]?|\?(\?|[a-z])?)|[a-z]{2,3})$")
            .expect("valid regex")
    });
    let lang_tail = LANG_TAIL_RE
        .get_or_init(|| Regex::new(r"^(\*\d{1,3}|[a-z]{1,3}\*)$").expect("valid regex"));
    let region = REGION_RE.get_or_init(|| {
        Regex::new(r"^(\*|\?\?|[a-z]([a-z]|\*|\?)|\d(\*|\?\??|\d[\d*?]))$").expect("valid regex")
    });

    let parts: Vec<&str> = standard.split(r"\-").collect();
    match parts.len() {
        1 => lang.is_match(parts[0]) || lang_tail.is_match(parts[0]),
        2 => lang.is_match(parts[0]) && region.is_match(parts[1]),
        _ => false,
    }
}

/// Validate a decoded value against its attribute grammar
pub fn validate_standard(standard: &str, attribute: Attribute) -> Result<()> {
    let ok = match attribute {
        Attribute::Part => is_valid_part(standard),
        Attribute::Language => is_valid_language(standard),
        _ => is_valid_generic(standard),
    };
    if ok {
        Ok(())
    } else {
        Err(invalid(attribute, standard))
    }
}
