//! Argument preprocessing applied before an emitter sees a command.
//!
//! Recorded arguments may reference stored variables as `${name}`. Depending
//! on what an argument means, references are rewritten differently:
//!
//! - text (locators, literals): escaped for a single-quoted PHP string and
//!   references spliced in as `' . $this->vars['name'] . '`
//! - scripts: references become `arguments[i]` and the names are collected
//!   into [`Script::argv`]
//! - key sequences: split into literal text, variables and `${KEY_X}` keys
//!
//! Emitters can therefore wrap any text argument in single quotes without
//! further escaping; [`php_string`] does so and drops the empty literals a
//! lone `${name}` leaves behind.

use serde::{Deserialize, Serialize};

use crate::emitter::variable_lookup;

/// An embedded script with its positional variable references.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Script source with every `${name}` replaced by `arguments[i]`.
    pub script: String,
    /// Variable names, in `arguments` order.
    pub argv: Vec<String>,
}

/// One element of a key sequence passed to `sendKeys`/`type`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPart {
    /// Literal text, already escaped.
    Text(String),
    /// A variable read (`$this->vars['name']`).
    Variable(String),
    /// A special key such as `ENTER`, from `${KEY_ENTER}`.
    Key(String),
}

enum Segment<'a> {
    Literal(&'a str),
    Reference(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Splits `raw` into literal runs and `${name}` references.
fn segments(raw: &str) -> Vec<Segment<'_>> {
    let mut out = Vec::new();
    let mut rest = raw;
    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let name_len = after.find(|c: char| !is_name_char(c)).unwrap_or(after.len());
        if name_len > 0 && after[name_len..].starts_with('}') {
            if start > 0 {
                out.push(Segment::Literal(&rest[..start]));
            }
            out.push(Segment::Reference(&after[..name_len]));
            rest = &after[name_len + 1..];
        } else {
            out.push(Segment::Literal(&rest[..start + 2]));
            rest = after;
        }
    }
    if !rest.is_empty() {
        out.push(Segment::Literal(rest));
    }
    out
}

/// Escapes `value` for use inside a single-quoted PHP string.
pub fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

/// Preprocesses a text argument: escape, then interpolate variable reads.
///
/// The result is meant to sit between single quotes; wrap it with
/// [`php_string`] to get a complete PHP expression.
pub fn text(raw: &str) -> String {
    let mut out = String::new();
    for segment in segments(raw) {
        match segment {
            Segment::Literal(s) => out.push_str(&escape(s)),
            Segment::Reference(name) => {
                out.push_str("' . ");
                out.push_str(&variable_lookup(name));
                out.push_str(" . '");
            }
        }
    }
    out
}

/// Wraps preprocessed text in single quotes, dropping the empty string
/// literals left at either end by interpolation.
///
/// `${user}` therefore becomes the bare `$this->vars['user']`.
pub fn php_string(text: &str) -> String {
    let quoted = format!("'{}'", text);
    let trimmed = quoted.strip_prefix("'' . ").unwrap_or(&quoted);
    let trimmed = trimmed.strip_suffix(" . ''").unwrap_or(trimmed);
    trimmed.to_string()
}

/// Preprocesses a script argument into a [`Script`].
pub fn script(raw: &str) -> Script {
    let mut result = Script::default();
    for segment in segments(raw) {
        match segment {
            Segment::Literal(s) => result.script.push_str(s),
            Segment::Reference(name) => {
                let index = match result.argv.iter().position(|a| a == name) {
                    Some(i) => i,
                    None => {
                        result.argv.push(name.to_string());
                        result.argv.len() - 1
                    }
                };
                result.script.push_str(&format!("arguments[{}]", index));
            }
        }
    }
    result
}

/// Preprocesses a key sequence argument.
pub fn keys(raw: &str) -> Vec<KeyPart> {
    segments(raw)
        .into_iter()
        .map(|segment| match segment {
            Segment::Literal(s) => KeyPart::Text(escape(s)),
            Segment::Reference(name) => match name.strip_prefix("KEY_") {
                Some(key) => KeyPart::Key(key.to_string()),
                None => KeyPart::Variable(variable_lookup(name)),
            },
        })
        .collect()
}
