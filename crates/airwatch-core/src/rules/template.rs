// ── Message templates with named placeholders ──
//
// Templates are parsed once when a rule is built. Rendering only walks
// the pre-split segments, so a missing placeholder can be caught at rule
// construction instead of on the alert path.

use std::fmt;

use serde::{Serialize, Serializer};

use super::RuleKind;
use crate::error::CoreError;
use crate::model::AlertDetails;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Field(String),
}

/// A parsed message template such as `Weak encryption detected: {ssid} uses {encryption}`.
///
/// `{{` and `}}` produce literal braces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl MessageTemplate {
    pub fn parse(source: &str) -> Result<Self, String> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '{' => {
                    let mut name = String::new();
                    loop {
                        match chars.next() {
                            Some('}') => break,
                            Some(ch) if ch.is_ascii_alphanumeric() || ch == '_' => name.push(ch),
                            Some(ch) => {
                                return Err(format!("invalid character '{ch}' in placeholder"));
                            }
                            None => return Err("unterminated placeholder".into()),
                        }
                    }
                    if name.is_empty() {
                        return Err("empty placeholder '{}'".into());
                    }
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(Segment::Field(name));
                }
                '}' => return Err("unmatched '}'".into()),
                other => literal.push(other),
            }
        }

        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_owned(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Placeholder names in order of appearance.
    pub fn placeholders(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|s| match s {
            Segment::Field(name) => Some(name.as_str()),
            Segment::Literal(_) => None,
        })
    }

    /// Fill every placeholder from `details`.
    pub fn render(&self, rule: RuleKind, details: &AlertDetails) -> Result<String, CoreError> {
        let mut out = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Field(name) => {
                    let value = details.field(name).ok_or_else(|| CoreError::TemplateRender {
                        rule,
                        placeholder: name.clone(),
                    })?;
                    out.push_str(&value);
                }
            }
        }
        Ok(out)
    }
}

impl fmt::Display for MessageTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

impl Serialize for MessageTemplate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Encryption;

    fn weak_details() -> AlertDetails {
        AlertDetails::WeakEncryption {
            ssid: "Cafe".into(),
            bssid: "AA:AA:AA:AA:AA:01".into(),
            encryption: Encryption::Wpa,
        }
    }

    #[test]
    fn renders_named_fields() {
        let tpl = MessageTemplate::parse("Weak encryption detected: {ssid} uses {encryption}").unwrap();
        let msg = tpl.render(RuleKind::WeakEncryption, &weak_details()).unwrap();
        assert_eq!(msg, "Weak encryption detected: Cafe uses WPA");
    }

    #[test]
    fn escaped_braces_are_literal() {
        let tpl = MessageTemplate::parse("{{{ssid}}}").unwrap();
        assert_eq!(tpl.placeholders().collect::<Vec<_>>(), vec!["ssid"]);
        let msg = tpl.render(RuleKind::WeakEncryption, &weak_details()).unwrap();
        assert_eq!(msg, "{Cafe}");
    }

    #[test]
    fn missing_field_is_a_render_error() {
        let tpl = MessageTemplate::parse("Vendor {vendor}").unwrap();
        let err = tpl.render(RuleKind::WeakEncryption, &weak_details()).unwrap_err();
        assert!(matches!(
            err,
            CoreError::TemplateRender { ref placeholder, .. } if placeholder == "vendor"
        ));
    }

    #[test]
    fn rejects_malformed_templates() {
        assert!(MessageTemplate::parse("open {ssid").is_err());
        assert!(MessageTemplate::parse("stray } brace").is_err());
        assert!(MessageTemplate::parse("empty {}").is_err());
        assert!(MessageTemplate::parse("bad {ss id}").is_err());
    }
}
