//! CSS-subset selector parsing and matching.
//!
//! Supports the selector shapes event directives actually use: a tag name,
//! `#id`, `.class`, `[attr]`, `[attr=value]`, and compounds of those against
//! a single element (`input.big[type=text]`). No combinators.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unsupported syntax | combinators, pseudo-classes | `parse` returns `None`; queries match nothing |
//! | Empty selector | `""` | `parse` returns `None` |

use ahash::AHashMap;

/// Attribute constraint inside a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrMatch {
    /// `[attr]`: present with any value.
    Present(String),
    /// `[attr=value]`: present with exactly this value.
    Equals(String, String),
}

/// A parsed compound selector.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Selector {
    /// Parse a selector string. Returns `None` for empty or unsupported
    /// syntax; the caller treats an unparsable selector as matching nothing.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() || input.contains(char::is_whitespace) {
            return None;
        }
        let mut sel = Self::default();
        let bytes = input.as_bytes();
        let mut pos = 0;

        // Leading tag name.
        if bytes[0].is_ascii_alphabetic() {
            let end = input.find(['#', '.', '[']).unwrap_or(input.len());
            sel.tag = Some(input[..end].to_ascii_lowercase());
            pos = end;
        }

        while pos < input.len() {
            match bytes[pos] {
                marker @ (b'#' | b'.') => {
                    let start = pos + 1;
                    let end = input[start..]
                        .find(['#', '.', '['])
                        .map_or(input.len(), |j| start + j);
                    let name = &input[start..end];
                    if name.is_empty() {
                        return None;
                    }
                    if marker == b'#' {
                        if sel.id.is_some() {
                            return None;
                        }
                        sel.id = Some(name.to_owned());
                    } else {
                        sel.classes.push(name.to_owned());
                    }
                    pos = end;
                }
                b'[' => {
                    let close = input[pos..].find(']').map(|j| pos + j)?;
                    let body = &input[pos + 1..close];
                    if body.is_empty() {
                        return None;
                    }
                    match body.split_once('=') {
                        Some((name, value)) => {
                            let value = value.trim_matches(|q| q == '"' || q == '\'');
                            sel.attrs.push(AttrMatch::Equals(
                                name.to_ascii_lowercase(),
                                value.to_owned(),
                            ));
                        }
                        None => sel.attrs.push(AttrMatch::Present(body.to_ascii_lowercase())),
                    }
                    pos = close + 1;
                }
                _ => return None,
            }
        }

        if sel.tag.is_none() && sel.id.is_none() && sel.classes.is_empty() && sel.attrs.is_empty() {
            return None;
        }
        Some(sel)
    }

    /// Test the selector against one element's tag and attributes.
    #[must_use]
    pub fn matches(&self, tag: &str, attrs: &AHashMap<String, String>) -> bool {
        if let Some(want) = &self.tag {
            if want != tag {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if attrs.get("id").is_none_or(|id| id != want) {
                return false;
            }
        }
        if !self.classes.is_empty() {
            let class_attr = attrs.get("class").map(String::as_str).unwrap_or("");
            let have: Vec<&str> = class_attr.split_whitespace().collect();
            if !self.classes.iter().all(|c| have.contains(&c.as_str())) {
                return false;
            }
        }
        for attr in &self.attrs {
            match attr {
                AttrMatch::Present(name) => {
                    if !attrs.contains_key(name) {
                        return false;
                    }
                }
                AttrMatch::Equals(name, value) => {
                    if attrs.get(name).is_none_or(|v| v != value) {
                        return false;
                    }
                }
            }
        }
        true
    }
}
