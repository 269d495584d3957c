// src/locator.rs

use crate::error::{SpiderError, SpiderResult};
use std::fmt;

/// Placeholder substituted by [`Locator::render`].
pub const CONTENT_ID_PLACEHOLDER: &str = "{content_id}";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocatorKind {
    Css,
    XPath,
}

/// How to find an element on a page.
///
/// Locators are written the way the selectors in `config.json` are: a plain
/// string is a CSS selector, `css:`/`css=` forces CSS and `xpath:`/`xpath=`
/// selects XPath. The raw string is kept so a locator can be logged and
/// compared exactly as it was configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Locator {
    raw: String,
    kind: LocatorKind,
    body_start: usize,
}

impl Locator {
    /// Parse and validate a locator string.
    pub fn parse(raw: &str) -> SpiderResult<Self> {
        Self::parse_named("<inline>", raw)
    }

    /// Same as [`Locator::parse`], reporting `name` in validation errors.
    pub fn parse_named(name: &str, raw: &str) -> SpiderResult<Self> {
        let invalid = |reason: &str| SpiderError::InvalidLocator {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        let trimmed = raw.trim();
        let (kind, prefix_len) = split_prefix(trimmed);
        let body = trimmed[prefix_len..].trim_start();
        if body.is_empty() {
            return Err(invalid("empty selector"));
        }
        check_balanced(body).map_err(|reason| invalid(&reason))?;
        if kind == LocatorKind::XPath && !(body.starts_with('/') || body.starts_with('(')) {
            return Err(invalid("XPath must start with '/' or '('"));
        }

        Ok(Self {
            raw: trimmed.to_string(),
            kind,
            body_start: trimmed.len() - body.len(),
        })
    }

    pub fn kind(&self) -> LocatorKind {
        self.kind
    }

    /// The selector with any `css:`/`xpath:` prefix removed.
    pub fn body(&self) -> &str {
        &self.raw[self.body_start..]
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_template(&self) -> bool {
        self.raw.contains(CONTENT_ID_PLACEHOLDER)
    }

    /// Substitute the content-panel id into a templated locator.
    pub fn render(&self, content_id: &str) -> SpiderResult<Locator> {
        if content_id.contains(['\'', '"']) {
            return Err(SpiderError::InvalidLocator {
                name: self.raw.clone(),
                reason: format!("content id {content_id:?} contains a quote"),
            });
        }
        Locator::parse(&self.raw.replace(CONTENT_ID_PLACEHOLDER, content_id))
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn split_prefix(raw: &str) -> (LocatorKind, usize) {
    for (prefix, kind) in [
        ("xpath:", LocatorKind::XPath),
        ("xpath=", LocatorKind::XPath),
        ("css:", LocatorKind::Css),
        ("css=", LocatorKind::Css),
    ] {
        if raw
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            return (kind, prefix.len());
        }
    }
    (LocatorKind::Css, 0)
}

fn check_balanced(body: &str) -> Result<(), String> {
    let mut stack = Vec::new();
    let mut quote: Option<char> = None;

    for c in body.chars() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' => quote = Some(c),
            '[' | '(' => stack.push(c),
            ']' | ')' => {
                let open = if c == ']' { '[' } else { '(' };
                if stack.pop() != Some(open) {
                    return Err(format!("unexpected '{c}'"));
                }
            }
            _ => {}
        }
    }

    if let Some(q) = quote {
        return Err(format!("unterminated {q} quote"));
    }
    if let Some(open) = stack.pop() {
        return Err(format!("unclosed '{open}'"));
    }
    Ok(())
}
