//! Document traversal helpers shared by the page parsers.

use crate::error::{ScrapeError, ScrapeResult};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;

/// Compile a selector literal
///
/// Only called with literals from this crate, wrapped in `Lazy` statics.
pub fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|e| panic!("invalid selector {:?}: {:?}", css, e))
}

/// Text content of an element with whitespace runs collapsed
pub fn clean_text(element: ElementRef) -> String {
    collapse_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First match of `sel` in the document, or a missing-structure error naming `what`
pub fn select_one<'a>(doc: &'a Html, sel: &Selector, what: &str) -> ScrapeResult<ElementRef<'a>> {
    doc.select(sel).next().ok_or_else(|| ScrapeError::missing(what))
}

/// First match of `sel` below `element`
pub fn select_child<'a>(
    element: ElementRef<'a>,
    sel: &Selector,
    what: &str,
) -> ScrapeResult<ElementRef<'a>> {
    element.select(sel).next().ok_or_else(|| ScrapeError::missing(what))
}

/// Every match of `sel` below `element`, requiring exactly `n`
pub fn select_exactly<'a>(
    element: ElementRef<'a>,
    sel: &Selector,
    n: usize,
    what: &str,
) -> ScrapeResult<Vec<ElementRef<'a>>> {
    let found: Vec<_> = element.select(sel).collect();
    if found.len() != n {
        return Err(ScrapeError::missing(format!(
            "{} (expected {}, found {})",
            what,
            n,
            found.len()
        )));
    }
    Ok(found)
}

/// Required attribute value
pub fn attr<'a>(element: ElementRef<'a>, name: &str, what: &str) -> ScrapeResult<&'a str> {
    element
        .value()
        .attr(name)
        .ok_or_else(|| ScrapeError::missing(format!("{} ({} attribute)", what, name)))
}

/// Split `Label: value` into a lowercase label and the trimmed value
pub fn split_label(text: &str) -> Option<(String, String)> {
    let (label, value) = text.split_once(':')?;
    Some((label.trim().to_lowercase(), value.trim().to_string()))
}

/// Labeled raw fragments collected from a page before typed construction
///
/// Only labels from the fixed `known` set are accepted; a repeated label is
/// rejected too.
#[derive(Debug)]
pub struct FieldMap {
    section: &'static str,
    known: &'static [&'static str],
    fields: BTreeMap<&'static str, String>,
}

impl FieldMap {
    pub fn new(section: &'static str, known: &'static [&'static str]) -> Self {
        Self {
            section,
            known,
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, label: &str, value: impl Into<String>) -> ScrapeResult<()> {
        let key = self
            .known
            .iter()
            .find(|k| **k == label)
            .copied()
            .ok_or_else(|| {
                ScrapeError::missing(format!("{}: unknown label {:?}", self.section, label))
            })?;
        if self.fields.contains_key(key) {
            return Err(ScrapeError::missing(format!(
                "{}: repeated label {:?}",
                self.section, label
            )));
        }
        self.fields.insert(key, value.into());
        Ok(())
    }

    /// Value of a label that must be present
    pub fn require(&self, label: &'static str) -> ScrapeResult<&str> {
        self.fields
            .get(label)
            .map(String::as_str)
            .ok_or_else(|| {
                ScrapeError::missing(format!("{}: missing label {:?}", self.section, label))
            })
    }

    /// Require every known label
    pub fn require_all(&self) -> ScrapeResult<()> {
        for label in self.known {
            self.require(*label)?;
        }
        Ok(())
    }
}
