use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::render::escape_html;

const VOID_ELEMENTS: &[&str] = &["base", "link", "meta"];
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// One element of a page head.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadElement {
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub text: String,
}

impl HeadElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            text: String::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some((_, v)) => *v = value.to_string(),
            None => self
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    /// True when the tag matches and every `(name, value)` pair is present.
    pub fn matches(&self, tag: &str, attrs: &[(&str, &str)]) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
            && attrs
                .iter()
                .all(|(name, value)| self.attr(name) == Some(*value))
    }

    pub fn to_html(&self) -> String {
        let mut buf = format!("<{}", self.tag);
        for (name, value) in &self.attributes {
            buf.push_str(&format!(" {}=\"{}\"", name, escape_html(value)));
        }
        buf.push('>');

        let tag = self.tag.to_ascii_lowercase();
        if VOID_ELEMENTS.contains(&tag.as_str()) {
            return buf;
        }

        if RAW_TEXT_ELEMENTS.contains(&tag.as_str()) {
            buf.push_str(&guard_raw_text(&self.text, &tag));
        } else {
            buf.push_str(&escape_html(&self.text));
        }
        buf.push_str(&format!("</{}>", self.tag));
        buf
    }
}

/// Prevents raw text from closing its element early.
fn guard_raw_text(text: &str, tag: &str) -> String {
    let closing = format!("</{}", tag);
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.to_ascii_lowercase().find(&closing) {
        out.push_str(&rest[..pos]);
        out.push_str("<\\/");
        rest = &rest[pos + 2..];
    }
    out.push_str(rest);
    out
}

/// The ordered elements of a page head, parsed from and written back to HTML.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadDocument {
    elements: Vec<HeadElement>,
}

impl HeadDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a full document or a bare run of head elements.
    pub fn parse(html: &str) -> Result<Self> {
        let document = Html::parse_document(html);
        let head_selector =
            Selector::parse("head").map_err(|e| AppError::Selector(e.to_string()))?;

        let elements = match document.select(&head_selector).next() {
            Some(head) => head
                .children()
                .filter_map(ElementRef::wrap)
                .map(element_from_ref)
                .collect(),
            None => Vec::new(),
        };

        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[HeadElement] {
        &self.elements
    }

    pub fn find(&self, tag: &str, attrs: &[(&str, &str)]) -> Option<&HeadElement> {
        self.elements.iter().find(|e| e.matches(tag, attrs))
    }

    pub fn count(&self, tag: &str, attrs: &[(&str, &str)]) -> usize {
        self.elements.iter().filter(|e| e.matches(tag, attrs)).count()
    }

    /// Returns the first element matching `tag` and `attrs`, appending a new
    /// one carrying those attributes when none exists.
    pub fn find_or_create(&mut self, tag: &str, attrs: &[(&str, &str)]) -> &mut HeadElement {
        let index = match self.elements.iter().position(|e| e.matches(tag, attrs)) {
            Some(index) => index,
            None => {
                let element = attrs
                    .iter()
                    .fold(HeadElement::new(tag), |el, (name, value)| {
                        el.with_attr(name, value)
                    });
                self.elements.push(element);
                self.elements.len() - 1
            }
        };
        &mut self.elements[index]
    }

    pub fn title(&self) -> Option<&str> {
        self.find("title", &[]).map(|e| e.text.as_str())
    }

    pub fn to_html(&self) -> String {
        self.elements
            .iter()
            .map(HeadElement::to_html)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// True when `html` has anything inside its body, which `HeadDocument`
/// drops on parse.
pub fn has_body_content(html: &str) -> bool {
    let document = Html::parse_document(html);
    let Ok(body_selector) = Selector::parse("body") else {
        return false;
    };

    document.select(&body_selector).next().is_some_and(|body| {
        body.children().filter_map(ElementRef::wrap).next().is_some()
            || body.text().any(|text| !text.trim().is_empty())
    })
}

// Parsed attributes are kept in name order; the parser does not guarantee
// source order.
fn element_from_ref(element: ElementRef) -> HeadElement {
    let value = element.value();
    let mut attributes: Vec<(String, String)> = value
        .attrs()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect();
    attributes.sort_by(|a, b| a.0.cmp(&b.0));

    HeadElement {
        tag: value.name().to_string(),
        attributes,
        text: element.text().collect(),
    }
}
