//! Selector and text helpers shared by the page parsers.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

fn digits_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[0-9]+").unwrap())
}

/// First element matching `css` in the whole document.
pub fn select_first<'a>(document: &'a Html, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    document.select(&selector).next()
}

/// First element matching any of `selectors`, tried in order.
pub fn select_first_of<'a>(document: &'a Html, selectors: &[&str]) -> Option<ElementRef<'a>> {
    selectors.iter().find_map(|css| select_first(document, css))
}

/// All elements matching `css` in document order.
pub fn select_all<'a>(document: &'a Html, css: &str) -> Vec<ElementRef<'a>> {
    match Selector::parse(css) {
        Ok(selector) => document.select(&selector).collect(),
        Err(_) => Vec::new(),
    }
}

/// First descendant of `element` matching `css`.
pub fn select_within<'a>(element: &ElementRef<'a>, css: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(css).ok()?;
    element.select(&selector).next()
}

/// Concatenated, trimmed text content.
pub fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Trimmed text of the first match, empty when absent.
pub fn text_at(document: &Html, css: &str) -> String {
    select_first(document, css)
        .map(|elem| element_text(&elem))
        .unwrap_or_default()
}

/// Attribute of the first match, `None` when the element or attribute is absent.
pub fn attr_at(document: &Html, css: &str, attr: &str) -> Option<String> {
    select_first(document, css)?
        .value()
        .attr(attr)
        .map(|value| value.to_string())
}

/// First run of ASCII digits in `text`.
pub fn first_number(text: &str) -> Option<u32> {
    digits_re().find(text)?.as_str().parse().ok()
}

/// Length of the running-style key, in bytes of the display name.
pub const NAME_KEY_BYTES: usize = 9;

/// Running-style lookup key: the trimmed name cut to at most
/// [`NAME_KEY_BYTES`] bytes, backing off to a char boundary.
///
/// Three kana in UTF-8, nine ASCII letters.
pub fn name_key(name: &str) -> &str {
    let name = name.trim();
    if name.len() <= NAME_KEY_BYTES {
        return name;
    }
    let mut end = NAME_KEY_BYTES;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}
