//! Main-content extraction from HTML.
//!
//! ### Boilerplate
//! - `nav`, `header`, `footer`, `aside`, `script`, `style`, `noscript` and
//!   comments never contribute text.
//!
//! ### Region Search
//! First match wins:
//! 1. `<main>`
//! 2. `<article>`
//! 3. a `div`/`section` with a content-ish class
//!    (`content|main-content|post-content|body|main-body|body-content|main`)
//! 4. `<body>`
//!
//! Candidates nested inside boilerplate are ignored.
//!
//! ### Text
//! - Block elements and `<br>` become line breaks; whitespace is collapsed.

pub mod normalize;

pub use normalize::collapse_whitespace;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use sift_core::Error;

/// Class names that suggest a main-content container (matched per class, case-insensitive).
pub const CONTENT_CLASS_PATTERN: &str = r"(?i)content|main-content|post-content|body|main-body|body-content|main";

const STRIPPED_TAGS: &[&str] = &["nav", "header", "footer", "aside", "script", "style", "noscript"];

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "blockquote",
    "br",
    "dd",
    "div",
    "dl",
    "dt",
    "figcaption",
    "figure",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "hr",
    "li",
    "main",
    "ol",
    "p",
    "pre",
    "section",
    "table",
    "td",
    "th",
    "tr",
    "ul",
];

/// Extract the readable text of the most likely main-content region.
///
/// Returns an empty string when the page has no text at all.
pub fn extract_main_text(html: &str) -> Result<String, Error> {
    let document = Html::parse_document(html);

    let Some(region) = main_region(&document)? else {
        return Ok(String::new());
    };

    let mut raw = String::new();
    collect_text(region, &mut raw);

    Ok(collapse_whitespace(&raw))
}

/// Locate the main-content region by the prioritized search.
pub fn main_region(document: &Html) -> Result<Option<ElementRef<'_>>, Error> {
    for tag in ["main", "article"] {
        let selector = selector(tag)?;
        if let Some(found) = document.select(&selector).find(|el| !inside_boilerplate(el)) {
            return Ok(Some(found));
        }
    }

    let pattern =
        Regex::new(CONTENT_CLASS_PATTERN).map_err(|e| Error::ExtractFailed(format!("invalid class pattern: {e}")))?;
    let containers = selector("div[class], section[class]")?;
    if let Some(found) = document
        .select(&containers)
        .find(|el| !inside_boilerplate(el) && el.value().classes().any(|class| pattern.is_match(class)))
    {
        return Ok(Some(found));
    }

    let body = selector("body")?;
    Ok(document.select(&body).next().or_else(|| Some(document.root_element())))
}

fn selector(css: &str) -> Result<Selector, Error> {
    Selector::parse(css).map_err(|e| Error::ExtractFailed(format!("invalid selector `{css}`: {e:?}")))
}

fn is_stripped(name: &str) -> bool {
    STRIPPED_TAGS.iter().any(|tag| tag.eq_ignore_ascii_case(name))
}

fn inside_boilerplate(element: &ElementRef<'_>) -> bool {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .any(|ancestor| is_stripped(ancestor.value().name()))
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            let name = child_el.value().name();
            if is_stripped(name) {
                continue;
            }

            let block = BLOCK_TAGS.contains(&name);
            if block {
                out.push('\n');
            }
            collect_text(child_el, out);
            if block {
                out.push('\n');
            }
        }
    }
}
