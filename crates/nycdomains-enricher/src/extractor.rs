//! Page metadata extraction.
//!
//! Pure functions over already-fetched page content; no I/O happens here.
//! Each field is resolved through a priority-ordered lookup: the Open
//! Graph tag, the Twitter card tag, then the generic HTML source, with
//! the first non-empty value winning. Absence is a first-class value
//! (`NotFound`), distinct from the all-`Error` state a failed fetch
//! produces upstream.

use nycdomains_core::Field;
use scraper::{ElementRef, Html, Selector};
use std::sync::OnceLock;

/// Metadata extracted from one fetched page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMetadata {
    /// Page title.
    pub title: Field<String>,
    /// Page description.
    pub description: Field<String>,
    /// Page image URL, absolutized against the fetched address.
    pub image_url: Field<String>,
}

impl PageMetadata {
    /// The terminal state recorded when the page could not be fetched.
    #[must_use]
    pub fn error() -> Self {
        Self {
            title: Field::Error,
            description: Field::Error,
            image_url: Field::Error,
        }
    }
}

fn meta_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("meta").expect("valid selector"))
}

fn title_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("title").expect("valid selector"))
}

fn img_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("img").expect("valid selector"))
}

/// Extract title, description, and image metadata from page content.
///
/// Relative image paths are converted to absolute using `base_address`.
/// Extracted text is whitespace-normalized; entity decoding is handled by
/// the HTML parser itself.
#[must_use]
pub fn extract(page_content: &str, base_address: &str) -> PageMetadata {
    let document = Html::parse_document(page_content);

    let title = meta_content(&document, "og:title", "twitter:title")
        .or_else(|| element_text(&document, title_selector()));

    let description = meta_content(&document, "og:description", "twitter:description")
        .or_else(|| named_meta_content(&document, "description"));

    let image = meta_content(&document, "og:image", "twitter:image")
        .or_else(|| first_image_src(&document))
        .map(|src| absolute_image_url(base_address, &src));

    PageMetadata {
        title: Field::from_text(title.map(|text| normalize_text(&text))),
        description: Field::from_text(description.map(|text| normalize_text(&text))),
        image_url: Field::from_text(image),
    }
}

/// Convert a relative image path to an absolute URL.
///
/// Root-relative paths (`/img/logo.png`) resolve against the origin of
/// the base address; other relative paths are joined onto the base with
/// leading/trailing slashes normalized away.
#[must_use]
pub fn absolute_image_url(base_address: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    if path.starts_with('/') {
        if let Ok(base) = url::Url::parse(base_address) {
            if let Ok(joined) = base.join(path) {
                return joined.to_string();
            }
        }
    }

    let path = path.trim_start_matches('/');
    let base = base_address.trim_end_matches('/');
    format!("{base}/{path}")
}

/// Look up a social-preview meta tag's content.
///
/// Tries the Open Graph `property` exactly, the Twitter card `name`
/// exactly, then a case-insensitive scan over every meta tag; real-world
/// pages use inconsistent attribute casing.
fn meta_content(document: &Html, property_name: &str, name_name: &str) -> Option<String> {
    let mut tags = document.select(meta_selector());
    if let Some(tag) = tags.find(|tag| tag.value().attr("property") == Some(property_name)) {
        return tag_content(&tag);
    }

    let mut tags = document.select(meta_selector());
    if let Some(tag) = tags.find(|tag| tag.value().attr("name") == Some(name_name)) {
        return tag_content(&tag);
    }

    let mut tags = document.select(meta_selector());
    tags.find(|tag| {
        attr_eq_ignore_case(tag, "property", property_name)
            || attr_eq_ignore_case(tag, "name", name_name)
    })
    .and_then(|tag| tag_content(&tag))
}

/// Look up a plain `<meta name="...">` tag's content.
fn named_meta_content(document: &Html, name: &str) -> Option<String> {
    let mut tags = document.select(meta_selector());
    tags.find(|tag| tag.value().attr("name") == Some(name))
        .and_then(|tag| tag_content(&tag))
}

/// Read a meta tag's value from `content`, falling back to `value`.
fn tag_content(tag: &ElementRef) -> Option<String> {
    tag.value()
        .attr("content")
        .or_else(|| tag.value().attr("value"))
        .map(str::to_string)
        .filter(|text| !text.trim().is_empty())
}

fn attr_eq_ignore_case(tag: &ElementRef, attr: &str, expected: &str) -> bool {
    tag.value()
        .attr(attr)
        .is_some_and(|value| value.eq_ignore_ascii_case(expected))
}

fn element_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|el| el.text().collect::<String>())
        .filter(|text| !text.trim().is_empty())
}

fn first_image_src(document: &Html) -> Option<String> {
    document
        .select(img_selector())
        .find_map(|img| img.value().attr("src"))
        .map(str::to_string)
        .filter(|src| !src.trim().is_empty())
}

/// Collapse whitespace runs to single spaces and trim the ends.
fn normalize_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://example.nyc";

    #[test]
    fn test_extract_open_graph_tags() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="Hello">
                <meta property="og:description" content="A fine page">
                <meta property="og:image" content="https://cdn.example.nyc/hero.png">
                <title>Ignored</title>
            </head><body></body></html>
        "#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Hello".to_string()));
        assert_eq!(metadata.description, Field::Found("A fine page".to_string()));
        assert_eq!(
            metadata.image_url,
            Field::Found("https://cdn.example.nyc/hero.png".to_string())
        );
    }

    #[test]
    fn test_extract_twitter_fallback() {
        let html = r#"
            <html><head>
                <meta name="twitter:title" content="Card Title">
                <meta name="twitter:image" content="/card.png">
            </head><body></body></html>
        "#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Card Title".to_string()));
        assert_eq!(
            metadata.image_url,
            Field::Found("https://example.nyc/card.png".to_string())
        );
    }

    #[test]
    fn test_extract_generic_fallbacks() {
        let html = r#"
            <html><head>
                <title>Plain Title</title>
                <meta name="description" content="Plain description">
            </head>
            <body><img src="logo.png"></body></html>
        "#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Plain Title".to_string()));
        assert_eq!(
            metadata.description,
            Field::Found("Plain description".to_string())
        );
        assert_eq!(
            metadata.image_url,
            Field::Found("https://example.nyc/logo.png".to_string())
        );
    }

    #[test]
    fn test_extract_value_attribute() {
        let html = r#"<html><head><meta property="og:title" value="Valued"></head></html>"#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Valued".to_string()));
    }

    #[test]
    fn test_extract_case_insensitive_attributes() {
        let html = r#"<html><head><meta property="OG:Title" content="Shouty"></head></html>"#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Shouty".to_string()));
    }

    #[test]
    fn test_extract_nothing_is_not_found() {
        let metadata = extract("<html><body><p>hi</p></body></html>", BASE);
        assert_eq!(metadata.title, Field::NotFound);
        assert_eq!(metadata.description, Field::NotFound);
        assert_eq!(metadata.image_url, Field::NotFound);
    }

    #[test]
    fn test_extract_normalizes_whitespace() {
        let html = "<html><head><title>\n    Spaced \t  Out\n  </title></head></html>";

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Spaced Out".to_string()));
    }

    #[test]
    fn test_extract_decodes_entities() {
        let html =
            r#"<html><head><meta property="og:title" content="Dogs &amp; Cats"></head></html>"#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Dogs & Cats".to_string()));
    }

    #[test]
    fn test_empty_og_content_falls_through() {
        let html = r#"
            <html><head>
                <meta property="og:title" content="">
                <title>Backup</title>
            </head></html>
        "#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Backup".to_string()));
    }

    #[test]
    fn test_malformed_markup_still_extracts() {
        // The parser is error-tolerant; half-closed tags don't break extraction
        let html = r#"<html><head><meta property="og:title" content="Broken"><div><p></head>"#;

        let metadata = extract(html, BASE);
        assert_eq!(metadata.title, Field::Found("Broken".to_string()));
    }

    #[test]
    fn test_absolute_image_url_root_relative() {
        assert_eq!(
            absolute_image_url("https://example.nyc/page", "/img/logo.png"),
            "https://example.nyc/img/logo.png"
        );
    }

    #[test]
    fn test_absolute_image_url_relative() {
        assert_eq!(
            absolute_image_url("https://example.nyc/", "img/logo.png"),
            "https://example.nyc/img/logo.png"
        );
    }

    #[test]
    fn test_absolute_image_url_already_absolute() {
        assert_eq!(
            absolute_image_url("https://example.nyc", "https://cdn.example.nyc/a.png"),
            "https://cdn.example.nyc/a.png"
        );
    }
}
