//! HTML parser for extracting page records and links
//!
//! This module handles parsing fetched content to extract:
//! - The page title (first `<title>` element)
//! - A capped snippet of visible body text
//! - Absolute http(s) links to follow
//!
//! Parsing is best-effort: html5ever repairs malformed markup, and anything missing simply
//! leaves the corresponding field empty.

use crate::sink::PageRecord;
use scraper::node::Node;
use scraper::{ElementRef, Html};

/// Elements whose whole subtree contributes nothing to the snippet
const SKIPPED_ELEMENTS: [&str; 3] = ["script", "style", "javascript"];

/// Extracted information from an HTML page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedPage {
    /// The record handed to the sink
    pub record: PageRecord,

    /// Accepted outbound links in document order
    pub links: Vec<String>,
}

/// Returns true if an `href` value is an absolute http or https URL
///
/// Empty and relative values are rejected; they are dropped without being reported.
pub fn is_crawlable_href(href: &str) -> bool {
    let href = href.trim();
    has_prefix_ignore_case(href, "http://") || has_prefix_ignore_case(href, "https://")
}

fn has_prefix_ignore_case(value: &str, prefix: &str) -> bool {
    value
        .get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

/// Parses fetched content into a page record and its outbound links
///
/// # Extraction Rules
///
/// - Title: the text of the first `<title>` element, trimmed
/// - Content: trimmed text nodes inside `<body>`, joined by single spaces, capped at
///   `snippet_cap` characters. `<script>`, `<style>` and `<javascript>` subtrees are skipped,
///   as is the text directly inside an `<a>`.
/// - Links: every `<a href>` whose value passes [`is_crawlable_href`]
///
/// # Example
///
/// ```
/// use ripple_crawl::crawler::parse_page;
///
/// let html = br#"<html><head><title>T</title></head><body><a href="http://x/">l</a>Hello</body></html>"#;
/// let parsed = parse_page("http://seed/", html, 500);
/// assert_eq!(parsed.record.title, "T");
/// assert_eq!(parsed.record.content, "Hello");
/// assert_eq!(parsed.links, vec!["http://x/".to_string()]);
/// ```
pub fn parse_page(url: &str, content: &[u8], snippet_cap: usize) -> ParsedPage {
    let html = String::from_utf8_lossy(content);
    let document = Html::parse_document(&html);

    let mut walker = Walker::new(snippet_cap);
    walker.walk(document.root_element());

    ParsedPage {
        record: PageRecord {
            url: url.to_string(),
            title: walker.title.unwrap_or_default(),
            content: walker.snippet.finish(),
        },
        links: walker.links,
    }
}

/// Convenience function for extracting just the accepted links from HTML
pub fn extract_links(html: &str) -> Vec<String> {
    parse_page("", html.as_bytes(), 0).links
}

#[derive(Debug, Clone, Copy, Default)]
struct Scope {
    in_body: bool,
    in_anchor: bool,
    in_title: bool,
}

enum Item<'a> {
    Element(ElementRef<'a>, Scope),
    Text(&'a str, Scope),
}

struct Walker {
    title: Option<String>,
    snippet: Snippet,
    links: Vec<String>,
}

impl Walker {
    fn new(snippet_cap: usize) -> Self {
        Self {
            title: None,
            snippet: Snippet::new(snippet_cap),
            links: Vec::new(),
        }
    }

    // Depth-first in document order with an explicit stack; deeply nested pages must not
    // exhaust the thread stack.
    fn walk(&mut self, root: ElementRef<'_>) {
        let mut stack = vec![Item::Element(root, Scope::default())];

        while let Some(item) = stack.pop() {
            match item {
                Item::Text(text, scope) => self.visit_text(text, scope),
                Item::Element(element, scope) => {
                    let Some(scope) = self.visit_element(element, scope) else {
                        continue;
                    };

                    for child in element.children().rev() {
                        match child.value() {
                            Node::Text(text) => stack.push(Item::Text(text, scope)),
                            Node::Element(_) => {
                                if let Some(child) = ElementRef::wrap(child) {
                                    stack.push(Item::Element(child, scope));
                                }
                            }
                            _ => {}
                        }
                    }
                }
            }
        }
    }

    /// Handles an element's start; returns the scope for its children, or `None` to skip them
    fn visit_element(&mut self, element: ElementRef<'_>, parent: Scope) -> Option<Scope> {
        let name = element.value().name();

        if SKIPPED_ELEMENTS
            .iter()
            .any(|skipped| name.eq_ignore_ascii_case(skipped))
        {
            return None;
        }

        let mut scope = Scope {
            in_anchor: false,
            in_title: false,
            ..parent
        };

        match name {
            "body" => scope.in_body = true,
            "title" if self.title.is_none() => {
                scope.in_title = true;
                self.title = Some(String::new());
            }
            "a" => {
                scope.in_anchor = true;
                if let Some(href) = element.value().attr("href") {
                    if is_crawlable_href(href) {
                        self.links.push(href.trim().to_string());
                    } else {
                        tracing::trace!("Rejected href: {:?}", href);
                    }
                }
            }
            _ => {}
        }

        Some(scope)
    }

    fn visit_text(&mut self, text: &str, scope: Scope) {
        if scope.in_title {
            if let Some(title) = self.title.as_mut() {
                if title.is_empty() {
                    title.push_str(text.trim());
                }
            }
            return;
        }

        if scope.in_body && !scope.in_anchor {
            self.snippet.push(text.trim());
        }
    }
}

/// Body text accumulator bounded to a fixed number of characters
struct Snippet {
    text: String,
    chars: usize,
    cap: usize,
}

impl Snippet {
    fn new(cap: usize) -> Self {
        Self {
            text: String::new(),
            chars: 0,
            cap,
        }
    }

    fn is_full(&self) -> bool {
        self.chars >= self.cap
    }

    fn push(&mut self, fragment: &str) {
        if fragment.is_empty() || self.is_full() {
            return;
        }

        if !self.text.is_empty() {
            self.text.push(' ');
            self.chars += 1;
            if self.is_full() {
                return;
            }
        }

        let remaining = self.cap - self.chars;
        for ch in fragment.chars().take(remaining) {
            self.text.push(ch);
            self.chars += 1;
        }
    }

    fn finish(self) -> String {
        // A separator can land exactly on the cap with nothing after it
        self.text.trim_end().to_string()
    }
}
