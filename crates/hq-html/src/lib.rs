//! hq HTML Parser
//!
//! Browser-compatible HTML5 parsing built on html5ever. Malformed or partial
//! markup always produces a tree; only input that is not text fails.

mod parser;

pub use hq_dom::Document;
pub use parser::HtmlParser;

/// Parse an HTML string into a document
pub fn parse(html: &str) -> Document {
    HtmlParser::new().parse(html)
}

/// Input that could not be read as HTML text
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("failed to read HTML input: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTML input is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("expected HTML text, got {0}")]
    NotText(String),
}
