//! hq CSS Selectors
//!
//! Selector parsing, right-to-left matching against the arena tree, and
//! `Selection`, the ordered node set every query produces.

mod matching;
mod selection;
mod selectors;

pub use selection::Selection;
pub use selectors::{
    AttributeMatcher, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    NthExpression, PseudoClass, SelectorComponent, SelectorList,
};

/// Selector syntax error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("unexpected '{found}' at position {position}")]
    Unexpected { found: char, position: usize },

    #[error("unexpected end of selector")]
    UnexpectedEnd,

    #[error("unsupported pseudo-class or pseudo-element '{0}'")]
    UnsupportedPseudo(String),

    #[error("invalid nth expression '{0}'")]
    InvalidNth(String),
}

/// Failure to use a selection
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("the document behind this selection has been released")]
    DocumentReleased,
}
