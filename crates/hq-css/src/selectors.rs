//! CSS Selectors Module
//!
//! Selector model and a hand-written parser for the subset of Selectors
//! Level 4 that makes sense on a static tree: no user-action or input-state
//! pseudo-classes, no pseudo-elements.

use crate::SelectorError;

/// Comma-separated list of complex selectors
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SelectorList(pub Vec<ComplexSelector>);

/// Compound selectors joined by combinators
///
/// Stored right to left: `subject` is the rightmost compound, `ancestors[0]`
/// the compound immediately to its left together with the combinator that
/// joins them.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSelector {
    pub subject: CompoundSelector,
    pub ancestors: Vec<(Combinator, CompoundSelector)>,
}

/// Sequence of simple selectors with no combinator between them
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompoundSelector(pub Vec<SelectorComponent>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// `a b`
    Descendant,
    /// `a > b`
    Child,
    /// `a + b`
    NextSibling,
    /// `a ~ b`
    SubsequentSibling,
}

/// A simple selector
#[derive(Debug, Clone, PartialEq)]
pub enum SelectorComponent {
    /// Universal selector *
    Universal,
    /// Type selector (tag name, lowercased)
    Type(String),
    /// ID selector #id
    Id(String),
    /// Class selector .class
    Class(String),
    /// Attribute selector [attr], [attr=value], etc.
    Attribute(AttributeSelector),
    /// Structural or logical pseudo-class
    PseudoClass(PseudoClass),
}

/// Pseudo-classes that depend only on tree structure
#[derive(Debug, Clone, PartialEq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthExpression),
    NthLastChild(NthExpression),
    NthOfType(NthExpression),
    NthLastOfType(NthExpression),
    /// :not() over a list of compound selectors
    Not(Vec<CompoundSelector>),
}

/// An+B expression for :nth-* selectors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NthExpression {
    /// Coefficient (A in An+B)
    pub a: i32,
    /// Offset (B in An+B)
    pub b: i32,
}

impl NthExpression {
    pub fn odd() -> Self {
        Self { a: 2, b: 1 }
    }

    pub fn even() -> Self {
        Self { a: 2, b: 0 }
    }

    pub fn index(n: i32) -> Self {
        Self { a: 0, b: n }
    }

    pub fn new(a: i32, b: i32) -> Self {
        Self { a, b }
    }

    /// Parse from string like "2n+1", "odd", "even", "3"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_ascii_lowercase();

        match s.as_str() {
            "odd" => return Some(Self::odd()),
            "even" => return Some(Self::even()),
            _ => {}
        }

        if let Ok(n) = s.parse::<i32>() {
            return Some(Self::index(n));
        }

        let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let n_pos = s.find('n')?;
        let a = match &s[..n_pos] {
            "" | "+" => 1,
            "-" => -1,
            a_str => a_str.parse().ok()?,
        };
        let rest = &s[n_pos + 1..];
        let b = if rest.is_empty() {
            0
        } else if rest.starts_with('+') || rest.starts_with('-') {
            rest.parse().ok()?
        } else {
            return None;
        };

        Some(Self::new(a, b))
    }

    /// Check if index n (1-based) matches this expression
    pub fn matches(&self, n: i32) -> bool {
        // Widened so that extreme coefficients from selector text cannot overflow
        let (a, b, n) = (i64::from(self.a), i64::from(self.b), i64::from(n));
        if a == 0 {
            return n == b;
        }

        let diff = n - b;
        if a > 0 {
            diff >= 0 && diff % a == 0
        } else {
            diff <= 0 && diff % a == 0
        }
    }
}

/// Attribute selector
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeSelector {
    /// Lowercased attribute name
    pub name: String,
    pub matcher: Option<AttributeMatcher>,
    pub case_insensitive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttributeMatcher {
    /// [attr=value]
    Exact(String),
    /// [attr~=value] - whitespace-separated list contains
    Contains(String),
    /// [attr|=value] - exact or prefix followed by a hyphen
    DashMatch(String),
    /// [attr^=value]
    Prefix(String),
    /// [attr$=value]
    Suffix(String),
    /// [attr*=value]
    Substring(String),
}

impl AttributeSelector {
    /// Check an attribute value, `None` meaning the attribute is absent
    pub fn matches(&self, value: Option<&str>) -> bool {
        let (Some(matcher), Some(value)) = (&self.matcher, value) else {
            return self.matcher.is_none() && value.is_some();
        };

        let fold = |s: &str| {
            if self.case_insensitive {
                s.to_ascii_lowercase()
            } else {
                s.to_string()
            }
        };
        let value = fold(value);

        match matcher {
            AttributeMatcher::Exact(expected) => value == fold(expected),
            AttributeMatcher::Contains(expected) => {
                let expected = fold(expected);
                !expected.is_empty()
                    && !expected.contains(char::is_whitespace)
                    && value.split_ascii_whitespace().any(|w| w == expected)
            }
            AttributeMatcher::DashMatch(expected) => {
                let expected = fold(expected);
                value == expected || value.starts_with(&format!("{}-", expected))
            }
            AttributeMatcher::Prefix(expected) => !expected.is_empty() && value.starts_with(&fold(expected)),
            AttributeMatcher::Suffix(expected) => !expected.is_empty() && value.ends_with(&fold(expected)),
            AttributeMatcher::Substring(expected) => !expected.is_empty() && value.contains(&fold(expected)),
        }
    }
}

impl SelectorList {
    /// Parse selector text. Empty or whitespace-only text yields an empty
    /// list, which matches nothing.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let mut parser = Parser::new(text);
        let mut list = Vec::new();

        parser.skip_whitespace();
        if parser.peek().is_none() {
            return Ok(Self(list));
        }

        loop {
            list.push(parser.complex()?);
            parser.skip_whitespace();
            match parser.peek() {
                None => break,
                Some(',') => {
                    parser.bump();
                    parser.skip_whitespace();
                }
                Some(c) => return Err(parser.unexpected(c)),
            }
        }

        Ok(Self(list))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn unexpected(&self, found: char) -> SelectorError {
        SelectorError::Unexpected {
            found,
            position: self.pos,
        }
    }

    fn expect(&mut self, want: char) -> Result<(), SelectorError> {
        match self.peek() {
            Some(c) if c == want => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(self.unexpected(c)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    /// Returns true if any whitespace was skipped
    fn skip_whitespace(&mut self) -> bool {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
        self.pos != start
    }

    fn complex(&mut self) -> Result<ComplexSelector, SelectorError> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();

        loop {
            let had_space = self.skip_whitespace();
            let combinator = match self.peek() {
                None | Some(',') | Some(')') => break,
                Some('>') => Combinator::Child,
                Some('+') => Combinator::NextSibling,
                Some('~') => Combinator::SubsequentSibling,
                Some(_) if had_space => Combinator::Descendant,
                Some(c) => return Err(self.unexpected(c)),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_whitespace();
            }
            combinators.push(combinator);
            compounds.push(self.compound()?);
        }

        let subject = compounds.pop().unwrap_or_default();
        let ancestors = combinators.into_iter().zip(compounds).rev().collect();
        Ok(ComplexSelector { subject, ancestors })
    }

    fn compound(&mut self) -> Result<CompoundSelector, SelectorError> {
        let mut components = Vec::new();

        match self.peek() {
            Some('*') => {
                self.bump();
                components.push(SelectorComponent::Universal);
            }
            Some(c) if is_ident_start(c) => {
                components.push(SelectorComponent::Type(self.ident()?.to_ascii_lowercase()));
            }
            _ => {}
        }

        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    components.push(SelectorComponent::Id(self.ident()?));
                }
                Some('.') => {
                    self.bump();
                    components.push(SelectorComponent::Class(self.ident()?));
                }
                Some('[') => {
                    self.bump();
                    components.push(SelectorComponent::Attribute(self.attribute()?));
                }
                Some(':') => {
                    self.bump();
                    components.push(SelectorComponent::PseudoClass(self.pseudo_class()?));
                }
                _ => break,
            }
        }

        if components.is_empty() {
            return Err(match self.peek() {
                Some(c) => self.unexpected(c),
                None => SelectorError::UnexpectedEnd,
            });
        }
        Ok(CompoundSelector(components))
    }

    fn attribute(&mut self) -> Result<AttributeSelector, SelectorError> {
        self.skip_whitespace();
        let name = self.ident()?.to_ascii_lowercase();
        self.skip_whitespace();

        let op = match self.peek() {
            Some(']') => {
                self.bump();
                return Ok(AttributeSelector {
                    name,
                    matcher: None,
                    case_insensitive: false,
                });
            }
            Some('=') => {
                self.bump();
                '='
            }
            Some(c @ ('~' | '|' | '^' | '$' | '*')) if self.peek_second() == Some('=') => {
                self.bump();
                self.bump();
                c
            }
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(SelectorError::UnexpectedEnd),
        };

        self.skip_whitespace();
        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => self.string(q)?,
            Some(_) => self.bare_value()?,
            None => return Err(SelectorError::UnexpectedEnd),
        };
        self.skip_whitespace();

        let mut case_insensitive = false;
        if let Some(flag @ ('i' | 'I' | 's' | 'S')) = self.peek() {
            self.bump();
            case_insensitive = flag.eq_ignore_ascii_case(&'i');
            self.skip_whitespace();
        }
        self.expect(']')?;

        let matcher = match op {
            '=' => AttributeMatcher::Exact(value),
            '~' => AttributeMatcher::Contains(value),
            '|' => AttributeMatcher::DashMatch(value),
            '^' => AttributeMatcher::Prefix(value),
            '$' => AttributeMatcher::Suffix(value),
            _ => AttributeMatcher::Substring(value),
        };
        Ok(AttributeSelector {
            name,
            matcher: Some(matcher),
            case_insensitive,
        })
    }

    fn pseudo_class(&mut self) -> Result<PseudoClass, SelectorError> {
        if self.peek() == Some(':') {
            self.bump();
            let name = self.ident().unwrap_or_default();
            return Err(SelectorError::UnsupportedPseudo(format!("::{}", name)));
        }

        let name = self.ident()?.to_ascii_lowercase();
        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            "nth-child" => PseudoClass::NthChild(self.nth_argument()?),
            "nth-last-child" => PseudoClass::NthLastChild(self.nth_argument()?),
            "nth-of-type" => PseudoClass::NthOfType(self.nth_argument()?),
            "nth-last-of-type" => PseudoClass::NthLastOfType(self.nth_argument()?),
            "not" => {
                self.expect('(')?;
                let mut inner = Vec::new();
                loop {
                    self.skip_whitespace();
                    inner.push(self.compound()?);
                    self.skip_whitespace();
                    match self.bump() {
                        Some(',') => continue,
                        Some(')') => break,
                        Some(c) => {
                            return Err(SelectorError::Unexpected {
                                found: c,
                                position: self.pos - c.len_utf8(),
                            });
                        }
                        None => return Err(SelectorError::UnexpectedEnd),
                    }
                }
                PseudoClass::Not(inner)
            }
            _ => return Err(SelectorError::UnsupportedPseudo(format!(":{}", name))),
        };
        Ok(pseudo)
    }

    fn nth_argument(&mut self) -> Result<NthExpression, SelectorError> {
        self.expect('(')?;
        let start = self.pos;
        let end = self.input[start..]
            .find(')')
            .map(|offset| start + offset)
            .ok_or(SelectorError::UnexpectedEnd)?;
        let raw = &self.input[start..end];
        self.pos = end + 1;
        NthExpression::parse(raw).ok_or_else(|| SelectorError::InvalidNth(raw.trim().to_string()))
    }

    fn ident(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        match self.peek() {
            Some('-') if self.peek_second().is_some_and(|c| is_ident_start(c) || c == '-') => {}
            Some('\\') => {}
            Some(c) if is_ident_start(c) => {}
            Some(c) => return Err(self.unexpected(c)),
            None => return Err(SelectorError::UnexpectedEnd),
        }

        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(SelectorError::UnexpectedEnd),
                }
            } else if is_ident_char(c) {
                self.bump();
                out.push(c);
            } else {
                break;
            }
        }
        Ok(out)
    }

    /// Unquoted attribute value; unlike an identifier it may start with a digit (`[border=1]`)
    fn bare_value(&mut self) -> Result<String, SelectorError> {
        let mut out = String::new();
        while let Some(c) = self.peek() {
            if c == '\\' {
                self.bump();
                out.push(self.bump().ok_or(SelectorError::UnexpectedEnd)?);
            } else if is_ident_char(c) {
                self.bump();
                out.push(c);
            } else {
                break;
            }
        }
        match self.peek() {
            _ if !out.is_empty() => Ok(out),
            Some(c) => Err(self.unexpected(c)),
            None => Err(SelectorError::UnexpectedEnd),
        }
    }

    fn string(&mut self, quote: char) -> Result<String, SelectorError> {
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some(c) if c == quote => return Ok(out),
                Some('\\') => match self.bump() {
                    Some(escaped) => out.push(escaped),
                    None => return Err(SelectorError::UnexpectedEnd),
                },
                Some(c) => out.push(c),
                None => return Err(SelectorError::UnexpectedEnd),
            }
        }
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_ident_char(c: char) -> bool {
    is_ident_start(c) || c.is_ascii_digit() || c == '-'
}
