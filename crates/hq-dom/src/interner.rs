//! String Interner
//!
//! Tag and attribute names repeat heavily in real documents; each distinct
//! name is stored once per tree and referenced by a 4-byte id.

use std::collections::HashMap;

/// Interned string ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct InternedString(pub u32);

impl InternedString {
    /// Empty string
    pub const EMPTY: InternedString = InternedString(0);
}

/// Per-tree string interner
#[derive(Debug)]
pub struct StringInterner {
    strings: Vec<Box<str>>,
    map: HashMap<Box<str>, u32>,
}

impl StringInterner {
    /// Create an interner with the names that show up in almost every page
    pub fn new() -> Self {
        let mut interner = Self {
            strings: Vec::with_capacity(64),
            map: HashMap::with_capacity(64),
        };

        interner.intern("");

        const COMMON: &[&str] = &[
            "html", "head", "body", "div", "span", "p", "a", "table", "tr", "td",
            "ul", "li", "id", "class", "href", "src", "style", "title",
        ];
        for name in COMMON {
            interner.intern(name);
        }

        interner
    }

    /// Intern a string, returning the existing id if already present
    pub fn intern(&mut self, s: &str) -> InternedString {
        if let Some(&idx) = self.map.get(s) {
            return InternedString(idx);
        }

        let idx = self.strings.len() as u32;
        self.strings.push(s.into());
        self.map.insert(s.into(), idx);
        InternedString(idx)
    }

    /// Look up a string without interning it
    pub fn lookup(&self, s: &str) -> Option<InternedString> {
        self.map.get(s).map(|&idx| InternedString(idx))
    }

    /// Resolve an id back to its string
    #[inline]
    pub fn resolve(&self, id: InternedString) -> &str {
        self.strings.get(id.0 as usize).map(|s| &**s).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Approximate heap usage in bytes
    pub fn memory_usage(&self) -> usize {
        let text: usize = self.strings.iter().map(|s| s.len() * 2).sum();
        text + self.strings.capacity() * std::mem::size_of::<Box<str>>()
            + self.map.capacity() * (std::mem::size_of::<Box<str>>() + std::mem::size_of::<u32>())
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_dedup() {
        let mut interner = StringInterner::new();
        let id1 = interner.intern("comment-tree");
        let id2 = interner.intern("comment-tree");
        assert_eq!(id1, id2);
    }

    #[test]
    fn test_resolve() {
        let mut interner = StringInterner::new();
        let id = interner.intern("border");
        assert_eq!(interner.resolve(id), "border");
        assert_eq!(interner.resolve(InternedString::EMPTY), "");
    }

    #[test]
    fn test_lookup_does_not_intern() {
        let interner = StringInterner::new();
        let before = interner.len();
        assert!(interner.lookup("never-seen").is_none());
        assert_eq!(interner.len(), before);
        assert!(interner.lookup("div").is_some());
    }
}
