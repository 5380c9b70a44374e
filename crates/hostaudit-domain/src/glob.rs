//! Shell-style glob matching for OS patterns and tag filters.
//!
//! `*` crosses `/`, matching is case-sensitive and backslash is a literal character.
//! Braces are ordinary characters; there is no `{a,b}` alternation.

use globset::{GlobBuilder, GlobMatcher};

pub fn compile(pattern: &str) -> Result<GlobMatcher, globset::Error> {
    Ok(GlobBuilder::new(&escape_braces(pattern))
        .literal_separator(false)
        .backslash_escape(false)
        .build()?
        .compile_matcher())
}

/// Wraps `{` and `}` outside character classes in `[..]` so globset reads them literally.
fn escape_braces(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len());
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => out.push_str("[{]"),
            '}' => out.push_str("[}]"),
            '[' => {
                out.push(c);
                // `[!]...]` and `[]...]` open with a literal `]`.
                if let Some(&bang) = chars.peek()
                    && bang == '!'
                {
                    out.push(bang);
                    chars.next();
                }
                if let Some(&close) = chars.peek()
                    && close == ']'
                {
                    out.push(close);
                    chars.next();
                }
                for inner in chars.by_ref() {
                    out.push(inner);
                    if inner == ']' {
                        break;
                    }
                }
            }
            _ => out.push(c),
        }
    }
    out
}

/// Restricts an audit run to the tags matching a glob.
#[derive(Clone, Debug)]
pub struct TagFilter {
    pattern: String,
    /// `None` matches every tag.
    matcher: Option<GlobMatcher>,
}

impl TagFilter {
    pub fn new(pattern: &str) -> Result<Self, globset::Error> {
        Ok(Self {
            pattern: pattern.to_string(),
            matcher: Some(compile(pattern)?),
        })
    }

    pub fn all() -> Self {
        Self {
            pattern: "*".to_string(),
            matcher: None,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn matches(&self, tag: &str) -> bool {
        self.matcher.as_ref().is_none_or(|m| m.is_match(tag))
    }
}
