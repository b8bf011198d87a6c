//! Ignore-rule predicates over discovered paths.
//!
//! Three rule shapes are supported and all of them see the full path string
//! as produced by discovery (build root included):
//!
//! | Rule | Matches when |
//! |---|---|
//! | [`IgnoreRule::Regex`] | the regex finds a match anywhere in the path |
//! | [`IgnoreRule::Glob`] | the whole path matches the glob |
//! | [`IgnoreRule::Predicate`] | the callable returns `true` |
//!
//! ## Glob syntax
//!
//! Globs are compiled once into anchored regexes:
//!
//! - `*` and `**` match any run of characters, directory separators included
//! - `?` matches exactly one character
//! - `[abc]`, `[a-z]`, `[!abc]` / `[^abc]` are character classes
//! - `{png,gif}` is an alternation (no nesting)
//! - `\x` matches `x` literally
//!
//! So `**/*.gif` ignores every GIF below the build root and `*.gif` does too.

use regex::Regex;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GlobError {
    #[error("unclosed character class in `{0}`")]
    UnclosedClass(String),
    #[error("unclosed alternation in `{0}`")]
    UnclosedAlternation(String),
    #[error("nested alternation in `{0}`")]
    NestedAlternation(String),
    #[error("dangling escape at end of `{0}`")]
    DanglingEscape(String),
    #[error("invalid glob `{pattern}`: {reason}")]
    Invalid { pattern: String, reason: String },
}

/// A compiled glob pattern.
#[derive(Debug, Clone)]
pub struct Glob {
    pattern: String,
    regex: Regex,
}

impl Glob {
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        let source = glob_to_regex(pattern)?;
        let regex = Regex::new(&source).map_err(|e| GlobError::Invalid {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern: pattern.to_string(),
            regex,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Translate a glob into an anchored regex source string.
fn glob_to_regex(pattern: &str) -> Result<String, GlobError> {
    let mut out = String::with_capacity(pattern.len() * 2 + 8);
    out.push_str("^(?s:");
    let mut chars = pattern.chars().peekable();
    let mut in_alternation = false;

    while let Some(c) = chars.next() {
        match c {
            '*' => {
                while chars.peek() == Some(&'*') {
                    chars.next();
                }
                out.push_str(".*");
            }
            '?' => out.push('.'),
            '[' => {
                let mut class = String::from("[");
                if matches!(chars.peek(), Some('!') | Some('^')) {
                    chars.next();
                    class.push('^');
                }
                // A leading `]` is a literal member of the class.
                if chars.peek() == Some(&']') {
                    chars.next();
                    class.push_str("\\]");
                }
                let mut closed = false;
                for c in chars.by_ref() {
                    match c {
                        ']' => {
                            closed = true;
                            break;
                        }
                        '\\' | '[' | '&' | '~' | '^' => {
                            class.push('\\');
                            class.push(c);
                        }
                        _ => class.push(c),
                    }
                }
                if !closed {
                    return Err(GlobError::UnclosedClass(pattern.to_string()));
                }
                class.push(']');
                out.push_str(&class);
            }
            '{' => {
                if in_alternation {
                    return Err(GlobError::NestedAlternation(pattern.to_string()));
                }
                in_alternation = true;
                out.push_str("(?:");
            }
            ',' if in_alternation => out.push('|'),
            '}' if in_alternation => {
                in_alternation = false;
                out.push(')');
            }
            '\\' => match chars.next() {
                Some(escaped) => out.push_str(&regex::escape(&escaped.to_string())),
                None => return Err(GlobError::DanglingEscape(pattern.to_string())),
            },
            _ => out.push_str(&regex::escape(&c.to_string())),
        }
    }

    if in_alternation {
        return Err(GlobError::UnclosedAlternation(pattern.to_string()));
    }
    out.push_str(")$");
    Ok(out)
}

/// Callable ignore predicate over the path string.
pub type PathPredicate = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// One normalized ignore rule.
#[derive(Clone)]
pub enum IgnoreRule {
    Regex(Regex),
    Glob(Glob),
    Predicate(PathPredicate),
}

impl IgnoreRule {
    /// Wrap a closure as an ignore rule.
    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&str) -> bool + Send + Sync + 'static,
    {
        IgnoreRule::Predicate(Arc::new(f))
    }

    pub fn matches(&self, path: &Path) -> bool {
        let path = path.to_string_lossy();
        match self {
            IgnoreRule::Regex(re) => re.is_match(&path),
            IgnoreRule::Glob(glob) => glob.is_match(&path),
            IgnoreRule::Predicate(f) => f(&path),
        }
    }
}

impl fmt::Debug for IgnoreRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IgnoreRule::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
            IgnoreRule::Glob(glob) => f.debug_tuple("Glob").field(&glob.as_str()).finish(),
            IgnoreRule::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

/// True if any rule in `rules` matches `path`.
pub fn any_matches(rules: &[IgnoreRule], path: &Path) -> bool {
    rules.iter().any(|rule| rule.matches(path))
}
