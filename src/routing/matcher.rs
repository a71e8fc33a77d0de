//! Path matching logic.
//!
//! # Responsibilities
//! - Match an exact request path
//! - Match a path prefix
//! - Combine conditions with OR semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No regex to guarantee O(n) matching
//! - Matchers look at the path only, never the body

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches one exact path.
#[derive(Debug, Clone)]
pub struct ExactPathMatcher {
    path: String,
}

impl ExactPathMatcher {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into() }
    }
}

impl Matcher for ExactPathMatcher {
    fn matches(&self, path: &str) -> bool {
        path == self.path
    }
}

/// Matches the request path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }
}

/// Combines multiple matchers with OR semantics.
#[derive(Debug)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_matcher() {
        let matcher = ExactPathMatcher::new("/genesis.tar.bz2");

        assert!(matcher.matches("/genesis.tar.bz2"));
        assert!(!matcher.matches("/genesis.tar.bz2.sha256"));
        assert!(!matcher.matches("/GENESIS.tar.bz2"));
        assert!(!matcher.matches("genesis.tar.bz2"));
    }

    #[test]
    fn test_path_matcher() {
        let matcher = PathPrefixMatcher::new("/snapshot-");

        assert!(matcher.matches("/snapshot-100-abc.tar.zst"));
        assert!(matcher.matches("/snapshot-"));
        assert!(!matcher.matches("/snapshot"));
        assert!(!matcher.matches("/api/snapshot-1"));
    }

    #[test]
    fn test_any_matcher() {
        let matcher = AnyMatcher::new(vec![
            Box::new(PathPrefixMatcher::new("/a")),
            Box::new(ExactPathMatcher::new("/b")),
        ]);

        assert!(matcher.matches("/abc"));
        assert!(matcher.matches("/b"));
        assert!(!matcher.matches("/bc"));
        assert!(!AnyMatcher::new(Vec::new()).matches("/a"));
    }
}
