//! Ant-style path patterns.
//!
//! # Syntax
//! - `?` matches one character inside a segment
//! - `*` matches any run of characters inside a segment
//! - `**` matches zero or more whole segments
//!
//! # Design Decisions
//! - Patterns compiled once at startup, matched without allocation per segment
//! - No regex: matching is a segment walk with backtracking only on `**`
//! - Case-sensitive; a trailing `/` is significant
//! - Consecutive `**` segments collapse (`/a/**/**` is `/a/**`)

use std::fmt;

use thiserror::Error;

/// Error produced when a pattern cannot be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    #[error("pattern {0:?} must start with '/'")]
    NotAbsolute(String),

    #[error("pattern {0:?} uses '**' inside a segment; it must stand alone between slashes")]
    EmbeddedDoubleWildcard(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// `**`
    AnyDepth,
    /// Segment without wildcards.
    Literal(String),
    /// Segment containing `*` or `?`.
    Glob(Vec<char>),
}

impl Segment {
    fn matches(&self, candidate: &str) -> bool {
        match self {
            Segment::AnyDepth => true,
            Segment::Literal(lit) => lit == candidate,
            Segment::Glob(glob) => {
                let text: Vec<char> = candidate.chars().collect();
                glob_match(glob, &text)
            }
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::AnyDepth => f.write_str("**"),
            Segment::Literal(lit) => f.write_str(lit),
            Segment::Glob(glob) => glob.iter().try_for_each(|c| write!(f, "{c}")),
        }
    }
}

/// A compiled path pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    source: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    /// Compile a pattern such as `/offers/**` or `/swagger-ui.html`.
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        let Some(rest) = raw.strip_prefix('/') else {
            return Err(PatternError::NotAbsolute(raw.to_string()));
        };

        let mut segments: Vec<Segment> = Vec::new();
        for part in rest.split('/') {
            let segment = if part == "**" {
                Segment::AnyDepth
            } else if part.contains("**") {
                return Err(PatternError::EmbeddedDoubleWildcard(raw.to_string()));
            } else if part.contains(['*', '?']) {
                Segment::Glob(part.chars().collect())
            } else {
                Segment::Literal(part.to_string())
            };

            if segment == Segment::AnyDepth && segments.last() == Some(&Segment::AnyDepth) {
                continue;
            }
            segments.push(segment);
        }

        let source = segments
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("/");

        Ok(Self {
            source: format!("/{source}"),
            segments,
        })
    }

    /// The normalized pattern text.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Returns true if `path` matches this pattern.
    ///
    /// Paths that do not start with `/` never match.
    pub fn matches(&self, path: &str) -> bool {
        let Some(rest) = path.strip_prefix('/') else {
            return false;
        };
        let parts: Vec<&str> = rest.split('/').collect();
        match_segments(&self.segments, &parts)
    }
}

impl fmt::Display for PathPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((head, tail)) => segment.matches(head) && match_segments(rest, tail),
            None => false,
        },
    }
}

fn glob_match(glob: &[char], text: &[char]) -> bool {
    // Iterative wildcard match; remembers the last `*` to backtrack to.
    let (mut g, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if g < glob.len() && (glob[g] == '?' || glob[g] == text[t]) {
            g += 1;
            t += 1;
        } else if g < glob.len() && glob[g] == '*' {
            star = Some((g, t));
            g += 1;
        } else if let Some((sg, st)) = star {
            g = sg + 1;
            t = st + 1;
            star = Some((sg, st + 1));
        } else {
            return false;
        }
    }

    glob[g..].iter().all(|&c| c == '*')
}

/// An ordered, de-duplicated list of patterns.
///
/// Duplicates are dropped after normalization, keeping the first occurrence,
/// so `/h2-console/**/**` and `/h2-console/**` count once.
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<PathPattern>,
}

impl PatternSet {
    /// Compile every pattern, failing on the first invalid one.
    pub fn compile<S: AsRef<str>>(raw: &[S]) -> Result<Self, PatternError> {
        let mut patterns: Vec<PathPattern> = Vec::with_capacity(raw.len());
        for item in raw {
            let pattern = PathPattern::parse(item.as_ref())?;
            if !patterns.iter().any(|p| p.as_str() == pattern.as_str()) {
                patterns.push(pattern);
            }
        }
        Ok(Self { patterns })
    }

    /// First pattern matching `path`, in declaration order.
    pub fn first_match(&self, path: &str) -> Option<&PathPattern> {
        self.patterns.iter().find(|p| p.matches(path))
    }

    pub fn matches(&self, path: &str) -> bool {
        self.first_match(path).is_some()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PathPattern> {
        self.patterns.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pat(raw: &str) -> PathPattern {
        PathPattern::parse(raw).unwrap()
    }

    #[test]
    fn test_exact_pattern() {
        let p = pat("/authentication/login");
        assert!(p.matches("/authentication/login"));
        assert!(!p.matches("/authentication/login/"));
        assert!(!p.matches("/authentication/logins"));
        assert!(!p.matches("/Authentication/login"));
        assert!(!p.matches("authentication/login"));
    }

    #[test]
    fn test_double_wildcard_matches_any_depth() {
        let p = pat("/offers/**");
        assert!(p.matches("/offers"));
        assert!(p.matches("/offers/"));
        assert!(p.matches("/offers/123"));
        assert!(p.matches("/offers/123/images/1.png"));
        assert!(!p.matches("/offersx"));
        assert!(!p.matches("/account/offers/1"));
    }

    #[test]
    fn test_double_wildcard_in_middle() {
        let p = pat("/api/**/edit");
        assert!(p.matches("/api/edit"));
        assert!(p.matches("/api/a/b/edit"));
        assert!(!p.matches("/api/a/b/view"));
    }

    #[test]
    fn test_single_segment_wildcards() {
        let p = pat("/static/*.js");
        assert!(p.matches("/static/app.js"));
        assert!(p.matches("/static/.js"));
        assert!(!p.matches("/static/app.css"));
        assert!(!p.matches("/static/js/app.js"));

        let q = pat("/v?/api-docs");
        assert!(q.matches("/v2/api-docs"));
        assert!(!q.matches("/v10/api-docs"));

        let r = pat("/a*b*c");
        assert!(r.matches("/abc"));
        assert!(r.matches("/axxbyyc"));
        assert!(!r.matches("/axxbyy"));
    }

    #[test]
    fn test_collapses_repeated_double_wildcard() {
        let p = pat("/h2-console/**/**");
        assert_eq!(p.as_str(), "/h2-console/**");
        assert!(p.matches("/h2-console"));
        assert!(p.matches("/h2-console/login.do"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert_eq!(
            PathPattern::parse("offers/**"),
            Err(PatternError::NotAbsolute("offers/**".into()))
        );
        assert!(matches!(
            PathPattern::parse("/offers**"),
            Err(PatternError::EmbeddedDoubleWildcard(_))
        ));
    }

    #[test]
    fn test_pattern_set_dedupes_and_keeps_order() {
        let set = PatternSet::compile(&[
            "/swagger-ui.html",
            "/h2-console/**/**",
            "/webjars/**",
            "/swagger-ui.html",
            "/h2-console/**",
        ])
        .unwrap();

        let listed: Vec<&str> = set.iter().map(PathPattern::as_str).collect();
        assert_eq!(listed, vec!["/swagger-ui.html", "/h2-console/**", "/webjars/**"]);
        assert_eq!(
            set.first_match("/webjars/jquery.js").map(PathPattern::as_str),
            Some("/webjars/**")
        );
        assert!(!set.matches("/account"));
    }
}
