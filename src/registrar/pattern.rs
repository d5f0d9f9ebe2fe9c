//! Path pattern matching.
//!
//! # Syntax
//! - `?` matches one character within a segment
//! - `*` matches zero or more characters within a segment
//! - `**` as a whole segment matches zero or more segments
//!
//! # Design Decisions
//! - Patterns and paths are split on `/`; empty segments are ignored, so
//!   `/actuator/**` matches `/actuator`, `/actuator/` and `/actuator/health`
//! - Matching is case-sensitive
//! - No regex to guarantee predictable matching cost

use thiserror::Error;

use crate::config::TracingConfig;

/// A malformed path pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("path pattern `{0}` must start with '/'")]
pub struct PatternError(pub String);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Wildcard(Vec<char>),
    AnyDepth,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "**" {
            Segment::AnyDepth
        } else if raw.contains(['*', '?']) {
            Segment::Wildcard(raw.chars().collect())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(literal) => literal == segment,
            Segment::Wildcard(pattern) => wildcard_match(pattern, segment),
            Segment::AnyDepth => true,
        }
    }
}

/// `*` / `?` matching within a single segment, with star backtracking.
fn wildcard_match(pattern: &[char], text: &str) -> bool {
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        match pattern.get(p) {
            Some('?') => {
                p += 1;
                t += 1;
            }
            Some('*') => {
                star = Some((p, t));
                p += 1;
            }
            Some(&c) if c == text[t] => {
                p += 1;
                t += 1;
            }
            _ => match star {
                Some((star_p, star_t)) => {
                    p = star_p + 1;
                    t = star_t + 1;
                    star = Some((star_p, star_t + 1));
                }
                None => return false,
            },
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// A compiled path pattern such as `/swagger-resources/**`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(raw: &str) -> Result<Self, PatternError> {
        if !raw.starts_with('/') {
            return Err(PatternError(raw.to_string()));
        }
        Ok(Self {
            raw: raw.to_string(),
            segments: segments(raw).map(Segment::parse).collect(),
        })
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn matches(&self, path: &str) -> bool {
        let path: Vec<&str> = segments(path).collect();
        match_segments(&self.segments, &path)
    }
}

fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((Segment::AnyDepth, rest)) => {
            (0..=path.len()).any(|skip| match_segments(rest, &path[skip..]))
        }
        Some((segment, rest)) => match path.split_first() {
            Some((first, tail)) => segment.matches(first) && match_segments(rest, tail),
            None => false,
        },
    }
}

/// Include/exclude rules deciding which request paths are traced.
#[derive(Debug, Clone)]
pub struct PathFilter {
    include: Vec<PathPattern>,
    exclude: Vec<PathPattern>,
}

impl PathFilter {
    pub fn new<I, E, S1, S2>(include: I, exclude: E) -> Result<Self, PatternError>
    where
        I: IntoIterator<Item = S1>,
        E: IntoIterator<Item = S2>,
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        Ok(Self {
            include: include
                .into_iter()
                .map(|p| PathPattern::parse(p.as_ref()))
                .collect::<Result<_, _>>()?,
            exclude: exclude
                .into_iter()
                .map(|p| PathPattern::parse(p.as_ref()))
                .collect::<Result<_, _>>()?,
        })
    }

    pub fn from_config(config: &TracingConfig) -> Result<Self, PatternError> {
        Self::new(&config.include, &config.exclude)
    }

    /// True when some include pattern matches and no exclude pattern does.
    pub fn should_trace(&self, path: &str) -> bool {
        self.include.iter().any(|p| p.matches(path)) && !self.exclude.iter().any(|p| p.matches(path))
    }
}

impl Default for PathFilter {
    fn default() -> Self {
        let config = TracingConfig::default();
        Self {
            include: config
                .include
                .iter()
                .filter_map(|p| PathPattern::parse(p).ok())
                .collect(),
            exclude: config
                .exclude
                .iter()
                .filter_map(|p| PathPattern::parse(p).ok())
                .collect(),
        }
    }
}
