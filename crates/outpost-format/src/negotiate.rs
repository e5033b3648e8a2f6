//! `Accept` header negotiation.
//!
//! Negotiation is a pure function of the header and the registered formats:
//! ranges are ranked by quality (then specificity, then header order), ranges
//! with `q=0` exclude the formats they name, and wildcards prefer the default
//! format. When nothing is acceptable the default format is used.

use std::cmp::Ordering;

/// One media range from an `Accept` header.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaRange {
    /// Top-level type, lowercase (`application`, `*`).
    pub main: String,
    /// Subtype, lowercase (`json`, `*`).
    pub sub: String,
    /// Quality in `0.0..=1.0`.
    pub quality: f32,
}

impl MediaRange {
    fn parse(part: &str) -> Option<Self> {
        let mut pieces = part.split(';');
        let media = pieces.next()?.trim().to_ascii_lowercase();
        let (main, sub) = media.split_once('/')?;
        if main.is_empty() || sub.is_empty() {
            return None;
        }

        let mut quality = 1.0f32;
        for param in pieces {
            let param = param.trim();
            if let Some(q_value) = param.strip_prefix("q=").or_else(|| param.strip_prefix("Q=")) {
                if let Ok(q) = q_value.trim().parse::<f32>() {
                    quality = q.clamp(0.0, 1.0);
                }
            }
        }

        Some(Self {
            main: main.trim().to_string(),
            sub: sub.trim().to_string(),
            quality,
        })
    }

    /// Returns true for `*/*` and `type/*`.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.sub == "*"
    }

    /// Returns true if this range covers `media_type`.
    #[must_use]
    pub fn matches(&self, media_type: &str) -> bool {
        let Some((main, sub)) = media_type.split_once('/') else {
            return false;
        };
        (self.main == "*" || self.main.eq_ignore_ascii_case(main))
            && (self.sub == "*" || self.sub.eq_ignore_ascii_case(sub))
    }

    fn specificity(&self) -> u8 {
        match (self.main.as_str(), self.sub.as_str()) {
            ("*", _) => 0,
            (_, "*") => 1,
            _ => 2,
        }
    }
}

/// Parses an `Accept` header into ranges, best first.
///
/// Malformed ranges are skipped.
///
/// ```
/// use outpost_format::negotiate::parse_accept;
///
/// let ranges = parse_accept("text/html;q=0.5, application/hal+json, */*;q=0.1");
/// assert_eq!(ranges[0].sub, "hal+json");
/// assert_eq!(ranges[1].main, "text");
/// assert!(ranges[2].is_wildcard());
/// ```
#[must_use]
pub fn parse_accept(header: &str) -> Vec<MediaRange> {
    let mut ranges: Vec<MediaRange> = header
        .split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(MediaRange::parse)
        .collect();

    ranges.sort_by(|a, b| {
        b.quality
            .partial_cmp(&a.quality)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.specificity().cmp(&a.specificity()))
    });
    ranges
}

/// A format that takes part in negotiation.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    /// Registry name.
    pub name: &'a str,
    /// Media types the format produces.
    pub media_types: &'a [&'static str],
}

impl Candidate<'_> {
    fn accepted_by(&self, range: &MediaRange) -> bool {
        self.media_types.iter().any(|m| range.matches(m))
    }
}

/// Selects a format name for `accept` among `candidates`.
///
/// ```
/// use outpost_format::negotiate::{select, Candidate};
///
/// let candidates = [
///     Candidate { name: "json", media_types: &["application/json"] },
///     Candidate { name: "hal", media_types: &["application/hal+json"] },
/// ];
///
/// assert_eq!(select(Some("application/hal+json"), &candidates, "json"), "hal");
/// assert_eq!(select(Some("*/*"), &candidates, "json"), "json");
/// assert_eq!(select(Some("text/html"), &candidates, "json"), "json");
/// assert_eq!(select(None, &candidates, "json"), "json");
/// ```
#[must_use]
pub fn select<'a>(accept: Option<&str>, candidates: &[Candidate<'a>], default: &'a str) -> &'a str {
    let Some(header) = accept.map(str::trim).filter(|h| !h.is_empty()) else {
        return default;
    };
    let ranges = parse_accept(header);

    let excluded = |candidate: &Candidate<'_>| {
        ranges
            .iter()
            .filter(|r| r.quality <= 0.0 && !r.is_wildcard())
            .any(|r| candidate.accepted_by(r))
    };
    let eligible: Vec<&Candidate<'a>> = candidates.iter().filter(|c| !excluded(*c)).collect();

    for range in ranges.iter().filter(|r| r.quality > 0.0) {
        if range.is_wildcard() {
            if let Some(preferred) = eligible
                .iter()
                .find(|c| c.name == default && c.accepted_by(range))
            {
                return preferred.name;
            }
        }
        if let Some(found) = eligible.iter().find(|c| c.accepted_by(range)) {
            return found.name;
        }
    }

    default
}
