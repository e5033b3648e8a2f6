//! URI patterns.
//!
//! A [`UriPattern`] is compiled once at startup from a template such as
//! `/widgets/{id}/parts/:part` and then used as a matching predicate for every
//! request. Supported placeholders:
//!
//! - `{name}` anywhere inside a segment, matching up to the next `/`
//! - `:name` as a whole segment
//! - `*name` as the final segment, matching the rest of the path

use regex::Regex;
use thiserror::Error;

use crate::Params;

/// Errors raised while compiling a URI template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The template does not start with `/`.
    #[error("pattern '{0}' must start with '/'")]
    NotAbsolute(String),

    /// A `{` has no matching `}`.
    #[error("unclosed '{{' in pattern '{0}'")]
    UnclosedBrace(String),

    /// A placeholder name is empty or not an identifier.
    #[error("invalid parameter name '{name}' in pattern '{pattern}'")]
    InvalidName {
        /// The offending name
        name: String,
        /// The template
        pattern: String,
    },

    /// The same placeholder name is used twice.
    #[error("duplicate parameter '{name}' in pattern '{pattern}'")]
    DuplicateName {
        /// The repeated name
        name: String,
        /// The template
        pattern: String,
    },

    /// A `*rest` placeholder is not the final segment.
    #[error("wildcard must be the last segment in pattern '{0}'")]
    MisplacedWildcard(String),

    /// The generated expression failed to compile.
    #[error("failed to compile pattern: {0}")]
    Regex(#[from] regex::Error),
}

/// A compiled URI template.
///
/// Matching is anchored at both ends and tolerates one trailing slash.
/// Extracted values are percent-decoded; a value that is not valid UTF-8 once
/// decoded is kept in its raw form.
///
/// # Example
///
/// ```rust
/// use outpost_router::UriPattern;
///
/// let pattern = UriPattern::parse("/files/*path").unwrap();
/// let params = pattern.matches("/files/a/b%20c.txt").unwrap();
/// assert_eq!(params.get("path"), Some("a/b c.txt"));
/// ```
#[derive(Debug, Clone)]
pub struct UriPattern {
    template: String,
    regex: Regex,
    names: Vec<String>,
}

impl UriPattern {
    /// Compiles a template.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        if !template.starts_with('/') {
            return Err(PatternError::NotAbsolute(template.to_string()));
        }

        let segments: Vec<&str> = template[1..].split('/').collect();
        let mut names: Vec<String> = Vec::new();
        let mut expr = String::from("^");

        for (index, segment) in segments.iter().enumerate() {
            let is_last = index + 1 == segments.len();
            expr.push('/');

            if let Some(name) = segment.strip_prefix('*') {
                if !is_last {
                    return Err(PatternError::MisplacedWildcard(template.to_string()));
                }
                register(&mut names, name, template)?;
                expr.push_str(&format!("(?P<{name}>.*)"));
            } else if let Some(name) = segment.strip_prefix(':') {
                register(&mut names, name, template)?;
                expr.push_str(&format!("(?P<{name}>[^/]+)"));
            } else {
                compile_segment(segment, template, &mut names, &mut expr)?;
            }
        }

        if !template.ends_with('/') {
            expr.push_str("/?");
        }
        expr.push('$');

        Ok(Self {
            template: template.to_string(),
            regex: Regex::new(&expr)?,
            names,
        })
    }

    /// Returns the template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the placeholder names in declaration order.
    #[must_use]
    pub fn param_names(&self) -> &[String] {
        &self.names
    }

    /// Matches a request path, returning the extracted parameters.
    ///
    /// `None` means the pattern does not apply. A match with no placeholders
    /// yields an empty [`Params`].
    #[must_use]
    pub fn matches(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;
        let mut params = Params::new();

        for name in &self.names {
            if let Some(raw) = captures.name(name) {
                params.bind_encoded(name.as_str(), raw.as_str());
            }
        }

        Some(params)
    }
}

fn compile_segment(
    segment: &str,
    template: &str,
    names: &mut Vec<String>,
    expr: &mut String,
) -> Result<(), PatternError> {
    let mut rest = segment;

    while let Some(open) = rest.find('{') {
        expr.push_str(&regex::escape(&rest[..open]));
        let after = &rest[open + 1..];
        let close = after
            .find('}')
            .ok_or_else(|| PatternError::UnclosedBrace(template.to_string()))?;
        let name = &after[..close];
        register(names, name, template)?;
        expr.push_str(&format!("(?P<{name}>[^/]+?)"));
        rest = &after[close + 1..];
    }

    expr.push_str(&regex::escape(rest));
    Ok(())
}

fn register(names: &mut Vec<String>, name: &str, template: &str) -> Result<(), PatternError> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(PatternError::InvalidName {
            name: name.to_string(),
            pattern: template.to_string(),
        });
    }
    if names.iter().any(|n| n == name) {
        return Err(PatternError::DuplicateName {
            name: name.to_string(),
            pattern: template.to_string(),
        });
    }

    names.push(name.to_string());
    Ok(())
}
