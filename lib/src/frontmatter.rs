//! Front matter detection and parsing.
//!
//! A document may open with a fenced block of configuration. The fence
//! determines the format:
//!
//! | opening fence | closing fence | format |
//! |---------------|---------------|--------|
//! | `---\n`       | `\n---\n`     | YAML   |
//! | `+++\n`       | `\n+++\n`     | TOML   |
//! | `%%%\n`       | `\n%%%\n`     | TOML   |
//! | `{\n`         | `\n}\n`       | JSON   |
//!
//! An opening fence without a matching closing fence is not front matter: the
//! whole input is treated as the body.

use std::borrow::Cow;
use std::fmt;

use crate::error::{Chainable, Result};
use crate::value::{Dict, Format, Json, Toml, Yaml};

/// Configuration resolved from front matter.
pub type Config = Dict;

/// The format of a front matter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrontMatterKind {
    None,
    Yaml,
    Toml,
    Json,
}

impl fmt::Display for FrontMatterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrontMatterKind::None => "none".fmt(f),
            FrontMatterKind::Yaml => Yaml::NAME.fmt(f),
            FrontMatterKind::Toml => Toml::NAME.fmt(f),
            FrontMatterKind::Json => Json::NAME.fmt(f),
        }
    }
}

const FENCES: &[(&str, &str, FrontMatterKind)] = &[
    ("---\n", "\n---\n", FrontMatterKind::Yaml),
    ("+++\n", "\n+++\n", FrontMatterKind::Toml),
    ("%%%\n", "\n%%%\n", FrontMatterKind::Toml),
    ("{\n", "\n}\n", FrontMatterKind::Json),
];

/// A document split into its front matter and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split<'a> {
    pub kind: FrontMatterKind,
    /// The front matter without its fences. JSON front matter keeps its
    /// braces so that it remains a complete JSON object.
    pub front_matter: Cow<'a, str>,
    pub body: &'a str,
}

impl<'a> Split<'a> {
    fn none(input: &'a str) -> Self {
        Split { kind: FrontMatterKind::None, front_matter: Cow::Borrowed(""), body: input }
    }

    /// Resolves the front matter into a [`Config`]. See [`resolve()`].
    pub fn config(&self) -> Result<Config> {
        resolve(self.kind, &self.front_matter)
    }
}

/// Splits `input` into front matter and body.
///
/// ```rust
/// use mkpage::frontmatter::{split, FrontMatterKind};
///
/// let split = split("---\ntitle: Hi\n---\n# Body\n");
/// assert_eq!(split.kind, FrontMatterKind::Yaml);
/// assert_eq!(split.front_matter, "title: Hi");
/// assert_eq!(split.body, "# Body\n");
///
/// let split = mkpage::frontmatter::split("---\nno closing fence\n");
/// assert_eq!(split.kind, FrontMatterKind::None);
/// assert_eq!(split.body, "---\nno closing fence\n");
/// ```
pub fn split(input: &str) -> Split<'_> {
    for &(open, close, kind) in FENCES {
        if !input.starts_with(open) {
            continue;
        }

        // The closing fence may reuse the opener's newline: `---\n---\n`.
        let rest = &input[(open.len() - 1)..];
        let Some(i) = rest.find(close) else {
            return Split::none(input);
        };

        let payload = &rest[i.min(1)..i];
        let body = &rest[(i + close.len())..];
        let front_matter = match kind {
            FrontMatterKind::Json => Cow::Owned(format!("{{\n{payload}\n}}")),
            _ => Cow::Borrowed(payload),
        };

        return Split { kind, front_matter, body };
    }

    Split::none(input)
}

/// Parses `front_matter` as `kind` into a [`Config`].
///
/// Empty or whitespace-only front matter and [`FrontMatterKind::None`] yield
/// an empty config. A payload that is malformed or not a mapping fails with
/// [`ErrorKind::ConfigParse`](crate::error::ErrorKind::ConfigParse).
pub fn resolve(kind: FrontMatterKind, front_matter: &str) -> Result<Config> {
    let trimmed = front_matter.trim();
    if kind == FrontMatterKind::None || trimmed.is_empty() || trimmed == "{}" {
        return Ok(Config::new());
    }

    let config: Result<Config> = match kind {
        FrontMatterKind::Yaml => Yaml::from_str::<Config>(front_matter).map_err(Into::into),
        FrontMatterKind::Toml => Toml::from_str::<Config>(front_matter).map_err(Into::into),
        FrontMatterKind::Json => Json::from_str::<Config>(front_matter).map_err(Into::into),
        FrontMatterKind::None => Ok(Config::new()),
    };

    config.chain_with(|| error! {
        ConfigParse: "invalid front matter",
        "format" => kind,
    })
}

/// Splits `input` and resolves its front matter in one step.
pub fn parse(input: &str) -> Result<(Config, &str)> {
    let split = split(input);
    Ok((split.config()?, split.body))
}
