//! Markup engines and engine selection.
//!
//! A document's front matter may name its engine under the `markup` key and
//! configure it with an option table keyed by the engine's name:
//!
//! ```rust
//! let doc = "---\nmarkup: gomarkdown\ngomarkdown:\n  Tables: true\n---\n| a |\n|---|\n| 1 |\n";
//! let html = mkpage::markup::render(doc).unwrap();
//! assert!(html.contains("<table>"));
//! ```
//!
//! Documents that don't name an engine are rendered as CommonMark with
//! [`MarkdownOptions::COMMON`].

mod plugin;
mod markdown;
mod options;
mod auto_heading;
mod links;

pub mod mmark;
pub mod fountain;

pub use plugin::{Plugin, Events};
pub use markdown::Markdown;
pub use options::{MarkdownOptions, MmarkOptions, FountainOptions};
pub use auto_heading::AutoHeading;

use std::fmt;

use crate::error::{Chainable, Result};
use crate::frontmatter::{self, Config};
use crate::util::normalize_newlines;
use crate::value::Value;

use options::option_table;

/// A markup engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Markup {
    CommonMark,
    Mmark,
    Fountain,
}

impl Markup {
    /// Looks up an engine by the name used for it in front matter.
    ///
    /// ```rust
    /// use mkpage::markup::Markup;
    ///
    /// assert_eq!(Markup::from_name("gomarkdown").unwrap(), Markup::CommonMark);
    /// assert_eq!(Markup::from_name("blackfriday").unwrap(), Markup::CommonMark);
    /// assert_eq!(Markup::from_name("mmark").unwrap(), Markup::Mmark);
    /// assert!(Markup::from_name("asciidoc").is_err());
    /// ```
    pub fn from_name(name: &str) -> Result<Markup> {
        match name {
            "gomarkdown" | "markdown" | "commonmark" | "blackfriday" => Ok(Markup::CommonMark),
            "mmark" => Ok(Markup::Mmark),
            "fountain" => Ok(Markup::Fountain),
            _ => err! {
                UnsupportedMarkup: "unsupported markup engine",
                "markup" => name,
                "supported" => "gomarkdown, mmark, fountain",
            }
        }
    }

    /// The engine selected by `config`'s `markup` key, if it has one.
    pub fn select(config: &Config) -> Result<Option<Markup>> {
        let markup = match config.get("markup") {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(name)) => Markup::from_name(name)?,
            Some(value) => return err! {
                UnsupportedMarkup: "`markup` must name an engine",
                "found" => value.kind(),
            }
        };

        log::debug!("front matter selected the {markup} engine");
        Ok(Some(markup))
    }

    /// Renders `body` with `self`, reading this engine's options from
    /// `config`.
    pub fn render_body(self, body: &str, config: &Config) -> Result<String> {
        match self {
            Markup::CommonMark => {
                let table = match option_table(config, "gomarkdown")? {
                    Some(table) => Some(table),
                    None => option_table(config, "blackfriday")?,
                };

                let options = table.map(|t| MarkdownOptions::from_dict("gomarkdown", t))
                    .unwrap_or(MarkdownOptions::COMMON);

                Markdown::new(options).render(body)
            }
            Markup::Mmark => {
                let options = option_table(config, "mmark")?
                    .map(MmarkOptions::from_dict)
                    .unwrap_or_default();

                let title = config.get("title").and_then(|v| v.as_str());
                mmark::render(body, &options, title)
            }
            Markup::Fountain => {
                let options = option_table(config, "fountain")?
                    .map(FountainOptions::from_dict)
                    .unwrap_or_default();

                fountain::render(body, &options)
            }
        }
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Markup::CommonMark => "CommonMark".fmt(f),
            Markup::Mmark => "mmark".fmt(f),
            Markup::Fountain => "Fountain".fmt(f),
        }
    }
}

/// Renders `document`, front matter and all, to HTML with the engine its
/// front matter selects.
pub fn render(document: &str) -> Result<String> {
    let document = normalize_newlines(document);
    let (config, body) = frontmatter::parse(&document)?;
    match Markup::select(&config)? {
        Some(markup) => markup.render_body(body, &config),
        None => Markdown::new(MarkdownOptions::COMMON).render(body),
    }
}

/// Renders `document` with `markup` regardless of what its front matter
/// selects. The front matter still configures the engine.
pub fn render_with(markup: Markup, document: &str) -> Result<String> {
    let document = normalize_newlines(document);
    let (config, body) = frontmatter::parse(&document)?;
    markup.render_body(body, &config).chain_with(|| error! {
        "failed to render document",
        "markup" => markup,
    })
}

#[cfg(test)]
mod markup_tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn default_engine() {
        let html = render("# Title\n\nPara.").unwrap();
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<p>Para.</p>"));

        let html = render("\"Hi\" -- it's me").unwrap();
        assert_eq!(html, "<p>\u{201c}Hi\u{201d} \u{2013} it\u{2019}s me</p>\n");
    }

    #[test]
    fn empty_front_matter_changes_nothing() {
        let body = "# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n\nSee https://example.com.\n";
        let with_fence = format!("---\n\n---\n{body}");
        assert_eq!(render(body).unwrap(), render(&with_fence).unwrap());
    }

    #[test]
    fn crlf_is_normalized() {
        let html = render("---\r\nmarkup: mmark\r\n---\r\nA> aside\r\n").unwrap();
        assert!(html.contains("<aside>"), "{html}");
    }

    #[test]
    fn mmark_is_selected_by_front_matter() {
        let html = render("---\nmarkup: mmark\n---\nBody text [@rfc2119]\n").unwrap();
        assert!(html.contains("<cite>"), "{html}");

        let html = render("Body text [@rfc2119]\n").unwrap();
        assert!(!html.contains("<cite>"), "{html}");
    }

    #[test]
    fn tables_alone() {
        let body = "| a | b |\n|---|---|\n| 1 | 2 |\n\n*em* [link](/x)\n";
        let baseline = Markup::CommonMark
            .render_body(body, &crate::dict! { "gomarkdown" => crate::dict! {} })
            .unwrap();

        let tables = Markup::CommonMark
            .render_body(body, &crate::dict! { "gomarkdown" => crate::dict! { "Tables" => true } })
            .unwrap();

        assert!(!baseline.contains("<table>"));
        assert!(tables.contains("<table>"));
        for html in [&baseline, &tables] {
            assert!(html.contains("<em>em</em> <a href=\"/x\">link</a>"), "{html}");
        }
    }

    #[test]
    fn blackfriday_options_are_a_fallback() {
        let doc = "+++\nmarkup = \"blackfriday\"\n[blackfriday]\nHardLineBreak = true\n+++\none\ntwo\n";
        assert_eq!(render(doc).unwrap(), "<p>one<br />\ntwo</p>\n");
    }

    #[test]
    fn fountain_is_selected_by_front_matter() {
        let html = render("---\nmarkup: fountain\n---\nEXT. BEACH - DAY\n\nWaves.\n").unwrap();
        assert!(html.contains("class=\"scene-heading\""), "{html}");
    }

    #[test]
    fn selection_errors() {
        let error = render("---\nmarkup: asciidoc\n---\nbody").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnsupportedMarkup);

        let error = render("---\nmarkup: [1, 2]\n---\nbody").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnsupportedMarkup);

        let error = render("---\ntitle: [unclosed\n---\nbody").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ConfigParse);

        let error = render("---\nmarkup: fountain\n---\n/* never closed\n").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Render);
    }

    #[test]
    fn render_with_overrides_selection() {
        let html = render_with(Markup::Mmark, "Body\n\nA> aside\n").unwrap();
        assert!(html.contains("<aside>"));
    }
}
