use pulldown_cmark::Options;

use crate::error::Result;
use crate::value::{Dict, Value};

/// Switches for the CommonMark engine.
///
/// Front matter names these with their historical extension names (`Tables`,
/// `Footnotes`, `AutoHeadingIDs`, ...). See [`MarkdownOptions::apply()`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub footnotes: bool,
    pub strikethrough: bool,
    pub autolink: bool,
    /// `{#id .class}` attributes on headings.
    pub heading_ids: bool,
    /// Generated slug ids for headings without an explicit id.
    pub auto_heading_ids: bool,
    pub hard_line_break: bool,
    pub smartypants: bool,
    pub task_lists: bool,
    /// `target="_blank"` on links to absolute URLs.
    pub href_target_blank: bool,
}

impl MarkdownOptions {
    /// Every switch off.
    pub const NONE: MarkdownOptions = MarkdownOptions {
        tables: false,
        footnotes: false,
        strikethrough: false,
        autolink: false,
        heading_ids: false,
        auto_heading_ids: false,
        hard_line_break: false,
        smartypants: false,
        task_lists: false,
        href_target_blank: false,
    };

    /// The "common" bundle used when a document doesn't configure its engine.
    pub const COMMON: MarkdownOptions = MarkdownOptions {
        tables: true,
        strikethrough: true,
        autolink: true,
        heading_ids: true,
        smartypants: true,
        ..MarkdownOptions::NONE
    };

    /// Builds options from a front matter option table, starting from
    /// [`MarkdownOptions::NONE`].
    pub fn from_dict(engine: &str, dict: &Dict) -> Self {
        let mut options = MarkdownOptions::NONE;
        for (name, value) in dict {
            if !options.apply(name, value.is_truthy()) {
                warn_unknown(engine, name);
            }
        }

        options
    }

    /// Turns on the switch called `name` if `enabled`. Switches are only ever
    /// turned on. Returns `false` if `name` isn't a known option name.
    pub fn apply(&mut self, name: &str, enabled: bool) -> bool {
        match name {
            "Tables" => self.tables |= enabled,
            "Footnotes" => self.footnotes |= enabled,
            "Strikethrough" => self.strikethrough |= enabled,
            "Autolink" => self.autolink |= enabled,
            "HeadingIDs" => self.heading_ids |= enabled,
            "AutoHeadingIDs" => self.auto_heading_ids |= enabled,
            "HardLineBreak" => self.hard_line_break |= enabled,
            "Smartypants" | "SmartypantsFractions" | "SmartypantsDashes"
                | "SmartypantsLatexDashes" => self.smartypants |= enabled,
            "TaskLists" => self.task_lists |= enabled,
            "HrefTargetBlank" => self.href_target_blank |= enabled,
            "CommonExtensions" => if enabled {
                *self = self.union(MarkdownOptions::COMMON);
            },
            // CommonMark always behaves this way.
            "FencedCode" | "NoIntraEmphasis" | "SpaceHeadings" | "BackslashLineBreak"
                | "LaxHTMLBlocks" => {},
            _ => return false,
        }

        true
    }

    pub fn union(self, other: MarkdownOptions) -> Self {
        MarkdownOptions {
            tables: self.tables | other.tables,
            footnotes: self.footnotes | other.footnotes,
            strikethrough: self.strikethrough | other.strikethrough,
            autolink: self.autolink | other.autolink,
            heading_ids: self.heading_ids | other.heading_ids,
            auto_heading_ids: self.auto_heading_ids | other.auto_heading_ids,
            hard_line_break: self.hard_line_break | other.hard_line_break,
            smartypants: self.smartypants | other.smartypants,
            task_lists: self.task_lists | other.task_lists,
            href_target_blank: self.href_target_blank | other.href_target_blank,
        }
    }

    /// The parser-level subset of these options.
    pub fn parser_options(&self) -> Options {
        let mut options = Options::empty();
        options.set(Options::ENABLE_TABLES, self.tables);
        options.set(Options::ENABLE_FOOTNOTES, self.footnotes);
        options.set(Options::ENABLE_STRIKETHROUGH, self.strikethrough);
        options.set(Options::ENABLE_HEADING_ATTRIBUTES, self.heading_ids);
        options.set(Options::ENABLE_SMART_PUNCTUATION, self.smartypants);
        options.set(Options::ENABLE_TASKLISTS, self.task_lists);
        options
    }
}

/// Switches for the mmark engine: CommonMark switches plus dialect features.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MmarkOptions {
    pub markdown: MarkdownOptions,
    pub asides: bool,
    pub citations: bool,
    pub index: bool,
    pub divisions: bool,
    /// Emit a complete HTML document instead of a fragment.
    pub complete_page: bool,
}

impl MmarkOptions {
    pub const NONE: MmarkOptions = MmarkOptions {
        markdown: MarkdownOptions::NONE,
        asides: false,
        citations: false,
        index: false,
        divisions: false,
        complete_page: false,
    };

    pub fn from_dict(dict: &Dict) -> Self {
        let mut options = MmarkOptions::NONE;
        for (name, value) in dict {
            let enabled = value.is_truthy();
            match &**name {
                "Asides" => options.asides |= enabled,
                "Citations" => options.citations |= enabled,
                "Index" => options.index |= enabled,
                "Divisions" => options.divisions |= enabled,
                "CompletePage" => options.complete_page |= enabled,
                "Mmark" => if enabled {
                    options = options.union_defaults();
                },
                name => if !options.markdown.apply(name, enabled) {
                    warn_unknown("mmark", name);
                },
            }
        }

        options
    }

    fn union_defaults(self) -> Self {
        let defaults = MmarkOptions::default();
        MmarkOptions {
            markdown: self.markdown.union(defaults.markdown),
            asides: true,
            citations: true,
            index: true,
            divisions: true,
            complete_page: self.complete_page,
        }
    }
}

impl Default for MmarkOptions {
    /// The common bundle plus footnotes and heading ids, with every dialect
    /// feature on and fragment output.
    fn default() -> Self {
        MmarkOptions {
            markdown: MarkdownOptions {
                footnotes: true,
                auto_heading_ids: true,
                ..MarkdownOptions::COMMON
            },
            asides: true,
            citations: true,
            index: true,
            divisions: true,
            complete_page: false,
        }
    }
}

/// Options for the Fountain screenplay engine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FountainOptions {
    /// Emit a complete HTML document instead of a fragment.
    pub as_html_page: bool,
    /// Embed a stylesheet in a `<style>` element.
    pub inline_css: bool,
    /// Reference a stylesheet with a `<link>` element.
    pub link_css: bool,
    /// The stylesheet to link or inline. Empty means the built-in one.
    pub include_css: String,
}

impl FountainOptions {
    pub fn from_dict(dict: &Dict) -> Self {
        let mut options = FountainOptions::default();
        for (name, value) in dict {
            match &**name {
                "AsHTMLPage" => options.as_html_page |= value.is_truthy(),
                "InlineCSS" => options.inline_css |= value.is_truthy(),
                "LinkCSS" => options.link_css |= value.is_truthy(),
                "IncludeCSS" => match value.as_str() {
                    Some(css) => options.include_css = css.to_string(),
                    None => log::warn!("fountain: `IncludeCSS` should be a string, not {}", value.kind()),
                },
                name => warn_unknown("fountain", name),
            }
        }

        options
    }
}

/// Returns the option table stored under `key` in `config`, if any.
///
/// A value that isn't a table is a configuration error.
pub fn option_table<'c>(config: &'c Dict, key: &str) -> Result<Option<&'c Dict>> {
    match config.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Dict(dict)) => Ok(Some(&**dict)),
        Some(value) => err! {
            ConfigParse: "engine options must be a table",
            "key" => key,
            "found" => value.kind(),
        }
    }
}

fn warn_unknown(engine: &str, name: &str) {
    log::warn!("{engine}: ignoring unknown option `{name}`");
}

#[cfg(test)]
mod options_tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn flags_accept_bools_ones_and_true_strings() {
        let dict = crate::dict! {
            "Tables" => true,
            "Footnotes" => 1u8,
            "Strikethrough" => "True",
            "Autolink" => "yes",
            "HardLineBreak" => 0u8,
            "Smartypants" => false,
        };

        let options = MarkdownOptions::from_dict("gomarkdown", &dict);
        assert_eq!(options, MarkdownOptions {
            tables: true,
            footnotes: true,
            strikethrough: true,
            ..MarkdownOptions::NONE
        });
    }

    #[test]
    fn flags_only_ever_turn_on() {
        let mut options = MarkdownOptions::COMMON;
        assert!(options.apply("Tables", false));
        assert!(options.tables);
    }

    #[test]
    fn unknown_names_are_ignored() {
        let dict = crate::dict! { "NoSuchThing" => true, "FencedCode" => true };
        assert_eq!(MarkdownOptions::from_dict("gomarkdown", &dict), MarkdownOptions::NONE);

        let mut options = MarkdownOptions::NONE;
        assert!(!options.apply("NoSuchThing", true));
        assert!(options.apply("FencedCode", true));
    }

    #[test]
    fn common_extensions_bundle() {
        let dict = crate::dict! { "CommonExtensions" => true, "Footnotes" => true };
        let options = MarkdownOptions::from_dict("gomarkdown", &dict);
        assert_eq!(options, MarkdownOptions { footnotes: true, ..MarkdownOptions::COMMON });
    }

    #[test]
    fn mmark_tables() {
        let options = MmarkOptions::from_dict(&crate::dict! {
            "Asides" => true,
            "Tables" => true,
            "CompletePage" => "true",
        });

        assert!(options.asides && options.markdown.tables && options.complete_page);
        assert!(!options.citations && !options.index && !options.divisions);

        let options = MmarkOptions::from_dict(&crate::dict! { "Mmark" => true });
        assert_eq!(options, MmarkOptions::default());
    }

    #[test]
    fn fountain_options() {
        let options = FountainOptions::from_dict(&crate::dict! {
            "AsHTMLPage" => true,
            "LinkCSS" => 1u8,
            "IncludeCSS" => "css/screenplay.css",
        });

        assert_eq!(options, FountainOptions {
            as_html_page: true,
            inline_css: false,
            link_css: true,
            include_css: "css/screenplay.css".into(),
        });
    }

    #[test]
    fn option_tables_must_be_tables() {
        let config = crate::dict! {
            "gomarkdown" => crate::dict! { "Tables" => true },
            "mmark" => "Tables",
        };

        assert!(option_table(&config, "gomarkdown").unwrap().is_some());
        assert!(option_table(&config, "fountain").unwrap().is_none());

        let error = option_table(&config, "mmark").unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ConfigParse);
    }
}
