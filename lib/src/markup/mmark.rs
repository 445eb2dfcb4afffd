//! The mmark dialect: CommonMark plus asides, document divisions, citations,
//! and an index.
//!
//! Each dialect feature is a preprocessing [`Plugin`] that rewrites its
//! syntax into raw HTML before the CommonMark parser runs. Lines inside fenced
//! code blocks are never rewritten.

use std::borrow::Cow;
use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::error::Result;
use crate::markup::{Markdown, MmarkOptions, Plugin};
use crate::util::{escape_html, slugify};

/// Renders `body` with the mmark dialect.
///
/// With [`MmarkOptions::complete_page`] set, the output is a complete HTML
/// document titled `title`.
pub fn render(body: &str, options: &MmarkOptions, title: Option<&str>) -> Result<String> {
    let html = Markdown::new(options.markdown)
        .plugin_if(options.divisions, Divisions)
        .plugin_if(options.asides, Asides)
        .plugin_if(options.citations, Citations)
        .plugin_if(options.index, Index)
        .render(body)?;

    if !options.complete_page {
        return Ok(html);
    }

    let mut page = String::with_capacity(html.len() + 256);
    page.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    if let Some(title) = title {
        page.push_str(&format!("<title>{}</title>\n", escape_html(title)));
    }

    page.push_str("</head>\n<body>\n");
    if let Some(title) = title {
        page.push_str(&format!("<h1 class=\"title\">{}</h1>\n", escape_html(title)));
    }

    page.push_str(&html);
    page.push_str("</body>\n</html>\n");
    Ok(page)
}

/// Lines of a document, each flagged with whether it is inside (or is the
/// fence of) a fenced code block.
struct Lines<'a> {
    inner: std::str::SplitInclusive<'a, char>,
    fence: Option<&'static str>,
}

fn lines(input: &str) -> Lines<'_> {
    Lines { inner: input.split_inclusive('\n'), fence: None }
}

impl<'a> Iterator for Lines<'a> {
    type Item = (&'a str, bool);

    fn next(&mut self) -> Option<Self::Item> {
        let line = self.inner.next()?;
        let trimmed = line.trim_start();
        let marker = ["```", "~~~"].into_iter().find(|m| trimmed.starts_with(m));
        match (self.fence, marker) {
            (None, Some(marker)) => self.fence = Some(marker),
            (Some(open), Some(marker)) if open == marker => self.fence = None,
            (Some(_), _) => {}
            (None, None) => return Some((line, false)),
        }

        Some((line, true))
    }
}

fn ensure_newline(output: &mut String) {
    if !output.is_empty() && !output.ends_with('\n') {
        output.push('\n');
    }
}

/// `A> ` lines become an `<aside>`.
pub struct Asides;

impl Plugin for Asides {
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        if memchr::memmem::find(input.as_bytes(), b"A>").is_none() {
            return Ok(Cow::Borrowed(input));
        }

        let mut output = String::with_capacity(input.len() + 64);
        let mut in_aside = false;
        for (line, code) in lines(input) {
            let content = match code {
                true => None,
                false => line.strip_prefix("A> ")
                    .or_else(|| (line.trim_end() == "A>").then_some("\n")),
            };

            match (content, in_aside) {
                (Some(content), false) => {
                    ensure_newline(&mut output);
                    output.push_str("<aside>\n\n");
                    output.push_str(content);
                    in_aside = true;
                }
                (Some(content), true) => output.push_str(content),
                (None, true) => {
                    ensure_newline(&mut output);
                    output.push_str("\n</aside>\n\n");
                    output.push_str(line);
                    in_aside = false;
                }
                (None, false) => output.push_str(line),
            }
        }

        if in_aside {
            ensure_newline(&mut output);
            output.push_str("\n</aside>\n");
        }

        Ok(Cow::Owned(output))
    }
}

/// `{frontmatter}`, `{mainmatter}`, and `{backmatter}` lines open a
/// `<section>` for that division of the document.
pub struct Divisions;

impl Plugin for Divisions {
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        if !input.contains("matter}") {
            return Ok(Cow::Borrowed(input));
        }

        let mut output = String::with_capacity(input.len() + 64);
        let mut open = false;
        for (line, code) in lines(input) {
            let division = match line.trim() {
                "{frontmatter}" if !code => "frontmatter",
                "{mainmatter}" if !code => "mainmatter",
                "{backmatter}" if !code => "backmatter",
                _ => {
                    output.push_str(line);
                    continue;
                }
            };

            ensure_newline(&mut output);
            if open {
                output.push_str("\n</section>\n");
            }

            output.push_str(&format!("\n<section class=\"{division}\">\n\n"));
            open = true;
        }

        if open {
            ensure_newline(&mut output);
            output.push_str("\n</section>\n");
        }

        Ok(Cow::Owned(output))
    }
}

static CITATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\[(@[!?]?[^\s;\[\]]+(?:\s*;\s*@[!?]?[^\s;\[\]]+)*)\]").expect("valid citation regex")
});

/// `[@id]` and `[@id1; @id2]` become `<cite>` elements linking to `#id`.
/// `@!id` cites a normative reference, `@id` and `@?id` informative ones.
/// Every cited id is listed in a references section appended to the document.
pub struct Citations;

impl Plugin for Citations {
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        if memchr::memmem::find(input.as_bytes(), b"[@").is_none() {
            return Ok(Cow::Borrowed(input));
        }

        // id => normative
        let mut references: BTreeMap<String, bool> = BTreeMap::new();
        let mut output = String::with_capacity(input.len() + 64);
        for (line, code) in lines(input) {
            if code {
                output.push_str(line);
                continue;
            }

            let cited = replace_outside_code_spans(line, &CITATION, |caps| {
                let links = caps[1].split(';')
                    .map(|id| id.trim().trim_start_matches('@'))
                    .map(|id| {
                        let normative = id.starts_with('!');
                        let id = id.trim_start_matches(['!', '?']);
                        *references.entry(id.to_string()).or_default() |= normative;
                        format!("<a href=\"#{0}\">{0}</a>", escape_html(id))
                    })
                    .collect::<Vec<_>>();

                format!("<cite>{}</cite>", links.join(", "))
            });

            output.push_str(&cited);
        }

        if references.is_empty() {
            return Ok(Cow::Owned(output));
        }

        ensure_newline(&mut output);
        output.push_str("\n<section class=\"references\">\n");
        for (normative, heading) in [(true, "Normative References"), (false, "Informative References")] {
            let mut ids = references.iter().filter(|(_, &n)| n == normative).peekable();
            if ids.peek().is_none() {
                continue;
            }

            output.push_str(&format!("<h2 id=\"{}\">{heading}</h2>\n<ul>\n", slugify(heading)));
            for (id, _) in ids {
                output.push_str(&format!("<li id=\"{0}\">{0}</li>\n", escape_html(id)));
            }

            output.push_str("</ul>\n");
        }

        output.push_str("</section>\n");
        Ok(Cow::Owned(output))
    }
}

static INDEX_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(!(!?)([^()!,][^(),]*)(?:,\s*([^()]+))?\)").expect("valid index regex")
});

/// `(!item)` and `(!item, subitem)` mark index entries; `(!!item)` marks the
/// primary entry for an item. Entries become anchors and an index of them is
/// appended to the document.
pub struct Index;

#[derive(Default)]
struct Entry {
    anchors: Vec<(usize, bool)>,
}

impl Plugin for Index {
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        if memchr::memmem::find(input.as_bytes(), b"(!").is_none() {
            return Ok(Cow::Borrowed(input));
        }

        let mut entries: BTreeMap<(String, Option<String>), Entry> = BTreeMap::new();
        let mut output = String::with_capacity(input.len() + 256);
        for (line, code) in lines(input) {
            if code {
                output.push_str(line);
                continue;
            }

            let marked = replace_outside_code_spans(line, &INDEX_ITEM, |caps| {
                let n = entries.values().map(|e| e.anchors.len()).sum::<usize>();
                let item = caps[2].trim().to_string();
                let sub = caps.get(3).map(|s| s.as_str().trim().to_string());
                entries.entry((item, sub)).or_default().anchors.push((n, !caps[1].is_empty()));
                format!("<span class=\"index-ref\" id=\"index-{n}\"></span>")
            });

            output.push_str(&marked);
        }

        if entries.is_empty() {
            return Ok(Cow::Owned(output));
        }

        ensure_newline(&mut output);
        output.push_str("\n<section class=\"index\">\n<h2 id=\"index\">Index</h2>\n<ul>\n");
        for ((item, sub), entry) in &entries {
            let label = match sub {
                Some(sub) => format!("{item}, {sub}"),
                None => item.clone(),
            };

            let links = entry.anchors.iter()
                .map(|&(n, primary)| match primary {
                    true => format!("<a href=\"#index-{n}\"><strong>{}</strong></a>", n + 1),
                    false => format!("<a href=\"#index-{n}\">{}</a>", n + 1),
                })
                .collect::<Vec<_>>();

            output.push_str(&format!(
                "<li id=\"index-item-{}\">{}: {}</li>\n",
                slugify(&label),
                escape_html(&label),
                links.join(", ")
            ));
        }

        output.push_str("</ul>\n</section>\n");
        Ok(Cow::Owned(output))
    }
}

/// Replaces matches of `regex` in `line` that don't fall inside a backtick
/// code span.
fn replace_outside_code_spans<F>(line: &str, regex: &Regex, mut replace: F) -> String
    where F: FnMut(&Captures<'_>) -> String
{
    let mut output = String::with_capacity(line.len());
    let mut last = 0;
    for caps in regex.captures_iter(line) {
        let Some(m) = caps.get(0) else { continue };
        let ticks = line[..m.start()].matches('`').count();
        let followed_by_link = line[m.end()..].starts_with(['(', '[']);
        if ticks % 2 == 1 || followed_by_link {
            continue;
        }

        output.push_str(&line[last..m.start()]);
        output.push_str(&replace(&caps));
        last = m.end();
    }

    output.push_str(&line[last..]);
    output
}
