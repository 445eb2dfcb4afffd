//! Pulling pieces out of documents without rendering them.

use once_cell::sync::Lazy;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use regex::Regex;

use crate::error::{Chainable, Result};
use crate::frontmatter;
use crate::util::normalize_newlines;

/// A `YYYY-MM-DD` date.
pub const DATE_EXP: &str = r"[0-9]{4}-[0-1][0-9]-[0-3][0-9]";

/// A byline: `By` or `by`, a name, and a date at the end of the line.
pub static BYLINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^[Bb]y\s+.+{DATE_EXP}$")).expect("valid byline regex")
});

/// A level one ATX heading.
pub static TITLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^#\s+.+$").expect("valid title regex")
});

pub static DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(DATE_EXP).expect("valid date regex")
});

/// The first match of `regex` in any single line of `input`.
///
/// ```rust
/// use mkpage::extract::{grep, BYLINE, TITLE};
///
/// let doc = "# Hello World\n\nBy J. Doe, 2024-03-05\n\nText.\n";
/// assert_eq!(grep(&TITLE, doc), Some("# Hello World"));
/// assert_eq!(grep(&BYLINE, doc), Some("By J. Doe, 2024-03-05"));
/// assert_eq!(grep(&BYLINE, "# No byline"), None);
/// ```
pub fn grep<'a>(regex: &Regex, input: &'a str) -> Option<&'a str> {
    input.lines().find_map(|line| regex.find(line).map(|m| m.as_str()))
}

pub fn byline(input: &str) -> Option<&str> {
    grep(&BYLINE, input)
}

pub fn title(input: &str) -> Option<&str> {
    grep(&TITLE, input)
}

pub fn date(input: &str) -> Option<&str> {
    grep(&DATE, input)
}

/// The code of every fenced block in `markdown` whose info string starts with
/// `language`, concatenated. One level of indentation, four spaces or a tab,
/// is removed from each line.
pub fn codesnip(markdown: &str, language: &str) -> String {
    let markdown = normalize_newlines(markdown);
    let mut output = String::new();
    let mut in_block = false;
    for event in Parser::new(&markdown) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                in_block = info.split_whitespace().next() == Some(language);
            }
            Event::End(TagEnd::CodeBlock) => in_block = false,
            Event::Text(text) if in_block => {
                for line in text.split_inclusive('\n') {
                    let line = line.strip_prefix("    ")
                        .or_else(|| line.strip_prefix('\t'))
                        .unwrap_or(line);

                    output.push_str(line);
                }
            }
            _ => {}
        }
    }

    output
}

/// The front matter of `document`: its raw text or, if `json`, its resolved
/// configuration as JSON. Documents without front matter yield `""` or `{}`.
pub fn front_matter(document: &str, json: bool) -> Result<String> {
    let document = normalize_newlines(document);
    let split = frontmatter::split(&document);
    if !json {
        return Ok(split.front_matter.into_owned());
    }

    let config = split.config()?;
    serde_json::to_string_pretty(&config).chain(error!("failed to serialize front matter"))
}

#[cfg(test)]
mod extract_tests {
    use super::*;

    const DOC: &str = "\
---
title: Snippets
---
# Working with code

by Jane Doe 2023-11-02

```shell
    echo one
\techo two
echo three
```

```python
print('no')
```

```shell script
ls
```
";

    #[test]
    fn snips_matching_blocks() {
        assert_eq!(codesnip(DOC, "shell"), "echo one\necho two\necho three\nls\n");
        assert_eq!(codesnip(DOC, "python"), "print('no')\n");
        assert_eq!(codesnip(DOC, "rust"), "");
        assert_eq!(codesnip(DOC, "shel"), "");
    }

    #[test]
    fn bylines_titles_dates() {
        assert_eq!(title(DOC), Some("# Working with code"));
        assert_eq!(byline(DOC), Some("by Jane Doe 2023-11-02"));
        assert_eq!(date(DOC), Some("2023-11-02"));
        assert_eq!(byline("by nobody, undated"), None);
        assert_eq!(title("#hashtag"), None);
    }

    #[test]
    fn extracts_front_matter() {
        assert_eq!(front_matter(DOC, false).unwrap(), "title: Snippets");
        assert_eq!(front_matter(DOC, true).unwrap(), "{\n  \"title\": \"Snippets\"\n}");
        assert_eq!(front_matter("# none", false).unwrap(), "");
        assert_eq!(front_matter("# none", true).unwrap(), "{}");
        assert!(front_matter("+++\ntitle = \n+++\n", true).is_err());

        let json = front_matter("+++\ndate = 2024-01-01\n+++\nbody", true).unwrap();
        assert_eq!(json, "{\n  \"date\": \"2024-01-01\"\n}");
    }
}
