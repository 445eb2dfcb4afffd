//! Splitting a Markdown document into a deck of slides.
//!
//! Slides are separated by a line containing exactly `--`. Front matter at the
//! top of the deck configures the markup engine for every slide.
//!
//! Each slide is rendered with the template variables below, in addition to
//! any resolved data. Slide variables take precedence over data of the same
//! name.
//!
//! | variable   | value                                                 |
//! |------------|-------------------------------------------------------|
//! | `filename` | the deck's file name without its extension            |
//! | `cur_no`   | this slide's zero-based number                        |
//! | `prev_no`  | `cur_no - 1`                                          |
//! | `next_no`  | `cur_no + 1`                                          |
//! | `first_no` | `0`                                                   |
//! | `last_no`  | the number of the deck's last slide                   |
//! | `content`  | the slide's rendered HTML                             |
//! | `heading`  | the text of the slide's first `# ` heading, or `""`   |
//! | `header`, `footer`, `nav` | data of that name, or `""`             |

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;

use crate::error::{Chainable, Result};
use crate::frontmatter;
use crate::markup::{Markdown, MarkdownOptions, Markup};
use crate::resolve::{Data, Resolved};
use crate::templating::Engine;
use crate::util::{escape_html, normalize_newlines, PathExt};
use crate::value::{Sink, Value};

/// The line that separates slides, with its surrounding newlines.
pub const SLIDE_SEPARATOR: &str = "\n--\n";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Slide {
    pub filename: String,
    pub cur_no: i64,
    pub prev_no: i64,
    pub next_no: i64,
    pub first_no: i64,
    pub last_no: i64,
    pub heading: String,
    pub content: Arc<str>,
}

impl Slide {
    /// The name of the file this slide is written to.
    ///
    /// ```rust
    /// let slides = mkpage::slides::split_to_slides("decks/intro.md", "# One").unwrap();
    /// assert_eq!(slides[0].file_name(), "00-intro.html");
    /// ```
    pub fn file_name(&self) -> String {
        format!("{:02}-{}.html", self.cur_no, self.filename)
    }

    /// `data` with this slide's template variables added.
    pub fn data(&self, data: &Data) -> Data {
        let mut data = data.clone();
        for key in ["header", "footer", "nav"] {
            data.entry(key.into()).or_insert_with(|| Resolved::Text("".into()));
        }

        let number = |n: i64| Resolved::Data(Value::from(n));
        data.insert("filename".into(), Resolved::Text(self.filename.as_str().into()));
        data.insert("cur_no".into(), number(self.cur_no));
        data.insert("prev_no".into(), number(self.prev_no));
        data.insert("next_no".into(), number(self.next_no));
        data.insert("first_no".into(), number(self.first_no));
        data.insert("last_no".into(), number(self.last_no));
        data.insert("heading".into(), Resolved::Text(self.heading.as_str().into()));
        data.insert("content".into(), Resolved::Html(self.content.clone()));
        data
    }
}

/// Splits `document` into slides rendered to HTML.
///
/// A document without separators is a single slide. An empty document is a
/// single empty slide.
pub fn split_to_slides(filename: &str, document: &str) -> Result<Vec<Slide>> {
    let document = normalize_newlines(document);
    let (config, body) = frontmatter::parse(&document)?;
    let markup = Markup::select(&config)?;
    let stem = Path::new(filename).stem_str().into_owned();

    let segments = body.split(SLIDE_SEPARATOR).collect::<Vec<_>>();
    let last_no = segments.len() as i64 - 1;
    segments.into_iter()
        .enumerate()
        .map(|(i, segment)| {
            let content = match markup {
                Some(markup) => markup.render_body(segment, &config),
                None => Markdown::new(MarkdownOptions::COMMON).render(segment),
            };

            let content = content.chain_with(|| error! {
                "failed to render slide",
                "file" => filename,
                "slide" => i,
            })?;

            let cur_no = i as i64;
            Ok(Slide {
                filename: stem.clone(),
                cur_no,
                prev_no: cur_no - 1,
                next_no: cur_no + 1,
                first_no: 0,
                last_no,
                heading: first_heading(segment).unwrap_or_default().to_string(),
                content: content.into(),
            })
        })
        .collect()
}

fn first_heading(markdown: &str) -> Option<&str> {
    markdown.lines()
        .find_map(|line| line.trim_start().strip_prefix("# "))
        .map(|heading| heading.trim())
}

/// A table of contents slide linking to every slide in `slides`.
pub fn toc_slide(slides: &[Slide]) -> Slide {
    let mut content = String::from("<ul class=\"toc\">\n");
    for slide in slides {
        let title = match slide.heading.is_empty() {
            true => format!("Slide {}", slide.cur_no),
            false => slide.heading.clone(),
        };

        content.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            escape_html(&slide.file_name()),
            escape_html(&title)
        ));
    }

    content.push_str("</ul>\n");
    let last_no = slides.last().map_or(0, |s| s.last_no);
    Slide {
        filename: slides.first().map(|s| s.filename.clone()).unwrap_or_default(),
        cur_no: 0,
        prev_no: -1,
        next_no: 0,
        first_no: 0,
        last_no,
        heading: "Contents".into(),
        content: content.into(),
    }
}

/// Renders `slide` with the template `name`, or the engine's entry template.
pub fn make_slide_string(engine: &dyn Engine, name: Option<&str>, data: &Data, slide: &Slide) -> Result<String> {
    let name = match name.or_else(|| engine.entry()) {
        Some(name) => name,
        None => return err!(Template: "no template to render the slide with"),
    };

    engine.render(name, &slide.data(data)).chain_with(|| error! {
        "failed to render slide",
        "slide" => slide.cur_no,
    })
}

pub fn make_slide<W: Write>(
    mut writer: W,
    engine: &dyn Engine,
    name: Option<&str>,
    data: &Data,
    slide: &Slide,
) -> Result<()> {
    let html = make_slide_string(engine, name, data, slide)?;
    writer.write_all(html.as_bytes())
        .and_then(|_| writer.flush())
        .chain(error!(Io: "failed to write slide"))
}

/// Renders `slide` into `dir`, named by [`Slide::file_name()`]. Returns the
/// path written.
pub fn make_slide_file(
    dir: &Path,
    engine: &dyn Engine,
    name: Option<&str>,
    data: &Data,
    slide: &Slide,
) -> Result<PathBuf> {
    write_file(dir.join(slide.file_name()), engine, name, data, slide)
}

/// Renders a [`toc_slide()`] for `slides` into `dir` as
/// `toc-{filename}.html`. Returns the path written.
pub fn make_toc_file(
    dir: &Path,
    engine: &dyn Engine,
    name: Option<&str>,
    data: &Data,
    slides: &[Slide],
) -> Result<PathBuf> {
    let toc = toc_slide(slides);
    write_file(dir.join(format!("toc-{}.html", toc.filename)), engine, name, data, &toc)
}

fn write_file(
    path: PathBuf,
    engine: &dyn Engine,
    name: Option<&str>,
    data: &Data,
    slide: &Slide,
) -> Result<PathBuf> {
    let html = make_slide_string(engine, name, data, slide)?;
    path.write(html)?;
    log::info!("wrote {}", path.display());
    Ok(path)
}
