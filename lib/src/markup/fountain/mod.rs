//! The Fountain screenplay format.
//!
//! See <https://fountain.io/syntax> for the syntax. Rendering produces either
//! a `<section class="fountain">` fragment or, with
//! [`FountainOptions::as_html_page`], a complete HTML document.

mod parse;
mod html;

pub use parse::{parse, Element, Dialogue, Line};

use std::fs;

use crate::error::{Chainable, Result};
use crate::markup::FountainOptions;
use crate::util::escape_html;

/// The built-in stylesheet.
pub const DEFAULT_CSS: &str = include_str!("fountain.css");

/// Renders the screenplay `body` as HTML.
pub fn render(body: &str, options: &FountainOptions) -> Result<String> {
    let elements = parse(body)?;
    let fragment = html::render(&elements);
    let css = stylesheet(options)?;
    if !options.as_html_page {
        return Ok(css + &fragment);
    }

    let title = title(&elements).unwrap_or_else(|| "Screenplay".into());
    Ok(format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n{css}</head>\n<body>\n{fragment}</body>\n</html>\n",
        escape_html(&title)
    ))
}

/// The plain text of the title page's `Title` field, if there is one.
fn title(elements: &[Element]) -> Option<String> {
    let Some(Element::TitlePage(fields)) = elements.first() else {
        return None;
    };

    fields.iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("title"))
        .map(|(_, value)| value.replace(['*', '_'], "").replace('\n', " "))
}

fn stylesheet(options: &FountainOptions) -> Result<String> {
    let mut html = String::new();
    if options.link_css {
        let href = match options.include_css.is_empty() {
            true => "fountain.css",
            false => options.include_css.as_str(),
        };

        html.push_str(&format!("<link rel=\"stylesheet\" href=\"{}\">\n", escape_html(href)));
    }

    if options.inline_css {
        let css = match options.include_css.is_empty() {
            true => DEFAULT_CSS.to_string(),
            false => fs::read_to_string(&options.include_css).chain_with(|| error! {
                Render: "failed to read screenplay stylesheet",
                "file path" => &options.include_css,
            })?,
        };

        html.push_str(&format!("<style>\n{css}</style>\n"));
    }

    Ok(html)
}

#[cfg(test)]
mod fountain_tests {
    use super::*;
    use crate::error::ErrorKind;

    const SCRIPT: &str = "Title: The *Last* Stand\n\nINT. DINER - NIGHT\n\nA waitress pours coffee.\n";

    #[test]
    fn fragment_by_default() {
        let html = render(SCRIPT, &FountainOptions::default()).unwrap();
        assert!(html.starts_with("<section class=\"fountain\">\n"));
        assert!(html.contains("<p class=\"action\">A waitress pours coffee.</p>"));
        assert!(!html.contains("<html>"));
    }

    #[test]
    fn complete_page_with_inline_css() {
        let options = FountainOptions { as_html_page: true, inline_css: true, ..Default::default() };
        let html = render(SCRIPT, &options).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>The Last Stand</title>"));
        assert!(html.contains("<style>\nsection.fountain {"));
        assert!(html.ends_with("</section>\n</body>\n</html>\n"));
    }

    #[test]
    fn linked_css() {
        let options = FountainOptions {
            link_css: true,
            include_css: "css/screenplay.css".into(),
            ..Default::default()
        };

        let html = render(SCRIPT, &options).unwrap();
        assert!(html.starts_with("<link rel=\"stylesheet\" href=\"css/screenplay.css\">\n<section"));
    }

    #[test]
    fn included_css_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.css");
        fs::write(&path, "p { color: red; }\n").unwrap();

        let options = FountainOptions {
            inline_css: true,
            include_css: path.display().to_string(),
            ..Default::default()
        };

        let html = render(SCRIPT, &options).unwrap();
        assert!(html.starts_with("<style>\np { color: red; }\n</style>\n"));

        let options = FountainOptions { include_css: "/missing.css".into(), ..options };
        assert_eq!(render(SCRIPT, &options).unwrap_err().kind(), ErrorKind::Render);
    }
}
