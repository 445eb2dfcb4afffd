use std::fmt::Write;

use once_cell::sync::Lazy;
use regex::Regex;
use rustc_hash::FxHashMap;

use super::parse::{Dialogue, Element, Line};
use crate::util::{escape_html, slugify};

/// Inline patterns, applied in order, and their replacements.
static EMPHASIS: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"(?s)\[\[(.*?)\]\]", r#"<span class="note">${1}</span>"#),
        (r"\*\*\*(\S(?:.*?\S)?)\*\*\*", "<strong><em>${1}</em></strong>"),
        (r"\*\*(\S(?:.*?\S)?)\*\*", "<strong>${1}</strong>"),
        (r"\*(\S(?:.*?\S)?)\*", "<em>${1}</em>"),
        (r"_(\S(?:.*?\S)?)_", "<u>${1}</u>"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| (Regex::new(pattern).expect("valid emphasis regex"), replacement))
    .collect()
});

/// Renders Fountain inline markup in `text` as HTML.
fn inline(text: &str) -> String {
    // Escaped emphasis characters are hidden from the patterns.
    let text = text.replace("\\*", "\u{E000}").replace("\\_", "\u{E001}");
    let mut html = escape_html(&text).into_owned();
    for (regex, replacement) in EMPHASIS.iter() {
        html = regex.replace_all(&html, *replacement).into_owned();
    }

    html.replace('\u{E000}', "*")
        .replace('\u{E001}', "_")
        .replace('\n', "<br>\n")
}

/// Renders parsed elements as an HTML fragment.
pub fn render(elements: &[Element]) -> String {
    let mut html = String::from("<section class=\"fountain\">\n");
    let mut ids: FxHashMap<String, usize> = FxHashMap::default();

    let mut i = 0;
    while i < elements.len() {
        match (&elements[i], elements.get(i + 1)) {
            (Element::Dialogue(left), Some(Element::Dialogue(right))) if right.dual => {
                html.push_str("<div class=\"dual-dialogue\">\n");
                dialogue(&mut html, left);
                dialogue(&mut html, right);
                html.push_str("</div>\n");
                i += 2;
                continue;
            }
            (element, _) => self::element(&mut html, element, &mut ids),
        }

        i += 1;
    }

    html.push_str("</section>\n");
    html
}

fn element(html: &mut String, element: &Element, ids: &mut FxHashMap<String, usize>) {
    let _ = match element {
        Element::TitlePage(fields) => {
            html.push_str("<div class=\"title-page\">\n");
            for (key, value) in fields {
                let _ = writeln!(html, "<p class=\"{}\">{}</p>", slugify(key), inline(value));
            }

            writeln!(html, "</div>")
        }
        Element::SceneHeading { text, number } => {
            let mut id = slugify(text);
            match ids.get_mut(&id) {
                Some(n) => {
                    let _ = write!(id, "-{n}");
                    *n += 1;
                }
                None => {
                    ids.insert(id.clone(), 1);
                }
            }

            let number = match number {
                Some(n) => format!(" data-scene-number=\"{}\"", escape_html(n)),
                None => String::new(),
            };

            writeln!(html, "<h3 class=\"scene-heading\" id=\"{id}\"{number}>{}</h3>", inline(text))
        }
        Element::Action(text) => writeln!(html, "<p class=\"action\">{}</p>", inline(text)),
        Element::Dialogue(d) => {
            dialogue(html, d);
            Ok(())
        }
        Element::Transition(text) => writeln!(html, "<p class=\"transition\">{}</p>", inline(text)),
        Element::Centered(text) => writeln!(html, "<p class=\"centered\">{}</p>", inline(text)),
        Element::PageBreak => writeln!(html, "<hr class=\"page-break\">"),
        Element::Section { depth, text } => {
            writeln!(html, "<div class=\"section\" data-depth=\"{depth}\">{}</div>", inline(text))
        }
        Element::Synopsis(text) => writeln!(html, "<p class=\"synopsis\">{}</p>", inline(text)),
        Element::Lyrics(text) => writeln!(html, "<p class=\"lyrics\">{}</p>", inline(text)),
    };
}

fn dialogue(html: &mut String, dialogue: &Dialogue) {
    html.push_str("<div class=\"dialogue\">\n");
    let _ = write!(html, "<p class=\"character\">{}", inline(&dialogue.character));
    if let Some(extension) = &dialogue.extension {
        let _ = write!(html, " <span class=\"extension\">({})</span>", escape_html(extension));
    }

    html.push_str("</p>\n");
    for line in &dialogue.lines {
        let _ = match line {
            Line::Parenthetical(text) => writeln!(html, "<p class=\"parenthetical\">{}</p>", inline(text)),
            Line::Speech(text) => writeln!(html, "<p class=\"speech\">{}</p>", inline(text)),
            Line::Lyric(text) => writeln!(html, "<p class=\"lyrics\">{}</p>", inline(text)),
        };
    }

    html.push_str("</div>\n");
}

#[cfg(test)]
mod html_tests {
    use super::*;
    use crate::markup::fountain::parse::parse;

    fn render_str(input: &str) -> String {
        render(&parse(input).unwrap())
    }

    #[test]
    fn emphasis() {
        assert_eq!(inline("*italic* **bold** ***both*** _under_"),
            "<em>italic</em> <strong>bold</strong> <strong><em>both</em></strong> <u>under</u>");
        assert_eq!(inline(r"\*not italic\* & <tags>"), "*not italic* &amp; &lt;tags&gt;");
        assert_eq!(inline("He waits. [[Maybe cut.]]"), "He waits. <span class=\"note\">Maybe cut.</span>");
        assert_eq!(inline("one\ntwo"), "one<br>\ntwo");
    }

    #[test]
    fn scene_headings_get_unique_ids() {
        let html = render_str("INT. HOUSE - DAY\n\nINT. HOUSE - DAY #2#\n");
        assert!(html.contains("<h3 class=\"scene-heading\" id=\"int-house-day\">INT. HOUSE - DAY</h3>"));
        assert!(html.contains(
            "<h3 class=\"scene-heading\" id=\"int-house-day-1\" data-scene-number=\"2\">INT. HOUSE - DAY</h3>"
        ));
    }

    #[test]
    fn dialogue_and_dual_dialogue() {
        let html = render_str("BRICK\nScrew retirement.\n\nSTEEL ^\n(hand up)\nScrew it!\n");
        assert_eq!(html, concat!(
            "<section class=\"fountain\">\n",
            "<div class=\"dual-dialogue\">\n",
            "<div class=\"dialogue\">\n",
            "<p class=\"character\">BRICK</p>\n",
            "<p class=\"speech\">Screw retirement.</p>\n",
            "</div>\n",
            "<div class=\"dialogue\">\n",
            "<p class=\"character\">STEEL</p>\n",
            "<p class=\"parenthetical\">(hand up)</p>\n",
            "<p class=\"speech\">Screw it!</p>\n",
            "</div>\n",
            "</div>\n",
            "</section>\n",
        ));
    }

    #[test]
    fn title_page_and_transitions() {
        let html = render_str("Title: **Brick & Steel**\nDraft date: 6/23/2012\n\nCUT TO:\n\n===\n");
        assert!(html.contains("<div class=\"title-page\">\n<p class=\"title\"><strong>Brick &amp; Steel</strong></p>\n<p class=\"draft-date\">6/23/2012</p>\n</div>\n"));
        assert!(html.contains("<p class=\"transition\">CUT TO:</p>\n<hr class=\"page-break\">\n"));
    }
}
