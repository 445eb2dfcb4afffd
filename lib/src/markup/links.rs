use std::collections::VecDeque;

use once_cell::sync::Lazy;
use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

use crate::markup::{Plugin, Events};
use crate::util::escape_html;

static URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(?:https?|ftp)://[^\s<>]+").expect("valid URL regex")
});

static HTML_ANCHOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<(/?)a(?:\s[^>]*)?>").expect("valid anchor regex")
});

/// Turns bare URLs in text into links.
pub struct Autolink;

struct AutolinkIterator<'a> {
    inner: Events<'a>,
    peeked: Option<Event<'a>>,
    pending: VecDeque<Event<'a>>,
    link_depth: usize,
    code_depth: usize,
    /// Open `<a>` elements written as raw HTML.
    html_depth: usize,
}

impl<'a> AutolinkIterator<'a> {
    fn track_html(&mut self, html: &str) {
        for caps in HTML_ANCHOR.captures_iter(html) {
            match caps[1].is_empty() {
                true => self.html_depth += 1,
                false => self.html_depth = self.html_depth.saturating_sub(1),
            }
        }
    }

    fn pull(&mut self) -> Option<Event<'a>> {
        self.peeked.take().or_else(|| self.inner.next())
    }

    /// Joins `first` with every directly following text event.
    fn merge_text(&mut self, first: CowStr<'a>) -> CowStr<'a> {
        let mut merged: Option<String> = None;
        loop {
            match self.pull() {
                Some(Event::Text(more)) => {
                    merged.get_or_insert_with(|| first.to_string()).push_str(&more);
                }
                other => {
                    self.peeked = other;
                    break;
                }
            }
        }

        merged.map_or(first, CowStr::from)
    }

    fn linkify(&mut self, text: CowStr<'a>) -> Event<'a> {
        let mut last = 0;
        for m in URL.find_iter(&text) {
            let url = trim_url(m.as_str());
            if url.is_empty() {
                continue;
            }

            if m.start() > last {
                self.pending.push_back(Event::Text(text[last..m.start()].to_string().into()));
            }

            self.pending.push_back(Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url: url.to_string().into(),
                title: "".into(),
                id: "".into(),
            }));

            self.pending.push_back(Event::Text(url.to_string().into()));
            self.pending.push_back(Event::End(TagEnd::Link));
            last = m.start() + url.len();
        }

        if last == 0 {
            return Event::Text(text);
        }

        if last < text.len() {
            self.pending.push_back(Event::Text(text[last..].to_string().into()));
        }

        match self.pending.pop_front() {
            Some(event) => event,
            None => Event::Text("".into()),
        }
    }
}

/// Strips trailing punctuation that is more likely prose than URL.
fn trim_url(url: &str) -> &str {
    let mut url = url.trim_end_matches(['.', ',', ':', ';', '!', '?', '\'', '"']);
    while url.ends_with(')') && url.matches(')').count() > url.matches('(').count() {
        url = &url[..url.len() - 1];
    }

    url
}

impl<'a> Iterator for AutolinkIterator<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.pending.pop_front() {
            return Some(event);
        }

        let event = self.pull()?;
        match event {
            Event::Start(Tag::Link { .. }) => self.link_depth += 1,
            Event::End(TagEnd::Link) => self.link_depth = self.link_depth.saturating_sub(1),
            Event::Start(Tag::CodeBlock(_)) => self.code_depth += 1,
            Event::End(TagEnd::CodeBlock) => self.code_depth = self.code_depth.saturating_sub(1),
            Event::Html(ref html) | Event::InlineHtml(ref html) => self.track_html(html),
            Event::Text(text) if self.link_depth + self.code_depth + self.html_depth == 0 => {
                let text = self.merge_text(text);
                return Some(self.linkify(text));
            }
            _ => {}
        }

        Some(event)
    }
}

impl Plugin for Autolink {
    fn remap<'a>(&'a mut self, events: Events<'a>) -> Events<'a> {
        Box::new(AutolinkIterator {
            inner: events,
            peeked: None,
            pending: VecDeque::new(),
            link_depth: 0,
            code_depth: 0,
            html_depth: 0,
        })
    }
}

/// Renders every soft line break as a hard one.
pub struct HardBreak;

impl Plugin for HardBreak {
    fn remap<'a>(&'a mut self, events: Events<'a>) -> Events<'a> {
        Box::new(events.map(|event| match event {
            Event::SoftBreak => Event::HardBreak,
            event => event,
        }))
    }
}

/// Opens links to absolute URLs in a new browsing context.
#[derive(Default)]
pub struct TargetBlank {
    open: Vec<bool>,
}

impl Plugin for TargetBlank {
    fn remap<'a>(&'a mut self, events: Events<'a>) -> Events<'a> {
        let open = &mut self.open;
        Box::new(events.map(move |event| match event {
            Event::Start(Tag::Link { ref dest_url, ref title, .. }) if is_absolute(dest_url) => {
                open.push(true);
                let title = match title.is_empty() {
                    true => String::new(),
                    false => format!(" title=\"{}\"", escape_html(title)),
                };

                let html = format!("<a href=\"{}\"{title} target=\"_blank\">", escape_html(dest_url));
                Event::Html(html.into())
            }
            Event::Start(Tag::Link { .. }) => {
                open.push(false);
                event
            }
            Event::End(TagEnd::Link) => match open.pop() {
                Some(true) => Event::Html("</a>".into()),
                _ => event,
            },
            event => event,
        }))
    }
}

fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://") || url.starts_with("//")
}

#[cfg(test)]
mod links_tests {
    use crate::markup::{Markdown, MarkdownOptions};

    fn render(options: MarkdownOptions, input: &str) -> String {
        Markdown::new(options).render(input).unwrap()
    }

    const AUTOLINK: MarkdownOptions = MarkdownOptions { autolink: true, ..MarkdownOptions::NONE };

    #[test]
    fn links_bare_urls() {
        assert_eq!(
            render(AUTOLINK, "See https://example.com/a_b for more."),
            "<p>See <a href=\"https://example.com/a_b\">https://example.com/a_b</a> for more.</p>\n"
        );
    }

    #[test]
    fn leaves_existing_links_and_code_alone() {
        let html = render(AUTOLINK, "[https://a.example](https://b.example) `https://c.example`");
        assert_eq!(html.matches("<a ").count(), 1);
        assert!(html.contains("<code>https://c.example</code>"));

        let html = render(AUTOLINK, "```\nhttps://d.example\n```");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn leaves_raw_html_anchors_alone() {
        let html = render(AUTOLINK, "<a href=\"https://x.example\">https://x.example</a>\n");
        assert_eq!(html, "<p><a href=\"https://x.example\">https://x.example</a></p>\n");

        let html = render(AUTOLINK, "<A HREF=\"/x\">go</A> then https://y.example");
        assert_eq!(html.matches("<a href=\"https://y.example\">").count(), 1);

        let html = render(AUTOLINK, "<abbr>https://z.example</abbr>");
        assert!(html.contains("<a href=\"https://z.example\">"));
    }

    #[test]
    fn trims_trailing_punctuation() {
        let html = render(AUTOLINK, "(visit https://example.com/x).");
        assert!(html.contains("href=\"https://example.com/x\""));
        assert!(html.contains("</a>)."));
    }

    #[test]
    fn hard_breaks() {
        let options = MarkdownOptions { hard_line_break: true, ..MarkdownOptions::NONE };
        assert_eq!(render(options, "a\nb"), "<p>a<br />\nb</p>\n");
        assert_eq!(render(MarkdownOptions::NONE, "a\nb"), "<p>a\nb</p>\n");
    }

    #[test]
    fn target_blank_only_for_absolute_links() {
        let options = MarkdownOptions { href_target_blank: true, ..MarkdownOptions::NONE };
        let html = render(options, "[out](https://example.com \"Ex\") and [in](/local)");
        assert!(html.contains(r#"<a href="https://example.com" title="Ex" target="_blank">out</a>"#));
        assert!(html.contains(r#"<a href="/local">in</a>"#));
    }
}
