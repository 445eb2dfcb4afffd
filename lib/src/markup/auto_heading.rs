use std::collections::VecDeque;
use std::fmt::Write;

use pulldown_cmark::{Event, Tag, TagEnd};
use rustc_hash::FxHashMap;

use crate::markup::{Plugin, Events};

/// Gives every heading without an explicit id a slug of its text. Repeated
/// slugs get a numeric suffix: `intro`, `intro-1`, `intro-2`.
#[derive(Default)]
pub struct AutoHeading {
    seen: FxHashMap<String, usize>,
}

impl AutoHeading {
    fn unique_id(&mut self, text: &str) -> String {
        let mut id = crate::util::slugify(text);
        if id.is_empty() {
            id.push_str("section");
        }

        match self.seen.get_mut(&id) {
            Some(n) => {
                let _ = write!(&mut id, "-{}", n);
                *n += 1;
            }
            None => {
                self.seen.insert(id.clone(), 1);
            }
        }

        id
    }
}

struct HeadingIterator<'a> {
    stack: VecDeque<Event<'a>>,
    plugin: &'a mut AutoHeading,
    inner: Events<'a>,
}

impl<'a> Iterator for HeadingIterator<'a> {
    type Item = Event<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(event) = self.stack.pop_front() {
            return Some(event);
        }

        match self.inner.next()? {
            Event::Start(Tag::Heading { level, id: None, classes, attrs }) => {
                let mut text = String::new();
                for event in self.inner.by_ref() {
                    if let Event::Text(ref s) | Event::Code(ref s) = event {
                        text.push_str(s);
                    } else if let Event::End(TagEnd::Heading(..)) = event {
                        break;
                    }

                    self.stack.push_back(event);
                }

                let id = self.plugin.unique_id(&text);
                let tag = Tag::Heading { level, id: Some(id.into()), classes, attrs };
                self.stack.push_back(Event::End(TagEnd::Heading(level)));
                Some(Event::Start(tag))
            },
            event => Some(event)
        }
    }
}

impl Plugin for AutoHeading {
    fn remap<'a>(&'a mut self, events: Events<'a>) -> Events<'a> {
        Box::new(HeadingIterator {
            plugin: self,
            inner: events,
            stack: VecDeque::with_capacity(4),
        })
    }
}

#[cfg(test)]
mod auto_heading_tests {
    use crate::markup::{Markdown, MarkdownOptions};

    fn render(input: &str) -> String {
        let options = MarkdownOptions { auto_heading_ids: true, heading_ids: true, ..MarkdownOptions::NONE };
        Markdown::new(options).render(input).unwrap()
    }

    #[test]
    fn slugs_headings() {
        assert_eq!(render("# Hello, World!"), "<h1 id=\"hello-world\">Hello, World!</h1>\n");
        assert_eq!(render("## The `code` part"), "<h2 id=\"the-code-part\">The <code>code</code> part</h2>\n");
    }

    #[test]
    fn deduplicates_slugs() {
        let html = render("# Intro\n\n# Intro\n\n# Intro");
        assert!(html.contains(r#"<h1 id="intro">"#));
        assert!(html.contains(r#"<h1 id="intro-1">"#));
        assert!(html.contains(r#"<h1 id="intro-2">"#));
    }

    #[test]
    fn keeps_explicit_ids() {
        assert_eq!(render("# Title {#custom}"), "<h1 id=\"custom\">Title</h1>\n");
    }
}
