use std::borrow::Cow;

use pulldown_cmark::{html, Parser};

use crate::error::Result;
use crate::markup::{Plugin, Events, MarkdownOptions};
use crate::markup::auto_heading::AutoHeading;
use crate::markup::links::{Autolink, HardBreak, TargetBlank};

/// A markdown-to-HTML pipeline: parser options plus an ordered list of
/// plugins.
///
/// Plugins added with [`Markdown::plugin()`] run first, in the order added.
/// The plugins implied by the [`MarkdownOptions`] run after them.
pub struct Markdown<'p> {
    options: MarkdownOptions,
    plugins: Vec<Box<dyn Plugin + 'p>>,
}

impl<'p> Markdown<'p> {
    pub fn new(options: MarkdownOptions) -> Self {
        Markdown { options, plugins: vec![] }
    }

    pub fn plugin<P: Plugin + 'p>(mut self, plugin: P) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn plugin_if<P: Plugin + 'p>(self, enabled: bool, plugin: P) -> Self {
        match enabled {
            true => self.plugin(plugin),
            false => self,
        }
    }

    pub fn render(self, input: &str) -> Result<String> {
        let options = self.options;
        let mut this = self
            .plugin_if(options.auto_heading_ids, AutoHeading::default())
            .plugin_if(options.autolink, Autolink)
            .plugin_if(options.hard_line_break, HardBreak)
            .plugin_if(options.href_target_blank, TargetBlank::default());

        let mut input = Cow::Borrowed(input);
        for plugin in &this.plugins {
            input = match input {
                Cow::Borrowed(input) => plugin.preprocess(input)?,
                Cow::Owned(input) => Cow::Owned(plugin.preprocess(&input)?.into_owned()),
            };
        }

        let mut output = String::with_capacity(input.len() + input.len() / 2);
        let mut events: Events<'_> = Box::new(Parser::new_ext(&input, options.parser_options()));
        for plugin in this.plugins.iter_mut() {
            events = plugin.remap(events);
        }

        html::push_html(&mut output, events);
        Ok(output)
    }
}

#[cfg(test)]
mod markdown_tests {
    use super::*;

    struct Shout;

    impl Plugin for Shout {
        fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
            Ok(Cow::Owned(input.replace("hello", "HELLO")))
        }
    }

    struct Exclaim;

    impl Plugin for Exclaim {
        fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
            Ok(Cow::Owned(format!("{input}!")))
        }
    }

    #[test]
    fn preprocessors_run_in_order() {
        let html = Markdown::new(MarkdownOptions::NONE)
            .plugin(Shout)
            .plugin(Exclaim)
            .render("hello")
            .unwrap();

        assert_eq!(html, "<p>HELLO!</p>\n");
    }

    #[test]
    fn plain_render() {
        let html = Markdown::new(MarkdownOptions::NONE).render("# Title\n\nPara.").unwrap();
        assert_eq!(html, "<h1>Title</h1>\n<p>Para.</p>\n");
    }
}
