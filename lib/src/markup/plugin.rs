use std::borrow::Cow;

use pulldown_cmark::Event;

use crate::error::Result;

/// A stream of markdown events flowing between plugins.
pub type Events<'a> = Box<dyn Iterator<Item = Event<'a>> + 'a>;

/// A stage in the markdown pipeline.
///
/// `preprocess` sees the raw markdown text before parsing; `remap` sees the
/// parsed event stream before it is rendered as HTML. Both default to passing
/// their input through unchanged.
pub trait Plugin {
    #[inline(always)]
    fn preprocess<'a>(&self, input: &'a str) -> Result<Cow<'a, str>> {
        Ok(Cow::Borrowed(input))
    }

    #[inline(always)]
    fn remap<'a>(&'a mut self, events: Events<'a>) -> Events<'a> {
        events
    }
}
