//! Rendering resolved data into a single page.

use std::io::Write;

use crate::error::{Chainable, Result};
use crate::resolve::Data;
use crate::templating::Engine;

/// Renders `data` with the template `name`, or the engine's entry template
/// if `name` is `None`.
pub fn render_page(engine: &dyn Engine, name: Option<&str>, data: &Data) -> Result<String> {
    let name = match name.or_else(|| engine.entry()) {
        Some(name) => name,
        None => return err!(Template: "no template to render the page with"),
    };

    engine.render(name, data)
}

/// Renders a page like [`render_page()`] and writes it to `writer`.
pub fn make_page<W: Write>(mut writer: W, engine: &dyn Engine, name: Option<&str>, data: &Data) -> Result<()> {
    let html = render_page(engine, name, data)?;
    writer.write_all(html.as_bytes())
        .and_then(|_| writer.flush())
        .chain(error!(Io: "failed to write page"))
}

/// Renders a page like [`render_page()`] into a `String`.
pub fn make_page_string(engine: &dyn Engine, name: Option<&str>, data: &Data) -> Result<String> {
    render_page(engine, name, data)
}

#[cfg(test)]
mod page_tests {
    use super::*;
    use crate::resolve::{Resolved, Resolver, ResolverConfig, KeyValues};
    use crate::templating::{MiniJinjaEngine, TemplateSet};

    fn resolve(pairs: &[(&str, &str)]) -> Data {
        let kv = pairs.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<KeyValues>();

        Resolver::new(&ResolverConfig::default()).unwrap().resolve_all(&kv).unwrap()
    }

    #[test]
    fn default_page_template() {
        let engine = MiniJinjaEngine::new(&TemplateSet::defaults()).unwrap();
        let data = resolve(&[("title", "text:Hello"), ("content", "markdown:# Hi\n\nThere.")]);
        let html = make_page_string(&engine, None, &data).unwrap();

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Hello</title>"));
        assert!(html.contains("<section><h1>Hi</h1>\n<p>There.</p>\n</section>"));
        assert!(!html.contains("<footer>"));
    }

    #[test]
    fn named_template_to_writer() {
        let set = TemplateSet::defaults().with("greeting.tmpl", "{{ greeting }}, {{ who }}!");
        let engine = MiniJinjaEngine::new(&set).unwrap();
        let data = Data::from([
            ("greeting".into(), Resolved::Text("Hello".into())),
            ("who".into(), Resolved::Text("World".into())),
        ]);

        let mut output = vec![];
        make_page(&mut output, &engine, Some("greeting.tmpl"), &data).unwrap();
        assert_eq!(output, b"Hello, World!");
    }

    #[test]
    fn no_templates() {
        let engine = MiniJinjaEngine::new(&TemplateSet::default()).unwrap();
        let error = render_page(&engine, None, &Data::new()).unwrap_err();
        assert_eq!(error.kind(), crate::error::ErrorKind::Template);
    }
}
