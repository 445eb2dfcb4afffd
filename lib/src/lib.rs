//! A library for assembling web pages and slide decks from key/value data.
//!
//! # Overview
//!
//! mkpage takes a map of keys to *data sources* and resolves each source
//! into a value that a template can use:
//!
//!   * **Literals**, prefixed by their type: `text:Hello`, `json:{"a": 1}`,
//!     `markdown:# Title`.
//!   * **URLs**, fetched and interpreted by their content type.
//!   * **Files**, read and interpreted by their extension.
//!
//! Markup, whether literal, fetched, or read from a file, is rendered to HTML
//! by one of three engines: CommonMark, mmark, or Fountain. A document's
//! front matter selects and configures its engine.
//!
//! ## Rendering
//!
//! A page is typically rendered via the following set of operations:
//!
//! 1. Key/value pairs are resolved by a [`Resolver`](resolve::Resolver) into
//!    [`Data`](resolve::Data).
//! 2. Templates are loaded into a [`TemplateSet`](templating::TemplateSet)
//!    and compiled by an [`Engine`](templating::Engine).
//! 3. The data is rendered into a template with [`page::make_page()`], or,
//!    for a Markdown document split into a deck with
//!    [`slides::split_to_slides()`], once per slide with
//!    [`slides::make_slide_file()`].
//!
//! ```rust
//! use mkpage::resolve::{KeyValues, Resolver, ResolverConfig};
//! use mkpage::templating::{MiniJinjaEngine, TemplateSet};
//!
//! let kv = KeyValues::from([
//!     ("title".into(), "text:Hello".into()),
//!     ("content".into(), "markdown:# Hello\n\nWorld.".into()),
//! ]);
//!
//! let data = Resolver::new(&ResolverConfig::default())?.resolve_all(&kv)?;
//! let engine = MiniJinjaEngine::new(&TemplateSet::defaults())?;
//! let html = mkpage::page::make_page_string(&engine, None, &data)?;
//! assert!(html.contains("<h1>Hello</h1>"));
//! # Ok::<(), mkpage::error::Error>(())
//! ```

#[macro_use]
pub mod error;
pub mod util;
pub mod value;
pub mod frontmatter;
pub mod markup;
pub mod resolve;
pub mod templating;
pub mod page;
pub mod slides;
pub mod extract;

