//! Resolution of key/value data sources.
//!
//! Every value in a [`KeyValues`] map names a data source. Its syntax decides
//! what kind of source it is:
//!
//! | value                                  | resolves to                         |
//! |----------------------------------------|-------------------------------------|
//! | `text:STRING`                          | `STRING`, verbatim                  |
//! | `markdown:DOC`, `gomarkdown:DOC`       | `DOC` rendered by [`markup::render`]|
//! | `mmark:DOC`                            | `DOC` rendered as mmark             |
//! | `fountain:DOC`                         | `DOC` rendered as Fountain          |
//! | `json:JSON`                            | `JSON`, parsed                      |
//! | `http://...`, `https://...`            | the fetched body, by content type   |
//! | anything else                          | the file at that path, by extension |
//!
//! Prefixes are checked in the order above and stripped exactly once: the
//! value `text:https://example.com` is the string `https://example.com`.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use rayon::prelude::*;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;

use crate::error::{Chainable, Result};
use crate::markup::{self, Markup};
use crate::util::{abbreviate, PathExt};
use crate::value::{Format, Json, Source, Value};

/// The raw input: keys mapped to data source values.
pub type KeyValues = BTreeMap<String, String>;

/// The resolved output, keyed like the input.
pub type Data = BTreeMap<String, Resolved>;

/// A data source value, classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource<'a> {
    Text(&'a str),
    Markdown(&'a str),
    Mmark(&'a str),
    Fountain(&'a str),
    Json(&'a str),
    Url(&'a str),
    Path(&'a Path),
}

impl<'a> DataSource<'a> {
    /// Classifies `value`.
    ///
    /// ```rust
    /// use std::path::Path;
    /// use mkpage::resolve::DataSource;
    ///
    /// assert_eq!(DataSource::parse("text:Hi"), DataSource::Text("Hi"));
    /// assert_eq!(DataSource::parse("gomarkdown:# Hi"), DataSource::Markdown("# Hi"));
    /// assert_eq!(DataSource::parse("https://a.b/c"), DataSource::Url("https://a.b/c"));
    /// assert_eq!(DataSource::parse("text:https://a.b"), DataSource::Text("https://a.b"));
    /// assert_eq!(DataSource::parse("notes.md"), DataSource::Path(Path::new("notes.md")));
    /// ```
    pub fn parse(value: &'a str) -> Self {
        let prefixes: [(&str, fn(&'a str) -> Self); 6] = [
            ("text:", DataSource::Text),
            ("markdown:", DataSource::Markdown),
            ("gomarkdown:", DataSource::Markdown),
            ("mmark:", DataSource::Mmark),
            ("fountain:", DataSource::Fountain),
            ("json:", DataSource::Json),
        ];

        for (prefix, variant) in prefixes {
            if let Some(rest) = value.strip_prefix(prefix) {
                return variant(rest);
            }
        }

        if value.starts_with("http://") || value.starts_with("https://") {
            return DataSource::Url(value);
        }

        DataSource::Path(Path::new(value))
    }

    /// A short name for the kind of source, for logs and errors.
    pub fn kind(&self) -> &'static str {
        match self {
            DataSource::Text(_) => "text",
            DataSource::Markdown(_) => "markdown",
            DataSource::Mmark(_) => "mmark",
            DataSource::Fountain(_) => "fountain",
            DataSource::Json(_) => "json",
            DataSource::Url(_) => "url",
            DataSource::Path(_) => "path",
        }
    }
}

/// A resolved data source.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Resolved {
    /// A plain string.
    Text(Arc<str>),
    /// Rendered markup. Templates treat this as safe HTML.
    Html(Arc<str>),
    /// Parsed JSON.
    Data(Value),
}

impl Resolved {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Resolved::Text(s) | Resolved::Html(s) => Some(&**s),
            Resolved::Data(v) => v.as_str(),
        }
    }
}

/// How the body of a file or HTTP response is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Content {
    Markdown,
    Mmark,
    Fountain,
    Json,
    Raw,
}

impl Content {
    fn from_extension(path: &Path) -> Content {
        match path.extension_lowercase().as_deref() {
            Some("md" | "markdown" | "mdown") => Content::Markdown,
            Some("mmark") => Content::Mmark,
            Some("fountain" | "spmd") => Content::Fountain,
            Some("json") => Content::Json,
            _ => Content::Raw,
        }
    }

    fn from_content_type(content_type: &str) -> Content {
        let mime = content_type.split(';').next().unwrap_or_default().trim();
        match &*mime.to_ascii_lowercase() {
            "application/json" => Content::Json,
            "text/markdown" => Content::Markdown,
            "text/mmark" => Content::Mmark,
            "text/fountain" => Content::Fountain,
            _ => Content::Raw,
        }
    }

    fn resolve(self, text: &str) -> Result<Resolved> {
        let resolved = match self {
            Content::Markdown => Resolved::Html(markup::render(text)?.into()),
            Content::Mmark => Resolved::Html(markup::render_with(Markup::Mmark, text)?.into()),
            Content::Fountain => Resolved::Html(markup::render_with(Markup::Fountain, text)?.into()),
            Content::Json => Resolved::Data(parse_json(text)?),
            Content::Raw => Resolved::Text(text.into()),
        };

        Ok(resolved)
    }
}

fn parse_json(text: &str) -> Result<Value> {
    Json::from_str::<Value>(text).chain_with(|| error! {
        DataResolution: "invalid JSON data",
        "input" => abbreviate(text.trim(), 60),
    })
}

/// Process-wide resolver settings.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// The deadline for each HTTP request, connection to last byte.
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig {
            timeout: Duration::from_secs(30),
            user_agent: concat!("mkpage/", env!("CARGO_PKG_VERSION")).into(),
        }
    }
}

/// Resolves [`KeyValues`] into [`Data`].
///
/// Nothing is cached: each call reads every file and fetches every URL anew.
#[derive(Debug, Clone)]
pub struct Resolver {
    client: Client,
}

impl Resolver {
    pub fn new(config: &ResolverConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .chain(error!(DataResolution: "failed to initialize HTTP client"))?;

        Ok(Resolver { client })
    }

    /// Resolves every entry of `kv`.
    ///
    /// Entries are independent and resolve in parallel. If any fail, the
    /// error for the first failing key in key order is returned.
    pub fn resolve_all(&self, kv: &KeyValues) -> Result<Data> {
        let results: Vec<(&String, Result<Resolved>)> = kv.par_iter()
            .map(|(key, value)| (key, self.resolve(key, value)))
            .collect();

        let mut data = Data::new();
        for (key, result) in results {
            data.insert(key.clone(), result?);
        }

        Ok(data)
    }

    /// Resolves the single entry `key` => `value`.
    pub fn resolve(&self, key: &str, value: &str) -> Result<Resolved> {
        let source = DataSource::parse(value);
        log::debug!("resolving `{key}` from {} source", source.kind());
        self.resolve_source(source).chain_with(|| error! {
            "failed to resolve data source",
            "key" => key,
            "value" => abbreviate(value, 80),
        })
    }

    pub fn resolve_source(&self, source: DataSource<'_>) -> Result<Resolved> {
        match source {
            DataSource::Text(text) => Content::Raw.resolve(text),
            DataSource::Markdown(doc) => Content::Markdown.resolve(doc),
            DataSource::Mmark(doc) => Content::Mmark.resolve(doc),
            DataSource::Fountain(doc) => Content::Fountain.resolve(doc),
            DataSource::Json(json) => Content::Json.resolve(json),
            DataSource::Url(url) => self.fetch(url),
            DataSource::Path(path) => {
                let text = path.read_str().chain_with(|| error! {
                    DataResolution: "failed to read data file",
                    "file path" => path.display(),
                })?;

                Content::from_extension(path).resolve(&text)
            }
        }
    }

    fn fetch(&self, url: &str) -> Result<Resolved> {
        let response = self.client.get(url)
            .send()
            .chain_with(|| error!(DataResolution: "HTTP request failed", "url" => url))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return err! {
                DataResolution: "unexpected HTTP response status",
                "url" => url,
                "status" => status,
            };
        }

        let content = response.headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map_or(Content::Raw, Content::from_content_type);

        let bytes = response.bytes()
            .chain_with(|| error!(DataResolution: "failed to read HTTP response", "url" => url))?;

        let text = std::str::from_utf8(&bytes).map_err(|_| error! {
            DataResolution: "HTTP response is not UTF-8 text",
            "url" => url,
        })?;

        content.resolve(text)
    }
}
