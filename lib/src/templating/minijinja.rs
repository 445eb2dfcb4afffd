use std::collections::BTreeMap;

use minijinja::Environment;
use minijinja::value::Value;

use crate::error::{Chainable, Result};
use crate::resolve::{Data, Resolved};
use crate::templating::{Engine, TemplateSet};

#[derive(Debug)]
pub struct MiniJinjaEngine {
    env: Environment<'static>,
    entry: Option<String>,
}

impl MiniJinjaEngine {
    /// Compiles every template in `set`.
    pub fn new(set: &TemplateSet) -> Result<Self> {
        let mut env = Environment::new();
        for (name, source) in set.iter() {
            env.add_template_owned(name.to_string(), source.to_string()).chain_with(|| error! {
                Template: "invalid template",
                "template" => name,
            })?;
        }

        env.add_function("now", ext::now);
        env.add_filter("deslug", ext::deslug);
        env.add_filter("date", ext::date);
        env.add_filter("split", ext::split);
        env.add_filter("slugify", ext::slugify);
        env.add_filter("reldocpath", ext::reldocpath);
        Ok(MiniJinjaEngine { env, entry: set.entry().map(String::from) })
    }
}

fn context(data: &Data) -> BTreeMap<&str, Value> {
    data.iter()
        .map(|(key, value)| (key.as_str(), Value::from(value.clone())))
        .collect()
}

impl Engine for MiniJinjaEngine {
    fn entry(&self) -> Option<&str> {
        self.entry.as_deref()
    }

    fn render(&self, name: &str, data: &Data) -> Result<String> {
        let template = self.env.get_template(name).chain_with(|| error! {
            Template: "unknown template",
            "template" => name,
        })?;

        template.render(context(data)).chain_with(|| error! {
            Template: "failed to render template",
            "template" => name,
        })
    }

    fn render_str(&self, name: Option<&str>, template_str: &str, data: &Data) -> Result<String> {
        let string = match name {
            Some(name) => self.env.render_named_str(name, template_str, context(data))?,
            None => self.env.render_str(template_str, context(data))?,
        };

        Ok(string)
    }
}

impl From<Resolved> for Value {
    fn from(value: Resolved) -> Self {
        match value {
            Resolved::Text(s) => Value::from(s),
            Resolved::Html(s) => Value::from_safe_string(s.to_string()),
            Resolved::Data(v) => Value::from(v),
        }
    }
}

mod ext {
    use std::fmt::{Display, Write};

    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use minijinja::{value::Value, Error, ErrorKind};

    use crate::util::relative_doc_path;

    pub fn deslug(value: &str) -> String {
        value.replace('-', " ")
    }

    pub fn slugify(value: &str) -> String {
        crate::util::slugify(value)
    }

    pub fn reldocpath(source: &str, target: &str) -> String {
        relative_doc_path(source, target)
    }

    fn format(date: impl Display) -> Result<Value, Error> {
        let mut string = String::new();
        write!(string, "{date}").map_err(|_| Error::new(
            ErrorKind::InvalidOperation,
            "invalid format string provided to `date`"
        ))?;

        Ok(string.into())
    }

    /// Formats a unix timestamp or a date string with a `strftime` format.
    pub fn date(value: Value, fmt: &str) -> Result<Value, Error> {
        if let Ok(ts) = i64::try_from(value.clone()) {
            let datetime = DateTime::from_timestamp(ts, 0)
                .ok_or_else(|| Error::new(
                    ErrorKind::InvalidOperation,
                    "invalid timestamp provided to `date`"
                ))?;

            return format(datetime.format(fmt));
        }

        let kind = value.kind();
        let string = value.as_str()
            .ok_or_else(|| Error::new(
                ErrorKind::InvalidOperation,
                format!("`date` must be applied to a string or integer, found {kind}")
            ))?
            .trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(string) {
            return format(dt.format(fmt));
        }

        if let Ok(dt) = DateTime::parse_from_str(string, "%Y-%m-%d %H:%M:%S %z") {
            return format(dt.format(fmt));
        }

        if let Ok(dt) = NaiveDateTime::parse_from_str(string, "%Y-%m-%d %H:%M:%S") {
            return format(dt.format(fmt));
        }

        match NaiveDate::parse_from_str(string, "%Y-%m-%d") {
            Ok(date) => format(date.format(fmt)),
            Err(e) => Err(Error::new(
                ErrorKind::InvalidOperation,
                format!("failed to parse {string}: {e}")
            )),
        }
    }

    pub fn split(value: &str, pat: &str, n: Option<usize>) -> Result<Value, Error> {
        match n {
            Some(n) => Ok(value.split(pat).nth(n).map(Value::from).unwrap_or(Value::UNDEFINED)),
            None => Ok(value.split(pat).map(Value::from).collect()),
        }
    }

    pub fn now() -> u64 {
        std::time::SystemTime::now()
            .duration_since(std::time::SystemTime::UNIX_EPOCH)
            .map_or(0, |d| d.as_secs())
    }
}

mod value_object {
    use std::sync::Arc;

    use minijinja::value::{Enumerator, Object, ObjectRepr, Value};

    use crate::value::{self, Num};

    #[derive(Debug)]
    struct Dict(Arc<value::Dict>);

    #[derive(Debug)]
    struct Array(Arc<Vec<value::Value>>);

    impl Object for Dict {
        fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
            self.0.get(key.as_str()?)
                .cloned()
                .map(Value::from)
        }

        fn enumerate(self: &Arc<Self>) -> Enumerator {
            Enumerator::Values(self.0.keys().map(|k| Value::from(k.clone())).collect())
        }
    }

    impl Object for Array {
        fn repr(self: &Arc<Self>) -> ObjectRepr {
            ObjectRepr::Seq
        }

        fn get_value(self: &Arc<Self>, key: &Value) -> Option<Value> {
            self.0.get(key.as_usize()?)
                .cloned()
                .map(Value::from)
        }

        fn enumerate(self: &Arc<Self>) -> Enumerator {
            Enumerator::Seq(self.0.len())
        }
    }

    impl From<value::Value> for Value {
        fn from(v: value::Value) -> Self {
            match v {
                value::Value::Null => Value::from(()),
                value::Value::Bool(b) => Value::from(b),
                value::Value::Num(Num::U64(n)) => Value::from(n),
                value::Value::Num(Num::I64(n)) => Value::from(n),
                value::Value::Num(Num::F64(n)) => Value::from(n),
                value::Value::String(s) => Value::from(s),
                value::Value::Array(a) => Value::from_object(Array(a)),
                value::Value::Dict(d) => Value::from_object(Dict(d)),
            }
        }
    }
}

#[cfg(test)]
mod minijinja_tests {
    use super::*;
    use crate::error::ErrorKind;

    fn engine(templates: &[(&str, &str)]) -> MiniJinjaEngine {
        let mut set = TemplateSet::default();
        for (name, source) in templates {
            set.add(*name, *source);
        }

        MiniJinjaEngine::new(&set).unwrap()
    }

    fn data() -> Data {
        let meta = crate::value::Value::from(crate::dict! {
            "n" => 2u8,
            "tags" => vec!["a", "b", "c"],
            "when" => "2024-03-05",
        });

        Data::from([
            ("text".into(), Resolved::Text("<b>&</b>".into())),
            ("html".into(), Resolved::Html("<p>hi</p>".into())),
            ("meta".into(), Resolved::Data(meta)),
        ])
    }

    #[test]
    fn renders_resolved_values() {
        let engine = engine(&[("page.tmpl", "{{ text }}|{{ html }}|{{ meta.n + 1 }}|{{ meta.tags[1] }}|{{ meta.tags|length }}")]);
        assert_eq!(engine.entry(), Some("page.tmpl"));
        assert_eq!(engine.render("page.tmpl", &data()).unwrap(), "<b>&</b>|<p>hi</p>|3|b|3");
    }

    #[test]
    fn html_templates_escape_text_but_not_markup() {
        let engine = engine(&[("page.html", "{{ text }}|{{ html }}")]);
        assert_eq!(engine.render("page.html", &data()).unwrap(), "&lt;b&gt;&amp;&lt;&#x2f;b&gt;|<p>hi</p>");
    }

    #[test]
    fn filters() {
        let engine = engine(&[]);
        let cases = [
            ("{{ 'my-first-post'|deslug }}", "my first post"),
            ("{{ 'Hello, World'|slugify }}", "hello-world"),
            ("{{ 'a,b,c'|split(',', 1) }}", "b"),
            ("{{ 'a,b,c'|split(',')|length }}", "3"),
            ("{{ meta.when|date('%d/%m/%Y') }}", "05/03/2024"),
            ("{{ '2024-03-05 10:11:12'|date('%H:%M') }}", "10:11"),
            ("{{ '2024-03-05T10:11:12Z'|date('%Y') }}", "2024"),
            ("{{ 0|date('%Y-%m-%d') }}", "1970-01-01"),
            ("{{ 'docs/a/b.html'|reldocpath('css/site.css') }}", "../../css/site.css"),
        ];

        for (template, expected) in cases {
            assert_eq!(engine.render_str(None, template, &data()).unwrap(), expected, "{template}");
        }

        let now = engine.render_str(None, "{{ now() }}", &data()).unwrap();
        assert!(now.parse::<u64>().unwrap() > 1_700_000_000, "{now}");

        let year = engine.render_str(None, "{{ now()|date('%Y') }}", &data()).unwrap();
        assert!(year.parse::<u32>().unwrap() >= 2024, "{year}");
        assert!(engine.render_str(None, "{{ 'never'|date('%Y') }}", &data()).is_err());
    }

    #[test]
    fn template_errors() {
        let mut set = TemplateSet::default();
        set.add("bad.tmpl", "{% if %}");
        let error = MiniJinjaEngine::new(&set).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Template);

        let engine = engine(&[]);
        let error = engine.render("missing.tmpl", &data()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Template);
        assert!(error.to_string().contains("missing.tmpl"));
    }
}
