pub mod minijinja;

use std::fmt::Debug;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Chainable, Result};
use crate::resolve::Data;
use crate::util::PathExt;
use crate::value::Source;

pub use self::minijinja::MiniJinjaEngine;

/// The built-in page template.
pub const PAGE_TEMPLATE: &str = include_str!("../../templates/page.tmpl");

/// The built-in slide template.
pub const SLIDES_TEMPLATE: &str = include_str!("../../templates/slides.tmpl");

pub trait Engine: Send + Sync + Debug {
    /// The template rendered when a caller doesn't name one.
    fn entry(&self) -> Option<&str>;

    fn render(&self, name: &str, data: &Data) -> Result<String>;

    fn render_str(&self, name: Option<&str>, template_str: &str, data: &Data) -> Result<String>;
}

/// Named template sources.
///
/// The first template added is the entry point.
#[derive(Debug, Clone, Default)]
pub struct TemplateSet {
    templates: Vec<(String, Arc<str>)>,
}

impl TemplateSet {
    /// The built-in `page.tmpl` and `slides.tmpl`, with `page.tmpl` as the
    /// entry point.
    pub fn defaults() -> Self {
        TemplateSet::default()
            .with("page.tmpl", PAGE_TEMPLATE)
            .with("slides.tmpl", SLIDES_TEMPLATE)
    }

    /// Reads templates from `paths`. A file is one template named by its
    /// file name. A directory contributes each `*.tmpl` file directly inside
    /// it, in file name order.
    pub fn read_files<I, P>(paths: I) -> Result<Self>
        where I: IntoIterator<Item = P>, P: AsRef<Path>
    {
        let mut set = TemplateSet::default();
        for path in paths {
            let path = path.as_ref();
            if !path.is_dir() {
                set.read_file(path)?;
                continue;
            }

            let entries = fs::read_dir(path).chain_with(|| error! {
                Template: "failed to read template directory",
                "directory" => path.display(),
            })?;

            let mut files = vec![];
            for entry in entries {
                let file = entry?.path();
                if file.is_file() && file.extension_lowercase().as_deref() == Some("tmpl") {
                    files.push(file);
                }
            }

            files.sort();
            for file in files {
                set.read_file(&file)?;
            }
        }

        Ok(set)
    }

    fn read_file(&mut self, path: &Path) -> Result<()> {
        let source = path.read_str().chain_with(|| error! {
            Template: "failed to read template",
            "file path" => path.display(),
        })?;

        let name = path.file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        self.add(name, source);
        Ok(())
    }

    /// Adds a template, replacing any existing template named `name` in place.
    pub fn add<N, S>(&mut self, name: N, source: S)
        where N: Into<String>, S: Into<Arc<str>>
    {
        let (name, source) = (name.into(), source.into());
        match self.templates.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = source,
            None => self.templates.push((name, source)),
        }
    }

    pub fn with<N, S>(mut self, name: N, source: S) -> Self
        where N: Into<String>, S: Into<Arc<str>>
    {
        self.add(name, source);
        self
    }

    pub fn entry(&self) -> Option<&str> {
        self.templates.first().map(|(name, _)| name.as_str())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates.iter()
            .find(|(n, _)| n == name)
            .map(|(_, source)| &**source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates.iter().map(|(name, source)| (name.as_str(), &**source))
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod templating_tests {
    use super::*;

    #[test]
    fn defaults() {
        let set = TemplateSet::defaults();
        assert_eq!(set.entry(), Some("page.tmpl"));
        assert!(set.get("slides.tmpl").is_some_and(|s| s.contains("cur_no")));
        assert!(set.get("other.tmpl").is_none());
    }

    #[test]
    fn read_files_and_directories() {
        let dir = tempfile::tempdir().unwrap();
        let parts = dir.path().join("parts");
        fs::create_dir(&parts).unwrap();
        fs::write(dir.path().join("main.html"), "main").unwrap();
        fs::write(parts.join("b.tmpl"), "b").unwrap();
        fs::write(parts.join("a.tmpl"), "a").unwrap();
        fs::write(parts.join("notes.txt"), "ignored").unwrap();

        let set = TemplateSet::read_files([dir.path().join("main.html"), parts]).unwrap();
        let names = set.iter().map(|(name, _)| name).collect::<Vec<_>>();
        assert_eq!(names, ["main.html", "a.tmpl", "b.tmpl"]);
        assert_eq!(set.entry(), Some("main.html"));
        assert_eq!(set.get("b.tmpl"), Some("b"));
    }

    #[test]
    fn missing_template_files() {
        let error = TemplateSet::read_files(["/no/such/page.tmpl"]).unwrap_err();
        assert_eq!(error.kind(), crate::error::ErrorKind::Template);
    }

    #[test]
    fn binary_template_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.tmpl");
        fs::write(&path, [0xff, 0xd8, 0xff]).unwrap();

        let error = TemplateSet::read_files([&path]).unwrap_err();
        assert_eq!(error.kind(), crate::error::ErrorKind::Template);
        assert!(error.to_string().contains("expected UTF-8 text"));
    }

    #[test]
    fn add_replaces_in_place() {
        let mut set = TemplateSet::defaults();
        set.add("page.tmpl", "custom");
        assert_eq!(set.entry(), Some("page.tmpl"));
        assert_eq!(set.get("page.tmpl"), Some("custom"));
    }
}
