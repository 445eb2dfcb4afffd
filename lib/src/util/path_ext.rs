use std::borrow::Cow;
use std::path::{Path, Component};

pub trait PathExt: AsRef<Path> {
    /// The file name without its final extension, lossily converted to UTF-8.
    fn stem_str(&self) -> Cow<'_, str>;

    /// The number of normal components in `self`, ignoring roots, `.`, and
    /// prefixes. `..` components cancel the component before them.
    fn depth(&self) -> usize;

    /// The final extension of `self` in lowercase, if there is one.
    fn extension_lowercase(&self) -> Option<String>;
}

impl PathExt for Path {
    fn stem_str(&self) -> Cow<'_, str> {
        self.file_stem()
            .map(|stem| stem.to_string_lossy())
            .unwrap_or(Cow::Borrowed(""))
    }

    fn depth(&self) -> usize {
        self.components().fold(0, |depth, component| match component {
            Component::Normal(_) => depth + 1,
            Component::ParentDir => depth.saturating_sub(1),
            _ => depth,
        })
    }

    fn extension_lowercase(&self) -> Option<String> {
        self.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
    }
}
