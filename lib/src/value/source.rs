use std::{fs, io};
use std::path::Path;
use std::fmt::Debug;
use std::sync::Arc;

use either::Either;

use crate::error::{Result, Chainable};
use crate::value::Value;

pub trait Source: Debug {
    type Value: Into<Value> + 'static;

    fn read(self) -> Result<Self::Value>;

    /// Reads `self` and requires the contents to be valid UTF-8.
    fn read_str(self) -> Result<Arc<str>> where Self: Sized {
        let path = self.path().map(|p| p.display().to_string());
        let value: Value = self.read()?.into();
        match value {
            Value::String(s) => Ok(s),
            v => err! {
                "expected UTF-8 text",
                "actual type" => v.kind(),
                if path.is_some() => "file path" => path.unwrap_or_default(),
            }
        }
    }

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for &fs::File {
    type Value = Either<String, Vec<u8>>;

    fn read(self) -> Result<Self::Value> {
        use io::Read;

        let mut data = Vec::new();
        let mut file = io::BufReader::new(self);
        file.read_to_end(&mut data)?;

        let value = String::from_utf8(data)
            .map(Either::Left)
            .map_err(|v| v.into_bytes())
            .unwrap_or_else(Either::Right);

        Ok(value)
    }
}

impl Source for &Path {
    type Value = <&'static fs::File as Source>::Value;

    fn read(self) -> Result<Self::Value> {
        let file = fs::File::open(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })?;

        file.read()
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}

#[cfg(test)]
mod source_tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn reads_files_as_text() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "# Hello").unwrap();

        let text = file.path().read_str().unwrap();
        assert_eq!(&*text, "# Hello");
    }

    #[test]
    fn rejects_binary_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0xff, 0xfe, 0x00]).unwrap();

        let error = file.path().read_str().unwrap_err();
        assert!(error.to_string().contains("expected UTF-8 text"));
    }

    #[test]
    fn missing_files_name_the_path() {
        let error = Path::new("/no/such/file.md").read().unwrap_err();
        assert_eq!(error.kind(), crate::error::ErrorKind::Io);
        assert!(error.to_string().contains("/no/such/file.md"));
    }
}
