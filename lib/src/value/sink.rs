use std::{fs, io};
use std::path::{Path, PathBuf};
use std::fmt::Debug;

use crate::error::{Result, Chainable};
use crate::value::Value;

pub trait Sink: Debug {
    fn write<V: Into<Value> + 'static>(&self, value: V) -> Result<()> {
        self.write_value(value.into())
    }

    fn write_value(&self, value: Value) -> Result<()>;
}

impl Sink for fs::File {
    fn write_value(&self, value: Value) -> Result<()> {
        let text = match value {
            Value::Null => return Ok(()),
            Value::String(text) => text,
            value => return err! {
                "file endpoint does not support this value",
                "type" => value.kind(),
            },
        };

        let mut file = io::BufWriter::new(self);
        io::Write::write_all(&mut file, text.as_bytes())?;
        Ok(io::Write::flush(&mut file)?)
    }
}

impl Sink for &Path {
    fn write_value(&self, value: Value) -> Result<()> {
        fs::File::create(self)
            .chain(error! {
                "failed to open/create file for writing",
                "file path" => self.display()
            })?
            .write(value)
    }
}

impl Sink for PathBuf {
    fn write_value(&self, value: Value) -> Result<()> {
        <&Path as Sink>::write(&self.as_path(), value)
    }
}

#[cfg(test)]
mod sink_tests {
    use super::*;

    #[test]
    fn writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("page.html");
        text.write("<p>hi</p>").unwrap();
        assert_eq!(fs::read_to_string(&text).unwrap(), "<p>hi</p>");

        text.as_path().write("<p>again</p>").unwrap();
        assert_eq!(fs::read_to_string(&text).unwrap(), "<p>again</p>");
    }

    #[test]
    fn refuses_everything_but_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("x");
        let error = path.write(Value::from(crate::dict! { "a" => 1u8 })).unwrap_err();
        assert!(error.to_string().contains("does not support"));

        let error = path.write(Value::from(vec![1u8, 2])).unwrap_err();
        assert!(error.to_string().contains("type: array"), "{error}");
    }
}
