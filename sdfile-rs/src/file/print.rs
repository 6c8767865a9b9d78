//! Text output into an open file.
//!
//! One `print` over a tagged value instead of a stack of overloads, plus a
//! `ufmt::uWrite` adapter for `uwrite!`-style formatting.

use crate::{
    drive::WordDrive,
    error::SdError,
    file::File,
    numfmt,
    sd::Sd,
};

/// Radix for integer printing. Hex renders as `0x` plus uppercase digits;
/// binary and octal render bare; decimal is signed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Base {
    Bin,
    Oct,
    Dec,
    Hex,
}

/// A printable value. Integer and float cases carry their rendering
/// parameters so one method covers the whole surface.
#[derive(Clone, Copy, Debug)]
pub enum Value<'a> {
    Str(&'a str),
    Char(char),
    Int(i64, Base),
    Float(f64, u8),
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(s: &'a str) -> Value<'a> {
        Value::Str(s)
    }
}

impl<'a> From<char> for Value<'a> {
    fn from(c: char) -> Value<'a> {
        Value::Char(c)
    }
}

impl<'a> From<i16> for Value<'a> {
    fn from(n: i16) -> Value<'a> {
        Value::Int(n as i64, Base::Dec)
    }
}

impl<'a> From<i32> for Value<'a> {
    fn from(n: i32) -> Value<'a> {
        Value::Int(n as i64, Base::Dec)
    }
}

impl<'a> From<i64> for Value<'a> {
    fn from(n: i64) -> Value<'a> {
        Value::Int(n, Base::Dec)
    }
}

impl<'a> From<u16> for Value<'a> {
    fn from(n: u16) -> Value<'a> {
        Value::Int(n as i64, Base::Dec)
    }
}

impl<'a> From<u32> for Value<'a> {
    fn from(n: u32) -> Value<'a> {
        Value::Int(n as i64, Base::Dec)
    }
}

impl<'a> From<f32> for Value<'a> {
    fn from(v: f32) -> Value<'a> {
        Value::Float(v as f64, 7)
    }
}

impl<'a> From<f64> for Value<'a> {
    fn from(v: f64) -> Value<'a> {
        Value::Float(v, 15)
    }
}

impl File {
    /// Render `value` as ASCII and write it at the cursor. Returns the
    /// byte count written, 0 on failure.
    pub fn print<'v, D: WordDrive>(
        &mut self,
        sd: &Sd<D>,
        value: impl Into<Value<'v>>,
    ) -> usize {
        match self.try_print(sd, value.into()) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("print to {} failed: {:?}", self.name(), e);
                0
            }
        }
    }

    /// `print` plus a `\r\n` terminator. An empty string still emits the
    /// terminator (a bare line break); the terminator is skipped only when
    /// the value itself could not be written.
    pub fn println<'v, D: WordDrive>(
        &mut self,
        sd: &Sd<D>,
        value: impl Into<Value<'v>>,
    ) -> usize {
        match self.try_print(sd, value.into()) {
            Ok(n) => n + self.print(sd, "\r\n"),
            Err(e) => {
                log::debug!("println to {} failed: {:?}", self.name(), e);
                0
            }
        }
    }

    /// Borrow this file as a `ufmt::uWrite` sink.
    pub fn writer<'a, D: WordDrive>(&'a mut self, sd: &'a Sd<D>) -> FileWriter<'a, D> {
        FileWriter { file: self, sd }
    }

    fn try_print<D: WordDrive>(&mut self, sd: &Sd<D>, value: Value<'_>) -> Result<usize, SdError> {
        match value {
            Value::Str(s) => self.try_write(sd, s.as_bytes()),
            Value::Char(c) => {
                let mut buf = [0u8; 4];
                let s = c.encode_utf8(&mut buf);
                self.try_write(sd, s.as_bytes())
            }
            Value::Int(n, base) => {
                let mut buf = [0u8; numfmt::INT_BUF];
                let len = numfmt::format_int(n, base, &mut buf);
                self.try_write(sd, &buf[..len])
            }
            Value::Float(v, places) => {
                let mut buf = [0u8; numfmt::FLOAT_BUF];
                let len = numfmt::format_float(v, places, &mut buf);
                self.try_write(sd, &buf[..len])
            }
        }
    }
}

/// `ufmt` sink over an open file, for `uwrite!`/`uwriteln!`.
pub struct FileWriter<'a, D: WordDrive> {
    file: &'a mut File,
    sd: &'a Sd<D>,
}

impl<'a, D: WordDrive> ufmt::uWrite for FileWriter<'a, D> {
    type Error = SdError;

    fn write_str(&mut self, s: &str) -> Result<(), SdError> {
        self.file.try_write(self.sd, s.as_bytes()).map(|_| ())
    }
}
