//! Strict quoting for CSV input
//!
//! The csv reader accepts text after a closing quote (`"abc"def` becomes
//! `abcdef`) and a quote left open at end of file. Export files must reject
//! both, so every byte passes through [`StrictQuotes`] before the csv reader
//! sees it.

use std::io::{self, Read};

use crate::error::ImportError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    FieldStart,
    Unquoted,
    Quoted,
    /// A quote inside a quoted field: either an escaped `""` or the end
    QuoteInQuoted,
}

/// Reader adapter that fails with `InvalidData` on malformed quoting
pub struct StrictQuotes<R> {
    inner: R,
    state: State,
    line: u64,
}

impl<R: Read> StrictQuotes<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            state: State::FieldStart,
            line: 1,
        }
    }

    fn error(&self, reason: &'static str) -> io::Error {
        io::Error::new(
            io::ErrorKind::InvalidData,
            ImportError::MalformedQuoting {
                line: self.line,
                reason,
            },
        )
    }

    fn step(&mut self, byte: u8) -> io::Result<()> {
        let terminator = matches!(byte, b',' | b'\n' | b'\r');

        self.state = match (self.state, byte) {
            (State::FieldStart, b'"') => State::Quoted,
            (State::FieldStart | State::Unquoted, _) if terminator => State::FieldStart,
            (State::FieldStart | State::Unquoted, _) => State::Unquoted,
            (State::Quoted, b'"') => State::QuoteInQuoted,
            (State::Quoted, _) => State::Quoted,
            (State::QuoteInQuoted, b'"') => State::Quoted,
            (State::QuoteInQuoted, _) if terminator => State::FieldStart,
            (State::QuoteInQuoted, _) => return Err(self.error("',' expected after '\"'")),
        };

        if byte == b'\n' {
            self.line += 1;
        }
        Ok(())
    }
}

impl<R: Read> Read for StrictQuotes<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n == 0 && !buf.is_empty() && self.state == State::Quoted {
            return Err(self.error("unexpected end of data"));
        }
        for &byte in &buf[..n] {
            self.step(byte)?;
        }
        Ok(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_all(input: &str) -> io::Result<String> {
        let mut out = String::new();
        StrictQuotes::new(input.as_bytes()).read_to_string(&mut out)?;
        Ok(out)
    }

    #[test]
    fn test_well_formed_input_passes_through() {
        let input = "a,b\r\n\"x \"\"y\"\"\",\"line\none\"\n,\"\"\n";
        assert_eq!(read_all(input).unwrap(), input);
    }

    #[test]
    fn test_bare_quote_inside_unquoted_field_allowed() {
        read_all("a,b\n5\" pie,1\n").unwrap();
    }

    #[test]
    fn test_text_after_closing_quote_rejected() {
        let err = read_all("a,b,c\n1,\"abc\"def,x\n").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("line 2"));
        assert!(err.to_string().contains("',' expected after '\"'"));
    }

    #[test]
    fn test_unterminated_quote_rejected() {
        let err = read_all("a,b,c\n1,2,\"unterminated\n").unwrap_err();
        assert!(err.to_string().contains("unexpected end of data"));
    }
}
