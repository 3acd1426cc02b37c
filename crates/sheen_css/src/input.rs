//! Chunked input stream
//!
//! The stream accepts raw bytes in arbitrary chunks, detects the character set, decodes the bytes
//! and applies the css input preprocessing (newline normalisation, NUL replacement). The
//! tokenizer reads decoded characters through [`InputStream::peek`] and only advances the stream
//! once a complete token has been recognised.

use encoding_rs::{CoderResult, Decoder, Encoding, UTF_16BE, UTF_16LE, UTF_8};
use serde::Deserialize;

use crate::errors::{CssError, CssResult};

/// Where the character set of a stylesheet came from. Later variants take precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CharsetSource {
    /// Nothing is known, utf-8 is assumed
    #[default]
    Default,
    /// Charset of the referring document or `<link charset>`
    Referred,
    /// Transport metadata, such as the `Content-Type` header
    Metadata,
    /// Byte order mark or `@charset` rule in the stylesheet itself
    Document,
    /// Forced by the client; never overridden
    Dictated,
}

/// Result of peeking at the stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Peek {
    Char(char),
    /// The stream is still open but no more decoded characters are available yet
    NeedData,
    /// The stream is closed and fully consumed
    Eof,
}

/// Literal bytes that open a `@charset` rule
const CHARSET_RULE: &[u8] = b"@charset \"";
/// How far into the stream a `@charset` rule is searched for
const CHARSET_SCAN_LIMIT: usize = 1024;
/// Consumed text is dropped from the buffer once this many bytes have been consumed
const COMPACT_THRESHOLD: usize = 4096;

pub struct InputStream {
    /// Raw bytes kept until the charset is known
    raw: Vec<u8>,
    decoder: Option<Decoder>,
    encoding: &'static Encoding,
    charset_source: CharsetSource,
    /// Decoded and preprocessed text
    text: String,
    /// Byte position in `text` of the first character that has not been consumed yet
    start: usize,
    /// A CR was seen at the end of the last chunk; it may be the first half of a CRLF pair
    pending_cr: bool,
    closed: bool,
}

impl InputStream {
    /// Creates a new stream. `charset` is an optional encoding label (`"utf-8"`, `"latin1"`, ..)
    /// which is used according to its `source`.
    pub fn new(charset: Option<&str>, source: CharsetSource) -> CssResult<Self> {
        let encoding = match charset {
            Some(label) => {
                Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| CssError::Charset(label.to_string()))?
            }
            None => UTF_8,
        };

        Ok(Self {
            raw: Vec::new(),
            decoder: None,
            encoding,
            charset_source: if charset.is_some() { source } else { CharsetSource::Default },
            text: String::new(),
            start: 0,
            pending_cr: false,
            closed: false,
        })
    }

    /// Appends a chunk of raw bytes
    pub fn append(&mut self, bytes: &[u8]) -> CssResult<()> {
        if self.closed {
            return Err(CssError::BadParameter("append to a closed stream".into()));
        }

        if self.decoder.is_some() {
            return self.decode(bytes, false);
        }

        self.raw.try_reserve(bytes.len())?;
        self.raw.extend_from_slice(bytes);
        self.detect_charset(false)
    }

    /// Marks the end of the input. Everything that is still buffered gets decoded.
    pub fn close(&mut self) -> CssResult<()> {
        if self.closed {
            return Ok(());
        }

        if self.decoder.is_none() {
            self.detect_charset(true)?;
        }
        self.decode(&[], true)?;

        if self.pending_cr {
            self.pending_cr = false;
            self.text.push('\n');
        }
        self.closed = true;

        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Returns the name of the detected (or configured) encoding and where it came from
    #[must_use]
    pub fn read_charset(&self) -> (&'static str, CharsetSource) {
        (self.encoding.name(), self.charset_source)
    }

    /// Returns the character `offset` bytes past the current position
    #[must_use]
    pub fn peek(&self, offset: usize) -> Peek {
        let pos = self.start + offset;
        if let Some(c) = self.text.get(pos..).and_then(|rest| rest.chars().next()) {
            return Peek::Char(c);
        }

        if self.closed {
            Peek::Eof
        } else {
            Peek::NeedData
        }
    }

    /// Returns `len` bytes of text starting `offset` bytes past the current position
    #[must_use]
    pub fn slice(&self, offset: usize, len: usize) -> &str {
        let from = self.start + offset;
        self.text.get(from..from + len).unwrap_or_default()
    }

    /// Consumes `len` bytes of decoded text
    pub fn advance(&mut self, len: usize) {
        self.start = (self.start + len).min(self.text.len());

        if self.start > COMPACT_THRESHOLD && self.start * 2 > self.text.len() {
            self.text.drain(..self.start);
            self.start = 0;
        }
    }

    /// Number of decoded bytes available past the current position
    #[must_use]
    pub fn available(&self) -> usize {
        self.text.len() - self.start
    }

    fn detect_charset(&mut self, last: bool) -> CssResult<()> {
        if self.charset_source < CharsetSource::Metadata {
            match sniff_charset(&self.raw, last) {
                Sniffed::Wait => return Ok(()),
                Sniffed::Found(encoding) => {
                    self.encoding = encoding;
                    self.charset_source = CharsetSource::Document;
                }
                Sniffed::Nothing => {}
            }
        }

        log::debug!("input: decoding as {} ({:?})", self.encoding.name(), self.charset_source);

        self.decoder = Some(self.encoding.new_decoder_with_bom_removal());
        let raw = std::mem::take(&mut self.raw);
        self.decode(&raw, false)
    }

    fn decode(&mut self, bytes: &[u8], last: bool) -> CssResult<()> {
        let Some(decoder) = self.decoder.as_mut() else {
            return Ok(());
        };

        let mut decoded = String::new();
        let mut input = bytes;
        loop {
            let needed = decoder
                .max_utf8_buffer_length(input.len())
                .unwrap_or(input.len().saturating_mul(3))
                .max(16);
            decoded.try_reserve(needed)?;

            let (result, read, _) = decoder.decode_to_string(input, &mut decoded, last);
            input = &input[read..];
            if result == CoderResult::InputEmpty {
                break;
            }
        }

        self.push_preprocessed(&decoded)
    }

    /// Newline normalisation and NUL replacement
    fn push_preprocessed(&mut self, decoded: &str) -> CssResult<()> {
        self.text.try_reserve(decoded.len() + 1)?;

        for c in decoded.chars() {
            if self.pending_cr {
                self.pending_cr = false;
                self.text.push('\n');
                if c == '\n' {
                    continue;
                }
            }

            match c {
                '\r' => self.pending_cr = true,
                '\x0C' => self.text.push('\n'),
                '\0' => self.text.push(char::REPLACEMENT_CHARACTER),
                c => self.text.push(c),
            }
        }

        Ok(())
    }
}

enum Sniffed {
    /// Not enough data to decide
    Wait,
    Found(&'static Encoding),
    Nothing,
}

/// Looks for a byte order mark or a `@charset` rule at the start of the data
fn sniff_charset(raw: &[u8], last: bool) -> Sniffed {
    if raw.starts_with(&[0xEF, 0xBB, 0xBF]) {
        return Sniffed::Found(UTF_8);
    }
    if raw.starts_with(&[0xFE, 0xFF]) {
        return Sniffed::Found(UTF_16BE);
    }
    if raw.starts_with(&[0xFF, 0xFE]) {
        return Sniffed::Found(UTF_16LE);
    }
    if !last && raw.len() < 3 && [&[0xEF, 0xBB, 0xBF][..], &[0xFE, 0xFF], &[0xFF, 0xFE]].iter().any(|bom| bom.starts_with(raw)) {
        return Sniffed::Wait;
    }

    if raw.len() < CHARSET_RULE.len() {
        return if !last && CHARSET_RULE.starts_with(raw) {
            Sniffed::Wait
        } else {
            Sniffed::Nothing
        };
    }

    if !raw.starts_with(CHARSET_RULE) {
        return Sniffed::Nothing;
    }

    let rest = &raw[CHARSET_RULE.len()..];
    match rest.windows(2).position(|w| w == b"\";") {
        Some(end) => match Encoding::for_label(&rest[..end]) {
            // A utf-16 label read from ascii compatible bytes cannot be right
            Some(encoding) if encoding == UTF_16BE || encoding == UTF_16LE => Sniffed::Found(UTF_8),
            Some(encoding) => Sniffed::Found(encoding),
            None => Sniffed::Nothing,
        },
        None if !last && raw.len() < CHARSET_SCAN_LIMIT => Sniffed::Wait,
        None => Sniffed::Nothing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(stream: &mut InputStream) -> String {
        let mut out = String::new();
        while let Peek::Char(c) = stream.peek(0) {
            out.push(c);
            stream.advance(c.len_utf8());
        }
        out
    }

    #[test]
    fn split_multibyte_sequences() {
        let text = "a { content: \"é€\" }";
        let bytes = text.as_bytes();
        for split in 0..bytes.len() {
            let mut stream = InputStream::new(None, CharsetSource::Default).unwrap();
            stream.append(&bytes[..split]).unwrap();
            stream.append(&bytes[split..]).unwrap();
            stream.close().unwrap();
            assert_eq!(collect(&mut stream), text);
        }
    }

    #[test]
    fn newlines_are_normalised() {
        let mut stream = InputStream::new(None, CharsetSource::Default).unwrap();
        stream.append(b"a\r").unwrap();
        assert_eq!(stream.peek(0), Peek::Char('a'));
        assert_eq!(stream.peek(1), Peek::NeedData);
        stream.append(b"\nb\rc\x0Cd\0").unwrap();
        stream.close().unwrap();
        assert_eq!(collect(&mut stream), "a\nb\nc\nd\u{FFFD}");
        assert_eq!(stream.peek(0), Peek::Eof);
    }

    #[test]
    fn charset_rule_is_detected() {
        let mut stream = InputStream::new(None, CharsetSource::Default).unwrap();
        stream.append(b"@charset \"iso-8859").unwrap();
        assert_eq!(stream.peek(0), Peek::NeedData);
        stream.append(b"-1\"; a{content:\"\xE9\"}").unwrap();
        stream.close().unwrap();
        assert_eq!(stream.read_charset(), ("windows-1252", CharsetSource::Document));
        assert!(collect(&mut stream).ends_with("\"é\"}"));
    }

    #[test]
    fn dictated_charset_wins() {
        let mut stream = InputStream::new(Some("utf-8"), CharsetSource::Dictated).unwrap();
        stream.append(b"@charset \"latin1\";").unwrap();
        stream.close().unwrap();
        assert_eq!(stream.read_charset(), ("UTF-8", CharsetSource::Dictated));
    }

    #[test]
    fn bom_is_removed() {
        let mut stream = InputStream::new(Some("latin1"), CharsetSource::Referred).unwrap();
        stream.append(&[0xEF, 0xBB, 0xBF, b'a']).unwrap();
        stream.close().unwrap();
        assert_eq!(stream.read_charset(), ("UTF-8", CharsetSource::Document));
        assert_eq!(collect(&mut stream), "a");
    }

    #[test]
    fn unknown_charset_is_rejected() {
        assert!(matches!(
            InputStream::new(Some("klingon"), CharsetSource::Metadata),
            Err(CssError::Charset(_))
        ));
    }

    #[test]
    fn append_after_close_fails() {
        let mut stream = InputStream::new(None, CharsetSource::Default).unwrap();
        stream.close().unwrap();
        assert!(stream.append(b"a").is_err());
    }
}
