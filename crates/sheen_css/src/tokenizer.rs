//! CSS 2.1 tokenizer
//!
//! The tokenizer is an explicit state machine. Every token category has its own state, and states
//! that span more than one character keep a substate and a per-token context. When the input
//! stream runs dry in the middle of a token, [`Tokenizer::next_token`] returns
//! [`Lexed::NeedData`] and keeps all of that; the next call re-enters the same substate and only
//! reads the part of the token it has not consumed yet.
//!
//! The input stream is never advanced while a token is being recognised. Once a token is emitted,
//! its bytes are skipped at the start of the next call, so the emitted token can still refer to
//! its text in the stream (see [`RawToken::text`]).

use std::fmt;

use sheen_shared::location::Location;

use crate::input::{InputStream, Peek};

/// Token categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    /// Text does not include the `@`
    AtKeyword,
    /// Text does not include the `#`
    Hash,
    /// Text does not include the `(`
    Function,
    /// Text does not include the quotes
    String,
    /// A string that was broken by a newline
    InvalidString,
    /// Text is the url without the `url(`, `)`, quotes and surrounding whitespace
    Uri,
    UnicodeRange,
    /// Any single character that is not part of another token (including `{ } ( ) [ ] ; : ,`)
    Char(char),
    Number,
    Percentage,
    /// Text includes the number and the unit
    Dimension,
    /// `<!--`
    Cdo,
    /// `-->`
    Cdc,
    Whitespace,
    Comment,
    /// `~=`
    Includes,
    /// `|=`
    DashMatch,
    /// `^=`
    PrefixMatch,
    /// `$=`
    SuffixMatch,
    /// `*=`
    SubstringMatch,
    Eof,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Char(c) => write!(f, "CHAR({c})"),
            TokenKind::Ident => write!(f, "IDENT"),
            TokenKind::AtKeyword => write!(f, "ATKEYWORD"),
            TokenKind::Hash => write!(f, "HASH"),
            TokenKind::Function => write!(f, "FUNCTION"),
            TokenKind::String => write!(f, "STRING"),
            TokenKind::InvalidString => write!(f, "INVALID_STRING"),
            TokenKind::Uri => write!(f, "URI"),
            TokenKind::UnicodeRange => write!(f, "UNICODE-RANGE"),
            TokenKind::Number => write!(f, "NUMBER"),
            TokenKind::Percentage => write!(f, "PERCENTAGE"),
            TokenKind::Dimension => write!(f, "DIMENSION"),
            TokenKind::Cdo => write!(f, "CDO"),
            TokenKind::Cdc => write!(f, "CDC"),
            TokenKind::Whitespace => write!(f, "S"),
            TokenKind::Comment => write!(f, "COMMENT"),
            TokenKind::Includes => write!(f, "INCLUDES"),
            TokenKind::DashMatch => write!(f, "DASHMATCH"),
            TokenKind::PrefixMatch => write!(f, "PREFIXMATCH"),
            TokenKind::SuffixMatch => write!(f, "SUFFIXMATCH"),
            TokenKind::SubstringMatch => write!(f, "SUBSTRINGMATCH"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenData {
    /// View into the input stream, relative to the start of the token
    Slice { offset: usize, len: usize },
    /// Unescaped copy
    Owned(String),
}

/// A token as produced by the tokenizer. Its text is a view into the input stream, unless an
/// escape sequence forced an unescaped copy. The view is valid until the next call to
/// [`Tokenizer::next_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawToken {
    pub kind: TokenKind,
    pub location: Location,
    data: TokenData,
}

impl RawToken {
    /// Returns the text of the token
    #[must_use]
    pub fn text<'a>(&'a self, input: &'a InputStream) -> &'a str {
        match &self.data {
            TokenData::Slice { offset, len } => input.slice(*offset, *len),
            TokenData::Owned(s) => s.as_str(),
        }
    }

    /// Returns true when the text had to be copied because of escape sequences
    #[must_use]
    pub fn is_unescaped_copy(&self) -> bool {
        matches!(self.data, TokenData::Owned(_))
    }
}

/// Result of asking the tokenizer for a token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lexed {
    Token(RawToken),
    /// More input is required to finish the current token. Call again after appending data.
    NeedData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    AtKeyword,
    String,
    Hash,
    Number,
    Cdo,
    Cdc,
    Comment,
    Ident,
    Uri,
    UnicodeRange,
    Whitespace,
    MatchOp,
}

// Substates of the number state
const NUMBER_INTEGER: u8 = 0;
const NUMBER_FRACTION: u8 = 1;
const NUMBER_SUFFIX: u8 = 2;
const NUMBER_UNIT: u8 = 3;

// Substates of the hash state
const HASH_START: u8 = 0;
const HASH_NAME: u8 = 1;

// Substates of the comment state
const COMMENT_OPEN: u8 = 0;
const COMMENT_BODY: u8 = 1;

// Substates of the uri state
const URI_PREFIX: u8 = 0;
const URI_LEADING_SPACE: u8 = 1;
const URI_BODY_START: u8 = 2;
const URI_QUOTED: u8 = 3;
const URI_UNQUOTED: u8 = 4;
const URI_TRAILING_SPACE: u8 = 5;

// Substates of the unicode-range state
const RANGE_START: u8 = 0;
const RANGE_END: u8 = 1;

// Substates of the at-keyword state
const ATKEYWORD_START: u8 = 0;
const ATKEYWORD_NAME: u8 = 1;

/// Signals that the stream ran dry in the middle of a token
struct NeedData;

type Resume<T> = Result<T, NeedData>;

/// Outcome of running one state
enum Step {
    Emit(TokenKind),
    /// The consumed text is dropped (comments, when they are not emitted)
    Skip,
    /// The state changed, run the machine again
    Continue,
    NeedData,
}

impl From<NeedData> for Step {
    fn from(_: NeedData) -> Self {
        Step::NeedData
    }
}

/// Scratch space for the token being recognised
#[derive(Debug, Default, Clone)]
struct Context {
    /// Opening quote of a string, or the first character of a match operator
    first: char,
    /// Number of digits read in a number
    digits: usize,
    /// Number of digits read in the current part of a unicode range
    hex_count: usize,
    /// A `?` was used in the unicode range
    wildcard: bool,
    /// The last character inside a comment was a `*`
    last_was_star: bool,
}

/// Tokenizer configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenizerConfig {
    /// When false, comments are dropped and the next real token is returned instead
    pub emit_comments: bool,
}

pub struct Tokenizer {
    state: State,
    substate: u8,
    context: Context,
    config: TokenizerConfig,
    /// Bytes of input read for the current token
    bytes_read: usize,
    /// Bytes of the previously emitted token, skipped at the start of the next call
    pending_advance: usize,
    /// Location of the start of the current token
    token_start: Location,
    /// Location of the first byte that has not been consumed
    location: Location,
    /// Start of the token data, relative to the start of the token
    data_offset: usize,
    /// Length of the token data when no unescaped copy exists
    data_len: usize,
    /// An escape sequence was seen; token data lives in `unescaped`
    escape_seen: bool,
    unescaped: String,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

impl Tokenizer {
    #[must_use]
    pub fn new(config: TokenizerConfig) -> Self {
        Self::with_location(config, Location::default())
    }

    /// Creates a tokenizer that reports locations starting at the given location
    #[must_use]
    pub fn with_location(config: TokenizerConfig, location: Location) -> Self {
        Self {
            state: State::Start,
            substate: 0,
            context: Context::default(),
            config,
            bytes_read: 0,
            pending_advance: 0,
            token_start: location,
            location,
            data_offset: 0,
            data_len: 0,
            escape_seen: false,
            unescaped: String::new(),
        }
    }

    pub fn configure(&mut self, config: TokenizerConfig) {
        self.config = config;
    }

    /// Location of the next character to be tokenized
    #[must_use]
    pub fn current_location(&self) -> Location {
        self.location
    }

    /// Returns the next token, or [`Lexed::NeedData`] when the stream does not hold enough data
    /// to finish it.
    pub fn next_token(&mut self, input: &mut InputStream) -> Lexed {
        if self.pending_advance > 0 {
            input.advance(self.pending_advance);
            self.pending_advance = 0;
        }

        loop {
            let step = match self.state {
                State::Start => self.start(input),
                State::AtKeyword => self.at_keyword(input),
                State::String => self.string(input),
                State::Hash => self.hash(input),
                State::Number => self.number(input),
                State::Cdo => self.cdo(input),
                State::Cdc => self.cdc(input),
                State::Comment => self.comment(input),
                State::Ident => self.ident(input),
                State::Uri => self.uri(input),
                State::UnicodeRange => self.unicode_range(input),
                State::Whitespace => self.whitespace(input),
                State::MatchOp => self.match_op(input),
            };

            match step {
                Step::Emit(kind) => {
                    let token = self.emit(kind, input);
                    log::trace!("token: {} at {}", token.kind, token.location);
                    return Lexed::Token(token);
                }
                Step::Skip => self.skip(input),
                Step::Continue => {}
                Step::NeedData => return Lexed::NeedData,
            }
        }
    }

    fn at(&self, input: &InputStream, offset: usize) -> Peek {
        input.peek(offset)
    }

    fn transition(&mut self, state: State, substate: u8) -> Step {
        self.state = state;
        self.substate = substate;
        Step::Continue
    }

    fn start(&mut self, input: &InputStream) -> Step {
        self.token_start = self.location;
        self.context = Context::default();
        self.data_offset = 0;
        self.data_len = 0;

        let c = match self.at(input, 0) {
            Peek::NeedData => return Step::NeedData,
            Peek::Eof => return Step::Emit(TokenKind::Eof),
            Peek::Char(c) => c,
        };

        match c {
            '@' => {
                self.bytes_read = 1;
                self.data_offset = 1;
                self.transition(State::AtKeyword, ATKEYWORD_START)
            }
            '"' | '\'' => {
                self.context.first = c;
                self.bytes_read = 1;
                self.data_offset = 1;
                self.transition(State::String, 0)
            }
            '#' => {
                self.bytes_read = 1;
                self.data_offset = 1;
                self.transition(State::Hash, HASH_START)
            }
            '0'..='9' | '.' | '+' => self.transition(State::Number, NUMBER_INTEGER),
            '<' => {
                self.bytes_read = 1;
                self.transition(State::Cdo, 0)
            }
            '-' => {
                self.bytes_read = 1;
                self.data_len = 1;
                self.transition(State::Cdc, 0)
            }
            '/' => {
                self.bytes_read = 1;
                self.transition(State::Comment, COMMENT_OPEN)
            }
            'u' | 'U' => {
                self.bytes_read = 1;
                self.data_len = 1;
                self.transition(State::Uri, URI_PREFIX)
            }
            '~' | '|' | '^' | '$' | '*' => {
                self.context.first = c;
                self.bytes_read = 1;
                self.transition(State::MatchOp, 0)
            }
            '\\' => match self.at(input, 1) {
                Peek::NeedData => Step::NeedData,
                Peek::Char('\n') | Peek::Eof => self.emit_char(c),
                Peek::Char(_) => self.transition(State::Ident, 0),
            },
            c if is_space(c) => self.transition(State::Whitespace, 0),
            c if is_nmstart(c) => self.transition(State::Ident, 0),
            c => self.emit_char(c),
        }
    }

    fn at_keyword(&mut self, input: &mut InputStream) -> Step {
        if self.substate == ATKEYWORD_START {
            match self.starts_ident(input, self.bytes_read) {
                Err(NeedData) => return Step::NeedData,
                Ok(false) => return self.emit_char('@'),
                Ok(true) => self.substate = ATKEYWORD_NAME,
            }
        }

        if let Err(NeedData) = self.consume_nmchars(input) {
            return Step::NeedData;
        }
        Step::Emit(TokenKind::AtKeyword)
    }

    fn string(&mut self, input: &mut InputStream) -> Step {
        let quote = self.context.first;
        loop {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                // Unterminated strings at the end of the input are accepted as they are
                Peek::Eof => return Step::Emit(TokenKind::String),
                Peek::Char('\n') => return Step::Emit(TokenKind::InvalidString),
                Peek::Char(c) if c == quote => {
                    self.bytes_read += 1;
                    return Step::Emit(TokenKind::String);
                }
                Peek::Char('\\') => match self.at(input, self.bytes_read + 1) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Eof => {
                        // A lone backslash at the end of the input is dropped
                        self.begin_unescaped(input);
                        self.bytes_read += 1;
                    }
                    Peek::Char(_) => {
                        if let Err(NeedData) = self.consume_escape(input, true) {
                            return Step::NeedData;
                        }
                    }
                },
                Peek::Char(c) => self.append_char(c),
            }
        }
    }

    fn hash(&mut self, input: &mut InputStream) -> Step {
        if self.substate == HASH_START {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('\\') => match self.at(input, self.bytes_read + 1) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Char('\n') | Peek::Eof => return self.emit_char('#'),
                    Peek::Char(_) => {}
                },
                Peek::Char(c) if is_nmchar(c) => {}
                _ => return self.emit_char('#'),
            }
            self.substate = HASH_NAME;
        }

        if let Err(NeedData) = self.consume_nmchars(input) {
            return Step::NeedData;
        }
        Step::Emit(TokenKind::Hash)
    }

    fn number(&mut self, input: &mut InputStream) -> Step {
        if self.substate == NUMBER_INTEGER {
            if self.bytes_read == 0 && self.at(input, 0) == Peek::Char('+') {
                match self.signed_number_follows(input, 1) {
                    Err(NeedData) => return Step::NeedData,
                    Ok(false) => return self.emit_char('+'),
                    Ok(true) => {
                        self.bytes_read = 1;
                        self.data_len = 1;
                    }
                }
            }

            if let Err(NeedData) = self.consume_digits(input) {
                return Step::NeedData;
            }

            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('.') => match self.at(input, self.bytes_read + 1) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Char(c) if c.is_ascii_digit() => {
                        self.append_char('.');
                        self.substate = NUMBER_FRACTION;
                    }
                    _ if self.context.digits == 0 => return self.emit_char('.'),
                    _ => self.substate = NUMBER_SUFFIX,
                },
                _ => self.substate = NUMBER_SUFFIX,
            }
        }

        if self.substate == NUMBER_FRACTION {
            if let Err(NeedData) = self.consume_digits(input) {
                return Step::NeedData;
            }
            self.substate = NUMBER_SUFFIX;
        }

        if self.substate == NUMBER_SUFFIX {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('%') => {
                    self.append_char('%');
                    return Step::Emit(TokenKind::Percentage);
                }
                _ => {}
            }

            match self.starts_ident(input, self.bytes_read) {
                Err(NeedData) => return Step::NeedData,
                Ok(false) => return Step::Emit(TokenKind::Number),
                Ok(true) => self.substate = NUMBER_UNIT,
            }
        }

        if let Err(NeedData) = self.consume_nmchars(input) {
            return Step::NeedData;
        }
        Step::Emit(TokenKind::Dimension)
    }

    fn cdo(&mut self, input: &mut InputStream) -> Step {
        for (i, expected) in ['!', '-', '-'].into_iter().enumerate() {
            match self.at(input, 1 + i) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char(c) if c == expected => {}
                _ => return self.emit_char('<'),
            }
        }
        self.bytes_read = 4;
        Step::Emit(TokenKind::Cdo)
    }

    /// Entered after a `-`: CDC, identifier, number or a lone `-`
    fn cdc(&mut self, input: &mut InputStream) -> Step {
        match self.at(input, 1) {
            Peek::NeedData => Step::NeedData,
            Peek::Char('-') => match self.at(input, 2) {
                Peek::NeedData => Step::NeedData,
                Peek::Char('>') => {
                    self.bytes_read = 3;
                    Step::Emit(TokenKind::Cdc)
                }
                _ => {
                    self.bytes_read = 2;
                    self.data_len = 2;
                    self.transition(State::Ident, 0)
                }
            },
            Peek::Char(c) if c.is_ascii_digit() => self.transition(State::Number, NUMBER_INTEGER),
            Peek::Char('.') => match self.at(input, 2) {
                Peek::NeedData => Step::NeedData,
                Peek::Char(c) if c.is_ascii_digit() => self.transition(State::Number, NUMBER_INTEGER),
                _ => self.emit_char('-'),
            },
            _ => match self.starts_ident(input, 1) {
                Err(NeedData) => Step::NeedData,
                Ok(true) => self.transition(State::Ident, 0),
                Ok(false) => self.emit_char('-'),
            },
        }
    }

    fn comment(&mut self, input: &mut InputStream) -> Step {
        if self.substate == COMMENT_OPEN {
            match self.at(input, 1) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('*') => {
                    self.bytes_read = 2;
                    self.substate = COMMENT_BODY;
                }
                _ => return self.emit_char('/'),
            }
        }

        loop {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                // Unterminated comments run until the end of the input
                Peek::Eof => break,
                Peek::Char(c) => {
                    self.bytes_read += c.len_utf8();
                    if c == '/' && self.context.last_was_star {
                        break;
                    }
                    self.context.last_was_star = c == '*';
                }
            }
        }

        if self.config.emit_comments {
            self.data_offset = 0;
            self.data_len = self.bytes_read;
            Step::Emit(TokenKind::Comment)
        } else {
            Step::Skip
        }
    }

    fn ident(&mut self, input: &mut InputStream) -> Step {
        if let Err(NeedData) = self.consume_nmchars(input) {
            return Step::NeedData;
        }

        match self.at(input, self.bytes_read) {
            Peek::NeedData => Step::NeedData,
            Peek::Char('(') => {
                self.bytes_read += 1;
                Step::Emit(TokenKind::Function)
            }
            _ => Step::Emit(TokenKind::Ident),
        }
    }

    /// Entered after a `u` or `U`: url, unicode range or identifier
    fn uri(&mut self, input: &mut InputStream) -> Step {
        if self.substate == URI_PREFIX {
            match self.at(input, 1) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('+') => match self.at(input, 2) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Char(c) if c.is_ascii_hexdigit() || c == '?' => {
                        self.bytes_read = 2;
                        self.data_len = 2;
                        return self.transition(State::UnicodeRange, RANGE_START);
                    }
                    _ => return self.transition(State::Ident, 0),
                },
                Peek::Char('r' | 'R') => {}
                _ => return self.transition(State::Ident, 0),
            }
            match self.at(input, 2) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('l' | 'L') => {}
                _ => return self.transition(State::Ident, 0),
            }
            match self.at(input, 3) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('(') => {}
                _ => return self.transition(State::Ident, 0),
            }

            self.bytes_read = 4;
            self.substate = URI_LEADING_SPACE;
        }

        if self.substate == URI_LEADING_SPACE {
            if let Err(NeedData) = self.skip_space(input) {
                return Step::NeedData;
            }
            self.substate = URI_BODY_START;
        }

        if self.substate == URI_BODY_START {
            self.data_offset = self.bytes_read;
            self.data_len = 0;
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                Peek::Eof => return Step::Emit(TokenKind::Uri),
                Peek::Char(c @ ('"' | '\'')) => {
                    self.context.first = c;
                    self.bytes_read += 1;
                    self.data_offset = self.bytes_read;
                    self.substate = URI_QUOTED;
                }
                Peek::Char(_) => self.substate = URI_UNQUOTED,
            }
        }

        if self.substate == URI_QUOTED {
            let quote = self.context.first;
            loop {
                match self.at(input, self.bytes_read) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Eof => return Step::Emit(TokenKind::Uri),
                    Peek::Char('\n') => return self.rollback_to_function(),
                    Peek::Char(c) if c == quote => {
                        self.bytes_read += 1;
                        self.substate = URI_TRAILING_SPACE;
                        break;
                    }
                    Peek::Char('\\') => match self.at(input, self.bytes_read + 1) {
                        Peek::NeedData => return Step::NeedData,
                        Peek::Eof => return Step::Emit(TokenKind::Uri),
                        Peek::Char(_) => {
                            if let Err(NeedData) = self.consume_escape(input, true) {
                                return Step::NeedData;
                            }
                        }
                    },
                    Peek::Char(c) => self.append_char(c),
                }
            }
        }

        if self.substate == URI_UNQUOTED {
            loop {
                match self.at(input, self.bytes_read) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Eof => return Step::Emit(TokenKind::Uri),
                    Peek::Char(')') => {
                        self.bytes_read += 1;
                        return Step::Emit(TokenKind::Uri);
                    }
                    Peek::Char(c) if is_space(c) => {
                        self.substate = URI_TRAILING_SPACE;
                        break;
                    }
                    Peek::Char('\\') => match self.consume_escape(input, false) {
                        Err(NeedData) => return Step::NeedData,
                        Ok(true) => {}
                        Ok(false) => return self.rollback_to_function(),
                    },
                    Peek::Char(c) if is_urlchar(c) => self.append_char(c),
                    Peek::Char(_) => return self.rollback_to_function(),
                }
            }
        }

        if let Err(NeedData) = self.skip_space(input) {
            return Step::NeedData;
        }
        match self.at(input, self.bytes_read) {
            Peek::NeedData => Step::NeedData,
            Peek::Eof => Step::Emit(TokenKind::Uri),
            Peek::Char(')') => {
                self.bytes_read += 1;
                Step::Emit(TokenKind::Uri)
            }
            Peek::Char(_) => self.rollback_to_function(),
        }
    }

    fn unicode_range(&mut self, input: &mut InputStream) -> Step {
        if self.substate == RANGE_START {
            loop {
                match self.at(input, self.bytes_read) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Char(c) if self.context.hex_count < 6 && (c.is_ascii_hexdigit() || c == '?') => {
                        self.context.wildcard |= c == '?';
                        self.context.hex_count += 1;
                        self.append_char(c);
                    }
                    _ => break,
                }
            }

            if self.context.wildcard {
                return Step::Emit(TokenKind::UnicodeRange);
            }

            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char('-') => match self.at(input, self.bytes_read + 1) {
                    Peek::NeedData => return Step::NeedData,
                    Peek::Char(c) if c.is_ascii_hexdigit() => {
                        self.append_char('-');
                        self.context.hex_count = 0;
                        self.substate = RANGE_END;
                    }
                    _ => return Step::Emit(TokenKind::UnicodeRange),
                },
                _ => return Step::Emit(TokenKind::UnicodeRange),
            }
        }

        loop {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Step::NeedData,
                Peek::Char(c) if self.context.hex_count < 6 && c.is_ascii_hexdigit() => {
                    self.context.hex_count += 1;
                    self.append_char(c);
                }
                _ => return Step::Emit(TokenKind::UnicodeRange),
            }
        }
    }

    fn whitespace(&mut self, input: &mut InputStream) -> Step {
        if let Err(NeedData) = self.skip_space(input) {
            return Step::NeedData;
        }
        self.data_offset = 0;
        self.data_len = self.bytes_read;
        Step::Emit(TokenKind::Whitespace)
    }

    fn match_op(&mut self, input: &mut InputStream) -> Step {
        match self.at(input, 1) {
            Peek::NeedData => Step::NeedData,
            Peek::Char('=') => {
                self.bytes_read = 2;
                self.data_len = 2;
                Step::Emit(match self.context.first {
                    '~' => TokenKind::Includes,
                    '|' => TokenKind::DashMatch,
                    '^' => TokenKind::PrefixMatch,
                    '$' => TokenKind::SuffixMatch,
                    _ => TokenKind::SubstringMatch,
                })
            }
            _ => self.emit_char(self.context.first),
        }
    }

    /// Rolls a malformed `url(` back to a plain function token
    fn rollback_to_function(&mut self) -> Step {
        self.bytes_read = 4;
        self.data_offset = 0;
        self.data_len = 3;
        self.escape_seen = false;
        self.unescaped.clear();
        Step::Emit(TokenKind::Function)
    }

    /// Emits a single character token; anything read beyond it is given back
    fn emit_char(&mut self, c: char) -> Step {
        self.bytes_read = c.len_utf8();
        self.data_offset = 0;
        self.data_len = self.bytes_read;
        self.escape_seen = false;
        self.unescaped.clear();
        Step::Emit(TokenKind::Char(c))
    }

    /// Checks whether an identifier starts at the given offset: `-`? followed by a name start
    /// character or a valid escape.
    fn starts_ident(&self, input: &InputStream, offset: usize) -> Resume<bool> {
        let (c, offset) = match self.at(input, offset) {
            Peek::NeedData => return Err(NeedData),
            Peek::Eof => return Ok(false),
            Peek::Char('-') => match self.at(input, offset + 1) {
                Peek::NeedData => return Err(NeedData),
                Peek::Eof => return Ok(false),
                Peek::Char(c) => (c, offset + 1),
            },
            Peek::Char(c) => (c, offset),
        };

        if c == '\\' {
            return match self.at(input, offset + 1) {
                Peek::NeedData => Err(NeedData),
                Peek::Char('\n') | Peek::Eof => Ok(false),
                Peek::Char(_) => Ok(true),
            };
        }

        Ok(is_nmstart(c))
    }

    /// Checks that a digit, or a dot followed by a digit, starts at the given offset
    fn signed_number_follows(&self, input: &InputStream, offset: usize) -> Resume<bool> {
        match self.at(input, offset) {
            Peek::NeedData => Err(NeedData),
            Peek::Char(c) if c.is_ascii_digit() => Ok(true),
            Peek::Char('.') => match self.at(input, offset + 1) {
                Peek::NeedData => Err(NeedData),
                Peek::Char(c) => Ok(c.is_ascii_digit()),
                Peek::Eof => Ok(false),
            },
            _ => Ok(false),
        }
    }

    fn consume_digits(&mut self, input: &InputStream) -> Resume<()> {
        loop {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Err(NeedData),
                Peek::Char(c) if c.is_ascii_digit() => {
                    self.context.digits += 1;
                    self.append_char(c);
                }
                _ => return Ok(()),
            }
        }
    }

    fn skip_space(&mut self, input: &InputStream) -> Resume<()> {
        loop {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Err(NeedData),
                Peek::Char(c) if is_space(c) => self.bytes_read += 1,
                _ => return Ok(()),
            }
        }
    }

    /// Consumes name characters and escapes into the token data
    fn consume_nmchars(&mut self, input: &InputStream) -> Resume<()> {
        loop {
            match self.at(input, self.bytes_read) {
                Peek::NeedData => return Err(NeedData),
                Peek::Char('\\') => {
                    if !self.consume_escape(input, false)? {
                        return Ok(());
                    }
                }
                Peek::Char(c) if is_nmchar(c) => self.append_char(c),
                _ => return Ok(()),
            }
        }
    }

    /// Consumes the escape sequence that starts at the current position. Nothing is consumed
    /// unless the complete sequence is available. Returns false when the backslash does not start
    /// an escape. In strings (`in_string`), a backslash followed by a newline is a line
    /// continuation and produces no data.
    fn consume_escape(&mut self, input: &InputStream, in_string: bool) -> Resume<bool> {
        let mut len = 1;
        let decoded = match self.at(input, self.bytes_read + 1) {
            Peek::NeedData => return Err(NeedData),
            Peek::Eof => return Ok(false),
            Peek::Char('\n') if in_string => {
                self.begin_unescaped(input);
                self.bytes_read += 2;
                return Ok(true);
            }
            Peek::Char('\n') => return Ok(false),
            Peek::Char(c) if c.is_ascii_hexdigit() => {
                let mut value: u32 = 0;
                let mut count = 0;
                loop {
                    match self.at(input, self.bytes_read + len) {
                        Peek::NeedData => return Err(NeedData),
                        Peek::Char(c) if count < 6 && c.is_ascii_hexdigit() => {
                            value = value * 16 + c.to_digit(16).unwrap_or(0);
                            count += 1;
                            len += 1;
                        }
                        Peek::Char(c) if is_space(c) => {
                            len += 1;
                            break;
                        }
                        _ => break,
                    }
                }

                match char::from_u32(value) {
                    Some('\0') | None => char::REPLACEMENT_CHARACTER,
                    Some(c) => c,
                }
            }
            Peek::Char(c) => {
                len += c.len_utf8();
                c
            }
        };

        self.begin_unescaped(input);
        self.unescaped.push(decoded);
        self.bytes_read += len;
        Ok(true)
    }

    /// Switches the token data to an owned copy, bringing along everything read so far
    fn begin_unescaped(&mut self, input: &InputStream) {
        if !self.escape_seen {
            self.escape_seen = true;
            self.unescaped.clear();
            self.unescaped.push_str(input.slice(self.data_offset, self.data_len));
        }
    }

    /// Consumes a literal character that belongs to the token data
    fn append_char(&mut self, c: char) {
        if self.escape_seen {
            self.unescaped.push(c);
        } else {
            self.data_len += c.len_utf8();
        }
        self.bytes_read += c.len_utf8();
    }

    fn emit(&mut self, kind: TokenKind, input: &InputStream) -> RawToken {
        let data = if self.escape_seen {
            TokenData::Owned(std::mem::take(&mut self.unescaped))
        } else {
            TokenData::Slice {
                offset: self.data_offset,
                len: self.data_len,
            }
        };

        let token = RawToken {
            kind,
            location: self.token_start,
            data,
        };

        self.location.advance(input.slice(0, self.bytes_read));
        self.pending_advance = self.bytes_read;
        self.reset();

        token
    }

    fn skip(&mut self, input: &mut InputStream) {
        self.location.advance(input.slice(0, self.bytes_read));
        input.advance(self.bytes_read);
        self.reset();
    }

    fn reset(&mut self) {
        self.state = State::Start;
        self.substate = 0;
        self.bytes_read = 0;
        self.data_offset = 0;
        self.data_len = 0;
        self.escape_seen = false;
    }
}

fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n')
}

fn is_nmstart(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || !c.is_ascii()
}

fn is_nmchar(c: char) -> bool {
    is_nmstart(c) || c.is_ascii_digit() || c == '-'
}

fn is_urlchar(c: char) -> bool {
    !c.is_ascii() || (c.is_ascii_graphic() && !matches!(c, '"' | '\'' | '(' | ')' | '\\'))
}
