//! Building blocks shared by the property compilers

use sheen_shared::fixed::Fixed;
use sheen_shared::intern::Istr;

use crate::colors::named_colour;
use crate::errors::{CssError, CssResult};
use crate::parser::Token;
use crate::properties::bytecode::{Sink, StyleBuilder};
use crate::properties::{CompileContext, Property};
use crate::tokenizer::TokenKind;
use crate::values::{ColorValue, Dimension, Keyword, Unit};

/// Walks the tokens of a declaration value
pub struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
    ctx: &'a mut CompileContext,
}

impl<'a> Cursor<'a> {
    pub fn new(ctx: &'a mut CompileContext, tokens: &'a [Token]) -> Self {
        Self { tokens, pos: 0, ctx }
    }

    pub fn quirks(&self) -> bool {
        self.ctx.quirks
    }

    /// Records that a quirks mode relaxation was needed to accept the value
    pub fn use_quirk(&mut self) {
        self.ctx.quirks_used = true;
    }

    pub fn intern(&self, text: &str) -> Istr {
        self.ctx.interner.intern(text)
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn rewind(&mut self, pos: usize) {
        self.pos = pos;
    }

    pub fn skip_whitespace(&mut self) {
        while self.tokens.get(self.pos).is_some_and(Token::is_whitespace) {
            self.pos += 1;
        }
    }

    /// The next token, whitespace included
    pub fn peek_raw(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    /// The next token that is not whitespace. Leading whitespace is consumed.
    pub fn peek(&mut self) -> Option<&'a Token> {
        self.skip_whitespace();
        self.tokens.get(self.pos)
    }

    /// Consumes the next token that is not whitespace
    pub fn next(&mut self) -> Option<&'a Token> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Like [`Cursor::next`], but running out of tokens makes the value invalid
    pub fn token(&mut self) -> CssResult<&'a Token> {
        self.next().ok_or(CssError::Invalid)
    }

    pub fn at_end(&mut self) -> bool {
        self.peek().is_none()
    }

    pub fn expect_end(&mut self) -> CssResult<()> {
        if self.at_end() {
            Ok(())
        } else {
            Err(CssError::Invalid)
        }
    }

    pub fn expect_char(&mut self, c: char) -> CssResult<()> {
        if self.eat_char(c) {
            Ok(())
        } else {
            Err(CssError::Invalid)
        }
    }

    /// Consumes the next token when it is the given character
    pub fn eat_char(&mut self, c: char) -> bool {
        if self.peek().is_some_and(|t| t.is_char(c)) {
            self.pos += 1;
            return true;
        }
        false
    }

    /// Consumes the next token when it is the given identifier
    pub fn eat_ident(&mut self, keyword: &str) -> bool {
        if self.peek().is_some_and(|t| t.is_ident(keyword)) {
            self.pos += 1;
            return true;
        }
        false
    }

    /// Consumes the next token when it is a keyword of `T`
    pub fn keyword<T: Keyword>(&mut self) -> Option<T> {
        let token = self.peek()?;
        if token.kind != TokenKind::Ident {
            return None;
        }
        let keyword = T::from_ident(&token.text)?;
        self.pos += 1;
        Some(keyword)
    }

    /// Runs a parse step, rewinding when it finds the value invalid. Other errors are passed on.
    pub fn attempt<T>(&mut self, step: impl FnOnce(&mut Self) -> CssResult<T>) -> CssResult<Option<T>> {
        let start = self.pos;
        match step(self) {
            Ok(value) => Ok(Some(value)),
            Err(CssError::Invalid) => {
                self.pos = start;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Returns true when the remaining tokens are exactly the keyword `inherit`
    pub fn is_inherit(&mut self) -> bool {
        let start = self.pos;
        let inherit = self.eat_ident("inherit") && self.at_end();
        self.pos = start;
        inherit
    }
}

/// Compiles a value into the builder
pub type Handler = fn(&mut Cursor<'_>, Property, &mut StyleBuilder) -> CssResult<()>;

/// Parses a single-valued property
pub type Parse = fn(&mut Cursor<'_>) -> CssResult<Declared>;

/// How a property value is compiled
#[derive(Clone, Copy)]
pub enum Compiler {
    /// A value tag with at most one operand
    Value(Parse),
    /// Everything else, lists in particular
    Custom(Handler),
}

/// Operand that follows a value tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    Fixed(Fixed),
    Dimension(Dimension),
    Colour(u32),
    String(Istr),
}

/// A parsed single-valued declaration: its value tag and operand
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declared {
    pub tag: u16,
    pub operand: Operand,
}

impl Declared {
    pub fn keyword<T: Keyword>(keyword: T) -> Self {
        Self::new(keyword.code(), Operand::None)
    }

    pub fn new(tag: u16, operand: Operand) -> Self {
        Self { tag, operand }
    }

    pub fn write(&self, property: Property, sink: &mut dyn Sink) -> CssResult<()> {
        sink.opv(property, self.tag)?;
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Fixed(value) => sink.fixed(*value),
            Operand::Dimension(dimension) => sink.dimension(*dimension),
            Operand::Colour(colour) => sink.word(*colour),
            Operand::String(string) => sink.string(string.clone()),
        }
    }
}

/// Parses a property whose values are all keywords of `T`
pub fn keyword<T: Keyword>(c: &mut Cursor<'_>) -> CssResult<Declared> {
    c.keyword::<T>().map(Declared::keyword).ok_or(CssError::Invalid)
}

/// Strips a trailing `! important` from a value. Returns the remaining tokens and whether the
/// marker was present.
pub fn parse_important(tokens: &[Token]) -> (&[Token], bool) {
    let mut significant = tokens.iter().enumerate().rev().filter(|(_, t)| !t.is_whitespace());

    let Some((_, last)) = significant.next() else {
        return (tokens, false);
    };
    if !last.is_ident("important") {
        return (tokens, false);
    }
    match significant.next() {
        Some((bang, t)) if t.is_char('!') => (&tokens[..bang], true),
        _ => (tokens, false),
    }
}

/// Families of units a dimension may have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    Length,
    LengthOrPercent,
    Angle,
    TimeOrPercent,
    Frequency,
}

impl Units {
    /// Unit of a unitless number
    fn default_unit(self) -> Unit {
        match self {
            Units::Length | Units::LengthOrPercent => Unit::Px,
            Units::Angle => Unit::Deg,
            Units::TimeOrPercent => Unit::Ms,
            Units::Frequency => Unit::Hz,
        }
    }

    fn allows(self, unit: Unit) -> bool {
        match self {
            Units::Length => unit.is_length(),
            Units::LengthOrPercent => unit.is_length() || unit == Unit::Pct,
            Units::Angle => unit.is_angle(),
            Units::TimeOrPercent => unit.is_time() || unit == Unit::Pct,
            Units::Frequency => unit.is_frequency(),
        }
    }
}

/// Parses a number without unit. The whole token must be numeric.
pub fn parse_number(c: &mut Cursor<'_>, int_only: bool) -> CssResult<Fixed> {
    let token = c.token()?;
    if token.kind != TokenKind::Number {
        return Err(CssError::Invalid);
    }
    let (value, consumed) = Fixed::parse(&token.text, int_only);
    if consumed == 0 || consumed != token.text.len() {
        return Err(CssError::Invalid);
    }
    Ok(value)
}

/// Parses a magnitude with its unit.
///
/// A unitless zero takes `default_unit`. In quirks mode a unitless non-zero number takes it as
/// well, and a unit may be separated from its number by whitespace.
pub fn parse_unit_specifier(c: &mut Cursor<'_>, default_unit: Unit) -> CssResult<Dimension> {
    let token = c.token()?;
    let (value, consumed) = Fixed::parse(&token.text, false);
    if consumed == 0 {
        return Err(CssError::Invalid);
    }
    let suffix = &token.text[consumed..];

    match token.kind {
        TokenKind::Dimension => {
            let unit = Unit::from_suffix(suffix).ok_or(CssError::Invalid)?;
            Ok(Dimension::new(value, unit))
        }
        TokenKind::Percentage if suffix == "%" => Ok(Dimension::new(value, Unit::Pct)),
        TokenKind::Number if suffix.is_empty() => {
            if c.quirks() {
                let after_number = c.position();
                if c.peek_raw().is_some_and(Token::is_whitespace) {
                    if let Some(unit) = c.next().filter(|t| t.kind == TokenKind::Ident).and_then(|t| Unit::from_suffix(&t.text)) {
                        c.use_quirk();
                        return Ok(Dimension::new(value, unit));
                    }
                }
                c.rewind(after_number);
            }

            if value.is_zero() {
                Ok(Dimension::new(value, default_unit))
            } else if c.quirks() {
                c.use_quirk();
                Ok(Dimension::new(value, default_unit))
            } else {
                Err(CssError::Invalid)
            }
        }
        _ => Err(CssError::Invalid),
    }
}

/// Parses a dimension from the given unit family, optionally rejecting negative values
pub fn parse_dimension(c: &mut Cursor<'_>, units: Units, negative: bool) -> CssResult<Dimension> {
    let dimension = parse_unit_specifier(c, units.default_unit())?;
    if !units.allows(dimension.unit) || (!negative && dimension.value.is_negative()) {
        return Err(CssError::Invalid);
    }
    Ok(dimension)
}

/// `<keyword> | <dimension>`: a keyword of `T`, or a dimension tagged with `set`
pub fn keyword_or_dimension<T: Keyword>(
    c: &mut Cursor<'_>,
    set: T,
    units: Units,
    negative: bool,
) -> CssResult<Declared> {
    if let Some(keyword) = c.keyword::<T>() {
        return Ok(Declared::keyword(keyword));
    }
    let dimension = parse_dimension(c, units, negative)?;
    Ok(Declared::new(set.code(), Operand::Dimension(dimension)))
}

/// `<uri> | none`
pub fn parse_uri_or_none<T: Keyword>(c: &mut Cursor<'_>, none: T, uri: T) -> CssResult<Declared> {
    let token = c.token()?;
    match token.kind {
        TokenKind::Ident if token.is_ident("none") => Ok(Declared::keyword(none)),
        TokenKind::Uri => Ok(Declared::new(uri.code(), Operand::String(token.text.clone()))),
        _ => Err(CssError::Invalid),
    }
}

/// Parses a colour. The keywords `transparent`, `currentColor` and `invert` are returned as such;
/// callers that do not accept them reject the value.
pub fn parse_colour(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let set = |rgb: u32| -> CssResult<Declared> {
        Ok(Declared::new(ColorValue::Set.code(), Operand::Colour(0xff00_0000 | rgb)))
    };

    let token = c.token()?;
    match token.kind {
        TokenKind::Ident => {
            if let Some(keyword) = ColorValue::from_ident(&token.text) {
                return Ok(Declared::keyword(keyword));
            }
            if let Some(colour) = named_colour(&token.text) {
                return Ok(Declared::new(ColorValue::Set.code(), Operand::Colour(colour)));
            }
            quirky_hex(c, token).map_or(Err(CssError::Invalid), set)
        }
        TokenKind::Hash => parse_hex(&token.text).map_or(Err(CssError::Invalid), set),
        TokenKind::Function if token.text.eq_ignore_ascii_case("rgb") => set(parse_rgb_arguments(c)?),
        TokenKind::Number | TokenKind::Dimension => quirky_hex(c, token).map_or(Err(CssError::Invalid), set),
        _ => Err(CssError::Invalid),
    }
}

/// Quirks mode accepts hex colours without the `#`
fn quirky_hex(c: &mut Cursor<'_>, token: &Token) -> Option<u32> {
    if !c.quirks() {
        return None;
    }
    let rgb = parse_hex(&token.text)?;
    c.use_quirk();
    Some(rgb)
}

/// Parses `rgb` or `rrggbb`
fn parse_hex(text: &str) -> Option<u32> {
    if !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let digits: Vec<u32> = text.chars().filter_map(|c| c.to_digit(16)).collect();
    match digits.as_slice() {
        [r, g, b] => Some((r * 17) << 16 | (g * 17) << 8 | (b * 17)),
        [r1, r2, g1, g2, b1, b2] => Some((r1 << 4 | r2) << 16 | (g1 << 4 | g2) << 8 | (b1 << 4 | b2)),
        _ => None,
    }
}

/// Parses the arguments of `rgb(` up to and including the closing parenthesis. All three
/// components must be numbers or all must be percentages; they are clamped to the valid range.
fn parse_rgb_arguments(c: &mut Cursor<'_>) -> CssResult<u32> {
    let mut rgb = 0;
    let mut percentages = None;

    for i in 0..3 {
        if i > 0 {
            c.expect_char(',')?;
        }

        let token = c.token()?;
        let is_percentage = match token.kind {
            TokenKind::Number => false,
            TokenKind::Percentage => true,
            _ => return Err(CssError::Invalid),
        };
        if *percentages.get_or_insert(is_percentage) != is_percentage {
            return Err(CssError::Invalid);
        }

        let (value, consumed) = Fixed::parse(&token.text, !is_percentage);
        let expected = token.text.len() - usize::from(is_percentage);
        if consumed == 0 || consumed != expected {
            return Err(CssError::Invalid);
        }

        let component = if is_percentage {
            (value * Fixed::from_int(255) / Fixed::from_int(100)).to_int()
        } else {
            value.to_int()
        };
        rgb = rgb << 8 | component.clamp(0, 255) as u32;
    }

    c.expect_char(')')?;
    Ok(rgb)
}

/// Joins a run of identifiers (`Times New Roman`) into one string. Returns `None` when the next
/// token is not an identifier.
pub fn parse_ident_list(c: &mut Cursor<'_>) -> Option<Istr> {
    let mut words: Vec<&str> = Vec::new();
    while let Some(token) = c.peek() {
        if token.kind != TokenKind::Ident {
            break;
        }
        words.push(&token.text);
        c.next();
    }

    if words.is_empty() {
        return None;
    }
    Some(c.intern(&words.join(" ")))
}

/// Runs a list compiler twice: once to measure the instruction, then to write it into a buffer
/// of exactly that size.
pub fn compile_list<F>(c: &mut Cursor<'_>, b: &mut StyleBuilder, mut emit: F) -> CssResult<()>
where
    F: FnMut(&mut Cursor<'_>, &mut dyn Sink) -> CssResult<()>,
{
    let start = c.position();
    let mut measure = crate::properties::bytecode::Measure::default();
    emit(c, &mut measure)?;
    b.reserve(measure.words)?;

    c.rewind(start);
    emit(c, b)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::parser::tokenize;
    use sheen_shared::intern::Interner;
    use test_case::test_case;

    pub(crate) fn tokens(css: &str) -> Vec<Token> {
        tokenize(css, &Interner::new()).unwrap()
    }

    fn with_cursor<T>(css: &str, quirks: bool, f: impl FnOnce(&mut Cursor<'_>) -> T) -> (T, bool) {
        let tokens = tokens(css);
        let mut ctx = CompileContext::new(Interner::new(), quirks);
        let result = {
            let mut cursor = Cursor::new(&mut ctx, &tokens);
            f(&mut cursor)
        };
        (result, ctx.quirks_used())
    }

    fn colour(css: &str, quirks: bool) -> Option<u32> {
        let (result, _) = with_cursor(css, quirks, |c| {
            let declared = parse_colour(c).ok()?;
            c.expect_end().ok()?;
            match declared.operand {
                Operand::Colour(rgb) => Some(rgb),
                _ => None,
            }
        });
        result
    }

    #[test_case("red", false, Some(0xffff0000); "named")]
    #[test_case("#0f8", false, Some(0xff00ff88); "short hex")]
    #[test_case("#102030", false, Some(0xff102030); "long hex")]
    #[test_case("#1234", false, None; "four hex digits")]
    #[test_case("rgb(255, 0, 10)", false, Some(0xffff000a); "rgb numbers")]
    #[test_case("rgb(300,-5,0)", false, Some(0xffff0000); "rgb numbers clamped")]
    #[test_case("rgb(100%, 50%, 0%)", false, Some(0xffff7f00); "rgb percentages")]
    #[test_case("rgb(100%, 0, 0)", false, None; "rgb mixed types")]
    #[test_case("rgb(1, 2)", false, None; "rgb too few components")]
    #[test_case("ff0000", false, None; "bare hex without quirks")]
    #[test_case("ff0000", true, Some(0xffff0000); "bare hex ident in quirks mode")]
    #[test_case("123456", true, Some(0xff123456); "bare hex number in quirks mode")]
    #[test_case("00ff00", true, Some(0xff00ff00); "bare hex dimension in quirks mode")]
    fn colours(css: &str, quirks: bool, expected: Option<u32>) {
        assert_eq!(colour(css, quirks), expected);
    }

    #[test]
    fn colour_keywords() {
        let (declared, _) = with_cursor("currentColor", false, |c| parse_colour(c).unwrap());
        assert_eq!(declared, Declared::keyword(ColorValue::CurrentColor));
    }

    #[test_case("12px", false, Some(("12", Unit::Px)), false; "length")]
    #[test_case("-1.5em", false, Some(("-1.5", Unit::Em)), false; "negative fraction")]
    #[test_case("50%", false, Some(("50", Unit::Pct)), false; "percentage")]
    #[test_case("0", false, Some(("0", Unit::Px)), false; "unitless zero")]
    #[test_case("12", false, None, false; "unitless number")]
    #[test_case("12", true, Some(("12", Unit::Px)), true; "unitless number in quirks mode")]
    #[test_case("12 px", true, Some(("12", Unit::Px)), true; "separated unit in quirks mode")]
    #[test_case("3furlongs", false, None, false; "unknown unit")]
    fn unit_specifiers(css: &str, quirks: bool, expected: Option<(&str, Unit)>, used: bool) {
        let (result, quirks_used) = with_cursor(css, quirks, |c| parse_unit_specifier(c, Unit::Px).ok());
        let expected = expected.map(|(value, unit)| Dimension::new(Fixed::parse(value, false).0, unit));
        assert_eq!(result, expected);
        assert_eq!(quirks_used, used);
    }

    #[test]
    fn dimension_families() {
        let (angle, _) = with_cursor("90deg", false, |c| parse_dimension(c, Units::Angle, true));
        assert!(angle.is_ok());
        let (length, _) = with_cursor("90deg", false, |c| parse_dimension(c, Units::Length, true));
        assert_eq!(length, Err(CssError::Invalid));
        let (negative, _) = with_cursor("-2px", false, |c| parse_dimension(c, Units::Length, false));
        assert_eq!(negative, Err(CssError::Invalid));
    }

    #[test]
    fn important_marker() {
        let run = tokens("red ! IMPORTANT ");
        let (rest, important) = parse_important(&run);
        assert!(important);
        assert_eq!(rest.len(), 2);

        let run = tokens("red important");
        assert!(!parse_important(&run).1);
    }

    #[test]
    fn ident_lists_are_joined() {
        let (name, _) = with_cursor("Times   New Roman, serif", false, |c| parse_ident_list(c));
        assert_eq!(name.as_deref(), Some("Times New Roman"));
    }

    #[test]
    fn attempt_rewinds_on_invalid() {
        let (result, _) = with_cursor("solid", false, |c| {
            let first = c.attempt(|c| parse_dimension(c, Units::Length, false)).unwrap();
            (first, c.position())
        });
        assert_eq!(result, (None, 0));
    }

    #[test_case("2s", Units::TimeOrPercent, Some(Unit::S); "time")]
    #[test_case("50%", Units::TimeOrPercent, Some(Unit::Pct); "time percentage")]
    #[test_case("0", Units::TimeOrPercent, Some(Unit::Ms); "unitless zero time")]
    #[test_case("2px", Units::TimeOrPercent, None; "length is no time")]
    #[test_case("0", Units::Angle, Some(Unit::Deg); "unitless zero angle")]
    #[test_case("10%", Units::Length, None; "percentage is no length")]
    #[test_case("3khz", Units::Frequency, Some(Unit::Khz); "frequency")]
    fn unit_families(css: &str, units: Units, expected: Option<Unit>) {
        let (result, _) = with_cursor(css, false, |c| parse_dimension(c, units, false));
        assert_eq!(result.ok().map(|d| d.unit), expected);
    }
}
