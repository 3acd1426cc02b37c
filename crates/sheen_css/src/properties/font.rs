//! Font properties

use sheen_shared::intern::Istr;

use crate::errors::{CssError, CssResult};
use crate::properties::bytecode::{Sink, StyleBuilder};
use crate::properties::common::{
    compile_list, keyword_or_dimension, parse_dimension, parse_ident_list, parse_number, Cursor, Declared,
    Operand, Units,
};
use crate::properties::Property;
use crate::tokenizer::TokenKind;
use crate::values::{FontFamily, FontSize, FontWeight, Keyword, LineHeight};

pub fn parse_font_size(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, FontSize::Dimension, Units::LengthOrPercent, false)
}

/// The numeric weights are number tokens rather than identifiers
pub fn parse_font_weight(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let token = c.token()?;
    if !matches!(token.kind, TokenKind::Ident | TokenKind::Number) {
        return Err(CssError::Invalid);
    }
    FontWeight::from_ident(&token.text)
        .map(Declared::keyword)
        .ok_or(CssError::Invalid)
}

/// `normal | <number> | <length> | <percentage>`, none of them negative
pub fn parse_line_height(c: &mut Cursor<'_>) -> CssResult<Declared> {
    if c.eat_ident("normal") {
        return Ok(Declared::keyword(LineHeight::Normal));
    }

    if c.peek().is_some_and(|t| t.kind == TokenKind::Number) {
        let value = parse_number(c, false)?;
        if value.is_negative() {
            return Err(CssError::Invalid);
        }
        return Ok(Declared::new(LineHeight::Number.code(), Operand::Fixed(value)));
    }

    let dimension = parse_dimension(c, Units::LengthOrPercent, false)?;
    Ok(Declared::new(LineHeight::Dimension.code(), Operand::Dimension(dimension)))
}

/// One entry of a font-family or voice-family list: a quoted name, a generic family or a run of
/// identifiers
fn family_item<T: Keyword>(c: &mut Cursor<'_>, string: T, ident_list: T) -> CssResult<(u16, Option<Istr>)> {
    let token = c.peek().ok_or(CssError::Invalid)?;
    if token.kind == TokenKind::String {
        c.next();
        return Ok((string.code(), Some(token.text.clone())));
    }

    let name = parse_ident_list(c).ok_or(CssError::Invalid)?;
    if name.eq_ignore_ascii_case("inherit") {
        return Err(CssError::Invalid);
    }
    match T::from_ident(&name) {
        Some(generic) if !name.contains(' ') => Ok((generic.code(), None)),
        _ => Ok((ident_list.code(), Some(name))),
    }
}

/// Writes a comma separated family list. The header carries the first entry, every further entry
/// gets its own word and a zero word ends the list.
pub fn family_list<T: Keyword>(
    c: &mut Cursor<'_>,
    property: Property,
    sink: &mut dyn Sink,
    string: T,
    ident_list: T,
) -> CssResult<()> {
    let mut first = true;
    loop {
        let (code, name) = family_item(c, string, ident_list)?;
        if first {
            sink.opv(property, code)?;
            first = false;
        } else {
            sink.word(u32::from(code))?;
        }
        if let Some(name) = name {
            sink.string(name)?;
        }

        if !c.eat_char(',') {
            break;
        }
    }
    sink.word(0)
}

pub fn font_family(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    compile_list(c, b, |c, sink| {
        family_list(c, property, sink, FontFamily::String, FontFamily::IdentList)
    })
}

#[cfg(test)]
mod tests {
    use crate::properties::tests::{compiled, compiled_style, dimension_words, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    #[test]
    fn family_lists() {
        let style = compiled_style("font-family", "\"Gill Sans\", Times  New Roman, serif").unwrap();
        assert_eq!(
            style.bytecode(),
            &[
                header(Property::FontFamily, FontFamily::String.code()),
                0,
                u32::from(FontFamily::IdentList.code()),
                1,
                u32::from(FontFamily::Serif.code()),
                0,
            ]
        );
        let names: Vec<&str> = style.strings().iter().map(|s| s.as_str()).collect();
        assert_eq!(names, ["Gill Sans", "Times New Roman"]);
    }

    #[test]
    fn generic_keywords_only_stand_alone() {
        let style = compiled_style("font-family", "sans-serif serif").unwrap();
        assert_eq!(style.bytecode()[0], header(Property::FontFamily, FontFamily::IdentList.code()));
        assert_eq!(style.strings()[0].as_str(), "sans-serif serif");
    }

    #[test_case("a,"; "trailing comma")]
    #[test_case(", a"; "leading comma")]
    #[test_case("a, 12px"; "dimension in list")]
    #[test_case("serif, inherit"; "inherit in list")]
    fn invalid_family_lists(value: &str) {
        assert!(compiled("font-family", value).is_err());
    }

    #[test_case("bold", FontWeight::Bold)]
    #[test_case("100", FontWeight::W100)]
    #[test_case("LIGHTER", FontWeight::Lighter)]
    fn weights(value: &str, expected: FontWeight) {
        assert_eq!(compiled("font-weight", value), Ok(vec![header(Property::FontWeight, expected.code())]));
    }

    #[test]
    fn invalid_weights() {
        assert!(compiled("font-weight", "150").is_err());
        assert!(compiled("font-weight", "100.0").is_err());
    }

    #[test]
    fn line_heights() {
        assert_eq!(
            compiled("line-height", "1.5"),
            Ok(vec![header(Property::LineHeight, LineHeight::Number.code()), 1536])
        );
        let mut expected = vec![header(Property::LineHeight, LineHeight::Dimension.code())];
        expected.extend(dimension_words("120", Unit::Pct));
        assert_eq!(compiled("line-height", "120%"), Ok(expected));
        assert!(compiled("line-height", "-1").is_err());
    }

    #[test]
    fn font_sizes() {
        assert_eq!(
            compiled("font-size", "x-large"),
            Ok(vec![header(Property::FontSize, FontSize::XLarge.code())])
        );
        assert!(compiled("font-size", "-1px").is_err());
    }
}
