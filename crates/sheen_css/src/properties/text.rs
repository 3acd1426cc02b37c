//! Text and colour properties

use crate::errors::{CssError, CssResult};
use crate::properties::bytecode::StyleBuilder;
use crate::properties::common::{keyword_or_dimension, parse_colour, parse_dimension, Cursor, Declared, Operand, Units};
use crate::properties::Property;
use crate::values::{
    ColorValue, Keyword, Length, Spacing, VerticalAlign, TEXT_DECORATION_BLINK, TEXT_DECORATION_LINE_THROUGH,
    TEXT_DECORATION_NONE, TEXT_DECORATION_OVERLINE, TEXT_DECORATION_UNDERLINE,
};

/// `color`. The colour of an element relative to its own colour is the parent's colour, so
/// `currentColor` compiles to inherit.
pub fn color(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    let colour = parse_colour(c)?;
    if colour.tag == ColorValue::Invert.code() {
        return Err(CssError::Invalid);
    }
    if colour.tag == ColorValue::CurrentColor.code() {
        return b.inherit(property);
    }
    colour.write(property, b)
}

/// letter-spacing and word-spacing: `normal | <length>`
pub fn parse_spacing(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, Spacing::Set, Units::Length, true)
}

pub fn parse_text_indent(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let dimension = parse_dimension(c, Units::LengthOrPercent, true)?;
    Ok(Declared::new(Length::Set.code(), Operand::Dimension(dimension)))
}

pub fn parse_vertical_align(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, VerticalAlign::Set, Units::LengthOrPercent, true)
}

/// `none | [ underline || overline || line-through || blink ]`
pub fn parse_text_decoration(c: &mut Cursor<'_>) -> CssResult<Declared> {
    if c.eat_ident("none") {
        return Ok(Declared::new(TEXT_DECORATION_NONE, Operand::None));
    }

    let lines = [
        ("underline", TEXT_DECORATION_UNDERLINE),
        ("overline", TEXT_DECORATION_OVERLINE),
        ("line-through", TEXT_DECORATION_LINE_THROUGH),
        ("blink", TEXT_DECORATION_BLINK),
    ];

    let mut value = 0;
    while !c.at_end() {
        let token = c.token()?;
        let (_, bit) = lines
            .iter()
            .find(|(keyword, _)| token.is_ident(keyword))
            .ok_or(CssError::Invalid)?;
        if value & bit != 0 {
            return Err(CssError::Invalid);
        }
        value |= bit;
    }

    if value == 0 {
        return Err(CssError::Invalid);
    }
    Ok(Declared::new(value, Operand::None))
}

#[cfg(test)]
mod tests {
    use crate::properties::bytecode::OpFlags;
    use crate::properties::tests::{compiled, compiled_style, dimension_words, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    #[test]
    fn colours() {
        assert_eq!(
            compiled("color", "navy"),
            Ok(vec![header(Property::Color, ColorValue::Set.code()), 0xff000080])
        );
        assert!(compiled("color", "invert").is_err());
    }

    #[test]
    fn current_color_is_inherited() {
        let style = compiled_style("color", "currentColor").unwrap();
        let opv = style.reader().next_instruction().unwrap();
        assert_eq!(opv.property, Property::Color);
        assert_eq!(opv.flags, OpFlags::INHERIT);
    }

    #[test_case("underline", TEXT_DECORATION_UNDERLINE)]
    #[test_case("blink underline", TEXT_DECORATION_BLINK | TEXT_DECORATION_UNDERLINE)]
    #[test_case("none", TEXT_DECORATION_NONE)]
    fn text_decorations(value: &str, expected: u16) {
        assert_eq!(compiled("text-decoration", value), Ok(vec![header(Property::TextDecoration, expected)]));
    }

    #[test_case("underline underline"; "repeated line")]
    #[test_case("none underline"; "none with a line")]
    #[test_case("wavy"; "unknown line")]
    fn invalid_text_decorations(value: &str) {
        assert!(compiled("text-decoration", value).is_err());
    }

    #[test]
    fn spacing_rejects_percentages() {
        assert!(compiled("letter-spacing", "10%").is_err());
        let mut expected = vec![header(Property::WordSpacing, Spacing::Set.code())];
        expected.extend(dimension_words("-0.5", Unit::Em));
        assert_eq!(compiled("word-spacing", "-0.5em"), Ok(expected));
    }

    #[test]
    fn vertical_alignment() {
        assert_eq!(
            compiled("vertical-align", "text-top"),
            Ok(vec![header(Property::VerticalAlign, VerticalAlign::TextTop.code())])
        );
        let mut expected = vec![header(Property::VerticalAlign, VerticalAlign::Set.code())];
        expected.extend(dimension_words("-20", Unit::Pct));
        assert_eq!(compiled("vertical-align", "-20%"), Ok(expected));
    }
}
