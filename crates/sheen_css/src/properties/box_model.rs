//! Box model and visual formatting properties

use crate::errors::{CssError, CssResult};
use crate::properties::bytecode::{Sink, StyleBuilder};
use crate::properties::common::{
    keyword_or_dimension, parse_colour, parse_dimension, parse_number, Cursor, Declared, Operand, Units,
};
use crate::properties::Property;
use crate::tokenizer::TokenKind;
use crate::values::{
    BorderSpacing, BorderWidth, Clip, ColorValue, Dimension, Keyword, Length, MaxSize, Offset, Size, ZIndex,
    CLIP_EDGE_AUTO,
};

/// top, right, bottom, left and the margins: `auto | <length> | <percentage>`
pub fn parse_offset(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, Offset::Set, Units::LengthOrPercent, true)
}

/// width and height
pub fn parse_size(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, Size::Set, Units::LengthOrPercent, false)
}

pub fn parse_max_size(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, MaxSize::Set, Units::LengthOrPercent, false)
}

/// min-width, min-height and the paddings: a non-negative length or percentage
pub fn parse_min_size(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let dimension = parse_dimension(c, Units::LengthOrPercent, false)?;
    Ok(Declared::new(Length::Set.code(), Operand::Dimension(dimension)))
}

/// border-*-color. `invert` is reserved for outlines.
pub fn parse_border_color(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let colour = parse_colour(c)?;
    if colour.tag == ColorValue::Invert.code() {
        return Err(CssError::Invalid);
    }
    Ok(colour)
}

/// border-*-width and outline-width: `thin | medium | thick | <length>`
pub fn parse_border_width(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, BorderWidth::Width, Units::Length, false)
}

pub fn parse_z_index(c: &mut Cursor<'_>) -> CssResult<Declared> {
    if c.eat_ident("auto") {
        return Ok(Declared::keyword(ZIndex::Auto));
    }
    let value = parse_number(c, true)?;
    Ok(Declared::new(ZIndex::Set.code(), Operand::Fixed(value)))
}

/// `<length> <length>?`
pub fn border_spacing(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    let horizontal = parse_dimension(c, Units::Length, false)?;
    let vertical = match c.attempt(|c| parse_dimension(c, Units::Length, false))? {
        Some(vertical) => vertical,
        None => horizontal,
    };

    b.opv(property, BorderSpacing::Set.code())?;
    b.dimension(horizontal)?;
    b.dimension(vertical)
}

/// `auto | rect(<edge>, <edge>, <edge>, <edge>)` where an edge is `auto` or a length. The commas
/// may be left out, as older stylesheets do.
pub fn clip(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    if c.eat_ident("auto") {
        return b.opv(property, Clip::Auto.code());
    }

    let function = c.token()?;
    if !(function.kind == TokenKind::Function && function.text.eq_ignore_ascii_case("rect")) {
        return Err(CssError::Invalid);
    }

    let mut tag = Clip::Rect.code();
    let mut edges: Vec<Dimension> = Vec::with_capacity(4);
    for (i, auto_bit) in CLIP_EDGE_AUTO.into_iter().enumerate() {
        if i > 0 {
            c.eat_char(',');
        }
        if c.eat_ident("auto") {
            tag |= auto_bit;
        } else {
            edges.push(parse_dimension(c, Units::Length, true)?);
        }
    }
    c.expect_char(')')?;

    b.opv(property, tag)?;
    for edge in edges {
        b.dimension(edge)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::properties::tests::{compiled, dimension_words, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    #[test]
    fn offsets_accept_negative_lengths() {
        let mut expected = vec![header(Property::Left, Offset::Set.code())];
        expected.extend(dimension_words("-2", Unit::Em));
        assert_eq!(compiled("left", "-2em"), Ok(expected));
        assert_eq!(compiled("top", "auto"), Ok(vec![header(Property::Top, Offset::Auto.code())]));
    }

    #[test_case("width", "-1px"; "negative width")]
    #[test_case("padding-top", "auto"; "auto padding")]
    #[test_case("max-height", "-5%"; "negative max height")]
    #[test_case("border-top-width", "10%"; "percentage border width")]
    #[test_case("border-left-color", "invert"; "inverted border colour")]
    #[test_case("z-index", "1.5"; "fractional z-index")]
    #[test_case("margin-top", "1px 2px"; "trailing garbage")]
    fn invalid_values(property: &str, value: &str) {
        assert!(compiled(property, value).is_err());
    }

    #[test]
    fn border_spacing_repeats_a_single_length() {
        let mut expected = vec![header(Property::BorderSpacing, BorderSpacing::Set.code())];
        expected.extend(dimension_words("2", Unit::Px));
        expected.extend(dimension_words("2", Unit::Px));
        assert_eq!(compiled("border-spacing", "2px"), Ok(expected));
    }

    #[test]
    fn clip_rect_with_auto_edges() {
        let tag = Clip::Rect.code() | CLIP_RIGHT_AUTO | CLIP_LEFT_AUTO;
        let mut expected = vec![header(Property::Clip, tag)];
        expected.extend(dimension_words("1", Unit::Px));
        expected.extend(dimension_words("3", Unit::Px));
        assert_eq!(compiled("clip", "rect(1px, auto, 3px, auto)"), Ok(expected.clone()));
        assert_eq!(compiled("clip", "rect(1px auto 3px auto)"), Ok(expected));
    }

    #[test]
    fn z_index_integer() {
        let expected = vec![header(Property::ZIndex, ZIndex::Set.code()), (-3i32 << 10) as u32];
        assert_eq!(compiled("z-index", "-3"), Ok(expected));
    }

    #[test]
    fn keyword_properties() {
        assert_eq!(
            compiled("display", "TABLE-CELL"),
            Ok(vec![header(Property::Display, Display::TableCell.code())])
        );
        assert_eq!(
            compiled("border-top-style", "groove"),
            Ok(vec![header(Property::BorderTopStyle, BorderStyle::Groove.code())])
        );
        assert!(compiled("display", "flex").is_err());
    }
}
