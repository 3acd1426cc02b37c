//! Shorthand properties
//!
//! A shorthand compiles to one instruction per longhand, in the order of [`Shorthand::longhands`].
//! Components that are left out are set to their initial value.

use std::fmt;

use crate::errors::{CssError, CssResult};
use crate::properties::aural::parse_pause;
use crate::properties::background::{parse_background_color, parse_image, BackgroundPosition};
use crate::properties::box_model::{parse_border_color, parse_border_width, parse_min_size, parse_offset};
use crate::properties::bytecode::StyleBuilder;
use crate::properties::common::{compile_list, keyword, Cursor, Declared, Parse};
use crate::properties::font::{family_list, parse_font_size, parse_font_weight, parse_line_height};
use crate::properties::ui::{parse_outline_color, parse_outline_style};
use crate::properties::Property;
use crate::values::{
    BackgroundAttachment, BackgroundRepeat, BorderStyle, BorderWidth, ColorValue, FontFamily, FontStyle,
    FontVariant, FontWeight, LineHeight, ListStylePosition, ListStyleType, UriValue,
};

/// Properties that set several longhands at once
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shorthand {
    Background,
    Border,
    BorderBottom,
    BorderColor,
    BorderLeft,
    BorderRight,
    BorderStyle,
    BorderTop,
    BorderWidth,
    Cue,
    Font,
    ListStyle,
    Margin,
    Outline,
    Padding,
    Pause,
}

const BORDER: [Property; 12] = [
    Property::BorderTopWidth,
    Property::BorderTopStyle,
    Property::BorderTopColor,
    Property::BorderRightWidth,
    Property::BorderRightStyle,
    Property::BorderRightColor,
    Property::BorderBottomWidth,
    Property::BorderBottomStyle,
    Property::BorderBottomColor,
    Property::BorderLeftWidth,
    Property::BorderLeftStyle,
    Property::BorderLeftColor,
];

impl Shorthand {
    pub const ALL: [Shorthand; 16] = [
        Shorthand::Background,
        Shorthand::Border,
        Shorthand::BorderBottom,
        Shorthand::BorderColor,
        Shorthand::BorderLeft,
        Shorthand::BorderRight,
        Shorthand::BorderStyle,
        Shorthand::BorderTop,
        Shorthand::BorderWidth,
        Shorthand::Cue,
        Shorthand::Font,
        Shorthand::ListStyle,
        Shorthand::Margin,
        Shorthand::Outline,
        Shorthand::Padding,
        Shorthand::Pause,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Shorthand::Background => "background",
            Shorthand::Border => "border",
            Shorthand::BorderBottom => "border-bottom",
            Shorthand::BorderColor => "border-color",
            Shorthand::BorderLeft => "border-left",
            Shorthand::BorderRight => "border-right",
            Shorthand::BorderStyle => "border-style",
            Shorthand::BorderTop => "border-top",
            Shorthand::BorderWidth => "border-width",
            Shorthand::Cue => "cue",
            Shorthand::Font => "font",
            Shorthand::ListStyle => "list-style",
            Shorthand::Margin => "margin",
            Shorthand::Outline => "outline",
            Shorthand::Padding => "padding",
            Shorthand::Pause => "pause",
        }
    }

    /// Case-insensitive lookup
    pub fn from_name(name: &str) -> Option<Shorthand> {
        Shorthand::ALL.into_iter().find(|s| s.name().eq_ignore_ascii_case(name))
    }

    /// The longhands this shorthand sets
    pub fn longhands(self) -> &'static [Property] {
        match self {
            Shorthand::Background => &[
                Property::BackgroundColor,
                Property::BackgroundImage,
                Property::BackgroundRepeat,
                Property::BackgroundAttachment,
                Property::BackgroundPosition,
            ],
            Shorthand::Border => &BORDER,
            Shorthand::BorderTop => &BORDER[0..3],
            Shorthand::BorderRight => &BORDER[3..6],
            Shorthand::BorderBottom => &BORDER[6..9],
            Shorthand::BorderLeft => &BORDER[9..12],
            Shorthand::BorderColor => &[
                Property::BorderTopColor,
                Property::BorderRightColor,
                Property::BorderBottomColor,
                Property::BorderLeftColor,
            ],
            Shorthand::BorderStyle => &[
                Property::BorderTopStyle,
                Property::BorderRightStyle,
                Property::BorderBottomStyle,
                Property::BorderLeftStyle,
            ],
            Shorthand::BorderWidth => &[
                Property::BorderTopWidth,
                Property::BorderRightWidth,
                Property::BorderBottomWidth,
                Property::BorderLeftWidth,
            ],
            Shorthand::Cue => &[Property::CueBefore, Property::CueAfter],
            Shorthand::Font => &[
                Property::FontStyle,
                Property::FontVariant,
                Property::FontWeight,
                Property::FontSize,
                Property::LineHeight,
                Property::FontFamily,
            ],
            Shorthand::ListStyle => &[
                Property::ListStyleType,
                Property::ListStylePosition,
                Property::ListStyleImage,
            ],
            Shorthand::Margin => &[
                Property::MarginTop,
                Property::MarginRight,
                Property::MarginBottom,
                Property::MarginLeft,
            ],
            Shorthand::Outline => &[Property::OutlineColor, Property::OutlineStyle, Property::OutlineWidth],
            Shorthand::Padding => &[
                Property::PaddingTop,
                Property::PaddingRight,
                Property::PaddingBottom,
                Property::PaddingLeft,
            ],
            Shorthand::Pause => &[Property::PauseBefore, Property::PauseAfter],
        }
    }

    /// Compiles a value other than `inherit`
    pub(crate) fn compile(self, c: &mut Cursor<'_>, b: &mut StyleBuilder) -> CssResult<()> {
        let longhands = self.longhands();
        match self {
            Shorthand::Background => background(c, b),
            Shorthand::Border => {
                let [width, style, color] = border_side(c)?;
                for side in BORDER.chunks(3) {
                    width.write(side[0], b)?;
                    style.write(side[1], b)?;
                    color.write(side[2], b)?;
                }
                Ok(())
            }
            Shorthand::BorderTop | Shorthand::BorderRight | Shorthand::BorderBottom | Shorthand::BorderLeft => {
                let values = border_side(c)?;
                for (property, value) in longhands.iter().zip(values) {
                    value.write(*property, b)?;
                }
                Ok(())
            }
            Shorthand::BorderColor => edges(c, longhands, parse_border_color, b),
            Shorthand::BorderStyle => edges(c, longhands, keyword::<BorderStyle>, b),
            Shorthand::BorderWidth => edges(c, longhands, parse_border_width, b),
            Shorthand::Margin => edges(c, longhands, parse_offset, b),
            Shorthand::Padding => edges(c, longhands, parse_min_size, b),
            Shorthand::Cue => pair(c, longhands, parse_image, b),
            Shorthand::Pause => pair(c, longhands, parse_pause, b),
            Shorthand::Font => font(c, b),
            Shorthand::ListStyle => list_style(c, b),
            Shorthand::Outline => {
                let mut color = None;
                let mut style = None;
                let mut width = None;
                while !c.at_end() {
                    if !(fill(c, &mut color, parse_outline_color)?
                        || fill(c, &mut style, parse_outline_style)?
                        || fill(c, &mut width, parse_border_width)?)
                    {
                        return Err(CssError::Invalid);
                    }
                }
                let values = [
                    color.unwrap_or_else(|| Declared::keyword(ColorValue::Invert)),
                    style.unwrap_or_else(|| Declared::keyword(BorderStyle::None)),
                    width.unwrap_or_else(|| Declared::keyword(BorderWidth::Medium)),
                ];
                for (property, value) in longhands.iter().zip(values) {
                    value.write(*property, b)?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for Shorthand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Tries to parse a component into an empty slot. Returns true when the slot was filled.
fn fill<T>(c: &mut Cursor<'_>, slot: &mut Option<T>, parse: impl FnOnce(&mut Cursor<'_>) -> CssResult<T>) -> CssResult<bool> {
    if slot.is_some() {
        return Ok(false);
    }
    *slot = c.attempt(parse)?;
    Ok(slot.is_some())
}

/// One to four values for the top, right, bottom and left edges
fn edges(c: &mut Cursor<'_>, longhands: &[Property], parse: Parse, b: &mut StyleBuilder) -> CssResult<()> {
    let mut values = Vec::with_capacity(4);
    while values.len() < 4 && !c.at_end() {
        values.push(parse(c)?);
    }

    let order = match values.len() {
        1 => [0, 0, 0, 0],
        2 => [0, 1, 0, 1],
        3 => [0, 1, 2, 1],
        4 => [0, 1, 2, 3],
        _ => return Err(CssError::Invalid),
    };
    for (property, index) in longhands.iter().zip(order) {
        values[index].write(*property, b)?;
    }
    Ok(())
}

/// One or two values for a before/after pair
fn pair(c: &mut Cursor<'_>, longhands: &[Property], parse: Parse, b: &mut StyleBuilder) -> CssResult<()> {
    let before = parse(c)?;
    let after = if c.at_end() { before.clone() } else { parse(c)? };
    before.write(longhands[0], b)?;
    after.write(longhands[1], b)
}

/// `[ <width> || <style> || <color> ]`
fn border_side(c: &mut Cursor<'_>) -> CssResult<[Declared; 3]> {
    let mut width = None;
    let mut style = None;
    let mut color = None;
    while !c.at_end() {
        if !(fill(c, &mut width, parse_border_width)?
            || fill(c, &mut style, keyword::<BorderStyle>)?
            || fill(c, &mut color, parse_border_color)?)
        {
            return Err(CssError::Invalid);
        }
    }
    Ok([
        width.unwrap_or_else(|| Declared::keyword(BorderWidth::Medium)),
        style.unwrap_or_else(|| Declared::keyword(BorderStyle::None)),
        color.unwrap_or_else(|| Declared::keyword(ColorValue::CurrentColor)),
    ])
}

fn background(c: &mut Cursor<'_>, b: &mut StyleBuilder) -> CssResult<()> {
    let mut color = None;
    let mut image = None;
    let mut repeat = None;
    let mut attachment = None;
    let mut position = None;
    while !c.at_end() {
        if !(fill(c, &mut color, parse_background_color)?
            || fill(c, &mut image, parse_image)?
            || fill(c, &mut repeat, keyword::<BackgroundRepeat>)?
            || fill(c, &mut attachment, keyword::<BackgroundAttachment>)?
            || fill(c, &mut position, BackgroundPosition::parse)?)
        {
            return Err(CssError::Invalid);
        }
    }

    color
        .unwrap_or_else(|| Declared::keyword(ColorValue::Transparent))
        .write(Property::BackgroundColor, b)?;
    image
        .unwrap_or_else(|| Declared::keyword(UriValue::None))
        .write(Property::BackgroundImage, b)?;
    repeat
        .unwrap_or_else(|| Declared::keyword(BackgroundRepeat::Repeat))
        .write(Property::BackgroundRepeat, b)?;
    attachment
        .unwrap_or_else(|| Declared::keyword(BackgroundAttachment::Scroll))
        .write(Property::BackgroundAttachment, b)?;
    position
        .unwrap_or_else(BackgroundPosition::initial)
        .write(Property::BackgroundPosition, b)
}

/// `[ <style> || <variant> || <weight> ]? <size> [ / <line-height> ]? <family>`
fn font(c: &mut Cursor<'_>, b: &mut StyleBuilder) -> CssResult<()> {
    let mut style = None;
    let mut variant = None;
    let mut weight = None;
    for _ in 0..3 {
        if !(fill(c, &mut style, keyword::<FontStyle>)?
            || fill(c, &mut variant, keyword::<FontVariant>)?
            || fill(c, &mut weight, parse_font_weight)?)
        {
            break;
        }
    }

    let size = parse_font_size(c)?;
    let line_height = if c.eat_char('/') {
        parse_line_height(c)?
    } else {
        Declared::keyword(LineHeight::Normal)
    };

    style
        .unwrap_or_else(|| Declared::keyword(FontStyle::Normal))
        .write(Property::FontStyle, b)?;
    variant
        .unwrap_or_else(|| Declared::keyword(FontVariant::Normal))
        .write(Property::FontVariant, b)?;
    weight
        .unwrap_or_else(|| Declared::keyword(FontWeight::Normal))
        .write(Property::FontWeight, b)?;
    size.write(Property::FontSize, b)?;
    line_height.write(Property::LineHeight, b)?;

    compile_list(c, b, |c, sink| {
        family_list(c, Property::FontFamily, sink, FontFamily::String, FontFamily::IdentList)
    })
}

/// `[ <type> || <position> || <image> ]`. A `none` that no other component claims sets both
/// the type and the image.
fn list_style(c: &mut Cursor<'_>, b: &mut StyleBuilder) -> CssResult<()> {
    let mut kind = None;
    let mut position = None;
    let mut image = None;
    let mut nones = 0;
    while !c.at_end() {
        if c.eat_ident("none") {
            nones += 1;
            continue;
        }
        if !(fill(c, &mut kind, keyword::<ListStyleType>)?
            || fill(c, &mut position, keyword::<ListStylePosition>)?
            || fill(c, &mut image, parse_image)?)
        {
            return Err(CssError::Invalid);
        }
    }

    let none_type = Declared::keyword(ListStyleType::None);
    let none_image = Declared::keyword(UriValue::None);
    match (nones, &kind, &image) {
        (0, _, _) => {}
        (1, None, _) => kind = Some(none_type),
        (1, Some(_), None) => image = Some(none_image),
        (2, None, None) => {
            kind = Some(none_type);
            image = Some(none_image);
        }
        _ => return Err(CssError::Invalid),
    }

    kind
        .unwrap_or_else(|| Declared::keyword(ListStyleType::Disc))
        .write(Property::ListStyleType, b)?;
    position
        .unwrap_or_else(|| Declared::keyword(ListStylePosition::Outside))
        .write(Property::ListStylePosition, b)?;
    image
        .unwrap_or_else(|| Declared::keyword(UriValue::None))
        .write(Property::ListStyleImage, b)
}

#[cfg(test)]
mod tests {
    use super::Shorthand;
    use crate::properties::tests::{compiled, compiled_style, dimension_words, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    #[test_case("1px", ["1", "1", "1", "1"]; "one value")]
    #[test_case("1px 2px", ["1", "2", "1", "2"]; "two values")]
    #[test_case("1px 2px 3px", ["1", "2", "3", "2"]; "three values")]
    #[test_case("1px 2px 3px 4px", ["1", "2", "3", "4"]; "four values")]
    fn margin_edges(value: &str, expected: [&str; 4]) {
        let words = compiled("margin", value).unwrap();
        let mut want = Vec::new();
        let sides = [Property::MarginTop, Property::MarginRight, Property::MarginBottom, Property::MarginLeft];
        for (property, px) in sides.into_iter().zip(expected) {
            want.push(header(property, Offset::Set.code()));
            want.extend(dimension_words(px, Unit::Px));
        }
        assert_eq!(words, want);
    }

    #[test]
    fn too_many_edges() {
        assert!(compiled("padding", "1px 2px 3px 4px 5px").is_err());
    }

    #[test]
    fn border_sets_every_side() {
        let style = compiled_style("border", "solid red").unwrap();
        let properties: Vec<Property> = style.instructions().iter().map(|opv| opv.property).collect();
        assert_eq!(properties, Shorthand::Border.longhands());

        let words = compiled("border-top", "thick").unwrap();
        assert_eq!(
            words,
            vec![
                header(Property::BorderTopWidth, BorderWidth::Thick.code()),
                header(Property::BorderTopStyle, BorderStyle::None.code()),
                header(Property::BorderTopColor, ColorValue::CurrentColor.code()),
            ]
        );
    }

    #[test]
    fn repeated_border_components_are_invalid() {
        assert!(compiled("border", "solid dotted").is_err());
    }

    #[test]
    fn font_shorthand() {
        let style = compiled_style("font", "italic bold 12px/30px Georgia, serif").unwrap();
        let mut expected = vec![
            header(Property::FontStyle, FontStyle::Italic.code()),
            header(Property::FontVariant, FontVariant::Normal.code()),
            header(Property::FontWeight, FontWeight::Bold.code()),
            header(Property::FontSize, FontSize::Dimension.code()),
        ];
        expected.extend(dimension_words("12", Unit::Px));
        expected.push(header(Property::LineHeight, LineHeight::Dimension.code()));
        expected.extend(dimension_words("30", Unit::Px));
        expected.extend([
            header(Property::FontFamily, FontFamily::IdentList.code()),
            0,
            u32::from(FontFamily::Serif.code()),
            0,
        ]);
        assert_eq!(style.bytecode(), expected.as_slice());
    }

    #[test_case("12px"; "missing family")]
    #[test_case("bold serif"; "missing size")]
    #[test_case("normal normal normal normal 12px serif"; "too many normals")]
    fn invalid_fonts(value: &str) {
        assert!(compiled("font", value).is_err());
    }

    #[test]
    fn background_defaults() {
        let words = compiled("background", "red").unwrap();
        let mut expected = vec![
            header(Property::BackgroundColor, ColorValue::Set.code()),
            0xffff0000,
            header(Property::BackgroundImage, UriValue::None.code()),
            header(Property::BackgroundRepeat, BackgroundRepeat::Repeat.code()),
            header(Property::BackgroundAttachment, BackgroundAttachment::Scroll.code()),
            header(
                Property::BackgroundPosition,
                position_tag(PositionAxis::Set, PositionAxis::Set),
            ),
        ];
        expected.extend(dimension_words("0", Unit::Pct));
        expected.extend(dimension_words("0", Unit::Pct));
        assert_eq!(words, expected);
    }

    #[test]
    fn background_components_in_any_order() {
        let words = compiled("background", "fixed no-repeat right top #000").unwrap();
        assert!(words.contains(&header(
            Property::BackgroundPosition,
            position_tag(PositionAxis::End, PositionAxis::Start)
        )));
        assert!(words.contains(&header(Property::BackgroundAttachment, BackgroundAttachment::Fixed.code())));
    }

    #[test_case("none", ListStyleType::None, UriValue::None; "none alone")]
    #[test_case("none disc", ListStyleType::Disc, UriValue::None; "none with a type")]
    #[test_case("square inside", ListStyleType::Square, UriValue::None; "no none")]
    fn list_style_nones(value: &str, kind: ListStyleType, image: UriValue) {
        let words = compiled("list-style", value).unwrap();
        assert_eq!(words[0], header(Property::ListStyleType, kind.code()));
        assert_eq!(words[2], header(Property::ListStyleImage, image.code()));
    }

    #[test]
    fn list_style_with_too_many_nones() {
        assert!(compiled("list-style", "none none none").is_err());
        assert!(compiled("list-style", "none disc none").is_err());
    }

    #[test]
    fn outline_defaults() {
        assert_eq!(
            compiled("outline", "dashed"),
            Ok(vec![
                header(Property::OutlineColor, ColorValue::Invert.code()),
                header(Property::OutlineStyle, BorderStyle::Dashed.code()),
                header(Property::OutlineWidth, BorderWidth::Medium.code()),
            ])
        );
    }

    #[test]
    fn cue_and_pause_pairs() {
        let style = compiled_style("cue", "url(a.wav)").unwrap();
        assert_eq!(
            style.bytecode(),
            &[
                header(Property::CueBefore, UriValue::Uri.code()),
                0,
                header(Property::CueAfter, UriValue::Uri.code()),
                0,
            ]
        );

        let words = compiled("pause", "1s 2s").unwrap();
        let mut expected = vec![header(Property::PauseBefore, Pause::Set.code())];
        expected.extend(dimension_words("1", Unit::S));
        expected.push(header(Property::PauseAfter, Pause::Set.code()));
        expected.extend(dimension_words("2", Unit::S));
        assert_eq!(words, expected);
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(Shorthand::from_name("Border-Top"), Some(Shorthand::BorderTop));
        assert_eq!(Shorthand::from_name("border-top-width"), None);
    }
}
