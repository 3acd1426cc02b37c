//! Background properties

use sheen_shared::fixed::Fixed;

use crate::errors::{CssError, CssResult};
use crate::properties::bytecode::{Sink, StyleBuilder};
use crate::properties::common::{parse_colour, parse_dimension, parse_uri_or_none, Cursor, Declared, Units};
use crate::properties::Property;
use crate::values::{position_tag, ColorValue, Dimension, Keyword, PositionAxis, Unit, UriValue};

/// background-color: any colour except `invert`
pub fn parse_background_color(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let colour = parse_colour(c)?;
    if colour.tag == ColorValue::Invert.code() {
        return Err(CssError::Invalid);
    }
    Ok(colour)
}

/// background-image, list-style-image and the cues
pub fn parse_image(c: &mut Cursor<'_>) -> CssResult<Declared> {
    parse_uri_or_none(c, UriValue::None, UriValue::Uri)
}

/// One component of a background position
#[derive(Debug, Clone, Copy, PartialEq)]
enum Component {
    Left,
    Right,
    Top,
    Bottom,
    Center,
    Dimension(Dimension),
}

impl Component {
    fn parse(c: &mut Cursor<'_>) -> CssResult<Component> {
        let keywords = [
            ("left", Component::Left),
            ("right", Component::Right),
            ("top", Component::Top),
            ("bottom", Component::Bottom),
            ("center", Component::Center),
        ];
        for (keyword, component) in keywords {
            if c.eat_ident(keyword) {
                return Ok(component);
            }
        }
        Ok(Component::Dimension(parse_dimension(c, Units::LengthOrPercent, true)?))
    }

    fn is_keyword(self) -> bool {
        !matches!(self, Component::Dimension(_))
    }

    fn is_vertical_keyword(self) -> bool {
        matches!(self, Component::Top | Component::Bottom)
    }

    fn is_horizontal_keyword(self) -> bool {
        matches!(self, Component::Left | Component::Right)
    }

    /// Converts a component to a horizontal axis value
    fn horizontal(self) -> CssResult<(PositionAxis, Option<Dimension>)> {
        match self {
            Component::Left => Ok((PositionAxis::Start, None)),
            Component::Center => Ok((PositionAxis::Center, None)),
            Component::Right => Ok((PositionAxis::End, None)),
            Component::Dimension(d) => Ok((PositionAxis::Set, Some(d))),
            Component::Top | Component::Bottom => Err(CssError::Invalid),
        }
    }

    /// Converts a component to a vertical axis value
    fn vertical(self) -> CssResult<(PositionAxis, Option<Dimension>)> {
        match self {
            Component::Top => Ok((PositionAxis::Start, None)),
            Component::Center => Ok((PositionAxis::Center, None)),
            Component::Bottom => Ok((PositionAxis::End, None)),
            Component::Dimension(d) => Ok((PositionAxis::Set, Some(d))),
            Component::Left | Component::Right => Err(CssError::Invalid),
        }
    }
}

/// A parsed background-position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackgroundPosition {
    horizontal: (PositionAxis, Option<Dimension>),
    vertical: (PositionAxis, Option<Dimension>),
}

impl BackgroundPosition {
    /// `0% 0%`
    pub fn initial() -> Self {
        let origin = Some(Dimension::new(Fixed::ZERO, Unit::Pct));
        Self {
            horizontal: (PositionAxis::Set, origin),
            vertical: (PositionAxis::Set, origin),
        }
    }

    /// Parses one or two components. Two keywords may come in either order; as soon as a
    /// dimension is involved the horizontal component comes first. A missing component is
    /// `center`.
    pub fn parse(c: &mut Cursor<'_>) -> CssResult<Self> {
        let first = Component::parse(c)?;
        let second = c.attempt(Component::parse)?;

        let (horizontal, vertical) = match second {
            None if first.is_vertical_keyword() => (Component::Center, first),
            None => (first, Component::Center),
            Some(second)
                if first.is_keyword()
                    && second.is_keyword()
                    && (first.is_vertical_keyword() || second.is_horizontal_keyword()) =>
            {
                (second, first)
            }
            Some(second) => (first, second),
        };

        Ok(Self {
            horizontal: horizontal.horizontal()?,
            vertical: vertical.vertical()?,
        })
    }

    pub fn write(&self, property: Property, sink: &mut dyn Sink) -> CssResult<()> {
        sink.opv(property, position_tag(self.horizontal.0, self.vertical.0))?;
        for dimension in [self.horizontal.1, self.vertical.1].into_iter().flatten() {
            sink.dimension(dimension)?;
        }
        Ok(())
    }
}

pub fn background_position(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    BackgroundPosition::parse(c)?.write(property, b)
}

#[cfg(test)]
mod tests {
    use crate::properties::tests::{compiled, dimension_words, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    fn position(horizontal: PositionAxis, vertical: PositionAxis) -> u32 {
        header(Property::BackgroundPosition, position_tag(horizontal, vertical))
    }

    #[test_case("top", PositionAxis::Center, PositionAxis::Start; "single vertical keyword")]
    #[test_case("right", PositionAxis::End, PositionAxis::Center; "single horizontal keyword")]
    #[test_case("bottom left", PositionAxis::Start, PositionAxis::End; "swapped keywords")]
    #[test_case("center right", PositionAxis::End, PositionAxis::Center; "center first")]
    #[test_case("center", PositionAxis::Center, PositionAxis::Center; "center only")]
    fn keyword_positions(value: &str, horizontal: PositionAxis, vertical: PositionAxis) {
        assert_eq!(
            compiled("background-position", value),
            Ok(vec![position(horizontal, vertical)])
        );
    }

    #[test]
    fn dimensions_keep_their_order() {
        let mut expected = vec![position(PositionAxis::Set, PositionAxis::End)];
        expected.extend(dimension_words("10", Unit::Pct));
        assert_eq!(compiled("background-position", "10% bottom"), Ok(expected));

        let mut expected = vec![position(PositionAxis::Set, PositionAxis::Set)];
        expected.extend(dimension_words("1", Unit::Px));
        expected.extend(dimension_words("-2", Unit::Em));
        assert_eq!(compiled("background-position", "1px -2em"), Ok(expected));
    }

    #[test_case("top 10%"; "vertical keyword before a dimension")]
    #[test_case("left right"; "two horizontal keywords")]
    #[test_case("1px 2px 3px"; "three components")]
    fn invalid_positions(value: &str) {
        assert!(compiled("background-position", value).is_err());
    }

    #[test]
    fn images() {
        let style = crate::properties::tests::compiled_style("background-image", "url(a.png)").unwrap();
        assert_eq!(style.bytecode(), &[header(Property::BackgroundImage, UriValue::Uri.code()), 0]);
        assert_eq!(style.strings()[0].as_str(), "a.png");
        assert_eq!(
            compiled("background-image", "none"),
            Ok(vec![header(Property::BackgroundImage, UriValue::None.code())])
        );
    }

    #[test]
    fn background_color_rejects_invert() {
        assert!(compiled("background-color", "invert").is_err());
        assert_eq!(
            compiled("background-color", "#fff"),
            Ok(vec![header(Property::BackgroundColor, ColorValue::Set.code()), 0xffffffff])
        );
    }
}
