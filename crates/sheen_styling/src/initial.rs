//! Initial values of the stored properties

use sheen_css::properties::Property;
use sheen_css::values::{
    position_tag, BackgroundAttachment, BackgroundRepeat, BorderCollapse, BorderSpacing, BorderStyle,
    BorderWidth, CaptionSide, Clear, Clip, ColorValue, Content, Counters, Cursor, Dimension, Direction,
    Display, EmptyCells, Float, FontFamily, FontSize, FontStyle, FontVariant, FontWeight, Integer, Keyword,
    Length, LineHeight, ListStylePosition, ListStyleType, MaxSize, Offset, Overflow, PageBreak,
    PageBreakInside, Position, PositionAxis, Quotes, Size, Spacing, TableLayout, TextAlign, TextTransform,
    UnicodeBidi, Unit, UriValue, VerticalAlign, Visibility, WhiteSpace, ZIndex, TEXT_DECORATION_NONE,
};
use sheen_shared::fixed::Fixed;

use crate::computed::{try_boxed, FontFamilyItem, List, Raw};
use crate::errors::CascadeResult;

/// Colour of the `color` property when nothing sets it
pub const INITIAL_COLOUR: u32 = 0xff00_0000;

/// Generic family used when nothing sets `font-family`
pub const INITIAL_FONT_FAMILY: FontFamily = FontFamily::SansSerif;

fn keyword<K: Keyword>(keyword: K) -> Raw {
    Raw::tag(keyword.code())
}

/// Tag and operands of the initial value. Aural properties have none.
pub(crate) fn raw(property: Property) -> Raw {
    match property {
        Property::BackgroundAttachment => keyword(BackgroundAttachment::Scroll),
        Property::BackgroundColor => keyword(ColorValue::Transparent),
        Property::BackgroundImage | Property::ListStyleImage => keyword(UriValue::None),
        Property::BackgroundPosition => {
            let mut raw = Raw::tag(position_tag(PositionAxis::Set, PositionAxis::Set));
            raw.set_dimension(0, Dimension::new(Fixed::ZERO, Unit::Pct));
            raw.set_dimension(1, Dimension::new(Fixed::ZERO, Unit::Pct));
            raw
        }
        Property::BackgroundRepeat => keyword(BackgroundRepeat::Repeat),
        Property::BorderTopColor
        | Property::BorderRightColor
        | Property::BorderBottomColor
        | Property::BorderLeftColor => keyword(ColorValue::CurrentColor),
        Property::BorderTopStyle
        | Property::BorderRightStyle
        | Property::BorderBottomStyle
        | Property::BorderLeftStyle
        | Property::OutlineStyle => keyword(BorderStyle::None),
        Property::BorderTopWidth
        | Property::BorderRightWidth
        | Property::BorderBottomWidth
        | Property::BorderLeftWidth
        | Property::OutlineWidth => keyword(BorderWidth::Medium),
        Property::BorderCollapse => keyword(BorderCollapse::Separate),
        Property::BorderSpacing => {
            let mut raw = Raw::tag(BorderSpacing::Set.code());
            raw.set_dimension(0, Dimension::ZERO);
            raw.set_dimension(1, Dimension::ZERO);
            raw
        }
        Property::Top | Property::Right | Property::Bottom | Property::Left => keyword(Offset::Auto),
        Property::CaptionSide => keyword(CaptionSide::Top),
        Property::Clear => keyword(Clear::None),
        Property::Clip => keyword(Clip::Auto),
        Property::Color => Raw::word(ColorValue::Set.code(), INITIAL_COLOUR),
        Property::Content => keyword(Content::Normal),
        Property::CounterIncrement | Property::CounterReset => keyword(Counters::None),
        Property::Cursor => keyword(Cursor::Auto),
        Property::Direction => keyword(Direction::Ltr),
        Property::Display => keyword(Display::Inline),
        Property::EmptyCells => keyword(EmptyCells::Show),
        Property::Float => keyword(Float::None),
        Property::FontFamily => keyword(INITIAL_FONT_FAMILY),
        Property::FontSize => keyword(FontSize::Medium),
        Property::FontStyle => keyword(FontStyle::Normal),
        Property::FontVariant => keyword(FontVariant::Normal),
        Property::FontWeight => keyword(FontWeight::Normal),
        Property::Height | Property::Width => keyword(Size::Auto),
        Property::LetterSpacing | Property::WordSpacing => keyword(Spacing::Normal),
        Property::LineHeight => keyword(LineHeight::Normal),
        Property::ListStylePosition => keyword(ListStylePosition::Outside),
        Property::ListStyleType => keyword(ListStyleType::Disc),
        Property::MarginTop | Property::MarginRight | Property::MarginBottom | Property::MarginLeft => {
            Raw::dimension(Offset::Set.code(), Dimension::ZERO)
        }
        Property::MaxHeight | Property::MaxWidth => keyword(MaxSize::None),
        Property::MinHeight
        | Property::MinWidth
        | Property::PaddingTop
        | Property::PaddingRight
        | Property::PaddingBottom
        | Property::PaddingLeft
        | Property::TextIndent => Raw::dimension(Length::Set.code(), Dimension::ZERO),
        Property::Orphans | Property::Widows => Raw::word(Integer::Set.code(), Fixed::from_int(2).raw() as u32),
        Property::OutlineColor => keyword(ColorValue::Invert),
        Property::Overflow => keyword(Overflow::Visible),
        Property::PageBreakAfter | Property::PageBreakBefore => keyword(PageBreak::Auto),
        Property::PageBreakInside => keyword(PageBreakInside::Auto),
        Property::Position => keyword(Position::Static),
        Property::Quotes => keyword(Quotes::None),
        Property::TableLayout => keyword(TableLayout::Auto),
        Property::TextAlign => keyword(TextAlign::Left),
        Property::TextDecoration => Raw::tag(TEXT_DECORATION_NONE),
        Property::TextTransform => keyword(TextTransform::None),
        Property::UnicodeBidi => keyword(UnicodeBidi::Normal),
        Property::VerticalAlign => keyword(VerticalAlign::Baseline),
        Property::Visibility => keyword(Visibility::Visible),
        Property::WhiteSpace => keyword(WhiteSpace::Normal),
        Property::ZIndex => keyword(ZIndex::Auto),
        _ => Raw::default(),
    }
}

/// List value that goes with the initial value, for properties that have one
pub(crate) fn list(property: Property) -> CascadeResult<Option<List>> {
    let list = match property {
        Property::BackgroundImage | Property::ListStyleImage => List::Uri(None),
        Property::FontFamily => List::FontFamily(try_boxed(&[FontFamilyItem::Generic(INITIAL_FONT_FAMILY)])?),
        Property::Quotes => List::Quotes(Box::default()),
        Property::CounterIncrement | Property::CounterReset => List::Counters(Box::default()),
        Property::Cursor => List::Cursor(Box::default()),
        Property::Content => List::Content(Box::default()),
        _ => return Ok(None),
    };
    Ok(Some(list))
}
