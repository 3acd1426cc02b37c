//! Property value vocabulary
//!
//! Every keyword-valued property has an enum whose discriminants are the value tags stored in the
//! 14 bit value field of an instruction header. The computed style reuses the same codes as its
//! field tags. Code 0 is reserved for `inherit` in every enum: compiled instructions carry the
//! inherit flag instead, and a computed style only holds it until it is composed.
//!
//! Variants without a keyword (`Set`, `Dimension`, `Uri`, ...) mean that operands follow the
//! instruction header.

use std::fmt;

use sheen_shared::fixed::Fixed;

/// Keyword lookup for enums generated by [`keyword_enum`]
pub trait Keyword: Sized + Copy {
    /// The `inherit` value, code 0
    const INHERIT: Self;

    /// Case-insensitive keyword lookup. `inherit` is not a keyword of any enum.
    fn from_ident(ident: &str) -> Option<Self>;

    /// Looks up a value tag
    fn from_code(code: u16) -> Option<Self>;

    /// The value tag
    fn code(self) -> u16;
}

/// Declares value enums with their css keywords. Codes are assigned in declaration order starting
/// at 1, and an `Inherit` variant with code 0 is added to every enum. Variants without a keyword
/// can only be produced by the property compilers.
macro_rules! keyword_enum {
    ($(
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident $($keyword:literal)?),+ $(,)?
        }
    )+) => {$(
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u16)]
        pub enum $name {
            Inherit = 0,
            $($variant),+
        }

        impl $name {
            const ALL: &'static [$name] = &[$name::Inherit, $($name::$variant),+];

            /// The css keyword of this value, when it has one
            pub fn as_str(self) -> Option<&'static str> {
                #[allow(unreachable_patterns)]
                match self {
                    $name::Inherit => Some("inherit"),
                    $($($name::$variant => Some($keyword),)?)+
                    _ => None,
                }
            }
        }

        impl Keyword for $name {
            const INHERIT: Self = $name::Inherit;

            #[allow(unused_variables)]
            fn from_ident(ident: &str) -> Option<Self> {
                $($(
                    if ident.eq_ignore_ascii_case($keyword) {
                        return Some($name::$variant);
                    }
                )?)+
                None
            }

            fn from_code(code: u16) -> Option<Self> {
                Self::ALL.get(usize::from(code)).copied()
            }

            fn code(self) -> u16 {
                self as u16
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                match self.as_str() {
                    Some(keyword) => f.write_str(keyword),
                    None => write!(f, "{self:?}"),
                }
            }
        }
    )+};
}

keyword_enum! {
    /// Positions of the azimuth property. Combined with [`AZIMUTH_BEHIND`].
    pub enum Azimuth {
        LeftSide "left-side", FarLeft "far-left", Left "left", CenterLeft "center-left", Center "center",
        CenterRight "center-right", Right "right", FarRight "far-right", RightSide "right-side",
        Leftwards "leftwards", Rightwards "rightwards", Angle,
    }
}

/// Flag on an azimuth position: the sound comes from behind
pub const AZIMUTH_BEHIND: u16 = 0x20;

keyword_enum! {
    pub enum BackgroundAttachment { Fixed "fixed", Scroll "scroll" }

    pub enum BackgroundRepeat {
        Repeat "repeat", RepeatX "repeat-x", RepeatY "repeat-y", NoRepeat "no-repeat",
    }

    /// One axis of background-position. The value tag holds the horizontal axis in bits 0-2 and
    /// the vertical axis in bits 3-5; operands follow for every `Set` axis, horizontal first.
    pub enum PositionAxis { Start, Center, End, Set }
}

/// Packs two background-position axes into a value tag
pub fn position_tag(horizontal: PositionAxis, vertical: PositionAxis) -> u16 {
    horizontal.code() | (vertical.code() << 3)
}

/// Splits a background-position value tag into its axes
pub fn position_axes(tag: u16) -> (PositionAxis, PositionAxis) {
    let axis = |code| PositionAxis::from_code(code).unwrap_or(PositionAxis::Inherit);
    (axis(tag & 0x7), axis((tag >> 3) & 0x7))
}

keyword_enum! {
    pub enum BorderCollapse { Collapse "collapse", Separate "separate" }

    /// border-spacing: two lengths follow, horizontal first
    pub enum BorderSpacing { Set }

    /// border-*-style and outline-style. Outlines do not accept `hidden`.
    pub enum BorderStyle {
        None "none", Hidden "hidden", Dotted "dotted", Dashed "dashed", Solid "solid", Double "double",
        Groove "groove", Ridge "ridge", Inset "inset", Outset "outset",
    }

    /// border-*-width and outline-width
    pub enum BorderWidth { Thin "thin", Medium "medium", Thick "thick", Width }

    /// Colour values. `invert` is only valid for outline-color.
    pub enum ColorValue { Transparent "transparent", CurrentColor "currentcolor", Invert "invert", Set }

    /// Properties that take a single uri or `none`
    pub enum UriValue { None "none", Uri }

    /// top, right, bottom, left and the margins
    pub enum Offset { Auto "auto", Set }

    pub enum CaptionSide { Top "top", Bottom "bottom" }

    pub enum Clear { None "none", Left "left", Right "right", Both "both" }

    /// The clip property. A `Rect` tag is combined with the `CLIP_*_AUTO` bits; operands follow
    /// for every edge that is not auto, in top, right, bottom, left order.
    pub enum Clip { Auto "auto", Rect }
}

pub const CLIP_TOP_AUTO: u16 = 0x04;
pub const CLIP_RIGHT_AUTO: u16 = 0x08;
pub const CLIP_BOTTOM_AUTO: u16 = 0x10;
pub const CLIP_LEFT_AUTO: u16 = 0x20;

/// Auto bits of the clip edges, in top, right, bottom, left order
pub const CLIP_EDGE_AUTO: [u16; 4] = [CLIP_TOP_AUTO, CLIP_RIGHT_AUTO, CLIP_BOTTOM_AUTO, CLIP_LEFT_AUTO];

keyword_enum! {
    pub enum Content { Normal "normal", None "none", Set }

    /// Items of a content list. An item word holds the item code in bits 0-7 and, for counters,
    /// the list-style-type in bits 8-15. The list ends with a zero word.
    pub enum ContentItem {
        String, Uri, Counter, Counters, Attr, OpenQuote "open-quote", CloseQuote "close-quote",
        NoOpenQuote "no-open-quote", NoCloseQuote "no-close-quote",
    }

    /// counter-increment and counter-reset. A `Set` value is followed by name/value pairs, each
    /// followed by a `Set` word when another pair follows or a zero word at the end.
    pub enum Counters { None "none", Set }

    /// Cursor keywords. A `Uri` item is followed by its string operand and the next item; the
    /// list ends with a keyword.
    pub enum Cursor {
        Auto "auto", Crosshair "crosshair", Default "default", Pointer "pointer", Move "move",
        EResize "e-resize", NeResize "ne-resize", NwResize "nw-resize", NResize "n-resize",
        SeResize "se-resize", SwResize "sw-resize", SResize "s-resize", WResize "w-resize", Text "text",
        Wait "wait", Help "help", Progress "progress", Uri,
    }

    pub enum Direction { Ltr "ltr", Rtl "rtl" }

    pub enum Display {
        Inline "inline", Block "block", ListItem "list-item", RunIn "run-in", InlineBlock "inline-block",
        Table "table", InlineTable "inline-table", TableRowGroup "table-row-group",
        TableHeaderGroup "table-header-group", TableFooterGroup "table-footer-group", TableRow "table-row",
        TableColumnGroup "table-column-group", TableColumn "table-column", TableCell "table-cell",
        TableCaption "table-caption", None "none",
    }

    pub enum Elevation { Below "below", Level "level", Above "above", Higher "higher", Lower "lower", Angle }

    pub enum EmptyCells { Show "show", Hide "hide" }

    pub enum Float { Left "left", Right "right", None "none" }

    /// Items of a font-family list. `String` and `IdentList` items are followed by a string
    /// operand; the list ends with a zero word.
    pub enum FontFamily {
        Serif "serif", SansSerif "sans-serif", Cursive "cursive", Fantasy "fantasy", Monospace "monospace",
        String, IdentList,
    }

    pub enum FontSize {
        XxSmall "xx-small", XSmall "x-small", Small "small", Medium "medium", Large "large", XLarge "x-large",
        XxLarge "xx-large", Larger "larger", Smaller "smaller", Dimension,
    }

    pub enum FontStyle { Normal "normal", Italic "italic", Oblique "oblique" }

    pub enum FontVariant { Normal "normal", SmallCaps "small-caps" }

    pub enum FontWeight {
        Normal "normal", Bold "bold", Bolder "bolder", Lighter "lighter", W100 "100", W200 "200", W300 "300",
        W400 "400", W500 "500", W600 "600", W700 "700", W800 "800", W900 "900",
    }

    /// width and height
    pub enum Size { Auto "auto", Set }

    /// letter-spacing and word-spacing
    pub enum Spacing { Normal "normal", Set }

    pub enum LineHeight { Normal "normal", Number, Dimension }

    pub enum ListStylePosition { Inside "inside", Outside "outside" }

    pub enum ListStyleType {
        Disc "disc", Circle "circle", Square "square", Decimal "decimal",
        DecimalLeadingZero "decimal-leading-zero", LowerRoman "lower-roman", UpperRoman "upper-roman",
        LowerGreek "lower-greek", LowerLatin "lower-latin", UpperLatin "upper-latin", Armenian "armenian",
        Georgian "georgian", LowerAlpha "lower-alpha", UpperAlpha "upper-alpha", None "none",
    }

    /// max-width and max-height
    pub enum MaxSize { None "none", Set }

    /// min-width, min-height and the paddings
    pub enum Length { Set }

    /// orphans and widows
    pub enum Integer { Set }

    pub enum Overflow { Visible "visible", Hidden "hidden", Scroll "scroll", Auto "auto" }

    /// page-break-after and page-break-before
    pub enum PageBreak { Auto "auto", Always "always", Avoid "avoid", Left "left", Right "right" }

    pub enum PageBreakInside { Auto "auto", Avoid "avoid" }

    /// pause-after and pause-before
    pub enum Pause { Set }

    pub enum Pitch { XLow "x-low", Low "low", Medium "medium", High "high", XHigh "x-high", Frequency }

    /// pitch-range, richness and stress
    pub enum Number { Set }

    /// play-during. A `Uri` tag can be combined with [`PLAY_DURING_MIX`] and
    /// [`PLAY_DURING_REPEAT`].
    pub enum PlayDuring { Auto "auto", None "none", Uri }
}

pub const PLAY_DURING_MIX: u16 = 0x20;
pub const PLAY_DURING_REPEAT: u16 = 0x40;

keyword_enum! {
    pub enum Position { Static "static", Relative "relative", Absolute "absolute", Fixed "fixed" }

    /// A `Set` value is followed by open/close string pairs, each followed by a `Set` word when
    /// another pair follows or a zero word at the end.
    pub enum Quotes { None "none", Set }

    pub enum Speak { Normal "normal", None "none", SpellOut "spell-out" }

    pub enum SpeakHeader { Once "once", Always "always" }

    pub enum SpeakNumeral { Digits "digits", Continuous "continuous" }

    pub enum SpeakPunctuation { Code "code", None "none" }

    pub enum SpeechRate {
        XSlow "x-slow", Slow "slow", Medium "medium", Fast "fast", XFast "x-fast", Faster "faster",
        Slower "slower", Set,
    }

    pub enum TableLayout { Auto "auto", Fixed "fixed" }

    pub enum TextAlign { Left "left", Right "right", Center "center", Justify "justify" }
}

/// text-decoration is a set of lines rather than a keyword. `none` has its own bit so that a
/// value never collides with the inherit code.
pub const TEXT_DECORATION_UNDERLINE: u16 = 0x01;
pub const TEXT_DECORATION_OVERLINE: u16 = 0x02;
pub const TEXT_DECORATION_LINE_THROUGH: u16 = 0x04;
pub const TEXT_DECORATION_BLINK: u16 = 0x08;
pub const TEXT_DECORATION_NONE: u16 = 0x10;

keyword_enum! {
    pub enum TextTransform {
        Capitalize "capitalize", Uppercase "uppercase", Lowercase "lowercase", None "none",
    }

    pub enum UnicodeBidi { Normal "normal", Embed "embed", BidiOverride "bidi-override" }

    pub enum VerticalAlign {
        Baseline "baseline", Sub "sub", Super "super", Top "top", TextTop "text-top", Middle "middle",
        Bottom "bottom", TextBottom "text-bottom", Set,
    }

    pub enum Visibility { Visible "visible", Hidden "hidden", Collapse "collapse" }

    /// Items of a voice-family list, terminated like font-family
    pub enum VoiceFamily { Male "male", Female "female", Child "child", String, IdentList }

    pub enum Volume {
        Silent "silent", XSoft "x-soft", Soft "soft", Medium "medium", Loud "loud", XLoud "x-loud", Number,
        Dimension,
    }

    pub enum WhiteSpace {
        Normal "normal", Pre "pre", Nowrap "nowrap", PreWrap "pre-wrap", PreLine "pre-line",
    }

    pub enum ZIndex { Auto "auto", Set }
}

/// Units of dimension operands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
#[rustfmt::skip]
pub enum Unit {
    #[default]
    Px,
    Ex, Em, In, Cm, Mm, Pt, Pc, Pct, Deg, Grad, Rad, Ms, S, Hz, Khz,
}

impl Unit {
    /// Every unit with its suffix, indexed by code
    #[rustfmt::skip]
    const ALL: [(Unit, &'static str); 16] = [
        (Unit::Px, "px"), (Unit::Ex, "ex"), (Unit::Em, "em"), (Unit::In, "in"),
        (Unit::Cm, "cm"), (Unit::Mm, "mm"), (Unit::Pt, "pt"), (Unit::Pc, "pc"),
        (Unit::Pct, "%"), (Unit::Deg, "deg"), (Unit::Grad, "grad"), (Unit::Rad, "rad"),
        (Unit::Ms, "ms"), (Unit::S, "s"), (Unit::Hz, "hz"), (Unit::Khz, "khz"),
    ];

    /// Case-insensitive lookup of a unit suffix. Percentages are not looked up by name.
    pub fn from_suffix(suffix: &str) -> Option<Unit> {
        Unit::ALL
            .into_iter()
            .find(|(unit, name)| *unit != Unit::Pct && name.eq_ignore_ascii_case(suffix))
            .map(|(unit, _)| unit)
    }

    pub fn from_code(code: u32) -> Option<Unit> {
        Unit::ALL.get(code as usize).map(|(unit, _)| *unit)
    }

    pub fn code(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        Unit::ALL[self as usize].1
    }

    pub fn is_length(self) -> bool {
        (self as u32) <= Unit::Pc as u32
    }

    pub fn is_angle(self) -> bool {
        matches!(self, Unit::Deg | Unit::Grad | Unit::Rad)
    }

    pub fn is_time(self) -> bool {
        matches!(self, Unit::Ms | Unit::S)
    }

    pub fn is_frequency(self) -> bool {
        matches!(self, Unit::Hz | Unit::Khz)
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A fixed-point magnitude with its unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Dimension {
    pub value: Fixed,
    pub unit: Unit,
}

impl Dimension {
    pub const ZERO: Dimension = Dimension::new(Fixed::ZERO, Unit::Px);

    pub const fn new(value: Fixed, unit: Unit) -> Self {
        Self { value, unit }
    }

    pub fn px(value: i32) -> Self {
        Self::new(Fixed::from_int(value), Unit::Px)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.value, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn keywords_are_case_insensitive() {
        assert_eq!(Display::from_ident("Table-Cell"), Some(Display::TableCell));
        assert_eq!(Display::from_ident("inherit"), None);
        assert_eq!(Display::from_ident("grid"), None);
        assert_eq!(FontWeight::from_ident("700"), Some(FontWeight::W700));
    }

    #[test]
    fn codes_round_trip() {
        for code in 0..=16 {
            let display = Display::from_code(code).map(Keyword::code);
            assert_eq!(display, Some(code));
        }
        assert_eq!(Display::from_code(17), None);
        assert_eq!(Display::Inherit.code(), 0);
    }

    #[test]
    fn codes_follow_declaration_order() {
        assert_eq!(Azimuth::LeftSide.code(), 1);
        assert_eq!(Azimuth::Angle.code(), 12);
        assert_eq!(FontWeight::W900.code(), 13);
        assert_eq!(ListStyleType::from_code(15), Some(ListStyleType::None));
        assert_eq!(ListStyleType::from_code(16), None);
        assert_eq!(Pause::from_code(1), Some(Pause::Set));
    }

    #[test]
    fn value_only_variants_have_no_keyword() {
        assert_eq!(Size::Set.as_str(), None);
        assert_eq!(Size::Auto.as_str(), Some("auto"));
        assert_eq!(Size::Set.to_string(), "Set");
        assert_eq!(Cursor::from_ident("uri"), None);
    }

    #[test]
    fn background_position_tags() {
        let tag = position_tag(PositionAxis::End, PositionAxis::Set);
        assert_eq!(tag, 3 | (4 << 3));
        assert_eq!(position_axes(tag), (PositionAxis::End, PositionAxis::Set));
    }

    #[test_case("px", Some(Unit::Px))]
    #[test_case("KHZ", Some(Unit::Khz))]
    #[test_case("%", None)]
    #[test_case("vw", None)]
    fn unit_suffixes(suffix: &str, expected: Option<Unit>) {
        assert_eq!(Unit::from_suffix(suffix), expected);
    }

    #[test]
    fn unit_classes() {
        assert!(Unit::Pc.is_length());
        assert!(!Unit::Pct.is_length());
        assert!(Unit::Grad.is_angle());
        assert!(Unit::Ms.is_time());
        assert!(Unit::Khz.is_frequency());
        assert_eq!(Unit::from_code(Unit::Deg.code()), Some(Unit::Deg));
        assert_eq!(Unit::from_code(16), None);
    }

    #[test]
    fn unit_table_is_indexed_by_code() {
        for code in 0..16 {
            let unit = Unit::from_code(code).unwrap();
            assert_eq!(unit.code(), code);
            assert_eq!(unit.to_string(), unit.as_str());
        }
        assert_eq!(Unit::Khz.as_str(), "khz");
        assert_eq!(Unit::Pct.as_str(), "%");
    }
}
