//! Aural properties
//!
//! These are compiled and cascaded like every other property; the computed style has no storage
//! for them.

use sheen_shared::fixed::Fixed;

use crate::errors::{CssError, CssResult};
use crate::properties::bytecode::StyleBuilder;
use crate::properties::common::{
    compile_list, keyword_or_dimension, parse_dimension, parse_number, Cursor, Declared, Operand, Units,
};
use crate::properties::font::family_list;
use crate::properties::Property;
use crate::tokenizer::TokenKind;
use crate::values::{
    Azimuth, Keyword, Number, Pause, PlayDuring, SpeechRate, VoiceFamily, Volume, AZIMUTH_BEHIND,
    PLAY_DURING_MIX, PLAY_DURING_REPEAT,
};

/// `<angle> | [ <position> || behind ] | leftwards | rightwards`
pub fn parse_azimuth(c: &mut Cursor<'_>) -> CssResult<Declared> {
    if c.peek().is_some_and(|t| t.kind != TokenKind::Ident) {
        let angle = parse_dimension(c, Units::Angle, true)?;
        return Ok(Declared::new(Azimuth::Angle.code(), Operand::Dimension(angle)));
    }

    let mut behind = c.eat_ident("behind");
    let position = c.keyword::<Azimuth>();
    if !behind {
        behind = c.eat_ident("behind");
    }

    match position {
        Some(Azimuth::Leftwards | Azimuth::Rightwards) if behind => Err(CssError::Invalid),
        Some(keyword @ (Azimuth::Leftwards | Azimuth::Rightwards)) => Ok(Declared::keyword(keyword)),
        Some(position) => {
            let flag = if behind { AZIMUTH_BEHIND } else { 0 };
            Ok(Declared::new(position.code() | flag, Operand::None))
        }
        // `behind` alone is `center behind`
        None if behind => Ok(Declared::new(Azimuth::Center.code() | AZIMUTH_BEHIND, Operand::None)),
        None => Err(CssError::Invalid),
    }
}

pub fn parse_elevation(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, crate::values::Elevation::Angle, Units::Angle, true)
}

/// pause-after and pause-before: a non-negative time or percentage
pub fn parse_pause(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let dimension = parse_dimension(c, Units::TimeOrPercent, false)?;
    Ok(Declared::new(Pause::Set.code(), Operand::Dimension(dimension)))
}

pub fn parse_pitch(c: &mut Cursor<'_>) -> CssResult<Declared> {
    keyword_or_dimension(c, crate::values::Pitch::Frequency, Units::Frequency, false)
}

/// A number between 0 and 100 inclusive
fn percentile(c: &mut Cursor<'_>) -> CssResult<Fixed> {
    let value = parse_number(c, false)?;
    if value.is_negative() || value > Fixed::from_int(100) {
        return Err(CssError::Invalid);
    }
    Ok(value)
}

/// pitch-range, richness and stress
pub fn parse_percentile(c: &mut Cursor<'_>) -> CssResult<Declared> {
    Ok(Declared::new(Number::Set.code(), Operand::Fixed(percentile(c)?)))
}

pub fn parse_speech_rate(c: &mut Cursor<'_>) -> CssResult<Declared> {
    if let Some(keyword) = c.keyword::<SpeechRate>() {
        return Ok(Declared::keyword(keyword));
    }
    let value = parse_number(c, false)?;
    if value.is_negative() {
        return Err(CssError::Invalid);
    }
    Ok(Declared::new(SpeechRate::Set.code(), Operand::Fixed(value)))
}

/// `<number> | <percentage> | silent | x-soft | soft | medium | loud | x-loud`
pub fn parse_volume(c: &mut Cursor<'_>) -> CssResult<Declared> {
    if let Some(keyword) = c.keyword::<Volume>() {
        return Ok(Declared::keyword(keyword));
    }
    match c.peek().map(|t| t.kind) {
        Some(TokenKind::Number) => Ok(Declared::new(Volume::Number.code(), Operand::Fixed(percentile(c)?))),
        Some(TokenKind::Percentage) => {
            let dimension = parse_dimension(c, Units::LengthOrPercent, false)?;
            Ok(Declared::new(Volume::Dimension.code(), Operand::Dimension(dimension)))
        }
        _ => Err(CssError::Invalid),
    }
}

/// `<uri> [ mix || repeat ]? | auto | none`
pub fn parse_play_during(c: &mut Cursor<'_>) -> CssResult<Declared> {
    if let Some(keyword) = c.keyword::<PlayDuring>() {
        return Ok(Declared::keyword(keyword));
    }

    let uri = c.token()?;
    if uri.kind != TokenKind::Uri {
        return Err(CssError::Invalid);
    }

    let mut tag = PlayDuring::Uri.code();
    for _ in 0..2 {
        if tag & PLAY_DURING_MIX == 0 && c.eat_ident("mix") {
            tag |= PLAY_DURING_MIX;
        } else if tag & PLAY_DURING_REPEAT == 0 && c.eat_ident("repeat") {
            tag |= PLAY_DURING_REPEAT;
        }
    }
    Ok(Declared::new(tag, Operand::String(uri.text.clone())))
}

pub fn voice_family(c: &mut Cursor<'_>, property: Property, b: &mut StyleBuilder) -> CssResult<()> {
    compile_list(c, b, |c, sink| {
        family_list(c, property, sink, VoiceFamily::String, VoiceFamily::IdentList)
    })
}

#[cfg(test)]
mod tests {
    use crate::properties::tests::{compiled, compiled_style, dimension_words, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    #[test_case("left-side behind", Azimuth::LeftSide.code() | AZIMUTH_BEHIND; "position then behind")]
    #[test_case("behind far-right", Azimuth::FarRight.code() | AZIMUTH_BEHIND; "behind then position")]
    #[test_case("behind", Azimuth::Center.code() | AZIMUTH_BEHIND; "behind alone")]
    #[test_case("center-left", Azimuth::CenterLeft.code(); "position alone")]
    #[test_case("leftwards", Azimuth::Leftwards.code(); "leftwards")]
    fn azimuth_keywords(value: &str, expected: u16) {
        assert_eq!(compiled("azimuth", value), Ok(vec![header(Property::Azimuth, expected)]));
    }

    #[test_case("leftwards behind"; "relative with behind")]
    #[test_case("behind behind"; "behind twice")]
    #[test_case("left right"; "two positions")]
    #[test_case("10px"; "length")]
    fn invalid_azimuths(value: &str) {
        assert!(compiled("azimuth", value).is_err());
    }

    #[test]
    fn azimuth_angle() {
        let mut expected = vec![header(Property::Azimuth, Azimuth::Angle.code())];
        expected.extend(dimension_words("-45", Unit::Deg));
        assert_eq!(compiled("azimuth", "-45deg"), Ok(expected));
    }

    #[test]
    fn percentiles_are_bounded() {
        assert_eq!(
            compiled("richness", "100"),
            Ok(vec![header(Property::Richness, Number::Set.code()), 100 << 10])
        );
        assert!(compiled("stress", "101").is_err());
        assert!(compiled("pitch-range", "-1").is_err());
    }

    #[test]
    fn volumes() {
        assert_eq!(compiled("volume", "loud"), Ok(vec![header(Property::Volume, Volume::Loud.code())]));
        let mut expected = vec![header(Property::Volume, Volume::Dimension.code())];
        expected.extend(dimension_words("150", Unit::Pct));
        assert_eq!(compiled("volume", "150%"), Ok(expected));
        assert!(compiled("volume", "10px").is_err());
    }

    #[test]
    fn play_during_flags() {
        let style = compiled_style("play-during", "url(rain.wav) repeat mix").unwrap();
        let tag = PlayDuring::Uri.code() | PLAY_DURING_MIX | PLAY_DURING_REPEAT;
        assert_eq!(style.bytecode(), &[header(Property::PlayDuring, tag), 0]);
        assert!(compiled("play-during", "url(rain.wav) mix mix").is_err());
    }

    #[test]
    fn pauses_and_pitch() {
        let mut expected = vec![header(Property::PauseBefore, Pause::Set.code())];
        expected.extend(dimension_words("20", Unit::Ms));
        assert_eq!(compiled("pause-before", "20ms"), Ok(expected));
        assert!(compiled("pause-after", "-1s").is_err());

        let mut expected = vec![header(Property::Pitch, Pitch::Frequency.code())];
        expected.extend(dimension_words("2", Unit::Khz));
        assert_eq!(compiled("pitch", "2kHz"), Ok(expected));
    }

    #[test]
    fn voice_families() {
        let style = compiled_style("voice-family", "romeo, male").unwrap();
        assert_eq!(
            style.bytecode(),
            &[
                header(Property::VoiceFamily, VoiceFamily::IdentList.code()),
                0,
                u32::from(VoiceFamily::Male.code()),
                0,
            ]
        );
    }
}
