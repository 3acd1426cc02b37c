//! Paged media properties

use crate::errors::{CssError, CssResult};
use crate::properties::common::{parse_number, Cursor, Declared, Operand};
use crate::values::{Integer, Keyword};

/// orphans and widows: a positive integer
pub fn parse_integer(c: &mut Cursor<'_>) -> CssResult<Declared> {
    let value = parse_number(c, true)?;
    if value.to_int() < 1 {
        return Err(CssError::Invalid);
    }
    Ok(Declared::new(Integer::Set.code(), Operand::Fixed(value)))
}

#[cfg(test)]
mod tests {
    use crate::properties::tests::{compiled, header};
    use crate::properties::Property;
    use crate::values::*;
    use test_case::test_case;

    #[test]
    fn orphans_and_widows() {
        assert_eq!(
            compiled("orphans", "3"),
            Ok(vec![header(Property::Orphans, Integer::Set.code()), 3 << 10])
        );
        assert_eq!(
            compiled("widows", "1"),
            Ok(vec![header(Property::Widows, Integer::Set.code()), 1 << 10])
        );
    }

    #[test_case("0"; "zero")]
    #[test_case("-2"; "negative")]
    #[test_case("2.5"; "fraction")]
    #[test_case("auto"; "keyword")]
    fn invalid_orphans(value: &str) {
        assert!(compiled("orphans", value).is_err());
    }

    #[test_case("page-break-before", "always", PageBreak::Always.code())]
    #[test_case("page-break-after", "LEFT", PageBreak::Left.code())]
    #[test_case("page-break-inside", "avoid", PageBreakInside::Avoid.code())]
    fn page_breaks(property: &str, value: &str, expected: u16) {
        let word = compiled(property, value).unwrap()[0];
        assert_eq!(word >> 18, u32::from(expected));
    }

    #[test]
    fn page_break_inside_has_no_sides() {
        assert!(compiled("page-break-inside", "left").is_err());
    }

    #[test]
    fn table_keywords() {
        assert_eq!(
            compiled("table-layout", "fixed"),
            Ok(vec![header(Property::TableLayout, TableLayout::Fixed.code())])
        );
        assert_eq!(
            compiled("empty-cells", "hide"),
            Ok(vec![header(Property::EmptyCells, EmptyCells::Hide.code())])
        );
        assert_eq!(
            compiled("caption-side", "bottom"),
            Ok(vec![header(Property::CaptionSide, CaptionSide::Bottom.code())])
        );
    }
}
