use sheen_css::errors::CssResult;
use sheen_css::parser_config::ParserConfig;
use sheen_css::stylesheet::{Origin, Stylesheet};

const LOCATION: &str = "sheen://useragent.css";

/// Loads the default user agent stylesheet
pub fn load_default_useragent_stylesheet() -> CssResult<Stylesheet> {
    let config = ParserConfig {
        origin: Origin::UserAgent,
        source: Some(String::from(LOCATION)),
        ..Default::default()
    };

    let css = include_str!("../resources/useragent.css");
    let sheet = Stylesheet::parse(css, config)?;
    log::debug!("loaded {} user agent rules from {LOCATION}", sheet.rules.len());
    Ok(sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sheen_css::stylesheet::Rule;
    use sheen_css::values::{Display, FontFamily};

    use crate::cascade::{select_style, Rank};
    use crate::computed::FontFamilyItem;

    #[test]
    fn default_stylesheet() {
        let sheet = load_default_useragent_stylesheet().unwrap();
        assert_eq!(sheet.origin, Origin::UserAgent);
        assert_eq!(sheet.location.as_deref(), Some(LOCATION));
        assert!(sheet.rules.len() > 40);
        assert!(matches!(sheet.rules.last(), Some(Rule::Media { .. })));
    }

    #[test]
    fn elements_get_their_defaults() {
        let sheet = load_default_useragent_stylesheet().unwrap();
        let matching = |name: &str| {
            sheet
                .style_rules("screen")
                .filter_map(|rule| {
                    let selector = rule.selectors.iter().find(|s| s.to_string() == name)?;
                    Some((rule.style.clone(), Rank::new(Origin::UserAgent, selector.specificity())))
                })
                .collect::<Vec<_>>()
        };

        let pre = select_style(matching("pre"), None).unwrap();
        assert_eq!(pre.display(), Display::Block);
        assert_eq!(pre.font_family(), &[FontFamilyItem::Generic(FontFamily::Monospace)]);

        let span = select_style(matching("span"), None).unwrap();
        assert_eq!(span.display(), Display::Inline);
    }
}
