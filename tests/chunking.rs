use sheen::css::parser_config::{Context, ParserConfig};
use sheen::testing;
use test_case::test_case;

const STYLESHEET: &str = r#"@charset "utf-8";
@import url("print.css") print;
/* a comment with ünïcödé */
<!-- body > p.intro, a[href^="http"]:hover::before { color: #f00 !important; margin: 1px 2px 3em }
-->
@media screen, print { h1 { font: italic bold 12px/1.5 "Times New Roman", serif } }
@page :first { margin: 2cm }
@unknown stuff { with { nested } blocks }
li { content: counter(item, upper-roman) ". "; counter-increment: item 2; quotes: "«" "»" }
bad { color: ; width: 10px; bogus-property: 1; background: url( "a b.png" ) no-repeat }
\66 oo { font-family: \"quoted\" }
p { width: 1.5e3px; unterminated: "string
   ; height: 50% }
"#;

fn sizes() -> impl Iterator<Item = usize> {
    (1..=17).chain([31, 64, 257])
}

#[test]
fn chunk_boundaries_do_not_change_tokens() {
    let config = ParserConfig {
        emit_comments: true,
        ..Default::default()
    };
    let whole = testing::tokens(STYLESHEET.as_bytes(), 0, &config).unwrap();
    assert!(whole.len() > 100);
    for size in sizes() {
        let split = testing::tokens(STYLESHEET.as_bytes(), size, &config).unwrap();
        assert_eq!(whole, split, "chunk size {size}");
    }
}

#[test]
fn chunk_boundaries_do_not_change_events() {
    let whole = testing::events(STYLESHEET.as_bytes(), 0, ParserConfig::default()).unwrap();
    assert_eq!(whole.first().map(String::as_str), Some("start-stylesheet"));
    assert_eq!(whole.last().map(String::as_str), Some("end-stylesheet"));
    for size in sizes() {
        let split = testing::events(STYLESHEET.as_bytes(), size, ParserConfig::default()).unwrap();
        assert_eq!(whole, split, "chunk size {size}");
    }
}

#[test_case("color: red; margin: 0 auto !important"; "declarations")]
#[test_case("color: red; ; ; width: { bad } ; height: 1px"; "malformed")]
#[test_case("font-family: a, \"b\"; background: url(x.png"; "unterminated")]
fn chunked_inline_styles(css: &str) {
    let config = ParserConfig {
        context: Context::Inline,
        ..Default::default()
    };
    let whole = testing::events(css.as_bytes(), 0, config.clone()).unwrap();
    for size in 1..css.len() {
        assert_eq!(whole, testing::events(css.as_bytes(), size, config.clone()).unwrap(), "chunk size {size}");
    }
}

#[test]
fn chunk_boundaries_do_not_change_the_stylesheet() {
    // Dropped declarations and rejected rules are logged
    let _ = simple_logger::SimpleLogger::new().with_level(log::LevelFilter::Debug).init();

    let whole = testing::stylesheet(STYLESHEET.as_bytes(), 0, ParserConfig::default()).unwrap();
    for size in [1, 2, 3, 7, 100] {
        let split = testing::stylesheet(STYLESHEET.as_bytes(), size, ParserConfig::default()).unwrap();
        assert_eq!(whole.rules, split.rules, "chunk size {size}");
    }
}
