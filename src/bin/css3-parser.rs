use std::fs;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use sheen::css::parser_config::ParserConfig;
use sheen::css::properties::bytecode::Style;
use sheen::css::stylesheet::{Rule, Stylesheet};
use sheen::styling::useragent::load_default_useragent_stylesheet;
use sheen::styling::{select_style, ComputedStyle, Rank};
use sheen::testing;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    let matches = clap::Command::new("Sheen CSS parser")
        .version("0.1.0")
        .arg(
            clap::Arg::new("file")
                .help("The stylesheet to parse")
                .required(true)
                .index(1),
        )
        .arg(
            clap::Arg::new("debug")
                .help("Enable debug logging")
                .short('d')
                .long("debug")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("tokens")
                .help("Just print the tokens")
                .long("tokens")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("events")
                .help("Just print the parser events")
                .long("events")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("chunk-size")
                .help("Feed the input in chunks of this many bytes (0 feeds it at once)")
                .long("chunk-size")
                .value_parser(clap::value_parser!(usize))
                .default_value("0"),
        )
        .arg(
            clap::Arg::new("quirks")
                .help("Parse in quirks mode")
                .long("quirks")
                .action(clap::ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("config")
                .help("Read the parser configuration from a json file")
                .long("config"),
        )
        .arg(
            clap::Arg::new("select")
                .help("Cascade the rules with this selector and print the computed style")
                .long("select"),
        )
        .get_matches();

    if matches.get_flag("debug") {
        SimpleLogger::new().with_level(log::LevelFilter::Trace).init()?;
    }

    let path = matches.get_one::<String>("file").context("missing file")?;
    let chunk_size = matches.get_one::<usize>("chunk-size").copied().unwrap_or_default();

    let mut config = match matches.get_one::<String>("config") {
        Some(file) => {
            let json = fs::read_to_string(file).with_context(|| format!("could not read {file}"))?;
            serde_json::from_str::<ParserConfig>(&json).with_context(|| format!("invalid configuration in {file}"))?
        }
        None => ParserConfig::default(),
    };
    if matches.get_flag("quirks") {
        config.quirks = true;
    }
    if config.source.is_none() {
        config.source = Some(path.clone());
    }

    let css = fs::read(path).with_context(|| format!("could not read {path}"))?;

    if matches.get_flag("tokens") {
        for token in testing::tokens(&css, chunk_size, &config)? {
            println!("{token}");
        }
        return Ok(());
    }

    if matches.get_flag("events") {
        for event in testing::events(&css, chunk_size, config)? {
            println!("{event}");
        }
        return Ok(());
    }

    let sheet = testing::stylesheet(&css, chunk_size, config)?;

    if let Some(selector) = matches.get_one::<String>("select") {
        let style = select(&sheet, selector)?;
        print_computed(&style);
        return Ok(());
    }

    print_stylesheet(&sheet);
    Ok(())
}

/// Cascades the user agent and author rules whose selector reads exactly as `selector`
fn select(sheet: &Stylesheet, selector: &str) -> Result<ComputedStyle> {
    let useragent = load_default_useragent_stylesheet()?;

    let mut matches: Vec<(Arc<Style>, Rank)> = Vec::new();
    for sheet in [&useragent, sheet] {
        for rule in sheet.style_rules("screen") {
            if let Some(s) = rule.selectors.iter().find(|s| s.to_string() == selector) {
                matches.push((rule.style.clone(), Rank::new(sheet.origin, s.specificity())));
            }
        }
    }
    if matches.is_empty() {
        bail!("no rule matches {selector}");
    }

    Ok(select_style(matches, None)?)
}

fn print_stylesheet(sheet: &Stylesheet) {
    println!("stylesheet {} ({:?})", sheet.location.as_deref().unwrap_or("-"), sheet.origin);
    if sheet.quirks_used {
        println!("  quirks were needed to parse this stylesheet");
    }
    for rule in &sheet.rules {
        match rule {
            Rule::Style(rule) => print_style(&join(&rule.selectors), &rule.style, 1),
            Rule::Charset(charset) => println!("  @charset {charset:?}"),
            Rule::Import { url, media } => println!("  @import {url:?} {}", join(media)),
            Rule::Media { media, rules } => {
                println!("  @media {}", join(media));
                for rule in rules {
                    print_style(&join(&rule.selectors), &rule.style, 2);
                }
            }
            Rule::Page { selector, style } => {
                let name = selector.as_ref().map(|s| format!(" :{s}")).unwrap_or_default();
                print_style(&format!("@page{name}"), style, 1);
            }
        }
    }
}

fn print_style(header: &str, style: &Style, depth: usize) {
    let indent = "  ".repeat(depth);
    println!("{indent}{header}");
    for opv in style.instructions() {
        let important = if opv.is_important() { " !important" } else { "" };
        let value = if opv.is_inherit() { "inherit".to_string() } else { format!("{:#x}", opv.value) };
        println!("{indent}  {}: {value}{important}", opv.property);
    }
}

fn print_computed(style: &ComputedStyle) {
    println!("display: {}", style.display());
    println!("position: {}", style.position());
    println!("float: {}", style.float());
    println!("color: {:?}", style.color());
    println!("background-color: {:?}", style.background_color());
    println!("font-family: {:?}", style.font_family());
    println!("font-size: {:?}", style.font_size());
    println!("font-weight: {}", style.font_weight());
    println!("font-style: {}", style.font_style());
    println!("line-height: {:?}", style.line_height());
    println!("text-align: {}", style.text_align());
    println!("text-decoration: {:#x}", style.text_decoration());
    println!("white-space: {}", style.white_space());
    for (edge, margin, padding) in [
        ("top", style.margin_top(), style.padding_top()),
        ("right", style.margin_right(), style.padding_right()),
        ("bottom", style.margin_bottom(), style.padding_bottom()),
        ("left", style.margin_left(), style.padding_left()),
    ] {
        println!("margin-{edge}: {margin:?}");
        println!("padding-{edge}: {padding:?}");
    }
    println!("width: {:?}", style.width());
    println!("height: {:?}", style.height());
}

fn join<T: std::fmt::Display>(items: &[T]) -> String {
    items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}
