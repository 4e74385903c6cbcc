//! Bracken CLI
//!
//! Convert BBCode to HTML (or HTML back to BBCode) from files or stdin,
//! with an optional JSON options file and a token-tree debug printer.

use std::fs;
use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use owo_colors::OwoColorize;

use bracken_bbcode::{ConversionOptions, TokenForest, TokenId, TokenKind};
use bracken_dom::reader::parse_fragment;
use bracken_engine::BBCodeEngine;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum InputFormat {
    /// BBCode markup text (converted to HTML).
    Bbcode,
    /// An HTML fragment (converted to BBCode).
    Html,
}

#[derive(Debug, Parser)]
#[command(name = "bracken", version, about = "BBCode \u{21c4} HTML converter")]
struct Cli {
    /// Input file; `-` or absent reads stdin.
    input: Option<PathBuf>,

    /// What the input is.
    #[arg(long, value_enum, default_value = "bbcode")]
    from: InputFormat,

    /// Emit a fragment: no per-line container wrapping (BBCode input),
    /// or within-code whitespace handling off (HTML input).
    #[arg(long)]
    fragment: bool,

    /// JSON file of conversion options (camelCase keys).
    #[arg(long)]
    options: Option<PathBuf>,

    /// Print the parsed token tree instead of converting.
    #[arg(long)]
    tree: bool,

    /// Write the result here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let input = read_input(cli.input.as_ref())?;
    let options = match &cli.options {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading options file {}", path.display()))?;
            serde_json::from_str::<ConversionOptions>(&text)
                .with_context(|| format!("parsing options file {}", path.display()))?
        }
        None => ConversionOptions::default(),
    };
    let engine = BBCodeEngine::with_options(options);

    if cli.tree {
        if cli.from != InputFormat::Bbcode {
            bail!("--tree requires BBCode input");
        }
        print_forest(&engine.parse(&input));
        return Ok(());
    }

    let result = match (cli.from, cli.fragment) {
        (InputFormat::Bbcode, false) => engine.to_html(&input),
        (InputFormat::Bbcode, true) => engine.to_html_fragment(&input),
        (InputFormat::Html, false) => engine.to_markup(&parse_fragment(&input)),
        (InputFormat::Html, true) => engine.to_markup_fragment(&parse_fragment(&input), false),
    };

    match &cli.output {
        Some(path) => fs::write(path, result)
            .with_context(|| format!("writing output file {}", path.display()))?,
        None => println!("{result}"),
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) if path.as_os_str() != "-" => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        _ => {
            let mut buffer = String::new();
            let _ = std::io::stdin()
                .read_to_string(&mut buffer)
                .context("reading stdin")?;
            Ok(buffer)
        }
    }
}

/// Pretty-print a token forest, one node per line.
fn print_forest(forest: &TokenForest) {
    for &root in forest.roots() {
        print_node(forest, root, 0);
    }
}

fn print_node(forest: &TokenForest, id: TokenId, indent: usize) {
    let Some(node) = forest.get(id) else { return };
    let prefix = "  ".repeat(indent);
    match node.token.kind {
        TokenKind::Open => {
            println!("{prefix}{}", node.token.raw.cyan());
        }
        TokenKind::Newline => println!("{prefix}{}", "\u{23ce}".dimmed()),
        _ => {
            let display = node.token.raw.replace('\n', "\\n");
            println!("{prefix}\"{display}\"");
        }
    }
    for &child in &node.children {
        print_node(forest, child, indent + 1);
    }
}
