use anyhow::{Context, Result};
use bus::EventBus;
use clap::Parser;
use css::CssToken;
use dom::{BrowsingContext, Configuration, Document, XmlParserOptions};
use mimalloc::MiMalloc;
use runtime_parse::{CancelSignal, CreateDocumentOptions, load_xml_document_with};
use std::borrow::Cow;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tools::TextSource;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// Load an XML document and print its node outline.
#[derive(Debug, Parser)]
#[command(name = "domforge", version)]
struct Cli {
    /// Input file; stdin when omitted.
    file: Option<PathBuf>,

    /// Fail on malformed markup instead of recovering.
    #[arg(long)]
    strict: bool,

    /// Lowercase tag names while tokenizing and restore SVG spellings.
    #[arg(long)]
    fold_case: bool,

    /// Print the CSS token stream of the input instead.
    #[arg(long)]
    css: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn read_input(file: Option<&PathBuf>) -> Result<TextSource> {
    let bytes = match file {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .context("failed to read stdin")?;
            bytes
        }
    };
    Ok(TextSource::from_bytes(&bytes))
}

fn print_css_tokens(text: &str) {
    for token in css::tokenize(text) {
        let shared = match &token {
            Cow::Borrowed(shared) => {
                std::ptr::eq(*shared, CssToken::whitespace())
                    || std::ptr::eq(*shared, CssToken::comma())
            }
            Cow::Owned(_) => false,
        };
        println!(
            "{:<10} {:?} {:?}{}",
            token.position().to_string(),
            token.kind(),
            token.to_value(),
            if shared { " (shared)" } else { "" }
        );
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Warn
        })
        .parse_default_env()
        .init();

    let source = read_input(cli.file.as_ref())?;
    if cli.css {
        print_css_tokens(source.text());
        return Ok(());
    }

    let events: Arc<EventBus<Document>> = Arc::new(EventBus::new());
    events.subscribe(|event| {
        log::info!(
            "parsing {:?} ({}, {} bytes) in {:?}",
            event.document_id(),
            event.content_type(),
            event.document().source().len(),
            event.context()
        );
    });
    let context = BrowsingContext::with_configuration(Configuration::new().with_events(events));

    let options = XmlParserOptions {
        is_strict: cli.strict,
        fold_case: cli.fold_case,
        ..XmlParserOptions::default()
    };
    let name = cli
        .file
        .as_ref()
        .map_or_else(|| "<stdin>".to_string(), |path| path.display().to_string());
    let document = load_xml_document_with(
        Some(context),
        CreateDocumentOptions::new(source),
        options,
        &CancelSignal::never(),
    )
    .await
    .with_context(|| format!("failed to load {name}"))?;

    print!("{}", document.outline());
    Ok(())
}
