//! Widget Press CLI
//!
//! Usage:
//!   widget-press [OPTIONS] <COMMAND>
//!
//! Commands:
//!   render <DOCUMENT>  Render a document (JSON) to markup
//!   convert [FILE]     Print the preview tree for a markup file
//!   save <DEFINITION>  Validate a definition and save it to the widget directory
//!   list               List widget definitions by category
//!   style <TEXT>       Parse an inline style declaration
//!
//! Options:
//!   -w, --widgets <DIR>      Widget definition directory
//!   -t, --templates <DIR>    Template directory
//!   -s, --stylesheet <FILE>  Preview palette (TOML format)
//!   -v, --verbose            Debug logging

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use indexmap::IndexMap;
use tracing_subscriber::EnvFilter;

use widget_press::parser::prepare;
use widget_press::{
    convert_with, parse_style_with, ConversionStatus, Document, FsTemplateStore, MarkupError,
    ParserConfig, RenderConfig, Stylesheet, TemplateRenderer, UserMode, WidgetDefinition,
    WidgetOutcome, WidgetRegistry,
};

#[derive(Parser)]
#[command(name = "widget-press")]
#[command(about = "Assemble documents from reusable widget blocks")]
struct Cli {
    /// Widget definition directory (*.json, *.toml)
    #[arg(short, long, default_value = "widgets", global = true)]
    widgets: PathBuf,

    /// Template directory
    #[arg(short, long, default_value = "templates", global = true)]
    templates: PathBuf,

    /// Stylesheet file for the preview palette (TOML format)
    #[arg(short, long, global = true)]
    stylesheet: Option<PathBuf>,

    /// Debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a document (JSON, `-` for stdin) to markup
    Render {
        document: PathBuf,

        /// Print the preview tree instead of markup
        #[arg(long)]
        tree: bool,

        /// Emit only the widget fragments, without the page around them
        #[arg(long)]
        fragment: bool,

        /// No indentation
        #[arg(long)]
        compact: bool,

        /// Generation date for the footer (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the preview tree for a markup file (stdin if omitted)
    Convert {
        input: Option<PathBuf>,

        /// Reject a container opening tag that never closes
        #[arg(long)]
        strict: bool,

        /// Print the tree as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a definition file and save it as `<id>.json` in the widget directory
    Save { definition: PathBuf },
    /// List widget definitions grouped by category
    List {
        /// Only definitions available in this mode
        #[arg(short, long)]
        mode: Option<UserMode>,
    },
    /// Parse an inline style declaration and print the result
    Style { text: String },
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let stylesheet = match &cli.stylesheet {
        Some(path) => match Stylesheet::from_file(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading stylesheet '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Stylesheet::default(),
    };

    match cli.command {
        Command::Render {
            document,
            tree,
            fragment,
            compact,
            date,
        } => {
            let registry = load_registry(&cli.widgets);
            let store = FsTemplateStore::new(&cli.templates);
            let document = read_document(&document);

            let config = RenderConfig::new()
                .with_standalone(!fragment)
                .with_pretty_print(!compact);
            let renderer = TemplateRenderer::new(&registry, &store).with_config(config);
            let rendered = match date {
                Some(date) => renderer.render_at(&document, date),
                None => renderer.render(&document),
            };

            for outcome in &rendered.outcomes {
                if let WidgetOutcome::Omitted {
                    instance_id,
                    definition_id,
                } = outcome
                {
                    tracing::warn!(
                        "widget {} not rendered: no definition '{}'",
                        instance_id,
                        definition_id
                    );
                }
            }

            if tree {
                print_tree(
                    &rendered.markup,
                    "<rendered>",
                    &ParserConfig::default(),
                    &stylesheet,
                    false,
                );
            } else {
                println!("{}", rendered.markup);
            }
        }
        Command::Convert {
            input,
            strict,
            json,
        } => {
            let name = input
                .as_ref()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "<stdin>".to_string());
            let markup = read_input(input.as_deref());
            let config = ParserConfig::new().with_strict(strict);
            print_tree(&markup, &name, &config, &stylesheet, json);
        }
        Command::Save { definition } => {
            let def = match WidgetDefinition::from_file(&definition) {
                Ok(def) => def,
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            };
            let registry = load_registry(&cli.widgets);
            match registry.save(&cli.widgets, def) {
                Ok(path) => println!("{}", path.display()),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
        Command::List { mode } => {
            let registry = load_registry(&cli.widgets);
            let groups = match mode {
                Some(mode) => registry.group_by_category(mode),
                None => {
                    let mut groups: IndexMap<String, Vec<_>> = IndexMap::new();
                    for def in registry.all() {
                        groups.entry(def.category.clone()).or_default().push(def);
                    }
                    groups
                }
            };
            for (category, defs) in groups {
                println!("{}", category);
                for def in defs {
                    println!("  {:<24} {}", def.id, def.display_name);
                }
            }
        }
        Command::Style { text } => {
            let record = parse_style_with(&text, &stylesheet);
            match serde_json::to_string_pretty(&record) {
                Ok(json) => println!("{}", json),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_registry(dir: &Path) -> WidgetRegistry {
    let registry = WidgetRegistry::new();
    match registry.load_all(dir) {
        Ok(report) => {
            tracing::debug!(
                "loaded {} widget definitions, {} failures",
                report.loaded.len(),
                report.failures.len()
            );
        }
        Err(e) => {
            eprintln!("Error loading widgets from '{}': {}", dir.display(), e);
            std::process::exit(1);
        }
    }
    registry
}

fn read_input(path: Option<&Path>) -> String {
    match path {
        Some(path) if path != Path::new("-") => match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path.display(), e);
                std::process::exit(1);
            }
        },
        _ => {
            let mut buffer = String::new();
            match io::stdin().read_to_string(&mut buffer) {
                Ok(_) => buffer,
                Err(e) => {
                    eprintln!("Error reading from stdin: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }
}

fn read_document(path: &Path) -> Document {
    let source = read_input(Some(path));
    match serde_json::from_str(&source) {
        Ok(document) => document,
        Err(e) => {
            eprintln!("Error parsing document '{}': {}", path.display(), e);
            std::process::exit(1);
        }
    }
}

fn print_tree(
    markup: &str,
    name: &str,
    config: &ParserConfig,
    stylesheet: &Stylesheet,
    json: bool,
) {
    let conversion = convert_with(markup, config, stylesheet);
    if let ConversionStatus::Degraded(err) = &conversion.status {
        match err {
            // Spans point into the text after placeholder filling
            MarkupError::Syntax { .. } => {
                eprintln!("{}", err.format(&prepare(markup, config), name))
            }
            MarkupError::TooLarge { .. } => eprintln!("Error: {}", err),
        }
    }

    if json {
        match serde_json::to_string_pretty(&conversion.root) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print!("{}", conversion.root);
    }
}
