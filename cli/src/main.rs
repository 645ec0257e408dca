//! deckify CLI - text and markdown to PowerPoint decks
//!
//! A command-line tool for planning slide outlines and rendering them into
//! an existing .pptx/.potx template.

use clap::{Args, Parser, Subcommand};
use colored::*;
use deckify::{build_deck, heuristic_outline, Outline, RemoteConfig, RemotePlanner};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;

/// Text and markdown to PowerPoint decks
#[derive(Parser)]
#[command(
    name = "deckify",
    version,
    about = "Turn text and markdown into slide decks",
    long_about = "deckify - turn free-form text or markdown into a PowerPoint deck.\n\n\
                  Plans a slide outline (locally, or via a language-model provider\n\
                  when an API key is supplied) and renders it into an existing\n\
                  presentation template."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Options for planning an outline remotely instead of heuristically.
#[derive(Args)]
struct RemoteArgs {
    /// Language-model provider (openai, anthropic, gemini, openai-compatible)
    #[arg(long)]
    provider: Option<String>,

    /// API key for the provider (never stored)
    #[arg(long)]
    api_key: Option<String>,

    /// Model name override
    #[arg(long)]
    model: Option<String>,

    /// Base URL for openai-compatible providers
    #[arg(long)]
    base_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Plan a slide outline from a text/markdown file and print it as JSON
    Outline {
        /// Input text or markdown file
        input: PathBuf,

        /// Output file path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// One-line guidance carried into the deck title
        #[arg(short, long, default_value = "")]
        guidance: String,

        /// Include (empty) speaker-notes fields on every slide
        #[arg(long)]
        notes: bool,

        /// Output compact JSON (no indentation)
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Render a text/markdown file into a presentation template
    Generate {
        /// Input text or markdown file
        input: PathBuf,

        /// Presentation template (.pptx or .potx)
        #[arg(short, long)]
        template: PathBuf,

        /// Output presentation path
        #[arg(short, long, default_value = "deckify.pptx")]
        output: PathBuf,

        /// One-line guidance carried into the deck title
        #[arg(short, long, default_value = "")]
        guidance: String,

        /// Generate speaker-notes fields on every slide
        #[arg(long)]
        notes: bool,

        #[command(flatten)]
        remote: RemoteArgs,
    },

    /// Show what a template has to offer (layouts, media, slides)
    Info {
        /// Presentation template (.pptx or .potx)
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Outline {
            input,
            output,
            guidance,
            notes,
            compact,
            remote,
        } => {
            let text = fs::read_to_string(&input)?;
            let pb = create_spinner("Planning outline...");
            let outline = plan_outline(&text, &guidance, notes, &remote);
            pb.finish_and_clear();

            let json = if compact {
                outline.to_json_compact()?
            } else {
                outline.to_json()?
            };
            write_output(output.as_ref(), &json)?;

            if let Some(path) = output {
                println!(
                    "{} Planned {} slides: {}",
                    "✓".green().bold(),
                    outline.estimated_slide_count,
                    path.display()
                );
            }
        }

        Commands::Generate {
            input,
            template,
            output,
            guidance,
            notes,
            remote,
        } => {
            let text = fs::read_to_string(&input)?;
            let template_bytes = fs::read(&template)?;

            let pb = create_spinner("Planning outline...");
            let outline = plan_outline(&text, &guidance, notes, &remote);

            pb.set_message("Rendering deck...");
            let deck = build_deck(&outline, &template_bytes)?;
            pb.finish_and_clear();

            fs::write(&output, deck)?;
            println!(
                "{} Rendered {} slides into {}",
                "✓".green().bold(),
                outline.estimated_slide_count,
                output.display()
            );
        }

        Commands::Info { input } => {
            let pb = create_spinner("Inspecting template...");
            let package = deckify::TemplatePackage::from_bytes(fs::read(&input)?)?;
            let inventory = deckify::TemplateInventory::scan(&package)?;
            pb.finish_and_clear();

            println!("{}", "Template Information".cyan().bold());
            println!("{}", "─".repeat(40));
            println!(
                "{}: {}",
                "File".bold(),
                input.file_name().unwrap_or_default().to_string_lossy()
            );
            println!("{}: {}", "Existing slides".bold(), inventory.max_slide_number);
            println!("{}: {}", "Media images".bold(), inventory.media.len());
            println!("{}: {}", "Layouts".bold(), inventory.layouts.len());
            for layout in &inventory.layouts {
                let name = if layout.name.is_empty() {
                    "(unnamed)".to_string()
                } else {
                    layout.name.clone()
                };
                println!("  {} {}", "·".dimmed(), name);
            }
        }

        Commands::Version => {
            print_version();
        }
    }

    Ok(())
}

/// Plan remotely when a provider and key are given, falling back to the
/// heuristic on any remote failure; plan heuristically otherwise.
fn plan_outline(text: &str, guidance: &str, notes: bool, remote: &RemoteArgs) -> Outline {
    let (provider, api_key) = match (&remote.provider, &remote.api_key) {
        (Some(p), Some(k)) if !k.is_empty() => (p.clone(), k.clone()),
        _ => return heuristic_outline(text, guidance, notes),
    };

    let planned = RemoteConfig::new(&provider, api_key)
        .map(|mut config| {
            if let Some(model) = &remote.model {
                config = config.with_model(model.clone());
            }
            if let Some(base_url) = &remote.base_url {
                config = config.with_base_url(base_url.clone());
            }
            config
        })
        .and_then(RemotePlanner::new)
        .and_then(|planner| {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .map_err(deckify::Error::from)
                .and_then(|rt| rt.block_on(planner.plan(text, guidance, notes)))
        });

    match planned {
        Ok(outline) => outline,
        Err(e) => {
            eprintln!(
                "{}: {} - falling back to heuristic outline",
                "Warning".yellow().bold(),
                e
            );
            heuristic_outline(text, guidance, notes)
        }
    }
}

fn print_version() {
    println!("{} {}", "deckify".green().bold(), env!("CARGO_PKG_VERSION"));
    println!("Turn text and markdown into PowerPoint decks");
    println!();
    println!("Template formats: PPTX, POTX");
    println!("Providers: openai, anthropic, gemini, openai-compatible");
}

fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
            .template("{spinner:.blue} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn write_output(path: Option<&PathBuf>, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            writeln!(handle, "{}", content)?;
        }
    }
    Ok(())
}
