//! Arcana command-line interface
//!
//! Draws spreads, restores past readings from card ids and browses the
//! reference deck. Reference data is read from `--data`, the `data_dir`
//! config key, or `./data`.

mod config;

use std::path::PathBuf;

use anyhow::{Context, Result};
use arcana_core::{
    export_text, summary_text, Catalog, Draw, InterpretationBias, OutputMode, ReadingResult, ReadingService, Stratum,
};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::CliConfig;

#[derive(Parser)]
#[command(name = "arcana")]
#[command(about = "Draw and interpret Arcana spreads")]
#[command(version)]
struct Cli {
    /// Config file (YAML)
    #[arg(short, long, env = "ARCANA_CONFIG")]
    config: Option<String>,

    /// Reference data root
    #[arg(short, long, env = "ARCANA_DATA")]
    data: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Draw a spread and interpret it
    Draw {
        /// Spread id
        #[arg(short, long)]
        spread: Option<String>,

        /// Allow the same card in more than one position
        #[arg(long, overrides_with = "no_allow_repeats")]
        allow_repeats: bool,

        /// Draw every card at most once, even if the config allows repeats
        #[arg(long, overrides_with = "allow_repeats")]
        no_allow_repeats: bool,

        #[command(flatten)]
        reading: ReadingArgs,
    },

    /// Rebuild a reading from its card ids, in position order
    Restore {
        /// Spread id
        #[arg(short, long)]
        spread: String,

        /// Card ids, one per position
        #[arg(required = true)]
        cards: Vec<String>,

        #[command(flatten)]
        reading: ReadingArgs,
    },

    /// List spreads
    Spreads,

    /// List cards
    Cards {
        /// Only cards of this stratum
        #[arg(long)]
        stratum: Option<String>,

        /// Only cards of this element
        #[arg(long)]
        element: Option<String>,
    },

    /// Load and validate the reference data
    Validate,
}

#[derive(Args)]
struct ReadingArgs {
    /// Output mode (concise, layered, scholarly)
    #[arg(short, long)]
    mode: Option<String>,

    /// Interpretation bias (Auto, PreferCore, PreferShadow, StrictAuto)
    #[arg(short, long)]
    bias: Option<String>,

    /// Seed recorded with, or used for, the draw
    #[arg(long)]
    seed: Option<u64>,

    /// Question the reading answers
    #[arg(short, long)]
    question: Option<String>,

    /// Print the full reading as JSON
    #[arg(long, conflicts_with_all = ["summary", "export"])]
    json: bool,

    /// Print a short summary
    #[arg(long, conflicts_with = "export")]
    summary: bool,

    /// Print the plain-text export
    #[arg(long)]
    export: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(fmt::layer().with_writer(std::io::stderr).without_time())
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let data_dir = config.data_dir(cli.data);
    let catalog = Catalog::load(&data_dir)
        .with_context(|| format!("Failed to load reference data from {}", data_dir.display()))?;
    let service = ReadingService::new(catalog);

    match cli.command {
        Commands::Draw {
            spread,
            allow_repeats,
            no_allow_repeats,
            reading,
        } => {
            let spread = match spread.or_else(|| config.default_spread.clone()) {
                Some(spread) => spread,
                None => service
                    .spreads()
                    .first()
                    .map(|spread| spread.id.clone())
                    .context("No spreads are defined")?,
            };
            let allow_repeats = flag_or_config(allow_repeats, no_allow_repeats, config.allow_repeats);
            let seed = reading.seed.or(config.seed);

            let draw = service.draw(&spread, allow_repeats, seed)?;
            read(service, &config, &draw, &reading)?;
        }

        Commands::Restore {
            spread,
            cards,
            reading,
        } => {
            let draw = service.restore_draw(&spread, &cards, reading.seed)?;
            read(service, &config, &draw, &reading)?;
        }

        Commands::Spreads => {
            for spread in service.spreads() {
                println!(
                    "{:<28} {} ({} cards, axis {})",
                    spread.id, spread.name, spread.card_count, spread.axis_index
                );
            }
        }

        Commands::Cards { stratum, element } => {
            let stratum = stratum
                .map(|value| value.parse::<Stratum>())
                .transpose()?;

            let cards = service.cards().iter().filter(|card| {
                stratum.map_or(true, |stratum| card.stratum == stratum)
                    && element.as_deref().map_or(true, |element| {
                        card.element().is_some_and(|own| own.eq_ignore_ascii_case(element.trim()))
                    })
            });

            for card in cards {
                println!(
                    "{:<32} {:<28} {:<9} {:<8} {:+}",
                    card.id, card.name, card.stratum, card.polarity, card.polarity_weight
                );
            }
        }

        Commands::Validate => {
            println!("Reference data OK: {}", data_dir.display());
            println!("  Spreads: {}", service.spreads().len());
            println!("  Output modes: {}", service.output_modes().len());
            println!("  Cards: {}", service.deck().len());
            for (stratum, count) in service.deck().counts_by_stratum() {
                println!("    {}: {}", stratum, count);
            }
        }
    }

    Ok(())
}

/// Interpret a draw and print it in the requested form.
fn read(service: ReadingService, config: &CliConfig, draw: &Draw, args: &ReadingArgs) -> Result<()> {
    let mode = args
        .mode
        .as_deref()
        .or(config.default_output_mode.as_deref())
        .map(OutputMode::from_id)
        .unwrap_or_default();
    let bias = args
        .bias
        .as_deref()
        .or(config.interpretation_bias.as_deref())
        .map(InterpretationBias::from_id)
        .unwrap_or_default();

    let service = service.with_bias(bias);
    let result = service.interpret(draw, mode, normalize_question(args.question.as_deref()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if args.summary {
        println!("{}", summary_text(&result, service.doctrine(), bias, Utc::now()));
    } else if args.export {
        println!("{}", export_text(&result, Utc::now()));
    } else {
        print_reading(&result);
        println!();
        println!("{}", restore_hint(draw));
    }

    Ok(())
}

/// Resolve a `--flag`/`--no-flag` pair against a config value.
fn flag_or_config(on: bool, off: bool, config: Option<bool>) -> bool {
    if on {
        true
    } else if off {
        false
    } else {
        config.unwrap_or(false)
    }
}

/// Trimmed question, or `None` when blank.
fn normalize_question(question: Option<&str>) -> Option<&str> {
    question.map(str::trim).filter(|question| !question.is_empty())
}

fn print_reading(result: &ReadingResult) {
    let header = &result.header;

    println!("{}", result.spread_name);
    if let Some(question) = &result.question {
        println!("Question: {}", question);
    }
    println!(
        "Scale: {}  Era: {}  Dominant: {}",
        header.scale,
        header.era_state,
        header.dominant_element.as_deref().unwrap_or("None")
    );
    if header.escalation {
        println!("Escalation: {}", header.escalation_reasons.join("; "));
    }
    if header.moderation {
        println!("Moderation: {}", header.moderation_reasons.join("; "));
    }
    println!();
    println!("{}", result.narrative);
}

/// The command that reproduces this draw.
fn restore_hint(draw: &Draw) -> String {
    let mut hint = format!("Restore: arcana restore --spread {} {}", draw.spread.id, draw.card_ids().join(" "));
    if let Some(seed) = draw.seed {
        hint.push_str(&format!(" --seed {}", seed));
    }
    hint
}
