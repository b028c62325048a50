//! Spark CLI - inspect how effects would fit scene objects

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{bounds, classify, simulate};
use spark_effects::Element;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "spark")]
#[command(
    about = "Measure, classify and simulate elemental effects on scene objects",
    long_about = None
)]
#[command(version)]
struct Cli {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure entity bounds
    Bounds {
        /// Path to scene file
        scene: String,

        /// Only this entity (default: every root entity)
        #[arg(long)]
        entity: Option<String>,

        /// Express bounds in this entity's local space
        #[arg(long)]
        relative_to: Option<String>,

        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// List every entity with its target type
    Classify {
        /// Path to scene file
        scene: String,

        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },

    /// Attach an effect and run it headless for a number of frames
    Simulate {
        /// Path to scene file
        scene: String,

        /// Name of the entity to attach to
        #[arg(long)]
        target: String,

        /// fire or lightning
        #[arg(long)]
        element: Element,

        #[arg(long, default_value = "1.0")]
        intensity: f32,

        #[arg(long, default_value = "120")]
        frames: u32,

        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,

        /// Seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Effects config file (TOML)
        #[arg(long)]
        config: Option<String>,

        /// Output format
        #[arg(long, default_value = "text", value_parser = ["text", "json"])]
        format: String,
    },
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("warn")
        }
    });

    // Logs go to stderr so JSON on stdout stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Bounds {
            scene,
            entity,
            relative_to,
            format,
        } => bounds::run(bounds::BoundsArgs {
            scene,
            entity,
            relative_to,
            format,
        }),
        Commands::Classify { scene, format } => classify::run(&scene, &format),
        Commands::Simulate {
            scene,
            target,
            element,
            intensity,
            frames,
            dt,
            seed,
            config,
            format,
        } => simulate::run(simulate::SimulateArgs {
            scene,
            target,
            element,
            intensity,
            frames,
            dt,
            seed,
            config,
            format,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_simulate() {
        let cli = Cli::try_parse_from([
            "spark", "simulate", "armory.toml", "--target", "SwordIron", "--element", "lightning",
            "--frames", "10", "--seed", "4",
        ])
        .unwrap();
        match cli.command {
            Commands::Simulate {
                element,
                frames,
                seed,
                intensity,
                ..
            } => {
                assert_eq!(element, Element::Lightning);
                assert_eq!(frames, 10);
                assert_eq!(seed, Some(4));
                assert_eq!(intensity, 1.0);
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn rejects_unknown_element_and_format() {
        assert!(Cli::try_parse_from([
            "spark", "simulate", "a.toml", "--target", "x", "--element", "frost"
        ])
        .is_err());
        assert!(Cli::try_parse_from(["spark", "classify", "a.toml", "--format", "yaml"]).is_err());
    }
}
