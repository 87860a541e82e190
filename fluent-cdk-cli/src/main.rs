use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use serde_json::{Map, Value};

use fluent_cdk_aws::app_runner::{InstanceSize, default_health_check};

mod manifest;

#[derive(Parser)]
#[command(name = "fluent-cdk")]
#[command(about = "Build AWS construct properties from fragment manifests", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every resource in the manifest and report errors
    Validate {
        /// Path to manifest file
        #[arg(default_value = "fluent-cdk.json")]
        file: PathBuf,
    },
    /// Print the materialized properties of every resource as JSON
    Synth {
        /// Path to manifest file
        #[arg(default_value = "fluent-cdk.json")]
        file: PathBuf,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },
    /// Show live attributes recorded in a deployment outputs file
    Outputs {
        /// Path to manifest file
        #[arg(default_value = "fluent-cdk.json")]
        file: PathBuf,

        /// Deployment outputs file (resource name -> attributes)
        #[arg(long, short)]
        outputs: PathBuf,
    },
    /// List built-in presets
    Presets,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { file } => run_validate(&file),
        Commands::Synth { file, pretty } => run_synth(&file, pretty),
        Commands::Outputs { file, outputs } => run_outputs(&file, &outputs),
        Commands::Presets => run_presets(),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run_validate(file: &PathBuf) -> Result<(), String> {
    let parsed = manifest::load(file)?;

    println!("{}", "Validating...".cyan());

    let specs = manifest::build_all(parsed)?;

    println!(
        "{}",
        format!("✓ {} resources validated successfully.", specs.len())
            .green()
            .bold()
    );

    for spec in &specs {
        println!("  • {}.{}", spec.kind(), spec.name());
    }

    Ok(())
}

fn run_synth(file: &PathBuf, pretty: bool) -> Result<(), String> {
    let specs = manifest::build_all(manifest::load(file)?)?;

    let mut out = Map::new();
    for spec in &specs {
        out.insert(spec.name().to_string(), spec.synth()?);
    }

    let out = Value::Object(out);
    let rendered = if pretty {
        serde_json::to_string_pretty(&out)
    } else {
        serde_json::to_string(&out)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", rendered);

    Ok(())
}

fn run_outputs(file: &PathBuf, outputs_file: &PathBuf) -> Result<(), String> {
    let mut specs = manifest::build_all(manifest::load(file)?)?;
    let mut outputs = manifest::load_outputs(outputs_file)?;

    for spec in specs.iter_mut() {
        if let Some(entry) = outputs.remove(spec.name()) {
            spec.back_fill(entry)?;
        }
    }

    for name in outputs.keys() {
        log::warn!("outputs entry '{}' matches no resource in the manifest", name);
    }

    for spec in &specs {
        let id = format!("{}.{}", spec.kind(), spec.name());
        match spec.live() {
            Ok(Value::Object(attributes)) => {
                println!("{} {}", "✓".green(), id.bold());
                for (key, value) in attributes {
                    let value = value
                        .as_str()
                        .map(str::to_string)
                        .unwrap_or_else(|| value.to_string());
                    println!("    {} = {}", key, value);
                }
            }
            Ok(other) => println!("{} {} {}", "✓".green(), id.bold(), other),
            Err(e) => println!("{} {}", "•".yellow(), e.to_string().yellow()),
        }
    }

    Ok(())
}

fn run_presets() -> Result<(), String> {
    println!("{}", "App Runner instance sizes:".cyan().bold());
    for size in InstanceSize::ALL {
        println!("  • {} / {}", size.cpu, size.memory);
    }

    let health_check = serde_json::to_string(&default_health_check()).map_err(|e| e.to_string())?;
    println!("{}", "App Runner default health check:".cyan().bold());
    println!("  {}", health_check);

    Ok(())
}
