use anyhow::Result;
use clap::{Parser, Subcommand};

use rwn_core::analyze;

#[derive(Parser)]
#[command(name = "rwn")]
#[command(about = "Rowing Workout Notation parser and validator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse notation and print the full analysis
    Parse {
        /// Notation string, e.g. "4x500m/1:00r"
        notation: String,

        /// Emit the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate notation and report diagnostics (exit code 1 on errors)
    Check {
        /// Notation string to validate
        notation: String,
    },

    /// Print the canonical form, display name, and estimates
    Name {
        /// Notation string to canonicalize
        notation: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Parse { notation, json } => {
            let analysis = analyze(&notation)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                println!("{:#?}", analysis.segments);
                for diagnostic in &analysis.diagnostics {
                    println!("{diagnostic}");
                }
            }
        }

        Commands::Check { notation } => match analyze(&notation) {
            Ok(analysis) => {
                for diagnostic in &analysis.diagnostics {
                    println!("{diagnostic}");
                }
                if !analysis.valid {
                    std::process::exit(1);
                }
                println!("ok: {}", analysis.canonical_text);
            }
            Err(err) => {
                eprintln!("{err}");
                std::process::exit(1);
            }
        },

        Commands::Name { notation } => {
            let analysis = analyze(&notation)?;
            println!("canonical: {}", analysis.canonical_text);
            println!("name:      {}", analysis.display_name);
            match analysis.duration_seconds {
                Some(seconds) => println!("duration:  {seconds}s"),
                None => println!("duration:  unknown"),
            }
            match analysis.work_meters {
                Some(meters) => println!("work:      {meters}m"),
                None => println!("work:      unknown"),
            }
        }
    }

    Ok(())
}
