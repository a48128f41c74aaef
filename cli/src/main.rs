use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use chateau::{compile_files, compile_files_to_path, compile_schema_to_rust, schema_to_json, CompileError};

#[derive(Parser)]
#[command(name = "chateau")]
#[command(about = "Compile Chateau schemas into Rust records with binary encoders and decoders", long_about = None)]
struct Cli {
    /// Raise log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` wins when set.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate Rust code from one or more `.chateau` schemas
    GenRust {
        /// Input `.chateau` files, scanned in parallel and resolved together
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,

        /// Output `.rs` file (if omitted, prints to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scan and resolve schemas without generating anything
    Check {
        /// Input `.chateau` files
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },

    /// Print the resolved schema as JSON
    Inspect {
        /// Input `.chateau` files
        #[arg(short, long, required = true, num_args = 1..)]
        input: Vec<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    // stdout carries generated code and JSON, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), CompileError> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::GenRust { input, output } => {
            if let Some(out_path) = output {
                let schema = compile_files_to_path(input, out_path)?;
                println!("Generated {} objects into {}", schema.len(), out_path.display());
            } else {
                let schema = compile_files(input)?;
                print!("{}", compile_schema_to_rust(&schema));
            }
            Ok(())
        }

        Commands::Check { input } => {
            let schema = compile_files(input)?;
            let fields: usize = schema.objects().map(|o| o.fields.len()).sum();
            println!(
                "{}: {} objects, {} fields, package {}",
                if input.len() == 1 { input[0].display().to_string() } else { format!("{} files", input.len()) },
                schema.len(),
                fields,
                schema.package.as_deref().unwrap_or("<none>")
            );
            Ok(())
        }

        Commands::Inspect { input } => {
            let schema = compile_files(input)?;
            println!("{}", schema_to_json(&schema)?);
            tracing::debug!(objects = schema.len(), "printed schema");
            Ok(())
        }
    }
}
