use clap::{Parser, Subcommand};
use colored::Colorize;
use env_logger::Env;

mod artifacts;
mod clean;
mod convert;
mod import;
mod paths;
mod resolve;
mod rewrite;
mod table;
mod validate;

#[derive(Parser)]
#[command(name = "jlckit")]
#[command(about = "Generate KiCad library files from LCSC/JLCPCB parts", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short = 'd', long = "debug", global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import LCSC parts into the project library
    #[command(alias = "i")]
    Import(import::ImportArgs),

    /// Remove staging and converter cache directories
    Clean(clean::CleanArgs),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("{} {e}", "Error:".red());
        for cause in e.chain().skip(1) {
            eprintln!("  {cause}");
        }
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Default level depends on --debug; RUST_LOG still wins.
    let env = if cli.debug {
        Env::default().default_filter_or("debug")
    } else {
        Env::default().default_filter_or("info")
    };
    env_logger::Builder::from_env(env).init();

    match cli.command {
        Commands::Import(args) => import::execute(args),
        Commands::Clean(args) => clean::execute(args),
    }
}
