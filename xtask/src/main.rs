// Licensed under the Apache-2.0 license

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod regmap_gen;

#[derive(Parser, Debug)]
#[command(
    name = "xtask",
    author,
    version,
    about = "Register map code generation tasks"
)]
struct Xtask {
    /// Print debug output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate C headers, C sources and Markdown from a JSON register map
    RegmapGen {
        /// JSON register map description
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Directory receiving the generated files
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        options: ConfigArgs,
    },
    /// Validate a JSON register map without generating anything
    RegmapCheck {
        /// JSON register map description
        #[arg(value_name = "FILE")]
        input: PathBuf,

        #[command(flatten)]
        options: ConfigArgs,
    },
}

/// Options shared by the register map commands. Flags override values read
/// from `--config`.
#[derive(Args, Debug, Default)]
pub(crate) struct ConfigArgs {
    /// TOML generator configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Generate the maps that pass validation instead of aborting the run
    #[arg(long)]
    skip_invalid_maps: bool,

    /// Suffix appended to the lowercased map name in output file names
    #[arg(long, value_name = "SUFFIX")]
    file_suffix: Option<String>,

    /// File name of the consolidated Markdown document
    #[arg(long, value_name = "NAME")]
    markdown_file: Option<String>,

    /// Register word width in bits
    #[arg(long, value_name = "BITS")]
    register_width: Option<u32>,
}

fn main() {
    let cli = Xtask::parse();

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialize logger: {e}");
    }

    let result = match &cli.command {
        Commands::RegmapGen {
            input,
            out_dir,
            options,
        } => regmap_gen::generate(input, out_dir, options),
        Commands::RegmapCheck { input, options } => regmap_gen::check(input, options),
    };
    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
