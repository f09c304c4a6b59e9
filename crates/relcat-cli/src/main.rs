mod commands;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use commands::{EXIT_FAILURE, EXIT_INPUT_ERROR, EXIT_SCHEMA_ERROR};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "relcat",
    version,
    about = "Release-metadata catalog tools: normalize release manifests and maintain version ledgers"
)]
struct Cli {
    /// Output results as structured JSON.
    #[arg(long, default_value_t = false, global = true)]
    json: bool,

    /// Enable verbose (debug) logging output.
    #[arg(short, long, default_value_t = false, global = true)]
    verbose: bool,

    /// Enable trace-level logging (more detailed than --verbose).
    #[arg(long, default_value_t = false, global = true)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Convert a cargo-dist plan read from stdin into one version record on stdout.
    Convert {
        /// Config file (defaults to ~/.config/relcat/config.json when present).
        #[arg(long)]
        config: Option<PathBuf>,
        /// Scheme and host that release downloads are served from.
        #[arg(long)]
        download_base: Option<String>,
        /// Organization used when the manifest does not name one.
        #[arg(long)]
        default_org: Option<String>,
        /// Per-request timeout for checksum fetches, in seconds.
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Merge version records read from stdin into a project ledger.
    Insert {
        /// Project name; the ledger is <output>/<name>.ndjson.
        #[arg(long)]
        name: String,
        /// Directory holding the ledgers.
        #[arg(long, default_value = "v1")]
        output: PathBuf,
    },
    /// Check ledgers for schema and ordering problems.
    Verify {
        /// Project to check; every ledger in the output directory when omitted.
        #[arg(long)]
        name: Option<String>,
        /// Directory holding the ledgers.
        #[arg(long, default_value = "v1")]
        output: PathBuf,
    },
    /// Generate shell completions for bash, zsh, fish, elvish, or powershell.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
    /// Generate man pages in the specified directory.
    ManPages {
        /// Output directory for man pages.
        #[arg(default_value = "man")]
        dir: PathBuf,
    },
}

fn main() -> ExitCode {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let msg = info.to_string();
        if msg.contains("Broken pipe")
            || msg.contains("broken pipe")
            || msg.contains("os error 32")
            || msg.contains("failed printing to stdout")
        {
            std::process::exit(0);
        }
        default_hook(info);
    }));

    let cli = Cli::parse();

    let default_level = if cli.trace {
        "trace"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_env("RELCAT_LOG")
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    let json_output = cli.json;

    let result = match cli.command {
        Commands::Convert {
            config,
            download_base,
            default_org,
            timeout,
        } => commands::convert::run(&commands::convert::ConvertOptions {
            config,
            download_base,
            default_org,
            timeout,
        }),
        Commands::Insert { name, output } => commands::insert::run(&name, &output, json_output),
        Commands::Verify { name, output } => {
            commands::verify::run(name.as_deref(), &output, json_output)
        }
        Commands::Completions { shell } => commands::completions::run::<Cli>(shell),
        Commands::ManPages { dir } => commands::man_pages::run::<Cli>(&dir),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(msg) => {
            eprintln!("error: {msg}");
            ExitCode::from(exit_code_for(&msg))
        }
    }
}

fn exit_code_for(msg: &str) -> u8 {
    if msg.starts_with("no input:")
        || msg.starts_with("malformed input")
        || msg.starts_with("invalid release manifest")
        || msg.starts_with("missing release")
        || msg.starts_with("invalid project name")
    {
        EXIT_INPUT_ERROR
    } else if msg.starts_with("schema violation") || msg.starts_with("duplicate version") {
        EXIT_SCHEMA_ERROR
    } else {
        EXIT_FAILURE
    }
}
