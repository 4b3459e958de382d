use anyhow::Result;
use clap::{Parser, Subcommand};
use docker_wizard::cli::{GenerateArgs, SelectionArgs, commands};
use std::io;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(
    name = "docker-wizard",
    version,
    about = "Detects a project's language and generates a Dockerfile and docker-compose.yml"
)]
struct Cli {
    /// Project root (default: current directory)
    #[arg(long, global = true, env = "DOCKER_WIZARD_ROOT", default_value = ".")]
    root: String,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive step-by-step wizard (default)
    Wizard,
    /// Show the detected language, version and marker files
    Detect,
    /// List selectable services by category
    Services,
    /// Generate files without prompting
    Generate(GenerateArgs),
    /// Show whether each output file is new, same or different
    Preview(SelectionArgs),
    /// Install the bundled service catalog into the project
    Init,
}

fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("docker_wizard=debug")
    } else {
        EnvFilter::new("docker_wizard=warn")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

fn root_dir(raw: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(raw).into_owned())
}

fn run(cli: Cli) -> Result<()> {
    let root = root_dir(&cli.root);
    debug!("project root {:?}", root);

    let mut out = io::stdout().lock();
    match cli.command.unwrap_or(Commands::Wizard) {
        Commands::Wizard => {
            drop(out);
            commands::wizard(&root)
        }
        Commands::Detect => commands::detect(&root, &mut out),
        Commands::Services => commands::services(&root, &mut out),
        Commands::Generate(args) => commands::generate(&root, &args, &mut out),
        Commands::Preview(args) => commands::preview(&root, &args, &mut out),
        Commands::Init => commands::init(&root, &mut out),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        println!("error: {e:#}");
        std::process::exit(1);
    }
}
