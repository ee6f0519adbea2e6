use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use is_terminal::IsTerminal;
use std::path::PathBuf;
use tracing::{Level, warn};
use tracing_subscriber::EnvFilter;
use walkalike::areas::session::Session;
use walkalike::artifacts::core::settings::{
    DEFAULT_INSPECTOR, DEFAULT_PRECISION, DEFAULT_QUEUE_CAPACITY, Settings, default_cache_dir,
};

#[derive(Parser)]
#[command(
    name = "walkalike",
    version,
    author = "Sami Barbut-Dica",
    about = "Estimate how similar file trees are",
    long_about = "Fingerprints every file of each tree by path and by content, \
    then compares the fingerprint sets with a Jaccard index. \
    Trees are directories or disk images listed through virt-ls.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[arg(short, long, global = true, action = ArgAction::Count, help = "More logging, repeatable")]
    verbose: u8,
    #[arg(short, long, global = true, action = ArgAction::Count, help = "Less logging, repeatable")]
    quiet: u8,
    #[arg(
        long,
        global = true,
        env = "WALKALIKE_CACHE_DIR",
        help = "Directory holding cached image indexes"
    )]
    cache_dir: Option<PathBuf>,
    #[arg(long, global = true, help = "Neither read nor write the image index cache")]
    no_cache: bool,
    #[arg(
        long,
        global = true,
        env = "WALKALIKE_WORKERS",
        value_parser = clap::value_parser!(u16).range(1..),
        help = "Number of hashing workers [default: number of CPUs]"
    )]
    workers: Option<u16>,
    #[arg(
        long,
        global = true,
        default_value_t = DEFAULT_QUEUE_CAPACITY,
        help = "Capacity of the queue feeding the hashing workers"
    )]
    queue_capacity: usize,
    #[arg(
        long,
        global = true,
        env = "WALKALIKE_INSPECTOR",
        default_value = DEFAULT_INSPECTOR,
        help = "Program listing the files of disk images"
    )]
    inspector: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "compare",
        about = "Compare the first tree against every other one",
        long_about = "This command indexes every tree and prints, for each tree after the first, \
        its similarity with the first one followed by both paths."
    )]
    Compare {
        #[arg(short, long, help = "Also print content and path similarity")]
        detailed: bool,
        #[arg(long, default_value_t = DEFAULT_PRECISION, help = "Digits after the decimal point")]
        precision: usize,
        #[arg(index = 1, num_args = 2.., required = true, help = "Directories or disk images")]
        roots: Vec<PathBuf>,
    },
    #[command(
        name = "ls-index",
        about = "List the tokens of a tree",
        long_about = "This command prints the path and content checksum of every file of a tree, \
        sorted by path checksum."
    )]
    LsIndex {
        #[arg(index = 1, help = "Directory or disk image")]
        root: PathBuf,
    },
    #[command(
        name = "cksum",
        about = "Print the checksum and size of files",
        long_about = "This command prints the POSIX cksum CRC and byte count of every file."
    )]
    Cksum {
        #[arg(index = 1, required = true)]
        files: Vec<PathBuf>,
    },
    #[command(
        name = "hash-path",
        about = "Print the checksum of normalized paths",
        long_about = "This command normalizes every path and prints the checksum used as \
        the path half of a token."
    )]
    HashPath {
        #[arg(index = 1, required = true)]
        paths: Vec<String>,
    },
}

impl Cli {
    fn settings(&self) -> Settings {
        let mut settings = Settings {
            cache_dir: self.cache_dir.clone().unwrap_or_else(default_cache_dir),
            use_cache: !self.no_cache,
            queue_capacity: self.queue_capacity,
            inspector: self.inspector.clone(),
            ..Settings::default()
        };

        if let Some(workers) = self.workers {
            settings.workers = workers as usize;
        }
        if let Commands::Compare { precision, .. } = self.command {
            settings.precision = precision;
        }

        settings
    }
}

fn init_tracing(verbose: u8, quiet: u8) {
    let level = match 1 + verbose as i16 - quiet as i16 {
        i16::MIN..=0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact()
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    let session = Session::new(cli.settings(), Box::new(std::io::stdout()))?;

    let cancel = session.cancellation().clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, stopping");
            cancel.cancel();
        }
    });

    match &cli.command {
        Commands::Compare { detailed, roots, .. } => {
            session.compare(roots, *detailed).await?;
        }
        Commands::LsIndex { root } => session.ls_index(root).await?,
        Commands::Cksum { files } => session.cksum(files)?,
        Commands::HashPath { paths } => session.hash_path(paths)?,
    }

    session.writer().flush()?;

    Ok(())
}
