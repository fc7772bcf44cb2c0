use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use zone_syncer::error::Result;
use zone_syncer::provider::cloudflare::Cloudflare;
use zone_syncer::sync::ZoneSyncer;
use zone_syncer::zone::Zone;

mod config;
mod logging;

/// Manage hosted DNS zones from YAML files.
///
/// `import` writes the live zone as YAML, `apply` pushes the content of a
/// YAML file to the hosted zone.
#[derive(Parser)]
#[command(version)]
struct Args {
    /// Enable debugging output
    #[arg(long)]
    debug: bool,

    /// Disable all output to the console
    #[arg(long)]
    quiet: bool,

    /// Log to this file in addition to the console
    #[arg(long)]
    logfile: Option<PathBuf>,

    /// Provider config file holding credentials
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Apply the zone content of SOURCE to the hosted ZONE
    Apply {
        source: PathBuf,
        zone: String,

        /// Classify and report without changing the hosted zone
        #[arg(long)]
        dryrun: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
    /// Export the hosted ZONE as YAML to DEST, or stdout
    Import { zone: String, dest: Option<PathBuf> },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let args = Args::parse();

    if let Err(e) = logging::init(args.debug, args.quiet, args.logfile.as_deref()) {
        eprintln!("failed to set up logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run(args).await {
        log::error!("{}", e);
        std::process::exit(e.exit_code());
    }
}

async fn run(args: Args) -> Result<()> {
    match args.command {
        Command::Apply {
            source,
            zone,
            dryrun,
            yes,
        } => {
            if !dryrun && !yes && !confirm("Are you sure you want to sync to cloudflare?")? {
                log::info!("aborted");
                return Ok(());
            }
            apply(source, &zone, dryrun, args.config).await
        }
        Command::Import { zone, dest } => import(&zone, dest, args.config).await,
    }
}

async fn apply(source: PathBuf, zone: &str, dryrun: bool, config: Option<PathBuf>) -> Result<()> {
    log::info!("reading zone content from {}", source.display());
    let local = Zone::from_yaml_file(&source)?;

    log::info!("reading zone content from cloudflare");
    let auth = config::resolve_auth(config.as_deref())?;
    let remote = Cloudflare::open(auth, zone).await?;
    local.origin().ensure_same(remote.origin())?;

    let mut syncer = ZoneSyncer::load(&local, &remote, dryrun).await?;
    let result = syncer.run().await.map(|_| ());
    syncer.report();
    result
}

async fn import(zone: &str, dest: Option<PathBuf>, config: Option<PathBuf>) -> Result<()> {
    let auth = config::resolve_auth(config.as_deref())?;
    let remote = Cloudflare::open(auth, zone).await?;
    let zone = remote.zone().await?;

    match dest {
        Some(dest) => {
            log::info!("importing {} from cloudflare writing to {}", zone.origin(), dest.display());
            zone.write(&dest)?;
            log::info!("wrote zone to {}", dest.display());
        }
        None => print!("{}", zone.to_yaml()?),
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
