mod commands;
mod terminal;

use std::future::Future;
use std::time::Duration;

use anyhow::Context;
use commands::{CommandLine, Commands, adapters, discover, list, mac, rename, save};
use lanroster_common::config::Config;
use lanroster_common::network::mac::HardwareIdStyle;
use terminal::{logging, print};

/// How long exit waits for reverse lookups that already timed out.
const SHUTDOWN_GRACE: Duration = Duration::from_millis(250);

fn main() -> anyhow::Result<()> {
    let commands = CommandLine::parse_args();

    logging::init(commands.verbose, commands.quiet)?;

    let mut cfg = Config {
        registry_path: commands.registry,
        no_dns: commands.no_dns,
        interface: commands.interface,
        quiet: commands.quiet,
        ..Config::default()
    };

    match commands.command {
        Commands::Discover(args) => {
            if let Some(ms) = args.timeout_ms {
                cfg.probe_timeout = Duration::from_millis(ms);
            }
            print::header("getting ready for discovery", cfg.quiet);
            block_on_bounded(discover::discover(args, &cfg), SHUTDOWN_GRACE)?
        }
        Commands::List => list::list(&cfg),
        Commands::Save {
            address,
            hardware_id,
            name,
        } => save::save(address, &hardware_id, &name, &cfg),
        Commands::Rename { address, name } => rename::rename(address, &name, &cfg),
        Commands::Adapters => adapters::adapters(&cfg),
        Commands::Mac { address, style } => {
            let style = style.map(HardwareIdStyle::from).unwrap_or_else(HardwareIdStyle::native);
            mac::mac(address, style, &cfg)
        }
    }
}

/// Runs `fut` on a fresh runtime and gives blocking tasks still in flight at
/// most `grace` to finish once it completes.
fn block_on_bounded<F: Future>(fut: F, grace: Duration) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let output = runtime.block_on(fut);
    runtime.shutdown_timeout(grace);
    Ok(output)
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
