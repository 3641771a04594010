pub mod adapters;
pub mod discover;
pub mod list;
pub mod mac;
pub mod rename;
pub mod save;

use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use lanroster_common::config::DEFAULT_REGISTRY_FILE;
use lanroster_common::network::mac::HardwareIdStyle;
use lanroster_common::network::target::{DEFAULT_TARGET, Target};

#[derive(Parser)]
#[command(name = "lanroster")]
#[command(about = "Finds the devices on your LAN and remembers the ones you name.")]
#[command(version)]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,

    /// JSON file holding saved devices
    #[arg(long, global = true, env = "LANROSTER_REGISTRY", default_value = DEFAULT_REGISTRY_FILE)]
    pub registry: PathBuf,

    /// Send probes from this interface instead of picking one per range
    #[arg(short, long, global = true)]
    pub interface: Option<String>,

    /// Skip reverse name lookups
    #[arg(short = 'n', long, global = true)]
    pub no_dns: bool,

    /// Less output (-qq prints only the summary)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// More log detail (-vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Discover hosts in a given network
    #[command(alias = "d")]
    Discover(DiscoverArgs),
    /// Show saved devices
    #[command(alias = "ls")]
    List,
    /// Save a device by hand
    #[command(alias = "s")]
    Save {
        address: Ipv4Addr,
        hardware_id: String,
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Rename a saved device
    #[command(alias = "r")]
    Rename { address: Ipv4Addr, name: String },
    /// List network adapters
    #[command(alias = "a")]
    Adapters,
    /// Print a saved device's MAC address
    #[command(alias = "m")]
    Mac {
        address: Ipv4Addr,
        #[arg(long, value_enum)]
        style: Option<StyleArg>,
    },
}

#[derive(Args)]
pub struct DiscoverArgs {
    /// CIDR block, single address, a-b range, or "lan"
    #[arg(default_value = DEFAULT_TARGET)]
    pub target: Target,

    /// How long to listen for replies
    #[arg(short, long)]
    pub timeout_ms: Option<u64>,

    /// Save every device that answered
    #[arg(long)]
    pub save: bool,

    /// Repeat the pass every SECS seconds until interrupted
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub every: Option<u64>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StyleArg {
    Colon,
    Hyphen,
    Compact,
}

impl From<StyleArg> for HardwareIdStyle {
    fn from(style: StyleArg) -> Self {
        match style {
            StyleArg::Colon => HardwareIdStyle::Colon,
            StyleArg::Hyphen => HardwareIdStyle::Hyphen,
            StyleArg::Compact => HardwareIdStyle::Compact,
        }
    }
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
