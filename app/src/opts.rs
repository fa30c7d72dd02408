use crate::permission::Platform;

use clap::{Parser, Subcommand};

#[derive(Debug, PartialEq, Parser)]
#[command(name = "blescan", version, about = "Scan for and connect to nearby BLE peripherals")]
pub struct Opts {
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Bluetooth adapter to use, e.g. hci0. Defaults to the system default.
    #[arg(long, global = true)]
    pub adapter: Option<String>,

    /// Which permission set to ask for before scanning.
    #[arg(long, value_enum, default_value_t = Platform::Linux, global = true)]
    pub platform: Platform,

    #[arg(long, global = true)]
    pub json: bool,

    /// Give up on a connection attempt after this many seconds.
    #[arg(long, value_name = "SECS", global = true)]
    pub connect_timeout: Option<u64>,

    #[command(subcommand)]
    pub action: Option<Action>,
}

#[derive(Clone, Debug, PartialEq, Subcommand)]
pub enum Action {
    /// Interactive device list (default).
    #[command(name = "screen", alias = "s")]
    Screen,

    /// Scan for a fixed time and print what was found.
    #[command(name = "scan")]
    Scan {
        #[arg(short, long, value_name = "SECS", default_value_t = 10)]
        duration: u64,
    },

    /// Connect to a device and list its services.
    #[command(name = "connect", alias = "c")]
    Connect { id: String },
}

impl Opts {
    pub fn from_env() -> Self {
        Opts::parse()
    }

    pub fn action(&self) -> Action {
        self.action.clone().unwrap_or(Action::Screen)
    }
}
