use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use log::info;

use lcus_hid_relay::list_devices;
use lcus_hid_relay::BoardConfig;
use lcus_hid_relay::HidApiBackend;
use lcus_hid_relay::RelayBoard;
use lcus_hid_relay::ALL_RELAYS;

#[derive(Debug, Parser)]
#[command(version, about = "Switch the relays of an LCUS USB HID relay board")]
struct Args {
    /// HID path of the board, defaults to the first board found
    #[arg(short, long)]
    path: Option<String>,

    /// Number of relays on the board
    #[arg(short, long, default_value_t = 4)]
    relays: usize,

    /// USB vendor id
    #[arg(long, default_value = "0x5131", value_parser = parse_u16)]
    vid: u16,

    /// USB product id
    #[arg(long, default_value = "0x2007", value_parser = parse_u16)]
    pid: u16,

    /// Increase logging verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Silence all output
    #[arg(short, long)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List connected relay boards
    List,
    /// Energize a relay
    On { index: usize },
    /// De-energize a relay
    Off { index: usize },
    /// Toggle a relay. A fresh process does not know the relay's state,
    /// so this always switches it on.
    Toggle { index: usize },
    /// Set a relay
    Set {
        index: usize,
        #[arg(value_enum)]
        state: Switch,
    },
    /// Set relays from a bit field, bit 0 is relay 0
    Multi {
        #[arg(value_parser = parse_u64)]
        values: u64,
        /// Only relays with their bit set are switched
        #[arg(short, long, value_parser = parse_u64)]
        mask: Option<u64>,
    },
    /// Set relays from a pattern like "HL1T": 1/H/S on, 0/L/R/C off, T/^ toggle
    Pattern { pattern: String },
    /// Set all relays
    All {
        #[arg(value_enum)]
        state: Switch,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Switch {
    On,
    Off,
}

impl From<Switch> for bool {
    fn from(switch: Switch) -> Self {
        matches!(switch, Switch::On)
    }
}

fn parse_u64(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let parsed = if let Some(bits) = s.strip_prefix("0b") {
        u64::from_str_radix(bits, 2)
    } else if let Some(hex) = s.strip_prefix("0x") {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse::<u64>()
    };
    parsed.map_err(|e| format!("Invalid number '{}': {}", s, e))
}

fn parse_u16(s: &str) -> Result<u16, String> {
    let value = parse_u64(s)?;
    u16::try_from(value).map_err(|_| format!("'{}' does not fit into 16 bits", s))
}

fn main() -> Result<()> {
    let args = Args::parse();

    stderrlog::new()
        .module(module_path!())
        .module("lcus_hid_relay")
        .quiet(args.quiet)
        .verbosity(args.verbose as usize + 1)
        .init()?;

    if let Command::List = args.command {
        let backend = HidApiBackend::new().context("Failed to initialize HID library")?;
        let devices = list_devices(&backend, args.vid, args.pid)?;
        if devices.is_empty() {
            info!("No relay board found");
        }
        for device in devices {
            println!(
                "{}\t{:04X}:{:04X}\t{}",
                device.path,
                device.vendor_id,
                device.product_id,
                device.product.unwrap_or_default()
            );
        }
        return Ok(());
    }

    let config = BoardConfig {
        path: args.path,
        relay_count: args.relays,
        vendor_id: args.vid,
        product_id: args.pid,
    };
    let mut board = RelayBoard::open(&config).context("Failed to open relay board")?;
    info!("Using relay board at '{}'", board.path());

    match args.command {
        Command::List => {}
        Command::On { index } => board.channel(index)?.on()?,
        Command::Off { index } => board.channel(index)?.off()?,
        Command::Toggle { index } => board.channel(index)?.toggle()?,
        Command::Set { index, state } => board.set_relay(index, state.into())?,
        Command::Multi { values, mask } => board.set_multi(values, mask.unwrap_or(ALL_RELAYS))?,
        Command::Pattern { pattern } => board.set_multi_str(&pattern)?,
        Command::All { state } => board.set_all(state.into())?,
    }

    Ok(())
}
