//! Driver for LCUS USB HID relay boards.
//!
//! ```no_run
//! use lcus_hid_relay::{BoardConfig, RelayBoard};
//!
//! # fn main() -> Result<(), lcus_hid_relay::RelayError> {
//! let mut board = RelayBoard::open(&BoardConfig::default())?;
//! board.set_relay(0, true)?;
//! board.channel(1)?.on()?;
//! board.set_multi_str("HL1T")?;
//! board.set_multi(0b0000, 0b0001)?;
//! # Ok(())
//! # }
//! ```

pub mod board;
pub mod error;
pub mod frame;
pub mod relay_types;
pub mod transport;

pub use board::BoardConfig;
pub use board::Relay;
pub use board::RelayBoard;
pub use board::ALL_RELAYS;
pub use error::RelayError;
pub use relay_types::RelayAction;
pub use relay_types::RelayState;
pub use transport::list_devices;
pub use transport::DeviceEntry;
pub use transport::HidApiBackend;
pub use transport::HidBackend;
pub use transport::HidLink;
pub use transport::HidTransport;
