use hidapi::HidDevice;
use log::info;
use log::warn;

use crate::error::RelayError;
use crate::frame;
use crate::relay_types::RelayAction;
use crate::relay_types::RelayState;
use crate::relay_types::DEFAULT_RELAY_COUNT;
use crate::relay_types::MAX_RELAY_COUNT;
use crate::relay_types::PRODUCT_ID;
use crate::relay_types::VENDOR_ID;
use crate::transport::HidApiBackend;
use crate::transport::HidBackend;
use crate::transport::HidLink;
use crate::transport::HidTransport;

/// Mask selecting every relay in [`RelayBoard::set_multi`].
pub const ALL_RELAYS: u64 = u64::MAX;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    /// HID path of the board. If `None`, the first enumerated board with
    /// matching ids is used.
    pub path: Option<String>,
    pub relay_count: usize,
    pub vendor_id: u16,
    pub product_id: u16,
}

impl Default for BoardConfig {
    fn default() -> Self {
        BoardConfig {
            path: None,
            relay_count: DEFAULT_RELAY_COUNT,
            vendor_id: VENDOR_ID,
            product_id: PRODUCT_ID,
        }
    }
}

impl BoardConfig {
    pub fn with_path<S: Into<String>>(mut self, path: S) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_relay_count(mut self, relay_count: usize) -> Self {
        self.relay_count = relay_count;
        self
    }
}

fn check_relay_count(relay_count: usize) -> Result<(), RelayError> {
    match relay_count {
        1..=MAX_RELAY_COUNT => Ok(()),
        _ => Err(RelayError::InvalidRelayCount(relay_count)),
    }
}

/// An LCUS HID relay board.
///
/// The board cannot report the state of its relays. What [`state`] and
/// [`Relay::get`] return is the last state this instance successfully
/// commanded, and `RelayState::Unverified` for relays it never switched.
///
/// All calls block until the board acknowledged the command. A board is
/// not meant to be shared between threads; if it has to be, put it behind
/// a mutex so that no two commands interleave on the wire.
///
/// [`state`]: RelayBoard::state
pub struct RelayBoard<L: HidLink = HidDevice> {
    transport: HidTransport<L>,
    relays: Vec<RelayState>,
}

impl RelayBoard<HidDevice> {
    /// Opens a board through the system HID library.
    pub fn open(config: &BoardConfig) -> Result<Self, RelayError> {
        let backend = HidApiBackend::new()?;
        Self::open_with(&backend, config)
    }
}

impl<L: HidLink> RelayBoard<L> {
    pub fn open_with<B>(backend: &B, config: &BoardConfig) -> Result<Self, RelayError>
    where
        B: HidBackend<Link = L>,
    {
        check_relay_count(config.relay_count)?;
        let transport = HidTransport::open(
            backend,
            config.path.as_deref(),
            config.vendor_id,
            config.product_id,
        )?;
        Self::from_transport(transport, config.relay_count)
    }

    pub fn from_transport(
        transport: HidTransport<L>,
        relay_count: usize,
    ) -> Result<Self, RelayError> {
        check_relay_count(relay_count)?;
        Ok(RelayBoard {
            transport,
            relays: vec![RelayState::Unverified; relay_count],
        })
    }

    pub fn path(&self) -> &str {
        self.transport.path()
    }

    pub fn relay_count(&self) -> usize {
        self.relays.len()
    }

    pub fn state(&self, index: usize) -> Result<RelayState, RelayError> {
        self.check_index(index)?;
        Ok(self.relays[index])
    }

    pub fn states(&self) -> &[RelayState] {
        &self.relays
    }

    /// Handle for a single relay.
    pub fn channel(&mut self, index: usize) -> Result<Relay<'_, L>, RelayError> {
        self.check_index(index)?;
        Ok(Relay { board: self, index })
    }

    /// Switches relay `index` (0-based) on or off.
    ///
    /// The cached state is updated only after the board acknowledged the
    /// command; on error it keeps its previous value.
    pub fn set_relay(&mut self, index: usize, value: bool) -> Result<(), RelayError> {
        self.check_index(index)?;

        let frame = frame::encode(index, value);
        self.transport.write_frame(&frame)?;
        self.transport.read_ack()?;

        self.relays[index] = RelayState::from(value);
        info!("Set relay {} to {:?}", index, self.relays[index]);
        Ok(())
    }

    /// Inverts the cached state of relay `index`. A relay that was never
    /// switched counts as off, so the first toggle switches it on.
    pub fn toggle_relay(&mut self, index: usize) -> Result<(), RelayError> {
        let state = self.state(index)?;
        if !state.is_verified() {
            warn!("Toggling relay {} whose state is unknown", index);
        }
        self.set_relay(index, !state.is_on())
    }

    /// Sets every relay whose bit is set in `mask` to the matching bit of
    /// `values`, bit 0 being relay 0. Pass [`ALL_RELAYS`] to set all.
    ///
    /// Relays are switched one after the other in index order. If one
    /// fails, the relays before it stay switched and the error is returned;
    /// [`states`](RelayBoard::states) tells which ones went through.
    /// Relays with index 64 and above cannot be addressed by mask.
    pub fn set_multi(&mut self, values: u64, mask: u64) -> Result<(), RelayError> {
        let mut actions = Vec::new();
        for index in 0..self.relays.len() {
            let bit = match 1u64.checked_shl(index as u32) {
                Some(bit) => bit,
                None => break,
            };
            if mask & bit == 0 {
                continue;
            }
            let action = match values & bit != 0 {
                true => RelayAction::On,
                false => RelayAction::Off,
            };
            actions.push((index, action));
        }
        self.apply(actions)
    }

    /// Sets relays from a pattern string, one character per relay starting
    /// at relay 0. See [`RelayAction::from_char`] for the characters.
    ///
    /// Characters beyond the relay count are ignored, relays beyond the
    /// pattern's length are left alone. Same ordering and failure behavior
    /// as [`set_multi`](RelayBoard::set_multi).
    pub fn set_multi_str(&mut self, pattern: &str) -> Result<(), RelayError> {
        let actions = pattern
            .chars()
            .take(self.relays.len())
            .enumerate()
            .filter_map(|(index, c)| RelayAction::from_char(c).map(|action| (index, action)))
            .collect();
        self.apply(actions)
    }

    pub fn set_all(&mut self, value: bool) -> Result<(), RelayError> {
        self.set_multi(if value { ALL_RELAYS } else { 0 }, ALL_RELAYS)?;
        // relays beyond the mask width
        for index in 64..self.relays.len() {
            self.set_relay(index, value)?;
        }
        Ok(())
    }

    fn apply(&mut self, actions: Vec<(usize, RelayAction)>) -> Result<(), RelayError> {
        let mut applied = Vec::with_capacity(actions.len());
        for (index, action) in actions {
            let result = match action {
                RelayAction::On => self.set_relay(index, true),
                RelayAction::Off => self.set_relay(index, false),
                RelayAction::Toggle => self.toggle_relay(index),
            };
            if let Err(e) = result {
                if !applied.is_empty() {
                    warn!(
                        "Stopped at relay {} ({}), relays {:?} were already switched",
                        index, e, applied
                    );
                }
                return Err(e);
            }
            applied.push(index);
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), RelayError> {
        match index < self.relays.len() {
            true => Ok(()),
            false => Err(RelayError::OutOfRange {
                index,
                relay_count: self.relays.len(),
            }),
        }
    }
}

/// A single relay of a [`RelayBoard`].
///
/// Every change goes through [`RelayBoard::set_relay`].
pub struct Relay<'a, L: HidLink> {
    board: &'a mut RelayBoard<L>,
    index: usize,
}

impl<'a, L: HidLink> Relay<'a, L> {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cached state as a boolean. Until this relay was switched through the
    /// board this is `false`, which does not mean the relay is off.
    pub fn get(&self) -> bool {
        self.state().is_on()
    }

    pub fn state(&self) -> RelayState {
        self.board.relays[self.index]
    }

    pub fn set(&mut self, value: bool) -> Result<(), RelayError> {
        self.board.set_relay(self.index, value)
    }

    pub fn on(&mut self) -> Result<(), RelayError> {
        self.set(true)
    }

    pub fn off(&mut self) -> Result<(), RelayError> {
        self.set(false)
    }

    pub fn toggle(&mut self) -> Result<(), RelayError> {
        self.board.toggle_relay(self.index)
    }
}
