/// USB vendor id of the LCUS HID relay boards.
pub const VENDOR_ID: u16 = 0x5131;

/// USB product id of the LCUS HID relay boards.
pub const PRODUCT_ID: u16 = 0x2007;

pub const DEFAULT_RELAY_COUNT: usize = 4;

/// The wire relay number is a single byte in 1..=254.
pub const MAX_RELAY_COUNT: usize = 254;

/// Last commanded state of a relay, as far as the host knows.
///
/// The firmware has no working status command, so a relay starts out as
/// `Unverified` and only becomes `On` or `Off` once a set command for it
/// went through.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum RelayState {
    #[default]
    Unverified,
    On,
    Off,
}

impl RelayState {
    /// Boolean view of the state. `Unverified` reads as `false`, which is
    /// not the same as a verified off.
    pub fn is_on(&self) -> bool {
        matches!(self, RelayState::On)
    }

    pub fn is_verified(&self) -> bool {
        !matches!(self, RelayState::Unverified)
    }
}

impl From<bool> for RelayState {
    fn from(value: bool) -> Self {
        match value {
            true => RelayState::On,
            false => RelayState::Off,
        }
    }
}

/// What a single character of a relay pattern asks for.
#[derive(Copy, Clone, Debug, Hash, PartialEq, Eq)]
pub enum RelayAction {
    On,
    Off,
    Toggle,
}

impl RelayAction {
    /// Maps a pattern character, case-insensitive:
    /// `1`/`H`/`S` switch on, `0`/`L`/`R`/`C` switch off, `T`/`^` toggle.
    /// Anything else leaves the relay alone.
    pub fn from_char(c: char) -> Option<RelayAction> {
        match c.to_ascii_uppercase() {
            '1' | 'H' | 'S' => Some(RelayAction::On),
            '0' | 'L' | 'R' | 'C' => Some(RelayAction::Off),
            'T' | '^' => Some(RelayAction::Toggle),
            _ => None,
        }
    }
}
