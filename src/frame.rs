//! Command frame of the LCUS HID relay protocol.
//!
//! | Byte | Meaning                                        |
//! |-----:|------------------------------------------------|
//! |    0 | report id, ignored by the firmware             |
//! |    1 | start of frame, always `0xA0`                  |
//! |    2 | relay number, 1-based                          |
//! |    3 | command, `0` de-energize, `1` energize         |
//! |    4 | checksum, low byte of the sum of bytes 0..=3   |
//!
//! The protocol documents further commands (off/on with response, toggle,
//! status) but the HID firmware ignores them, so they are never emitted.

pub const FRAME_LEN: usize = 5;

/// Size of the acknowledgement the board sends after every command.
pub const ACK_LEN: usize = 4;

pub const REPORT_ID: u8 = 0x00;
pub const START_OF_FRAME: u8 = 0xA0;

pub const CMD_OFF: u8 = 0x00;
pub const CMD_ON: u8 = 0x01;

pub type Frame = [u8; FRAME_LEN];

/// Builds the frame that switches relay `index` (0-based).
///
/// # Precondition
///
/// `index` must be below the board's relay count (at most 254). This is
/// NOT checked here: `RelayBoard::set_relay` rejects out of range indices
/// before encoding. Passing a larger index silently produces a frame for
/// the wrong relay.
pub fn encode(index: usize, energize: bool) -> Frame {
    let mut frame = [
        REPORT_ID,
        START_OF_FRAME,
        (index + 1) as u8,
        if energize { CMD_ON } else { CMD_OFF },
        0,
    ];
    frame[FRAME_LEN - 1] = checksum(&frame[..FRAME_LEN - 1]);
    frame
}

/// Unsigned 8-bit wraparound sum.
pub fn checksum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, b| sum.wrapping_add(*b))
}
