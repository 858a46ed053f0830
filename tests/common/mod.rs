#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use lcus_hid_relay::BoardConfig;
use lcus_hid_relay::DeviceEntry;
use lcus_hid_relay::HidBackend;
use lcus_hid_relay::HidLink;
use lcus_hid_relay::RelayBoard;
use lcus_hid_relay::RelayError;

/// What happened on the wire.
#[derive(Default)]
pub struct Wire {
    pub frames: Vec<Vec<u8>>,
    pub ack_reads: usize,
    /// 0-based index of the write that fails
    pub fail_write_at: Option<usize>,
    /// 0-based index of the ack read that fails
    pub fail_read_at: Option<usize>,
    writes: usize,
}

pub struct MockLink {
    wire: Rc<RefCell<Wire>>,
}

impl HidLink for MockLink {
    fn write(&mut self, data: &[u8]) -> Result<usize, RelayError> {
        let mut wire = self.wire.borrow_mut();
        let attempt = wire.writes;
        wire.writes += 1;
        if wire.fail_write_at == Some(attempt) {
            return Err(RelayError::Transport(String::from("device unplugged")));
        }
        wire.frames.push(data.to_vec());
        Ok(data.len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, RelayError> {
        let mut wire = self.wire.borrow_mut();
        let attempt = wire.ack_reads;
        wire.ack_reads += 1;
        if wire.fail_read_at == Some(attempt) {
            return Err(RelayError::Transport(String::from("read failed")));
        }
        buf.fill(0xAA);
        Ok(buf.len())
    }
}

pub struct MockBackend {
    pub devices: Vec<DeviceEntry>,
    pub opened: RefCell<Vec<String>>,
    pub wire: Rc<RefCell<Wire>>,
}

impl MockBackend {
    pub fn new(devices: Vec<DeviceEntry>) -> MockBackend {
        MockBackend {
            devices,
            opened: RefCell::new(Vec::new()),
            wire: Rc::new(RefCell::new(Wire::default())),
        }
    }

    /// One relay board at `/dev/hidraw0`.
    pub fn single() -> MockBackend {
        MockBackend::new(vec![device("/dev/hidraw0", 0x5131, 0x2007)])
    }

    pub fn frames(&self) -> Vec<Vec<u8>> {
        self.wire.borrow().frames.clone()
    }

    pub fn clear_frames(&self) {
        self.wire.borrow_mut().frames.clear();
    }

    pub fn fail_next_write(&self) {
        let mut wire = self.wire.borrow_mut();
        wire.fail_write_at = Some(wire.writes);
    }

    pub fn fail_write_in(&self, writes_from_now: usize) {
        let mut wire = self.wire.borrow_mut();
        wire.fail_write_at = Some(wire.writes + writes_from_now);
    }

    pub fn fail_next_read(&self) {
        let mut wire = self.wire.borrow_mut();
        wire.fail_read_at = Some(wire.ack_reads);
    }
}

impl HidBackend for MockBackend {
    type Link = MockLink;

    fn enumerate(&self, ids: Option<(u16, u16)>) -> Result<Vec<DeviceEntry>, RelayError> {
        Ok(self
            .devices
            .iter()
            .filter(|d| match ids {
                Some((vid, pid)) => d.vendor_id == vid && d.product_id == pid,
                None => true,
            })
            .cloned()
            .collect())
    }

    fn open_path(&self, path: &str) -> Result<MockLink, RelayError> {
        self.opened.borrow_mut().push(path.to_string());
        Ok(MockLink {
            wire: self.wire.clone(),
        })
    }
}

pub fn device(path: &str, vendor_id: u16, product_id: u16) -> DeviceEntry {
    DeviceEntry {
        path: path.to_string(),
        vendor_id,
        product_id,
        product: Some(String::from("USBRelay4")),
        serial_number: None,
    }
}

pub fn open_board(backend: &MockBackend, relay_count: usize) -> RelayBoard<MockLink> {
    let config = BoardConfig::default().with_relay_count(relay_count);
    RelayBoard::open_with(backend, &config).unwrap()
}

/// The frame switching relay `index` (0-based).
pub fn frame(index: usize, on: bool) -> Vec<u8> {
    let relay = (index + 1) as u8;
    let cmd = on as u8;
    let sum = 0xA0u8.wrapping_add(relay).wrapping_add(cmd);
    vec![0x00, 0xA0, relay, cmd, sum]
}
