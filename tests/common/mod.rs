#![allow(dead_code)]

use std::cell::Cell;
use std::collections::VecDeque;
use std::rc::Rc;

use embedded_hal::delay::DelayNs;
use myrtio_usb_light::{
    BusEvent, ByteStorage, FrameProbe, Oscillator, OutputDriver, OutputLevels, SetupReply,
    UsbBus,
};

/// Trim register shared between the fake oscillator and the fake bus
pub type SharedTrim = Rc<Cell<u8>>;

/// Frame length measured for a given trim: strictly increasing, hits
/// 1713 (12 MHz target) at trim 213.
pub fn frame_length(trim: u8) -> u16 {
    1500 + u16::from(trim)
}

pub struct TrimRegister {
    pub trim: SharedTrim,
    pub writes: usize,
}

impl TrimRegister {
    pub fn new(trim: SharedTrim) -> Self {
        Self { trim, writes: 0 }
    }
}

impl Oscillator for TrimRegister {
    fn set_trim(&mut self, trim: u8) {
        self.trim.set(trim);
        self.writes += 1;
    }
}

#[derive(Debug, Clone)]
pub struct Eeprom {
    pub bytes: [u8; 16],
    pub writes: usize,
}

impl Eeprom {
    pub fn erased() -> Self {
        Self {
            bytes: [0xFF; 16],
            writes: 0,
        }
    }
}

impl ByteStorage for Eeprom {
    fn read_byte(&mut self, address: u16) -> u8 {
        self.bytes[usize::from(address)]
    }

    fn write_byte(&mut self, address: u16, value: u8) {
        self.bytes[usize::from(address)] = value;
        self.writes += 1;
    }
}

/// USB stack replaying a queue of events
pub struct ScriptedBus {
    pub events: VecDeque<BusEvent>,
    pub replies: Vec<SetupReply>,
    pub trim: SharedTrim,
    pub probes: usize,
    pub connected: bool,
    pub disconnects: usize,
}

impl ScriptedBus {
    pub fn new(trim: SharedTrim) -> Self {
        Self {
            events: VecDeque::new(),
            replies: Vec::new(),
            trim,
            probes: 0,
            connected: false,
            disconnects: 0,
        }
    }

    pub fn push(&mut self, event: BusEvent) {
        self.events.push_back(event);
    }
}

impl FrameProbe for ScriptedBus {
    fn measure_frame_length(&mut self) -> u16 {
        self.probes += 1;
        frame_length(self.trim.get())
    }
}

impl UsbBus for ScriptedBus {
    fn poll(&mut self) -> Option<BusEvent> {
        self.events.pop_front()
    }

    fn reply(&mut self, reply: SetupReply) {
        self.replies.push(reply);
    }

    fn connect(&mut self) {
        self.connected = true;
    }

    fn disconnect(&mut self) {
        self.connected = false;
        self.disconnects += 1;
    }
}

/// Output driver keeping every tick it was asked to drive
#[derive(Debug, Default)]
pub struct Recorder {
    pub levels: Vec<OutputLevels>,
}

impl OutputDriver for Recorder {
    fn write(&mut self, levels: OutputLevels) {
        self.levels.push(levels);
    }
}

/// Delay that only counts the time it was asked to wait
#[derive(Debug, Default)]
pub struct CountingDelay {
    pub total_ns: u64,
}

impl DelayNs for CountingDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

pub fn control_data(bytes: &[u8]) -> BusEvent {
    BusEvent::ControlData(heapless::Vec::from_slice(bytes).unwrap())
}

pub fn report(bytes: &[u8]) -> BusEvent {
    let mut buffer = [0u8; 64];
    buffer[..bytes.len()].copy_from_slice(bytes);
    BusEvent::Report(heapless::Vec::from_slice(&buffer).unwrap())
}
