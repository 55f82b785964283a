//! Marker byte constants and the `Marker` type produced while scanning the
//! bitstream for the next `0xFF xx` sequence.
use crate::errors::DecodeErrors;

pub const SOI: u8 = 0xD8;
pub const EOI: u8 = 0xD9;
pub const SOS: u8 = 0xDA;
pub const DQT: u8 = 0xDB;
pub const DHT: u8 = 0xC4;
pub const DRI: u8 = 0xDD;
pub const COM: u8 = 0xFE;

pub const SOF0: u8 = 0xC0;
pub const SOF1: u8 = 0xC1;
pub const SOF2: u8 = 0xC2;
pub const SOF3: u8 = 0xC3;
pub const SOF5: u8 = 0xC5;
pub const SOF6: u8 = 0xC6;
pub const SOF7: u8 = 0xC7;
pub const SOF9: u8 = 0xC9;
pub const SOF10: u8 = 0xCA;
pub const SOF11: u8 = 0xCB;
pub const SOF13: u8 = 0xCD;
pub const SOF14: u8 = 0xCE;
pub const SOF15: u8 = 0xCF;
pub const DAC: u8 = 0xCC;

pub const APP0: u8 = 0xE0;
pub const APP1: u8 = 0xE1;

/// A marker observed while walking the bitstream, either during header
/// parsing or after a `0xFF` is hit mid-entropy-scan.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Marker {
    Soi,
    Eoi,
    Sos,
    Dqt,
    Dht,
    Dri,
    Com,
    Sof(u8),
    App(u8),
    Rst(u8),
    Other(u8),
}

impl Marker {
    /// Classify the byte following a `0xFF`.
    pub fn from_byte(byte: u8) -> Marker {
        match byte {
            SOI => Marker::Soi,
            EOI => Marker::Eoi,
            SOS => Marker::Sos,
            DQT => Marker::Dqt,
            DHT => Marker::Dht,
            DRI => Marker::Dri,
            COM => Marker::Com,
            SOF0 | SOF1 | SOF2 | SOF3 | SOF5 | SOF6 | SOF7 | SOF9 | SOF10 | SOF11 | SOF13
            | SOF14 | SOF15 => Marker::Sof(byte),
            0xE0..=0xEF => Marker::App(byte - 0xE0),
            0xD0..=0xD7 => Marker::Rst(byte - 0xD0),
            other => Marker::Other(other),
        }
    }

    /// Require that this marker is one of the markers this decoder
    /// supports at top level (§6 of the design).
    pub fn require_supported(self) -> Result<Marker, DecodeErrors> {
        match self {
            Marker::Rst(_) => Err(DecodeErrors::Unsupported(
                "restart markers (RSTn) are not supported".to_string(),
            )),
            Marker::Other(b) => Err(DecodeErrors::Structural(format!(
                "unknown or unsupported marker 0xFF{b:02X}"
            ))),
            m => Ok(m),
        }
    }
}
