//! Error types returned by the decoder.
use std::fmt;
use std::fmt::{Debug, Display, Formatter};

/// The errors that can occur while decoding a JPEG file.
///
/// Every variant is fatal: once the entropy-coded stream loses
/// synchronisation there is nothing sensible left to recover, so the
/// decoder never attempts a retry or a partial result.
pub enum DecodeErrors {
    /// The underlying reader could not deliver the bytes requested of it.
    Io(std::io::Error),
    /// A marker segment was malformed: bad magic, inconsistent length,
    /// an unknown marker, or a count that doesn't add up.
    Structural(String),
    /// The stream names a feature this decoder deliberately does not
    /// implement (arithmetic coding, 16-bit quantization, restart
    /// markers, more than 3 components, an unsupported sampling ratio).
    Unsupported(String),
    /// The entropy-coded bitstream itself is corrupt: an impossible
    /// Huffman path, an out-of-range magnitude, a coefficient index that
    /// walked past the end of a block.
    Entropy(String),
    /// The caller asked the decoder to do something its own contract
    /// forbids (e.g. requesting pixels before headers were read).
    Logic(String),
}

impl From<std::io::Error> for DecodeErrors {
    fn from(e: std::io::Error) -> Self {
        DecodeErrors::Io(e)
    }
}

impl Display for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Structural(s) => write!(f, "malformed JPEG stream: {s}"),
            Self::Unsupported(s) => write!(f, "unsupported JPEG feature: {s}"),
            Self::Entropy(s) => write!(f, "corrupt entropy-coded data: {s}"),
            Self::Logic(s) => write!(f, "invalid decoder usage: {s}"),
        }
    }
}

impl Debug for DecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

impl std::error::Error for DecodeErrors {}
