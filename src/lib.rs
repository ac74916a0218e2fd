//! Bit-granularity writer producing a byte-aligned stream, plus the Hamming 8/4
//! and parity lookup tables commonly needed next to it.

mod batch;
mod lut;
mod value;
mod writer;

pub use batch::BitsWriterBatch;
pub use lut::{byte_parity, hamming84_decode};
pub use value::Value;
pub use writer::{BitsWriter, BitsWriterOptions, WriteCallback};

/// Order in which multi-byte integers are split into bytes.
///
/// Bits inside a byte are always written most significant first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    #[default]
    BigEndian,
    LittleEndian,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{op} does not accept a value of type {kind}")]
    UnsupportedType {
        kind: &'static str,
        op: &'static str,
    },

    #[error("sink rejected byte: {0}")]
    Sink(#[from] std::io::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
