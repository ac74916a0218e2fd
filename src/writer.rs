use std::io::Write;

use tracing::trace;

use crate::{BitsWriterBatch, ByteOrder, Error, Result, Value};

/// Called with every byte once the sink has accepted it.
pub type WriteCallback = Box<dyn FnMut(u8)>;

#[derive(Default)]
pub struct BitsWriterOptions {
    pub byte_order: ByteOrder,
    pub write_callback: Option<WriteCallback>,
}

/// Bits of the byte currently being assembled, left-justified.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Cache {
    bits: u8,
    len: u8,
}

impl Cache {
    /// Appends one bit, returning the byte if it is now complete.
    fn push(&mut self, b: bool) -> Option<u8> {
        self.bits |= (b as u8) << (7 - self.len);
        self.len += 1;

        if self.len == 8 {
            let full = self.bits;
            *self = Cache::default();
            Some(full)
        } else {
            None
        }
    }

    /// Appends a whole byte. The high `8 - len` bits complete the cached byte,
    /// which is returned, and the low `len` bits stay behind.
    fn merge(&mut self, b: u8) -> u8 {
        if self.len == 0 {
            return b;
        }

        let full = self.bits | (b >> self.len);
        self.bits = b << (8 - self.len);
        full
    }
}

/// Accumulates bits, bytes and integers and hands every completed byte to a
/// [`Write`] sink.
///
/// Nothing is padded implicitly: bits left in an unfinished byte when the
/// writer is dropped (or [`into_inner`](Self::into_inner) is called) are lost.
///
/// A sink error is returned as is and nothing is rolled back, so a multi-byte
/// write that fails halfway leaves the bytes before the failure written.
pub struct BitsWriter<W> {
    sink: W,
    byte_order: ByteOrder,
    cache: Cache,
    write_cb: Option<WriteCallback>,
}

impl<W: Write> BitsWriter<W> {
    /// Big endian writer without callback.
    pub fn new(sink: W) -> Self {
        Self::with_options(sink, BitsWriterOptions::default())
    }

    pub fn with_options(sink: W, options: BitsWriterOptions) -> Self {
        Self {
            sink,
            byte_order: options.byte_order,
            cache: Cache::default(),
            write_cb: options.write_callback,
        }
    }

    /// Replaces the callback; bytes completed before this call are not replayed.
    pub fn set_write_callback(&mut self, cb: Option<WriteCallback>) {
        self.write_cb = cb;
    }

    pub fn byte_order(&self) -> ByteOrder { self.byte_order }

    /// Number of bits waiting for their byte to be completed, always below 8.
    pub fn pending_bits(&self) -> u8 { self.cache.len }

    pub fn is_aligned(&self) -> bool { self.cache.len == 0 }

    pub fn get_ref(&self) -> &W { &self.sink }

    pub fn get_mut(&mut self) -> &mut W { &mut self.sink }

    /// Gives the sink back, discarding any pending bits.
    pub fn into_inner(self) -> W {
        if self.cache.len != 0 {
            trace!(pending = self.cache.len, "dropping unfinished byte");
        }
        self.sink
    }

    /// Starts a batch that only reports the first error.
    pub fn batch(&mut self) -> BitsWriterBatch<'_, W> {
        BitsWriterBatch::new(self)
    }

    fn flush(&mut self, b: u8) -> Result<()> {
        self.sink.write_all(&[b])?;
        trace!(byte = b, "byte complete");

        if let Some(cb) = self.write_cb.as_mut() {
            cb(b);
        }

        Ok(())
    }

    pub fn write_bit(&mut self, b: bool) -> Result<()> {
        match self.cache.push(b) {
            Some(full) => self.flush(full),
            None => Ok(()),
        }
    }

    /// Writes one bit per character, `'1'` being a one and anything else a zero.
    pub fn write_bit_str(&mut self, s: &str) -> Result<()> {
        for c in s.chars() {
            self.write_bit(c == '1')?;
        }

        Ok(())
    }

    pub fn write_u8(&mut self, b: u8) -> Result<()> {
        let full = self.cache.merge(b);
        self.flush(full)
    }

    pub fn write_bytes(&mut self, bs: &[u8]) -> Result<()> {
        for b in bs.iter() {
            self.write_u8(*b)?;
        }

        Ok(())
    }

    pub fn write_u16(&mut self, u: u16) -> Result<()> {
        self.write_full_int(u as u64, 2)
    }

    pub fn write_u32(&mut self, u: u32) -> Result<()> {
        self.write_full_int(u as u64, 4)
    }

    pub fn write_u64(&mut self, u: u64) -> Result<()> {
        self.write_full_int(u, 8)
    }

    fn write_full_int(&mut self, u: u64, len: usize) -> Result<()> {
        match self.byte_order {
            ByteOrder::BigEndian => {
                for i in (0..len).rev() {
                    self.write_u8((u >> (i * 8)) as u8)?;
                }
            },
            ByteOrder::LittleEndian => {
                for i in 0..len {
                    self.write_u8((u >> (i * 8)) as u8)?;
                }
            },
        }

        Ok(())
    }

    /// Writes the low `l` bits of `u`, most significant first. Bits above the
    /// 64th are zeros.
    pub fn write_bits(&mut self, u: u64, l: usize) -> Result<()> {
        for i in (0..l).rev() {
            self.write_bit(i < 64 && u & (1 << i) != 0)?;
        }

        Ok(())
    }

    /// Writes `value` according to its kind, see [`Value`].
    pub fn write<'a>(&mut self, value: impl Into<Value<'a>>) -> Result<()> {
        match value.into() {
            Value::Bits(s) => self.write_bit_str(s),
            Value::Bytes(bs) => self.write_bytes(bs),
            Value::Bool(b) => self.write_bit(b),
            Value::U8(u) => self.write_u8(u),
            Value::U16(u) => self.write_u16(u),
            Value::U32(u) => self.write_u32(u),
            Value::U64(u) => self.write_u64(u),
            v @ Value::Signed(_) => Err(Error::UnsupportedType { kind: v.kind(), op: "write" }),
        }
    }

    /// Writes the low `n` bits of an unsigned integer, see [`write_bits`](Self::write_bits).
    pub fn write_n<'a>(&mut self, value: impl Into<Value<'a>>, n: usize) -> Result<()> {
        let value = value.into();
        let u = value
            .as_unsigned()
            .ok_or(Error::UnsupportedType { kind: value.kind(), op: "write_n" })?;

        self.write_bits(u, n)
    }

    /// Writes exactly `n` bytes: the first `n` of `bs`, followed by `pad` as
    /// many times as needed if `bs` is shorter.
    pub fn write_bytes_n(&mut self, bs: &[u8], n: usize, pad: u8) -> Result<()> {
        if bs.len() >= n {
            return self.write_bytes(&bs[..n]);
        }

        self.write_bytes(bs)?;
        for _ in bs.len()..n {
            self.write_u8(pad)?;
        }

        Ok(())
    }
}

impl<W: core::fmt::Debug> core::fmt::Debug for BitsWriter<W> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("BitsWriter")
            .field("sink", &self.sink)
            .field("byte_order", &self.byte_order)
            .field("cache", &self.cache)
            .field("write_cb", &self.write_cb.is_some())
            .finish()
    }
}

#[test]
fn test_cache() {
    let mut c = Cache::default();
    assert_eq!(c.push(true), None);
    assert_eq!(c.push(false), None);
    assert_eq!(c.push(true), None);
    assert_eq!(c, Cache { bits: 0b1010_0000, len: 3 });

    assert_eq!(c.merge(0xff), 0b1011_1111);
    assert_eq!(c, Cache { bits: 0b1110_0000, len: 3 });
}

#[test]
fn test_bits_then_byte() {
    let mut w = BitsWriter::new(Vec::new());
    w.write_bit(true).unwrap();
    w.write_bit(false).unwrap();
    w.write_bit(false).unwrap();
    w.write_u8(0xff).unwrap();

    assert_eq!(w.get_ref(), &[0x9f]);
    assert_eq!(w.pending_bits(), 3);

    w.write_bit_str("00000").unwrap();
    assert_eq!(w.get_ref(), &[0x9f, 0b1110_0000]);
    assert!(w.is_aligned());
}

#[test]
fn test_bit_str() {
    let mut w = BitsWriter::new(Vec::new());
    w.write("10010").unwrap();
    w.write("0x0").unwrap();
    assert_eq!(w.get_ref(), &[0b1001_0000]);

    let mut w = BitsWriter::new(Vec::new());
    w.write("").unwrap();
    assert!(w.get_ref().is_empty());
    assert!(w.is_aligned());
}

#[test]
fn test_integers() {
    let mut w = BitsWriter::new(Vec::new());
    w.write(0x1234_u16).unwrap();
    w.write(0xdead_beef_u32).unwrap();
    w.write(0x0102_0304_0506_0708_u64).unwrap();
    assert_eq!(w.get_ref(), &[
        0x12, 0x34,
        0xde, 0xad, 0xbe, 0xef,
        1, 2, 3, 4, 5, 6, 7, 8,
    ]);

    let mut w = BitsWriter::with_options(Vec::new(), BitsWriterOptions {
        byte_order: ByteOrder::LittleEndian,
        ..Default::default()
    });
    w.write(0x1234_u16).unwrap();
    w.write(0xdead_beef_u32).unwrap();
    w.write(0x0102_0304_0506_0708_u64).unwrap();
    w.write(0x42_u8).unwrap();
    assert_eq!(w.get_ref(), &[
        0x34, 0x12,
        0xef, 0xbe, 0xad, 0xde,
        8, 7, 6, 5, 4, 3, 2, 1,
        0x42,
    ]);
}

#[test]
fn test_unaligned_integer() {
    let mut w = BitsWriter::new(Vec::new());
    w.write(true).unwrap();
    w.write(0xabcd_u16).unwrap();
    w.write("0000000").unwrap();

    assert_eq!(w.get_ref(), &[0b1101_0101, 0b1110_0110, 0b1000_0000]);
}

#[test]
fn test_write_n() {
    let mut w = BitsWriter::new(Vec::new());
    w.write_n(0b1011_u8, 4).unwrap();
    w.write_n(0xffff_u16, 4).unwrap();
    assert_eq!(w.get_ref(), &[0b1011_1111]);

    w.write_n(0x1_u32, 12).unwrap();
    w.write_n(0x0_u64, 4).unwrap();
    assert_eq!(w.get_ref(), &[0b1011_1111, 0, 0b0001_0000]);

    w.write_n(u64::MAX, 72).unwrap();
    assert_eq!(w.get_ref()[3..], [0, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff]);

    w.write_n(0xff_u8, 0).unwrap();
    assert_eq!(w.get_ref().len(), 12);
    assert!(w.is_aligned());
}

#[test]
fn test_bytes_n() {
    let mut w = BitsWriter::new(Vec::new());
    w.write_bytes_n(&[1, 2, 3], 2, 0xff).unwrap();
    assert_eq!(w.get_ref(), &[1, 2]);

    w.write_bytes_n(&[4], 3, 0xff).unwrap();
    assert_eq!(w.get_ref(), &[1, 2, 4, 0xff, 0xff]);

    w.write_bytes_n(&[], 0, 0xff).unwrap();
    w.write_bytes_n(&[5, 6], 2, 0xff).unwrap();
    assert_eq!(w.get_ref(), &[1, 2, 4, 0xff, 0xff, 5, 6]);
}

#[test]
fn test_unsupported() {
    let mut w = BitsWriter::new(Vec::new());
    w.write(true).unwrap();

    assert!(matches!(
        w.write(-1_i32),
        Err(Error::UnsupportedType { kind: "signed integer", op: "write" })
    ));
    assert!(matches!(
        w.write_n(true, 1),
        Err(Error::UnsupportedType { kind: "bool", op: "write_n" })
    ));
    assert!(matches!(
        w.write_n("1", 1),
        Err(Error::UnsupportedType { kind: "bit string", op: "write_n" })
    ));
    assert!(matches!(
        w.write_n(&[1_u8], 8),
        Err(Error::UnsupportedType { kind: "bytes", op: "write_n" })
    ));

    assert_eq!(w.pending_bits(), 1);
    assert!(w.get_ref().is_empty());
}

#[test]
fn test_callback() {
    use std::{cell::RefCell, rc::Rc};

    let seen = Rc::new(RefCell::new(Vec::<u8>::new()));
    let s = seen.clone();
    let mut w = BitsWriter::with_options(Vec::new(), BitsWriterOptions {
        write_callback: Some(Box::new(move |b| s.borrow_mut().push(b))),
        ..Default::default()
    });

    w.write("1111").unwrap();
    assert!(seen.borrow().is_empty());
    w.write(0x00_u8).unwrap();
    assert_eq!(&*seen.borrow(), &[0xf0]);

    let s = seen.clone();
    w.set_write_callback(Some(Box::new(move |b| s.borrow_mut().push(!b))));
    w.write("0000").unwrap();
    assert_eq!(&*seen.borrow(), &[0xf0, 0xff]);

    w.set_write_callback(None);
    w.write(0x12_u8).unwrap();
    assert_eq!(seen.borrow().len(), 2);
    assert_eq!(w.into_inner(), vec![0xf0, 0x00, 0x12]);
}
