use std::io::Write;

use crate::{BitsWriter, Error, Result, Value};

/// Chains several writes and keeps only the first error.
///
/// Once a call fails, every later call is skipped without touching the writer.
#[derive(Debug)]
pub struct BitsWriterBatch<'w, W> {
    w: &'w mut BitsWriter<W>,
    err: Option<Error>,
}

impl<'w, W: Write> BitsWriterBatch<'w, W> {
    pub fn new(w: &'w mut BitsWriter<W>) -> Self {
        Self { w, err: None }
    }

    fn run(&mut self, f: impl FnOnce(&mut BitsWriter<W>) -> Result<()>) {
        if self.err.is_none() {
            self.err = f(&mut *self.w).err();
        }
    }

    pub fn write<'a>(&mut self, value: impl Into<Value<'a>>) {
        self.run(|w| w.write(value));
    }

    pub fn write_n<'a>(&mut self, value: impl Into<Value<'a>>, n: usize) {
        self.run(|w| w.write_n(value, n));
    }

    pub fn write_bytes_n(&mut self, bs: &[u8], n: usize, pad: u8) {
        self.run(|w| w.write_bytes_n(bs, n, pad));
    }

    pub fn err(&self) -> Option<&Error> {
        self.err.as_ref()
    }

    pub fn finish(self) -> Result<()> {
        match self.err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

#[test]
fn test_batch() {
    let mut w = BitsWriter::new(Vec::new());

    let mut b = w.batch();
    b.write("1010");
    b.write_n(0xf_u8, 4);
    b.write_bytes_n(&[1], 2, 0);
    assert!(b.err().is_none());
    assert!(b.finish().is_ok());

    assert_eq!(w.get_ref(), &[0xaf, 1, 0]);
}

#[test]
fn test_batch_latches_first_error() {
    let mut w = BitsWriter::new(Vec::new());

    let mut b = w.batch();
    b.write(0x01_u8);
    b.write_n(false, 1);
    b.write(-1_i64);
    b.write(0x02_u8);
    b.write_bytes_n(&[3], 1, 0);

    assert!(matches!(b.err(), Some(Error::UnsupportedType { op: "write_n", .. })));
    assert!(b.finish().is_err());
    assert_eq!(w.get_ref(), &[1]);
}
