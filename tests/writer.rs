use std::{
    cell::RefCell,
    io::{self, Write},
    rc::Rc,
};

use smolbits::{BitsWriter, BitsWriterOptions, ByteOrder, Error};

/// Accepts bytes, except the ones at the listed positions.
#[derive(Debug, Default)]
struct FlakySink {
    bytes: Vec<u8>,
    attempts: usize,
    reject: Vec<usize>,
}

impl FlakySink {
    fn rejecting(reject: &[usize]) -> Self {
        Self { reject: reject.to_vec(), ..Default::default() }
    }
}

impl Write for FlakySink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let attempt = self.attempts;
        self.attempts += 1;

        if self.reject.contains(&attempt) {
            return Err(io::Error::new(io::ErrorKind::BrokenPipe, "rejected"));
        }

        self.bytes.push(buf[0]);
        Ok(1)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[test]
fn sink_error_is_returned_verbatim() {
    let mut w = BitsWriter::new(FlakySink::rejecting(&[0]));

    match w.write(0xaa_u8) {
        Err(Error::Sink(e)) => assert_eq!(e.kind(), io::ErrorKind::BrokenPipe),
        r => panic!("unexpected {r:?}"),
    }
}

#[test]
fn multi_byte_write_is_not_rolled_back() {
    let mut w = BitsWriter::new(FlakySink::rejecting(&[2]));

    assert!(w.write(0x1122_3344_u32).is_err());
    assert_eq!(w.get_ref().bytes, [0x11, 0x22]);

    w.write(0x55_u8).unwrap();
    assert_eq!(w.get_ref().bytes, [0x11, 0x22, 0x55]);
}

#[test]
fn failed_bit_write_keeps_pending_count_in_range() {
    let mut w = BitsWriter::new(FlakySink::rejecting(&[0]));

    w.write("1111111").unwrap();
    assert_eq!(w.pending_bits(), 7);
    assert!(w.write(true).is_err());
    assert_eq!(w.pending_bits(), 0);

    w.write("10101010").unwrap();
    assert_eq!(w.get_ref().bytes, [0xaa]);
}

#[test]
fn callback_only_sees_accepted_bytes() {
    let seen = Rc::new(RefCell::new(Vec::<u8>::new()));
    let s = seen.clone();

    let mut w = BitsWriter::with_options(FlakySink::rejecting(&[1]), BitsWriterOptions {
        byte_order: ByteOrder::LittleEndian,
        write_callback: Some(Box::new(move |b| s.borrow_mut().push(b))),
    });

    assert!(w.write(0x0102_u16).is_err());
    w.write(0x03_u8).unwrap();

    assert_eq!(&*seen.borrow(), &[0x02, 0x03]);
    assert_eq!(w.get_ref().bytes, [0x02, 0x03]);
}

#[test]
fn batch_stops_after_first_sink_error() {
    let mut w = BitsWriter::new(FlakySink::rejecting(&[1]));

    let mut b = w.batch();
    b.write(0x01_u8);
    b.write(0x02_u8);
    b.write(0x03_u8);
    b.write_n(0xff_u8, 8);
    b.write_bytes_n(b"abc", 4, 0);

    assert!(matches!(b.err(), Some(Error::Sink(_))));
    drop(b);

    assert_eq!(w.get_ref().attempts, 2);
    assert_eq!(w.get_ref().bytes, [0x01]);
}

#[test]
fn mixed_stream() {
    let mut w = BitsWriter::new(Vec::new());

    let mut b = w.batch();
    b.write("100");
    b.write(0xff_u8);
    b.write(false);
    b.write(true);
    b.write_bytes_n(&[0xf0, 0x0f], 1, 0);
    b.write_n(0b101_u16, 3);
    b.write_n(0x0_u8, 3);
    b.finish().unwrap();

    assert_eq!(w.get_ref(), &[0x9f, 0b1110_1111, 0b1000_0101]);
    assert_eq!(w.pending_bits(), 3);

    let err = w.write(7_i8).unwrap_err();
    assert_eq!(err.to_string(), "write does not accept a value of type signed integer");
}
