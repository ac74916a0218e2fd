use std::{io::Write, str::FromStr};

use smolbits::BitsWriterBatch;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("invalid op `{0}`, expected `kind:value`")]
    InvalidOp(String),

    #[error("invalid number `{0}`")]
    InvalidNumber(String),

    #[error("{value} does not fit in {ty}")]
    OutOfRange { value: u64, ty: &'static str },

    #[error("invalid hex `{0}`")]
    InvalidHex(String),

    #[error(transparent)]
    Write(#[from] smolbits::Error),
}

/// One write to perform, as given on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Bits(String),
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Bytes(Vec<u8>),
    N { n: usize, value: u64 },
    Pad { n: usize, bytes: Vec<u8>, pad: u8 },
    Signed(i64),
}

impl Op {
    pub fn apply<W: Write>(&self, b: &mut BitsWriterBatch<'_, W>) {
        match self {
            Op::Bits(s) => b.write(s.as_str()),
            Op::Bool(v) => b.write(*v),
            Op::U8(u) => b.write(*u),
            Op::U16(u) => b.write(*u),
            Op::U32(u) => b.write(*u),
            Op::U64(u) => b.write(*u),
            Op::Bytes(bs) => b.write(bs.as_slice()),
            Op::N { n, value } => b.write_n(*value, *n),
            Op::Pad { n, bytes, pad } => b.write_bytes_n(bytes, *n, *pad),
            Op::Signed(i) => b.write(*i),
        }
    }
}

impl FromStr for Op {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || CliError::InvalidOp(s.to_string());
        let (kind, arg) = s.split_once(':').ok_or_else(invalid)?;

        Ok(match kind {
            "bits" => Op::Bits(arg.to_string()),
            "bool" => Op::Bool(arg.parse().map_err(|_| invalid())?),
            "u8" => Op::U8(narrow(parse_uint(arg)?, "u8")?),
            "u16" => Op::U16(narrow(parse_uint(arg)?, "u16")?),
            "u32" => Op::U32(narrow(parse_uint(arg)?, "u32")?),
            "u64" => Op::U64(parse_uint(arg)?),
            "bytes" => Op::Bytes(parse_hex(arg)?),
            "i" => Op::Signed(arg.parse().map_err(|_| CliError::InvalidNumber(arg.to_string()))?),
            _ => {
                if let Some(n) = kind.strip_prefix("pad") {
                    let (data, pad) = arg.split_once('/').unwrap_or((arg, "00"));
                    let &[pad] = parse_hex(pad)?.as_slice() else {
                        return Err(CliError::InvalidHex(pad.to_string()));
                    };

                    Op::Pad { n: parse_count(n)?, bytes: parse_hex(data)?, pad }
                } else if let Some(n) = kind.strip_prefix('n') {
                    Op::N { n: parse_count(n)?, value: parse_uint(arg)? }
                } else {
                    return Err(invalid());
                }
            },
        })
    }
}

/// Parses a decimal, `0x` hex or `0b` binary number. `_` separators are allowed.
pub fn parse_uint(s: &str) -> Result<u64, CliError> {
    let (digits, radix) = if let Some(h) = s.strip_prefix("0x") {
        (h, 16)
    } else if let Some(b) = s.strip_prefix("0b") {
        (b, 2)
    } else {
        (s, 10)
    };

    u64::from_str_radix(&digits.replace('_', ""), radix)
        .map_err(|_| CliError::InvalidNumber(s.to_string()))
}

pub fn parse_byte(s: &str) -> Result<u8, CliError> {
    narrow(parse_uint(s)?, "u8")
}

fn parse_count(s: &str) -> Result<usize, CliError> {
    s.parse().map_err(|_| CliError::InvalidNumber(s.to_string()))
}

fn narrow<T: TryFrom<u64>>(value: u64, ty: &'static str) -> Result<T, CliError> {
    T::try_from(value).map_err(|_| CliError::OutOfRange { value, ty })
}

fn parse_hex(s: &str) -> Result<Vec<u8>, CliError> {
    if s.len() % 2 != 0 {
        return Err(CliError::InvalidHex(s.to_string()));
    }

    (0..s.len())
        .step_by(2)
        .map(|i| {
            s.get(i..i + 2)
                .and_then(|h| u8::from_str_radix(h, 16).ok())
                .ok_or_else(|| CliError::InvalidHex(s.to_string()))
        })
        .collect()
}

#[test]
fn test_parse_ops() {
    assert_eq!("bits:1001".parse::<Op>().unwrap(), Op::Bits("1001".into()));
    assert_eq!("bool:true".parse::<Op>().unwrap(), Op::Bool(true));
    assert_eq!("u8:0xff".parse::<Op>().unwrap(), Op::U8(0xff));
    assert_eq!("u16:0b1_0000".parse::<Op>().unwrap(), Op::U16(16));
    assert_eq!("u32:4096".parse::<Op>().unwrap(), Op::U32(4096));
    assert_eq!("bytes:dead".parse::<Op>().unwrap(), Op::Bytes(vec![0xde, 0xad]));
    assert_eq!("n12:0x5".parse::<Op>().unwrap(), Op::N { n: 12, value: 5 });
    assert_eq!("pad4:ab".parse::<Op>().unwrap(), Op::Pad { n: 4, bytes: vec![0xab], pad: 0 });
    assert_eq!("pad2:/ff".parse::<Op>().unwrap(), Op::Pad { n: 2, bytes: vec![], pad: 0xff });
    assert_eq!("i:-3".parse::<Op>().unwrap(), Op::Signed(-3));
}

#[test]
fn test_parse_errors() {
    assert!(matches!("u8".parse::<Op>(), Err(CliError::InvalidOp(_))));
    assert!(matches!("f32:1".parse::<Op>(), Err(CliError::InvalidOp(_))));
    assert!(matches!("bool:yes".parse::<Op>(), Err(CliError::InvalidOp(_))));
    assert!(matches!("u8:256".parse::<Op>(), Err(CliError::OutOfRange { value: 256, ty: "u8" })));
    assert!(matches!("u16:0xg".parse::<Op>(), Err(CliError::InvalidNumber(_))));
    assert!(matches!("bytes:abc".parse::<Op>(), Err(CliError::InvalidHex(_))));
    assert!(matches!("pad2:ab/ffff".parse::<Op>(), Err(CliError::InvalidHex(_))));
    assert!(matches!("nx:1".parse::<Op>(), Err(CliError::InvalidNumber(_))));
}

#[test]
fn test_apply() {
    use smolbits::BitsWriter;

    let ops = ["bits:101", "u8:0xff", "n5:0", "pad2:01/ee", "i:1", "u8:1"];

    let mut w = BitsWriter::new(Vec::new());
    let mut b = w.batch();
    for op in ops.iter() {
        op.parse::<Op>().unwrap().apply(&mut b);
    }
    assert!(matches!(b.finish(), Err(smolbits::Error::UnsupportedType { .. })));

    assert_eq!(w.get_ref(), &[0b1011_1111, 0b1110_0000, 0x01, 0xee]);
}
