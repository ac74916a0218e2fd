/// A value accepted by [`BitsWriter::write`](crate::BitsWriter::write) and
/// [`BitsWriter::write_n`](crate::BitsWriter::write_n).
///
/// - `Bits("10010")` is written as one bit per character, anything other than
///   `'1'` counting as a zero
/// - `Bytes` is written as whole bytes
/// - `Bool` is a single bit
/// - `U8`..`U64` are written as 1, 2, 4 or 8 bytes in the writer's byte order
/// - `Signed` has no defined layout and is always rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Value<'a> {
    Bits(&'a str),
    Bytes(&'a [u8]),
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    Signed(i64),
}

impl Value<'_> {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bits(_) => "bit string",
            Value::Bytes(_) => "bytes",
            Value::Bool(_) => "bool",
            Value::U8(_) => "u8",
            Value::U16(_) => "u16",
            Value::U32(_) => "u32",
            Value::U64(_) => "u64",
            Value::Signed(_) => "signed integer",
        }
    }

    /// The value widened to `u64`, if it is an unsigned integer.
    pub fn as_unsigned(&self) -> Option<u64> {
        match *self {
            Value::U8(v) => Some(v as u64),
            Value::U16(v) => Some(v as u64),
            Value::U32(v) => Some(v as u64),
            Value::U64(v) => Some(v),
            _ => None,
        }
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Bits(value)
    }
}

impl<'a> From<&'a String> for Value<'a> {
    fn from(value: &'a String) -> Self {
        Value::Bits(value)
    }
}

impl<'a> From<&'a [u8]> for Value<'a> {
    fn from(value: &'a [u8]) -> Self {
        Value::Bytes(value)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Value<'a> {
    fn from(value: &'a [u8; N]) -> Self {
        Value::Bytes(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Value<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<bool> for Value<'_> {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! impl_from {
    ($($t:ty => $v:ident),* $(,)?) => {
        $(
            impl From<$t> for Value<'_> {
                fn from(value: $t) -> Self {
                    Value::$v(value.into())
                }
            }
        )*
    };
}

impl_from! {
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    i8 => Signed,
    i16 => Signed,
    i32 => Signed,
    i64 => Signed,
}

#[test]
fn test_conversions() {
    assert_eq!(Value::from("101"), Value::Bits("101"));
    assert_eq!(Value::from(&[1_u8, 2][..]), Value::Bytes(&[1, 2]));
    assert_eq!(Value::from(&[1_u8, 2]), Value::Bytes(&[1, 2]));
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(0x12_u16), Value::U16(0x12));
    assert_eq!(Value::from(-3_i32), Value::Signed(-3));
}

#[test]
fn test_as_unsigned() {
    assert_eq!(Value::U8(0xab).as_unsigned(), Some(0xab));
    assert_eq!(Value::U64(u64::MAX).as_unsigned(), Some(u64::MAX));
    assert_eq!(Value::Bool(true).as_unsigned(), None);
    assert_eq!(Value::Signed(1).as_unsigned(), None);
    assert_eq!(Value::Bits("1").as_unsigned(), None);
}
