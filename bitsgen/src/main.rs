use std::{cell::Cell, rc::Rc};

use clap::*;
use smolbits::{byte_parity, hamming84_decode, BitsWriter, BitsWriterOptions, ByteOrder};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

mod op;

use op::{CliError, Op};

#[derive(Parser)]
#[command(name = "bitsgen", about = "Assemble bits, bytes and integers into a byte stream")]
struct Args {
    /// Log to stderr, -v for debug and -vv for trace. RUST_LOG takes precedence
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Clone)]
enum Cmd {
    /// Write ops in order and print the completed bytes.
    ///
    /// Ops: bits:1001, bool:true, u8:V, u16:V, u32:V, u64:V, bytes:HEX,
    /// n<N>:V (low N bits of V), pad<N>:HEX[/PAD], i:V (signed, rejected)
    Write {
        #[arg(short, long, default_value = "be")]
        order: _ByteOrder,
        #[arg(short, long, default_value = "hex")]
        format: OutputFormat,
        #[arg(required = true)]
        ops: Vec<Op>,
    },
    /// Decode Hamming 8/4 protected bytes
    Hamming {
        #[arg(required = true, value_parser = op::parse_byte)]
        bytes: Vec<u8>,
    },
    /// Check the parity of bytes and strip their top bit
    Parity {
        #[arg(required = true, value_parser = op::parse_byte)]
        bytes: Vec<u8>,
    },
}

#[derive(ValueEnum, Clone)]
pub enum _ByteOrder {
    Be,
    Le,
}

#[derive(ValueEnum, Clone, Copy)]
enum OutputFormat {
    Hex,
    Bin,
}

impl From<_ByteOrder> for ByteOrder {
    fn from(value: _ByteOrder) -> Self {
        match value {
            _ByteOrder::Be => Self::BigEndian,
            _ByteOrder::Le => Self::LittleEndian,
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn write(order: ByteOrder, ops: &[Op]) -> Result<Vec<u8>, CliError> {
    let completed = Rc::new(Cell::new(0_usize));
    let c = completed.clone();

    let mut w = BitsWriter::with_options(Vec::new(), BitsWriterOptions {
        byte_order: order,
        write_callback: Some(Box::new(move |_| c.set(c.get() + 1))),
    });

    let mut batch = w.batch();
    for op in ops.iter() {
        debug!(?op, "applying");
        op.apply(&mut batch);
    }
    batch.finish()?;

    debug!(bytes = completed.get(), "done");
    if !w.is_aligned() {
        warn!(bits = w.pending_bits(), "last byte is unfinished, its bits are dropped");
    }

    Ok(w.into_inner())
}

fn print_bytes(bytes: &[u8], format: OutputFormat) {
    let s = bytes
        .iter()
        .map(|b| match format {
            OutputFormat::Hex => format!("{b:02x}"),
            OutputFormat::Bin => format!("{b:08b}"),
        })
        .collect::<Vec<_>>()
        .join(" ");

    println!("{s}");
}

fn run(args: Args) -> Result<(), CliError> {
    match args.command {
        Cmd::Write { order, format, ops } => {
            let bytes = write(order.into(), &ops)?;
            print_bytes(&bytes, format);
        },
        Cmd::Hamming { bytes } => {
            for b in bytes {
                match hamming84_decode(b) {
                    Some(n) => println!("{b:#04x} {n:#x}"),
                    None => println!("{b:#04x} invalid"),
                }
            }
        },
        Cmd::Parity { bytes } => {
            for b in bytes {
                let (masked, odd) = byte_parity(b);
                println!("{b:#04x} {masked:#04x} {}", if odd { "odd" } else { "even" });
            }
        },
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[test]
fn test_write() {
    let ops = ["bits:100", "u8:0xff", "u16:0x1234", "n5:0"]
        .iter()
        .map(|s| s.parse().unwrap())
        .collect::<Vec<Op>>();

    assert_eq!(write(ByteOrder::BigEndian, &ops).unwrap(), [0x9f, 0xe2, 0x46, 0x80]);
    assert_eq!(write(ByteOrder::LittleEndian, &ops).unwrap(), [0x9f, 0xe6, 0x82, 0x40]);
}

#[test]
fn test_write_drops_unfinished_byte() {
    let ops = vec![Op::U8(0xab), Op::Bits("1".into())];
    assert_eq!(write(ByteOrder::BigEndian, &ops).unwrap(), [0xab]);
}

#[test]
fn test_cli() {
    Args::command().debug_assert();

    let args = Args::try_parse_from(["bitsgen", "-v", "write", "-o", "le", "u16:1", "bits:1"]).unwrap();
    assert_eq!(args.verbose, 1);
    assert!(matches!(args.command, Cmd::Write { ops, .. } if ops == [Op::U16(1), Op::Bits("1".into())]));

    assert!(Args::try_parse_from(["bitsgen", "write", "u8:300"]).is_err());
    assert!(Args::try_parse_from(["bitsgen", "parity", "0x1ff"]).is_err());
}
