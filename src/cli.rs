//! Command line interface for the `serialframe` binary.
//!
//! Kept free of library imports so `build.rs` can include it to render the
//! man page.

use clap::{ArgGroup, Parser};

/// Baud rate used when `--baud` is not given.
pub const DEFAULT_BAUD: u32 = 115_200;

/// Command line arguments for the `serialframe` binary.
#[derive(Debug, Parser)]
#[command(
    name = "serialframe",
    version,
    about = "Exchange CRC-checked frames with a serial device"
)]
#[command(group(ArgGroup::new("transport").required(true).args(["port", "connect"])))]
pub struct Cli {
    /// Serial device to open, for example `/dev/ttyACM0`.
    #[arg(short, long, value_name = "PATH")]
    pub port: Option<String>,

    /// Baud rate for `--port`.
    #[arg(short, long, value_name = "RATE", default_value_t = DEFAULT_BAUD)]
    pub baud: u32,

    /// Address of a TCP serial bridge instead of a local device, for example
    /// `localhost:7000`.
    #[arg(short, long, value_name = "ADDR")]
    pub connect: Option<String>,

    /// Text to send, split into 16-byte frames.
    #[arg(short, long, value_name = "TEXT")]
    pub send: Option<String>,

    /// Send the `ABCDEFG` test frame after connecting.
    #[arg(short, long)]
    pub test_frame: bool,
}
