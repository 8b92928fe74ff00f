//! Serial link terminal built on `serialframe`.
//!
//! Opens a serial device (or a TCP serial bridge), optionally sends text or
//! the test frame, then prints every data frame received until the peer
//! closes or Ctrl-C.

mod cli;

use std::fmt::Write as _;

use clap::Parser;
use serialframe::{Frame, Link, LinkError, frame::PAYLOAD_LEN};
use tokio::net::TcpStream;
use tokio_serial::SerialPortBuilderExt;
use tracing::info;
use tracing_subscriber::EnvFilter;

const TEST_FRAME: &[u8] = b"ABCDEFG";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = cli::Cli::parse();
    let mut link = open(&cli).await?;

    if cli.test_frame {
        link.send_data(TEST_FRAME).await?;
    }
    if let Some(text) = &cli.send {
        for chunk in text.as_bytes().chunks(PAYLOAD_LEN) {
            link.send_data(chunk).await?;
        }
    }

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);
    loop {
        tokio::select! {
            received = link.receive() => match received {
                Ok(frame) => println!("{}", describe(&frame)),
                Err(LinkError::Closed) => break,
                Err(e) => return Err(e.into()),
            },
            _ = &mut ctrl_c => {
                info!("interrupted, closing link");
                link.shutdown();
                break;
            }
        }
    }
    Ok(())
}

/// Open whichever transport the command line names.
async fn open(cli: &cli::Cli) -> Result<Link, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.port {
        let port = tokio_serial::new(path, cli.baud).open_native_async()?;
        info!(port = %path, baud = cli.baud, "serial port opened");
        return Ok(Link::new(port));
    }
    let addr = cli.connect.as_deref().ok_or("no transport given")?;
    let stream = TcpStream::connect(addr).await?;
    info!(addr = %addr, "connected to serial bridge");
    Ok(Link::new(stream))
}

/// Render a frame's data as hex followed by printable ASCII.
fn describe(frame: &Frame) -> String {
    let data = frame.data();
    let mut out = format!("[{:2}]", data.len());
    for byte in data {
        let _ = write!(out, " {byte:02X}");
    }
    out.push_str("  |");
    out.extend(data.iter().map(|&b| {
        if b.is_ascii_graphic() || b == b' ' {
            char::from(b)
        } else {
            '.'
        }
    }));
    out.push('|');
    out
}
