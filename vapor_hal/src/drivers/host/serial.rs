//! High-rate serial record sink.
//!
//! Opens the configured path write-only and non-blocking; `-` routes
//! records to stdout instead. A saturated consumer drops the record
//! (`WouldBlock`), it never stalls the tick.

use std::io::Write;
use std::os::fd::OwnedFd;

use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::write as fd_write;

use vapor_common::io::{SerialSink, TelemetryError};

use crate::error::HalError;

#[derive(Debug)]
enum Endpoint {
    Stdout,
    Device(OwnedFd),
}

/// Line-oriented serial sink.
#[derive(Debug)]
pub struct SerialLineSink {
    endpoint: Endpoint,
}

impl SerialLineSink {
    /// Open the sink. `-` selects stdout; anything else is opened
    /// `O_WRONLY | O_NONBLOCK` (serial device, FIFO, or plain file).
    pub fn open(path: &str) -> Result<Self, HalError> {
        let endpoint = if path == "-" {
            Endpoint::Stdout
        } else {
            let fd = open(path, OFlag::O_WRONLY | OFlag::O_NONBLOCK, Mode::empty()).map_err(
                |source| HalError::SerialOpen {
                    path: path.to_owned(),
                    source,
                },
            )?;
            Endpoint::Device(fd)
        };
        Ok(Self { endpoint })
    }
}

fn write_all_fd(fd: &OwnedFd, buf: &[u8]) -> Result<(), TelemetryError> {
    match fd_write(fd, buf) {
        Ok(_) => Ok(()),
        Err(Errno::EAGAIN) => Err(TelemetryError::WouldBlock),
        Err(e) => Err(TelemetryError::Io(std::io::Error::from(e))),
    }
}

impl SerialSink for SerialLineSink {
    fn write_line(&mut self, line: &str) -> Result<(), TelemetryError> {
        match &self.endpoint {
            Endpoint::Stdout => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                lock.write_all(line.as_bytes())?;
                lock.write_all(b"\n")?;
                Ok(())
            }
            Endpoint::Device(fd) => {
                write_all_fd(fd, line.as_bytes())?;
                write_all_fd(fd, b"\n")
            }
        }
    }
}
