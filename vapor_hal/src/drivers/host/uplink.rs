//! Publish-channel uplink over UDP datagrams.
//!
//! One JSON object per datagram, fire-and-forget: that matches the
//! at-most-once publish contract, and a full socket buffer drops the
//! message instead of delaying the tick.

use std::net::UdpSocket;

use serde::Serialize;
use tracing::debug;

use vapor_common::io::{FeedPublisher, TelemetryError};
use vapor_common::telemetry::{Announcement, FeedMessage};

use crate::error::HalError;

/// Datagram publisher for the feed channel.
#[derive(Debug)]
pub struct UdpFeedPublisher {
    socket: UdpSocket,
}

impl UdpFeedPublisher {
    /// Bind an ephemeral local port and connect it to the collector.
    pub fn connect(addr: &str) -> Result<Self, HalError> {
        let setup = |source| HalError::UplinkSetup {
            addr: addr.to_owned(),
            source,
        };
        let socket = UdpSocket::bind("0.0.0.0:0").map_err(setup)?;
        socket.connect(addr).map_err(setup)?;
        socket.set_nonblocking(true).map_err(setup)?;
        debug!(%addr, "uplink socket connected");
        Ok(Self { socket })
    }

    fn send_json<T: Serialize>(&self, message: &T) -> Result<(), TelemetryError> {
        let payload = serde_json::to_vec(message)
            .map_err(|e| TelemetryError::Io(std::io::Error::other(e)))?;
        match self.socket.send(&payload) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(TelemetryError::WouldBlock)
            }
            Err(e) => Err(TelemetryError::Io(e)),
        }
    }
}

impl FeedPublisher for UdpFeedPublisher {
    fn announce(&mut self, announcement: &Announcement) -> Result<(), TelemetryError> {
        self.send_json(announcement)
    }

    fn publish(&mut self, message: &FeedMessage) -> Result<(), TelemetryError> {
        self.send_json(message)
    }
}
