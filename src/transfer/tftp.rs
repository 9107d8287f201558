//! Minimal RFC 1350 read-request client.
//!
//! Only what bootstrap mode needs: one RRQ, lock-step DATA/ACK, no options
//! negotiation. The whole file is held in memory and written once the last
//! block arrives, so a failed transfer leaves nothing on disk.

use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::{UdpSocket, lookup_host};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::directory::DirectoryError;

use super::{ConfigTransfer, TransferMode, TransferRequest};

/// Default wait for each packet from the server.
pub const DEFAULT_TFTP_TIMEOUT_SECS: u64 = 5;
/// Default number of times the last packet is resent on timeout.
pub const DEFAULT_TFTP_RETRANSMITS: u32 = 3;

const OP_RRQ: u16 = 1;
const OP_DATA: u16 = 3;
const OP_ACK: u16 = 4;
const OP_ERROR: u16 = 5;
const BLOCK_SIZE: usize = 512;
const RECV_BUFFER_SIZE: usize = 2048;

/// Timing policy for [`TftpClient`].
#[derive(Debug, Clone, Copy)]
pub struct TftpSettings {
    pub timeout: Duration,
    pub retransmits: u32,
}

impl Default for TftpSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(DEFAULT_TFTP_TIMEOUT_SECS),
            retransmits: DEFAULT_TFTP_RETRANSMITS,
        }
    }
}

/// [`ConfigTransfer`] over TFTP.
#[derive(Debug, Clone, Default)]
pub struct TftpClient {
    settings: TftpSettings,
}

impl TftpClient {
    #[must_use]
    pub fn new(settings: TftpSettings) -> Self {
        Self { settings }
    }

    async fn receive(&self, request: &TransferRequest) -> Result<Vec<u8>, DirectoryError> {
        let filename = request.filename.as_str();
        let fail = |reason: String| DirectoryError::transfer(filename, &reason);

        let target = format!("{}:{}", request.server, request.port);
        let server = lookup_host(&target)
            .await
            .map_err(|error| fail(format!("cannot resolve TFTP server {target}: {error}")))?
            .next()
            .ok_or_else(|| fail(format!("TFTP server {target} has no address")))?;

        let local: SocketAddr = if server.is_ipv4() {
            (Ipv4Addr::UNSPECIFIED, 0).into()
        } else {
            (Ipv6Addr::UNSPECIFIED, 0).into()
        };
        let socket = UdpSocket::bind(local)
            .await
            .map_err(|error| fail(format!("cannot bind UDP socket: {error}")))?;

        let mut last_sent = read_request(filename, request.mode);
        let mut send_to = server;
        send(&socket, &last_sent, send_to, filename).await?;
        debug!(server = %server, mode = request.mode.as_str(), "Sent TFTP read request");

        let mut peer: Option<SocketAddr> = None;
        let mut expected: u16 = 1;
        let mut attempts: u32 = 0;
        let mut data = Vec::new();
        let mut buf = [0u8; RECV_BUFFER_SIZE];

        loop {
            let (len, from) = match timeout(self.settings.timeout, socket.recv_from(&mut buf)).await
            {
                Ok(received) => received
                    .map_err(|error| fail(format!("UDP receive failed: {error}")))?,
                Err(_) => {
                    if attempts >= self.settings.retransmits {
                        return Err(fail(format!(
                            "no response from {target} after {} attempt(s)",
                            attempts + 1
                        )));
                    }
                    attempts += 1;
                    warn!(attempt = attempts, block = expected, "TFTP timeout; resending last packet");
                    send(&socket, &last_sent, send_to, filename).await?;
                    continue;
                }
            };

            // The first reply fixes the server's transfer ID.
            match peer {
                Some(tid) if tid != from => {
                    debug!(from = %from, "Ignoring packet from unknown transfer ID");
                    continue;
                }
                None if from.ip() != server.ip() => {
                    debug!(from = %from, "Ignoring packet from unexpected host");
                    continue;
                }
                None => {
                    peer = Some(from);
                    send_to = from;
                }
                Some(_) => {}
            }

            match parse_packet(&buf[..len]) {
                Some(Packet::Data { block, payload }) if block == expected => {
                    data.extend_from_slice(payload);
                    let last = payload.len() < BLOCK_SIZE;
                    last_sent = ack(block);
                    send(&socket, &last_sent, send_to, filename).await?;
                    attempts = 0;
                    if last {
                        break;
                    }
                    expected = expected.wrapping_add(1);
                }
                Some(Packet::Data { block, .. }) if block == expected.wrapping_sub(1) => {
                    // Our ACK was lost; acknowledge again without appending.
                    send(&socket, &ack(block), send_to, filename).await?;
                }
                Some(Packet::Data { block, .. }) => {
                    debug!(block, expected, "Ignoring out-of-sequence block");
                }
                Some(Packet::Error { code, message }) => {
                    return Err(fail(format!("server error {code}: {message}")));
                }
                None => {
                    return Err(fail("malformed packet from TFTP server".to_string()));
                }
            }
        }

        Ok(data)
    }
}

#[async_trait]
impl ConfigTransfer for TftpClient {
    #[tracing::instrument(skip(self, request), fields(server = %request.server, file = %request.filename))]
    async fn download(&self, request: &TransferRequest) -> Result<u64, DirectoryError> {
        let mut data = self.receive(request).await?;
        if request.mode == TransferMode::Netascii {
            data = decode_netascii(&data);
        }

        tokio::fs::write(&request.destination, &data)
            .await
            .map_err(|error| {
                DirectoryError::transfer(
                    &request.filename,
                    &format!("cannot write {}: {error}", request.destination.display()),
                )
            })?;

        info!(
            path = %request.destination.display(),
            bytes = data.len(),
            "Downloaded bootstrap file"
        );
        Ok(data.len() as u64)
    }
}

async fn send(
    socket: &UdpSocket,
    packet: &[u8],
    to: SocketAddr,
    filename: &str,
) -> Result<(), DirectoryError> {
    socket
        .send_to(packet, to)
        .await
        .map(|_| ())
        .map_err(|error| DirectoryError::transfer(filename, &format!("UDP send failed: {error}")))
}

#[derive(Debug, PartialEq, Eq)]
enum Packet<'a> {
    Data { block: u16, payload: &'a [u8] },
    Error { code: u16, message: String },
}

fn parse_packet(packet: &[u8]) -> Option<Packet<'_>> {
    if packet.len() < 4 {
        return None;
    }
    let opcode = u16::from_be_bytes([packet[0], packet[1]]);
    let arg = u16::from_be_bytes([packet[2], packet[3]]);
    match opcode {
        OP_DATA => Some(Packet::Data {
            block: arg,
            payload: &packet[4..],
        }),
        OP_ERROR => {
            let text = &packet[4..];
            let end = text.iter().position(|&b| b == 0).unwrap_or(text.len());
            Some(Packet::Error {
                code: arg,
                message: String::from_utf8_lossy(&text[..end]).into_owned(),
            })
        }
        _ => None,
    }
}

fn read_request(filename: &str, mode: TransferMode) -> Vec<u8> {
    let mut packet = Vec::with_capacity(4 + filename.len() + mode.as_str().len());
    packet.extend_from_slice(&OP_RRQ.to_be_bytes());
    packet.extend_from_slice(filename.as_bytes());
    packet.push(0);
    packet.extend_from_slice(mode.as_str().as_bytes());
    packet.push(0);
    packet
}

fn ack(block: u16) -> Vec<u8> {
    let mut packet = Vec::with_capacity(4);
    packet.extend_from_slice(&OP_ACK.to_be_bytes());
    packet.extend_from_slice(&block.to_be_bytes());
    packet
}

/// Converts netascii line endings: `CR LF` to `LF`, `CR NUL` to `CR`.
fn decode_netascii(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut iter = bytes.iter().copied().peekable();
    while let Some(byte) = iter.next() {
        if byte == b'\r' {
            match iter.peek() {
                Some(b'\n') => {
                    iter.next();
                    out.push(b'\n');
                }
                Some(0) => {
                    iter.next();
                    out.push(b'\r');
                }
                _ => out.push(b'\r'),
            }
        } else {
            out.push(byte);
        }
    }
    out
}
