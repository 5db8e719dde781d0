//! Multi-process transport over TCP.
//!
//! Rank 0 listens; every other rank connects to it and announces itself with
//! a JSON hello frame. A peer that stays silent past the handshake timeout
//! fails the run instead of stalling rank 0. The result is a star: only root to peer routes exist,
//! which is all the candidate exchange needs.
//!
//! Every message is one frame: a little-endian `u32` length followed by that
//! many bytes.

use crate::distributed::comm::Communicator;
use crate::error::CommError;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};

/// Largest frame either side will accept.
pub const MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// How long either side waits for the other's handshake frame.
pub const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

const PROTOCOL: &str = "cubesearch/1";
const HANDSHAKE_ACK: &[u8] = b"ok";
const CONNECT_RETRY: Duration = Duration::from_millis(100);

/// First frame a peer sends to the root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct Hello {
    protocol: String,
    rank: usize,
    size: usize,
}

/// One rank's view of a TCP star.
pub struct TcpCommunicator {
    rank: usize,
    size: usize,
    /// Indexed by rank. The root holds a stream for every peer; a peer holds
    /// only the root's.
    streams: Vec<Option<TcpStream>>,
}

impl TcpCommunicator {
    /// Bind `addr` as rank 0 and wait for `size - 1` peers.
    pub fn listen(addr: impl ToSocketAddrs, size: usize) -> Result<Self, CommError> {
        let listener = TcpListener::bind(addr)?;
        Self::accept_peers(&listener, size)
    }

    /// Act as rank 0 on an already-bound listener.
    pub fn accept_peers(listener: &TcpListener, size: usize) -> Result<Self, CommError> {
        Self::accept_peers_within(listener, size, HANDSHAKE_TIMEOUT)
    }

    /// Like [`accept_peers`](Self::accept_peers), failing any peer whose hello
    /// takes longer than `handshake_timeout`.
    pub fn accept_peers_within(
        listener: &TcpListener,
        size: usize,
        handshake_timeout: Duration,
    ) -> Result<Self, CommError> {
        let size = size.max(1);
        let mut streams: Vec<Option<TcpStream>> = (0..size).map(|_| None).collect();

        log::info!(
            "rank 0 waiting for {} peers on {}",
            size - 1,
            listener.local_addr()?
        );

        for _ in 1..size {
            let (mut stream, peer_addr) = listener.accept()?;
            stream.set_nodelay(true)?;
            stream.set_read_timeout(Some(handshake_timeout))?;
            let rank = read_handshake(&mut stream, size)
                .map_err(|err| handshake_timeout_error(err, &peer_addr))?;
            stream.set_read_timeout(None)?;
            if streams[rank].is_some() {
                return Err(CommError::Handshake(format!(
                    "rank {} connected twice (second time from {})",
                    rank, peer_addr
                )));
            }
            write_frame(&mut stream, HANDSHAKE_ACK)?;
            log::debug!("rank {} joined from {}", rank, peer_addr);
            streams[rank] = Some(stream);
        }

        Ok(Self {
            rank: 0,
            size,
            streams,
        })
    }

    /// Join the root at `addr` as `rank`, retrying until `wait` elapses.
    pub fn connect(
        addr: SocketAddr,
        rank: usize,
        size: usize,
        wait: Duration,
    ) -> Result<Self, CommError> {
        if rank == 0 || rank >= size {
            return Err(CommError::BadRank { rank, size });
        }

        let deadline = Instant::now() + wait;
        let mut stream = loop {
            match TcpStream::connect(addr) {
                Ok(stream) => break stream,
                Err(err) if Instant::now() < deadline => {
                    log::debug!("rank {} waiting for root at {}: {}", rank, addr, err);
                    thread::sleep(CONNECT_RETRY);
                }
                Err(err) => return Err(err.into()),
            }
        };
        stream.set_nodelay(true)?;

        let hello = Hello {
            protocol: PROTOCOL.to_string(),
            rank,
            size,
        };
        let hello = serde_json::to_vec(&hello)
            .map_err(|e| CommError::Handshake(format!("cannot encode hello: {}", e)))?;
        write_frame(&mut stream, &hello)?;

        stream.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
        let ack = read_frame(&mut stream, 0).map_err(|err| handshake_timeout_error(err, &addr))?;
        if ack != HANDSHAKE_ACK {
            return Err(CommError::Handshake("root did not acknowledge".to_string()));
        }
        stream.set_read_timeout(None)?;

        let mut streams: Vec<Option<TcpStream>> = (0..size).map(|_| None).collect();
        streams[0] = Some(stream);
        Ok(Self {
            rank,
            size,
            streams,
        })
    }

    fn stream(&mut self, peer: usize) -> Result<&mut TcpStream, CommError> {
        if peer >= self.size {
            return Err(CommError::BadRank {
                rank: peer,
                size: self.size,
            });
        }
        let from = self.rank;
        self.streams[peer]
            .as_mut()
            .ok_or(CommError::NoRoute { from, to: peer })
    }
}

impl Communicator for TcpCommunicator {
    fn rank(&self) -> usize {
        self.rank
    }

    fn size(&self) -> usize {
        self.size
    }

    fn send(&mut self, to: usize, payload: &[u8]) -> Result<(), CommError> {
        let stream = self.stream(to)?;
        write_frame(stream, payload).map_err(|err| disconnect(err, to))
    }

    fn recv(&mut self, from: usize) -> Result<Vec<u8>, CommError> {
        let stream = self.stream(from)?;
        read_frame(stream, from)
    }
}

fn read_handshake(stream: &mut TcpStream, size: usize) -> Result<usize, CommError> {
    let hello: Hello = serde_json::from_slice(&read_frame(stream, 0)?)
        .map_err(|e| CommError::Handshake(format!("malformed hello: {}", e)))?;
    if hello.protocol != PROTOCOL {
        return Err(CommError::Handshake(format!(
            "peer speaks {}, root speaks {}",
            hello.protocol, PROTOCOL
        )));
    }
    if hello.size != size {
        return Err(CommError::Handshake(format!(
            "peer expects a world of {}, root has {}",
            hello.size, size
        )));
    }
    if hello.rank == 0 || hello.rank >= size {
        return Err(CommError::BadRank {
            rank: hello.rank,
            size,
        });
    }
    Ok(hello.rank)
}

/// Report a read that hit the socket timeout as a failed handshake.
fn handshake_timeout_error(err: CommError, peer: &impl Display) -> CommError {
    match err {
        CommError::Io(io_err)
            if matches!(
                io_err.kind(),
                io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ) =>
        {
            CommError::Handshake(format!("no handshake from {} before the timeout", peer))
        }
        other => other,
    }
}

fn wire_u32(value: usize) -> Result<u32, CommError> {
    u32::try_from(value).map_err(|_| CommError::FrameTooLarge(value))
}

fn write_frame(stream: &mut impl Write, payload: &[u8]) -> Result<(), CommError> {
    if payload.len() > MAX_FRAME_LEN {
        return Err(CommError::FrameTooLarge(payload.len()));
    }
    stream.write_all(&wire_u32(payload.len())?.to_le_bytes())?;
    stream.write_all(payload)?;
    stream.flush()?;
    Ok(())
}

fn read_frame(stream: &mut impl Read, peer: usize) -> Result<Vec<u8>, CommError> {
    let mut len = [0u8; 4];
    stream
        .read_exact(&mut len)
        .map_err(|err| disconnect(err.into(), peer))?;
    let len = u32::from_le_bytes(len) as usize;
    if len > MAX_FRAME_LEN {
        return Err(CommError::FrameTooLarge(len));
    }
    let mut payload = vec![0u8; len];
    stream
        .read_exact(&mut payload)
        .map_err(|err| disconnect(err.into(), peer))?;
    Ok(payload)
}

/// Report a closed connection as the peer going away.
fn disconnect(err: CommError, peer: usize) -> CommError {
    match err {
        CommError::Io(io_err)
            if matches!(
                io_err.kind(),
                io::ErrorKind::UnexpectedEof
                    | io::ErrorKind::BrokenPipe
                    | io::ErrorKind::ConnectionReset
                    | io::ErrorKind::ConnectionAborted
            ) =>
        {
            CommError::Disconnected(peer)
        }
        other => other,
    }
}
