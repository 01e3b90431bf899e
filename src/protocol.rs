//! Wire format for point-to-point frames.
//!
//! Every exchange carries `(sender, kind, element_count, payload)`. The
//! channel layer preserves message boundaries, but the payload length is
//! still encoded so a malformed frame is caught at decode time rather
//! than corrupting a run.

use crate::error::{MeshError, Result};
use crate::types::{FrameKind, Rank};
use bytes::{Buf, BufMut, Bytes, BytesMut};

/// Fixed header size: sender (4) + kind (1) + element_count (4) + payload_len (4).
const HEADER_BYTES: usize = 13;

/// One point-to-point message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub sender: Rank,
    pub kind: FrameKind,
    /// Number of elements in `payload`; element size is agreed out of band.
    pub element_count: u32,
    pub payload: Bytes,
}

impl Frame {
    pub fn payload(sender: Rank, element_count: u32, payload: Bytes) -> Self {
        Self {
            sender,
            kind: FrameKind::Payload,
            element_count,
            payload,
        }
    }

    /// An empty control frame (barrier token, release signal).
    pub fn control(sender: Rank) -> Self {
        Self {
            sender,
            kind: FrameKind::Control,
            element_count: 0,
            payload: Bytes::new(),
        }
    }

    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(HEADER_BYTES + self.payload.len());
        buf.put_u32_le(self.sender);
        buf.put_u8(self.kind as u8);
        buf.put_u32_le(self.element_count);
        buf.put_u32_le(self.payload.len() as u32);
        buf.extend_from_slice(&self.payload);
        buf.freeze()
    }

    pub fn decode(mut raw: Bytes) -> Result<Self> {
        if raw.len() < HEADER_BYTES {
            return Err(MeshError::DecodeFailed(format!(
                "frame too short: {} bytes, header is {HEADER_BYTES}",
                raw.len()
            )));
        }
        let sender = raw.get_u32_le();
        let kind_raw = raw.get_u8();
        let kind = FrameKind::from_u8(kind_raw)
            .ok_or_else(|| MeshError::DecodeFailed(format!("unknown frame kind {kind_raw}")))?;
        let element_count = raw.get_u32_le();
        let payload_len = raw.get_u32_le() as usize;
        if raw.len() != payload_len {
            return Err(MeshError::DecodeFailed(format!(
                "payload length mismatch: header says {payload_len}, got {}",
                raw.len()
            )));
        }
        Ok(Self {
            sender,
            kind,
            element_count,
            payload: raw,
        })
    }
}

/// A unicast message in flight: the path of ranks visited so far plus the
/// user payload. Travels inside a payload frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    /// Visited ranks, extended by each forwarding hop.
    pub path: Vec<Rank>,
    pub data: Bytes,
}

impl RoutedMessage {
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(4 + self.path.len() * 4 + self.data.len());
        buf.put_u32_le(self.path.len() as u32);
        for &r in &self.path {
            buf.put_u32_le(r);
        }
        buf.extend_from_slice(&self.data);
        buf.freeze()
    }

    pub fn decode(mut raw: Bytes) -> Result<Self> {
        if raw.len() < 4 {
            return Err(MeshError::DecodeFailed("routed message too short".into()));
        }
        let hops = raw.get_u32_le() as usize;
        if raw.len() < hops * 4 {
            return Err(MeshError::DecodeFailed(format!(
                "routed message truncated: {hops} hops declared, {} bytes left",
                raw.len()
            )));
        }
        let mut path = Vec::with_capacity(hops);
        for _ in 0..hops {
            path.push(raw.get_u32_le());
        }
        Ok(Self { path, data: raw })
    }
}
