//! Message framing
//!
//! Each encoded transaction is a 10-byte header followed by the offset-table
//! body produced by [`crate::serialization`].
//!
//! | Offset | Width    | Field                 |
//! |--------|----------|-----------------------|
//! | 0      | u8       | protocol version      |
//! | 1      | u8       | network id            |
//! | 2      | u16 LE   | message type          |
//! | 4      | u16 LE   | service id            |
//! | 6      | u32 LE   | body length           |

use crate::crypto::{self, TxHash};
use crate::error::Result;
use crate::serialization::{checked_u32, encode_body, SegmentWriter};
use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Length of the message header.
pub const HEADER_LENGTH: usize = 10;

/// Version of the wire protocol. Different versions are incompatible.
pub const PROTOCOL_VERSION: u8 = 0;

pub const NETWORK_ID: u8 = 0;

/// Service id of the asset ledger.
pub const SERVICE_ID: u16 = 2;

pub const TRANSFER_ID: u16 = 200;
pub const TRANSFER_FEES_PAYER_ID: u16 = 201;
pub const ADD_ASSETS_ID: u16 = 300;
pub const DELETE_ASSETS_ID: u16 = 400;
pub const TRADE_ID: u16 = 501;
pub const TRADE_INTERMEDIARY_ID: u16 = 502;
pub const EXCHANGE_ID: u16 = 601;
pub const EXCHANGE_INTERMEDIARY_ID: u16 = 602;
pub const ASK_OFFER_ID: u16 = 701;
pub const BID_OFFER_ID: u16 = 702;

/// Header values shared by every message a client produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    pub protocol_version: u8,
    pub network_id: u8,
    pub service_id: u16,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            protocol_version: PROTOCOL_VERSION,
            network_id: NETWORK_ID,
            service_id: SERVICE_ID,
        }
    }
}

/// Fixed message header, laid out byte for byte as it appears on the wire.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct MessageHeader {
    protocol_version: u8,
    network_id: u8,
    message_type: [u8; 2],
    service_id: [u8; 2],
    body_length: [u8; 4],
}

impl MessageHeader {
    pub fn new(config: &MessageConfig, message_type: u16, body_length: u32) -> Self {
        Self {
            protocol_version: config.protocol_version,
            network_id: config.network_id,
            message_type: message_type.to_le_bytes(),
            service_id: config.service_id.to_le_bytes(),
            body_length: body_length.to_le_bytes(),
        }
    }

    /// Read a header from the front of an encoded message.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        bytes
            .get(..HEADER_LENGTH)
            .and_then(|raw| bytemuck::try_pod_read_unaligned(raw).ok())
    }

    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::bytes_of(self)
    }

    pub fn protocol_version(&self) -> u8 {
        self.protocol_version
    }

    pub fn network_id(&self) -> u8 {
        self.network_id
    }

    pub fn message_type(&self) -> u16 {
        u16::from_le_bytes(self.message_type)
    }

    pub fn service_id(&self) -> u16 {
        u16::from_le_bytes(self.service_id)
    }

    pub fn body_length(&self) -> u32 {
        u32::from_le_bytes(self.body_length)
    }
}

/// Prepends the header to an encoded body.
#[derive(Debug)]
pub struct MessageWriter {
    config: MessageConfig,
    message_type: u16,
}

impl MessageWriter {
    pub fn new(config: MessageConfig, message_type: u16) -> Self {
        Self {
            config,
            message_type,
        }
    }

    pub fn finish(self, body: Vec<u8>) -> Result<Vec<u8>> {
        let body_length = checked_u32("body length", body.len())?;
        let header = MessageHeader::new(&self.config, self.message_type, body_length);

        let mut raw = Vec::new();
        raw.try_reserve(HEADER_LENGTH + body.len())?;
        raw.extend_from_slice(header.as_bytes());
        raw.extend_from_slice(&body);
        Ok(raw)
    }
}

/// A ledger transaction that can be framed and encoded.
pub trait Transaction {
    /// Message type written to the header.
    const MESSAGE_TYPE: u16;

    /// Size of the body's fixed section.
    const BODY_SIZE: usize;

    fn config(&self) -> &MessageConfig;

    /// Write the body fields into the fixed section starting at `base`.
    fn write_body(&self, writer: &mut SegmentWriter, base: usize) -> Result<()>;

    /// Canonical encoding of the current state. Pure: two calls on equal
    /// state give equal bytes.
    fn to_bytes(&self) -> Result<Vec<u8>> {
        let body = encode_body(Self::BODY_SIZE, |writer, base| self.write_body(writer, base))?;
        let raw = MessageWriter::new(*self.config(), Self::MESSAGE_TYPE).finish(body)?;
        debug!(
            message_type = Self::MESSAGE_TYPE,
            length = raw.len(),
            tx_hash = %crypto::hex_string(crypto::hash(&raw).as_ref()),
            "transaction encoded"
        );
        Ok(raw)
    }

    /// SHA-256 of the encoded message, the id the ledger files it under.
    fn hash(&self) -> Result<TxHash> {
        Ok(crypto::hash(&self.to_bytes()?))
    }

    /// Encode and close the builder against further additions.
    fn finalize(&mut self) -> Result<Vec<u8>> {
        let raw = self.to_bytes()?;
        self.seal();
        Ok(raw)
    }

    /// Called once the builder has been finalized.
    fn seal(&mut self) {}
}
