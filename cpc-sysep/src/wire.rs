//! Frame codec for the System Endpoint's command/reply wire format (`spec.md` §3-§4): a
//! 3-byte header (command id, sequence number, payload length) followed by a payload whose
//! shape depends on the command id, the way `neutronium::net::frame` layers `Category` framing
//! over `Channel`'s raw header parsing.

use crate::error::{WireError, WireResult};
use byteorder::{ByteOrder, LittleEndian};
use std::convert::TryFrom;

pub const HEADER_SIZE: usize = 3;

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum CommandId {
    Noop = 0x01,
    Reset = 0x02,
    PropValueGet = 0x03,
    PropValueSet = 0x04,
    PropValueIs = 0x05,
}

impl TryFrom<u8> for CommandId {
    type Error = WireError;

    fn try_from(value: u8) -> WireResult<CommandId> {
        Ok(match value {
            0x01 => CommandId::Noop,
            0x02 => CommandId::Reset,
            0x03 => CommandId::PropValueGet,
            0x04 => CommandId::PropValueSet,
            0x05 => CommandId::PropValueIs,
            _ => return Err(WireError::IllegalCommand),
        })
    }
}

impl From<CommandId> for u8 {
    fn from(id: CommandId) -> u8 {
        id as u8
    }
}

/// A decoded command/reply header plus its payload slice.
#[derive(Debug)]
pub struct DecodedFrame<'a> {
    pub command_id: CommandId,
    pub command_seq: u8,
    pub payload: &'a [u8],
}

/// Encodes a full command frame: 1-byte id, 1-byte seq, 1-byte length, payload.
pub fn encode_frame(command_id: CommandId, command_seq: u8, payload: &[u8]) -> Vec<u8> {
    assert!(
        payload.len() <= u8::max_value() as usize,
        "payload too large for a u8 length field"
    );

    let mut frame = Vec::with_capacity(HEADER_SIZE + payload.len());
    frame.push(command_id.into());
    frame.push(command_seq);
    frame.push(payload.len() as u8);
    frame.extend_from_slice(payload);
    frame
}

/// Decodes a command/reply frame, requiring `length == buffer.len() - HEADER_SIZE` (P6).
pub fn decode_frame(buffer: &[u8]) -> WireResult<DecodedFrame<'_>> {
    if buffer.len() < HEADER_SIZE {
        return Err(WireError::MalformedFrame);
    }

    let command_id = CommandId::try_from(buffer[0])?;
    let command_seq = buffer[1];
    let length = buffer[2] as usize;

    if length != buffer.len() - HEADER_SIZE {
        return Err(WireError::MalformedFrame);
    }

    Ok(DecodedFrame {
        command_id,
        command_seq,
        payload: &buffer[HEADER_SIZE..],
    })
}

/// Reverses byte order for 2/4/8-byte property values, converting host order to little-endian
/// on the wire (and back, since the operation is its own inverse). A faithful rendition of the
/// `htoleNN`-style conversions embedded CPC sources use: a no-op on every little-endian
/// compilation target, which is every target this daemon ships on.
#[cfg(target_endian = "big")]
pub(crate) fn swap_property_value(value: &mut [u8]) {
    if matches!(value.len(), 2 | 4 | 8) {
        value.reverse();
    }
}

#[cfg(target_endian = "little")]
pub(crate) fn swap_property_value(_value: &mut [u8]) {}

/// Builds a property command/reply payload: `le32(property_id)` followed by the (possibly
/// swapped) value bytes.
pub fn encode_property_payload(property_id: u32, value: &[u8]) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4 + value.len());
    payload.extend_from_slice(&property_id.to_le_bytes());

    let mut value = value.to_vec();
    swap_property_value(&mut value);
    payload.extend_from_slice(&value);

    payload
}

/// Splits a property payload into `(property_id, value_bytes)`. The value bytes are returned
/// exactly as they appeared on the wire; callers apply `swap_property_value` themselves, since
/// whether that swap applies varies by call site (see `dispatch` vs `unsolicited`).
pub fn decode_property_payload(payload: &[u8]) -> WireResult<(u32, Vec<u8>)> {
    if payload.len() < 4 {
        return Err(WireError::MalformedFrame);
    }

    let property_id = LittleEndian::read_u32(&payload[..4]);
    Ok((property_id, payload[4..].to_vec()))
}
