//! Property id layout: `PROP_LAST_STATUS` is a fixed reserved id; `PROP_ENDPOINT_STATE_n` spans
//! a contiguous range, one id per Core-managed endpoint. The numeric base for the endpoint-state
//! range isn't fixed by `spec.md`; the values below are this crate's own assignment.

pub const PROP_LAST_STATUS: u32 = 0x0000_0000;

pub const PROP_ENDPOINT_STATE_0: u32 = 0x0000_1000;
pub const PROP_ENDPOINT_STATE_LAST: u32 = PROP_ENDPOINT_STATE_0 + 255;

/// Wire encoding of the endpoint CLOSED state, written back by the unsolicited dispatcher's
/// close-reconciliation `property_set`.
pub const ENDPOINT_STATE_CLOSED: u32 = 0;

/// Returns the endpoint id a `PROP_ENDPOINT_STATE_n` property id refers to, if it falls in range.
pub fn endpoint_state_id(property_id: u32) -> Option<u8> {
    if (PROP_ENDPOINT_STATE_0..=PROP_ENDPOINT_STATE_LAST).contains(&property_id) {
        Some((property_id - PROP_ENDPOINT_STATE_0) as u8)
    } else {
        None
    }
}

/// Interprets a `PROP_LAST_STATUS` payload the way the documented legacy handler does: the raw
/// wire bytes reinterpreted in host order with no byte-swap applied. Correct only when the host
/// is little-endian; kept to preserve that (arguably buggy) behavior for callers that rely on it.
pub fn status_as_native(bytes: [u8; 4]) -> u32 {
    u32::from_ne_bytes(bytes)
}

/// Interprets a `PROP_LAST_STATUS` payload as little-endian, consistent with every other 4-byte
/// property field in this protocol. Prefer this one unless parity with the legacy handler matters
/// (see DESIGN.md, OQ-4).
pub fn status_as_le(bytes: [u8; 4]) -> u32 {
    u32::from_le_bytes(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_state_range() {
        assert_eq!(endpoint_state_id(PROP_ENDPOINT_STATE_0), Some(0));
        assert_eq!(endpoint_state_id(PROP_ENDPOINT_STATE_0 + 7), Some(7));
        assert_eq!(endpoint_state_id(PROP_ENDPOINT_STATE_LAST), Some(255));
        assert_eq!(endpoint_state_id(PROP_ENDPOINT_STATE_LAST + 1), None);
        assert_eq!(endpoint_state_id(PROP_LAST_STATUS), None);
    }

    #[test]
    fn test_status_interpretations_agree_on_le_targets() {
        let bytes = [0x04, 0x00, 0x00, 0x00];
        assert_eq!(status_as_le(bytes), 4);

        #[cfg(target_endian = "little")]
        assert_eq!(status_as_native(bytes), status_as_le(bytes));
    }
}
