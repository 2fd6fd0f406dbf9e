//! Response pipeline: raw device bytes to a normalized value.
//!
//! Pure transformation, no I/O. Given the same response bytes and status
//! command the result is always the same.
//!
//! Steps:
//! 1. Size check: a declared nonzero response length must match exactly
//! 2. Byte trim: select the configured window
//! 3. Type conversion: big-endian integer plus bit filter, or plain text
//! 4. Value resolution: first matching (label, pattern) entry wins, in
//!    declaration order

use crate::status::{BitOp, ResultType, StatusCommand};

/// Largest trimmed response that still fits the integer conversion
const MAX_INT_BYTES: usize = 16;

/// Resolve a raw response into the value reported to clients.
///
/// Returns the empty string when the response size does not match the
/// declared length, when integer conversion is impossible, or when a
/// declared response table has no matching entry.
pub fn resolve(response: &[u8], cmd: &StatusCommand) -> String {
    if cmd.response_len != 0 && response.len() != cmd.response_len {
        return String::new();
    }

    let trimmed = cmd.window.apply(response);

    let value = match cmd.result_type {
        ResultType::Int => int_value(trimmed, cmd.bit_op),
        ResultType::Raw => String::from_utf8_lossy(trimmed).into_owned(),
    };

    if cmd.responses.is_empty() {
        return value;
    }

    cmd.responses
        .iter()
        .find(|entry| entry.matches(&value))
        .map(|entry| entry.label().to_string())
        .unwrap_or_default()
}

fn int_value(trimmed: &[u8], bit_op: Option<BitOp>) -> String {
    if trimmed.is_empty() || trimmed.len() > MAX_INT_BYTES {
        return String::new();
    }

    let mut value = trimmed
        .iter()
        .fold(0u128, |acc, byte| (acc << 8) | u128::from(*byte));

    if let Some(op) = bit_op {
        value = op.apply(value);
    }

    value.to_string()
}
