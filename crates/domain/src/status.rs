use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Declared type of a status command result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ResultType {
    /// Interpret the trimmed bytes as a big-endian integer
    Int,
    /// Use the trimmed bytes as text
    #[default]
    Raw,
}

/// Byte range selecting the interesting part of a response.
///
/// Follows open slice semantics: an omitted start means 0, an omitted end
/// means the full length, negative indices count from the end, and
/// out-of-range bounds clamp instead of failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteWindow {
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl ByteWindow {
    /// Window covering the whole response
    pub fn full() -> Self {
        Self::default()
    }

    /// Select the configured range from `data`
    pub fn apply<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        let len = data.len() as i64;
        let clamp = |idx: i64| {
            let resolved = if idx < 0 { len + idx } else { idx };
            resolved.clamp(0, len) as usize
        };

        let start = self.start.map_or(0, clamp);
        let end = self.end.map_or(data.len(), clamp);

        if start >= end { &[] } else { &data[start..end] }
    }
}

impl FromStr for ByteWindow {
    type Err = ConfigError;

    /// Parse a `"start:end"` range with either bound optional, e.g. `"1:3"`,
    /// `"1:"`, `":-2"`, `":"`. An empty expression selects everything.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        if text.is_empty() {
            return Ok(Self::full());
        }

        let Some((start, end)) = text.split_once(':') else {
            return Err(ConfigError::InvalidByteRange(s.to_string()));
        };

        let parse_bound = |bound: &str| -> Result<Option<i64>, ConfigError> {
            let bound = bound.trim();
            if bound.is_empty() {
                return Ok(None);
            }
            bound
                .parse::<i64>()
                .map(Some)
                .map_err(|_| ConfigError::InvalidByteRange(s.to_string()))
        };

        Ok(Self {
            start: parse_bound(start)?,
            end: parse_bound(end)?,
        })
    }
}

/// Bitwise operation applied to the integer form of a response.
///
/// Parsed once at configuration load; request-time evaluation is plain
/// arithmetic on the typed descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BitOp {
    And(u128),
    Or(u128),
    Shl(u32),
    Shr(u32),
}

impl BitOp {
    pub fn apply(&self, value: u128) -> u128 {
        match *self {
            Self::And(mask) => value & mask,
            Self::Or(mask) => value | mask,
            Self::Shl(bits) => value.checked_shl(bits).unwrap_or(0),
            Self::Shr(bits) => value.checked_shr(bits).unwrap_or(0),
        }
    }
}

impl FromStr for BitOp {
    type Err = ConfigError;

    /// Parse an operator/operand expression: `"& 0x03"`, `"| 16"`,
    /// `"<< 2"`, `">> 4"`. Operands are decimal or `0x`-prefixed hex.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();

        let parse_operand = |operand: &str| -> Result<u128, ConfigError> {
            let operand = operand.trim();
            let parsed = match operand.strip_prefix("0x").or_else(|| operand.strip_prefix("0X")) {
                Some(hex) => u128::from_str_radix(hex, 16),
                None => operand.parse::<u128>(),
            };
            parsed.map_err(|_| ConfigError::InvalidBitFilter(s.to_string()))
        };

        let parse_shift = |operand: &str| -> Result<u32, ConfigError> {
            u32::try_from(parse_operand(operand)?)
                .map_err(|_| ConfigError::InvalidBitFilter(s.to_string()))
        };

        if let Some(rest) = text.strip_prefix("<<") {
            Ok(Self::Shl(parse_shift(rest)?))
        } else if let Some(rest) = text.strip_prefix(">>") {
            Ok(Self::Shr(parse_shift(rest)?))
        } else if let Some(rest) = text.strip_prefix('&') {
            Ok(Self::And(parse_operand(rest)?))
        } else if let Some(rest) = text.strip_prefix('|') {
            Ok(Self::Or(parse_operand(rest)?))
        } else {
            Err(ConfigError::InvalidBitFilter(s.to_string()))
        }
    }
}

/// One (label, pattern) entry of a status command's response table.
///
/// The pattern is a regular expression matched at the start of the computed
/// value; entries are consulted in declaration order and the first match
/// wins.
#[derive(Debug, Clone)]
pub struct ResponseMatch {
    label: String,
    pattern: Regex,
    source: String,
}

impl ResponseMatch {
    pub fn new(label: impl Into<String>, pattern: &str) -> Result<Self, ConfigError> {
        // Anchor at the start; the original pattern keeps its own meaning
        // inside the group.
        let compiled = Regex::new(&format!("^(?:{pattern})"))
            .map_err(|e| ConfigError::InvalidPattern(format!("{pattern}: {e}")))?;

        Ok(Self {
            label: label.into(),
            pattern: compiled,
            source: pattern.to_string(),
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pattern(&self) -> &str {
        &self.source
    }

    pub fn matches(&self, value: &str) -> bool {
        self.pattern.is_match(value)
    }
}

/// A named device query and the recipe for normalizing its response
#[derive(Debug, Clone)]
pub struct StatusCommand {
    pub name: String,
    /// Raw bytes sent to the device
    pub payload: Vec<u8>,
    /// Expected response size; 0 means read until a line terminator
    pub response_len: usize,
    pub window: ByteWindow,
    pub bit_op: Option<BitOp>,
    pub result_type: ResultType,
    /// Ordered (label, pattern) pairs; empty means the computed value is
    /// returned as-is
    pub responses: Vec<ResponseMatch>,
}

impl StatusCommand {
    pub fn new(name: impl Into<String>, payload: Vec<u8>, response_len: usize) -> Self {
        Self {
            name: name.into(),
            payload,
            response_len,
            window: ByteWindow::full(),
            bit_op: None,
            result_type: ResultType::default(),
            responses: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_full_selects_everything() {
        let window = ByteWindow::full();
        assert_eq!(window.apply(b"abcd"), b"abcd");
    }

    #[test]
    fn test_window_negative_start_counts_from_end() {
        let window: ByteWindow = "-2:".parse().unwrap();
        assert_eq!(window.apply(&[1, 2, 3, 4]), &[3, 4]);
    }

    #[test]
    fn test_window_bounded_range() {
        let window: ByteWindow = "1:3".parse().unwrap();
        assert_eq!(window.apply(b"abcd"), b"bc");
    }

    #[test]
    fn test_window_open_end() {
        let window: ByteWindow = "2:".parse().unwrap();
        assert_eq!(window.apply(b"abcd"), b"cd");
    }

    #[test]
    fn test_window_negative_end() {
        let window: ByteWindow = ":-1".parse().unwrap();
        assert_eq!(window.apply(b"abcd"), b"abc");
    }

    #[test]
    fn test_window_clamps_out_of_range_bounds() {
        let window: ByteWindow = "1:99".parse().unwrap();
        assert_eq!(window.apply(b"abcd"), b"bcd");

        let window: ByteWindow = "-99:2".parse().unwrap();
        assert_eq!(window.apply(b"abcd"), b"ab");
    }

    #[test]
    fn test_window_inverted_range_is_empty() {
        let window: ByteWindow = "3:1".parse().unwrap();
        assert_eq!(window.apply(b"abcd"), b"");
    }

    #[test]
    fn test_window_colon_and_empty_select_everything() {
        let colon: ByteWindow = ":".parse().unwrap();
        assert_eq!(colon.apply(b"abcd"), b"abcd");

        let empty: ByteWindow = "".parse().unwrap();
        assert_eq!(empty.apply(b"abcd"), b"abcd");
    }

    #[test]
    fn test_window_rejects_malformed_expressions() {
        assert!("1".parse::<ByteWindow>().is_err());
        assert!("a:b".parse::<ByteWindow>().is_err());
        assert!("1:2:3".parse::<ByteWindow>().is_err());
    }

    #[test]
    fn test_bit_op_and() {
        let op: BitOp = "& 0x03".parse().unwrap();
        assert_eq!(op.apply(0x0F), 3);
    }

    #[test]
    fn test_bit_op_or() {
        let op: BitOp = "| 16".parse().unwrap();
        assert_eq!(op.apply(1), 17);
    }

    #[test]
    fn test_bit_op_shifts() {
        let shl: BitOp = "<< 2".parse().unwrap();
        assert_eq!(shl.apply(1), 4);

        let shr: BitOp = ">> 4".parse().unwrap();
        assert_eq!(shr.apply(0xF0), 0x0F);
    }

    #[test]
    fn test_bit_op_hex_operand() {
        let op: BitOp = "&0xFF".parse().unwrap();
        assert_eq!(op.apply(0x1234), 0x34);
    }

    #[test]
    fn test_bit_op_rejects_garbage() {
        assert!("".parse::<BitOp>().is_err());
        assert!("+ 3".parse::<BitOp>().is_err());
        assert!("& zz".parse::<BitOp>().is_err());
        assert!("<< 999999999999".parse::<BitOp>().is_err());
    }

    #[test]
    fn test_response_match_anchors_at_start() {
        let entry = ResponseMatch::new("on", "PWON").unwrap();
        assert!(entry.matches("PWON"));
        assert!(entry.matches("PWON\r\n"));
        assert!(!entry.matches("xPWON"));
    }

    #[test]
    fn test_response_match_keeps_alternation_grouped() {
        let entry = ResponseMatch::new("standby", "PWSTANDBY|PWOFF").unwrap();
        assert!(entry.matches("PWSTANDBY"));
        assert!(entry.matches("PWOFF"));
        assert!(!entry.matches("OFF"));
    }

    #[test]
    fn test_response_match_rejects_bad_regex() {
        assert!(ResponseMatch::new("bad", "[").is_err());
    }
}
