use serde::{Deserialize, Serialize};

/// Kind of transport used to reach a device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    /// Persistent byte-oriented duplex connection (serial line)
    Stream,
    /// One-shot request/response (HTTP)
    Request,
}

impl TransportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stream => "stream",
            Self::Request => "request",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_kind_as_str() {
        assert_eq!(TransportKind::Stream.as_str(), "stream");
        assert_eq!(TransportKind::Request.as_str(), "request");
    }
}
