use async_trait::async_trait;

use super::connection_state::ConnectionState;
use super::kind::TransportKind;
use crate::error::TransportError;

/// Transport contract that infrastructure implementations must provide.
///
/// A transport delivers a raw payload to a physical device and, for status
/// queries, retrieves the raw response. A disconnected stream transport
/// attempts a single reconnect at the start of an operation and fails the
/// call if that attempt fails; request transports hold no connection
/// between calls.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the connection to the device.
    ///
    /// Transports without persistent connections treat this as a no-op.
    async fn connect(&mut self) -> Result<(), TransportError>;

    /// Deliver a raw payload to the device
    async fn send(&mut self, payload: &[u8]) -> Result<(), TransportError>;

    /// Retrieve a raw response.
    ///
    /// `expected_len == 0` reads until a line terminator (terminator
    /// included); otherwise exactly `expected_len` bytes are read. A read
    /// that comes up short before the configured timeout is an error.
    async fn receive(&mut self, expected_len: usize) -> Result<Vec<u8>, TransportError>;

    /// Check if currently connected
    fn is_connected(&self) -> bool;

    /// Get current connection state
    fn connection_state(&self) -> ConnectionState;

    /// Get the transport kind
    fn kind(&self) -> TransportKind;
}
