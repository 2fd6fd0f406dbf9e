mod connection_state;
mod contract;
mod kind;

pub use connection_state::ConnectionState;
pub use contract::Transport;
pub use kind::TransportKind;
