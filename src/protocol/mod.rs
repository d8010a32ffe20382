//! Wire contract between the environment process and the decision process.
//!
//! Two exchanges exist: a once-per-episode game-start handshake and a
//! once-per-step state/action exchange. Both are strict request/response:
//! the proxy sends exactly one message and blocks for exactly one reply.

pub mod messages;
pub mod messenger;

pub use messages::{AckMessage, ActionReply, GameStartMessage, Message, StateMessage};
pub use messenger::{ChannelMessenger, Messenger};
