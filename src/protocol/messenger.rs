//! Request/response messenger endpoints.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::{
    error::{Error, Result},
    protocol::messages::Message,
};

/// One endpoint of a synchronous request/response link.
///
/// Send and receive both move a full [`Message`] envelope through the wire
/// encoding; a payload that fails to decode is a fatal protocol error, not
/// something to retry.
pub trait Messenger {
    fn send(&self, msg: &Message) -> Result<()>;

    /// Block until the peer's next message arrives.
    fn receive(&self) -> Result<Message>;

    /// Send one message and block for exactly one reply.
    fn exchange(&self, msg: &Message) -> Result<Message> {
        self.send(msg)?;
        self.receive()
    }
}

/// In-process messenger over a pair of byte channels.
///
/// Messages are JSON-encoded before crossing the channel so the full wire
/// contract is exercised even without a socket: both endpoints see exactly
/// the bytes a network transport would carry.
pub struct ChannelMessenger {
    tx: Sender<Vec<u8>>,
    rx: Receiver<Vec<u8>>,
}

impl ChannelMessenger {
    /// Create a connected endpoint pair: `(client, server)`.
    pub fn pair() -> (ChannelMessenger, ChannelMessenger) {
        let (client_tx, server_rx) = channel();
        let (server_tx, client_rx) = channel();
        (
            ChannelMessenger {
                tx: client_tx,
                rx: client_rx,
            },
            ChannelMessenger {
                tx: server_tx,
                rx: server_rx,
            },
        )
    }

    #[cfg(test)]
    pub(crate) fn send_raw(&self, bytes: Vec<u8>) -> Result<()> {
        self.tx
            .send(bytes)
            .map_err(|_| Error::Disconnected { operation: "send" })
    }
}

impl Messenger for ChannelMessenger {
    fn send(&self, msg: &Message) -> Result<()> {
        let bytes = serde_json::to_vec(msg)?;
        self.tx
            .send(bytes)
            .map_err(|_| Error::Disconnected { operation: "send" })
    }

    fn receive(&self) -> Result<Message> {
        let bytes = self.rx.recv().map_err(|_| Error::Disconnected {
            operation: "receive",
        })?;
        serde_json::from_slice(&bytes).map_err(|e| Error::MalformedMessage {
            message: e.to_string(),
        })
    }
}
