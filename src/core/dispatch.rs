//! Runs portal requests off the UI loop.
//!
//! Requests are spawned as tokio tasks and report back through a channel,
//! so the interface keeps handling keys while a reply is pending. Nothing
//! is cancelled; stale replies are filtered by ticket on arrival.

use anyhow::Result;
use tokio::sync::mpsc;

use crate::client::PortalClient;
use crate::core::chat::ChatTurn;
use crate::core::panel::ActionTurn;
use crate::logging;

use super::events::Event;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Handle used by the UI to issue requests.
#[derive(Clone)]
pub struct Dispatcher {
    client: PortalClient,
    tx_event: mpsc::Sender<Event>,
}

impl Dispatcher {
    /// Create a dispatcher and the receiver its events arrive on.
    pub fn new(client: PortalClient) -> (Self, mpsc::Receiver<Event>) {
        let (tx_event, rx_event) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        (Self { client, tx_event }, rx_event)
    }

    pub fn send_chat(&self, turn: ChatTurn) {
        let client = self.client.clone();
        let tx = self.tx_event.clone();
        tokio::spawn(async move {
            let ChatTurn { ticket, request } = turn;
            logging::info(format!(
                "Chat request #{ticket} with {} messages",
                request.messages.len()
            ));
            let result = client.chat(&request).await;
            post(&tx, Event::ChatReply { ticket, result }).await;
        });
    }

    pub fn send_action(&self, turn: ActionTurn) {
        let client = self.client.clone();
        let tx = self.tx_event.clone();
        tokio::spawn(async move {
            let ActionTurn {
                kind,
                ticket,
                request,
            } = turn;
            logging::info(format!(
                "{} request #{ticket} -> {}",
                kind.log_label(),
                request.path()
            ));
            let result = client.run_action(&request).await;
            post(&tx, Event::ActionReply { kind, ticket, result }).await;
        });
    }

    pub fn check_health(&self) {
        let client = self.client.clone();
        let tx = self.tx_event.clone();
        tokio::spawn(async move {
            let result = client.health().await;
            post(&tx, Event::Health { result }).await;
        });
    }
}

async fn post(tx: &mpsc::Sender<Event>, event: Event) {
    if tx.send(event).await.is_err() {
        logging::warn("UI loop has exited; dropping reply");
    }
}

/// Block until the next event. Used by tests and the one-shot commands.
pub async fn next_event(rx: &mut mpsc::Receiver<Event>) -> Result<Event> {
    rx.recv()
        .await
        .ok_or_else(|| anyhow::anyhow!("Request task ended without a reply"))
}
