//! WebSocket client — handshake, snapshot, event pump, command sink.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use deckhand_app::ports::CommandSink;
use deckhand_domain::entity::EntityState;
use deckhand_domain::error::RemoteCommandError;
use deckhand_domain::event::StateChanged;
use deckhand_domain::id::EntityId;
use deckhand_domain::service::ServiceCall;

use crate::error::WsError;
use crate::protocol::{Inbound, Outbound, WireState};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsWriter = SplitSink<WsStream, Message>;
type WsReader = SplitStream<WsStream>;

const SNAPSHOT_ID: u64 = 1;
const SUBSCRIBE_ID: u64 = 2;
const FIRST_COMMAND_ID: u64 = 3;

/// Connection settings.
#[derive(Debug, Clone)]
pub struct WsConfig {
    /// WebSocket endpoint, e.g. `ws://homeassistant.local:8123/api/websocket`.
    pub url: String,
    /// Long-lived access token presented during the handshake.
    pub access_token: String,
}

/// Connect, authenticate, fetch the entity snapshot, and subscribe to state
/// changes.
///
/// Returns the command sink, the event pump for the receive loop, and the
/// snapshot to seed the session's store with.
///
/// # Errors
///
/// Returns a [`WsError`] when the connection, handshake, snapshot, or
/// subscription fails. No retry happens here; that is the caller's call.
pub async fn connect(
    config: &WsConfig,
) -> Result<(HassClient, EventPump, Vec<(EntityId, EntityState)>), WsError> {
    let (stream, _) = connect_async(config.url.as_str())
        .await
        .map_err(WsError::Connect)?;
    let (mut writer, mut reader) = stream.split();

    loop {
        match next_inbound(&mut reader).await? {
            Inbound::AuthRequired => {
                let auth = Outbound::Auth {
                    access_token: config.access_token.clone(),
                };
                send(&mut writer, &auth).await?;
            }
            Inbound::AuthOk => break,
            Inbound::AuthInvalid { message } => return Err(WsError::AuthRejected(message)),
            other => debug!(?other, "ignoring message during handshake"),
        }
    }
    info!(url = %config.url, "authenticated against remote store");

    send(&mut writer, &Outbound::GetStates { id: SNAPSHOT_ID }).await?;
    let snapshot = wait_for_result(&mut reader, SNAPSHOT_ID).await?;
    let snapshot = parse_snapshot(snapshot.unwrap_or_default())?;
    info!(entities = snapshot.len(), "loaded entity snapshot");

    send(
        &mut writer,
        &Outbound::SubscribeEvents {
            id: SUBSCRIBE_ID,
            event_type: "state_changed".to_string(),
        },
    )
    .await?;
    wait_for_result(&mut reader, SUBSCRIBE_ID).await?;
    debug!("subscribed to state changes");

    let client = HassClient {
        writer: Arc::new(Mutex::new(writer)),
        next_id: Arc::new(AtomicU64::new(FIRST_COMMAND_ID)),
    };
    Ok((client, EventPump { reader }, snapshot))
}

/// Command sink over the write half of the stream.
///
/// Cheap to clone; all clones share the writer and the message id counter.
#[derive(Clone)]
pub struct HassClient {
    writer: Arc<Mutex<WsWriter>>,
    next_id: Arc<AtomicU64>,
}

impl CommandSink for HassClient {
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), RemoteCommandError>> + Send {
        async move {
            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let message = Outbound::call_service(id, &call);
            let text = serde_json::to_string(&message)
                .map_err(|err| RemoteCommandError::Unreachable(err.to_string()))?;
            debug!(id, service = %call.service, "issuing service call");
            let mut writer = self.writer.lock().await;
            writer
                .send(Message::Text(text))
                .await
                .map_err(|err| RemoteCommandError::Unreachable(err.to_string()))
        }
    }
}

/// The read half: turns the subscribed event stream into domain state
/// changes.
pub struct EventPump {
    reader: WsReader,
}

impl EventPump {
    /// The next state change, or `None` when the stream ends.
    ///
    /// Frames that do not parse, results of fire-and-forget commands, and
    /// event types this adapter does not consume are logged and skipped —
    /// a malformed frame never takes the pump down.
    ///
    /// # Errors
    ///
    /// Returns [`WsError::Transport`] when the stream itself breaks.
    pub async fn next_change(&mut self) -> Result<Option<StateChanged>, WsError> {
        loop {
            let Some(message) = self.reader.next().await else {
                return Ok(None);
            };
            match message? {
                Message::Text(text) => match serde_json::from_str::<Inbound>(&text) {
                    Ok(Inbound::Event { event, .. }) => {
                        if let Some(change) = event.into_state_changed() {
                            return Ok(Some(change));
                        }
                    }
                    Ok(Inbound::Result {
                        id,
                        success: false,
                        error,
                        ..
                    }) => {
                        let message = error.map(|e| e.message).unwrap_or_default();
                        warn!(id, %message, "remote store rejected a command");
                    }
                    Ok(other) => debug!(?other, "ignoring message"),
                    Err(err) => warn!(%err, "skipping unparseable frame"),
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
    }
}

/// Read inbound frames until one parses, skipping control frames.
async fn next_inbound(reader: &mut WsReader) -> Result<Inbound, WsError> {
    loop {
        let Some(message) = reader.next().await else {
            return Err(WsError::UnexpectedClose);
        };
        match message? {
            Message::Text(text) => return Ok(serde_json::from_str(&text)?),
            Message::Close(_) => return Err(WsError::UnexpectedClose),
            _ => {}
        }
    }
}

/// Serialize and send one outbound message.
async fn send(writer: &mut WsWriter, message: &Outbound) -> Result<(), WsError> {
    let text = serde_json::to_string(message)?;
    writer.send(Message::Text(text)).await?;
    Ok(())
}

/// Wait for the result of request `id`, skipping interleaved messages.
async fn wait_for_result(
    reader: &mut WsReader,
    id: u64,
) -> Result<Option<serde_json::Value>, WsError> {
    loop {
        match next_inbound(reader).await? {
            Inbound::Result {
                id: result_id,
                success,
                result,
                error,
            } if result_id == id => {
                if !success {
                    return Err(WsError::RequestFailed {
                        id,
                        message: error.map(|e| e.message).unwrap_or_default(),
                    });
                }
                return Ok(result);
            }
            other => debug!(?other, "ignoring message while awaiting result"),
        }
    }
}

/// Turn a `get_states` result into store-seeding pairs.
fn parse_snapshot(
    result: serde_json::Value,
) -> Result<Vec<(EntityId, EntityState)>, WsError> {
    let states: Vec<WireState> = serde_json::from_value(result)?;
    Ok(states
        .into_iter()
        .map(|wire| (wire.entity_id, wire.state))
        .collect())
}
