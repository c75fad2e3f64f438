use std::collections::HashMap;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, mpsc};

use crate::config::{InvalidPayloadPolicy, ServerConfig};
use crate::error::RelayError;
use crate::groups::Groups;
use crate::protocol::{ClientEvent, JoinRoom, ServerEvent, Spin, parse_event};
use crate::registry::RoomRegistry;
use crate::types::{ConnectionId, RoomId};

/// Per-client handle: the outbound queue drained by the connection's writer task.
struct ClientHandle {
    tx: mpsc::UnboundedSender<ServerEvent>,
}

/// Routes connection events into the registry and fans the results out
/// to broadcast groups.
///
/// Every handler runs to completion against `&mut self`. Callers share the
/// server as `Arc<Mutex<Server>>`, so one handler's read-modify-broadcast
/// never interleaves with another's. Sends are unbounded and never wait.
pub struct Server {
    registry: RoomRegistry,
    groups: Groups,
    clients: HashMap<ConnectionId, ClientHandle>,
    pub config: ServerConfig,
    next_connection_id: u64,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            registry: RoomRegistry::new(),
            groups: Groups::new(),
            clients: HashMap::new(),
            config,
            next_connection_id: 0,
        }
    }

    pub fn registry(&self) -> &RoomRegistry {
        &self.registry
    }

    /// Register a new connection and hand back its id and outbound queue.
    pub fn connect(&mut self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerEvent>) {
        let id = ConnectionId::new(self.next_connection_id);
        self.next_connection_id += 1;

        let (tx, rx) = mpsc::unbounded_channel();
        self.clients.insert(id, ClientHandle { tx });
        (id, rx)
    }

    /// Decode one inbound line and route it. Undecodable lines go through
    /// the configured [`InvalidPayloadPolicy`].
    pub fn dispatch(&mut self, connection: ConnectionId, line: &str) {
        let result = parse_event(line).and_then(|event| match event {
            ClientEvent::JoinRoom(join) => {
                self.on_join(connection, join);
                Ok(())
            }
            ClientEvent::Spin(spin) => self.on_spin(connection, spin),
        });

        if let Err(e) = result {
            self.on_invalid(connection, &e);
        }
    }

    /// Like [`Server::dispatch`], for a raw line straight off the socket.
    /// Bytes that are not UTF-8 count as an invalid payload.
    pub fn dispatch_bytes(&mut self, connection: ConnectionId, line: &[u8]) {
        match std::str::from_utf8(line) {
            Ok(line) => self.dispatch(connection, line),
            Err(e) => {
                let error = RelayError::InvalidPayload(format!("line is not UTF-8: {e}"));
                self.on_invalid(connection, &error);
            }
        }
    }

    /// Subscribe the connection to the room, record it on the roster and
    /// send the full roster to everyone in the room, joiner included.
    pub fn on_join(&mut self, connection: ConnectionId, join: JoinRoom) {
        let room_id = RoomId::resolve(join.room_id.as_deref());
        self.groups.subscribe(&room_id, connection);

        tracing::info!(
            "{connection} ({}) joined {room_id}",
            join.user_name.as_deref().unwrap_or("<unnamed>")
        );

        let members = self
            .registry
            .upsert_member(&room_id, connection, join.user_name)
            .to_vec();
        self.broadcast(&room_id, &ServerEvent::RoomUpdate(members), None);
    }

    /// Relay a spin to every other subscriber of the room. No state changes.
    pub fn on_spin(&mut self, connection: ConnectionId, spin: Spin) -> Result<(), RelayError> {
        let room_id = RoomId::resolve(spin.room_id.as_deref());

        if self.config.require_membership_for_actions
            && !self.registry.is_member(&room_id, connection)
        {
            return Err(RelayError::InvalidPayload(format!(
                "{connection} is not a member of {room_id}"
            )));
        }

        tracing::debug!(
            "spin from {connection} in {room_id}: bet={}, payout={}",
            spin.bet,
            spin.payout
        );

        let event = ServerEvent::RemoteSpin {
            player_id: connection,
            bet: spin.bet,
            payout: spin.payout,
        };
        self.broadcast(&room_id, &event, Some(connection));
        Ok(())
    }

    /// Purge the connection from every room and tell each affected room
    /// who is left. Unknown connections are a no-op.
    pub fn on_disconnect(&mut self, connection: ConnectionId) {
        self.clients.remove(&connection);
        self.groups.unsubscribe_all(connection);

        let affected = self.registry.remove_member_everywhere(connection);
        tracing::info!("{connection} disconnected, left {} room(s)", affected.len());

        for (room_id, members) in affected {
            let emptied = members.is_empty();
            self.broadcast(&room_id, &ServerEvent::RoomUpdate(members), None);

            if emptied
                && self.config.prune_empty_rooms
                && self.registry.remove_room_if_empty(&room_id)
            {
                tracing::debug!("pruned empty room {room_id}");
            }
        }
    }

    fn on_invalid(&mut self, connection: ConnectionId, error: &RelayError) {
        tracing::warn!("{connection}: {error}");

        if self.config.invalid_payload_policy == InvalidPayloadPolicy::Reply {
            self.send_to(
                connection,
                ServerEvent::Error {
                    message: error.to_string(),
                },
            );
        }
    }

    fn broadcast(&self, room_id: &RoomId, event: &ServerEvent, except: Option<ConnectionId>) {
        for &subscriber in self.groups.subscribers(room_id) {
            if Some(subscriber) != except {
                self.send_to(subscriber, event.clone());
            }
        }
    }

    fn send_to(&self, connection: ConnectionId, event: ServerEvent) {
        if let Some(client) = self.clients.get(&connection) {
            // Fails only after the writer task stopped; disconnect follows.
            let _ = client.tx.send(event);
        }
    }
}

/// Accept connections forever, one task per connection.
pub async fn run(listener: TcpListener, server: Arc<Mutex<Server>>) -> Result<(), RelayError> {
    tracing::info!("relay listening on {}", listener.local_addr()?);

    loop {
        let (stream, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::error!("accept error: {e}");
                continue;
            }
        };
        let server = Arc::clone(&server);

        tokio::spawn(async move {
            if let Err(e) = handle_client(server, stream).await {
                tracing::warn!("client {peer} error: {e}");
            }
        });
    }
}

/// Handle a single client as a tokio task.
pub async fn handle_client(server: Arc<Mutex<Server>>, stream: TcpStream) -> Result<(), RelayError> {
    let peer = stream.peer_addr()?;
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let (connection, mut rx) = server.lock().await.connect();
    tracing::info!("{connection} connected from {peer}");

    // Writer task: drains the outbound queue onto the socket.
    let writer_task = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            let line = match event.encode() {
                Ok(line) => line,
                Err(e) => {
                    tracing::error!("{connection}: dropping outbound event: {e}");
                    continue;
                }
            };
            if let Err(e) = writer.write_all(line.as_bytes()).await {
                tracing::debug!("{connection}: write failed: {e}");
                break;
            }
        }
    });

    let result = read_loop(&server, connection, &mut reader).await;

    server.lock().await.on_disconnect(connection);
    writer_task.abort();

    result
}

async fn read_loop(
    server: &Mutex<Server>,
    connection: ConnectionId,
    reader: &mut BufReader<tokio::net::tcp::OwnedReadHalf>,
) -> Result<(), RelayError> {
    let mut line = Vec::new();
    loop {
        line.clear();
        let bytes = reader.read_until(b'\n', &mut line).await?;
        if bytes == 0 {
            return Ok(()); // client disconnected
        }

        if line.trim_ascii().is_empty() {
            continue;
        }

        server.lock().await.dispatch_bytes(connection, &line);
    }
}
