use crate::components::rsvp::models::{public_newest_first, RsvpEntry, RsvpSubmission};
use crate::components::rsvp::{validate_submission, RsvpStore};
use crate::error::{config_error, network_error, Error, InviteResult};
use async_trait::async_trait;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{AsyncCommands, Client as RedisClient};
use tokio::sync::mpsc;
use tracing::{error, info};

// Redis key constants
pub mod keys {
    pub const RSVP_PREFIX: &str = "rsvp:";

    /// List of JSON responses for one event
    pub fn rsvp_list(event_id: &str) -> String {
        format!("{}{}", RSVP_PREFIX, event_id)
    }
}

/// Reconnect attempts before a command gives up
const CONNECTION_RETRIES: usize = 2;

/// The Redis actor that processes messages
pub struct RedisActor {
    client: RedisClient,
    /// Opened on first use and reused; reconnects on its own after that
    connection: Option<ConnectionManager>,
    command_rx: mpsc::Receiver<RedisCommand>,
}

/// Commands that can be sent to the Redis actor
pub enum RedisCommand {
    SubmitRsvp(RsvpSubmission, mpsc::Sender<InviteResult<()>>),
    ListRsvps(String, mpsc::Sender<InviteResult<Vec<RsvpEntry>>>),
    Shutdown,
}

/// Handle for communicating with the Redis actor
#[derive(Clone)]
pub struct RedisActorHandle {
    command_tx: mpsc::Sender<RedisCommand>,
}

impl RedisActorHandle {
    /// Create a handle with no actor behind it; every request fails
    pub fn empty() -> Self {
        let (command_tx, _) = mpsc::channel(32);
        Self { command_tx }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(mpsc::Sender<InviteResult<T>>) -> RedisCommand,
    ) -> InviteResult<T> {
        let (response_tx, mut response_rx) = mpsc::channel(1);
        self.command_tx
            .send(build(response_tx))
            .await
            .map_err(|e| network_error(&format!("Actor mailbox error: {}", e)))?;

        response_rx
            .recv()
            .await
            .ok_or_else(|| network_error("Response channel closed"))?
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> InviteResult<()> {
        let _ = self.command_tx.send(RedisCommand::Shutdown).await;
        Ok(())
    }
}

#[async_trait]
impl RsvpStore for RedisActorHandle {
    async fn submit(&self, submission: &RsvpSubmission) -> InviteResult<()> {
        validate_submission(submission)?;
        let submission = submission.clone();
        self.request(|tx| RedisCommand::SubmitRsvp(submission, tx))
            .await
    }

    async fn list_public(&self, event_id: &str) -> InviteResult<Vec<RsvpEntry>> {
        let event_id = event_id.to_string();
        self.request(|tx| RedisCommand::ListRsvps(event_id, tx)).await
    }
}

impl RedisActor {
    /// Create a new actor and return its handle
    pub fn new(redis_url: &str) -> InviteResult<(Self, RedisActorHandle)> {
        let (command_tx, command_rx) = mpsc::channel(32);

        let client = RedisClient::open(redis_url)
            .map_err(|e| config_error(&format!("Invalid Redis URL: {}", e)))?;

        let actor = Self {
            client,
            connection: None,
            command_rx,
        };
        let handle = RedisActorHandle { command_tx };

        Ok((actor, handle))
    }

    /// Start the actor's processing loop
    pub async fn run(&mut self) {
        info!("Redis actor started");

        // Process commands
        while let Some(cmd) = self.command_rx.recv().await {
            match cmd {
                RedisCommand::SubmitRsvp(submission, response_tx) => {
                    let result = self.save_rsvp(&submission).await;
                    if let Err(e) = &result {
                        error!("Failed to store RSVP for {}: {}", submission.event_id, e);
                    }
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::ListRsvps(event_id, response_tx) => {
                    let result = self.load_rsvps(&event_id).await;
                    if let Err(e) = &result {
                        error!("Failed to read RSVPs for {}: {}", event_id, e);
                    }
                    let _ = response_tx.send(result).await;
                }
                RedisCommand::Shutdown => {
                    info!("Redis actor shutting down");
                    break;
                }
            }
        }

        info!("Redis actor shut down");
    }

    /// Get the shared redis connection, opening it on first use
    async fn get_connection(&mut self) -> InviteResult<ConnectionManager> {
        if let Some(conn) = &self.connection {
            return Ok(conn.clone());
        }

        let config = ConnectionManagerConfig::new().set_number_of_retries(CONNECTION_RETRIES);
        let conn = self
            .client
            .get_connection_manager_with_config(config)
            .await
            .map_err(|e| network_error(&format!("Failed to connect to Redis: {}", e)))?;
        info!("Connected to Redis");

        self.connection = Some(conn.clone());
        Ok(conn)
    }

    /// Append a response to the event's list
    async fn save_rsvp(&mut self, submission: &RsvpSubmission) -> InviteResult<()> {
        let mut conn = self.get_connection().await?;

        let entry = RsvpEntry::from_submission(submission);
        let json = serde_json::to_string(&entry)?;

        conn.rpush::<_, _, ()>(keys::rsvp_list(&submission.event_id), json)
            .await
            .map_err(|e| network_error(&format!("Redis RPUSH error: {}", e)))?;

        Ok(())
    }

    /// Read the event's responses
    async fn load_rsvps(&mut self, event_id: &str) -> InviteResult<Vec<RsvpEntry>> {
        let mut conn = self.get_connection().await?;

        let raw: Vec<String> = conn
            .lrange(keys::rsvp_list(event_id), 0, -1)
            .await
            .map_err(|e| network_error(&format!("Redis LRANGE error: {}", e)))?;

        let entries = raw
            .iter()
            .map(|json| serde_json::from_str::<RsvpEntry>(json))
            .collect::<Result<Vec<_>, _>>()
            .map_err(Error::from)?;

        Ok(public_newest_first(entries))
    }
}
