/// Line-oriented gateway over stdin/stdout
///
/// Each input line is a JSON object `{"user_id": 1, "text": "..."}`. Each
/// reply is written as one JSON line with the user id, text and options.
/// When a default user is configured, plain text lines are accepted too,
/// which makes the bot usable by hand from a terminal.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::{debug, error, info, warn};

use crate::domain::UserId;
use crate::gateway::{Inbound, MessagingGateway, Reply};
use crate::BotError;

/// Wire shape of a reply line
#[derive(Serialize)]
struct Outbound<'a> {
    user_id: UserId,
    #[serde(flatten)]
    reply: &'a Reply,
}

/// JSON-lines gateway over any async reader/writer pair
pub struct ConsoleGateway<R, W> {
    reader: R,
    writer: W,
    default_user: Option<UserId>,
    line: String,
}

impl ConsoleGateway<BufReader<Stdin>, Stdout> {
    /// Gateway bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R, W> ConsoleGateway<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            reader,
            writer,
            default_user: None,
            line: String::new(),
        }
    }

    /// Attribute plain-text lines to `user_id`
    pub fn with_default_user(mut self, user_id: UserId) -> Self {
        self.default_user = Some(user_id);
        self
    }

    /// Consume the gateway and return the writer
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn parse_line(line: &str, default_user: Option<UserId>) -> Result<Inbound, String> {
        if line.starts_with('{') {
            return serde_json::from_str(line).map_err(|e| format!("Invalid JSON: {}", e));
        }

        match default_user {
            Some(user_id) => Ok(Inbound::new(user_id, line)),
            None => Err("Expected a JSON object with user_id and text".to_string()),
        }
    }

    async fn write_line<T: Serialize + Sync>(&mut self, value: &T) -> Result<(), BotError> {
        let encoded = serde_json::to_string(value)?;

        self.writer.write_all(encoded.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        debug!("Sent line: {}", encoded);
        Ok(())
    }
}

#[async_trait]
impl<R, W> MessagingGateway for ConsoleGateway<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn recv(&mut self) -> Result<Option<Inbound>, BotError> {
        loop {
            self.line.clear();

            if self.reader.read_line(&mut self.line).await? == 0 {
                info!("Console gateway closed (stdin at EOF)");
                return Ok(None);
            }

            let line = self.line.trim();
            if line.is_empty() {
                continue;
            }

            match Self::parse_line(line, self.default_user) {
                Ok(inbound) => return Ok(Some(inbound)),
                Err(message) => {
                    warn!("Rejected input line: {}", message);
                    self.write_line(&json!({ "error": message })).await?;
                }
            }
        }
    }

    async fn send(&mut self, user_id: UserId, reply: &Reply) -> Result<(), BotError> {
        let outbound = Outbound { user_id, reply };
        if let Err(e) = self.write_line(&outbound).await {
            error!("Failed to deliver reply to user {}: {}", user_id, e);
            return Err(e);
        }
        Ok(())
    }
}
