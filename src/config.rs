/// Runtime configuration
///
/// Every setting can be given as a command-line flag or an environment
/// variable. The flag wins when both are present.

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

/// Command line arguments and environment for the habit tracker bot
#[derive(Parser, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Settings {
    /// Chat platform API token
    #[arg(long, env = "BOT_TOKEN", hide_env_values = true)]
    pub bot_token: Option<String>,

    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "DATABASE_PATH")]
    pub database: Option<PathBuf>,

    /// Deployment environment ("production" enables webhook delivery)
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Public host the chat platform should deliver webhooks to
    #[arg(long, env = "WEBHOOK_HOST")]
    pub webhook_host: Option<String>,

    #[arg(long, env = "WEBHOOK_PATH", default_value = "/webhook")]
    pub webhook_path: String,

    /// Address to bind the webhook listener to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    #[arg(long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// Seconds a dialog may sit idle before it is discarded (0 = never)
    #[arg(long = "session-timeout", env = "SESSION_TIMEOUT_SECS", default_value_t = 1800)]
    pub session_timeout_secs: u64,

    /// Attribute plain-text console lines to this user id
    #[arg(long)]
    pub console_user: Option<i64>,

    /// Enable debug logging
    #[arg(short, long)]
    pub debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    pub verbose: bool,
}

// Hand-written so the token never reaches a log line
impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bot_token", &self.bot_token.as_ref().map(|_| "<redacted>"))
            .field("database", &self.database)
            .field("environment", &self.environment)
            .field("webhook_host", &self.webhook_host)
            .field("webhook_path", &self.webhook_path)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("session_timeout_secs", &self.session_timeout_secs)
            .field("console_user", &self.console_user)
            .field("debug", &self.debug)
            .field("verbose", &self.verbose)
            .finish()
    }
}

/// How updates reach the bot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Platform pushes updates to `url`; a listener binds `bind`
    Webhook { url: String, bind: String },
    /// The bot pulls updates itself
    Polling,
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Webhook { url, bind } => write!(f, "webhook {} (listening on {})", url, bind),
            Transport::Polling => f.write_str("polling"),
        }
    }
}

impl Settings {
    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }

    /// Full webhook URL, if a webhook host is configured
    pub fn webhook_url(&self) -> Option<String> {
        let host = self.webhook_host.as_deref()?.trim_end_matches('/');
        if host.is_empty() {
            return None;
        }
        let path = self.webhook_path.trim_start_matches('/');
        Some(format!("{}/{}", host, path))
    }

    /// Webhook delivery in production with a webhook host, polling otherwise
    pub fn transport(&self) -> Transport {
        match self.webhook_url() {
            Some(url) if self.is_production() => Transport::Webhook {
                url,
                bind: self.bind_address(),
            },
            _ => Transport::Polling,
        }
    }

    pub fn bind_address(&self) -> String {
        match self.host.parse::<std::net::IpAddr>() {
            Ok(ip) => SocketAddr::new(ip, self.port).to_string(),
            Err(_) => format!("{}:{}", self.host, self.port),
        }
    }

    /// Idle timeout for dialog sessions; None when disabled
    pub fn session_timeout(&self) -> Option<Duration> {
        match self.session_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }

    /// Log filter directive derived from the verbosity flags
    pub fn log_filter(&self) -> String {
        let level = if self.verbose {
            "debug"
        } else if self.debug {
            "info"
        } else {
            "warn"
        };
        format!("habit_tracker_bot={}", level)
    }

    /// Database path to open, creating parent directories as needed
    pub fn database_path(&self) -> std::io::Result<PathBuf> {
        match &self.database {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent)?;
                    }
                }
                Ok(path.clone())
            }
            None => default_database_path(),
        }
    }
}

/// Find a writable location for the database file
///
/// Tries the home directory, then the platform data and config
/// directories, then the working directory, and finally the temp directory.
pub fn default_database_path() -> std::io::Result<PathBuf> {
    let candidates = [
        dirs::home_dir().map(|p| p.join(".habit_tracker_bot")),
        dirs::data_dir().map(|p| p.join("habit_tracker_bot")),
        dirs::config_dir().map(|p| p.join("habit_tracker_bot")),
        std::env::current_dir().ok().map(|p| p.join(".habit_tracker_bot")),
    ];

    for dir in candidates.iter().flatten() {
        if std::fs::create_dir_all(dir).is_ok() {
            let probe = dir.join(".test_write");
            if std::fs::write(&probe, "test").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return Ok(dir.join("habits.db"));
            }
        }
    }

    let dir = std::env::temp_dir().join("habit_tracker_bot");
    std::fs::create_dir_all(&dir)?;

    tracing::warn!("Using temporary directory for database: {}", dir.display());
    Ok(dir.join("habits.db"))
}
