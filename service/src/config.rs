use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use realtime::{LiveConfig, OverflowPolicy};
use std::fmt;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

/// How published events reach their subscribers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DispatchMode {
    /// Subscribers run on the publishing task before `publish` returns.
    Sync,
    /// Events go through a bounded queue drained by a dispatch task.
    Queued,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DispatchModeParseError;

impl FromStr for DispatchMode {
    type Err = DispatchModeParseError;
    fn from_str(mode: &str) -> Result<DispatchMode, Self::Err> {
        match mode.to_lowercase().as_str() {
            "sync" => Ok(DispatchMode::Sync),
            "queued" => Ok(DispatchMode::Queued),
            _ => Err(DispatchModeParseError),
        }
    }
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DispatchMode::Sync => write!(f, "sync"),
            DispatchMode::Queued => write!(f, "queued"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full origin URLs allowed to open WebSocket connections.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// The secret used to verify HS256 access tokens.
    #[arg(long, env, hide_env_values = true)]
    jwt_secret: Option<String>,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,

    /// Number of undelivered events each SSE connection may hold.
    #[arg(long, env, default_value_t = realtime::manager::DEFAULT_SSE_QUEUE_CAPACITY)]
    pub sse_queue_capacity: usize,

    /// Number of undelivered events each WebSocket connection may hold.
    #[arg(long, env, default_value_t = realtime::manager::DEFAULT_WS_QUEUE_CAPACITY)]
    pub ws_queue_capacity: usize,

    /// What happens to an event published for a connection whose queue is full.
    #[arg(
        long,
        env,
        default_value_t = OverflowPolicy::DropOldest,
        value_parser = clap::builder::PossibleValuesParser::new([
            "block", "drop-oldest", "drop-newest",
            "BLOCK", "DROP-OLDEST", "DROP-NEWEST"
        ])
            .map(|s| s.parse::<OverflowPolicy>().unwrap()),
    )]
    pub overflow_policy: OverflowPolicy,

    /// Whether `publish` runs subscribers inline (`sync`) or hands events to a dispatch task (`queued`).
    #[arg(
        long,
        env,
        default_value_t = DispatchMode::Sync,
        value_parser = clap::builder::PossibleValuesParser::new(["sync", "queued", "SYNC", "QUEUED"])
            .map(|s| s.parse::<DispatchMode>().unwrap()),
    )]
    pub event_dispatch_mode: DispatchMode,

    /// Capacity of the dispatch queue when `event_dispatch_mode` is `queued`.
    #[arg(long, env, default_value_t = 1000)]
    pub event_queue_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn set_jwt_secret(mut self, jwt_secret: String) -> Self {
        self.jwt_secret = Some(jwt_secret);
        self
    }

    pub fn jwt_secret(&self) -> Option<&str> {
        self.jwt_secret.as_deref()
    }

    pub fn is_origin_allowed(&self, origin: &str) -> bool {
        self.allowed_origins.iter().any(|allowed| allowed == origin)
    }

    /// Queue sizing for live connections.
    pub fn live_config(&self) -> LiveConfig {
        LiveConfig {
            sse_queue_capacity: self.sse_queue_capacity,
            ws_queue_capacity: self.ws_queue_capacity,
            overflow_policy: self.overflow_policy,
        }
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        self.runtime_env() == RustEnv::Production
    }
}
