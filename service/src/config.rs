use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use std::fmt;

const REDACTED: &str = "<redacted>";

/// Process-wide settings for the relay.
///
/// Every field can be supplied as a command line flag or as an environment variable
/// with the upper-snake-case name of the field (e.g. `JWT_SECRET_KEY`). Values found in
/// a `.env` file in the working directory are loaded before parsing. All fields have
/// defaults, so an empty environment always yields a usable configuration. A value that
/// is present but does not parse (e.g. `PORT=abc` or an unknown `LOG_LEVEL_FILTER`) is
/// rejected by clap at startup, which prints the error and exits the process.
#[derive(Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// The HMAC secret used to verify the signature of consumer tokens.
    #[arg(long, env, default_value = "supersecret", hide_env_values = true)]
    jwt_secret_key: String,

    /// The key producers must present in the `X-API-KEY` header to publish.
    #[arg(long, env, default_value = "supersecret", hide_env_values = true)]
    api_key: String,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "0.0.0.0")]
    pub interface: String,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 8088)]
    pub port: u16,

    /// The route consumers connect to for the event stream.
    #[arg(long, env, default_value = "/events")]
    pub sse_path: String,

    /// The route producers POST messages to.
    #[arg(long, env, default_value = "/publish")]
    pub publish_path: String,

    /// Topics every authorized consumer is subscribed to, in addition to the default topic.
    #[arg(long, env, value_delimiter = ',')]
    pub topics: Vec<String>,

    /// A list of full CORS origin URLs allowed to open the event stream from a browser.
    /// Leave empty to disable CORS handling entirely.
    #[arg(long, env, value_delimiter = ',')]
    pub allowed_origins: Vec<String>,

    /// How many recently published messages to keep for `Last-Event-ID` resumption.
    /// Zero disables replay.
    #[arg(long, env, default_value_t = 0)]
    pub replay_buffer_size: usize,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        ignore_case = true,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap_or(LevelFilter::Info)),
        )]
    pub log_level_filter: LevelFilter,
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

    pub fn jwt_secret_key(&self) -> &str {
        &self.jwt_secret_key
    }

    pub fn set_jwt_secret_key(mut self, jwt_secret_key: impl Into<String>) -> Self {
        self.jwt_secret_key = jwt_secret_key.into();
        self
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn set_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Returns the `interface:port` pair the server binds to.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.interface, self.port)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("jwt_secret_key", &REDACTED)
            .field("api_key", &REDACTED)
            .field("interface", &self.interface)
            .field("port", &self.port)
            .field("sse_path", &self.sse_path)
            .field("publish_path", &self.publish_path)
            .field("topics", &self.topics)
            .field("allowed_origins", &self.allowed_origins)
            .field("replay_buffer_size", &self.replay_buffer_size)
            .field("log_level_filter", &self.log_level_filter)
            .finish()
    }
}
