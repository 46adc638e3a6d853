/// Engine configuration
///
/// # Environment variables
///
/// | Variable | Default | Purpose |
/// |----------|---------|---------|
/// | WORK_DIR | /var/lib/fulfillment | Working directory (database, logs) |
/// | MAIL_SENDER | materials@localhost | From address on notifications |
/// | NOTIFICATIONS_ENABLED | true | Master switch for the mail fan-out |
/// | RECIPIENT_DIRECTORY | (unset) | Path to the processor-assignment JSON |
/// | LOG_LEVEL | info | tracing filter when RUST_LOG is unset |
/// | LOG_JSON | false | JSON log output (production) |
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the order database and log files
    pub work_dir: String,
    /// From address used on notification emails
    pub mail_sender: String,
    /// Master switch; when false the decision engine always suppresses
    pub notifications_enabled: bool,
    /// Optional path to a processor-assignment JSON file
    pub recipient_directory: Option<String>,
    /// Log level: trace | debug | info | warn | error
    pub log_level: String,
    /// JSON log output
    pub log_json: bool,
}

impl Config {
    /// Load configuration from environment variables, with defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/fulfillment".into()),
            mail_sender: std::env::var("MAIL_SENDER")
                .unwrap_or_else(|_| "materials@localhost".into()),
            notifications_enabled: std::env::var("NOTIFICATIONS_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            recipient_directory: std::env::var("RECIPIENT_DIRECTORY").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
        }
    }

    /// Path of the order database inside the working directory
    pub fn db_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.work_dir).join("orders.redb")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
