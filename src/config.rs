//! Environment-backed configuration, read once at startup.

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port for the HTTP server.
    pub port: u16,
    /// Path to the SQLite database file.
    pub database_path: String,
    /// Gemini model identifier used for task generation.
    pub gemini_model: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `PORT` - HTTP port (default 3000)
    /// - `DATABASE_URL` - SQLite path, optional `file:` prefix (default `dev.db`)
    /// - `GEMINI_MODEL` - model identifier (default `gemini-flash-latest`)
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let database_path = std::env::var("DATABASE_URL")
            .map(|url| url.strip_prefix("file:").unwrap_or(&url).to_string())
            .unwrap_or_else(|_| "dev.db".to_string());

        let gemini_model =
            std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-flash-latest".to_string());

        Self {
            port,
            database_path,
            gemini_model,
        }
    }
}
