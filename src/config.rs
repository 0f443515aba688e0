use anyhow::{Context, Result};

use crate::codegen::{DEFAULT_ALPHABET, DEFAULT_CODE_LENGTH};

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite connection string, e.g. "sqlite:./hoplink.db"
    pub database_url: String,

    /// Which store backend to run: "sqlite" (default) or "memory"
    pub storage_backend: String,

    /// Credentials for the HTTP Basic gate on /api/*
    pub admin_username: String,
    pub admin_password: String,

    /// Host to bind the HTTP server to, e.g. "0.0.0.0"
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Public base URL used when printing short links, e.g. "https://go.example.com"
    /// Must NOT have a trailing slash.
    pub base_url: String,

    /// Length of generated short codes
    pub code_length: usize,

    /// Alphabet generated codes are drawn from
    pub code_alphabet: String,

    /// URL to redirect visitors to when they hit the root path ("/").
    /// Set ROOT_REDIRECT_URL in the environment to override.
    pub root_redirect_url: String,
}

impl AppConfig {
    /// Load configuration from environment variables (populated by dotenvy before this is called).
    pub fn from_env() -> Result<Self> {
        let admin_password = std::env::var("ADMIN_PASSWORD")
            .context("ADMIN_PASSWORD must be set in the environment or .env file")?;

        if admin_password.trim().is_empty() {
            anyhow::bail!("ADMIN_PASSWORD must not be empty");
        }

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse::<u16>()
            .context("PORT must be a valid port number (1–65535)")?;

        let code_length = std::env::var("CODE_LENGTH")
            .unwrap_or_else(|_| DEFAULT_CODE_LENGTH.to_string())
            .parse::<usize>()
            .context("CODE_LENGTH must be a positive integer")?;

        let base_url = std::env::var("BASE_URL")
            .unwrap_or_else(|_| format!("http://localhost:{port}"))
            .trim_end_matches('/')
            .to_owned();

        let root_redirect_url = std::env::var("ROOT_REDIRECT_URL")
            .unwrap_or_else(|_| "https://www.example.com".into())
            .trim_end_matches('/')
            .to_owned();

        Ok(Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:./hoplink.db".into()),
            storage_backend: std::env::var("STORAGE_BACKEND")
                .unwrap_or_else(|_| "sqlite".into()),
            admin_username: std::env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".into()),
            admin_password,
            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port,
            base_url,
            code_length,
            code_alphabet: std::env::var("CODE_ALPHABET")
                .unwrap_or_else(|_| DEFAULT_ALPHABET.into()),
            root_redirect_url,
        })
    }
}
