use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;

/// Process-wide configuration, loaded once at startup and handed to components
/// as constructor parameters. Nothing reads the environment after this.
#[derive(Debug, Clone)]
pub struct Config {
    pub server_port: u16,
    pub database_url: String,
    pub paystack_public_key: String,
    pub paystack_secret_key: String,
    /// Absent means webhook signature checks are skipped (operator trust decision).
    pub paystack_webhook_secret: Option<String>,
    pub paystack_base_url: String,
    pub allowed_origins: AllowedOrigins,
}

#[derive(Debug, Clone)]
pub enum AllowedOrigins {
    Any,
    List(Vec<String>),
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok(); // Load .env file if present

        let allowed_origins = parse_allowed_origins(
            &env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "*".to_string()),
        )?;

        Ok(Config {
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .context("SERVER_PORT must be a port number")?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:transactions.db?mode=rwc".to_string()),
            paystack_public_key: env::var("PAYSTACK_PUBLIC")
                .context("PAYSTACK_PUBLIC is required")?,
            paystack_secret_key: env::var("PAYSTACK_SECRET")
                .context("PAYSTACK_SECRET is required")?,
            paystack_webhook_secret: env::var("PAYSTACK_WEBHOOK_SECRET").ok(),
            paystack_base_url: env::var("PAYSTACK_BASE_URL")
                .unwrap_or_else(|_| crate::gateway::DEFAULT_BASE_URL.to_string()),
            allowed_origins,
        })
    }
}

fn parse_allowed_origins(raw: &str) -> Result<AllowedOrigins> {
    let value = raw.trim();
    if value == "*" {
        return Ok(AllowedOrigins::Any);
    }

    let origins = value
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect::<Vec<_>>();

    if origins.is_empty() {
        anyhow::bail!("ALLOWED_ORIGINS must be '*' or a comma-separated list of origins");
    }

    Ok(AllowedOrigins::List(origins))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wildcard_allows_any_origin() {
        assert!(matches!(parse_allowed_origins("*").unwrap(), AllowedOrigins::Any));
        assert!(matches!(parse_allowed_origins("  *  ").unwrap(), AllowedOrigins::Any));
    }

    #[test]
    fn origin_list_is_split_and_trimmed() {
        let parsed = parse_allowed_origins("https://shop.example, https://admin.example").unwrap();
        match parsed {
            AllowedOrigins::List(origins) => {
                assert_eq!(origins, vec!["https://shop.example", "https://admin.example"]);
            }
            AllowedOrigins::Any => panic!("expected an origin list"),
        }
    }

    #[test]
    fn empty_origin_list_is_rejected() {
        assert!(parse_allowed_origins("").is_err());
        assert!(parse_allowed_origins(" , ,").is_err());
    }
}
