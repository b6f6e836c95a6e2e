//! Operator configuration
//!
//! Read from flags, the environment, or a `.env` file.

use std::time::Duration;

use clap::Args;

use petlor::{checkout::dispatch::Buyer, ids::UserId};

use crate::api::ApiConfig;

pub mod logging;

/// Per-request timeout when none is configured.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Backend connection settings.
#[derive(Debug, Clone, Args)]
pub struct ApiSettings {
    /// Backend base URL, e.g. http://localhost:8080/api
    #[arg(long, env = "PETLOR_API_URL")]
    pub api_url: String,

    /// Bearer token of the signed-in user or staff member
    #[arg(long, env = "PETLOR_API_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Registered user id; together with a token this checks out as a member
    #[arg(long, env = "PETLOR_USER_ID")]
    pub user_id: Option<i64>,

    /// Per-request timeout in seconds
    #[arg(
        long,
        env = "PETLOR_REQUEST_TIMEOUT_SECONDS",
        default_value_t = DEFAULT_TIMEOUT_SECONDS
    )]
    pub request_timeout_seconds: u64,
}

impl ApiSettings {
    /// Client configuration for these settings.
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            token: self
                .api_token
                .clone()
                .filter(|token| !token.trim().is_empty()),
            timeout: Duration::from_secs(self.request_timeout_seconds),
        }
    }

    /// Members need both a token and a user id; anything less is a guest.
    pub fn buyer(&self) -> Buyer {
        let has_token = self
            .api_token
            .as_deref()
            .is_some_and(|token| !token.trim().is_empty());

        match self.user_id {
            Some(user_id) if has_token => Buyer::Member {
                user_id: UserId::new(user_id),
            },
            _ => Buyer::Guest,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(token: Option<&str>, user_id: Option<i64>) -> ApiSettings {
        ApiSettings {
            api_url: "http://localhost:8080/api/".into(),
            api_token: token.map(str::to_string),
            user_id,
            request_timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
        }
    }

    #[test]
    fn test_member_needs_token_and_user_id() {
        assert_eq!(
            settings(Some("secret"), Some(3)).buyer(),
            Buyer::Member {
                user_id: UserId::new(3)
            }
        );
        assert_eq!(settings(None, Some(3)).buyer(), Buyer::Guest);
        assert_eq!(settings(Some("  "), Some(3)).buyer(), Buyer::Guest);
        assert_eq!(settings(Some("secret"), None).buyer(), Buyer::Guest);
    }

    #[test]
    fn test_api_config_drops_blank_token() {
        let config = settings(Some(" "), None).api_config();

        assert_eq!(config.token, None);
        assert_eq!(config.timeout, Duration::from_secs(15));
    }
}
