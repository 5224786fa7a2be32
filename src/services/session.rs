use crate::constants::account::ID_PREFIX;
use crate::errors::ToolError;
use crate::services::config::ConfigSources;
use crate::services::logger::Logger;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DefaultAdAccount {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DefaultAdAccount {
    /// Builds an account from raw values; blank names are dropped.
    pub fn new(id: &str, name: Option<&str>) -> Result<Self, ToolError> {
        Ok(Self {
            id: normalize_act_id(id)?,
            name: name
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(str::to_string),
        })
    }
}

/// Canonical `act_`-prefixed form of an ad account id.
pub fn normalize_act_id(raw: &str) -> Result<String, ToolError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ToolError::invalid_params("Ad account ID cannot be empty.")
            .with_hint("Pass act_id as \"act_<ID>\" or the raw numeric ID"));
    }
    if trimmed.starts_with(ID_PREFIX) {
        Ok(trimmed.to_string())
    } else {
        Ok(format!("{}{}", ID_PREFIX, trimmed))
    }
}

#[derive(Debug, Default)]
pub struct SessionState {
    pub access_token: Option<String>,
    pub default_account: Option<DefaultAdAccount>,
}

/// Credential and default-account state shared by every tool call of one
/// server process. All reads and writes go through one async mutex.
pub struct Session {
    logger: Logger,
    config: Arc<ConfigSources>,
    state: Mutex<SessionState>,
}

impl Session {
    pub fn new(logger: Logger, config: Arc<ConfigSources>) -> Self {
        Self {
            logger: logger.child("session"),
            config,
            state: Mutex::new(SessionState::default()),
        }
    }

    pub fn config(&self) -> &ConfigSources {
        &self.config
    }

    pub async fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().await
    }

    /// Returns the current token, priming it from configuration or the
    /// command line on first use.
    pub fn ensure_token(&self, state: &mut SessionState) -> Result<String, ToolError> {
        if let Some(token) = state.access_token.as_ref() {
            return Ok(token.clone());
        }
        if let Some(token) = self.config.config_token() {
            self.logger
                .info("Using Facebook token from MCP_CONFIG environment variable", None);
            state.access_token = Some(token.clone());
            return Ok(token);
        }
        if let Some(token) = self.config.cli_token()? {
            self.logger
                .info("Using Facebook token from command line arguments", None);
            state.access_token = Some(token.clone());
            return Ok(token);
        }
        Err(ToolError::missing_credential(
            "Facebook token must be provided via '--fb-token' command line argument",
        )
        .with_hint("Call set_access_token, set fbToken in MCP_CONFIG, or pass --fb-token <TOKEN>"))
    }

    pub async fn access_token(&self) -> Result<String, ToolError> {
        let mut state = self.lock().await;
        self.ensure_token(&mut state)
    }

    /// Replaces the token and drops any cached default account; an explicit
    /// `act_id` seeds the cache without a remote lookup.
    pub async fn set_access_token(
        &self,
        token: &str,
        act_id: Option<&str>,
        act_name: Option<&str>,
    ) -> Result<Option<DefaultAdAccount>, ToolError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ToolError::invalid_params(
                "A non-empty Facebook access token must be provided.",
            ));
        }
        let seeded = match act_id.filter(|id| !id.trim().is_empty()) {
            Some(id) => Some(DefaultAdAccount::new(id, act_name)?),
            None => None,
        };

        let mut state = self.lock().await;
        state.access_token = Some(token.to_string());
        state.default_account = seeded.clone();
        self.logger.info(
            "Access token replaced via set_access_token",
            Some(&serde_json::json!({"default_ad_account": seeded})),
        );
        Ok(seeded)
    }

    /// Best-effort token priming from `MCP_CONFIG`; never overrides a token
    /// that is already set.
    pub async fn prime_from_config(&self) -> bool {
        let mut state = self.lock().await;
        if state.access_token.is_some() {
            return true;
        }
        match self.config.config_token() {
            Some(token) => {
                self.logger
                    .info("Using Facebook token from MCP_CONFIG environment variable", None);
                state.access_token = Some(token);
                true
            }
            None => false,
        }
    }

    pub async fn default_account(&self) -> Option<DefaultAdAccount> {
        self.lock().await.default_account.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::config::{CliOverrides, EnvSnapshot};

    fn session(mcp_config: Option<&str>, cli: CliOverrides) -> Session {
        let logger = Logger::new("test");
        let env = EnvSnapshot {
            mcp_config: mcp_config.map(str::to_string),
            ..EnvSnapshot::default()
        };
        Session::new(
            logger.clone(),
            Arc::new(ConfigSources::new(logger, env, cli)),
        )
    }

    #[test]
    fn normalization_is_idempotent() {
        let once = normalize_act_id(" 12345 ").expect("valid");
        assert_eq!(once, "act_12345");
        assert_eq!(normalize_act_id(&once).expect("valid"), once);
    }

    #[test]
    fn blank_id_is_rejected() {
        let err = normalize_act_id("   ").expect_err("blank");
        assert_eq!(err.code, "INVALID_PARAMS");
    }

    #[tokio::test]
    async fn config_token_wins_over_cli() {
        let cli = CliOverrides {
            fb_token: Some(Some("cli-token".to_string())),
            ..CliOverrides::default()
        };
        let session = session(Some(r#"{"fbToken":"config-token"}"#), cli);
        assert_eq!(session.access_token().await.expect("token"), "config-token");
    }

    #[tokio::test]
    async fn missing_token_is_a_credential_error() {
        let session = session(None, CliOverrides::default());
        let err = session.access_token().await.expect_err("no token");
        assert_eq!(err.code, "MISSING_CREDENTIAL");
    }

    #[tokio::test]
    async fn set_access_token_overrides_and_seeds_account() {
        let session = session(Some(r#"{"fbToken":"config-token"}"#), CliOverrides::default());
        let seeded = session
            .set_access_token(" fresh ", Some("987"), Some("Main"))
            .await
            .expect("set");
        assert_eq!(
            seeded,
            Some(DefaultAdAccount {
                id: "act_987".to_string(),
                name: Some("Main".to_string())
            })
        );
        assert_eq!(session.access_token().await.expect("token"), "fresh");
    }

    #[tokio::test]
    async fn set_access_token_without_account_clears_cache() {
        let session = session(None, CliOverrides::default());
        session
            .set_access_token("first", Some("act_1"), None)
            .await
            .expect("set");
        session.set_access_token("second", None, None).await.expect("set");
        assert!(session.default_account().await.is_none());
    }

    #[tokio::test]
    async fn prime_does_not_replace_existing_token() {
        let session = session(Some(r#"{"fbToken":"config-token"}"#), CliOverrides::default());
        session.set_access_token("explicit", None, None).await.expect("set");
        assert!(session.prime_from_config().await);
        assert_eq!(session.access_token().await.expect("token"), "explicit");
    }
}
