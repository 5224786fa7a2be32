use crate::constants::account::{DEFAULT_RESOLUTION_FIELDS, ID_PREFIX};
use crate::errors::ToolError;
use crate::services::graph::GraphClient;
use crate::services::logger::Logger;
use crate::services::params::QueryParams;
use crate::services::session::{normalize_act_id, DefaultAdAccount, Session, SessionState};
use serde_json::Value;
use std::sync::Arc;

/// Turns an optional `act_id` argument into a canonical account id,
/// falling back to the session's default account.
#[derive(Clone)]
pub struct AccountResolver {
    logger: Logger,
    session: Arc<Session>,
    graph: GraphClient,
}

impl AccountResolver {
    pub fn new(logger: Logger, session: Arc<Session>, graph: GraphClient) -> Self {
        Self {
            logger: logger.child("resolver"),
            session,
            graph,
        }
    }

    /// An explicit id is normalized; `None` (or an empty string) means the
    /// default account.
    pub async fn resolve(&self, act_id: Option<&str>) -> Result<String, ToolError> {
        match act_id.filter(|id| !id.is_empty()) {
            Some(id) => normalize_act_id(id),
            None => Ok(self.default_account(false).await?.id),
        }
    }

    /// Cached default account, resolving it on first use. The session lock
    /// is held for the whole resolution so concurrent callers share a
    /// single remote lookup.
    pub async fn default_account(&self, force_refresh: bool) -> Result<DefaultAdAccount, ToolError> {
        let mut state = self.session.lock().await;
        if force_refresh {
            state.default_account = None;
        }
        if let Some(account) = state.default_account.as_ref() {
            return Ok(account.clone());
        }

        if let Some(hint) = self.session.config().default_account()? {
            if let Ok(account) = DefaultAdAccount::new(&hint.id, hint.name.as_deref()) {
                self.logger.info(
                    "Default ad account taken from configuration",
                    Some(&serde_json::json!({"source": hint.source, "id": account.id})),
                );
                state.default_account = Some(account.clone());
                return Ok(account);
            }
        }

        let account = self.resolve_remote(&mut state).await?;
        state.default_account = Some(account.clone());
        Ok(account)
    }

    async fn resolve_remote(&self, state: &mut SessionState) -> Result<DefaultAdAccount, ToolError> {
        let token = self.session.ensure_token(state)?;
        let mut params = QueryParams::new();
        params.set("fields", DEFAULT_RESOLUTION_FIELDS);
        let me = self.graph.get_with_token("me", &token, params).await?;

        let account = me
            .get("adaccounts")
            .and_then(|section| section.get("data"))
            .and_then(Value::as_array)
            .and_then(|rows| rows.first())
            .and_then(account_from_row);

        match account {
            Some(account) => {
                self.logger.info(
                    "Default ad account resolved from token",
                    Some(&serde_json::json!({"id": account.id})),
                );
                Ok(account)
            }
            None => Err(ToolError::resolution(
                "Unable to automatically determine a default ad account. Please specify an 'act_id'.",
            )
            .with_hint("Pass act_id explicitly or configure defaultActId / FB_DEFAULT_ACT_ID")),
        }
    }
}

/// Account from one `me.adaccounts` row: `id` when present, else the raw
/// `account_id` with the prefix added.
fn account_from_row(row: &Value) -> Option<DefaultAdAccount> {
    let id = match row.get("id").and_then(Value::as_str).filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => {
            let raw = match row.get("account_id")? {
                Value::String(text) if !text.is_empty() => text.clone(),
                Value::Number(number) => number.to_string(),
                _ => return None,
            };
            if raw.starts_with(ID_PREFIX) {
                raw
            } else {
                format!("{}{}", ID_PREFIX, raw)
            }
        }
    };
    DefaultAdAccount::new(&id, row.get("name").and_then(Value::as_str)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn row_prefers_canonical_id() {
        let account = account_from_row(&json!({"id": "act_5", "account_id": "5", "name": "Five"}))
            .expect("account");
        assert_eq!(account.id, "act_5");
        assert_eq!(account.name.as_deref(), Some("Five"));
    }

    #[test]
    fn row_falls_back_to_raw_account_id() {
        let account = account_from_row(&json!({"account_id": 77})).expect("account");
        assert_eq!(account.id, "act_77");
        assert!(account.name.is_none());
    }

    #[test]
    fn row_without_ids_is_rejected() {
        assert!(account_from_row(&json!({"name": "orphan"})).is_none());
    }
}
