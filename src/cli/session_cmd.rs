//! Session command handler

use crate::application::ports::{SessionStore, SessionStoreError};

use super::args::SessionAction;
use super::presenter::Presenter;

/// Handle session subcommand
pub async fn handle_session_command<K: SessionStore>(
    action: SessionAction,
    store: &K,
    presenter: &Presenter,
) -> Result<(), SessionStoreError> {
    match action {
        SessionAction::Show => {
            let identity = store.load().await?;
            presenter.key_value("user_id", identity.user_id.as_deref().unwrap_or("(anonymous)"));
            presenter.key_value(
                "push_token",
                identity.push_token.as_deref().unwrap_or("(not set)"),
            );
            presenter.key_value("path", &store.path().to_string_lossy());
        }
        SessionAction::Login { user_id } => {
            let user_id = user_id.trim().to_string();
            if user_id.is_empty() {
                return Err(SessionStoreError::WriteError("user id must not be empty".into()));
            }
            // Keep the device's push token across logins
            let mut identity = store.load().await.unwrap_or_default();
            identity.user_id = Some(user_id.clone());
            store.save(&identity).await?;
            presenter.success(&format!("Logged in as {}", user_id));
        }
        SessionAction::PushToken { token } => {
            let identity = store.load().await?.with_push_token(token);
            store.save(&identity).await?;
            presenter.success("Push token stored");
        }
        SessionAction::Logout => {
            store.clear().await?;
            presenter.success("Logged out");
        }
    }
    Ok(())
}
