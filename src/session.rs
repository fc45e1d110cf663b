use anyhow::Result;

use crate::db::{user_root, Collection, CollectionPath, Database, DocPath, StoredSession};

/// Identity every data access runs under. Passed explicitly to the sync layer
/// instead of living in global state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Session {
    app_id: String,
    user_id: String,
    anonymous: bool,
}

impl Session {
    pub(crate) fn new(app_id: &str, user_id: &str, anonymous: bool) -> Self {
        Self {
            app_id: app_id.to_string(),
            user_id: user_id.to_string(),
            anonymous,
        }
    }

    pub(crate) fn app_id(&self) -> &str {
        &self.app_id
    }

    pub(crate) fn user_id(&self) -> &str {
        &self.user_id
    }

    pub(crate) fn is_anonymous(&self) -> bool {
        self.anonymous
    }

    /// Name shown in greetings: the local part of an email-like id.
    pub(crate) fn display_name(&self) -> &str {
        if self.anonymous {
            return "Usuario";
        }
        self.user_id.split('@').next().unwrap_or(&self.user_id)
    }

    pub(crate) fn collection(&self, collection: Collection) -> CollectionPath {
        CollectionPath::for_user(&self.app_id, &self.user_id, collection)
    }

    /// `settings/general`, the singleton settings document.
    pub(crate) fn settings_doc(&self) -> DocPath {
        self.collection(Collection::Settings).doc("general")
    }

    /// Whether this session may read and write `collection`.
    pub(crate) fn can_access(&self, collection: &CollectionPath) -> bool {
        let root = format!("{}/", user_root(&self.app_id, &self.user_id));
        collection.as_str().starts_with(&root)
    }
}

/// Restore the saved session, signing in anonymously when there is none.
///
/// A session that cannot be read is treated like a missing one.
pub(crate) fn current(db: &Database, app_id: &str) -> Result<Session> {
    match db.get_session() {
        Ok(Some(saved)) => {
            tracing::debug!(user = %saved.user_id, "restored session");
            return Ok(Session::new(app_id, &saved.user_id, saved.anonymous));
        }
        Ok(None) => {}
        Err(err) => tracing::warn!("could not restore session, signing in anonymously: {err:#}"),
    }
    sign_in_anonymously(db, app_id)
}

pub(crate) fn sign_in_anonymously(db: &Database, app_id: &str) -> Result<Session> {
    let user_id = format!("anon-{}", uuid::Uuid::new_v4().simple());
    db.save_session(&StoredSession {
        user_id: user_id.clone(),
        anonymous: true,
    })?;
    tracing::info!(user = %user_id, "signed in anonymously");
    Ok(Session::new(app_id, &user_id, true))
}

pub(crate) fn login(db: &Database, app_id: &str, user_id: &str) -> Result<Session> {
    let user_id = user_id.trim();
    if user_id.is_empty() || user_id.contains('/') {
        anyhow::bail!("Invalid user id: '{user_id}'");
    }
    db.save_session(&StoredSession {
        user_id: user_id.to_string(),
        anonymous: false,
    })?;
    tracing::info!(user = %user_id, "signed in");
    Ok(Session::new(app_id, user_id, false))
}

pub(crate) fn logout(db: &Database) -> Result<()> {
    db.clear_session()?;
    tracing::info!("signed out");
    Ok(())
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
