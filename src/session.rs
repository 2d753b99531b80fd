//! Authenticated session: token + user profile, persisted between runs.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use tracing::{info, warn};

use crate::api::ApiClient;
use crate::error::{AppError, Result};
use crate::models::{LoginResponse, Role, UserProfile};

const TOKEN_FILE: &str = "token";
const USER_FILE: &str = "user.json";

/// Token and profile of the logged-in user.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl From<LoginResponse> for Session {
    fn from(response: LoginResponse) -> Self {
        Self {
            token: response.token,
            user: response.user,
        }
    }
}

/// Exchange credentials for a session. Blank credentials are rejected without a request.
pub async fn authenticate(api: &ApiClient, username: &str, password: &str) -> Result<Session> {
    let username = username.trim();
    if username.is_empty() || password.is_empty() {
        return Err(AppError::validation("Username and password are required"));
    }
    let response = api.login(username, password).await?;
    Ok(response.into())
}

/// Persistent storage for the two session keys.
///
/// Implementations write, restore and clear both keys together.
pub trait SessionStore {
    /// Restore a stored session. `Ok(None)` when nothing (or only half) is stored.
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Session store backed by two files in the user's data directory.
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn token_path(&self) -> PathBuf {
        self.dir.join(TOKEN_FILE)
    }

    fn user_path(&self) -> PathBuf {
        self.dir.join(USER_FILE)
    }
}

fn read_optional(path: &Path) -> Result<Option<String>> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        let token = read_optional(&self.token_path())?;
        let user = read_optional(&self.user_path())?;

        match (token, user) {
            (Some(token), Some(user)) => {
                let token = token.trim().to_string();
                if token.is_empty() {
                    return Ok(None);
                }
                let user: UserProfile = serde_json::from_str(&user)
                    .map_err(|e| AppError::session(format!("Stored profile is unreadable: {e}")))?;
                Ok(Some(Session { token, user }))
            }
            _ => Ok(None),
        }
    }

    fn save(&self, session: &Session) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.token_path(), &session.token)?;
        std::fs::write(self.user_path(), serde_json::to_string(&session.user)?)?;
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        for path in [self.token_path(), self.user_path()] {
            match std::fs::remove_file(&path) {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }
}

/// In-memory store; nothing survives the process.
#[derive(Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().map_err(|_| AppError::session("store poisoned"))?.clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock().map_err(|_| AppError::session("store poisoned"))? = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().map_err(|_| AppError::session("store poisoned"))? = None;
        Ok(())
    }
}

/// Owns the current session and its persisted copy.
pub struct SessionManager<S: SessionStore> {
    store: S,
    current: Option<Session>,
}

impl<S: SessionStore> SessionManager<S> {
    pub fn new(store: S) -> Self {
        Self { store, current: None }
    }

    /// Restore the persisted session, if any. A damaged store is wiped.
    pub fn hydrate(&mut self) -> Option<&Session> {
        self.current = match self.store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("Discarding stored session: {e}");
                if let Err(e) = self.store.clear() {
                    warn!("Failed to clear session store: {e}");
                }
                None
            }
        };
        self.current.as_ref()
    }

    /// Install a session obtained from [`authenticate`] and persist it.
    pub fn establish(&mut self, session: Session) -> Result<&Session> {
        self.store.save(&session)?;
        info!(
            "Logged in as {} ({})",
            session.user.username,
            session.user.role.label()
        );
        Ok(&*self.current.insert(session))
    }

    /// Clear persisted and in-memory state.
    pub fn logout(&mut self) -> Result<()> {
        if let Some(session) = self.current.take() {
            info!("Logged out {}", session.user.username);
        }
        self.store.clear()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.current.as_ref().map(|s| &s.user)
    }

    pub fn role(&self) -> Option<Role> {
        self.user().map(|u| u.role)
    }

    pub fn is_authenticated(&self) -> bool {
        self.current.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.role() == Some(Role::Admin)
    }

    pub fn is_org_treasurer(&self) -> bool {
        self.role() == Some(Role::OrgTreasurer)
    }

    pub fn is_class_treasurer(&self) -> bool {
        self.role() == Some(Role::ClassTreasurer)
    }

    pub fn can_record_payments(&self) -> bool {
        self.is_admin() || self.is_org_treasurer() || self.is_class_treasurer()
    }

    pub fn can_export_reports(&self) -> bool {
        matches!(
            self.role(),
            Some(Role::Admin | Role::OrgTreasurer | Role::ClassTreasurer)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(role: Role) -> UserProfile {
        UserProfile {
            id: 1,
            username: "jdelacruz".to_string(),
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            role,
            program_id: Some(2),
            department_id: None,
            year_level: Some("3".to_string()),
            section: Some("B".to_string()),
        }
    }

    fn session(role: Role) -> Session {
        Session {
            token: "tok-123".to_string(),
            user: profile(role),
        }
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSessionStore::new(dir.path().join("session"));

        assert_eq!(store.load().unwrap(), None);
        store.save(&session(Role::ClassTreasurer)).unwrap();
        assert_eq!(store.load().unwrap(), Some(session(Role::ClassTreasurer)));

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
        // clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_half_written_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "tok").unwrap();
        let store = FileSessionStore::new(dir.path());
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn test_hydrate_wipes_corrupt_profile() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(TOKEN_FILE), "tok").unwrap();
        std::fs::write(dir.path().join(USER_FILE), "{not json").unwrap();

        let mut manager = SessionManager::new(FileSessionStore::new(dir.path()));
        assert!(manager.hydrate().is_none());
        assert!(!dir.path().join(TOKEN_FILE).exists());
        assert!(!dir.path().join(USER_FILE).exists());
    }

    #[test]
    fn test_establish_hydrate_logout() {
        let dir = tempfile::tempdir().unwrap();
        let mut manager = SessionManager::new(FileSessionStore::new(dir.path()));
        manager.establish(session(Role::Admin)).unwrap();
        assert!(manager.is_authenticated());

        let mut restored = SessionManager::new(FileSessionStore::new(dir.path()));
        assert_eq!(restored.hydrate().map(|s| s.token.as_str()), Some("tok-123"));
        assert!(restored.is_admin());

        restored.logout().unwrap();
        assert!(!restored.is_authenticated());
        assert_eq!(restored.role(), None);

        let mut again = SessionManager::new(FileSessionStore::new(dir.path()));
        assert!(again.hydrate().is_none());
    }

    #[tokio::test]
    async fn test_blank_credentials_rejected_locally() {
        let api = ApiClient::new(&crate::config::ApiConfig::default()).unwrap();
        let err = authenticate(&api, "  ", "secret").await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_role_predicates() {
        let mut manager = SessionManager::new(MemorySessionStore::default());
        assert!(!manager.can_record_payments());
        assert!(!manager.can_export_reports());

        manager.establish(session(Role::ClassTreasurer)).unwrap();
        assert!(manager.can_record_payments());
        assert!(manager.is_class_treasurer());
        assert!(!manager.is_org_treasurer());
        assert!(manager.can_export_reports());

        manager.establish(session(Role::OrgTreasurer)).unwrap();
        assert!(manager.is_org_treasurer());
        assert!(manager.can_record_payments());
        assert!(!manager.is_admin());

        manager.establish(session(Role::Student)).unwrap();
        assert!(!manager.can_record_payments());
        assert!(!manager.can_export_reports());
    }
}
