//! Shared-passphrase access gate.
//!
//! The passphrase scopes data to one couple's calendar; it is not a
//! credential. A [`Session`] is handed to the repository explicitly instead
//! of living in global state.

use std::fmt;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

use crate::{CalError, LocalStorage, Result};

/// Slot remembering the unlocked passphrase between runs.
pub const ACCESS_CODE_SLOT: &str = "calendar_code";

/// Shared passphrase partitioning records between installations
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessCode(String);

impl AccessCode {
    pub fn new(code: impl Into<String>) -> Self {
        AccessCode(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Keep the passphrase out of debug logs.
impl fmt::Debug for AccessCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessCode(***)")
    }
}

/// Whether the calendar has been unlocked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Session {
    Unauthenticated,
    Authenticated(AccessCode),
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated(_))
    }

    /// The unlocked code, or [`CalError::AccessDenied`] while locked.
    pub fn access_code(&self) -> Result<&AccessCode> {
        match self {
            Session::Authenticated(code) => Ok(code),
            Session::Unauthenticated => Err(CalError::AccessDenied {
                message: "calendar is locked; unlock it with the shared code first".to_string(),
            }),
        }
    }
}

/// Compares candidate passphrases against the configured one and remembers
/// a successful unlock in local storage.
#[derive(Debug, Clone)]
pub struct AccessGate {
    expected: AccessCode,
    storage: LocalStorage,
}

impl AccessGate {
    pub fn new(expected: AccessCode, storage: LocalStorage) -> Self {
        Self { expected, storage }
    }

    /// Session from a previously remembered code, if it still matches.
    pub fn restore(&self) -> Session {
        match self.storage.get(ACCESS_CODE_SLOT) {
            Ok(Some(saved)) if saved.trim() == self.expected.as_str() => {
                debug!("Restored unlocked session from local storage");
                Session::Authenticated(self.expected.clone())
            }
            Ok(Some(_)) => {
                warn!("Remembered access code no longer matches; staying locked");
                Session::Unauthenticated
            }
            Ok(None) => Session::Unauthenticated,
            Err(e) => {
                warn!("Could not read remembered access code: {}", e);
                Session::Unauthenticated
            }
        }
    }

    /// Unlocks with `candidate` and remembers it on success.
    pub fn unlock(&self, candidate: &str) -> Result<Session> {
        if candidate.trim() != self.expected.as_str() {
            warn!("Rejected access code attempt");
            return Err(CalError::AccessDenied {
                message: "incorrect code".to_string(),
            });
        }

        self.storage.set(ACCESS_CODE_SLOT, self.expected.as_str())?;
        info!("Calendar unlocked");
        Ok(Session::Authenticated(self.expected.clone()))
    }

    /// Forgets the remembered code.
    pub fn lock(&self) -> Result<Session> {
        self.storage.remove(ACCESS_CODE_SLOT)?;
        info!("Calendar locked");
        Ok(Session::Unauthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn gate(dir: &TempDir) -> AccessGate {
        AccessGate::new(AccessCode::new("AMOR2024"), LocalStorage::new(dir.path()))
    }

    #[test]
    fn starts_locked() {
        let dir = TempDir::new().unwrap();
        let session = gate(&dir).restore();
        assert!(!session.is_authenticated());
        assert!(matches!(
            session.access_code(),
            Err(CalError::AccessDenied { .. })
        ));
    }

    #[test]
    fn wrong_code_is_rejected_and_not_remembered() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        assert!(gate.unlock("amor2024").is_err());
        assert!(!gate.restore().is_authenticated());
    }

    #[test]
    fn correct_code_is_remembered_until_locked() {
        let dir = TempDir::new().unwrap();
        let gate = gate(&dir);
        let session = gate.unlock("AMOR2024").unwrap();
        assert_eq!(session.access_code().unwrap().as_str(), "AMOR2024");
        assert!(gate.restore().is_authenticated());

        gate.lock().unwrap();
        assert!(!gate.restore().is_authenticated());
    }

    #[test]
    fn changed_passphrase_invalidates_remembered_code() {
        let dir = TempDir::new().unwrap();
        gate(&dir).unlock("AMOR2024").unwrap();
        let other = AccessGate::new(AccessCode::new("NEWCODE"), LocalStorage::new(dir.path()));
        assert!(!other.restore().is_authenticated());
    }

    #[test]
    fn debug_output_hides_the_code() {
        let code = AccessCode::new("AMOR2024");
        assert!(!format!("{:?}", code).contains("AMOR2024"));
    }
}
