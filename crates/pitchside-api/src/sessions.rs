//! In-process store of running selection wizards, keyed by wizard id.
//!
//! Sessions that have not been touched for longer than the configured TTL
//! are evicted whenever the store is accessed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use pitchside_core::clock::Clock;
use pitchside_core::error::DomainError;
use pitchside_intake::domain::wizard::SelectionWizard;
use pitchside_intake::error::IntakeError;
use tracing::debug;
use uuid::Uuid;

struct Session {
    wizard: SelectionWizard,
    touched_at: DateTime<Utc>,
    confirming: bool,
}

/// Shared wizard sessions.
#[derive(Clone)]
pub struct WizardSessions {
    sessions: Arc<Mutex<HashMap<Uuid, Session>>>,
    clock: Arc<dyn Clock>,
    ttl: TimeDelta,
}

fn not_found(wizard_id: Uuid) -> IntakeError {
    IntakeError::Collaborator(DomainError::NotFound(format!("wizard {wizard_id}")))
}

impl WizardSessions {
    /// Creates an empty store whose sessions expire `ttl` after their last
    /// use.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>, ttl: TimeDelta) -> Self {
        Self {
            sessions: Arc::new(Mutex::new(HashMap::new())),
            clock,
            ttl,
        }
    }

    /// Locks the store after evicting expired sessions.
    fn live(&self) -> (MutexGuard<'_, HashMap<Uuid, Session>>, DateTime<Utc>) {
        let now = self.clock.now();
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        let before = sessions.len();
        sessions.retain(|_, session| now - session.touched_at < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            debug!(evicted, "expired wizard sessions evicted");
        }
        (sessions, now)
    }

    /// Starts a wizard run by `created_by` and returns it.
    pub fn start(&self, created_by: Uuid) -> SelectionWizard {
        let wizard = SelectionWizard::new(Uuid::new_v4(), created_by);
        let (mut sessions, now) = self.live();
        sessions.insert(
            wizard.id(),
            Session {
                wizard: wizard.clone(),
                touched_at: now,
                confirming: false,
            },
        );
        wizard
    }

    /// Applies `f` to the stored wizard.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown wizard, `InvalidStage` while
    /// the wizard is being confirmed, or `f`'s error.
    pub fn update<R>(
        &self,
        wizard_id: Uuid,
        f: impl FnOnce(&mut SelectionWizard) -> Result<R, IntakeError>,
    ) -> Result<R, IntakeError> {
        let (mut sessions, now) = self.live();
        let session = sessions.get_mut(&wizard_id).ok_or_else(|| not_found(wizard_id))?;
        if session.confirming {
            return Err(IntakeError::InvalidStage {
                stage: session.wizard.stage(),
                operation: "change a wizard that is being confirmed",
            });
        }
        session.touched_at = now;
        f(&mut session.wizard)
    }

    /// A copy of the wizard.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown or expired wizard.
    pub fn get(&self, wizard_id: Uuid) -> Result<SelectionWizard, IntakeError> {
        let (mut sessions, now) = self.live();
        let session = sessions.get_mut(&wizard_id).ok_or_else(|| not_found(wizard_id))?;
        session.touched_at = now;
        Ok(session.wizard.clone())
    }

    /// Marks the wizard as being confirmed and returns a copy to confirm.
    ///
    /// Only one confirmation of a wizard runs at a time; release it with
    /// [`WizardSessions::finish_confirm`].
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown wizard, or `InvalidStage` if
    /// a confirmation is already running.
    pub fn begin_confirm(&self, wizard_id: Uuid) -> Result<SelectionWizard, IntakeError> {
        let (mut sessions, now) = self.live();
        let session = sessions.get_mut(&wizard_id).ok_or_else(|| not_found(wizard_id))?;
        if session.confirming {
            return Err(IntakeError::InvalidStage {
                stage: session.wizard.stage(),
                operation: "confirm a wizard that is already being confirmed",
            });
        }
        session.confirming = true;
        session.touched_at = now;
        Ok(session.wizard.clone())
    }

    /// Ends a confirmation started with [`WizardSessions::begin_confirm`].
    ///
    /// A confirmed wizard is discarded; otherwise it is kept for a retry. A
    /// wizard cancelled in the meantime stays gone.
    pub fn finish_confirm(&self, wizard_id: Uuid, confirmed: bool) {
        let (mut sessions, now) = self.live();
        if confirmed {
            sessions.remove(&wizard_id);
        } else if let Some(session) = sessions.get_mut(&wizard_id) {
            session.confirming = false;
            session.touched_at = now;
        }
    }

    /// Discards the wizard.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown wizard.
    pub fn remove(&self, wizard_id: Uuid) -> Result<SelectionWizard, IntakeError> {
        let (mut sessions, _) = self.live();
        sessions
            .remove(&wizard_id)
            .map(|session| session.wizard)
            .ok_or_else(|| not_found(wizard_id))
    }

    /// Number of live wizards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.live().0.len()
    }

    /// Whether no wizard is live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitchside_intake::domain::wizard::WizardStage;
    use pitchside_test_support::{FixedClock, ManualClock};

    fn sessions() -> WizardSessions {
        WizardSessions::new(Arc::new(FixedClock::on(2026, 3, 2)), TimeDelta::hours(1))
    }

    #[test]
    fn test_update_applies_to_stored_wizard() {
        let sessions = sessions();
        let wizard = sessions.start(Uuid::new_v4());
        let player_id = Uuid::new_v4();

        sessions
            .update(wizard.id(), |w| w.select_player(player_id))
            .unwrap();

        assert_eq!(sessions.get(wizard.id()).unwrap().snapshot().player_id, Some(player_id));
        assert_eq!(sessions.get(wizard.id()).unwrap().stage(), WizardStage::PlayerSelection);
    }

    #[test]
    fn test_unknown_wizard_is_not_found() {
        let sessions = sessions();

        let result = sessions.get(Uuid::new_v4());

        assert!(matches!(
            result,
            Err(IntakeError::Collaborator(DomainError::NotFound(_)))
        ));
    }

    #[test]
    fn test_remove_discards_wizard() {
        let sessions = sessions();
        let wizard = sessions.start(Uuid::new_v4());

        sessions.remove(wizard.id()).unwrap();

        assert!(sessions.is_empty());
        assert!(sessions.remove(wizard.id()).is_err());
    }

    #[test]
    fn test_second_confirm_is_rejected_while_first_runs() {
        // Arrange
        let sessions = sessions();
        let wizard = sessions.start(Uuid::new_v4());
        sessions.begin_confirm(wizard.id()).unwrap();

        // Act
        let second = sessions.begin_confirm(wizard.id());
        let edit = sessions.update(wizard.id(), |w| w.go_back());

        // Assert
        assert!(matches!(second, Err(IntakeError::InvalidStage { .. })));
        assert!(matches!(edit, Err(IntakeError::InvalidStage { .. })));
    }

    #[test]
    fn test_failed_confirm_releases_wizard_for_retry() {
        let sessions = sessions();
        let wizard = sessions.start(Uuid::new_v4());
        sessions.begin_confirm(wizard.id()).unwrap();

        sessions.finish_confirm(wizard.id(), false);

        assert!(sessions.begin_confirm(wizard.id()).is_ok());
    }

    #[test]
    fn test_successful_confirm_discards_wizard() {
        let sessions = sessions();
        let wizard = sessions.start(Uuid::new_v4());
        sessions.begin_confirm(wizard.id()).unwrap();

        sessions.finish_confirm(wizard.id(), true);

        assert!(sessions.is_empty());
    }

    #[test]
    fn test_idle_wizards_expire_after_ttl() {
        // Arrange
        let clock = Arc::new(ManualClock::starting_on(2026, 3, 2));
        let sessions = WizardSessions::new(clock.clone(), TimeDelta::minutes(30));
        let idle = sessions.start(Uuid::new_v4());
        let active = sessions.start(Uuid::new_v4());

        // Act
        clock.advance(TimeDelta::minutes(20));
        sessions.get(active.id()).unwrap();
        clock.advance(TimeDelta::minutes(20));

        // Assert
        assert!(sessions.get(idle.id()).is_err());
        assert!(sessions.get(active.id()).is_ok());
        assert_eq!(sessions.len(), 1);
    }

    #[test]
    fn test_start_evicts_expired_wizards() {
        let clock = Arc::new(ManualClock::starting_on(2026, 3, 2));
        let sessions = WizardSessions::new(clock.clone(), TimeDelta::minutes(30));
        sessions.start(Uuid::new_v4());
        sessions.start(Uuid::new_v4());

        clock.advance(TimeDelta::minutes(31));
        let fresh = sessions.start(Uuid::new_v4());

        assert_eq!(sessions.len(), 1);
        assert!(sessions.get(fresh.id()).is_ok());
    }
}
