//! The module form protocol: restore on mount, write-through edits, submit.
//!
//! Module forms differ only in their fields. Restoration, draft handling
//! and sequencing after a save are the same for every module and live here.

use pitchside_core::collaborators::ModuleDataService;
use pitchside_core::drafts::{ActiveForm, DraftKey};
use pitchside_core::error::DomainError;
use pitchside_core::fields::{FieldMap, FieldValue};
use pitchside_core::module::Module;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::application::draft_store::DraftStore;
use crate::domain::sequence::{Destination, NavigationState, Progress, compute_next_destination};
use crate::error::IntakeError;

/// Where a mounted form's initial fields came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOrigin {
    /// A local draft; it wins over anything on the server.
    Draft,
    /// The payload saved on the server.
    Server,
    /// Nothing saved yet.
    Empty,
}

/// A mounted module form.
#[derive(Debug, Clone)]
pub struct FormSession {
    module: Module,
    entry: NavigationState,
    fields: FieldMap,
    origin: FieldOrigin,
    // Whether the server holds a payload; unknown when restored from a draft.
    persisted: Option<bool>,
}

/// Serializable view of a form session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormView {
    /// The form's module.
    pub module: Module,
    /// Route of the form.
    pub route: String,
    /// Current fields.
    pub fields: FieldMap,
    /// Where the initial fields came from.
    pub origin: FieldOrigin,
    /// Position in the module sequence, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<Progress>,
    /// The entry state, passed back on submit.
    pub state: NavigationState,
}

impl FormSession {
    /// Mounts `module`'s form for `entry`.
    ///
    /// A stored draft for the encounter takes precedence, even one the
    /// operator emptied; the server is only asked when there is none, and a
    /// missing payload mounts an empty form.
    ///
    /// # Errors
    ///
    /// Returns `Collaborator` if `entry` does not describe a form of `module`
    /// or if the payload fetch fails for a reason other than "not found".
    pub async fn mount(
        module: Module,
        entry: NavigationState,
        drafts: &DraftStore,
        data: &dyn ModuleDataService,
    ) -> Result<Self, IntakeError> {
        entry.validate_for(module)?;
        let key = DraftKey::for_encounter(module, entry.encounter_id);

        let (fields, origin, persisted) = match drafts.find(&key).await {
            Some(draft) => (draft, FieldOrigin::Draft, None),
            None => match data.get_by_encounter_id(module, entry.encounter_id).await? {
                Some(saved) => (saved, FieldOrigin::Server, Some(true)),
                None => (FieldMap::new(), FieldOrigin::Empty, Some(false)),
            },
        };

        debug!(draft_key = %key, ?origin, "module form mounted");
        Ok(Self {
            module,
            entry,
            fields,
            origin,
            persisted,
        })
    }

    /// A session over fields the client already holds, for a stateless
    /// submit.
    ///
    /// # Errors
    ///
    /// Returns `Collaborator` if `entry` does not describe a form of `module`.
    pub fn from_fields(
        module: Module,
        entry: NavigationState,
        fields: FieldMap,
    ) -> Result<Self, IntakeError> {
        entry.validate_for(module)?;
        Ok(Self {
            module,
            entry,
            fields,
            origin: FieldOrigin::Draft,
            persisted: None,
        })
    }

    /// The form's draft key.
    #[must_use]
    pub fn key(&self) -> DraftKey {
        DraftKey::for_encounter(self.module, self.entry.encounter_id)
    }

    /// Current fields.
    #[must_use]
    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Where the initial fields came from.
    #[must_use]
    pub fn origin(&self) -> FieldOrigin {
        self.origin
    }

    /// Position in the module sequence, `None` outside a sequence.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        self.entry.progress()
    }

    /// Sets one field and saves the draft.
    pub async fn edit(&mut self, name: impl Into<String>, value: FieldValue, drafts: &DraftStore) {
        self.fields.insert(name.into(), value);
        drafts.save(&self.key(), &self.fields).await;
    }

    /// Saves the payload, clears the draft, and returns where to go next.
    ///
    /// # Errors
    ///
    /// Returns `Collaborator` if the payload cannot be saved; the draft is
    /// kept in that case.
    pub async fn submit(
        &mut self,
        drafts: &DraftStore,
        data: &dyn ModuleDataService,
    ) -> Result<Destination, IntakeError> {
        let encounter_id = self.entry.encounter_id;
        match self.persisted {
            Some(true) => data.update(self.module, encounter_id, &self.fields).await?,
            Some(false) => data.create(self.module, encounter_id, &self.fields).await?,
            None => match data.create(self.module, encounter_id, &self.fields).await {
                Err(DomainError::AlreadyExists(_)) => {
                    data.update(self.module, encounter_id, &self.fields).await?;
                }
                other => other?,
            },
        }
        self.persisted = Some(true);
        drafts.clear(&self.key()).await;

        let destination = compute_next_destination(
            self.entry.module_sequence.as_ref(),
            self.entry.index(),
            self.entry.player_id,
        );
        info!(
            %encounter_id,
            module = %self.module,
            next = destination.route(),
            "module data saved"
        );
        Ok(destination)
    }

    /// Serializable view.
    #[must_use]
    pub fn view(&self) -> FormView {
        FormView {
            module: self.module,
            route: self.module.route().to_owned(),
            fields: self.fields.clone(),
            origin: self.origin,
            progress: self.progress(),
            state: self.entry.clone(),
        }
    }
}

impl ActiveForm for FormSession {
    fn draft_key(&self) -> DraftKey {
        self.key()
    }

    fn flush(&self) -> FieldMap {
        self.fields.clone()
    }
}
