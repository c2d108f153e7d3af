//! The selection wizard state machine.
//!
//! Three strictly linear stages: pick a player, pick modules and a date,
//! confirm. Each forward transition is guarded; nothing in this module
//! performs I/O. Encounter creation on confirm lives in
//! [`crate::application::confirm`].

use std::fmt;

use chrono::NaiveDate;
use pitchside_core::module::Module;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::sequence::{Destination, ModuleSequence, NavigationState};
use crate::error::IntakeError;

/// Wizard stages, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WizardStage {
    /// Choose the player.
    PlayerSelection,
    /// Choose modules and the date.
    ModuleSelection,
    /// Review and confirm.
    Confirmation,
}

impl WizardStage {
    /// The following stage, if any.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            WizardStage::PlayerSelection => Some(WizardStage::ModuleSelection),
            WizardStage::ModuleSelection => Some(WizardStage::Confirmation),
            WizardStage::Confirmation => None,
        }
    }

    /// The preceding stage, if any.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            WizardStage::PlayerSelection => None,
            WizardStage::ModuleSelection => Some(WizardStage::PlayerSelection),
            WizardStage::Confirmation => Some(WizardStage::ModuleSelection),
        }
    }
}

impl fmt::Display for WizardStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            WizardStage::PlayerSelection => "player selection",
            WizardStage::ModuleSelection => "module selection",
            WizardStage::Confirmation => "confirmation",
        })
    }
}

/// When the encounters take place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DateMode {
    /// Today.
    #[default]
    Immediate,
    /// A chosen date, today or later.
    Scheduled {
        /// The chosen date.
        date: NaiveDate,
    },
}

impl DateMode {
    /// The concrete date for the given `today`.
    #[must_use]
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            DateMode::Immediate => today,
            DateMode::Scheduled { date } => date,
        }
    }

    fn check(self, today: NaiveDate) -> Result<(), IntakeError> {
        match self {
            DateMode::Scheduled { date } if date < today => {
                Err(IntakeError::ScheduledDateInPast { date, today })
            }
            _ => Ok(()),
        }
    }
}

/// A confirmed, validated selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The chosen player.
    pub player_id: Uuid,
    /// Chosen modules in selection order; never empty, no duplicates.
    pub modules: Vec<Module>,
    /// The encounter date.
    pub date: NaiveDate,
    /// Staff member running the wizard.
    pub created_by: Uuid,
}

impl Selection {
    /// Whether the intake happens on a later day.
    #[must_use]
    pub fn is_deferred(&self, today: NaiveDate) -> bool {
        self.date > today
    }
}

/// Where to go once every encounter of a selection exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Routing {
    /// Navigation target.
    pub destination: Destination,
    /// The module sequence; only for immediate intakes of two or more
    /// modules.
    pub module_sequence: Option<ModuleSequence>,
    /// Whether no module form opens now.
    pub deferred: bool,
}

/// Decides the navigation target after creation.
///
/// `created` pairs each selected module with its new encounter id, in
/// selection order.
#[must_use]
pub fn plan_routing(selection: &Selection, created: &[(Module, Uuid)], today: NaiveDate) -> Routing {
    if selection.is_deferred(today) {
        return Routing {
            destination: Destination::encounter_list(),
            module_sequence: None,
            deferred: true,
        };
    }

    match created {
        [] => Routing {
            destination: Destination::player_detail(selection.player_id),
            module_sequence: None,
            deferred: false,
        },
        [(module, encounter_id)] => Routing {
            destination: Destination::single_form(*module, *encounter_id, selection.player_id),
            module_sequence: None,
            deferred: false,
        },
        _ => {
            let sequence = ModuleSequence::from_created(created.iter().copied());
            let destination = match NavigationState::in_sequence(&sequence, 0, selection.player_id) {
                Some(state) => Destination::ModuleForm {
                    route: sequence.steps()[0].route.clone(),
                    state,
                },
                None => Destination::player_detail(selection.player_id),
            };
            Routing {
                destination,
                module_sequence: Some(sequence),
                deferred: false,
            }
        }
    }
}

/// Serializable view of a wizard.
#[derive(Debug, Clone, Serialize)]
pub struct WizardSnapshot {
    /// The wizard identifier.
    pub wizard_id: Uuid,
    /// Current stage.
    pub stage: WizardStage,
    /// Chosen player, if any.
    pub player_id: Option<Uuid>,
    /// Chosen modules in selection order.
    pub modules: Vec<Module>,
    /// Chosen date mode.
    pub date_mode: DateMode,
    /// Staff member running the wizard.
    pub created_by: Uuid,
}

/// The player → modules+date → confirmation flow.
#[derive(Debug, Clone)]
pub struct SelectionWizard {
    id: Uuid,
    created_by: Uuid,
    stage: WizardStage,
    player_id: Option<Uuid>,
    modules: Vec<Module>,
    date_mode: DateMode,
}

impl SelectionWizard {
    /// Starts a wizard at player selection, run by `created_by`.
    #[must_use]
    pub fn new(id: Uuid, created_by: Uuid) -> Self {
        Self {
            id,
            created_by,
            stage: WizardStage::PlayerSelection,
            player_id: None,
            modules: Vec::new(),
            date_mode: DateMode::Immediate,
        }
    }

    /// The wizard identifier.
    #[must_use]
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// The current stage.
    #[must_use]
    pub fn stage(&self) -> WizardStage {
        self.stage
    }

    /// Chosen modules in selection order.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    fn require_stage(&self, stage: WizardStage, operation: &'static str) -> Result<(), IntakeError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(IntakeError::InvalidStage {
                stage: self.stage,
                operation,
            })
        }
    }

    /// Chooses the player.
    ///
    /// # Errors
    ///
    /// `InvalidStage` outside player selection; `MissingPlayer` for a nil id.
    pub fn select_player(&mut self, player_id: Uuid) -> Result<(), IntakeError> {
        self.require_stage(WizardStage::PlayerSelection, "select a player")?;
        if player_id.is_nil() {
            return Err(IntakeError::MissingPlayer);
        }
        self.player_id = Some(player_id);
        Ok(())
    }

    /// Adds `module` if absent, removes it if present. Returns whether the
    /// module is selected afterwards.
    ///
    /// # Errors
    ///
    /// `InvalidStage` outside module selection.
    pub fn toggle_module(&mut self, module: Module) -> Result<bool, IntakeError> {
        self.require_stage(WizardStage::ModuleSelection, "toggle a module")?;
        if let Some(position) = self.modules.iter().position(|m| *m == module) {
            self.modules.remove(position);
            Ok(false)
        } else {
            self.modules.push(module);
            Ok(true)
        }
    }

    /// Chooses the date mode.
    ///
    /// # Errors
    ///
    /// `InvalidStage` outside module selection; `ScheduledDateInPast` for a
    /// scheduled date before `today`.
    pub fn set_date_mode(&mut self, mode: DateMode, today: NaiveDate) -> Result<(), IntakeError> {
        self.require_stage(WizardStage::ModuleSelection, "choose a date")?;
        mode.check(today)?;
        self.date_mode = mode;
        Ok(())
    }

    /// Moves to the next stage if the current stage's guard holds.
    ///
    /// # Errors
    ///
    /// `MissingPlayer`, `NoModulesSelected` or `ScheduledDateInPast` when the
    /// guard fails; `InvalidStage` from confirmation, which has no next
    /// stage.
    pub fn advance(&mut self, today: NaiveDate) -> Result<WizardStage, IntakeError> {
        match self.stage {
            WizardStage::PlayerSelection => {
                if self.player_id.is_none() {
                    return Err(IntakeError::MissingPlayer);
                }
            }
            WizardStage::ModuleSelection => {
                if self.modules.is_empty() {
                    return Err(IntakeError::NoModulesSelected);
                }
                self.date_mode.check(today)?;
            }
            WizardStage::Confirmation => {}
        }
        let next = self.stage.next().ok_or(IntakeError::InvalidStage {
            stage: self.stage,
            operation: "advance",
        })?;
        self.stage = next;
        Ok(next)
    }

    /// Moves one stage back, keeping every choice.
    ///
    /// # Errors
    ///
    /// `InvalidStage` from player selection.
    pub fn go_back(&mut self) -> Result<WizardStage, IntakeError> {
        let previous = self.stage.previous().ok_or(IntakeError::InvalidStage {
            stage: self.stage,
            operation: "go back",
        })?;
        self.stage = previous;
        Ok(previous)
    }

    /// The validated selection to confirm.
    ///
    /// Re-checks every guard, so a scheduled date that has slipped into the
    /// past since it was chosen is rejected here.
    ///
    /// # Errors
    ///
    /// `InvalidStage` outside confirmation, or the failing guard.
    pub fn selection(&self, today: NaiveDate) -> Result<Selection, IntakeError> {
        self.require_stage(WizardStage::Confirmation, "confirm")?;
        let player_id = self.player_id.ok_or(IntakeError::MissingPlayer)?;
        if self.modules.is_empty() {
            return Err(IntakeError::NoModulesSelected);
        }
        self.date_mode.check(today)?;
        Ok(Selection {
            player_id,
            modules: self.modules.clone(),
            date: self.date_mode.resolve(today),
            created_by: self.created_by,
        })
    }

    /// Serializable view of the wizard.
    #[must_use]
    pub fn snapshot(&self) -> WizardSnapshot {
        WizardSnapshot {
            wizard_id: self.id,
            stage: self.stage,
            player_id: self.player_id,
            modules: self.modules.clone(),
            date_mode: self.date_mode,
            created_by: self.created_by,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
    }

    fn wizard_at_modules(player_id: Uuid) -> SelectionWizard {
        let mut wizard = SelectionWizard::new(Uuid::new_v4(), Uuid::new_v4());
        wizard.select_player(player_id).unwrap();
        wizard.advance(today()).unwrap();
        wizard
    }

    #[test]
    fn test_new_wizard_starts_at_player_selection() {
        let wizard = SelectionWizard::new(Uuid::new_v4(), Uuid::new_v4());

        assert_eq!(wizard.stage(), WizardStage::PlayerSelection);
        assert!(wizard.modules().is_empty());
    }

    #[test]
    fn test_advance_without_player_is_rejected() {
        let mut wizard = SelectionWizard::new(Uuid::new_v4(), Uuid::new_v4());

        let result = wizard.advance(today());

        assert!(matches!(result, Err(IntakeError::MissingPlayer)));
        assert_eq!(wizard.stage(), WizardStage::PlayerSelection);
    }

    #[test]
    fn test_select_nil_player_is_rejected() {
        let mut wizard = SelectionWizard::new(Uuid::new_v4(), Uuid::new_v4());

        let result = wizard.select_player(Uuid::nil());

        assert!(matches!(result, Err(IntakeError::MissingPlayer)));
    }

    #[test]
    fn test_advance_without_modules_is_rejected() {
        let mut wizard = wizard_at_modules(Uuid::new_v4());

        let result = wizard.advance(today());

        assert!(matches!(result, Err(IntakeError::NoModulesSelected)));
        assert_eq!(wizard.stage(), WizardStage::ModuleSelection);
    }

    #[test]
    fn test_toggle_module_keeps_insertion_order() {
        // Arrange
        let mut wizard = wizard_at_modules(Uuid::new_v4());

        // Act
        assert!(wizard.toggle_module(Module::Nutrition).unwrap());
        assert!(wizard.toggle_module(Module::MedicalExam).unwrap());
        assert!(wizard.toggle_module(Module::GpsPerformance).unwrap());
        assert!(!wizard.toggle_module(Module::MedicalExam).unwrap());
        assert!(wizard.toggle_module(Module::MedicalExam).unwrap());

        // Assert
        assert_eq!(
            wizard.modules(),
            &[Module::Nutrition, Module::GpsPerformance, Module::MedicalExam]
        );
    }

    #[test]
    fn test_toggle_module_outside_module_stage_is_rejected() {
        let mut wizard = SelectionWizard::new(Uuid::new_v4(), Uuid::new_v4());

        let result = wizard.toggle_module(Module::Nutrition);

        assert!(matches!(
            result,
            Err(IntakeError::InvalidStage {
                stage: WizardStage::PlayerSelection,
                ..
            })
        ));
    }

    #[test]
    fn test_scheduled_date_before_today_is_rejected() {
        let mut wizard = wizard_at_modules(Uuid::new_v4());
        let yesterday = today().pred_opt().unwrap();

        let result = wizard.set_date_mode(DateMode::Scheduled { date: yesterday }, today());

        assert!(matches!(
            result,
            Err(IntakeError::ScheduledDateInPast { date, .. }) if date == yesterday
        ));
        assert_eq!(wizard.snapshot().date_mode, DateMode::Immediate);
    }

    #[test]
    fn test_scheduled_date_of_today_is_accepted() {
        let mut wizard = wizard_at_modules(Uuid::new_v4());

        wizard
            .set_date_mode(DateMode::Scheduled { date: today() }, today())
            .unwrap();

        assert_eq!(
            wizard.snapshot().date_mode,
            DateMode::Scheduled { date: today() }
        );
    }

    #[test]
    fn test_go_back_preserves_choices() {
        let player_id = Uuid::new_v4();
        let mut wizard = wizard_at_modules(player_id);
        wizard.toggle_module(Module::Physiotherapy).unwrap();
        wizard.advance(today()).unwrap();

        assert_eq!(wizard.go_back().unwrap(), WizardStage::ModuleSelection);
        assert_eq!(wizard.go_back().unwrap(), WizardStage::PlayerSelection);
        assert!(wizard.go_back().is_err());

        let snapshot = wizard.snapshot();
        assert_eq!(snapshot.player_id, Some(player_id));
        assert_eq!(snapshot.modules, vec![Module::Physiotherapy]);
    }

    #[test]
    fn test_advance_from_confirmation_is_rejected() {
        let mut wizard = wizard_at_modules(Uuid::new_v4());
        wizard.toggle_module(Module::Physiotherapy).unwrap();
        wizard.advance(today()).unwrap();

        let result = wizard.advance(today());

        assert!(matches!(result, Err(IntakeError::InvalidStage { .. })));
    }

    #[test]
    fn test_selection_requires_confirmation_stage() {
        let wizard = wizard_at_modules(Uuid::new_v4());

        let result = wizard.selection(today());

        assert!(matches!(result, Err(IntakeError::InvalidStage { .. })));
    }

    #[test]
    fn test_selection_rechecks_scheduled_date() {
        let mut wizard = wizard_at_modules(Uuid::new_v4());
        wizard.toggle_module(Module::Nutrition).unwrap();
        wizard
            .set_date_mode(DateMode::Scheduled { date: today() }, today())
            .unwrap();
        wizard.advance(today()).unwrap();
        let tomorrow = today().succ_opt().unwrap();

        let result = wizard.selection(tomorrow);

        assert!(matches!(result, Err(IntakeError::ScheduledDateInPast { .. })));
    }

    fn selection(modules: Vec<Module>, date: NaiveDate) -> Selection {
        Selection {
            player_id: Uuid::new_v4(),
            modules,
            date,
            created_by: Uuid::new_v4(),
        }
    }

    #[test]
    fn test_plan_routing_future_date_goes_to_encounter_list() {
        let date = today() + chrono::Days::new(5);
        let selection = selection(vec![Module::MedicalExam, Module::Nutrition], date);
        let created = [
            (Module::MedicalExam, Uuid::new_v4()),
            (Module::Nutrition, Uuid::new_v4()),
        ];

        let routing = plan_routing(&selection, &created, today());

        assert_eq!(routing.destination, Destination::encounter_list());
        assert!(routing.deferred);
        assert!(routing.module_sequence.is_none());
    }

    #[test]
    fn test_plan_routing_single_module_has_no_sequence() {
        let selection = selection(vec![Module::MedicalExam], today());
        let encounter_id = Uuid::new_v4();

        let routing = plan_routing(&selection, &[(Module::MedicalExam, encounter_id)], today());

        assert_eq!(
            routing.destination,
            Destination::single_form(Module::MedicalExam, encounter_id, selection.player_id)
        );
        assert!(routing.module_sequence.is_none());
        assert!(!routing.deferred);
    }

    #[test]
    fn test_plan_routing_multiple_modules_opens_first_step() {
        let selection = selection(vec![Module::GpsPerformance, Module::MedicalExam], today());
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        let created = [(Module::GpsPerformance, first), (Module::MedicalExam, second)];

        let routing = plan_routing(&selection, &created, today());

        let sequence = routing.module_sequence.clone().unwrap();
        assert_eq!(sequence.len(), 2);
        assert_eq!(routing.destination.route(), "/modules/gps-performance");
        let state = routing.destination.state().unwrap();
        assert_eq!(state.encounter_id, first);
        assert_eq!(state.player_id, selection.player_id);
        assert_eq!(state.current_index, Some(0));
        assert_eq!(state.module_sequence.as_ref(), Some(&sequence));
    }
}
