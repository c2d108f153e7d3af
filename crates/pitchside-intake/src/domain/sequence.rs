//! Module sequencing.
//!
//! A multi-module intake produces a [`ModuleSequence`]: the modules the
//! operator picked, in selection order, each paired with the encounter
//! created for it. Module forms carry the sequence forward in their
//! [`NavigationState`] and, after a successful save, ask
//! [`compute_next_destination`] where to go. Nothing here performs I/O.

use pitchside_core::error::DomainError;
use pitchside_core::module::Module;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Route of the encounter listing view.
pub const ENCOUNTER_LIST_ROUTE: &str = "/encounters";

/// Route of a player's detail view.
#[must_use]
pub fn player_detail_route(player_id: Uuid) -> String {
    format!("/players/{player_id}")
}

/// One step of a module sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceStep {
    /// The module of this step.
    pub module: Module,
    /// The encounter created for this step.
    pub encounter_id: Uuid,
    /// Route of the module's form.
    pub route: String,
}

impl SequenceStep {
    /// A step pointing at `module`'s form.
    #[must_use]
    pub fn new(module: Module, encounter_id: Uuid) -> Self {
        Self {
            module,
            encounter_id,
            route: module.route().to_owned(),
        }
    }
}

/// Ordered list of module steps produced by one wizard run.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModuleSequence {
    steps: Vec<SequenceStep>,
}

impl ModuleSequence {
    /// Builds a sequence from `(module, encounter_id)` pairs, keeping their
    /// order.
    pub fn from_created<I>(created: I) -> Self
    where
        I: IntoIterator<Item = (Module, Uuid)>,
    {
        Self {
            steps: created
                .into_iter()
                .map(|(module, encounter_id)| SequenceStep::new(module, encounter_id))
                .collect(),
        }
    }

    /// Number of steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Whether the sequence has no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// The step at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SequenceStep> {
        self.steps.get(index)
    }

    /// All steps in order.
    #[must_use]
    pub fn steps(&self) -> &[SequenceStep] {
        &self.steps
    }

    /// Position of `current_index` within the sequence, `None` if out of
    /// range.
    #[must_use]
    pub fn progress(&self, current_index: usize) -> Option<Progress> {
        let total = self.len();
        if current_index >= total {
            return None;
        }
        let current = current_index + 1;
        // round(current / total * 100) with halves rounded up, in integers.
        let percent = (200 * current + total) / (2 * total);
        Some(Progress {
            current,
            total,
            percent: u8::try_from(percent).unwrap_or(100),
            is_last: current == total,
        })
    }

    /// Where to go after the step at `current_index` has been saved.
    #[must_use]
    pub fn next_destination(&self, current_index: usize, player_id: Uuid) -> Destination {
        let next_index = current_index + 1;
        match self.get(next_index) {
            Some(step) => Destination::ModuleForm {
                route: step.route.clone(),
                state: NavigationState {
                    encounter_id: step.encounter_id,
                    player_id,
                    module_sequence: Some(self.clone()),
                    current_index: Some(next_index),
                },
            },
            None => Destination::player_detail(player_id),
        }
    }
}

/// Derived position within a module sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    /// One-based position of the current step.
    pub current: usize,
    /// Number of steps.
    pub total: usize,
    /// `current / total` as a rounded percentage.
    pub percent: u8,
    /// Whether the current step is the final one.
    pub is_last: bool,
}

/// State a module form receives on entry.
///
/// Single-module flows carry only the encounter and player; multi-module
/// flows add the sequence and the index of the current step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationState {
    /// The encounter the form edits.
    pub encounter_id: Uuid,
    /// The player being examined.
    pub player_id: Uuid,
    /// The sequence this form is part of, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_sequence: Option<ModuleSequence>,
    /// Index of this form within `module_sequence`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_index: Option<usize>,
}

impl NavigationState {
    /// State for a form outside any sequence.
    #[must_use]
    pub fn single(encounter_id: Uuid, player_id: Uuid) -> Self {
        Self {
            encounter_id,
            player_id,
            module_sequence: None,
            current_index: None,
        }
    }

    /// State for the step at `index` of `sequence`, `None` if out of range.
    #[must_use]
    pub fn in_sequence(sequence: &ModuleSequence, index: usize, player_id: Uuid) -> Option<Self> {
        sequence.get(index).map(|step| Self {
            encounter_id: step.encounter_id,
            player_id,
            module_sequence: Some(sequence.clone()),
            current_index: Some(index),
        })
    }

    /// Index used for sequencing; a sequence without an index starts at 0.
    #[must_use]
    pub fn index(&self) -> usize {
        self.current_index.unwrap_or(0)
    }

    /// Progress of the form, `None` outside a sequence.
    #[must_use]
    pub fn progress(&self) -> Option<Progress> {
        compute_progress(self.module_sequence.as_ref(), self.index())
    }

    /// Checks that the state describes a form of `module`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Validation` if the current sequence step does not
    /// match `module` and this state's encounter, or if the index is out of
    /// range.
    pub fn validate_for(&self, module: Module) -> Result<(), DomainError> {
        let Some(sequence) = &self.module_sequence else {
            return Ok(());
        };
        let index = self.index();
        match sequence.get(index) {
            Some(step) if step.module == module && step.encounter_id == self.encounter_id => Ok(()),
            Some(step) => Err(DomainError::Validation(format!(
                "sequence step {index} is {} / {}, not {module} / {}",
                step.module, step.encounter_id, self.encounter_id
            ))),
            None => Err(DomainError::Validation(format!(
                "sequence index {index} is out of range for {} steps",
                sequence.len()
            ))),
        }
    }
}

/// Where the client navigates next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Destination {
    /// Open a module form.
    ModuleForm {
        /// Route of the form.
        route: String,
        /// State handed to the form.
        state: NavigationState,
    },
    /// The player's detail view; ends a sequence.
    PlayerDetail {
        /// Route of the view.
        route: String,
        /// The player shown.
        player_id: Uuid,
    },
    /// The encounter listing view; used for deferred (future-dated) intakes.
    EncounterList {
        /// Route of the view.
        route: String,
    },
}

impl Destination {
    /// The terminal destination of a player's intake.
    #[must_use]
    pub fn player_detail(player_id: Uuid) -> Self {
        Destination::PlayerDetail {
            route: player_detail_route(player_id),
            player_id,
        }
    }

    /// The encounter listing view.
    #[must_use]
    pub fn encounter_list() -> Self {
        Destination::EncounterList {
            route: ENCOUNTER_LIST_ROUTE.to_owned(),
        }
    }

    /// A module form outside any sequence.
    #[must_use]
    pub fn single_form(module: Module, encounter_id: Uuid, player_id: Uuid) -> Self {
        Destination::ModuleForm {
            route: module.route().to_owned(),
            state: NavigationState::single(encounter_id, player_id),
        }
    }

    /// The route to navigate to.
    #[must_use]
    pub fn route(&self) -> &str {
        match self {
            Destination::ModuleForm { route, .. }
            | Destination::PlayerDetail { route, .. }
            | Destination::EncounterList { route } => route,
        }
    }

    /// The navigation state handed to a module form, if any.
    #[must_use]
    pub fn state(&self) -> Option<&NavigationState> {
        match self {
            Destination::ModuleForm { state, .. } => Some(state),
            _ => None,
        }
    }
}

/// Progress within `sequence`; `None` when there is no sequence (single
/// module flow) or the index is out of range.
#[must_use]
pub fn compute_progress(sequence: Option<&ModuleSequence>, current_index: usize) -> Option<Progress> {
    sequence.and_then(|sequence| sequence.progress(current_index))
}

/// Where a module form navigates after a successful save.
///
/// Without a sequence, or from its last step, this is the player's detail
/// view; otherwise it is the next step's form with the index advanced.
#[must_use]
pub fn compute_next_destination(
    sequence: Option<&ModuleSequence>,
    current_index: usize,
    player_id: Uuid,
) -> Destination {
    match sequence {
        Some(sequence) => sequence.next_destination(current_index, player_id),
        None => Destination::player_detail(player_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sequence_of(modules: &[Module]) -> ModuleSequence {
        ModuleSequence::from_created(modules.iter().map(|m| (*m, Uuid::new_v4())))
    }

    #[test]
    fn test_from_created_preserves_order_and_routes() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();

        let sequence = ModuleSequence::from_created([
            (Module::MedicalExam, a),
            (Module::BodyComposition, b),
        ]);

        assert_eq!(sequence.len(), 2);
        assert_eq!(sequence.steps()[0].module, Module::MedicalExam);
        assert_eq!(sequence.steps()[0].encounter_id, a);
        assert_eq!(sequence.steps()[0].route, "/modules/medical-exam");
        assert_eq!(sequence.steps()[1].module, Module::BodyComposition);
        assert_eq!(sequence.steps()[1].encounter_id, b);
    }

    #[test]
    fn test_progress_of_first_of_three() {
        let sequence = sequence_of(&[Module::MedicalExam, Module::Nutrition, Module::Physiotherapy]);

        let progress = compute_progress(Some(&sequence), 0).unwrap();

        assert_eq!(
            progress,
            Progress {
                current: 1,
                total: 3,
                percent: 33,
                is_last: false,
            }
        );
    }

    #[test]
    fn test_progress_percent_rounds_half_up() {
        let modules = [Module::BodyComposition; 8];
        let sequence = sequence_of(&modules);

        // 1/8 = 12.5% and 3/8 = 37.5%
        assert_eq!(sequence.progress(0).unwrap().percent, 13);
        assert_eq!(sequence.progress(2).unwrap().percent, 38);
    }

    #[test]
    fn test_progress_matches_rounded_ratio_and_increases() {
        for total in 1..=12usize {
            let modules: Vec<Module> = (0..total).map(|i| Module::ALL[i % 5]).collect();
            let sequence = sequence_of(&modules);
            let mut previous = 0u8;
            for index in 0..total {
                let progress = sequence.progress(index).unwrap();
                #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let expected = ((index + 1) as f64 / total as f64 * 100.0).round() as u8;
                assert_eq!(progress.percent, expected, "index {index} of {total}");
                assert!(progress.percent > previous);
                assert_eq!(progress.is_last, index == total - 1);
                previous = progress.percent;
            }
            assert_eq!(previous, 100);
        }
    }

    #[test]
    fn test_progress_absent_without_sequence_or_out_of_range() {
        let sequence = sequence_of(&[Module::MedicalExam, Module::Nutrition]);

        assert!(compute_progress(None, 0).is_none());
        assert!(compute_progress(Some(&sequence), 2).is_none());
        assert!(compute_progress(Some(&ModuleSequence::default()), 0).is_none());
    }

    #[test]
    fn test_next_destination_advances_index_and_keeps_player() {
        // Arrange
        let player_id = Uuid::new_v4();
        let sequence = sequence_of(&[Module::GpsPerformance, Module::MedicalExam, Module::Nutrition]);

        for index in 0..sequence.len() - 1 {
            // Act
            let destination = compute_next_destination(Some(&sequence), index, player_id);

            // Assert
            let next = &sequence.steps()[index + 1];
            assert_eq!(destination.route(), next.route);
            let state = destination.state().unwrap();
            assert_eq!(state.current_index, Some(index + 1));
            assert_eq!(state.player_id, player_id);
            assert_eq!(state.encounter_id, next.encounter_id);
            assert_eq!(state.module_sequence.as_ref(), Some(&sequence));
        }
    }

    #[test]
    fn test_next_destination_from_last_step_is_player_detail() {
        let player_id = Uuid::new_v4();
        let sequence = sequence_of(&[Module::GpsPerformance, Module::MedicalExam]);

        let destination = compute_next_destination(Some(&sequence), 1, player_id);

        assert_eq!(destination, Destination::player_detail(player_id));
        assert_eq!(destination.route(), format!("/players/{player_id}"));
        assert!(destination.state().is_none());
    }

    #[test]
    fn test_next_destination_without_sequence_is_player_detail() {
        let player_id = Uuid::new_v4();

        let destination = compute_next_destination(None, 0, player_id);

        assert_eq!(destination, Destination::player_detail(player_id));
    }

    #[test]
    fn test_single_state_serializes_without_sequence_fields() {
        let state = NavigationState::single(Uuid::new_v4(), Uuid::new_v4());

        let json = serde_json::to_value(&state).unwrap();

        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert!(object.contains_key("encounter_id"));
        assert!(object.contains_key("player_id"));
    }

    #[test]
    fn test_destination_serializes_with_kind_tag() {
        let json = serde_json::to_value(Destination::encounter_list()).unwrap();

        assert_eq!(
            json,
            serde_json::json!({ "kind": "encounter_list", "route": "/encounters" })
        );
    }

    #[test]
    fn test_validate_for_rejects_mismatched_step() {
        let player_id = Uuid::new_v4();
        let sequence = sequence_of(&[Module::GpsPerformance, Module::MedicalExam]);
        let state = NavigationState::in_sequence(&sequence, 1, player_id).unwrap();

        assert!(state.validate_for(Module::MedicalExam).is_ok());
        assert!(matches!(
            state.validate_for(Module::GpsPerformance),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_for_accepts_single_state() {
        let state = NavigationState::single(Uuid::new_v4(), Uuid::new_v4());

        assert!(state.validate_for(Module::Nutrition).is_ok());
    }
}
