use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::RoundState;

/// How many not-yet-started rounds the plan lists after the current one.
pub const PLAN_LOOKAHEAD: u32 = 3;

/// How many finished rounds the plan lists before the current one.
pub const PLAN_HISTORY: u32 = 5;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProfileError {
    #[error("course cannot be empty")]
    EmptyCourse,

    #[error("study goal cannot be empty")]
    EmptyGoal,

    #[error("at least one concept is required")]
    NoConcepts,
}

//
// ─── PROFILE ───────────────────────────────────────────────────────────────────
//

/// What the learner entered during onboarding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyProfile {
    institution: Option<String>,
    course: String,
    goal: String,
    concepts: Vec<String>,
}

impl StudyProfile {
    /// Builds a profile, trimming text and dropping blank or repeated concepts.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the course or goal is blank or no concept survives.
    pub fn new(
        institution: Option<String>,
        course: impl Into<String>,
        goal: impl Into<String>,
        concepts: impl IntoIterator<Item = String>,
    ) -> Result<Self, ProfileError> {
        let course = course.into().trim().to_owned();
        if course.is_empty() {
            return Err(ProfileError::EmptyCourse);
        }
        let goal = goal.into().trim().to_owned();
        if goal.is_empty() {
            return Err(ProfileError::EmptyGoal);
        }

        let mut unique: Vec<String> = Vec::new();
        for concept in concepts {
            let concept = concept.trim();
            if concept.is_empty() || unique.iter().any(|c| c.eq_ignore_ascii_case(concept)) {
                continue;
            }
            unique.push(concept.to_owned());
        }
        if unique.is_empty() {
            return Err(ProfileError::NoConcepts);
        }

        let institution = institution
            .map(|i| i.trim().to_owned())
            .filter(|i| !i.is_empty());

        Ok(Self {
            institution,
            course,
            goal,
            concepts: unique,
        })
    }

    #[must_use]
    pub fn institution(&self) -> Option<&str> {
        self.institution.as_deref()
    }

    #[must_use]
    pub fn course(&self) -> &str {
        &self.course
    }

    #[must_use]
    pub fn goal(&self) -> &str {
        &self.goal
    }

    #[must_use]
    pub fn concepts(&self) -> &[String] {
        &self.concepts
    }

    /// Concept studied in the given round; rounds cycle through the concepts.
    #[must_use]
    pub fn concept_for_round(&self, round_number: u32) -> &str {
        let len = self.concepts.len().max(1);
        let index = usize::try_from(round_number.max(1) - 1).unwrap_or(0) % len;
        self.concepts.get(index).map_or("", String::as_str)
    }
}

/// Parameters sent to the question provider for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    pub course: String,
    pub goal: String,
    pub concept: String,
}

impl ContentRequest {
    #[must_use]
    pub fn for_round(profile: &StudyProfile, round_number: u32) -> Self {
        Self {
            institution: profile.institution.clone(),
            course: profile.course.clone(),
            goal: profile.goal.clone(),
            concept: profile.concept_for_round(round_number).to_owned(),
        }
    }
}

//
// ─── PLAN ──────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanStatus {
    Completed,
    Current,
    Upcoming,
}

/// One row of the study plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub round_number: u32,
    pub concept: String,
    pub status: PlanStatus,
    /// Completed questions in this round; only tracked for the current round.
    pub progress: u32,
    pub size: u32,
}

/// Read-only view of rounds laid out over the learner's concepts.
#[derive(Debug, Clone, PartialEq)]
pub struct StudyPlan {
    pub course: String,
    pub goal: String,
    pub entries: Vec<PlanEntry>,
    pub accuracy_percent: u32,
    pub total_answered: u32,
}

impl StudyPlan {
    /// Lays out the last `PLAN_HISTORY` finished rounds, the round in progress
    /// and `PLAN_LOOKAHEAD` upcoming ones.
    #[must_use]
    pub fn build(profile: &StudyProfile, state: &RoundState) -> Self {
        let current = if state.round_complete {
            state.round_number.saturating_add(1)
        } else {
            state.round_number
        }
        .max(1);
        let size = u32::try_from(state.selected_question_ids.len()).unwrap_or(u32::MAX);

        let first = current.saturating_sub(PLAN_HISTORY).max(1);
        let last = current.saturating_add(PLAN_LOOKAHEAD);
        let mut entries = Vec::new();
        for round_number in first..=last {
            let status = match round_number.cmp(&current) {
                std::cmp::Ordering::Less => PlanStatus::Completed,
                std::cmp::Ordering::Equal => PlanStatus::Current,
                std::cmp::Ordering::Greater => PlanStatus::Upcoming,
            };
            let (progress, round_size) = if round_number == state.round_number {
                (state.progress, size)
            } else {
                (0, 0)
            };
            entries.push(PlanEntry {
                round_number,
                concept: profile.concept_for_round(round_number).to_owned(),
                status,
                progress,
                size: round_size,
            });
        }

        Self {
            course: profile.course.clone(),
            goal: profile.goal.clone(),
            entries,
            accuracy_percent: state.accuracy_percent(),
            total_answered: state.total_answered,
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<&PlanEntry> {
        self.entries
            .iter()
            .find(|e| e.status == PlanStatus::Current)
    }

    #[must_use]
    pub fn current_concept(&self) -> Option<&str> {
        self.current().map(|e| e.concept.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> StudyProfile {
        StudyProfile::new(
            Some("  State University ".into()),
            "Biology 101",
            "Pass the midterm",
            vec![
                "Cells".to_string(),
                " cells".to_string(),
                "Genetics".to_string(),
                "  ".to_string(),
                "Evolution".to_string(),
            ],
        )
        .unwrap()
    }

    #[test]
    fn profile_trims_and_dedups_concepts() {
        let p = profile();
        assert_eq!(p.institution(), Some("State University"));
        assert_eq!(p.concepts(), ["Cells", "Genetics", "Evolution"]);
    }

    #[test]
    fn profile_requires_concepts() {
        let err = StudyProfile::new(None, "Bio", "Goal", vec![" ".to_string()]).unwrap_err();
        assert_eq!(err, ProfileError::NoConcepts);
        let err = StudyProfile::new(None, "", "Goal", vec!["x".to_string()]).unwrap_err();
        assert_eq!(err, ProfileError::EmptyCourse);
    }

    #[test]
    fn rounds_cycle_through_concepts() {
        let p = profile();
        assert_eq!(p.concept_for_round(1), "Cells");
        assert_eq!(p.concept_for_round(3), "Evolution");
        assert_eq!(p.concept_for_round(4), "Cells");
        assert_eq!(p.concept_for_round(0), "Cells");
        assert_eq!(ContentRequest::for_round(&p, 2).concept, "Genetics");
    }

    #[test]
    fn plan_marks_current_round() {
        let state = RoundState {
            round_number: 2,
            selected_question_ids: vec![crate::model::QuestionId::new(1); 1],
            progress: 1,
            completed_rounds: 1,
            ..RoundState::default()
        };
        let plan = StudyPlan::build(&profile(), &state);
        assert_eq!(plan.entries.len(), 2 + PLAN_LOOKAHEAD as usize);
        assert_eq!(plan.entries[0].status, PlanStatus::Completed);
        let current = plan.current().unwrap();
        assert_eq!(current.round_number, 2);
        assert_eq!(current.progress, 1);
        assert_eq!(plan.current_concept(), Some("Genetics"));
    }

    #[test]
    fn plan_lists_a_bounded_window_of_rounds() {
        let state = RoundState {
            round_number: 20,
            completed_rounds: 19,
            ..RoundState::default()
        };
        let plan = StudyPlan::build(&profile(), &state);
        assert_eq!(plan.entries.first().unwrap().round_number, 20 - PLAN_HISTORY);
        assert_eq!(plan.entries.last().unwrap().round_number, 20 + PLAN_LOOKAHEAD);
        assert_eq!(plan.current().unwrap().round_number, 20);
    }

    #[test]
    fn huge_round_number_does_not_overflow() {
        let state = RoundState {
            round_number: u32::MAX,
            round_complete: true,
            ..RoundState::default()
        };
        let plan = StudyPlan::build(&profile(), &state);
        assert!(plan.entries.len() <= (PLAN_HISTORY + PLAN_LOOKAHEAD + 1) as usize);
        assert_eq!(plan.entries.last().unwrap().round_number, u32::MAX);
        assert!(plan.current().is_some());
    }

    #[test]
    fn profile_without_concepts_yields_empty_concept() {
        let profile: StudyProfile = serde_json::from_str(
            r#"{"institution": null, "course": "Bio", "goal": "Pass", "concepts": []}"#,
        )
        .unwrap();
        assert_eq!(profile.concept_for_round(3), "");
    }

    #[test]
    fn completed_round_moves_plan_forward() {
        let state = RoundState {
            round_number: 1,
            round_complete: true,
            completed_rounds: 1,
            ..RoundState::default()
        };
        let plan = StudyPlan::build(&profile(), &state);
        assert_eq!(plan.entries[0].status, PlanStatus::Completed);
        assert_eq!(plan.current().unwrap().round_number, 2);
    }
}
