mod format;
mod ids;
mod plan;
mod question;
mod round;

pub use format::{AnswerOutcome, QuestionFormat};
pub use ids::{ParseIdError, QuestionId};
pub use plan::{
    ContentRequest, PLAN_HISTORY, PLAN_LOOKAHEAD, PlanEntry, PlanStatus, ProfileError, StudyPlan,
    StudyProfile,
};
pub use question::{FormatTransition, Question, QuestionError};
pub use round::{DEFAULT_ROUND_SIZE, RoundState};
