#![forbid(unsafe_code)]

pub mod app_services;
pub mod bank;
pub mod content;
pub mod error;
pub mod plan_service;
mod seed;
pub mod sessions;

pub use quiz_core::Clock;

pub use app_services::AppServices;
pub use bank::{BankSource, QuestionBank};
pub use content::{
    BankLoader, ContentConfig, ContentProvider, HttpContentProvider, ProviderQuestion,
    map_provider_questions,
};
pub use error::{AppServicesError, ContentError, RoundError};
pub use plan_service::StudyPlanService;
pub use sessions::{
    AnswerResult, Navigation, PresentedQuestion, RoundConfig, RoundController, RoundProgress,
    RoundSelector, RoundSession,
};
