mod config;
mod controller;
mod progress;
mod round;
mod selection;

// Public API of the round subsystem.
pub use crate::error::RoundError;
pub use config::RoundConfig;
pub use controller::RoundController;
pub use progress::RoundProgress;
pub use round::{AnswerResult, Navigation, PresentedQuestion, RoundSession};
pub use selection::RoundSelector;
