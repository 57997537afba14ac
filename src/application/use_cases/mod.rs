pub mod answer_question;
pub mod get_history;
pub mod select_region;
pub mod start_session;

pub use answer_question::{AnswerQuestionRequest, AnswerQuestionResponse, AnswerQuestionUseCase};
pub use get_history::{GetHistoryUseCase, SessionHistory};
pub use select_region::{SelectRegionRequest, SelectRegionUseCase};
pub use start_session::{StartSessionResponse, StartSessionUseCase};
