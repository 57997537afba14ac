pub mod response_dto;
pub mod session_dto;

pub use response_dto::*;
pub use session_dto::*;
