pub mod errors;
pub mod ports;
pub mod services;
pub mod session_state;
pub mod use_cases;
