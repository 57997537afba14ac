pub mod config;
pub mod container;
pub mod external_services;
pub mod file_system;
pub mod session;
