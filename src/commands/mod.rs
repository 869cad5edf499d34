pub mod completions;
pub mod config;
pub mod persona;
pub mod session;
