// Expose modules for testing
pub mod bus;
pub mod cli;
pub mod domain;
pub mod preflight;
pub mod process;
pub mod scheduler;
pub mod sink;
pub mod tla;
pub mod trace;
