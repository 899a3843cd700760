// Core quiz logic: banks, normalization, sampling and the session state
// machine. The terminal front end lives in the binary (main.rs).
pub mod bank;
pub mod config;
pub mod engine;
pub mod session;
