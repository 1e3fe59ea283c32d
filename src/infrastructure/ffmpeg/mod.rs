pub mod command;
pub mod probe;
pub mod progress;
pub mod runner;
