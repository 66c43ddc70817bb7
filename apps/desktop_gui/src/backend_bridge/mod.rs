//! Bridge between the UI thread and the background fetch worker.

pub mod commands;
pub mod runtime;
