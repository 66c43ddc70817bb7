//! UI layer for the desktop app: app shell, view-model, and post feed rendering.

pub mod app;

pub use app::{EmployeeBrowserApp, StartupConfig};
