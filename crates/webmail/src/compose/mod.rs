//! Compose window and draft lifecycle

mod controller;

pub use controller::{ComposeController, ComposeWindowState};
