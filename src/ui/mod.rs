//! UI Module
//!
//! This module exports the UI components for the FinScale CLI:
//!
//! - `app`: Application state and event loop
//! - `form`: Posting form state, validation and submit cycle
//! - `theme`: Shared colours
//! - `views`: Rendering functions for all UI views

mod app;
mod form;
mod theme;
mod views;

pub use app::{run_app, Action, App, Completion, Health, View, ACCOUNTS_KEY};
pub use form::{Field, FieldError, PostingForm, PostingLine, SubmitState};
pub use theme::Theme;
pub use views::draw;
