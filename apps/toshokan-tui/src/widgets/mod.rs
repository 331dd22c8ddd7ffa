//! TUI widgets

mod edit_form;
mod mode_indicator;

pub use edit_form::EditForm;
pub use mode_indicator::ModeIndicator;
