// UI module for SmartPlan
// Panels are rendered by methods on SmartPlanApp, split across files by area

pub mod labs;
pub mod tools;
pub mod types;
pub mod views;

// Re-export commonly used types for convenience
pub use types::{apply_style, AgendaForm, LabTextures, COPIED_INDICATOR};
