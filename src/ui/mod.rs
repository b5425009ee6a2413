//! egui rendering for both applications.

pub mod editor;
pub mod panels;
pub mod plot;
