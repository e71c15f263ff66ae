//! egui rendering. Reads [`AppState`](crate::state::AppState) and forwards
//! user input back to it; no analytics happen here.

pub mod panels;
pub mod plot;
