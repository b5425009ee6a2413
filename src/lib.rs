//! Sales CSV dashboard and database table editor.
//!
//! The data layer (`data`, `db`, `editor`, `state`) is independent of egui;
//! `ui` and `app` render it.

pub mod app;
pub mod cli;
pub mod color;
pub mod data;
pub mod db;
pub mod editor;
pub mod state;
pub mod ui;
