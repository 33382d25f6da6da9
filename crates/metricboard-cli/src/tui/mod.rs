//! Terminal dashboard.

pub mod app;
pub mod demo;
pub mod ui;
