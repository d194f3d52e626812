//! Command-line and interactive front end for the incident desk.

pub mod app;
pub mod cli;
pub mod config;
pub mod render;
pub mod shell;
