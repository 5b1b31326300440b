//! Copyright 2024 JaCarta tester developers

pub mod actions;
pub mod commands;
pub mod config;
pub mod error;

pub use commands::jacarta_main;
