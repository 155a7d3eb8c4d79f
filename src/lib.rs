#![forbid(unsafe_code)]

//! Editor state for a screenshot/code-image tool: preview settings with
//! derived fields, and a persisted, ordered collection of projects (tabs).

pub mod cli;
pub mod color;
pub mod config;
pub mod constants;
pub mod debounce;
pub mod dialog;
pub mod notify;
pub mod project;
pub mod settings;
pub mod storage;
