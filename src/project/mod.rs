//! Projects: documents, their persisted stores and the collection manager

pub mod document;
mod manager;
pub mod migrate;
mod store;

pub use document::{DocumentVersion, Editor, ImportedDocument, Page, ProjectState, Tab};
pub use manager::ProjectManager;
pub use store::{ProjectStore, StoreStatus, resolve_key};
