//! Flat-file document storage.
//!
//! Each document is one file in the configured directory, identified by its
//! filename. Only `.txt` and `.md` documents can be created; writes go
//! through a staging file and an atomic rename.

pub mod kind;
pub mod store;

pub use kind::DocumentKind;
pub use store::DocumentStore;
