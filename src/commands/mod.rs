//! # Handlers de las Rutas
//! src/commands/mod.rs
//!
//! Cada handler produce una [`Response`](crate::http::Response) completa;
//! el router decide cuál invocar.
//!
//! - `pages`: índice, redirección y DELETE prohibido
//! - `multiply`: POST /multiply
//! - `files`: lectura de archivos estáticos

pub mod files;
pub mod multiply;
pub mod pages;

pub use files::{DiskFileStore, FileStore};
pub use multiply::{MultiplyError, MultiplyHandler};
pub use pages::{forbidden_handler, index_handler, redirect_handler};
