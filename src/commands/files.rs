//! # Almacén de Archivos Estáticos
//! src/commands/files.rs
//!
//! Capacidad mínima que usan las rutas `/` e `/index.html`: leer los bytes
//! de un archivo por path relativo. Que el archivo no exista o no se pueda
//! leer es un error que decide el handler.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Lectura de archivos por path relativo
pub trait FileStore: Send + Sync {
    fn read(&self, relative: &str) -> io::Result<Vec<u8>>;
}

/// Archivos en disco bajo un directorio raíz
#[derive(Debug, Clone)]
pub struct DiskFileStore {
    root: PathBuf,
}

impl DiskFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resuelve el path relativo; rechaza `..` y paths absolutos
    fn resolve(&self, relative: &str) -> io::Result<PathBuf> {
        let relative = Path::new(relative);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));

        if escapes {
            return Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                format!("path outside root: {}", relative.display()),
            ));
        }

        Ok(self.root.join(relative))
    }
}

impl FileStore for DiskFileStore {
    fn read(&self, relative: &str) -> io::Result<Vec<u8>> {
        std::fs::read(self.resolve(relative)?)
    }
}
