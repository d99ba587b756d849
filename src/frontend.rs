//! Serves the built single-page frontend.

use std::path::Path;

use tower_http::services::{ServeDir, ServeFile};

/// Serve the files in `frontend_dir`, responding with its `index.html` for
/// any path that does not match a file so that client-side routing works.
pub fn frontend_service(frontend_dir: &Path) -> ServeDir<ServeFile> {
    ServeDir::new(frontend_dir).fallback(ServeFile::new(frontend_dir.join("index.html")))
}
