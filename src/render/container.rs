use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::error::{AppError, Result};

/// The element generated markup is injected into.
pub trait Container: Send + Sync {
    /// Selector the container was resolved from, for logging.
    fn selector(&self) -> &str;

    /// Replaces the container's contents.
    fn set_inner_html(&self, html: &str) -> Result<()>;
}

/// Writes the fragment to a file a static page includes at build time.
pub struct FileContainer {
    selector: String,
    path: PathBuf,
}

impl FileContainer {
    pub fn new(selector: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            selector: selector.into(),
            path: path.into(),
        }
    }
}

impl Container for FileContainer {
    fn selector(&self) -> &str {
        &self.selector
    }

    fn set_inner_html(&self, html: &str) -> Result<()> {
        let parent_exists = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.is_dir(),
            _ => true,
        };
        if !parent_exists || self.path.is_dir() {
            return Err(AppError::MissingContainer(format!(
                "{} ({})",
                self.selector,
                self.path.display()
            )));
        }

        std::fs::write(&self.path, html)?;
        Ok(())
    }
}

/// Keeps the latest fragment in memory. Clones share the same contents.
#[derive(Clone, Default)]
pub struct MemoryContainer {
    selector: String,
    html: Arc<Mutex<Option<String>>>,
    detached: bool,
}

impl MemoryContainer {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            ..Default::default()
        }
    }

    /// A container whose element is absent from the page.
    pub fn detached(selector: impl Into<String>) -> Self {
        Self {
            detached: true,
            ..Self::new(selector)
        }
    }

    pub fn html(&self) -> Option<String> {
        self.html.lock().ok().and_then(|html| html.clone())
    }
}

impl Container for MemoryContainer {
    fn selector(&self) -> &str {
        &self.selector
    }

    fn set_inner_html(&self, html: &str) -> Result<()> {
        if self.detached {
            return Err(AppError::MissingContainer(self.selector.clone()));
        }

        let mut slot = self
            .html
            .lock()
            .map_err(|_| anyhow::anyhow!("container lock poisoned"))?;
        *slot = Some(html.to_string());
        Ok(())
    }
}
