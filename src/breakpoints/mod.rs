//! Per-source-file breakpoint bookkeeping. Pure container code; never
//! touches runtime state.

mod file;

pub use file::{Breakpoint, SourceFile};

use serde::Serialize;
use tracing::debug;

/// The set of tracked source files, looked up case-insensitively by name.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SourceRegistry {
    files: Vec<SourceFile>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks the file up by name, creating it on first request.
    pub fn get_or_create(&mut self, name: &str) -> &mut SourceFile {
        let index = match self.position(name) {
            Some(index) => index,
            None => {
                self.files.push(SourceFile::new(name));
                self.files.len() - 1
            }
        };
        &mut self.files[index]
    }

    pub fn find(&self, name: &str) -> Option<&SourceFile> {
        self.position(name).map(|i| &self.files[i])
    }

    pub fn find_mut(&mut self, name: &str) -> Option<&mut SourceFile> {
        match self.position(name) {
            Some(index) => Some(&mut self.files[index]),
            None => None,
        }
    }

    /// The breakpoint at (file, line), if both exist.
    pub fn breakpoint_at(&self, name: &str, line: u32) -> Option<&Breakpoint> {
        self.find(name).and_then(|f| f.get(line))
    }

    pub fn add_breakpoint(&mut self, name: &str, line: u32) -> &mut Breakpoint {
        debug!(file = name, line, "breakpoint added");
        self.get_or_create(name).add(line)
    }

    /// No-op when the file or the breakpoint does not exist.
    pub fn remove_breakpoint(&mut self, name: &str, line: u32) {
        if let Some(file) = self.find_mut(name) {
            debug!(file = name, line, "breakpoint removed");
            file.remove(line);
        }
    }

    pub fn files(&self) -> impl Iterator<Item = &SourceFile> {
        self.files.iter()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.files
            .iter()
            .position(|f| f.name().eq_ignore_ascii_case(name))
    }
}
