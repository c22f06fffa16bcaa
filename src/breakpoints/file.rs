use serde::Serialize;

/// A (line, enabled) marker inside one source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Breakpoint {
    pub line: u32,
    pub enabled: bool,
}

impl Breakpoint {
    pub(crate) fn new(line: u32) -> Self {
        Self {
            line,
            enabled: true,
        }
    }
}

/// One tracked source file and the breakpoints it owns.
///
/// Created on the first breakpoint request for its name and never implicitly
/// destroyed. Breakpoints are kept in insertion order, unique by line.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    name: String,
    breakpoints: Vec<Breakpoint>,
}

impl SourceFile {
    pub(crate) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            breakpoints: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Adds a breakpoint at `line`. Re-adding an existing line re-enables it
    /// instead of duplicating.
    pub fn add(&mut self, line: u32) -> &mut Breakpoint {
        let index = match self.breakpoints.iter().position(|b| b.line == line) {
            Some(index) => {
                self.breakpoints[index].enabled = true;
                index
            }
            None => {
                self.breakpoints.push(Breakpoint::new(line));
                self.breakpoints.len() - 1
            }
        };
        &mut self.breakpoints[index]
    }

    /// Removes the breakpoint at `line`; removing a nonexistent breakpoint
    /// is a no-op.
    pub fn remove(&mut self, line: u32) {
        self.breakpoints.retain(|b| b.line != line);
    }

    pub fn get(&self, line: u32) -> Option<&Breakpoint> {
        self.breakpoints.iter().find(|b| b.line == line)
    }

    pub fn get_mut(&mut self, line: u32) -> Option<&mut Breakpoint> {
        self.breakpoints.iter_mut().find(|b| b.line == line)
    }

    /// Creates the breakpoint if absent, removes it if present. Returns the
    /// created breakpoint, or `None` when one was removed.
    pub fn toggle(&mut self, line: u32) -> Option<&Breakpoint> {
        if self.get(line).is_some() {
            self.remove(line);
            None
        } else {
            Some(&*self.add(line))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }
}
