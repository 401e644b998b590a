//! Per-scope step counting and the names derived from it.

/// Monotonic counter advanced once per wrapped call, never by artifact saves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepCounter {
    value: u64,
}

impl StepCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments and returns the new value, so the first call sees 1.
    pub fn advance(&mut self) -> u64 {
        self.value += 1;
        self.value
    }

    pub fn current(&self) -> u64 {
        self.value
    }
}

/// How an artifact filename is derived from its logical name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Naming {
    /// `<name>.<ext>`
    #[default]
    Plain,
    /// `<step>_<name>.<ext>`, step zero-padded to two digits.
    StepPrefixed,
}

pub fn artifact_file_name(naming: Naming, step: u64, name: &str, ext: &str) -> String {
    match naming {
        Naming::Plain => format!("{name}.{ext}"),
        Naming::StepPrefixed => format!("{step:02}_{name}.{ext}"),
    }
}

/// Entry key for the `step`-th wrapped call of `name`.
pub fn call_label(name: &str, step: u64) -> String {
    format!("{name}_{step}")
}

/// Scope names become directory names, so they must be one plain path segment.
pub fn validate_segment(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name == "." || name == ".." {
        return Err("name refers to a relative directory");
    }
    if name.contains(['/', '\\']) {
        return Err("name contains a path separator");
    }
    if name.contains('\0') {
        return Err("name contains a NUL byte");
    }
    Ok(())
}
