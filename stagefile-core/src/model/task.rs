#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Task {
    name: String,
    cmd: String,
}

impl Task {
    pub(crate) fn new(name: String, cmd: String) -> Self {
        Self { name, cmd }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shell command, exactly as written in the config. It is never parsed or run here.
    pub fn cmd(&self) -> &str {
        &self.cmd
    }
}
