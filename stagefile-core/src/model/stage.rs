use super::task::Task;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Stage {
    name: String,
    tasks: Vec<Task>,
}

impl Stage {
    pub(crate) fn new(name: String, tasks: Vec<Task>) -> Self {
        Self { name, tasks }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tasks in declaration order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.name() == name)
    }
}
