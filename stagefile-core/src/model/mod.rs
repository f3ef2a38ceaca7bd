pub use stage::Stage;
pub use task::Task;

pub mod stage;
pub mod task;

/// A decoded pipeline: stages in declaration order.
#[derive(Clone, PartialEq, Eq, Default, Debug)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub(crate) fn new(stages: Vec<Stage>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// First stage declared with `name`. Stage names are not required to be unique.
    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Number of tasks across all stages.
    pub fn task_count(&self) -> usize {
        self.stages.iter().map(|stage| stage.tasks().len()).sum()
    }
}
