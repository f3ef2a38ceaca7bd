use std::fmt::{self, Display};

use stagefile_core::Pipeline;

/// Tree rendering of a decoded pipeline, one line per stage and per task.
pub struct Summary<'a>(pub &'a Pipeline);

impl Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pipeline:")?;
        writeln!(f, "  Stages:")?;
        for stage in self.0.stages() {
            writeln!(f, "  - {}:", stage.name())?;
            writeln!(f, "    Tasks:")?;
            for task in stage.tasks() {
                writeln!(f, "    - {}: {}", task.name(), task.cmd())?;
            }
        }
        Ok(())
    }
}
