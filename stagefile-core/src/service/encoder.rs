use std::fmt::{self, Write};

use crate::model::{Pipeline, Stage, Task};

const INDENT: &str = "  ";

/// Write `pipeline` back as config source. Decoding the result yields an equal pipeline.
pub fn encode(pipeline: &Pipeline) -> String {
    pipeline.to_string()
}

impl fmt::Display for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, stage) in self.stages().iter().enumerate() {
            if index > 0 {
                f.write_char('\n')?;
            }
            write_stage(f, stage)?;
        }
        Ok(())
    }
}

fn write_stage(f: &mut fmt::Formatter<'_>, stage: &Stage) -> fmt::Result {
    f.write_str("stage ")?;
    write_quoted(f, stage.name())?;
    f.write_str(" {\n")?;
    for task in stage.tasks() {
        write_task(f, task)?;
    }
    f.write_str("}\n")
}

fn write_task(f: &mut fmt::Formatter<'_>, task: &Task) -> fmt::Result {
    write!(f, "{INDENT}task ")?;
    write_quoted(f, task.name())?;
    f.write_str(" {\n")?;
    write!(f, "{INDENT}{INDENT}cmd = ")?;
    write_quoted(f, task.cmd())?;
    writeln!(f, "\n{INDENT}}}")
}

fn write_quoted(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    f.write_char('"')?;
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            c if c.is_control() => write!(f, "\\u{:04x}", u32::from(c))?,
            c => f.write_char(c)?,
        }
    }
    f.write_char('"')
}
