use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, trace};

use crate::{
    config,
    error::{DecodeError, Position},
    model::{Pipeline, Stage, Task},
};

const STAGE: &str = "stage";
const TASK: &str = "task";
const NAME: &str = "name";
const CMD: &str = "cmd";

impl TryFrom<config::Body> for Pipeline {
    type Error = DecodeError;

    fn try_from(document: config::Body) -> Result<Self, Self::Error> {
        reject_attributes(&document.attributes, "at the top level")?;

        let stages = document
            .blocks
            .into_iter()
            .map(|block| {
                expect_block_type(&block, STAGE, "at the top level")?;
                Stage::try_from(block)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Decoded pipeline with {} stage(s)", stages.len());
        Ok(Pipeline::new(stages))
    }
}

impl TryFrom<config::Block> for Stage {
    type Error = DecodeError;

    fn try_from(mut block: config::Block) -> Result<Self, Self::Error> {
        let name = take_name(&mut block, STAGE)?;
        reject_attributes(&block.body.attributes, &format!("in `stage` block `{name}`"))?;

        let tasks = block
            .body
            .blocks
            .into_iter()
            .map(|task| {
                expect_block_type(&task, TASK, &format!("in `stage` block `{name}`"))?;
                Task::try_from(task)
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!("Decoded stage `{name}` with {} task(s)", tasks.len());
        Ok(Stage::new(name, tasks))
    }
}

impl TryFrom<config::Block> for Task {
    type Error = DecodeError;

    fn try_from(mut block: config::Block) -> Result<Self, Self::Error> {
        let name = take_name(&mut block, TASK)?;
        let cmd = block
            .body
            .attributes
            .shift_remove(CMD)
            .ok_or_else(|| missing_attribute(block.position, TASK, CMD))
            .and_then(|attribute| expect_string(attribute, CMD))?;

        reject_attributes(&block.body.attributes, &format!("in `task` block `{name}`"))?;
        if let Some(nested) = block.body.blocks.first() {
            return Err(DecodeError::syntax(
                nested.position,
                format!("Unexpected `{}` block in `task` block `{name}`", nested.ty),
            ));
        }

        trace!("Decoded task `{name}`: {cmd}");
        Ok(Task::new(name, cmd))
    }
}

/// A block is named by its single label or, failing that, by a `name` attribute.
fn take_name(block: &mut config::Block, ty: &'static str) -> Result<String, DecodeError> {
    if let Some(extra) = block.labels.get(1) {
        return Err(DecodeError::syntax(
            extra.position,
            format!("`{ty}` block takes a single label"),
        ));
    }

    let attribute = block.body.attributes.shift_remove(NAME);
    let name = match (block.labels.pop(), attribute) {
        (Some(label), None) => label.value,
        (None, Some(attribute)) => expect_string(attribute, NAME)?,
        (Some(_), Some(attribute)) => {
            return Err(DecodeError::syntax(
                attribute.position,
                format!("`{ty}` block is named by both a label and a `name` attribute"),
            ));
        }
        (None, None) => return Err(missing_attribute(block.position, ty, NAME)),
    };

    if ty == STAGE && name.is_empty() {
        return Err(missing_attribute(block.position, ty, NAME));
    }
    Ok(name)
}

fn expect_string(attribute: config::Attribute, name: &str) -> Result<String, DecodeError> {
    match attribute.value {
        config::Value::String(value) => Ok(value),
        other => Err(DecodeError::UnexpectedAttributeType {
            position: attribute.value_position,
            attribute: name.to_owned(),
            found: other.kind(),
        }),
    }
}

fn expect_block_type(
    block: &config::Block,
    expected: &str,
    context: &str,
) -> Result<(), DecodeError> {
    if block.ty == expected {
        Ok(())
    } else {
        Err(DecodeError::syntax(
            block.position,
            format!(
                "Unexpected `{}` block {context}, expected `{expected}`",
                block.ty
            ),
        ))
    }
}

fn reject_attributes(
    attributes: &IndexMap<String, config::Attribute>,
    context: &str,
) -> Result<(), DecodeError> {
    let Some((_, first)) = attributes.first() else {
        return Ok(());
    };

    let noun = if attributes.len() == 1 {
        "attribute"
    } else {
        "attributes"
    };
    Err(DecodeError::syntax(
        first.position,
        format!(
            "Unsupported {noun} {} {context}",
            attributes.keys().map(|key| format!("`{key}`")).join(", ")
        ),
    ))
}

fn missing_attribute(position: Position, block: &'static str, attribute: &'static str) -> DecodeError {
    DecodeError::MissingRequiredAttribute {
        position,
        block,
        attribute,
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;
    use crate::{config::ValueKind, decode_str};

    fn syntax_message(source: &str) -> String {
        match decode_str(source).unwrap_err() {
            DecodeError::MalformedSyntax { message, .. } => message,
            other => panic!("Expected a syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_build_and_deploy() {
        let pipeline = decode_str(
            r#"
stage "build" {
  task "compile" { cmd = "go build main.go" }
  task "test" { cmd = "go test -v" }
}
stage "deploy" {
  task "deploy" { cmd = "kubectl deploy -f deployment.yaml" }
}
"#,
        )
        .unwrap();

        assert_eq!(2, pipeline.stages().len());

        let build = &pipeline.stages()[0];
        assert_eq!("build", build.name());
        assert_eq!(2, build.tasks().len());
        assert_eq!("compile", build.tasks()[0].name());
        assert_eq!("go build main.go", build.tasks()[0].cmd());
        assert_eq!("test", build.tasks()[1].name());
        assert_eq!("go test -v", build.tasks()[1].cmd());

        let deploy = &pipeline.stages()[1];
        assert_eq!("deploy", deploy.name());
        assert_eq!(1, deploy.tasks().len());
        assert_eq!("deploy", deploy.tasks()[0].name());
        assert_eq!("kubectl deploy -f deployment.yaml", deploy.tasks()[0].cmd());
    }

    #[test]
    fn test_empty_document() {
        let pipeline = decode_str("").unwrap();
        assert!(pipeline.is_empty());
        assert_eq!(0, pipeline.task_count());
    }

    #[test]
    fn test_empty_stage() {
        let pipeline = decode_str(r#"stage "noop" {}"#).unwrap();
        assert_eq!("noop", pipeline.stages()[0].name());
        assert!(pipeline.stages()[0].tasks().is_empty());
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let pipeline = decode_str(
            r#"
stage "c" { task "3" { cmd = "c3" } task "1" { cmd = "c1" } }
stage "a" {}
stage "b" { task "2" { cmd = "b2" } }
"#,
        )
        .unwrap();

        assert_eq!(
            vec!["c", "a", "b"],
            pipeline.stages().iter().map(Stage::name).collect::<Vec<_>>()
        );
        assert_eq!(
            vec!["3", "1"],
            pipeline.stages()[0]
                .tasks()
                .iter()
                .map(Task::name)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_duplicate_stage_names_are_kept() {
        let pipeline = decode_str(r#"stage "a" {} stage "a" { task "t" { cmd = "x" } }"#).unwrap();
        assert_eq!(2, pipeline.stages().len());
        assert!(pipeline.stage("a").unwrap().tasks().is_empty());
    }

    #[test]
    fn test_name_attribute() {
        let pipeline = decode_str(
            r#"
stage {
  name = "build"
  task {
    name = "compile"
    cmd  = "make"
  }
}
"#,
        )
        .unwrap();

        let task = pipeline.stage("build").unwrap().task("compile").unwrap();
        assert_eq!("make", task.cmd());
    }

    #[test]
    fn test_missing_cmd() {
        assert_matches!(
            decode_str("stage \"build\" {\n  task \"compile\" {}\n}"),
            Err(DecodeError::MissingRequiredAttribute {
                position: Position { line: 2, column: 3 },
                block: "task",
                attribute: "cmd",
            })
        );
    }

    #[test]
    fn test_missing_stage_label() {
        assert_matches!(
            decode_str("stage {\n  task \"compile\" { cmd = \"make\" }\n}"),
            Err(DecodeError::MissingRequiredAttribute {
                position: Position { line: 1, column: 1 },
                block: "stage",
                attribute: "name",
            })
        );
    }

    #[test]
    fn test_missing_task_label() {
        assert_matches!(
            decode_str(r#"stage "build" { task { cmd = "make" } }"#),
            Err(DecodeError::MissingRequiredAttribute {
                block: "task",
                attribute: "name",
                ..
            })
        );
    }

    #[test]
    fn test_empty_name() {
        assert_matches!(
            decode_str(r#"stage "" {}"#),
            Err(DecodeError::MissingRequiredAttribute {
                block: "stage",
                attribute: "name",
                ..
            })
        );
    }

    #[test]
    fn test_empty_task_name_is_allowed() {
        let pipeline = decode_str(r#"stage "s" { task "" { cmd = "x" } }"#).unwrap();
        let task = pipeline.stages()[0].task("").unwrap();
        assert_eq!("x", task.cmd());
    }

    #[test]
    fn test_empty_cmd_is_allowed() {
        let pipeline = decode_str(r#"stage "s" { task "t" { cmd = "" } }"#).unwrap();
        assert_eq!("", pipeline.stages()[0].tasks()[0].cmd());
    }

    #[test]
    fn test_cmd_must_be_a_string() {
        let value_position = Position { line: 1, column: 30 };
        for (value, kind) in [
            ("42", ValueKind::Number),
            ("true", ValueKind::Bool),
            ("make", ValueKind::Identifier),
            (r#"["make", "all"]"#, ValueKind::List),
        ] {
            let source = format!("stage \"s\" {{ task \"t\" {{ cmd = {value} }} }}");
            assert_matches!(
                decode_str(&source),
                Err(DecodeError::UnexpectedAttributeType { attribute, found, position })
                    if attribute == "cmd" && found == kind && position == value_position
            );
        }
    }

    #[test]
    fn test_name_attribute_must_be_a_string() {
        assert_matches!(
            decode_str("stage { name = 1 }"),
            Err(DecodeError::UnexpectedAttributeType { attribute, found: ValueKind::Number, .. })
                if attribute == "name"
        );
    }

    #[test]
    fn test_no_partial_pipeline_on_late_error() {
        let result = decode_str(
            r#"
stage "build" { task "compile" { cmd = "make" } }
stage "deploy" { task "ship" {} }
"#,
        );
        assert_matches!(result, Err(DecodeError::MissingRequiredAttribute { .. }));
    }

    #[test]
    fn test_label_and_name_attribute() {
        assert_eq!(
            "`stage` block is named by both a label and a `name` attribute",
            syntax_message(r#"stage "a" { name = "b" }"#)
        );
    }

    #[test]
    fn test_multiple_labels() {
        assert_eq!(
            "`task` block takes a single label",
            syntax_message(r#"stage "a" { task "b" "c" { cmd = "x" } }"#)
        );
    }

    #[test]
    fn test_unknown_top_level_block() {
        assert_eq!(
            "Unexpected `task` block at the top level, expected `stage`",
            syntax_message(r#"task "t" { cmd = "x" }"#)
        );
    }

    #[test]
    fn test_top_level_attribute() {
        assert_eq!(
            "Unsupported attribute `version` at the top level",
            syntax_message(r#"version = "1""#)
        );
    }

    #[test]
    fn test_unknown_stage_attributes() {
        assert_eq!(
            "Unsupported attributes `when`, `retry` in `stage` block `build`",
            syntax_message(r#"stage "build" { when = "always" retry = 2 }"#)
        );
    }

    #[test]
    fn test_unknown_block_in_stage() {
        assert_eq!(
            "Unexpected `stage` block in `stage` block `build`, expected `task`",
            syntax_message(r#"stage "build" { stage "inner" {} }"#)
        );
    }

    #[test]
    fn test_unknown_task_attribute() {
        assert_eq!(
            "Unsupported attribute `shell` in `task` block `t`",
            syntax_message(r#"stage "s" { task "t" { cmd = "x" shell = "bash" } }"#)
        );
    }

    #[test]
    fn test_block_inside_task() {
        assert_eq!(
            "Unexpected `env` block in `task` block `t`",
            syntax_message(r#"stage "s" { task "t" { cmd = "x" env {} } }"#)
        );
    }
}
