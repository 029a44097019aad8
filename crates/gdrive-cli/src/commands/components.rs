//! List the component types this build knows about

use crate::error::CliResult;
use crate::utils::ColoredOutput;
use gdrive_connectors::ComponentKind;
use serde_json::{json, Value as JsonValue};

pub struct ComponentsCommand;

impl ComponentsCommand {
    pub fn run(json: bool) -> CliResult<()> {
        if json {
            println!("{}", serde_json::to_string_pretty(&Self::to_json())?);
            return Ok(());
        }

        println!(
            "{:<30} {}",
            ColoredOutput::highlight("Type"),
            ColoredOutput::highlight("Description")
        );
        println!("{}", "-".repeat(90));
        for kind in ComponentKind::ALL {
            println!("{:<30} {}", kind.type_name(), ColoredOutput::dim(kind.description()));
        }
        Ok(())
    }

    fn to_json() -> JsonValue {
        json!({
            "components": ComponentKind::ALL.iter().map(|kind| {
                json!({
                    "type": kind.type_name(),
                    "operation": kind.operation().as_str(),
                    "description": kind.description()
                })
            }).collect::<Vec<_>>(),
            "count": ComponentKind::ALL.len()
        })
    }
}
