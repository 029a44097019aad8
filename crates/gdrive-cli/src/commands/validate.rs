//! Build every component of a manifest without running any of them

use crate::error::{CliError, CliResult};
use crate::manifest::Manifest;
use crate::utils::ColoredOutput;
use std::path::Path;
use tracing::warn;

pub struct ValidateCommand;

impl ValidateCommand {
    pub fn run(manifest_path: &Path) -> CliResult<()> {
        let manifest = Manifest::load(manifest_path)?;
        if manifest.components.is_empty() {
            println!("{}", ColoredOutput::info("No components declared"));
            return Ok(());
        }

        let failures = Self::check(&manifest);
        for name in manifest.components.keys() {
            match failures.iter().find(|(failed, _)| failed == name) {
                Some((_, error)) => println!("{} {}: {}", ColoredOutput::error("✗"), name, error),
                None => println!("{} {}", ColoredOutput::success("✓"), name),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(CliError::ValidationFailed(failures.len()))
        }
    }

    /// Names and errors of the components that fail to build
    pub fn check(manifest: &Manifest) -> Vec<(String, CliError)> {
        manifest
            .components
            .keys()
            .filter_map(|name| match manifest.build(name) {
                Ok(_) => None,
                Err(e) => {
                    warn!(component = %name, error = %e, "component failed to build");
                    Some((name.clone(), e))
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reports_broken_components() {
        let manifest = Manifest::from_value(json!({
            "configuration": { "access_token": "t" },
            "components": {
                "ok": { "type": "drive.file.delete" },
                "bad-script": { "type": "drive.file.delete", "fileId": "#[message.body]" },
                "bad-page": { "type": "drive.file.list", "pageSize": 5000 }
            }
        }))
        .unwrap();

        let failures = ValidateCommand::check(&manifest);
        let names: Vec<&str> = failures.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["bad-page", "bad-script"]);
    }
}
