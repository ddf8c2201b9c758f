//! npm test script detection.

use std::path::Path;

use serde_json::Value;
use uifix_core::{Result, UifixError};

/// Scripts tried in order of preference.
const SCRIPT_PREFERENCE: [&str; 2] = ["ui-test", "test"];

/// Pick the npm script that runs the UI tests: `ui-test` when present as
/// a string, else `test`.
pub fn detect_test_script(package_json: &Value) -> Option<&'static str> {
    let scripts = package_json.get("scripts")?;
    SCRIPT_PREFERENCE
        .into_iter()
        .find(|name| scripts.get(*name).map(Value::is_string).unwrap_or(false))
}

/// Read and parse `<root>/package.json`.
pub fn read_package_json(root: &Path) -> Result<Value> {
    let path = root.join("package.json");
    let raw = std::fs::read_to_string(&path).map_err(|e| UifixError::ManifestRead {
        path: path.clone(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| UifixError::ManifestRead {
        path,
        reason: e.to_string(),
    })
}

/// Shell command that runs the whole suite for the workspace at `root`.
pub fn suite_command(root: &Path) -> Result<String> {
    let package_json = read_package_json(root)?;
    let script = detect_test_script(&package_json).ok_or_else(|| UifixError::NoTestScript {
        root: root.to_path_buf(),
    })?;
    Ok(format!("npm run {script} --silent"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prefers_ui_test() {
        let pkg = json!({"scripts": {"test": "mocha", "ui-test": "extest setup-and-run"}});
        assert_eq!(detect_test_script(&pkg), Some("ui-test"));
    }

    #[test]
    fn test_falls_back_to_test() {
        let pkg = json!({"scripts": {"test": "mocha"}});
        assert_eq!(detect_test_script(&pkg), Some("test"));
    }

    #[test]
    fn test_ignores_non_string_scripts() {
        let pkg = json!({"scripts": {"ui-test": 1, "test": null}});
        assert_eq!(detect_test_script(&pkg), None);
        assert_eq!(detect_test_script(&json!({})), None);
    }

    #[test]
    fn test_suite_command_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            suite_command(dir.path()),
            Err(UifixError::ManifestRead { .. })
        ));

        std::fs::write(dir.path().join("package.json"), r#"{"scripts":{}}"#).unwrap();
        assert!(matches!(
            suite_command(dir.path()),
            Err(UifixError::NoTestScript { .. })
        ));

        std::fs::write(
            dir.path().join("package.json"),
            r#"{"scripts":{"ui-test":"extest"}}"#,
        )
        .unwrap();
        assert_eq!(suite_command(dir.path()).unwrap(), "npm run ui-test --silent");
    }
}
