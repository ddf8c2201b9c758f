//! Prompt builders for the generator.

use crate::domain::proposal::TestProposal;
use crate::manifest::ManifestContext;

/// Inputs shared by both fix prompts.
#[derive(Debug, Clone, Copy)]
pub struct FixPromptInput<'a> {
    /// Captured failure output (title, message and stack of one failure).
    pub failing_output: &'a str,
    pub file_path: Option<&'a str>,
    pub current_content: Option<&'a str>,
    pub manifest: &'a ManifestContext,
}

impl FixPromptInput<'_> {
    fn input_section(&self) -> String {
        let mut section = format!("Failure output:\n{}\n", self.failing_output);
        if let Some(path) = self.file_path {
            section.push_str(&format!("\nFailing file path: {path}\n"));
        }
        if let Some(content) = self.current_content {
            section.push_str(&format!("\nCurrent test file content:\n\n{content}\n"));
        }
        section.push_str(&format!(
            "\nExtension context:\n{}\n",
            self.manifest.to_pretty_json()
        ));
        section
    }
}

/// Prompt asking for a JSON array of UI test proposals.
pub fn proposal_prompt(manifest: &ManifestContext) -> String {
    format!(
        r#"You generate UI test proposals for VS Code extensions.

## Objective
Study the extension manifest below and propose UI tests that together give strong coverage of its user-facing surface.

## Input
Extension context (package.json):
{manifest}

## Output
Return only a JSON array, nothing else. Each element is an object with exactly these keys:
- "category": string, the UI area or functional group (for example "views", "commands", "menus", "settings", "dialogs"), never a testing level
- "test-name": string, a short camelCase identifier
- "description": string, what the test verifies
- "cover": array of strings, the commands, features or code areas exercised

## Example
[
  {{
    "category": "commands",
    "test-name": "newProjectCommandCreatesFolder",
    "description": "Runs the new-project command from the palette and checks the folder appears.",
    "cover": ["extension.newProject"]
  }}
]
"#,
        manifest = manifest.to_pretty_json()
    )
}

/// Prompt asking for a complete ExTester file implementing one proposal.
pub fn test_file_prompt(proposal: &TestProposal, manifest: &ManifestContext) -> String {
    let cover = proposal.cover.join(", ");
    format!(
        r#"You write TypeScript UI tests for VS Code extensions with the ExTester framework (vscode-extension-tester).

## Objective
Write a complete, runnable test file for this proposal.

## Proposal
- Name: {name}
- Category: {category}
- Description: {description}
- Coverage: {cover}

Extension context:
{manifest}

## Requirements
Output only the TypeScript file content, without markdown or explanations. The file must:
- import from `vscode-extension-tester` (VSBrowser, WebDriver, Workbench, ...) and use `chai.expect`
- use async/await throughout
- set up in `before` and clean up in `after` where needed
- contain a single `it()` block implementing the scenario with realistic UI interactions and assertions
- compile as is

## Skeleton
import {{ VSBrowser, WebDriver, Workbench }} from 'vscode-extension-tester';
import {{ expect }} from 'chai';

describe('{category} - {name}', () => {{
    let driver: WebDriver;
    let workbench: Workbench;

    before(async function () {{
        this.timeout(30000);
        driver = VSBrowser.instance.driver;
        workbench = new Workbench();
    }});

    it('{description}', async function () {{
        this.timeout(20000);
    }});
}});
"#,
        name = proposal.test_name,
        category = proposal.category,
        description = proposal.description,
        cover = cover,
        manifest = manifest.to_pretty_json()
    )
}

/// General fix prompt, used for compilation-only failures.
pub fn fix_failing_test_prompt(input: &FixPromptInput<'_>) -> String {
    format!(
        r#"You repair TypeScript UI tests written with the ExTester framework for VS Code.

## Objective
The test below fails. Produce a corrected, runnable version of the whole file.

## Input
{input}
## Task
- Work out the cause from the failure output and the current content.
- Rewrite the entire file so it compiles and the scenario holds.
- Keep valid `vscode-extension-tester` and assertion imports.

## Output
Return only the full corrected TypeScript file, with no markdown and no explanations.
"#,
        input = input.input_section()
    )
}

/// Runtime fix prompt, focused on waits, locators and flakiness.
pub fn fix_runtime_failure_prompt(input: &FixPromptInput<'_>) -> String {
    format!(
        r#"You repair TypeScript UI tests written with the ExTester framework for VS Code.

## Objective
The test compiles but fails while running (timeouts, missing or stale elements, navigation, WebDriver errors).
Produce a stable, runnable version of the whole file that removes the runtime cause.

## Input
{input}
## Requirements
- Wait until the Workbench is ready before interacting with it.
- Open the right view or panel (ActivityBar, SideBarView, ViewControl) before locating elements.
- Prefer stable locators such as ids and labels over display text.
- Add explicit waits with sensible timeouts around elements and state changes.
- Retry flaky steps by locating the element again.
- Trigger activation events or commands the assertions depend on.
- Keep imports to `vscode-extension-tester` and `chai.expect`.
- Keep the scenario's intent.

## Output
Return only the full corrected TypeScript file, with no markdown and no explanations.
"#,
        input = input.input_section()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn manifest() -> ManifestContext {
        ManifestContext::new(json!({"extensionId": "acme.ext"}))
    }

    #[test]
    fn test_proposal_prompt_embeds_manifest() {
        let prompt = proposal_prompt(&manifest());
        assert!(prompt.contains("\"extensionId\": \"acme.ext\""));
        assert!(prompt.contains("\"test-name\""));
    }

    #[test]
    fn test_file_prompt_names_proposal() {
        let proposal = TestProposal {
            category: "views".into(),
            test_name: "welcomeViewOpens".into(),
            description: "opens the welcome view".into(),
            cover: vec!["viewsWelcome".into(), "explorer".into()],
        };
        let prompt = test_file_prompt(&proposal, &manifest());
        assert!(prompt.contains("describe('views - welcomeViewOpens'"));
        assert!(prompt.contains("Coverage: viewsWelcome, explorer"));
    }

    #[test]
    fn test_fix_prompts_include_optional_sections() {
        let m = manifest();
        let full = FixPromptInput {
            failing_output: "TimeoutError: waiting",
            file_path: Some("src/ui-test/a.test.ts"),
            current_content: Some("describe('a')"),
            manifest: &m,
        };
        let runtime = fix_runtime_failure_prompt(&full);
        assert!(runtime.contains("Failing file path: src/ui-test/a.test.ts"));
        assert!(runtime.contains("describe('a')"));
        assert!(runtime.contains("fails while running"));

        let bare = FixPromptInput {
            file_path: None,
            current_content: None,
            ..full
        };
        let general = fix_failing_test_prompt(&bare);
        assert!(!general.contains("Failing file path"));
        assert!(!general.contains("Current test file content"));
        assert!(general.contains("TimeoutError: waiting"));
    }
}
