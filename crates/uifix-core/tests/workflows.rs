//! End-to-end workflow behavior against in-memory collaborators.

use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use uifix_core::{
    ArtifactOutcome, CompilationOutcome, Generator, ManifestContext, Orchestrator,
    ProgressSink, ProgressUpdate, ProposalOutcome, RepairConfig, Result, TestDiscoverer,
    TestExecutor, TestRunResult, UifixError, Workspace, ERROR_SENTINEL,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

fn failing(stdout: &str) -> TestRunResult {
    TestRunResult::from_exit(Some(1), stdout.to_string(), String::new(), "fake", "/w")
}

fn passing() -> TestRunResult {
    TestRunResult::from_exit(Some(0), "1 passing".to_string(), String::new(), "fake", "/w")
}

#[derive(Default)]
struct ScriptedExecutor {
    suite: Mutex<VecDeque<Result<TestRunResult>>>,
    single: Mutex<HashMap<PathBuf, VecDeque<TestRunResult>>>,
    suite_calls: Mutex<usize>,
    single_calls: Mutex<Vec<PathBuf>>,
}

impl ScriptedExecutor {
    fn suite(self, runs: Vec<Result<TestRunResult>>) -> Self {
        *self.suite.lock().unwrap() = runs.into();
        self
    }

    fn single(self, path: &Path, runs: Vec<TestRunResult>) -> Self {
        self.single
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), runs.into());
        self
    }

    fn single_calls(&self) -> usize {
        self.single_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl TestExecutor for ScriptedExecutor {
    async fn run_all(&self) -> Result<TestRunResult> {
        *self.suite_calls.lock().unwrap() += 1;
        self.suite
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(passing()))
    }

    async fn run_one(&self, artifact: &Path) -> Result<TestRunResult> {
        self.single_calls.lock().unwrap().push(artifact.to_path_buf());
        let next = self
            .single
            .lock()
            .unwrap()
            .get_mut(artifact)
            .and_then(|q| q.pop_front());
        Ok(next.unwrap_or_else(passing))
    }
}

struct FixedDiscoverer {
    files: Vec<PathBuf>,
    calls: Mutex<usize>,
    /// Calls from this one on (1-based) return an error.
    fail_from: Option<usize>,
}

impl FixedDiscoverer {
    fn new(files: Vec<PathBuf>) -> Self {
        Self {
            files,
            calls: Mutex::new(0),
            fail_from: None,
        }
    }

    fn failing_from(files: Vec<PathBuf>, call: usize) -> Self {
        Self {
            fail_from: Some(call),
            ..Self::new(files)
        }
    }
}

#[async_trait]
impl TestDiscoverer for FixedDiscoverer {
    async fn discover(&self) -> Result<Vec<PathBuf>> {
        let mut calls = self.calls.lock().unwrap();
        *calls += 1;
        if self.fail_from.is_some_and(|n| *calls >= n) {
            return Err(UifixError::Discovery("walk interrupted".to_string()));
        }
        Ok(self.files.clone())
    }
}

#[derive(Default)]
struct ScriptedGenerator {
    chat: Mutex<VecDeque<String>>,
    code: Mutex<VecDeque<String>>,
    code_prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    fn chat(self, responses: &[&str]) -> Self {
        *self.chat.lock().unwrap() = responses.iter().map(|s| s.to_string()).collect();
        self
    }

    fn code(self, responses: &[&str]) -> Self {
        *self.code.lock().unwrap() = responses.iter().map(|s| s.to_string()).collect();
        self
    }

    fn code_calls(&self) -> usize {
        self.code_prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> String {
        self.chat.lock().unwrap().pop_front().unwrap_or_default()
    }

    async fn generate_code(&self, prompt: &str) -> String {
        self.code_prompts.lock().unwrap().push(prompt.to_string());
        self.code
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| "```ts\n// fixed\n```".to_string())
    }
}

#[derive(Default)]
struct RecordingProgress(Mutex<Vec<ProgressUpdate>>);

impl ProgressSink for RecordingProgress {
    fn report(&self, update: &ProgressUpdate) {
        self.0.lock().unwrap().push(update.clone());
    }
}

struct Harness {
    dir: tempfile::TempDir,
    executor: Arc<ScriptedExecutor>,
    discoverer: Arc<FixedDiscoverer>,
    generator: Arc<ScriptedGenerator>,
    progress: Arc<RecordingProgress>,
}

impl Harness {
    fn new(
        dir: tempfile::TempDir,
        executor: ScriptedExecutor,
        files: Vec<PathBuf>,
        generator: ScriptedGenerator,
    ) -> Self {
        Self {
            dir,
            executor: Arc::new(executor),
            discoverer: Arc::new(FixedDiscoverer::new(files)),
            generator: Arc::new(generator),
            progress: Arc::new(RecordingProgress::default()),
        }
    }

    fn orchestrator(&self, config: RepairConfig) -> Orchestrator {
        Orchestrator::new(
            Workspace::new(self.dir.path()),
            self.executor.clone(),
            self.discoverer.clone(),
            self.generator.clone(),
        )
        .with_progress(self.progress.clone())
        .with_manifest(ManifestContext::new(json!({"extensionId": "acme.ext"})))
        .with_config(config)
    }

    fn percentages(&self) -> Vec<u8> {
        self.progress
            .0
            .lock()
            .unwrap()
            .iter()
            .map(|u| u.percentage)
            .collect()
    }
}

const TWO_RUNTIME_FAILURES: &str = "  1) first\n  TimeoutError: waiting for element\n  2) second\n  NoSuchElementError: no such element\n";

// ---------------------------------------------------------------------------
// FixRuntimeFailures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn runtime_fix_stops_at_first_verified_fix() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("src/ui-test/a.test.ts");
    let executor = ScriptedExecutor::default()
        .single(&artifact, vec![failing(TWO_RUNTIME_FAILURES), passing()]);
    let h = Harness::new(dir, executor, vec![artifact.clone()], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_runtime_failures()
        .await
        .unwrap();

    assert_eq!(h.generator.code_calls(), 1, "second failure must not be attempted");
    assert_eq!(h.executor.single_calls(), 2, "one run plus one verification");
    assert_eq!(summary.fixed_count, 1);
    assert_eq!(summary.total_failures, 2);
    assert_eq!(summary.passing, vec!["src/ui-test/a.test.ts"]);
    assert!(summary.unresolved.is_empty());

    let written = std::fs::read_to_string(&artifact).unwrap();
    assert_eq!(written, "// fixed");
}

#[tokio::test]
async fn runtime_fix_exhausts_all_failures_then_marks_unresolved() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("src/ui-test/a.test.ts");
    let executor = ScriptedExecutor::default().single(
        &artifact,
        vec![
            failing(TWO_RUNTIME_FAILURES),
            failing(TWO_RUNTIME_FAILURES),
            failing(TWO_RUNTIME_FAILURES),
        ],
    );
    let h = Harness::new(dir, executor, vec![artifact], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_runtime_failures()
        .await
        .unwrap();

    assert_eq!(h.generator.code_calls(), 2);
    assert_eq!(h.executor.single_calls(), 3);
    assert_eq!(summary.fixed_count, 2);
    assert_eq!(summary.unresolved, vec!["src/ui-test/a.test.ts"]);
    assert!(summary.passing.is_empty());
}

#[tokio::test]
async fn runtime_fix_skips_compilation_only_failures() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("src/ui-test/a.test.ts");
    let executor = ScriptedExecutor::default().single(
        &artifact,
        vec![failing("src/ui-test/a.test.ts(3,1): error TS2304: Cannot find name 'x'.")],
    );
    let h = Harness::new(dir, executor, vec![artifact], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_runtime_failures()
        .await
        .unwrap();

    assert_eq!(h.generator.code_calls(), 0);
    assert_eq!(summary.skipped, vec!["src/ui-test/a.test.ts"]);
    assert!(summary.unresolved.is_empty());
    assert_eq!(summary.total_failures, 0);
}

#[tokio::test]
async fn runtime_fix_continues_after_empty_generation() {
    let dir = tempfile::tempdir().unwrap();
    let artifact = dir.path().join("src/ui-test/a.test.ts");
    let executor = ScriptedExecutor::default()
        .single(&artifact, vec![failing(TWO_RUNTIME_FAILURES), passing()]);
    let generator = ScriptedGenerator::default().code(&[ERROR_SENTINEL, "fixed"]);
    let h = Harness::new(dir, executor, vec![artifact], generator);

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_runtime_failures()
        .await
        .unwrap();

    assert_eq!(h.generator.code_calls(), 2);
    assert_eq!(h.executor.single_calls(), 2, "no verification after a failed fix");
    assert_eq!(summary.fixed_count, 1);
    assert_eq!(summary.passing.len(), 1);
}

#[tokio::test]
async fn runtime_fix_processes_artifacts_in_order_and_progress_is_monotonic() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("src/ui-test/a.test.ts");
    let b = dir.path().join("src/ui-test/b.test.ts");
    let c = dir.path().join("src/ui-test/c.test.ts");
    let executor = ScriptedExecutor::default()
        .single(&b, vec![failing(TWO_RUNTIME_FAILURES), failing("1) x\nTimeoutError: y"), failing("TimeoutError: y")]);
    let h = Harness::new(
        dir,
        executor,
        vec![a.clone(), b.clone(), c.clone()],
        ScriptedGenerator::default(),
    );

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_runtime_failures()
        .await
        .unwrap();

    let order: Vec<PathBuf> = h.executor.single_calls.lock().unwrap().clone();
    assert_eq!(order.first(), Some(&a));
    assert_eq!(order.last(), Some(&c));
    assert_eq!(summary.passing.len(), 2);
    assert_eq!(summary.unresolved, vec!["src/ui-test/b.test.ts"]);

    let pct = h.percentages();
    assert!(pct.windows(2).all(|w| w[0] <= w[1]), "progress went backwards: {pct:?}");
    assert_eq!(pct.last(), Some(&100));
}

#[tokio::test]
async fn runtime_fix_without_artifacts_reports_empty_summary() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(dir, ScriptedExecutor::default(), vec![], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_runtime_failures()
        .await
        .unwrap();

    assert_eq!(summary.discovered, 0);
    assert!(summary.to_string().contains("no UI test files discovered"));
    assert_eq!(h.executor.single_calls(), 0);
}

#[test]
fn artifact_outcome_labels() {
    assert_eq!(ArtifactOutcome::Resolved.as_str(), "resolved");
    assert_eq!(ArtifactOutcome::Exhausted.as_str(), "exhausted");
}

// ---------------------------------------------------------------------------
// FixCompilationIssues
// ---------------------------------------------------------------------------

#[tokio::test]
async fn compilation_fix_writes_cleaned_content_and_verifies() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("src/ui-test/a.test.ts");
    let b = dir.path().join("src/ui-test/b.test.ts");
    std::fs::create_dir_all(a.parent().unwrap()).unwrap();
    std::fs::write(&b, "const x: number = 'a';").unwrap();

    let executor = ScriptedExecutor::default().suite(vec![
        Ok(failing(
            "src/ui-test/b.test.ts(1,7): error TS2322: Type 'string' is not assignable to type 'number'.",
        )),
        Ok(passing()),
    ]);
    let generator = ScriptedGenerator::default().code(&["```typescript\nconst x: number = 1;\n```"]);
    let h = Harness::new(dir, executor, vec![a, b.clone()], generator);

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_compilation_issues()
        .await
        .unwrap();

    assert_eq!(summary.outcome, CompilationOutcome::Fixed);
    assert_eq!(
        summary.compilable,
        vec!["src/ui-test/a.test.ts", "src/ui-test/b.test.ts"]
    );
    assert!(summary.failing.is_empty());
    assert!(!summary.to_string().contains("Still failing"));
    assert_eq!(summary.fix_path.as_deref(), Some("src/ui-test/b.test.ts"));
    assert_eq!(std::fs::read_to_string(&b).unwrap(), "const x: number = 1;");

    let prompts = h.generator.code_prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("const x: number = 'a';"), "current content is sent");
    assert!(!prompts[0].contains("fails while running"), "general prompt expected");

    assert_eq!(
        h.percentages(),
        vec![0, 30, 45, 55, 65, 75, 90, 100]
    );
}

#[tokio::test]
async fn compilation_fix_reports_still_failing() {
    let dir = tempfile::tempdir().unwrap();
    let executor = ScriptedExecutor::default().suite(vec![
        Ok(failing("src/x.ts(10,5): error TS2322: Type 'A' is not assignable.")),
        Ok(failing("src/x.ts(10,5): error TS2322: Type 'A' is not assignable.")),
    ]);
    let h = Harness::new(dir, executor, vec![], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_compilation_issues()
        .await
        .unwrap();

    assert_eq!(summary.outcome, CompilationOutcome::StillFailing);
    assert_eq!(*h.executor.suite_calls.lock().unwrap(), 2);
}

#[tokio::test]
async fn compilation_fix_on_passing_suite_changes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("src/ui-test/a.test.ts");
    let h = Harness::new(dir, ScriptedExecutor::default(), vec![a], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_compilation_issues()
        .await
        .unwrap();

    assert_eq!(summary.outcome, CompilationOutcome::AlreadyPassing);
    assert_eq!(summary.compilable, vec!["src/ui-test/a.test.ts"]);
    assert_eq!(h.generator.code_calls(), 0);
}

#[tokio::test]
async fn compilation_fix_reports_unparsable_output() {
    let dir = tempfile::tempdir().unwrap();
    let executor = ScriptedExecutor::default().suite(vec![Ok(failing("npm ERR! code 1"))]);
    let h = Harness::new(dir, executor, vec![], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_compilation_issues()
        .await
        .unwrap();

    assert_eq!(summary.outcome, CompilationOutcome::Unparsable);
    assert_eq!(h.generator.code_calls(), 0);
}

#[tokio::test]
async fn compilation_fix_without_file_uses_fallback_destination() {
    let dir = tempfile::tempdir().unwrap();
    let executor = ScriptedExecutor::default().suite(vec![
        Ok(failing("1) suite\nSyntaxError: unexpected token")),
        Ok(passing()),
    ]);
    let h = Harness::new(dir, executor, vec![], ScriptedGenerator::default());

    let summary = h
        .orchestrator(RepairConfig::default())
        .fix_compilation_issues()
        .await
        .unwrap();

    assert_eq!(summary.outcome, CompilationOutcome::Fixed);
    assert_eq!(summary.fix_path.as_deref(), Some("src/ui-test/ai-fix.test.ts"));
    assert!(h.dir.path().join("src/ui-test/ai-fix.test.ts").is_file());
}

// ---------------------------------------------------------------------------
// GenerateProposals
// ---------------------------------------------------------------------------

const PROPOSALS: &str = r#"```json
[
  {"category": "views", "test-name": "welcomeViewOpens", "description": "d", "cover": ["viewsWelcome"]},
  {"category": "commands", "test-name": "newProject", "description": "d", "cover": []},
  {"category": "menus", "test-name": "submenuOrder", "description": "d", "cover": []}
]
```"#;

#[tokio::test]
async fn generate_proposals_respects_limit_and_falls_back_to_placeholder() {
    let dir = tempfile::tempdir().unwrap();
    let generator = ScriptedGenerator::default()
        .chat(&[PROPOSALS])
        .code(&["```ts\ndescribe('welcome', () => {});\n```", ERROR_SENTINEL]);
    let h = Harness::new(dir, ScriptedExecutor::default(), vec![], generator);

    let config = RepairConfig {
        max_generated_tests: Some(2),
        ..RepairConfig::default()
    };
    let summary = h.orchestrator(config).generate_proposals().await.unwrap();

    assert_eq!(summary.outcome, ProposalOutcome::Completed);
    assert_eq!(summary.total_available, 3);
    assert_eq!(summary.processed, 2);
    assert_eq!(summary.generated, vec!["src/ui-test/views/welcomeViewOpens.test.ts"]);
    assert_eq!(summary.placeholders, vec!["src/ui-test/commands/newProject.test.ts"]);

    let root = h.dir.path();
    assert_eq!(
        std::fs::read_to_string(root.join("src/ui-test/views/welcomeViewOpens.test.ts")).unwrap(),
        "describe('welcome', () => {});"
    );
    let placeholder =
        std::fs::read_to_string(root.join("src/ui-test/commands/newProject.test.ts")).unwrap();
    assert!(placeholder.contains("it('should pass'"));
    assert!(!root.join("src/ui-test/menus").exists());

    assert_eq!(h.generator.code_calls(), 2, "test files use the code model");

    let pct = h.percentages();
    assert_eq!(&pct[..4], &[0, 25, 45, 55]);
    assert_eq!(pct.last(), Some(&100));
}

#[tokio::test]
async fn generate_proposals_rejects_names_that_leave_test_dir() {
    let dir = tempfile::tempdir().unwrap();
    let proposals = r#"[
      {"category": "../../x", "test-name": "escape", "description": "d", "cover": []},
      {"category": "views", "test-name": "../../../y", "description": "d", "cover": []},
      {"category": "views", "test-name": "ok", "description": "d", "cover": []}
    ]"#;
    let generator = ScriptedGenerator::default().chat(&[proposals]);
    let h = Harness::new(dir, ScriptedExecutor::default(), vec![], generator);

    let summary = h
        .orchestrator(RepairConfig::default())
        .generate_proposals()
        .await
        .unwrap();

    assert_eq!(summary.outcome, ProposalOutcome::Completed);
    assert_eq!(summary.failed.len(), 2);
    assert_eq!(summary.generated, vec!["src/ui-test/views/ok.test.ts"]);
    assert_eq!(h.generator.code_calls(), 1, "rejected proposals are not generated");

    let root = h.dir.path();
    assert!(!root.join("x").exists());
    assert!(!root.join("src/x").exists());
    assert!(!root.join("y.test.ts").exists());
    assert!(!root.join("src/y.test.ts").exists());
}

#[tokio::test]
async fn generate_proposals_reports_unparsable_response() {
    let dir = tempfile::tempdir().unwrap();
    let generator = ScriptedGenerator::default().chat(&["not json at all"]);
    let h = Harness::new(dir, ScriptedExecutor::default(), vec![], generator);

    let summary = h
        .orchestrator(RepairConfig::default())
        .generate_proposals()
        .await
        .unwrap();

    assert_eq!(summary.outcome, ProposalOutcome::Unparsable);
    assert_eq!(h.generator.code_calls(), 0);
}

#[tokio::test]
async fn generate_proposals_reports_empty_response() {
    let dir = tempfile::tempdir().unwrap();
    let h = Harness::new(
        dir,
        ScriptedExecutor::default(),
        vec![],
        ScriptedGenerator::default(),
    );

    let summary = h
        .orchestrator(RepairConfig::default())
        .generate_proposals()
        .await
        .unwrap();

    assert_eq!(summary.outcome, ProposalOutcome::EmptyResponse);
}

#[tokio::test]
async fn generate_proposals_requires_manifest() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = Orchestrator::new(
        Workspace::new(dir.path()),
        Arc::new(ScriptedExecutor::default()),
        Arc::new(FixedDiscoverer::new(vec![])),
        Arc::new(ScriptedGenerator::default()),
    );

    let err = orchestrator.generate_proposals().await.unwrap_err();
    assert!(matches!(err, UifixError::ManifestRead { .. }));
}

// ---------------------------------------------------------------------------
// RunAndFix
// ---------------------------------------------------------------------------

#[tokio::test]
async fn run_and_fix_aborts_when_compilation_phase_errors() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();
    let executor = ScriptedExecutor::default().suite(vec![Err(UifixError::NoTestScript { root })]);
    let h = Harness::new(dir, executor, vec![], ScriptedGenerator::default());

    let err = h
        .orchestrator(RepairConfig::default())
        .run_and_fix()
        .await
        .unwrap_err();

    assert!(matches!(err, UifixError::NoTestScript { .. }));
    assert_eq!(
        *h.discoverer.calls.lock().unwrap(),
        1,
        "only the compilation phase discovered files"
    );
    assert_eq!(h.executor.single_calls(), 0);
}

#[tokio::test]
async fn run_and_fix_reports_runtime_phase_error_without_rerunning_compilation() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("src/ui-test/a.test.ts");
    let mut h = Harness::new(
        dir,
        ScriptedExecutor::default(),
        vec![],
        ScriptedGenerator::default(),
    );
    h.discoverer = Arc::new(FixedDiscoverer::failing_from(vec![a], 2));

    let summary = h
        .orchestrator(RepairConfig::default())
        .run_and_fix()
        .await
        .unwrap();

    assert_eq!(summary.compilation.outcome, CompilationOutcome::AlreadyPassing);
    assert!(summary.runtime.is_none());
    let err = summary.runtime_error.as_deref().unwrap();
    assert!(err.contains("walk interrupted"));
    assert_eq!(*h.executor.suite_calls.lock().unwrap(), 1);
    assert_eq!(*h.discoverer.calls.lock().unwrap(), 2);
    assert_eq!(h.executor.single_calls(), 0);
}

#[tokio::test]
async fn run_and_fix_runs_both_phases() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("src/ui-test/a.test.ts");
    let h = Harness::new(
        dir,
        ScriptedExecutor::default(),
        vec![a],
        ScriptedGenerator::default(),
    );

    let summary = h
        .orchestrator(RepairConfig::default())
        .run_and_fix()
        .await
        .unwrap();

    assert_eq!(summary.compilation.outcome, CompilationOutcome::AlreadyPassing);
    let runtime = summary.runtime.expect("runtime phase ran");
    assert_eq!(runtime.passing, vec!["src/ui-test/a.test.ts"]);
    assert!(summary.runtime_error.is_none());
}
