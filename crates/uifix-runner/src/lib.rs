//! uifix runner
//!
//! Concrete [`uifix_core::TestExecutor`] and [`uifix_core::TestDiscoverer`]
//! for VS Code extension projects tested with ExTester.

pub mod capture;
pub mod compiled;
pub mod config;
pub mod discovery;
pub mod executor;
pub mod outcome;
pub mod process;
pub mod script;

pub use capture::{CapturePolicy, CapturedOutput, CommandLauncher, DetachedShell};
pub use compiled::compiled_path;
pub use config::{DiscoveryConfig, RunnerConfig};
pub use discovery::GlobDiscoverer;
pub use executor::NpmTestExecutor;
pub use outcome::output_indicates_failure;
pub use process::{run_shell, ShellOutput};
pub use script::{detect_test_script, suite_command};
