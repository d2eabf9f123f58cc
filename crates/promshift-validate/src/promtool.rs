use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;

use promshift_core::{CheckRules, Verdict};

/// Ceiling for each checker invocation.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Rule validation delegated to the external `promtool` binary, in two
/// phases: syntax via `check rules`, then semantics via `test rules`. Both
/// phases run against temp files scoped to one call and are time-bounded.
/// Every failure mode — non-zero exit, timeout, missing binary — comes back
/// as a failing verdict; nothing escapes as an error.
pub struct Promtool {
    binary: PathBuf,
    timeout: Duration,
}

impl Default for Promtool {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("promtool"),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl Promtool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific checker executable instead of `promtool` from PATH.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            ..Self::default()
        }
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, subcommand: &str, path: &Path) -> Run {
        let mut cmd = Command::new(&self.binary);
        cmd.arg(subcommand).arg("rules").arg(path).kill_on_drop(true);
        match tokio::time::timeout(self.timeout, cmd.output()).await {
            Err(_) => Run::TimedOut,
            Ok(Err(e)) => Run::Spawn(e),
            Ok(Ok(out)) => Run::Done {
                ok: out.status.success(),
                stdout: String::from_utf8_lossy(&out.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&out.stderr).into_owned(),
            },
        }
    }
}

enum Run {
    Done { ok: bool, stdout: String, stderr: String },
    TimedOut,
    Spawn(std::io::Error),
}

#[async_trait]
impl CheckRules for Promtool {
    async fn check(&self, rule_yaml: &str, test_yaml: &str) -> Verdict {
        if which::which(&self.binary).is_err() {
            // Not something the generator can fix by regenerating YAML.
            return Verdict::fatal(format!(
                "{} not found; install the Prometheus tooling to validate rules",
                self.binary.display()
            ));
        }

        // Dropped on every exit path, taking both files with it. The test
        // file references the rule file by name, so they share one dir.
        let dir = match tempfile::tempdir() {
            Ok(d) => d,
            Err(e) => return Verdict::fail(format!("failed to create temp dir: {e}")),
        };
        let rule_path = dir.path().join("rules.yml");
        let test_path = dir.path().join("tests.yml");
        if let Err(e) = std::fs::write(&rule_path, rule_yaml) {
            return Verdict::fail(format!("failed to write rule file: {e}"));
        }
        if let Err(e) = std::fs::write(&test_path, test_yaml) {
            return Verdict::fail(format!("failed to write test file: {e}"));
        }

        let mut log = Vec::new();

        // Phase 1: syntax
        tracing::debug!(path = %rule_path.display(), "running checker: check rules");
        match self.run("check", &rule_path).await {
            Run::Done { ok: true, stdout, .. } => {
                log.push("Syntax check: PASSED".to_string());
                let trimmed = stdout.trim();
                if !trimmed.is_empty() {
                    log.push(format!("  {trimmed}"));
                }
            }
            Run::Done { stdout, stderr, .. } => {
                log.push(format!(
                    "Syntax check: FAILED\n\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}"
                ));
                return Verdict::fail(log.join("\n"));
            }
            Run::TimedOut => {
                return Verdict::fail(format!(
                    "syntax validation timed out after {:?}",
                    self.timeout
                ))
            }
            Run::Spawn(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Verdict::fatal(format!("{} not found: {e}", self.binary.display()))
            }
            Run::Spawn(e) => {
                return Verdict::fail(format!("failed to run {}: {e}", self.binary.display()))
            }
        }

        // Phase 2: unit tests against the phase-1 rule file
        tracing::debug!(path = %test_path.display(), "running checker: test rules");
        match self.run("test", &test_path).await {
            Run::Done { ok: true, stdout, .. } => {
                log.push("Unit tests: PASSED".to_string());
                let trimmed = stdout.trim_end();
                if !trimmed.is_empty() {
                    log.push(format!("\n{trimmed}"));
                }
                Verdict::pass(log.join("\n"))
            }
            Run::Done { stdout, stderr, .. } => {
                log.push(format!(
                    "Unit tests: FAILED\n\nSTDOUT:\n{stdout}\nSTDERR:\n{stderr}"
                ));
                Verdict::fail(log.join("\n"))
            }
            Run::TimedOut => {
                Verdict::fail(format!("test execution timed out after {:?}", self.timeout))
            }
            Run::Spawn(e) => {
                Verdict::fail(format!("failed to run {}: {e}", self.binary.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use promshift_core::CheckRules;

    #[tokio::test]
    async fn missing_binary_is_a_fatal_verdict() {
        let checker = Promtool::with_binary("promtool-that-does-not-exist");
        let verdict = checker.check("groups: []", "tests: []").await;
        assert!(!verdict.passed);
        assert!(verdict.fatal);
        assert!(verdict.log.contains("not found"));
    }

    #[cfg(unix)]
    mod with_fake_checker {
        use super::*;
        use std::os::unix::fs::PermissionsExt;
        use std::path::{Path, PathBuf};

        /// Write an executable shell script standing in for promtool.
        /// It is invoked as `<script> <check|test> rules <path>`.
        fn fake_checker(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("promtool");
            std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
            let mut perms = std::fs::metadata(&path).unwrap().permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&path, perms).unwrap();
            path
        }

        #[tokio::test]
        async fn syntax_failure_skips_the_test_phase() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_checker(
                dir.path(),
                r#"if [ "$1" = "check" ]; then echo "syntax boom"; exit 1; fi
echo "tests ran"; exit 0"#,
            );
            let verdict = Promtool::with_binary(script).check("bad: yaml", "tests: []").await;
            assert!(!verdict.passed);
            assert!(!verdict.fatal);
            assert!(verdict.log.contains("syntax boom"));
            assert!(!verdict.log.contains("tests ran"));
            assert!(!verdict.log.contains("Unit tests"));
        }

        #[tokio::test]
        async fn both_phases_pass() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_checker(dir.path(), r#"echo "$1 ok"; exit 0"#);
            let verdict = Promtool::with_binary(script).check("groups: []", "tests: []").await;
            assert!(verdict.passed);
            assert!(verdict.log.contains("Syntax check: PASSED"));
            assert!(verdict.log.contains("Unit tests: PASSED"));
            assert!(verdict.log.contains("test ok"));
        }

        #[tokio::test]
        async fn test_phase_failure_keeps_syntax_log() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_checker(
                dir.path(),
                r#"if [ "$1" = "test" ]; then echo "assertion failed"; exit 2; fi
exit 0"#,
            );
            let verdict = Promtool::with_binary(script).check("groups: []", "tests: []").await;
            assert!(!verdict.passed);
            assert!(verdict.log.contains("Syntax check: PASSED"));
            assert!(verdict.log.contains("Unit tests: FAILED"));
            assert!(verdict.log.contains("assertion failed"));
        }

        #[tokio::test]
        async fn temp_files_are_removed_on_pass_and_fail() {
            for exit_code in [0, 1] {
                let dir = tempfile::tempdir().unwrap();
                let seen = dir.path().join("seen-paths.txt");
                let script = fake_checker(
                    dir.path(),
                    &format!(r#"echo "$3" >> {}; exit {exit_code}"#, seen.display()),
                );
                let _ = Promtool::with_binary(script).check("groups: []", "tests: []").await;
                let recorded = std::fs::read_to_string(&seen).unwrap();
                assert!(!recorded.trim().is_empty());
                for line in recorded.lines() {
                    assert!(
                        !Path::new(line).exists(),
                        "temp file still present after validation: {line}"
                    );
                }
            }
        }

        #[tokio::test]
        async fn timeout_is_a_failing_verdict() {
            let dir = tempfile::tempdir().unwrap();
            let script = fake_checker(dir.path(), "sleep 5; exit 0");
            let verdict = Promtool::with_binary(script)
                .timeout(Duration::from_millis(100))
                .check("groups: []", "tests: []")
                .await;
            assert!(!verdict.passed);
            assert!(!verdict.fatal);
            assert!(verdict.log.contains("timed out"));
        }
    }
}
