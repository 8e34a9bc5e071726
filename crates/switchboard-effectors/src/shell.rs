//! Shell effector: allowlisted subprocess execution.
//!
//! Commands are never parsed from a shell string: the agent supplies
//! `command` plus argv, and that is exactly what gets spawned (no shell
//! interpolation). Policy gates are applied twice — at dry run, where
//! misses become flags on the plan, and again at execute, where misses
//! block the step before any process is spawned.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncReadExt;
use tokio::process::Command;

use switchboard_core::{CapabilityType, PlanStep, StepResult, StepType};
use switchboard_risk::flags;

use crate::effector::{Effector, EffectorContext, ValidationOutcome, split_normalized};
use crate::error::{EffectorError, EffectorResult};
use crate::sandbox::{is_path_allowed, resolve_absolute};
use crate::{RESULT_OUTPUT_CHARS, truncate_output};

/// Hard wall-clock limit on a spawned command.
const EXEC_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Per-stream capture cap.
const MAX_STREAM_BYTES: u64 = 1024 * 1024;

/// Commands safe mode still permits, matched on the command basename.
const SAFE_MODE_BASELINE: &[&str] = &["ls", "cat", "head", "tail", "echo", "pwd", "whoami", "date"];

/// Allowlisted shell command execution.
#[derive(Debug, Default)]
pub struct ShellEffector;

impl ShellEffector {
    /// Create the effector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn full_command(command: &str, args: &[String]) -> String {
        let mut full = command.to_string();
        if !args.is_empty() {
            full.push(' ');
            full.push_str(&args.join(" "));
        }
        full.trim().to_string()
    }

    fn command_basename(command: &str) -> &str {
        Path::new(command)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(command)
    }

    fn allowlist_permits(allow_list: &[String], full_cmd: &str) -> bool {
        allow_list.iter().any(|pattern| {
            match regex::Regex::new(pattern) {
                Ok(re) => re.is_match(full_cmd),
                Err(e) => {
                    tracing::warn!(pattern, error = %e, "ignoring invalid shell allowlist pattern");
                    false
                }
            }
        })
    }

    fn safe_mode_permits(command: &str) -> bool {
        SAFE_MODE_BASELINE.contains(&Self::command_basename(command))
    }

    fn step_command(step: &PlanStep) -> (String, Vec<String>, String) {
        let command = step.input_str("command").unwrap_or_default().to_string();
        let args: Vec<String> = step
            .inputs
            .get("args")
            .and_then(Value::as_array)
            .map(|a| {
                a.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let cwd = step.input_str("cwd").unwrap_or_default().to_string();
        (command, args, cwd)
    }

    async fn spawn_and_capture(
        step_id: &str,
        command: &str,
        args: &[String],
        cwd: &str,
    ) -> StepResult {
        let mut cmd = Command::new(command);
        cmd.args(args)
            .current_dir(cwd)
            // No stdin: some tools try to read it and hang forever.
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        cmd.process_group(0);

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(e) => return StepResult::failed(step_id, format!("spawn failed: {e}")),
        };

        let mut stdout_pipe = child.stdout.take();
        let mut stderr_pipe = child.stderr.take();

        let capture = async {
            let mut stdout_buf = Vec::new();
            let mut stderr_buf = Vec::new();
            let stdout_read = async {
                if let Some(pipe) = stdout_pipe.as_mut() {
                    let _ = pipe.take(MAX_STREAM_BYTES).read_to_end(&mut stdout_buf).await;
                }
            };
            let stderr_read = async {
                if let Some(pipe) = stderr_pipe.as_mut() {
                    let _ = pipe.take(MAX_STREAM_BYTES).read_to_end(&mut stderr_buf).await;
                }
            };
            let (status, (), ()) = tokio::join!(child.wait(), stdout_read, stderr_read);
            (status, stdout_buf, stderr_buf)
        };

        match tokio::time::timeout(EXEC_TIMEOUT, capture).await {
            Ok((Ok(status), stdout_buf, stderr_buf)) => {
                let stdout = String::from_utf8_lossy(&stdout_buf).into_owned();
                let stderr = String::from_utf8_lossy(&stderr_buf).into_owned();
                let mut result = if status.success() {
                    StepResult::success(step_id, truncate_output(&stdout, RESULT_OUTPUT_CHARS))
                } else {
                    StepResult::failed(
                        step_id,
                        format!("command exited with {status}"),
                    )
                };
                result.stdout = Some(truncate_output(&stdout, RESULT_OUTPUT_CHARS));
                result.stderr = Some(truncate_output(&stderr, RESULT_OUTPUT_CHARS));
                result
            }
            Ok((Err(e), _, _)) => StepResult::failed(step_id, format!("wait failed: {e}")),
            Err(_) => StepResult::failed(
                step_id,
                format!("command timed out after {} ms and was killed", EXEC_TIMEOUT.as_millis()),
            ),
        }
    }
}

#[async_trait]
impl Effector for ShellEffector {
    fn capability_type(&self) -> CapabilityType {
        CapabilityType::Shell
    }

    fn validate_request(&self, operation: &str, params: &Value) -> ValidationOutcome {
        if operation != "run" {
            return ValidationOutcome::fail_with(format!(
                "unsupported shell operation: {operation}"
            ));
        }
        if !params.is_object() {
            return ValidationOutcome::fail_with("params must be an object");
        }

        let command = match params.get("command").and_then(Value::as_str) {
            Some(c) if !c.trim().is_empty() => c.to_string(),
            _ => {
                return ValidationOutcome::fail_with("`command` is required and must be a string");
            }
        };

        let args = match params.get("args") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => {
                let mut args = Vec::with_capacity(items.len());
                for item in items {
                    match item.as_str() {
                        Some(s) => args.push(s.to_string()),
                        None => {
                            return ValidationOutcome::fail_with("`args` must be an array of strings");
                        }
                    }
                }
                args
            }
            Some(_) => {
                return ValidationOutcome::fail_with("`args` must be an array of strings");
            }
        };

        let cwd = match params.get("cwd").and_then(Value::as_str) {
            Some(c) if !c.is_empty() => c.to_string(),
            _ => std::env::current_dir()
                .unwrap_or_else(|_| "/".into())
                .display()
                .to_string(),
        };

        ValidationOutcome::ok(json!({
            "operation": "run",
            "params": { "command": command, "args": args, "cwd": cwd },
        }))
    }

    async fn dry_run(
        &self,
        ctx: &EffectorContext,
        normalized: &Value,
    ) -> EffectorResult<Vec<PlanStep>> {
        let (operation, params) = split_normalized(normalized);
        if operation != "run" {
            return Err(EffectorError::Validation(format!(
                "unsupported shell operation: {operation}"
            )));
        }

        let command = params["command"].as_str().unwrap_or_default().to_string();
        let args: Vec<String> = params["args"]
            .as_array()
            .map(|a| {
                a.iter()
                    .filter_map(Value::as_str)
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        let cwd = resolve_absolute(params["cwd"].as_str().unwrap_or_default());
        let full_cmd = Self::full_command(&command, &args);

        if !is_path_allowed(&cwd, &ctx.allowed_roots) {
            let mut step = PlanStep::new(
                StepType::ShellRun,
                format!("Denied: cwd {} is outside the allowed roots", cwd.display()),
            )
            .with_input("command", command)
            .with_input("args", json!(args))
            .with_input("cwd", cwd.display().to_string());
            step.add_flag(flags::PATH_DENIED);
            return Ok(vec![step]);
        }

        let mut step = PlanStep::new(
            StepType::ShellRun,
            format!("Run `{}` in {}", full_cmd, cwd.display()),
        )
        .with_input("command", command.clone())
        .with_input("args", json!(args))
        .with_input("cwd", cwd.display().to_string())
        .with_input("fullCommand", full_cmd.clone());

        if !Self::allowlist_permits(&ctx.shell_allow_list, &full_cmd) {
            step.add_flag(flags::COMMAND_NOT_ALLOWED);
            step.add_flag(flags::WOULD_BE_BLOCKED);
        }
        if ctx.safe_mode_enabled && !Self::safe_mode_permits(&command) {
            step.add_flag(flags::BLOCKED_BY_SAFE_MODE);
        }

        Ok(vec![step])
    }

    async fn execute(
        &self,
        ctx: &EffectorContext,
        steps: &[PlanStep],
    ) -> EffectorResult<Vec<StepResult>> {
        let mut results = Vec::with_capacity(steps.len());
        for step in steps {
            let (command, args, cwd) = Self::step_command(step);
            let full_cmd = Self::full_command(&command, &args);

            if step.has_flag(flags::PATH_DENIED)
                || !is_path_allowed(&resolve_absolute(&cwd), &ctx.allowed_roots)
            {
                results.push(StepResult::blocked(
                    &step.step_id,
                    "cwd is outside the allowed roots",
                ));
                continue;
            }
            // Policy is re-evaluated against current settings: an approved
            // plan does not outlive an allowlist or safe-mode change.
            if !Self::allowlist_permits(&ctx.shell_allow_list, &full_cmd) {
                results.push(StepResult::blocked(
                    &step.step_id,
                    format!("command not in allowlist: {full_cmd}"),
                ));
                continue;
            }
            if ctx.safe_mode_enabled && !Self::safe_mode_permits(&command) {
                results.push(StepResult::blocked(
                    &step.step_id,
                    "blocked by safe mode",
                ));
                continue;
            }

            tracing::info!(command = %full_cmd, cwd = %cwd, "executing shell step");
            results.push(Self::spawn_and_capture(&step.step_id, &command, &args, &cwd).await);
        }
        Ok(results)
    }
}
