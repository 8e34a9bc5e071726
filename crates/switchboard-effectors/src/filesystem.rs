//! Filesystem effector: sandboxed read/write/delete/list/move.

use async_trait::async_trait;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

use switchboard_core::{CapabilityType, PlanStep, StepResult, StepType};
use switchboard_risk::flags;

use crate::effector::{Effector, EffectorContext, ValidationOutcome, split_normalized};
use crate::error::{EffectorError, EffectorResult};
use crate::sandbox::{is_path_allowed, resolve_absolute};
use crate::{RESULT_OUTPUT_CHARS, truncate_output};

/// Characters of content preview attached to write steps.
const PREVIEW_CHARS: usize = 1000;

/// Sandboxed filesystem operations.
#[derive(Debug, Default)]
pub struct FilesystemEffector;

impl FilesystemEffector {
    /// Create the effector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn require_str(params: &Value, key: &str, errors: &mut Vec<String>) -> Option<String> {
        match params.get(key).and_then(Value::as_str) {
            Some(s) if !s.is_empty() => Some(s.to_string()),
            Some(_) => {
                errors.push(format!("`{key}` must not be empty"));
                None
            }
            None => {
                errors.push(format!("`{key}` is required and must be a string"));
                None
            }
        }
    }

    /// A single denial step: the plan records what was asked for and why
    /// it will not happen. The scorer pins `path_denied` steps to 50.
    fn denied_step(step_type: StepType, path: &Path) -> PlanStep {
        let mut step = PlanStep::new(
            step_type,
            format!("Denied: {} is outside the allowed roots", path.display()),
        )
        .with_input("path", path.display().to_string());
        step.add_flag(flags::PATH_DENIED);
        step
    }

    fn mark_safe_mode(ctx: &EffectorContext, step: &mut PlanStep) {
        if ctx.safe_mode_enabled && step.step_type.is_destructive() {
            step.add_flag(flags::BLOCKED_BY_SAFE_MODE);
        }
    }

    async fn execute_step(step: &PlanStep) -> StepResult {
        match step.step_type {
            StepType::FsRead => {
                let path = step.input_str("path").unwrap_or_default();
                match tokio::fs::read(path).await {
                    Ok(bytes) => {
                        let content = String::from_utf8_lossy(&bytes);
                        StepResult::success(
                            &step.step_id,
                            truncate_output(&content, RESULT_OUTPUT_CHARS),
                        )
                    }
                    Err(e) => StepResult::failed(&step.step_id, format!("read failed: {e}")),
                }
            }
            StepType::FsWrite => {
                let path = step.input_str("path").unwrap_or_default();
                let content = step.input_str("content").unwrap_or_default();
                match tokio::fs::write(path, content.as_bytes()).await {
                    Ok(()) => StepResult::success(
                        &step.step_id,
                        format!("Wrote {} bytes to {path}", content.len()),
                    ),
                    Err(e) => StepResult::failed(&step.step_id, format!("write failed: {e}")),
                }
            }
            StepType::FsDelete => {
                let path = step.input_str("path").unwrap_or_default();
                let result = match tokio::fs::metadata(path).await {
                    Ok(meta) if meta.is_dir() => tokio::fs::remove_dir_all(path).await,
                    Ok(_) => tokio::fs::remove_file(path).await,
                    Err(e) => Err(e),
                };
                match result {
                    Ok(()) => StepResult::success(&step.step_id, format!("Deleted {path}")),
                    Err(e) => StepResult::failed(&step.step_id, format!("delete failed: {e}")),
                }
            }
            StepType::FsList => {
                let path = step.input_str("path").unwrap_or_default();
                match std::fs::read_dir(path) {
                    Ok(entries) => {
                        let mut names: Vec<String> = entries
                            .filter_map(Result::ok)
                            .map(|e| e.file_name().to_string_lossy().into_owned())
                            .collect();
                        names.sort_unstable();
                        StepResult::success(
                            &step.step_id,
                            truncate_output(&names.join("\n"), RESULT_OUTPUT_CHARS),
                        )
                    }
                    Err(e) => StepResult::failed(&step.step_id, format!("list failed: {e}")),
                }
            }
            StepType::FsMove => {
                let from = step.input_str("from").unwrap_or_default();
                let to = step.input_str("to").unwrap_or_default();
                match tokio::fs::rename(from, to).await {
                    Ok(()) => StepResult::success(&step.step_id, format!("Moved {from} -> {to}")),
                    Err(e) => StepResult::failed(&step.step_id, format!("move failed: {e}")),
                }
            }
            _ => StepResult::failed(
                &step.step_id,
                format!("filesystem effector cannot execute {:?} steps", step.step_type),
            ),
        }
    }

    /// Every path a step touches, for execution-time re-checks.
    fn step_paths(step: &PlanStep) -> Vec<PathBuf> {
        let mut paths = Vec::new();
        for key in ["path", "from", "to"] {
            if let Some(p) = step.input_str(key) {
                paths.push(resolve_absolute(p));
            }
        }
        paths
    }
}

/// Recursive entry count under a directory (files and directories).
fn count_entries(path: &Path) -> u64 {
    let mut count = 0;
    if let Ok(entries) = std::fs::read_dir(path) {
        for entry in entries.flatten() {
            count += 1;
            let child = entry.path();
            if child.is_dir() {
                count += count_entries(&child);
            }
        }
    }
    count
}

/// Unified diff between current file content (if any) and the new content.
async fn write_diff(path: &Path, new_content: &str) -> String {
    let old = match tokio::fs::read(path).await {
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(_) => String::new(),
    };
    let display = path.display().to_string();
    similar::TextDiff::from_lines(old.as_str(), new_content)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{display}"), &format!("b/{display}"))
        .to_string()
}

#[async_trait]
impl Effector for FilesystemEffector {
    fn capability_type(&self) -> CapabilityType {
        CapabilityType::Filesystem
    }

    fn validate_request(&self, operation: &str, params: &Value) -> ValidationOutcome {
        if !params.is_object() {
            return ValidationOutcome::fail_with("params must be an object");
        }
        let mut errors = Vec::new();
        let normalized_params = match operation {
            "read" | "delete" | "list" => {
                Self::require_str(params, "path", &mut errors).map(|path| json!({ "path": path }))
            }
            "write" => {
                let path = Self::require_str(params, "path", &mut errors);
                let content = match params.get("content").and_then(Value::as_str) {
                    Some(c) => Some(c.to_string()),
                    None => {
                        errors.push("`content` is required and must be a string".to_string());
                        None
                    }
                };
                match (path, content) {
                    (Some(path), Some(content)) => {
                        Some(json!({ "path": path, "content": content }))
                    }
                    _ => None,
                }
            }
            "move" => {
                let from = Self::require_str(params, "from", &mut errors);
                let to = Self::require_str(params, "to", &mut errors);
                match (from, to) {
                    (Some(from), Some(to)) => Some(json!({ "from": from, "to": to })),
                    _ => None,
                }
            }
            other => {
                errors.push(format!("unsupported filesystem operation: {other}"));
                None
            }
        };

        match normalized_params {
            Some(params) if errors.is_empty() => {
                ValidationOutcome::ok(json!({ "operation": operation, "params": params }))
            }
            _ => ValidationOutcome::fail(errors),
        }
    }

    async fn dry_run(
        &self,
        ctx: &EffectorContext,
        normalized: &Value,
    ) -> EffectorResult<Vec<PlanStep>> {
        let (operation, params) = split_normalized(normalized);

        let mut step = match operation {
            "read" => {
                let path = resolve_absolute(params["path"].as_str().unwrap_or_default());
                if !is_path_allowed(&path, &ctx.allowed_roots) {
                    return Ok(vec![Self::denied_step(StepType::FsRead, &path)]);
                }
                PlanStep::new(StepType::FsRead, format!("Read file {}", path.display()))
                    .with_input("path", path.display().to_string())
            }
            "write" => {
                let path = resolve_absolute(params["path"].as_str().unwrap_or_default());
                if !is_path_allowed(&path, &ctx.allowed_roots) {
                    return Ok(vec![Self::denied_step(StepType::FsWrite, &path)]);
                }
                let content = params["content"].as_str().unwrap_or_default().to_string();
                let mut step = PlanStep::new(
                    StepType::FsWrite,
                    format!("Write {} bytes to {}", content.len(), path.display()),
                )
                .with_input("path", path.display().to_string())
                .with_input("contentLength", content.len() as u64)
                .with_input("content", content.clone());
                step.preview = Some(truncate_output(&content, PREVIEW_CHARS));
                step.diff = Some(write_diff(&path, &content).await);
                step
            }
            "delete" => {
                let path = resolve_absolute(params["path"].as_str().unwrap_or_default());
                if !is_path_allowed(&path, &ctx.allowed_roots) {
                    return Ok(vec![Self::denied_step(StepType::FsDelete, &path)]);
                }
                let mut step = PlanStep::new(
                    StepType::FsDelete,
                    format!("Delete {}", path.display()),
                )
                .with_input("path", path.display().to_string());
                if path.is_dir() {
                    step = step.with_input("fileCount", count_entries(&path));
                }
                step
            }
            "list" => {
                let path = resolve_absolute(params["path"].as_str().unwrap_or_default());
                if !is_path_allowed(&path, &ctx.allowed_roots) {
                    return Ok(vec![Self::denied_step(StepType::FsList, &path)]);
                }
                PlanStep::new(StepType::FsList, format!("List directory {}", path.display()))
                    .with_input("path", path.display().to_string())
            }
            "move" => {
                let from = resolve_absolute(params["from"].as_str().unwrap_or_default());
                let to = resolve_absolute(params["to"].as_str().unwrap_or_default());
                if !is_path_allowed(&from, &ctx.allowed_roots) {
                    return Ok(vec![Self::denied_step(StepType::FsMove, &from)]);
                }
                if !is_path_allowed(&to, &ctx.allowed_roots) {
                    return Ok(vec![Self::denied_step(StepType::FsMove, &to)]);
                }
                PlanStep::new(
                    StepType::FsMove,
                    format!("Move {} -> {}", from.display(), to.display()),
                )
                .with_input("from", from.display().to_string())
                .with_input("to", to.display().to_string())
            }
            other => {
                return Err(EffectorError::Validation(format!(
                    "unsupported filesystem operation: {other}"
                )));
            }
        };

        Self::mark_safe_mode(ctx, &mut step);
        Ok(vec![step])
    }

    async fn execute(
        &self,
        ctx: &EffectorContext,
        steps: &[PlanStep],
    ) -> EffectorResult<Vec<StepResult>> {
        let mut results = Vec::with_capacity(steps.len());
        for step in steps {
            if step.has_flag(flags::PATH_DENIED) {
                results.push(StepResult::blocked(
                    &step.step_id,
                    "path is outside the allowed roots",
                ));
                continue;
            }
            if step.step_type.is_destructive()
                && (ctx.safe_mode_enabled || step.has_flag(flags::BLOCKED_BY_SAFE_MODE))
            {
                results.push(StepResult::blocked(
                    &step.step_id,
                    "blocked by safe mode",
                ));
                continue;
            }
            // Roots may have changed since planning; re-check.
            if !Self::step_paths(step)
                .iter()
                .all(|p| is_path_allowed(p, &ctx.allowed_roots))
            {
                results.push(StepResult::blocked(
                    &step.step_id,
                    "path is outside the allowed roots",
                ));
                continue;
            }
            results.push(Self::execute_step(step).await);
        }
        Ok(results)
    }
}
