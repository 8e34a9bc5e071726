//! Machine-readable risk flag names.
//!
//! Flags are stable strings: they appear in persisted plans, audit
//! payloads, and the admin surface.

/// Read of a file whose name suggests credentials or secrets.
pub const POTENTIAL_SECRET_FILE: &str = "potential_secret_file";
/// Write touching a shell profile or SSH client configuration.
pub const SHELL_PROFILE_MODIFICATION: &str = "shell_profile_modification";
/// Write touching any dotfile path segment.
pub const DOTFILE_MODIFICATION: &str = "dotfile_modification";
/// Delete covering more than ten files.
pub const BULK_DELETE: &str = "bulk_delete";
/// Command string contains `sudo`.
pub const SUDO: &str = "sudo";
/// Command string contains the word `rm`.
pub const RM: &str = "rm";
/// Command string redirects output.
pub const REDIRECTION: &str = "redirection";
/// Command string pipes output.
pub const PIPE: &str = "pipe";
/// Command downloads and pipes into a shell.
pub const CURL_PIPE_SH: &str = "curl_pipe_sh";
/// Command makes a path world-writable.
pub const CHMOD_RISKY: &str = "chmod_risky";
/// Network target is a raw IPv4 literal.
pub const IP_LITERAL: &str = "ip_literal";
/// Network target has a TLD frequently seen in abuse.
pub const SUSPICIOUS_TLD: &str = "suspicious_tld";
/// A path fell outside every allowed root.
pub const PATH_DENIED: &str = "path_denied";
/// The command matched no allowlist pattern.
pub const COMMAND_NOT_ALLOWED: &str = "command_not_allowed";
/// Execution of this step would be refused.
pub const WOULD_BE_BLOCKED: &str = "would_be_blocked";
/// Safe mode will refuse this step at execution time.
pub const BLOCKED_BY_SAFE_MODE: &str = "blocked_by_safe_mode";
