//! Environment probing: OS/distro identity, shell, privilege, and the
//! installed/missing partition of the reference tool catalog.
//!
//! All probes are read-only. A fact that cannot be determined is reported as
//! empty or false, never as an error.

use std::fs;
use std::process::Command;
use which::which;

/// Reference catalog of CLI tools the prompt reports on.
pub const TOOL_CATALOG: [&str; 10] = [
    "exa", "eza", "bat", "rg", "fd", "fzf", "zoxide", "nvim", "code", "git",
];

#[derive(Debug, Clone)]
pub struct EnvSnapshot {
    pub os_name: String,
    pub distro: String,
    pub shell: String,
    pub is_root: bool,
    pub installed: Vec<String>,
    pub missing: Vec<String>,
    pub aliases: String,
}

impl EnvSnapshot {
    /// Probes the current process environment. Never fails; absent facts are
    /// reported as empty strings.
    pub fn probe() -> Self {
        let (installed, missing) = partition_tools(|tool| which(tool).is_ok());
        Self {
            os_name: os_family(),
            distro: detect_distro(),
            shell: std::env::var("SHELL").unwrap_or_default(),
            is_root: effective_uid_is_root(),
            installed,
            missing,
            aliases: fish_aliases(),
        }
    }

    /// One-line system summary used by the prompt and the status report.
    pub fn system_line(&self) -> String {
        format!(
            "OS: {}, Distro: {}, Shell: {}, IsRoot: {}, Tools: {}",
            self.os_name,
            self.distro,
            self.shell,
            self.is_root,
            self.tools_line()
        )
    }

    pub fn tools_line(&self) -> String {
        format!(
            "Installed[{}] Missing[{}]",
            self.installed.join(", "),
            self.missing.join(", ")
        )
    }
}

/// Splits the tool catalog into installed and missing sets using the given
/// presence check. The two sets always partition the catalog.
pub fn partition_tools<F>(is_installed: F) -> (Vec<String>, Vec<String>)
where
    F: Fn(&str) -> bool,
{
    let mut installed = Vec::new();
    let mut missing = Vec::new();
    for tool in TOOL_CATALOG {
        if is_installed(tool) {
            installed.push(tool.to_string());
        } else {
            missing.push(tool.to_string());
        }
    }
    (installed, missing)
}

fn os_family() -> String {
    match std::env::consts::OS {
        "macos" => "macOS".to_string(),
        "linux" => "Linux".to_string(),
        other => other.to_string(),
    }
}

// Prefer the platform version query (macOS), fall back to /etc/os-release.
// Empty string when neither source is available.
fn detect_distro() -> String {
    if let Ok(out) = Command::new("sw_vers").arg("-productVersion").output() {
        if out.status.success() {
            let version = String::from_utf8_lossy(&out.stdout);
            return format!("macOS {}", version.trim());
        }
    }
    if let Ok(data) = fs::read_to_string("/etc/os-release") {
        if let Some(name) = parse_os_release(&data) {
            return name;
        }
    }
    String::new()
}

fn parse_os_release(data: &str) -> Option<String> {
    data.lines()
        .find_map(|line| line.strip_prefix("NAME="))
        .map(|name| name.trim_matches('"').to_string())
}

#[cfg(unix)]
fn effective_uid_is_root() -> bool {
    unsafe { libc::geteuid() == 0 }
}

#[cfg(not(unix))]
fn effective_uid_is_root() -> bool {
    false
}

// Alias listing is best-effort context enrichment: any failure of the fish
// invocation degrades to an empty alias block without signaling the user.
fn fish_aliases() -> String {
    match Command::new("fish").args(["-c", "alias"]).output() {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).into_owned(),
        _ => String::new(),
    }
}
