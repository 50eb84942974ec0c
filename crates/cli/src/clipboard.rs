//! Copy text to the system clipboard through an external helper.
//!
//! No clipboard library is linked; instead the first available helper
//! binary is used: `wl-copy` (Wayland), `xclip` or `xsel` (X11), or
//! `pbcopy` (macOS). The text is piped over stdin.

use std::io::Write;
use std::process::{Command, Stdio};

/// Helper binaries in preference order, each with the args that make it
/// read from stdin and write the primary clipboard.
const HELPERS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
    ("pbcopy", &[]),
];

/// Locate the first clipboard helper present on PATH.
fn find_helper() -> Option<(&'static str, &'static [&'static str])> {
    HELPERS
        .iter()
        .find(|(bin, _)| which::which(bin).is_ok())
        .map(|(bin, args)| (*bin, *args))
}

/// Copy `text` to the system clipboard. Returns a human-readable error
/// when no helper is available or the helper fails.
pub fn copy(text: &str) -> Result<(), String> {
    let (bin, args) = find_helper()
        .ok_or_else(|| "no clipboard helper found (install wl-copy, xclip, xsel, or pbcopy)".to_string())?;

    let mut child = Command::new(bin)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| format!("failed to run {}: {}", bin, e))?;

    if let Some(stdin) = child.stdin.as_mut() {
        stdin
            .write_all(text.as_bytes())
            .map_err(|e| format!("failed to write to {}: {}", bin, e))?;
    }

    let status = child
        .wait()
        .map_err(|e| format!("{} did not exit cleanly: {}", bin, e))?;
    if status.success() {
        Ok(())
    } else {
        Err(format!("{} exited with {}", bin, status))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helper_table_prefers_wayland() {
        assert_eq!(HELPERS[0].0, "wl-copy");
    }

    #[test]
    fn copy_without_helper_reports_missing() {
        // If none of the helpers exist on the test host, copy must return
        // the install hint rather than panic.
        if find_helper().is_none() {
            let err = copy("SELECT 1").unwrap_err();
            assert!(err.contains("no clipboard helper"));
        }
    }
}
