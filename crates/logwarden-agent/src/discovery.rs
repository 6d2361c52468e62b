//! Log file auto-discovery
//!
//! Used when the configuration names no files: probe the well-known
//! system log locations and watch whichever exist. Only metadata is
//! touched here; content stays with the tailer.

use std::path::Path;

use logwarden_core::{LogFormat, WatchedFile};

/// Locations probed when no files are configured.
const PROBE_PATHS: &[&str] = &[
    "/var/log/syslog",
    "/var/log/messages",
    "/var/log/nginx/error.log",
    "/var/log/apache2/error.log",
    "/var/log/auth.log",
];

/// Probe the well-known locations and return those that exist.
pub fn discover_log_files() -> Vec<WatchedFile> {
    PROBE_PATHS
        .iter()
        .filter(|path| Path::new(path).exists())
        .map(|path| {
            let file = WatchedFile::new(*path, format_for_path(Path::new(path)));
            tracing::info!(path = %file.path.display(), format = file.format.as_str(), "discovered log file");
            file
        })
        .collect()
}

/// Infer a format from a path. nginx and apache logs are recognized by
/// their directory names, system logs by basename, JSON by extension.
pub fn format_for_path(path: &Path) -> LogFormat {
    let full = path.to_string_lossy().to_lowercase();
    if full.contains("nginx") {
        return LogFormat::Nginx;
    }
    if full.contains("apache") {
        return LogFormat::Apache;
    }

    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.contains("syslog") || name.contains("messages") || name.contains("auth") {
        return LogFormat::Syslog;
    }
    if path.extension().is_some_and(|ext| ext == "json") {
        return LogFormat::Json;
    }
    LogFormat::Auto
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_inference() {
        assert_eq!(
            format_for_path(Path::new("/var/log/nginx/error.log")),
            LogFormat::Nginx
        );
        assert_eq!(
            format_for_path(Path::new("/var/log/apache2/error.log")),
            LogFormat::Apache
        );
        assert_eq!(
            format_for_path(Path::new("/var/log/syslog")),
            LogFormat::Syslog
        );
        assert_eq!(
            format_for_path(Path::new("/var/log/messages")),
            LogFormat::Syslog
        );
        assert_eq!(
            format_for_path(Path::new("/srv/app/events.json")),
            LogFormat::Json
        );
        assert_eq!(
            format_for_path(Path::new("/srv/app/app.log")),
            LogFormat::Auto
        );
    }
}
