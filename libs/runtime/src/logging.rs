use std::{
    io::{IsTerminal, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use file_rotate::{
    compression::Compression,
    suffix::{AppendTimestamp, FileLimit},
    ContentLimit, FileRotate,
};
use parking_lot::Mutex;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    filter::Targets,
    fmt::{self, time::UtcTime},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    Layer, Registry,
};

use crate::config::{LoggingConfig, Section, DEFAULT_SECTION};

const DEFAULT_MAX_SIZE_MB: u64 = 100;

// -------- level helpers --------

/// `off`/`none` disable a sink; unknown names fall back to `info`.
fn parse_level(s: &str) -> LevelFilter {
    match s.trim().to_ascii_lowercase().as_str() {
        "trace" => LevelFilter::TRACE,
        "debug" => LevelFilter::DEBUG,
        "info" => LevelFilter::INFO,
        "warn" => LevelFilter::WARN,
        "error" => LevelFilter::ERROR,
        "off" | "none" => LevelFilter::OFF,
        _ => LevelFilter::INFO,
    }
}

/// Returns true if target == prefix or target starts with "prefix::"
fn matches_target(target: &str, prefix: &str) -> bool {
    target
        .strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with("::"))
}

// -------- rotating file writers --------

type Rotating = Arc<Mutex<FileRotate<AppendTimestamp>>>;

#[derive(Clone)]
struct RotWriter(Rotating);

impl Write for RotWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().flush()
    }
}

/// Writer for one record; `None` drops it.
struct RoutedWriter(Option<RotWriter>);

impl Write for RoutedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.0 {
            Some(w) => w.write(buf),
            None => Ok(buf.len()),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match &mut self.0 {
            Some(w) => w.flush(),
            None => Ok(()),
        }
    }
}

/// Sends each record to its subsystem's file, or to the default file.
#[derive(Default)]
struct FileRouter {
    default: Option<RotWriter>,
    by_target: Vec<(String, RotWriter)>,
}

impl FileRouter {
    fn resolve(&self, target: &str) -> Option<RotWriter> {
        self.by_target
            .iter()
            .filter(|(prefix, _)| matches_target(target, prefix))
            // longest prefix wins, as with `Targets`
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, w)| w.clone())
            .or_else(|| self.default.clone())
    }

    fn is_empty(&self) -> bool {
        self.default.is_none() && self.by_target.is_empty()
    }
}

impl<'a> fmt::MakeWriter<'a> for FileRouter {
    type Writer = RoutedWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RoutedWriter(self.default.clone())
    }

    fn make_writer_for(&'a self, meta: &tracing::Metadata<'_>) -> Self::Writer {
        RoutedWriter(self.resolve(meta.target()))
    }
}

/// Resolve a log file path against `base_dir`.
/// Absolute paths are kept as-is; relative paths are joined with `base_dir`.
fn resolve_log_path(file: &str, base_dir: &Path) -> PathBuf {
    let p = Path::new(file);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

fn open_rotating(section: &Section, base_dir: &Path) -> anyhow::Result<Option<RotWriter>> {
    if section.file.trim().is_empty() {
        return Ok(None);
    }
    let path = resolve_log_path(&section.file, base_dir);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let max_bytes = section.max_size_mb.unwrap_or(DEFAULT_MAX_SIZE_MB) * 1024 * 1024;
    let files = match section.max_backups {
        Some(n) => FileLimit::MaxFiles(n),
        None => FileLimit::Age(chrono::Duration::days(i64::from(
            section.max_age_days.unwrap_or(7),
        ))),
    };
    let rot = FileRotate::new(
        &path,
        AppendTimestamp::default(files),
        ContentLimit::BytesSurpassed(usize::try_from(max_bytes)?),
        Compression::None,
        #[cfg(unix)]
        None,
    );
    Ok(Some(RotWriter(Arc::new(Mutex::new(rot)))))
}

// -------- filters --------

/// Per-subsystem targets; `default` becomes the fallback level.
fn build_targets(cfg: &LoggingConfig, level_of: impl Fn(&Section) -> &str) -> Targets {
    let default = cfg
        .get(DEFAULT_SECTION)
        .map_or(LevelFilter::OFF, |s| parse_level(level_of(s)));

    cfg.iter()
        .filter(|(name, _)| name.as_str() != DEFAULT_SECTION)
        .fold(Targets::new().with_default(default), |targets, (name, s)| {
            targets.with_target(name.clone(), parse_level(level_of(s)))
        })
}

fn build_file_router(cfg: &LoggingConfig, base_dir: &Path) -> FileRouter {
    let mut router = FileRouter::default();
    for (name, section) in cfg {
        let writer = match open_rotating(section, base_dir) {
            Ok(Some(w)) => w,
            Ok(None) => continue,
            Err(e) => {
                eprintln!("Failed to init log file for '{name}': {} ({e})", section.file);
                continue;
            }
        };
        if name == DEFAULT_SECTION {
            router.default = Some(writer);
        } else {
            router.by_target.push((name.clone(), writer));
        }
    }
    router
}

// -------- public init --------

/// Initialize logging from a configuration.
/// - `cfg`: subsystem (tracing target prefix) → sinks and levels
/// - `base_dir`: base directory for relative log file paths (usually `home_dir`)
///
/// Console output is human-readable; files get one JSON object per line.
/// Safe to call more than once: later calls leave the first subscriber in place.
pub fn init_logging_from_config(cfg: &LoggingConfig, base_dir: &Path) {
    // Bridge `log` → `tracing` before installing the subscriber
    let _ = tracing_log::LogTracer::init();

    if cfg.is_empty() {
        let _ = tracing_subscriber::fmt()
            .with_target(true)
            .with_timer(UtcTime::rfc_3339())
            .try_init();
        return;
    }

    let console = fmt::layer()
        .with_ansi(std::io::stdout().is_terminal())
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339())
        .with_filter(build_targets(cfg, |s| s.console_level.as_str()));

    let router = build_file_router(cfg, base_dir);
    if router.is_empty() {
        let _ = Registry::default().with(console).try_init();
        return;
    }

    let file = fmt::layer()
        .json()
        .with_ansi(false)
        .with_target(true)
        .with_level(true)
        .with_timer(UtcTime::rfc_3339())
        .with_writer(router)
        .with_filter(build_targets(cfg, |s| s.file_level.as_str()));

    let _ = Registry::default().with(console).with(file).try_init();
}

// =================== tests ===================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_logging_config;
    use tempfile::tempdir;

    fn section(file: &str) -> Section {
        Section {
            console_level: "info".into(),
            file: file.into(),
            file_level: "debug".into(),
            max_age_days: Some(7),
            max_backups: Some(2),
            max_size_mb: Some(1),
        }
    }

    #[test]
    fn level_parsing() {
        assert_eq!(parse_level("trace"), LevelFilter::TRACE);
        assert_eq!(parse_level("DEBUG"), LevelFilter::DEBUG);
        assert_eq!(parse_level(" Warn "), LevelFilter::WARN);
        assert_eq!(parse_level("off"), LevelFilter::OFF);
        assert_eq!(parse_level("none"), LevelFilter::OFF);
        assert_eq!(parse_level("loud"), LevelFilter::INFO);
    }

    #[test]
    fn target_prefix_matching() {
        assert!(matches_target("site_auth", "site_auth"));
        assert!(matches_target("site_auth::domain::session", "site_auth"));
        assert!(!matches_target("site_authx", "site_auth"));
        assert!(!matches_target("runtime", "site_auth"));
    }

    #[test]
    fn subsystem_levels_override_default() {
        let mut cfg = default_logging_config();
        let mut auth = section("");
        auth.console_level = "trace".into();
        cfg.insert("site_auth".into(), auth);

        let targets = build_targets(&cfg, |s| s.console_level.as_str());
        assert!(targets.would_enable("site_auth::domain", &tracing::Level::TRACE));
        assert!(targets.would_enable("other", &tracing::Level::INFO));
        assert!(!targets.would_enable("other", &tracing::Level::DEBUG));
    }

    #[test]
    fn relative_paths_resolve_against_base_dir() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_log_path("logs/test.log", tmp.path());
        assert!(resolved.starts_with(tmp.path()));
        assert!(resolved.ends_with("logs/test.log"));
    }

    #[test]
    fn router_prefers_subsystem_file() {
        let tmp = tempdir().unwrap();
        let mut cfg = LoggingConfig::new();
        cfg.insert(DEFAULT_SECTION.into(), section("logs/app.log"));
        cfg.insert("site_auth".into(), section("nested/dir/auth.log"));
        cfg.insert("quiet".into(), section(""));

        let router = build_file_router(&cfg, tmp.path());
        assert!(tmp.path().join("nested/dir").exists(), "parent dir must be created");
        assert_eq!(router.by_target.len(), 1);

        let auth = router.resolve("site_auth::domain::service").unwrap();
        assert!(Arc::ptr_eq(&auth.0, &router.by_target[0].1 .0));

        let other = router.resolve("quiet").unwrap();
        assert!(Arc::ptr_eq(&other.0, &router.default.as_ref().unwrap().0));
    }
}
