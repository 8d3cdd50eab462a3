//! Boot configuration for an [`Interpreter`](ren_interp) host process:
//! GC ballast/torture toggles, an optional cycle-limit, and the log
//! destination — the ambient "config layer" every crate in the teacher's
//! stack carries regardless of what the core itself does (SPEC_FULL.md
//! "Ambient stack"). Mirrors `core-config`'s
//! `#[derive(Deserialize)]`-struct-plus-`apply`-context shape: a
//! `ConfigFile` parses whatever is on disk with every field defaulted,
//! and `Config::apply` folds it into a host's already-running pieces
//! (here, an `Interpreter` and a log subscriber) rather than the parse
//! step reaching out and mutating anything itself.

use std::{fs, path::PathBuf};

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

/// GC boot knobs (§4.2 "Ballast and disable"). Field names match the
/// `Gc` setters they drive 1:1 so `apply` is a direct forward.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct GcConfig {
    #[serde(default = "GcConfig::default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub torture: bool,
    #[serde(default = "GcConfig::default_ballast_bytes")]
    pub ballast_bytes: usize,
}

impl GcConfig {
    const fn default_enabled() -> bool {
        true
    }
    const fn default_ballast_bytes() -> usize {
        1 << 20
    }
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            enabled: Self::default_enabled(),
            torture: false,
            ballast_bytes: Self::default_ballast_bytes(),
        }
    }
}

/// Evaluation boot knobs (§5 "Cancellation & timeouts").
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct LimitsConfig {
    /// `None` (absent in the file, or explicitly `0`) leaves a run
    /// unbounded — the same convention `Trampoline::set_cycle_limit`
    /// uses.
    #[serde(default)]
    pub cycle_limit: Option<u64>,
}

/// Log destination (SPEC_FULL.md: "configured exactly as
/// `ox-bin::AppStartup::configure_logging` does").
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_directory")]
    pub directory: PathBuf,
    #[serde(default = "LogConfig::default_file_name")]
    pub file_name: String,
}

impl LogConfig {
    fn default_directory() -> PathBuf {
        PathBuf::from(".")
    }
    fn default_file_name() -> String {
        "ren.log".to_string()
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            directory: Self::default_directory(),
            file_name: Self::default_file_name(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct ConfigFile {
    #[serde(default)]
    pub gc: GcConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    /// The raw file contents, kept for diagnostics; `None` when no file
    /// was found and defaults were used outright.
    pub raw: Option<String>,
    pub file: ConfigFile,
}

/// Best-effort config path: a local `ren.toml` first, then the
/// platform's config directory, matching `core-config::discover`'s
/// precedence.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("ren.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("ren").join("ren.toml");
    }
    PathBuf::from("ren.toml")
}

/// Load from `path`, falling back to [`discover`] when `None`. A
/// missing or unparsable file is not an error — defaults apply, the
/// same resilience `core-config::load_from` provides so a host never
/// refuses to boot over a bad config file.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config {
                raw: Some(content),
                file,
            }),
            Err(e) => {
                tracing::warn!(target: "config", path = %path.display(), error = %e, "config_parse_error_using_defaults");
                Ok(Config::default())
            }
        }
    } else {
        Ok(Config::default())
    }
}

impl Config {
    /// Fold the parsed GC/limits knobs into a freshly booted
    /// `Interpreter`. Kept generic over any type offering these setters
    /// rather than depending on `ren-interp` directly, so this crate
    /// never needs to know about the Cell/Stub model at all.
    pub fn apply<I: InterpreterConfigSink>(&self, interp: &mut I) {
        interp.set_gc_enabled(self.file.gc.enabled);
        interp.set_gc_torture(self.file.gc.torture);
        interp.set_gc_ballast(self.file.gc.ballast_bytes);
        interp.set_cycle_limit(self.file.limits.cycle_limit);
        info!(
            target: "config",
            gc_enabled = self.file.gc.enabled,
            gc_torture = self.file.gc.torture,
            gc_ballast_bytes = self.file.gc.ballast_bytes,
            cycle_limit = ?self.file.limits.cycle_limit,
            "config_applied"
        );
    }
}

/// The narrow surface `Config::apply` needs from a host interpreter.
/// `ren-interp::Interpreter` implements this directly; kept as a trait
/// here (rather than a hard dependency) so `ren-config` stays a leaf
/// crate in the workspace's dependency graph, the way `core-config`
/// never depends on `core-model`.
pub trait InterpreterConfigSink {
    fn set_gc_enabled(&mut self, on: bool);
    fn set_gc_torture(&mut self, on: bool);
    fn set_gc_ballast(&mut self, bytes: usize);
    fn set_cycle_limit(&mut self, limit: Option<u64>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeSink {
        gc_enabled: Option<bool>,
        gc_torture: Option<bool>,
        gc_ballast: Option<usize>,
        cycle_limit: Option<Option<u64>>,
    }

    impl InterpreterConfigSink for FakeSink {
        fn set_gc_enabled(&mut self, on: bool) {
            self.gc_enabled = Some(on);
        }
        fn set_gc_torture(&mut self, on: bool) {
            self.gc_torture = Some(on);
        }
        fn set_gc_ballast(&mut self, bytes: usize) {
            self.gc_ballast = Some(bytes);
        }
        fn set_cycle_limit(&mut self, limit: Option<u64>) {
            self.cycle_limit = Some(limit);
        }
    }

    #[test]
    fn default_config_when_missing_file() {
        let cfg = load_from(Some(PathBuf::from("__nonexistent_hopefully__.toml"))).unwrap();
        assert!(cfg.file.gc.enabled);
        assert!(!cfg.file.gc.torture);
        assert_eq!(cfg.file.gc.ballast_bytes, 1 << 20);
        assert_eq!(cfg.file.limits.cycle_limit, None);
    }

    #[test]
    fn parses_gc_and_limits_tables() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(
            tmp.path(),
            "[gc]\ntorture = true\nballast_bytes = 4096\n[limits]\ncycle_limit = 10000\n",
        )
        .unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert!(cfg.file.gc.torture);
        assert_eq!(cfg.file.gc.ballast_bytes, 4096);
        assert_eq!(cfg.file.limits.cycle_limit, Some(10000));
    }

    #[test]
    fn unparsable_file_falls_back_to_defaults() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "not valid toml [[[").unwrap();
        let cfg = load_from(Some(tmp.path().to_path_buf())).unwrap();
        assert_eq!(cfg.file, ConfigFile::default());
    }

    #[test]
    fn apply_forwards_every_knob_to_the_sink() {
        let mut cfg = Config::default();
        cfg.file.gc.enabled = false;
        cfg.file.gc.torture = true;
        cfg.file.gc.ballast_bytes = 77;
        cfg.file.limits.cycle_limit = Some(5);

        let mut sink = FakeSink::default();
        cfg.apply(&mut sink);
        assert_eq!(sink.gc_enabled, Some(false));
        assert_eq!(sink.gc_torture, Some(true));
        assert_eq!(sink.gc_ballast, Some(77));
        assert_eq!(sink.cycle_limit, Some(Some(5)));
    }
}
