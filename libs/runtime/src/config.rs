use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Logging section that applies to every target without its own section.
pub const DEFAULT_SECTION: &str = "default";

/// Directory under the user's home used when `home_dir` is not set.
const DEFAULT_SUBDIR: &str = ".dynamic-org-site";

/// Application configuration: a home directory, logging sinks and a
/// flexible per-module configuration bag.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base for relative paths (log files). Normalized to an absolute path on load.
    #[serde(default)]
    pub home_dir: String,
    /// Logging sections; `None` until a file or env var sets them.
    pub logging: Option<LoggingConfig>,
    /// Extra `<module>.yaml` files merged into `modules`.
    #[serde(default)]
    pub modules_dir: Option<String>,
    /// Raw module sections keyed by module name, decoded by each module.
    #[serde(default)]
    pub modules: HashMap<String, serde_json::Value>,
}

/// Tracing target prefix → sinks for that subsystem. `default` covers the rest.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Section {
    /// trace | debug | info | warn | error | off
    pub console_level: String,
    #[serde(default)]
    pub file: String, // "logs/site.log"; empty disables the file sink
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_age_days: Option<u32>,
    #[serde(default)]
    pub max_backups: Option<usize>,
    #[serde(default)]
    pub max_size_mb: Option<u64>,
}

/// Console at info, JSON file at debug under `home_dir/logs`.
pub fn default_logging_config() -> LoggingConfig {
    HashMap::from([(
        DEFAULT_SECTION.to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/dynamic-org-site.log".to_string(),
            file_level: "debug".to_string(),
            max_age_days: Some(7),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    )])
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            home_dir: String::new(),
            logging: Some(default_logging_config()),
            modules_dir: None,
            modules: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Built-in defaults, then the YAML file, then `APP__*` variables.
    /// `home_dir` comes back absolute and already created.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            bail!("config file not found: {}", config_path.display());
        }

        // Optional sections stay None unless YAML/ENV provide them.
        let defaults = AppConfig {
            logging: None,
            ..AppConfig::default()
        };

        let layered = Figment::new()
            .merge(Serialized::defaults(defaults))
            .merge(Yaml::file(config_path))
            // Example: APP__MODULES__SITE_AUTH__MIN_PASSWORD_LENGTH=8
            .merge(Env::prefixed("APP__").split("__"));

        let mut config: AppConfig = layered
            .extract()
            .context("invalid configuration")?;

        config.normalize_home_dir()?;

        if let Some(dir) = config.modules_dir.clone() {
            merge_module_files(&mut config.modules, dir)?;
        }

        Ok(config)
    }

    /// Load configuration from file or fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        let Some(path) = config_path else {
            let mut config = Self::default();
            config.normalize_home_dir()?;
            return Ok(config);
        };
        Self::load_layered(path)
    }

    /// Effective configuration as YAML, for `--print-config`.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("cannot render configuration as YAML")
    }

    /// `-v` raises the default console level to debug, `-vv` to trace.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut(DEFAULT_SECTION) {
            match args.verbose {
                0 => {}
                1 => default_section.console_level = "debug".to_string(),
                _ => default_section.console_level = "trace".to_string(),
            }
        }
    }

    /// Raw configuration section of one module, if present.
    pub fn module_config(&self, name: &str) -> Option<&serde_json::Value> {
        self.modules.get(name)
    }

    /// Logging sections to install; defaults when the file has none.
    pub fn logging_or_default(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_else(default_logging_config)
    }

    fn normalize_home_dir(&mut self) -> Result<()> {
        let resolved = resolve_home_dir(&self.home_dir).context("Failed to resolve home_dir")?;
        self.home_dir = resolved.to_string_lossy().to_string();
        Ok(())
    }
}

/// Command line flags that override the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub verbose: u8,
}

/// Expand a leading `~` or `~/`. `~user` forms are left alone.
fn expand_home(raw: &str) -> Result<PathBuf> {
    let rest = match raw {
        "~" => "",
        _ => match raw.strip_prefix("~/") {
            Some(rest) => rest,
            None => return Ok(PathBuf::from(raw)),
        },
    };
    Ok(dirs::home_dir()
        .context("cannot expand '~': no home directory")?
        .join(rest))
}

/// Expand `~`, make the path absolute and create the directory.
/// An empty value resolves to `$HOME/.dynamic-org-site`.
fn resolve_home_dir(raw: &str) -> Result<PathBuf> {
    let raw = raw.trim();
    let path = if raw.is_empty() {
        dirs::home_dir()
            .context("cannot determine the user's home directory")?
            .join(DEFAULT_SUBDIR)
    } else {
        expand_home(raw)?
    };

    let path = if path.is_absolute() {
        path
    } else {
        std::env::current_dir()?.join(path)
    };

    std::fs::create_dir_all(&path)
        .with_context(|| format!("cannot create {}", path.display()))?;
    Ok(path)
}

fn merge_module_files(
    bag: &mut HashMap<String, serde_json::Value>,
    dir: impl AsRef<Path>,
) -> Result<()> {
    use std::fs;
    let dir = dir.as_ref();
    if !dir.exists() {
        return Ok(());
    }
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let is_yaml = path
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yml") || ext.eq_ignore_ascii_case("yaml"));
        let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if !is_yaml {
            continue;
        }
        let raw = fs::read_to_string(&path)?;
        let val: serde_yaml::Value = serde_yaml::from_str(&raw)
            .with_context(|| format!("invalid module file {}", path.display()))?;
        bag.insert(name.to_string(), serde_json::to_value(val)?);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_config(dir: &Path, body: &str) -> PathBuf {
        let cfg_path = dir.join("cfg.yaml");
        fs::write(&cfg_path, body).unwrap();
        cfg_path
    }

    fn yaml_path(p: &Path) -> String {
        // Windows paths need forward slashes inside YAML strings
        p.to_string_lossy().replace('\\', "/")
    }

    #[test]
    fn test_default_config_structure() {
        let config = AppConfig::default();
        assert_eq!(config.home_dir, "");

        let logging = config.logging.as_ref().unwrap();
        let default_section = &logging[DEFAULT_SECTION];
        assert_eq!(default_section.console_level, "info");
        assert_eq!(default_section.file, "logs/dynamic-org-site.log");

        assert!(config.modules.is_empty());
    }

    #[test]
    fn test_load_layered_reads_logging_and_modules() {
        let tmp = tempdir().unwrap();
        let home = tmp.path().join("home");
        let yaml = format!(
            r#"
home_dir: "{}"

logging:
  default:
    console_level: debug
    file: "logs/default.log"
  site_auth:
    console_level: trace
    file: ""

modules:
  site_auth:
    min_password_length: 8
"#,
            yaml_path(&home)
        );
        let cfg_path = write_config(tmp.path(), &yaml);

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert!(Path::new(&config.home_dir).is_absolute());
        assert!(home.exists(), "home_dir is created on load");

        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging[DEFAULT_SECTION].console_level, "debug");
        assert_eq!(logging["site_auth"].console_level, "trace");

        let module = config.module_config("site_auth").unwrap();
        assert_eq!(module["min_password_length"], 8);
        assert!(config.module_config("missing").is_none());
    }

    #[test]
    fn test_minimal_yaml_leaves_optional_sections_empty() {
        let tmp = tempdir().unwrap();
        let yaml = format!("home_dir: \"{}\"\n", yaml_path(tmp.path()));
        let cfg_path = write_config(tmp.path(), &yaml);

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert!(config.logging.is_none());
        assert!(config.logging_or_default().contains_key(DEFAULT_SECTION));
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let tmp = tempdir().unwrap();
        let yaml = format!(
            "home_dir: \"{}\"\nserver:\n  port: 8087\n",
            yaml_path(tmp.path())
        );
        let cfg_path = write_config(tmp.path(), &yaml);

        assert!(AppConfig::load_layered(&cfg_path).is_err());
    }

    #[test]
    fn test_tilde_expands_only_for_current_user() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        assert_eq!(expand_home("~").unwrap(), home);
        assert_eq!(expand_home("~/site").unwrap(), home.join("site"));
        assert_eq!(expand_home("~alice/x").unwrap(), PathBuf::from("~alice/x"));
        assert_eq!(expand_home("/srv/site").unwrap(), PathBuf::from("/srv/site"));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let tmp = tempdir().unwrap();
        let err = AppConfig::load_layered(tmp.path().join("absent.yaml")).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_cli_verbose_levels_matrix() {
        for (verbose, expected) in [(0, "info"), (1, "debug"), (2, "trace"), (3, "trace")] {
            let mut config = AppConfig::default();
            config.apply_cli_overrides(&CliArgs {
                verbose,
            });
            let logging = config.logging.as_ref().unwrap();
            assert_eq!(logging[DEFAULT_SECTION].console_level, expected);
        }
    }

    #[test]
    fn test_cli_overrides_create_missing_logging() {
        let mut config = AppConfig {
            logging: None,
            ..AppConfig::default()
        };
        config.apply_cli_overrides(&CliArgs {
            verbose: 1,
        });
        assert_eq!(
            config.logging.unwrap()[DEFAULT_SECTION].console_level,
            "debug"
        );
    }

    #[test]
    fn test_layered_config_loading_with_modules_dir() {
        let tmp = tempdir().unwrap();
        let modules_dir = tmp.path().join("modules");
        fs::create_dir_all(&modules_dir).unwrap();
        fs::write(
            modules_dir.join("site_auth.yaml"),
            "users_collection: members\nmodal_transition_ms: 150\n",
        )
        .unwrap();
        fs::write(modules_dir.join("notes.txt"), "ignored").unwrap();

        let yaml = format!(
            r#"
home_dir: "{}"
modules_dir: "{}"
modules:
  existing_module:
    key: "value"
"#,
            yaml_path(tmp.path()),
            yaml_path(&modules_dir)
        );
        let cfg_path = write_config(tmp.path(), &yaml);

        let config = AppConfig::load_layered(&cfg_path).unwrap();
        assert!(config.modules.contains_key("existing_module"));
        assert!(!config.modules.contains_key("notes"));

        let site_auth = &config.modules["site_auth"];
        assert_eq!(site_auth["users_collection"], "members");
        assert_eq!(site_auth["modal_transition_ms"], 150);
    }

    #[test]
    fn test_to_yaml_roundtrip_basic() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("logging:"));

        let roundtrip: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(roundtrip.home_dir, config.home_dir);
    }

    #[test]
    fn test_home_dir_is_created() {
        let tmp = tempdir().unwrap();
        let resolved = resolve_home_dir(&yaml_path(&tmp.path().join("nested/home"))).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.exists());
    }
}
