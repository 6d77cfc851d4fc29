use {
    crate::{env_subst::substitute_env, schema::SnapsendConfig},
    anyhow::{Context, Result},
    std::path::{Path, PathBuf},
    tracing::{debug, warn},
};

/// Stem of the config file; any supported extension may follow.
const CONFIG_STEM: &str = "snapsend";
const EXTENSIONS: &[&str] = &["toml", "yaml", "yml", "json"];

/// Supported on-disk formats, decided by file extension. A path without an
/// extension is treated as TOML.
enum Format {
    Toml,
    Yaml,
    Json,
}

impl Format {
    fn for_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") | None => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("json") => Ok(Self::Json),
            Some(other) => anyhow::bail!("unsupported config format: .{other}"),
        }
    }

    fn parse(&self, raw: &str) -> Result<SnapsendConfig> {
        Ok(match self {
            Self::Toml => toml::from_str(raw)?,
            Self::Yaml => serde_yaml::from_str(raw)?,
            Self::Json => serde_json::from_str(raw)?,
        })
    }
}

/// Load config from `path`, applying `${ENV_VAR}` substitution to the raw
/// text before parsing.
pub fn load_config(path: &Path) -> Result<SnapsendConfig> {
    let format = Format::for_path(path)?;
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    format.parse(&substitute_env(&raw))
}

/// Candidate config paths in priority order: project-local `./snapsend.*`,
/// then the user-global config directory.
fn candidate_paths() -> Vec<PathBuf> {
    let mut paths: Vec<PathBuf> = EXTENSIONS
        .iter()
        .map(|ext| PathBuf::from(format!("{CONFIG_STEM}.{ext}")))
        .collect();
    if let Some(dir) = config_dir() {
        paths.extend(EXTENSIONS.iter().map(|ext| dir.join(format!("{CONFIG_STEM}.{ext}"))));
    }
    paths
}

/// Discover and load config from standard locations.
///
/// Falls back to `SnapsendConfig::default()` when no file exists or the
/// file fails to parse (the failure is logged, not fatal — a booth with a
/// broken config file should still come up).
pub fn discover_and_load() -> SnapsendConfig {
    let Some(path) = candidate_paths().into_iter().find(|p| p.exists()) else {
        debug!("no config file found, using defaults");
        return SnapsendConfig::default();
    };
    match load_config(&path) {
        Ok(cfg) => {
            debug!(path = %path.display(), "loaded config");
            cfg
        },
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load config, using defaults");
            SnapsendConfig::default()
        },
    }
}

/// The user-global config directory (`~/.config/snapsend/`).
pub fn config_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", CONFIG_STEM).map(|d| d.config_dir().to_path_buf())
}

/// The config file that would be loaded: the first existing candidate, or
/// the default user-global TOML path when none exists yet.
pub fn find_or_default_config_path() -> PathBuf {
    candidate_paths()
        .into_iter()
        .find(|p| p.exists())
        .unwrap_or_else(|| {
            config_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(format!("{CONFIG_STEM}.toml"))
        })
}
