use crate::directives::DirectiveRegistry;
use crate::engine::{Context, ContextOptions};
use crate::env::Value;
use crate::filter::PathFilter;
use eyre::{Result, WrapErr};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

/// Main configuration for the preprocessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Built-in directive families to enable, in matching order
    pub directives: Vec<String>,
    /// File patterns to transform (empty means all)
    pub include: Vec<String>,
    /// File patterns to leave alone
    pub exclude: Vec<String>,
    /// Blank removed lines instead of dropping them
    pub preserve_line_numbers: bool,
    /// Directory patterns are resolved against (defaults to the process working directory)
    pub cwd: Option<PathBuf>,
    /// Symbols seeded into the environment
    pub define: BTreeMap<String, Value>,
}

impl Config {
    /// Load configuration from a file path
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        let config_file = match config_path {
            Some(path) => path.clone(),
            None => Self::default_config_path()?,
        };

        if config_file.exists() {
            let content = fs::read_to_string(&config_file).with_context(|| {
                format!("Failed to read config file: {}", config_file.display())
            })?;

            Self::from_yaml(&content).with_context(|| {
                format!("Failed to parse config file: {}", config_file.display())
            })
        } else if config_path.is_some() {
            Err(eyre::eyre!("Config file not found: {}", config_file.display()))
        } else {
            // Return default config if no file was found
            Ok(Self::default())
        }
    }

    /// Parse configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(content)?;
        // Reject unknown directive names early
        DirectiveRegistry::from_names(&config.directives)?;
        Ok(config)
    }

    /// Get the default configuration file path
    fn default_config_path() -> Result<PathBuf> {
        // Look for config files in order of preference
        let candidates = vec![
            PathBuf::from(".ppd.yaml"),
            PathBuf::from(".ppd.yml"),
            PathBuf::from("ppd.yaml"),
            PathBuf::from("ppd.yml"),
        ];

        for candidate in candidates {
            if candidate.exists() {
                return Ok(candidate);
            }
        }

        // If no config file found, return default location
        let config_dir = dirs::config_local_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
            .ok_or_else(|| eyre::eyre!("Could not determine config directory"))?;

        Ok(config_dir.join("ppd").join("config.yaml"))
    }

    /// Working directory for path patterns
    pub fn working_dir(&self) -> Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir().wrap_err("Could not determine current directory"),
        }
    }

    /// Build a transform context with the configured directives and symbols
    pub fn build_context(&self) -> Result<Context> {
        let directives = DirectiveRegistry::from_names(&self.directives)?;
        let mut context = Context::new(ContextOptions {
            directives,
            preserve_line_numbers: self.preserve_line_numbers,
        });

        for (name, value) in &self.define {
            context.env.set(name.clone(), value.clone());
        }

        Ok(context)
    }

    /// Build the file filter from include/exclude patterns
    pub fn build_filter(&self) -> Result<PathFilter> {
        PathFilter::new(self.working_dir()?, &self.include, &self.exclude)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            directives: DirectiveRegistry::builtin_names().iter().map(|s| s.to_string()).collect(),
            include: Vec::new(),
            exclude: vec!["**/node_modules/**".to_string(), "**/.git/**".to_string()],
            preserve_line_numbers: false,
            cwd: None,
            define: BTreeMap::new(),
        }
    }
}
