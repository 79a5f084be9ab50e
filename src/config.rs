use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::codec::{ValueCodec, DEFAULT_MONEY_FIELD};
use crate::controller::{Page, WizardOptions, DEFAULT_SUBMIT_TEXT, DEFAULT_SUPPORT_MESSAGE};
use crate::steps::Step;
use crate::store::FileStore;
use crate::validation::RequiredFieldsValidator;
use crate::values::FormValues;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub wizard: WizardConfig,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Definition of the wizard driven by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WizardConfig {
    /// Key the in-progress answers are persisted under
    #[serde(default = "default_session_key")]
    pub session_key: String,
    /// Field stored in minor units and shown in major units (empty = none)
    #[serde(default = "default_money_field")]
    pub money_field: String,
    #[serde(default = "default_submit_text")]
    pub submit_text: String,
    /// Step indexes whose submit resets the stored slot selection
    #[serde(default)]
    pub storage_reset_steps: Vec<usize>,
    /// Selectable slots; the first is used when a reset runs
    #[serde(default)]
    pub available_slots: Vec<serde_json::Value>,
    #[serde(default = "default_support_message")]
    pub support_message: String,
    /// Attach a required-fields validator to every page
    #[serde(default = "default_require_fields")]
    pub require_fields: bool,
    /// Page routes; defaults to the step urls
    #[serde(default)]
    pub routes: Vec<String>,
    /// Defaults in storage form, used when nothing is persisted
    #[serde(default)]
    pub initial_values: FormValues,
    #[serde(default = "default_steps")]
    pub steps: Vec<Step>,
}

fn default_session_key() -> String {
    "multipage".to_string()
}

fn default_money_field() -> String {
    DEFAULT_MONEY_FIELD.to_string()
}

fn default_submit_text() -> String {
    DEFAULT_SUBMIT_TEXT.to_string()
}

fn default_support_message() -> String {
    DEFAULT_SUPPORT_MESSAGE.to_string()
}

fn default_require_fields() -> bool {
    true
}

fn default_steps() -> Vec<Step> {
    vec![
        Step::new("details", "/listing/details").with_fields(["title", "price"]),
        Step::new("contact", "/listing/contact").with_fields(["name", "email"]),
        Step::new("review", "/listing/review").with_fields(["terms"]),
    ]
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            session_key: default_session_key(),
            money_field: default_money_field(),
            submit_text: default_submit_text(),
            storage_reset_steps: Vec::new(),
            available_slots: Vec::new(),
            support_message: default_support_message(),
            require_fields: default_require_fields(),
            routes: Vec::new(),
            initial_values: FormValues::new(),
            steps: default_steps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Directory holding the session store and logs
    #[serde(default = "default_state_path")]
    pub state: String,
}

fn default_state_path() -> String {
    ".multipage".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            state: default_state_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Write logs to a file under the state directory instead of stderr
    #[serde(default)]
    pub to_file: bool,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            to_file: false,
        }
    }
}

impl Config {
    /// Path to the project-local config file
    pub fn local_config_path() -> PathBuf {
        PathBuf::from("multipage.toml")
    }

    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Start with embedded defaults so the CLI works without config files
        let defaults = Config::default();
        let defaults_json =
            serde_json::to_string(&defaults).context("Failed to serialize default config")?;

        let mut builder = config::Config::builder().add_source(config::File::from_str(
            &defaults_json,
            config::FileFormat::Json,
        ));

        // Project config in the working directory
        let local_config = Self::local_config_path();
        if local_config.exists() {
            builder = builder.add_source(config::File::from(local_config));
        }

        // User config in ~/.config/multipage/ (optional global overrides)
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("multipage").join("config.toml");
            if user_config.exists() {
                builder = builder.add_source(config::File::from(user_config));
            }
        }

        // Explicit config file (CLI override)
        if let Some(path) = config_path {
            builder = builder.add_source(config::File::from(Path::new(path)));
        }

        // Environment variables with MULTIPAGE_ prefix
        builder = builder.add_source(
            config::Environment::with_prefix("MULTIPAGE")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("Failed to load configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Save config to ./multipage.toml
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::local_config_path())
    }

    /// Save config as TOML to `path`
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).context("Failed to create config directory")?;
            }
        }

        let toml_str =
            toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        std::fs::write(path, toml_str).context("Failed to write config file")?;

        Ok(())
    }

    /// Get absolute path to state directory
    pub fn state_path(&self) -> PathBuf {
        let path = PathBuf::from(&self.paths.state);
        if path.is_absolute() {
            path
        } else {
            std::env::current_dir().unwrap_or_default().join(path)
        }
    }

    /// Get absolute path to logs directory
    pub fn logs_path(&self) -> PathBuf {
        self.state_path().join("logs")
    }

    /// Durable store for wizard sessions
    pub fn session_store(&self) -> FileStore {
        FileStore::in_dir(self.state_path())
    }

    pub fn codec(&self) -> ValueCodec {
        if self.wizard.money_field.is_empty() {
            ValueCodec::identity()
        } else {
            ValueCodec::new(self.wizard.money_field.clone())
        }
    }

    /// Build controller options for the configured wizard
    pub fn wizard_options(&self) -> WizardOptions {
        let wizard = &self.wizard;

        let pages = wizard
            .steps
            .iter()
            .map(|step| {
                if wizard.require_fields && !step.fields.is_empty() {
                    Page::new().with_validator(RequiredFieldsValidator::for_step(step))
                } else {
                    Page::new()
                }
            })
            .collect();

        let mut options = WizardOptions::new(wizard.session_key.clone(), wizard.steps.clone())
            .with_pages(pages)
            .with_storage_reset_steps(wizard.storage_reset_steps.iter().copied())
            .with_available_slots(wizard.available_slots.clone())
            .with_submit_text(wizard.submit_text.clone())
            .with_codec(self.codec())
            .with_support_message(wizard.support_message.clone());

        if !wizard.routes.is_empty() {
            options = options.with_routes(wizard.routes.iter().cloned());
        }
        if !wizard.initial_values.is_empty() {
            options = options.with_initial_values(wizard.initial_values.clone());
        }
        options
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            wizard: WizardConfig::default(),
            paths: PathsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
