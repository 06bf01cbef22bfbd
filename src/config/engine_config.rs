use serde::Deserialize;

/// Engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub logging: LoggingConfig,
    pub executor: ExecutorConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Executor limits
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum steps dispatched per run, counted across nested scopes
    pub max_steps: usize,
}

/// Content provider chain configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// First candidate in the fallback chain
    pub default_provider: String,

    /// Remaining candidates, tried in declared order
    pub fallback_providers: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { max_steps: 100 }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            default_provider: "simulated".to_string(),
            fallback_providers: Vec::new(),
        }
    }
}

impl ProvidersConfig {
    /// All configured provider names, default first, without duplicates
    pub fn provider_names(&self) -> Vec<&str> {
        let mut names = vec![self.default_provider.as_str()];
        for name in &self.fallback_providers {
            if !names.contains(&name.as_str()) {
                names.push(name);
            }
        }
        names
    }
}

impl EngineConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("ENGINE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
