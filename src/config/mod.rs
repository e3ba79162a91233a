use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::lifecycle::interceptor::DefinitionBroadcast;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleConfig {
    pub environment: Environment,
    pub dispatch: DispatchConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Default broadcast policy for new model definitions
    pub definition_broadcast: DefinitionBroadcast,
    /// Stamp created_at / updated_at on documents saved by the demo
    pub stamp_timestamps: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// tracing-subscriber EnvFilter directive used when RUST_LOG is unset
    pub filter: String,
}

impl LifecycleConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("LIFECYCLE_DEFINITION_BROADCAST") {
            match v.parse::<DefinitionBroadcast>() {
                Ok(policy) => self.dispatch.definition_broadcast = policy,
                Err(e) => tracing::warn!("Ignoring LIFECYCLE_DEFINITION_BROADCAST: {}", e),
            }
        }
        if let Ok(v) = env::var("LIFECYCLE_STAMP_TIMESTAMPS") {
            self.dispatch.stamp_timestamps = v.parse().unwrap_or(self.dispatch.stamp_timestamps);
        }
        if let Ok(v) = env::var("LIFECYCLE_LOG_FILTER") {
            self.logging.filter = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            dispatch: DispatchConfig {
                definition_broadcast: DefinitionBroadcast::All,
                stamp_timestamps: true,
            },
            logging: LoggingConfig {
                filter: "model_lifecycle=debug,lifecycle_demo=debug,info".to_string(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            dispatch: DispatchConfig {
                definition_broadcast: DefinitionBroadcast::All,
                stamp_timestamps: true,
            },
            logging: LoggingConfig {
                filter: "info".to_string(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            dispatch: DispatchConfig {
                definition_broadcast: DefinitionBroadcast::All,
                stamp_timestamps: true,
            },
            logging: LoggingConfig {
                filter: "warn".to_string(),
            },
        }
    }
}

// Global singleton config - initialized once on first use
pub static CONFIG: Lazy<LifecycleConfig> = Lazy::new(LifecycleConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static LifecycleConfig {
    &CONFIG
}
