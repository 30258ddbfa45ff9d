mod loader;

pub use loader::{
    Config, ConfigError, ConfigSource, LoadedConfig, NamespaceMatching, DEFAULT_CONFIG_NAMES,
};
