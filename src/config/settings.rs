use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for the server, the broadcast hub, the message store
/// and logging.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct Settings {
    pub server: ServerSettings,
    pub hub: HubSettings,
    pub store: StoreSettings,
    pub log: LogSettings,
}

/// Configuration settings for the server.
///
/// Defines the host and port the server will bind to.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl ServerSettings {
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Configuration settings for the broadcast hub.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HubSettings {
    /// Messages buffered per listener before it is dropped.
    pub listener_queue_capacity: usize,
}

/// Configuration settings for the message store.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct StoreSettings {
    /// Optional hard cap on the number of stored messages.
    pub max_messages: Option<usize>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct LogSettings {
    pub level: String,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub hub: Option<PartialHubSettings>,
    pub store: Option<PartialStoreSettings>,
    pub log: Option<PartialLogSettings>,
}

#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
}

#[derive(Debug, Deserialize)]
pub struct PartialHubSettings {
    pub listener_queue_capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialStoreSettings {
    pub max_messages: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct PartialLogSettings {
    pub level: Option<String>,
}

impl PartialSettings {
    /// Fill every missing value from `Settings::default()`.
    pub fn merge_with_defaults(self) -> Settings {
        let default = Settings::default();

        Settings {
            server: ServerSettings {
                host: self
                    .server
                    .as_ref()
                    .and_then(|s| s.host.clone())
                    .unwrap_or(default.server.host),
                port: self
                    .server
                    .as_ref()
                    .and_then(|s| s.port)
                    .unwrap_or(default.server.port),
            },
            hub: HubSettings {
                listener_queue_capacity: self
                    .hub
                    .as_ref()
                    .and_then(|h| h.listener_queue_capacity)
                    .unwrap_or(default.hub.listener_queue_capacity),
            },
            store: StoreSettings {
                max_messages: self
                    .store
                    .as_ref()
                    .and_then(|s| s.max_messages)
                    .or(default.store.max_messages),
            },
            log: LogSettings {
                level: self
                    .log
                    .as_ref()
                    .and_then(|l| l.level.clone())
                    .unwrap_or(default.log.level),
            },
        }
    }
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            hub: HubSettings {
                listener_queue_capacity: 64,
            },
            store: StoreSettings { max_messages: None },
            log: LogSettings {
                level: "info".to_string(),
            },
        }
    }
}
