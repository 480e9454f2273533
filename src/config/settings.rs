use serde::Deserialize;

/// Top-level configuration settings for the gateway.
///
/// Includes settings for the HTTP server, the document store and the MQTT broker.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub store: StoreSettings,
    pub mqtt: MqttSettings,
}

/// Configuration settings for the HTTP server.
///
/// Defines the host and port the server will bind to.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

/// Where telemetry is persisted.
#[derive(Debug, Deserialize, Clone)]
pub struct StoreSettings {
    pub path: String,
    /// Logical path of the single telemetry record.
    pub record: String,
}

/// Configuration settings for the outbound MQTT connection.
#[derive(Debug, Deserialize, Clone)]
pub struct MqttSettings {
    pub host: String,
    pub port: u16,
    pub client_id_prefix: String,
    pub command_topic: String,
    pub keep_alive_secs: u64,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize, Default)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub store: Option<PartialStoreSettings>,
    pub mqtt: Option<PartialMqttSettings>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub log_level: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialStoreSettings {
    pub path: Option<String>,
    pub record: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct PartialMqttSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub client_id_prefix: Option<String>,
    pub command_topic: Option<String>,
    pub keep_alive_secs: Option<u64>,
}

/// Provides default values for `Settings`.
///
/// With nothing configured the gateway listens on port 3000, keeps telemetry
/// under `cooler_status` and sends commands to `hydrochill/command` on the
/// public HiveMQ broker.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 3000,
                log_level: "info".to_string(),
            },
            store: StoreSettings {
                path: "hydrochill_db".to_string(),
                record: "cooler_status".to_string(),
            },
            mqtt: MqttSettings {
                host: "broker.hivemq.com".to_string(),
                port: 1883,
                client_id_prefix: "hydrochill-gateway".to_string(),
                command_topic: "hydrochill/command".to_string(),
                keep_alive_secs: 30,
            },
        }
    }
}

impl Settings {
    /// Fill every missing value in `partial` from the defaults.
    pub fn merged(partial: PartialSettings) -> Self {
        let default = Settings::default();
        let server = partial.server.unwrap_or_default();
        let store = partial.store.unwrap_or_default();
        let mqtt = partial.mqtt.unwrap_or_default();

        Settings {
            server: ServerSettings {
                host: server.host.unwrap_or(default.server.host),
                port: server.port.unwrap_or(default.server.port),
                log_level: server.log_level.unwrap_or(default.server.log_level),
            },
            store: StoreSettings {
                path: store.path.unwrap_or(default.store.path),
                record: store.record.unwrap_or(default.store.record),
            },
            mqtt: MqttSettings {
                host: mqtt.host.unwrap_or(default.mqtt.host),
                port: mqtt.port.unwrap_or(default.mqtt.port),
                client_id_prefix: mqtt
                    .client_id_prefix
                    .unwrap_or(default.mqtt.client_id_prefix),
                command_topic: mqtt.command_topic.unwrap_or(default.mqtt.command_topic),
                keep_alive_secs: mqtt.keep_alive_secs.unwrap_or(default.mqtt.keep_alive_secs),
            },
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
