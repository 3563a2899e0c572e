use crate::model::Mesh;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

pub const DEFAULT_MESHES: [&str; 3] = ["bare-metal", "svcmesh-linkerd", "svcmesh-istio"];
pub const DEFAULT_INSTANCE: &str = "emojivoto";

/// Settings of one merge pass over all meshes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergerConfig {
    #[serde(default = "default_meshes")]
    pub meshes: Vec<Mesh>,
    /// Value of the `instance` grouping key used when pushing
    #[serde(default = "default_instance")]
    pub instance: String,
    #[serde(with = "humantime_serde_option", default)]
    pub query_timeout: Option<Duration>,
    #[serde(with = "humantime_serde_option", default)]
    pub push_timeout: Option<Duration>,
    /// Continue with the remaining meshes when one fails
    #[serde(default)]
    pub keep_going: bool,
}

/// TOML files keep the settings under a `[merger]` table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergerConfigFile {
    pub merger: MergerConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceConfig {
    /// Base URL of the Prometheus server
    pub url: String,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GatewayConfig {
    /// Push gateway address, `host:port` or a full URL
    pub address: String,
    pub instance: String,
    pub timeout: Option<Duration>,
}

fn default_meshes() -> Vec<Mesh> {
    DEFAULT_MESHES.iter().map(|m| Mesh::from(*m)).collect()
}

fn default_instance() -> String {
    DEFAULT_INSTANCE.to_string()
}

impl Default for MergerConfig {
    fn default() -> Self {
        Self {
            meshes: default_meshes(),
            instance: default_instance(),
            query_timeout: None,
            push_timeout: None,
            keep_going: false,
        }
    }
}

impl MergerConfig {
    pub fn builder() -> MergerConfigBuilder {
        MergerConfigBuilder::default()
    }

    pub fn source_config(&self, url: impl Into<String>) -> SourceConfig {
        SourceConfig {
            url: url.into(),
            timeout: self.query_timeout,
        }
    }

    pub fn gateway_config(&self, address: impl Into<String>) -> GatewayConfig {
        GatewayConfig {
            address: address.into(),
            instance: self.instance.clone(),
            timeout: self.push_timeout,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.meshes.is_empty() {
            return Err("At least one mesh must be configured".to_string());
        }

        let mut seen = HashSet::new();
        for (i, mesh) in self.meshes.iter().enumerate() {
            if mesh.as_str().is_empty() {
                return Err(format!("Mesh {} name cannot be empty", i));
            }
            if mesh.as_str().contains('/') {
                return Err(format!("Mesh '{}' name cannot contain '/'", mesh));
            }
            if !seen.insert(mesh) {
                return Err(format!("Mesh '{}' is listed more than once", mesh));
            }
        }

        if self.instance.is_empty() {
            return Err("Instance cannot be empty".to_string());
        }
        if self.instance.contains('/') {
            return Err(format!("Instance '{}' cannot contain '/'", self.instance));
        }

        for (name, timeout) in [
            ("query_timeout", self.query_timeout),
            ("push_timeout", self.push_timeout),
        ] {
            if timeout.map_or(false, |t| t.is_zero()) {
                return Err(format!("{} must be > 0", name));
            }
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct MergerConfigBuilder {
    meshes: Vec<Mesh>,
    instance: Option<String>,
    query_timeout: Option<Duration>,
    push_timeout: Option<Duration>,
    keep_going: bool,
}

impl MergerConfigBuilder {
    pub fn add_mesh(mut self, mesh: impl Into<String>) -> Self {
        self.meshes.push(Mesh::new(mesh));
        self
    }

    pub fn instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = Some(timeout);
        self
    }

    pub fn push_timeout(mut self, timeout: Duration) -> Self {
        self.push_timeout = Some(timeout);
        self
    }

    pub fn keep_going(mut self, keep_going: bool) -> Self {
        self.keep_going = keep_going;
        self
    }

    pub fn build(self) -> MergerConfig {
        MergerConfig {
            meshes: if self.meshes.is_empty() {
                default_meshes()
            } else {
                self.meshes
            },
            instance: self.instance.unwrap_or_else(default_instance),
            query_timeout: self.query_timeout,
            push_timeout: self.push_timeout,
            keep_going: self.keep_going,
        }
    }
}

mod humantime_serde_option {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&humantime::format_duration(*d).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let opt = Option::<String>::deserialize(deserializer)?;
        opt.map(|s| humantime::parse_duration(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}
