use std::{fmt, fs, net::SocketAddr};

use clap::Parser;
use serde::{Deserialize, Serialize};

/// Schema of the `gui.toml` configuration file.  Every key is optional; the
/// command line (or the matching environment variable) wins over the file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuiConfig {
    /// Address the GUI listens on.
    pub listen_addr: String,
    /// "http" or "https"; how we reach the cluster-management REST API.
    pub backend_protocol: String,
    pub backend_host: String,
    pub backend_port: u16,
    /// Protocol the browser uses to reach us, handed to the dashboard page so
    /// its widget can call back into the data endpoint.
    pub gui_protocol: String,
    /// Namespace assigned to a session at sign-in.
    pub namespace: String,
    /// kube-apiserver the backend should forward service calls to.
    pub kubeapi_host: String,
    pub kubeapi_port: u16,
    /// When set, serve from this fixture file instead of the remote backend.
    pub fixtures: Option<String>,
    /// Seconds a session may sit unused before it is dropped.
    pub session_idle_secs: u64,
}

impl Default for GuiConfig {
    fn default() -> Self {
        GuiConfig {
            listen_addr: "0.0.0.0:8080".to_string(),
            backend_protocol: "https".to_string(),
            backend_host: "127.0.0.1".to_string(),
            backend_port: 8081,
            gui_protocol: "https".to_string(),
            namespace: "default".to_string(),
            kubeapi_host: "127.0.0.1".to_string(),
            kubeapi_port: 8080,
            fixtures: None,
            session_idle_secs: 3600,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(String, std::io::Error),
    Parse(String, toml::de::Error),
    BadListenAddr(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(path, err) => write!(f, "unable to read config {}: {}", path, err),
            ConfigError::Parse(path, err) => write!(f, "unable to parse config {}: {}", path, err),
            ConfigError::BadListenAddr(addr) => write!(f, "bad listen address: {}", addr),
        }
    }
}

impl std::error::Error for ConfigError {}

impl GuiConfig {
    pub fn from_toml_str(path: &str, contents: &str) -> Result<GuiConfig, ConfigError> {
        toml::from_str(contents).map_err(|err| ConfigError::Parse(path.to_string(), err))
    }

    pub fn load(path: &str) -> Result<GuiConfig, ConfigError> {
        let contents =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_string(), err))?;
        GuiConfig::from_toml_str(path, &contents)
    }

    pub fn listen_socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen_addr
            .parse()
            .map_err(|_| ConfigError::BadListenAddr(self.listen_addr.clone()))
    }
}

/// Command line for `gui-server`.
#[derive(Debug, Default, Parser)]
#[clap(name = "gui-server", about = "Web dashboard for the cluster-management API")]
pub struct GuiArgs {
    /// Path to a gui.toml configuration file.
    #[clap(long, short, value_parser, env = "GUI_CONFIG")]
    pub config: Option<String>,

    #[clap(long, value_parser, env = "GUI_LISTEN_ADDR")]
    pub listen_addr: Option<String>,

    #[clap(long, value_parser, env = "GUI_BACKEND_PROTOCOL")]
    pub backend_protocol: Option<String>,

    #[clap(long, value_parser, env = "GUI_BACKEND_HOST")]
    pub backend_host: Option<String>,

    #[clap(long, value_parser, env = "GUI_BACKEND_PORT")]
    pub backend_port: Option<u16>,

    #[clap(long, value_parser, env = "GUI_NAMESPACE")]
    pub namespace: Option<String>,

    /// Serve canned backend responses from this JSON file.
    #[clap(long, value_parser, env = "GUI_FIXTURES")]
    pub fixtures: Option<String>,

    #[clap(long, value_parser, env = "GUI_SESSION_IDLE_SECS")]
    pub session_idle_secs: Option<u64>,
}

impl GuiArgs {
    /// Load the config file (if any) and apply the command line on top.
    pub fn resolve(self) -> Result<GuiConfig, ConfigError> {
        let base = match &self.config {
            Some(path) => GuiConfig::load(path)?,
            None => GuiConfig::default(),
        };
        Ok(self.apply(base))
    }

    pub fn apply(self, mut config: GuiConfig) -> GuiConfig {
        if let Some(v) = self.listen_addr {
            config.listen_addr = v;
        }
        if let Some(v) = self.backend_protocol {
            config.backend_protocol = v;
        }
        if let Some(v) = self.backend_host {
            config.backend_host = v;
        }
        if let Some(v) = self.backend_port {
            config.backend_port = v;
        }
        if let Some(v) = self.namespace {
            config.namespace = v;
        }
        if self.fixtures.is_some() {
            config.fixtures = self.fixtures;
        }
        if let Some(v) = self.session_idle_secs {
            config.session_idle_secs = v;
        }
        config
    }
}
