//! Request environment used to bind a map.

use serde::{Deserialize, Serialize};

/// The parts of a request environment that routing looks at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Environ {
    /// `Host` header, port included.
    pub http_host: Option<String>,

    pub server_name: String,

    pub server_port: String,

    /// `http` or `https`.
    pub url_scheme: String,

    /// Mount point of the application.
    pub script_name: String,

    pub path_info: String,

    pub query_string: String,
}

impl Default for Environ {
    fn default() -> Self {
        Self {
            http_host: None,
            server_name: "localhost".to_string(),
            server_port: "80".to_string(),
            url_scheme: "http".to_string(),
            script_name: String::new(),
            path_info: "/".to_string(),
            query_string: String::new(),
        }
    }
}

impl Environ {
    /// Environment for a request to `url`, as a front end would produce it.
    pub fn from_url(url: &url::Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_string();
        let http_host = match url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.clone(),
        };
        Self {
            http_host: Some(http_host),
            server_name: host,
            server_port: url
                .port_or_known_default()
                .map_or_else(|| "80".to_string(), |port| port.to_string()),
            url_scheme: url.scheme().to_string(),
            script_name: String::new(),
            path_info: url.path().to_string(),
            query_string: url.query().unwrap_or_default().to_string(),
        }
    }

    /// Host the request was made to.
    ///
    /// Uses the `Host` header, falling back to the server name with the
    /// port appended unless it is the scheme's default.
    pub fn host(&self) -> String {
        if let Some(host) = self.http_host.as_deref().filter(|h| !h.is_empty()) {
            return host.to_string();
        }
        let default_port = match self.url_scheme.as_str() {
            "https" => "443",
            _ => "80",
        };
        if self.server_port == default_port {
            self.server_name.clone()
        } else {
            format!("{}:{}", self.server_name, self.server_port)
        }
    }
}
