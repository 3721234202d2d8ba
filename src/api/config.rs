/// Where the game server lives.
/// Base URL comes from the `API_URL` env var or a CLI flag; the
/// realtime endpoint is derived from it by scheme mapping, the same
/// way the web frontend builds its socket URL.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base: std::env::var("API_URL")
                .unwrap_or_else(|_| "http://localhost:8000/api".to_string()),
        }
    }
}

impl ApiConfig {
    pub fn new(base: impl Into<String>) -> Self {
        Self {
            base: base.into().trim_end_matches('/').to_string(),
        }
    }
    /// REST endpoint under the API base.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base.trim_end_matches('/'), path.trim_start_matches('/'))
    }
    /// WebSocket URL for a room: http becomes ws, https becomes wss,
    /// and the API path is replaced with `/ws/{room}` on the same host.
    pub fn ws_url(&self, room: &str) -> String {
        let (scheme, rest) = match self.base.split_once("://") {
            Some(("https", rest)) => ("wss", rest),
            Some((_, rest)) => ("ws", rest),
            None => ("ws", self.base.as_str()),
        };
        let host = rest.split('/').next().unwrap_or(rest);
        format!("{}://{}/ws/{}", scheme, host, room)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn endpoint_joins_cleanly() {
        let config = ApiConfig::new("http://localhost:8000/api/");
        assert_eq!(config.endpoint("/game/new"), "http://localhost:8000/api/game/new");
    }
    #[test]
    fn ws_url_maps_schemes() {
        assert_eq!(
            ApiConfig::new("http://localhost:8000/api").ws_url("ABCD"),
            "ws://localhost:8000/ws/ABCD"
        );
        assert_eq!(
            ApiConfig::new("https://seq.example.com/api").ws_url("ABCD"),
            "wss://seq.example.com/ws/ABCD"
        );
    }
}
