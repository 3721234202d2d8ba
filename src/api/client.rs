use super::*;
use crate::game::Coord;
use crate::game::GameSession;
use crate::game::LegalMoves;

/// The request/response contract the sync layer consumes.
/// Implemented over HTTP in production and scripted in tests; the
/// seam exists so the turn machine and autoplay loop never know about
/// the wire.
#[async_trait::async_trait]
pub trait Api: Send + Sync {
    async fn create_session(&self, req: NewSessionRequest) -> Result<GameSession, ApiError>;
    async fn fetch_session(&self, id: &str) -> Result<GameSession, ApiError>;
    async fn legal_moves(&self, id: &str, hand_index: usize) -> Result<LegalMoves, ApiError>;
    async fn submit_move(&self, id: &str, hand_index: usize, at: Coord)
    -> Result<GameSession, ApiError>;
    async fn exchange_dead(&self, id: &str, hand_index: usize) -> Result<GameSession, ApiError>;
    async fn advance(&self, id: &str, steps: u32) -> Result<GameSession, ApiError>;
    async fn simulate(&self, trials: u32) -> Result<SimulationReport, ApiError>;
    async fn create_room(&self) -> Result<String, ApiError>;
}

/// Production transport over the server's REST API.
pub struct HttpApi {
    config: ApiConfig,
    http: reqwest::Client,
}

impl HttpApi {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }
    pub fn config(&self) -> &ApiConfig {
        &self.config
    }
    /// Decodes a successful body or turns an error response into the
    /// taxonomy: 4xx with a FastAPI `detail` string is a rejection,
    /// anything else an unexpected status.
    async fn decode<T>(response: reqwest::Response) -> Result<T, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }
        let body = response.text().await.unwrap_or_default();
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(String::from));
        match detail {
            Some(reason) if status.is_client_error() => Err(ApiError::Rejected(reason)),
            _ => Err(ApiError::Status(status.as_u16())),
        }
    }
}

#[async_trait::async_trait]
impl Api for HttpApi {
    async fn create_session(&self, req: NewSessionRequest) -> Result<GameSession, ApiError> {
        log::debug!("[api] create session ({} players)", req.n_players);
        let response = self
            .http
            .post(self.config.endpoint("game/new"))
            .json(&req)
            .send()
            .await?;
        Self::decode(response).await
    }
    async fn fetch_session(&self, id: &str) -> Result<GameSession, ApiError> {
        let response = self
            .http
            .get(self.config.endpoint(&format!("game/{}/state", id)))
            .send()
            .await?;
        Self::decode(response).await
    }
    async fn legal_moves(&self, id: &str, hand_index: usize) -> Result<LegalMoves, ApiError> {
        let response = self
            .http
            .get(self.config.endpoint(&format!(
                "game/{}/legal-moves?handIndex={}",
                id, hand_index
            )))
            .send()
            .await?;
        Self::decode(response).await
    }
    async fn submit_move(
        &self,
        id: &str,
        hand_index: usize,
        at: Coord,
    ) -> Result<GameSession, ApiError> {
        log::debug!("[api] submit hand {} at {}", hand_index, at);
        let response = self
            .http
            .post(self.config.endpoint(&format!("game/{}/move", id)))
            .json(&MoveRequest { hand_index, pos: at })
            .send()
            .await?;
        Self::decode(response).await
    }
    async fn exchange_dead(&self, id: &str, hand_index: usize) -> Result<GameSession, ApiError> {
        log::debug!("[api] exchange dead card at hand {}", hand_index);
        let response = self
            .http
            .post(self.config.endpoint(&format!("game/{}/replace-dead", id)))
            .json(&MoveRequest {
                hand_index,
                pos: Coord::new(0, 0),
            })
            .send()
            .await?;
        Self::decode(response).await
    }
    async fn advance(&self, id: &str, steps: u32) -> Result<GameSession, ApiError> {
        let response = self
            .http
            .post(self.config.endpoint(&format!("game/{}/ai-step", id)))
            .json(&StepRequest { steps })
            .send()
            .await?;
        Self::decode(response).await
    }
    async fn simulate(&self, trials: u32) -> Result<SimulationReport, ApiError> {
        log::info!("[api] running {} simulation trials", trials);
        let response = self
            .http
            .post(self.config.endpoint("simulate/monte-carlo"))
            .json(&SimulateRequest {
                trials,
                board_type: "standard".to_string(),
                ai_level: "smart".to_string(),
            })
            .send()
            .await?;
        Self::decode(response).await
    }
    async fn create_room(&self) -> Result<String, ApiError> {
        let response = self
            .http
            .post(self.config.endpoint("rooms/create"))
            .send()
            .await?;
        Self::decode::<RoomCreated>(response).await.map(|r| r.room_code)
    }
}
