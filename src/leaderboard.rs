//! Remote high-score table.
//!
//! After a game over the browser glue spawns [`Leaderboard::record`] as a detached
//! task. It fetches the current table, asks for initials when the score makes the
//! cut, submits, then redraws the table. Failures are logged and swallowed so the
//! game (and its reset button) never wait on the network.

use serde::Deserialize;
use wasm_bindgen::JsCast;
use wasm_bindgen::JsValue;
use wasm_bindgen_futures::JsFuture;

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ScoreEntry {
    pub name: String,
    pub score: i64,
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(thiserror::Error, Debug)]
pub enum LeaderboardError {
    #[error("Network error {action}: HTTP {status}")]
    Network { action: &'static str, status: u16 },
    #[error("Malformed leaderboard response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Browser error: {0}")]
    Js(String),
}

impl From<JsValue> for LeaderboardError {
    fn from(value: JsValue) -> Self {
        LeaderboardError::Js(value.as_string().unwrap_or_else(|| format!("{value:?}")))
    }
}

/// Remote score storage. Scores come back ordered best-first.
#[allow(async_fn_in_trait)]
pub trait ScoreService {
    async fn fetch_scores(&self) -> Result<Vec<ScoreEntry>, LeaderboardError>;
    async fn submit_score(&self, name: &str, score: i64) -> Result<(), LeaderboardError>;
}

/// Player-facing side of the leaderboard: the initials prompt and the table view.
pub trait LeaderboardUi {
    /// `None` when the player cancelled.
    fn ask_name(&self) -> Option<String>;
    fn show_scores(&self, scores: &[ScoreEntry]);
}

/// True when `score` earns a place in a best-first table of `table_size` entries.
pub fn qualifies(scores: &[ScoreEntry], score: i64, table_size: usize) -> bool {
    if scores.len() < table_size {
        return true;
    }
    let lowest = scores
        .iter()
        .take(table_size)
        .last()
        .map(|entry| entry.score)
        .unwrap_or(0);
    score > lowest
}

/// Trims, upper-cases and shortens typed initials. Blank input yields `None`.
pub fn sanitize_name(raw: &str, max_len: usize) -> Option<String> {
    let name: String = raw.trim().to_uppercase().chars().take(max_len).collect();
    (!name.is_empty()).then_some(name)
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Submission {
    NotQualified,
    /// Qualified, but the player gave no usable name.
    Skipped,
    Submitted(String),
}

pub struct Leaderboard<S, U> {
    service: S,
    ui: U,
    table_size: usize,
    max_name_len: usize,
}

impl<S: ScoreService, U: LeaderboardUi> Leaderboard<S, U> {
    pub fn new(service: S, ui: U, table_size: usize, max_name_len: usize) -> Self {
        Self {
            service,
            ui,
            table_size,
            max_name_len,
        }
    }

    pub async fn offer(&self, score: i64) -> Result<Submission, LeaderboardError> {
        let scores = self.service.fetch_scores().await?;
        let submission = if qualifies(&scores, score, self.table_size) {
            let name = self
                .ui
                .ask_name()
                .and_then(|raw| sanitize_name(&raw, self.max_name_len));
            match name {
                Some(name) => {
                    self.service.submit_score(&name, score).await?;
                    log::info!("submitted high score {score} for {name}");
                    Submission::Submitted(name)
                }
                None => Submission::Skipped,
            }
        } else {
            Submission::NotQualified
        };
        let refreshed = self.service.fetch_scores().await?;
        self.ui.show_scores(&refreshed);
        Ok(submission)
    }

    /// [`offer`](Self::offer) with errors logged instead of returned.
    pub async fn record(&self, score: i64) -> Option<Submission> {
        match self.offer(score).await {
            Ok(submission) => Some(submission),
            Err(err) => {
                log::error!("Leaderboard error: {err}");
                None
            }
        }
    }
}

/// Leaderboard backed by the deployed sheets script, reached with `fetch`.
pub struct HttpScoreService {
    base_url: String,
}

impl HttpScoreService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn submit_url(&self, name: &str, score: i64) -> String {
        let name = String::from(js_sys::encode_uri_component(name));
        format!("{}?action=submit&name={}&score={}", self.base_url, name, score)
    }

    async fn get_text(url: &str, action: &'static str) -> Result<String, LeaderboardError> {
        let window = web_sys::window().ok_or_else(|| LeaderboardError::Js("no window".into()))?;
        let response: web_sys::Response = JsFuture::from(window.fetch_with_str(url))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(LeaderboardError::Network {
                action,
                status: response.status(),
            });
        }
        let body = JsFuture::from(response.text()?).await?;
        body.as_string()
            .ok_or_else(|| LeaderboardError::Js("response body is not text".into()))
    }
}

impl ScoreService for HttpScoreService {
    async fn fetch_scores(&self) -> Result<Vec<ScoreEntry>, LeaderboardError> {
        let body = Self::get_text(&self.base_url, "getting highscores").await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn submit_score(&self, name: &str, score: i64) -> Result<(), LeaderboardError> {
        let body = Self::get_text(&self.submit_url(name, score), "submitting score").await?;
        // Body is a small `{ "ok": true }` ack; only its well-formedness matters.
        let _: serde_json::Value = serde_json::from_str(&body)?;
        Ok(())
    }
}
