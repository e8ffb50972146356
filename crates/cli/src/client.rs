//! API client for communicating with the coaching service

use anyhow::{Context, Result};
use coach_lib::{
    store::UserSummary, MessageSource, RecentPerformance, RiskTier, UserProfile, WorkoutLog,
};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

/// API client for the coaching service
pub struct ApiClient {
    client: Client,
    base_url: Url,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let base_url = Url::parse(base_url).context("Invalid API URL")?;

        Ok(Self { client, base_url })
    }

    /// Endpoint URL with every segment percent-encoded, so user ids
    /// containing `/`, `?` or `#` stay inside their own segment
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("API URL cannot carry a path: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        self.get_url(self.url(segments)?).await
    }

    pub async fn get_url<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<T> {
        let url = self.url(segments)?;

        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .context("Failed to send request")?;

        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(e) => match e.code {
                    Some(code) => format!("{} [{}]", e.error, code),
                    None => e.error,
                },
                Err(_) => body,
            };
            anyhow::bail!("API error ({}): {}", status, detail);
        }

        response.json().await.context("Failed to parse response")
    }
}

// API response types

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub message: String,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserList {
    pub total: usize,
    pub users: Vec<UserSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileCreated {
    pub message: String,
    pub profile: UserProfile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutRecorded {
    pub message: String,
    pub date: String,
    pub workout_completed: bool,
    pub difficulty: u8,
    pub duration_minutes: u32,
    pub total_records: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutHistory {
    pub total_records: usize,
    pub recent_records: Vec<WorkoutLog>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoachingResponse {
    pub user_name: String,
    pub dropout_probability: f64,
    pub dropout_risk: RiskTier,
    pub current_difficulty: u8,
    pub recommended_difficulty: u8,
    pub ai_message: String,
    pub message_source: MessageSource,
    pub recent_performance: RecentPerformance,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_stays_in_one_segment() {
        let client = ApiClient::new("http://localhost:8000").unwrap();
        let url = client.url(&["users", "a/b?c#d", "profile"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/users/a%2Fb%3Fc%23d/profile"
        );
    }

    #[test]
    fn test_base_path_is_kept() {
        let client = ApiClient::new("http://coach.internal/api/").unwrap();
        let url = client.url(&["users", "user_001", "stats"]).unwrap();
        assert_eq!(url.as_str(), "http://coach.internal/api/users/user_001/stats");

        let root = client.url(&[]).unwrap();
        assert_eq!(root.as_str(), "http://coach.internal/api");
    }
}
