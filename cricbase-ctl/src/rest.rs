use async_trait::async_trait;
use cricbase_client::api::{
    Comment, CommentId, Cursor, DataSource, DeliveryId, DeliveryItem, Error, Match, MatchId,
    MatchStatus, NewComment, PlayerStats, TeamStats, Vote, VoteRequest,
};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};

const MAX_RETRIES: u32 = 3;

/// The backend's REST endpoints
pub struct RestSource {
    host: String,
    token: Option<String>,
    client: ClientWithMiddleware,
}

impl RestSource {
    pub fn new(host: &str, token: Option<String>) -> RestSource {
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(MAX_RETRIES);
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();
        RestSource {
            host: String::from(host.trim_end_matches('/')),
            token,
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.host, path)
    }

    async fn get<R>(&self, path: &str, query: &[(&str, String)]) -> Result<R, Error>
    where
        R: for<'de> serde::Deserialize<'de>,
    {
        tracing::debug!(path, "GET");
        decode(self.client.get(self.url(path)).query(query).send().await).await
    }

    /// Returns the raw response body
    async fn post<B: serde::Serialize>(&self, path: &str, body: &B) -> Result<Vec<u8>, Error> {
        tracing::debug!(path, "POST");
        let body = serde_json::to_vec(body)
            .map_err(|e| Error::Validation(format!("serializing request: {e}")))?;
        let mut req = self
            .client
            .post(self.url(path))
            .header(http::header::CONTENT_TYPE, "application/json")
            .body(body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        checked(req.send().await).await
    }
}

async fn checked(
    resp: Result<reqwest::Response, reqwest_middleware::Error>,
) -> Result<Vec<u8>, Error> {
    let resp = resp.map_err(|e| Error::Transport(e.to_string()))?;
    let status = resp.status();
    let body = resp
        .bytes()
        .await
        .map_err(|e| Error::Transport(format!("reading response: {e}")))?;
    if !status.is_success() {
        return Err(Error::from_response(status, &body));
    }
    Ok(body.to_vec())
}

async fn decode<R>(resp: Result<reqwest::Response, reqwest_middleware::Error>) -> Result<R, Error>
where
    R: for<'de> serde::Deserialize<'de>,
{
    let body = checked(resp).await?;
    serde_json::from_slice(&body).map_err(|e| Error::InvalidData(format!("decoding response: {e}")))
}

#[async_trait]
impl DataSource for RestSource {
    async fn fetch_feed(&self, limit: usize) -> Result<Vec<DeliveryItem>, Error> {
        self.get("deliveries/feed", &[("limit", limit.to_string())])
            .await
    }

    async fn fetch_delivery(&self, id: &DeliveryId) -> Result<DeliveryItem, Error> {
        self.get(&format!("deliveries/{id}"), &[]).await
    }

    async fn fetch_comments(&self, delivery: &DeliveryId) -> Result<Vec<Comment>, Error> {
        self.get(&format!("deliveries/{delivery}/comments"), &[])
            .await
    }

    async fn post_reply(
        &self,
        delivery: &DeliveryId,
        reply: &NewComment,
    ) -> Result<Comment, Error> {
        reply.validate()?;
        let body = self
            .post(&format!("deliveries/{delivery}/comments"), reply)
            .await?;
        serde_json::from_slice(&body).map_err(|e| Error::InvalidData(format!("decoding comment: {e}")))
    }

    async fn post_vote(&self, comment: &CommentId, vote: Vote) -> Result<(), Error> {
        // the body only carries a status message
        self.post(&format!("comments/{comment}/vote"), &VoteRequest { vote })
            .await?;
        Ok(())
    }

    async fn fetch_delivery_page(
        &self,
        match_id: &MatchId,
        cursor: Option<&Cursor>,
    ) -> Result<Vec<DeliveryItem>, Error> {
        let query = cursor
            .map(|c| vec![("last_doc_id", c.to_string())])
            .unwrap_or_default();
        self.get(&format!("deliveries/match/{match_id}"), &query)
            .await
    }

    async fn fetch_matches(&self, status: Option<MatchStatus>) -> Result<Vec<Match>, Error> {
        let query = status
            .map(|s| vec![("status", s.to_string())])
            .unwrap_or_default();
        self.get("matches", &query).await
    }

    async fn fetch_match(&self, id: &MatchId) -> Result<Match, Error> {
        self.get(&format!("matches/{id}"), &[]).await
    }

    async fn fetch_player_stats(&self) -> Result<Vec<PlayerStats>, Error> {
        self.get("stats/players", &[]).await
    }

    async fn fetch_team_stats(&self) -> Result<Vec<TeamStats>, Error> {
        self.get("stats/teams", &[]).await
    }
}
