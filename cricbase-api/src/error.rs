use anyhow::{anyhow, Context};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Transport failure: {0}")]
    Transport(String),
}

impl Error {
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    /// Maps a non-success response of the backend onto the error taxonomy
    ///
    /// The backend answers errors with `{"detail": ...}` bodies; anything else
    /// is kept verbatim as the message.
    pub fn from_response(status: http::StatusCode, body: &[u8]) -> Error {
        use http::StatusCode;
        let detail = match Error::parse_detail(body) {
            Ok(detail) => detail,
            Err(_) => String::from_utf8_lossy(body).into_owned(),
        };
        match status {
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => Error::Validation(detail),
            StatusCode::NOT_FOUND => Error::NotFound(detail),
            _ => Error::Transport(format!("{status}: {detail}")),
        }
    }

    fn parse_detail(body: &[u8]) -> anyhow::Result<String> {
        let data: serde_json::Value =
            serde_json::from_slice(body).context("parsing error contents")?;
        match data.get("detail") {
            Some(serde_json::Value::String(s)) => Ok(s.clone()),
            // validation failures carry a list of per-field problems
            Some(other) => Ok(other.to_string()),
            None => Err(anyhow!("error contents has no detail")),
        }
    }
}
