//! Reqwest-backed client of the chapter REST backend.
//!
//! Owns transport details only: URL building, bearer auth, timeout, status
//! mapping and JSON decoding. Field-name normalization lives in `models`.

use std::fmt::Display;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use url::Url;
use uuid::Uuid;

use crate::repository::errors::{RepositoryError, RepositoryResult};

/// Correlates frontend log lines with backend ones.
const REQUEST_ID_HEADER: &str = "X-Request-Id";

#[derive(Clone)]
pub struct ApiRepository {
    client: Client,
    base: Url,
    token: Option<String>,
}

impl ApiRepository {
    /// Builds a client whose every request is bounded by `timeout`.
    pub fn new(base_url: &str, timeout: Duration, token: Option<String>) -> RepositoryResult<Self> {
        let base = Url::parse(base_url)?;
        if base.cannot_be_a_base() {
            return Err(RepositoryError::ValidationError(format!(
                "Backend url cannot be a base: {base_url}"
            )));
        }
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base,
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    /// Appends percent-encoded path segments to the base url.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> RepositoryResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| RepositoryError::ValidationError("Invalid backend url".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, segments: &[&str]) -> RepositoryResult<RequestBuilder> {
        let url = self.endpoint(segments)?;
        let request_id = Uuid::new_v4();
        log::debug!("{method} {url} [{request_id}]");
        let builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, request_id.to_string());
        Ok(match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        })
    }

    /// Sends the request and returns the raw body of a successful answer.
    pub(crate) async fn send(&self, builder: RequestBuilder) -> RepositoryResult<Vec<u8>> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(RepositoryError::from_status(status, body.as_ref()));
        }
        Ok(body.to_vec())
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> RepositoryResult<T> {
        let body = self.send(builder).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Maps list rows into domain records. Rows the domain rejects are logged
/// and skipped so one bad record cannot hide the rest of the page.
pub(crate) fn convert_rows<A, T>(rows: Vec<A>, kind: &str) -> Vec<T>
where
    T: TryFrom<A>,
    <T as TryFrom<A>>::Error: Display,
{
    rows.into_iter()
        .enumerate()
        .filter_map(|(index, row)| match T::try_from(row) {
            Ok(record) => Some(record),
            Err(err) => {
                log::warn!("Skipping {kind} row {index} from the backend: {err}");
                None
            }
        })
        .collect()
}

/// Turns a `NotFound` into `None` for single-record lookups.
pub(crate) fn optional<T>(result: RepositoryResult<T>) -> RepositoryResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(RepositoryError::NotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(base: &str) -> ApiRepository {
        ApiRepository::new(base, Duration::from_secs(5), None).unwrap()
    }

    #[test]
    fn endpoints_join_and_escape_segments() {
        let repo = client_for("https://api.example.org/api/");
        assert_eq!(
            repo.endpoint(&["users", "a b/c"]).unwrap().as_str(),
            "https://api.example.org/api/users/a%20b%2Fc"
        );

        let repo = client_for("https://api.example.org/api");
        assert_eq!(
            repo.endpoint(&["events"]).unwrap().as_str(),
            "https://api.example.org/api/events"
        );
    }

    #[test]
    fn rejects_unusable_base_urls() {
        assert!(ApiRepository::new("not a url", Duration::from_secs(1), None).is_err());
        assert!(ApiRepository::new("mailto:ops@example.org", Duration::from_secs(1), None).is_err());
    }

    #[test]
    fn requests_carry_a_request_id() {
        let repo = client_for("https://api.example.org/api/");
        let request = repo
            .request(Method::GET, &["users"])
            .unwrap()
            .build()
            .unwrap();
        let id = request.headers().get(REQUEST_ID_HEADER).unwrap();
        assert!(Uuid::parse_str(id.to_str().unwrap()).is_ok());
    }

    #[test]
    fn not_found_becomes_none() {
        assert!(matches!(optional::<()>(Err(RepositoryError::NotFound)), Ok(None)));
        assert!(optional::<()>(Err(RepositoryError::Backend("x".into()))).is_err());
    }
}
