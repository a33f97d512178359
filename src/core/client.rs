use reqwest::StatusCode;
use reqwest::header::AUTHORIZATION;
use serde::de::DeserializeOwned;
use tracing::instrument;

use crate::core::config::Credentials;
use crate::core::error::{ConfigError, Error};
use crate::token::store::TokenCache;
use crate::types::upstream::{CommentsResponse, Post, PostsResponse, User, UsersResponse};

/// Authenticated client for the upstream test server.
#[derive(Clone)]
pub(crate) struct Client {
    client: reqwest::Client,
    url: String,
    tokens: TokenCache,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.url)
            .field("tokens", &self.tokens)
            .finish()
    }
}

impl Client {
    pub(crate) fn new(
        user_agent: &str,
        url: &str,
        credentials: Credentials,
    ) -> Result<Self, ConfigError> {
        let client = reqwest::ClientBuilder::new().user_agent(user_agent).build()?;

        let url = url.trim_end_matches('/').to_string();

        let tokens = TokenCache::new(client.clone(), format!("{url}/auth"), credentials);

        Ok(Self {
            client,
            url,
            tokens,
        })
    }

    #[cfg(test)]
    pub(crate) fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    async fn send(&self, path: &str, token: &str) -> Result<reqwest::Response, Error> {
        Ok(self
            .client
            .get(format!("{}{}", self.url, path))
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .send()
            .await?)
    }

    /// GET `path` with the current bearer token. A 401 refreshes the token and retries once;
    /// the second response is returned whatever its status. If the refreshed token is rejected
    /// too it is dropped, so the next call starts with a fresh exchange.
    #[instrument(skip(self))]
    pub(crate) async fn fetch_with_auth(&self, path: &str) -> Result<reqwest::Response, Error> {
        let token = self.tokens.get().await?;

        let response = self.send(path, &token).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        tracing::info!("Token rejected, refreshing token");

        self.tokens.invalidate_stale(&token).await;

        let token = self.tokens.get().await?;

        let response = self.send(path, &token).await?;

        if response.status() == StatusCode::UNAUTHORIZED {
            tracing::warn!("Refreshed token rejected, dropping it");
            self.tokens.invalidate().await;
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let response = self.fetch_with_auth(path).await?;

        match response.status() {
            status if status.is_success() => (),
            StatusCode::UNAUTHORIZED => {
                return Err(Error::UpstreamAuth(format!(
                    "{path} rejected a freshly issued token"
                )));
            }
            status => {
                return Err(Error::UpstreamStatus {
                    status,
                    path: path.to_owned(),
                });
            }
        }

        Ok(serde_json::from_str::<T>(&response.text().await?)?)
    }

    /// All users, in the order the upstream lists them.
    #[instrument(skip(self))]
    pub(crate) async fn users(&self) -> Result<Vec<User>, Error> {
        let users = self.get_json::<UsersResponse>("/users").await?.into_users();

        tracing::debug!("Fetched {} users", users.len());

        Ok(users)
    }

    #[instrument(skip(self))]
    pub(crate) async fn user_posts(&self, user_id: &str) -> Result<Vec<Post>, Error> {
        let posts = self
            .get_json::<PostsResponse>(&format!("/users/{user_id}/posts"))
            .await?
            .posts;

        tracing::debug!("Fetched {} posts for user {}", posts.len(), user_id);

        Ok(posts)
    }

    #[instrument(skip(self))]
    pub(crate) async fn post_comment_count(&self, post_id: i64) -> Result<usize, Error> {
        Ok(self
            .get_json::<CommentsResponse>(&format!("/posts/{post_id}/comments"))
            .await?
            .count())
    }
}
