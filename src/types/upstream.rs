//! Payloads exchanged with the upstream test server.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Deserialize)]
pub(crate) struct AuthResponse {
    pub(crate) access_token: String,
    /// Lifetime of `access_token` in seconds.
    pub(crate) expires_in: u64,
}

/// `GET /users` body. The upstream wraps the map in `users`, but a bare map is accepted too.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum UsersResponse {
    Wrapped { users: Map<String, Value> },
    Bare(Map<String, Value>),
}

impl UsersResponse {
    /// Users in upstream document order.
    pub(crate) fn into_users(self) -> Vec<User> {
        let users = match self {
            UsersResponse::Wrapped { users } => users,
            UsersResponse::Bare(users) => users,
        };

        users
            .into_iter()
            .map(|(id, name)| User {
                id,
                name: match name {
                    Value::String(name) => name,
                    other => other.to_string(),
                },
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct User {
    pub(crate) id: String,
    pub(crate) name: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PostsResponse {
    #[serde(default)]
    pub(crate) posts: Vec<Post>,
}

/// A post as returned by the upstream. Everything except `id` is carried through untouched.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub(crate) struct Post {
    pub(crate) id: i64,
    #[serde(flatten)]
    pub(crate) fields: Map<String, Value>,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct CommentsResponse {
    #[serde(default)]
    comments: Option<Vec<Value>>,
    // the upstream has been seen to misspell the key
    #[serde(default)]
    coments: Option<Vec<Value>>,
}

impl CommentsResponse {
    pub(crate) fn count(&self) -> usize {
        self.comments
            .as_ref()
            .or(self.coments.as_ref())
            .map(Vec::len)
            .unwrap_or(0)
    }
}
