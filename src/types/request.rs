use serde::Deserialize;
use std::str::FromStr;

use crate::core::error::Error;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct PostsQuery {
    #[serde(rename = "type")]
    pub(crate) kind: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PostType {
    Latest,
    Popular,
}

impl FromStr for PostType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "latest" => Ok(PostType::Latest),
            "popular" => Ok(PostType::Popular),
            _ => Err(Error::InvalidPostType),
        }
    }
}

impl PostsQuery {
    pub(crate) fn post_type(&self) -> Result<PostType, Error> {
        self.kind
            .as_deref()
            .ok_or(Error::InvalidPostType)?
            .parse()
    }
}
