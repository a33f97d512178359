use serde::Serialize;

use crate::types::upstream::Post;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub(crate) struct UserWithPostCount {
    pub(crate) id: String,
    pub(crate) name: String,
    #[serde(rename = "postsCount")]
    pub(crate) posts_count: usize,
}

/// An upstream post annotated with the name of the user who wrote it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct UserPost {
    #[serde(flatten)]
    pub(crate) post: Post,
    #[serde(rename = "userName")]
    pub(crate) user_name: String,
}

impl UserPost {
    pub(crate) fn new(mut post: Post, user_name: &str) -> Self {
        post.fields.remove("userName");

        Self {
            post,
            user_name: user_name.to_owned(),
        }
    }

    pub(crate) fn id(&self) -> i64 {
        self.post.id
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub(crate) struct PostWithCommentCount {
    #[serde(flatten)]
    pub(crate) post: UserPost,
    #[serde(rename = "commentsCount")]
    pub(crate) comments_count: usize,
}

impl PostWithCommentCount {
    pub(crate) fn new(mut post: UserPost, comments_count: usize) -> Self {
        post.post.fields.remove("commentsCount");

        Self {
            post,
            comments_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct Posts<T> {
    pub(crate) posts: Vec<T>,
}
