use tracing::instrument;

use crate::core::client::Client;
use crate::core::error::Error;
use crate::types::response::{PostWithCommentCount, UserPost};
use crate::utils::fanout::fan_out;

pub(crate) const LATEST_POSTS: usize = 10;

#[derive(Clone, Debug)]
pub(crate) struct PostController {
    client: Client,
    fan_out_limit: usize,
}

impl PostController {
    pub(crate) fn new(client: Client, fan_out_limit: usize) -> Self {
        Self {
            client,
            fan_out_limit,
        }
    }

    /// Every user's posts, annotated with the author's name, flattened in user order.
    async fn all_posts(&self) -> Result<Vec<UserPost>, Error> {
        let users = self.client.users().await?;

        let client = &self.client;

        let per_user = fan_out(users, self.fan_out_limit, move |user| async move {
            let posts = client.user_posts(&user.id).await?;

            Ok(posts
                .into_iter()
                .map(|post| UserPost::new(post, &user.name))
                .collect::<Vec<_>>())
        })
        .await?;

        Ok(per_user.into_iter().flatten().collect())
    }

    /// The newest posts, using the post id as a stand-in for creation time.
    #[instrument(skip(self))]
    pub(crate) async fn latest(&self) -> Result<Vec<UserPost>, Error> {
        let posts = latest(self.all_posts().await?);

        tracing::info!("Returning {} latest posts", posts.len());

        Ok(posts)
    }

    /// Every post sharing the highest comment count.
    #[instrument(skip(self))]
    pub(crate) async fn popular(&self) -> Result<Vec<PostWithCommentCount>, Error> {
        let posts = self.all_posts().await?;

        let client = &self.client;

        let counted = fan_out(posts, self.fan_out_limit, move |post| async move {
            let comments_count = client.post_comment_count(post.id()).await?;

            Ok(PostWithCommentCount::new(post, comments_count))
        })
        .await?;

        let popular = most_commented(counted);

        tracing::info!("Returning {} popular posts", popular.len());

        Ok(popular)
    }
}

/// Sorts by id, descending, and keeps the first `LATEST_POSTS`.
pub(crate) fn latest(mut posts: Vec<UserPost>) -> Vec<UserPost> {
    posts.sort_by(|a, b| b.id().cmp(&a.id()));
    posts.truncate(LATEST_POSTS);
    posts
}

/// Keeps the posts whose comment count equals the maximum, in their incoming order.
pub(crate) fn most_commented(posts: Vec<PostWithCommentCount>) -> Vec<PostWithCommentCount> {
    let max_comments = posts
        .iter()
        .map(|post| post.comments_count)
        .max()
        .unwrap_or(0);

    tracing::info!("Maximum comments found: {}", max_comments);

    posts
        .into_iter()
        .filter(|post| post.comments_count == max_comments)
        .collect()
}
