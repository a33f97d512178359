use tracing::instrument;

use crate::core::client::Client;
use crate::core::error::Error;
use crate::types::response::UserWithPostCount;
use crate::utils::fanout::fan_out;

pub(crate) const TOP_USERS: usize = 5;

#[derive(Clone, Debug)]
pub(crate) struct UserController {
    client: Client,
    fan_out_limit: usize,
}

impl UserController {
    pub(crate) fn new(client: Client, fan_out_limit: usize) -> Self {
        Self {
            client,
            fan_out_limit,
        }
    }

    /// The users with the most posts, most prolific first.
    #[instrument(skip(self))]
    pub(crate) async fn top_users(&self) -> Result<Vec<UserWithPostCount>, Error> {
        let users = self.client.users().await?;

        let client = &self.client;

        let counted = fan_out(users, self.fan_out_limit, move |user| async move {
            let posts = client.user_posts(&user.id).await?;

            tracing::debug!("User {} ({}) has {} posts", user.id, user.name, posts.len());

            Ok(UserWithPostCount {
                id: user.id,
                name: user.name,
                posts_count: posts.len(),
            })
        })
        .await?;

        let top = rank_users(counted);

        tracing::info!("Returning top {} users", top.len());

        Ok(top)
    }
}

/// Sorts by post count, descending, and keeps the first `TOP_USERS`. Equal counts keep their
/// incoming order.
pub(crate) fn rank_users(mut users: Vec<UserWithPostCount>) -> Vec<UserWithPostCount> {
    users.sort_by(|a, b| b.posts_count.cmp(&a.posts_count));
    users.truncate(TOP_USERS);
    users
}
