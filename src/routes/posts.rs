use axum::Json;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::request::{PostType, PostsQuery};
use crate::types::response::Posts;

#[instrument(skip_all)]
pub(crate) async fn get(
    State(state): State<AppState>,
    query: Result<Query<PostsQuery>, QueryRejection>,
) -> Result<Response, Error> {
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!("Rejected query string: {}", rejection);
        Error::InvalidPostType
    })?;

    let post_type = query.post_type()?;

    tracing::info!(?post_type, "Fetching posts");

    let response = match post_type {
        PostType::Latest => Json(Posts {
            posts: state.post_controller.latest().await?,
        })
        .into_response(),
        PostType::Popular => Json(Posts {
            posts: state.post_controller.popular().await?,
        })
        .into_response(),
    };

    Ok(response)
}
