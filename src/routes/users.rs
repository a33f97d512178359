use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::core::error::Error;
use crate::core::state::AppState;
use crate::types::response::UserWithPostCount;

#[instrument(skip(state))]
pub(crate) async fn get(
    State(state): State<AppState>,
) -> Result<Json<Vec<UserWithPostCount>>, Error> {
    let users = state.user_controller.top_users().await?;

    Ok(Json(users))
}
