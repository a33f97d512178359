use crate::controllers::post::PostController;
use crate::controllers::user::UserController;
use crate::core::client::Client;

#[derive(Clone, Debug)]
pub(crate) struct AppState {
    pub(crate) user_controller: UserController,
    pub(crate) post_controller: PostController,
}

impl AppState {
    pub(crate) fn new(client: Client, fan_out_limit: usize) -> Self {
        AppState {
            user_controller: UserController::new(client.clone(), fan_out_limit),
            post_controller: PostController::new(client, fan_out_limit),
        }
    }
}
