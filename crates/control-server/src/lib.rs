pub mod api;
pub mod state;

use std::sync::Arc;

use application::Registry;
use state::AppState;

pub fn setup_app_state(registry: Arc<Registry>) -> Arc<AppState> {
    Arc::new(AppState::new(registry))
}
