use std::sync::Arc;

use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use crate::handlers::{answer, event};
use crate::state::AppState;

/// Create the webhook router.
///
/// No auth middleware here: these endpoints are addressed by the vendor
/// platform, whose delivery contract is "always acknowledge".
pub fn create_webhook_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhooks/answer", post(answer::answer_handler))
        .route("/webhooks/event", post(event::event_handler))
        .layer(TraceLayer::new_for_http())
}
