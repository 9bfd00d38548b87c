use std::sync::Arc;

use sqlx::PgPool;

use crate::pipeline::WebhookPipeline;

#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub pipeline: Arc<WebhookPipeline>,
}
