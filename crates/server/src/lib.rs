use std::sync::Arc;

use db::{DBService, DbErr};

pub mod error;
pub mod http;
pub mod middleware;
pub mod routes;

#[cfg(test)]
pub mod test_support;

use routes::translation::{AUTO_TRANSLATE_DELAY, FieldDebouncer};

/// Shared handler state: the database service plus anything the routes need.
#[derive(Clone)]
pub struct AppState {
    db: DBService,
    translation_debouncer: Arc<FieldDebouncer>,
}

impl AppState {
    pub async fn new() -> Result<Self, DbErr> {
        let db = DBService::new().await?;
        Ok(Self {
            db,
            translation_debouncer: Arc::new(FieldDebouncer::new(AUTO_TRANSLATE_DELAY)),
        })
    }

    pub fn db(&self) -> &DBService {
        &self.db
    }

    pub fn translation_debouncer(&self) -> &FieldDebouncer {
        &self.translation_debouncer
    }
}
