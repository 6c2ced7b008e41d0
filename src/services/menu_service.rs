use std::sync::Arc;
use tracing::instrument;

use crate::models::{MessMenu, MessType, ServiceError, ServiceResult};
use crate::observability::{Metrics, StoreTracingMiddleware};
use crate::repositories::MenuRepository;

/// Looks up the menu of a mess in the document store
pub struct MenuService {
    repository: Arc<dyn MenuRepository>,
    metrics: Arc<Metrics>,
    store_tracing: StoreTracingMiddleware,
}

impl MenuService {
    pub fn new(repository: Arc<dyn MenuRepository>, metrics: Arc<Metrics>) -> Self {
        Self {
            repository,
            store_tracing: StoreTracingMiddleware::new(metrics.clone()),
            metrics,
        }
    }

    /// Fetch the menu for a requested mess type.
    ///
    /// The mess type is validated before the store is touched. An empty
    /// collection is reported as [`ServiceError::MenuNotFound`].
    #[instrument(skip(self), fields(mess_type = %mess_type))]
    pub async fn get_menu(&self, mess_type: &str) -> ServiceResult<MessMenu> {
        let mess_type: MessType = match mess_type.parse() {
            Ok(mess_type) => mess_type,
            Err(err) => {
                crate::info_with_trace!("Rejected unknown mess type");
                self.metrics.record_menu_request(None, err.outcome());
                return Err(err);
            }
        };

        let result = self.fetch_menu(mess_type).await;
        match &result {
            Ok(menu) => {
                crate::info_with_trace!("Fetched {} menu documents", menu.len());
                self.metrics
                    .record_menu_request(Some(mess_type.as_str()), "success");
            }
            Err(err @ ServiceError::Repository { .. }) => {
                crate::error_with_trace!(
                    mess_type = %mess_type,
                    error = %err,
                    "Error fetching menu for {}", mess_type
                );
                self.metrics
                    .record_menu_request(Some(mess_type.as_str()), err.outcome());
            }
            Err(err) => {
                crate::info_with_trace!("{}", err);
                self.metrics
                    .record_menu_request(Some(mess_type.as_str()), err.outcome());
            }
        }

        result
    }

    async fn fetch_menu(&self, mess_type: MessType) -> ServiceResult<MessMenu> {
        let collection = mess_type.as_str();
        let table = self.repository.table_name(collection);
        let documents = self
            .store_tracing
            .trace_operation("scan", &table, self.repository.fetch_collection(collection))
            .await?;

        if documents.is_empty() {
            return Err(ServiceError::MenuNotFound { mess_type });
        }

        Ok(MessMenu::from_documents(mess_type, documents))
    }
}
