use chrono::{SecondsFormat, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, field, instrument, Span};

use crate::domain::{
    overlay,
    ports::{BulkIndexItem, DocumentRef, DocumentStore},
    DomainError, Fields, Model, StoreError, ID_FIELD, UPDATED_AT_FIELD,
};

/// CRUD over any [`Model`], backed by a shared document store handle.
///
/// Every successful create, read and update overlays the store's answer onto
/// the model's data: first the identifier, then whatever source fields the
/// store returned. Store failures are returned as-is.
pub struct PersistenceService {
    store: Arc<dyn DocumentStore>,
}

impl PersistenceService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    #[instrument(skip_all, fields(index = %item.params().index, id = field::Empty))]
    pub async fn create<'m, M: Model>(&self, item: &'m mut M) -> Result<&'m mut M, DomainError> {
        item.validate()?;

        let batch = [BulkIndexItem {
            location: item.params().clone(),
            body: item.body(),
        }];
        let response = self.store.bulk_index(&batch).await?;
        let indexed = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::malformed("bulk response contained no items"))??;

        Span::current().record("id", indexed.id.as_str());
        debug!("document created");
        absorb(item, indexed.id, indexed.source);
        Ok(item)
    }

    #[instrument(skip_all, fields(index = %item.params().index, id = field::Empty))]
    pub async fn read<'m, M: Model>(&self, item: &'m mut M) -> Result<&'m mut M, DomainError> {
        let doc = locate(item, "read")?;
        Span::current().record("id", doc.id.as_str());

        let stored = self.store.get(&doc).await?;
        absorb(item, stored.id, stored.source);
        Ok(item)
    }

    /// Partial update. `updated_at` is stamped before the body is built, so
    /// the new timestamp is written too. Last write wins.
    #[instrument(skip_all, fields(index = %item.params().index, id = field::Empty))]
    pub async fn update<'m, M: Model>(&self, item: &'m mut M) -> Result<&'m mut M, DomainError> {
        let doc = locate(item, "update")?;
        Span::current().record("id", doc.id.as_str());
        item.validate()?;

        item.data_mut()
            .insert(UPDATED_AT_FIELD.to_string(), Value::String(timestamp()));

        let stored = self.store.update(&doc, &item.body()).await?;
        debug!("document updated");
        absorb(item, stored.id, stored.source);
        Ok(item)
    }

    /// Removes the stored document. The model keeps its `id`.
    #[instrument(skip_all, fields(index = %item.params().index, id = field::Empty))]
    pub async fn delete<M: Model>(&self, item: &M) -> Result<bool, DomainError> {
        let doc = locate(item, "delete")?;
        Span::current().record("id", doc.id.as_str());

        self.store.delete(&doc).await?;
        debug!("document deleted");
        Ok(true)
    }

    /// Update when the model already has an `id`, create otherwise.
    #[instrument(skip_all, fields(index = %item.params().index, id = field::Empty))]
    pub async fn save<'m, M: Model>(&self, item: &'m mut M) -> Result<&'m mut M, DomainError> {
        item.validate()?;

        if let Some(id) = item.id() {
            Span::current().record("id", id);
            self.update(item).await
        } else {
            self.create(item).await
        }
    }
}

fn locate<M: Model>(item: &M, operation: &str) -> Result<DocumentRef, DomainError> {
    item.id()
        .map(|id| DocumentRef::new(item.params(), id))
        .ok_or_else(|| DomainError::missing_identifier(operation))
}

fn absorb<M: Model>(item: &mut M, id: String, source: Fields) {
    let mut incoming = Fields::new();
    incoming.insert(ID_FIELD.to_string(), Value::String(id));
    overlay(&mut incoming, source);
    overlay(item.data_mut(), incoming);
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, false)
}
