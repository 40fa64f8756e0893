//! Entity controller: connects page events to backend calls.
//!
//! Page state is shared behind a mutex and only touched between awaits, so
//! each completion applies its change to the page atomically. Concurrent
//! searches are not cancelled; by default whichever response lands last owns
//! the result container. With `discard_stale_responses` a generation counter
//! drops responses for searches that have been superseded.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use entity_core::{Entity, EntityId, Params};
use parking_lot::{Mutex, MutexGuard};

use crate::client::{ClientError, DeleteOutcome, EntityClient};
use crate::config::ClientConfig;
use crate::events::{bind_interactions, Action, Bindings, Event};
use crate::view::{Fragment, Page, StatusMessage};

/// What a finished search did to the page.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Rendered(Entity),
    /// A newer search was issued while this one was in flight.
    Stale,
}

/// What a finished delete did to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteReport {
    pub outcome: DeleteOutcome,
    /// Fragments hidden as a result.
    pub hidden: usize,
}

#[derive(Clone)]
pub struct EntityController {
    client: EntityClient,
    config: ClientConfig,
    page: Arc<Mutex<Page>>,
    bindings: Arc<Bindings>,
    generation: Arc<AtomicU64>,
}

impl EntityController {
    pub fn new(client: EntityClient, config: ClientConfig) -> Self {
        Self {
            client,
            config,
            page: Arc::new(Mutex::new(Page::new())),
            bindings: Arc::new(bind_interactions()),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        let client = EntityClient::from_config(&config)?;
        Ok(Self::new(client, config))
    }

    /// Lock the page. Do not hold the guard across an await.
    pub fn page(&self) -> MutexGuard<'_, Page> {
        self.page.lock()
    }

    /// Route a user event through the bindings and run the resulting action.
    ///
    /// Returns the action that ran, or `None` if no binding matched.
    pub async fn dispatch(&self, event: &Event) -> Result<Option<Action>, ClientError> {
        let action = {
            let page = self.page.lock();
            self.bindings.resolve(event, &page)
        };
        let Some(action) = action else {
            tracing::debug!("No binding for {:?}", event);
            return Ok(None);
        };

        match &action {
            Action::Search(id) => {
                self.search(id).await?;
            }
            Action::Delete(id) => {
                self.delete(id).await?;
            }
            Action::Submit(text) => {
                self.submit(text).await?;
            }
        }
        Ok(Some(action))
    }

    /// Fetch an entity and replace the result container with its fragment.
    pub async fn search(&self, id: &EntityId) -> Result<SearchOutcome, ClientError> {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.page
            .lock()
            .set_status(StatusMessage::info(format!("Searching for {}...", id)));

        let result = self.client.get_entity(id).await;

        if self.config.discard_stale_responses && self.generation.load(Ordering::SeqCst) != ticket {
            tracing::debug!("Discarding stale response for search {}", id);
            return Ok(SearchOutcome::Stale);
        }

        let mut page = self.page.lock();
        match result {
            Ok(entity) => {
                page.replace_results(
                    vec![Fragment::new(entity.clone(), false)],
                    self.config.fade_in(),
                );
                page.clear_status();
                tracing::info!("Rendered entity {} ({})", entity.id, entity.kind);
                Ok(SearchOutcome::Rendered(entity))
            }
            Err(e) => {
                tracing::warn!("Search for {} failed: {}", id, e);
                page.set_status(StatusMessage::error(format!(
                    "Search for {} failed: {}",
                    id, e
                )));
                Err(e)
            }
        }
    }

    /// Delete an entity and hide its fragments.
    pub async fn delete(&self, id: &EntityId) -> Result<DeleteReport, ClientError> {
        self.page
            .lock()
            .set_status(StatusMessage::info(format!("Deleting {}...", id)));

        let result = self.client.delete_entity(id).await;

        let mut page = self.page.lock();
        match result {
            Ok(outcome) => {
                let hidden = page.hide_entity(id);
                page.clear_status();
                tracing::info!("Deleted entity {} ({:?}, {} hidden)", id, outcome, hidden);
                Ok(DeleteReport { outcome, hidden })
            }
            Err(e) => {
                tracing::warn!("Delete of {} failed: {}", id, e);
                page.set_status(StatusMessage::error(format!(
                    "Delete of {} failed: {}",
                    id, e
                )));
                Err(e)
            }
        }
    }

    /// Post free text and fade the answer into the legacy status area.
    pub async fn submit(&self, text: &str) -> Result<(), ClientError> {
        let result = self.client.submit_text(text).await;

        let mut page = self.page.lock();
        match result {
            Ok(html) => {
                page.set_legacy(html, self.config.status_fade_in());
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Submit failed: {}", e);
                page.set_status(StatusMessage::error(format!("Submit failed: {}", e)));
                Err(e)
            }
        }
    }

    /// Fetch the parameters of an entity and expand its fragment in place.
    ///
    /// Not bound to any event; the page only renders collapsed fragments on
    /// its own. Returns `None` when the backend has no parameters.
    pub async fn load_params(&self, id: &EntityId) -> Result<Option<Params>, ClientError> {
        let result = self.client.get_params(id).await;

        let mut page = self.page.lock();
        match result {
            Ok(params) => {
                if let Some(fragment) = page.fragment_mut(id) {
                    let mut entity = fragment.entity.clone();
                    entity.param = params.clone();
                    let transition = fragment.transition;
                    *fragment = Fragment {
                        transition,
                        ..Fragment::new(entity, true)
                    };
                }
                Ok(params)
            }
            Err(e) => {
                tracing::warn!("Loading params of {} failed: {}", id, e);
                page.set_status(StatusMessage::error(format!(
                    "Loading params of {} failed: {}",
                    id, e
                )));
                Err(e)
            }
        }
    }
}
