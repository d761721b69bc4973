//! In-memory [`RemoteStore`] used as a test double across the workspace.

use crate::error::{CatalogError, RemoteOperation, Result, StoreKind};
use crate::remote::{RemoteStore, UploadRequest, UploadedAsset};
use crate::types::{RemoteEntry, TagSet};
use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    entries: Vec<RemoteEntry>,
    failing: HashSet<(RemoteOperation, String)>,
    mutations: usize,
}

/// Remote store held in memory, with per-asset failure injection
#[derive(Debug, Default)]
pub struct InMemoryRemote {
    state: Mutex<State>,
}

impl InMemoryRemote {
    pub fn new(entries: Vec<RemoteEntry>) -> Self {
        Self {
            state: Mutex::new(State {
                entries,
                ..Default::default()
            }),
        }
    }

    /// Make `operation` fail for `name` until cleared
    pub fn fail(&self, operation: RemoteOperation, name: &str) {
        self.lock().failing.insert((operation, name.to_string()));
    }

    pub fn clear_failures(&self) {
        self.lock().failing.clear();
    }

    /// Number of mutating calls received, failed ones included
    pub fn mutation_count(&self) -> usize {
        self.lock().mutations
    }

    pub fn entry(&self, name: &str) -> Option<RemoteEntry> {
        self.lock().entries.iter().find(|e| e.name == name).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("in-memory remote mutex poisoned")
    }

    fn mutate(
        &self,
        operation: RemoteOperation,
        name: &str,
        apply: impl FnOnce(&mut RemoteEntry),
    ) -> Result<()> {
        let mut state = self.lock();
        state.mutations += 1;
        if state.failing.contains(&(operation, name.to_string())) {
            return Err(CatalogError::remote(operation, Some(name), "injected failure"));
        }
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.name == name)
            .ok_or_else(|| CatalogError::not_found(name, StoreKind::Remote))?;
        apply(entry);
        Ok(())
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn fetch_all(&self) -> Result<Vec<RemoteEntry>> {
        Ok(self.lock().entries.clone())
    }

    async fn set_tags(&self, name: &str, tags: &TagSet) -> Result<()> {
        self.mutate(RemoteOperation::SetTags, name, |entry| {
            entry.tags = tags.clone();
        })
    }

    async fn set_language(&self, name: &str, language: &str) -> Result<()> {
        self.mutate(RemoteOperation::SetLanguage, name, |entry| {
            entry.language = Some(language.to_string());
        })
    }

    async fn destroy(&self, name: &str) -> Result<()> {
        let mut state = self.lock();
        state.mutations += 1;
        if state
            .failing
            .contains(&(RemoteOperation::Destroy, name.to_string()))
        {
            return Err(CatalogError::remote(
                RemoteOperation::Destroy,
                Some(name),
                "injected failure",
            ));
        }
        let before = state.entries.len();
        state.entries.retain(|e| e.name != name);
        if state.entries.len() == before {
            return Err(CatalogError::not_found(name, StoreKind::Remote));
        }
        Ok(())
    }

    async fn upload(&self, request: &UploadRequest) -> Result<UploadedAsset> {
        let mut state = self.lock();
        state.mutations += 1;
        if state
            .failing
            .contains(&(RemoteOperation::Upload, request.name.clone()))
        {
            return Err(CatalogError::remote(
                RemoteOperation::Upload,
                Some(&request.name),
                "injected failure",
            ));
        }
        let url = format!("memory://memes/{}", request.name);
        state.entries.retain(|e| e.name != request.name);
        state.entries.push(RemoteEntry {
            name: request.name.clone(),
            tags: request.tags.clone(),
            language: Some(request.language.clone()),
            caption: Some(request.title.clone()),
            url: url.clone(),
            width: 0,
            height: 0,
        });
        Ok(UploadedAsset {
            name: request.name.clone(),
            public_id: format!("memes/{}", request.name),
            url,
            width: 0,
            height: 0,
        })
    }
}
