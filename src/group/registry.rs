//! Group Registry Module
//!
//! Owns every named group of the process. Groups are created once and looked
//! up by name; there is no removal.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use crate::cache::{ByteView, Capacity, OnEvict};
use crate::error::{CacheError, Result};
use crate::group::{Group, Loader};

// == Group Registry ==
/// Name to group map. Registration takes the write lock, lookups share the read lock.
#[derive(Default)]
pub struct GroupRegistry {
    groups: RwLock<HashMap<String, Arc<Group>>>,
}

impl GroupRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts configuring a group called `name`.
    pub fn builder(&self, name: impl Into<String>) -> GroupBuilder<'_> {
        GroupBuilder {
            registry: self,
            name: name.into(),
            capacity: Capacity::Unbounded,
            loader: None,
            on_evict: None,
        }
    }

    // == New Group ==
    /// Creates and registers a group.
    ///
    /// # Errors
    /// [`CacheError::DuplicateGroup`] when `name` is already taken.
    pub async fn new_group(
        &self,
        name: impl Into<String>,
        capacity: Capacity,
        loader: impl Loader + 'static,
    ) -> Result<Arc<Group>> {
        self.builder(name)
            .capacity(capacity)
            .loader(loader)
            .register()
            .await
    }

    // == Get Group ==
    /// Looks up a registered group.
    pub async fn get_group(&self, name: &str) -> Option<Arc<Group>> {
        self.groups.read().await.get(name).cloned()
    }

    /// Names of all registered groups, sorted.
    pub async fn group_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.groups.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    async fn insert(&self, group: Group) -> Result<Arc<Group>> {
        let mut groups = self.groups.write().await;
        if groups.contains_key(group.name()) {
            return Err(CacheError::DuplicateGroup(group.name().to_string()));
        }

        let group = Arc::new(group);
        groups.insert(group.name().to_string(), Arc::clone(&group));
        info!("Registered group {}", group.name());
        Ok(group)
    }
}

// == Group Builder ==
/// Collects the settings of a group before it is registered.
pub struct GroupBuilder<'a> {
    registry: &'a GroupRegistry,
    name: String,
    capacity: Capacity,
    loader: Option<Arc<dyn Loader>>,
    on_evict: Option<OnEvict<ByteView>>,
}

impl GroupBuilder<'_> {
    /// Byte budget of the group's cache. Defaults to unbounded.
    pub fn capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn loader(self, loader: impl Loader + 'static) -> Self {
        self.shared_loader(Arc::new(loader))
    }

    /// Uses a loader that is also shared with other groups.
    pub fn shared_loader(mut self, loader: Arc<dyn Loader>) -> Self {
        self.loader = Some(loader);
        self
    }

    /// Called with every entry the group's cache evicts, under the cache lock.
    pub fn on_evict(mut self, on_evict: impl FnMut(&str, &ByteView) + Send + 'static) -> Self {
        self.on_evict = Some(Box::new(on_evict));
        self
    }

    // == Register ==
    /// Builds the group and adds it to the registry.
    ///
    /// # Errors
    /// [`CacheError::DuplicateGroup`] when the name is already taken.
    ///
    /// # Panics
    /// When no loader was set. A group without a data source is a programming
    /// error, not a runtime condition.
    pub async fn register(self) -> Result<Arc<Group>> {
        let Some(loader) = self.loader else {
            panic!("group {} has no loader", self.name);
        };
        let group = Group::new(self.name, self.capacity, loader, self.on_evict);
        self.registry.insert(group).await
    }
}
