//! Scope resolution: turns a requested scope into a lock handle.

use super::lock::{Lock, LockSettings};
use super::types::{LockKey, LockScope};
use crate::config::Config;
use crate::context::ExecutionContext;
use crate::error::Result;
use crate::store::{self, LeaseStore};
use std::sync::Arc;

/// Factory for [`Lock`] handles bound to one execution context.
///
/// Build one per process and pass it to whoever needs locks.
#[derive(Debug, Clone)]
pub struct LockManager {
    store: Arc<dyn LeaseStore>,
    context: ExecutionContext,
    settings: LockSettings,
}

impl LockManager {
    pub fn new(store: Arc<dyn LeaseStore>, context: ExecutionContext, settings: LockSettings) -> Self {
        Self {
            store,
            context,
            settings,
        }
    }

    /// Open the configured store and build a manager over it.
    pub fn from_config(config: &Config, context: ExecutionContext) -> Result<Self> {
        let store = store::open(&config.store)?;
        Ok(Self::new(store, context, config.lock_settings()))
    }

    /// Key for `scope` in this context.
    ///
    /// `None` only for [`LockScope::Document`] when no document is bound.
    pub fn key_for(&self, scope: LockScope) -> Option<LockKey> {
        let script_id = self.context.script_id();
        match scope {
            LockScope::Global => Some(LockKey::global(script_id)),
            LockScope::Document => self
                .context
                .document_id()
                .map(|document_id| LockKey::document(script_id, document_id)),
            LockScope::User => Some(LockKey::user(script_id, self.context.user_id())),
        }
    }

    /// Handle for `scope`, or `None` when the scope has no meaning here.
    ///
    /// Does not touch the store.
    pub fn get(&self, scope: LockScope) -> Option<Lock> {
        self.key_for(scope).map(|key| self.lock_for(key))
    }

    /// Script-wide lock.
    pub fn script_lock(&self) -> Lock {
        self.lock_for(LockKey::global(self.context.script_id()))
    }

    /// Lock for the bound document, if there is one.
    pub fn document_lock(&self) -> Option<Lock> {
        self.get(LockScope::Document)
    }

    /// Lock for the acting user.
    pub fn user_lock(&self) -> Lock {
        self.lock_for(LockKey::user(self.context.script_id(), self.context.user_id()))
    }

    /// Handle on an arbitrary key in this manager's store.
    pub fn lock_for(&self, key: LockKey) -> Lock {
        Lock::new(key, Arc::clone(&self.store), self.settings.clone())
    }

    pub fn store(&self) -> &Arc<dyn LeaseStore> {
        &self.store
    }

    pub fn context(&self) -> &ExecutionContext {
        &self.context
    }

    pub fn settings(&self) -> &LockSettings {
        &self.settings
    }
}
