//! Lock scope and key definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Granularity of a lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockScope {
    /// One lock shared by every caller of the script.
    Global,
    /// One lock per bound document.
    Document,
    /// One lock per acting user.
    User,
}

impl LockScope {
    /// Get the lowercase name of this scope.
    pub fn as_str(&self) -> &'static str {
        match self {
            LockScope::Global => "global",
            LockScope::Document => "document",
            LockScope::User => "user",
        }
    }

    /// Parse a scope from its lowercase name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "global" => Some(Self::Global),
            "document" => Some(Self::Document),
            "user" => Some(Self::User),
            _ => None,
        }
    }
}

impl fmt::Display for LockScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one mutual-exclusion domain.
///
/// Two keys are equal iff scope, script id and discriminator are all equal.
/// The discriminator is empty for [`LockScope::Global`], the document id for
/// [`LockScope::Document`] and the user id for [`LockScope::User`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LockKey {
    scope: LockScope,
    script_id: String,
    discriminator: String,
}

impl LockKey {
    /// Key for the script-wide lock.
    pub fn global(script_id: impl Into<String>) -> Self {
        Self {
            scope: LockScope::Global,
            script_id: script_id.into(),
            discriminator: String::new(),
        }
    }

    /// Key for the lock bound to one document.
    pub fn document(script_id: impl Into<String>, document_id: impl Into<String>) -> Self {
        Self {
            scope: LockScope::Document,
            script_id: script_id.into(),
            discriminator: document_id.into(),
        }
    }

    /// Key for the lock bound to one user.
    pub fn user(script_id: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            scope: LockScope::User,
            script_id: script_id.into(),
            discriminator: user_id.into(),
        }
    }

    pub fn scope(&self) -> LockScope {
        self.scope
    }

    pub fn script_id(&self) -> &str {
        &self.script_id
    }

    pub fn discriminator(&self) -> &str {
        &self.discriminator
    }

    /// Filesystem-safe name for this key.
    ///
    /// Components are percent-escaped and joined with `~`, so distinct keys
    /// always map to distinct names.
    pub fn storage_name(&self) -> String {
        format!(
            "{}~{}~{}",
            self.scope.as_str(),
            escape_component(&self.script_id),
            escape_component(&self.discriminator)
        )
    }
}

impl fmt::Display for LockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.discriminator.is_empty() {
            write!(f, "{}:{}", self.scope, self.script_id)
        } else {
            write!(f, "{}:{}:{}", self.scope, self.script_id, self.discriminator)
        }
    }
}

fn escape_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for b in s.bytes() {
        if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.') {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{:02X}", b));
        }
    }
    out
}

/// Client-side state of a [`super::Lock`] handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    /// Not holding a lease. Initial and post-release state.
    Unlocked,
    /// Inside `try_lock`/`wait_lock`.
    Acquiring,
    /// Holding a lease acquired by this handle.
    Locked,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn scope_round_trips_through_name() {
        for scope in [LockScope::Global, LockScope::Document, LockScope::User] {
            assert_eq!(LockScope::from_str(scope.as_str()), Some(scope));
        }
        assert_eq!(LockScope::from_str("script"), None);
    }

    #[test]
    fn keys_compare_on_every_component() {
        assert_eq!(LockKey::global("a"), LockKey::global("a"));
        assert_ne!(LockKey::global("a"), LockKey::global("b"));
        assert_ne!(LockKey::user("a", "alice"), LockKey::user("a", "bob"));
        assert_ne!(LockKey::user("a", "x"), LockKey::document("a", "x"));
    }

    #[test]
    fn display_omits_empty_discriminator() {
        assert_eq!(LockKey::global("nightly").to_string(), "global:nightly");
        assert_eq!(
            LockKey::document("nightly", "doc-1").to_string(),
            "document:nightly:doc-1"
        );
    }

    #[test]
    fn storage_names_are_safe_and_distinct() {
        let keys = [
            LockKey::user("s", "a/b"),
            LockKey::user("s", "a_b"),
            LockKey::user("s", "a%2Fb"),
            LockKey::user("s~x", ""),
            LockKey::user("s", "~x"),
            LockKey::global("s"),
        ];

        let names: HashSet<String> = keys.iter().map(LockKey::storage_name).collect();
        assert_eq!(names.len(), keys.len());

        for name in &names {
            assert!(!name.contains('/'));
            assert!(!name.contains('\\'));
        }
    }
}
