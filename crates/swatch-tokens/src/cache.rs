//! Memoizing resolver.
//!
//! The ambient domain is tiny (three modes times every capability subset),
//! so a [`Resolver`] can keep one resolved [`TokenValues`] per point and hand
//! out shared references.
//!
//! Population is a read-through: a miss computes the values outside the lock
//! and then stores them. Two threads missing on the same key both compute,
//! and the last one to write wins. Resolution is deterministic, so both
//! writes are equal.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::appearance::AppearanceMode;
use crate::capability::Capabilities;
use crate::resolve::{resolve, TokenValues};
use crate::token_set::TokenSet;

type Key = (AppearanceMode, Capabilities);

/// A token set paired with a cache of its resolutions.
///
/// `Resolver` is `Send + Sync`; share it behind an `Arc` or by reference.
///
/// ```rust
/// use swatch_tokens::{site, AppearanceMode, Capabilities, Resolver};
///
/// let resolver = Resolver::new(site::site_tokens());
/// let dark = resolver.resolve(AppearanceMode::Dark, Capabilities::none());
/// assert_eq!(dark.get("accent-color"), Some("rgb(181,134,255)"));
/// assert_eq!(resolver.cached_len(), 1);
/// ```
#[derive(Debug)]
pub struct Resolver {
    tokens: Arc<TokenSet>,
    cache: RwLock<HashMap<Key, Arc<TokenValues>>>,
}

impl Resolver {
    pub fn new(tokens: TokenSet) -> Self {
        Self::from_shared(Arc::new(tokens))
    }

    /// Builds a resolver over a set that is already shared.
    pub fn from_shared(tokens: Arc<TokenSet>) -> Self {
        Self {
            tokens,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn tokens(&self) -> &Arc<TokenSet> {
        &self.tokens
    }

    /// Resolves the token set, reusing a previous result when available.
    pub fn resolve(&self, mode: AppearanceMode, caps: Capabilities) -> Arc<TokenValues> {
        let key = (mode, caps);
        if let Some(hit) = self.read_cache().get(&key) {
            return Arc::clone(hit);
        }

        let values = Arc::new(resolve(&self.tokens, mode, caps));
        tracing::debug!(mode = %mode, capabilities = %caps, "cached token resolution");
        self.write_cache().insert(key, Arc::clone(&values));
        values
    }

    /// Resolves every point of the ambient domain up front.
    pub fn warm(&self) {
        for mode in AppearanceMode::ALL {
            for caps in Capabilities::every_subset() {
                self.resolve(mode, caps);
            }
        }
    }

    /// Number of cached resolutions.
    pub fn cached_len(&self) -> usize {
        self.read_cache().len()
    }

    /// Drops every cached resolution.
    pub fn clear(&self) {
        self.write_cache().clear();
    }

    // The cache only ever holds complete values, so a panic in another
    // thread cannot leave it half-written.
    fn read_cache(&self) -> std::sync::RwLockReadGuard<'_, HashMap<Key, Arc<TokenValues>>> {
        self.cache.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_cache(&self) -> std::sync::RwLockWriteGuard<'_, HashMap<Key, Arc<TokenValues>>> {
        self.cache.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clone for Resolver {
    /// Clones share the token set but start with an empty cache.
    fn clone(&self) -> Self {
        Self::from_shared(Arc::clone(&self.tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Capability, DesignToken};
    use std::thread;

    fn resolver() -> Resolver {
        let tokens = TokenSet::builder()
            .token(
                DesignToken::new("accent-color")
                    .fallback("rgb(84,0,215)")
                    .when_dark("rgb(181,134,255)"),
            )
            .token(
                DesignToken::new("safe-area-inset-top")
                    .fallback("0px")
                    .with_capability(Capability::InsetEnv, "env(safe-area-inset-top)"),
            )
            .build()
            .unwrap();
        Resolver::new(tokens)
    }

    #[test]
    fn test_cached_equals_direct() {
        let resolver = resolver();
        for mode in AppearanceMode::ALL {
            for caps in Capabilities::every_subset() {
                let cached = resolver.resolve(mode, caps);
                let direct = resolve(resolver.tokens(), mode, caps);
                assert_eq!(*cached, direct);
            }
        }
    }

    #[test]
    fn test_hit_returns_same_allocation() {
        let resolver = resolver();
        let first = resolver.resolve(AppearanceMode::Dark, Capabilities::none());
        let second = resolver.resolve(AppearanceMode::Dark, Capabilities::none());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(resolver.cached_len(), 1);
    }

    #[test]
    fn test_warm_fills_whole_domain() {
        let resolver = resolver();
        resolver.warm();
        assert_eq!(
            resolver.cached_len(),
            AppearanceMode::ALL.len() * Capabilities::every_subset().count()
        );

        resolver.clear();
        assert_eq!(resolver.cached_len(), 0);
    }

    #[test]
    fn test_clone_starts_cold() {
        let resolver = resolver();
        resolver.warm();
        let clone = resolver.clone();
        assert_eq!(clone.cached_len(), 0);
        assert!(Arc::ptr_eq(clone.tokens(), resolver.tokens()));
    }

    #[test]
    fn test_concurrent_resolution_agrees() {
        let resolver = Arc::new(resolver());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let resolver = Arc::clone(&resolver);
                thread::spawn(move || {
                    let mode = AppearanceMode::ALL[i % AppearanceMode::ALL.len()];
                    let caps = Capabilities::none().with(Capability::InsetEnv);
                    (mode, resolver.resolve(mode, caps))
                })
            })
            .collect();

        for handle in handles {
            let (mode, values) = handle.join().unwrap();
            let caps = Capabilities::none().with(Capability::InsetEnv);
            assert_eq!(*values, resolve(resolver.tokens(), mode, caps));
            assert_eq!(values.get("safe-area-inset-top"), Some("env(safe-area-inset-top)"));
        }
    }
}
