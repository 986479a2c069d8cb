//! Token metadata enrichment.
//!
//! [`CachingTokenEnricher`] answers from its cache and asks the underlying
//! [`TokenInfoSource`] only for keys it has never seen. A failed lookup leaves
//! the notifications without `logo_info`.

use crate::domain::{TokenInfo, TokenKey, TransferNotification};
use crate::error::SyncResult;
use crate::ports::{TokenInfoSource, TokenMetadataEnricher};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

pub struct CachingTokenEnricher<S: TokenInfoSource> {
    source: S,
    cache: RwLock<HashMap<TokenKey, TokenInfo>>,
}

impl<S: TokenInfoSource> CachingTokenEnricher<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn cached(&self, key: &TokenKey) -> Option<TokenInfo> {
        self.cache.read().get(key).cloned()
    }
}

#[async_trait]
impl<S: TokenInfoSource> TokenMetadataEnricher for CachingTokenEnricher<S> {
    async fn fill_token_infos(&self, pending: &mut HashMap<TokenKey, Vec<TransferNotification>>) {
        let missing: Vec<TokenKey> = {
            let cache = self.cache.read();
            pending
                .keys()
                .filter(|key| !cache.contains_key(*key))
                .cloned()
                .collect()
        };

        if !missing.is_empty() {
            match self.source.fetch_token_infos(&missing).await {
                Ok(fetched) => {
                    debug!(
                        requested = missing.len(),
                        found = fetched.len(),
                        "[bridge-sync] token infos fetched"
                    );
                    self.cache.write().extend(fetched);
                }
                Err(e) => {
                    warn!(
                        requested = missing.len(),
                        error = %e,
                        "[bridge-sync] token info lookup failed"
                    );
                }
            }
        }

        let cache = self.cache.read();
        for (key, notifications) in pending.iter_mut() {
            if let Some(info) = cache.get(key) {
                for notification in notifications.iter_mut() {
                    notification.logo_info = Some(info.clone());
                }
            }
        }
    }
}

/// Token source answering from a fixed table.
#[derive(Default)]
pub struct StaticTokenSource {
    tokens: HashMap<TokenKey, TokenInfo>,
    lookups: AtomicUsize,
}

impl StaticTokenSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(mut self, key: TokenKey, info: TokenInfo) -> Self {
        self.tokens.insert(key, info);
        self
    }

    /// Number of `fetch_token_infos` calls served.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenInfoSource for StaticTokenSource {
    async fn fetch_token_infos(
        &self,
        keys: &[TokenKey],
    ) -> SyncResult<HashMap<TokenKey, TokenInfo>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        Ok(keys
            .iter()
            .filter_map(|key| self.tokens.get(key).map(|info| (key.clone(), info.clone())))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SyncError;

    fn usdc() -> TokenInfo {
        TokenInfo {
            logo_url: "https://logo/usdc".to_string(),
            symbol: "USDC".to_string(),
            decimals: 6,
        }
    }

    fn pending(key: &TokenKey) -> HashMap<TokenKey, Vec<TransferNotification>> {
        HashMap::from([(key.clone(), vec![TransferNotification::default()])])
    }

    #[tokio::test]
    async fn test_fills_and_caches() {
        let key = TokenKey::new("0xA0b8", 1);
        let enricher =
            CachingTokenEnricher::new(StaticTokenSource::new().with_token(key.clone(), usdc()));

        let mut first = pending(&key);
        enricher.fill_token_infos(&mut first).await;
        assert_eq!(first[&key][0].logo_info, Some(usdc()));

        let mut second = pending(&key);
        enricher.fill_token_infos(&mut second).await;
        assert_eq!(second[&key][0].logo_info, Some(usdc()));
        assert_eq!(enricher.source().lookups(), 1);
    }

    #[tokio::test]
    async fn test_unknown_token_left_empty() {
        let key = TokenKey::new("0xbeef", 5);
        let enricher = CachingTokenEnricher::new(StaticTokenSource::new());
        let mut batch = pending(&key);
        enricher.fill_token_infos(&mut batch).await;
        assert!(batch[&key][0].logo_info.is_none());
        assert!(enricher.cached(&key).is_none());
    }

    struct FailingSource;

    #[async_trait]
    impl TokenInfoSource for FailingSource {
        async fn fetch_token_infos(
            &self,
            _keys: &[TokenKey],
        ) -> SyncResult<HashMap<TokenKey, TokenInfo>> {
            Err(SyncError::SideStore {
                reason: "unreachable".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn test_source_failure_is_swallowed() {
        let key = TokenKey::new("0xA0b8", 1);
        let enricher = CachingTokenEnricher::new(FailingSource);
        let mut batch = pending(&key);
        enricher.fill_token_infos(&mut batch).await;
        assert!(batch[&key][0].logo_info.is_none());
    }
}
