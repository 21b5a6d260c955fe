use crate::domain::model::Token;
use crate::utils::error::Result;
use chrono::Utc;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::Mutex as AsyncMutex;

type Slot = Arc<AsyncMutex<Option<Token>>>;

/// 每個 client id 一個槽位的存取權杖快取。
///
/// 同一個 client id 的刷新在槽位鎖內進行，併發呼叫者會等待同一次交換結果，
/// 不會重複向平台請求。外層的 `Mutex` 只保護槽位表本身，從不跨越 await。
#[derive(Debug, Default)]
pub struct TokenCache {
    slots: Mutex<HashMap<String, Slot>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, client_id: &str) -> Slot {
        let mut slots = self
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        slots
            .entry(client_id.to_string())
            .or_insert_with(|| Arc::new(AsyncMutex::new(None)))
            .clone()
    }

    /// 回傳仍有效的權杖；否則在持有槽位鎖的情況下執行一次 `refresh`
    pub async fn get_or_refresh<F, Fut>(&self, client_id: &str, refresh: F) -> Result<Token>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Token>>,
    {
        let slot = self.slot(client_id);
        let mut cached = slot.lock().await;

        if let Some(token) = cached.as_ref() {
            if token.is_valid_at(Utc::now()) {
                tracing::debug!("🔑 Reusing cached token for client {}", client_id);
                return Ok(token.clone());
            }
            tracing::debug!("🔑 Cached token for client {} expired", client_id);
        }

        let fresh = refresh().await?;
        *cached = Some(fresh.clone());
        Ok(fresh)
    }

    pub async fn peek(&self, client_id: &str) -> Option<Token> {
        let slot = self.slot(client_id);
        let cached = slot.lock().await;
        cached.clone()
    }

    /// 平台拒絕權杖時呼叫，下次取用會重新交換
    pub async fn invalidate(&self, client_id: &str) {
        let slot = self.slot(client_id);
        slot.lock().await.take();
        tracing::debug!("🔑 Invalidated cached token for client {}", client_id);
    }
}
