use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::cache::message::StoreCommand;
use crate::cache::token::{TokenEntry, TOKEN_VALUE_STUB};
use crate::error::{Result, TokenError};
use crate::observability::metrics::get_metrics;
use crate::utils::constants::STORE_MAILBOX_SIZE;

struct StoreHandle {
    tx: mpsc::Sender<StoreCommand>,
    task: JoinHandle<()>,
}

/// Name -> secret mapping owned by a single actor task.
///
/// The map itself lives inside the task spawned by [`TokenStore::start`];
/// every other component talks to it through [`StoreCommand`] messages and
/// waits for the reply, which gives all operations a single total order.
/// Clones share the same actor.
#[derive(Clone, Default)]
pub struct TokenStore {
    handle: Arc<RwLock<Option<StoreHandle>>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Launch the processing loop. The mapping starts empty on every start.
    pub async fn start(&self) -> Result<()> {
        let mut guard = self.handle.write().await;
        if guard.is_some() {
            return Err(TokenError::AlreadyRunning);
        }
        let (tx, rx) = mpsc::channel(STORE_MAILBOX_SIZE);
        let task = tokio::spawn(run_loop(rx));
        *guard = Some(StoreHandle { tx, task });
        get_metrics().up.set(1);
        info!("token store started");
        Ok(())
    }

    /// Stop the processing loop and wait until it has exited.
    ///
    /// Requests queued before the shutdown message are still answered;
    /// anything behind it fails with `NotRunning`.
    pub async fn stop(&self) -> Result<()> {
        let mut guard = self.handle.write().await;
        let handle = guard.take().ok_or(TokenError::NotRunning)?;

        let (ack, ack_rx) = oneshot::channel();
        if handle.tx.send(StoreCommand::Shutdown { ack }).await.is_ok() {
            let _ = ack_rx.await;
        }
        drop(handle.tx);
        if let Err(e) = handle.task.await {
            error!("token store loop ended abnormally: {}", e);
        }

        get_metrics().up.set(0);
        get_metrics().cached_tokens.set(0);
        info!("token store stopped");
        Ok(())
    }

    pub async fn is_running(&self) -> bool {
        self.handle.read().await.is_some()
    }

    /// Insert or replace the secret for `name`.
    pub async fn update(&self, name: &str, secret: &str) -> Result<()> {
        let entry = TokenEntry::new(name, secret);
        self.request(|reply| StoreCommand::Update { entry, reply }).await
    }

    /// Remove `name`; removing an absent name is not an error.
    pub async fn delete(&self, name: &str) -> Result<()> {
        let name = name.to_owned();
        self.request(|reply| StoreCommand::Delete { name, reply }).await
    }

    pub async fn get(&self, name: &str) -> Result<String> {
        let owned = name.to_owned();
        self.request(|reply| StoreCommand::Get { name: owned, reply })
            .await?
            .filter(|secret| secret.as_str() != TOKEN_VALUE_STUB)
            .ok_or_else(|| TokenError::NotFound(name.to_owned()))
    }

    pub async fn len(&self) -> Result<usize> {
        self.request(|reply| StoreCommand::Len { reply }).await
    }

    async fn request<T>(&self, build: impl FnOnce(oneshot::Sender<T>) -> StoreCommand) -> Result<T> {
        let tx = self
            .handle
            .read()
            .await
            .as_ref()
            .map(|handle| handle.tx.clone())
            .ok_or(TokenError::NotRunning)?;

        let (reply, reply_rx) = oneshot::channel();
        tx.send(build(reply)).await.map_err(|_| TokenError::NotRunning)?;
        // a dropped reply means the loop shut down before reaching this request
        reply_rx.await.map_err(|_| TokenError::NotRunning)
    }
}

async fn run_loop(mut rx: mpsc::Receiver<StoreCommand>) {
    let metrics = get_metrics();
    let mut tokens: HashMap<String, String> = HashMap::new();

    while let Some(command) = rx.recv().await {
        match command {
            StoreCommand::Update { entry, reply } => {
                debug!("token '{}' updated", entry.name);
                tokens.insert(entry.name, entry.secret);
                metrics.cached_tokens.set(tokens.len() as i64);
                let _ = reply.send(());
            }
            StoreCommand::Delete { name, reply } => {
                if tokens.remove(&name).is_some() {
                    debug!("token '{}' deleted", name);
                }
                metrics.cached_tokens.set(tokens.len() as i64);
                let _ = reply.send(());
            }
            StoreCommand::Get { name, reply } => {
                let _ = reply.send(tokens.get(&name).cloned());
            }
            StoreCommand::Len { reply } => {
                let _ = reply.send(tokens.len());
            }
            StoreCommand::Shutdown { ack } => {
                info!("token store loop exiting");
                let _ = ack.send(());
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn running_store() -> TokenStore {
        let store = TokenStore::new();
        store.start().await.unwrap();
        store
    }

    #[tokio::test]
    async fn get_returns_latest_update() {
        let store = running_store().await;

        store.update("a", "first").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), "first");

        store.update("a", "second").await.unwrap();
        assert_eq!(store.get("a").await.unwrap(), "second");
        assert_eq!(store.len().await.unwrap(), 1);

        store.stop().await.unwrap();
    }

    #[tokio::test]
    async fn get_unknown_or_deleted_is_not_found() {
        let store = running_store().await;

        assert!(matches!(store.get("never").await, Err(TokenError::NotFound(name)) if name == "never"));

        store.update("a", "secret").await.unwrap();
        store.delete("a").await.unwrap();
        assert!(matches!(store.get("a").await, Err(TokenError::NotFound(_))));

        store.stop().await.unwrap();
    }

    #[tokio::test]
    async fn delete_of_absent_name_is_a_noop() {
        let store = running_store().await;
        store.update("keep", "value").await.unwrap();

        store.delete("missing").await.unwrap();
        assert_eq!(store.get("keep").await.unwrap(), "value");

        store.stop().await.unwrap();
    }

    #[tokio::test]
    async fn empty_secret_is_treated_as_absent() {
        let store = running_store().await;
        store.update("blank", "").await.unwrap();

        assert!(matches!(store.get("blank").await, Err(TokenError::NotFound(_))));

        store.stop().await.unwrap();
    }

    #[tokio::test]
    async fn operations_on_idle_store_fail_not_running() {
        let store = TokenStore::new();

        assert!(matches!(store.update("a", "b").await, Err(TokenError::NotRunning)));
        assert!(matches!(store.delete("a").await, Err(TokenError::NotRunning)));
        assert!(matches!(store.get("a").await, Err(TokenError::NotRunning)));
        assert!(matches!(store.stop().await, Err(TokenError::NotRunning)));
    }

    #[tokio::test]
    async fn lifecycle_rules() {
        let store = TokenStore::new();
        assert!(!store.is_running().await);

        store.start().await.unwrap();
        assert!(matches!(store.start().await, Err(TokenError::AlreadyRunning)));
        assert!(store.is_running().await);

        store.stop().await.unwrap();
        assert!(!store.is_running().await);
        assert!(matches!(store.get("a").await, Err(TokenError::NotRunning)));

        // restart begins with an empty mapping
        store.start().await.unwrap();
        assert!(matches!(store.get("a").await, Err(TokenError::NotFound(_))));
        store.stop().await.unwrap();
    }

    #[tokio::test]
    async fn stop_after_updates_from_clone_is_clean() {
        let store = running_store().await;
        let clone = store.clone();

        clone.update("a", "1").await.unwrap();
        store.stop().await.unwrap();

        assert!(matches!(clone.get("a").await, Err(TokenError::NotRunning)));
    }

    #[tokio::test]
    async fn request_queued_behind_shutdown_is_dropped() {
        let store = running_store().await;
        let tx = store.handle.read().await.as_ref().unwrap().tx.clone();

        // both messages sit in the mailbox before the loop runs again
        let (ack, ack_rx) = oneshot::channel();
        tx.send(StoreCommand::Shutdown { ack }).await.unwrap();
        let (reply, reply_rx) = oneshot::channel();
        tx.send(StoreCommand::Get { name: "a".to_string(), reply }).await.unwrap();

        ack_rx.await.unwrap();
        assert!(reply_rx.await.is_err());

        drop(tx);
        store.stop().await.unwrap();
        assert!(!store.is_running().await);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn requests_racing_stop_resolve_ok_or_not_running() {
        let store = running_store().await;
        store.update("a", "secret").await.unwrap();

        let mut handles = Vec::new();
        for worker in 0..16 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                let mut outcomes = Vec::new();
                for i in 0..200 {
                    let result = if i % 2 == 0 {
                        store.get("a").await.map(|_| ())
                    } else {
                        store.update(&format!("w{}", worker), "value").await
                    };
                    let stopped = matches!(result, Err(TokenError::NotRunning));
                    outcomes.push(result);
                    if stopped {
                        break;
                    }
                    tokio::task::yield_now().await;
                }
                outcomes
            }));
        }

        tokio::task::yield_now().await;
        tokio::time::timeout(std::time::Duration::from_secs(5), store.stop())
            .await
            .expect("stop hung")
            .unwrap();

        for handle in handles {
            let outcomes = tokio::time::timeout(std::time::Duration::from_secs(5), handle)
                .await
                .expect("caller hung after stop")
                .unwrap();
            for outcome in outcomes {
                assert!(matches!(outcome, Ok(()) | Err(TokenError::NotRunning)), "{:?}", outcome);
            }
        }
        assert!(matches!(store.get("a").await, Err(TokenError::NotRunning)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_are_serialized() {
        let store = running_store().await;

        let mut handles = Vec::new();
        for worker in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                for i in 0..50 {
                    let name = format!("w{}-{}", worker, i);
                    store.update(&name, &format!("secret-{}", i)).await.unwrap();
                    assert_eq!(store.get(&name).await.unwrap(), format!("secret-{}", i));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await.unwrap(), 8 * 50);
        store.stop().await.unwrap();
    }
}
