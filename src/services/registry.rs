// src/services/registry.rs

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
    time::Duration,
};
use tokio::{sync::RwLock, task::JoinHandle, time::Instant};
use uuid::Uuid;

use crate::services::{
    auth::AuthProvider,
    profile::ProfileStore,
    session_store::{SessionStore, StoreSubscription},
};

// Limite para esperar o store aplicar um evento recém-publicado
const SYNC_TIMEOUT: Duration = Duration::from_secs(5);
// Intervalo máximo entre varreduras de clientes ociosos
const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct ClientStore {
    store: SessionStore,
    // Mantida viva enquanto o cliente estiver registrado
    _subscription: StoreSubscription,
    // Milissegundos desde `StoreRegistry::epoch`
    last_seen: AtomicU64,
}

/// Stores de sessão por instância de aplicação. Vive no `AppState`.
#[derive(Clone)]
pub struct StoreRegistry {
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileStore>,
    profile_timeout: Duration,
    stores: Arc<RwLock<HashMap<Uuid, ClientStore>>>,
    epoch: Instant,
}

impl StoreRegistry {
    pub fn new(auth: Arc<dyn AuthProvider>, profiles: Arc<dyn ProfileStore>, profile_timeout: Duration) -> Self {
        Self {
            auth,
            profiles,
            profile_timeout,
            stores: Arc::new(RwLock::new(HashMap::new())),
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Store do cliente, criado e iniciado no primeiro uso.
    pub async fn get_or_start(&self, client_id: Uuid) -> SessionStore {
        if let Some(existing) = self.stores.read().await.get(&client_id) {
            existing.last_seen.store(self.now_ms(), Ordering::Relaxed);
            return existing.store.clone();
        }

        let mut stores = self.stores.write().await;
        if let Some(existing) = stores.get(&client_id) {
            existing.last_seen.store(self.now_ms(), Ordering::Relaxed);
            return existing.store.clone();
        }

        let store = SessionStore::new(client_id, self.auth.clone(), self.profiles.clone(), self.profile_timeout);
        let subscription = store.start();
        stores.insert(
            client_id,
            ClientStore { store: store.clone(), _subscription: subscription, last_seen: AtomicU64::new(self.now_ms()) },
        );

        tracing::debug!(%client_id, clients = stores.len(), "Store de sessão iniciado");
        store
    }

    /// Espera o store do cliente (se houver) aplicar tudo o que já foi publicado para ele.
    pub async fn sync(&self, client_id: Uuid) -> Option<SessionStore> {
        let store = self.stores.read().await.get(&client_id).map(|c| c.store.clone())?;
        let seq = self.auth.published(client_id);

        if tokio::time::timeout(SYNC_TIMEOUT, store.caught_up(seq)).await.is_err() {
            tracing::warn!(%client_id, seq, applied = store.applied(), "Store não aplicou os eventos a tempo");
        }
        Some(store)
    }

    /// Encerra a assinatura de um cliente.
    pub async fn remove(&self, client_id: Uuid) -> bool {
        let removed = self.stores.write().await.remove(&client_id).is_some();
        if removed {
            tracing::debug!(%client_id, "Store de sessão removido");
        }
        removed
    }

    /// Remove os clientes sem requisições há mais de `max_idle`. Devolve quantos saíram.
    pub async fn evict_idle(&self, max_idle: Duration) -> usize {
        let now = self.now_ms();
        let max_idle = max_idle.as_millis() as u64;

        let mut stores = self.stores.write().await;
        let before = stores.len();
        stores.retain(|_, c| now.saturating_sub(c.last_seen.load(Ordering::Relaxed)) <= max_idle);
        let evicted = before - stores.len();

        if evicted > 0 {
            tracing::info!(evicted, remaining = stores.len(), "Stores de sessão ociosos removidos");
        }
        evicted
    }

    /// Varredura periódica dos clientes ociosos.
    pub fn spawn_sweeper(&self, max_idle: Duration) -> JoinHandle<()> {
        let registry = self.clone();
        let period = max_idle.min(MAX_SWEEP_INTERVAL).max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                registry.evict_idle(max_idle).await;
            }
        })
    }

    /// Teardown da aplicação: encerra todos os stores.
    pub async fn shutdown(&self) {
        let mut stores = self.stores.write().await;
        let count = stores.len();
        stores.clear();
        tracing::info!(count, "Stores de sessão encerrados");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        common::error::AppError,
        models::{
            auth::{AuthEvent, AuthEventKind, Session, UserIdentity},
            profile::ProfileRecord,
        },
        services::{
            events::{AuthEventHub, AuthSubscription},
            profile::DEFAULT_PROFILE_TIMEOUT,
        },
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::Map;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingAuth {
        subscriptions: AtomicUsize,
        events: AuthEventHub,
    }

    #[async_trait]
    impl AuthProvider for CountingAuth {
        async fn get_session(&self, _client_id: Uuid) -> Result<Option<Session>, AppError> {
            Ok(None)
        }

        fn subscribe(&self, client_id: Uuid) -> AuthSubscription {
            self.subscriptions.fetch_add(1, Ordering::SeqCst);
            self.events.subscribe(client_id)
        }

        fn published(&self, client_id: Uuid) -> u64 {
            self.events.published(client_id)
        }
    }

    struct NoProfiles;

    #[async_trait]
    impl ProfileStore for NoProfiles {
        async fn find_by_user_id(&self, _user_id: Uuid) -> Result<Option<ProfileRecord>, AppError> {
            Ok(None)
        }
    }

    fn registry() -> (StoreRegistry, Arc<CountingAuth>) {
        let auth = Arc::new(CountingAuth::default());
        (StoreRegistry::new(auth.clone(), Arc::new(NoProfiles), DEFAULT_PROFILE_TIMEOUT), auth)
    }

    async fn len(registry: &StoreRegistry) -> usize {
        registry.stores.read().await.len()
    }

    fn admin_session() -> Session {
        let mut metadata = Map::new();
        metadata.insert("role".into(), "admin".into());
        Session {
            access_token: "t".into(),
            expires_at: Utc::now(),
            user: UserIdentity { id: Uuid::new_v4(), email: "a@farm.com".into(), metadata, email_confirmed_at: None },
        }
    }

    #[tokio::test]
    async fn same_client_reuses_one_store() {
        let (registry, auth) = registry();
        let client = Uuid::new_v4();

        let a = registry.get_or_start(client).await;
        let b = registry.get_or_start(client).await;

        assert_eq!(a.client_id(), b.client_id());
        assert_eq!(len(&registry).await, 1);
        assert_eq!(auth.subscriptions.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn clients_get_isolated_stores() {
        let (registry, _) = registry();
        registry.get_or_start(Uuid::new_v4()).await;
        registry.get_or_start(Uuid::new_v4()).await;
        assert_eq!(len(&registry).await, 2);
    }

    #[tokio::test]
    async fn started_store_settles_signed_out() {
        let (registry, _) = registry();
        let store = registry.get_or_start(Uuid::new_v4()).await;
        let snapshot = store.settled().await;
        assert!(!snapshot.loading);
        assert!(!snapshot.is_authenticated());
    }

    #[tokio::test]
    async fn sign_out_is_applied_before_sync_returns_despite_foreign_burst() {
        let (registry, auth) = registry();
        let client = Uuid::new_v4();
        let store = registry.get_or_start(client).await;
        store.settled().await;

        auth.events.publish(AuthEvent::new(client, AuthEventKind::SignedIn, Some(admin_session())));
        registry.sync(client).await;
        assert!(store.snapshot().is_authenticated());

        auth.events.publish(AuthEvent::new(client, AuthEventKind::SignedOut, None));
        for _ in 0..300 {
            let other = Uuid::new_v4();
            registry.get_or_start(other).await;
            auth.events.publish(AuthEvent::new(other, AuthEventKind::SignedOut, None));
        }

        registry.sync(client).await;
        let snapshot = store.settled().await;
        assert!(!snapshot.is_authenticated());
        assert_eq!(snapshot.role(), None);
    }

    #[tokio::test]
    async fn sync_without_store_is_a_no_op() {
        let (registry, _) = registry();
        assert!(registry.sync(Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn remove_and_shutdown_drop_stores() {
        let (registry, _) = registry();
        let client = Uuid::new_v4();
        registry.get_or_start(client).await;
        registry.get_or_start(Uuid::new_v4()).await;

        assert!(registry.remove(client).await);
        assert!(!registry.remove(client).await);
        assert_eq!(len(&registry).await, 1);

        registry.shutdown().await;
        assert_eq!(len(&registry).await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn idle_clients_are_evicted_and_active_ones_kept() {
        let (registry, _) = registry();
        let idle = Uuid::new_v4();
        let active = Uuid::new_v4();
        registry.get_or_start(idle).await;
        registry.get_or_start(active).await;

        tokio::time::advance(Duration::from_secs(40)).await;
        registry.get_or_start(active).await;
        tokio::time::advance(Duration::from_secs(40)).await;

        assert_eq!(registry.evict_idle(Duration::from_secs(60)).await, 1);
        assert_eq!(len(&registry).await, 1);
        assert!(registry.stores.read().await.contains_key(&active));
    }

    #[tokio::test(start_paused = true)]
    async fn sweeper_reclaims_abandoned_clients() {
        let (registry, _) = registry();
        for _ in 0..50 {
            registry.get_or_start(Uuid::new_v4()).await;
        }

        let sweeper = registry.spawn_sweeper(Duration::from_secs(30));
        tokio::time::sleep(Duration::from_secs(90)).await;

        assert_eq!(len(&registry).await, 0);
        sweeper.abort();
    }
}
