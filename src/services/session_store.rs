//! Store de sessão de uma instância de aplicação.
//!
//! Mantém {session, user, profile, loading} e publica cada mudança num canal
//! `watch`, observado pelo guard, pelo shell e pelas páginas.
//!
//! A resolução de perfil roda numa task própria. Cada estabelecimento de sessão
//! e cada limpeza incrementa a geração; o resultado de uma resolução só é
//! publicado se a geração ainda for a mesma. A comparação acontece dentro do
//! lock do `watch`, então uma saída (sign-out) no meio da busca nunca é sobrescrita.
//!
//! O store também publica a sequência do último evento aplicado, para que quem
//! publicou um evento possa esperar o store alcançá-lo (`caught_up`).

use serde::Serialize;
use std::sync::{
    atomic::{AtomicBool, AtomicU64, Ordering},
    Arc,
};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::{
    models::{
        auth::{AuthEvent, AuthEventKind, Session, UserIdentity},
        profile::Profile,
        role::Role,
    },
    services::{
        auth::AuthProvider,
        events::AuthSubscription,
        profile::{resolve_profile, ProfileStore},
    },
};

/// Estado publicado pelo store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthSnapshot {
    pub session: Option<Session>,
    pub user: Option<UserIdentity>,
    pub profile: Option<Profile>,
    pub loading: bool,
}

impl AuthSnapshot {
    pub fn loading() -> Self {
        Self { loading: true, ..Self::default() }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Papel já normalizado, se houver perfil com papel.
    pub fn role(&self) -> Option<Role> {
        self.profile.as_ref().and_then(|p| p.role)
    }

    /// Estado visto por quem apresentou `token`. Sem o token da sessão, o
    /// cliente aparece deslogado: o `x-client-id` sozinho não autentica.
    pub fn presented_with(&self, token: Option<&str>) -> AuthSnapshot {
        match &self.session {
            Some(session) if token != Some(session.access_token.as_str()) => AuthSnapshot::signed_out(),
            _ => self.clone(),
        }
    }
}

struct StoreInner {
    client_id: Uuid,
    auth: Arc<dyn AuthProvider>,
    profiles: Arc<dyn ProfileStore>,
    profile_timeout: Duration,
    state: watch::Sender<AuthSnapshot>,
    applied: watch::Sender<u64>,
    generation: AtomicU64,
    initialized: AtomicBool,
}

#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<StoreInner>,
}

/// Assinatura ativa dos eventos de autenticação. Ao ser descartada, o pump para.
pub struct StoreSubscription {
    pump: JoinHandle<()>,
}

impl StoreSubscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for StoreSubscription {
    fn drop(&mut self) {
        self.pump.abort();
    }
}

impl SessionStore {
    pub fn new(
        client_id: Uuid,
        auth: Arc<dyn AuthProvider>,
        profiles: Arc<dyn ProfileStore>,
        profile_timeout: Duration,
    ) -> Self {
        let (state, _) = watch::channel(AuthSnapshot::loading());
        let (applied, _) = watch::channel(0);
        Self {
            inner: Arc::new(StoreInner {
                client_id,
                auth,
                profiles,
                profile_timeout,
                state,
                applied,
                generation: AtomicU64::new(0),
                initialized: AtomicBool::new(false),
            }),
        }
    }

    pub fn client_id(&self) -> Uuid {
        self.inner.client_id
    }

    pub fn snapshot(&self) -> AuthSnapshot {
        self.inner.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AuthSnapshot> {
        self.inner.state.subscribe()
    }

    /// Espera o fim do carregamento e devolve o estado.
    pub async fn settled(&self) -> AuthSnapshot {
        let mut rx = self.subscribe();
        match rx.wait_for(|s| !s.loading).await {
            Ok(snapshot) => snapshot.clone(),
            // O sender vive em `inner`, então o canal não fecha enquanto houver store.
            Err(_) => self.snapshot(),
        }
    }

    /// Sequência do último evento do cliente já aplicado.
    pub fn applied(&self) -> u64 {
        *self.inner.applied.borrow()
    }

    /// Espera o store aplicar o evento de sequência `seq` (ou um posterior).
    pub async fn caught_up(&self, seq: u64) {
        let mut rx = self.inner.applied.subscribe();
        if rx.wait_for(|applied| *applied >= seq).await.is_err() {
            tracing::debug!(client_id = %self.inner.client_id, seq, "Canal de sequência encerrado");
        }
    }

    /// Assina os eventos, inicializa e passa a entregar os eventos em ordem de chegada.
    /// A assinatura é feita antes da inicialização para não perder eventos.
    pub fn start(&self) -> StoreSubscription {
        let AuthSubscription { mut events, since } = self.inner.auth.subscribe(self.inner.client_id);
        self.mark_applied(since);
        let store = self.clone();

        let pump = tokio::spawn(async move {
            store.initialize().await;

            while let Some(event) = events.recv().await {
                store.handle_event(event);
            }
            tracing::debug!(client_id = %store.client_id(), "Eventos de autenticação encerrados");
        });

        StoreSubscription { pump }
    }

    /// Busca a sessão atual uma única vez. Chamadas seguintes não fazem nada.
    pub async fn initialize(&self) -> Option<JoinHandle<()>> {
        if self.inner.initialized.swap(true, Ordering::SeqCst) {
            return None;
        }

        match self.inner.auth.get_session(self.inner.client_id).await {
            Ok(session) => self.apply(session),
            Err(e) => {
                tracing::warn!(client_id = %self.inner.client_id, error = %e, "Falha ao obter a sessão atual");
                self.clear();
                None
            }
        }
    }

    /// Aplica um evento de autenticação. Devolve a task de resolução de perfil, se houver.
    pub fn handle_event(&self, event: AuthEvent) -> Option<JoinHandle<()>> {
        if event.client_id != self.inner.client_id {
            return None;
        }

        let seq = event.seq;
        let resolution = match event.kind {
            AuthEventKind::InitialSession => {
                if self.inner.initialized.swap(true, Ordering::SeqCst) {
                    tracing::debug!(client_id = %self.inner.client_id, "INITIAL_SESSION redundante ignorado");
                    None
                } else {
                    self.apply(event.session)
                }
            }
            AuthEventKind::SignedIn | AuthEventKind::UserUpdated => self.apply(event.session),
            AuthEventKind::SignedOut => {
                self.clear();
                None
            }
        };

        self.mark_applied(seq);
        resolution
    }

    fn mark_applied(&self, seq: u64) {
        self.inner.applied.send_if_modified(|applied| {
            if seq > *applied {
                *applied = seq;
                true
            } else {
                false
            }
        });
    }

    fn apply(&self, session: Option<Session>) -> Option<JoinHandle<()>> {
        match session {
            Some(session) => Some(self.establish(session)),
            None => {
                self.clear();
                None
            }
        }
    }

    fn establish(&self, session: Session) -> JoinHandle<()> {
        let user = session.user.clone();
        let mut generation = 0;

        self.inner.state.send_modify(|state| {
            generation = self.inner.generation.fetch_add(1, Ordering::SeqCst) + 1;
            // Mantém o perfil atual se for o mesmo usuário (evita piscar o menu)
            let same_user = state.user.as_ref().is_some_and(|u| u.id == user.id);
            if !same_user {
                state.profile = None;
            }
            state.session = Some(session);
            state.user = Some(user.clone());
            state.loading = true;
        });

        let store = self.clone();
        tokio::spawn(async move {
            let profile = resolve_profile(&*store.inner.profiles, &user, store.inner.profile_timeout).await;
            store.commit_profile(generation, profile);
        })
    }

    fn commit_profile(&self, generation: u64, profile: Option<Profile>) {
        let inner = &self.inner;
        inner.state.send_if_modified(|state| {
            if inner.generation.load(Ordering::SeqCst) != generation {
                tracing::debug!(client_id = %inner.client_id, generation, "Resolução de perfil obsoleta descartada");
                return false;
            }
            state.profile = profile;
            state.loading = false;
            true
        });
    }

    fn clear(&self) {
        self.inner.state.send_modify(|state| {
            self.inner.generation.fetch_add(1, Ordering::SeqCst);
            *state = AuthSnapshot::signed_out();
        });
    }
}

#[cfg(test)]
#[path = "session_store_test.rs"]
mod tests;
