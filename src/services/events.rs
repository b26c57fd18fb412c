//! Entrega dos eventos de autenticação por instância de aplicação.
//!
//! Cada cliente tem os seus próprios canais: eventos de outros clientes nunca
//! disputam espaço com os dele. Os canais não têm limite, então um evento
//! publicado chega ao store assinado mesmo que o pump esteja atrasado.
//!
//! Cada evento recebe um número de sequência crescente por cliente. Quem
//! publicou pode esperar o store alcançar esse número antes de responder.

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::models::auth::AuthEvent;

/// Assinatura dos eventos de um cliente.
pub struct AuthSubscription {
    pub events: mpsc::UnboundedReceiver<AuthEvent>,
    /// Última sequência publicada para o cliente antes da assinatura.
    pub since: u64,
}

#[derive(Default)]
struct ClientChannel {
    seq: u64,
    senders: Vec<mpsc::UnboundedSender<AuthEvent>>,
}

#[derive(Clone, Default)]
pub struct AuthEventHub {
    clients: Arc<Mutex<HashMap<Uuid, ClientChannel>>>,
}

impl AuthEventHub {
    pub fn new() -> Self {
        Self::default()
    }

    // Publicação é síncrona e nunca segura o lock através de um await
    fn clients(&self) -> MutexGuard<'_, HashMap<Uuid, ClientChannel>> {
        self.clients.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn subscribe(&self, client_id: Uuid) -> AuthSubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut clients = self.clients();

        // Libera os canais de stores já encerrados
        clients.retain(|_, channel| {
            channel.senders.retain(|tx| !tx.is_closed());
            !channel.senders.is_empty()
        });

        let channel = clients.entry(client_id).or_default();
        channel.senders.push(tx);
        AuthSubscription { events: rx, since: channel.seq }
    }

    /// Entrega o evento aos assinantes do cliente e devolve a sequência atribuída
    /// (0 quando ninguém está assinado).
    pub fn publish(&self, mut event: AuthEvent) -> u64 {
        let client_id = event.client_id;
        let mut clients = self.clients();

        let Some(channel) = clients.get_mut(&client_id) else {
            tracing::debug!(%client_id, kind = ?event.kind, "Evento de autenticação sem assinantes");
            return 0;
        };

        channel.seq += 1;
        event.seq = channel.seq;
        let seq = channel.seq;
        channel.senders.retain(|tx| tx.send(event.clone()).is_ok());

        if channel.senders.is_empty() {
            clients.remove(&client_id);
        }
        seq
    }

    /// Última sequência publicada para o cliente.
    pub fn published(&self, client_id: Uuid) -> u64 {
        self.clients().get(&client_id).map_or(0, |channel| channel.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::AuthEventKind;

    fn signed_out(client: Uuid) -> AuthEvent {
        AuthEvent::new(client, AuthEventKind::SignedOut, None)
    }

    #[tokio::test]
    async fn foreign_burst_never_evicts_own_event() {
        let hub = AuthEventHub::new();
        let me = Uuid::new_v4();
        let mut mine = hub.subscribe(me);

        let seq = hub.publish(signed_out(me));
        for _ in 0..1_000 {
            let other = Uuid::new_v4();
            let _keep = hub.subscribe(other);
            hub.publish(signed_out(other));
        }

        let event = mine.events.recv().await.expect("own event delivered");
        assert_eq!(event.client_id, me);
        assert_eq!(event.kind, AuthEventKind::SignedOut);
        assert_eq!(event.seq, seq);
        assert!(mine.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn sequence_grows_per_client() {
        let hub = AuthEventHub::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let _sa = hub.subscribe(a);
        let _sb = hub.subscribe(b);

        assert_eq!(hub.publish(signed_out(a)), 1);
        assert_eq!(hub.publish(signed_out(a)), 2);
        assert_eq!(hub.publish(signed_out(b)), 1);
        assert_eq!(hub.published(a), 2);

        let late = hub.subscribe(a);
        assert_eq!(late.since, 2);
    }

    #[test]
    fn publish_without_subscribers_is_a_no_op() {
        let hub = AuthEventHub::new();
        let client = Uuid::new_v4();
        assert_eq!(hub.publish(signed_out(client)), 0);
        assert_eq!(hub.published(client), 0);
        assert!(hub.clients().is_empty());
    }

    #[test]
    fn closed_subscriptions_are_released() {
        let hub = AuthEventHub::new();
        let gone = Uuid::new_v4();
        drop(hub.subscribe(gone));

        let _live = hub.subscribe(Uuid::new_v4());
        assert!(!hub.clients().contains_key(&gone));
        assert_eq!(hub.clients().len(), 1);
    }
}
