use dashmap::DashMap;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, instrument, warn};

use crate::dtos::WsEventDTO;

/// Online users and the channel feeding the writer task of their socket
pub struct UserMap {
    users_online: DashMap<i64, UnboundedSender<WsEventDTO>>,
}

impl Default for UserMap {
    fn default() -> Self {
        Self::new()
    }
}

impl UserMap {
    pub fn new() -> Self {
        UserMap {
            users_online: DashMap::new(),
        }
    }

    /// A second socket for the same user replaces the first registration.
    /// The socket tasks keep only weak handles, so dropping the old sender
    /// closes the old writer's channel and that socket shuts down.
    #[instrument(skip(self, tx))]
    pub fn register_online(&self, user_id: i64, tx: UnboundedSender<WsEventDTO>) {
        if self.users_online.insert(user_id, tx).is_some() {
            info!("Replaced previous socket of user {}", user_id);
        }
        info!("Total online users: {}", self.users_online.len());
    }

    /// Removes the registration only if it still belongs to `tx`, so a
    /// closing old socket cannot unregister its replacement.
    #[instrument(skip(self, tx))]
    pub fn remove_from_online(&self, user_id: i64, tx: &UnboundedSender<WsEventDTO>) {
        let removed = self
            .users_online
            .remove_if(&user_id, |_, current| current.same_channel(tx));
        if removed.is_some() {
            info!("User {} went offline", user_id);
        }
    }

    /// Pushes the event when the user is online. Returns whether it was queued.
    #[instrument(skip(self, event))]
    pub fn send_if_online(&self, user_id: i64, event: WsEventDTO) -> bool {
        match self.users_online.get(&user_id) {
            Some(entry) => match entry.value().send(event) {
                Ok(()) => true,
                Err(e) => {
                    warn!("Failed to queue event for user {}: {:?}", user_id, e.0);
                    false
                }
            },
            None => {
                debug!("User {} not online, event not pushed", user_id);
                false
            }
        }
    }

    pub fn online_count(&self) -> usize {
        self.users_online.len()
    }

    pub fn is_user_online(&self, user_id: i64) -> bool {
        self.users_online.contains_key(&user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    fn error_event() -> WsEventDTO {
        WsEventDTO::Error {
            code: 500,
            message: "test".into(),
        }
    }

    #[test]
    fn test_send_reaches_registered_user() {
        let map = UserMap::new();
        let (tx, mut rx) = unbounded_channel();
        map.register_online(7, tx);

        assert!(map.is_user_online(7));
        assert!(map.send_if_online(7, error_event()));
        assert!(rx.try_recv().is_ok());
        assert!(!map.send_if_online(8, error_event()));
    }

    #[test]
    fn test_stale_socket_does_not_remove_replacement() {
        let map = UserMap::new();
        let (old_tx, _old_rx) = unbounded_channel();
        let (new_tx, mut new_rx) = unbounded_channel();
        map.register_online(1, old_tx.clone());
        map.register_online(1, new_tx.clone());
        assert_eq!(map.online_count(), 1);

        map.remove_from_online(1, &old_tx);
        assert!(map.is_user_online(1));
        assert!(map.send_if_online(1, error_event()));
        assert!(new_rx.try_recv().is_ok());

        map.remove_from_online(1, &new_tx);
        assert!(!map.is_user_online(1));
    }

    #[test]
    fn test_replacement_closes_previous_channel() {
        let map = UserMap::new();
        let (old_tx, mut old_rx) = unbounded_channel();
        let old_weak = old_tx.downgrade();
        map.register_online(3, old_tx);

        let (new_tx, _new_rx) = unbounded_channel();
        map.register_online(3, new_tx);

        // only a weak handle is left, the old writer sees a closed channel
        assert!(old_weak.upgrade().is_none());
        assert!(matches!(
            old_rx.try_recv(),
            Err(tokio::sync::mpsc::error::TryRecvError::Disconnected)
        ));
        assert!(map.is_user_online(3));
    }
}
