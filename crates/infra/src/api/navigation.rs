//! Sign-in redirect signal for hosts that listen on a channel

use estatedesk_common::auth::SignInNavigator;
use tokio::sync::broadcast;
use tracing::debug;

/// Session lifecycle events published to the host application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// The session is gone; show the sign-in screen
    SignInRequired,
}

/// [`SignInNavigator`] that broadcasts [`SessionEvent::SignInRequired`]
#[derive(Debug, Clone)]
pub struct BroadcastNavigator {
    sender: broadcast::Sender<SessionEvent>,
}

impl BroadcastNavigator {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for BroadcastNavigator {
    fn default() -> Self {
        Self::new(16)
    }
}

impl SignInNavigator for BroadcastNavigator {
    fn redirect_to_sign_in(&self) {
        if self.sender.send(SessionEvent::SignInRequired).is_err() {
            debug!("Sign-in required but no listener is subscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_sign_in_required() {
        let navigator = BroadcastNavigator::default();
        let mut first = navigator.subscribe();
        let mut second = navigator.subscribe();

        navigator.redirect_to_sign_in();

        assert_eq!(first.recv().await.unwrap(), SessionEvent::SignInRequired);
        assert_eq!(second.recv().await.unwrap(), SessionEvent::SignInRequired);
    }

    #[test]
    fn redirect_without_subscribers_is_harmless() {
        BroadcastNavigator::new(0).redirect_to_sign_in();
    }
}
