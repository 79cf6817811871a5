//! Login-surface navigation after an unrecoverable refresh failure.

use tokio::sync::mpsc;

/// Sends the user agent to the login surface.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self, login_url: &str);
}

/// Logs the redirect. Used by the CLI, where there is no page to navigate.
#[derive(Debug, Default)]
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self, login_url: &str) {
        tracing::warn!(login_url = %login_url, "Session expired, sign in again");
    }
}

/// Forwards the login URL to whoever owns the user agent.
#[derive(Debug, Clone)]
pub struct ChannelRedirect {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelRedirect {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl LoginRedirect for ChannelRedirect {
    fn redirect_to_login(&self, login_url: &str) {
        if self.tx.send(login_url.to_string()).is_err() {
            tracing::warn!(login_url = %login_url, "Login redirect receiver dropped");
        }
    }
}
