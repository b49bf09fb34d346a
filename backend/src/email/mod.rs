//! Outbound email
//!
//! Delivery is behind a trait so the wiring can swap transports. The
//! default transport only logs; registration must never fail because a
//! notice could not be sent.

use async_trait::async_trait;
use tracing::info;

/// Sends transactional email
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Notify a freshly registered user
    async fn send_registration_notice(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> anyhow::Result<()>;
}

/// Transport that writes the notice to the log instead of sending it
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send_registration_notice(
        &self,
        email: &str,
        first_name: &str,
        last_name: &str,
    ) -> anyhow::Result<()> {
        info!(email, first_name, last_name, "Registration notice queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_mailer_always_succeeds() {
        let mailer = LogMailer;
        let sent = tokio_test::block_on(mailer.send_registration_notice("a@b.io", "Ada", "Byron"));
        assert!(sent.is_ok());
    }
}
