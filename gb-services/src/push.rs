//! Delivery of one notification to every registered device of a user.
//!
//! Tokens are sent to one at a time. A token whose send fails is removed
//! from the user's token map (subject to the prune policy) and the reduced
//! map is written back once all sends are done.

use tracing::{error, info, warn};

use gb_core::config::{PrunePolicy, PushConfig};
use gb_core::constants::{FCM_TOKENS_FIELD, USERS_COLLECTION};
use gb_core::error::{GbError, GbResult};
use gb_models::{
    AndroidConfig, AndroidNotification, DocumentStore, FcmTokens, Message, Notification,
    PushMessenger, PushNotificationPayload, TokenField,
};

/// Outcome of one delivery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PushReport {
    /// Sends attempted, one per token.
    pub attempted: usize,
    /// Sends the push service accepted.
    pub delivered: usize,
    /// Tokens removed from the user's map.
    pub pruned: usize,
}

/// Builds and delivers notifications.
#[derive(Debug, Clone)]
pub struct NotificationSender {
    icon_url: String,
    color: String,
    prune_policy: PrunePolicy,
}

impl NotificationSender {
    pub fn from_config(config: &PushConfig) -> Self {
        Self {
            icon_url: config.icon_url.clone(),
            color: config.color.clone(),
            prune_policy: config.prune_policy,
        }
    }

    /// Read the user's device tokens.
    ///
    /// Returns `None` when there is nothing to send to: the field is absent,
    /// empty, or not a map. Only the document fetch itself can fail.
    pub async fn load_tokens(
        &self,
        store: &dyn DocumentStore,
        user_id: &str,
    ) -> GbResult<Option<FcmTokens>> {
        let user = store.get_document(USERS_COLLECTION, user_id).await?;

        match user.fcm_tokens() {
            TokenField::Present(tokens) if !tokens.is_empty() => Ok(Some(tokens)),
            TokenField::Present(_) | TokenField::Absent => {
                info!("user {user_id} doesn't have FCM tokens");
                Ok(None)
            }
            TokenField::Malformed(reason) => {
                warn!("user {user_id} has unusable {FCM_TOKENS_FIELD}: {reason}");
                Ok(None)
            }
        }
    }

    /// The message sent to one token.
    pub fn build_message(&self, payload: &PushNotificationPayload, token: &str) -> Message {
        Message {
            token: token.to_string(),
            data: payload.data.clone(),
            notification: Notification {
                title: payload.title.clone(),
                body: payload.body.clone(),
            },
            android: AndroidConfig {
                collapse_key: payload.collapse_key().map(str::to_string),
                notification: AndroidNotification {
                    icon: self.icon_url.clone(),
                    color: self.color.clone(),
                },
            },
        }
    }

    /// Send to every token, prune failures, and write the survivors back.
    ///
    /// Per-token failures and a failed write-back are logged, never returned.
    pub async fn deliver(
        &self,
        store: &dyn DocumentStore,
        messenger: &dyn PushMessenger,
        payload: &PushNotificationPayload,
        mut tokens: FcmTokens,
    ) -> PushReport {
        let mut report = PushReport::default();

        for token in tokens.tokens() {
            report.attempted += 1;
            let message = self.build_message(payload, &token);

            match messenger.send(&message).await {
                Ok(receipt) => {
                    report.delivered += 1;
                    info!("notification sent: {receipt}");
                }
                Err(e) => {
                    warn!("notification not sent to {}: {e}", redact(&token));
                    if self.should_prune(&e) {
                        tokens.remove(&token);
                        report.pruned += 1;
                    }
                }
            }
        }

        if let Err(e) = store
            .update_field(
                USERS_COLLECTION,
                &payload.user_id,
                FCM_TOKENS_FIELD,
                tokens.to_field_value(),
            )
            .await
        {
            error!("error saving {FCM_TOKENS_FIELD} back to user {}: {e}", payload.user_id);
        }

        report
    }

    fn should_prune(&self, err: &GbError) -> bool {
        match self.prune_policy {
            PrunePolicy::AnyError => true,
            PrunePolicy::InvalidToken => err.is_stale_token(),
        }
    }
}

/// Shorten a device token for logs.
fn redact(token: &str) -> String {
    match token.char_indices().nth(8) {
        Some((idx, _)) => format!("{}...", &token[..idx]),
        None => token.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn payload() -> PushNotificationPayload {
        PushNotificationPayload {
            user_id: "u1".into(),
            title: "Berita".into(),
            body: "Ada berita baru".into(),
            data: Some(BTreeMap::from([("entry_id".to_string(), "42".to_string())])),
            collapse_key: Some(String::new()),
        }
    }

    #[test]
    fn test_build_message_uses_config_and_payload() {
        let sender = NotificationSender::from_config(&PushConfig::default());
        let message = sender.build_message(&payload(), "tok-1");

        assert_eq!(message.token, "tok-1");
        assert_eq!(message.notification.title, "Berita");
        assert_eq!(message.data.as_ref().unwrap()["entry_id"], "42");
        assert_eq!(message.android.notification.color, "#4CB050");
        assert_eq!(message.android.notification.icon, gb_core::constants::android::ICON_URL);
        assert_eq!(message.android.collapse_key, None);
    }

    #[test]
    fn test_collapse_key_carried() {
        let sender = NotificationSender::from_config(&PushConfig::default());
        let mut p = payload();
        p.collapse_key = Some("entries".into());
        assert_eq!(
            sender.build_message(&p, "t").android.collapse_key.as_deref(),
            Some("entries")
        );
    }

    #[test]
    fn test_prune_policies() {
        let transient = GbError::PushRejected {
            status: 503,
            code: Some("UNAVAILABLE".into()),
            message: "later".into(),
        };
        let stale = GbError::PushRejected {
            status: 404,
            code: Some("UNREGISTERED".into()),
            message: "gone".into(),
        };

        let any = NotificationSender::from_config(&PushConfig::default());
        assert!(any.should_prune(&transient));
        assert!(any.should_prune(&stale));

        let config = PushConfig {
            prune_policy: PrunePolicy::InvalidToken,
            ..PushConfig::default()
        };
        let strict = NotificationSender::from_config(&config);
        assert!(!strict.should_prune(&transient));
        assert!(strict.should_prune(&stale));
    }

    #[test]
    fn test_redact() {
        assert_eq!(redact("short"), "short");
        assert_eq!(redact("abcdefghijklmnop"), "abcdefgh...");
    }
}
