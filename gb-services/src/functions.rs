//! Handler entry points.
//!
//! Both handlers take the trigger message, decode and validate its payload,
//! acquire clients from the provider, and act. `Ok` means the message is
//! fully processed; any `Err` is reported to the runtime, which decides on
//! redelivery. Clients are dropped before the handler returns.

use tracing::info;

use gb_core::error::GbResult;
use gb_models::{PubSubMessage, PushNotificationPayload, SyncPayload};

use crate::provider::ClientProvider;
use crate::push::NotificationSender;
use crate::sync::SyncDispatcher;

/// Handle a sync trigger.
pub async fn sync_data(
    provider: &dyn ClientProvider,
    dispatcher: &SyncDispatcher,
    message: &PubSubMessage,
) -> GbResult<()> {
    info!("SyncData triggered with payload: {}", message.payload_lossy());

    let payload = SyncPayload::decode(&message.data)?;
    let sync_type = payload.validate()?;

    let store = provider.document_store().await?;
    dispatcher.dispatch(store.as_ref(), &sync_type, &payload).await
}

/// Handle a push notification trigger.
pub async fn send_push_notification(
    provider: &dyn ClientProvider,
    sender: &NotificationSender,
    message: &PubSubMessage,
) -> GbResult<()> {
    info!("SendPushNotification triggered with payload: {}", message.payload_lossy());

    let payload = PushNotificationPayload::decode(&message.data)?;
    payload.validate()?;

    let store = provider.document_store().await?;
    let Some(tokens) = sender.load_tokens(store.as_ref(), &payload.user_id).await? else {
        return Ok(());
    };

    let messenger = provider.messenger().await?;
    let report = sender
        .deliver(store.as_ref(), messenger.as_ref(), &payload, tokens)
        .await;

    info!(
        "push to user {} done: {} attempted, {} delivered, {} pruned",
        payload.user_id, report.attempted, report.delivered, report.pruned
    );
    Ok(())
}
