//! Handler invocation from a message file or stdin.

use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;
use console::style;

use gb_core::config::AppConfig;
use gb_core::error::GbResult;
use gb_models::PubSubMessage;
use gb_services::{
    send_push_notification, sync_data as run_sync_data, CloudProvider, HttpSyncRoutines,
    NotificationSender, SyncDispatcher,
};

/// Where the trigger message comes from.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Read the message from this file instead of stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Treat the input as the bare JSON payload rather than a Pub/Sub message.
    #[arg(long)]
    pub raw: bool,
}

impl InputArgs {
    fn read(&self) -> GbResult<PubSubMessage> {
        let bytes = match &self.file {
            Some(path) => std::fs::read(path)?,
            None => {
                let mut buf = Vec::new();
                std::io::stdin().read_to_end(&mut buf)?;
                buf
            }
        };
        parse_message(bytes, self.raw)
    }
}

/// Build the trigger message from input bytes.
pub fn parse_message(bytes: Vec<u8>, raw: bool) -> GbResult<PubSubMessage> {
    if raw {
        Ok(PubSubMessage::from_data(bytes))
    } else {
        PubSubMessage::from_slice(&bytes)
    }
}

pub async fn sync_data(config: AppConfig, input: InputArgs) -> GbResult<()> {
    let message = input.read()?;
    let dispatcher = SyncDispatcher::new(Arc::new(HttpSyncRoutines::from_config(&config)));
    let provider = CloudProvider::new(config);

    run_sync_data(&provider, &dispatcher, &message).await?;
    println!("{} SyncData", style("ok").green());
    Ok(())
}

pub async fn send_push(config: AppConfig, input: InputArgs) -> GbResult<()> {
    let message = input.read()?;
    let sender = NotificationSender::from_config(&config.push);
    let provider = CloudProvider::new(config);

    send_push_notification(&provider, &sender, &message).await?;
    println!("{} SendPushNotification", style("ok").green());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_raw_input_is_the_payload() {
        let message = parse_message(br#"{"id":1}"#.to_vec(), true).unwrap();
        assert_eq!(message.data, br#"{"id":1}"#);
    }

    #[test]
    fn test_envelope_input_is_decoded() {
        // base64 of {"id":1}
        let message = parse_message(br#"{"data":"eyJpZCI6MX0="}"#.to_vec(), false).unwrap();
        assert_eq!(message.data, br#"{"id":1}"#);
    }

    #[test]
    fn test_read_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(br#"{"user_id":"u1"}"#).unwrap();

        let input = InputArgs {
            file: Some(file.path().to_path_buf()),
            raw: true,
        };
        assert_eq!(input.read().unwrap().data, br#"{"user_id":"u1"}"#);
    }
}
