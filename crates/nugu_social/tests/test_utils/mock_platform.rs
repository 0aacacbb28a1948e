//! Chat platform that serves seeded messages and records replies.

use async_trait::async_trait;
use nugu_error::{HttpError, NuguResult, PlatformError, PlatformErrorKind};
use nugu_interface::{
    ChannelMessage, ChatPlatform, FetchedImage, ImageFetcher, OutgoingMessage, UserInfo,
};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;

/// Id the mock reports for the bot account.
pub const BOT_ID: u64 = 999;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    messages: HashMap<u64, ChannelMessage>,
    sent: Vec<(u64, u64, OutgoingMessage)>,
    deleted: BTreeSet<u64>,
}

/// Recording platform for router tests.
pub struct MockPlatform {
    state: Mutex<State>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 7000,
                ..State::default()
            }),
        }
    }

    pub fn add_message(&self, message: ChannelMessage) {
        self.state
            .lock()
            .unwrap()
            .messages
            .insert(message.id, message);
    }

    /// Everything sent to `channel_id`, in order.
    pub fn sent_to(&self, channel_id: u64) -> Vec<OutgoingMessage> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .filter(|(_, channel, _)| *channel == channel_id)
            .map(|(_, _, message)| message.clone())
            .collect()
    }

    /// Text replies sent to `channel_id`.
    pub fn texts(&self, channel_id: u64) -> Vec<String> {
        self.sent_to(channel_id)
            .into_iter()
            .filter_map(|m| m.content)
            .collect()
    }

    /// Ids of messages sent to `channel_id`.
    pub fn sent_ids(&self, channel_id: u64) -> Vec<u64> {
        self.state
            .lock()
            .unwrap()
            .sent
            .iter()
            .filter(|(_, channel, _)| *channel == channel_id)
            .map(|(id, _, _)| *id)
            .collect()
    }

    pub fn is_deleted(&self, message_id: u64) -> bool {
        self.state.lock().unwrap().deleted.contains(&message_id)
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn bot_user_id(&self) -> u64 {
        BOT_ID
    }

    async fn send(&self, channel_id: u64, message: OutgoingMessage) -> NuguResult<u64> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = state.next_id;
        state.sent.push((id, channel_id, message));
        Ok(id)
    }

    async fn edit(
        &self,
        _channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    ) -> NuguResult<()> {
        let mut state = self.state.lock().unwrap();
        match state.sent.iter_mut().find(|(id, _, _)| *id == message_id) {
            Some(sent) => {
                sent.2 = message;
                Ok(())
            }
            None => Err(PlatformError::new(PlatformErrorKind::MessageNotFound(message_id)))?,
        }
    }

    async fn delete_message(&self, _channel_id: u64, message_id: u64) -> NuguResult<()> {
        self.state.lock().unwrap().deleted.insert(message_id);
        Ok(())
    }

    async fn bulk_delete(&self, _channel_id: u64, message_ids: &[u64]) -> NuguResult<()> {
        self.state
            .lock()
            .unwrap()
            .deleted
            .extend(message_ids.iter().copied());
        Ok(())
    }

    async fn add_reaction(&self, _channel_id: u64, _message_id: u64, _emoji: &str) -> NuguResult<()> {
        Ok(())
    }

    async fn remove_reaction(
        &self,
        _channel_id: u64,
        _message_id: u64,
        _emoji: &str,
        _user_id: u64,
    ) -> NuguResult<()> {
        Ok(())
    }

    async fn remove_all_reactions(&self, _channel_id: u64, _message_id: u64) -> NuguResult<()> {
        Ok(())
    }

    async fn send_direct(&self, _user_id: u64, _content: &str) -> NuguResult<()> {
        Ok(())
    }

    async fn message(&self, _channel_id: u64, message_id: u64) -> NuguResult<ChannelMessage> {
        match self.state.lock().unwrap().messages.get(&message_id) {
            Some(message) => Ok(message.clone()),
            None => Err(PlatformError::new(PlatformErrorKind::MessageNotFound(message_id)))?,
        }
    }

    async fn recent_messages(&self, _channel_id: u64, _limit: u8) -> NuguResult<Vec<ChannelMessage>> {
        Ok(Vec::new())
    }

    async fn next_message(&self, channel_id: u64) -> NuguResult<ChannelMessage> {
        Err(PlatformError::new(PlatformErrorKind::ChannelNotFound(channel_id)).into())
    }

    async fn user(&self, user_id: u64) -> NuguResult<UserInfo> {
        Ok(UserInfo {
            id: user_id,
            name: format!("user{}", user_id),
            is_bot: user_id == BOT_ID,
            avatar_url: None,
        })
    }

    async fn channel_name(&self, channel_id: u64) -> NuguResult<String> {
        Ok(format!("channel{}", channel_id))
    }

    async fn guild_name(&self, _guild_id: u64) -> NuguResult<String> {
        Ok("Blink Hub".to_string())
    }
}

/// Fetcher for tests that never reach the network.
pub struct NoFetcher;

#[async_trait]
impl ImageFetcher for NoFetcher {
    async fn fetch(&self, url: &str) -> NuguResult<FetchedImage> {
        Err(HttpError::new(format!("no network in tests: {}", url)))?
    }
}
