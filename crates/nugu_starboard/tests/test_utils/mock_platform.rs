//! Chat platform with seeded messages and users that records mirror traffic.

use async_trait::async_trait;
use nugu_error::{NuguResult, PlatformError, PlatformErrorKind};
use nugu_interface::{ChannelMessage, ChatPlatform, Embed, OutgoingMessage, UserInfo};
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::time::Duration;

/// Id the mock reports for the bot account.
pub const BOT_ID: u64 = 999;

#[derive(Debug, Default)]
struct State {
    next_id: u64,
    messages: HashMap<u64, ChannelMessage>,
    users: HashMap<u64, UserInfo>,
    /// Embeds currently posted, by message id
    posted: HashMap<u64, (u64, Embed)>,
    sends: usize,
    edits: usize,
    deleted: BTreeSet<u64>,
}

/// Recording platform for starboard tests.
///
/// An optional delay on sends widens race windows in concurrency tests.
pub struct MockPlatform {
    state: Mutex<State>,
    send_delay: Duration,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::with_send_delay(Duration::ZERO)
    }

    pub fn with_send_delay(send_delay: Duration) -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 5000,
                ..State::default()
            }),
            send_delay,
        }
    }

    pub fn add_user(&self, id: u64, name: &str, is_bot: bool) {
        self.state.lock().unwrap().users.insert(
            id,
            UserInfo {
                id,
                name: name.to_string(),
                is_bot,
                avatar_url: None,
            },
        );
    }

    pub fn add_message(&self, message: ChannelMessage) {
        self.state
            .lock()
            .unwrap()
            .messages
            .insert(message.id, message);
    }

    /// Embeds currently standing in `channel_id`.
    pub fn posted_in(&self, channel_id: u64) -> Vec<(u64, Embed)> {
        let state = self.state.lock().unwrap();
        let mut posted: Vec<(u64, Embed)> = state
            .posted
            .iter()
            .filter(|(_, (channel, _))| *channel == channel_id)
            .map(|(id, (_, embed))| (*id, embed.clone()))
            .collect();
        posted.sort_by_key(|(id, _)| *id);
        posted
    }

    pub fn sends(&self) -> usize {
        self.state.lock().unwrap().sends
    }

    pub fn edits(&self) -> usize {
        self.state.lock().unwrap().edits
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
        if !self.send_delay.is_zero() {
            tokio::time::sleep(self.send_delay).await;
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        state.sends += 1;
        let id = state.next_id;
        if let Some(embed) = message.embed {
            state.posted.insert(id, (channel_id, embed));
        }
        Ok(id)
    }

    async fn edit(
        &self,
        _channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    ) -> NuguResult<()> {
        let mut state = self.state.lock().unwrap();
        state.edits += 1;
        match (state.posted.get_mut(&message_id), message.embed) {
            (Some(posted), Some(embed)) => {
                posted.1 = embed;
                Ok(())
            }
            _ => Err(PlatformError::new(PlatformErrorKind::MessageNotFound(message_id)))?,
        }
    }

    async fn delete_message(&self, _channel_id: u64, message_id: u64) -> NuguResult<()> {
        let mut state = self.state.lock().unwrap();
        state.deleted.insert(message_id);
        match state.posted.remove(&message_id) {
            Some(_) => Ok(()),
            None => Err(PlatformError::new(PlatformErrorKind::MessageNotFound(message_id)))?,
        }
    }

    async fn bulk_delete(&self, _channel_id: u64, _message_ids: &[u64]) -> NuguResult<()> {
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
        match self.state.lock().unwrap().users.get(&user_id) {
            Some(user) => Ok(user.clone()),
            None => Err(PlatformError::new(PlatformErrorKind::UserNotFound(user_id)))?,
        }
    }

    async fn channel_name(&self, channel_id: u64) -> NuguResult<String> {
        Ok(format!("channel{}", channel_id))
    }

    async fn guild_name(&self, _guild_id: u64) -> NuguResult<String> {
        Ok("Blink Hub".to_string())
    }
}
