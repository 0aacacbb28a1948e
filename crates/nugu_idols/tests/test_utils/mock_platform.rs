//! Recording chat platform and canned image fetcher.

use async_trait::async_trait;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use nugu_error::{HttpError, NuguResult, PlatformError, PlatformErrorKind};
use nugu_interface::{
    ChannelMessage, ChatPlatform, FetchedImage, ImageFetcher, OutgoingMessage, UserInfo,
};
use std::collections::{BTreeSet, HashMap};
use std::io::Cursor;
use std::sync::Mutex;
use tokio::sync::mpsc;

/// Id the mock reports for the bot account.
pub const BOT_ID: u64 = 999;

/// A message the code under test sent.
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub id: u64,
    pub channel_id: u64,
    pub message: OutgoingMessage,
}

#[derive(Debug, Default)]
struct Recorded {
    next_id: u64,
    sent: Vec<SentMessage>,
    deleted: BTreeSet<u64>,
    reactions: Vec<(u64, String)>,
    removed_reactions: Vec<(u64, String, u64)>,
    direct: Vec<(u64, String)>,
}

/// Chat platform that records every call.
///
/// Message ids increase with every send. Messages pushed through
/// [`MockPlatform::push_incoming`] are handed out by `next_message`.
pub struct MockPlatform {
    recorded: Mutex<Recorded>,
    incoming_tx: mpsc::UnboundedSender<ChannelMessage>,
    incoming_rx: tokio::sync::Mutex<mpsc::UnboundedReceiver<ChannelMessage>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
        Self {
            recorded: Mutex::new(Recorded {
                next_id: 1000,
                ..Recorded::default()
            }),
            incoming_tx,
            incoming_rx: tokio::sync::Mutex::new(incoming_rx),
        }
    }

    /// Queue a message for `next_message`.
    pub fn push_incoming(&self, message: ChannelMessage) {
        self.incoming_tx.send(message).unwrap();
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.recorded.lock().unwrap().sent.clone()
    }

    /// Text contents of every message sent to `channel_id`.
    pub fn texts(&self, channel_id: u64) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|m| m.channel_id == channel_id)
            .filter_map(|m| m.message.content)
            .collect()
    }

    pub fn is_deleted(&self, message_id: u64) -> bool {
        self.recorded.lock().unwrap().deleted.contains(&message_id)
    }

    pub fn reactions_on(&self, message_id: u64) -> Vec<String> {
        self.recorded
            .lock()
            .unwrap()
            .reactions
            .iter()
            .filter(|(id, _)| *id == message_id)
            .map(|(_, emoji)| emoji.clone())
            .collect()
    }

    pub fn removed_reactions(&self) -> Vec<(u64, String, u64)> {
        self.recorded.lock().unwrap().removed_reactions.clone()
    }

    pub fn direct_messages(&self) -> Vec<(u64, String)> {
        self.recorded.lock().unwrap().direct.clone()
    }
}

#[async_trait]
impl ChatPlatform for MockPlatform {
    fn bot_user_id(&self) -> u64 {
        BOT_ID
    }

    async fn send(&self, channel_id: u64, message: OutgoingMessage) -> NuguResult<u64> {
        let mut recorded = self.recorded.lock().unwrap();
        recorded.next_id += 1;
        let id = recorded.next_id;
        recorded.sent.push(SentMessage {
            id,
            channel_id,
            message,
        });
        Ok(id)
    }

    async fn edit(
        &self,
        _channel_id: u64,
        message_id: u64,
        message: OutgoingMessage,
    ) -> NuguResult<()> {
        let mut recorded = self.recorded.lock().unwrap();
        match recorded.sent.iter_mut().find(|m| m.id == message_id) {
            Some(sent) => {
                sent.message = message;
                Ok(())
            }
            None => Err(PlatformError::new(PlatformErrorKind::MessageNotFound(message_id)))?,
        }
    }

    async fn delete_message(&self, _channel_id: u64, message_id: u64) -> NuguResult<()> {
        self.recorded.lock().unwrap().deleted.insert(message_id);
        Ok(())
    }

    async fn bulk_delete(&self, _channel_id: u64, message_ids: &[u64]) -> NuguResult<()> {
        self.recorded
            .lock()
            .unwrap()
            .deleted
            .extend(message_ids.iter().copied());
        Ok(())
    }

    async fn add_reaction(&self, _channel_id: u64, message_id: u64, emoji: &str) -> NuguResult<()> {
        self.recorded
            .lock()
            .unwrap()
            .reactions
            .push((message_id, emoji.to_string()));
        Ok(())
    }

    async fn remove_reaction(
        &self,
        _channel_id: u64,
        message_id: u64,
        emoji: &str,
        user_id: u64,
    ) -> NuguResult<()> {
        self.recorded
            .lock()
            .unwrap()
            .removed_reactions
            .push((message_id, emoji.to_string(), user_id));
        Ok(())
    }

    async fn remove_all_reactions(&self, _channel_id: u64, message_id: u64) -> NuguResult<()> {
        self.recorded
            .lock()
            .unwrap()
            .reactions
            .retain(|(id, _)| *id != message_id);
        Ok(())
    }

    async fn send_direct(&self, user_id: u64, content: &str) -> NuguResult<()> {
        self.recorded
            .lock()
            .unwrap()
            .direct
            .push((user_id, content.to_string()));
        Ok(())
    }

    async fn message(&self, channel_id: u64, message_id: u64) -> NuguResult<ChannelMessage> {
        let recorded = self.recorded.lock().unwrap();
        match recorded.sent.iter().find(|m| m.id == message_id) {
            Some(sent) => Ok(ChannelMessage {
                id: sent.id,
                channel_id,
                author_id: BOT_ID,
                author_is_bot: true,
                content: sent.message.content.clone().unwrap_or_default(),
                ..ChannelMessage::default()
            }),
            None => Err(PlatformError::new(PlatformErrorKind::MessageNotFound(message_id)))?,
        }
    }

    async fn recent_messages(&self, channel_id: u64, limit: u8) -> NuguResult<Vec<ChannelMessage>> {
        let recorded = self.recorded.lock().unwrap();
        Ok(recorded
            .sent
            .iter()
            .rev()
            .filter(|m| m.channel_id == channel_id && !recorded.deleted.contains(&m.id))
            .take(limit as usize)
            .map(|m| ChannelMessage {
                id: m.id,
                channel_id,
                author_id: BOT_ID,
                author_is_bot: true,
                content: m.message.content.clone().unwrap_or_default(),
                ..ChannelMessage::default()
            })
            .collect())
    }

    async fn next_message(&self, _channel_id: u64) -> NuguResult<ChannelMessage> {
        let mut rx = self.incoming_rx.lock().await;
        match rx.recv().await {
            Some(message) => Ok(message),
            None => Err(PlatformError::new(PlatformErrorKind::Api(
                "incoming stream closed".to_string(),
            )))?,
        }
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
        Ok(format!("channel-{}", channel_id))
    }

    async fn guild_name(&self, guild_id: u64) -> NuguResult<String> {
        Ok(format!("guild-{}", guild_id))
    }
}

/// Image fetcher serving canned responses by URL.
#[derive(Default)]
pub struct MockFetcher {
    images: Mutex<HashMap<String, FetchedImage>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `bytes` as `content_type` for `url`.
    pub fn serve(&self, url: &str, content_type: &str, bytes: Vec<u8>) {
        self.images
            .lock()
            .unwrap()
            .insert(url.to_string(), FetchedImage::new(content_type, bytes));
    }
}

#[async_trait]
impl ImageFetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> NuguResult<FetchedImage> {
        match self.images.lock().unwrap().get(url) {
            Some(image) => Ok(image.clone()),
            None => Err(HttpError::new(format!("404 for {}", url)))?,
        }
    }
}

fn encode(image: DynamicImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png).unwrap();
    bytes.into_inner()
}

/// Square horizontal gradient. Hashes to all zeros, or all ones reversed.
pub fn gradient_png(side: u32, reverse: bool) -> Vec<u8> {
    encode(DynamicImage::ImageLuma8(GrayImage::from_fn(side, side, |x, _| {
        let v = (x * 255 / side) as u8;
        Luma([if reverse { 255 - v } else { v }])
    })))
}

/// Square picture with bright and dark bands alternating down the rows.
pub fn stripes_png(side: u32) -> Vec<u8> {
    encode(DynamicImage::ImageLuma8(GrayImage::from_fn(side, side, |x, y| {
        let v = (x * 255 / side) as u8;
        Luma([if (y * 8 / side) % 2 == 0 { v } else { 255 - v }])
    })))
}
