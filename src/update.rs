//! Typed model of the Telegram Bot API update wire format.
//!
//! Only the fields the analytics schema extracts (plus identity basics) are
//! modeled; unknown wire fields are ignored on deserialization. The payload
//! is an externally tagged enum, so an update always carries exactly one
//! variant and classification is a plain `match`.

use serde::{Deserialize, Serialize};

/// One inbound update from the messaging platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(flatten)]
    pub payload: UpdatePayload,
}

/// The payload carried by an update. Covers the full Bot API surface so a
/// production update stream always deserializes; kinds outside the analytics
/// taxonomy are rejected later, during classification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdatePayload {
    Message(Message),
    EditedMessage(Message),
    ChannelPost(Message),
    EditedChannelPost(Message),
    BusinessConnection(BusinessConnection),
    BusinessMessage(Message),
    EditedBusinessMessage(Message),
    DeletedBusinessMessages(BusinessMessagesDeleted),
    MessageReaction(MessageReactionUpdated),
    MessageReactionCount(MessageReactionCountUpdated),
    InlineQuery(InlineQuery),
    ChosenInlineResult(ChosenInlineResult),
    CallbackQuery(CallbackQuery),
    ShippingQuery(ShippingQuery),
    PreCheckoutQuery(PreCheckoutQuery),
    PurchasedPaidMedia(PaidMediaPurchased),
    Poll(Poll),
    PollAnswer(PollAnswer),
    MyChatMember(ChatMemberUpdated),
    ChatMember(ChatMemberUpdated),
    ChatJoinRequest(ChatJoinRequest),
    ChatBoost(ChatBoostUpdated),
    RemovedChatBoost(ChatBoostRemoved),
}

impl Update {
    /// The message this update is about, if any. Edited variants, channel
    /// posts, business messages, and the message attached to a callback
    /// query all count.
    pub fn message(&self) -> Option<&Message> {
        match &self.payload {
            UpdatePayload::Message(m)
            | UpdatePayload::EditedMessage(m)
            | UpdatePayload::ChannelPost(m)
            | UpdatePayload::EditedChannelPost(m)
            | UpdatePayload::BusinessMessage(m)
            | UpdatePayload::EditedBusinessMessage(m) => Some(m),
            UpdatePayload::CallbackQuery(q) => q.message.as_deref(),
            _ => None,
        }
    }

    /// The individual user who caused this update, if one did.
    pub fn from(&self) -> Option<&User> {
        match &self.payload {
            UpdatePayload::CallbackQuery(q) => Some(&q.from),
            UpdatePayload::InlineQuery(q) => Some(&q.from),
            UpdatePayload::ChosenInlineResult(r) => Some(&r.from),
            UpdatePayload::ShippingQuery(q) => Some(&q.from),
            UpdatePayload::PreCheckoutQuery(q) => Some(&q.from),
            UpdatePayload::PurchasedPaidMedia(p) => Some(&p.from),
            UpdatePayload::BusinessConnection(c) => Some(&c.user),
            UpdatePayload::MyChatMember(u) | UpdatePayload::ChatMember(u) => Some(&u.from),
            UpdatePayload::ChatJoinRequest(r) => Some(&r.from),
            UpdatePayload::MessageReaction(r) => r.user.as_ref(),
            UpdatePayload::PollAnswer(a) => a.user.as_ref(),
            UpdatePayload::ChatBoost(b) => b.boost.source.user.as_ref(),
            UpdatePayload::RemovedChatBoost(b) => b.source.user.as_ref(),
            _ => self.message().and_then(|m| m.from.as_ref()),
        }
    }

    /// The chat this update happened in, if any.
    pub fn chat(&self) -> Option<&Chat> {
        match &self.payload {
            UpdatePayload::DeletedBusinessMessages(d) => Some(&d.chat),
            UpdatePayload::MessageReaction(r) => Some(&r.chat),
            UpdatePayload::MessageReactionCount(r) => Some(&r.chat),
            UpdatePayload::MyChatMember(u) | UpdatePayload::ChatMember(u) => Some(&u.chat),
            UpdatePayload::ChatJoinRequest(r) => Some(&r.chat),
            UpdatePayload::ChatBoost(b) => Some(&b.chat),
            UpdatePayload::RemovedChatBoost(b) => Some(&b.chat),
            _ => self.message().map(|m| &m.chat),
        }
    }

    /// The chat a message was sent on behalf of (anonymous admins, channel
    /// posts, auto-forwarded channel content).
    pub fn sender_chat(&self) -> Option<&Chat> {
        self.message().and_then(|m| m.sender_chat.as_ref())
    }

    /// Business connection the update belongs to, from whichever payload
    /// carries one.
    pub fn business_connection_id(&self) -> Option<&str> {
        if let Some(id) = self.message().and_then(|m| m.business_connection_id.as_deref()) {
            return Some(id);
        }
        match &self.payload {
            UpdatePayload::BusinessConnection(c) => Some(&c.id),
            UpdatePayload::DeletedBusinessMessages(d) => Some(&d.business_connection_id),
            _ => None,
        }
    }

    /// Message id for message-bearing updates; reaction updates carry one
    /// without carrying the message itself.
    pub fn message_id(&self) -> Option<i64> {
        match &self.payload {
            UpdatePayload::MessageReaction(r) => Some(r.message_id),
            UpdatePayload::MessageReactionCount(r) => Some(r.message_id),
            _ => self.message().map(|m| m.message_id),
        }
    }

    /// Chat id, falling back to the business connection's user chat.
    pub fn chat_id(&self) -> Option<i64> {
        self.chat().map(|c| c.id).or(match &self.payload {
            UpdatePayload::BusinessConnection(c) => Some(c.user_chat_id),
            _ => None,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub is_bot: bool,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_premium: Option<bool>,
}

/// The wire `type` discriminator of a chat object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatType {
    Private,
    Group,
    Supergroup,
    Channel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_forum: Option<bool>,
}

/// Where a forwarded message originally came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessageOrigin {
    User {
        date: i64,
        sender_user: User,
    },
    HiddenUser {
        date: i64,
        sender_user_name: String,
    },
    Chat {
        date: i64,
        sender_chat: Chat,
        #[serde(skip_serializing_if = "Option::is_none")]
        author_signature: Option<String>,
    },
    Channel {
        date: i64,
        chat: Chat,
        message_id: i64,
        #[serde(skip_serializing_if = "Option::is_none")]
        author_signature: Option<String>,
    },
}

impl MessageOrigin {
    pub fn date(&self) -> i64 {
        match self {
            MessageOrigin::User { date, .. }
            | MessageOrigin::HiddenUser { date, .. }
            | MessageOrigin::Chat { date, .. }
            | MessageOrigin::Channel { date, .. } => *date,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_thread_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_chat: Option<Chat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_boost_count: Option<i64>,
    pub date: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub business_connection_id: Option<String>,
    pub chat: Chat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forward_origin: Option<MessageOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_topic_message: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_automatic_forward: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_reply: Option<ExternalReplyInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quote: Option<TextQuote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author_signature: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub effect_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_preview_options: Option<LinkPreviewOptions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo: Option<Vec<PhotoSize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<Video>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sticker: Option<Sticker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation: Option<Animation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<Voice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dice: Option<Dice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_note: Option<VideoNote>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<Game>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll: Option<Poll>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub invoice: Option<Invoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub venue: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_chat_members: Option<Vec<User>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub left_chat_member: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_chat_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_chat_photo: Option<Vec<PhotoSize>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete_chat_photo: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group_chat_created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supergroup_chat_created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_chat_created: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_auto_delete_timer_changed: Option<MessageAutoDeleteTimerChanged>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrate_to_chat_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub migrate_from_chat_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pinned_message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users_shared: Option<UsersShared>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_access_allowed: Option<WriteAccessAllowed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum_topic_created: Option<ForumTopicCreated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum_topic_edited: Option<ForumTopicEdited>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum_topic_closed: Option<ForumTopicClosed>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub forum_topic_reopened: Option<ForumTopicReopened>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_chat_scheduled: Option<VideoChatScheduled>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_chat_started: Option<VideoChatStarted>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_chat_ended: Option<VideoChatEnded>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub giveaway: Option<Giveaway>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub successful_payment: Option<SuccessfulPayment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refunded_payment: Option<RefundedPayment>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkPreviewOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalReplyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<MessageOrigin>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextQuote {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoSize {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub file_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sticker {
    pub file_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Animation {
    pub file_id: String,
    pub width: i64,
    pub height: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Voice {
    pub file_id: String,
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Audio {
    pub file_id: String,
    pub duration: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dice {
    pub emoji: String,
    pub value: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoNote {
    pub file_id: String,
    pub length: i64,
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poll {
    pub id: String,
    pub question: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invoice {
    pub title: String,
    pub description: String,
    pub currency: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Venue {
    pub title: String,
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageAutoDeleteTimerChanged {
    pub message_auto_delete_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersShared {
    pub request_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteAccessAllowed {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_app_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_request: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTopicCreated {
    pub name: String,
    pub icon_color: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTopicEdited {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTopicClosed {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForumTopicReopened {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoChatScheduled {
    pub start_date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoChatStarted {}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoChatEnded {
    pub duration: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Giveaway {
    pub winners_selection_date: i64,
    pub winner_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessfulPayment {
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefundedPayment {
    pub currency: String,
    pub total_amount: i64,
    pub invoice_payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Box<Message>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InlineQuery {
    pub id: String,
    pub from: User,
    pub query: String,
    pub offset: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChosenInlineResult {
    pub result_id: String,
    pub from: User,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_message_id: Option<String>,
    pub query: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMemberUpdated {
    pub chat: Chat,
    pub from: User,
    pub date: i64,
    pub old_chat_member: ChatMemberState,
    pub new_chat_member: ChatMemberState,
}

/// A user's membership record inside a chat. The wire status stays a string
/// so unrecognized states degrade instead of failing deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMemberState {
    pub status: String,
    pub user: User,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatJoinRequest {
    pub chat: Chat,
    pub from: User,
    pub user_chat_id: i64,
    pub date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBoostSource {
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBoost {
    pub boost_id: String,
    pub add_date: i64,
    pub expiration_date: i64,
    pub source: ChatBoostSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBoostUpdated {
    pub chat: Chat,
    pub boost: ChatBoost,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatBoostRemoved {
    pub chat: Chat,
    pub boost_id: String,
    pub remove_date: i64,
    pub source: ChatBoostSource,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionType {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emoji: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_emoji_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReactionCount {
    #[serde(rename = "type")]
    pub kind: ReactionType,
    pub total_count: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReactionUpdated {
    pub chat: Chat,
    pub message_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_chat: Option<Chat>,
    pub date: i64,
    pub old_reaction: Vec<ReactionType>,
    pub new_reaction: Vec<ReactionType>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageReactionCountUpdated {
    pub chat: Chat,
    pub message_id: i64,
    pub date: i64,
    pub reactions: Vec<ReactionCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessConnection {
    pub id: String,
    pub user: User,
    pub user_chat_id: i64,
    pub date: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessMessagesDeleted {
    pub business_connection_id: String,
    pub chat: Chat,
    pub message_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollAnswer {
    pub poll_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voter_chat: Option<Chat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    pub option_ids: Vec<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingQuery {
    pub id: String,
    pub from: User,
    pub invoice_payload: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreCheckoutQuery {
    pub id: String,
    pub from: User,
    pub currency: String,
    pub total_amount: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaidMediaPurchased {
    pub from: User,
    pub paid_media_payload: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn deserializes_a_plain_text_message() {
        let update = parse(json!({
            "update_id": 10,
            "message": {
                "message_id": 1365,
                "from": {
                    "id": 42,
                    "is_bot": false,
                    "first_name": "Ada",
                    "language_code": "en"
                },
                "chat": {"id": 42, "type": "private", "first_name": "Ada"},
                "date": 1_700_000_000,
                "text": "hi"
            }
        }));

        assert_eq!(update.update_id, 10);
        assert_eq!(update.from().unwrap().id, 42);
        assert_eq!(update.chat().unwrap().id, 42);
        assert_eq!(update.message().unwrap().text.as_deref(), Some("hi"));
        assert_eq!(update.message_id(), Some(1365));
    }

    #[test]
    fn deserializes_a_callback_query_with_attached_message() {
        let update = parse(json!({
            "update_id": 11,
            "callback_query": {
                "id": "cbq-1",
                "from": {"id": 7, "is_bot": false, "first_name": "Bob"},
                "chat_instance": "ci",
                "data": "press",
                "message": {
                    "message_id": 99,
                    "chat": {"id": -100, "type": "supergroup", "title": "hq"},
                    "date": 1_700_000_100,
                    "text": "menu"
                }
            }
        }));

        assert_eq!(update.from().unwrap().id, 7);
        assert_eq!(update.chat().unwrap().id, -100);
        assert_eq!(update.message_id(), Some(99));
    }

    #[test]
    fn reaction_updates_expose_message_id_without_a_message() {
        let update = parse(json!({
            "update_id": 12,
            "message_reaction_count": {
                "chat": {"id": -1, "type": "channel", "title": "news"},
                "message_id": 5,
                "date": 1_700_000_200,
                "reactions": [
                    {"type": {"type": "emoji", "emoji": "👍"}, "total_count": 3}
                ]
            }
        }));

        assert!(update.message().is_none());
        assert_eq!(update.message_id(), Some(5));
        assert_eq!(update.chat().unwrap().id, -1);
    }

    #[test]
    fn forward_origin_variants_round_trip() {
        let origins = [
            json!({"type": "user", "date": 1, "sender_user": {"id": 9, "is_bot": false, "first_name": "Eve"}}),
            json!({"type": "hidden_user", "date": 2, "sender_user_name": "Anonymous"}),
            json!({"type": "chat", "date": 3, "sender_chat": {"id": -5, "type": "group", "title": "g"}}),
            json!({"type": "channel", "date": 4, "chat": {"id": -6, "type": "channel", "title": "c"}, "message_id": 77}),
        ];
        for raw in origins {
            let origin: MessageOrigin = serde_json::from_value(raw.clone()).unwrap();
            assert_eq!(serde_json::to_value(&origin).unwrap(), raw);
        }
    }

    #[test]
    fn unknown_wire_fields_are_ignored() {
        let update = parse(json!({
            "update_id": 13,
            "message": {
                "message_id": 1,
                "chat": {"id": 2, "type": "private", "first_name": "Ada", "active_usernames": ["ada"]},
                "date": 0,
                "text": "ok",
                "entities": [{"type": "bold", "offset": 0, "length": 2}]
            }
        }));
        assert_eq!(update.message().unwrap().text.as_deref(), Some("ok"));
    }

    #[test]
    fn business_connection_id_resolves_per_payload() {
        let deleted = parse(json!({
            "update_id": 14,
            "deleted_business_messages": {
                "business_connection_id": "biz-1",
                "chat": {"id": 3, "type": "private", "first_name": "Ada"},
                "message_ids": [1, 2, 3]
            }
        }));
        assert_eq!(deleted.business_connection_id(), Some("biz-1"));
        assert!(deleted.from().is_none());
        assert_eq!(deleted.chat_id(), Some(3));
    }
}
