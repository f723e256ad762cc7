//! Turns one inbound update into one flat analytics record.
//!
//! Classification happens in two gates: an update whose payload kind is
//! outside the taxonomy produces nothing, and so does an update whose sender
//! cannot be classified or identified. Everything past the gates degrades to
//! typed empty defaults instead of failing.

use chrono::Utc;
use tracing::trace;

use crate::entry::{epoch_timestamp, iso_from_unix, iso_timestamp, BotIdentity, Entry};
use crate::taxonomy::{CounterpartKind, MembershipStatus, MessageKind, UpdateKind};
use crate::update::{Chat, ChatMemberState, ChatType, Message, MessageOrigin, Update, UpdatePayload};

/// Normalize an update into an [`Entry`], or `None` when the update is not
/// analytics-worthy. Pure apart from the `timestamp` field.
pub fn normalize(update: &Update, bot: &BotIdentity) -> Option<Entry> {
    let kind = classify_update(&update.payload);
    if kind == UpdateKind::Unknown {
        trace!(update_id = update.update_id, "skipping unclassified update");
        return None;
    }

    let user = update.from();
    let sender_chat = update.sender_chat();
    let chat = update.chat();
    let msg = update.message();

    // Gate 1: the sender must classify. An explicit user short-circuits;
    // otherwise the sender chat (or the chat itself) must be a known shape.
    let from_type = if user.is_some() {
        CounterpartKind::User
    } else {
        sender_chat
            .or(chat)
            .map(classify_counterpart)
            .unwrap_or(CounterpartKind::Unknown)
    };
    if from_type == CounterpartKind::Unknown {
        trace!(update_id = update.update_id, "skipping update with unclassifiable sender");
        return None;
    }

    // Gate 2: the sender must be identifiable.
    let from = user
        .map(|u| u.id)
        .or_else(|| sender_chat.map(|c| c.id))
        .or_else(|| chat.map(|c| c.id))?;

    let chat_type = chat.map(classify_counterpart).unwrap_or(CounterpartKind::Unknown);
    let message_type = msg.map(classify_message).unwrap_or(MessageKind::Unsupported);
    let forward_origin = msg.and_then(|m| m.forward_origin.as_ref());

    let callback = match &update.payload {
        UpdatePayload::CallbackQuery(q) => Some(q),
        _ => None,
    };
    let inline_query = match &update.payload {
        UpdatePayload::InlineQuery(q) => Some(q),
        _ => None,
    };
    let chosen_result = match &update.payload {
        UpdatePayload::ChosenInlineResult(r) => Some(r),
        _ => None,
    };
    let member_change = match &update.payload {
        UpdatePayload::ChatMember(u) => Some(u),
        _ => None,
    };
    let member_user = member_change.map(|u| &u.new_chat_member.user);

    Some(Entry {
        timestamp: iso_timestamp(Utc::now()),
        kind,
        to: bot.id,
        from,

        from_bot: user.map(|u| u.is_bot).unwrap_or(false),
        from_firstname: user.map(|u| u.first_name.clone()).unwrap_or_default(),
        from_lastname: user.and_then(|u| u.last_name.clone()).unwrap_or_default(),
        from_username: user
            .and_then(|u| u.username.clone())
            .or_else(|| sender_chat.and_then(|c| c.username.clone()))
            .unwrap_or_default(),
        from_languagecode: user.and_then(|u| u.language_code.clone()).unwrap_or_default(),
        from_premium: user.and_then(|u| u.is_premium).unwrap_or(false),
        from_type,
        from_title: sender_chat.and_then(|c| c.title.clone()).unwrap_or_default(),
        from_businessconnection: update.business_connection_id().unwrap_or("").to_string(),
        from_boostcount: msg.and_then(|m| m.sender_boost_count).unwrap_or(0),
        from_signature: msg.and_then(|m| m.author_signature.clone()).unwrap_or_default(),

        to_bot: true,
        to_firstname: bot.first_name.clone(),
        to_lastname: bot.last_name.clone().unwrap_or_default(),
        to_username: bot.username.clone(),

        chat_id: update.chat_id().unwrap_or(0),
        chat_username: chat.and_then(|c| c.username.clone()).unwrap_or_default(),
        chat_title: chat.and_then(|c| c.title.clone()).unwrap_or_default(),
        chat_firstname: chat.and_then(|c| c.first_name.clone()).unwrap_or_default(),
        chat_lastname: chat.and_then(|c| c.last_name.clone()).unwrap_or_default(),
        chat_type,

        message_type,
        message_id: update.message_id().unwrap_or(0),
        message_threadid: msg.and_then(|m| m.message_thread_id).unwrap_or(0),
        message_date: msg.map(|m| iso_from_unix(m.date)).unwrap_or_else(epoch_timestamp),
        message_topic: msg.and_then(|m| m.is_topic_message).unwrap_or(false),
        message_automaticforward: msg.and_then(|m| m.is_automatic_forward).unwrap_or(false),
        message_effectid: msg.and_then(|m| m.effect_id.clone()).unwrap_or_default(),
        message_replytomessageid: msg
            .and_then(|m| m.external_reply.as_ref())
            .and_then(|r| r.message_id)
            .unwrap_or(0),
        message_quotetext: msg
            .and_then(|m| m.quote.as_ref())
            .map(|q| q.text.clone())
            .unwrap_or_default(),

        forward_date: forward_origin
            .map(|o| iso_from_unix(o.date()))
            .unwrap_or_else(epoch_timestamp),
        forward_from: forward_origin.map(forward_sender_id).unwrap_or(0),
        forward_messageid: forward_origin
            .map(|o| match o {
                MessageOrigin::Channel { message_id, .. } => *message_id,
                _ => 0,
            })
            .unwrap_or(0),
        forward_signature: forward_origin
            .and_then(|o| match o {
                MessageOrigin::Chat { author_signature, .. }
                | MessageOrigin::Channel { author_signature, .. } => author_signature.clone(),
                _ => None,
            })
            .unwrap_or_default(),
        forward_bot: forward_origin
            .map(|o| matches!(o, MessageOrigin::User { sender_user, .. } if sender_user.is_bot))
            .unwrap_or(false),
        forward_name: forward_origin.map(forward_display_name).unwrap_or_default(),

        message_text: msg
            .and_then(|m| m.text.clone().or_else(|| m.caption.clone()))
            .unwrap_or_default(),
        message_url: msg
            .and_then(|m| m.link_preview_options.as_ref())
            .and_then(|o| o.url.clone())
            .unwrap_or_default(),

        dice_emoji: msg
            .and_then(|m| m.dice.as_ref())
            .map(|d| d.emoji.clone())
            .unwrap_or_default(),
        dice_value: msg.and_then(|m| m.dice.as_ref()).map(|d| d.value).unwrap_or(0),

        callbackquery_id: callback.map(|q| q.id.clone()).unwrap_or_default(),
        callbackquery_inlinemessageid: callback
            .and_then(|q| q.inline_message_id.clone())
            .unwrap_or_default(),
        callbackquery_data: callback.and_then(|q| q.data.clone()).unwrap_or_default(),

        inlinequery_id: inline_query.map(|q| q.id.clone()).unwrap_or_default(),
        inlinequery_text: inline_query.map(|q| q.query.clone()).unwrap_or_default(),
        inlinequery_offset: inline_query.map(|q| q.offset.clone()).unwrap_or_default(),

        inlineresultchosen_id: chosen_result.map(|r| r.result_id.clone()).unwrap_or_default(),
        inlineresultchosen_query: chosen_result.map(|r| r.query.clone()).unwrap_or_default(),
        inlineresultchosen_inlinemessageid: chosen_result
            .and_then(|r| r.inline_message_id.clone())
            .unwrap_or_default(),

        chatmember_id: member_user.map(|u| u.id).unwrap_or(0),
        chatmember_bot: member_user.map(|u| u.is_bot).unwrap_or(false),
        chatmember_firstname: member_user.map(|u| u.first_name.clone()).unwrap_or_default(),
        chatmember_lastname: member_user.and_then(|u| u.last_name.clone()).unwrap_or_default(),
        chatmember_username: member_user.and_then(|u| u.username.clone()).unwrap_or_default(),
        chatmember_premium: member_user.and_then(|u| u.is_premium).unwrap_or(false),
        chatmember_oldstatus: membership_status(member_change.map(|u| &u.old_chat_member)),
        chatmember_newstatus: membership_status(member_change.map(|u| &u.new_chat_member)),

        payload: serde_json::to_string(update).unwrap_or_default(),
    })
}

fn classify_update(payload: &UpdatePayload) -> UpdateKind {
    match payload {
        UpdatePayload::Message(_)
        | UpdatePayload::ChannelPost(_)
        | UpdatePayload::BusinessMessage(_) => UpdateKind::Message,
        UpdatePayload::EditedMessage(_)
        | UpdatePayload::EditedChannelPost(_)
        | UpdatePayload::EditedBusinessMessage(_) => UpdateKind::MessageEdited,
        UpdatePayload::DeletedBusinessMessages(_) => UpdateKind::MessagesDeleted,
        UpdatePayload::CallbackQuery(_) => UpdateKind::CallbackQuery,
        UpdatePayload::ChatBoost(_) => UpdateKind::ChatBoost,
        UpdatePayload::RemovedChatBoost(_) => UpdateKind::ChatBoostRemoved,
        UpdatePayload::InlineQuery(_) => UpdateKind::InlineQuery,
        UpdatePayload::ChosenInlineResult(_) => UpdateKind::InlineResultChosen,
        UpdatePayload::ChatJoinRequest(_) => UpdateKind::JoinRequest,
        UpdatePayload::ChatMember(_) => UpdateKind::ChatMember,
        UpdatePayload::MyChatMember(_) => UpdateKind::ChatMemberSelf,
        UpdatePayload::MessageReactionCount(_) => UpdateKind::MessageReactionCount,
        UpdatePayload::MessageReaction(_) => UpdateKind::MessageReactions,
        UpdatePayload::BusinessConnection(_)
        | UpdatePayload::ShippingQuery(_)
        | UpdatePayload::PreCheckoutQuery(_)
        | UpdatePayload::PurchasedPaidMedia(_)
        | UpdatePayload::Poll(_)
        | UpdatePayload::PollAnswer(_) => UpdateKind::Unknown,
    }
}

/// Shared classifier for any chat-like counterpart. Used for both the
/// sender-side and the chat-side kind fields.
fn classify_counterpart(chat: &Chat) -> CounterpartKind {
    if chat.is_forum.unwrap_or(false) {
        return CounterpartKind::Forum;
    }
    match chat.kind {
        ChatType::Supergroup => CounterpartKind::Supergroup,
        ChatType::Channel => CounterpartKind::Channel,
        ChatType::Group => CounterpartKind::Group,
        ChatType::Private => CounterpartKind::Unknown,
    }
}

/// Content ladder, first populated field wins. Text before link, photo
/// before document, structural kinds last.
fn classify_message(msg: &Message) -> MessageKind {
    if msg.text.as_deref().is_some_and(|t| !t.is_empty()) {
        MessageKind::Text
    } else if msg
        .link_preview_options
        .as_ref()
        .and_then(|o| o.url.as_deref())
        .is_some_and(|u| !u.is_empty())
    {
        MessageKind::Link
    } else if msg.photo.is_some() {
        MessageKind::Photo
    } else if msg.document.is_some() {
        MessageKind::Document
    } else if msg.video.is_some() {
        MessageKind::Video
    } else if msg.sticker.is_some() {
        MessageKind::Sticker
    } else if msg.animation.is_some() {
        MessageKind::Animation
    } else if msg.voice.is_some() {
        MessageKind::Voice
    } else if msg.audio.is_some() {
        MessageKind::Audio
    } else if msg.dice.is_some() {
        MessageKind::Dice
    } else if msg.video_note.is_some() {
        MessageKind::VideoNote
    } else if msg.contact.is_some() {
        MessageKind::Contact
    } else if msg.game.is_some() {
        MessageKind::Game
    } else if msg.poll.is_some() {
        MessageKind::Poll
    } else if msg.invoice.is_some() {
        MessageKind::Invoice
    } else if msg.venue.is_some() {
        MessageKind::Venue
    } else if msg.location.is_some() {
        MessageKind::Location
    } else if msg.new_chat_members.is_some() {
        MessageKind::NewChatMembers
    } else if msg.left_chat_member.is_some() {
        MessageKind::LeftChatMember
    } else if msg.new_chat_title.is_some() {
        MessageKind::NewChatTitle
    } else if msg.new_chat_photo.is_some() {
        MessageKind::NewChatPhoto
    } else if msg.delete_chat_photo.is_some() {
        MessageKind::DeletedChatPhoto
    } else if msg.group_chat_created.is_some() {
        MessageKind::GroupCreated
    } else if msg.supergroup_chat_created.is_some() {
        MessageKind::SupergroupCreated
    } else if msg.channel_chat_created.is_some() {
        MessageKind::ChannelCreated
    } else if msg.message_auto_delete_timer_changed.is_some() {
        MessageKind::AutoDeleteTimerChanged
    } else if msg.migrate_to_chat_id.is_some() {
        MessageKind::ChatMigratedTo
    } else if msg.migrate_from_chat_id.is_some() {
        MessageKind::ChatMigratedFrom
    } else if msg.pinned_message.is_some() {
        MessageKind::PinnedMessage
    } else if msg.users_shared.is_some() {
        MessageKind::UserShared
    } else if msg.write_access_allowed.is_some() {
        MessageKind::WriteAccessAllowed
    } else if msg.forum_topic_created.is_some() {
        MessageKind::ForumTopicCreated
    } else if msg.forum_topic_edited.is_some() {
        MessageKind::ForumTopicEdited
    } else if msg.forum_topic_closed.is_some() {
        MessageKind::ForumTopicClosed
    } else if msg.forum_topic_reopened.is_some() {
        MessageKind::ForumTopicReopened
    } else if msg.video_chat_scheduled.is_some() {
        MessageKind::VideoChatScheduled
    } else if msg.video_chat_started.is_some() {
        MessageKind::VideoChatStarted
    } else if msg.video_chat_ended.is_some() {
        MessageKind::VideoChatEnded
    } else if msg.giveaway.is_some() {
        MessageKind::Giveaway
    } else if msg.successful_payment.is_some() {
        MessageKind::SuccessfulPayment
    } else if msg.refunded_payment.is_some() {
        MessageKind::RefundedPayment
    } else {
        MessageKind::Unsupported
    }
}

fn forward_sender_id(origin: &MessageOrigin) -> i64 {
    match origin {
        MessageOrigin::User { sender_user, .. } => sender_user.id,
        MessageOrigin::Channel { chat, .. } => chat.id,
        MessageOrigin::Chat { sender_chat, .. } => sender_chat.id,
        // A hidden sender contributes a display name only.
        MessageOrigin::HiddenUser { .. } => 0,
    }
}

fn forward_display_name(origin: &MessageOrigin) -> String {
    match origin {
        MessageOrigin::User { sender_user, .. } => {
            let mut name = sender_user.first_name.clone();
            if let Some(last) = sender_user.last_name.as_deref() {
                if !last.is_empty() {
                    name.push(' ');
                    name.push_str(last);
                }
            }
            name.trim().to_string()
        }
        MessageOrigin::Channel { chat, .. } => chat.title.clone().unwrap_or_default(),
        MessageOrigin::Chat { sender_chat, .. } => sender_chat.title.clone().unwrap_or_default(),
        MessageOrigin::HiddenUser { sender_user_name, .. } => sender_user_name.clone(),
    }
}

fn membership_status(member: Option<&ChatMemberState>) -> MembershipStatus {
    match member.map(|m| m.status.as_str()) {
        Some("creator") => MembershipStatus::Creator,
        Some("administrator") => MembershipStatus::Administrator,
        Some("member") => MembershipStatus::Member,
        Some("restricted") => MembershipStatus::Restricted,
        Some("left") => MembershipStatus::Left,
        Some("kicked") => MembershipStatus::Banned,
        _ => MembershipStatus::Unknown,
    }
}
