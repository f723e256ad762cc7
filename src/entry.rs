use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::taxonomy::{CounterpartKind, MembershipStatus, MessageKind, UpdateKind};

/// The bot's own identity, supplied by the embedding runtime.
#[derive(Debug, Clone)]
pub struct BotIdentity {
    pub id: i64,
    pub first_name: String,
    pub last_name: Option<String>,
    pub username: String,
}

/// One normalized analytics record.
///
/// Every field is always present on the wire; when the source update lacks an
/// attribute the field carries its typed empty default (`""`, `0`, `false`,
/// or the epoch timestamp).
#[derive(Debug, Clone, Serialize)]
pub struct Entry {
    // generic
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub to: i64,
    pub from: i64,

    // sender
    pub from_bot: bool,
    pub from_firstname: String,
    pub from_lastname: String,
    pub from_username: String,
    pub from_languagecode: String,
    pub from_premium: bool,
    pub from_type: CounterpartKind,
    pub from_title: String,
    pub from_businessconnection: String,
    pub from_boostcount: i64,
    pub from_signature: String,

    // receiver
    pub to_bot: bool,
    pub to_firstname: String,
    pub to_lastname: String,
    pub to_username: String,

    // chat
    pub chat_id: i64,
    pub chat_username: String,
    pub chat_title: String,
    pub chat_firstname: String,
    pub chat_lastname: String,
    pub chat_type: CounterpartKind,

    // message
    pub message_type: MessageKind,
    pub message_id: i64,
    pub message_threadid: i64,
    pub message_date: String,
    pub message_topic: bool,
    pub message_automaticforward: bool,
    pub message_effectid: String,
    pub message_replytomessageid: i64,
    pub message_quotetext: String,

    // forward provenance
    pub forward_date: String,
    pub forward_from: i64,
    pub forward_messageid: i64,
    pub forward_signature: String,
    pub forward_bot: bool,
    pub forward_name: String,

    // text or media caption
    pub message_text: String,

    // link preview-only message
    pub message_url: String,

    // dice
    pub dice_emoji: String,
    pub dice_value: i64,

    // callback query
    pub callbackquery_id: String,
    pub callbackquery_inlinemessageid: String,
    pub callbackquery_data: String,

    // inline query
    pub inlinequery_id: String,
    pub inlinequery_text: String,
    pub inlinequery_offset: String,

    // chosen inline result
    pub inlineresultchosen_id: String,
    pub inlineresultchosen_query: String,
    pub inlineresultchosen_inlinemessageid: String,

    // membership change
    pub chatmember_id: i64,
    pub chatmember_bot: bool,
    pub chatmember_firstname: String,
    pub chatmember_lastname: String,
    pub chatmember_username: String,
    pub chatmember_premium: bool,
    pub chatmember_oldstatus: MembershipStatus,
    pub chatmember_newstatus: MembershipStatus,

    // verbatim copy of the source update
    pub payload: String,
}

impl Entry {
    /// Wire names of every record field, in schema order. Used to validate
    /// report filtering configuration.
    pub const FIELD_NAMES: &'static [&'static str] = &[
        "timestamp",
        "type",
        "to",
        "from",
        "from_bot",
        "from_firstname",
        "from_lastname",
        "from_username",
        "from_languagecode",
        "from_premium",
        "from_type",
        "from_title",
        "from_businessconnection",
        "from_boostcount",
        "from_signature",
        "to_bot",
        "to_firstname",
        "to_lastname",
        "to_username",
        "chat_id",
        "chat_username",
        "chat_title",
        "chat_firstname",
        "chat_lastname",
        "chat_type",
        "message_type",
        "message_id",
        "message_threadid",
        "message_date",
        "message_topic",
        "message_automaticforward",
        "message_effectid",
        "message_replytomessageid",
        "message_quotetext",
        "forward_date",
        "forward_from",
        "forward_messageid",
        "forward_signature",
        "forward_bot",
        "forward_name",
        "message_text",
        "message_url",
        "dice_emoji",
        "dice_value",
        "callbackquery_id",
        "callbackquery_inlinemessageid",
        "callbackquery_data",
        "inlinequery_id",
        "inlinequery_text",
        "inlinequery_offset",
        "inlineresultchosen_id",
        "inlineresultchosen_query",
        "inlineresultchosen_inlinemessageid",
        "chatmember_id",
        "chatmember_bot",
        "chatmember_firstname",
        "chatmember_lastname",
        "chatmember_username",
        "chatmember_premium",
        "chatmember_oldstatus",
        "chatmember_newstatus",
        "payload",
    ];
}

/// ISO-8601 UTC with millisecond precision and a `Z` suffix.
pub(crate) fn iso_timestamp(datetime: DateTime<Utc>) -> String {
    datetime.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// Unix seconds to the wire timestamp format; out-of-range values collapse to
/// the epoch.
pub(crate) fn iso_from_unix(secs: i64) -> String {
    iso_timestamp(DateTime::from_timestamp(secs, 0).unwrap_or(DateTime::UNIX_EPOCH))
}

/// The typed empty default for timestamp fields.
pub(crate) fn epoch_timestamp() -> String {
    iso_timestamp(DateTime::UNIX_EPOCH)
}
