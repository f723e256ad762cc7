use serde::Serialize;

/// Classification code for an inbound update.
///
/// Discriminants are part of the wire contract with the collection endpoint
/// and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum UpdateKind {
    Unknown = 0,

    // messages
    Message = 1,
    MessageEdited = 2,
    MessagesDeleted = 3,
    CallbackQuery = 4,

    // boosts
    ChatBoost = 5,
    ChatBoostRemoved = 6,

    // inline
    InlineQuery = 7,
    InlineResultChosen = 8,

    // chat members
    JoinRequest = 9,
    ChatMember = 10,
    ChatMemberSelf = 11,

    // reactions
    MessageReactionCount = 12,
    MessageReactions = 13,
}

/// Kind of the chat or user an update is from or about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum CounterpartKind {
    Unknown = 0,
    User = 1,
    Channel = 2,
    Group = 3,
    Supergroup = 4,
    Forum = 5,
}

/// Content classification for a message, one per record.
///
/// `Unsupported` is the residual default for content the schema does not
/// single out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum MessageKind {
    Unsupported = 0,
    Text = 1,
    Link = 2,
    Photo = 3,
    Document = 4,
    Video = 5,
    Sticker = 6,
    Animation = 7,
    Voice = 8,
    Audio = 9,
    Dice = 10,
    VideoNote = 11,
    Contact = 12,
    Game = 13,
    Poll = 14,
    Invoice = 15,
    Venue = 16,
    Location = 17,
    NewChatMembers = 18,
    LeftChatMember = 19,
    NewChatTitle = 20,
    NewChatPhoto = 21,
    DeletedChatPhoto = 22,
    GroupCreated = 23,
    SupergroupCreated = 24,
    ChannelCreated = 25,
    AutoDeleteTimerChanged = 26,
    ChatMigratedTo = 27,
    ChatMigratedFrom = 28,
    PinnedMessage = 29,
    UserShared = 30,
    WriteAccessAllowed = 31,
    ForumTopicCreated = 32,
    ForumTopicEdited = 33,
    ForumTopicClosed = 34,
    ForumTopicReopened = 35,
    VideoChatScheduled = 36,
    VideoChatStarted = 37,
    VideoChatEnded = 38,
    Giveaway = 39,
    SuccessfulPayment = 40,
    RefundedPayment = 41,
}

/// Membership state of a user within a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum MembershipStatus {
    Unknown = 0,
    Creator = 1,
    Administrator = 2,
    Member = 3,
    Restricted = 4,
    Left = 5,
    Banned = 6,
}

impl From<UpdateKind> for u8 {
    fn from(kind: UpdateKind) -> u8 {
        kind as u8
    }
}

impl From<CounterpartKind> for u8 {
    fn from(kind: CounterpartKind) -> u8 {
        kind as u8
    }
}

impl From<MessageKind> for u8 {
    fn from(kind: MessageKind) -> u8 {
        kind as u8
    }
}

impl From<MembershipStatus> for u8 {
    fn from(status: MembershipStatus) -> u8 {
        status as u8
    }
}
