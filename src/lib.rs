//! Analytics pipeline for Telegram bots.
//!
//! Feed every inbound update through [`normalize`]; when it yields an
//! [`Entry`], hand it to the [`Dispatcher`], which buffers records and
//! delivers them in batches to a collection endpoint — eagerly once the
//! buffer reaches a threshold, and periodically on a timer. Failed batches
//! stay buffered and are retried on the next trigger.
//!
//! ```no_run
//! use botmetrics::{normalize, BotIdentity, Config, Dispatcher};
//!
//! # async fn example(update: botmetrics::Update) -> anyhow::Result<()> {
//! let bot = BotIdentity {
//!     id: 7,
//!     first_name: "StatBot".to_string(),
//!     last_name: None,
//!     username: "statbot".to_string(),
//! };
//! let dispatcher = Dispatcher::new(Config::new("https://collector.example/ingest"))?;
//!
//! // Inside the bot's update loop:
//! if let Some(entry) = normalize(&update, &bot) {
//!     dispatcher.submit(entry).await;
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatch;
pub mod entry;
pub mod normalizer;
pub mod taxonomy;
pub mod update;

pub use config::Config;
pub use dispatch::Dispatcher;
pub use entry::{BotIdentity, Entry};
pub use normalizer::normalize;
pub use taxonomy::{CounterpartKind, MembershipStatus, MessageKind, UpdateKind};
pub use update::Update;
