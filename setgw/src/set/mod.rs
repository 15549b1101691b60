//! The set data type: codecs, the per-transaction [`handle::SetHandle`], multi-key
//! algebra and the command layer.

pub mod algebra;
pub mod command;
pub mod commands;
pub mod error;
pub mod gateway;
pub mod gc;
pub mod handle;
pub mod member;
pub mod meta;
pub mod operations;

pub use command::{SetCommand, SetReply};
pub use error::{SetError, SetResult};
