//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI
//! args and the loaded configuration.

pub mod check;
pub mod classify;
pub mod config;
pub mod filter;
pub mod rules;
pub mod search;

pub use self::check::execute as check;
pub use self::classify::execute as classify;
pub use self::config::execute as config;
pub use self::filter::execute as filter;
pub use self::rules::execute as rules;
pub use self::search::execute as search;

use crate::cli::MessageArgs;
use crate::message::{MessageInfo, load_messages};
use crate::MailmatchError;

type Result<T> = std::result::Result<T, MailmatchError>;

fn load(args: &MessageArgs) -> Result<Vec<MessageInfo>> {
    Ok(load_messages(args.path(), args.message_format())?)
}
