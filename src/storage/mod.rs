pub mod archiver;
pub mod atomic;
pub mod conversation;
pub mod path_utils;
pub mod prompt_profile;

pub use archiver::{ArchivedResponse, ResponseArchiver};
pub use conversation::{ConversationStore, Exchange};
pub use prompt_profile::{PromptProfile, PromptProfileStore};
