//! Session-bound query controller.
//!
//! Owns the whole client-side state for one upload → ask → reset lifecycle:
//! session handle, prompt, last result, data summary, error slot, and the
//! busy/drag/tooltip flags. State changes only through the operations on
//! [`QuerySession`]; there are no ambient globals, and every asynchronous
//! outcome is applied through a generation check so a stale response landing
//! after a reset is discarded instead of resurrecting dead state.

mod policy;
mod rewrite;
mod session;
mod store;

pub use policy::{error_policy, ErrorPolicy, Operation};
pub use rewrite::{mentions_ordering, prepare_prompt, SAMPLE_PROMPTS, SUMMARY_PROMPT};
pub use session::{
    is_excel_filename, QuerySession, ERR_BAD_EXTENSION, ERR_CONNECT, ERR_EMPTY_PROMPT,
    ERR_NO_SESSION,
};
pub use store::StoredSession;
