mod client;
mod error;

pub use client::{Attempt, AttemptState, DocumentClient, WRITE_VERBS, WriteReceipt};
pub use error::DocError;
