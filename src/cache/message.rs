use tokio::sync::oneshot;

use crate::cache::token::TokenEntry;

/// Requests accepted by the token store loop. Every request carries the
/// channel its caller waits on, so callers resume only after the loop has
/// processed that specific message.
#[derive(Debug)]
pub enum StoreCommand {
    Update {
        entry: TokenEntry,
        reply: oneshot::Sender<()>,
    },
    Delete {
        name: String,
        reply: oneshot::Sender<()>,
    },
    Get {
        name: String,
        reply: oneshot::Sender<Option<String>>,
    },
    Len {
        reply: oneshot::Sender<usize>,
    },
    Shutdown {
        ack: oneshot::Sender<()>,
    },
}
