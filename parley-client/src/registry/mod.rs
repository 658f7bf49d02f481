mod candidate_queue;
mod connect_status;
mod peer_entry;
mod peer_registry;

pub use candidate_queue::*;
pub use connect_status::*;
pub use peer_entry::*;
pub use peer_registry::*;
