mod callbacks;
mod config;
mod connection;
mod error;
mod media;
mod occupants;
mod registry;
mod session;
mod signaling;

pub use callbacks::*;
pub use config::*;
pub use connection::*;
pub use error::*;
pub use media::*;
pub use occupants::*;
pub use registry::*;
pub use session::*;
pub use signaling::*;
