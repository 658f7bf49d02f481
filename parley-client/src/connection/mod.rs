mod link_event;
mod peer_link;
#[cfg(feature = "webrtc")]
mod webrtc_connector;

pub use link_event::*;
pub use peer_link::*;
#[cfg(feature = "webrtc")]
pub use webrtc_connector::*;
