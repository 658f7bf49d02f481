mod error_code;
mod peer;
mod room;
mod signaling;

pub use error_code::ErrorCode;
pub use peer::PeerId;
pub use room::{ClientListDelta, OccupantInfo, OccupantList, Presence, RoomStatus, RoomUpdate};
pub use signaling::{
    Envelope, IceCandidate, IceConfig, IceServerConfig, SdpType, SessionDescription,
    SignalMessage, TokenData,
};
