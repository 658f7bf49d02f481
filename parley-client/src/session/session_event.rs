use crate::connection::{ConnectionId, LinkEvent};
use crate::error::CallError;
use crate::media::MediaStream;
use parley_core::{PeerId, SessionDescription};

/// Completions posted back into the session loop by its own background
/// tasks and by the connections it owns.
#[derive(Debug)]
pub(crate) enum SessionEvent {
    MediaAcquired(Result<MediaStream, CallError>),

    /// Offer created and applied as the local description.
    OfferCreated {
        peer_id: PeerId,
        conn_id: ConnectionId,
        result: Result<SessionDescription, CallError>,
    },

    /// Remote offer applied, answer created and applied locally.
    AnswerCreated {
        peer_id: PeerId,
        conn_id: ConnectionId,
        result: Result<SessionDescription, CallError>,
    },

    AcceptDecided { peer_id: PeerId, accepted: bool },

    Link {
        peer_id: PeerId,
        conn_id: ConnectionId,
        event: LinkEvent,
    },
}
