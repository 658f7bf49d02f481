pub use parley_core::model::PeerId;

pub mod model {
    pub use parley_core::model::*;
}

#[cfg(feature = "client")]
pub mod client {
    pub use parley_client::*;
}
