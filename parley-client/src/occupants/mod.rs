mod occupant_reconciler;

pub use occupant_reconciler::*;
