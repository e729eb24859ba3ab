// Relay-scoped identifiers.
//
// The relay hands each accepted connection a compact integer id. Ids are
// never reused within one relay process, so a late message from a
// disconnected peer can't be mistaken for a newcomer's.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Relay-assigned connection id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RelayPlayerId(pub u32);

impl fmt::Display for RelayPlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "peer#{}", self.0)
    }
}
