//! Keeping two participants' sessions identical through one ordered
//! action stream.
//!
//! - [`relay`]: the wire types and the transport seam.
//! - [`driver`]: the per-participant driver that applies actions
//!   deterministically, locally or on relay echo.
//! - [`loopback`]: an in-memory relay for tests.

pub mod driver;
pub mod loopback;
pub mod relay;

pub use driver::{GameDriver, Snapshot};
pub use loopback::{LoopbackLink, LoopbackRelay};
pub use relay::{
    ClientCommand, NullRelay, ParticipantId, RelayError, RelayEvent, RelayLink, RoleMap, Room,
    RoomCode,
};
