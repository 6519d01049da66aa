//! Zone construction.
//!
//! The forward builder runs first and populates the PTR index as a side
//! effect; the reverse builders consume the completed index afterwards.

pub use self::ptr::PtrIndex;
pub use self::record::{Record, RecordType};
pub use self::registry::ZoneRegistry;
pub use self::zone::{Zone, ZoneSettings};

pub mod forward;
pub mod ptr;
pub mod record;
pub mod registry;
pub mod reverse;
pub mod zone;
