//! Packet/frame pumps that drive the send/receive codec protocol.
//!
//! Both pumps are generic over the [`crate::codec`] traits so their state
//! machines can be exercised without a real container.

mod decode;
mod encode;

pub use decode::{DecodePump, best_effort_timestamp};
pub use encode::EncodePump;
