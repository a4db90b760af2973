pub mod bridge;
pub mod codec;

pub use bridge::{PushBridge, PushDelivery, PushEvent, PushStats, PUSH_ACCEPT};
pub use codec::{JsonRequestCodec, TYPE_FIELD};
