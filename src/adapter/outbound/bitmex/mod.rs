//! BitMEX realtime feed integration.

pub mod dto;
pub mod settings;
pub mod stream;

pub use settings::BitmexConfig;
pub use stream::BitmexFeedStream;
