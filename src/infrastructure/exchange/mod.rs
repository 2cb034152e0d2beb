//! Feed session plumbing.

pub mod reconnecting;

pub use reconnecting::ReconnectingFeed;
