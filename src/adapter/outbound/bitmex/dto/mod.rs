//! BitMEX data transfer objects.
//!
//! Contains the realtime WebSocket frame types: the subscription request and
//! the frame decoder that turns text into a [`Decoded`](crate::port::Decoded).

pub mod message;
