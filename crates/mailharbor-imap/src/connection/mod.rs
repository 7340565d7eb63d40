//! Connection management: transport streams, framing, the type-state
//! client, and IDLE.

mod config;
mod framed;
mod idle;
mod stream;

pub mod client;

pub use client::{
    Authenticated, Client, ClientGreeting, CommandOutcome, NotAuthenticated, SelectOptions,
    Selected, StoreResult,
};
pub use config::{Config, ConfigBuilder, Security};
pub use framed::{FramedStream, ResponseAccumulator};
pub use idle::{IdleEvent, IdleHandle};
pub use stream::{ImapStream, connect, tls_connector};
