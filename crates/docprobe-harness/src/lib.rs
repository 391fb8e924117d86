//! Run-time harness: static site server, port negotiation and the
//! server/browser session shared by a verification run.

pub mod port;
pub mod server;
pub mod session;

pub use port::PortNegotiator;
pub use server::{ServerConfig, StaticServer};
pub use session::{Session, SessionConfig};
