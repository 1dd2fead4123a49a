//! WebSocket connection management.

pub mod authenticator;
pub mod handle;
pub mod heartbeat;
pub mod registry;
pub mod supervisor;
pub mod transport;

pub use authenticator::{WsAuthenticator, bearer_token};
pub use handle::{ConnectionHandle, ConnectionState, DeliveryError};
pub use registry::{PresenceTransition, SessionRegistry};
pub use supervisor::ConnectionSupervisor;
pub use transport::{ClientFrame, ServerFrame};
