pub mod host;
pub mod port;
pub mod realm;
pub mod serde_helpers;

pub use host::ClusterHost;
pub use port::ApiPort;
pub use realm::AuthRealm;
