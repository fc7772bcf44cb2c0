mod types;
pub use types::RemoteZone;

pub mod cloudflare;
