pub mod portal_client;

pub use portal_client::PortalClient;
