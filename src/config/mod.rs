//! Configuration module

mod site;

pub use site::ContentConfig;
pub use site::Fallback;
pub use site::RevalidateConfig;
pub use site::ServerConfig;
pub use site::SiteConfig;
pub use site::{ENV_ACCESS_TOKEN, ENV_API_ENDPOINT};
