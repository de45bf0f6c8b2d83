//! Configuration module

mod site;

pub use site::FallbackMode;
pub use site::LabelsConfig;
pub use site::PrismicConfig;
pub use site::SiteConfig;
pub use site::ACCESS_TOKEN_ENV;
