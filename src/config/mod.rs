//! Configuration module

mod site;

pub use site::AdminConfig;
pub use site::CategoryConfig;
pub use site::ChatConfig;
pub use site::ChatRuleConfig;
pub use site::SiteConfig;
