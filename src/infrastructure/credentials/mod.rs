pub mod identity_resolver;
pub mod proxy_resolver;
pub mod userinfo;

pub use identity_resolver::CredentialResolver;
pub use proxy_resolver::{ProxyAuth, ProxyResolver, ResolvedProxy};
pub use userinfo::userinfo;
