pub mod proxy_kind;
pub mod remote_url;
pub mod scm_type;

pub use proxy_kind::ProxyKind;
pub use remote_url::{RemoteForm, RemoteUrl};
pub use scm_type::ScmType;
