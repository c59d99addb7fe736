/// SCM (Source Control Management) drivers
///
/// Git and Subversion behind one trait, selected by the repository kind.
pub mod git_scm;
pub mod remote;
pub mod scm_factory;
pub mod scm_interface;
pub mod svn_scm;

pub use git_scm::GitScm;
pub use remote::Remote;
pub use scm_factory::ScmFactory;
pub use scm_interface::Scm;
pub use svn_scm::SvnScm;
