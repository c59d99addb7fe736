pub mod agent;

pub use agent::{SshAgent, DISPLAY, SSH_ASKPASS, SSH_AUTH_SOCK};
