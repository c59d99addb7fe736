pub mod command_executor;
pub mod scripted;

pub use command_executor::{
    Command, CommandExecutor, CommandOutput, CommandRunner, Options, RunMode, SystemRunner,
};
pub use scripted::{Reply, ScriptedRunner};
