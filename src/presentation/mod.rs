//! Presentation layer
//!
//! コマンドラインからタスクを実行するエントリポイント。
pub mod cli;
