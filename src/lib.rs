//! Library side of _teemake_, an interactive wizard that downloads, compiles
//! and configures a Teeworlds game server (or one of its derivatives) from
//! source.
//!
//! The binary drives [`wizard::run`] over the process's standard streams.
//! Everything that touches the system goes through seams that tests can fake:
//! commands through [`proc::Exec`], preflight checks through
//! [`wizard::Preflight`] and user interaction through [`tty::Terminal`].

pub mod args;
pub mod catalog;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod options;
pub mod pipeline;
pub mod proc;
pub mod server_config;
pub mod system;
pub mod text;
pub mod tty;
pub mod util;
pub mod wizard;
