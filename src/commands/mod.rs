//! CLI command implementations
//!
//! Commands supported by the CLI application, using the Command pattern.

pub mod cli;
pub mod command_traits;
pub mod inspect_command;
pub mod zonal_command;

pub use cli::{build_cli, run_config_from_args};
pub use command_traits::{Command, CommandFactory};
pub use inspect_command::InspectCommand;
pub use zonal_command::ZonalCommand;

use clap::ArgMatches;

use crate::errors::ZonalResult;

/// Factory for creating command instances based on CLI arguments
pub struct ZonalkitCommandFactory;

impl ZonalkitCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        ZonalkitCommandFactory
    }
}

impl Default for ZonalkitCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandFactory for ZonalkitCommandFactory {
    fn create_command(&self, args: &ArgMatches) -> ZonalResult<Box<dyn Command>> {
        if args.get_flag("inspect") {
            Ok(Box::new(InspectCommand::new(args)?))
        } else {
            Ok(Box::new(ZonalCommand::new(args)?))
        }
    }
}
