//! Collection listing command

use clap::ArgMatches;

use crate::api::ZonalKit;
use crate::commands::cli::run_config_from_args;
use crate::commands::command_traits::Command;
use crate::config::RunConfig;
use crate::errors::ZonalResult;

/// Prints every image of the filtered collection
pub struct InspectCommand {
    config: RunConfig,
}

impl InspectCommand {
    pub fn new(args: &ArgMatches) -> ZonalResult<Self> {
        let config = run_config_from_args(args)?;
        config.collection_path()?;
        Ok(InspectCommand { config })
    }
}

impl Command for InspectCommand {
    fn execute(&self) -> ZonalResult<()> {
        let report = ZonalKit::new(self.config.clone()).inspect()?;
        println!("{}", report);
        Ok(())
    }
}
