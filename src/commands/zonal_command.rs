//! Zonal extraction command

use clap::ArgMatches;
use log::info;

use crate::api::ZonalKit;
use crate::commands::cli::run_config_from_args;
use crate::commands::command_traits::Command;
use crate::config::RunConfig;
use crate::errors::ZonalResult;

/// Runs buffering, aggregation and export
pub struct ZonalCommand {
    config: RunConfig,
}

impl ZonalCommand {
    pub fn new(args: &ArgMatches) -> ZonalResult<Self> {
        let config = run_config_from_args(args)?;
        config.validate()?;
        info!("Extracting {} points from {:?}, {} to {}",
              config.points.locations.len(),
              config.collection.path,
              config.collection.start_year,
              config.collection.end_year);
        Ok(ZonalCommand { config })
    }
}

impl Command for ZonalCommand {
    fn execute(&self) -> ZonalResult<()> {
        let receipt = ZonalKit::new(self.config.clone())
            .with_progress(true)
            .run()?;
        println!("{}", receipt);
        Ok(())
    }
}
