use std::path::PathBuf;
use std::process;

use log::{error, LevelFilter};

use zonalkit::commands::{build_cli, CommandFactory, ZonalkitCommandFactory};
use zonalkit::utils::logger::Logger;

fn main() {
    let matches = build_cli().get_matches();

    let log_file = matches
        .get_one::<PathBuf>("log-file")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("zonalkit.log"));
    let level = if matches.get_flag("verbose") { LevelFilter::Debug } else { LevelFilter::Info };

    let logger = match Logger::new(&log_file) {
        Ok(l) => l.with_level(level),
        Err(e) => {
            eprintln!("Error initializing logger: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = logger.init_global_logger() {
        eprintln!("Error setting up global logger: {}", e);
        process::exit(1);
    }

    let factory = ZonalkitCommandFactory::new();

    let command_result = factory.create_command(&matches);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
