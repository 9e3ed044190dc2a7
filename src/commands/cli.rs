//! Command-line definition and its mapping onto a run configuration

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command as ClapCommand};
use log::debug;

use crate::config::{Location, RunConfig};
use crate::errors::ZonalResult;
use crate::zonal::{AggregationParams, NullPolicy, Reducer};

/// Builds the argument parser
pub fn build_cli() -> ClapCommand {
    ClapCommand::new("zonalkit")
        .version(env!("CARGO_PKG_VERSION"))
        .author("Maurice Schilpp")
        .about("Zonal statistics around points for a GeoTIFF image collection, exported as CSV")
        .arg(
            Arg::new("config")
                .long("config")
                .help("TOML run configuration")
                .value_name("FILE")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("collection")
                .long("collection")
                .help("Directory of GeoTIFF images")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("start-year")
                .long("start-year")
                .help("First year of the date filter")
                .value_name("YEAR")
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("end-year")
                .long("end-year")
                .help("Last year of the date filter")
                .value_name("YEAR")
                .value_parser(value_parser!(i32)),
        )
        .arg(
            Arg::new("point")
                .long("point")
                .help("Point as ID=LON,LAT (repeatable); replaces configured points")
                .value_name("ID=LON,LAT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("id-field")
                .long("id-field")
                .help("Attribute name of the point ids")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("radius")
                .long("radius")
                .help("Buffer radius in meters")
                .value_name("METERS")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("bounds")
                .long("bounds")
                .help("Use the bounding box of each buffer disc")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("reducer")
                .long("reducer")
                .help("mean, median, min, max, sum, count, stdDev or variance")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("scale")
                .long("scale")
                .help("Sampling resolution in meters")
                .value_name("METERS")
                .value_parser(value_parser!(f64)),
        )
        .arg(
            Arg::new("crs")
                .long("crs")
                .help("Sampling CRS (e.g. EPSG:5243)")
                .value_name("EPSG:CODE"),
        )
        .arg(list_arg("bands", "Bands to reduce"))
        .arg(list_arg("bands-rename", "Output names of the bands"))
        .arg(list_arg("img-props", "Image properties to copy"))
        .arg(list_arg("img-props-rename", "Output names of the image properties"))
        .arg(
            Arg::new("datetime-name")
                .long("datetime-name")
                .help("Name of the formatted date column")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("datetime-format")
                .long("datetime-format")
                .help("Joda-style date pattern (e.g. YYYY-MM-dd)")
                .value_name("PATTERN"),
        )
        .arg(
            Arg::new("null-policy")
                .long("null-policy")
                .help("Drop records whose band values are all null (all) or any null (any)")
                .value_name("all|any"),
        )
        .arg(
            Arg::new("output-root")
                .long("output-root")
                .help("Storage root directory")
                .value_name("DIR")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("folder")
                .long("folder")
                .help("Output folder below the storage root")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .help("Output table name prefix")
                .value_name("NAME"),
        )
        .arg(
            Arg::new("inspect")
                .long("inspect")
                .help("List the collection instead of extracting")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Log file")
                .value_name("FILE")
                .default_value("zonalkit.log")
                .value_parser(value_parser!(PathBuf)),
        )
}

fn list_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .long(name)
        .help(help)
        .value_name("A,B,...")
}

fn list_value(args: &ArgMatches, name: &str) -> Option<Vec<String>> {
    args.get_one::<String>(name).map(|v| {
        v.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}

/// Run configuration from `--config` (or defaults) with the options applied on top
pub fn run_config_from_args(args: &ArgMatches) -> ZonalResult<RunConfig> {
    let mut config = match args.get_one::<PathBuf>("config") {
        Some(path) => RunConfig::from_file(path)?,
        None => RunConfig::default(),
    };

    if let Some(dir) = args.get_one::<PathBuf>("collection") {
        config.collection.path = Some(dir.clone());
    }
    if let Some(&year) = args.get_one::<i32>("start-year") {
        config.collection.start_year = year;
    }
    if let Some(&year) = args.get_one::<i32>("end-year") {
        config.collection.end_year = year;
    }

    if let Some(points) = args.get_many::<String>("point") {
        config.points.locations = points
            .map(|p| p.parse::<Location>())
            .collect::<ZonalResult<Vec<_>>>()?;
    }
    if let Some(field) = args.get_one::<String>("id-field") {
        config.points.id_field = field.clone();
    }

    if let Some(&radius) = args.get_one::<f64>("radius") {
        config.buffer.radius = radius;
    }
    if args.get_flag("bounds") {
        config.buffer.bounds = true;
    }

    let overrides = AggregationParams {
        reducer: args.get_one::<String>("reducer").map(|r| r.parse::<Reducer>()).transpose()?,
        scale: args.get_one::<f64>("scale").copied(),
        crs: args.get_one::<String>("crs").cloned(),
        bands: list_value(args, "bands"),
        bands_rename: list_value(args, "bands-rename"),
        img_props: list_value(args, "img-props"),
        img_props_rename: list_value(args, "img-props-rename"),
        datetime_name: args.get_one::<String>("datetime-name").cloned(),
        datetime_format: args.get_one::<String>("datetime-format").cloned(),
        null_policy: args.get_one::<String>("null-policy").map(|p| p.parse::<NullPolicy>()).transpose()?,
    };
    config.params = config.params.overridden_by(&overrides);

    if let Some(root) = args.get_one::<PathBuf>("output-root") {
        config.export.root = root.clone();
    }
    if let Some(folder) = args.get_one::<String>("folder") {
        config.export.folder = folder.clone();
    }
    if let Some(prefix) = args.get_one::<String>("prefix") {
        config.export.prefix = prefix.clone();
    }

    debug!("Run configuration: {:?}", config);
    Ok(config)
}
