//! End-to-end extraction over a directory of GeoTIFFs

mod common;

use std::path::Path;

use common::FixtureRaster;
use zonalkit::{RunConfig, ZonalError, ZonalKit};

const BANDS: [&str; 8] = [
    "GMT_0000_PAR", "GMT_0300_PAR", "GMT_0600_PAR", "GMT_0900_PAR",
    "GMT_1200_PAR", "GMT_1500_PAR", "GMT_1800_PAR", "GMT_2100_PAR",
];

/// Three daily images over central Germany, 0.05 degree pixels
fn write_collection(dir: &Path) {
    common::init_logging();
    let origin = (9.8, 53.5);

    let mut first = FixtureRaster::filled(94, 110, origin, 0.05, &BANDS, |b, _, _| b as f32 * 10.0 + 0.5);
    first.items.push(("system:time_start".to_string(), "1136073600000".to_string()));
    first.write(&dir.join("par_first.tif"));

    // Everything south of 52N is nodata
    let mut second = FixtureRaster::filled(94, 110, origin, 0.05, &BANDS, |b, _, row| {
        if row >= 30 { -9999.0 } else { b as f32 * 10.0 + 1.25 }
    });
    second.datetime = Some("2006:01:02 00:00:00".to_string());
    second.nodata = Some("-9999".to_string());
    second.items.push(("PRODUCT".to_string(), "MCD18C2".to_string()));
    second.tile = None;
    second.write(&dir.join("par_second.tif"));

    let late = FixtureRaster::filled(94, 110, origin, 0.05, &BANDS, |_, _, _| 99.0);
    late.write(&dir.join("MCD18C2_20230301.tif"));
}

fn par_config(collection: &Path, output: &Path) -> RunConfig {
    let text = format!(r#"
[collection]
path = '{}'
start_year = 2006
end_year = 2022

[points]
locations = [
    {{ id = "SCH", lon = 13.75, lat = 52.96 }},
    {{ id = "HAI", lon = 10.37, lat = 51.25 }},
    {{ id = "ALB", lon = 9.41, lat = 48.43 }},
]

[buffer]
radius = 10000

[params]
reducer = "median"
scale = 1000
crs = "EPSG:5243"
bands = ["GMT_0000_PAR", "GMT_0300_PAR", "GMT_0600_PAR", "GMT_0900_PAR",
         "GMT_1200_PAR", "GMT_1500_PAR", "GMT_1800_PAR", "GMT_2100_PAR"]
bandsRename = ["PAR_00", "PAR_03", "PAR_06", "PAR_09", "PAR_12", "PAR_15", "PAR_18", "PAR_21"]
datetimeName = "date"
datetimeFormat = "YYYY-MM-dd"

[export]
root = '{}'
folder = "GEE"
prefix = "PAR"
"#, collection.display(), output.display());
    RunConfig::from_toml_str(&text).unwrap()
}

#[test]
fn par_extraction_writes_one_row_per_point_and_image() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_collection(data.path());

    let receipt = ZonalKit::new(par_config(data.path(), out.path())).run().unwrap();
    assert_eq!(receipt.path, out.path().join("GEE").join("PAR_2006_2022.csv"));
    assert_eq!(receipt.rows, 3);

    let csv = std::fs::read_to_string(&receipt.path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(
        lines[0],
        "plot_id,PAR_00,PAR_03,PAR_06,PAR_09,PAR_12,PAR_15,PAR_18,PAR_21,date,timestamp"
    );
    // ALB lies west of the images; HAI is masked on the second day
    assert_eq!(lines[1], "SCH,0.5,10.5,20.5,30.5,40.5,50.5,60.5,70.5,2006-01-01,1136073600000");
    assert_eq!(lines[2], "HAI,0.5,10.5,20.5,30.5,40.5,50.5,60.5,70.5,2006-01-01,1136073600000");
    assert_eq!(lines[3], "SCH,1.25,11.25,21.25,31.25,41.25,51.25,61.25,71.25,2006-01-02,1136160000000");
    assert_eq!(lines.len(), 4);
}

#[test]
fn image_properties_are_copied_and_renamed() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_collection(data.path());

    let mut config = par_config(data.path(), out.path());
    config.params.bands = Some(vec!["GMT_1200_PAR".to_string()]);
    config.params.bands_rename = Some(vec!["PAR_12".to_string()]);
    config.params.img_props = Some(vec!["PRODUCT".to_string()]);
    config.params.img_props_rename = Some(vec!["product".to_string()]);
    config.params.reducer = Some("max".parse().unwrap());

    let receipt = ZonalKit::new(config).run().unwrap();
    let csv = std::fs::read_to_string(&receipt.path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "plot_id,PAR_12,product,date,timestamp");
    assert_eq!(lines[1], "SCH,40.5,,2006-01-01,1136073600000");
    assert_eq!(lines[3], "SCH,41.25,MCD18C2,2006-01-02,1136160000000");
}

#[test]
fn unknown_band_stops_the_run() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_collection(data.path());

    let mut config = par_config(data.path(), out.path());
    config.params.bands = Some(vec!["GMT_2400_PAR".to_string()]);
    config.params.bands_rename = Some(vec!["PAR_24".to_string()]);

    match ZonalKit::new(config).run() {
        Err(ZonalError::UnknownBand { band, .. }) => assert_eq!(band, "GMT_2400_PAR"),
        other => panic!("expected UnknownBand, got {:?}", other.map(|r| r.rows)),
    }
    assert!(!out.path().join("GEE").join("PAR_2006_2022.csv").exists());
}

#[test]
fn inspect_lists_the_filtered_images() {
    let data = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_collection(data.path());

    let report = ZonalKit::new(par_config(data.path(), out.path())).inspect().unwrap();
    assert!(report.contains("2 images from 2006 to 2022"));
    assert!(report.contains("par_first"));
    assert!(report.contains("par_second"));
    assert!(!report.contains("MCD18C2_20230301"));
}
