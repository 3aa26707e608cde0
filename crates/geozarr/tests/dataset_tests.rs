//! End-to-end dataset tests against a filesystem store.

use chrono::{TimeZone, Utc};
use futures::future::try_join_all;
use geozarr::{
    selector, GeoZarrDataset, GeoZarrError, GeoZarrFactory, IndexValue, OpenMode, Schema,
    ARRAY_DIMENSIONS,
};
use ndarray::{ArrayD, Axis, IxDyn};
use serde_json::Value;
use test_utils::{
    coordinate_sequence, create_time_plane, fixtures::schema, hourly_timestamps, init_tracing,
    temp_store, HOUR_NS,
};
use zarrs_filesystem::FilesystemStore;

const HEIGHT: usize = 3;
const WIDTH: usize = 5;
const STEPS: usize = 4;

fn swe_dataset(store: std::sync::Arc<FilesystemStore>) -> GeoZarrDataset<FilesystemStore> {
    init_tracing();
    let schema = Schema::from_json(schema::SWE_TIME_SERIES_JSON).unwrap();
    let dataset = GeoZarrFactory::default().create(store, &schema).unwrap();
    dataset.set_index("/swe/time", &hourly_timestamps(0, STEPS)).unwrap();
    dataset
}

fn plane(step: usize) -> ArrayD<f32> {
    ArrayD::from_shape_vec(IxDyn(&[HEIGHT, WIDTH]), create_time_plane(WIDTH, HEIGHT, step)).unwrap()
}

#[test]
fn test_coordinate_generation_from_grid() {
    let temp = temp_store();
    let dataset = swe_dataset(temp.store.clone());

    let x = dataset.read_array::<f64>("/swe/x").unwrap();
    assert_eq!(x.as_slice().unwrap(), coordinate_sequence(100.0, 10.0, WIDTH).as_slice());
    assert_eq!(x.as_slice().unwrap(), &[100.0, 110.0, 120.0, 130.0, 140.0]);

    let y = dataset.read_array::<f64>("/swe/y").unwrap();
    assert_eq!(y.as_slice().unwrap(), &[200.0, 210.0, 220.0]);

    let time = dataset.read_array::<i64>("/swe/time").unwrap();
    assert_eq!(time.as_slice().unwrap(), &[0, HOUR_NS, 2 * HOUR_NS, 3 * HOUR_NS]);
}

#[test]
fn test_linkage_round_trip() {
    let temp = temp_store();
    swe_dataset(temp.store.clone());

    let reader = GeoZarrFactory::default().open(temp.store.clone(), "r").unwrap();
    assert_eq!(reader.mode(), OpenMode::Read);

    let linkage = reader.linkage("/swe/SWE").unwrap();
    assert_eq!(linkage.shape, vec![4, 3, 5]);

    let paths: Vec<_> = linkage.coordinates.iter().map(|c| c.path.as_str()).collect();
    assert_eq!(paths, vec!["/swe/time", "/swe/y", "/swe/x"]);
    assert_eq!(
        linkage.coordinates[2].standard_name.as_deref(),
        Some("projection_x_coordinate")
    );
    assert_eq!(linkage.coordinates[1].units.as_deref(), Some("m"));

    let grid_mapping = linkage.grid_mapping.expect("data array references crs_grid");
    assert_eq!(grid_mapping.path, "/swe/crs_grid");
    let attrs = &grid_mapping.attributes;
    assert_eq!(attrs["grid_mapping_name"], Value::from("transverse_mercator"));
    assert_eq!(attrs["false_easting"], Value::from(500000.0));
    assert_eq!(attrs["false_northing"], Value::from(0.0));
    assert_eq!(attrs["scale_factor_at_central_meridian"], Value::from(0.9996));
    assert_eq!(attrs["longitude_of_central_meridian"], Value::from(-75.0));
    assert_eq!(attrs["latitude_of_projection_origin"], Value::from(0.0));
    assert_eq!(attrs["projection_x_coordinate"], Value::from(100.0));
    assert_eq!(attrs["projection_y_coordinate"], Value::from(200.0));

    // Each coordinate array lists only itself.
    let x_attrs = reader.attributes("/swe/x").unwrap();
    assert_eq!(x_attrs[ARRAY_DIMENSIONS], serde_json::json!(["/swe/x"]));

    // User attributes survive next to the linkage keys.
    let data_attrs = reader.attributes("/swe/SWE").unwrap();
    assert_eq!(data_attrs["units"], Value::from("mm"));
    assert_eq!(data_attrs["grid_mapping"], Value::from("/swe/crs_grid"));

    let root = reader.root_attributes().unwrap();
    assert_eq!(root["title"], Value::from("Snow water equivalent"));
}

#[tokio::test]
async fn test_sparse_insert_touches_one_plane() {
    let temp = temp_store();
    let dataset = swe_dataset(temp.store.clone());

    dataset
        .insert("/swe/SWE", plane(2), vec![selector("/swe/time", 2 * HOUR_NS)])
        .await
        .unwrap();

    let values = dataset.read_array::<f32>("/swe/SWE").unwrap();
    for step in 0..STEPS {
        let written = values.index_axis(Axis(0), step);
        if step == 2 {
            let expected = create_time_plane(WIDTH, HEIGHT, 2);
            assert!(written.iter().copied().eq(expected.into_iter()));
        } else {
            assert!(written.iter().all(|v| v.is_nan()), "plane {step} was modified");
        }
    }
}

#[tokio::test]
async fn test_concurrent_inserts_per_time_slice() {
    let temp = temp_store();
    let dataset = swe_dataset(temp.store.clone());
    let times = hourly_timestamps(0, STEPS);

    // Insert out of order; each write targets its own time slice.
    let inserts = (0..STEPS).rev().map(|step| {
        dataset.insert("/swe/SWE", plane(step), vec![selector("/swe/time", times[step])])
    });
    try_join_all(inserts).await.unwrap();

    let values = dataset.read_array::<f32>("/swe/SWE").unwrap();
    for step in 0..STEPS {
        let expected = create_time_plane(WIDTH, HEIGHT, step);
        assert!(values.index_axis(Axis(0), step).iter().copied().eq(expected.into_iter()));
    }
}

#[tokio::test]
async fn test_insert_selects_row_by_timestamp_and_coordinate() {
    let temp = temp_store();
    let dataset = swe_dataset(temp.store.clone());

    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let times: Vec<_> = (0..STEPS as i64).map(|h| start + chrono::Duration::hours(h)).collect();
    dataset.set_time_index("/swe/time", &times).unwrap();

    let row = ArrayD::from_shape_vec(IxDyn(&[WIDTH]), vec![1.0f32, 2.0, 3.0, 4.0, 5.0]).unwrap();
    dataset
        .insert(
            "/swe/SWE",
            row,
            vec![selector("/swe/y", 210.0), selector("/swe/time", times[1])],
        )
        .await
        .unwrap();

    let values = dataset.read_array::<f32>("/swe/SWE").unwrap();
    let written: Vec<f32> = values.index_axis(Axis(0), 1).index_axis(Axis(0), 1).iter().copied().collect();
    assert_eq!(written, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
    assert!(values.index_axis(Axis(0), 1).index_axis(Axis(0), 0).iter().all(|v| v.is_nan()));
}

#[tokio::test]
async fn test_insert_errors() {
    let temp = temp_store();
    let dataset = swe_dataset(temp.store.clone());

    let err = dataset
        .insert("/swe/SWE", plane(0), vec![selector("/swe/time", 42i64)])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        GeoZarrError::IndexNotFound { ref array, ref dimension, ref value, .. }
            if array == "/swe/SWE" && dimension == "/swe/time" && value == "42"
    ));
    assert_eq!(
        err.to_string(),
        "insert on '/swe/SWE': value 42 not found in coordinate array '/swe/time'"
    );

    let err = dataset
        .insert("/swe/SWE", plane(0), vec![selector("/other/time", 0i64)])
        .await
        .unwrap_err();
    assert!(matches!(err, GeoZarrError::UnknownDimension { .. }));
    assert!(err.to_string().starts_with("insert on '/swe/SWE'"));
    assert!(err.to_string().contains("/other/time"));

    // A full (time, y, x) block where a (y, x) plane is implied.
    let block = ArrayD::<f32>::zeros(IxDyn(&[1, HEIGHT, WIDTH]));
    let err = dataset
        .insert("/swe/SWE", block, vec![selector("/swe/time", 0i64)])
        .await
        .unwrap_err();
    assert!(matches!(err, GeoZarrError::ShapeMismatch { .. }));
    assert!(err.to_string().contains("/swe/SWE"));
}

#[test]
fn test_read_mode_rejects_mutation() {
    let temp = temp_store();
    swe_dataset(temp.store.clone());

    let reader = GeoZarrDataset::new(temp.store.clone(), OpenMode::Read);
    let schema = Schema::from_json(schema::SWE_TIME_SERIES_JSON).unwrap();
    let err = reader.build(&schema).unwrap_err();
    assert_eq!(err.to_string(), "cannot build a dataset opened in mode 'r'");

    let err = reader.set_index("/swe/time", &hourly_timestamps(0, STEPS)).unwrap_err();
    assert!(matches!(err, GeoZarrError::Mode { .. }));
}

#[test]
fn test_set_index_rejects_wrong_length() {
    let temp = temp_store();
    let dataset = swe_dataset(temp.store.clone());

    let err = dataset.set_index("/swe/time", &hourly_timestamps(0, STEPS + 1)).unwrap_err();
    assert_eq!(
        err.to_string(),
        "set index on '/swe/time': expected shape [4], got [5]"
    );
}

#[test]
fn test_yaml_schema_builds_same_layout() {
    let from_yaml = Schema::from_yaml(schema::SWE_TIME_SERIES_YAML).unwrap();
    let from_json = Schema::from_json(schema::SWE_TIME_SERIES_JSON).unwrap();
    assert_eq!(from_yaml, from_json);

    let temp = temp_store();
    let dataset = GeoZarrFactory::default().create(temp.store.clone(), &from_yaml).unwrap();
    assert_eq!(
        dataset.dimensions("/swe/SWE").unwrap(),
        vec!["/swe/time", "/swe/y", "/swe/x"]
    );
}

#[test]
fn test_invalid_crs_is_reported_before_writes() {
    let temp = temp_store();
    let mut schema = Schema::from_json(schema::SWE_TIME_SERIES_JSON).unwrap();
    if let Some(grid) = schema.grid.as_mut() {
        grid.crs = Some("EPSG:99999".to_string());
    }

    let dataset = GeoZarrDataset::new(temp.store.clone(), OpenMode::Create);
    let err = dataset.build(&schema).unwrap_err();
    assert!(matches!(
        err,
        GeoZarrError::InvalidCrs { ref operation, .. } if operation == "build"
    ));
    assert!(err.to_string().starts_with("build of 'grid'"));
    assert!(err.to_string().contains("EPSG:99999"));
    assert!(dataset.dimensions("/swe/SWE").is_err());

    // Nothing was written, so the corrected schema can still be assigned.
    let schema = Schema::from_json(schema::SWE_TIME_SERIES_JSON).unwrap();
    dataset.build(&schema).unwrap();
    assert_eq!(dataset.dimensions("/swe/SWE").unwrap().len(), 3);
}

#[test]
fn test_failed_write_keeps_schema_assigned() {
    let temp = temp_store();
    // A plain file where the data array's directory belongs.
    std::fs::create_dir_all(temp.dir.path().join("swe")).unwrap();
    std::fs::write(temp.dir.path().join("swe").join("SWE"), b"occupied").unwrap();

    let schema = Schema::from_json(schema::SWE_TIME_SERIES_JSON).unwrap();
    let dataset = GeoZarrDataset::new(temp.store.clone(), OpenMode::Create);
    let err = dataset.build(&schema).unwrap_err();
    assert!(matches!(err, GeoZarrError::Storage(_) | GeoZarrError::Zarr(_)));

    // Coordinate arrays were already written before the failure.
    assert!(dataset.dimensions("/swe/time").is_ok());

    let err = dataset.build(&schema).unwrap_err();
    assert!(matches!(err, GeoZarrError::InvalidSchema(ref msg) if msg.contains("already assigned")));
}

#[test]
fn test_set_index_requires_coordinate_array() {
    let temp = temp_store();
    let dataset = swe_dataset(temp.store.clone());

    let err = dataset.set_index("/swe/SWE", &vec![0.0f32; STEPS * HEIGHT * WIDTH]).unwrap_err();
    assert!(matches!(
        err,
        GeoZarrError::UnknownDimension { ref array, ref operation, .. }
            if array == "/swe/SWE" && operation == "set index"
    ));

    let err = dataset.set_index::<u8>("/swe/crs_grid", &[]).unwrap_err();
    assert!(matches!(err, GeoZarrError::UnknownDimension { .. }));
}

#[test]
fn test_schema_without_variables() {
    let temp = temp_store();
    let schema = Schema::from_json(r#"{"global_attributes": {"title": "empty"}}"#).unwrap();
    let dataset = GeoZarrFactory::default().create(temp.store.clone(), &schema).unwrap();
    assert_eq!(dataset.root_attributes().unwrap()["title"], Value::from("empty"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_inserts_share_one_chunk() {
    init_tracing();
    const PLANES: usize = 16;
    const SIDE: usize = 64;

    for round in 0..5 {
        let temp = temp_store();
        let schema = Schema::from_json(schema::UNCHUNKED_CUBE_JSON).unwrap();
        let dataset = GeoZarrFactory::default().create(temp.store.clone(), &schema).unwrap();
        let times: Vec<i64> = (0..PLANES as i64).collect();
        dataset.set_index("/cube/time", &times).unwrap();

        let inserts = (0..PLANES).map(|t| {
            let data = ArrayD::from_elem(IxDyn(&[SIDE, SIDE]), (t + 1) as f32);
            dataset.insert("/cube/value", data, vec![selector("/cube/time", t as i64)])
        });
        try_join_all(inserts).await.unwrap();

        let values = dataset.read_array::<f32>("/cube/value").unwrap();
        for t in 0..PLANES {
            let expected = (t + 1) as f32;
            assert!(
                values.index_axis(Axis(0), t).iter().all(|&v| v == expected),
                "round {round}: plane {t} lost its insert"
            );
        }
    }
}

#[tokio::test]
async fn test_gridless_variables() {
    let temp = temp_store();
    let schema = Schema::from_json(schema::GRIDLESS_JSON).unwrap();
    let dataset = GeoZarrFactory::default().create(temp.store.clone(), &schema).unwrap();

    // No grid: no mapping reference, empty record, placeholder coordinates.
    let linkage = dataset.linkage("/bands/reflectance").unwrap();
    assert_eq!(linkage.grid_mapping, None);
    assert!(dataset.attributes("/bands/crs_grid").unwrap().is_empty());
    let x = dataset.read_array::<f64>("/bands/x").unwrap();
    assert!(x.iter().all(|v| v.is_nan()));
    assert_eq!(
        dataset.attributes("/bands/reflectance").unwrap()["scale_factor"],
        Value::from(0.0001)
    );

    dataset.set_index("/stations/station", &[101i32, 102, 103]).unwrap();
    let row = ArrayD::from_shape_vec(IxDyn(&[2]), vec![1.5f64, 2.5]).unwrap();
    dataset
        .insert("/stations/temperature", row, vec![selector("/stations/station", 103i32)])
        .await
        .unwrap();

    // Integral floats match integer coordinates.
    let row = ArrayD::from_shape_vec(IxDyn(&[2]), vec![-1.0f64, -2.0]).unwrap();
    dataset
        .insert(
            "/stations/temperature",
            row,
            vec![("/stations/station".to_string(), IndexValue::Float(101.0))],
        )
        .await
        .unwrap();

    let values = dataset.read_array::<f64>("/stations/temperature").unwrap();
    assert_eq!(values.index_axis(Axis(0), 0).iter().copied().collect::<Vec<f64>>(), vec![-1.0, -2.0]);
    assert!(values.index_axis(Axis(0), 1).iter().all(|v| v.is_nan()));
    assert_eq!(values.index_axis(Axis(0), 2).iter().copied().collect::<Vec<f64>>(), vec![1.5, 2.5]);
}
