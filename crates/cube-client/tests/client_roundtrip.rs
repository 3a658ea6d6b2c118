//! Integration test: store cubes through the clients and load them back.

use std::sync::Arc;

use cube_client::{CatalogClient, ClientConfig, ClientError, CubeClient};
use cube_codec::{
    ArrayData, CodecError, Cube, CubeData, DataType, RemoteArrayHandle, Selector, StoreLocation, Unit,
};
use doc_store::{DocumentId, FixedConnector, Filter, MemoryDocumentStore, Namespace};
use test_utils::{
    air_temperature_cube, assert_approx_eq, init_tracing, masked_cube, ramp_array, rotated_pole_cube,
};

fn shared_clients(lazy_data: bool) -> (CubeClient, CubeClient) {
    let store = Arc::new(MemoryDocumentStore::new());
    let connector = Arc::new(FixedConnector::new(store.clone()));
    let eager = CubeClient::new(store.clone(), connector.clone(), ClientConfig::default()).unwrap();
    let config = ClientConfig {
        lazy_data,
        ..ClientConfig::default()
    };
    let lazy = CubeClient::new(store, connector, config).unwrap();
    (eager, lazy)
}

#[tokio::test]
async fn test_insert_and_find() -> anyhow::Result<()> {
    init_tracing();
    let (client, _) = shared_clients(false);
    let cube = air_temperature_cube();

    let id = client.insert_one(&cube).await?;
    let found = client.find_one(Some(&id)).await?.expect("cube was stored");
    assert_eq!(found, cube);

    let first = client.find_one(None).await?.expect("store is not empty");
    assert_eq!(first, cube);

    assert!(client
        .find_one(Some(&DocumentId::from("missing")))
        .await?
        .is_none());
    Ok(())
}

#[tokio::test]
async fn test_lazy_client_defers_data() -> anyhow::Result<()> {
    init_tracing();
    let (eager, lazy) = shared_clients(true);
    let cube = masked_cube(&[3, 4]);
    let id = eager.insert_one(&cube).await?;

    let mut loaded = lazy.find_one(Some(&id)).await?.expect("cube was stored");
    assert!(loaded.has_deferred_data());
    assert_eq!(loaded.shape(), cube.shape());

    let selector = Selector::all().slice(Some(1), None, 1).index(-1);
    let expected = cube.data().index(lazy.connector(), &selector).await?;
    let actual = loaded.data().index(lazy.connector(), &selector).await?;
    assert_eq!(actual, expected);

    lazy.realise(&mut loaded).await?;
    assert_eq!(loaded, cube);
    Ok(())
}

#[tokio::test]
async fn test_lazy_selection_reads_expected_elements() -> anyhow::Result<()> {
    let (eager, lazy) = shared_clients(true);
    let cube = Cube::new(ArrayData::from(ramp_array(&[2, 3, 4])), Unit::new("1")?)
        .with_long_name("ramp");
    let id = eager.insert_one(&cube).await?;

    let loaded = lazy.find_one(Some(&id)).await?.expect("cube was stored");
    assert!(loaded.has_deferred_data());

    let selector = Selector::all().index(1).slice(None, None, 2).index(-1);
    let selected = loaded.data().index(lazy.connector(), &selector).await?;
    let values: Vec<f64> = selected.values().to_f64().iter().copied().collect();
    assert_eq!(values, vec![15.0, 23.0]);
    Ok(())
}

#[tokio::test]
async fn test_insert_many_reports_failures() -> anyhow::Result<()> {
    init_tracing();
    let (client, _) = shared_clients(false);
    let location = StoreLocation::new("memory:///", Namespace::new("other", "cubes")?);
    let handle = RemoteArrayHandle::new(vec![2], DataType::Float32, location, DocumentId::from("x"));
    let deferred = Cube::new(handle, Unit::new("K")?).with_long_name("not_realised");

    let cubes = vec![air_temperature_cube(), deferred, rotated_pole_cube(3, 4)];
    let report = client.insert_many(&cubes).await;

    assert_eq!(report.inserted.len(), 2);
    assert!(!report.is_complete());
    let failure = &report.failed[0];
    assert_eq!(failure.index, 1);
    assert_eq!(failure.name, "not_realised");
    assert!(matches!(
        failure.error,
        ClientError::Codec(CodecError::TypeMismatch { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_query_by_field() -> anyhow::Result<()> {
    let (client, _) = shared_clients(false);
    client.insert_one(&air_temperature_cube()).await?;
    client.insert_one(&rotated_pole_cube(2, 2)).await?;
    client.insert_one(&masked_cube(&[2])).await?;

    let winds = client
        .query(&Filter::all().eq("standard_name", "x_wind"))
        .await?;
    assert_eq!(winds.len(), 1);
    assert_eq!(winds[0].name(), "x_wind");

    let latitude = client
        .query_one(&Filter::all().eq("dim_coords.latitude.npoints", 2))
        .await?
        .expect("air temperature has a latitude");
    assert_eq!(latitude.name(), "air_temperature");
    let lat = latitude.coord("latitude").expect("latitude coordinate");
    assert_approx_eq!(lat.min().unwrap_or(f64::NAN), -1.0, 1e-12);

    assert!(client
        .query_one(&Filter::all().eq("standard_name", "snowfall_amount"))
        .await?
        .is_none());
    assert_eq!(client.query(&Filter::all()).await?.len(), 3);
    Ok(())
}

#[tokio::test]
async fn test_catalog_client() -> anyhow::Result<()> {
    let store = Arc::new(MemoryDocumentStore::new());
    let config = ClientConfig {
        collection: "catalog".to_string(),
        ..ClientConfig::default()
    };
    let catalog = CatalogClient::new(store.clone(), &config)?;
    let cubes = vec![air_temperature_cube(), rotated_pole_cube(2, 3)];

    let ids = catalog.insert_dataset(&cubes, "/data/ukv/run_001.pp").await?;
    assert_eq!(ids.len(), 2);
    // Same metadata, same records.
    catalog.insert_dataset(&cubes, "/data/ukv/run_001.pp").await?;
    assert_eq!(store.len(&config.namespace()?).await, 2);

    // Identical cubes from another run get their own records.
    catalog.insert_dataset(&cubes, "/data/ukv/run_002.pp").await?;
    assert_eq!(store.len(&config.namespace()?).await, 4);

    let refs = catalog.query(&Filter::all().eq("mime_type", "pp")).await?;
    assert_eq!(
        refs,
        vec![
            "/data/ukv/run_001.pp",
            "/data/ukv/run_001.pp",
            "/data/ukv/run_002.pp",
            "/data/ukv/run_002.pp",
        ]
    );
    let second = catalog
        .query(&Filter::all().eq("dataset_ref", "/data/ukv/run_002.pp"))
        .await?;
    assert_eq!(second.len(), 2);

    let one = catalog
        .query_one(&Filter::all().eq("standard_name", "x_wind"))
        .await?;
    assert_eq!(one.as_deref(), Some("/data/ukv/run_001.pp"));
    assert_eq!(
        catalog.find_one(Some(&ids[0])).await?.as_deref(),
        Some("/data/ukv/run_001.pp")
    );
    Ok(())
}

#[tokio::test]
async fn test_file_store_round_trip() -> anyhow::Result<()> {
    init_tracing();
    let dir = tempfile::tempdir()?;
    let config = ClientConfig {
        store_url: format!("file://{}", dir.path().display()),
        lazy_data: true,
        ..ClientConfig::default()
    };
    let client = CubeClient::connect(config).await?;
    let cube = rotated_pole_cube(3, 5);
    let id = client.insert_one(&cube).await?;

    let loaded = client.find_one(Some(&id)).await?.expect("cube was stored");
    match loaded.data() {
        CubeData::Deferred(handle) => assert_eq!(handle.id(), &id),
        CubeData::Realised(_) => panic!("expected deferred data"),
    }
    let row = loaded
        .data()
        .index(client.connector(), &Selector::all().index(2))
        .await?;
    assert_eq!(row.shape(), &[5]);
    assert_eq!(loaded.coord_system(), cube.coord_system());
    Ok(())
}
