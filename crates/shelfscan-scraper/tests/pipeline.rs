//! End to end: navigate, harvest, accumulate, save, read back.

mod support;

use std::sync::Arc;

use shelfscan_store::{load, ResultSink};

use support::{card, orchestrator, snapshots, FakeLauncher, PageScript};

#[tokio::test]
async fn three_containers_with_missing_prices_save_in_container_order() {
    let cards = vec![
        card("B0CV5J8K3T", "HP 15s Ryzen 5", Some(("₹41,990", "₹55,883"))),
        card("B0C1QXKQ9S", "Lenovo V15 G4", None),
        card("B0CX8Z6QH2", "ASUS TUF A15", Some(("₹59,990", "₹83,990"))),
    ];
    let launcher = FakeLauncher::new(vec![(
        "560001",
        PageScript::with_containers(snapshots(&cards)),
    )]);
    let state = Arc::clone(&launcher.state);
    let mut orch = orchestrator(launcher);

    orch.start().await.unwrap();
    let report = orch.scrape_for_location("560001").await;
    orch.shutdown().await.unwrap();

    assert!(report.succeeded(), "unexpected error: {:?}", report.error);
    assert_eq!(
        state.visited.lock().unwrap().as_slice(),
        ["https://www.amazon.in/s?k=laptops&pincode=560001"]
    );
    assert_eq!(state.closed(), 1);

    let results = orch.take_results();
    assert_eq!(results.len(), 3);
    let second = &results.as_slice()[1];
    assert_eq!(second.mrp, "");
    assert_eq!(second.selling_price, "");
    for populated in [&results.as_slice()[0], &results.as_slice()[2]] {
        assert!(!populated.mrp.is_empty());
        assert!(!populated.selling_price.is_empty());
        assert!(!populated.product_name.is_empty());
        assert!(!populated.image_url.is_empty());
        assert!(!populated.laptop_specification.is_empty());
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scraped_data.ndjson.gz");
    let summary = ResultSink::new(&path).save(&results).unwrap();
    assert_eq!(summary.records, 3);

    let loaded = load(&path).unwrap();
    let skus: Vec<&str> = loaded.iter().map(|r| r.sku.as_str()).collect();
    assert_eq!(skus, ["B0CV5J8K3T", "B0C1QXKQ9S", "B0CX8Z6QH2"]);
    assert_eq!(loaded, results.into_vec());
}

#[tokio::test]
async fn batch_across_locations_saves_in_location_order() {
    let launcher = FakeLauncher::new(vec![
        (
            "560001",
            PageScript::with_containers(snapshots(&[
                card("BLR1", "a", None),
                card("BLR2", "b", None),
            ])),
        ),
        ("110001", PageScript::navigation_fails()),
        (
            "400001",
            PageScript::with_containers(snapshots(&[card("BOM1", "c", None)])),
        ),
    ]);
    let mut orch = orchestrator(launcher).with_max_concurrent(2);

    orch.start().await.unwrap();
    orch.scrape_locations(&["560001", "110001", "400001"][..]).await;
    orch.shutdown().await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch.ndjson.gz");
    ResultSink::new(&path).save(orch.results()).unwrap();

    let skus: Vec<String> = load(&path).unwrap().into_iter().map(|r| r.sku).collect();
    assert_eq!(skus, ["BLR1", "BLR2", "BOM1"]);
}
