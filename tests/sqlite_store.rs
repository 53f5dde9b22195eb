// tests/sqlite_store.rs
use chrono::{Duration, TimeZone, Utc};

use bid_monitor::ingest::types::BidCandidate;
use bid_monitor::recorder::record_candidates;
use bid_monitor::store::SqliteBidStore;
use bid_monitor::{BidCategory, BidStore, InsertOutcome, NewBidAlert};

fn alert(url: &str, title: &str, created_min: i64) -> NewBidAlert {
    let base = Utc.with_ymd_and_hms(2025, 5, 1, 12, 0, 0).unwrap();
    NewBidAlert {
        source: "NPPA".into(),
        title: title.into(),
        url: url.into(),
        description: None,
        bid_category: BidCategory::Connectivity,
        services: vec!["internet".into(), "vpn".into()],
        publish_date: base,
        closing_date: None,
        notified: false,
        created_at: base + Duration::minutes(created_min),
    }
}

async fn memory_store() -> SqliteBidStore {
    SqliteBidStore::connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite")
}

#[tokio::test]
async fn unique_url_title_pair_is_enforced() {
    let store = memory_store().await;
    let a = alert("https://mof.gov.sl/t1", "Tender X", 0);

    let first = store.insert_if_unique(&a).await.unwrap();
    let InsertOutcome::Inserted(saved) = first else {
        panic!("first insert should succeed");
    };
    assert_eq!(saved.title, "Tender X");
    assert_eq!(saved.services, vec!["internet", "vpn"]);
    assert_eq!(saved.created_at, a.created_at);

    let again = store.insert_if_unique(&a).await.unwrap();
    assert_eq!(again, InsertOutcome::AlreadyExists);

    let other_title = alert("https://mof.gov.sl/t1", "Tender X - addendum", 1);
    assert!(matches!(
        store.insert_if_unique(&other_title).await.unwrap(),
        InsertOutcome::Inserted(_)
    ));

    assert_eq!(store.list_recent(50).await.unwrap().len(), 2);
    store.close().await;
}

#[tokio::test]
async fn optional_fields_roundtrip() {
    let store = memory_store().await;
    let mut a = alert("https://mohs.gov.sl/t9", "ICT Infrastructure Setup", 0);
    a.bid_category = BidCategory::Ict;
    a.description = Some("Network infrastructure and security systems".into());
    a.closing_date = Some(a.publish_date + Duration::days(45));

    let InsertOutcome::Inserted(saved) = store.insert_if_unique(&a).await.unwrap() else {
        panic!("insert");
    };
    assert_eq!(saved.bid_category, BidCategory::Ict);
    assert_eq!(saved.description, a.description);
    assert_eq!(saved.closing_date, a.closing_date);
    assert!(!saved.notified);
}

#[tokio::test]
async fn list_is_newest_first_and_limited() {
    let store = memory_store().await;
    for (i, t) in ["old", "middle", "new"].iter().enumerate() {
        store
            .insert_if_unique(&alert(&format!("https://x.test/{t}"), t, i as i64))
            .await
            .unwrap();
    }

    let all = store.list_recent(10).await.unwrap();
    let titles: Vec<_> = all.iter().map(|a| a.title.as_str()).collect();
    assert_eq!(titles, vec!["new", "middle", "old"]);

    let two = store.list_recent(2).await.unwrap();
    assert_eq!(two.len(), 2);
    assert_eq!(two[0].title, "new");
}

#[tokio::test]
async fn set_notified_toggles_and_reports_missing() {
    let store = memory_store().await;
    let InsertOutcome::Inserted(saved) = store
        .insert_if_unique(&alert("https://x.test/n", "Tender N", 0))
        .await
        .unwrap()
    else {
        panic!("insert");
    };

    assert!(store.set_notified(saved.id, true).await.unwrap());
    assert!(store.list_recent(1).await.unwrap()[0].notified);

    assert!(store.set_notified(saved.id, false).await.unwrap());
    assert!(!store.list_recent(1).await.unwrap()[0].notified);

    assert!(!store.set_notified(saved.id + 100, true).await.unwrap());
}

#[tokio::test]
async fn file_store_dedups_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("db/bids.db").display());
    let a = alert("https://mof.gov.sl/t1", "Tender X", 0);

    let first = SqliteBidStore::connect(&url).await.unwrap();
    assert!(matches!(
        first.insert_if_unique(&a).await.unwrap(),
        InsertOutcome::Inserted(_)
    ));
    first.close().await;

    let second = SqliteBidStore::connect(&url).await.unwrap();
    assert_eq!(
        second.insert_if_unique(&a).await.unwrap(),
        InsertOutcome::AlreadyExists
    );
    assert_eq!(second.list_recent(10).await.unwrap().len(), 1);
    second.close().await;
}

#[tokio::test]
async fn recorded_rows_match_what_was_reported_saved() {
    let store = memory_store().await;
    // Sub-millisecond part must not make the reported record differ from the row.
    let now =
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 30, 0).unwrap() + Duration::microseconds(1_234_567);
    let candidates = ["https://nppa.gov.sl/a", "https://nppa.gov.sl/b"]
        .into_iter()
        .map(|url| BidCandidate {
            source: "NPPA".into(),
            title: "Supply of VSAT Terminals".into(),
            url: url.into(),
            bid_category: BidCategory::Connectivity,
            services: vec!["vsat".into()],
            publish_date: now,
        })
        .collect::<Vec<_>>();

    let out = record_candidates(&store, candidates, now).await;
    assert_eq!(out.failed, 0);
    assert_eq!(out.saved.len(), 2);

    let mut listed = store.list_recent(10).await.unwrap();
    listed.reverse();
    assert_eq!(listed, out.saved);
    store.close().await;
}
