use anyhow::Result;
use chrono::{TimeZone, Utc};
use ledgerlens_core::{Category, TransactionSource, format_dmy};
use ledgerlens_ingest::{MessageParser, MessageQuery, SmsMessage, TokenStreamParser};
use ledgerlens_sync::{
    JsonFileSource, JsonFileStore, MemoryStore, MessageSource, SyncError, TransactionStore,
    UploadCoordinator, import_messages, import_statement,
};
use tempfile::TempDir;

struct NoInbox;

impl MessageSource for NoInbox {
    fn is_available(&self) -> bool {
        false
    }

    async fn read_messages(&self, _query: &MessageQuery) -> Result<Vec<SmsMessage>> {
        panic!("must not be read when unavailable")
    }
}

fn statement_tokens() -> Vec<&'static str> {
    vec![
        "ACME", "BANK", "Statement", "Page", "1",
        "Date", "Narration", "Debit", "Credit", "Balance",
        "01/02/2024", "Coffee", "Shop", "250.00", "0.00", "9,750.00",
        "02/02/2024", "SALARY", "FEB", "0.00", "50,000.00", "59,750.00",
        "03/02/2024", "Netflix", "649.00", "0.00", "59,101.00",
        "Closing", "balance", "59,101.00",
    ]
}

fn parser() -> MessageParser {
    MessageParser::new(chrono_tz::Asia::Kolkata).at(Utc.with_ymd_and_hms(2024, 7, 1, 6, 0, 0).unwrap())
}

/// Statement rows land classified; importing the same statement again inserts nothing.
#[tokio::test]
async fn test_statement_import_is_repeatable() {
    let store = MemoryStore::new();
    let coordinator = UploadCoordinator::new(&store, "alice").with_batch_size(2);
    let tokens = statement_tokens();

    let first = import_statement(&tokens, &TokenStreamParser::new(), &coordinator)
        .await
        .unwrap();
    assert_eq!(first.attempted, 3);
    assert_eq!(first.inserted, 3);
    assert_eq!(first.latest_source_timestamp, None);

    let rows = store.list_existing("alice").await.unwrap();
    let categories: Vec<Category> = rows.iter().map(|r| r.category).collect();
    assert_eq!(
        categories,
        vec![Category::FoodAndDining, Category::Income, Category::Subscriptions]
    );
    assert_eq!(rows[2].balance, Some(59101.0));

    let second = import_statement(&tokens, &TokenStreamParser::new(), &coordinator)
        .await
        .unwrap();
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 3);
    assert_eq!(store.rows().len(), 3);
}

/// SMS export on disk → JSON file store, with retries collapsed and the cursor advanced.
#[tokio::test]
async fn test_sms_import_from_export_file() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("sms.json");
    let june_15 = Utc.with_ymd_and_hms(2024, 6, 15, 6, 30, 0).unwrap().timestamp_millis();
    std::fs::write(
        &export,
        format!(
            r#"{{"messages": [
                {{"address": "VM-HDFCBK", "body": "Rs.500.00 debited from A/c for Zomato order on 05/03/2024", "date": {a}}},
                {{"address": "VM-HDFCBK", "body": "Rs.500.00 debited from A/c for Zomato order on 05/03/2024", "date": {b}}},
                {{"address": "AX-SBIINB", "body": "Your A/c XX9876 is credited with INR 2,500.00 by NEFT", "date": {c}}},
                {{"address": "+911234567890", "body": "See you at 7?", "date": {c}}},
                {{"address": "VM-HDFCBK", "body": "", "date": {c}}}
            ]}}"#,
            a = june_15 - 2_000,
            b = june_15 - 1_000,
            c = june_15,
        ),
    )
    .unwrap();

    let store = JsonFileStore::new(dir.path().join("store.json"));
    let coordinator = UploadCoordinator::new(&store, "alice");
    let source = JsonFileSource::new(&export);

    let report = import_messages(&source, &parser(), &MessageQuery::default(), &coordinator)
        .await
        .unwrap();
    assert_eq!(report.attempted, 2);
    assert_eq!(report.inserted, 2);
    assert_eq!(report.latest_source_timestamp, Some(june_15));

    let rows = store.load().await.unwrap();
    assert_eq!(rows.len(), 2);
    let credit = rows.iter().find(|r| r.transaction.amount > 0.0).unwrap();
    assert_eq!(format_dmy(credit.transaction.date), "15/06/2024");
    assert_eq!(credit.transaction.category, Category::Income);
    assert_eq!(credit.transaction.source, TransactionSource::Sms);
    assert_eq!(credit.transaction.notes.as_deref(), Some("Imported from SMS"));

    // Next pass starts at the cursor; the boundary message is seen again and skipped
    let next = MessageQuery::since(report.latest_source_timestamp.unwrap());
    let again = import_messages(&source, &parser(), &next, &coordinator)
        .await
        .unwrap();
    assert_eq!(again.attempted, 1);
    assert_eq!(again.inserted, 0);
    assert_eq!(again.skipped, 1);
    assert_eq!(again.latest_source_timestamp, Some(june_15));
}

/// Missing capability is an error raised before anything is parsed or stored.
#[tokio::test]
async fn test_unavailable_source_fails_eagerly() {
    let store = MemoryStore::new();
    let coordinator = UploadCoordinator::new(&store, "alice");

    let err = import_messages(&NoInbox, &parser(), &MessageQuery::default(), &coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
    assert!(store.rows().is_empty());

    let missing = JsonFileSource::new("/definitely/not/here.json");
    let err = import_messages(&missing, &parser(), &MessageQuery::default(), &coordinator)
        .await
        .unwrap_err();
    assert!(matches!(err, SyncError::SourceUnavailable(_)));
}

/// An export with nothing transactional is a quiet, empty import.
#[tokio::test]
async fn test_empty_window_is_not_an_error() {
    let dir = TempDir::new().unwrap();
    let export = dir.path().join("sms.json");
    std::fs::write(&export, r#"[{"sender": "MOM", "body": "call me", "date": 5}]"#).unwrap();

    let store = MemoryStore::new();
    let coordinator = UploadCoordinator::new(&store, "alice");
    let report = import_messages(&JsonFileSource::new(&export), &parser(), &MessageQuery::default(), &coordinator)
        .await
        .unwrap();
    assert_eq!(report.attempted, 0);
    assert_eq!(report.inserted, 0);
}

/// Owners don't see each other's rows during dedup.
#[tokio::test]
async fn test_dedup_is_scoped_per_owner() {
    let store = MemoryStore::new();
    let tokens = statement_tokens();

    let alice = UploadCoordinator::new(&store, "alice");
    let bob = UploadCoordinator::new(&store, "bob");

    import_statement(&tokens, &TokenStreamParser::new(), &alice).await.unwrap();
    let report = import_statement(&tokens, &TokenStreamParser::new(), &bob).await.unwrap();
    assert_eq!(report.inserted, 3);
    assert_eq!(store.rows().len(), 6);
}
