use chrono::{TimeZone, Utc};
use orderarchive::prelude::*;
use orderarchive_engine::RecordTransformer;
use proptest::prelude::*;

use crate::{read_archive, Workspace};

fn doc(i: usize, uid: &str, micros: i64, items: &[(String, i64)]) -> Document {
    let products: Vec<String> = items
        .iter()
        .map(|(code, amount)| serde_json::to_string(&Product::new(code.as_str(), *amount)).unwrap())
        .collect();
    Document::new(DocumentRef::new(format!("orders/{}", i)))
        .field("uid", uid)
        .field("date", Utc.timestamp_micros(micros).unwrap())
        .field("products", products)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn prop_archived_orders_read_back_equal(
        orders in prop::collection::vec(
            (
                "[ \t\r\nA-Za-z0-9_&<>-]{0,16}",
                0i64..4_102_444_800_000_000,
                prop::collection::vec(("[ \t\r\na-z0-9&<>]{0,8}", any::<i64>()), 0..4),
            ),
            0..12,
        )
    ) {
        let ws = Workspace::new();
        let docs: Vec<Document> = orders
            .iter()
            .enumerate()
            .map(|(i, (uid, micros, items))| doc(i, uid, *micros, items))
            .collect();
        let expected = RecordTransformer::default().transform(&docs).unwrap().archive;

        let store = MemoryStore::with_documents(docs);
        let report = migrate(&store, ws.options()).unwrap();

        prop_assert_eq!(report.archived, expected.len());
        prop_assert_eq!(read_archive(&ws.archive()), expected);
        prop_assert!(store.is_empty());
    }
}
