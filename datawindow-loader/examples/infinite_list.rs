// Simulates a list that loads more rows whenever the user scrolls near the end, then a grid
// that requests row slices through the debounce gateway.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use datawindow::{FieldTable, ItemsRequest, SortKey};
use datawindow_loader::{
    DebounceGateway, GatewayOptions, IncrementalLoader, LoadOutcome, LoaderOptions,
    memory_provider,
};

#[derive(Clone, Debug)]
struct Row {
    id: u32,
    score: i64,
}

#[tokio::main]
async fn main() {
    let records: Vec<Row> = (0..95)
        .map(|id| Row {
            id,
            score: (id as i64 * 37) % 101,
        })
        .collect();
    let fields = FieldTable::<Row>::new()
        .field("Id", |r| r.id.into())
        .field("Score", |r| r.score.into());
    let provider = memory_provider(Arc::new(records), Arc::new(fields));

    let rearmed = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&rearmed);
    let loader = IncrementalLoader::new(
        Arc::clone(&provider),
        LoaderOptions::new()
            .with_page_size(Some(20))
            .with_on_more_available(move || {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
    );
    loader.set_sort_keys(vec![SortKey::descending("Score"), SortKey::ascending("Id")]);

    loop {
        match loader.load_more().await.expect("known sort fields") {
            LoadOutcome::Loaded { appended, complete } => {
                println!("appended {appended:>2} rows (loaded={})", loader.len());
                if complete {
                    break;
                }
            }
            other => {
                println!("stopped: {other:?}");
                break;
            }
        }
    }
    println!("sentinel re-armed {} times", rearmed.load(Ordering::Relaxed));

    let gateway = DebounceGateway::new(provider, GatewayOptions::new().with_index_offset(1));
    let slice = gateway
        .fetch(ItemsRequest::new(40, Some(5)).with_sort_keys(loader.sort_keys()))
        .await
        .expect("known sort fields");
    for row in &slice.items {
        println!("row {:>3}: id={} score={}", row.index, row.item.id, row.item.score);
    }
    println!("delay now {}ms", gateway.current_delay_ms());
}
