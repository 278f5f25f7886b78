use rest_queryset::{Manager, MemorySource, Model, QuerySetConfig, RecordSource};
use std::sync::{atomic::AtomicUsize, Arc};

use super::{Author, CountingSource, Post};

/// This function will be executed once when the test binary starts.
#[ctor::ctor]
fn initialize_logging() {
    // Default to warn to avoid noisy logs; allow override via RUST_LOG.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .init();
}

/// Three authors and 25 posts. Post `n` belongs to author `n % 3 + 1` and has
/// `n * 10` views.
pub fn seeded_source() -> MemorySource {
    let source = MemorySource::new();
    source
        .insert(
            "author",
            vec![
                Author::record(1, "Ada"),
                Author::record(2, "Brian"),
                Author::record(3, "Grace"),
            ],
        )
        .expect("seeding authors failed");
    source
        .insert(
            "post",
            (1..=25u64).map(|n| Post::record(n, n % 3 + 1, n * 10)),
        )
        .expect("seeding posts failed");
    source
}

/// Wrap `inner` so every page fetch is counted.
pub fn counted(inner: Arc<dyn RecordSource>) -> Arc<CountingSource> {
    Arc::new(CountingSource::new(inner, Arc::new(AtomicUsize::new(0))))
}

/// A counting manager over the seeded data with the given page size.
pub fn setup<M: Model>(request_limit: usize) -> (Manager<M>, Arc<CountingSource>) {
    let counting = counted(Arc::new(seeded_source()));
    let manager = Manager::new(
        counting.clone() as Arc<dyn RecordSource>,
        QuerySetConfig::new(request_limit),
    )
    .expect("building the manager failed");
    (manager, counting)
}
