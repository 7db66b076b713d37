//! Sample data for `--demo`, so the search can be tried without Redis.

use serde_json::json;

use jobscope_core::{Job, Timestamp};
use jobscope_infra::{InMemoryQueueBackend, WorkerEntry};

pub fn backend() -> InMemoryQueueBackend {
    let backend = InMemoryQueueBackend::new();
    backend
        .push("mailers", Job::with_class("SendEmail").with_field("args", json!([42])))
        .push("mailers", Job::with_class("SendNewsletter").with_field("args", json!(["weekly"])))
        .push("reports", Job::with_class("GenerateReport").with_field("args", json!(["2026-Q3"])))
        .delay(
            Timestamp::new(1_792_310_400),
            Job::with_class("EmailDigest").with_field("queue", "mailers"),
        )
        .delay(Timestamp::new(1_792_224_000), Job::with_class("Cleanup").with_field("queue", "default"))
        .work(WorkerEntry::new(
            "worker-1:4021:mailers",
            "mailers",
            "2026/10/18 09:30:00 UTC",
            Job::with_class("SendWelcomeEmail").with_field("args", json!([7])),
        ));
    backend
}
