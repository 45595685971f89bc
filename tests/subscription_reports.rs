//! Behavior-driven tests for subscription cost reports
//!
//! Notes are scanned from a store by tag, parsed, aggregated and rendered.

use pricemark_core::{
    collect_subscriptions, render_cost_report, BillingInterval, CostSummary, DirectoryNoteStore,
    MemoryNoteStore, NewNote, NoteId, NoteStore,
};

fn id(raw: &str) -> NoteId {
    NoteId::parse(raw).expect("valid id")
}

fn seeded_store() -> MemoryNoteStore {
    let store = MemoryNoteStore::new();
    store.insert(
        id("netflix"),
        "# Netflix\nPreis/Monat: 13,99\nKategorie: Streaming\nAbo seit: 2021-04-01",
        &["abo"],
    );
    store.insert(
        id("office"),
        "# Microsoft 365\nPreis/Jahr: 99\nKategorie: Work",
        &["abo"],
    );
    store.insert(
        id("spotify"),
        "# Spotify\nPrice/Month: 10.99\nCategory: Music",
        &["#ABO"],
    );
    store.insert(id("draft"), "# Draft without price", &["abo"]);
    store.insert(id("shopping"), "# Shopping\nPreis/Monat: 5", &["list"]);
    store
}

#[test]
fn when_notes_are_tagged_only_priced_ones_are_collected() {
    // Given: Three priced subscription notes, one unpriced, one untagged
    let store = seeded_store();

    // When: The store is scanned for the subscription tag
    let subscriptions = collect_subscriptions(&store, "abo").expect("scan should succeed");

    // Then: Only the three priced, tagged notes remain
    let mut names: Vec<&str> = subscriptions.iter().map(|s| s.name.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Microsoft 365", "Netflix", "Spotify"]);
}

#[test]
fn summary_totals_convert_yearly_prices_to_months() {
    let store = seeded_store();
    let subscriptions = collect_subscriptions(&store, "abo").expect("scan should succeed");

    let summary = CostSummary::from_subscriptions(&subscriptions);

    // 13.99 + 10.99 + 99 / 12
    assert!((summary.total_monthly - 33.23).abs() < 1e-9);
    assert!((summary.total_yearly - 398.76).abs() < 1e-9);
    assert_eq!(summary.apps[0].name, "Netflix");
    assert_eq!(
        summary
            .apps
            .iter()
            .filter(|app| app.interval == BillingInterval::Yearly)
            .count(),
        1
    );
}

#[test]
fn rendered_report_links_each_app() {
    let store = seeded_store();
    let subscriptions = collect_subscriptions(&store, "abo").expect("scan should succeed");

    let report = render_cost_report(&CostSummary::from_subscriptions(&subscriptions));

    assert!(report.contains("**3 subscriptions, total:** 33.23€/month • 398.76€/year"));
    assert!(report.contains("[[Netflix]]"));
    assert!(report.contains("[[Microsoft 365]]"));
    assert!(report.contains("Streaming"));
    assert!(report.contains("**Jan ("));
}

#[test]
fn when_nothing_is_tagged_the_report_explains_the_template() {
    let store = MemoryNoteStore::new();
    let subscriptions = collect_subscriptions(&store, "abo").expect("scan should succeed");

    let report = render_cost_report(&CostSummary::from_subscriptions(&subscriptions));

    assert!(report.contains("No subscription notes found"));
    assert!(report.contains("# App Name"));
}

#[test]
fn report_can_be_written_back_as_a_note_on_disk() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = DirectoryNoteStore::open(dir.path()).expect("open store");
    std::fs::write(
        dir.path().join("icloud.md"),
        "---\ntags: abo\n---\n# iCloud+\nPreis/Monat: 2,99\nKategorie: Cloud\n",
    )
    .expect("seed note");

    let subscriptions = collect_subscriptions(&store, "abo").expect("scan should succeed");
    let report = render_cost_report(&CostSummary::from_subscriptions(&subscriptions));
    let created = store
        .create(NewNote {
            content: format!("# Subscription costs\n{report}"),
            tags: Vec::new(),
        })
        .expect("create report note");

    let written = store.load(&created).expect("report note exists");
    assert!(written.content.contains("[[iCloud+]]"));
    assert!(written.content.contains("📺 Cloud"));
}
