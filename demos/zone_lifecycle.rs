//! Walkthrough of the zone lifecycle: attach, hide, show, detach, and
//! destroy-triggered auto-detach, with logging and metrics wired up.
//!
//! Run with `cargo run --example zone_lifecycle`.

use std::sync::Arc;

use atrium::{
    Layout, LayoutMetrics, Logger, MemorySink, Result, View, ViewConfig, ZoneEventKind, ZoneFilter,
};

const HEADER_ZONE: &str = "app:header";
const BODY_ZONE: &str = "app:body";
const SIDEBAR_ZONE: &str = "app:sidebar";

fn main() -> Result<()> {
    let sink = Arc::new(MemorySink::new());
    let metrics = LayoutMetrics::shared();
    let layout = Layout::new(ViewConfig::new().with_tag("main"))?
        .with_logger(Logger::from_shared(sink.clone()))
        .with_metrics(Arc::clone(&metrics));

    layout.on(ZoneFilter::any(), |event| {
        println!("event: {:<6} {}", event.kind.as_str(), event.zone);
    });
    layout.on(ZoneFilter::kind(ZoneEventKind::Detach), |event| {
        println!("       zone {} left the layout", event.zone);
    });

    let header = zone(HEADER_ZONE, "header")?;
    let body = zone(BODY_ZONE, "section")?;
    let sidebar = zone(SIDEBAR_ZONE, "aside")?;

    layout.attach(&header)?.attach(&body)?.attach(&sidebar)?;
    println!("mounted zones: {:?}", layout.zone_names());

    layout.hide(SIDEBAR_ZONE);
    println!("sidebar hidden: {}", layout.is_hidden(SIDEBAR_ZONE));
    layout.show(SIDEBAR_ZONE);

    // A view tearing itself down detaches without any call on the layout.
    sidebar.destroy();
    println!("zones after destroy: {:?}", layout.zone_names());

    layout.detach(&body).detach(HEADER_ZONE);
    println!("zones after detach: {:?}", layout.zone_names());

    let snapshot = metrics.lock().expect("metrics").snapshot();
    println!(
        "metrics: {} attaches, {} detaches ({} auto), {} hides, {} shows, {} events",
        snapshot.attaches,
        snapshot.detaches,
        snapshot.auto_detaches,
        snapshot.hides,
        snapshot.shows,
        snapshot.events_emitted
    );
    println!("log records: {}", sink.len());

    Ok(())
}

fn zone(name: &str, tag: &str) -> Result<View> {
    View::new(ViewConfig::new().with_tag(tag).with_name(name))
}
