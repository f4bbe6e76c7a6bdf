use mapservice::prelude::*;

/// Headless walkthrough: a map engine, a zone, and a few turns worth of
/// removals.
fn main() -> anyhow::Result<()> {
    mapservice::init_logging();

    println!("🗺️ mapservice headless example");
    println!("==============================");

    let options = TeardownOptions::from_json(r#"{ "warn_on_discard": true }"#)?;

    let mut memory = MemoryEngine::new();
    memory.add_source("osm");
    memory.add_layer("roads", Some("osm"));
    memory.add_layer("labels", Some("osm"));
    memory.add_image("pin");
    memory.on(LayerEvent::Click, "roads");
    let typed = Rc::new(RefCell::new(memory));

    let zone = Zone::new();
    let service = MapService::new(typed.clone(), zone.clone(), options);
    let marker = typed.borrow().marker("home");
    let popup = typed.borrow().popup("info");
    popup.on_close();

    println!("\n🧹 Turn 1: remove the source before its layers");
    zone.run(|| {
        service.remove_source("osm");
        service.remove_layer("roads");
        service.remove_layer("labels");
        println!("   queued {} removals", service.pending_len());
    });
    print_report(&service);

    println!("\n🧹 Turn 2: handles, an image, and a typo");
    zone.run(|| {
        service.remove_marker(marker.boxed());
        service.remove_popup_from_map(popup.boxed(), false);
        service.remove_image("pin");
        service.remove_image("pni");
    });
    print_report(&service);

    println!("\n💥 Turn 3: destroy with work still pending");
    zone.run(|| {
        service.remove_layer("never-flushed");
        service.destroy_map();
    });
    println!("   destroyed: {}, pending: {}", service.is_destroyed(), service.pending_len());

    println!("\n📜 Engine calls:");
    for call in typed.borrow().calls() {
        println!("   {}", call);
    }

    Ok(())
}

fn print_report(service: &MapService) {
    let Some(report) = service.last_flush_report() else {
        println!("   nothing flushed");
        return;
    };
    for kind in RemovalKind::FLUSH_ORDER {
        let attempted = report.attempted_for(kind);
        if attempted > 0 {
            println!("   {:<7} {}", kind.to_string(), attempted);
        }
    }
    for failure in &report.failures {
        println!("   ⚠️ {} {}: {}", failure.kind, failure.id, failure.error);
    }
}
