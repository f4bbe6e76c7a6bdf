use mapservice::prelude::*;

/// Flush order, isolation and reentrancy of the removal queue, driven by
/// hand against the in-memory engine.
#[cfg(test)]
mod flush_ordering {
    use super::*;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn engine_with(layers: &[&str], sources: &[&str], images: &[&str]) -> Rc<RefCell<MemoryEngine>> {
        let mut engine = MemoryEngine::new();
        for source in sources {
            engine.add_source(source);
        }
        for layer in layers {
            engine.add_layer(layer, None);
        }
        for image in images {
            engine.add_image(image);
        }
        Rc::new(RefCell::new(engine))
    }

    fn removals(calls: &[String]) -> Vec<String> {
        calls
            .iter()
            .filter(|call| !call.starts_with("off "))
            .cloned()
            .collect()
    }

    #[test]
    fn test_kind_order_then_insertion_order() {
        init_logging();
        let typed = engine_with(&["l1", "l2"], &["s1"], &[]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();
        let m1 = typed.borrow().marker("m1");

        queue.remove_layer("l1");
        queue.remove_source("s1");
        queue.remove_marker(m1.boxed());
        queue.remove_layer("l2");

        let report = queue.flush(&engine);

        assert_eq!(
            removals(&typed.borrow().calls()),
            ["remove_layer l1", "remove_layer l2", "remove_source s1", "remove_marker m1"]
        );
        assert!(report.is_clean());
        assert_eq!(report.total_attempted(), 4);
        assert!(queue.is_empty());
        for kind in RemovalKind::FLUSH_ORDER {
            assert_eq!(queue.pending_of(kind), 0);
        }
    }

    #[test]
    fn test_all_five_kinds() {
        let typed = engine_with(&["water"], &["tiles"], &["pin"]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();
        let marker = typed.borrow().marker("home");
        let popup = typed.borrow().popup("info");

        queue.remove_image("pin");
        queue.remove_popup(popup.boxed());
        queue.remove_marker(marker.boxed());
        queue.remove_source("tiles");
        queue.remove_layer("water");

        queue.flush(&engine);

        assert_eq!(
            removals(&typed.borrow().calls()),
            [
                "remove_layer water",
                "remove_source tiles",
                "remove_marker home",
                "remove_popup info",
                "remove_image pin",
            ]
        );
        assert!(marker.is_removed());
        assert!(popup.is_removed());
    }

    #[test]
    fn test_layers_detach_before_their_source() {
        let mut memory = MemoryEngine::new();
        memory.add_source("tiles");
        memory.add_layer("roads", Some("tiles"));
        let typed = Rc::new(RefCell::new(memory));
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        // Source requested first, still removed after the layer
        queue.remove_source("tiles");
        queue.remove_layer("roads");

        let report = queue.flush(&engine);
        assert!(report.is_clean());
        assert!(!typed.borrow().has_source("tiles"));
    }

    #[test]
    fn test_second_flush_is_a_no_op() {
        let typed = engine_with(&["l1"], &[], &[]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        queue.remove_layer("l1");
        queue.flush(&engine);
        typed.borrow_mut().clear_calls();

        let report = queue.flush(&engine);
        assert!(report.is_empty());
        assert!(typed.borrow().calls().is_empty());
    }

    #[test]
    fn test_failures_are_isolated() {
        init_logging();
        let typed = engine_with(&["a", "c"], &["s1"], &["i1"]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        queue.remove_layer("a");
        queue.remove_layer("missing");
        queue.remove_layer("c");
        queue.remove_source("nope");
        queue.remove_source("s1");
        queue.remove_image("i1");

        let report = queue.flush(&engine);

        assert_eq!(
            removals(&typed.borrow().calls()),
            [
                "remove_layer a",
                "remove_layer missing",
                "remove_layer c",
                "remove_source nope",
                "remove_source s1",
                "remove_image i1",
            ]
        );
        assert_eq!(report.total_attempted(), 6);
        assert_eq!(report.succeeded(), 4);
        let failed: Vec<_> = report
            .failures
            .iter()
            .map(|f| (f.kind, f.id.as_str()))
            .collect();
        assert_eq!(
            failed,
            [(RemovalKind::Layer, "missing"), (RemovalKind::Source, "nope")]
        );
        assert!(!typed.borrow().has_layer("c"));
        assert!(!typed.borrow().has_image("i1"));
    }

    #[test]
    fn test_duplicate_image_is_attempted_twice() {
        let typed = engine_with(&[], &[], &["i1"]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        queue.remove_image("i1");
        queue.remove_image("i1");
        let report = queue.flush(&engine);

        assert_eq!(typed.borrow().calls(), ["remove_image i1", "remove_image i1"]);
        assert_eq!(report.attempted_for(RemovalKind::Image), 2);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.succeeded(), 1);
        assert!(!typed.borrow().has_image("i1"));
    }

    #[test]
    fn test_failed_removal_is_not_retried() {
        let typed = engine_with(&[], &[], &[]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        queue.remove_layer("ghost");
        assert_eq!(queue.flush(&engine).failures.len(), 1);

        typed.borrow_mut().clear_calls();
        assert!(queue.flush(&engine).is_empty());
        assert!(typed.borrow().calls().is_empty());
    }

    #[test]
    fn test_enqueue_during_flush_waits_for_next_flush() {
        let typed = engine_with(&["late"], &[], &[]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        let marker = typed.borrow().marker("m1");
        let reentrant = queue.clone();
        marker.on_remove(move |_| reentrant.remove_layer("late"));
        queue.remove_marker(marker.boxed());

        let first = queue.flush(&engine);
        assert_eq!(first.total_attempted(), 1);
        assert_eq!(queue.len(), 1);
        assert!(typed.borrow().has_layer("late"));

        let second = queue.flush(&engine);
        assert_eq!(second.attempted_for(RemovalKind::Layer), 1);
        assert!(!typed.borrow().has_layer("late"));
        assert!(queue.is_empty());
    }

    #[test]
    fn test_destroyed_engine_discards_pending() {
        let typed = engine_with(&["l1"], &["s1"], &["i1"]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        queue.remove_layer("l1");
        queue.remove_source("s1");
        queue.remove_image("i1");
        typed.borrow_mut().destroy();
        typed.borrow_mut().clear_calls();

        let report = queue.flush(&engine);
        assert!(report.skipped);
        assert_eq!(report.discarded, 3);
        assert!(queue.is_empty());
        assert!(typed.borrow().calls().is_empty());
    }

    #[test]
    fn test_removing_freshly_added_layer_in_same_cycle() {
        let typed = engine_with(&[], &[], &[]);
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        typed.borrow_mut().add_layer("flash", None);
        typed.borrow_mut().on(LayerEvent::MouseEnter, "flash");
        queue.remove_layer("flash");

        assert!(queue.flush(&engine).is_clean());
        assert!(!typed.borrow().has_layer("flash"));
        assert_eq!(typed.borrow().listener_count("flash"), 0);
    }

    #[test]
    fn test_unbind_failure_does_not_block_layer_or_source() {
        init_logging();
        let mut memory = MemoryEngine::new();
        memory.add_source("tiles");
        memory.add_layer("roads", Some("tiles"));
        memory.on(LayerEvent::Click, "roads");
        memory.on(LayerEvent::MouseOut, "roads");
        memory.fail_unbind(LayerEvent::MouseOver);
        let typed = Rc::new(RefCell::new(memory));
        let engine: SharedEngine = typed.clone();
        let queue = RemovalQueue::new();

        queue.remove_layer("roads");
        queue.remove_source("tiles");
        let report = queue.flush(&engine);

        assert!(report.failures.is_empty());
        assert_eq!(report.succeeded(), 2);
        assert_eq!(report.unbind_failures.len(), 1);
        assert!(report.unbind_failures[0].error.contains("mouseover"));
        assert!(!typed.borrow().has_layer("roads"));
        assert!(!typed.borrow().has_source("tiles"));
        assert_eq!(typed.borrow().listener_count("roads"), 0);
        assert_eq!(
            removals(&typed.borrow().calls()),
            ["remove_layer roads", "remove_source tiles"]
        );
    }
}
