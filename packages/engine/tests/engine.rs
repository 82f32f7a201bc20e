//! End-to-end tests for the modux engine: modules, dispatch, and async
//! sequences against a live runtime.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use modux_core::{Action, FnFlow, Module, Outcome, Resume, Step, Yielded};
use modux_engine::Runtime;
use serde_json::{json, Value};

fn counter_module() -> Module {
    Module::new("counter")
        .unwrap()
        .with_state(json!({"count": 0}))
        .action("increment", &[], |_| {
            Outcome::updater(|prev| json!({"count": prev["count"].as_i64().unwrap_or(0) + 1}))
        })
}

/// Record every action kind a runtime dispatches.
fn record_kinds(runtime: &Runtime, selector: &str) -> Arc<Mutex<Vec<Action>>> {
    let log: Arc<Mutex<Vec<Action>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&log);
    runtime.store().subscribe(selector, move |action| {
        sink.lock().unwrap().push(action.clone());
    });
    log
}

#[test]
fn incrementing_twice_counts_to_two() {
    let runtime = Runtime::new();
    runtime.register(counter_module());

    let dispatcher = runtime.dispatcher();
    dispatcher.dispatch_named("counter.increment", vec![]);
    dispatcher.dispatch_named("counter.increment", vec![]);

    assert_eq!(runtime.store().select("counter.count"), Some(json!(2)));
}

#[test]
fn foreign_handler_updates_its_own_namespace() {
    let runtime = Runtime::new();
    runtime.register(
        Module::new("foo")
            .unwrap()
            .with_state(json!({}))
            .action("update", &["message"], |_| Outcome::None),
    );
    runtime.register(
        Module::new("baz")
            .unwrap()
            .with_state(json!({"message": "baz"}))
            .handler("foo.update", |action| {
                let message = action.arg(0).cloned().unwrap_or(Value::Null);
                Outcome::fragment(json!({"message": message}))
            }),
    );

    runtime
        .dispatcher()
        .dispatch_named("foo.update", vec![json!("hello")]);

    assert_eq!(runtime.store().select("baz.message"), Some(json!("hello")));
    // foo declared no matching state field; its reducer was a no-op.
    assert_eq!(runtime.state_of("foo"), Some(json!({})));
}

#[test]
fn unmatched_dispatch_changes_no_namespace() {
    let runtime = Runtime::new();
    runtime.register(counter_module());
    runtime.register(
        Module::new("other")
            .unwrap()
            .with_state(json!({"flag": true})),
    );

    let before = runtime.state();
    runtime.dispatcher().dispatch(Action::new("NOBODY_HOME"));
    assert_eq!(runtime.state(), before);
}

#[test]
fn async_sequence_merges_updates_then_completes() {
    let runtime = Runtime::new();
    runtime.register(
        Module::new("feed")
            .unwrap()
            .with_state(json!({"status": "idle", "content": null}))
            .action("load", &[], |_| {
                Outcome::flow(FnFlow::new(|input, step| {
                    Ok(match step {
                        0 => Step::Yield(Yielded::Fragment(json!({"status": "loading"}))),
                        1 => Step::Yield(Yielded::Task(Box::new(|| Ok(json!("data"))))),
                        2 => {
                            let Resume::Value(content) = input else {
                                panic!("expected the task result");
                            };
                            Step::Yield(Yielded::Fragment(
                                json!({"status": "ready", "content": content}),
                            ))
                        }
                        _ => Step::Done,
                    })
                }))
            }),
    );
    let log = record_kinds(&runtime, "@@feed/*");

    runtime.dispatcher().dispatch_named("feed.load", vec![]);
    runtime.wait_idle();

    assert_eq!(
        runtime.state_of("feed"),
        Some(json!({"status": "ready", "content": "data"}))
    );

    let kinds: Vec<String> = log.lock().unwrap().iter().map(|a| a.kind.clone()).collect();
    assert_eq!(
        kinds,
        [
            "@@feed/LOAD",
            "@@feed/LOAD/UPDATE",
            "@@feed/LOAD/UPDATE",
            "@@feed/LOAD/COMPLETE",
        ]
    );
    // First visible intermediate state was "loading".
    assert_eq!(
        log.lock().unwrap()[1].payload["status"],
        json!("loading")
    );
}

#[test]
fn rejected_task_surfaces_one_error_and_no_complete() {
    let runtime = Runtime::new();
    runtime.register(
        Module::new("feed")
            .unwrap()
            .with_state(json!({"status": "idle"}))
            .action("load", &[], |_| {
                Outcome::flow(FnFlow::new(|input, step| match step {
                    0 => Ok(Step::Yield(Yielded::Task(Box::new(|| {
                        Err("connection refused".into())
                    })))),
                    _ => match input {
                        // Uncaught: hand the rejection straight back.
                        Resume::Error(error) => Err(error),
                        _ => panic!("expected the rejection back"),
                    },
                }))
            }),
    );
    let log = record_kinds(&runtime, "@@feed/*");

    runtime.dispatcher().dispatch_named("feed.load", vec![]);
    runtime.wait_idle();

    let actions = log.lock().unwrap();
    let kinds: Vec<&str> = actions.iter().map(|a| a.kind.as_str()).collect();
    assert_eq!(kinds, ["@@feed/LOAD", "@@feed/LOAD/ERROR"]);
    assert_eq!(actions[1].payload["message"], json!("connection refused"));
}

#[test]
fn async_callback_runs_exactly_once_per_dispatch() {
    let calls = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&calls);

    let runtime = Runtime::new();
    runtime.register(
        Module::new("jobs")
            .unwrap()
            .with_state(json!({"step": 0}))
            .action("run", &[], move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                Outcome::flow(FnFlow::new(|_, step| {
                    Ok(match step {
                        0 => Step::Yield(Yielded::Fragment(json!({"step": 1}))),
                        1 => Step::Yield(Yielded::Fragment(json!({"step": 2}))),
                        _ => Step::Done,
                    })
                }))
            }),
    );

    runtime.dispatcher().dispatch_named("jobs.run", vec![]);
    runtime.wait_idle();

    assert_eq!(runtime.store().select("jobs.step"), Some(json!(2)));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn yielded_updater_reads_latest_state() {
    let runtime = Runtime::new();
    runtime.register(
        Module::new("tally")
            .unwrap()
            .with_state(json!({"total": 10}))
            .action("double", &[], |_| {
                Outcome::flow(FnFlow::new(|_, step| {
                    Ok(match step {
                        0 => Step::Yield(Yielded::Updater(Box::new(|latest| {
                            json!({"total": latest["total"].as_i64().unwrap_or(0) * 2})
                        }))),
                        _ => Step::Done,
                    })
                }))
            }),
    );

    runtime.dispatcher().dispatch_named("tally.double", vec![]);
    runtime.wait_idle();
    assert_eq!(runtime.store().select("tally.total"), Some(json!(20)));
}

#[test]
fn handler_flow_fans_out_through_sub_actions() {
    // A foreign handler reacts to jobs.start with its own async
    // sequence; its UPDATE sub-actions merge into the handler's
    // namespace because the handler owns the main type.
    let runtime = Runtime::new();
    runtime.register(
        Module::new("jobs")
            .unwrap()
            .with_state(json!({}))
            .action("start", &[], |_| Outcome::None),
    );
    runtime.register(
        Module::new("monitor")
            .unwrap()
            .with_state(json!({"phase": "idle"}))
            .handler("jobs.start", |_| {
                Outcome::flow(FnFlow::new(|_, step| {
                    Ok(match step {
                        0 => Step::Yield(Yielded::Fragment(json!({"phase": "watching"}))),
                        _ => Step::Done,
                    })
                }))
            }),
    );

    runtime.dispatcher().dispatch_named("jobs.start", vec![]);
    runtime.wait_idle();
    assert_eq!(
        runtime.store().select("monitor.phase"),
        Some(json!("watching"))
    );
}

#[test]
fn concurrent_sequences_each_terminate_once() {
    let runtime = Runtime::new();
    runtime.register(
        Module::new("feed")
            .unwrap()
            .with_state(json!({"loads": 0}))
            .action("load", &[], |_| {
                Outcome::flow(FnFlow::new(|_, step| {
                    Ok(match step {
                        0 => Step::Yield(Yielded::Updater(Box::new(|latest| {
                            json!({"loads": latest["loads"].as_i64().unwrap_or(0) + 1})
                        }))),
                        _ => Step::Done,
                    })
                }))
            }),
    );
    let log = record_kinds(&runtime, "@@feed/*");

    let dispatcher = runtime.dispatcher();
    for _ in 0..4 {
        dispatcher.dispatch_named("feed.load", vec![]);
    }
    runtime.wait_idle();

    let completes = log
        .lock()
        .unwrap()
        .iter()
        .filter(|a| a.kind == "@@feed/LOAD/COMPLETE")
        .count();
    assert_eq!(completes, 4);
}

#[test]
#[should_panic(expected = "runaway async sequence")]
fn runaway_sequence_fails_loudly() {
    let runtime = Runtime::with_step_cap(8);
    runtime.register(Module::new("spin").unwrap().action("forever", &[], |_| {
        Outcome::flow(FnFlow::new(|_, _| {
            Ok(Step::Yield(Yielded::Fragment(json!({"spinning": true}))))
        }))
    }));

    runtime.dispatcher().dispatch_named("spin.forever", vec![]);
    runtime.wait_idle();
}

#[test]
fn scoped_dispatcher_resolves_bare_names() {
    let runtime = Runtime::new();
    runtime.register(counter_module());

    let counter = runtime.scoped_dispatcher("counter");
    counter.dispatch_named("increment", vec![]);
    assert_eq!(runtime.store().select("counter.count"), Some(json!(1)));
}

#[test]
fn dot_dispatch_reconstructs_payload_from_declared_names() {
    let runtime = Runtime::new();
    runtime.register(
        Module::new("chat")
            .unwrap()
            .with_state(json!({"last": null}))
            .action("post", &["author", "text"], |action| {
                // Positional args are authoritative; payload is the
                // zipped introspection view.
                assert_eq!(action.payload["author"], action.args[0]);
                let text = action.arg(1).cloned().unwrap_or(Value::Null);
                Outcome::fragment(json!({"last": text}))
            }),
    );

    runtime
        .dispatcher()
        .dispatch_named("chat.post", vec![json!("ada"), json!("hi all")]);
    assert_eq!(runtime.store().select("chat.last"), Some(json!("hi all")));
}

#[test]
fn bare_action_types_reach_literal_handlers() {
    let runtime = Runtime::new();
    runtime.register(
        Module::new("audit")
            .unwrap()
            .with_state(json!({"events": 0}))
            .handler("EXTERNAL_EVENT", |_| {
                Outcome::updater(|prev| json!({"events": prev["events"].as_i64().unwrap_or(0) + 1}))
            }),
    );

    runtime.dispatcher().dispatch(Action::new("EXTERNAL_EVENT"));
    runtime.dispatcher().dispatch(Action::new("OTHER_EVENT"));
    assert_eq!(runtime.store().select("audit.events"), Some(json!(1)));
}

#[test]
fn wildcard_select_reads_across_collections() {
    let runtime = Runtime::new();
    runtime.register(Module::new("todos").unwrap().with_state(
        json!({"items": [{"title": "one", "done": false}, {"title": "two", "done": true}]}),
    ));

    assert_eq!(
        runtime.store().select("todos.items.*.title"),
        Some(json!(["one", "two"]))
    );
    let resolved = runtime
        .store()
        .select_map(&[("first", "todos.items[0].title"), ("missing", "todos.nope")]);
    assert_eq!(resolved["first"], json!("one"));
    assert_eq!(resolved["missing"], Value::Null);
}

#[test]
fn duplicate_namespace_registration_newer_wins() {
    let runtime = Runtime::new();
    runtime.register(counter_module());
    runtime.register(
        Module::new("counter")
            .unwrap()
            .with_state(json!({"count": 0}))
            .action("increment", &[], |_| {
                Outcome::updater(|prev| json!({"count": prev["count"].as_i64().unwrap_or(0) + 100}))
            }),
    );

    runtime.dispatcher().dispatch_named("counter.increment", vec![]);
    assert_eq!(runtime.store().select("counter.count"), Some(json!(100)));
}

#[test]
fn reset_then_reuse() {
    let runtime = Runtime::new();
    runtime.register(counter_module());
    runtime.dispatcher().dispatch_named("counter.increment", vec![]);
    runtime.reset();

    runtime.register(counter_module());
    assert_eq!(runtime.store().select("counter.count"), Some(json!(0)));
    runtime.dispatcher().dispatch_named("counter.increment", vec![]);
    assert_eq!(runtime.store().select("counter.count"), Some(json!(1)));
}
