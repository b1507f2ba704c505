use sandpen::{Pane, Playground, PlaygroundConfig, Theme};

#[test]
fn test_run_resets_console_and_background() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.run().expect("run failed");
    assert_eq!(playground.console_output(), "Hello from JavaScript!\n");

    // A run that reports a background but logs nothing: the old log must be
    // gone, the override must be the reported color.
    playground.set_pane(
        Pane::JavaScript,
        "document.body.style.background = 'red';",
    );
    playground.run().expect("run failed");
    assert_eq!(playground.console_output(), "");
    assert_eq!(playground.background_override(), Some("red"));

    // And a run that does neither clears the override again.
    playground.set_pane(Pane::JavaScript, "");
    playground.run().expect("run failed");
    assert_eq!(playground.console_output(), "");
    assert_eq!(playground.background_override(), None);
}

#[test]
fn test_theme_toggle_does_not_rerun_scripts() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.run().expect("run failed");
    assert_eq!(playground.console_output(), "Hello from JavaScript!\n");

    playground.set_theme(Theme::Dark).expect("theme update failed");

    // The document was rebuilt with the dark rule...
    let document = playground.document().expect("no document");
    assert!(document.contains("background: #1a1a1a;"));
    assert!(document.contains("color: #ffffff;"));
    // ...but the JavaScript pane did not run again.
    assert_eq!(playground.console_output(), "Hello from JavaScript!\n");
}

#[test]
fn test_throwing_js_still_renders_markup() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.set_pane(Pane::JavaScript, "throw new Error('boom');");
    let outcome = playground.run().expect("run failed");
    // the error was caught inside the preview, not propagated
    assert!(!outcome.is_error, "outcome: {}", outcome.value);

    let snapshot = playground.preview_snapshot().expect("no snapshot");
    assert!(snapshot.body_html.contains("<h1>Hello, Coder!</h1>"));
    assert!(playground.console_output().contains("Error: boom"));
}

#[test]
fn test_console_message_content_ends_with_newline() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.set_pane(Pane::JavaScript, "console.log('hello');");
    playground.run().expect("run failed");
    assert!(playground.console_output().ends_with("hello\n"));
}

#[test]
fn test_background_override_feeds_next_rebuild() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.set_pane(
        Pane::JavaScript,
        "document.body.style.backgroundColor = 'red';",
    );
    playground.run().expect("run failed");
    assert_eq!(playground.background_override(), Some("red"));

    // A rebuild without re-execution uses the reported color instead of the
    // theme-derived default.
    playground.update_output(false).expect("update failed");
    let document = playground.document().expect("no document");
    assert!(document.contains("background: red;"));
    assert!(!document.contains("background: #ffffff;"));
}

#[test]
fn test_default_panes_end_to_end() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.run().expect("run failed");

    assert_eq!(playground.console_output(), "Hello from JavaScript!\n");
    let snapshot = playground.preview_snapshot().expect("no snapshot");
    assert!(snapshot.body_html.contains("<h1>Hello, Coder!</h1>"));
    assert!(snapshot.text.contains("Hello, Coder!"));
}

#[test]
fn test_jsx_pane_renders_alongside_js_output() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.set_pane(Pane::Jsx, r#"<div id="app"><h2>From JSX</h2></div>"#);
    playground.run().expect("run failed");

    assert_eq!(playground.console_output(), "Hello from JavaScript!\n");
    let snapshot = playground.preview_snapshot().expect("no snapshot");
    assert!(snapshot.body_html.contains("<h1>Hello, Coder!</h1>"));
    assert!(snapshot.body_html.contains(r#"<div id="app"><h2>From JSX</h2></div>"#));
}

#[test]
fn test_jsx_error_does_not_abort_js_pane() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    // references an undefined binding; the transpiled block throws at runtime
    playground.set_pane(Pane::Jsx, "<div>{missing.value}</div>");
    playground.run().expect("run failed");

    // JavaScript pane output is intact and the JSX failure was reported as a
    // console line.
    assert!(playground
        .console_output()
        .starts_with("Hello from JavaScript!\n"));
    assert!(playground.console_output().contains("Error:"));
    let snapshot = playground.preview_snapshot().expect("no snapshot");
    assert!(snapshot.body_html.contains("<h1>Hello, Coder!</h1>"));
}

#[test]
fn test_placeholder_jsx_pane_is_inert() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.run().expect("run failed");
    let document = playground.document().expect("no document");
    assert!(!document.contains("text/babel"));
}

#[test]
fn test_close_tears_down() {
    let mut playground = Playground::new(PlaygroundConfig::default());
    playground.run().expect("run failed");
    playground.close().expect("close failed");
}

#[test]
fn test_close_returns_after_timed_out_run() {
    let config = PlaygroundConfig {
        script_timeout_ms: 200,
        script_loop_iteration_limit: 0,
        ..Default::default()
    };
    let mut playground = Playground::new(config);
    playground.set_pane(Pane::JavaScript, "while (true) {}");
    let outcome = playground.run().expect("run failed");
    assert!(outcome.is_error);

    // a runaway pane must not wedge teardown
    let (done_tx, done_rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        playground.close().expect("close failed");
        let _ = done_tx.send(());
    });
    done_rx
        .recv_timeout(std::time::Duration::from_secs(3))
        .expect("close blocked on the runaway worker");
}
