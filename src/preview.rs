//! Preview: the isolated rendering context.
//!
//! Each injected document gets a fresh `boa_engine::Context` on a dedicated
//! worker thread; replacing the preview content tears the old context down
//! wholesale, which is what guarantees a clean execution environment per run.
//! The bridge's `__sandpen_post` native forwards message envelopes to the
//! controller over an mpsc channel.

use crate::transpile;
use crate::{Envelope, Error, PlaygroundConfig, PreviewSnapshot, Result, ScriptOutcome};
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Mutex, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

// Maps a live context (by address) to the channel its bridge posts into.
static BRIDGE_POST_REG: OnceLock<Mutex<HashMap<usize, Sender<Envelope>>>> = OnceLock::new();

// Native function backing `__sandpen_post(json)` inside the preview context.
fn bridge_post_native(
    _this: &boa_engine::JsValue,
    args: &[boa_engine::JsValue],
    ctx: &mut boa_engine::Context,
) -> boa_engine::JsResult<boa_engine::JsValue> {
    let ptr = ctx as *const _ as usize;
    let map = BRIDGE_POST_REG.get_or_init(|| Mutex::new(HashMap::new()));
    if let Ok(lock) = map.lock() {
        if let Some(tx) = lock.get(&ptr) {
            let raw = args
                .first()
                .and_then(|v| v.as_string())
                .map(|s| s.to_std_string_escaped())
                .unwrap_or_default();
            match serde_json::from_str::<Envelope>(&raw) {
                // Fire-and-forget: a send after the subscription is gone is
                // silently dropped.
                Ok(envelope) => {
                    let _ = tx.send(envelope);
                }
                Err(e) => log::warn!("malformed bridge payload {:?}: {}", raw, e),
            }
        }
    }
    Ok(boa_engine::JsValue::undefined())
}

// Removes a context's registry entry when the run leaves scope, so the map
// cannot retain senders for contexts that stopped existing.
struct RegistryGuard {
    ptr: usize,
}

impl Drop for RegistryGuard {
    fn drop(&mut self) {
        if let Some(map) = BRIDGE_POST_REG.get() {
            if let Ok(mut lock) = map.lock() {
                lock.remove(&self.ptr);
            }
        }
    }
}

struct RunResult {
    outcome: ScriptOutcome,
    snapshot: PreviewSnapshot,
}

/// Receiving end of the bridge channel, owned by the controller.
///
/// Dropping the subscription unsubscribes: envelopes posted afterwards are
/// discarded at the sending side.
pub struct BridgeSubscription {
    rx: Receiver<Envelope>,
}

impl BridgeSubscription {
    /// Next pending envelope, if any. Never blocks.
    pub fn try_next(&self) -> Option<Envelope> {
        self.rx.try_recv().ok()
    }
}

/// The preview container: holds the latest snapshot and the worker executing
/// the most recently injected document.
pub struct Preview {
    config: PlaygroundConfig,
    bridge_tx: Sender<Envelope>,
    worker: Option<JoinHandle<()>>,
    snapshot: Option<PreviewSnapshot>,
}

impl Preview {
    /// Create a preview and the subscription its bridge messages arrive on.
    pub fn new(config: PlaygroundConfig) -> (Self, BridgeSubscription) {
        let (bridge_tx, rx) = mpsc::channel();
        (
            Self {
                config,
                bridge_tx,
                worker: None,
                snapshot: None,
            },
            BridgeSubscription { rx },
        )
    }

    /// Replace the preview content with a freshly synthesized document and
    /// wait for its scripts to settle.
    ///
    /// The previous worker is abandoned rather than signalled: its context
    /// dies with its thread, and anything it posts before dying carries the
    /// old run tag. A run that exceeds the configured timeout yields an
    /// erroneous outcome and a snapshot of the static markup.
    pub fn inject(&mut self, document: &str, run_id: u64) -> Result<ScriptOutcome> {
        self.worker.take();

        log::debug!("injecting run {} ({} bytes)", run_id, document.len());
        let (resp_tx, resp_rx) = mpsc::channel::<RunResult>();
        let doc = document.to_string();
        let config = self.config.clone();
        let bridge_tx = self.bridge_tx.clone();
        self.worker = Some(std::thread::spawn(move || {
            let result = execute(&doc, run_id, &config, bridge_tx);
            let _ = resp_tx.send(result);
        }));

        match resp_rx.recv_timeout(Duration::from_millis(self.config.script_timeout_ms)) {
            Ok(result) => {
                self.snapshot = Some(result.snapshot);
                Ok(result.outcome)
            }
            Err(RecvTimeoutError::Timeout) => {
                // abandon the runaway worker now; holding its handle would
                // make close() block on a thread that may never finish
                self.worker = None;
                self.snapshot = Some(static_snapshot(document, run_id));
                Ok(ScriptOutcome {
                    value: format!("Script timed out after {}ms", self.config.script_timeout_ms),
                    is_error: true,
                })
            }
            Err(e) => Err(Error::ScriptError(format!(
                "preview worker hung up: {}",
                e
            ))),
        }
    }

    /// Latest settled snapshot, if a document has been injected.
    pub fn snapshot(&self) -> Option<&PreviewSnapshot> {
        self.snapshot.as_ref()
    }

    /// Tear the preview down, waiting for a settled worker to finish.
    pub fn close(self) -> Result<()> {
        if let Some(handle) = self.worker {
            let _ = handle.join();
        }
        Ok(())
    }
}

// Parse the synthesized document and run its script elements in one fresh
// context. Script elements are failure-independent: an eval error in one is
// recorded but does not stop the next.
fn execute(
    document: &str,
    run_id: u64,
    config: &PlaygroundConfig,
    bridge_tx: Sender<Envelope>,
) -> RunResult {
    let parsed = Html::parse_document(document);
    let body_sel = Selector::parse("body").unwrap();
    let script_sel = Selector::parse("script").unwrap();

    let static_body = parsed
        .select(&body_sel)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default();

    if !config.enable_javascript {
        return RunResult {
            outcome: ScriptOutcome {
                value: String::new(),
                is_error: false,
            },
            snapshot: snapshot_from_body(static_body, run_id),
        };
    }

    let mut ctx = boa_engine::Context::default();
    if config.script_loop_iteration_limit > 0 {
        ctx.runtime_limits_mut()
            .set_loop_iteration_limit(config.script_loop_iteration_limit);
    }
    if config.script_recursion_limit < usize::MAX {
        ctx.runtime_limits_mut()
            .set_recursion_limit(config.script_recursion_limit);
    }

    let nf = boa_engine::native_function::NativeFunction::from_fn_ptr(
        bridge_post_native as boa_engine::native_function::NativeFunctionPointer,
    );
    let _ = ctx.register_global_builtin_callable(boa_engine::js_string!("__sandpen_post"), 1, nf);

    let ptr = &ctx as *const _ as usize;
    let map = BRIDGE_POST_REG.get_or_init(|| Mutex::new(HashMap::new()));
    if let Ok(mut lock) = map.lock() {
        lock.insert(ptr, bridge_tx);
    }
    let _registry_guard = RegistryGuard { ptr };

    let mut failure: Option<String> = None;
    for node in parsed.select(&script_sel) {
        let source = node.text().collect::<String>();
        let kind = node.value().attr("type").unwrap_or("text/javascript");
        let code = if kind == "text/babel" {
            wrap_transpiled(&transpile::transpile(&source))
        } else {
            source
        };
        if let Err(e) = ctx.eval(boa_engine::Source::from_bytes(code.as_bytes())) {
            if failure.is_none() {
                failure = Some(format!("Script thrown: {}", e));
            }
        }
    }

    let body_html = match ctx.eval(boa_engine::Source::from_bytes(
        "document.body.innerHTML".as_bytes(),
    )) {
        Ok(value) => value
            .as_string()
            .map(|s| s.to_std_string_escaped())
            .unwrap_or_else(|| static_body.clone()),
        Err(_) => static_body.clone(),
    };

    let is_error = failure.is_some();
    RunResult {
        outcome: ScriptOutcome {
            value: failure.unwrap_or_default(),
            is_error,
        },
        snapshot: snapshot_from_body(body_html, run_id),
    }
}

// A transpiled block runs in its own failure-isolating scope, independent of
// the JavaScript pane's script element.
fn wrap_transpiled(code: &str) -> String {
    format!(
        "(function () {{\ntry {{\n{}\n}} catch (e) {{\nconsole.log('Error:', e && e.message ? e.message : String(e));\n}}\n}})();",
        code
    )
}

fn snapshot_from_body(body_html: String, run: u64) -> PreviewSnapshot {
    let text = Html::parse_fragment(&body_html)
        .root_element()
        .text()
        .collect::<String>();
    PreviewSnapshot {
        body_html,
        text,
        run,
    }
}

// Snapshot of the markup as synthesized, used when scripts never settled.
fn static_snapshot(document: &str, run: u64) -> PreviewSnapshot {
    let parsed = Html::parse_document(document);
    let body_sel = Selector::parse("body").unwrap();
    let body_html = parsed
        .select(&body_sel)
        .next()
        .map(|body| body.inner_html())
        .unwrap_or_default();
    snapshot_from_body(body_html, run)
}
