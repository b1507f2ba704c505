//! Playground Controller: owns the pane sources, theme, console log and
//! background override, and drives the preview.

use crate::document::render_document;
use crate::preview::{BridgeSubscription, Preview};
use crate::{
    BridgeMessage, Envelope, Error, Pane, Panes, PlaygroundConfig, PreviewSnapshot, Result,
    ScriptOutcome, Theme,
};

/// The playground: per-pane source text, current theme, accumulated console
/// output, the detected background override, and the preview it renders into.
///
/// All state lives for the lifetime of this value; nothing is persisted.
/// Bridge messages are applied only by the message pump, and the log and
/// override are reset only at run start.
pub struct Playground {
    panes: Panes,
    theme: Theme,
    console_log: String,
    background_override: Option<String>,
    run_id: u64,
    last_document: Option<String>,
    preview: Preview,
    subscription: BridgeSubscription,
}

impl Playground {
    pub fn new(config: PlaygroundConfig) -> Self {
        let theme = config.theme;
        let (preview, subscription) = Preview::new(config);
        Self {
            panes: Panes::default(),
            theme,
            console_log: String::new(),
            background_override: None,
            run_id: 0,
            last_document: None,
            preview,
            subscription,
        }
    }

    /// One user-triggered run: clear the console log and background override,
    /// then rebuild and execute the preview.
    pub fn run(&mut self) -> Result<ScriptOutcome> {
        self.console_log.clear();
        self.background_override = None;
        self.update_output(true)
    }

    /// Rebuild the preview document from current state and inject it.
    ///
    /// The preview context is torn down and recreated on every call. When
    /// `execute_js` is false the bridge is still injected but the JavaScript
    /// pane body is not, so user code is not re-run merely because the theme
    /// toggled.
    pub fn update_output(&mut self, execute_js: bool) -> Result<ScriptOutcome> {
        self.run_id += 1;
        let document = render_document(
            &self.panes,
            self.theme,
            self.background_override.as_deref(),
            self.run_id,
            execute_js,
        );
        let outcome = self.preview.inject(&document, self.run_id)?;
        self.last_document = Some(document);
        self.pump_messages();
        Ok(outcome)
    }

    /// Switch themes. A change rebuilds the preview without re-executing the
    /// JavaScript pane.
    pub fn set_theme(&mut self, theme: Theme) -> Result<()> {
        if theme != self.theme {
            self.theme = theme;
            self.update_output(false)?;
        }
        Ok(())
    }

    /// Apply every pending bridge envelope. Envelopes from superseded runs
    /// are discarded.
    pub fn pump_messages(&mut self) {
        while let Some(envelope) = self.subscription.try_next() {
            self.handle_envelope(envelope);
        }
    }

    fn handle_envelope(&mut self, envelope: Envelope) {
        if envelope.run != self.run_id {
            log::debug!(
                "discarding bridge message from stale run {} (current {})",
                envelope.run,
                self.run_id
            );
            return;
        }
        match envelope.message {
            BridgeMessage::Console { content } => {
                self.console_log.push_str(&content);
                self.console_log.push('\n');
            }
            BridgeMessage::Background { color } => {
                self.background_override = Some(color);
            }
        }
    }

    pub fn set_pane(&mut self, pane: Pane, text: impl Into<String>) {
        self.panes.set(pane, text);
    }

    pub fn pane(&self, pane: Pane) -> &str {
        self.panes.get(pane)
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    /// Accumulated console panel text: one line per console message.
    pub fn console_output(&self) -> &str {
        &self.console_log
    }

    /// Background color most recently reported by the preview, if any. Feeds
    /// into the next document rebuild in place of the theme background.
    pub fn background_override(&self) -> Option<&str> {
        self.background_override.as_deref()
    }

    /// The document string most recently injected into the preview.
    pub fn document(&self) -> Option<&str> {
        self.last_document.as_deref()
    }

    /// Identifier of the currently active run.
    pub fn run_id(&self) -> u64 {
        self.run_id
    }

    /// What the preview currently shows.
    pub fn preview_snapshot(&self) -> Result<&PreviewSnapshot> {
        self.preview
            .snapshot()
            .ok_or_else(|| Error::RenderError("No document injected".into()))
    }

    /// Tear down the preview and the message subscription.
    pub fn close(self) -> Result<()> {
        drop(self.subscription);
        self.preview.close()
    }
}
