//! Sandpen
//!
//! A headless live-code playground engine: HTML, CSS, JavaScript (and
//! optionally JSX) panes are combined into a single document which is
//! executed inside an isolated JavaScript context. Console output and
//! background-style writes performed by the executed code are forwarded back
//! to the controller as messages.
//!
//! The preview context is torn down and recreated wholesale on every update,
//! which guarantees a clean execution environment per run: timers, globals
//! and listeners from the previous run are discarded along with the old
//! context.
//!
//! # Example
//!
//! ```no_run
//! use sandpen::{Pane, Playground, PlaygroundConfig};
//!
//! # fn main() -> sandpen::Result<()> {
//! let mut playground = Playground::new(PlaygroundConfig::default());
//! playground.set_pane(Pane::JavaScript, "console.log('hi', 1 + 1);");
//! playground.run()?;
//! assert_eq!(playground.console_output(), "hi 2\n");
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

pub mod error;
pub use error::{Error, Result};

pub mod controller;
pub mod document;
pub mod preview;
pub mod transpile;

pub use controller::Playground;
pub use preview::{BridgeSubscription, Preview};

/// Default content of the HTML pane
pub const DEFAULT_HTML: &str = "<h1>Hello, Coder!</h1>";
/// Default content of the CSS pane
pub const DEFAULT_CSS: &str = "body { font-family: sans-serif; padding: 20px; }";
/// Default content of the JavaScript pane
pub const DEFAULT_JS: &str = "console.log(\"Hello from JavaScript!\");";
/// Placeholder content of the JSX pane; a pane equal to this is not injected
pub const DEFAULT_JSX: &str = "// Write JSX here (optional)";

/// Configuration for a playground instance
///
/// The defaults mirror what a fresh playground session looks like: light
/// theme, JavaScript enabled, and conservative runtime limits so a runaway
/// pane cannot wedge the controller.
#[derive(Debug, Clone)]
pub struct PlaygroundConfig {
    /// Initial theme for the preview document
    pub theme: Theme,
    /// Whether to execute scripts embedded in the preview document
    pub enable_javascript: bool,
    /// How long to wait for an injected run to settle, in milliseconds
    pub script_timeout_ms: u64,
    /// Maximum loop iterations before the context throws (0 => disabled)
    pub script_loop_iteration_limit: u64,
    /// Maximum recursion depth before the context throws (usize::MAX => disabled)
    pub script_recursion_limit: usize,
}

impl Default for PlaygroundConfig {
    fn default() -> Self {
        Self {
            theme: Theme::Light,
            enable_javascript: true,
            script_timeout_ms: 5000,
            script_loop_iteration_limit: 1_000_000,
            script_recursion_limit: 1024,
        }
    }
}

/// Preview color theme; owned by the embedding application, read here
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    /// Theme-derived body background color
    pub fn background(self) -> &'static str {
        match self {
            Theme::Light => "#ffffff",
            Theme::Dark => "#1a1a1a",
        }
    }

    /// Theme-derived body foreground color
    pub fn foreground(self) -> &'static str {
        match self {
            Theme::Light => "#000000",
            Theme::Dark => "#ffffff",
        }
    }
}

/// One editable source buffer feeding into the combined preview
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Html,
    Css,
    JavaScript,
    Jsx,
}

impl Pane {
    /// Language label of the pane, as an editor widget would display it
    pub fn language(self) -> &'static str {
        match self {
            Pane::Html => "html",
            Pane::Css => "css",
            Pane::JavaScript => "javascript",
            Pane::Jsx => "jsx",
        }
    }
}

/// Current source text for every pane
///
/// Exactly one current value per pane; each is replaced wholesale on every
/// editor change notification.
#[derive(Debug, Clone)]
pub struct Panes {
    pub html: String,
    pub css: String,
    pub js: String,
    pub jsx: String,
}

impl Default for Panes {
    fn default() -> Self {
        Self {
            html: DEFAULT_HTML.to_string(),
            css: DEFAULT_CSS.to_string(),
            js: DEFAULT_JS.to_string(),
            jsx: DEFAULT_JSX.to_string(),
        }
    }
}

impl Panes {
    pub fn get(&self, pane: Pane) -> &str {
        match pane {
            Pane::Html => &self.html,
            Pane::Css => &self.css,
            Pane::JavaScript => &self.js,
            Pane::Jsx => &self.jsx,
        }
    }

    pub fn set(&mut self, pane: Pane, text: impl Into<String>) {
        let text = text.into();
        match pane {
            Pane::Html => self.html = text,
            Pane::Css => self.css = text,
            Pane::JavaScript => self.js = text,
            Pane::Jsx => self.jsx = text,
        }
    }
}

/// Message posted by the instrumentation bridge from inside the preview
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum BridgeMessage {
    /// A `console.log` call; `content` is the space-joined argument list
    Console { content: String },
    /// A write to `document.body.style.background`/`backgroundColor`
    Background { color: String },
}

/// Wire form of a bridge message, tagged with the run that produced it
///
/// The controller discards envelopes whose `run` does not match the active
/// run, so late output from a superseded preview context cannot leak into the
/// current console panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub run: u64,
    #[serde(flatten)]
    pub message: BridgeMessage,
}

/// Result of executing the scripts embedded in one injected document
#[derive(Debug, Clone)]
pub struct ScriptOutcome {
    /// Error detail when `is_error` is set, empty otherwise
    pub value: String,
    /// Whether any script element failed to evaluate (or the run timed out)
    pub is_error: bool,
}

/// What the preview currently shows
///
/// `body_html` is the live body markup after scripts ran (so it includes
/// markup mounted by a transpiled JSX pane); `text` is the visible text
/// extracted from it.
#[derive(Debug, Clone)]
pub struct PreviewSnapshot {
    pub body_html: String,
    pub text: String,
    /// Run that produced this snapshot
    pub run: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlaygroundConfig::default();
        assert_eq!(config.theme, Theme::Light);
        assert!(config.enable_javascript);
        assert_eq!(config.script_timeout_ms, 5000);
    }

    #[test]
    fn test_theme_colors() {
        assert_eq!(Theme::Dark.background(), "#1a1a1a");
        assert_eq!(Theme::Dark.foreground(), "#ffffff");
        assert_eq!(Theme::Light.background(), "#ffffff");
        assert_eq!(Theme::Light.foreground(), "#000000");
    }

    #[test]
    fn test_default_panes() {
        let panes = Panes::default();
        assert_eq!(panes.get(Pane::Html), DEFAULT_HTML);
        assert_eq!(panes.get(Pane::JavaScript), DEFAULT_JS);
        assert_eq!(panes.get(Pane::Jsx), DEFAULT_JSX);
    }

    #[test]
    fn test_envelope_wire_schema() {
        let env = Envelope {
            run: 3,
            message: BridgeMessage::Console {
                content: "hello".to_string(),
            },
        };
        let value = serde_json::to_value(&env).expect("serialize");
        assert_eq!(
            value,
            serde_json::json!({"run": 3, "type": "console", "content": "hello"})
        );

        let parsed: Envelope =
            serde_json::from_str(r#"{"run":7,"type":"background","color":"red"}"#)
                .expect("deserialize");
        assert_eq!(parsed.run, 7);
        assert_eq!(
            parsed.message,
            BridgeMessage::Background {
                color: "red".to_string()
            }
        );
    }
}
