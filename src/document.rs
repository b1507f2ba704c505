//! Preview Renderer: synthesizes the self-contained document injected into
//! the preview context.
//!
//! Rendering is pure string templating and cannot fail; nothing in any pane
//! is validated or sanitized before embedding. The operator is the only
//! author of the code being previewed, so the isolated context is the only
//! safety boundary by design.

use crate::{Panes, Theme, DEFAULT_JSX};

/// Instrumentation bridge template, embedded verbatim into every document
/// after token substitution.
const BRIDGE_TEMPLATE: &str = include_str!("bridge.js");

/// Build the complete preview document from the current pane contents.
///
/// The `<style>` block combines the theme/override body rule with the user
/// CSS pane; the body carries the user HTML pane followed by the bridge
/// script. When `execute_js` is false the bridge is still injected but the
/// JavaScript pane body is substituted empty, so a theme-only refresh does
/// not re-run user code. A live JSX pane adds a `text/babel` script block
/// carrying its raw source.
pub fn render_document(
    panes: &Panes,
    theme: Theme,
    background_override: Option<&str>,
    run_id: u64,
    execute_js: bool,
) -> String {
    let background = background_override
        .filter(|color| !color.is_empty())
        .unwrap_or_else(|| theme.background());
    let user_js = if execute_js { panes.js.as_str() } else { "" };

    let run_token = run_id.to_string();
    let pane_literal =
        serde_json::to_string(&panes.html).unwrap_or_else(|_| "\"\"".to_string());
    let bridge = substitute(
        BRIDGE_TEMPLATE,
        &[
            ("__RUN_ID__", run_token.as_str()),
            ("__PANE_HTML__", pane_literal.as_str()),
            ("__USER_JS__", user_js),
        ],
    );

    let jsx_block = if jsx_is_live(&panes.jsx) {
        format!("\n<script type=\"text/babel\">\n{}\n</script>", panes.jsx)
    } else {
        String::new()
    };

    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <style>\n\
         body {{\n\
         \x20 margin: 0;\n\
         \x20 background: {background};\n\
         \x20 color: {foreground};\n\
         }}\n\
         {css}\n\
         </style>\n\
         </head>\n\
         <body>\n\
         {html}\n\
         <script>\n\
         {bridge}\n\
         </script>{jsx_block}\n\
         </body>\n\
         </html>\n",
        background = background,
        foreground = theme.foreground(),
        css = panes.css,
        html = panes.html,
        bridge = bridge,
        jsx_block = jsx_block,
    )
}

/// Replace every token in a single left-to-right pass. Substituted text is
/// never rescanned, so a pane containing a token-shaped string stays
/// verbatim instead of being rewritten by a later substitution.
fn substitute(template: &str, tokens: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    loop {
        let hit = tokens
            .iter()
            .filter_map(|(token, value)| rest.find(token).map(|at| (at, *token, *value)))
            .min_by_key(|(at, _, _)| *at);
        match hit {
            Some((at, token, value)) => {
                out.push_str(&rest[..at]);
                out.push_str(value);
                rest = &rest[at + token.len()..];
            }
            None => {
                out.push_str(rest);
                return out;
            }
        }
    }
}

/// A JSX pane participates only when non-empty and different from its
/// placeholder.
pub fn jsx_is_live(jsx: &str) -> bool {
    let trimmed = jsx.trim();
    !trimmed.is_empty() && trimmed != DEFAULT_JSX.trim()
}
