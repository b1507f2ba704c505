//! Embedded JSX transpiler for the optional `text/babel` script block.
//!
//! Lowers a pane consisting of a single top-level JSX element into calls to
//! the bridge's `__jsx` markup builder, mounted with `__mount`. Anything the
//! lowering does not recognize passes through unchanged, so a malformed pane
//! surfaces as an ordinary caught script error inside the preview instead of
//! a build failure.

/// Lower a JSX pane to plain JavaScript.
///
/// Supported shape: optional leading blank lines and `//` comments, then one
/// element with string or `{expr}` attributes, nested elements, text and
/// `{expr}` children, and an optional trailing semicolon. `className`
/// attributes are mapped to `class` by the runtime helper.
pub fn transpile(source: &str) -> String {
    let body = strip_leading_trivia(source);
    if !body.starts_with('<') || body.starts_with("<!") {
        return source.to_string();
    }

    let mut cursor = Cursor::new(body);
    match parse_element(&mut cursor) {
        Some(expr) if only_trailing_semicolon(cursor.rest()) => format!("__mount({});", expr),
        _ => source.to_string(),
    }
}

fn only_trailing_semicolon(rest: &str) -> bool {
    rest.trim().trim_end_matches(';').trim().is_empty()
}

fn strip_leading_trivia(source: &str) -> &str {
    let mut rest = source;
    loop {
        let trimmed = rest.trim_start();
        if let Some(after) = trimmed.strip_prefix("//") {
            rest = after.split_once('\n').map(|(_, tail)| tail).unwrap_or("");
        } else {
            return trimmed;
        }
    }
}

struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn eat(&mut self, token: &str) -> bool {
        if self.rest().starts_with(token) {
            self.pos += token.len();
            true
        } else {
            false
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    // Identifier as used by tags and attribute names (letters, digits, '-', '_')
    fn ident(&mut self) -> Option<&'a str> {
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            self.bump();
        }
        if self.pos == start {
            None
        } else {
            Some(&self.src[start..self.pos])
        }
    }

    // Consume a single-quoted or double-quoted literal, returning its body.
    fn quoted(&mut self, quote: char) -> Option<&'a str> {
        if self.bump() != Some(quote) {
            return None;
        }
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if c == quote => {
                    let body = &self.src[start..self.pos];
                    self.bump();
                    return Some(body);
                }
                Some(_) => {
                    self.bump();
                }
                None => return None,
            }
        }
    }

    // Consume `{ ... }` with balanced braces, returning the inner expression.
    fn braced(&mut self) -> Option<&'a str> {
        if self.bump() != Some('{') {
            return None;
        }
        let start = self.pos;
        let mut depth = 1usize;
        loop {
            match self.bump() {
                Some('{') => depth += 1,
                Some('}') => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(&self.src[start..self.pos - 1]);
                    }
                }
                Some(_) => {}
                None => return None,
            }
        }
    }
}

// One JSX element, lowered to a `__jsx(tag, props, ...children)` expression.
fn parse_element(cursor: &mut Cursor) -> Option<String> {
    if !cursor.eat("<") {
        return None;
    }
    let tag = cursor.ident()?;

    let mut props: Vec<(String, String)> = Vec::new();
    loop {
        cursor.skip_whitespace();
        if cursor.eat("/>") {
            return Some(emit(tag, &props, &[]));
        }
        if cursor.eat(">") {
            break;
        }
        let name = cursor.ident()?;
        cursor.skip_whitespace();
        let value = if cursor.eat("=") {
            cursor.skip_whitespace();
            match cursor.peek()? {
                '"' => literal(cursor.quoted('"')?),
                '\'' => literal(cursor.quoted('\'')?),
                '{' => cursor.braced()?.trim().to_string(),
                _ => return None,
            }
        } else {
            "true".to_string()
        };
        props.push((name.to_string(), value));
    }

    let mut children: Vec<String> = Vec::new();
    loop {
        if cursor.rest().starts_with("</") {
            cursor.eat("</");
            let close = cursor.ident()?;
            if close != tag {
                return None;
            }
            cursor.skip_whitespace();
            if !cursor.eat(">") {
                return None;
            }
            break;
        }
        match cursor.peek()? {
            '<' => children.push(parse_element(cursor)?),
            '{' => {
                let expr = cursor.braced()?.trim().to_string();
                if !expr.is_empty() {
                    children.push(expr);
                }
            }
            _ => {
                let start = cursor.pos;
                while matches!(cursor.peek(), Some(c) if c != '<' && c != '{') {
                    cursor.bump();
                }
                let text = &cursor.src[start..cursor.pos];
                if !text.trim().is_empty() {
                    children.push(literal(text));
                }
            }
        }
    }

    Some(emit(tag, &props, &children))
}

fn literal(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

fn emit(tag: &str, props: &[(String, String)], children: &[String]) -> String {
    let props_expr = if props.is_empty() {
        "null".to_string()
    } else {
        let pairs: Vec<String> = props
            .iter()
            .map(|(name, value)| format!("{}: {}", literal(name), value))
            .collect();
        format!("{{{}}}", pairs.join(", "))
    };
    let mut out = format!("__jsx({}, {}", literal(tag), props_expr);
    for child in children {
        out.push_str(", ");
        out.push_str(child);
    }
    out.push(')');
    out
}
