//! Recursive expansion of mini-notation expressions into slot grids.
//!
//! Time allocation always divides a parent span evenly among its children
//! with `round(i * total / n)` boundaries, so child spans partition the
//! parent exactly — no gaps, no overlaps. The rounding rule must match the
//! renderer's own subdivision or step grids drift visually from playback.

/// One discrete event produced by expansion: the literal token that fired,
/// the slot it starts on, and how many slots it spans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedEvent {
    pub label: String,
    pub start_step: usize,
    pub duration: usize,
}

/// Split an expression on top-level commas (parallel layers).
///
/// Commas inside `[ ]`, `< >` or `{ }` belong to nested groups and are left
/// alone. Nesting is unbounded, so this is a depth-counting pass.
pub fn split_layers(expr: &str) -> Vec<String> {
    let mut layers = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    for ch in expr.chars() {
        match ch {
            '[' | '<' | '{' => {
                depth += 1;
                cur.push(ch);
            }
            ']' | '>' | '}' => {
                depth -= 1;
                cur.push(ch);
            }
            ',' if depth == 0 => {
                if !cur.trim().is_empty() {
                    layers.push(cur.trim().to_string());
                }
                cur.clear();
            }
            _ => cur.push(ch),
        }
    }
    if !cur.trim().is_empty() {
        layers.push(cur.trim().to_string());
    }
    layers
}

/// Split an expression on top-level whitespace (sequential terms).
pub fn split_terms(expr: &str) -> Vec<String> {
    let mut terms = Vec::new();
    let mut depth = 0i32;
    let mut cur = String::new();
    for ch in expr.chars() {
        match ch {
            '[' | '<' | '{' => {
                depth += 1;
                cur.push(ch);
            }
            ']' | '>' | '}' => {
                depth -= 1;
                cur.push(ch);
            }
            c if c.is_whitespace() && depth == 0 => {
                if !cur.trim().is_empty() {
                    terms.push(cur.trim().to_string());
                }
                cur.clear();
            }
            _ => cur.push(ch),
        }
    }
    if !cur.trim().is_empty() {
        terms.push(cur.trim().to_string());
    }
    terms
}

/// Slot boundary for child `i` of `n` children over `total` slots.
fn boundary(i: usize, total: usize, n: usize) -> usize {
    (i as f64 * total as f64 / n as f64).round() as usize
}

/// Detect a top-level repeat suffix `base*N`. Returns `None` for malformed
/// repeats (missing or non-numeric count), which then fall through to the
/// literal path.
fn split_repeat(token: &str) -> Option<(&str, usize)> {
    let idx = token.rfind('*')?;
    let count = &token[idx + 1..];
    if count.is_empty() || !count.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    // The `*` must sit at nesting depth 0.
    let mut depth = 0i32;
    for ch in token[..idx].chars() {
        match ch {
            '[' | '<' | '{' => depth += 1,
            ']' | '>' | '}' => depth -= 1,
            _ => {}
        }
    }
    if depth != 0 {
        return None;
    }
    let base = token[..idx].trim();
    let n: usize = count.parse().ok()?;
    if base.is_empty() || n == 0 {
        return None;
    }
    Some((base, n))
}

fn strip_wrapper(token: &str, open: char, close: char) -> Option<&str> {
    let t = token.trim();
    if !(t.starts_with(open) && t.ends_with(close)) {
        return None;
    }
    // Reject e.g. "[a] [b]" where the brackets are two separate groups.
    let mut depth = 0i32;
    for (i, ch) in t.char_indices() {
        match ch {
            '[' | '<' | '{' => depth += 1,
            ']' | '>' | '}' => depth -= 1,
            _ => {}
        }
        if depth == 0 && i + ch.len_utf8() < t.len() {
            return None;
        }
    }
    Some(&t[open.len_utf8()..t.len() - close.len_utf8()])
}

/// Expand an expression into a hit grid of `total_slots` booleans.
///
/// Never fails: an empty or all-rest expression yields all-false, and
/// anything unrecognized occupies the first slot of its span.
pub fn expand_steps(expr: &str, total_slots: usize) -> Vec<bool> {
    let mut grid = vec![false; total_slots];
    fill_steps(expr, &mut grid);
    grid
}

fn fill_steps(token: &str, span: &mut [bool]) {
    let token = token.trim();
    let total = span.len();
    if token.is_empty() || token == "~" || total == 0 {
        return;
    }

    // Parallel children inside a group: same span, hits merged.
    let layers = split_layers(token);
    if layers.len() > 1 {
        for layer in &layers {
            fill_steps(layer, span);
        }
        return;
    }

    if let Some((base, n)) = split_repeat(token) {
        if !base.contains(' ') && !base.starts_with('[') && !base.starts_with('<') {
            // Simple literal repeat: n evenly spaced hits.
            for i in 0..n {
                let pos = boundary(i, total, n);
                if pos < total {
                    span[pos] = true;
                }
            }
        } else {
            for i in 0..n {
                let (s, e) = (boundary(i, total, n), boundary(i + 1, total, n));
                fill_steps(base, &mut span[s..e.min(total)]);
            }
        }
        return;
    }

    if let Some(inner) = strip_wrapper(token, '[', ']') {
        fill_steps(inner, span);
        return;
    }
    if let Some(inner) = strip_wrapper(token, '<', '>') {
        // Alternation picks one child per cycle; the preview renders the first.
        let children = split_terms(inner);
        if let Some(first) = children.first() {
            fill_steps(first, span);
        }
        return;
    }

    let terms = split_terms(token);
    if terms.len() <= 1 {
        match terms.first() {
            None => {}
            Some(t) if t == "~" => {}
            // Repeat and wrapper forms were already tried; whatever is left
            // is a literal (possibly malformed) occupying its first slot.
            Some(_) => span[0] = true,
        }
        return;
    }
    for (i, term) in terms.iter().enumerate() {
        let (s, e) = (boundary(i, total, terms.len()), boundary(i + 1, total, terms.len()));
        if e > s {
            fill_steps(term, &mut span[s..e.min(total)]);
        }
    }
}

/// Expand an expression into timed events over `total_slots` slots.
///
/// Each literal occupying a span `[s, e)` produces an event starting at `s`
/// lasting `e - s` slots. Parallel children share their span.
pub fn expand_events(expr: &str, total_slots: usize) -> Vec<TimedEvent> {
    let mut events = Vec::new();
    fill_events(expr, 0, total_slots, &mut events);
    events
}

fn fill_events(token: &str, start: usize, len: usize, out: &mut Vec<TimedEvent>) {
    let token = token.trim();
    if token.is_empty() || token == "~" || len == 0 {
        return;
    }

    let layers = split_layers(token);
    if layers.len() > 1 {
        for layer in &layers {
            fill_events(layer, start, len, out);
        }
        return;
    }

    if let Some((base, n)) = split_repeat(token) {
        for i in 0..n {
            let (s, e) = (boundary(i, len, n), boundary(i + 1, len, n));
            fill_events(base, start + s, e.saturating_sub(s), out);
        }
        return;
    }

    if let Some(inner) = strip_wrapper(token, '[', ']') {
        fill_events(inner, start, len, out);
        return;
    }
    if let Some(inner) = strip_wrapper(token, '<', '>') {
        let children = split_terms(inner);
        if let Some(first) = children.first() {
            fill_events(first, start, len, out);
        }
        return;
    }

    let terms = split_terms(token);
    if terms.len() <= 1 {
        match terms.first() {
            None => {}
            Some(t) if t == "~" => {}
            Some(t) if t.contains(['[', '<', '*']) => {
                // Malformed repeat or unbalanced group: single-slot placeholder.
                out.push(TimedEvent {
                    label: t.clone(),
                    start_step: start,
                    duration: 1,
                });
            }
            Some(t) => out.push(TimedEvent {
                label: t.clone(),
                start_step: start,
                duration: len,
            }),
        }
        return;
    }
    for (i, term) in terms.iter().enumerate() {
        let (s, e) = (boundary(i, len, terms.len()), boundary(i + 1, len, terms.len()));
        if e > s {
            fill_events(term, start + s, e - s, out);
        }
    }
}
