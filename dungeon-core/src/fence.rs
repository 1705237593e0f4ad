//! Scanner for the fenced JSON state block in model output.
//!
//! The model terminates its reply with a fenced block carrying state
//! changes. The grammar, line-oriented:
//!
//! ```text
//! block      := open-line payload close-line
//! open-line  := ws* "```json" ws* newline
//! payload    := one or more lines (the JSON object text)
//! close-line := ws* "```" ws* (newline | end-of-input)
//! ```
//!
//! Only the first block is recognized; an open fence with no matching
//! close line is not a block. The payload is validated as JSON later,
//! at merge time.

/// Result of scanning model text for a state block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extraction {
    /// The reply text with the block (fences included) removed and
    /// surrounding whitespace trimmed.
    pub narrative: String,
    /// The raw payload between the fences, if a block was found.
    pub delta: Option<String>,
}

/// Scan `text` for the first fenced JSON block.
pub fn extract_state_block(text: &str) -> Extraction {
    let Some(block) = find_block(text) else {
        return Extraction {
            narrative: text.to_string(),
            delta: None,
        };
    };

    let mut narrative = String::with_capacity(text.len());
    narrative.push_str(&text[..block.start]);
    narrative.push_str(&text[block.end..]);

    Extraction {
        narrative: narrative.trim().to_string(),
        delta: Some(text[block.payload_start..block.payload_end].trim().to_string()),
    }
}

struct Block {
    start: usize,
    end: usize,
    payload_start: usize,
    payload_end: usize,
}

fn find_block(text: &str) -> Option<Block> {
    let mut lines = line_spans(text);

    let open = lines.find(|&(start, end)| text[start..end].trim() == "```json")?;
    let close = lines.find(|&(start, end)| text[start..end].trim() == "```")?;

    // The payload must be a single JSON object, which the grammar can
    // only check shallowly here: at least one line, starting with '{'
    // and ending with '}'. Full parsing happens at merge time.
    let payload = text[line_content_end(text, open)..close.0].trim();
    if !payload.starts_with('{') || !payload.ends_with('}') {
        return None;
    }

    Some(Block {
        start: open.0,
        end: line_content_end(text, close),
        payload_start: line_content_end(text, open),
        payload_end: close.0,
    })
}

/// Iterator over (start, end) byte spans of each line, end excluding
/// the newline.
fn line_spans(text: &str) -> impl Iterator<Item = (usize, usize)> + '_ {
    let mut pos = 0;
    std::iter::from_fn(move || {
        if pos > text.len() {
            return None;
        }
        let start = pos;
        let end = match text[pos..].find('\n') {
            Some(offset) => pos + offset,
            None => {
                pos = text.len() + 1;
                return Some((start, text.len()));
            }
        };
        pos = end + 1;
        Some((start, end))
    })
}

/// End of the line including its trailing newline, if present.
fn line_content_end(text: &str, span: (usize, usize)) -> usize {
    if span.1 < text.len() {
        span.1 + 1
    } else {
        span.1
    }
}
