use sha2::{Digest, Sha256};

use crate::config::ChunkingConfig;

use super::model::Chunk;

pub fn normalize_text(s: &str) -> String {
    s.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split `text` into overlapping windows of whitespace-delimited tokens.
///
/// Each chunk holds at most `chunk_size` tokens and starts `chunk_overlap`
/// tokens before the previous one ended. A window that does not reach the end
/// of the text is cut after the last sentence-closing token in its final two
/// thirds, when there is one. Chunk text is the original slice of `text`, so
/// line breaks inside a chunk survive.
pub fn chunk_text(text: &str, cfg: &ChunkingConfig) -> Vec<Chunk> {
    let size = cfg.chunk_size.max(1);
    let overlap = cfg.chunk_overlap.min(size - 1);

    let spans = token_spans(text);
    let total = spans.len();

    let mut out = Vec::new();
    let mut start = 0usize;
    while start < total {
        let mut end = (start + size).min(total);
        if end < total {
            if let Some(cut) = sentence_break(text, &spans[start..end], overlap) {
                end = start + cut;
            }
        }

        let slice = &text[spans[start].0..spans[end - 1].1];
        out.push(make_chunk(out.len() as u32, slice, start, end));

        if end == total {
            break;
        }
        let step = end - start;
        start = if step > overlap { end - overlap } else { end };
    }
    out
}

/// Byte ranges of whitespace-delimited tokens, in order.
fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut open: Option<usize> = None;
    for (i, ch) in text.char_indices() {
        if ch.is_whitespace() {
            if let Some(s) = open.take() {
                out.push((s, i));
            }
        } else if open.is_none() {
            open = Some(i);
        }
    }
    if let Some(s) = open {
        out.push((s, text.len()));
    }
    out
}

/// Token count to keep from `window`, ending on a sentence. The cut is always
/// longer than `overlap` so the next window still starts inside this one.
fn sentence_break(text: &str, window: &[(usize, usize)], overlap: usize) -> Option<usize> {
    let min = (window.len() / 3).max(overlap);
    (min..window.len())
        .rev()
        .find(|&i| ends_sentence(&text[window[i].0..window[i].1]))
        .map(|i| i + 1)
}

fn ends_sentence(token: &str) -> bool {
    let t = token.trim_end_matches(|c: char| matches!(c, '"' | '\'' | ')' | ']' | '\u{201d}' | '\u{2019}'));
    t.ends_with(|c: char| matches!(c, '.' | '!' | '?'))
}

fn make_chunk(ordinal: u32, text: &str, start: usize, end: usize) -> Chunk {
    let text_sha256 = sha256_hex(text.as_bytes());
    let chunk_id = sha256_hex(format!("ordinal={ordinal}\ntext_sha256={text_sha256}").as_bytes());
    Chunk {
        chunk_id,
        ordinal,
        text: text.to_string(),
        text_sha256,
        token_count: (end - start).min(u32::MAX as usize) as u32,
        start_token: start.min(u32::MAX as usize) as u32,
        end_token: end.min(u32::MAX as usize) as u32,
    }
}

pub(crate) fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}
