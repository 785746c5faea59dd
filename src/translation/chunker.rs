/*!
 * Splitting extracted text into bounded-size chunks.
 *
 * Every chunk remembers the separator that followed it in the source text,
 * so joining `text + separator` over all chunks in order reproduces the
 * input exactly. Limits are counted in characters (not bytes) or in
 * whitespace-delimited words depending on the strategy.
 */

/// Separator following a chunk that ended on a line boundary
pub const LINE_SEPARATOR: &str = "\n";

/// Separator following a chunk that was cut at a raw offset, and the last chunk
pub const NO_SEPARATOR: &str = "";

/// How text is split into chunks
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkStrategy {
    /// Pack whole lines up to a character limit
    Lines { max_chars: usize },
    /// Pack whole lines up to a word-count limit
    Words { max_words: usize },
    /// Fixed character windows at raw offsets
    Window { max_chars: usize },
}

impl ChunkStrategy {
    /// The configured size limit
    pub fn limit(&self) -> usize {
        match *self {
            Self::Lines { max_chars } | Self::Window { max_chars } => max_chars,
            Self::Words { max_words } => max_words,
        }
    }

    /// Size of `text` in this strategy's unit
    pub fn measure(&self, text: &str) -> usize {
        match self {
            Self::Lines { .. } | Self::Window { .. } => text.chars().count(),
            Self::Words { .. } => text.split_whitespace().count(),
        }
    }
}

impl Default for ChunkStrategy {
    fn default() -> Self {
        Self::Lines { max_chars: 1000 }
    }
}

/// One ordered unit of text sent as a single translation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based position in the document
    pub index: usize,
    /// Source text of this chunk
    pub text: String,
    /// Delimiter that followed this chunk in the source text
    pub separator: &'static str,
}

impl Chunk {
    /// Whether the chunk has nothing worth translating
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Split `text` into chunks using the given strategy
///
/// Returns an empty vector for empty input. A zero limit is treated as one
/// so the function always terminates; configuration validation rejects it
/// before a run starts.
pub fn split_into_chunks(text: &str, strategy: ChunkStrategy) -> Vec<Chunk> {
    if text.is_empty() {
        return Vec::new();
    }

    let pieces = match strategy {
        ChunkStrategy::Window { max_chars } => split_window(text, max_chars.max(1))
            .into_iter()
            .map(|piece| (piece, NO_SEPARATOR))
            .collect::<Vec<_>>(),
        ChunkStrategy::Lines { .. } | ChunkStrategy::Words { .. } => pack_lines(text, strategy),
    };

    let last = pieces.len().saturating_sub(1);
    pieces
        .into_iter()
        .enumerate()
        .map(|(index, (text, separator))| Chunk {
            index,
            text: text.to_string(),
            separator: if index == last { NO_SEPARATOR } else { separator },
        })
        .collect()
}

/// Join per-chunk outputs using each chunk's original separator
///
/// `outputs[i]` belongs to `chunks[i]`; extra outputs are ignored.
pub fn reassemble<S: AsRef<str>>(chunks: &[Chunk], outputs: &[S]) -> String {
    let mut result = String::new();
    for (chunk, output) in chunks.iter().zip(outputs) {
        result.push_str(output.as_ref());
        result.push_str(chunk.separator);
    }
    result
}

// Greedy line packing shared by the boundary-preserving strategies
fn pack_lines(text: &str, strategy: ChunkStrategy) -> Vec<(&str, &'static str)> {
    let limit = strategy.limit().max(1);
    // A newline costs one character when measuring in chars, nothing when counting words
    let join_cost = match strategy {
        ChunkStrategy::Words { .. } => 0,
        _ => 1,
    };

    let mut out = Vec::new();
    // Byte range of the chunk being built, and its measured size
    let mut current: Option<(usize, usize)> = None;
    let mut current_size = 0;
    let mut offset = 0;

    for line in text.split('\n') {
        let start = offset;
        let end = start + line.len();
        offset = end + 1;

        let size = strategy.measure(line);

        if size > limit {
            if let Some((s, e)) = current.take() {
                out.push((&text[s..e], LINE_SEPARATOR));
            }
            let pieces = split_oversized(line, strategy, limit);
            let (last, head) = match pieces.split_last() {
                Some(split) => split,
                None => continue,
            };
            for piece in head {
                out.push((*piece, NO_SEPARATOR));
            }
            let last_start = end - last.len();
            current = Some((last_start, end));
            current_size = strategy.measure(last);
            continue;
        }

        match current {
            Some((s, _)) if current_size + join_cost + size <= limit => {
                current = Some((s, end));
                current_size += join_cost + size;
            }
            Some((s, e)) => {
                out.push((&text[s..e], LINE_SEPARATOR));
                current = Some((start, end));
                current_size = size;
            }
            None => {
                current = Some((start, end));
                current_size = size;
            }
        }
    }

    if let Some((s, e)) = current {
        out.push((&text[s..e], NO_SEPARATOR));
    }

    out
}

// Break a single line that exceeds the limit on its own
fn split_oversized(line: &str, strategy: ChunkStrategy, limit: usize) -> Vec<&str> {
    match strategy {
        ChunkStrategy::Words { .. } => split_words(line, limit),
        _ => split_chars_at_whitespace(line, limit),
    }
}

fn split_chars_at_whitespace(line: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line;

    while let Some((cut, _)) = rest.char_indices().nth(max_chars) {
        let window = &rest[..cut];
        let pos = match window.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
            Some((idx, c)) => idx + c.len_utf8(),
            None => cut,
        };
        pieces.push(&rest[..pos]);
        rest = &rest[pos..];
    }

    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

fn split_words(line: &str, max_words: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = line;

    while rest.split_whitespace().count() > max_words {
        let mut count = 0;
        let mut in_word = false;
        let mut cut = rest.len();

        for (idx, c) in rest.char_indices() {
            if c.is_whitespace() {
                in_word = false;
            } else if !in_word {
                in_word = true;
                count += 1;
                if count > max_words {
                    cut = idx;
                    break;
                }
            }
        }

        pieces.push(&rest[..cut]);
        rest = &rest[cut..];
    }

    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}

fn split_window(text: &str, max_chars: usize) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;

    while let Some((cut, _)) = rest.char_indices().nth(max_chars) {
        pieces.push(&rest[..cut]);
        rest = &rest[cut..];
    }

    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}
