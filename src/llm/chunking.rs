/// Approximate words per token for English prose
const WORDS_PER_TOKEN: f64 = 0.75;

/// Bounds on how content is split before semantic extraction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChunkingConfig {
    /// Target chunk size in tokens
    pub threshold: usize,

    /// Fraction of each chunk repeated at the start of the next one
    pub overlap_rate: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            threshold: 1500,
            overlap_rate: 0.1,
        }
    }
}

impl ChunkingConfig {
    /// Chunk size in words
    pub fn words_per_chunk(&self) -> usize {
        ((self.threshold as f64 * WORDS_PER_TOKEN) as usize).max(1)
    }

    /// Words carried over between consecutive chunks
    pub fn overlap_words(&self) -> usize {
        (self.words_per_chunk() as f64 * self.overlap_rate) as usize
    }
}

/// Splits content into line-aligned chunks of roughly `threshold` tokens
///
/// Consecutive chunks share trailing lines worth about `overlap_rate` of a
/// chunk, so a record straddling a boundary appears whole in one of them.
/// A single line longer than a chunk becomes its own chunk.
pub fn split_into_chunks(content: &str, config: &ChunkingConfig) -> Vec<String> {
    let limit = config.words_per_chunk();
    let overlap = config.overlap_words();

    let lines: Vec<(&str, usize)> = content
        .lines()
        .map(|line| (line, line.split_whitespace().count()))
        .collect();

    let mut chunks = Vec::new();
    let mut current: Vec<(&str, usize)> = Vec::new();
    let mut current_words = 0;

    for (line, words) in lines {
        if current_words + words > limit && current_words > 0 {
            chunks.push(join_lines(&current));

            // Seed the next chunk with the overlap tail
            let mut tail = Vec::new();
            let mut tail_words = 0;
            for &(prev, prev_words) in current.iter().rev() {
                if prev_words == 0 || tail_words + prev_words > overlap {
                    break;
                }
                tail_words += prev_words;
                tail.push((prev, prev_words));
            }
            tail.reverse();
            current = tail;
            current_words = tail_words;
        }

        current.push((line, words));
        current_words += words;
    }

    if current_words > 0 {
        chunks.push(join_lines(&current));
    }

    chunks
}

fn join_lines(lines: &[(&str, usize)]) -> String {
    lines
        .iter()
        .map(|(line, _)| *line)
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(threshold: usize, overlap_rate: f64) -> ChunkingConfig {
        ChunkingConfig {
            threshold,
            overlap_rate,
        }
    }

    #[test]
    fn test_short_content_is_one_chunk() {
        let chunks = split_into_chunks("Ann Ray\nBo Diaz", &ChunkingConfig::default());
        assert_eq!(chunks, vec!["Ann Ray\nBo Diaz".to_string()]);
    }

    #[test]
    fn test_empty_content_has_no_chunks() {
        assert!(split_into_chunks("  \n\n", &ChunkingConfig::default()).is_empty());
    }

    #[test]
    fn test_long_content_is_split_with_overlap() {
        // 8 words per chunk, 4 words of overlap
        let cfg = config(11, 0.5);
        assert_eq!(cfg.words_per_chunk(), 8);
        assert_eq!(cfg.overlap_words(), 4);

        let content = "a1 a2\nb1 b2\nc1 c2\nd1 d2\ne1 e2\nf1 f2";
        let chunks = split_into_chunks(content, &cfg);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], "a1 a2\nb1 b2\nc1 c2\nd1 d2");
        assert_eq!(chunks[1], "c1 c2\nd1 d2\ne1 e2\nf1 f2");
    }

    #[test]
    fn test_oversized_line_stands_alone() {
        let cfg = config(4, 0.0);
        let content = "one two three four five six\nseven";
        let chunks = split_into_chunks(content, &cfg);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1], "seven");
    }
}
