//! Markdown rendering of page lines.
//!
//! The output feeds heading detection: lines set in a heading size become
//! `#` headings, predominantly bold lines become `**…**` lines, and any
//! other text is emitted as plain paragraphs.

use crate::parser::{FontStatistics, TextLine};

/// Renders the lines of one page to Markdown.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    max_heading_level: u8,
}

/// Kind of a rendered block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    Heading(u8),
    Bold,
    Paragraph,
}

impl MarkdownRenderer {
    /// Create a renderer emitting at most `max_heading_level` `#` markers.
    pub fn new(max_heading_level: u8) -> Self {
        Self {
            max_heading_level: max_heading_level.clamp(1, 6),
        }
    }

    /// Render lines (top to bottom) using document-wide font statistics.
    pub fn render_lines(&self, lines: &[TextLine], stats: &FontStatistics) -> String {
        let mut output = String::new();
        let mut current: Option<(BlockKind, String)> = None;
        let mut prev_line: Option<&TextLine> = None;

        for line in lines {
            let text = line.text();
            let text = text.trim();
            if text.is_empty() {
                continue;
            }

            let kind = self.classify(line, stats);

            // Wrapped headings and paragraphs continue the previous block
            let continues = match (&current, prev_line) {
                (Some((prev_kind, _)), Some(prev)) => {
                    *prev_kind == kind
                        && kind != BlockKind::Bold
                        && (line.y - prev.y) <= line.font_size.max(prev.font_size) * 2.0
                }
                _ => false,
            };

            if continues {
                if let Some((_, block)) = current.as_mut() {
                    block.push(if kind == BlockKind::Paragraph { '\n' } else { ' ' });
                    block.push_str(text);
                }
            } else {
                if let Some((prev_kind, block)) = current.take() {
                    self.render_block(&mut output, prev_kind, &block);
                }
                current = Some((kind, text.to_string()));
            }

            prev_line = Some(line);
        }

        if let Some((kind, block)) = current {
            self.render_block(&mut output, kind, &block);
        }

        output.trim_end().to_string()
    }

    fn classify(&self, line: &TextLine, stats: &FontStatistics) -> BlockKind {
        let level = stats.heading_level(line.font_size);
        if level > 0 {
            BlockKind::Heading(level.min(self.max_heading_level))
        } else if line.is_bold() {
            BlockKind::Bold
        } else {
            BlockKind::Paragraph
        }
    }

    fn render_block(&self, output: &mut String, kind: BlockKind, text: &str) {
        match kind {
            BlockKind::Heading(level) => {
                output.push_str(&"#".repeat(level as usize));
                output.push(' ');
                output.push_str(text);
            }
            BlockKind::Bold => {
                output.push_str("**");
                output.push_str(text);
                output.push_str("**");
            }
            BlockKind::Paragraph => {
                for (i, line) in text.lines().enumerate() {
                    if i > 0 {
                        output.push('\n');
                    }
                    // Keep body text from reading as a heading
                    if line.starts_with('#') {
                        output.push('\\');
                    }
                    output.push_str(line);
                }
            }
        }
        output.push_str("\n\n");
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new(6)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextRun;
    use crate::parser::group_runs_into_lines;

    fn stats() -> FontStatistics {
        let mut stats = FontStatistics::default();
        stats.add_size(10.0, 2000);
        stats.add_size(20.0, 40);
        stats.add_size(14.0, 80);
        stats.analyze();
        stats
    }

    #[test]
    fn test_headings_and_paragraphs() {
        let runs = vec![
            TextRun::new("Introduction", 20.0).at(72.0, 80.0),
            TextRun::new("Body text starts here", 10.0).at(72.0, 120.0),
            TextRun::new("and continues.", 10.0).at(72.0, 132.0),
            TextRun::new("Scope", 14.0).at(72.0, 170.0),
        ];
        let lines = group_runs_into_lines(&runs);

        let markdown = MarkdownRenderer::default().render_lines(&lines, &stats());
        assert_eq!(
            markdown,
            "# Introduction\n\nBody text starts here\nand continues.\n\n## Scope"
        );
    }

    #[test]
    fn test_wrapped_heading_is_joined() {
        let runs = vec![
            TextRun::new("A Very Long", 20.0).at(72.0, 80.0),
            TextRun::new("Document Title", 20.0).at(72.0, 104.0),
        ];
        let lines = group_runs_into_lines(&runs);

        let markdown = MarkdownRenderer::default().render_lines(&lines, &stats());
        assert_eq!(markdown, "# A Very Long Document Title");
    }

    #[test]
    fn test_bold_lines() {
        let runs = vec![
            TextRun::new("Ingredients", 10.0).bold().at(72.0, 80.0),
            TextRun::new("Two eggs", 10.0).at(72.0, 92.0),
        ];
        let lines = group_runs_into_lines(&runs);

        let markdown = MarkdownRenderer::default().render_lines(&lines, &stats());
        assert_eq!(markdown, "**Ingredients**\n\nTwo eggs");
    }

    #[test]
    fn test_max_heading_level() {
        let runs = vec![TextRun::new("Scope", 14.0).at(72.0, 80.0)];
        let lines = group_runs_into_lines(&runs);

        let markdown = MarkdownRenderer::new(1).render_lines(&lines, &stats());
        assert_eq!(markdown, "# Scope");
    }

    #[test]
    fn test_hash_in_body_is_escaped() {
        let runs = vec![TextRun::new("# not a heading", 10.0).at(72.0, 80.0)];
        let lines = group_runs_into_lines(&runs);

        let markdown = MarkdownRenderer::default().render_lines(&lines, &stats());
        assert_eq!(markdown, "\\# not a heading");
    }
}
