//! Text rendering of a [`Timeline`].
//!
//! Every item becomes a block with a spine column. Blocks stack vertically
//! aligned on their spines; branches sit side by side under a fork bar.
//!
//! ```text
//!    ╭───────────────╮
//!    │ Start Process │
//!    ╰───────────────╯
//!            │
//!            ▼
//!       ┌──────────┐
//!       ◆ Decision ◆
//!       └──────────┘
//!            │
//!      ┌─────┴──────┐
//!      │            │
//!   Approved      Path
//! ```

use super::canvas::{BoxStyle, Canvas};
use super::charset::{Arms, BoxChars};
use crate::config::TimelineConfig;
use crate::layout::timeline::{Timeline, TimelineItem, TimelineNode};
use crate::model::NodeType;

pub fn render_timeline(timeline: &Timeline, config: &TimelineConfig) -> String {
    let bc = BoxChars::for_charset(config.charset);
    let painter = Painter {
        bc,
        gap: config.branch_gap,
    };
    let mut out = painter.items(&timeline.items).canvas.render_to_string();
    if !timeline.unreachable.is_empty() {
        out.push_str(&format!("\nunreachable: {}\n", timeline.unreachable.join(", ")));
    }
    out
}

// ─── Blocks ──────────────────────────────────────────────────────────────────

struct Block {
    canvas: Canvas,
    /// Column of the spine.
    spine: usize,
}

impl Block {
    fn empty() -> Self {
        Self {
            canvas: Canvas::new(0, 0),
            spine: 0,
        }
    }

    fn text(s: &str) -> Self {
        let width = s.chars().count();
        let mut canvas = Canvas::new(width, 1);
        canvas.write_str(0, 0, s);
        Self {
            canvas,
            spine: width / 2,
        }
    }

    /// Stack blocks top to bottom with their spines aligned.
    fn stack(blocks: Vec<Block>) -> Self {
        let left = blocks.iter().map(|b| b.spine).max().unwrap_or(0);
        let right = blocks
            .iter()
            .map(|b| b.canvas.width.saturating_sub(b.spine))
            .max()
            .unwrap_or(0);
        let height = blocks.iter().map(|b| b.canvas.height).sum();
        let mut canvas = Canvas::new(left + right, height);
        let mut row = 0;
        for b in &blocks {
            canvas.blit(&b.canvas, left - b.spine, row);
            row += b.canvas.height;
        }
        Self { canvas, spine: left }
    }
}

struct Painter {
    bc: BoxChars,
    gap: usize,
}

impl Painter {
    fn items(&self, items: &[TimelineItem]) -> Block {
        if items.is_empty() {
            return Block::empty();
        }
        Block::stack(items.iter().map(|item| self.item(item)).collect())
    }

    fn item(&self, item: &TimelineItem) -> Block {
        match item {
            TimelineItem::Node(node) => self.node(node),
            TimelineItem::Connector => self.connector(),
            TimelineItem::Jump(target) => self.jump(target),
            TimelineItem::Branches(branches) => {
                let columns = branches
                    .iter()
                    .map(|b| {
                        let mut parts = vec![self.pipe(), Block::text(&b.label), self.connector()];
                        if !b.items.is_empty() {
                            parts.push(self.items(&b.items));
                        }
                        Block::stack(parts)
                    })
                    .collect();
                self.fork(columns)
            }
        }
    }

    fn node(&self, node: &TimelineNode) -> Block {
        let style = match node.node_type {
            NodeType::Start | NodeType::End => BoxStyle::Rounded,
            NodeType::Decision => BoxStyle::Decision,
            NodeType::Process | NodeType::Document => BoxStyle::Square,
        };
        let label = if node.label.is_empty() {
            node.id.as_str()
        } else {
            node.label.as_str()
        };
        let width = label.chars().count() + 4;
        let mut canvas = Canvas::new(width, 3);
        canvas.draw_box(0, 0, width, 3, style, &self.bc);
        canvas.write_str(2, 1, label);
        Block {
            canvas,
            spine: width / 2,
        }
    }

    fn pipe(&self) -> Block {
        let mut canvas = Canvas::new(1, 1);
        canvas.set(0, 0, self.bc.vertical);
        Block { canvas, spine: 0 }
    }

    fn connector(&self) -> Block {
        let mut canvas = Canvas::new(1, 2);
        canvas.set(0, 0, self.bc.vertical);
        canvas.set(0, 1, self.bc.arrow_down);
        Block { canvas, spine: 0 }
    }

    fn jump(&self, target: &str) -> Block {
        let text = format!("{}{} {}", self.bc.bottom_left, self.bc.arrow_right, target);
        let mut canvas = Canvas::new(text.chars().count(), 2);
        canvas.set(0, 0, self.bc.vertical);
        canvas.write_str(0, 1, &text);
        Block { canvas, spine: 0 }
    }

    /// Columns side by side under a bar joining their spines.
    fn fork(&self, columns: Vec<Block>) -> Block {
        let mut x = 0;
        let mut spines = Vec::with_capacity(columns.len());
        let mut offsets = Vec::with_capacity(columns.len());
        for col in &columns {
            offsets.push(x);
            spines.push(x + col.spine);
            x += col.canvas.width + self.gap;
        }
        let width = x.saturating_sub(self.gap);
        let body = columns.iter().map(|c| c.canvas.height).max().unwrap_or(0);
        let (first, last) = match (spines.first(), spines.last()) {
            (Some(&f), Some(&l)) => (f, l),
            _ => return Block::empty(),
        };
        let trunk = (first + last) / 2;

        let mut canvas = Canvas::new(width, body + 2);
        canvas.set(trunk, 0, self.bc.vertical);
        for c in first..=last {
            let arms = Arms {
                up: c == trunk,
                down: spines.contains(&c),
                left: c > first,
                right: c < last,
            };
            canvas.set_arms(c, 1, arms, &self.bc);
        }
        for (col, &off) in columns.iter().zip(&offsets) {
            canvas.blit(&col.canvas, off, 2);
        }
        Block {
            canvas,
            spine: trunk,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::timeline::layout_graph;
    use crate::model::StepRegistry;
    use crate::parsers::parse;
    use crate::renderers::charset::CharSet;
    use crate::structured::to_structured;

    fn render(src: &str, config: &TimelineConfig) -> String {
        let graph = to_structured(&parse(src), StepRegistry::new(&[]));
        let timeline = layout_graph(&graph, config).unwrap();
        render_timeline(&timeline, config)
    }

    #[test]
    fn test_linear_timeline() {
        let out = render(
            "flowchart TD\n  Start([Start]) --> a[Apply]\n  a --> End([Done])",
            &TimelineConfig::default(),
        );
        let expected = "\
╭───────╮
│ Start │
╰───────╯
    │
    ▼
┌───────┐
│ Apply │
└───────┘
    │
    ▼
╭──────╮
│ Done │
╰──────╯
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_branch_labels_side_by_side() {
        let config = TimelineConfig {
            charset: CharSet::Ascii,
            ..TimelineConfig::default()
        };
        let out = render(
            "flowchart TD\n  Start([Go]) --> d{Ok}\n  d -->|Yes| y[Y]\n  d --> n[N]",
            &config,
        );
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines.iter().any(|l| l.contains("<  Ok  >") || l.contains("< Ok >")));
        let labels = lines.iter().find(|l| l.contains("Yes")).unwrap();
        assert!(labels.contains("Path"));
        assert!(labels.find("Yes").unwrap() < labels.find("Path").unwrap());
        assert!(lines.iter().any(|l| l.trim().starts_with('+') && l.contains("-+-")));
    }

    #[test]
    fn test_merge_point_rendered_as_jump() {
        let out = render(
            "Start([S]) --> a[A]\nStart --> b[B]\na --> m[M]\nb --> m",
            &TimelineConfig::default(),
        );
        assert_eq!(out.matches("│ M │").count(), 1);
        assert!(out.contains("└► m"));
    }

    #[test]
    fn test_unreachable_footer() {
        let out = render("Start([S]) --> a[A]\nisland[I]", &TimelineConfig::default());
        assert!(out.ends_with("unreachable: island\n"));
    }
}
