//! Abstract syntax tree for parsed patterns.

use std::fmt;

use crate::class::ByteSet;

/// Zero-width assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnchorKind {
    /// `^`: start of text, or after a newline in newline-sensitive mode.
    LineStart,
    /// `$`: end of text, or before a newline in newline-sensitive mode.
    LineEnd,
}

/// A node of the pattern syntax tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ast {
    /// Matches the empty string, e.g. `()` or an empty alternative.
    Empty,

    /// Matches exactly one byte from the set.
    Literal(ByteSet),

    /// Matches each child in sequence.
    Concat(Vec<Ast>),

    /// Matches any one of the children.
    Alternation(Vec<Ast>),

    /// Matches the child between `min` and `max` times (`None` = unbounded).
    Repetition {
        /// The repeated expression.
        child: Box<Ast>,
        /// Minimum number of iterations.
        min: u32,
        /// Maximum number of iterations, unbounded when `None`.
        max: Option<u32>,
        /// Greedy repetition. Always true in the POSIX dialects.
        greedy: bool,
    },

    /// A parenthesized subexpression.
    Group {
        /// The grouped expression.
        child: Box<Ast>,
        /// 1-based capture index, `None` for non-capturing groups.
        index: Option<u32>,
    },

    /// A zero-width assertion.
    Anchor(AnchorKind),
}

impl Ast {
    /// Create a literal node for a single byte.
    #[must_use]
    pub const fn byte(b: u8) -> Self {
        Self::Literal(ByteSet::single(b))
    }

    /// Create a greedy repetition node.
    #[must_use]
    pub fn repeat(child: Self, min: u32, max: Option<u32>) -> Self {
        Self::Repetition {
            child: Box::new(child),
            min,
            max,
            greedy: true,
        }
    }

    /// Create a capturing group node.
    #[must_use]
    pub fn group(child: Self, index: u32) -> Self {
        Self::Group {
            child: Box::new(child),
            index: Some(index),
        }
    }

    /// Build a concatenation, collapsing the trivial cases.
    #[must_use]
    pub fn concat(mut items: Vec<Self>) -> Self {
        match items.len() {
            0 => Self::Empty,
            1 => items.pop().unwrap_or(Self::Empty),
            _ => Self::Concat(items),
        }
    }

    /// Build an alternation, collapsing the single-branch case.
    #[must_use]
    pub fn alternation(mut branches: Vec<Self>) -> Self {
        match branches.len() {
            0 => Self::Empty,
            1 => branches.pop().unwrap_or(Self::Empty),
            _ => Self::Alternation(branches),
        }
    }

    /// Count the capturing groups in the tree.
    #[must_use]
    pub fn capture_count(&self) -> usize {
        let mut count = 0;
        self.walk(&mut |node| {
            if let Self::Group { index: Some(_), .. } = node {
                count += 1;
            }
        });
        count
    }

    /// The largest capture index in the tree, 0 when there are none.
    #[must_use]
    pub fn max_capture_index(&self) -> u32 {
        let mut max = 0;
        self.walk(&mut |node| {
            if let Self::Group { index: Some(i), .. } = node {
                max = max.max(*i);
            }
        });
        max
    }

    /// Check whether the node can match the empty string.
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        match self {
            Self::Empty | Self::Anchor(_) => true,
            Self::Literal(_) => false,
            Self::Concat(items) => items.iter().all(Self::is_nullable),
            Self::Alternation(branches) => branches.iter().any(Self::is_nullable),
            Self::Repetition { child, min, .. } => *min == 0 || child.is_nullable(),
            Self::Group { child, .. } => child.is_nullable(),
        }
    }

    /// Tree depth, counting this node as 1.
    #[must_use]
    pub fn depth(&self) -> usize {
        1 + match self {
            Self::Empty | Self::Literal(_) | Self::Anchor(_) => 0,
            Self::Concat(items) | Self::Alternation(items) => {
                items.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Repetition { child, .. } | Self::Group { child, .. } => child.depth(),
        }
    }

    /// Visit every node in pre-order.
    pub fn walk(&self, f: &mut impl FnMut(&Self)) {
        f(self);
        match self {
            Self::Concat(items) | Self::Alternation(items) => {
                for item in items {
                    item.walk(f);
                }
            }
            Self::Repetition { child, .. } | Self::Group { child, .. } => child.walk(f),
            Self::Empty | Self::Literal(_) | Self::Anchor(_) => {}
        }
    }
}

/// Renders the tree back as an ERE. Non-capturing groups print as plain
/// parentheses, so re-parsing the output can renumber captures.
impl fmt::Display for Ast {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Literal(set) => {
                if let Some(b) = set.as_single() {
                    if b"\\.[]()*+?{}|^$".contains(&b) {
                        write!(f, "\\{}", b as char)
                    } else {
                        write!(f, "{set}")
                    }
                } else {
                    write!(f, "{set}")
                }
            }
            Self::Concat(items) => items.iter().try_for_each(|item| match item {
                Self::Alternation(_) => write!(f, "({item})"),
                _ => write!(f, "{item}"),
            }),
            Self::Alternation(branches) => {
                for (i, branch) in branches.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "{branch}")?;
                }
                Ok(())
            }
            Self::Repetition {
                child, min, max, ..
            } => {
                match child.as_ref() {
                    Self::Literal(_) | Self::Group { .. } => write!(f, "{child}")?,
                    _ => write!(f, "({child})")?,
                }
                match (min, max) {
                    (0, None) => f.write_str("*"),
                    (1, None) => f.write_str("+"),
                    (0, Some(1)) => f.write_str("?"),
                    (m, None) => write!(f, "{{{m},}}"),
                    (m, Some(n)) if m == n => write!(f, "{{{m}}}"),
                    (m, Some(n)) => write!(f, "{{{m},{n}}}"),
                }
            }
            Self::Group { child, .. } => write!(f, "({child})"),
            Self::Anchor(AnchorKind::LineStart) => f.write_str("^"),
            Self::Anchor(AnchorKind::LineEnd) => f.write_str("$"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concat_collapses() {
        assert_eq!(Ast::concat(vec![]), Ast::Empty);
        assert_eq!(Ast::concat(vec![Ast::byte(b'a')]), Ast::byte(b'a'));
        assert!(matches!(
            Ast::concat(vec![Ast::byte(b'a'), Ast::byte(b'b')]),
            Ast::Concat(_)
        ));
    }

    #[test]
    fn capture_counting() {
        let ast = Ast::concat(vec![
            Ast::group(Ast::byte(b'a'), 1),
            Ast::group(
                Ast::concat(vec![Ast::byte(b'b'), Ast::group(Ast::byte(b'c'), 3)]),
                2,
            ),
        ]);
        assert_eq!(ast.capture_count(), 3);
        assert_eq!(ast.max_capture_index(), 3);
    }

    #[test]
    fn nullable() {
        assert!(Ast::repeat(Ast::byte(b'a'), 0, None).is_nullable());
        assert!(!Ast::repeat(Ast::byte(b'a'), 1, None).is_nullable());
        assert!(Ast::alternation(vec![Ast::byte(b'a'), Ast::Empty]).is_nullable());
        assert!(Ast::Anchor(AnchorKind::LineStart).is_nullable());
    }

    #[test]
    fn display_round_trip_shape() {
        let ast = Ast::concat(vec![
            Ast::Anchor(AnchorKind::LineStart),
            Ast::repeat(Ast::group(Ast::byte(b'a'), 1), 2, Some(3)),
            Ast::byte(b'.'),
            Ast::Anchor(AnchorKind::LineEnd),
        ]);
        assert_eq!(ast.to_string(), r"^(a){2,3}\.$");
    }
}
