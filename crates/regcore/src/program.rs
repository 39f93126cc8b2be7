//! Compiled instruction programs.
//!
//! A [`Program`] is a Thompson NFA laid out as a vector of [`Inst`]s. Every
//! instruction names its successors explicitly, so the program can be walked
//! from [`Program::start`] without any positional convention.

use std::fmt;

use regcore_syntax::{AnchorKind, ByteSet};

use crate::flags::{CompileFlags, MatchOptions};

/// Index of an instruction within a program.
pub type InstPtr = usize;

/// A zero-width assertion checked by [`Inst::Assert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Look {
    /// Start of text, or just after `\n` in newline-sensitive mode.
    LineStart,
    /// End of text, or just before `\n` in newline-sensitive mode.
    LineEnd,
}

impl From<AnchorKind> for Look {
    fn from(kind: AnchorKind) -> Self {
        match kind {
            AnchorKind::LineStart => Self::LineStart,
            AnchorKind::LineEnd => Self::LineEnd,
        }
    }
}

impl Look {
    /// Check the assertion at byte offset `at` of `text`.
    #[must_use]
    pub fn holds(self, text: &[u8], at: usize, options: &MatchOptions, newline: bool) -> bool {
        match self {
            Self::LineStart => {
                (at == 0 && !options.not_bol)
                    || (newline && at > 0 && text.get(at - 1) == Some(&b'\n'))
            }
            Self::LineEnd => {
                (at == text.len() && !options.not_eol)
                    || (newline && text.get(at) == Some(&b'\n'))
            }
        }
    }
}

/// One program instruction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Inst {
    /// Consume one byte from the set, then continue at `next`.
    Set {
        /// Accepted bytes.
        set: ByteSet,
        /// Successor.
        next: InstPtr,
    },
    /// Continue at both targets.
    Split(InstPtr, InstPtr),
    /// Continue at the target.
    Jump(InstPtr),
    /// Record the current offset in a capture slot.
    Save {
        /// Slot index; group `i` uses slots `2i` and `2i + 1`.
        slot: usize,
        /// Successor.
        next: InstPtr,
    },
    /// Start an iteration of a repetition that contains capture groups,
    /// extending the iteration history kept in `slot`.
    Iterate {
        /// History slot of the repetition.
        slot: usize,
        /// Successor.
        next: InstPtr,
    },
    /// Finish an iteration. A thread whose iteration matched nothing after
    /// an earlier iteration is dropped.
    Progress {
        /// History slot of the repetition.
        slot: usize,
        /// Successor.
        next: InstPtr,
    },
    /// Continue only if the assertion holds.
    Assert {
        /// The assertion.
        look: Look,
        /// Successor.
        next: InstPtr,
    },
    /// Accept.
    Match,
}

/// A slot the matcher compares when two threads meet, listed in
/// [`Program::tags`] in the order the constructs appear in the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Start slot of a capture group; the end is the following slot.
    Group(usize),
    /// History slot of a repetition whose body contains capture groups.
    Iteration(usize),
}

/// A compiled pattern.
///
/// Programs are immutable once built and are shared read-only between
/// threads. Two compilations of the same pattern with the same flags yield
/// equal programs.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Program {
    pub(crate) insts: Vec<Inst>,
    pub(crate) start: InstPtr,
    pub(crate) subexpression_count: usize,
    pub(crate) slot_count: usize,
    pub(crate) tags: Vec<Tag>,
    pub(crate) flags: CompileFlags,
}

impl Program {
    /// The instructions.
    #[must_use]
    pub fn insts(&self) -> &[Inst] {
        &self.insts
    }

    /// Number of instructions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.insts.len()
    }

    /// Whether the program has no instructions. Never true for a compiled
    /// pattern.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    /// Entry point.
    #[must_use]
    pub const fn start(&self) -> InstPtr {
        self.start
    }

    /// Number of capture groups, excluding the whole match.
    #[must_use]
    pub const fn subexpression_count(&self) -> usize {
        self.subexpression_count
    }

    /// Number of capture slots the matcher tracks per thread.
    #[must_use]
    pub const fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// The slots that decide between competing threads, highest priority
    /// first. The whole match always comes first.
    #[must_use]
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Flags the program was compiled with.
    #[must_use]
    pub const fn flags(&self) -> CompileFlags {
        self.flags
    }

    /// Whether subexpression spans are reported.
    #[must_use]
    pub const fn reports_groups(&self) -> bool {
        !self.flags.contains(CompileFlags::NOSUB)
    }

    /// Whether `^` and `$` also match around `\n`.
    #[must_use]
    pub const fn newline_sensitive(&self) -> bool {
        self.flags.contains(CompileFlags::NEWLINE)
    }
}

impl fmt::Display for Look {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::LineStart => "^",
            Self::LineEnd => "$",
        })
    }
}

impl fmt::Display for Inst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { set, next } => write!(f, "set {set} -> {next}"),
            Self::Split(a, b) => write!(f, "split {a}, {b}"),
            Self::Jump(to) => write!(f, "jmp {to}"),
            Self::Save { slot, next } => write!(f, "save {slot} -> {next}"),
            Self::Iterate { slot, next } => write!(f, "iter {slot} -> {next}"),
            Self::Progress { slot, next } => write!(f, "progress {slot} -> {next}"),
            Self::Assert { look, next } => write!(f, "assert {look} -> {next}"),
            Self::Match => f.write_str("match"),
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pc, inst) in self.insts.iter().enumerate() {
            let marker = if pc == self.start { '>' } else { ' ' };
            writeln!(f, "{marker}{pc:04} {inst}")?;
        }
        Ok(())
    }
}
