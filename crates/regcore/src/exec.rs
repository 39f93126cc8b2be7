//! NFA simulation.
//!
//! A Pike VM: every active instruction carries its own capture slots, and
//! the text is scanned once, left to right. When two threads reach the same
//! instruction only the POSIX-preferred one survives, so the work per byte
//! is bounded by the program size.
//!
//! The program is never mutated; all scratch space lives in a caller-owned
//! [`MatchState`], so one program can be searched from many threads at once.

mod history;
mod sparse;
mod threads;

use self::history::History;
use self::threads::{Slot, Threads, preferred};
use crate::error::{LimitKind, RegexError, Result};
use crate::flags::MatchOptions;
use crate::program::{Inst, InstPtr, Program};
use crate::span::{MatchResult, Span};

/// Scratch space for searching one program.
///
/// A state can be reused across searches and programs; it resizes itself as
/// needed.
#[derive(Debug, Clone, Default)]
pub struct MatchState {
    curr: Threads,
    next: Threads,
    work: Work,
    best: Vec<Slot>,
}

/// Where a pending thread takes its slots from.
#[derive(Debug, Clone, Copy)]
enum Source {
    /// The seed buffer.
    Seed,
    /// The thread already recorded at this instruction.
    Thread(InstPtr),
}

/// A slot update applied when a pending thread is taken up.
#[derive(Debug, Clone, Copy)]
enum Effect {
    Save(usize),
    Iterate(usize),
}

#[derive(Debug, Clone, Copy)]
struct Frame {
    pc: InstPtr,
    from: Source,
    effect: Option<Effect>,
}

#[derive(Debug, Clone, Default)]
struct Work {
    stack: Vec<Frame>,
    seed: Vec<Slot>,
    slots: Vec<Slot>,
    history: History,
    steps: u64,
    step_limit: Option<u64>,
}

/// Inputs shared by every step of one search.
struct Search<'a> {
    program: &'a Program,
    text: &'a [u8],
    options: &'a MatchOptions,
    newline: bool,
}

impl MatchState {
    /// Create a state sized for `program`.
    #[must_use]
    pub fn new(program: &Program) -> Self {
        let stride = program.slot_count();
        Self {
            curr: Threads::new(program.len(), stride),
            next: Threads::new(program.len(), stride),
            work: Work {
                seed: vec![None; stride],
                slots: vec![None; stride],
                ..Work::default()
            },
            best: vec![None; stride],
        }
    }

    /// Bound the work of each search; `None` removes the bound.
    #[must_use]
    pub const fn with_step_limit(mut self, limit: Option<u64>) -> Self {
        self.work.step_limit = limit;
        self
    }

    /// Change the work bound.
    pub const fn set_step_limit(&mut self, limit: Option<u64>) {
        self.work.step_limit = limit;
    }

    /// Work units spent by the most recent search.
    #[must_use]
    pub const fn steps(&self) -> u64 {
        self.work.steps
    }

    fn prepare(&mut self, program: &Program) {
        let stride = program.slot_count();
        self.curr.resize(program.len(), stride);
        self.next.resize(program.len(), stride);
        self.work.seed.clear();
        self.work.seed.resize(stride, None);
        self.work.slots.clear();
        self.work.slots.resize(stride, None);
        self.work.stack.clear();
        self.work.history.reset(program.tags());
        self.work.steps = 0;
        self.best.clear();
        self.best.resize(stride, None);
    }

    /// Run the simulation from `start`, leaving the winning slots in
    /// `self.best`.
    fn run(&mut self, search: &Search<'_>, start: usize) -> Result<bool> {
        let text = search.text;
        let insts = search.program.insts();
        let tags = search.program.tags();
        let mut matched = false;

        for at in start..=text.len() {
            if !matched && (!search.options.anchored_start || at == start) {
                self.work.seed.fill(None);
                self.work
                    .add_thread(search, &mut self.curr, search.program.start(), at)?;
            }
            if self.curr.is_empty() {
                if matched || search.options.anchored_start {
                    break;
                }
                continue;
            }

            let byte = text.get(at).copied();
            for i in 0..self.curr.len() {
                let pc = self.curr.pc(i);
                let slots = self.curr.slots(pc);
                if matched {
                    if let (Some(thread_start), Some(best_start)) = (slots[0], self.best[0]) {
                        if thread_start > best_start {
                            continue;
                        }
                    }
                }
                self.work.tick()?;

                match &insts[pc] {
                    Inst::Match => {
                        let accept = !search.options.anchored_end || at == text.len();
                        if accept
                            && (!matched
                                || preferred(slots, &self.best, at, tags, &self.work.history))
                        {
                            self.best.copy_from_slice(slots);
                            matched = true;
                        }
                    }
                    Inst::Set { set, next } => {
                        if byte.is_some_and(|b| set.contains(b)) {
                            self.work.seed.copy_from_slice(slots);
                            self.work.add_thread(search, &mut self.next, *next, at + 1)?;
                        }
                    }
                    Inst::Split(..)
                    | Inst::Jump(_)
                    | Inst::Save { .. }
                    | Inst::Iterate { .. }
                    | Inst::Progress { .. }
                    | Inst::Assert { .. } => {}
                }
            }

            std::mem::swap(&mut self.curr, &mut self.next);
            self.next.clear();
            self.work.history.collect(&mut self.curr, &mut self.best);
        }

        self.curr.clear();
        Ok(matched)
    }

    fn result(&self, program: &Program) -> MatchResult {
        let groups = if program.reports_groups() {
            program.subexpression_count() + 1
        } else {
            1
        };
        let spans = self
            .best
            .chunks_exact(2)
            .take(groups)
            .map(|pair| match (pair[0], pair[1]) {
                (Some(start), Some(end)) => Some(Span::new(start, end)),
                _ => None,
            })
            .collect();
        MatchResult::new(spans)
    }
}

impl Work {
    fn tick(&mut self) -> Result<()> {
        self.steps += 1;
        if let Some(limit) = self.step_limit {
            if self.steps > limit {
                tracing::warn!(limit, "match step limit exceeded");
                return Err(RegexError::resource_limit(LimitKind::MatchSteps, limit));
            }
        }
        Ok(())
    }

    /// Add a thread at `pc` with the seed slots, following every
    /// zero-width instruction reachable from it.
    ///
    /// A thread that lands on an occupied instruction replaces the occupant
    /// only if it is preferred, and is then propagated again. Each
    /// replacement is strictly preferred, so loops over empty bodies
    /// terminate.
    fn add_thread(
        &mut self,
        search: &Search<'_>,
        list: &mut Threads,
        pc: InstPtr,
        at: usize,
    ) -> Result<()> {
        let tags = search.program.tags();
        self.stack.push(Frame {
            pc,
            from: Source::Seed,
            effect: None,
        });

        while let Some(frame) = self.stack.pop() {
            self.tick()?;

            match frame.from {
                Source::Seed => self.slots.copy_from_slice(&self.seed),
                Source::Thread(from) => self.slots.copy_from_slice(list.slots(from)),
            }
            match frame.effect {
                Some(Effect::Save(slot)) if slot < self.slots.len() => {
                    self.slots[slot] = Some(at);
                    if slot % 2 == 0 {
                        self.slots[slot + 1] = None;
                    }
                }
                Some(Effect::Iterate(slot)) => {
                    let node = self.history.push(slot, self.slots[slot], at);
                    self.slots[slot] = Some(node);
                }
                Some(Effect::Save(_)) | None => {}
            }

            let pc = frame.pc;
            if !list.insert(pc)
                && !preferred(&self.slots, list.slots(pc), at, tags, &self.history)
            {
                continue;
            }
            list.slots_mut(pc).copy_from_slice(&self.slots);

            let from = Source::Thread(pc);
            match &search.program.insts()[pc] {
                Inst::Jump(to) => self.stack.push(Frame {
                    pc: *to,
                    from,
                    effect: None,
                }),
                Inst::Split(first, second) => {
                    self.stack.push(Frame {
                        pc: *second,
                        from,
                        effect: None,
                    });
                    self.stack.push(Frame {
                        pc: *first,
                        from,
                        effect: None,
                    });
                }
                Inst::Save { slot, next } => self.stack.push(Frame {
                    pc: *next,
                    from,
                    effect: Some(Effect::Save(*slot)),
                }),
                Inst::Iterate { slot, next } => self.stack.push(Frame {
                    pc: *next,
                    from,
                    effect: Some(Effect::Iterate(*slot)),
                }),
                Inst::Progress { slot, next } => {
                    let empty = self.slots[*slot]
                        .is_some_and(|node| self.history.is_empty_repeat(node, at));
                    if !empty {
                        self.stack.push(Frame {
                            pc: *next,
                            from,
                            effect: None,
                        });
                    }
                }
                Inst::Assert { look, next } => {
                    if look.holds(search.text, at, search.options, search.newline) {
                        self.stack.push(Frame {
                            pc: *next,
                            from,
                            effect: None,
                        });
                    }
                }
                Inst::Set { .. } | Inst::Match => {}
            }
        }
        Ok(())
    }
}

/// Search `text` for the POSIX leftmost-longest match of `program`.
///
/// Returns `Ok(None)` when there is no match.
///
/// # Errors
///
/// Returns [`RegexError::ResourceLimit`] if the state's step limit is
/// exceeded.
pub fn exec(
    program: &Program,
    state: &mut MatchState,
    text: &[u8],
    options: &MatchOptions,
) -> Result<Option<MatchResult>> {
    exec_at(program, state, text, 0, options)
}

/// Like [`exec`], but only consider matches starting at or after `start`.
///
/// Assertions still see the whole text, so `^` does not match at `start`
/// unless it begins a line.
///
/// # Errors
///
/// Returns [`RegexError::ResourceLimit`] if the state's step limit is
/// exceeded.
pub fn exec_at(
    program: &Program,
    state: &mut MatchState,
    text: &[u8],
    start: usize,
    options: &MatchOptions,
) -> Result<Option<MatchResult>> {
    if start > text.len() {
        return Ok(None);
    }
    state.prepare(program);
    let search = Search {
        program,
        text,
        options,
        newline: program.newline_sensitive(),
    };

    let matched = state.run(&search, start)?;
    let result = matched.then(|| state.result(program));
    tracing::trace!(
        text_len = text.len(),
        start,
        steps = state.steps(),
        span = ?result.as_ref().map(MatchResult::span),
        "match attempt"
    );
    Ok(result)
}
