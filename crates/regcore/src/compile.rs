//! Lowering of syntax trees into [`Program`]s.
//!
//! Thompson construction with patch lists: each subtree compiles to a
//! [`Fragment`] whose dangling exits are patched once the next fragment's
//! entry point is known.

use std::collections::HashMap;

use regcore_syntax::Ast;

use crate::config::EngineConfig;
use crate::error::{LimitKind, RegexError, Result};
use crate::flags::CompileFlags;
use crate::program::{Inst, InstPtr, Program, Tag};

/// Placeholder target for an exit that has not been patched yet.
const HOLE: InstPtr = InstPtr::MAX;

/// A dangling exit.
#[derive(Debug, Clone, Copy)]
enum Hole {
    Next(InstPtr),
    SplitLeft(InstPtr),
    SplitRight(InstPtr),
}

/// A partially linked piece of program.
#[derive(Debug)]
struct Fragment {
    start: InstPtr,
    holes: Vec<Hole>,
}

/// Compile a syntax tree.
///
/// The program is laid out as `Save(0)`, the body, `Save(1)`, `Match`. With
/// [`CompileFlags::NOSUB`] only the whole-match slots are saved.
///
/// Repetitions whose body holds capture groups also get a history slot,
/// placed after the group slots, so the matcher can prefer the thread whose
/// earlier iterations are longest.
///
/// # Errors
///
/// Returns [`RegexError::ResourceLimit`] as soon as the program would grow
/// past `config.max_program_size` instructions, or when searching it would
/// need more than `config.max_match_state` capture slots per thread list.
pub fn compile(ast: &Ast, flags: CompileFlags, config: &EngineConfig) -> Result<Program> {
    let subexpression_count = ast.max_capture_index() as usize;
    let tracks_groups = !flags.contains(CompileFlags::NOSUB);
    let mut compiler = Compiler {
        insts: Vec::new(),
        flags,
        limit: config.max_program_size,
        tags: vec![Tag::Group(0)],
        seen: vec![false; subexpression_count + 1],
        loops: HashMap::new(),
        slot_count: if tracks_groups {
            2 * (subexpression_count + 1)
        } else {
            2
        },
        tracks_groups,
    };

    let open = compiler.emit(Inst::Save { slot: 0, next: HOLE })?;
    let body = compiler.fragment(ast)?;
    let close = compiler.emit(Inst::Save { slot: 1, next: HOLE })?;
    let accept = compiler.emit(Inst::Match)?;
    compiler.patch(&[Hole::Next(open)], body.start);
    compiler.patch(&body.holes, close);
    compiler.patch(&[Hole::Next(close)], accept);

    let slot_count = compiler.slot_count;
    let state = compiler
        .insts
        .len()
        .checked_mul(slot_count)
        .filter(|&slots| slots <= config.max_match_state);
    if state.is_none() {
        tracing::warn!(
            limit = config.max_match_state,
            insts = compiler.insts.len(),
            slot_count,
            "match state limit exceeded"
        );
        return Err(RegexError::resource_limit(
            LimitKind::MatchState,
            config.max_match_state as u64,
        ));
    }

    Ok(Program {
        insts: compiler.insts,
        start: open,
        subexpression_count,
        slot_count,
        tags: compiler.tags,
        flags,
    })
}

struct Compiler {
    insts: Vec<Inst>,
    flags: CompileFlags,
    limit: usize,
    tags: Vec<Tag>,
    /// Groups already listed in `tags`.
    seen: Vec<bool>,
    /// History slot of each repetition body, shared by all its copies.
    loops: HashMap<*const Ast, usize>,
    slot_count: usize,
    tracks_groups: bool,
}

impl Compiler {
    fn emit(&mut self, inst: Inst) -> Result<InstPtr> {
        if self.insts.len() >= self.limit {
            tracing::warn!(limit = self.limit, "program size limit exceeded");
            return Err(RegexError::resource_limit(
                LimitKind::ProgramSize,
                self.limit as u64,
            ));
        }
        self.insts.push(inst);
        Ok(self.insts.len() - 1)
    }

    fn patch(&mut self, holes: &[Hole], target: InstPtr) {
        for hole in holes {
            match *hole {
                Hole::Next(pc) => match &mut self.insts[pc] {
                    Inst::Set { next, .. }
                    | Inst::Save { next, .. }
                    | Inst::Iterate { next, .. }
                    | Inst::Progress { next, .. }
                    | Inst::Assert { next, .. } => {
                        *next = target;
                    }
                    Inst::Jump(to) => *to = target,
                    Inst::Split(..) | Inst::Match => {}
                },
                Hole::SplitLeft(pc) => {
                    if let Inst::Split(left, _) = &mut self.insts[pc] {
                        *left = target;
                    }
                }
                Hole::SplitRight(pc) => {
                    if let Inst::Split(_, right) = &mut self.insts[pc] {
                        *right = target;
                    }
                }
            }
        }
    }

    /// Link `next` after `prev`, if there is one.
    fn join(&mut self, prev: Option<Fragment>, next: Fragment) -> Fragment {
        match prev {
            Some(prev) => {
                self.patch(&prev.holes, next.start);
                Fragment {
                    start: prev.start,
                    holes: next.holes,
                }
            }
            None => next,
        }
    }

    fn fragment(&mut self, ast: &Ast) -> Result<Fragment> {
        match ast {
            Ast::Empty => self.empty(),
            Ast::Literal(set) => {
                let mut set = *set;
                if self.flags.contains(CompileFlags::ICASE) {
                    set.fold_ascii_case();
                }
                let pc = self.emit(Inst::Set { set, next: HOLE })?;
                Ok(Fragment {
                    start: pc,
                    holes: vec![Hole::Next(pc)],
                })
            }
            Ast::Anchor(kind) => {
                let pc = self.emit(Inst::Assert {
                    look: (*kind).into(),
                    next: HOLE,
                })?;
                Ok(Fragment {
                    start: pc,
                    holes: vec![Hole::Next(pc)],
                })
            }
            Ast::Concat(items) => {
                let mut frag = None;
                for item in items {
                    let next = self.fragment(item)?;
                    frag = Some(self.join(frag, next));
                }
                match frag {
                    Some(frag) => Ok(frag),
                    None => self.empty(),
                }
            }
            Ast::Alternation(branches) => self.alternation(branches),
            Ast::Repetition {
                child, min, max, ..
            } => self.repetition(child, *min, *max),
            Ast::Group { child, index } => match index {
                Some(index) if !self.flags.contains(CompileFlags::NOSUB) => {
                    self.capture(child, *index as usize)
                }
                _ => self.fragment(child),
            },
        }
    }

    fn empty(&mut self) -> Result<Fragment> {
        let pc = self.emit(Inst::Jump(HOLE))?;
        Ok(Fragment {
            start: pc,
            holes: vec![Hole::Next(pc)],
        })
    }

    fn capture(&mut self, child: &Ast, index: usize) -> Result<Fragment> {
        if let Some(seen) = self.seen.get_mut(index) {
            if !*seen {
                *seen = true;
                self.tags.push(Tag::Group(2 * index));
            }
        }
        let open = self.emit(Inst::Save {
            slot: 2 * index,
            next: HOLE,
        })?;
        let body = self.fragment(child)?;
        let close = self.emit(Inst::Save {
            slot: 2 * index + 1,
            next: HOLE,
        })?;
        self.patch(&[Hole::Next(open)], body.start);
        self.patch(&body.holes, close);
        Ok(Fragment {
            start: open,
            holes: vec![Hole::Next(close)],
        })
    }

    fn alternation(&mut self, branches: &[Ast]) -> Result<Fragment> {
        let Some((last, rest)) = branches.split_last() else {
            return self.empty();
        };

        let mut start = None;
        let mut entry: Option<Hole> = None;
        let mut holes = Vec::new();

        for branch in rest {
            let split = self.emit(Inst::Split(HOLE, HOLE))?;
            let body = self.fragment(branch)?;
            self.patch(&[Hole::SplitLeft(split)], body.start);
            holes.extend(body.holes);
            match entry {
                Some(hole) => self.patch(&[hole], split),
                None => start = Some(split),
            }
            entry = Some(Hole::SplitRight(split));
        }

        let body = self.fragment(last)?;
        holes.extend(body.holes);
        match entry {
            Some(hole) => self.patch(&[hole], body.start),
            None => start = Some(body.start),
        }

        Ok(Fragment {
            start: start.unwrap_or(body.start),
            holes,
        })
    }

    fn repetition(&mut self, child: &Ast, min: u32, max: Option<u32>) -> Result<Fragment> {
        if (min, max) == (0, Some(0)) {
            return self.empty();
        }
        let slot = self.iteration_slot(child);
        match (min, max) {
            (0, None) => self.star(child, slot),
            (min, None) => {
                // With a history slot the tail is a star, so the iteration
                // after the last required one may not match empty.
                let copies = if slot.is_some() { min } else { min - 1 };
                let mut frag = None;
                for _ in 0..copies {
                    let copy = self.iteration(child, slot)?;
                    frag = Some(self.join(frag, copy));
                }
                let tail = match slot {
                    Some(_) => self.star(child, slot)?,
                    None => self.plus(child)?,
                };
                Ok(self.join(frag, tail))
            }
            (min, Some(max)) => {
                let mut frag = None;
                for _ in 0..min {
                    let copy = self.iteration(child, slot)?;
                    frag = Some(self.join(frag, copy));
                }
                if max > min {
                    let optional = self.optional_chain(child, max - min, slot)?;
                    frag = Some(self.join(frag, optional));
                }
                match frag {
                    Some(frag) => Ok(frag),
                    None => self.empty(),
                }
            }
        }
    }

    /// The history slot for repetitions of `child`, if it holds groups.
    fn iteration_slot(&mut self, child: &Ast) -> Option<usize> {
        if !self.tracks_groups || child.capture_count() == 0 {
            return None;
        }
        let next = self.slot_count;
        let slot = *self.loops.entry(std::ptr::from_ref(child)).or_insert(next);
        if slot == next {
            self.slot_count += 1;
            self.tags.push(Tag::Iteration(slot));
        }
        Some(slot)
    }

    /// One pass through `child`, opened by an `Iterate` when tracked.
    fn iteration(&mut self, child: &Ast, slot: Option<usize>) -> Result<Fragment> {
        let Some(slot) = slot else {
            return self.fragment(child);
        };
        let iterate = self.emit(Inst::Iterate { slot, next: HOLE })?;
        let body = self.fragment(child)?;
        self.patch(&[Hole::Next(iterate)], body.start);
        Ok(Fragment {
            start: iterate,
            holes: body.holes,
        })
    }

    /// Route `holes` through a `Progress` check when tracked.
    fn progress(&mut self, holes: Vec<Hole>, slot: Option<usize>) -> Result<Vec<Hole>> {
        let Some(slot) = slot else {
            return Ok(holes);
        };
        let pc = self.emit(Inst::Progress { slot, next: HOLE })?;
        self.patch(&holes, pc);
        Ok(vec![Hole::Next(pc)])
    }

    /// `x*`: a split that either enters the body or exits.
    fn star(&mut self, child: &Ast, slot: Option<usize>) -> Result<Fragment> {
        let split = self.emit(Inst::Split(HOLE, HOLE))?;
        let body = self.iteration(child, slot)?;
        self.patch(&[Hole::SplitLeft(split)], body.start);
        let exits = self.progress(body.holes, slot)?;
        self.patch(&exits, split);
        Ok(Fragment {
            start: split,
            holes: vec![Hole::SplitRight(split)],
        })
    }

    /// `x+`: the body followed by a split back to its start.
    fn plus(&mut self, child: &Ast) -> Result<Fragment> {
        let body = self.fragment(child)?;
        let split = self.emit(Inst::Split(body.start, HOLE))?;
        self.patch(&body.holes, split);
        Ok(Fragment {
            start: body.start,
            holes: vec![Hole::SplitRight(split)],
        })
    }

    /// `(x(x(x)?)?)?` with `count` levels.
    fn optional_chain(
        &mut self,
        child: &Ast,
        count: u32,
        slot: Option<usize>,
    ) -> Result<Fragment> {
        let mut chain = None;
        let mut exits = Vec::new();
        for _ in 0..count {
            let split = self.emit(Inst::Split(HOLE, HOLE))?;
            let body = self.iteration(child, slot)?;
            self.patch(&[Hole::SplitLeft(split)], body.start);
            exits.push(Hole::SplitRight(split));
            let holes = self.progress(body.holes, slot)?;
            let level = Fragment {
                start: split,
                holes,
            };
            chain = Some(self.join(chain, level));
        }
        match chain {
            Some(mut chain) => {
                chain.holes.extend(exits);
                Ok(chain)
            }
            None => self.empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regcore_syntax::{Dialect, ParseOptions, parse, parse_with};

    fn program(pattern: &str) -> Program {
        let ast = parse(pattern.as_bytes()).unwrap();
        compile(&ast, CompileFlags::EXTENDED, &EngineConfig::default()).unwrap()
    }

    #[test]
    fn literal_layout() {
        let prog = program("ab");
        assert_eq!(
            prog.to_string(),
            concat!(
                ">0000 save 0 -> 1\n",
                " 0001 set a -> 2\n",
                " 0002 set b -> 3\n",
                " 0003 save 1 -> 4\n",
                " 0004 match\n",
            )
        );
        assert_eq!(prog.subexpression_count(), 0);
        assert_eq!(prog.slot_count(), 2);
    }

    #[test]
    fn no_holes_survive() {
        for pattern in [
            "a|b|c", "(a|)*", "x{2,5}", "(ab)+c?", "^$", "()", "a{0}", "(a){2,4}", "(a|b){3,}",
        ] {
            let prog = program(pattern);
            for inst in prog.insts() {
                let targets: Vec<InstPtr> = match inst {
                    Inst::Set { next, .. }
                    | Inst::Save { next, .. }
                    | Inst::Iterate { next, .. }
                    | Inst::Progress { next, .. }
                    | Inst::Assert { next, .. } => vec![*next],
                    Inst::Jump(to) => vec![*to],
                    Inst::Split(a, b) => vec![*a, *b],
                    Inst::Match => vec![],
                };
                for target in targets {
                    assert!(target < prog.len(), "{pattern}: dangling exit in\n{prog}");
                }
            }
        }
    }

    #[test]
    fn capture_slots() {
        let prog = program("(a)(b(c))");
        assert_eq!(prog.subexpression_count(), 3);
        assert_eq!(prog.slot_count(), 8);
        let saves = prog
            .insts()
            .iter()
            .filter(|inst| matches!(inst, Inst::Save { .. }))
            .count();
        assert_eq!(saves, 8);
    }

    #[test]
    fn nosub_drops_group_saves() {
        let ast = parse(b"(a)(b)").unwrap();
        let flags = CompileFlags::EXTENDED | CompileFlags::NOSUB;
        let prog = compile(&ast, flags, &EngineConfig::default()).unwrap();
        assert_eq!(prog.subexpression_count(), 2);
        assert_eq!(prog.slot_count(), 2);
        assert!(!prog.reports_groups());
        let saves = prog
            .insts()
            .iter()
            .filter(|inst| matches!(inst, Inst::Save { .. }))
            .count();
        assert_eq!(saves, 2);
    }

    #[test]
    fn icase_folds_sets() {
        let ast = parse(b"a").unwrap();
        let flags = CompileFlags::EXTENDED | CompileFlags::ICASE;
        let prog = compile(&ast, flags, &EngineConfig::default()).unwrap();
        let folded = prog.insts().iter().any(|inst| {
            matches!(inst, Inst::Set { set, .. } if set.contains(b'a') && set.contains(b'A'))
        });
        assert!(folded);
    }

    #[test]
    fn bounded_repeat_expands() {
        let prog = program("a{2,4}");
        let sets = prog
            .insts()
            .iter()
            .filter(|inst| matches!(inst, Inst::Set { .. }))
            .count();
        let splits = prog
            .insts()
            .iter()
            .filter(|inst| matches!(inst, Inst::Split(..)))
            .count();
        assert_eq!(sets, 4);
        assert_eq!(splits, 2);
    }

    #[test]
    fn deterministic() {
        let a = program("(x|y)*z{1,3}[[:digit:]]");
        let b = program("(x|y)*z{1,3}[[:digit:]]");
        assert_eq!(a, b);
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn program_size_limit() {
        let ast = parse(b"(a{1000}){1000}").unwrap();
        let err =
            compile(&ast, CompileFlags::EXTENDED, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.limit_kind(), Some(LimitKind::ProgramSize));

        let ast = parse(b"abcdef").unwrap();
        let tiny = EngineConfig::builder().max_program_size(4).build();
        assert!(compile(&ast, CompileFlags::EXTENDED, &tiny).is_err());
    }

    #[test]
    fn repeated_groups_get_history_slots() {
        let prog = program("(a|b)*c(d)+");
        assert_eq!(prog.subexpression_count(), 2);
        assert_eq!(prog.slot_count(), 8);
        assert_eq!(
            prog.tags(),
            &[
                Tag::Group(0),
                Tag::Iteration(6),
                Tag::Group(2),
                Tag::Iteration(7),
                Tag::Group(4),
            ]
        );

        // Copies of one body share its slot.
        let prog = program("(a){2,3}");
        assert_eq!(prog.slot_count(), 5);
        let iterates = prog
            .insts()
            .iter()
            .filter(|inst| matches!(inst, Inst::Iterate { slot: 4, .. }))
            .count();
        assert_eq!(iterates, 3);
    }

    #[test]
    fn group_free_repetitions_stay_untracked() {
        let prog = program("(a)b*c{2,3}");
        assert_eq!(prog.slot_count(), 4);
        assert!(
            !prog
                .insts()
                .iter()
                .any(|inst| matches!(inst, Inst::Iterate { .. } | Inst::Progress { .. }))
        );

        let ast = parse(b"(a)*").unwrap();
        let flags = CompileFlags::EXTENDED | CompileFlags::NOSUB;
        let prog = compile(&ast, flags, &EngineConfig::default()).unwrap();
        assert_eq!(prog.tags(), &[Tag::Group(0)]);
        assert_eq!(prog.slot_count(), 2);
    }

    #[test]
    fn match_state_limit() {
        let pattern = "(a)".repeat(10_000);
        let ast = parse(pattern.as_bytes()).unwrap();
        let err = compile(&ast, CompileFlags::EXTENDED, &EngineConfig::default()).unwrap_err();
        assert_eq!(err.limit_kind(), Some(LimitKind::MatchState));

        let ast = parse(b"(a)(b)").unwrap();
        let tight = EngineConfig::builder().max_match_state(16).build();
        assert!(compile(&ast, CompileFlags::EXTENDED, &tight).is_err());
        let roomy = EngineConfig::builder().max_match_state(60).build();
        assert!(compile(&ast, CompileFlags::EXTENDED, &roomy).is_ok());
    }

    #[test]
    fn basic_dialect_program() {
        let ast = parse_with(b"\\(a\\)*", ParseOptions::new(Dialect::Basic)).unwrap();
        let prog = compile(&ast, CompileFlags::empty(), &EngineConfig::default()).unwrap();
        assert_eq!(prog.subexpression_count(), 1);
        assert_eq!(prog.flags().dialect(), Dialect::Basic);
    }
}
