use std::collections::HashMap;
use std::sync::Arc;

use super::{State, offset};
use crate::candidate::{Category, LabelCandidateIndex};
use crate::eval::AttachmentScore;
use crate::feature::Source;
use crate::graph::{DependencyArc, Graph};
use crate::token::{Sentence, Token};
use crate::transition::{ArcMove, ListMove, TransitionLabel};

/// The list-based configuration: the stack, the nodes passed over for the
/// current input, the input pointer and the arcs built so far.
///
/// The root stays at the bottom of the stack.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    stack: Vec<usize>,
    deque: Vec<usize>,
    input: usize,
    graph: Graph,
}

impl Configuration {
    /// The initial configuration over `len` nodes, root included.
    pub fn new(len: usize) -> Self {
        Self {
            stack: vec![0],
            deque: Vec::new(),
            input: 1,
            graph: Graph::new(len),
        }
    }

    /// The stack, bottom first.
    pub fn stack(&self) -> &[usize] {
        &self.stack
    }

    /// Nodes passed over, in the order they were passed.
    pub fn deque(&self) -> &[usize] {
        &self.deque
    }

    /// The next input node.
    pub fn input(&self) -> usize {
        self.input
    }

    /// The arcs built so far.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// The stack top.
    pub fn top(&self) -> Option<usize> {
        self.stack.last().copied()
    }

    /// `true` once the input is exhausted.
    pub fn is_terminal(&self) -> bool {
        self.input >= self.graph.len()
    }

    /// The structural situation of the stack top and the input.
    pub fn category(&self) -> Category {
        let s = self.top().unwrap_or(0);
        let i = self.input;
        let graph = &self.graph;

        if s == 0 {
            if graph.has_head(i) {
                Category::RootShiftNoArc
            } else {
                Category::RootShift
            }
        } else if graph.is_descendant_of(s, i) {
            Category::NoArc
        } else if graph.is_descendant_of(i, s) {
            if graph.has_head(s) {
                Category::NoArc
            } else {
                Category::NoArcKeepStack
            }
        } else if !graph.has_head(s) {
            if graph.has_head(i) {
                Category::UnattachedInputHeaded
            } else {
                Category::Unattached
            }
        } else if !graph.has_head(i) {
            Category::Open
        } else {
            Category::NoArc
        }
    }

    /// Performs one transition. Arcs never replace an existing head.
    pub fn apply(&mut self, label: &TransitionLabel) {
        if let Some(s) = self.top() {
            match label.arc {
                ArcMove::Left => {
                    self.graph.attach(s, self.input, label.deprel.as_str());
                }
                ArcMove::Right => {
                    self.graph.attach(self.input, s, label.deprel.as_str());
                }
                ArcMove::NoArc => {}
            }
        }

        match label.list {
            ListMove::Shift => {
                while let Some(node) = self.deque.pop() {
                    self.stack.push(node);
                }
                self.stack.push(self.input);
                self.input += 1;
            }
            ListMove::Reduce => {
                self.stack.pop();
            }
            ListMove::Pass => {
                if let Some(node) = self.stack.pop() {
                    self.deque.push(node);
                }
            }
        }
    }

    /// `true` while an arc between `a < b` can still be built.
    fn comparable(&self, a: usize, b: usize) -> bool {
        let p = self.input;
        if b > p {
            a >= p || self.stack.contains(&a) || self.deque.contains(&a)
        } else if b == p {
            self.stack.contains(&a)
        } else {
            false
        }
    }

    /// `true` while `head → dependent` can still be built.
    pub fn reachable(&self, dependent: usize, head: usize) -> bool {
        !self.graph.has_head(dependent)
            && self.comparable(dependent.min(head), dependent.max(head))
            && !self.graph.is_descendant_of(head, dependent)
    }

    /// Gold arcs that can no longer be built correctly.
    ///
    /// A gold arc is lost when a different arc was built for its dependent
    /// or when it is unreachable on its own. The reachable ones together
    /// with the built arcs may still close cycles, and every such cycle
    /// costs one more arc.
    pub fn loss(&self, gold: &[Option<DependencyArc>]) -> usize {
        let mut heads: Vec<Option<usize>> = self
            .graph
            .arcs()
            .iter()
            .map(|arc| arc.as_ref().map(|arc| arc.head))
            .collect();
        let mut loss = 0;

        for (dependent, arc) in gold.iter().enumerate() {
            let Some(arc) = arc else { continue };
            match self.graph.arc(dependent) {
                Some(built) if built != arc => loss += 1,
                Some(_) => {}
                None if self.reachable(dependent, arc.head) => {
                    if let Some(head) = heads.get_mut(dependent) {
                        *head = Some(arc.head);
                    }
                }
                None => loss += 1,
            }
        }

        loss + count_cycles(&heads)
    }
}

/// Cycles in a graph where every node has at most one head.
fn count_cycles(heads: &[Option<usize>]) -> usize {
    let mut walks: Vec<Option<usize>> = vec![None; heads.len()];
    let mut cycles = 0;

    for start in 0..heads.len() {
        let mut node = start;
        loop {
            match walks.get(node).copied() {
                Some(None) => walks[node] = Some(start),
                Some(Some(walk)) => {
                    if walk == start {
                        cycles += 1;
                    }
                    break;
                }
                None => break,
            }
            match heads[node] {
                Some(head) => node = head,
                None => break,
            }
        }
    }
    cycles
}

/// Dependency parsing state with a dynamic oracle.
#[derive(Debug, Clone)]
pub struct DependencyState {
    tokens: Vec<Token>,
    gold: Vec<Option<DependencyArc>>,
    config: Configuration,
    index: Arc<LabelCandidateIndex>,
}

impl DependencyState {
    /// Creates the initial state for `sentence`, moving the gold heads and
    /// relations aside.
    pub fn new(sentence: &Sentence, index: Arc<LabelCandidateIndex>) -> Self {
        let mut tokens = Vec::with_capacity(sentence.len() + 1);
        let mut gold = Vec::with_capacity(sentence.len() + 1);
        tokens.push(Token::root());
        gold.push(None);

        for token in sentence.tokens() {
            let mut token = token.clone();
            let head = token.head.take();
            let deprel = token.deprel.take();
            gold.push(head.map(|head| DependencyArc::new(head, deprel.unwrap_or_default())));
            tokens.push(token);
        }

        let config = Configuration::new(tokens.len());
        Self {
            tokens,
            gold,
            config,
            index,
        }
    }

    /// The current configuration.
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// The label vocabulary with its candidate sets.
    pub fn index(&self) -> &LabelCandidateIndex {
        &self.index
    }

    /// The structural situation of the current configuration.
    pub fn category(&self) -> Category {
        self.config.category()
    }

    /// Loss of the current configuration.
    pub fn loss(&self) -> usize {
        self.config.loss(&self.gold)
    }

    /// Nodes other than the root without a head.
    pub fn headless(&self) -> Vec<usize> {
        (1..self.tokens.len())
            .filter(|id| !self.config.graph.has_head(*id))
            .collect()
    }

    /// Puts `stack` on top of the root and points the input at `input`.
    pub fn reset(&mut self, stack: usize, input: usize) {
        self.config.stack.clear();
        self.config.stack.push(0);
        if stack != 0 {
            self.config.stack.push(stack);
        }
        self.config.deque.clear();
        self.config.input = input;
    }

    /// Runs `f` with the configuration [`reset`](Self::reset) to `stack`
    /// and `input`, then restores it.
    pub fn with_focus<R>(&mut self, stack: usize, input: usize, f: impl FnOnce(&Self) -> R) -> R {
        let saved = (
            std::mem::take(&mut self.config.stack),
            std::mem::take(&mut self.config.deque),
            self.config.input,
        );
        self.reset(stack, input);
        let result = f(self);
        (self.config.stack, self.config.deque, self.config.input) = saved;
        result
    }

    /// Attaches `dependent` to `head` outside the transition system.
    pub fn attach(&mut self, dependent: usize, head: usize, label: &str) -> bool {
        self.config.graph.attach(dependent, head, label)
    }

    fn matches_gold(&self, transition: &TransitionLabel) -> bool {
        let dependent = match (transition.arc, self.config.top()) {
            (ArcMove::Left, Some(s)) => s,
            (ArcMove::Right, _) => self.config.input,
            _ => return false,
        };
        self.gold
            .get(dependent)
            .and_then(Option::as_ref)
            .is_some_and(|arc| arc.label == transition.deprel)
    }
}

impl State for DependencyState {
    type Eval = AttachmentScore;

    fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    fn graph(&self) -> &Graph {
        &self.config.graph
    }

    fn node(&self, source: Source, window: i32) -> Option<usize> {
        let range = 0..self.tokens.len();
        match source {
            Source::Stack => offset(self.config.top()?, window, range),
            Source::Input => offset(self.config.input, window, range),
            Source::Peek if window <= 0 => self
                .config
                .stack
                .iter()
                .rev()
                .nth(window.unsigned_abs() as usize)
                .copied(),
            Source::Peek => self.config.deque.iter().rev().nth(window as usize - 1).copied(),
        }
    }

    fn is_terminal(&self) -> bool {
        self.config.is_terminal()
    }

    fn candidates(&self) -> Option<&[usize]> {
        if self.is_terminal() {
            Some(&[])
        } else {
            Some(self.index.candidates(self.category()))
        }
    }

    fn oracle(&self) -> Vec<usize> {
        let Some(candidates) = self.candidates() else {
            return Vec::new();
        };

        let mut cache: HashMap<(ArcMove, ListMove, bool), usize> = HashMap::new();
        let losses: Vec<(usize, usize)> = candidates
            .iter()
            .filter_map(|label| {
                let transition = self.index.transition(*label)?;
                let key = (transition.arc, transition.list, self.matches_gold(transition));
                let loss = *cache.entry(key).or_insert_with(|| {
                    let mut next = self.config.clone();
                    next.apply(transition);
                    next.loss(&self.gold)
                });
                Some((*label, loss))
            })
            .collect();

        let Some(min) = losses.iter().map(|(_, loss)| *loss).min() else {
            return Vec::new();
        };
        losses
            .into_iter()
            .filter(|(_, loss)| *loss == min)
            .map(|(label, _)| label)
            .collect()
    }

    fn apply(&mut self, label: usize) {
        if self.config.is_terminal() {
            return;
        }
        if let Some(transition) = self.index.transition(label) {
            self.config.apply(transition);
        }
    }

    fn evaluate(&self, eval: &mut AttachmentScore) {
        for (id, gold) in self.gold.iter().enumerate() {
            if let Some(gold) = gold {
                let built = self.config.graph.arc(id);
                eval.add(
                    built.is_some_and(|arc| arc.head == gold.head),
                    built.is_some_and(|arc| arc.label == gold.label),
                );
            }
        }
    }

    fn sentence(&self) -> Sentence {
        self.tokens
            .iter()
            .enumerate()
            .skip(1)
            .map(|(id, token)| {
                let mut token = token.clone();
                if let Some(arc) = self.config.graph.arc(id) {
                    token.head = Some(arc.head);
                    token.deprel = Some(arc.label.clone());
                }
                token
            })
            .collect()
    }

    fn distance(&self) -> Option<f32> {
        let s = self.config.top()?;
        Some(self.config.input.saturating_sub(s) as f32 / self.tokens.len() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::Evaluator;
    use pretty_assertions::assert_eq;

    fn index() -> Arc<LabelCandidateIndex> {
        Arc::new(LabelCandidateIndex::from_relations(["dep", "root"]).unwrap())
    }

    fn chain() -> Sentence {
        Sentence::new(vec![
            Token::new("a").with_head(0, "root"),
            Token::new("b").with_head(1, "dep"),
            Token::new("c").with_head(2, "dep"),
        ])
    }

    fn label(state: &DependencyState, name: &str) -> usize {
        state.index().labels().index(name).unwrap()
    }

    #[test]
    fn gold_is_moved_aside() {
        let state = DependencyState::new(&chain(), index());
        assert!(state.tokens().iter().all(|token| token.head.is_none() && token.deprel.is_none()));
        assert_eq!(state.tokens()[0], Token::root());
        assert_eq!(state.loss(), 0);
    }

    #[test]
    fn oracle_follows_the_chain() {
        let mut state = DependencyState::new(&chain(), index());
        assert_eq!(state.category(), Category::RootShift);
        assert_eq!(state.oracle(), vec![label(&state, "R_S_root")]);

        state.apply(label(&state, "R_S_root"));
        assert_eq!(state.category(), Category::Open);
        assert_eq!(
            state.oracle(),
            vec![label(&state, "R_S_dep"), label(&state, "R_P_dep")]
        );

        while !state.is_terminal() {
            let oracle = state.oracle();
            state.apply(oracle[0]);
        }

        let mut eval = AttachmentScore::default();
        state.evaluate(&mut eval);
        assert_eq!(eval.score(), 100.0);
        assert_eq!(eval.unlabeled(), 100.0);
        assert_eq!(state.sentence(), chain());
    }

    #[test]
    fn wrong_moves_cost_arcs() {
        let mut state = DependencyState::new(&chain(), index());
        state.apply(label(&state, "N_S_"));
        assert_eq!(state.loss(), 1);
        assert_eq!(state.category(), Category::Unattached);
        assert!(state.candidates().unwrap().contains(&label(&state, "L_R_dep")));
        assert!(!state.oracle().is_empty());
    }

    #[test]
    fn passed_nodes_return_on_shift() {
        let mut state = DependencyState::new(&chain(), index());
        state.apply(label(&state, "N_S_"));
        state.apply(label(&state, "N_S_"));
        assert_eq!(state.configuration().stack(), &[0, 1, 2]);

        state.apply(label(&state, "N_P_"));
        state.apply(label(&state, "N_P_"));
        assert_eq!(state.configuration().deque(), &[2, 1]);
        assert_eq!(state.node(Source::Peek, 0), Some(0));
        assert_eq!(state.node(Source::Peek, 1), Some(1));
        assert_eq!(state.node(Source::Peek, 2), Some(2));
        assert_eq!(state.node(Source::Peek, 3), None);

        state.apply(label(&state, "N_S_"));
        assert_eq!(state.configuration().stack(), &[0, 1, 2, 3]);
        assert!(state.is_terminal());
        assert_eq!(state.candidates(), Some(&[][..]));
    }

    #[test]
    fn reachable_arcs_closing_a_cycle_cost_one_more() {
        // 0 → 3 → 1 → 2
        let sentence = Sentence::new(vec![
            Token::new("a").with_head(3, "dep"),
            Token::new("b").with_head(1, "dep"),
            Token::new("c").with_head(0, "root"),
        ]);
        let mut state = DependencyState::new(&sentence, index());
        state.attach(3, 2, "dep");

        // 3 is lost outright; 3 → 1 and 1 → 2 stay reachable but close a
        // cycle with 2 → 3.
        assert!(state.configuration().reachable(1, 3));
        assert!(state.configuration().reachable(2, 1));
        assert_eq!(state.loss(), 2);

        while !state.is_terminal() {
            let oracle = state.oracle();
            assert_eq!(state.loss(), 2);
            state.apply(oracle[0]);
        }

        let mut eval = AttachmentScore::default();
        state.evaluate(&mut eval);
        assert_eq!(eval.total - eval.las, 2);
    }

    #[test]
    fn cycles_are_counted_once() {
        assert_eq!(count_cycles(&[None, Some(2), Some(3), Some(1)]), 1);
        assert_eq!(count_cycles(&[None, Some(2), Some(1), Some(4), Some(3)]), 2);
        assert_eq!(count_cycles(&[None, Some(0), Some(1), Some(2)]), 0);
        assert_eq!(count_cycles(&[None, Some(7)]), 0);
    }

    #[test]
    fn focus_is_restored() {
        let mut state = DependencyState::new(&chain(), index());
        state.apply(label(&state, "N_S_"));
        let before = state.configuration().clone();

        let focus = state.with_focus(3, 1, |state| (state.node(Source::Stack, 0), state.node(Source::Input, 0)));
        assert_eq!(focus, (Some(3), Some(1)));
        assert_eq!(state.configuration(), &before);
    }

    #[test]
    fn categories_track_the_partial_tree() {
        let mut state = DependencyState::new(&chain(), index());
        state.apply(label(&state, "N_S_"));
        state.apply(label(&state, "R_S_dep"));
        assert_eq!(state.configuration().stack(), &[0, 1, 2]);
        assert_eq!(state.category(), Category::Open);

        state.apply(label(&state, "N_P_"));
        assert_eq!(state.category(), Category::Unattached);

        let mut nested = DependencyState::new(&chain(), index());
        nested.apply(label(&nested, "N_S_"));
        nested.attach(2, 1, "dep");
        assert_eq!(nested.category(), Category::NoArcKeepStack);

        nested.attach(1, 0, "root");
        assert_eq!(nested.category(), Category::NoArc);
        assert!(nested.candidates().unwrap().iter().all(|label| {
            !nested.index().transition(*label).unwrap().is_arc()
        }));
    }
}
