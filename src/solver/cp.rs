// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

use tracing::debug;

use super::{BudgetClock, SolveBudget, Solver, SolverError, SolverResult};
use crate::formulation::BinaryProgram;

/// Constraint propagation plus depth-first search with objective bounding.
///
/// Rows must have integral coefficients. Each row is propagated on its bounds: once the fixed
/// part plus the smallest (or largest) reachable contribution of the free part meets the
/// right-hand side, every free variable of the row is forced.
///
/// Subtrees are pruned against the incumbent with a repair bound: every unbalanced row must be
/// fixed by a chain of free variables, each unbalancing the next row it touches, until one lands
/// on a row that needs exactly that change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConstraintProgrammingBackend;

#[derive(Debug, Clone)]
struct Row {
    terms: Vec<(usize, i64)>,
    rhs: i64,
}

/// Running totals of one row under the current partial assignment.
#[derive(Debug, Clone, Copy, Default)]
struct RowState {
    fixed: i64,
    min_free: i64,
    max_free: i64,
    free: usize,
}

/// A branching decision still open on the search stack.
struct Frame {
    var: usize,
    retry: Option<bool>,
    mark: usize,
}

/// Repair-bound frontier entry, ordered cheapest first.
struct Pending {
    cost: f64,
    row: usize,
    more: bool,
}

impl PartialEq for Pending {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Pending {}

impl PartialOrd for Pending {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Pending {
    fn cmp(&self, other: &Self) -> Ordering {
        other.cost.total_cmp(&self.cost).then_with(|| other.row.cmp(&self.row))
    }
}

struct Search<'a> {
    rows: Vec<Row>,
    state: Vec<RowState>,
    occurrences: Vec<Vec<(usize, i64)>>,
    cost: &'a [f64],
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    /// Fixed cost plus every free negative cost.
    floor: f64,
    /// The repair bound needs unit coefficients and non-negative costs.
    repair_bound: bool,
    settled: Vec<u64>,
    generation: u64,
    best: Option<(Vec<bool>, f64)>,
    clock: BudgetClock,
    exhausted: bool,
}

fn integral(value: f64) -> Option<i64> {
    (value.fract() == 0.0 && value.abs() < 1e15).then_some(value as i64)
}

impl<'a> Search<'a> {
    fn new(program: &'a BinaryProgram, clock: BudgetClock) -> Result<Self, SolverError> {
        let mut rows = Vec::with_capacity(program.constraints().len());
        let mut state = Vec::with_capacity(program.constraints().len());
        let mut occurrences = vec![Vec::new(); program.variable_count()];
        for constraint in program.constraints() {
            let rhs = integral(constraint.rhs()).ok_or_else(|| {
                SolverError::UnsupportedCoefficient {
                    constraint: constraint.name(),
                    coefficient: constraint.rhs(),
                }
            })?;
            let mut terms = Vec::with_capacity(constraint.terms().len());
            let mut totals = RowState::default();
            for term in constraint.terms() {
                let coefficient = integral(term.coefficient).ok_or_else(|| {
                    SolverError::UnsupportedCoefficient {
                        constraint: constraint.name(),
                        coefficient: term.coefficient,
                    }
                })?;
                occurrences[term.var].push((rows.len(), coefficient));
                terms.push((term.var, coefficient));
                totals.free += 1;
                if coefficient < 0 {
                    totals.min_free += coefficient;
                } else {
                    totals.max_free += coefficient;
                }
            }
            rows.push(Row { terms, rhs });
            state.push(totals);
        }

        let cost = program.objective();
        let unit_rows = rows
            .iter()
            .all(|row| row.terms.iter().all(|(_, coefficient)| coefficient.abs() == 1));
        let repair_bound = unit_rows && cost.iter().all(|cost| *cost >= 0.0);
        let settled = vec![0; 2 * rows.len()];

        Ok(Self {
            rows,
            state,
            occurrences,
            cost,
            values: vec![None; program.variable_count()],
            trail: Vec::new(),
            floor: cost.iter().map(|cost| cost.min(0.0)).sum(),
            repair_bound,
            settled,
            generation: 0,
            best: None,
            clock,
            exhausted: false,
        })
    }

    fn residual(&self, row: usize) -> i64 {
        self.rows[row].rhs - self.state[row].fixed
    }

    fn assign(&mut self, var: usize, value: bool, queue: &mut VecDeque<usize>) {
        self.values[var] = Some(value);
        self.trail.push(var);
        let cost = self.cost[var];
        self.floor += if value { cost - cost.min(0.0) } else { -cost.min(0.0) };
        for (row, coefficient) in &self.occurrences[var] {
            let state = &mut self.state[*row];
            state.free -= 1;
            if *coefficient < 0 {
                state.min_free -= coefficient;
            } else {
                state.max_free -= coefficient;
            }
            if value {
                state.fixed += coefficient;
            }
            queue.push_back(*row);
        }
    }

    fn undo(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let Some(var) = self.trail.pop() else {
                break;
            };
            let Some(value) = self.values[var].take() else {
                continue;
            };
            let cost = self.cost[var];
            self.floor -= if value { cost - cost.min(0.0) } else { -cost.min(0.0) };
            for (row, coefficient) in &self.occurrences[var] {
                let state = &mut self.state[*row];
                state.free += 1;
                if *coefficient < 0 {
                    state.min_free += coefficient;
                } else {
                    state.max_free += coefficient;
                }
                if value {
                    state.fixed -= coefficient;
                }
            }
        }
    }

    /// Runs bounds propagation to a fixpoint; returns `false` on conflict.
    fn propagate(&mut self, mut queue: VecDeque<usize>) -> bool {
        while let Some(row) = queue.pop_front() {
            let state = self.state[row];
            let rhs = self.rows[row].rhs;
            let lowest = state.fixed + state.min_free;
            let highest = state.fixed + state.max_free;
            if rhs < lowest || rhs > highest {
                return false;
            }
            if state.free == 0 {
                continue;
            }
            let force_low = rhs == lowest;
            let force_high = rhs == highest;
            if !force_low && !force_high {
                continue;
            }
            for index in 0..self.rows[row].terms.len() {
                let (var, coefficient) = self.rows[row].terms[index];
                if self.values[var].is_some() {
                    continue;
                }
                // Low contribution: positive terms off, negative terms on.
                let value = if force_low { coefficient < 0 } else { coefficient > 0 };
                self.assign(var, value, &mut queue);
            }
        }
        true
    }

    fn try_value(&mut self, var: usize, value: bool) -> bool {
        let mut queue = VecDeque::new();
        self.assign(var, value, &mut queue);
        self.propagate(queue)
    }

    /// Cheapest chain of free variables that rebalances `start`, or at least `limit`.
    fn repair_cost(&mut self, start: usize, limit: f64) -> f64 {
        self.generation += 1;
        let mut best = f64::INFINITY;
        let mut heap = BinaryHeap::new();
        heap.push(Pending { cost: 0.0, row: start, more: self.residual(start) > 0 });

        while let Some(Pending { cost, row, more }) = heap.pop() {
            if cost >= best {
                break;
            }
            if cost >= limit {
                return limit;
            }
            let slot = 2 * row + usize::from(more);
            if self.settled[slot] == self.generation {
                continue;
            }
            self.settled[slot] = self.generation;

            for (var, coefficient) in &self.rows[row].terms {
                if self.values[*var].is_some() || (*coefficient > 0) != more {
                    continue;
                }
                let reached = cost + self.cost[*var];
                if reached >= best || reached >= limit {
                    continue;
                }
                let mut others =
                    self.occurrences[*var].iter().filter(|(other, _)| *other != row);
                match (others.next(), others.next()) {
                    (Some((other, other_coefficient)), None) => {
                        let residual = self.rows[*other].rhs - self.state[*other].fixed;
                        if residual != 0 && (residual > 0) == (*other_coefficient > 0) {
                            best = reached;
                        } else {
                            heap.push(Pending {
                                cost: reached,
                                row: *other,
                                more: *other_coefficient < 0,
                            });
                        }
                    }
                    _ => best = reached,
                }
            }
        }
        best
    }

    /// Whether the subtree under the current assignment cannot beat the incumbent.
    fn bound_prunes(&mut self) -> bool {
        let Some(best) = self.best.as_ref().map(|(_, best)| *best) else {
            return false;
        };
        let budget = best - 1e-9 - self.floor;
        if budget <= 0.0 {
            return true;
        }
        if !self.repair_bound {
            return false;
        }

        // Each repair chain ends on at most two unbalanced rows, so half the sum is a bound too.
        let mut total = 0.0;
        for row in 0..self.rows.len() {
            if self.residual(row) == 0 {
                continue;
            }
            let repair = self.repair_cost(row, budget);
            if repair >= budget {
                return true;
            }
            total += repair;
            if total / 2.0 >= budget {
                return true;
            }
        }
        false
    }

    /// Picks the cheapest free variable of the tightest row, and the value to try first.
    ///
    /// Unbalanced rows go first, so the search keeps extending the partial path.
    fn branch(&self) -> Option<(usize, bool)> {
        let mut tightest: Option<(usize, (bool, usize))> = None;
        for (row, state) in self.state.iter().enumerate() {
            if state.free == 0 {
                continue;
            }
            let key = (state.fixed == self.rows[row].rhs, state.free);
            if tightest.map_or(true, |(_, best)| key < best) {
                tightest = Some((row, key));
            }
        }

        if let Some((row, _)) = tightest {
            let fixed = self.state[row].fixed;
            let rhs = self.rows[row].rhs;
            let (var, coefficient) = self.rows[row]
                .terms
                .iter()
                .filter(|(var, _)| self.values[*var].is_none())
                .min_by(|(left, _), (right, _)| {
                    self.cost[*left].total_cmp(&self.cost[*right]).then(left.cmp(right))
                })
                .copied()?;
            let needs_more = fixed < rhs && coefficient > 0;
            let needs_less = fixed > rhs && coefficient < 0;
            return Some((var, needs_more || needs_less));
        }

        // Variables outside every row only move the objective.
        self.values
            .iter()
            .position(Option::is_none)
            .map(|var| (var, self.cost[var] < 0.0))
    }

    fn record_incumbent(&mut self) {
        let selection = self.values.iter().map(|value| *value == Some(true)).collect::<Vec<_>>();
        let objective = selection
            .iter()
            .zip(self.cost)
            .filter(|(selected, _)| **selected)
            .map(|(_, cost)| *cost)
            .sum::<f64>();
        if self.best.as_ref().map_or(true, |(_, best)| objective < *best) {
            debug!(objective, nodes = self.clock.nodes(), "cp: new incumbent");
            self.best = Some((selection, objective));
        }
    }

    /// Depth-first search over an explicit stack of open decisions.
    fn run(&mut self) {
        let mut frames: Vec<Frame> = Vec::new();
        let mut descend = true;
        loop {
            if descend {
                if !self.clock.tick() {
                    self.exhausted = true;
                    return;
                }
                descend = false;
                if !self.bound_prunes() {
                    match self.branch() {
                        None => self.record_incumbent(),
                        Some((var, first)) => {
                            let mark = self.trail.len();
                            frames.push(Frame { var, retry: Some(!first), mark });
                            descend = self.try_value(var, first);
                            if descend {
                                continue;
                            }
                        }
                    }
                }
            }

            let Some(frame) = frames.last_mut() else {
                return;
            };
            let (var, mark, retry) = (frame.var, frame.mark, frame.retry.take());
            self.undo(mark);
            match retry {
                Some(value) => descend = self.try_value(var, value),
                None => {
                    frames.pop();
                }
            }
        }
    }
}

impl Solver for ConstraintProgrammingBackend {
    fn solve(
        &self,
        program: &BinaryProgram,
        budget: &SolveBudget,
    ) -> Result<SolverResult, SolverError> {
        let mut search = Search::new(program, budget.start())?;
        let all_rows = (0..search.rows.len()).collect::<VecDeque<_>>();
        if !search.propagate(all_rows) {
            return Ok(SolverResult::from_search(program, None, false, 0));
        }
        search.run();

        let incumbent = match search.best {
            Some((values, _)) if program.is_feasible(&values) => Some(values),
            Some(_) => {
                return Err(SolverError::Numerical {
                    detail: "search produced an assignment violating a constraint".to_owned(),
                })
            }
            None => None,
        };
        Ok(SolverResult::from_search(program, incumbent, search.exhausted, search.clock.nodes()))
    }

    fn name(&self) -> &'static str {
        "cp"
    }
}
