// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use tracing::debug;

use super::simplex::{self, LinearProgram, LpOutcome, LpRow};
use super::{BudgetClock, SolveBudget, Solver, SolverError, SolverResult};
use crate::formulation::BinaryProgram;

/// Branch-and-bound over LP relaxations.
///
/// A node fixes variables by collapsing their bounds and solves the relaxation of the whole
/// program; nodes whose bound cannot beat the incumbent are pruned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixedIntegerBackend {
    /// Distance from 0/1 under which a relaxed value counts as integral.
    pub integrality_tolerance: f64,
}

impl Default for MixedIntegerBackend {
    fn default() -> Self {
        Self { integrality_tolerance: 1e-6 }
    }
}

enum Relaxation {
    Infeasible,
    Interrupted,
    Solved { values: Vec<f64>, bound: f64 },
}

fn relaxation_rows(program: &BinaryProgram) -> Vec<LpRow> {
    program
        .constraints()
        .iter()
        .map(|constraint| LpRow {
            terms: constraint.terms().iter().map(|term| (term.var, term.coefficient)).collect(),
            rhs: constraint.rhs(),
        })
        .collect()
}

impl MixedIntegerBackend {
    fn relax(
        &self,
        program: &BinaryProgram,
        rows: &[LpRow],
        fixings: &[Option<bool>],
        clock: &BudgetClock,
    ) -> Result<Relaxation, SolverError> {
        let bound_of = |fixing: &Option<bool>, free: f64| match fixing {
            Some(true) => 1.0,
            Some(false) => 0.0,
            None => free,
        };
        let lp = LinearProgram {
            cost: program.objective().to_vec(),
            lower: fixings.iter().map(|fixing| bound_of(fixing, 0.0)).collect(),
            upper: fixings.iter().map(|fixing| bound_of(fixing, 1.0)).collect(),
            rows: rows.to_vec(),
        };

        Ok(match simplex::solve(&lp, clock)? {
            LpOutcome::Infeasible => Relaxation::Infeasible,
            LpOutcome::Interrupted => Relaxation::Interrupted,
            LpOutcome::Optimal { values, objective } => {
                Relaxation::Solved { values, bound: objective }
            }
        })
    }

    fn fractional_column(&self, values: &[f64]) -> Option<usize> {
        values
            .iter()
            .enumerate()
            .filter(|(_, value)| (**value).min(1.0 - **value) > self.integrality_tolerance)
            .min_by(|(left_col, left), (right_col, right)| {
                (**left - 0.5)
                    .abs()
                    .total_cmp(&(**right - 0.5).abs())
                    .then(left_col.cmp(right_col))
            })
            .map(|(column, _)| column)
    }
}

impl Solver for MixedIntegerBackend {
    fn solve(
        &self,
        program: &BinaryProgram,
        budget: &SolveBudget,
    ) -> Result<SolverResult, SolverError> {
        let mut clock = budget.start();
        let rows = relaxation_rows(program);
        let mut stack = vec![vec![None; program.variable_count()]];
        let mut incumbent: Option<(Vec<bool>, f64)> = None;
        let mut exhausted = false;

        while let Some(fixings) = stack.pop() {
            if !clock.tick() {
                exhausted = true;
                break;
            }

            let (values, bound) = match self.relax(program, &rows, &fixings, &clock)? {
                Relaxation::Infeasible => continue,
                Relaxation::Interrupted => {
                    exhausted = true;
                    break;
                }
                Relaxation::Solved { values, bound } => (values, bound),
            };
            if incumbent.as_ref().is_some_and(|(_, best)| bound >= *best - 1e-9) {
                continue;
            }

            match self.fractional_column(&values) {
                None => {
                    let selection = values.iter().map(|value| *value > 0.5).collect::<Vec<_>>();
                    if !program.is_feasible(&selection) {
                        return Err(SolverError::Numerical {
                            detail: "rounded relaxation violates a constraint".to_owned(),
                        });
                    }
                    let objective = program.evaluate(&selection);
                    if incumbent.as_ref().map_or(true, |(_, best)| objective < *best - 1e-9) {
                        debug!(objective, nodes = clock.nodes(), "mip: new incumbent");
                        incumbent = Some((selection, objective));
                    }
                }
                Some(var) => {
                    let prefer_one = values[var] >= 0.5;
                    let mut zero = fixings.clone();
                    zero[var] = Some(false);
                    let mut one = fixings;
                    one[var] = Some(true);
                    // Depth-first: the preferred child is pushed last so it is explored first.
                    if prefer_one {
                        stack.push(zero);
                        stack.push(one);
                    } else {
                        stack.push(one);
                        stack.push(zero);
                    }
                }
            }
        }

        Ok(SolverResult::from_search(
            program,
            incumbent.map(|(values, _)| values),
            exhausted,
            clock.nodes(),
        ))
    }

    fn name(&self) -> &'static str {
        "mip"
    }
}
