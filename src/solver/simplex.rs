// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arcroute-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arcroute and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Bounded-variable two-phase simplex for `min c·x, A·x = b, l <= x <= u`.
//!
//! Column bounds stay implicit: a nonbasic column rests at its lower or upper bound and may flip
//! to the other one without a pivot, so the tableau only has one row per equality. Each row gets
//! an artificial column for phase one. Pivoting follows Bland's rule, so degenerate programs
//! (conservation rows always are) terminate.

use super::{BudgetClock, SolverError};

const EPS: f64 = 1e-9;
const FEASIBILITY_TOL: f64 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LinearProgram {
    pub cost: Vec<f64>,
    pub lower: Vec<f64>,
    pub upper: Vec<f64>,
    pub rows: Vec<LpRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LpRow {
    pub terms: Vec<(usize, f64)>,
    pub rhs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LpOutcome {
    Optimal { values: Vec<f64>, objective: f64 },
    Infeasible,
    /// The budget deadline passed mid-solve.
    Interrupted,
}

enum PhaseEnd {
    Optimal,
    Interrupted,
}

struct Tableau {
    /// `B⁻¹A` over structural columns followed by one artificial per row.
    cells: Vec<Vec<f64>>,
    /// Value of each row's basic column.
    values: Vec<f64>,
    basis: Vec<usize>,
    in_basis: Vec<bool>,
    lower: Vec<f64>,
    upper: Vec<f64>,
    at_upper: Vec<bool>,
    pivots: u64,
    pivot_limit: u64,
}

impl Tableau {
    fn width(&self) -> usize {
        self.lower.len()
    }

    fn resting_value(&self, column: usize) -> f64 {
        if self.at_upper[column] {
            self.upper[column]
        } else {
            self.lower[column]
        }
    }

    fn reduced_costs(&self, cost: &[f64]) -> Vec<f64> {
        let mut reduced = cost.to_vec();
        for (row, basic) in self.basis.iter().enumerate() {
            let weight = cost[*basic];
            if weight == 0.0 {
                continue;
            }
            for (value, cell) in reduced.iter_mut().zip(&self.cells[row]) {
                *value -= weight * cell;
            }
        }
        reduced
    }

    /// Makes `column` basic in `row`; basic values are left to the caller.
    fn pivot(&mut self, row: usize, column: usize) {
        let factor = self.cells[row][column];
        for value in &mut self.cells[row] {
            *value /= factor;
        }
        let pivot_row = std::mem::take(&mut self.cells[row]);
        for other in self.cells.iter_mut() {
            let Some(scale) = other.get(column).copied() else {
                continue;
            };
            if scale.abs() <= EPS {
                other[column] = 0.0;
                continue;
            }
            for (cell, pivot_cell) in other.iter_mut().zip(&pivot_row) {
                *cell -= scale * pivot_cell;
                if cell.abs() <= EPS {
                    *cell = 0.0;
                }
            }
        }
        self.cells[row] = pivot_row;

        let leaving = self.basis[row];
        self.in_basis[leaving] = false;
        self.in_basis[column] = true;
        self.at_upper[column] = false;
        self.basis[row] = column;
    }

    fn run_phase(
        &mut self,
        cost: &[f64],
        may_enter: impl Fn(usize) -> bool,
        clock: &BudgetClock,
    ) -> Result<PhaseEnd, SolverError> {
        let mut reduced = self.reduced_costs(cost);
        loop {
            if self.pivots >= self.pivot_limit {
                return Err(SolverError::IterationLimit { iterations: self.pivots });
            }
            if clock.expired() {
                return Ok(PhaseEnd::Interrupted);
            }

            let entering = (0..self.width()).find(|column| {
                let column = *column;
                if self.in_basis[column]
                    || !may_enter(column)
                    || self.upper[column] - self.lower[column] <= EPS
                {
                    return false;
                }
                if self.at_upper[column] {
                    reduced[column] > EPS
                } else {
                    reduced[column] < -EPS
                }
            });
            let Some(entering) = entering else {
                return Ok(PhaseEnd::Optimal);
            };
            let direction = if self.at_upper[entering] { -1.0 } else { 1.0 };

            // The entering column may move until its own opposite bound or until a basic
            // column hits one of its bounds, whichever comes first.
            let mut step = self.upper[entering] - self.lower[entering];
            let mut leaving: Option<(usize, bool)> = None;
            for row in 0..self.cells.len() {
                let rate = direction * self.cells[row][entering];
                let basic = self.basis[row];
                let (limit, to_upper) = if rate > EPS {
                    ((self.values[row] - self.lower[basic]) / rate, false)
                } else if rate < -EPS && self.upper[basic].is_finite() {
                    ((self.upper[basic] - self.values[row]) / -rate, true)
                } else {
                    continue;
                };
                let limit = limit.max(0.0);
                match leaving {
                    Some((best, _)) if (limit - step).abs() <= EPS => {
                        if basic < self.basis[best] {
                            leaving = Some((row, to_upper));
                        }
                    }
                    _ if limit < step - EPS => {
                        step = limit;
                        leaving = Some((row, to_upper));
                    }
                    _ => {}
                }
            }
            if !step.is_finite() {
                return Err(SolverError::Numerical {
                    detail: format!("relaxation unbounded along column {entering}"),
                });
            }

            if step > 0.0 {
                for (value, cells) in self.values.iter_mut().zip(&self.cells) {
                    *value -= direction * step * cells[entering];
                }
            }
            match leaving {
                None => self.at_upper[entering] = !self.at_upper[entering],
                Some((row, to_upper)) => {
                    let entered_value = self.resting_value(entering) + direction * step;
                    let left = self.basis[row];
                    self.pivot(row, entering);
                    self.at_upper[left] = to_upper;
                    self.values[row] = entered_value;
                    let factor = reduced[entering];
                    for (value, cell) in reduced.iter_mut().zip(&self.cells[row]) {
                        *value -= factor * cell;
                    }
                }
            }
            self.pivots += 1;
        }
    }
}

pub(crate) fn solve(lp: &LinearProgram, clock: &BudgetClock) -> Result<LpOutcome, SolverError> {
    let n = lp.cost.len();
    let m = lp.rows.len();
    let width = n + m;

    let mut lower = lp.lower.clone();
    lower.resize(width, 0.0);
    let mut upper = lp.upper.clone();
    upper.resize(width, f64::INFINITY);
    if (0..n).any(|column| lower[column] > upper[column] + EPS) {
        return Ok(LpOutcome::Infeasible);
    }

    // Structural columns start at their lower bounds; artificials absorb the residuals.
    let mut cells = Vec::with_capacity(m);
    let mut values = Vec::with_capacity(m);
    let mut basis = Vec::with_capacity(m);
    let mut in_basis = vec![false; width];
    for (i, row) in lp.rows.iter().enumerate() {
        if clock.expired() {
            return Ok(LpOutcome::Interrupted);
        }
        let mut cells_row = vec![0.0; width];
        let mut residual = row.rhs;
        for (column, coefficient) in &row.terms {
            cells_row[*column] += coefficient;
            residual -= coefficient * lower[*column];
        }
        if residual < 0.0 {
            for cell in &mut cells_row[..n] {
                *cell = -*cell;
            }
            residual = -residual;
        }
        cells_row[n + i] = 1.0;
        cells.push(cells_row);
        values.push(residual);
        basis.push(n + i);
        in_basis[n + i] = true;
    }

    let pivot_limit = 50_000 + 50 * (width as u64 + m as u64);
    let mut tableau = Tableau {
        cells,
        values,
        basis,
        in_basis,
        lower,
        upper,
        at_upper: vec![false; width],
        pivots: 0,
        pivot_limit,
    };

    let mut phase_one_cost = vec![0.0; width];
    phase_one_cost[n..].iter_mut().for_each(|cost| *cost = 1.0);
    if let PhaseEnd::Interrupted = tableau.run_phase(&phase_one_cost, |_| true, clock)? {
        return Ok(LpOutcome::Interrupted);
    }
    let infeasibility = tableau
        .basis
        .iter()
        .zip(&tableau.values)
        .filter(|(column, _)| **column >= n)
        .map(|(_, value)| *value)
        .sum::<f64>();
    if infeasibility > FEASIBILITY_TOL {
        return Ok(LpOutcome::Infeasible);
    }

    // Pivot zero-level artificials out; rows where that is impossible are redundant.
    for row in 0..m {
        if tableau.basis[row] < n {
            continue;
        }
        let replacement = (0..n).find(|column| {
            !tableau.in_basis[*column] && tableau.cells[row][*column].abs() > EPS
        });
        if let Some(column) = replacement {
            let resting = tableau.resting_value(column);
            tableau.pivot(row, column);
            tableau.values[row] = resting;
        }
    }
    for column in n..width {
        tableau.upper[column] = 0.0;
    }

    let mut phase_two_cost = lp.cost.clone();
    phase_two_cost.resize(width, 0.0);
    let structural = |column: usize| column < n;
    if let PhaseEnd::Interrupted = tableau.run_phase(&phase_two_cost, structural, clock)? {
        return Ok(LpOutcome::Interrupted);
    }

    let mut values = (0..n).map(|column| tableau.resting_value(column)).collect::<Vec<_>>();
    for (row, column) in tableau.basis.iter().enumerate() {
        if *column < n {
            let value = tableau.values[row];
            values[*column] = value.max(tableau.lower[*column]).min(tableau.upper[*column]);
        }
    }
    let objective = values.iter().zip(&lp.cost).map(|(value, cost)| value * cost).sum();
    Ok(LpOutcome::Optimal { values, objective })
}
