//! End-to-end scenarios, run through the public `Solver` API the way a caller would.

use rsat::Solver;
use rsat_formula::{CnfFormula, Lit, Var};

fn solve_dimacs(text: &str) -> Option<bool> {
    let mut solver = Solver::new();
    solver.add_dimacs_cnf(text.as_bytes()).expect("parse failed");
    solver.solve()
}

/// S1: a single unit clause is trivially satisfiable, with the model assigning the variable true.
#[test]
fn trivial_sat() {
    let mut solver = Solver::new();
    solver.add_dimacs_cnf(&b"p cnf 1 1\n1 0\n"[..]).unwrap();

    assert_eq!(solver.solve(), Some(true));

    let model = solver.model().unwrap();
    assert!(model.contains(&Lit::from_dimacs(1)));
}

/// S2: a variable and its negation as separate unit clauses are trivially unsatisfiable.
#[test]
fn trivial_unsat() {
    assert_eq!(solve_dimacs("p cnf 1 2\n1 0\n-1 0\n"), Some(false));
}

/// S3: a classic small conflict-driven-learning benchmark, UNSAT.
#[test]
fn conflict_driven_learning_unsat() {
    let cnf = "\
p cnf 7 8
1 2 3 0
1 -3 -4 0
1 -4 -2 0
4 0
-1 6 7 0
-1 -6 -5 0
-1 -5 -7 0
5 0
";
    assert_eq!(solve_dimacs(cnf), Some(false));
}

/// Builds the clauses of a Tseitin XOR constraint `vars[0] ^ vars[1] ^ ... = target`.
///
/// One clause per assignment of odd (if `target` is false) or even (if `target` is true) parity,
/// i.e. per assignment that would *violate* the constraint: each such clause rules out exactly
/// that assignment by negating the literals that were true in it.
fn xor_clauses(vars: &[Var], target: bool) -> Vec<Vec<Lit>> {
    let n = vars.len();
    let mut clauses = vec![];
    for mask in 0..(1usize << n) {
        let parity = (mask.count_ones() % 2) == 1;
        if parity == target {
            // This assignment satisfies the XOR constraint, not a clause to add.
            continue;
        }
        let clause = (0..n)
            .map(|i| Lit::from_var(vars[i], mask & (1 << i) != 0))
            .collect();
        clauses.push(clause);
    }
    clauses
}

/// S4: the same XOR expression asserted equal to both a variable and its negation, with that
/// variable fixed true, is unsatisfiable.
#[test]
fn xor_chain_unsat() {
    let xs: Vec<Var> = (0..4).map(Var::from_index).collect();
    let v15 = Var::from_index(4);

    let mut all_vars = xs.clone();
    all_vars.push(v15);

    let mut clauses = xor_clauses(&all_vars, true); // x1^x2^x3^x4^v15 = 0  <=>  xor(xs) = v15
    clauses.extend(xor_clauses(&all_vars, false)); // xor(xs) = !v15
    clauses.push(vec![Lit::from_var(v15, false)]); // v15 = 1

    let formula = CnfFormula::from(clauses);

    let mut solver = Solver::new();
    solver.add_formula(&formula);
    assert_eq!(solver.solve(), Some(false));
}

/// S5: an assumption-driven UNSAT result reports a failing-assumption core containing the
/// assumption that was actually responsible.
#[test]
fn assumption_driven_unsat_with_core() {
    // (1 v 2), (-1 v 2), (1 v -2): forces 2 = true, so assuming -2 is inconsistent.
    let formula = cnf_formula_from_dimacs("1 2 0\n-1 2 0\n1 -2 0\n", 2);

    let mut solver = Solver::new();
    solver.add_formula(&formula);
    assert_eq!(solver.solve(), Some(true));

    let minus_2 = Lit::from_dimacs(-2);
    solver.assume(&[minus_2]);
    assert_eq!(solver.solve(), Some(false));
    assert!(solver.failed(minus_2));
}

/// S6: adding clauses between solves transitions between SAT and UNSAT as expected.
#[test]
fn incremental_resolve() {
    let mut solver = Solver::new();

    assert_eq!(solver.solve(), Some(true));

    solver.add_clause(&[Lit::from_dimacs(1), Lit::from_dimacs(2)]);
    assert_eq!(solver.solve(), Some(true));
    let model = solver.model().unwrap();
    assert!(model.contains(&Lit::from_dimacs(1)) || model.contains(&Lit::from_dimacs(2)));

    solver.add_clause(&[Lit::from_dimacs(-1)]);
    assert_eq!(solver.solve(), Some(true));
    let model = solver.model().unwrap();
    assert!(model.contains(&Lit::from_dimacs(2)));

    solver.add_clause(&[Lit::from_dimacs(-2)]);
    assert_eq!(solver.solve(), Some(false));
}

/// Boundary: the empty problem (no clauses at all) is satisfiable.
#[test]
fn empty_problem_is_sat() {
    let mut solver = Solver::new();
    assert_eq!(solver.solve(), Some(true));
}

/// Boundary: a problem containing an empty clause is unsatisfiable without any search.
#[test]
fn empty_clause_is_unsat() {
    let mut solver = Solver::new();
    solver.add_clause(&[]);
    assert_eq!(solver.solve(), Some(false));
}

/// Boundary: a clause containing both a literal and its negation is a tautology and is silently
/// discarded rather than influencing the search.
#[test]
fn tautological_clause_is_discarded() {
    let mut solver = Solver::new();
    solver.add_clause(&[Lit::from_dimacs(1), Lit::from_dimacs(-1)]);
    solver.add_clause(&[Lit::from_dimacs(-2)]);

    assert_eq!(solver.solve(), Some(true));
    let model = solver.model().unwrap();
    assert!(model.contains(&Lit::from_dimacs(-2)));
}

/// Boundary: duplicate literals within a clause are compressed rather than treated as distinct.
#[test]
fn duplicate_literals_are_compressed() {
    let mut solver = Solver::new();
    solver.add_clause(&[Lit::from_dimacs(1), Lit::from_dimacs(1)]);
    solver.add_clause(&[Lit::from_dimacs(-1)]);

    assert_eq!(solver.solve(), Some(false));
}

fn cnf_formula_from_dimacs(clauses: &str, vars: usize) -> CnfFormula {
    let text = format!("p cnf {} {}\n{}", vars, clauses.lines().count(), clauses);
    rsat_dimacs::DimacsParser::parse(text.as_bytes()).expect("parse failed")
}
