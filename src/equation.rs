//! Chemical Equation Parsing
//!
//! This module turns symbolic chemical equations such as `"2*A + B -> C"` into
//! structured [`Equation`] values that the reaction sets are built from.
//!
//! # Syntax
//!
//! - Terms are separated by `+`, e.g. `A + B`
//! - A term may carry an integer stoichiometric coefficient followed by `*`,
//!   e.g. `2*A`. Without a coefficient the stoichiometry is 1
//! - Substrates and products are separated by `->` (irreversible) or `<->`
//!   (reversible, only allowed for mass-action reactions)
//! - A bare `0` denotes an empty side, e.g. `A -> 0` (decay) or `0 -> A` (source)
//! - Whitespace around terms, `+`, `*` and arrows is insignificant. Whitespace
//!   inside a coefficient or species name is rejected, so `"A B -> C"` and
//!   `"2 A -> B"` fail instead of naming species `AB` or `2A`
//!
//! Species names must not be purely numeric and must not contain `*`, `+`, `<`
//! or `>`.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::NetworkError;

/// Arrow separating substrates from products in an irreversible equation
pub const ARROW: &str = "->";
/// Arrow separating both sides of a reversible equation
pub const REVERSIBLE_ARROW: &str = "<->";
/// Placeholder for an empty side of an equation
pub const EMPTY_SIDE: &str = "0";

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
    static ref NUMERIC: Regex = Regex::new(r"^[0-9]+(?:\.[0-9]*)?$").unwrap();
}

/// A single term of a chemical equation, e.g. `2*A`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub species: String,
    pub stoichiometry: u32,
}

impl Term {
    pub fn new(species: impl Into<String>, stoichiometry: u32) -> Self {
        Self {
            species: species.into(),
            stoichiometry,
        }
    }
}

impl Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.stoichiometry == 1 {
            write!(f, "{}", self.species)
        } else {
            write!(f, "{}*{}", self.stoichiometry, self.species)
        }
    }
}

/// A parsed, irreversible chemical equation
///
/// Each side holds its terms in the order they were written. A species that is
/// listed twice on the same side is merged into one term whose stoichiometry is
/// the sum of both coefficients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Equation {
    pub substrates: Vec<Term>,
    pub products: Vec<Term>,
}

impl Equation {
    /// Returns the equation with substrates and products swapped.
    ///
    /// This is how the reverse direction of a reversible reaction is derived.
    pub fn reversed(&self) -> Self {
        Self {
            substrates: self.products.clone(),
            products: self.substrates.clone(),
        }
    }

    /// Iterates over every species name on both sides, substrates first.
    pub fn species(&self) -> impl Iterator<Item = &str> {
        self.substrates
            .iter()
            .chain(self.products.iter())
            .map(|term| term.species.as_str())
    }
}

impl Display for Equation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            format_side(&self.substrates),
            ARROW,
            format_side(&self.products)
        )
    }
}

impl FromStr for Equation {
    type Err = NetworkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_equation(s)
    }
}

fn format_side(terms: &[Term]) -> String {
    if terms.is_empty() {
        return EMPTY_SIDE.to_string();
    }

    terms
        .iter()
        .map(|term| term.to_string())
        .collect::<Vec<_>>()
        .join(" + ")
}

/// Returns true if the equation uses the reversible arrow `<->`.
pub fn is_reversible(equation: &str) -> bool {
    equation.contains(REVERSIBLE_ARROW)
}

/// Removes all whitespace, giving the key under which an equation is compared.
pub fn compact(equation: &str) -> String {
    WHITESPACE.replace_all(equation, "").into_owned()
}

/// Parses a single term such as `"2*A"` or `"A"`.
///
/// # Arguments
///
/// * `term` - The term to parse. Whitespace is ignored.
///
/// # Returns
///
/// Returns the parsed [`Term`] or a [`NetworkError::MalformedTerm`] if the
/// coefficient is not a positive integer or the species name is invalid.
pub fn parse_term(term: &str) -> Result<Term, NetworkError> {
    parse_term_in(term, term)
}

/// Parses an irreversible equation such as `"2*A + B -> C"`.
///
/// # Arguments
///
/// * `equation` - The equation to parse. Must contain exactly one `->`.
///
/// # Returns
///
/// Returns the parsed [`Equation`] or an error describing why the equation is
/// malformed.
pub fn parse_equation(equation: &str) -> Result<Equation, NetworkError> {
    if is_reversible(equation) {
        return Err(NetworkError::ReversibleNotAllowed(equation.to_string()));
    }

    let (left, right) = split_sides(equation, ARROW)?;
    build_equation(equation, left, right)
}

/// Parses a reversible equation such as `"A + B <-> C"` in its forward direction.
///
/// # Arguments
///
/// * `equation` - The equation to parse. Must contain exactly one `<->`.
///
/// # Returns
///
/// Returns the forward [`Equation`]; use [`Equation::reversed`] for the
/// reverse direction.
pub fn parse_reversible(equation: &str) -> Result<Equation, NetworkError> {
    let (left, right) = split_sides(equation, REVERSIBLE_ARROW)?;

    if left.contains(ARROW) || right.contains(ARROW) {
        return Err(NetworkError::MultipleArrows(equation.to_string()));
    }

    build_equation(equation, left, right)
}

/// Parses either kind of equation, dispatching on the arrow it contains.
pub fn parse_any(equation: &str) -> Result<Equation, NetworkError> {
    if is_reversible(equation) {
        parse_reversible(equation)
    } else {
        parse_equation(equation)
    }
}

/// Discovers every distinct species referenced by the given equations.
///
/// Reversible and irreversible equations are both accepted. The result is
/// sorted, so equations that differ only in whitespace or term order yield the
/// same species list.
///
/// # Arguments
///
/// * `equations` - The equations to scan
///
/// # Returns
///
/// Returns the sorted, deduplicated species names or the first parse error.
pub fn discover_species<'a, I>(equations: I) -> Result<Vec<String>, NetworkError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut species = BTreeSet::new();

    for equation in equations {
        let parsed = parse_any(equation)?;
        species.extend(parsed.species().map(str::to_string));
    }

    Ok(species.into_iter().collect())
}

/// Splits the equation on exactly one arrow.
fn split_sides<'a>(equation: &'a str, arrow: &str) -> Result<(&'a str, &'a str), NetworkError> {
    match equation.matches(arrow).count() {
        0 => Err(NetworkError::MissingArrow(equation.to_string())),
        1 => equation
            .split_once(arrow)
            .ok_or_else(|| NetworkError::MissingArrow(equation.to_string())),
        _ => Err(NetworkError::MultipleArrows(equation.to_string())),
    }
}

fn build_equation(equation: &str, left: &str, right: &str) -> Result<Equation, NetworkError> {
    let substrates = parse_side(equation, left)?;
    let products = parse_side(equation, right)?;

    if substrates.is_empty() && products.is_empty() {
        return Err(NetworkError::MalformedTerm {
            equation: equation.to_string(),
            term: EMPTY_SIDE.to_string(),
            reason: "equation has neither substrates nor products".to_string(),
        });
    }

    Ok(Equation {
        substrates,
        products,
    })
}

fn parse_side(equation: &str, side: &str) -> Result<Vec<Term>, NetworkError> {
    if side.trim() == EMPTY_SIDE {
        return Ok(Vec::new());
    }

    let mut terms: Vec<Term> = Vec::new();
    for raw in side.split('+') {
        let term = parse_term_in(raw, equation)?;
        match terms.iter_mut().find(|t| t.species == term.species) {
            Some(existing) => existing.stoichiometry += term.stoichiometry,
            None => terms.push(term),
        }
    }

    Ok(terms)
}

fn parse_term_in(raw: &str, equation: &str) -> Result<Term, NetworkError> {
    let term = raw.trim();
    let malformed = |reason: &str| NetworkError::MalformedTerm {
        equation: equation.to_string(),
        term: term.to_string(),
        reason: reason.to_string(),
    };

    if term.is_empty() {
        return Err(malformed("empty term"));
    }

    let (coefficient, species) = match term.split_once('*') {
        Some((coefficient, species)) => (Some(coefficient.trim()), species.trim()),
        None => (None, term),
    };

    let stoichiometry = match coefficient {
        Some(coefficient) => coefficient
            .parse::<u32>()
            .map_err(|_| malformed("stoichiometric coefficient must be a positive integer"))?,
        None => 1,
    };

    if stoichiometry == 0 {
        return Err(malformed("stoichiometric coefficient must be a positive integer"));
    }

    if species.is_empty() {
        return Err(malformed("missing species name"));
    }

    if WHITESPACE.is_match(species) {
        return Err(malformed(
            "species names must not contain whitespace, separate terms with '+' and coefficients with '*'",
        ));
    }

    if species.contains('*') {
        return Err(malformed("expected '<coefficient>*<species>' or '<species>'"));
    }

    if NUMERIC.is_match(species) {
        return Err(malformed("species names must not be purely numeric"));
    }

    if species.contains(['+', '<', '>']) {
        return Err(malformed("species names must not contain '+', '<' or '>'"));
    }

    Ok(Term::new(species, stoichiometry))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_term_with_coefficient() {
        let term = parse_term("2*A").unwrap();
        assert_eq!(term, Term::new("A", 2));
    }

    #[test]
    fn test_parse_term_defaults_to_one() {
        let term = parse_term(" ATP ").unwrap();
        assert_eq!(term, Term::new("ATP", 1));
    }

    #[test]
    fn test_parse_term_rejects_invalid() {
        for term in ["", "2*", "*A", "1.5*A", "0*A", "x*A", "42", "A*B*C", "2*A*B", "2 A", "A B"] {
            assert!(
                matches!(parse_term(term), Err(NetworkError::MalformedTerm { .. })),
                "term '{}' should be rejected",
                term
            );
        }
    }

    #[test]
    fn test_parse_equation() {
        let equation = parse_equation("2*A + B -> C").unwrap();
        assert_eq!(equation.substrates, vec![Term::new("A", 2), Term::new("B", 1)]);
        assert_eq!(equation.products, vec![Term::new("C", 1)]);
    }

    #[test]
    fn test_parse_equation_whitespace_insensitive() {
        let compact = parse_equation("2*A+B->C").unwrap();
        let spaced = parse_equation("  2 * A +   B ->  C ").unwrap();
        assert_eq!(compact, spaced);
    }

    #[test]
    fn test_parse_equation_empty_sides() {
        let decay = parse_equation("A -> 0").unwrap();
        assert!(decay.products.is_empty());

        let source = parse_equation("0 -> A").unwrap();
        assert!(source.substrates.is_empty());
        assert_eq!(source.products, vec![Term::new("A", 1)]);

        assert!(parse_equation("0 -> 0").is_err());
    }

    #[test]
    fn test_parse_equation_merges_repeated_species() {
        let equation = parse_equation("A + A -> B").unwrap();
        assert_eq!(equation.substrates, vec![Term::new("A", 2)]);
    }

    #[test]
    fn test_parse_equation_arrows() {
        assert_eq!(
            parse_equation("A + B"),
            Err(NetworkError::MissingArrow("A + B".to_string()))
        );
        assert_eq!(
            parse_equation("A -> B -> C"),
            Err(NetworkError::MultipleArrows("A -> B -> C".to_string()))
        );
        assert_eq!(
            parse_equation("A <-> B"),
            Err(NetworkError::ReversibleNotAllowed("A <-> B".to_string()))
        );
        assert!(matches!(
            parse_equation("A + -> B"),
            Err(NetworkError::MalformedTerm { .. })
        ));
    }

    #[test]
    fn test_parse_equation_rejects_missing_separators() {
        for equation in ["A B -> C", "2 A -> B", "A -> C D", "S + E -> E + P Q"] {
            assert!(
                matches!(parse_equation(equation), Err(NetworkError::MalformedTerm { .. })),
                "equation '{}' should be rejected",
                equation
            );
        }
        assert!(discover_species(["A B <-> C"]).is_err());
    }

    #[test]
    fn test_parse_reversible() {
        let forward = parse_reversible("A + 2*B <-> C").unwrap();
        assert_eq!(forward.to_string(), "A + 2*B -> C");
        assert_eq!(forward.reversed().to_string(), "C -> A + 2*B");
        assert!(parse_reversible("A <-> B -> C").is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        let equation: Equation = "2*A + B -> 0".parse().unwrap();
        assert_eq!(equation.to_string(), "2*A + B -> 0");
        let reparsed: Equation = equation.to_string().parse().unwrap();
        assert_eq!(reparsed, equation);
    }

    #[test]
    fn test_discover_species() {
        let species = discover_species(["B + E -> E + C", "2*A <-> B", "C -> 0"]).unwrap();
        assert_eq!(species, vec!["A", "B", "C", "E"]);
    }

    #[test]
    fn test_discover_species_whitespace_stable() {
        let a = discover_species(["2*A + B -> C", "C <-> D"]).unwrap();
        let b = discover_species(["2 * A+B   ->C", "  C<->D"]).unwrap();
        assert_eq!(a, b);
    }
}
