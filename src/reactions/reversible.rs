//! Reversible Reaction Splitting
//!
//! Mass-action kinetics only knows irreversible reactions, so every `<->`
//! equation is expanded into a forward and a reverse reaction before the
//! stoichiometry matrices are built. The reverse reaction is obtained by
//! swapping the parsed sides of the forward equation, which keeps every term
//! and its coefficient attached to the correct side regardless of how many
//! terms each side has.

use log::debug;

use crate::definition::ReactionEntry;
use crate::equation::{is_reversible, parse_equation, parse_reversible, Equation};
use crate::error::NetworkError;

/// An irreversible mass-action reaction with exactly one named rate constant
#[derive(Debug, Clone, PartialEq)]
pub struct ElementaryReaction {
    /// Equation text identifying the reaction
    pub label: String,
    pub equation: Equation,
    pub rate_name: String,
    pub rate: f64,
}

/// Expands reversible entries into forward and reverse elementary reactions.
///
/// # Arguments
///
/// * `entries` - Mass-action entries in insertion order
///
/// # Returns
///
/// Returns the elementary reactions in insertion order, with the reverse
/// direction of a reversible entry directly following its forward direction.
///
/// # Errors
///
/// * [`NetworkError::ReversibleConstants`] if a `<->` entry does not carry exactly two constants
/// * [`NetworkError::RateConstantCount`] if a `->` entry does not carry exactly one constant
/// * Any parse error of the equations themselves
pub fn split_reversible(entries: &[ReactionEntry]) -> Result<Vec<ElementaryReaction>, NetworkError> {
    let mut reactions = Vec::with_capacity(entries.len());

    for entry in entries {
        if is_reversible(&entry.equation) {
            let [(forward_name, forward_rate), (reverse_name, reverse_rate)] =
                entry.constants.as_slice()
            else {
                return Err(NetworkError::ReversibleConstants {
                    equation: entry.equation.clone(),
                    found: entry.constants.len(),
                });
            };

            let forward = parse_reversible(&entry.equation)?;
            let reverse = forward.reversed();

            debug!(
                "Split reversible reaction '{}' into '{}' and '{}'",
                entry.equation, forward, reverse
            );

            reactions.push(ElementaryReaction {
                label: entry.equation.replacen("<->", "->", 1),
                equation: forward,
                rate_name: forward_name.clone(),
                rate: *forward_rate,
            });
            reactions.push(ElementaryReaction {
                label: reverse.to_string(),
                equation: reverse,
                rate_name: reverse_name.clone(),
                rate: *reverse_rate,
            });
        } else {
            let [(rate_name, rate)] = entry.constants.as_slice() else {
                return Err(NetworkError::RateConstantCount {
                    equation: entry.equation.clone(),
                    found: entry.constants.len(),
                });
            };

            reactions.push(ElementaryReaction {
                label: entry.equation.clone(),
                equation: parse_equation(&entry.equation)?,
                rate_name: rate_name.clone(),
                rate: *rate,
            });
        }
    }

    Ok(reactions)
}
