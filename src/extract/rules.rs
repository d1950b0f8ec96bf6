//! Prioritized rule evaluation
//!
//! Each field is resolved by an ordered list of candidate rules. A rule
//! inspects a context and returns `Some` when it found a value; the first
//! present result wins. Keeping every rule a plain function makes each one
//! testable on its own.

/// A single candidate-resolution rule over a context `C`
pub type Rule<C, T> = fn(&C) -> Option<T>;

/// Evaluates `rules` in order and returns the first present result
pub fn first_present<C, T>(context: &C, rules: &[Rule<C, T>]) -> Option<T> {
    rules.iter().find_map(|rule| rule(context))
}
