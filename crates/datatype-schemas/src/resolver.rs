//! Reference resolution between named datatypes
//!
//! This module handles:
//! - Lookup of reference names in the registry (exact, case-sensitive match)
//! - Cycle detection for reference chains that consume no data
//! - A recursion bound on how often one datatype is re-entered along a
//!   data path, for legitimately recursive datatypes walked against deep data
//!
//! Resolution never mutates the registry. All per-call state lives in a
//! [`ResolverContext`] owned by the caller.
//!
//! Copyright (c) 2025 Datatype Team
//! Licensed under the Apache-2.0 license

use crate::model::Datatype;
use crate::registry::Registry;
use thiserror::Error;
use tracing::trace;

/// Default bound on re-entries of one datatype along one data path
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Failure to resolve a reference
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReferenceError {
    /// No datatype with this name is registered
    #[error("Referenced datatype '{name}' is not defined")]
    NotFound { name: String },

    /// Resolving would loop without consuming data, or the nesting bound was hit
    #[error("Reference to '{name}' exceeds the recursion bound of {max_depth}: {chain}")]
    CycleExceeded {
        name: String,
        chain: String,
        max_depth: usize,
    },
}

impl ReferenceError {
    /// Create a not-found error
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create a cycle error from the resolution chain that led to `name`
    pub fn cycle_exceeded(name: &str, chain: &[&str], max_depth: usize) -> Self {
        let chain = chain
            .iter()
            .copied()
            .chain(std::iter::once(name))
            .collect::<Vec<_>>()
            .join(" -> ");
        Self::CycleExceeded {
            name: name.to_string(),
            chain,
            max_depth,
        }
    }

    /// The reference name that failed
    pub fn name(&self) -> &str {
        match self {
            Self::NotFound { name } | Self::CycleExceeded { name, .. } => name,
        }
    }
}

/// Per-call resolution state
///
/// The stack holds every reference resolved along the current data path.
/// `frame_start` marks where the current data value began, so the names
/// above it are the ones resolved without descending into the data. The
/// datatype a walk starts from sits below `roots` and is not a resolution.
#[derive(Debug, Clone)]
pub struct ResolverContext<'a> {
    resolution_stack: Vec<&'a str>,
    frame_start: usize,
    roots: usize,
    max_depth: usize,
}

impl<'a> ResolverContext<'a> {
    /// Create a new resolver context
    ///
    /// `max_depth` bounds how many times a datatype already resolved on the
    /// path may be resolved again. Chains of distinct datatypes are unbounded.
    pub fn new(max_depth: usize) -> Self {
        Self {
            resolution_stack: Vec::new(),
            frame_start: 0,
            roots: 0,
            max_depth,
        }
    }

    /// Check whether `name` may be resolved from the current position
    pub fn check(&self, name: &str) -> Result<(), ReferenceError> {
        if self.resolution_stack[self.frame_start..].contains(&name)
            || self.resolutions(name) > self.max_depth
        {
            return Err(ReferenceError::cycle_exceeded(
                name,
                &self.resolution_stack,
                self.max_depth,
            ));
        }
        Ok(())
    }

    /// Record the datatype a walk starts from
    ///
    /// Same-value cycles back to it are still caught, but it does not count
    /// toward the re-entry bound.
    pub fn push_root(&mut self, name: &'a str) {
        self.resolution_stack.push(name);
        self.roots = self.resolution_stack.len();
    }

    /// Push a resolved name onto the resolution stack
    pub fn push(&mut self, name: &'a str) -> Result<(), ReferenceError> {
        self.check(name)?;
        self.resolution_stack.push(name);
        Ok(())
    }

    /// Pop a name from the resolution stack
    pub fn pop(&mut self) -> Option<&'a str> {
        let name = self.resolution_stack.pop();
        let len = self.resolution_stack.len();
        self.frame_start = self.frame_start.min(len);
        self.roots = self.roots.min(len);
        name
    }

    /// How many times `name` has been resolved along the current path,
    /// excluding the starting datatype
    pub fn resolutions(&self, name: &str) -> usize {
        self.resolution_stack[self.roots..]
            .iter()
            .filter(|resolved| **resolved == name)
            .count()
    }

    /// Mark descent into a child data value; returns the frame to restore
    pub fn enter_value(&mut self) -> usize {
        std::mem::replace(&mut self.frame_start, self.resolution_stack.len())
    }

    /// Restore the frame saved by [`enter_value`](Self::enter_value)
    pub fn leave_value(&mut self, saved: usize) {
        self.frame_start = saved;
    }

    /// Number of names on the resolution stack, the starting datatype included
    pub fn depth(&self) -> usize {
        self.resolution_stack.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// The resolution chain, outermost first
    pub fn chain(&self) -> &[&'a str] {
        &self.resolution_stack
    }
}

impl Default for ResolverContext<'_> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

/// Resolves reference names against an immutable registry
#[derive(Debug, Clone, Copy)]
pub struct ReferenceResolver<'r> {
    registry: &'r Registry,
}

impl<'r> ReferenceResolver<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self { registry }
    }

    /// Resolve `name` from the position described by `context`.
    ///
    /// Missing datatypes are reported before cycle checks.
    pub fn resolve(
        &self,
        name: &str,
        context: &ResolverContext<'_>,
    ) -> Result<&'r Datatype, ReferenceError> {
        let datatype = self
            .registry
            .get(name)
            .ok_or_else(|| ReferenceError::not_found(name))?;
        context.check(name)?;

        trace!(reference = name, depth = context.depth(), "Resolved datatype reference");
        Ok(datatype)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn registry() -> Registry {
        Registry::build(
            &json!({"$ref": "Node"}),
            vec![
                ("Node", json!({"properties": {"child": {"$ref": "Node"}}})),
                ("Alias", json!({"$ref": "Node"})),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_resolve_existing_and_missing() {
        let registry = registry();
        let resolver = ReferenceResolver::new(&registry);
        let context = ResolverContext::default();

        assert_eq!(resolver.resolve("Node", &context).unwrap().name, "Node");
        assert_eq!(
            resolver.resolve("Missing", &context).unwrap_err(),
            ReferenceError::not_found("Missing")
        );
    }

    #[test]
    fn test_same_value_cycle_is_rejected() {
        let mut context = ResolverContext::default();
        context.push("Alias").unwrap();
        context.push("Node").unwrap();

        let err = context.check("Alias").unwrap_err();
        assert!(matches!(
            err,
            ReferenceError::CycleExceeded { ref chain, .. } if chain == "Alias -> Node -> Alias"
        ));
    }

    #[test]
    fn test_descending_into_data_allows_revisit() {
        let mut context = ResolverContext::default();
        context.push("Node").unwrap();
        let saved = context.enter_value();
        assert!(context.push("Node").is_ok());
        context.pop();
        context.leave_value(saved);

        assert!(context.check("Node").is_err());
        context.pop();
        assert!(context.check("Node").is_ok());
    }

    #[test]
    fn test_reentry_bound() {
        let mut context = ResolverContext::new(3);
        for _ in 0..4 {
            context.push("Node").unwrap();
            context.enter_value();
        }
        assert_eq!(context.resolutions("Node"), 4);
        let err = context.check("Node").unwrap_err();
        assert!(matches!(err, ReferenceError::CycleExceeded { max_depth: 3, .. }));
    }

    #[test]
    fn test_distinct_names_are_not_bounded() {
        let names: Vec<String> = (0..40).map(|i| format!("A{}", i)).collect();
        let mut context = ResolverContext::new(1);
        for name in &names {
            context.push(name).unwrap();
            context.enter_value();
        }
        assert_eq!(context.depth(), 40);
    }

    #[test]
    fn test_root_is_not_counted() {
        let mut context = ResolverContext::new(1);
        context.push_root("Node");
        context.enter_value();
        context.push("Node").unwrap();
        context.enter_value();
        context.push("Node").unwrap();
        context.enter_value();

        assert_eq!(context.resolutions("Node"), 2);
        assert!(context.check("Node").is_err());
    }

    #[test]
    fn test_root_same_value_cycle_is_rejected() {
        let mut context = ResolverContext::default();
        context.push_root("$primary");
        assert!(context.check("$primary").is_err());
    }

    #[test]
    fn test_missing_reported_before_cycle() {
        let registry = Registry::build(&json!({}), Vec::<(String, Value)>::new()).unwrap();
        let resolver = ReferenceResolver::new(&registry);
        let context = ResolverContext::new(0);
        assert!(matches!(
            resolver.resolve("Nope", &context),
            Err(ReferenceError::NotFound { .. })
        ));
    }
}
