//! Call-graph resolution.
//!
//! Resolves chains of zero-argument accessor functions down to the string
//! literals they return. A function's value is its return expression read
//! as a `+` concatenation of string literals and bare calls; calls recurse.
//! Resolution is bounded three ways: a depth cap, a check against functions
//! already being resolved (cycles), and a step budget per top-level lookup,
//! so pathological graphs are rejected instead of hanging.
//!
//! Values are memoized together with the depth they need, and depth failures
//! together with the depth they were given. A lookup therefore gets the same
//! answer whether or not a neighbouring chain was resolved first.

use std::collections::{HashMap, HashSet};

use super::error::Rejection;
use super::scanner::FunctionDef;
use super::syntax::{parse_bare_call, parse_call_chain, parse_string_literal, split_concatenation};

/// Upper bound on function resolutions per top-level lookup.
const MAX_RESOLUTION_STEPS: usize = 10_000;

/// A function whose return expression concatenates two or more bare calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Composer<'a> {
    pub function: &'a FunctionDef,
    pub calls: Vec<&'a str>,
}

/// A resolved value and the number of stack frames its resolution used,
/// the function itself included.
#[derive(Debug, Clone)]
struct Resolved {
    value: String,
    height: usize,
}

/// Why a name did not resolve. `cyclic` is set when a cycle or the step
/// budget was hit anywhere below, which makes the failure depend on the
/// lookup path and unfit for memoization.
#[derive(Debug)]
struct Unresolved {
    rejection: Rejection,
    cyclic: bool,
}

impl From<Rejection> for Unresolved {
    fn from(rejection: Rejection) -> Self {
        Self {
            rejection,
            cyclic: false,
        }
    }
}

pub struct CallGraph<'a> {
    functions: Vec<&'a FunctionDef>,
    by_name: HashMap<&'a str, Vec<&'a FunctionDef>>,
    max_depth: usize,
    resolved: HashMap<&'a str, Resolved>,
    unresolvable: HashMap<&'a str, Rejection>,
    /// Largest remaining depth a name is known to fail with.
    too_deep: HashMap<&'a str, (usize, Rejection)>,
    steps: usize,
}

impl<'a> CallGraph<'a> {
    pub fn new(functions: &'a [FunctionDef], max_depth: usize) -> Self {
        let mut by_name: HashMap<&str, Vec<&FunctionDef>> = HashMap::new();
        for function in functions {
            by_name.entry(function.name.as_str()).or_default().push(function);
        }
        Self {
            functions: functions.iter().collect(),
            by_name,
            max_depth,
            resolved: HashMap::new(),
            unresolvable: HashMap::new(),
            too_deep: HashMap::new(),
            steps: 0,
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    /// Composer functions, roots (not called by another composer) first,
    /// each group in source order.
    pub fn composers(&self) -> Vec<Composer<'a>> {
        let composers: Vec<Composer<'a>> = self
            .functions
            .iter()
            .filter_map(|&function| {
                let calls = parse_call_chain(&function.return_expression)?;
                (calls.len() >= 2).then_some(Composer { function, calls })
            })
            .collect();

        let called: HashSet<&str> = composers
            .iter()
            .flat_map(|c| c.calls.iter().copied())
            .collect();
        let (roots, inner): (Vec<_>, Vec<_>) = composers
            .into_iter()
            .partition(|c| !called.contains(c.function.name.as_str()));

        roots.into_iter().chain(inner).collect()
    }

    /// Literal value of the function named `name`.
    pub fn resolve_function(&mut self, name: &str) -> Result<String, Rejection> {
        self.steps = 0;
        let mut stack = Vec::new();
        self.resolve_name(name, &mut stack)
            .map(|resolved| resolved.value)
            .map_err(|unresolved| unresolved.rejection)
    }

    /// Concatenated values of `names`, in order. Fails as a whole if any
    /// single call cannot be resolved.
    pub fn resolve_chain(&mut self, names: &[&str]) -> Result<String, Rejection> {
        let mut key = String::new();
        for name in names {
            key.push_str(&self.resolve_function(name)?);
        }
        Ok(key)
    }

    fn resolve_name(
        &mut self,
        name: &str,
        stack: &mut Vec<String>,
    ) -> Result<Resolved, Unresolved> {
        let remaining = self.max_depth.saturating_sub(stack.len());
        if let Some(resolved) = self.resolved.get(name)
            && resolved.height <= remaining
        {
            return Ok(resolved.clone());
        }
        if let Some(rejection) = self.unresolvable.get(name) {
            return Err(rejection.clone().into());
        }
        if let Some((failed_with, rejection)) = self.too_deep.get(name)
            && remaining <= *failed_with
        {
            return Err(rejection.clone().into());
        }

        let max_depth = self.max_depth;
        let limit_exceeded = || Rejection::RecursionLimitExceeded {
            function: name.to_string(),
            limit: max_depth,
        };
        self.steps += 1;
        if stack.iter().any(|n| n == name) || self.steps > MAX_RESOLUTION_STEPS {
            return Err(Unresolved {
                rejection: limit_exceeded(),
                cyclic: true,
            });
        }
        if remaining == 0 {
            return Err(limit_exceeded().into());
        }

        let Some((&key, definitions)) = self.by_name.get_key_value(name) else {
            return Err(Rejection::not_found(format!("definition of `{}`", name)).into());
        };
        let definitions = definitions.clone();

        stack.push(name.to_string());
        let mut first_error = None;
        let mut cyclic = false;
        let mut depth_limited = false;
        let mut found = None;
        for definition in definitions {
            match self.resolve_expression_in(&definition.return_expression, stack) {
                Ok(resolved) => {
                    found = Some(resolved);
                    break;
                }
                Err(unresolved) => {
                    cyclic |= unresolved.cyclic;
                    depth_limited |= matches!(
                        unresolved.rejection,
                        Rejection::RecursionLimitExceeded { .. }
                    );
                    first_error.get_or_insert(unresolved.rejection);
                }
            }
        }
        stack.pop();

        if let Some(inner) = found {
            let resolved = Resolved {
                value: inner.value,
                height: inner.height + 1,
            };
            if self
                .resolved
                .get(key)
                .is_none_or(|known| resolved.height < known.height)
            {
                self.resolved.insert(key, resolved.clone());
            }
            return Ok(resolved);
        }

        let rejection =
            first_error.unwrap_or_else(|| Rejection::not_found(format!("value for `{}`", name)));
        // A definition that only ran out of depth may still resolve from a
        // shallower call site.
        if !cyclic {
            if depth_limited {
                let known = self.too_deep.get(key).map_or(0, |(depth, _)| *depth);
                if remaining >= known {
                    self.too_deep.insert(key, (remaining, rejection.clone()));
                }
            } else if matches!(rejection, Rejection::NotFound { .. }) {
                self.unresolvable.insert(key, rejection.clone());
            }
        }
        Err(Unresolved { rejection, cyclic })
    }

    /// Value of `expr` and the height of its tallest call; literals alone
    /// have height zero.
    fn resolve_expression_in(
        &mut self,
        expr: &str,
        stack: &mut Vec<String>,
    ) -> Result<Resolved, Unresolved> {
        let mut value = String::new();
        let mut height = 0;
        for operand in split_concatenation(expr) {
            let operand = strip_parens(operand);
            if let Some(literal) = parse_string_literal(operand) {
                value.push_str(&literal);
            } else if let Some(callee) = parse_bare_call(operand) {
                let resolved = self.resolve_name(callee, stack)?;
                value.push_str(&resolved.value);
                height = height.max(resolved.height);
            } else {
                return Err(Rejection::not_found(format!(
                    "literal value in `{}`",
                    abbreviate(expr)
                ))
                .into());
            }
        }
        Ok(Resolved { value, height })
    }
}

fn strip_parens(operand: &str) -> &str {
    let mut operand = operand.trim();
    while let Some(inner) = operand
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
    {
        if super::syntax::find_closing(operand, 0) != Some(operand.len() - 1) {
            break;
        }
        operand = inner.trim();
    }
    operand
}

/// Shorten an expression for diagnostics.
pub fn abbreviate(expr: &str) -> String {
    const MAX_CHARS: usize = 48;
    let expr = expr.trim();
    if expr.chars().count() <= MAX_CHARS {
        expr.to_string()
    } else {
        let head: String = expr.chars().take(MAX_CHARS).collect();
        format!("{}…", head)
    }
}
