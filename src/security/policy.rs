//! JSON-RPC method admission policy.
//!
//! # Responsibilities
//! - Hold the allow-list and deny-list of method names
//! - Answer admission queries for a single method
//!
//! # Design Decisions
//! - Deny-list wins over allow-list
//! - Default deny: a method in neither list is rejected
//! - Exact, case-sensitive matching (no wildcards, no prefixes)
//! - Immutable after construction, shared via `Arc` without locks

use std::collections::HashSet;

use crate::config::ProxyConfig;
use crate::observability::metrics;

/// Outcome of evaluating a method against the policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    /// Method is whitelisted and not blacklisted.
    Allowed,
    /// Method is blacklisted.
    Blocked,
    /// Method appears in neither list.
    NotListed,
}

impl PolicyDecision {
    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyDecision::Allowed => "allowed",
            PolicyDecision::Blocked => "blocked",
            PolicyDecision::NotListed => "not_listed",
        }
    }
}

/// Method allow/deny policy.
#[derive(Debug, Clone, Default)]
pub struct MethodPolicy {
    allowed: HashSet<String>,
    blocked: HashSet<String>,
}

impl MethodPolicy {
    /// Build a policy from explicit method lists.
    pub fn new<A, B>(allowed: A, blocked: B) -> Self
    where
        A: IntoIterator,
        A::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            blocked: blocked.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the policy from the loaded configuration.
    pub fn from_config(config: &ProxyConfig) -> Self {
        let policy = Self::new(
            config.whitelisted_methods.iter().cloned(),
            config.blacklisted_methods.iter().cloned(),
        );

        for method in policy.allowed.intersection(&policy.blocked) {
            tracing::warn!(method = %method, "Method is both whitelisted and blacklisted; it will be blocked");
        }

        tracing::info!(
            whitelisted = policy.allowed.len(),
            blacklisted = policy.blocked.len(),
            "Method policy loaded"
        );

        policy
    }

    /// Classify a method against the two lists.
    pub fn evaluate(&self, method: &str) -> PolicyDecision {
        if self.blocked.contains(method) {
            PolicyDecision::Blocked
        } else if self.allowed.contains(method) {
            PolicyDecision::Allowed
        } else {
            PolicyDecision::NotListed
        }
    }

    /// Returns true if the method may be forwarded upstream.
    pub fn is_allowed(&self, method: &str) -> bool {
        let decision = self.evaluate(method);
        metrics::record_policy_decision(decision.as_str());

        match decision {
            PolicyDecision::Allowed => true,
            PolicyDecision::Blocked => {
                tracing::warn!(method = %method, "Blocked method");
                false
            }
            PolicyDecision::NotListed => {
                tracing::info!(method = %method, "Method not whitelisted or blacklisted");
                false
            }
        }
    }
}
