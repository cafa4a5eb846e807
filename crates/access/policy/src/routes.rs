//! Route requirement table
//!
//! Maps path prefixes to the requirement a route declares. Lookups pick the
//! longest prefix that matches on a path-segment boundary.

use crate::error::{Result, RouteTableError};
use access_types::{Role, RouteRequirement};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A single protected prefix
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRule {
    pub prefix: String,
    #[serde(flatten)]
    pub requirement: RouteRequirement,
}

impl RouteRule {
    pub fn new(prefix: impl Into<String>, requirement: RouteRequirement) -> Self {
        Self {
            prefix: prefix.into(),
            requirement,
        }
    }
}

/// How a path resolves against the table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteMatch<'a> {
    /// Listed as public; no identity needed
    Public,
    /// Protected by a specific rule
    Rule(&'a RouteRule),
    /// Protected, no rule matched; the default requirement applies
    Default,
}

impl RouteMatch<'_> {
    pub fn is_public(&self) -> bool {
        matches!(self, RouteMatch::Public)
    }

    /// Requirement to evaluate, `None` for public paths
    pub fn requirement(&self) -> Option<RouteRequirement> {
        match self {
            RouteMatch::Public => None,
            RouteMatch::Rule(rule) => Some(rule.requirement.clone()),
            RouteMatch::Default => Some(RouteRequirement::default()),
        }
    }
}

/// Ordered set of route rules plus the public path list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default)]
    pub public: Vec<String>,
    #[serde(default)]
    pub rules: Vec<RouteRule>,
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::care_defaults()
    }
}

impl RouteTable {
    /// Empty table: nothing public, every path gets the default requirement
    pub fn empty() -> Self {
        Self {
            public: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// The care application's screens
    pub fn care_defaults() -> Self {
        let public = [
            "/",
            "/sign-in",
            "/sign-up",
            "/pending",
            "/rejected",
            "/no-access",
            "/role-missing",
        ]
        .into_iter()
        .map(String::from)
        .collect();

        let rules = vec![
            RouteRule::new("/dashboard", RouteRequirement::approved()),
            RouteRule::new("/clients", RouteRequirement::role(Role::SupportWorker)),
            RouteRule::new("/goals", RouteRequirement::role(Role::SupportWorker)),
            RouteRule::new("/incidents", RouteRequirement::role(Role::SupportWorker)),
            RouteRule::new("/shift-notes", RouteRequirement::role(Role::SupportWorker)),
            RouteRule::new("/activities", RouteRequirement::role(Role::SupportWorker)),
            RouteRule::new(
                "/behavior-plans",
                RouteRequirement::role(Role::BehaviorPractitioner),
            ),
            RouteRule::new("/reports", RouteRequirement::role(Role::SupportCoordinator)),
            RouteRule::new("/family", RouteRequirement::role(Role::Family)),
            RouteRule::new("/admin", RouteRequirement::admin_only()),
        ];

        Self { public, rules }
    }

    /// Add a rule
    pub fn with_rule(mut self, rule: RouteRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Add a public path
    pub fn with_public(mut self, path: impl Into<String>) -> Self {
        self.public.push(path.into());
        self
    }

    /// Check prefixes and rule consistency
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for path in &self.public {
            check_prefix(path)?;
        }
        for rule in &self.rules {
            check_prefix(&rule.prefix)?;
            if !seen.insert(normalize(&rule.prefix)) {
                return Err(RouteTableError::DuplicatePrefix {
                    prefix: rule.prefix.clone(),
                });
            }
            if rule.requirement.admin_only
                && rule.requirement.roles.iter().any(|r| *r != Role::Admin)
            {
                return Err(RouteTableError::ConflictingRequirement {
                    prefix: rule.prefix.clone(),
                });
            }
        }
        Ok(())
    }

    /// Resolve a request path
    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        let path = strip_query(path);

        // Public entries match exactly; "/" would otherwise swallow everything.
        if self.public.iter().any(|p| normalize(p) == normalize(path)) {
            return RouteMatch::Public;
        }

        self.rules
            .iter()
            .filter(|rule| prefix_matches(&rule.prefix, path))
            .max_by_key(|rule| normalize(&rule.prefix).len())
            .map(RouteMatch::Rule)
            .unwrap_or(RouteMatch::Default)
    }
}

fn check_prefix(prefix: &str) -> Result<()> {
    if !prefix.starts_with('/') {
        return Err(RouteTableError::InvalidPrefix {
            prefix: prefix.to_string(),
        });
    }
    Ok(())
}

fn strip_query(path: &str) -> &str {
    path.split(['?', '#']).next().unwrap_or(path)
}

fn normalize(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        "/"
    } else {
        trimmed
    }
}

fn prefix_matches(prefix: &str, path: &str) -> bool {
    let prefix = normalize(prefix);
    if prefix == "/" {
        return true;
    }
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}
