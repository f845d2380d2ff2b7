//! Queries referenced by checks

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static VARIABLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{(\w*?)\}").expect("variable pattern is valid"));

/// A saved query a check runs against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryDefinition {
    pub id: u64,
    pub name: String,
    pub statement: String,
}

impl QueryDefinition {
    pub fn new(id: u64, name: impl Into<String>, statement: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            statement: statement.into(),
        }
    }

    /// `{name}` placeholders in the statement, first occurrence order
    pub fn variables(&self) -> Vec<String> {
        let mut vars: Vec<String> = Vec::new();
        for cap in VARIABLE_RE.captures_iter(&self.statement) {
            let name = cap[1].to_string();
            if !vars.contains(&name) {
                vars.push(name);
            }
        }
        vars
    }

    pub fn has_variables(&self) -> bool {
        !self.variables().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variables() {
        let query = QueryDefinition::new(
            1,
            "Signups",
            "SELECT * FROM users WHERE created_at > {start} AND plan = {plan} OR {start} IS NULL",
        );
        assert_eq!(query.variables(), vec!["start", "plan"]);
        assert!(query.has_variables());
    }

    #[test]
    fn test_no_variables() {
        let query = QueryDefinition::new(2, "All", "SELECT '{not a var}' FROM users");
        assert!(!query.has_variables());
    }
}
