//! Keyword-based categorization of task titles.

use serde::{Deserialize, Serialize};

use super::TaskCategory;

/// One `(category, keywords)` rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub category: TaskCategory,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new(category: TaskCategory, keywords: &[&str]) -> Self {
        Self {
            category,
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Case-insensitive whole-word match; multi-word keywords match as a
    /// phrase.
    fn matches(&self, words: &[String]) -> bool {
        self.keywords.iter().any(|keyword| {
            let phrase: Vec<String> = tokenize(keyword);
            !phrase.is_empty() && words.windows(phrase.len()).any(|window| window == phrase.as_slice())
        })
    }
}

/// Ordered rules, evaluated first match wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryRules(Vec<CategoryRule>);

impl CategoryRules {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self(rules)
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.0
    }

    pub fn classify(&self, title: &str) -> Option<TaskCategory> {
        let words = tokenize(title);
        self.0
            .iter()
            .find(|rule| rule.matches(&words))
            .map(|rule| rule.category)
    }
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self(vec![
            CategoryRule::new(
                TaskCategory::Buy,
                &["buy", "groceries", "grocery", "shop", "purchase", "order", "pick up"],
            ),
            CategoryRule::new(
                TaskCategory::Appointment,
                &["appointment", "meeting", "doctor", "dentist", "call", "interview", "checkup"],
            ),
            CategoryRule::new(
                TaskCategory::Go,
                &["go", "visit", "travel", "drive", "walk", "trip", "commute"],
            ),
            CategoryRule::new(
                TaskCategory::Study,
                &["study", "read", "homework", "exam", "review", "learn", "class", "assignment"],
            ),
        ])
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}
