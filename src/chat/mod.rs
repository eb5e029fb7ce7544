//! Rule-based chat responder
//!
//! Replies are chosen by keyword matching: configured rules first (in
//! config order), then greetings, then questions naming a content section.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

use crate::config::{ChatRuleConfig, SiteConfig};
use crate::content::SiteContent;

lazy_static! {
    static ref WORD_RE: Regex = Regex::new(r"[\p{L}\p{N}']+").unwrap();
}

const GREETINGS: &[&str] = &["hi", "hello", "hey", "hiya", "greetings"];

/// Titles listed when asked about a section
const MAX_LISTED: usize = 5;

/// A keyword rule with its canned reply
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRule {
    pub keywords: Vec<String>,
    pub reply: String,
}

impl From<&ChatRuleConfig> for ChatRule {
    fn from(rule: &ChatRuleConfig) -> Self {
        Self {
            keywords: rule.keywords.iter().map(|k| normalize(k)).collect(),
            reply: rule.reply.clone(),
        }
    }
}

impl ChatRule {
    fn matches(&self, message: &str, tokens: &HashSet<String>) -> bool {
        self.keywords.iter().any(|keyword| {
            if keyword.contains(' ') {
                message.contains(keyword.as_str())
            } else {
                tokens.contains(keyword)
            }
        })
    }
}

/// Keyword matching responder
#[derive(Debug, Clone)]
pub struct ChatResponder {
    rules: Vec<ChatRule>,
    fallback: String,
}

impl ChatResponder {
    pub fn new(rules: Vec<ChatRule>, fallback: impl Into<String>) -> Self {
        Self {
            rules,
            fallback: fallback.into(),
        }
    }

    /// Build a responder from configured rules plus rules derived from
    /// the site content
    pub fn from_content(config: &SiteConfig, content: &SiteContent) -> Self {
        let mut rules: Vec<ChatRule> = config.chat.rules.iter().map(ChatRule::from).collect();

        let author = &content.profile.author;
        rules.push(ChatRule {
            keywords: GREETINGS.iter().map(|g| g.to_string()).collect(),
            reply: format!("Hello! I'm {}'s assistant. Ask me about my work.", author),
        });

        for (name, section) in &content.sections {
            if section.items.is_empty() {
                continue;
            }

            let titles: Vec<&str> = section
                .items
                .iter()
                .take(MAX_LISTED)
                .map(|item| item.title())
                .collect();

            let mut keywords = vec![normalize(name)];
            let label = normalize(&section.label);
            if !keywords.contains(&label) {
                keywords.push(label);
            }
            // "skills" also answers "skill"
            if let Some(singular) = keywords[0].strip_suffix('s').map(str::to_string) {
                keywords.push(singular);
            }

            rules.push(ChatRule {
                keywords,
                reply: format!("{}: {}.", section.label, titles.join(", ")),
            });
        }

        Self::new(rules, config.chat.fallback.clone())
    }

    /// Reply to a visitor message
    pub fn respond(&self, message: &str) -> String {
        let message = normalize(message);
        if message.is_empty() {
            return self.fallback.clone();
        }

        let tokens: HashSet<String> = WORD_RE
            .find_iter(&message)
            .map(|m| m.as_str().to_string())
            .collect();

        let reply = self
            .rules
            .iter()
            .find(|rule| rule.matches(&message, &tokens))
            .map(|rule| rule.reply.clone());

        match reply {
            Some(reply) => reply,
            None => {
                tracing::debug!("No chat rule matched: {:?}", message);
                self.fallback.clone()
            }
        }
    }
}

/// Lowercase and collapse whitespace
fn normalize(text: &str) -> String {
    text.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
