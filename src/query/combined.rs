//! Parser for boolean combinator queries.
//!
//! Reduces a query such as `created NOT (and OR but)` to two flat lists:
//! the phrases to include and the phrases to exclude. `OR` separates
//! alternatives, `AND` joins its neighbours into phrases (distributing over
//! groups), and `NOT` moves the following token or group to the exclude
//! list.

use pest::Parser;
use pest::iterators::Pair;
use pest_derive::Parser;

use crate::error::{Result, VersicleError};

/// Pest grammar parser for combinator queries.
#[derive(Parser)]
#[grammar = "query/combined.pest"]
struct CombinedQueryParser;

const AND: &str = "AND";
const OR: &str = "OR";
const NOT: &str = "NOT";

/// Parenthesized structure of a query, before reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Token(String),
    Group(Vec<Node>),
}

/// A reduced combinator query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedQuery {
    /// Groups to include, each a space-joined phrase.
    pub word_list: Vec<String>,
    /// Groups to exclude.
    pub not_list: Vec<String>,
}

impl CombinedQuery {
    /// Parse and reduce `query`.
    ///
    /// # Example
    ///
    /// ```
    /// use versicle::query::CombinedQuery;
    ///
    /// let query = CombinedQuery::parse("(in OR on) AND (the OR a)").unwrap();
    /// assert_eq!(query.word_list, vec!["in the", "in a", "on the", "on a"]);
    /// ```
    pub fn parse(query: &str) -> Result<Self> {
        let pairs = CombinedQueryParser::parse(Rule::query, query).map_err(|e| {
            VersicleError::invalid_argument(format!("Failed to parse combined query: {}", e))
        })?;

        let mut nodes = Vec::new();
        for pair in pairs {
            if pair.as_rule() == Rule::query {
                nodes.extend(pair.into_inner().filter_map(Self::parse_node));
            }
        }

        let (word_list, not_list) = reduce(&nodes);
        Ok(CombinedQuery {
            word_list: word_list.iter().map(|phrase| collapse(phrase)).collect(),
            not_list: not_list.iter().map(|phrase| collapse(phrase)).collect(),
        })
    }

    fn parse_node(pair: Pair<Rule>) -> Option<Node> {
        match pair.as_rule() {
            Rule::top_token | Rule::token => Some(Node::Token(pair.as_str().to_string())),
            Rule::group => Some(Node::Group(
                pair.into_inner().filter_map(Self::parse_node).collect(),
            )),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.word_list.is_empty() && self.not_list.is_empty()
    }
}

fn reduce(nodes: &[Node]) -> (Vec<String>, Vec<String>) {
    let mut working: Vec<String> = Vec::new();
    let mut not_acc: Vec<String> = Vec::new();

    for node in nodes {
        match node {
            Node::Token(token) if token == OR => {}
            Node::Token(token) if token == AND => working.push(AND.to_string()),
            Node::Token(token) => match working.last().map(String::as_str) {
                Some(AND) => {
                    working.pop();
                    for word in working.iter_mut() {
                        *word = format!("{word} {token}");
                    }
                }
                Some(NOT) => {
                    working.pop();
                    not_acc.push(token.clone());
                }
                _ => working.push(token.clone()),
            },
            Node::Group(group) => {
                let (sub_words, sub_not) = reduce(group);
                not_acc.extend(sub_not);
                match working.last().map(String::as_str) {
                    Some(AND) => {
                        working.pop();
                        working = working
                            .iter()
                            .flat_map(|word| {
                                sub_words.iter().map(move |sub| format!("{word} {sub}"))
                            })
                            .collect();
                    }
                    Some(NOT) => {
                        working.pop();
                        not_acc.extend(sub_words);
                    }
                    _ => working.extend(sub_words),
                }
            }
        }
    }

    // An operator with nothing after it has nothing to apply to.
    while matches!(working.last().map(String::as_str), Some(AND | NOT)) {
        working.pop();
    }

    (working, not_acc)
}

fn collapse(phrase: &str) -> String {
    phrase.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(query: &str) -> (Vec<String>, Vec<String>) {
        let query = CombinedQuery::parse(query).unwrap();
        (query.word_list, query.not_list)
    }

    #[test]
    fn test_and() {
        assert_eq!(parse("a AND b"), (vec!["a b".to_string()], vec![]));
    }

    #[test]
    fn test_or() {
        assert_eq!(parse("a OR b"), (vec!["a".to_string(), "b".to_string()], vec![]));
        assert_eq!(parse("a b"), (vec!["a".to_string(), "b".to_string()], vec![]));
    }

    #[test]
    fn test_not_group() {
        assert_eq!(
            parse("a NOT (b OR c)"),
            (vec!["a".to_string()], vec!["b".to_string(), "c".to_string()])
        );
        assert_eq!(
            parse("created NOT (and OR but)"),
            (
                vec!["created".to_string()],
                vec!["and".to_string(), "but".to_string()]
            )
        );
    }

    #[test]
    fn test_not_token() {
        assert_eq!(
            parse("a NOT b c"),
            (vec!["a".to_string(), "c".to_string()], vec!["b".to_string()])
        );
    }

    #[test]
    fn test_group_and_token() {
        assert_eq!(
            parse("(a OR b) AND c"),
            (vec!["a c".to_string(), "b c".to_string()], vec![])
        );
    }

    #[test]
    fn test_cartesian_product() {
        let (words, _) = parse("(in OR on) AND (the OR a)");
        assert_eq!(words, vec!["in the", "in a", "on the", "on a"]);
    }

    #[test]
    fn test_nested_not_propagates() {
        assert_eq!(
            parse("(a NOT b) AND c"),
            (vec!["a c".to_string()], vec!["b".to_string()])
        );
    }

    #[test]
    fn test_nested_groups() {
        let (words, _) = parse("((a OR b) AND c) OR d");
        assert_eq!(words, vec!["a c", "b c", "d"]);
    }

    #[test]
    fn test_unclosed_group() {
        let (words, _) = parse("a AND (b OR c");
        assert_eq!(words, vec!["a b", "a c"]);
    }

    #[test]
    fn test_stray_close_paren() {
        let (words, _) = parse("a) b");
        assert_eq!(words, vec!["a)", "b"]);
    }

    #[test]
    fn test_dangling_operator() {
        assert_eq!(parse("a AND"), (vec!["a".to_string()], vec![]));
        assert_eq!(parse("a NOT"), (vec!["a".to_string()], vec![]));
    }

    #[test]
    fn test_empty() {
        let query = CombinedQuery::parse("   ").unwrap();
        assert!(query.is_empty());
    }
}
