// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Shunting-yard conversion of the WHERE clause's infix token stream
//! (`"("`, `")"`, condition keys, logical operators) to postfix (§4.5).

use crate::condition::CONDITION_PREFIX;
use crate::operators::{priority_of, LogicalOperator};
use crate::structs::{Queue, Stack};

/// An ordered list of infix tokens: `"("`, `")"`, a `COND<k>` key, or a
/// logical operator (`"AND"`/`"OR"`).
#[derive(Debug, Default, Clone)]
pub struct InfixNotation {
    tokens: Vec<String>,
}

impl InfixNotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_token(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    pub fn size(&self) -> usize {
        self.tokens.len()
    }

    fn is_condition_key(val: &str) -> bool {
        val.starts_with(CONDITION_PREFIX)
    }

    /// Converts the collected infix tokens to postfix order.
    pub fn to_postfix(&self) -> Vec<String> {
        let mut stack: Stack<String> = Stack::new();
        let mut queue: Queue<String> = Queue::new();

        for val in &self.tokens {
            if Self::is_condition_key(val) {
                queue.push(val.clone());
            } else if LogicalOperator::is_logical_operator(val) {
                Self::process_operator(val, &mut stack, &mut queue);
            } else if val == "(" {
                stack.push(val.clone());
            } else if val == ")" {
                while stack.is_not_empty() && !stack.is_top_equal(&"(".to_string()) {
                    if let Some(item) = stack.pop() {
                        queue.push(item);
                    }
                }
                stack.pop();
            }
        }

        while stack.is_not_empty() {
            if let Some(item) = stack.pop() {
                queue.push(item);
            }
        }

        queue.pop_all_and_clear()
    }

    fn process_operator(val: &str, stack: &mut Stack<String>, queue: &mut Queue<String>) {
        let open = "(".to_string();
        match stack.top() {
            None => stack.push(val.to_string()),
            Some(top) if *top == open => stack.push(val.to_string()),
            Some(top) if priority_of(val) > priority_of(top) => stack.push(val.to_string()),
            _ => {
                while stack.is_not_empty() {
                    let top = stack.top().cloned().unwrap();
                    if top == open {
                        break;
                    }
                    if LogicalOperator::is_logical_operator(&top) && priority_of(&top) < priority_of(val) {
                        break;
                    }
                    stack.pop();
                    queue.push(top);
                }
                stack.push(val.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn postfix_of(tokens: &[&str]) -> Vec<String> {
        let mut n = InfixNotation::new();
        for t in tokens {
            n.add_token(*t);
        }
        n.to_postfix()
    }

    #[test]
    fn and_or_precedence() {
        // A AND B OR C AND D -> A B AND C D AND OR
        let postfix = postfix_of(&["COND0", "AND", "COND1", "OR", "COND2", "AND", "COND3"]);
        assert_eq!(
            postfix,
            vec!["COND0", "COND1", "AND", "COND2", "COND3", "AND", "OR"]
        );
    }

    #[test]
    fn parentheses_override_precedence() {
        // A OR (B AND C) -> A B C AND OR
        let postfix = postfix_of(&["COND0", "OR", "(", "COND1", "AND", "COND2", ")"]);
        assert_eq!(postfix, vec!["COND0", "COND1", "COND2", "AND", "OR"]);
    }

    #[test]
    fn single_condition_passes_through() {
        assert_eq!(postfix_of(&["COND0"]), vec!["COND0"]);
    }
}
