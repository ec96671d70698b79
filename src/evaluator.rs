use crate::ast::{BlockStatement, Expression, InfixOp, Program, Statement};
use crate::value::{is_truthy, Value};
use std::collections::HashMap;
use tracing::trace;

/// Flat variable store. Blocks, `if` and `while` share the one instance.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn set(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.values.remove(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Tree-walking evaluator. Every failure (unknown name, mismatched operands,
/// division by zero) is an absent value that propagates upward.
#[derive(Debug, Default)]
pub struct Evaluator {
    environment: Environment,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_environment(environment: Environment) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    pub fn into_environment(self) -> Environment {
        self.environment
    }

    /// The program's value is the last non-null statement result.
    pub fn evaluate_program(&mut self, program: &Program) -> Option<Value> {
        let mut result = None;
        for statement in &program.statements {
            if let Some(value) = self.evaluate_statement(statement) {
                result = Some(value);
            }
        }
        result
    }

    pub fn evaluate_statement(&mut self, statement: &Statement) -> Option<Value> {
        match statement {
            Statement::Expression { expression, .. } => self.evaluate_expression(expression),
            Statement::Assign { name, value, .. } => {
                let value = value.as_ref().and_then(|value| self.evaluate_expression(value));
                match value {
                    Some(value) => self.environment.set(&name.name, value),
                    None => {
                        self.environment.remove(&name.name);
                    }
                }
                None
            }
            Statement::Print { value, .. } => {
                let value = value.as_ref().and_then(|value| self.evaluate_expression(value));
                Some(Value::print(value))
            }
        }
    }

    /// Returns the first non-null statement result; the rest of the block is
    /// skipped.
    pub fn evaluate_block(&mut self, block: &BlockStatement) -> Option<Value> {
        block
            .statements
            .iter()
            .find_map(|statement| self.evaluate_statement(statement))
    }

    pub fn evaluate_expression(&mut self, expression: &Expression) -> Option<Value> {
        match expression {
            Expression::IntegerLiteral { value, .. } => Some(Value::Integer(*value)),
            Expression::Identifier(ident) => self.environment.get(&ident.name).cloned(),
            Expression::Infix { .. } => self.evaluate_infix_chain(expression),
            Expression::Prefix { .. } => None,
            Expression::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.evaluate_condition(condition);
                if is_truthy(condition.as_ref()) {
                    trace!("evaluating true branch");
                    self.evaluate_block(consequence)
                } else if let Some(alternative) = alternative {
                    trace!("evaluating false branch");
                    self.evaluate_block(alternative)
                } else {
                    None
                }
            }
            Expression::While {
                condition, body, ..
            } => {
                let mut iterations: u64 = 0;
                loop {
                    let value = self.evaluate_condition(condition);
                    if !is_truthy(value.as_ref()) {
                        trace!(iterations, "loop condition false");
                        return None;
                    }
                    iterations += 1;
                    if let Some(result) = self.evaluate_block(body) {
                        trace!(iterations, "loop body produced a value");
                        return Some(result);
                    }
                }
            }
        }
    }

    /// Evaluates a left-nested operator chain with a loop over its spine.
    /// Both sides of every operator always run: there is no short-circuiting.
    fn evaluate_infix_chain(&mut self, expression: &Expression) -> Option<Value> {
        let mut spine = Vec::new();
        let mut node = expression;
        while let Expression::Infix {
            left,
            operator,
            right,
            ..
        } = node
        {
            spine.push((*operator, right));
            node = &**left;
        }

        let mut result = self.evaluate_expression(node);
        for (operator, right) in spine.into_iter().rev() {
            let right = right
                .as_ref()
                .and_then(|right| self.evaluate_expression(right));
            let left = result.as_ref().and_then(Value::as_integer);
            let right = right.as_ref().and_then(Value::as_integer);
            result = match (left, right) {
                (Some(left), Some(right)) => evaluate_infix(operator, left, right),
                _ => None,
            };
        }
        result
    }

    fn evaluate_condition(&mut self, condition: &Option<Box<Expression>>) -> Option<Value> {
        condition
            .as_ref()
            .and_then(|condition| self.evaluate_expression(condition))
    }
}

fn evaluate_infix(operator: InfixOp, left: i64, right: i64) -> Option<Value> {
    let value = match operator {
        InfixOp::Add => Value::Integer(left.wrapping_add(right)),
        InfixOp::Subtract => Value::Integer(left.wrapping_sub(right)),
        InfixOp::Multiply => Value::Integer(left.wrapping_mul(right)),
        InfixOp::Divide => {
            if right == 0 {
                return None;
            }
            Value::Integer(left.wrapping_div(right))
        }
        InfixOp::Modulo => {
            if right == 0 {
                return None;
            }
            Value::Integer(left.wrapping_rem(right))
        }
        InfixOp::Greater => Value::from_bool(left > right),
        InfixOp::GreaterEqual => Value::from_bool(left >= right),
        InfixOp::Less => Value::from_bool(left < right),
        InfixOp::LessEqual => Value::from_bool(left <= right),
        InfixOp::Equal => Value::from_bool(left == right),
        InfixOp::NotEqual => Value::from_bool(left != right),
        // Operands are compared against 1 literally, not by truthiness.
        InfixOp::Or => Value::from_bool(left == 1 || right == 1),
        InfixOp::And => Value::from_bool(left == 1 && right == 1),
    };
    Some(value)
}
