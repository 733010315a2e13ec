use super::Renderer;
use crate::ast::{
    AggregateFunctionNode, BinaryOperationNode, BinaryOperator, OperationNode, RawNode,
    UnaryOperationNode, UnaryOperator, ValueNode,
};
use crate::error::FirebirdDbError;
use crate::types::RowValues;

fn binary_operator(operator: BinaryOperator) -> &'static str {
    match operator {
        BinaryOperator::Eq => "=",
        BinaryOperator::NotEq => "<>",
        BinaryOperator::Lt => "<",
        BinaryOperator::LtE => "<=",
        BinaryOperator::Gt => ">",
        BinaryOperator::GtE => ">=",
        BinaryOperator::Like => "like",
        BinaryOperator::NotLike => "not like",
        BinaryOperator::ILike => "containing",
        BinaryOperator::NotILike => "not containing",
        BinaryOperator::StartingWith => "starting with",
        BinaryOperator::In => "in",
        BinaryOperator::NotIn => "not in",
        BinaryOperator::Is => "is",
        BinaryOperator::IsNot => "is not",
        BinaryOperator::Plus => "+",
        BinaryOperator::Minus => "-",
        BinaryOperator::Multiply => "*",
        BinaryOperator::Divide => "/",
        BinaryOperator::Concat => "||",
    }
}

impl Renderer {
    pub(super) fn visit_value(&mut self, value: &ValueNode) -> Result<(), FirebirdDbError> {
        if value.immediate {
            if matches!(value.value, RowValues::Float(f) if !f.is_finite()) {
                return Err(FirebirdDbError::CompileError(format!(
                    "immediate value {} has no SQL literal form",
                    value.value
                )));
            }
            self.append(&value.value.to_sql_literal());
        } else {
            self.append_parameter(&value.value);
        }
        Ok(())
    }

    pub(super) fn visit_value_list(&mut self, values: &[OperationNode]) -> Result<(), FirebirdDbError> {
        if values.is_empty() {
            return Err(FirebirdDbError::CompileError(
                "value list must contain at least one value".into(),
            ));
        }
        self.append("(");
        self.visit_list(values, ", ")?;
        self.append(")");
        Ok(())
    }

    pub(super) fn visit_binary(&mut self, op: &BinaryOperationNode) -> Result<(), FirebirdDbError> {
        self.visit(&op.left)?;
        self.append(" ");
        self.append(binary_operator(op.operator));
        self.append(" ");
        self.visit(&op.right)
    }

    pub(super) fn visit_unary(&mut self, op: &UnaryOperationNode) -> Result<(), FirebirdDbError> {
        self.append(match op.operator {
            UnaryOperator::Not => "not ",
            UnaryOperator::Exists => "exists ",
            UnaryOperator::NotExists => "not exists ",
            UnaryOperator::Negate => "-",
        });
        let operand_start = self.sql.len();
        self.visit(&op.operand)?;
        // `--` would open a line comment
        if op.operator == UnaryOperator::Negate && self.sql[operand_start..].starts_with('-') {
            self.sql.insert(operand_start, ' ');
        }
        Ok(())
    }

    pub(super) fn visit_logical(
        &mut self,
        left: &OperationNode,
        keyword: &str,
        right: &OperationNode,
    ) -> Result<(), FirebirdDbError> {
        self.visit(left)?;
        self.append(" ");
        self.append(keyword);
        self.append(" ");
        self.visit(right)
    }

    pub(super) fn visit_aggregate(
        &mut self,
        aggregate: &AggregateFunctionNode,
    ) -> Result<(), FirebirdDbError> {
        self.append(&aggregate.name);
        self.append("(");
        if aggregate.distinct {
            self.append("distinct ");
        }
        self.visit_list(&aggregate.arguments, ", ")?;
        self.append(")");
        Ok(())
    }

    pub(super) fn visit_raw(&mut self, raw: &RawNode) -> Result<(), FirebirdDbError> {
        if raw.fragments.len() != raw.parameters.len() + 1 {
            return Err(FirebirdDbError::CompileError(format!(
                "raw sql has {} fragments for {} parameters",
                raw.fragments.len(),
                raw.parameters.len()
            )));
        }
        for (i, fragment) in raw.fragments.iter().enumerate() {
            self.append(fragment);
            if let Some(parameter) = raw.parameters.get(i) {
                self.visit(parameter)?;
            }
        }
        Ok(())
    }
}
