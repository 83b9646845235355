use crate::{
    ast::expressions::{BinaryOp, Expr, ExprKind, UnaryOp},
    type_checker::{symbols::c_safe_name, types::Type},
};

use super::{
    compiler::{declare, indent_lines, Compiler},
    stmt::gen_block_contents,
};

/// An expression lowered to C.
///
/// `prefix` holds statements that must run, in order, before `value` is
/// evaluated. Prefix lines are rendered relative to column zero.
#[derive(Debug, Clone, Default)]
pub struct Lowered {
    pub prefix: Vec<String>,
    pub value: String,
}

impl Lowered {
    pub fn pure(value: impl Into<String>) -> Self {
        Lowered {
            prefix: vec![],
            value: value.into(),
        }
    }

    fn with_prefix(prefix: Vec<String>, value: impl Into<String>) -> Self {
        Lowered {
            prefix,
            value: value.into(),
        }
    }
}

/// Normalises a C truth value to `0` or `1`.
fn normalise_bool(value: &str) -> String {
    format!("(({}) ? 1 : 0)", value)
}

fn is_literal(value: &str) -> bool {
    value.parse::<i64>().is_ok()
}

/// Stores `value` in a fresh temporary of type `ty`, returning the prefix
/// line and the temporary's name.
fn hoist(compiler: &mut Compiler, ty: &Type, value: &str) -> (String, String) {
    let temp = compiler.fresh_temp();
    (format!("{} = {};", declare(ty, &temp), value), temp)
}

/// Lowers expressions that C evaluates in unspecified order, such as
/// operands and arguments, so they still run left to right: a value that
/// precedes another operand's prefix is saved to a temporary first.
fn gen_sequence(compiler: &mut Compiler, expressions: &[&Expr]) -> (Vec<String>, Vec<String>) {
    let lowered: Vec<Lowered> = expressions
        .iter()
        .map(|expression| gen_expression(compiler, expression))
        .collect();

    let mut prefix = vec![];
    let mut values = vec![];
    for (index, item) in lowered.iter().enumerate() {
        prefix.extend(item.prefix.iter().cloned());

        let later_has_prefix = lowered[index + 1..]
            .iter()
            .any(|later| !later.prefix.is_empty());
        if later_has_prefix && !is_literal(&item.value) {
            let ty = compiler.analysis.type_of(expressions[index]);
            let (line, temp) = hoist(compiler, &ty, &item.value);
            prefix.push(line);
            values.push(temp);
        } else {
            values.push(item.value.clone());
        }
    }

    (prefix, values)
}

/// Whether `expression` denotes storage that `&` can point at directly.
fn is_lvalue(compiler: &Compiler, expression: &Expr) -> bool {
    match &expression.kind {
        ExprKind::Identifier(_) => compiler.analysis.variable_for(expression).is_some(),
        ExprKind::Dereference(_) => true,
        ExprKind::FieldAccess { object, .. } => is_lvalue(compiler, object),
        _ => false,
    }
}

/// Field-wise comparison of two struct values, nested structs included.
fn struct_equality(ty: &Type, left: &str, right: &str) -> String {
    let Type::Struct(structure) = ty else {
        return format!("(({}) == ({}))", left, right);
    };
    if structure.fields.is_empty() {
        return String::from("1");
    }

    structure
        .fields
        .iter()
        .map(|(field, field_type)| {
            let field = c_safe_name(field);
            struct_equality(
                field_type,
                &format!("({}).{}", left, field),
                &format!("({}).{}", right, field),
            )
        })
        .collect::<Vec<_>>()
        .join(" && ")
}

fn gen_binary(compiler: &mut Compiler, operator: BinaryOp, left: &Expr, right: &Expr) -> Lowered {
    let operand_type = compiler.analysis.type_of(left);

    if operator == BinaryOp::Equals {
        if let Type::Struct(_) = operand_type {
            let left_lowered = gen_expression(compiler, left);
            let right_lowered = gen_expression(compiler, right);

            let mut prefix = left_lowered.prefix;
            let (line, left_temp) = hoist(compiler, &operand_type, &left_lowered.value);
            prefix.push(line);
            prefix.extend(right_lowered.prefix);
            let (line, right_temp) = hoist(compiler, &operand_type, &right_lowered.value);
            prefix.push(line);

            let comparison = struct_equality(&operand_type, &left_temp, &right_temp);
            return Lowered::with_prefix(prefix, normalise_bool(&comparison));
        }
    }

    let (prefix, values) = gen_sequence(compiler, &[left, right]);
    let (left, right) = (&values[0], &values[1]);
    let value = match operator {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => {
            format!("(({}) {} ({}))", left, operator.symbol(), right)
        }
        BinaryOp::Equals | BinaryOp::Less => {
            normalise_bool(&format!("({}) {} ({})", left, operator.symbol(), right))
        }
    };

    Lowered::with_prefix(prefix, value)
}

fn gen_if(
    compiler: &mut Compiler,
    expression: &Expr,
    condition: &Expr,
    then_expr: &Expr,
    else_expr: &Expr,
) -> Lowered {
    let condition = gen_expression(compiler, condition);
    let then_branch = gen_expression(compiler, then_expr);
    let else_branch = gen_expression(compiler, else_expr);

    if then_branch.prefix.is_empty() && else_branch.prefix.is_empty() {
        return Lowered::with_prefix(
            condition.prefix,
            format!(
                "(({}) ? ({}) : ({}))",
                condition.value, then_branch.value, else_branch.value
            ),
        );
    }

    // A branch has work of its own, so only the taken branch may run it.
    let ty = compiler.analysis.type_of(expression);
    let mut prefix = condition.prefix;
    let temp = if ty.is_void() {
        None
    } else {
        let temp = compiler.fresh_temp();
        prefix.push(format!("{};", declare(&ty, &temp)));
        Some(temp)
    };

    let finish = |branch: Lowered| -> Vec<String> {
        let mut lines = branch.prefix;
        match &temp {
            Some(temp) => lines.push(format!("{} = {};", temp, branch.value)),
            None => lines.push(format!("{};", branch.value)),
        }
        lines
    };

    prefix.push(format!("if ({}) {{", condition.value));
    prefix.extend(indent_lines(finish(then_branch)));
    prefix.push(String::from("} else {"));
    prefix.extend(indent_lines(finish(else_branch)));
    prefix.push(String::from("}"));

    match temp {
        Some(temp) => Lowered::with_prefix(prefix, temp),
        None => Lowered::with_prefix(prefix, "((void)0)"),
    }
}

/// Generates C for the given expression.
pub fn gen_expression(compiler: &mut Compiler, expression: &Expr) -> Lowered {
    match &expression.kind {
        ExprKind::LiteralInt(value) => Lowered::pure(value.to_string()),
        ExprKind::LiteralBool(value) => Lowered::pure(if *value { "1" } else { "0" }),
        ExprKind::Identifier(name) => {
            if let Some(variable) = compiler.analysis.variable_for(expression) {
                Lowered::pure(variable.emitted_name.clone())
            } else if let Some(function) = compiler.analysis.function_for(expression) {
                Lowered::pure(function.emitted_name.clone())
            } else {
                Lowered::pure(c_safe_name(name))
            }
        }
        ExprKind::Unary { operator, operand } => {
            let operand = gen_expression(compiler, operand);
            match operator {
                UnaryOp::Negate => {
                    Lowered::with_prefix(operand.prefix, format!("(-({}))", operand.value))
                }
            }
        }
        ExprKind::Binary {
            operator,
            left,
            right,
        } => gen_binary(compiler, *operator, left, right),
        ExprKind::Call { callee, arguments } => {
            let callee = if let Some(function) = compiler.analysis.function_for(expression) {
                function.emitted_name.clone()
            } else if let Some(variable) = compiler.analysis.variable_for(expression) {
                variable.emitted_name.clone()
            } else {
                c_safe_name(callee)
            };

            let arguments: Vec<&Expr> = arguments.iter().collect();
            let (prefix, values) = gen_sequence(compiler, &arguments);
            Lowered::with_prefix(prefix, format!("{}({})", callee, values.join(", ")))
        }
        ExprKind::If {
            condition,
            then_expr,
            else_expr,
        } => gen_if(compiler, expression, condition, then_expr, else_expr),
        ExprKind::Block(block) => {
            let ty = compiler.analysis.type_of(expression);
            let temp = if ty.is_void() {
                None
            } else {
                Some(compiler.fresh_temp())
            };

            let prefix = compiler.capture(|compiler| {
                if let Some(temp) = &temp {
                    compiler.line(format!("{};", declare(&ty, temp)));
                }
                compiler.line("{");
                compiler.indented(|compiler| {
                    gen_block_contents(compiler, &block.statements, None);
                    if let Some(result) = &block.result {
                        let lowered = gen_expression(compiler, result);
                        compiler.lines(lowered.prefix);
                        match &temp {
                            Some(temp) => compiler.line(format!("{} = {};", temp, lowered.value)),
                            None => compiler.line(format!("{};", lowered.value)),
                        }
                    }
                });
                compiler.line("}");
            });

            match temp {
                Some(temp) => Lowered::with_prefix(prefix, temp),
                None => Lowered::with_prefix(prefix, "((void)0)"),
            }
        }
        ExprKind::StructLiteral { name, values } => {
            let values: Vec<&Expr> = values.iter().collect();
            let (prefix, values) = gen_sequence(compiler, &values);
            let initializer = if values.is_empty() {
                String::from("0")
            } else {
                values.join(", ")
            };
            Lowered::with_prefix(
                prefix,
                format!("((struct {}){{ {} }})", c_safe_name(name), initializer),
            )
        }
        ExprKind::FieldAccess { object, field } => {
            let object = gen_expression(compiler, object);
            Lowered::with_prefix(
                object.prefix,
                format!("({}).{}", object.value, c_safe_name(field)),
            )
        }
        ExprKind::Reference(operand) => {
            let lowered = gen_expression(compiler, operand);
            if is_lvalue(compiler, operand) {
                return Lowered::with_prefix(lowered.prefix, format!("(&({}))", lowered.value));
            }

            let ty = compiler.analysis.type_of(operand);
            let mut prefix = lowered.prefix;
            let (line, temp) = hoist(compiler, &ty, &lowered.value);
            prefix.push(line);
            Lowered::with_prefix(prefix, format!("(&({}))", temp))
        }
        ExprKind::Dereference(operand) => {
            let operand = gen_expression(compiler, operand);
            Lowered::with_prefix(operand.prefix, format!("(*({}))", operand.value))
        }
    }
}
