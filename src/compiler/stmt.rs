use crate::ast::{
    expressions::Expr,
    statements::{Stmt, StmtKind},
};

use super::{
    compiler::{declare, Compiler},
    expr::gen_expression,
};

/// Emits `statements` in order, then `result` evaluated for its effects.
pub fn gen_block_contents(compiler: &mut Compiler, statements: &[Stmt], result: Option<&Expr>) {
    for statement in statements {
        gen_statement(compiler, statement);
    }

    if let Some(result) = result {
        let lowered = gen_expression(compiler, result);
        compiler.lines(lowered.prefix);
        compiler.line(format!("{};", lowered.value));
    }
}

/// The body of a loop, without its braces.
fn gen_loop_body(compiler: &mut Compiler, body: &Stmt) {
    match &body.kind {
        StmtKind::Block(block) => {
            gen_block_contents(compiler, &block.statements, block.result.as_deref())
        }
        _ => gen_statement(compiler, body),
    }
}

pub fn gen_statement(compiler: &mut Compiler, statement: &Stmt) {
    let analysis = compiler.analysis;

    match &statement.kind {
        StmtKind::Let { initializer, .. } => {
            let lowered = gen_expression(compiler, initializer);
            compiler.lines(lowered.prefix);

            let Some(variable) = analysis.let_variable(statement) else {
                return;
            };
            if variable.is_global {
                compiler.line(format!("{} = {};", variable.emitted_name, lowered.value));
            } else {
                compiler.line(format!(
                    "{} = {};",
                    declare(&variable.ty, &variable.emitted_name),
                    lowered.value
                ));
            }
        }
        StmtKind::Assignment {
            operator, value, ..
        } => {
            let lowered = gen_expression(compiler, value);
            compiler.lines(lowered.prefix);

            if let Some(variable) = analysis.target_variable(statement) {
                compiler.line(format!(
                    "{} {} {};",
                    variable.emitted_name,
                    operator.symbol(),
                    lowered.value
                ));
            }
        }
        StmtKind::Increment { .. } => {
            if let Some(variable) = analysis.target_variable(statement) {
                compiler.line(format!("{}++;", variable.emitted_name));
            }
        }
        StmtKind::While { condition, body } => {
            let condition = gen_expression(compiler, condition);

            if condition.prefix.is_empty() {
                compiler.line(format!("while ({}) {{", condition.value));
                compiler.indented(|compiler| gen_loop_body(compiler, body));
                compiler.line("}");
                return;
            }

            // The condition's own statements have to run on every iteration.
            compiler.line("while (1) {");
            compiler.indented(|compiler| {
                compiler.lines(condition.prefix);
                compiler.line(format!("if (!({})) {{", condition.value));
                compiler.indented(|compiler| compiler.line("break;"));
                compiler.line("}");
                gen_loop_body(compiler, body);
            });
            compiler.line("}");
        }
        StmtKind::Block(block) => {
            compiler.line("{");
            compiler.indented(|compiler| {
                gen_block_contents(compiler, &block.statements, block.result.as_deref())
            });
            compiler.line("}");
        }
        StmtKind::Expression(expression) => {
            let lowered = gen_expression(compiler, expression);
            compiler.lines(lowered.prefix);
            compiler.line(format!("{};", lowered.value));
        }
        StmtKind::Return(value) => match value {
            Some(value) => {
                let lowered = gen_expression(compiler, value);
                compiler.lines(lowered.prefix);
                compiler.line(format!("return {};", lowered.value));
            }
            None => compiler.line("return;"),
        },
        // Struct definitions are emitted ahead of everything else.
        StmtKind::StructDecl { .. } => {}
    }
}
