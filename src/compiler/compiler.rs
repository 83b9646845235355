//! Main code generator module.
//!
//! This module contains the `Compiler` structure, which drives the
//! generation of a single C translation unit from an analysed program. It
//! owns the output buffer, the indentation state and the temporary counter,
//! and lays out the sections of the file in a fixed order.

use std::mem;

use tracing::{debug, trace};

use crate::{
    ast::ast::Program,
    type_checker::{
        analysis::AnalysisResult,
        symbols::{c_safe_name, FunctionSymbol},
        types::{Primitive, StructType, Type},
    },
};

use super::{
    expr::gen_expression,
    stdlib::lookup_intrinsic,
    stmt::{gen_block_contents, gen_statement},
};

const INDENT: &str = "    ";

/// Builds a C declaration of `declarator` with type `ty`.
///
/// Pointers and function pointers wrap the declarator from the inside out,
/// so `declare(&Type::pointer_to(Type::I32), "p")` is `int *p` and a value
/// of type `(I32) => *I32` named `f` becomes `int *(*f)(int)`. An empty
/// declarator yields an abstract type name, as used in prototypes.
pub fn declare(ty: &Type, declarator: &str) -> String {
    match ty {
        Type::Primitive(Primitive::I32) | Type::Primitive(Primitive::Bool) => {
            join_declaration("int", declarator)
        }
        Type::Primitive(Primitive::Void) => join_declaration("void", declarator),
        Type::Struct(structure) => {
            join_declaration(&format!("struct {}", c_safe_name(&structure.name)), declarator)
        }
        Type::Pointer(pointee) => declare(pointee, &format!("*{}", declarator)),
        Type::Function {
            parameters,
            return_type,
        } => declare(
            return_type,
            &format!("(*{})({})", declarator, parameter_list(parameters)),
        ),
    }
}

fn join_declaration(base: &str, declarator: &str) -> String {
    if declarator.is_empty() {
        base.to_string()
    } else {
        format!("{} {}", base, declarator)
    }
}

/// Comma separated abstract parameter types, `void` when there are none.
pub fn parameter_list(parameters: &[Type]) -> String {
    if parameters.is_empty() {
        String::from("void")
    } else {
        parameters
            .iter()
            .map(|parameter| declare(parameter, ""))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Indents already rendered lines by one level.
pub fn indent_lines(lines: Vec<String>) -> impl Iterator<Item = String> {
    lines.into_iter().map(|line| format!("{}{}", INDENT, line))
}

/// The state of one code generation run.
///
/// Lines are rendered with their indentation as they are emitted. Nested
/// constructs that must end up inside an expression's prefix are generated
/// through [`Compiler::capture`], which renders them relative to column zero.
pub struct Compiler<'a> {
    /// The program being compiled
    pub program: &'a Program,
    /// Types, bindings and emitted names recorded by analysis
    pub analysis: &'a AnalysisResult,

    lines: Vec<String>,
    indent: usize,
    temp_counter: usize,
}

impl<'a> Compiler<'a> {
    pub fn new(program: &'a Program, analysis: &'a AnalysisResult) -> Self {
        Compiler {
            program,
            analysis,
            lines: vec![],
            indent: 0,
            temp_counter: 0,
        }
    }

    /// Appends one line at the current indentation.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if text.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{}", INDENT.repeat(self.indent), text));
        }
    }

    /// Appends lines rendered relative to column zero, such as the prefix of
    /// a lowered expression.
    pub fn lines(&mut self, lines: Vec<String>) {
        for line in lines {
            self.line(line);
        }
    }

    pub fn indented<T>(&mut self, f: impl FnOnce(&mut Self) -> T) -> T {
        self.indent += 1;
        let value = f(self);
        self.indent -= 1;
        value
    }

    /// Runs `f` against an empty buffer at column zero and returns what it
    /// emitted, leaving the surrounding output untouched.
    pub fn capture(&mut self, f: impl FnOnce(&mut Self)) -> Vec<String> {
        let saved_lines = mem::take(&mut self.lines);
        let saved_indent = mem::replace(&mut self.indent, 0);
        f(self);
        self.indent = saved_indent;
        mem::replace(&mut self.lines, saved_lines)
    }

    /// A fresh `tmp__<n>` name. Source identifiers never contain `__`, so
    /// these cannot clash with anything the program declares.
    pub fn fresh_temp(&mut self) -> String {
        self.temp_counter += 1;
        let name = format!("tmp__{}", self.temp_counter);
        trace!(%name, "allocated temporary");
        name
    }

    fn gen_struct_definition(&mut self, structure: &StructType) {
        self.line(format!("struct {} {{", c_safe_name(&structure.name)));
        self.indented(|compiler| {
            if structure.fields.is_empty() {
                compiler.line("char empty_;");
            }
            for (field, ty) in &structure.fields {
                compiler.line(format!("{};", declare(ty, &c_safe_name(field))));
            }
        });
        self.line("};");
    }

    fn gen_intrinsic(&mut self, function: &FunctionSymbol) {
        match lookup_intrinsic(&function.name) {
            Some(intrinsic) => {
                for line in intrinsic.body {
                    self.line(*line);
                }
            }
            None => self.line(format!(
                "{};",
                declare(
                    &function.return_type,
                    &format!(
                        "{}({})",
                        function.emitted_name,
                        parameter_list(&function.parameter_types)
                    )
                )
            )),
        }
    }

    /// `static <ret> name(<params>)`, without a terminator.
    fn function_header(function: &FunctionSymbol) -> String {
        let parameters = if function.parameter_types.is_empty() {
            String::from("void")
        } else {
            function
                .parameter_types
                .iter()
                .zip(&function.emitted_parameter_names)
                .map(|(ty, name)| declare(ty, name))
                .collect::<Vec<_>>()
                .join(", ")
        };

        format!(
            "static {}",
            declare(
                &function.return_type,
                &format!("{}({})", function.emitted_name, parameters)
            )
        )
    }

    fn gen_function_definition(&mut self, function: &FunctionSymbol) {
        let Some(index) = function.declaration else {
            return;
        };
        let program = self.program;
        let decl = &program.functions[index];
        trace!(function = %function.name, "generating function");

        self.line(format!("{} {{", Self::function_header(function)));
        self.indented(|compiler| {
            for stmt in &decl.body.statements {
                gen_statement(compiler, stmt);
            }

            match &decl.body.result {
                Some(result) => {
                    let lowered = gen_expression(compiler, result);
                    compiler.lines(lowered.prefix);
                    compiler.line(format!("return {};", lowered.value));
                }
                None if function.return_type.is_void() => compiler.line("return;"),
                None => {}
            }
        });
        self.line("}");
    }

    fn gen_main(&mut self) {
        let program = self.program;
        self.line("int main(void) {");
        self.indented(|compiler| {
            gen_block_contents(compiler, &program.statements, None);

            match &program.final_expression {
                Some(final_expression) => {
                    let lowered = gen_expression(compiler, final_expression);
                    compiler.lines(lowered.prefix);
                    compiler.line(format!("exit({});", lowered.value));
                }
                None => compiler.line("exit(0);"),
            }
            compiler.line("return 0;");
        });
        self.line("}");
    }

    /// Lays out the whole translation unit:
    ///
    /// 1. includes
    /// 2. struct definitions
    /// 3. intrinsic helpers and external prototypes
    /// 4. globals
    /// 5. prototypes, then definitions, of every function
    /// 6. `main`
    pub fn compile(&mut self) {
        let analysis = self.analysis;

        self.line("#include <stdio.h>");
        self.line("#include <stdlib.h>");

        for structure in &analysis.structs {
            self.line("");
            self.gen_struct_definition(structure);
        }

        let (intrinsics, functions): (Vec<_>, Vec<_>) = analysis
            .functions
            .iter()
            .partition(|function| function.is_intrinsic);

        for intrinsic in &intrinsics {
            self.line("");
            self.gen_intrinsic(intrinsic);
        }

        if !analysis.globals.is_empty() {
            self.line("");
        }
        for global in analysis.global_variables() {
            self.line(format!("static {};", declare(&global.ty, &global.emitted_name)));
        }

        if !functions.is_empty() {
            self.line("");
        }
        for function in &functions {
            self.line(format!("{};", Self::function_header(function)));
        }

        for function in &functions {
            self.line("");
            self.gen_function_definition(function);
        }

        self.line("");
        self.gen_main();
    }

    pub fn finish(self) -> String {
        let mut output = self.lines.join("\n");
        output.push('\n');
        output
    }
}

/// Generates C for a program that analysed without errors.
pub fn generate(program: &Program, analysis: &AnalysisResult) -> String {
    let mut compiler = Compiler::new(program, analysis);
    compiler.compile();

    let output = compiler.finish();
    debug!(bytes = output.len(), "generated C");
    output
}
