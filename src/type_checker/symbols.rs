//! Symbols produced by semantic analysis and the names they get in C.
//!
//! Emitted names are fixed here, during analysis, so code generation never
//! has to repeat scope resolution. The naming scheme keeps every category
//! apart:
//!
//! - ordinary source names are used as-is and never contain `__`
//! - names that clash with C keywords, runtime symbols or generated
//!   prefixes get a `__` suffix
//! - renamed locals are `<name>__s<n>`, temporaries are `tmp__<n>`
//! - globals are `g_<name>_<n>`
//! - functions are `f_<name>`, so they never meet a libc declaration

use super::types::Type;

pub type VariableId = usize;
pub type FunctionId = usize;

#[derive(Debug, Clone)]
pub struct VariableSymbol {
    pub name: String,
    pub ty: Type,
    pub mutable: bool,
    pub is_global: bool,
    pub emitted_name: String,
}

#[derive(Debug, Clone)]
pub struct FunctionSymbol {
    pub name: String,
    pub parameter_names: Vec<String>,
    pub emitted_parameter_names: Vec<String>,
    pub parameter_types: Vec<Type>,
    pub return_type: Type,
    pub is_intrinsic: bool,
    /// Index into `Program::functions`, `None` for intrinsics.
    pub declaration: Option<usize>,
    pub emitted_name: String,
}

impl FunctionSymbol {
    /// The function's type when used as a value.
    pub fn as_type(&self) -> Type {
        Type::Function {
            parameters: self.parameter_types.clone(),
            return_type: Box::new(self.return_type.clone()),
        }
    }
}

const C_RESERVED: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
    "main", "exit", "printf", "scanf", "stdin", "stdout", "stderr", "NULL", "EOF", "FILE",
];

/// Maps a source identifier onto an identifier that is safe to emit.
pub fn c_safe_name(name: &str) -> String {
    let clashes = C_RESERVED.contains(&name)
        || name.contains("__")
        || name.starts_with("g_")
        || name.starts_with("f_")
        || name.starts_with("intrinsic_");

    if clashes {
        format!("{}__", name)
    } else {
        name.to_string()
    }
}

/// C name of a user-defined function.
pub fn function_emitted_name(name: &str) -> String {
    format!("f_{}", name)
}

/// Whether some function or intrinsic is emitted as `emitted`.
pub fn emits_function_name(functions: &[FunctionSymbol], emitted: &str) -> bool {
    functions
        .iter()
        .any(|function| function.emitted_name == emitted)
}

#[cfg(test)]
mod tests {
    use super::{c_safe_name, function_emitted_name};

    #[test]
    fn test_plain_names_are_kept() {
        assert_eq!(c_safe_name("x"), "x");
        assert_eq!(c_safe_name("total_count"), "total_count");
        assert_eq!(c_safe_name("_hidden"), "_hidden");
    }

    #[test]
    fn test_clashing_names_are_suffixed() {
        assert_eq!(c_safe_name("int"), "int__");
        assert_eq!(c_safe_name("main"), "main__");
        assert_eq!(c_safe_name("tmp__1"), "tmp__1__");
        assert_eq!(c_safe_name("g_x_1"), "g_x_1__");
        assert_eq!(c_safe_name("f_add"), "f_add__");
        assert_eq!(c_safe_name("intrinsic_readInt"), "intrinsic_readInt__");
    }

    #[test]
    fn test_function_names_are_prefixed() {
        assert_eq!(function_emitted_name("add"), "f_add");
        assert_eq!(function_emitted_name("abs"), "f_abs");
        assert_eq!(function_emitted_name("int"), "f_int");
    }
}
