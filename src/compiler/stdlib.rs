//! Runtime helpers for intrinsics.
//!
//! An `intrinsic fn` declaration only states a signature. For the intrinsics
//! listed here the generated C file carries a `static` helper with a fixed
//! body, emitted right after the includes. Any other intrinsic is expected
//! to be supplied at link time and only gets an external prototype.

use crate::type_checker::types::Type;

pub struct Intrinsic {
    /// Name used in source.
    pub name: &'static str,
    /// Name of the C helper.
    pub emitted_name: &'static str,
    pub parameters: fn() -> Vec<Type>,
    pub return_type: fn() -> Type,
    /// The helper's full C definition.
    pub body: &'static [&'static str],
}

impl Intrinsic {
    /// Human-readable signature, as it would be declared in source.
    pub fn signature(&self) -> String {
        let parameters = (self.parameters)()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({}) : {}", self.name, parameters, (self.return_type)())
    }
}

pub static INTRINSICS: &[Intrinsic] = &[
    Intrinsic {
        name: "readInt",
        emitted_name: "intrinsic_readInt",
        parameters: Vec::new,
        return_type: || Type::I32,
        body: &[
            "static int intrinsic_readInt(void) {",
            "    int value;",
            "    if (scanf(\"%d\", &value) != 1) {",
            "        exit(1);",
            "    }",
            "    return value;",
            "}",
        ],
    },
    Intrinsic {
        name: "printInt",
        emitted_name: "intrinsic_printInt",
        parameters: || vec![Type::I32],
        return_type: || Type::VOID,
        body: &[
            "static void intrinsic_printInt(int value) {",
            "    printf(\"%d\\n\", value);",
            "}",
        ],
    },
];

pub fn lookup_intrinsic(name: &str) -> Option<&'static Intrinsic> {
    INTRINSICS.iter().find(|intrinsic| intrinsic.name == name)
}
