/// AST (Abstract Syntax Tree) module
/// Contains all definitions related to the AST structure
///
/// Submodules:
/// - ast: The program root, blocks and node ids
/// - expressions: Expression nodes and operators
/// - statements: Statement nodes, function and intrinsic declarations
/// - types: Type annotations as written in source
pub mod ast;
pub mod expressions;
pub mod statements;
pub mod types;
