//! Luna types - the type model shared by the indexer and the checker.
//!
//! - [`Type`]: immutable type values, with unions compared as sets
//! - [`subtype_of`]: the subtype relation, parameterized by [`SubtypeRules`]
//! - [`ClassRegistry`]: every class, alias and global declared in the workspace
//!
//! Nothing here knows about syntax. Lowering annotation text to [`Type`]
//! happens in the checker crate.

mod registry;
mod subtype;
mod ty;

pub use registry::{
    AliasDecl, ClassDecl, ClassMember, ClassRegistry, DeclSite, GlobalDecl, MemberKind,
    SourceLocation,
};
pub use subtype::{subtype_of, NoDeclarations, SubtypeRules, TypeResolver};
pub use ty::{primitive, FunctionType, Param, Signature, Type, UnionType};
