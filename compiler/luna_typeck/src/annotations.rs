//! Reading declared types out of annotation comments.

use luna_ir::{DocComment, DocTagKind, FunctionBody, NodeId, NodeKind, Span, SyntaxTree, TypeExpr};
use luna_types::{FunctionType, Param, Signature, Type};

use crate::lower::{lower_signature, lower_type};

/// The annotation attached to a declaration statement.
pub(crate) fn doc_of(tree: &SyntaxTree, stmt: NodeId) -> Option<&DocComment> {
    let doc = tree.kind(stmt).doc()?;
    match tree.kind(doc) {
        NodeKind::DocComment(comment) => Some(comment),
        _ => None,
    }
}

/// `@class Name [: Super]`, with the tag's span.
pub(crate) fn class_tag(doc: &DocComment) -> Option<(&str, Option<&str>, Span)> {
    doc.tags.iter().find_map(|tag| match &tag.kind {
        DocTagKind::Class { name, super_name } => {
            Some((name.as_str(), super_name.as_deref(), tag.span))
        }
        _ => None,
    })
}

pub(crate) fn type_tag(doc: &DocComment) -> Option<&TypeExpr> {
    doc.tags().find_map(|tag| match tag {
        DocTagKind::Type { ty } => Some(ty),
        _ => None,
    })
}

pub(crate) fn generic_names(doc: &DocComment) -> Vec<String> {
    doc.tags()
        .filter_map(|tag| match tag {
            DocTagKind::Generic { names } => Some(names.iter().cloned()),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Whether the annotation describes a function.
pub(crate) fn has_signature_tags(doc: &DocComment) -> bool {
    doc.tags().any(|tag| {
        matches!(
            tag,
            DocTagKind::Param { .. }
                | DocTagKind::Return { .. }
                | DocTagKind::Overload { .. }
                | DocTagKind::Vararg { .. }
                | DocTagKind::Generic { .. }
        )
    })
}

/// Declared type of the first name of a `local`/assignment: `@class` wins
/// over `@type`.
pub(crate) fn declared_variable_type(doc: &DocComment) -> Option<Type> {
    if let Some((name, _, _)) = class_tag(doc) {
        return Some(Type::class(name));
    }
    let generics = generic_names(doc);
    type_tag(doc).map(|ty| lower_type(ty, &generics))
}

/// Build the signature set of a function from its body and annotation.
///
/// `inferred_return` is consulted only when no `@return` is written.
pub(crate) fn function_type(
    body: &FunctionBody,
    is_method: bool,
    doc: Option<&DocComment>,
    inferred_return: impl FnOnce() -> Type,
) -> FunctionType {
    let generics = doc.map(generic_names).unwrap_or_default();
    let params = body
        .params
        .iter()
        .map(|binding| {
            let declared = doc.and_then(|doc| {
                doc.tags().find_map(|tag| match tag {
                    DocTagKind::Param { name, optional, ty } if *name == binding.name => {
                        Some((lower_type(ty, &generics), *optional))
                    }
                    _ => None,
                })
            });
            match declared {
                Some((ty, true)) => Param::optional(binding.name.clone(), ty),
                Some((ty, false)) => Param::new(binding.name.clone(), ty),
                None => Param::new(binding.name.clone(), Type::Unknown),
            }
        })
        .collect();

    let varargs = body.is_vararg.then(|| {
        doc.and_then(|doc| {
            doc.tags().find_map(|tag| match tag {
                DocTagKind::Vararg { ty } => Some(lower_type(ty, &generics)),
                _ => None,
            })
        })
        .unwrap_or(Type::Unknown)
    });

    let declared_return = doc.and_then(|doc| {
        doc.tags().find_map(|tag| match tag {
            DocTagKind::Return { types } => types.first().map(|ty| lower_type(ty, &generics)),
            _ => None,
        })
    });
    let return_type = declared_return.unwrap_or_else(inferred_return);

    let main = Signature {
        is_method_call: is_method,
        return_type,
        params,
        generic_params: (!generics.is_empty()).then(|| generics.clone()),
        varargs,
    };
    let overloads: Vec<Signature> = doc
        .map(|doc| {
            doc.tags()
                .filter_map(|tag| match tag {
                    // Overloads share the declaration's receiver style.
                    DocTagKind::Overload { ty } => Some(Signature {
                        is_method_call: is_method,
                        ..lower_signature(ty, &generics)
                    }),
                    _ => None,
                })
                .collect()
        })
        .unwrap_or_default();
    FunctionType::with_overloads(main, overloads)
}
