//! Declaration indexing.
//!
//! [`index_file`] scans one syntax tree and records what it declares in the
//! [`ClassRegistry`]: classes and their fields from `@class`/`@field`,
//! aliases, methods from `function X.m` / `function X:m`, fields assigned
//! through `X.f = value`, and globals. Every record carries the file, so
//! re-indexing is `remove_declarations_from` followed by another scan.
//!
//! Indexing runs before the registry is complete, so value types here come
//! from syntax alone; full inference happens later, per diagnostic pass.

use luna_ir::{DocComment, DocTagKind, FileId, NodeId, NodeKind, Span, SyntaxTree};
use luna_types::{ClassRegistry, SourceLocation, Type};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::annotations::{self, doc_of};
use crate::infer::{literal_return, literal_type};
use crate::lower::lower_type;

/// Record everything `tree` declares, attributed to `file`.
#[tracing::instrument(level = "debug", skip(tree, registry), fields(file = %file))]
pub fn index_file(tree: &SyntaxTree, file: &FileId, registry: &mut ClassRegistry) {
    let mut indexer = Indexer {
        tree,
        file,
        registry,
        bindings: FxHashMap::default(),
        locals: FxHashSet::default(),
    };
    for id in tree.preorder() {
        indexer.visit(id);
    }
}

struct Indexer<'a> {
    tree: &'a SyntaxTree,
    file: &'a FileId,
    registry: &'a mut ClassRegistry,
    /// Variables bound to a class by `@class`.
    bindings: FxHashMap<&'a str, &'a str>,
    /// Every name declared `local` anywhere in the file.
    locals: FxHashSet<&'a str>,
}

impl<'a> Indexer<'a> {
    fn at(&self, span: Span) -> SourceLocation {
        SourceLocation::new(self.file.clone(), span)
    }

    fn visit(&mut self, id: NodeId) {
        let tree = self.tree;
        match tree.kind(id) {
            NodeKind::DocComment(doc) => self.index_doc(doc),
            NodeKind::Local(local) => {
                for binding in &local.names {
                    self.locals.insert(&binding.name);
                }
                if let (Some(first), Some((class, _, _))) = (
                    local.names.first(),
                    doc_of(tree, id).and_then(annotations::class_tag),
                ) {
                    self.bindings.insert(&first.name, class);
                }
            }
            NodeKind::Assign(assign) => {
                let doc = doc_of(tree, id);
                for (index, &target) in assign.targets.iter().enumerate() {
                    let value = assign.values.get(index).copied();
                    let declared = if index == 0 { doc } else { None };
                    self.index_assignment(id, target, value, declared);
                }
            }
            NodeKind::Function(decl) => {
                let doc = doc_of(tree, id);
                let func = annotations::function_type(&decl.body, decl.is_method, doc, || {
                    literal_return(tree, decl.body.block)
                });
                let description = doc.and_then(doc_description);
                match tree.kind(decl.name) {
                    NodeKind::Name(name) if decl.is_local => {
                        self.locals.insert(name);
                    }
                    NodeKind::Name(name) => {
                        let at = self.at(tree.span(id));
                        self.registry.declare_global(name, Type::Function(func), at);
                    }
                    NodeKind::Field { object, name } => {
                        if let Some(class) = self.class_of(*object, true) {
                            let at = self.at(tree.span(id));
                            self.registry
                                .add_member(&class, name, Type::Function(func), description, at);
                        }
                    }
                    _ => {}
                }
            }
            _ => {}
        }
    }

    fn index_doc(&mut self, doc: &DocComment) {
        let class = annotations::class_tag(doc).map(|(name, super_name, span)| {
            let at = self.at(span);
            self.registry.declare_class(name, super_name, at);
            name
        });
        let generics = annotations::generic_names(doc);
        for tag in &doc.tags {
            match &tag.kind {
                DocTagKind::Field {
                    visibility,
                    name,
                    optional,
                    ty,
                } => {
                    let Some(class) = class else { continue };
                    let mut ty = lower_type(ty, &generics);
                    if *optional {
                        ty = ty.optional();
                    }
                    let at = self.at(tag.span);
                    self.registry
                        .add_field(class, name, ty, *visibility, None, at);
                }
                DocTagKind::Alias { name, ty } => {
                    let at = self.at(tag.span);
                    self.registry.declare_alias(name, lower_type(ty, &generics), at);
                }
                _ => {}
            }
        }
    }

    fn index_assignment(
        &mut self,
        stmt: NodeId,
        target: NodeId,
        value: Option<NodeId>,
        doc: Option<&'a DocComment>,
    ) {
        let tree = self.tree;
        let ty = self.assigned_type(value, doc);
        let at = self.at(tree.span(stmt));
        match tree.kind(target) {
            NodeKind::Name(name) if self.locals.contains(name.as_str()) => {}
            NodeKind::Name(name) => {
                if let Some((class, _, _)) = doc.and_then(annotations::class_tag) {
                    self.bindings.insert(name, class);
                }
                self.registry.declare_global(name, ty, at);
            }
            NodeKind::Field { object, name } => {
                if let Some(class) = self.class_of(*object, false) {
                    let description = doc.and_then(doc_description);
                    self.registry.add_member(&class, name, ty, description, at);
                }
            }
            _ => {}
        }
    }

    /// Declared type from the annotation, else what the value's syntax shows.
    fn assigned_type(&self, value: Option<NodeId>, doc: Option<&DocComment>) -> Type {
        let tree = self.tree;
        if let Some(doc) = doc {
            if let Some(value) = value {
                if let NodeKind::Closure(body) = tree.kind(value) {
                    if annotations::has_signature_tags(doc) {
                        let func = annotations::function_type(body, false, Some(doc), || {
                            literal_return(tree, body.block)
                        });
                        return Type::Function(func);
                    }
                }
            }
            if let Some(declared) = annotations::declared_variable_type(doc) {
                return declared;
            }
        }
        value.map_or(Type::Unknown, |value| literal_type(tree, value))
    }

    /// The class a `X` or `a.b` object path denotes.
    ///
    /// With `create`, an unannotated global table becomes a class of its
    /// own name; locals never do.
    fn class_of(&self, object: NodeId, create: bool) -> Option<String> {
        let path = dotted_path(self.tree, object)?;
        let root = path.split('.').next().unwrap_or(&path);
        if let Some(&class) = self.bindings.get(root) {
            if root == path {
                return Some(class.to_owned());
            }
            let rest = &path[root.len()..];
            return Some(format!("{class}{rest}"));
        }
        if self.locals.contains(root) {
            return None;
        }
        if let Some(decl) = self.registry.resolve(&path) {
            return Some(decl.qualified_name.clone());
        }
        create.then_some(path)
    }
}

/// `a`, `a.b`, `a.b.c` as a string; `None` for anything else.
fn dotted_path(tree: &SyntaxTree, node: NodeId) -> Option<String> {
    match tree.kind(node) {
        NodeKind::Name(name) => Some(name.clone()),
        NodeKind::Field { object, name } => {
            let mut path = dotted_path(tree, *object)?;
            path.push('.');
            path.push_str(name);
            Some(path)
        }
        _ => None,
    }
}

fn doc_description(doc: &DocComment) -> Option<String> {
    (!doc.description.is_empty()).then(|| doc.description.clone())
}

#[cfg(test)]
mod tests;
