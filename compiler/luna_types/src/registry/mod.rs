//! Registry of declared classes, aliases and globals.
//!
//! Every declaration records the file it came from, so re-indexing a file is
//! "remove everything from that file, then scan it again". A class may be
//! reopened from several files; each opening is a [`DeclSite`], and the class
//! only disappears once no site and no member remains.
//!
//! # Design
//!
//! - `FxHashMap` for O(1) lookup by qualified name
//! - `BTreeMap` members for deterministic iteration
//! - Superclasses are names, resolved on every query

use std::collections::BTreeMap;

use luna_ir::{FileId, Span, Visibility};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::subtype::TypeResolver;
use crate::ty::{FunctionType, Type};

/// Where a declaration was written.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: FileId,
    pub span: Span,
}

impl SourceLocation {
    pub fn new(file: FileId, span: Span) -> Self {
        SourceLocation { file, span }
    }
}

/// One `@class` declaration of a class.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeclSite {
    pub super_name: Option<String>,
    pub location: SourceLocation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberKind {
    Field { ty: Type, visibility: Visibility },
    Method(FunctionType),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassMember {
    pub name: String,
    pub kind: MemberKind,
    pub doc: Option<String>,
    pub origin: SourceLocation,
}

impl ClassMember {
    /// The member's type as seen by an access expression.
    pub fn ty(&self) -> Type {
        match &self.kind {
            MemberKind::Field { ty, .. } => ty.clone(),
            MemberKind::Method(func) => Type::Function(func.clone()),
        }
    }

    pub fn visibility(&self) -> Visibility {
        match &self.kind {
            MemberKind::Field { visibility, .. } => *visibility,
            MemberKind::Method(_) => Visibility::Public,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassDecl {
    pub qualified_name: String,
    pub simple_name: String,
    /// From the most recent declaration site that names one.
    pub super_class: Option<String>,
    pub members: BTreeMap<String, ClassMember>,
    pub sites: Vec<DeclSite>,
    /// Location of the most recent declaration site. `None` for classes
    /// that only exist because members were added to a global table.
    pub location: Option<SourceLocation>,
}

impl ClassDecl {
    fn new(qualified_name: &str) -> Self {
        let simple_name = qualified_name
            .rsplit('.')
            .next()
            .unwrap_or(qualified_name)
            .to_owned();
        ClassDecl {
            qualified_name: qualified_name.to_owned(),
            simple_name,
            super_class: None,
            members: BTreeMap::new(),
            sites: Vec::new(),
            location: None,
        }
    }

    fn refresh_from_sites(&mut self) {
        self.super_class = self
            .sites
            .iter()
            .rev()
            .find_map(|site| site.super_name.clone());
        self.location = self.sites.last().map(|site| site.location.clone());
    }

    pub fn member(&self, name: &str) -> Option<&ClassMember> {
        self.members.get(name)
    }

    fn is_empty(&self) -> bool {
        self.sites.is_empty() && self.members.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AliasDecl {
    pub name: String,
    pub target: Type,
    pub origin: SourceLocation,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobalDecl {
    pub name: String,
    pub ty: Type,
    pub origin: SourceLocation,
}

/// All declarations of the workspace.
#[derive(Clone, Debug, Default)]
pub struct ClassRegistry {
    classes: FxHashMap<String, ClassDecl>,
    aliases: FxHashMap<String, AliasDecl>,
    globals: FxHashMap<String, GlobalDecl>,
    /// Qualified names of the classes sharing each simple name.
    simple_names: FxHashMap<String, Vec<String>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty() && self.aliases.is_empty() && self.globals.is_empty()
    }

    pub fn clear(&mut self) {
        self.classes.clear();
        self.aliases.clear();
        self.globals.clear();
        self.simple_names.clear();
    }

    /// Declare (or reopen) a class.
    ///
    /// Idempotent per file: declaring the same class twice from one file
    /// updates that site instead of adding a second one. Members are never
    /// touched.
    pub fn declare_class(
        &mut self,
        qualified_name: &str,
        super_name: Option<&str>,
        location: SourceLocation,
    ) -> &mut ClassDecl {
        let decl = self.class_entry(qualified_name);
        let site = DeclSite {
            super_name: super_name.map(str::to_owned),
            location,
        };
        match decl
            .sites
            .iter()
            .position(|s| s.location.file == site.location.file)
        {
            Some(existing) => {
                decl.sites.remove(existing);
                decl.sites.push(site);
            }
            None => decl.sites.push(site),
        }
        decl.refresh_from_sites();
        decl
    }

    fn class_entry(&mut self, qualified_name: &str) -> &mut ClassDecl {
        if !self.classes.contains_key(qualified_name) {
            let decl = ClassDecl::new(qualified_name);
            self.simple_names
                .entry(decl.simple_name.clone())
                .or_default()
                .push(qualified_name.to_owned());
            self.classes.insert(qualified_name.to_owned(), decl);
        }
        self.classes
            .entry(qualified_name.to_owned())
            .or_insert_with(|| ClassDecl::new(qualified_name))
    }

    /// Add a member, replacing any member of the same name. Function types
    /// become methods, everything else a public field. A class that does not
    /// exist yet is created without a declaration site.
    pub fn add_member(
        &mut self,
        class: &str,
        name: &str,
        ty: Type,
        doc: Option<String>,
        origin: SourceLocation,
    ) {
        let kind = match ty {
            Type::Function(func) => MemberKind::Method(func),
            ty => MemberKind::Field {
                ty,
                visibility: Visibility::Public,
            },
        };
        self.insert_member(class, name, kind, doc, origin);
    }

    /// Add a field with explicit visibility, as written in `@field`.
    pub fn add_field(
        &mut self,
        class: &str,
        name: &str,
        ty: Type,
        visibility: Visibility,
        doc: Option<String>,
        origin: SourceLocation,
    ) {
        self.insert_member(class, name, MemberKind::Field { ty, visibility }, doc, origin);
    }

    fn insert_member(
        &mut self,
        class: &str,
        name: &str,
        kind: MemberKind,
        doc: Option<String>,
        origin: SourceLocation,
    ) {
        tracing::trace!(class, member = name, file = %origin.file, "add member");
        let member = ClassMember {
            name: name.to_owned(),
            kind,
            doc,
            origin,
        };
        self.class_entry(class)
            .members
            .insert(name.to_owned(), member);
    }

    /// Look a class up by qualified name, falling back to an unambiguous
    /// simple name.
    pub fn resolve(&self, name: &str) -> Option<&ClassDecl> {
        if let Some(decl) = self.classes.get(name) {
            return Some(decl);
        }
        if let Some([only]) = self.simple_names.get(name).map(Vec::as_slice) {
            return self.classes.get(only);
        }
        None
    }

    /// Find a member on `class` or any of its superclasses.
    pub fn find_member(&self, class: &str, member: &str) -> Option<&ClassMember> {
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut current = self.resolve(class)?;
        loop {
            if !visited.insert(&current.qualified_name) {
                return None;
            }
            if let Some(found) = current.members.get(member) {
                return Some(found);
            }
            current = self.resolve(current.super_class.as_deref()?)?;
        }
    }

    /// Members of `class` and its superclasses, nearest declaration winning.
    pub fn all_members(&self, class: &str) -> Vec<&ClassMember> {
        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut visited: FxHashSet<&str> = FxHashSet::default();
        let mut out = Vec::new();
        let mut current = self.resolve(class);
        while let Some(decl) = current {
            if !visited.insert(&decl.qualified_name) {
                break;
            }
            for (name, member) in &decl.members {
                if seen.insert(name) {
                    out.push(member);
                }
            }
            current = decl.super_class.as_deref().and_then(|s| self.resolve(s));
        }
        out
    }

    /// Classes declared directly inside namespace `ns` (`ns.Name`), sorted.
    pub fn namespace_members(&self, ns: &str) -> Vec<&ClassDecl> {
        let prefix = format!("{ns}.");
        let mut found: Vec<&ClassDecl> = self
            .classes
            .values()
            .filter(|decl| {
                decl.qualified_name
                    .strip_prefix(&prefix)
                    .is_some_and(|rest| !rest.is_empty() && !rest.contains('.'))
            })
            .collect();
        found.sort_by(|a, b| a.qualified_name.cmp(&b.qualified_name));
        found
    }

    pub fn declare_alias(&mut self, name: &str, target: Type, origin: SourceLocation) {
        self.aliases.insert(
            name.to_owned(),
            AliasDecl {
                name: name.to_owned(),
                target,
                origin,
            },
        );
    }

    pub fn alias(&self, name: &str) -> Option<&AliasDecl> {
        self.aliases.get(name)
    }

    pub fn declare_global(&mut self, name: &str, ty: Type, origin: SourceLocation) {
        self.globals.insert(
            name.to_owned(),
            GlobalDecl {
                name: name.to_owned(),
                ty,
                origin,
            },
        );
    }

    pub fn global(&self, name: &str) -> Option<&GlobalDecl> {
        self.globals.get(name)
    }

    /// Remove every declaration that `file` contributed.
    ///
    /// Members and sites from other files survive. A class is dropped only
    /// when nothing from any file is left in it.
    pub fn remove_declarations_from(&mut self, file: &FileId) {
        let mut emptied = Vec::new();
        for (name, decl) in &mut self.classes {
            decl.members.retain(|_, member| member.origin.file != *file);
            let before = decl.sites.len();
            decl.sites.retain(|site| site.location.file != *file);
            if decl.sites.len() != before {
                decl.refresh_from_sites();
            }
            if decl.is_empty() {
                emptied.push(name.clone());
            }
        }
        for name in emptied {
            if let Some(decl) = self.classes.remove(&name) {
                if let Some(qualified) = self.simple_names.get_mut(&decl.simple_name) {
                    qualified.retain(|other| *other != name);
                    if qualified.is_empty() {
                        self.simple_names.remove(&decl.simple_name);
                    }
                }
            }
        }
        self.aliases.retain(|_, alias| alias.origin.file != *file);
        self.globals.retain(|_, global| global.origin.file != *file);
        tracing::debug!(%file, classes = self.classes.len(), "removed declarations");
    }

    /// Render a type for messages: classes by simple name unless two
    /// classes share it.
    pub fn display_name(&self, ty: &Type) -> String {
        crate::ty::render(ty, &|qualified: &str| {
            let simple = qualified.rsplit('.').next().unwrap_or(qualified);
            if self.simple_names.get(simple).map_or(0, Vec::len) > 1 {
                qualified.to_owned()
            } else {
                simple.to_owned()
            }
        })
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDecl> {
        self.classes.values()
    }
}

impl TypeResolver for ClassRegistry {
    fn super_class<'a>(&'a self, class: &str) -> Option<&'a str> {
        let decl = self.resolve(class)?;
        let parent = decl.super_class.as_deref()?;
        Some(
            self.resolve(parent)
                .map_or(parent, |p| p.qualified_name.as_str()),
        )
    }

    fn same_class(&self, a: &str, b: &str) -> bool {
        if a == b {
            return true;
        }
        match (self.resolve(a), self.resolve(b)) {
            (Some(x), Some(y)) => x.qualified_name == y.qualified_name,
            _ => false,
        }
    }

    fn alias_target<'a>(&'a self, name: &str) -> Option<&'a Type> {
        if self.classes.contains_key(name) {
            return None;
        }
        self.aliases.get(name).map(|alias| &alias.target)
    }
}

#[cfg(test)]
mod tests;
