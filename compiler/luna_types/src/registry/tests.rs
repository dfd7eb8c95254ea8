use super::*;
use crate::subtype::{subtype_of, SubtypeRules};
use pretty_assertions::assert_eq;

fn at(file: &str) -> SourceLocation {
    SourceLocation::new(FileId::from(file), Span::new(0, 1))
}

#[test]
fn declare_is_idempotent_per_file() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("Dog", Some("Animal"), at("a.lua"));
    reg.declare_class("Dog", Some("Animal"), at("a.lua"));
    let dog = reg.resolve("Dog").map(|d| d.sites.len());
    assert_eq!(dog, Some(1));
    assert_eq!(reg.len(), 1);
}

#[test]
fn redeclaration_updates_super() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("Dog", Some("Animal"), at("a.lua"));
    reg.declare_class("Dog", Some("Pet"), at("b.lua"));
    assert_eq!(reg.super_class("Dog"), Some("Pet"));

    reg.remove_declarations_from(&FileId::from("b.lua"));
    assert_eq!(reg.super_class("Dog"), Some("Animal"));
}

#[test]
fn members_last_write_wins() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("Point", None, at("a.lua"));
    reg.add_member("Point", "x", Type::number(), None, at("a.lua"));
    reg.add_member("Point", "x", Type::string(), Some("doc".into()), at("a.lua"));
    let x = reg.find_member("Point", "x");
    assert_eq!(x.map(ClassMember::ty), Some(Type::string()));
    assert_eq!(x.and_then(|m| m.doc.as_deref()), Some("doc"));
}

#[test]
fn function_members_become_methods() {
    let mut reg = ClassRegistry::new();
    let func = FunctionType::new(crate::Signature::default());
    reg.add_member("M", "run", Type::Function(func.clone()), None, at("a.lua"));
    let run = reg.find_member("M", "run");
    assert_eq!(run.map(|m| &m.kind), Some(&MemberKind::Method(func)));
}

#[test]
fn find_member_walks_the_chain() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("Animal", None, at("a.lua"));
    reg.declare_class("Dog", Some("Animal"), at("a.lua"));
    reg.add_member("Animal", "name", Type::string(), None, at("a.lua"));
    reg.add_member("Dog", "bark", Type::boolean(), None, at("a.lua"));
    assert!(reg.find_member("Dog", "name").is_some());
    assert!(reg.find_member("Animal", "bark").is_none());
    let names: Vec<&str> = reg
        .all_members("Dog")
        .into_iter()
        .map(|m| m.name.as_str())
        .collect();
    assert_eq!(names, ["bark", "name"]);
}

#[test]
fn find_member_survives_cycles() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("A", Some("B"), at("a.lua"));
    reg.declare_class("B", Some("A"), at("a.lua"));
    assert!(reg.find_member("A", "missing").is_none());
    assert!(reg.all_members("A").is_empty());
}

#[test]
fn resolve_by_simple_name() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("zoo.Animal", None, at("a.lua"));
    assert_eq!(
        reg.resolve("Animal").map(|d| d.qualified_name.as_str()),
        Some("zoo.Animal")
    );
    reg.declare_class("farm.Animal", None, at("b.lua"));
    assert!(reg.resolve("Animal").is_none());
    assert!(reg.resolve("farm.Animal").is_some());
}

#[test]
fn namespace_members_are_direct_children() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("ui.Label", None, at("a.lua"));
    reg.declare_class("ui.widgets.Slider", None, at("a.lua"));
    reg.declare_class("ui.Button", None, at("b.lua"));
    reg.declare_class("uix.Other", None, at("a.lua"));
    reg.declare_class("ui", None, at("a.lua"));
    let names = |reg: &ClassRegistry, ns: &str| -> Vec<String> {
        reg.namespace_members(ns)
            .into_iter()
            .map(|d| d.qualified_name.clone())
            .collect()
    };
    assert_eq!(names(&reg, "ui"), ["ui.Button", "ui.Label"]);
    assert_eq!(names(&reg, "ui.widgets"), ["ui.widgets.Slider"]);
    assert!(names(&reg, "widgets").is_empty());

    reg.remove_declarations_from(&FileId::from("b.lua"));
    assert_eq!(names(&reg, "ui"), ["ui.Label"]);
}

#[test]
fn removal_keeps_other_files() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("Point", None, at("a.lua"));
    reg.add_member("Point", "x", Type::number(), None, at("a.lua"));
    reg.add_member("Point", "y", Type::number(), None, at("b.lua"));
    reg.declare_alias("Id", Type::number(), at("a.lua"));
    reg.declare_global("VERSION", Type::string(), at("b.lua"));

    reg.remove_declarations_from(&FileId::from("a.lua"));
    let point = reg.resolve("Point");
    assert!(point.is_some_and(|p| p.sites.is_empty() && p.location.is_none()));
    assert!(reg.find_member("Point", "x").is_none());
    assert!(reg.find_member("Point", "y").is_some());
    assert!(reg.alias("Id").is_none());
    assert!(reg.global("VERSION").is_some());

    reg.remove_declarations_from(&FileId::from("b.lua"));
    assert!(reg.resolve("Point").is_none());
    assert!(reg.is_empty());
}

#[test]
fn removal_frees_simple_name() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("zoo.Animal", None, at("a.lua"));
    reg.declare_class("farm.Animal", None, at("b.lua"));
    reg.remove_declarations_from(&FileId::from("b.lua"));
    assert!(reg.resolve("Animal").is_some());
}

#[test]
fn simple_name_index_tracks_every_class() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("geo.Point", None, at("a.lua"));
    reg.add_member("geo.Point", "x", Type::number(), None, at("a.lua"));
    reg.declare_class("Shape", None, at("a.lua"));
    assert!(reg.find_member("Point", "x").is_some());
    assert_eq!(
        reg.resolve("Shape").map(|d| d.qualified_name.as_str()),
        Some("Shape")
    );

    reg.declare_class("draw.Point", None, at("b.lua"));
    reg.declare_class("plot.Point", None, at("c.lua"));
    assert!(reg.resolve("Point").is_none());
    reg.remove_declarations_from(&FileId::from("b.lua"));
    assert!(reg.resolve("Point").is_none());
    reg.remove_declarations_from(&FileId::from("a.lua"));
    assert_eq!(
        reg.resolve("Point").map(|d| d.qualified_name.as_str()),
        Some("plot.Point")
    );
    assert!(reg.resolve("Shape").is_none());

    reg.clear();
    assert!(reg.resolve("Point").is_none());
}

#[test]
fn display_name_disambiguates() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("zoo.Animal", None, at("a.lua"));
    reg.declare_class("ui.Button", None, at("a.lua"));
    let ty = Type::union([Type::class("zoo.Animal"), Type::class("ui.Button")]);
    assert_eq!(reg.display_name(&ty), "Animal | Button");

    reg.declare_class("farm.Animal", None, at("b.lua"));
    assert_eq!(reg.display_name(&ty), "zoo.Animal | Button");
}

#[test]
fn resolver_for_subtyping() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("zoo.Animal", None, at("a.lua"));
    reg.declare_class("zoo.Dog", Some("Animal"), at("a.lua"));
    reg.declare_alias("Pet", Type::class("zoo.Dog"), at("a.lua"));
    let strict = SubtypeRules::STRICT;
    assert!(subtype_of(&Type::class("zoo.Dog"), &Type::class("zoo.Animal"), strict, &reg));
    assert!(subtype_of(&Type::class("Dog"), &Type::class("zoo.Animal"), strict, &reg));
    assert!(subtype_of(&Type::class("Pet"), &Type::class("Animal"), strict, &reg));
    assert!(!subtype_of(&Type::class("zoo.Animal"), &Type::class("Pet"), strict, &reg));
}

#[test]
fn class_shadows_alias_of_same_name() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("Thing", None, at("a.lua"));
    reg.declare_alias("Thing", Type::number(), at("a.lua"));
    assert!(reg.alias_target("Thing").is_none());
}

#[test]
fn clear_empties_everything() {
    let mut reg = ClassRegistry::new();
    reg.declare_class("A", None, at("a.lua"));
    reg.declare_alias("B", Type::number(), at("a.lua"));
    reg.clear();
    assert!(reg.is_empty());
    assert_eq!(reg.len(), 0);
}
