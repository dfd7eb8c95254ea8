use super::*;
use luna_types::{MemberKind, Param, TypeResolver};
use luna_ir::Visibility;
use pretty_assertions::assert_eq;

fn index(registry: &mut ClassRegistry, file: &str, source: &str) {
    let tree = luna_parse::parse(source);
    index_file(&tree, &FileId::from(file), registry);
}

fn member_type(registry: &ClassRegistry, class: &str, member: &str) -> Option<Type> {
    registry.find_member(class, member).map(luna_types::ClassMember::ty)
}

const ANIMALS: &str = "\
---@class Animal
---@field name string
---@field private age? number
local Animal = {}

---Make a noise.
---@param sound string
---@return boolean
function Animal:speak(sound) end

---@class Dog : Animal
local Dog = {}

Dog.legs = 4
";

#[test]
fn classes_fields_and_methods() {
    let mut registry = ClassRegistry::new();
    index(&mut registry, "zoo.lua", ANIMALS);

    assert_eq!(member_type(&registry, "Animal", "name"), Some(Type::string()));
    let age = registry.find_member("Animal", "age");
    assert_eq!(age.map(luna_types::ClassMember::visibility), Some(Visibility::Private));
    assert_eq!(age.map(luna_types::ClassMember::ty), Some(Type::number().optional()));

    let speak = registry.find_member("Animal", "speak");
    let Some(MemberKind::Method(func)) = speak.map(|m| &m.kind) else {
        panic!("speak should be a method, got {speak:?}");
    };
    let sig = func.main();
    assert!(sig.is_method_call);
    assert_eq!(sig.params, vec![Param::new("sound", Type::string())]);
    assert_eq!(sig.return_type, Type::boolean());
    assert_eq!(speak.and_then(|m| m.doc.as_deref()), Some("Make a noise."));

    assert_eq!(registry.super_class("Dog"), Some("Animal"));
    assert_eq!(member_type(&registry, "Dog", "legs"), Some(Type::number()));
    // Inherited through the chain.
    assert_eq!(member_type(&registry, "Dog", "name"), Some(Type::string()));
}

#[test]
fn global_table_becomes_class() {
    let mut registry = ClassRegistry::new();
    index(
        &mut registry,
        "utils.lua",
        "Utils = {}\nfunction Utils.name() return \"utils\" end\nUtils.VERSION = \"1.0\"\n",
    );
    assert!(registry.resolve("Utils").is_some());
    assert_eq!(member_type(&registry, "Utils", "VERSION"), Some(Type::string()));
    let name = member_type(&registry, "Utils", "name");
    let ret = name
        .as_ref()
        .and_then(Type::as_function)
        .map(|func| func.main().return_type.clone());
    assert_eq!(ret, Some(Type::string()));
    assert_eq!(registry.global("Utils").map(|g| g.ty.clone()), Some(Type::table()));
}

#[test]
fn local_tables_are_not_classes() {
    let mut registry = ClassRegistry::new();
    index(
        &mut registry,
        "m.lua",
        "local M = {}\nfunction M.helper() end\nM.value = 1\nlocal function private() end\n",
    );
    assert!(registry.resolve("M").is_none());
    assert!(registry.global("private").is_none());
    assert_eq!(registry.len(), 0);
}

#[test]
fn aliases_and_globals() {
    let mut registry = ClassRegistry::new();
    index(
        &mut registry,
        "g.lua",
        "---@alias Id number|string\n\n---@type Id\nCURRENT = 1\nfunction greet(name) return \"hi \" .. name end\n",
    );
    assert_eq!(
        registry.alias("Id").map(|a| a.target.clone()),
        Some(Type::union([Type::number(), Type::string()]))
    );
    assert_eq!(registry.global("CURRENT").map(|g| g.ty.clone()), Some(Type::class("Id")));
    let greet = registry.global("greet").map(|g| g.ty.clone());
    let ret = greet
        .as_ref()
        .and_then(Type::as_function)
        .map(|func| func.main().return_type.clone());
    assert_eq!(ret, Some(Type::string()));
}

#[test]
fn overloads_and_generics() {
    let mut registry = ClassRegistry::new();
    index(
        &mut registry,
        "list.lua",
        "---@generic T\n---@param list T[]\n---@return T\n---@overload fun(list: table, n: number): table\nfunction first(list) return list[1] end\n",
    );
    let first = registry.global("first").map(|g| g.ty.clone());
    let Some(Type::Function(func)) = first else {
        panic!("first should be a function, got {first:?}");
    };
    assert_eq!(func.signatures().len(), 2);
    let main = func.main();
    assert_eq!(main.generic_params, Some(vec!["T".to_owned()]));
    assert_eq!(main.params[0].ty, Type::array(Type::Generic("T".to_owned())));
    assert_eq!(main.return_type, Type::Generic("T".to_owned()));
    assert_eq!(func.signatures()[1].params.len(), 2);
}

#[test]
fn reindexing_replaces_only_that_file() {
    let mut registry = ClassRegistry::new();
    index(&mut registry, "a.lua", "---@class Point\n---@field x number\nlocal Point = {}\n");
    index(&mut registry, "b.lua", "function Point:length() return 0 end\n");
    assert!(registry.find_member("Point", "length").is_some());

    let a = FileId::from("a.lua");
    registry.remove_declarations_from(&a);
    index(&mut registry, "a.lua", "---@class Point\n---@field y number\nlocal Point = {}\n");

    assert!(registry.find_member("Point", "x").is_none());
    assert!(registry.find_member("Point", "y").is_some());
    assert!(registry.find_member("Point", "length").is_some());
}
