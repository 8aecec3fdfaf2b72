//! Reference search across files, packages and scopes.

use std::path::PathBuf;

use ravel::base::FileId;
use ravel::hir::{DeclId, RefTarget, ReferenceIndex, ReferenceLocator, SearchScope};

use crate::helpers::remap_helpers::program;

fn sources() -> Vec<(&'static str, &'static str)> {
    vec![
        (
            "src/a/Shape.java",
            "package a;\n\npublic class Shape {\n    int sides;\n\n    public int area() {\n        return sides;\n    }\n}\n",
        ),
        (
            "src/a/Square.java",
            "package a;\n\nclass Square extends Shape {\n    public int area() {\n        return sides * super.area();\n    }\n}\n",
        ),
        (
            "src/b/Use.java",
            "package b;\n\nimport a.Shape;\n\nclass Use {\n    int total(Shape shape) {\n        return shape.area();\n    }\n}\n",
        ),
    ]
}

#[test]
fn test_inherited_field_found_in_subclass() {
    let program = program(&sources());
    let refs = ReferenceIndex::build(&program);
    let shape = program.class_by_internal_name("a/Shape").unwrap();
    let sides = program.class(shape).fields[0];

    let sites = refs.search(DeclId::Field(sides), &SearchScope::Project);
    let files: Vec<FileId> = sites.iter().map(|s| s.file).collect();
    assert!(files.contains(&FileId::new(0)));
    assert!(files.contains(&FileId::new(1)));
}

#[test]
fn test_directory_scope_limits_to_package() {
    let program = program(&sources());
    let refs = ReferenceIndex::build(&program);
    let shape = program.class_by_internal_name("a/Shape").unwrap();
    let area = program.class(shape).methods[0];

    let everywhere = refs.search(DeclId::Method(area), &SearchScope::Project);
    let package = refs.search(DeclId::Method(area), &SearchScope::Directory(PathBuf::from("src/a")));
    assert!(everywhere.iter().any(|s| s.file == FileId::new(2)));
    assert!(package.iter().all(|s| s.file != FileId::new(2)));
    assert!(package.len() < everywhere.len());
}

#[test]
fn test_call_through_parameter_type() {
    let program = program(&sources());
    let refs = ReferenceIndex::build(&program);
    let text = sources()[2].1;
    let area_call = refs
        .file_references(FileId::new(2))
        .iter()
        .find(|r| &text[r.range] == "area")
        .unwrap();
    assert!(matches!(&area_call.target, RefTarget::Methods(methods) if !methods.is_empty()));
}
