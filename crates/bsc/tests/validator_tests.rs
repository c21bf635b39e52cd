//! End-to-end validation of single files through the public API

use bsc_compiler::common::messages::codes;
use bsc_compiler::common::{Diagnostic, DiagnosticReporter, DiagnosticSink, Range};
use bsc_compiler::driver::{Program, ProgramConfig};
use bsc_compiler::frontend::{Parser, SemanticValidator};
use codespan_reporting::term::termcolor::ColorChoice;
use pretty_assertions::assert_eq;

fn validate(source: &str) -> Vec<Diagnostic> {
    let mut program = Program::with_reporter(
        ProgramConfig::default(),
        DiagnosticReporter::with_color(ColorChoice::Never),
    );
    program
        .add_file("source/main.bs", source.to_string())
        .expect("source should parse");
    program.validate();
    program.diagnostics()
}

fn codes_of(diagnostics: &[Diagnostic]) -> Vec<u32> {
    diagnostics.iter().map(|d| d.code).collect()
}

#[test]
fn enums_without_values_are_integer() {
    let diagnostics = validate("enum Flags\n    a\n    b\n    c\nend enum\n");
    assert_eq!(diagnostics, vec![]);
}

#[test]
fn duplicate_enum_member() {
    let diagnostics = validate("enum Colors\n    Red = 1\n    Red = 2\nend enum\n");
    assert_eq!(codes_of(&diagnostics), vec![codes::DUPLICATE_IDENTIFIER]);
    assert_eq!(diagnostics[0].message, "duplicate identifier 'Red'");
    assert_eq!(diagnostics[0].range, Some(Range::from_coords(2, 4, 2, 7)));
}

#[test]
fn string_enum_member_needs_value() {
    let diagnostics = validate("enum State\n    On = \"on\"\n    Off\nend enum\n");
    assert_eq!(codes_of(&diagnostics), vec![codes::ENUM_VALUE_IS_REQUIRED]);
    assert_eq!(diagnostics[0].range, Some(Range::from_coords(2, 4, 2, 7)));
}

#[test]
fn continue_for_inside_while() {
    let diagnostics = validate("sub main()\n    while true\n        continue for\n    end while\nend sub\n");
    assert_eq!(codes_of(&diagnostics), vec![codes::EXPECTED_TOKEN]);
    assert_eq!(diagnostics[0].message, "expected token 'while'");
    assert_eq!(diagnostics[0].range, Some(Range::from_coords(2, 17, 2, 20)));
}

#[test]
fn continue_without_loop() {
    let diagnostics = validate("sub main()\n    continue while\nend sub\n");
    assert_eq!(codes_of(&diagnostics), vec![codes::ILLEGAL_CONTINUE_STATEMENT]);
    assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 4, 1, 18)));
}

#[test]
fn optional_chaining_assignment_target() {
    let diagnostics = validate("sub main()\n    a?.b = 1\nend sub\n");
    assert_eq!(
        codes_of(&diagnostics),
        vec![codes::NO_OPTIONAL_CHAINING_IN_LEFT_HAND_SIDE_OF_ASSIGNMENT]
    );
    assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 4, 1, 8)));
}

#[test]
fn class_nested_in_sub() {
    let diagnostics = validate("sub main()\n    class Foo\n    end class\nend sub\n");
    assert_eq!(
        codes_of(&diagnostics),
        vec![codes::KEYWORD_MUST_BE_DECLARED_AT_NAMESPACE_LEVEL]
    );
    assert!(diagnostics[0].message.contains("'class'"));
}

#[test]
fn import_placement() {
    let diagnostics = validate("' comment\nimport \"early.bs\"\nsub main()\nend sub\nimport \"late.bs\"\n");
    assert_eq!(
        codes_of(&diagnostics),
        vec![codes::IMPORT_STATEMENT_MUST_BE_DECLARED_AT_TOP_OF_FILE]
    );
    assert_eq!(diagnostics[0].range.map(|r| r.start.line), Some(4));
}

#[test]
fn library_after_import_is_still_leading() {
    let diagnostics = validate("import \"a.bs\"\nlibrary \"v30/bslCore.brs\"\n' note\nimport \"b.bs\"\nsub main()\nend sub\n");
    assert_eq!(diagnostics, vec![]);
}

#[test]
fn revalidation_is_deterministic() {
    let source = "x = 1\nsub main()\n    continue\n    a?[0] = 1\nend sub\nenum E\n    a = \"x\"\n    b\n    a\nend enum\nimport \"late.bs\"\n";
    let mut parsed = Parser::new(source).unwrap().parse().unwrap();
    let mut sink = DiagnosticSink::new(0);

    SemanticValidator::new(&mut sink).validate(&mut parsed.ast, &parsed.references, false);
    let first = sink.as_slice().to_vec();
    sink.clear();
    SemanticValidator::new(&mut sink).validate(&mut parsed.ast, &parsed.references, false);

    assert_eq!(sink.as_slice(), first.as_slice());
    assert_eq!(
        codes_of(&first),
        vec![
            codes::ILLEGAL_CONTINUE_STATEMENT,
            codes::NO_OPTIONAL_CHAINING_IN_LEFT_HAND_SIDE_OF_ASSIGNMENT,
            codes::ENUM_VALUE_IS_REQUIRED,
            codes::DUPLICATE_IDENTIFIER,
            codes::ENUM_VALUE_IS_REQUIRED,
            codes::UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION,
            codes::IMPORT_STATEMENT_MUST_BE_DECLARED_AT_TOP_OF_FILE,
        ]
    );
}

#[test]
fn symbols_are_scoped() {
    let source = "namespace Shapes\n    function area(w as integer, h = 2) as integer\n        result = w * h\n        return result\n    end function\nend namespace\n";
    let mut parsed = Parser::new(source).unwrap().parse().unwrap();
    let mut sink = DiagnosticSink::new(0);
    SemanticValidator::new(&mut sink).validate(&mut parsed.ast, &parsed.references, false);
    assert!(sink.is_empty());

    let ast = &parsed.ast;
    let root_table = ast.symbol_table(ast.root()).expect("root table");
    assert!(root_table.has_symbol("shapes"));
    assert!(root_table.has_symbol("Shapes_area"));
    assert!(!root_table.has_symbol("result"));

    let function_scope = ast
        .scopes()
        .find(|(_, table)| table.has_symbol("result"))
        .map(|(id, _)| id)
        .expect("function scope");
    assert!(ast.lookup_symbol(function_scope, "w").is_some());
    assert!(ast.lookup_symbol(function_scope, "area").is_some());
    assert!(ast.lookup_symbol(function_scope, "SHAPES_AREA").is_some());
    assert!(ast.lookup_symbol(function_scope, "missing").is_none());
}

#[test]
fn rendered_diagnostic_carries_code_and_location() {
    let source = "sub main()\n    a?.b = 1\nend sub\n";
    let mut program = Program::with_reporter(
        ProgramConfig::default(),
        DiagnosticReporter::with_color(ColorChoice::Never),
    );
    program.add_file("source/main.bs", source.to_string()).unwrap();
    program.validate();
    let diagnostics = program.diagnostics();

    let rendered = program.reporter().render(&diagnostics[0]);
    assert!(rendered.contains("BS1109"), "{rendered}");
    assert!(rendered.contains("source/main.bs:2:5"), "{rendered}");
}
