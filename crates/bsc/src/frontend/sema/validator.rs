//! The validation walk
//!
//! [`SemanticValidator`] is a [`Visitor`]: on entering each node it runs the
//! rule registered for that node's kind. Declarations register their symbol
//! before their bodies are walked.

use crate::common::{messages, DiagnosticSink, Range};
use crate::frontend::ast::{walk, Ast, NodeId, NodeKind, Visitor};
use crate::frontend::lexer::TokenKind;
use crate::frontend::parser::References;
use crate::types::{BscType, FunctionType, InterfaceType};
use tracing::{debug, trace};

use super::{
    assignment, control_flow, enums, placement, top_level, MAX_CALLABLE_PARAMETERS,
    MAX_CALLFUNC_ARGUMENTS,
};

/// Validates one file's tree, appending to that file's diagnostic sink
pub struct SemanticValidator<'a> {
    sink: &'a mut DiagnosticSink,
}

impl<'a> SemanticValidator<'a> {
    pub fn new(sink: &'a mut DiagnosticSink) -> Self {
        Self { sink }
    }

    /// Run the full pass.
    ///
    /// Diagnostics and symbol tables from an earlier run are discarded
    /// first, so validating an unchanged tree twice gives the same result.
    /// Directive ordering is not checked for type-declaration files.
    pub fn validate(&mut self, ast: &mut Ast, references: &References, is_typedef: bool) {
        self.sink.clear();
        ast.clear_symbol_tables();
        debug!(nodes = ast.len(), is_typedef, "validating file {}", self.sink.file_id());

        let root = ast.root();
        walk(ast, root, self);

        top_level::check_top_level_statements(ast, self.sink);
        if !is_typedef {
            top_level::check_directive_order(ast, references, self.sink);
        }

        debug!(diagnostics = self.sink.len(), "validated file {}", self.sink.file_id());
    }
}

impl Visitor for SemanticValidator<'_> {
    fn enter(&mut self, ast: &mut Ast, node: NodeId, parent: Option<NodeId>) {
        let sink = &mut *self.sink;

        match ast.kind(node).clone() {
            NodeKind::Method { func, .. } => {
                register(ast, func, "super", None, BscType::Dynamic);
            }

            NodeKind::Callfunc { method_name, args, .. } => {
                if args.len() > MAX_CALLFUNC_ARGUMENTS {
                    sink.add(
                        messages::callfunc_has_too_many_arguments(args.len()),
                        Some(method_name.range),
                    );
                }
            }

            NodeKind::Enum { enum_token, name, .. } => {
                placement::check(ast, node, parent, &enum_token, Some(name.range), sink);
                enums::validate_enum(ast, node, sink);
                if let Some(parent) = parent {
                    register(ast, parent, &name.text, Some(name.range), BscType::Enum(name.text.clone()));
                }
            }

            NodeKind::Class { class_keyword, name, .. } => {
                placement::check(ast, node, parent, &class_keyword, Some(name.range), sink);
                if let Some(parent) = parent {
                    register(ast, parent, &name.text, Some(name.range), BscType::Custom(name.text.clone()));
                }
            }

            NodeKind::Assignment { name, value, .. } => {
                let ty = literal_type(ast, value).unwrap_or(BscType::Dynamic);
                register(ast, node, &name.text, Some(name.range), ty);
            }

            NodeKind::DottedSet { .. } | NodeKind::IndexedSet { .. } => {
                assignment::check_assignment_target(ast, node, sink);
            }

            NodeKind::ForEach { item, .. } => {
                register(ast, node, &item.text, Some(item.range), BscType::Dynamic);
            }

            NodeKind::Namespace { keyword, name_expression, .. } => {
                let name_range = ast.range(name_expression);
                placement::check(ast, node, parent, &keyword, name_range, sink);
                if let (Some(parent), Some((leading, range))) =
                    (parent, leading_segment(ast, name_expression))
                {
                    register(ast, parent, &leading, range, BscType::Namespace(leading.clone()));
                }
            }

            NodeKind::Function { name, func } => {
                let NodeKind::FunctionExpression { function_type, .. } = ast.kind(func).clone() else {
                    return;
                };
                placement::check(ast, node, parent, &function_type, Some(name.range), sink);

                let mut func_type = function_signature(ast, func);
                let namespace = ast
                    .find_ancestor(node, |_, kind| matches!(kind, NodeKind::Namespace { .. }))
                    .and_then(|ns| ast.namespace_name(ns));

                match namespace {
                    Some(namespace) => {
                        let flattened = format!("{}_{}", namespace.replace('.', "_"), name.text);
                        func_type.set_name(flattened.clone());
                        let ty = BscType::Function(Box::new(func_type));
                        if let Some(parent) = parent {
                            register(ast, parent, &name.text, Some(name.range), ty.clone());
                        }
                        let root = ast.root();
                        register(ast, root, &flattened, Some(name.range), ty);
                    }
                    None => {
                        func_type.set_name(name.text.clone());
                        if let Some(parent) = parent {
                            register(
                                ast,
                                parent,
                                &name.text,
                                Some(name.range),
                                BscType::Function(Box::new(func_type)),
                            );
                        }
                    }
                }
            }

            NodeKind::FunctionExpression { params, .. } => {
                if !ast.has_local_symbol(node, "m") {
                    register(ast, node, "m", None, BscType::Dynamic);
                }
                check_parameter_count(ast, &params, sink);
            }

            NodeKind::FunctionParameter { name, .. } => {
                let ty = parameter_type(ast, node);
                register(ast, node, &name.text, Some(name.range), ty);
            }

            NodeKind::Interface { keyword, name, .. } => {
                placement::check(ast, node, parent, &keyword, Some(name.range), sink);
                if let Some(parent) = parent {
                    register(
                        ast,
                        parent,
                        &name.text,
                        Some(name.range),
                        BscType::Interface(InterfaceType::default()),
                    );
                }
            }

            NodeKind::Const { const_token, name, value } => {
                placement::check(ast, node, parent, &const_token, Some(name.range), sink);
                let ty = literal_type(ast, value).unwrap_or(BscType::Dynamic);
                if let Some(parent) = parent {
                    register(ast, parent, &name.text, Some(name.range), ty);
                }
            }

            NodeKind::Catch { exception_variable: Some(variable), .. } => {
                register(ast, node, &variable.text, Some(variable.range), BscType::Dynamic);
            }

            NodeKind::Dim { identifier: Some(identifier), .. } => {
                register(
                    ast,
                    node,
                    &identifier.text,
                    Some(identifier.range),
                    BscType::Array(Box::new(BscType::Dynamic)),
                );
            }

            NodeKind::Return { .. } => control_flow::check_return(ast, node, sink),
            NodeKind::Continue { .. } => control_flow::check_continue(ast, node, sink),

            _ => {}
        }
    }
}

/// Add a symbol to the nearest scope of `at`
fn register(ast: &mut Ast, at: NodeId, name: &str, range: Option<Range>, ty: BscType) {
    trace!(scope = ast.nearest_scope(at).index(), %ty, "register {}", name);
    ast.add_symbol(at, name, range, ty);
}

fn check_parameter_count(ast: &Ast, params: &[NodeId], sink: &mut DiagnosticSink) {
    if params.len() <= MAX_CALLABLE_PARAMETERS {
        return;
    }
    for &param in &params[MAX_CALLABLE_PARAMETERS..] {
        if let NodeKind::FunctionParameter { name, .. } = ast.kind(param) {
            sink.add(
                messages::too_many_callable_parameters(params.len(), MAX_CALLABLE_PARAMETERS),
                Some(name.range),
            );
        }
    }
}

/// Type of a literal expression, looking through a leading sign
pub(super) fn literal_type(ast: &Ast, expr: NodeId) -> Option<BscType> {
    let (kind, _) = literal_of(ast, expr)?;
    Some(BscType::from_name(kind.literal_type_name()))
}

/// Literal token kind and literal node of `expr`, unwrapping one unary operator
pub(super) fn literal_of(ast: &Ast, expr: NodeId) -> Option<(TokenKind, NodeId)> {
    let target = match ast.kind(expr) {
        NodeKind::Unary { right, .. } => *right,
        _ => expr,
    };
    match ast.kind(target) {
        NodeKind::Literal { token } => Some((token.kind, target)),
        _ => None,
    }
}

/// Declared type, else the default value's literal type, else dynamic
fn parameter_type(ast: &Ast, param: NodeId) -> BscType {
    let NodeKind::FunctionParameter { default_value, type_token, .. } = ast.kind(param) else {
        return BscType::Dynamic;
    };
    if let Some(type_token) = type_token {
        return BscType::from_name(&type_token.text);
    }
    default_value
        .and_then(|value| literal_type(ast, value))
        .unwrap_or(BscType::Dynamic)
}

fn function_signature(ast: &Ast, func: NodeId) -> FunctionType {
    let NodeKind::FunctionExpression { function_type, params, return_type, .. } = ast.kind(func)
    else {
        return FunctionType::default();
    };
    let is_sub = function_type.kind == TokenKind::Sub;
    let returns = match return_type {
        Some(token) => BscType::from_name(&token.text),
        None if is_sub => BscType::Void,
        None => BscType::Dynamic,
    };

    let mut signature = FunctionType::new(returns, is_sub);
    for &param in params {
        if let NodeKind::FunctionParameter { name, .. } = ast.kind(param) {
            signature.params.push((name.text.clone(), parameter_type(ast, param)));
        }
    }
    signature
}

/// First name of a dotted namespace name and its range
fn leading_segment(ast: &Ast, name_expression: NodeId) -> Option<(String, Option<Range>)> {
    let mut current = name_expression;
    loop {
        match ast.kind(current) {
            NodeKind::Variable { name } => return Some((name.text.clone(), Some(name.range))),
            NodeKind::DottedGet { obj, .. } => current = *obj,
            _ => return None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::messages::codes;
    use crate::frontend::sema::test_util::{codes as codes_of, validate_source};

    fn root_symbol(ast: &Ast, name: &str) -> Option<BscType> {
        ast.symbol_table(ast.root())
            .and_then(|t| t.get_symbol(name))
            .map(|e| e.ty.clone())
    }

    fn find_node(ast: &Ast, predicate: impl Fn(&NodeKind) -> bool) -> NodeId {
        ast.scopes()
            .map(|(id, _)| id)
            .chain(std::iter::once(ast.root()))
            .find(|&id| predicate(ast.kind(id)))
            .expect("node not found")
    }

    #[test]
    fn test_registers_root_declarations() {
        let source = "sub main()\nend sub\nclass Dog\nend class\nenum Color\n    red\nend enum\ninterface Named\nend interface\nconst PI = 3.14\nnamespace Alpha.Beta\nend namespace\n";
        let (ast, diagnostics) = validate_source(source);

        assert!(diagnostics.is_empty(), "{diagnostics:?}");
        assert!(matches!(root_symbol(&ast, "MAIN"), Some(BscType::Function(_))));
        assert_eq!(root_symbol(&ast, "dog"), Some(BscType::Custom("Dog".to_string())));
        assert_eq!(root_symbol(&ast, "color"), Some(BscType::Enum("Color".to_string())));
        assert_eq!(
            root_symbol(&ast, "named"),
            Some(BscType::Interface(InterfaceType::default()))
        );
        assert_eq!(root_symbol(&ast, "pi"), Some(BscType::Float));
        assert_eq!(root_symbol(&ast, "alpha"), Some(BscType::Namespace("Alpha".to_string())));
        assert_eq!(root_symbol(&ast, "beta"), None);
    }

    #[test]
    fn test_namespaced_function_registers_flattened_name() {
        let source = "namespace Alpha.Beta\n    function greet(name as string) as string\n        return name\n    end function\nend namespace\n";
        let (ast, diagnostics) = validate_source(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let flattened = root_symbol(&ast, "alpha_beta_greet").expect("flattened name");
        let func = flattened.as_function().unwrap();
        assert_eq!(func.name.as_deref(), Some("Alpha_Beta_greet"));
        assert_eq!(func.return_type, BscType::String);
        assert_eq!(func.params, vec![("name".to_string(), BscType::String)]);

        // The short name lives in the namespace body's scope, not the root
        assert!(root_symbol(&ast, "greet").is_none());
        let namespace_scope = ast
            .scopes()
            .find(|(id, _)| *id != ast.root() && matches!(ast.kind(*id), NodeKind::Body { .. }))
            .map(|(_, t)| t)
            .expect("namespace scope");
        let local = namespace_scope.get_symbol("greet").unwrap();
        assert_eq!(local.ty.as_function().unwrap().name.as_deref(), Some("Alpha_Beta_greet"));
    }

    #[test]
    fn test_function_scope_symbols() {
        let source = "function add(a as integer, b = 2.5, c = foo, d = \"x\") as float\n    total = a + b\n    count = 1\n    dim grid[3]\n    for each item in grid\n    end for\n    return total\nend function\n";
        let (ast, diagnostics) = validate_source(source);
        assert!(diagnostics.is_empty(), "{diagnostics:?}");

        let func = find_node(&ast, |k| matches!(k, NodeKind::FunctionExpression { .. }));
        let table = ast.symbol_table(func).unwrap();
        let ty = |name: &str| table.get_symbol(name).map(|e| e.ty.clone());

        assert_eq!(ty("m"), Some(BscType::Dynamic));
        assert_eq!(ty("a"), Some(BscType::Integer));
        assert_eq!(ty("b"), Some(BscType::Float));
        assert_eq!(ty("c"), Some(BscType::Dynamic));
        assert_eq!(ty("d"), Some(BscType::String));
        assert_eq!(ty("total"), Some(BscType::Dynamic));
        assert_eq!(ty("count"), Some(BscType::Integer));
        assert_eq!(ty("grid"), Some(BscType::Array(Box::new(BscType::Dynamic))));
        assert_eq!(ty("item"), Some(BscType::Dynamic));
        assert_eq!(table.parent(), Some(ast.root()));
    }

    #[test]
    fn test_method_gets_super_and_m() {
        let source = "class Dog extends Animal\n    sub bark()\n    end sub\nend class\n";
        let (ast, _) = validate_source(source);
        let func = find_node(&ast, |k| matches!(k, NodeKind::FunctionExpression { .. }));
        let table = ast.symbol_table(func).unwrap();
        assert!(table.has_symbol("super"));
        assert!(table.has_symbol("m"));
        assert_eq!(table.get_symbol("super").unwrap().range, None);
    }

    #[test]
    fn test_catch_variable_in_catch_scope() {
        let source = "sub main()\n    try\n        x = 1\n    catch err\n        print err\n    end try\nend sub\n";
        let (ast, _) = validate_source(source);
        let catch = find_node(&ast, |k| matches!(k, NodeKind::Catch { .. }));
        assert!(ast.symbol_table(catch).unwrap().has_symbol("err"));
        assert!(ast.lookup_symbol(catch, "x").is_some());
    }

    #[test]
    fn test_callfunc_argument_limit() {
        let source = "sub main()\n    node@.ok(1, 2, 3, 4, 5)\n    node@.tooMany(1, 2, 3, 4, 5, 6)\nend sub\n";
        let (_, diagnostics) = validate_source(source);
        assert_eq!(codes_of(&diagnostics), vec![codes::CALLFUNC_HAS_TOO_MANY_ARGUMENTS]);
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(2, 10, 2, 17)));
    }

    #[test]
    fn test_parameter_limit() {
        let params: Vec<String> = (0..34).map(|i| format!("p{i}")).collect();
        let source = format!("sub many({})\nend sub\n", params.join(", "));
        let (_, diagnostics) = validate_source(&source);
        assert_eq!(
            codes_of(&diagnostics),
            vec![codes::TOO_MANY_CALLABLE_PARAMETERS, codes::TOO_MANY_CALLABLE_PARAMETERS]
        );
        assert!(diagnostics[0].message.contains("34"));
        assert!(diagnostics[0].message.contains("32"));
    }

    #[test]
    fn test_nodes_without_ranges() {
        let source = "sub main()\n    class Foo\n    end class\n    a?.b = 1\n    continue while\n    while true\n        continue for\n    end while\n    return 1\nend sub\nenum E\n    a = \"x\"\n    a\nend enum\nx = 1\nimport \"late.bs\"\n";
        let (_, ranged) = validate_source(source);

        let mut parsed = crate::frontend::parser::Parser::new(source)
            .unwrap()
            .parse()
            .unwrap();
        let ids: Vec<NodeId> = parsed.ast.node_ids().collect();
        for id in ids {
            let kind = parsed.ast.kind(id).clone();
            parsed.ast.replace(id, kind, None);
        }
        assert!(parsed.ast.node_ids().all(|id| parsed.ast.range(id).is_none()));

        let mut sink = DiagnosticSink::new(0);
        SemanticValidator::new(&mut sink).validate(&mut parsed.ast, &parsed.references, false);
        let diagnostics = sink.as_slice();

        assert_eq!(codes_of(diagnostics), codes_of(&ranged));
        let found: Vec<(u32, bool)> = diagnostics
            .iter()
            .map(|d| (d.code, d.range.is_some()))
            .collect();
        assert_eq!(
            found,
            vec![
                (codes::KEYWORD_MUST_BE_DECLARED_AT_NAMESPACE_LEVEL, true),
                (codes::NO_OPTIONAL_CHAINING_IN_LEFT_HAND_SIDE_OF_ASSIGNMENT, true),
                (codes::ILLEGAL_CONTINUE_STATEMENT, false),
                (codes::EXPECTED_TOKEN, true),
                (codes::VOID_FUNCTION_MAY_NOT_RETURN_VALUE, false),
                (codes::DUPLICATE_IDENTIFIER, true),
                (codes::ENUM_VALUE_IS_REQUIRED, false),
                (codes::UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION, false),
                (codes::IMPORT_STATEMENT_MUST_BE_DECLARED_AT_TOP_OF_FILE, false),
            ]
        );
        // Token ranges survive: `?.b` and the keyword through the name
        assert_eq!(diagnostics[0].range, Some(Range::from_coords(1, 4, 1, 13)));
        assert_eq!(diagnostics[1].range, Some(Range::from_coords(3, 5, 3, 8)));
    }

    #[test]
    fn test_revalidation_starts_fresh() {
        let mut parsed = crate::frontend::parser::Parser::new("sub main()\n    continue\nend sub\n")
            .unwrap()
            .parse()
            .unwrap();
        let mut sink = DiagnosticSink::new(0);
        SemanticValidator::new(&mut sink).validate(&mut parsed.ast, &parsed.references, false);
        let first = sink.as_slice().to_vec();
        SemanticValidator::new(&mut sink).validate(&mut parsed.ast, &parsed.references, false);
        assert_eq!(sink.as_slice(), first.as_slice());
        assert_eq!(first.len(), 1);
    }
}
