//! Statement and expression node kinds
//!
//! Child links are [`NodeId`] handles into the owning [`Ast`](super::Ast);
//! a node owns exactly the children listed by [`NodeKind::children`].

use super::NodeId;
use crate::frontend::lexer::Token;

/// Parameter of an interface method signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceParam {
    pub name: Token,
    pub type_token: Option<Token>,
}

/// Node kinds. Statements first, then expressions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    // ==================== Statements ====================
    /// Statement list: file root, namespace body, block body
    Body { statements: Vec<NodeId> },

    /// `' text` or `rem text`
    Comment { comment: Token },

    /// `name = value`, `name += value`
    Assignment { name: Token, operator: Token, value: NodeId },

    /// `obj.name = value`
    DottedSet { obj: NodeId, dot: Token, name: Token, operator: Token, value: NodeId },

    /// `obj[index] = value`
    IndexedSet {
        obj: NodeId,
        question_dot: Option<Token>,
        open_square: Token,
        indexes: Vec<NodeId>,
        close_square: Option<Token>,
        operator: Token,
        value: NodeId,
    },

    /// `value++`, `value--`
    Increment { value: NodeId, operator: Token },

    /// Bare expression, normally a call
    ExpressionStatement { expression: NodeId },

    /// `print a; b` or `? a`
    Print { print: Token, expressions: Vec<NodeId> },

    If {
        if_token: Token,
        condition: NodeId,
        then_branch: NodeId,
        /// Either a `Body` or a nested `If` for `else if`
        else_branch: Option<NodeId>,
    },

    While { while_token: Token, condition: NodeId, body: NodeId },

    /// `for counter = start to final step increment`
    For {
        for_token: Token,
        /// Assignment initialising the counter
        counter: NodeId,
        final_value: NodeId,
        step: Option<NodeId>,
        body: NodeId,
    },

    /// `for each item in target`
    ForEach { for_each: Token, item: Token, target: NodeId, body: NodeId },

    /// `exit while`, `exit for`
    ExitLoop { exit: Token, loop_type: Option<Token> },

    /// `continue while`, `continue for`
    Continue { continue_token: Token, loop_type: Option<Token> },

    Return { return_token: Token, value: Option<NodeId> },

    /// `dim name[size, ...]`
    Dim { dim: Token, identifier: Option<Token>, dimensions: Vec<NodeId> },

    Try { try_token: Token, try_branch: NodeId, catch: Option<NodeId> },

    Catch { catch_token: Token, exception_variable: Option<Token>, body: NodeId },

    Throw { throw: Token, expression: NodeId },

    Stop { stop: Token },

    /// Bare `end`
    End { end: Token },

    /// Named `sub` or `function` declaration
    Function { name: Token, func: NodeId },

    /// Class method
    Method {
        access: Option<Token>,
        override_token: Option<Token>,
        name: Token,
        func: NodeId,
    },

    /// Class field
    Field {
        access: Option<Token>,
        name: Token,
        type_token: Option<Token>,
        initial_value: Option<NodeId>,
    },

    Class {
        class_keyword: Token,
        name: Token,
        parent_class: Option<Token>,
        /// Methods, fields and comments
        members: Vec<NodeId>,
    },

    Namespace {
        keyword: Token,
        /// `Variable` or a `DottedGet` chain
        name_expression: NodeId,
        body: NodeId,
    },

    Interface {
        keyword: Token,
        name: Token,
        parent_interface: Option<Token>,
        members: Vec<NodeId>,
    },

    InterfaceField { name: Token, type_token: Option<Token> },

    InterfaceMethod {
        function_type: Token,
        name: Token,
        params: Vec<InterfaceParam>,
        return_type: Option<Token>,
    },

    Enum { enum_token: Token, name: Token, members: Vec<NodeId> },

    EnumMember { name: Token, value: Option<NodeId> },

    Const { const_token: Token, name: Token, value: NodeId },

    Library { library: Token, file_path: Option<Token> },

    Import { import: Token, file_path: Option<Token> },

    /// `#const NAME = value`
    ConditionalCompileConst { hash_const: Token, name: Token, value: NodeId },

    /// `#error message`
    ConditionalCompileError { token: Token },

    /// `#if cond ... #else ... #end if`
    ConditionalCompile {
        hash_if: Token,
        condition: NodeId,
        then_branch: NodeId,
        else_branch: Option<NodeId>,
    },

    /// `typecast m as Type`
    Typecast { typecast: Token, expression: NodeId, type_token: Token },

    /// `alias name = value`
    Alias { alias: Token, name: Token, value: NodeId },

    // ==================== Expressions ====================
    Literal { token: Token },

    Variable { name: Token },

    /// `-x`, `not x`
    Unary { operator: Token, right: NodeId },

    Binary { left: NodeId, operator: Token, right: NodeId },

    Grouping { expression: NodeId },

    /// `obj.name` or `obj?.name`
    DottedGet { obj: NodeId, dot: Token, name: Token },

    /// `obj[i]`, `obj?[i]`, `obj?.[i]`
    IndexedGet {
        obj: NodeId,
        question_dot: Option<Token>,
        open_square: Token,
        indexes: Vec<NodeId>,
        close_square: Option<Token>,
    },

    Call { callee: NodeId, args: Vec<NodeId> },

    /// `node@.method(args)`
    Callfunc { callee: NodeId, operator: Token, method_name: Token, args: Vec<NodeId> },

    /// `new Name(args)`; `call` is the constructor `Call`
    New { new_token: Token, call: NodeId },

    ArrayLiteral { elements: Vec<NodeId> },

    AALiteral { members: Vec<NodeId> },

    AAMember { key: Token, value: NodeId },

    /// Body and signature of any `sub`/`function`, named or anonymous
    FunctionExpression {
        function_type: Token,
        params: Vec<NodeId>,
        return_type: Option<Token>,
        body: NodeId,
    },

    FunctionParameter {
        name: Token,
        default_value: Option<NodeId>,
        type_token: Option<Token>,
    },
}

impl NodeKind {
    /// Direct children in source order
    pub fn children(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        match self {
            NodeKind::Body { statements } => out.extend(statements),
            NodeKind::Comment { .. } => {}
            NodeKind::Assignment { value, .. } => out.push(*value),
            NodeKind::DottedSet { obj, value, .. } => {
                out.push(*obj);
                out.push(*value);
            }
            NodeKind::IndexedSet { obj, indexes, value, .. } => {
                out.push(*obj);
                out.extend(indexes);
                out.push(*value);
            }
            NodeKind::Increment { value, .. } => out.push(*value),
            NodeKind::ExpressionStatement { expression } => out.push(*expression),
            NodeKind::Print { expressions, .. } => out.extend(expressions),
            NodeKind::If { condition, then_branch, else_branch, .. }
            | NodeKind::ConditionalCompile { condition, then_branch, else_branch, .. } => {
                out.push(*condition);
                out.push(*then_branch);
                out.extend(else_branch);
            }
            NodeKind::While { condition, body, .. } => {
                out.push(*condition);
                out.push(*body);
            }
            NodeKind::For { counter, final_value, step, body, .. } => {
                out.push(*counter);
                out.push(*final_value);
                out.extend(step);
                out.push(*body);
            }
            NodeKind::ForEach { target, body, .. } => {
                out.push(*target);
                out.push(*body);
            }
            NodeKind::ExitLoop { .. } | NodeKind::Continue { .. } => {}
            NodeKind::Return { value, .. } => out.extend(value),
            NodeKind::Dim { dimensions, .. } => out.extend(dimensions),
            NodeKind::Try { try_branch, catch, .. } => {
                out.push(*try_branch);
                out.extend(catch);
            }
            NodeKind::Catch { body, .. } => out.push(*body),
            NodeKind::Throw { expression, .. } => out.push(*expression),
            NodeKind::Stop { .. } | NodeKind::End { .. } => {}
            NodeKind::Function { func, .. } | NodeKind::Method { func, .. } => out.push(*func),
            NodeKind::Field { initial_value, .. } => out.extend(initial_value),
            NodeKind::Class { members, .. }
            | NodeKind::Interface { members, .. }
            | NodeKind::Enum { members, .. } => out.extend(members),
            NodeKind::Namespace { name_expression, body, .. } => {
                out.push(*name_expression);
                out.push(*body);
            }
            NodeKind::InterfaceField { .. } | NodeKind::InterfaceMethod { .. } => {}
            NodeKind::EnumMember { value, .. } => out.extend(value),
            NodeKind::Const { value, .. }
            | NodeKind::ConditionalCompileConst { value, .. }
            | NodeKind::Alias { value, .. } => out.push(*value),
            NodeKind::Library { .. }
            | NodeKind::Import { .. }
            | NodeKind::ConditionalCompileError { .. } => {}
            NodeKind::Typecast { expression, .. } => out.push(*expression),

            NodeKind::Literal { .. } | NodeKind::Variable { .. } => {}
            NodeKind::Unary { right, .. } => out.push(*right),
            NodeKind::Binary { left, right, .. } => {
                out.push(*left);
                out.push(*right);
            }
            NodeKind::Grouping { expression } => out.push(*expression),
            NodeKind::DottedGet { obj, .. } => out.push(*obj),
            NodeKind::IndexedGet { obj, indexes, .. } => {
                out.push(*obj);
                out.extend(indexes);
            }
            NodeKind::Call { callee, args } | NodeKind::Callfunc { callee, args, .. } => {
                out.push(*callee);
                out.extend(args);
            }
            NodeKind::New { call, .. } => out.push(*call),
            NodeKind::ArrayLiteral { elements } => out.extend(elements),
            NodeKind::AALiteral { members } => out.extend(members),
            NodeKind::AAMember { value, .. } => out.push(*value),
            NodeKind::FunctionExpression { params, body, .. } => {
                out.extend(params);
                out.push(*body);
            }
            NodeKind::FunctionParameter { default_value, .. } => out.extend(default_value),
        }
        out
    }

    /// Variant name, used by AST dumps
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Body { .. } => "Body",
            NodeKind::Comment { .. } => "Comment",
            NodeKind::Assignment { .. } => "Assignment",
            NodeKind::DottedSet { .. } => "DottedSet",
            NodeKind::IndexedSet { .. } => "IndexedSet",
            NodeKind::Increment { .. } => "Increment",
            NodeKind::ExpressionStatement { .. } => "ExpressionStatement",
            NodeKind::Print { .. } => "Print",
            NodeKind::If { .. } => "If",
            NodeKind::While { .. } => "While",
            NodeKind::For { .. } => "For",
            NodeKind::ForEach { .. } => "ForEach",
            NodeKind::ExitLoop { .. } => "ExitLoop",
            NodeKind::Continue { .. } => "Continue",
            NodeKind::Return { .. } => "Return",
            NodeKind::Dim { .. } => "Dim",
            NodeKind::Try { .. } => "Try",
            NodeKind::Catch { .. } => "Catch",
            NodeKind::Throw { .. } => "Throw",
            NodeKind::Stop { .. } => "Stop",
            NodeKind::End { .. } => "End",
            NodeKind::Function { .. } => "Function",
            NodeKind::Method { .. } => "Method",
            NodeKind::Field { .. } => "Field",
            NodeKind::Class { .. } => "Class",
            NodeKind::Namespace { .. } => "Namespace",
            NodeKind::Interface { .. } => "Interface",
            NodeKind::InterfaceField { .. } => "InterfaceField",
            NodeKind::InterfaceMethod { .. } => "InterfaceMethod",
            NodeKind::Enum { .. } => "Enum",
            NodeKind::EnumMember { .. } => "EnumMember",
            NodeKind::Const { .. } => "Const",
            NodeKind::Library { .. } => "Library",
            NodeKind::Import { .. } => "Import",
            NodeKind::ConditionalCompileConst { .. } => "ConditionalCompileConst",
            NodeKind::ConditionalCompileError { .. } => "ConditionalCompileError",
            NodeKind::ConditionalCompile { .. } => "ConditionalCompile",
            NodeKind::Typecast { .. } => "Typecast",
            NodeKind::Alias { .. } => "Alias",
            NodeKind::Literal { .. } => "Literal",
            NodeKind::Variable { .. } => "Variable",
            NodeKind::Unary { .. } => "Unary",
            NodeKind::Binary { .. } => "Binary",
            NodeKind::Grouping { .. } => "Grouping",
            NodeKind::DottedGet { .. } => "DottedGet",
            NodeKind::IndexedGet { .. } => "IndexedGet",
            NodeKind::Call { .. } => "Call",
            NodeKind::Callfunc { .. } => "Callfunc",
            NodeKind::New { .. } => "New",
            NodeKind::ArrayLiteral { .. } => "ArrayLiteral",
            NodeKind::AALiteral { .. } => "AALiteral",
            NodeKind::AAMember { .. } => "AAMember",
            NodeKind::FunctionExpression { .. } => "FunctionExpression",
            NodeKind::FunctionParameter { .. } => "FunctionParameter",
        }
    }

    /// Identifier-ish text shown next to the kind in AST dumps
    pub fn label(&self) -> Option<&str> {
        match self {
            NodeKind::Assignment { name, .. }
            | NodeKind::DottedSet { name, .. }
            | NodeKind::Function { name, .. }
            | NodeKind::Method { name, .. }
            | NodeKind::Field { name, .. }
            | NodeKind::Class { name, .. }
            | NodeKind::Interface { name, .. }
            | NodeKind::InterfaceField { name, .. }
            | NodeKind::InterfaceMethod { name, .. }
            | NodeKind::Enum { name, .. }
            | NodeKind::EnumMember { name, .. }
            | NodeKind::Const { name, .. }
            | NodeKind::ConditionalCompileConst { name, .. }
            | NodeKind::Alias { name, .. }
            | NodeKind::Variable { name }
            | NodeKind::DottedGet { name, .. }
            | NodeKind::FunctionParameter { name, .. } => Some(&name.text),
            NodeKind::ForEach { item, .. } => Some(&item.text),
            NodeKind::Callfunc { method_name, .. } => Some(&method_name.text),
            NodeKind::Literal { token } => Some(&token.text),
            NodeKind::Unary { operator, .. } | NodeKind::Binary { operator, .. } => Some(&operator.text),
            NodeKind::Dim { identifier, .. } => identifier.as_ref().map(|t| t.text.as_str()),
            NodeKind::Catch { exception_variable, .. } => {
                exception_variable.as_ref().map(|t| t.text.as_str())
            }
            NodeKind::Library { file_path, .. } | NodeKind::Import { file_path, .. } => {
                file_path.as_ref().map(|t| t.text.as_str())
            }
            _ => None,
        }
    }

    pub fn is_loop(&self) -> bool {
        matches!(self, NodeKind::While { .. } | NodeKind::For { .. } | NodeKind::ForEach { .. })
    }

    /// Declarations that may only appear at the root or inside a namespace
    pub fn is_declaration(&self) -> bool {
        matches!(
            self,
            NodeKind::Function { .. }
                | NodeKind::Class { .. }
                | NodeKind::Enum { .. }
                | NodeKind::Interface { .. }
                | NodeKind::Namespace { .. }
                | NodeKind::Const { .. }
        )
    }

    pub fn is_directive(&self) -> bool {
        matches!(self, NodeKind::Library { .. } | NodeKind::Import { .. })
    }
}
