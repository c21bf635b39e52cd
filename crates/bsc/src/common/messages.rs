//! Catalogue of validation diagnostics
//!
//! Every rule in the semantic validator reports through one of these
//! constructors so that codes and wording stay in one place.

use super::DiagnosticTemplate;

/// Stable diagnostic codes
pub mod codes {
    pub const CALLFUNC_HAS_TOO_MANY_ARGUMENTS: u32 = 1100;
    pub const KEYWORD_MUST_BE_DECLARED_AT_NAMESPACE_LEVEL: u32 = 1101;
    pub const DUPLICATE_IDENTIFIER: u32 = 1102;
    pub const ENUM_VALUE_MUST_BE_TYPE: u32 = 1103;
    pub const ENUM_VALUE_IS_REQUIRED: u32 = 1104;
    pub const EXPECTED_TOKEN: u32 = 1105;
    pub const ILLEGAL_CONTINUE_STATEMENT: u32 = 1106;
    pub const VOID_FUNCTION_MAY_NOT_RETURN_VALUE: u32 = 1107;
    pub const NON_VOID_FUNCTION_MUST_RETURN_VALUE: u32 = 1108;
    pub const NO_OPTIONAL_CHAINING_IN_LEFT_HAND_SIDE_OF_ASSIGNMENT: u32 = 1109;
    pub const UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION: u32 = 1110;
    pub const LIBRARY_STATEMENT_MUST_BE_DECLARED_AT_TOP_OF_FILE: u32 = 1111;
    pub const IMPORT_STATEMENT_MUST_BE_DECLARED_AT_TOP_OF_FILE: u32 = 1112;
    pub const TOO_MANY_CALLABLE_PARAMETERS: u32 = 1113;
}

pub fn callfunc_has_too_many_arguments(count: usize) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::CALLFUNC_HAS_TOO_MANY_ARGUMENTS,
        format!("too many callfunc arguments: all callfunc expressions must have 5 or fewer arguments, found {count}"),
    )
}

pub fn keyword_must_be_declared_at_namespace_level(keyword: &str) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::KEYWORD_MUST_BE_DECLARED_AT_NAMESPACE_LEVEL,
        format!("'{keyword}' must be declared at namespace level or at the root of the file"),
    )
}

pub fn duplicate_identifier(name: &str) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::DUPLICATE_IDENTIFIER,
        format!("duplicate identifier '{name}'"),
    )
}

pub fn enum_value_must_be_type(kind: &str) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::ENUM_VALUE_MUST_BE_TYPE,
        format!("enum value must be type '{kind}'"),
    )
}

pub fn enum_value_is_required(kind: &str) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::ENUM_VALUE_IS_REQUIRED,
        format!("enum value is required for '{kind}' enums"),
    )
}

pub fn expected_token(kind: &str) -> DiagnosticTemplate {
    DiagnosticTemplate::error(codes::EXPECTED_TOKEN, format!("expected token '{kind}'"))
}

pub fn illegal_continue_statement() -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::ILLEGAL_CONTINUE_STATEMENT,
        "illegal continue statement: continue must be inside a loop",
    )
}

pub fn void_function_may_not_return_value(function_type: &str) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::VOID_FUNCTION_MAY_NOT_RETURN_VALUE,
        format!("void {function_type} may not return a value"),
    )
}

pub fn non_void_function_must_return_value(function_type: &str) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::NON_VOID_FUNCTION_MUST_RETURN_VALUE,
        format!("non-void {function_type} must return a value"),
    )
}

pub fn no_optional_chaining_in_left_hand_side_of_assignment() -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::NO_OPTIONAL_CHAINING_IN_LEFT_HAND_SIDE_OF_ASSIGNMENT,
        "no optional chaining in left-hand side of assignment",
    )
}

pub fn unexpected_statement_outside_function() -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::UNEXPECTED_STATEMENT_OUTSIDE_FUNCTION,
        "unexpected statement outside function",
    )
}

pub fn library_statement_must_be_declared_at_top_of_file() -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::LIBRARY_STATEMENT_MUST_BE_DECLARED_AT_TOP_OF_FILE,
        "library statement must be declared at top of file",
    )
}

pub fn import_statement_must_be_declared_at_top_of_file() -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::IMPORT_STATEMENT_MUST_BE_DECLARED_AT_TOP_OF_FILE,
        "import statement must be declared at top of file",
    )
}

pub fn too_many_callable_parameters(actual: usize, max: usize) -> DiagnosticTemplate {
    DiagnosticTemplate::error(
        codes::TOO_MANY_CALLABLE_PARAMETERS,
        format!("too many callable parameters: found {actual}, maximum is {max}"),
    )
}
