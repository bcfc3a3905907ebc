use jsdelta_ast::{
    operators::{UNKNOWN_UNARY_OPERATOR, assignment_symbol, infix_form, unary_form},
    token::Token,
};

#[test]
fn test_infix_table_is_total() {
    for token in Token::ALL {
        let form = infix_form(*token);
        assert!(!form.node_type.is_empty());
        let expect_symbol = token.is_infix_operator() && *token != Token::Comma;
        assert_eq!(form.operator.is_some(), expect_symbol, "{token}");
        assert_eq!(form.is_fallback, !expect_symbol, "{token}");
    }
}

#[test]
fn test_unary_table_is_total() {
    for token in Token::ALL {
        let form = unary_form(*token);
        let expect_symbol = token.is_unary_operator() && *token != Token::DefaultNamespace;
        assert_eq!(form.is_fallback, !expect_symbol, "{token}");
        if form.is_fallback {
            assert_eq!(form.operator, UNKNOWN_UNARY_OPERATOR);
            assert!(form.prefix);
        }
    }
}

#[test]
fn test_assignment_tokens_render_as_assignments() {
    for token in Token::ALL.iter().filter(|token| token.is_assignment_operator()) {
        let form = infix_form(*token);
        assert_eq!(form.node_type, "AssignmentExpression");
        assert_eq!(form.operator, assignment_symbol(*token));
        assert!(form.operator.is_some_and(|symbol| symbol.ends_with('=')));
    }
}

#[test]
fn test_update_operators_never_report_prefix() {
    assert_eq!(unary_form(Token::Inc).node_type, "UpdateExpression");
    assert!(!unary_form(Token::Inc).prefix);
    assert!(!unary_form(Token::Dec).prefix);
    assert!(unary_form(Token::Not).prefix);
    assert_eq!(unary_form(Token::TypeofName).operator, "typeof");
    assert_eq!(unary_form(Token::DelProp).operator, "delete");
}

#[test]
fn test_logical_operators() {
    assert_eq!(infix_form(Token::And).node_type, "LogicalExpression");
    assert_eq!(infix_form(Token::Or).operator, Some("||"));
    assert_eq!(infix_form(Token::InstanceOf).operator, Some("instanceof"));
    assert_eq!(infix_form(Token::Shne).operator, Some("!=="));
}
