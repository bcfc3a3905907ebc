//! Operator tables mapping grammar tokens to external node types and
//! operator symbols. Both tables are total over [`Token`]; tokens without
//! an external symbol fall back to a generic shape.

use crate::token::Token;

/// External rendering of an infix or assignment operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InfixForm {
    pub node_type: &'static str,
    /// `None` renders as JSON `null`.
    pub operator: Option<&'static str>,
    pub is_fallback: bool,
}

/// External rendering of a unary or update operator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnaryForm {
    pub node_type: &'static str,
    pub operator: &'static str,
    /// Value of the exported `prefix` field. Update operators always
    /// report `false`, whichever side of the operand they were written on.
    pub prefix: bool,
    pub is_fallback: bool,
}

pub const UNKNOWN_UNARY_OPERATOR: &str = "unk";

const fn assignment(symbol: &'static str) -> InfixForm {
    InfixForm {
        node_type: "AssignmentExpression",
        operator: Some(symbol),
        is_fallback: false,
    }
}

const fn binary(symbol: &'static str) -> InfixForm {
    InfixForm {
        node_type: "BinaryExpression",
        operator: Some(symbol),
        is_fallback: false,
    }
}

const fn logical(symbol: &'static str) -> InfixForm {
    InfixForm {
        node_type: "LogicalExpression",
        operator: Some(symbol),
        is_fallback: false,
    }
}

/// Symbol of an assignment operator token.
#[must_use]
pub fn assignment_symbol(token: Token) -> Option<&'static str> {
    let symbol = match token {
        Token::Assign => "=",
        Token::AssignAdd => "+=",
        Token::AssignSub => "-=",
        Token::AssignMul => "*=",
        Token::AssignDiv => "/=",
        Token::AssignMod => "%=",
        Token::AssignLsh => "<<=",
        Token::AssignRsh => ">>=",
        Token::AssignUrsh => ">>>=",
        Token::AssignBitAnd => "&=",
        Token::AssignBitXor => "^=",
        Token::AssignBitOr => "|=",
        _ => return None,
    };
    Some(symbol)
}

#[must_use]
pub fn infix_form(token: Token) -> InfixForm {
    if let Some(symbol) = assignment_symbol(token) {
        return assignment(symbol);
    }
    match token {
        Token::Eq => binary("=="),
        Token::Ne => binary("!="),
        Token::Sheq => binary("==="),
        Token::Shne => binary("!=="),
        Token::Gt => binary(">"),
        Token::Ge => binary(">="),
        Token::Lt => binary("<"),
        Token::Le => binary("<="),
        Token::In => binary("in"),
        Token::InstanceOf => binary("instanceof"),
        Token::Add => binary("+"),
        Token::Sub => binary("-"),
        Token::Mul => binary("*"),
        Token::Div => binary("/"),
        Token::Mod => binary("%"),
        Token::BitAnd => binary("&"),
        Token::BitOr => binary("|"),
        Token::BitXor => binary("^"),
        Token::Lsh => binary("<<"),
        Token::Rsh => binary(">>"),
        Token::Ursh => binary(">>>"),
        Token::And => logical("&&"),
        Token::Or => logical("||"),
        _ => InfixForm {
            node_type: "BinaryExpression",
            operator: None,
            is_fallback: true,
        },
    }
}

#[must_use]
pub fn unary_form(token: Token) -> UnaryForm {
    let (node_type, operator, prefix) = match token {
        Token::Inc => ("UpdateExpression", "++", false),
        Token::Dec => ("UpdateExpression", "--", false),
        Token::Pos => ("UnaryExpression", "+", true),
        Token::Neg => ("UnaryExpression", "-", true),
        Token::Not => ("UnaryExpression", "!", true),
        Token::BitNot => ("UnaryExpression", "~", true),
        Token::Typeof | Token::TypeofName => ("UnaryExpression", "typeof", true),
        Token::DelProp => ("UnaryExpression", "delete", true),
        Token::Void => ("UnaryExpression", "void", true),
        _ => {
            return UnaryForm {
                node_type: "UnaryExpression",
                operator: UNKNOWN_UNARY_OPERATOR,
                prefix: true,
                is_fallback: true,
            };
        }
    };
    UnaryForm {
        node_type,
        operator,
        prefix,
        is_fallback: false,
    }
}
