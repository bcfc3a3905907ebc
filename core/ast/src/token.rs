//! The grammar token vocabulary consumed by the node model.
//!
//! Tokens arrive from the external parser. The model only uses them to pick
//! operators, keyword literals and declaration kinds, so the enum covers
//! exactly those families.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! tokens {
    (
        $(
            $(#[$arm_attr:meta])*
            $arm:ident => $name:literal,
        )+
    ) => {
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum Token {
            $(
                $(#[$arm_attr])*
                $arm,
            )+
        }

        impl Token {
            pub const ALL: &'static [Token] = &[$(Token::$arm,)+];

            /// Upper-case token name, as the grammar spells it.
            #[must_use]
            pub fn name(self) -> &'static str {
                match self {
                    $(Token::$arm => $name,)+
                }
            }
        }
    };
}

tokens! {
    Assign => "ASSIGN",
    AssignAdd => "ASSIGN_ADD",
    AssignSub => "ASSIGN_SUB",
    AssignMul => "ASSIGN_MUL",
    AssignDiv => "ASSIGN_DIV",
    AssignMod => "ASSIGN_MOD",
    AssignLsh => "ASSIGN_LSH",
    AssignRsh => "ASSIGN_RSH",
    AssignUrsh => "ASSIGN_URSH",
    AssignBitAnd => "ASSIGN_BITAND",
    AssignBitXor => "ASSIGN_BITXOR",
    AssignBitOr => "ASSIGN_BITOR",

    Eq => "EQ",
    Ne => "NE",
    Sheq => "SHEQ",
    Shne => "SHNE",
    Gt => "GT",
    Ge => "GE",
    Lt => "LT",
    Le => "LE",
    In => "IN",
    InstanceOf => "INSTANCEOF",

    Add => "ADD",
    Sub => "SUB",
    Mul => "MUL",
    Div => "DIV",
    Mod => "MOD",

    BitAnd => "BITAND",
    BitOr => "BITOR",
    BitXor => "BITXOR",
    Lsh => "LSH",
    Rsh => "RSH",
    Ursh => "URSH",

    And => "AND",
    Or => "OR",
    /// Comma operator; a valid infix token without an external symbol.
    Comma => "COMMA",

    Pos => "POS",
    Neg => "NEG",
    Not => "NOT",
    BitNot => "BITNOT",
    Typeof => "TYPEOF",
    TypeofName => "TYPEOFNAME",
    DelProp => "DELPROP",
    Void => "VOID",
    Inc => "INC",
    Dec => "DEC",
    /// E4X `default xml namespace = expr`; a valid unary token without an
    /// external symbol.
    DefaultNamespace => "DEFAULTNAMESPACE",

    This => "THIS",
    Null => "NULL",
    True => "TRUE",
    False => "FALSE",
    Debugger => "DEBUGGER",

    Var => "VAR",
    Const => "CONST",
    Let => "LET",
}

impl Token {
    #[must_use]
    pub fn is_assignment_operator(self) -> bool {
        matches!(
            self,
            Token::Assign
                | Token::AssignAdd
                | Token::AssignSub
                | Token::AssignMul
                | Token::AssignDiv
                | Token::AssignMod
                | Token::AssignLsh
                | Token::AssignRsh
                | Token::AssignUrsh
                | Token::AssignBitAnd
                | Token::AssignBitXor
                | Token::AssignBitOr
        )
    }

    /// Tokens an infix expression may carry. Assignment operators are
    /// included because the parser builds assignments as infix nodes.
    #[must_use]
    pub fn is_infix_operator(self) -> bool {
        self.is_assignment_operator()
            || matches!(
                self,
                Token::Eq
                    | Token::Ne
                    | Token::Sheq
                    | Token::Shne
                    | Token::Gt
                    | Token::Ge
                    | Token::Lt
                    | Token::Le
                    | Token::In
                    | Token::InstanceOf
                    | Token::Add
                    | Token::Sub
                    | Token::Mul
                    | Token::Div
                    | Token::Mod
                    | Token::BitAnd
                    | Token::BitOr
                    | Token::BitXor
                    | Token::Lsh
                    | Token::Rsh
                    | Token::Ursh
                    | Token::And
                    | Token::Or
                    | Token::Comma
            )
    }

    #[must_use]
    pub fn is_unary_operator(self) -> bool {
        matches!(
            self,
            Token::Pos
                | Token::Neg
                | Token::Not
                | Token::BitNot
                | Token::Typeof
                | Token::TypeofName
                | Token::DelProp
                | Token::Void
                | Token::Inc
                | Token::Dec
                | Token::DefaultNamespace
        )
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
