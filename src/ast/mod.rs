use std::ops::Range;

/// A node paired with its byte range in the template document.
pub type Spanned<T> = (T, Range<usize>);

/// A parsed fragment: statements run in order, the last one gives the value.
pub type Block = Vec<Spanned<Expr>>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),

    Variable(String),

    Array {
        elements: Vec<Spanned<Expr>>,
    },

    Object {
        entries: Vec<(String, Spanned<Expr>)>,
    },

    Index {
        array: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },

    Field {
        object: Box<Spanned<Expr>>,
        field_name: String,
    },

    Call {
        function: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },

    Lambda {
        args: Vec<String>,
        expression: Box<Spanned<Expr>>,
    },

    BinOp {
        operator: BinOp,
        l_value: Box<Spanned<Expr>>,
        r_value: Box<Spanned<Expr>>,
    },

    UnOp {
        unop: UnOp,
        expression: Box<Spanned<Expr>>,
    },

    Assign {
        l_value: Box<Spanned<Expr>>,
        r_value: Box<Spanned<Expr>>,
        assign_op: AssignOp,
    },

    Let {
        var: String,
        value: Box<Spanned<Expr>>,
    },

    Do {
        expressions: Block,
    },

    IfElse {
        condition: Box<Spanned<Expr>>,
        if_branch: Box<Spanned<Expr>>,
        else_branch: Option<Box<Spanned<Expr>>>,
    },

    While {
        condition: Box<Spanned<Expr>>,
        body: Box<Spanned<Expr>>,
    },

    For {
        var: String,
        iterable: Box<Spanned<Expr>>,
        body: Box<Spanned<Expr>>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Power,

    Eq,
    NotEq,
    Less,
    Greater,
    LessEq,
    GreaterEq,

    And,
    Or,
}

impl BinOp {
    /// Binding power and right-associativity.
    pub fn precedence(self) -> (u8, bool) {
        match self {
            BinOp::Or => (1, false),
            BinOp::And => (2, false),
            BinOp::Eq | BinOp::NotEq => (3, false),
            BinOp::Less | BinOp::Greater | BinOp::LessEq | BinOp::GreaterEq => (4, false),
            BinOp::Add | BinOp::Sub => (5, false),
            BinOp::Mul | BinOp::Div | BinOp::Mod => (6, false),
            BinOp::Power => (7, true),
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            BinOp::Add => "+",
            BinOp::Sub => "-",
            BinOp::Mul => "*",
            BinOp::Div => "/",
            BinOp::Mod => "%",
            BinOp::Power => "**",
            BinOp::Eq => "==",
            BinOp::NotEq => "!=",
            BinOp::Less => "<",
            BinOp::Greater => ">",
            BinOp::LessEq => "<=",
            BinOp::GreaterEq => ">=",
            BinOp::And => "and",
            BinOp::Or => "or",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnOp {
    Plus,
    Minus,
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
}

impl AssignOp {
    /// The arithmetic a compound assignment applies before storing.
    pub fn operator(self) -> Option<BinOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::AddAssign => Some(BinOp::Add),
            AssignOp::SubAssign => Some(BinOp::Sub),
            AssignOp::MulAssign => Some(BinOp::Mul),
            AssignOp::DivAssign => Some(BinOp::Div),
            AssignOp::ModAssign => Some(BinOp::Mod),
        }
    }
}
