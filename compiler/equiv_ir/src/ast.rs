//! Flat, arena-allocated syntax tree.
//!
//! Nodes refer to each other through `ExprId` / `StmtId` / `FunctionId`
//! indices into an [`Arena`] rather than through `Box`, so a whole source unit
//! lives in three contiguous vectors and is dropped in one go.

use crate::{BinaryOp, BoolOp, CmpOp, Name, Span, UnaryOp};

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub const fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id!(
    /// Index of an expression in its [`Arena`].
    ExprId
);
define_id!(
    /// Index of a statement in its [`Arena`].
    StmtId
);
define_id!(
    /// Index of a function definition (`def` or `lambda`) in its [`Arena`].
    FunctionId
);

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Int(i64),
    Float(f64),
    Str(Name),
    Bool(bool),
    None,
    Ident(Name),

    List(Vec<ExprId>),
    Tuple(Vec<ExprId>),
    Set(Vec<ExprId>),
    Dict(Vec<(ExprId, ExprId)>),

    Binary {
        op: BinaryOp,
        left: ExprId,
        right: ExprId,
    },
    Unary {
        op: UnaryOp,
        operand: ExprId,
    },
    BoolOp {
        op: BoolOp,
        left: ExprId,
        right: ExprId,
    },
    /// `left op0 e0 op1 e1 ...`, evaluated pairwise with short-circuit.
    Compare {
        left: ExprId,
        rest: Vec<(CmpOp, ExprId)>,
    },

    Call {
        func: ExprId,
        args: Vec<CallArg>,
    },
    /// `object.attr`. Only meaningful as the callee of a method call.
    Attribute {
        object: ExprId,
        attr: Name,
    },
    Subscript {
        object: ExprId,
        index: ExprId,
    },
    /// `lower:upper:step`, only valid as a subscript index.
    Slice {
        lower: Option<ExprId>,
        upper: Option<ExprId>,
        step: Option<ExprId>,
    },
    IfExp {
        cond: ExprId,
        then_branch: ExprId,
        else_branch: ExprId,
    },
    Lambda(FunctionId),
    Comprehension(Box<Comprehension>),
}

/// Call argument.
#[derive(Clone, Debug, PartialEq)]
pub enum CallArg {
    Positional(ExprId),
    Keyword(Name, ExprId),
    /// `*iterable`, spread positionally.
    Star(ExprId),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComprehensionKind {
    List,
    Set,
    Dict,
    /// Generator expressions are evaluated eagerly into a list.
    Generator,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub kind: ComprehensionKind,
    /// Element expression; the key for dict comprehensions.
    pub element: ExprId,
    /// Value expression for dict comprehensions.
    pub value: Option<ExprId>,
    pub generators: Vec<Generator>,
}

/// One `for target in iter if cond...` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct Generator {
    pub target: Target,
    pub iter: ExprId,
    pub conditions: Vec<ExprId>,
}

/// Assignment, `for` and `del` target.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Name(Name, Span),
    Tuple(Vec<Target>, Span),
    Subscript {
        object: ExprId,
        index: ExprId,
        span: Span,
    },
}

impl Target {
    pub fn span(&self) -> Span {
        match self {
            Target::Name(_, span) | Target::Tuple(_, span) | Target::Subscript { span, .. } => {
                *span
            }
        }
    }
}

/// Statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    FunctionDef(FunctionId),
    Return(Option<ExprId>),
    Expr(ExprId),
    /// `t0 = t1 = ... = value`
    Assign {
        targets: Vec<Target>,
        value: ExprId,
    },
    AugAssign {
        target: Target,
        op: BinaryOp,
        value: ExprId,
    },
    If {
        cond: ExprId,
        body: Vec<StmtId>,
        orelse: Vec<StmtId>,
    },
    While {
        cond: ExprId,
        body: Vec<StmtId>,
    },
    For {
        target: Target,
        iter: ExprId,
        body: Vec<StmtId>,
    },
    Break,
    Continue,
    Pass,
    Assert {
        cond: ExprId,
        message: Option<ExprId>,
    },
    Raise(Option<ExprId>),
    Delete(Vec<Target>),
    /// `import m` / `from m import ...`. Kept so execution can refuse it.
    Import {
        module: Name,
    },
}

/// Function parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub name: Name,
    pub default: Option<ExprId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FunctionBody {
    Block(Vec<StmtId>),
    /// Lambda body.
    Expr(ExprId),
}

/// `def` or `lambda`.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    /// `<lambda>` for lambdas.
    pub name: Name,
    pub params: Vec<Param>,
    pub body: FunctionBody,
    pub span: Span,
}

/// Node storage for one source unit.
#[derive(Clone, Debug, Default)]
pub struct Arena {
    exprs: Vec<Expr>,
    stmts: Vec<Stmt>,
    functions: Vec<FunctionDef>,
}

fn next_id(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alloc_expr(&mut self, expr: Expr) -> ExprId {
        let id = ExprId(next_id(self.exprs.len()));
        self.exprs.push(expr);
        id
    }

    pub fn alloc_stmt(&mut self, stmt: Stmt) -> StmtId {
        let id = StmtId(next_id(self.stmts.len()));
        self.stmts.push(stmt);
        id
    }

    pub fn alloc_function(&mut self, function: FunctionDef) -> FunctionId {
        let id = FunctionId(next_id(self.functions.len()));
        self.functions.push(function);
        id
    }

    /// # Panics
    /// Panics if `id` came from a different arena.
    #[inline]
    pub fn expr(&self, id: ExprId) -> &Expr {
        &self.exprs[id.index()]
    }

    /// # Panics
    /// Panics if `id` came from a different arena.
    pub fn set_expr_span(&mut self, id: ExprId, span: Span) {
        self.exprs[id.index()].span = span;
    }

    /// # Panics
    /// Panics if `id` came from a different arena.
    #[inline]
    pub fn stmt(&self, id: StmtId) -> &Stmt {
        &self.stmts[id.index()]
    }

    /// # Panics
    /// Panics if `id` came from a different arena.
    #[inline]
    pub fn function(&self, id: FunctionId) -> &FunctionDef {
        &self.functions[id.index()]
    }

    pub fn expr_count(&self) -> usize {
        self.exprs.len()
    }

    pub fn stmt_count(&self) -> usize {
        self.stmts.len()
    }
}

/// A parsed source unit: its arena and top-level statements in order.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub arena: Arena,
    pub body: Vec<StmtId>,
}
