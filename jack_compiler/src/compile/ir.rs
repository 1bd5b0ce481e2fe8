use smol_str::SmolStr;
use std::fmt;

/// Intermediate representation.
///
/// One instruction of the stack machine. The `Display`
/// implementation is the exact textual form consumed by
/// the VM translator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IR {
    /// `push segment index`
    Push(Segment, u16),
    /// `pop segment index`
    Pop(Segment, u16),
    /// Arithmetic and logic on the top of the stack.
    Op(ArithOp),
    /// `label name`
    Label(Label),
    /// `goto name`
    Goto(Label),
    /// `if-goto name`
    IfGoto(Label),
    /// `function Class.name nLocals`
    Function(SmolStr, u16),
    /// `call Class.name nArgs`
    Call(SmolStr, u16),
    /// `return`
    Return,
}

impl IR {
    #[inline]
    pub fn push_const(value: u16) -> Self {
        IR::Push(Segment::Constant, value)
    }

    #[inline]
    pub fn call(name: impl Into<SmolStr>, args: u16) -> Self {
        IR::Call(name.into(), args)
    }
}

/// Outputs instruction as VM code.
impl fmt::Display for IR {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            IR::Push(segment, index) => write!(f, "push {segment} {index}"),
            IR::Pop(segment, index)  => write!(f, "pop {segment} {index}"),
            IR::Op(op)               => write!(f, "{op}"),
            IR::Label(label)         => write!(f, "label {label}"),
            IR::Goto(label)          => write!(f, "goto {label}"),
            IR::IfGoto(label)        => write!(f, "if-goto {label}"),
            IR::Function(name, n)    => write!(f, "function {name} {n}"),
            IR::Call(name, n)        => write!(f, "call {name} {n}"),
            IR::Return               => write!(f, "return"),
        }
    }
}

/// Virtual memory segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment {
    Constant,
    Static,
    This,
    Argument,
    Local,
    Pointer,
    Temp,
    That,
}

impl fmt::Display for Segment {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Segment::Constant => write!(f, "constant"),
            Segment::Static   => write!(f, "static"),
            Segment::This     => write!(f, "this"),
            Segment::Argument => write!(f, "argument"),
            Segment::Local    => write!(f, "local"),
            Segment::Pointer  => write!(f, "pointer"),
            Segment::Temp     => write!(f, "temp"),
            Segment::That     => write!(f, "that"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithOp {
    Add,
    Sub,
    Neg,
    Eq,
    Gt,
    Lt,
    And,
    Or,
    Not,
}

impl fmt::Display for ArithOp {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ArithOp::Add => write!(f, "add"),
            ArithOp::Sub => write!(f, "sub"),
            ArithOp::Neg => write!(f, "neg"),
            ArithOp::Eq  => write!(f, "eq"),
            ArithOp::Gt  => write!(f, "gt"),
            ArithOp::Lt  => write!(f, "lt"),
            ArithOp::And => write!(f, "and"),
            ArithOp::Or  => write!(f, "or"),
            ArithOp::Not => write!(f, "not"),
        }
    }
}

/// Control flow label, numbered by the unit's label counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Label {
    /// Loop entry, where a `while` condition is evaluated.
    Expression(u32),
    /// Start of the branch taken when a condition holds.
    True(u32),
    /// Loop exit.
    False(u32),
    /// Join point after an `if`.
    End(u32),
}

impl fmt::Display for Label {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Label::Expression(n) => write!(f, "expression.{n}"),
            Label::True(n)       => write!(f, "true.{n}"),
            Label::False(n)      => write!(f, "false.{n}"),
            Label::End(n)        => write!(f, "end.{n}"),
        }
    }
}
