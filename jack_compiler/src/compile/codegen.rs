use super::{
    ir::{ArithOp, Label, Segment, IR},
    symbol::{SymbolError, SymbolKind, SymbolTable},
    CompileError,
};
use crate::{
    parsing::{
        BinOp, Block, Class, ClassVarDec, ClassVarKind, CompilationUnit, DoStmt, Expression, Ident, IfStmt,
        IndexExpr, KeywordValue, LetStmt, ReturnStmt, Statements, Stmt, SubroutineCall, SubroutineDec,
        SubroutineKind, Term, UnaryKind, WhileStmt,
    },
    tokens::Span,
};
use log::{debug, trace};
use smol_str::SmolStr;
use std::convert::TryFrom;

/// Code generator.
///
/// One generator compiles one class. The scope table and the
/// label counter are its own state, so separate units never
/// share anything.
pub struct CodeGen {
    /// Resulting generated code.
    code: Vec<IR>,
    /// Class and subroutine level symbols.
    symbols: SymbolTable,
    /// Next free label number. Counts over the whole
    /// unit so labels never repeat between subroutines.
    labels: u32,
    /// Kind of the subroutine currently being generated.
    subroutine: Option<SubroutineKind>,
}

impl CodeGen {
    #[inline]
    pub fn new() -> Self {
        Self {
            code: vec![],
            symbols: Default::default(),
            labels: 0,
            subroutine: None,
        }
    }

    pub fn compile(&mut self, unit: &CompilationUnit) -> Result<Vec<IR>, CompileError> {
        self.emit_class(&unit.class)?;
        Ok(std::mem::take(&mut self.code))
    }

    /// Clear the internal state so the code generator can be reused.
    pub fn reset(&mut self) {
        self.code.clear();
        self.symbols.reset();
        self.labels = 0;
        self.subroutine = None;
    }

    /// Symbols left over from the last compiled class.
    ///
    /// Only the class level and the final subroutine's
    /// symbols remain.
    #[inline]
    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    #[inline]
    fn emit(&mut self, ir: IR) {
        self.code.push(ir)
    }

    fn next_label(&mut self) -> u32 {
        let label = self.labels;
        self.labels += 1;
        label
    }

    fn define(&mut self, name: &Ident, ty: &str, kind: SymbolKind) -> Result<(), CompileError> {
        match self.symbols.define(name.as_str(), ty, kind) {
            Ok(_) => Ok(()),
            Err(SymbolError::Duplicate { existing, .. }) => Err(CompileError::DuplicateDefinition {
                name: name.name.clone(),
                existing,
                span: name.token.span.clone(),
            }),
            Err(err @ SymbolError::Overflow { .. }) => Err(CompileError::UnsupportedConstruct {
                msg: err.to_string(),
                span: name.token.span.clone(),
            }),
        }
    }

    fn qualified_name(class_name: &str, name: &str) -> SmolStr {
        SmolStr::from(format!("{class_name}.{name}"))
    }

    /// Push the receiver of a call on the current object.
    fn emit_this(&mut self) {
        match self.subroutine {
            Some(SubroutineKind::Method) => self.emit(IR::Push(Segment::Argument, 0)),
            _ => self.emit(IR::Push(Segment::Pointer, 0)),
        }
    }

    /// Push the value of a named variable.
    fn emit_var(&mut self, name: &Ident) -> Result<(), CompileError> {
        let symbol = self
            .symbols
            .lookup(name.as_str())
            .ok_or_else(|| CompileError::undefined(name))?;
        let ir = IR::Push(symbol.kind.segment(), symbol.index);
        self.emit(ir);
        Ok(())
    }
}

impl Default for CodeGen {
    fn default() -> Self {
        Self::new()
    }
}

/// Recursive visitor
impl CodeGen {
    fn emit_class(&mut self, class: &Class) -> Result<(), CompileError> {
        debug!("generating class {}", class.name.as_str());

        self.symbols.set_class_name(class.name.name.clone());

        for var in &class.vars {
            self.handle_class_var(var)?;
        }

        for subroutine in &class.subroutines {
            self.emit_subroutine(subroutine)?;
        }

        Ok(())
    }

    /// Load static and field declarations into the symbol table.
    ///
    /// Nothing is emitted. Fields are only counted so
    /// constructors know how much memory to allocate.
    fn handle_class_var(&mut self, var: &ClassVarDec) -> Result<(), CompileError> {
        let kind = match var.kind {
            ClassVarKind::Static => SymbolKind::Static,
            ClassVarKind::Field => SymbolKind::Field,
        };

        for name in var.names.iter() {
            self.define(name, var.ty.name(), kind)?;
        }

        Ok(())
    }

    fn emit_subroutine(&mut self, subroutine: &SubroutineDec) -> Result<(), CompileError> {
        let class_name = SmolStr::from(self.symbols.class_name());
        let function_name = Self::qualified_name(&class_name, subroutine.name.as_str());
        trace!("generating subroutine {function_name}");

        self.symbols.start_subroutine();
        self.subroutine = Some(subroutine.kind);

        // Methods receive the object as their hidden first argument.
        if subroutine.kind == SubroutineKind::Method {
            self.symbols
                .define("this", class_name, SymbolKind::Argument)
                .map_err(|err| CompileError::UnsupportedConstruct {
                    msg: err.to_string(),
                    span: subroutine.name.token.span.clone(),
                })?;
        }

        for param in subroutine.params.params.iter() {
            self.define(&param.name, param.ty.name(), SymbolKind::Argument)?;
        }

        for var in &subroutine.body.vars {
            for name in var.names.iter() {
                self.define(name, var.ty.name(), SymbolKind::Local)?;
            }
        }

        let locals = self.symbols.count_of(SymbolKind::Local);
        self.emit(IR::Function(function_name, locals));

        match subroutine.kind {
            SubroutineKind::Constructor => {
                let fields = self.symbols.count_of(SymbolKind::Field);
                self.emit(IR::push_const(fields));
                self.emit(IR::call("Memory.alloc", 1));
                self.emit(IR::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Method => {
                self.emit(IR::Push(Segment::Argument, 0));
                self.emit(IR::Pop(Segment::Pointer, 0));
            }
            SubroutineKind::Function => {}
        }

        self.emit_statements(&subroutine.body.statements)?;

        self.subroutine = None;
        Ok(())
    }

    fn emit_statements(&mut self, statements: &Statements) -> Result<(), CompileError> {
        for stmt in &statements.stmts {
            self.emit_stmt(stmt)?;
        }
        Ok(())
    }

    #[inline]
    fn emit_block(&mut self, block: &Block) -> Result<(), CompileError> {
        self.emit_statements(&block.statements)
    }

    #[inline]
    fn emit_stmt(&mut self, stmt: &Stmt) -> Result<(), CompileError> {
        match stmt {
            Stmt::Let(stmt) => self.emit_let(stmt),
            Stmt::If(stmt) => self.emit_if(stmt),
            Stmt::While(stmt) => self.emit_while(stmt),
            Stmt::Do(stmt) => self.emit_do(stmt),
            Stmt::Return(stmt) => self.emit_return(stmt),
        }
    }

    fn emit_let(&mut self, stmt: &LetStmt) -> Result<(), CompileError> {
        let symbol = self
            .symbols
            .lookup(stmt.name.as_str())
            .ok_or_else(|| CompileError::undefined(&stmt.name))?;
        let (segment, index) = (symbol.kind.segment(), symbol.index);

        match &stmt.index {
            None => {
                self.emit_expr(&stmt.rhs)?;
                self.emit(IR::Pop(segment, index));
            }
            Some(element) => {
                // Target address is parked in temp while the
                // right hand side may itself use `that`.
                self.emit(IR::Push(segment, index));
                self.emit_expr(&element.expr)?;
                self.emit(IR::Op(ArithOp::Add));
                self.emit(IR::Pop(Segment::Temp, 0));
                self.emit_expr(&stmt.rhs)?;
                self.emit(IR::Push(Segment::Temp, 0));
                self.emit(IR::Pop(Segment::Pointer, 1));
                self.emit(IR::Pop(Segment::That, 0));
            }
        }

        Ok(())
    }

    fn emit_if(&mut self, stmt: &IfStmt) -> Result<(), CompileError> {
        let n = self.next_label();

        self.emit_expr(&stmt.cond)?;
        self.emit(IR::IfGoto(Label::True(n)));
        if let Some(else_branch) = &stmt.else_branch {
            self.emit_block(&else_branch.block)?;
        }
        self.emit(IR::Goto(Label::End(n)));
        self.emit(IR::Label(Label::True(n)));
        self.emit_block(&stmt.then_block)?;
        self.emit(IR::Label(Label::End(n)));

        Ok(())
    }

    fn emit_while(&mut self, stmt: &WhileStmt) -> Result<(), CompileError> {
        let n = self.next_label();

        self.emit(IR::Label(Label::Expression(n)));
        self.emit_expr(&stmt.cond)?;
        self.emit(IR::IfGoto(Label::True(n)));
        self.emit(IR::Goto(Label::False(n)));
        self.emit(IR::Label(Label::True(n)));
        self.emit_block(&stmt.body)?;
        self.emit(IR::Goto(Label::Expression(n)));
        self.emit(IR::Label(Label::False(n)));

        Ok(())
    }

    fn emit_do(&mut self, stmt: &DoStmt) -> Result<(), CompileError> {
        self.emit_call(&stmt.call)?;
        // Discard the return value.
        self.emit(IR::Pop(Segment::Temp, 0));
        Ok(())
    }

    fn emit_return(&mut self, stmt: &ReturnStmt) -> Result<(), CompileError> {
        match &stmt.value {
            Some(expr) => self.emit_expr(expr)?,
            None => self.emit(IR::push_const(0)),
        }
        self.emit(IR::Return);
        Ok(())
    }

    fn emit_expr(&mut self, expr: &Expression) -> Result<(), CompileError> {
        self.emit_term(&expr.head)?;

        for (op, term) in &expr.tail {
            self.emit_term(term)?;
            self.emit_binop(op.kind);
        }

        Ok(())
    }

    #[rustfmt::skip]
    fn emit_binop(&mut self, op: BinOp) {
        let ir = match op {
            BinOp::Add => IR::Op(ArithOp::Add),
            BinOp::Sub => IR::Op(ArithOp::Sub),
            BinOp::Mul => IR::call("Math.multiply", 2),
            BinOp::Div => IR::call("Math.divide", 2),
            BinOp::And => IR::Op(ArithOp::And),
            BinOp::Or  => IR::Op(ArithOp::Or),
            BinOp::Lt  => IR::Op(ArithOp::Lt),
            BinOp::Gt  => IR::Op(ArithOp::Gt),
            BinOp::Eq  => IR::Op(ArithOp::Eq),
        };
        self.emit(ir);
    }

    fn emit_term(&mut self, term: &Term) -> Result<(), CompileError> {
        match term {
            Term::Integer(int) => self.emit(IR::push_const(int.value)),
            Term::String(string) => self.emit_string(&string.value, &string.token.span)?,
            Term::Keyword(keyword) => match keyword.value {
                KeywordValue::True => {
                    self.emit(IR::push_const(1));
                    self.emit(IR::Op(ArithOp::Neg));
                }
                KeywordValue::False | KeywordValue::Null => self.emit(IR::push_const(0)),
                KeywordValue::This => self.emit_this(),
            },
            Term::Paren(paren) => self.emit_expr(&paren.expr)?,
            Term::Unary(unary) => {
                self.emit_term(&unary.term)?;
                match unary.op.kind {
                    UnaryKind::Neg => self.emit(IR::Op(ArithOp::Neg)),
                    UnaryKind::Not => self.emit(IR::Op(ArithOp::Not)),
                }
            }
            Term::Var(name) => self.emit_var(name)?,
            Term::Index(index) => self.emit_index(index)?,
            Term::Call(call) => self.emit_call(call)?,
        }

        Ok(())
    }

    /// Build a string object one character at a time.
    fn emit_string(&mut self, value: &str, span: &Span) -> Result<(), CompileError> {
        let unsupported = |msg: &str| CompileError::UnsupportedConstruct {
            msg: msg.to_string(),
            span: span.clone(),
        };

        let len = u16::try_from(value.chars().count()).map_err(|_| unsupported("string constant is too long"))?;
        self.emit(IR::push_const(len));
        self.emit(IR::call("String.new", 1));

        for c in value.chars() {
            let code = u16::try_from(u32::from(c)).map_err(|_| unsupported("character does not fit in a word"))?;
            self.emit(IR::push_const(code));
            self.emit(IR::call("String.appendChar", 2));
        }

        Ok(())
    }

    fn emit_index(&mut self, index: &IndexExpr) -> Result<(), CompileError> {
        self.emit_var(&index.name)?;
        self.emit_expr(&index.index.expr)?;
        self.emit(IR::Op(ArithOp::Add));
        self.emit(IR::Pop(Segment::Pointer, 1));
        self.emit(IR::Push(Segment::That, 0));
        Ok(())
    }

    /// Calls come in three shapes:
    ///
    /// - `name(args)` is a method on the current object.
    /// - `var.name(args)` is a method on the object held by `var`,
    ///   dispatched on the variable's declared type.
    /// - `Class.name(args)` is a function or constructor, with no
    ///   hidden receiver argument.
    fn emit_call(&mut self, call: &SubroutineCall) -> Result<(), CompileError> {
        let (qualifier, receiver_args) = match &call.receiver {
            None => {
                self.emit_this();
                (SmolStr::from(self.symbols.class_name()), 1)
            }
            Some(receiver) => match self.symbols.lookup(receiver.name.as_str()) {
                Some(symbol) => {
                    let (ty, ir) = (symbol.ty.clone(), IR::Push(symbol.kind.segment(), symbol.index));
                    self.emit(ir);
                    (ty, 1)
                }
                None => (receiver.name.name.clone(), 0),
            },
        };

        for arg in call.args.iter() {
            self.emit_expr(arg)?;
        }

        let args = u16::try_from(call.args.len() + receiver_args).map_err(|_| CompileError::UnsupportedConstruct {
            msg: "too many call arguments".to_string(),
            span: call.name.token.span.clone(),
        })?;

        self.emit(IR::Call(Self::qualified_name(&qualifier, call.name.as_str()), args));
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{parsing::Parse, token_stream::TokenStream};

    fn gen(source: &str) -> Result<Vec<String>, CompileError> {
        let mut stream = TokenStream::from_source(source).unwrap();
        let unit = CompilationUnit::parse(&mut stream).unwrap();
        let code = CodeGen::new().compile(&unit)?;
        Ok(code.iter().map(|ir| ir.to_string()).collect())
    }

    #[test]
    fn test_let_local() {
        let code = gen("class Main { function void main() { var int x; let x = 1 + 2; return; } }").unwrap();
        assert_eq!(
            code,
            [
                "function Main.main 1",
                "push constant 1",
                "push constant 2",
                "add",
                "pop local 0",
                "push constant 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_method_this_slot() {
        let code = gen("class P { field int x; method int getX(int scale) { return x + scale; } }").unwrap();
        assert_eq!(
            code,
            [
                "function P.getX 0",
                "push argument 0",
                "pop pointer 0",
                "push this 0",
                "push argument 1",
                "add",
                "return",
            ]
        );
    }

    #[test]
    fn test_constructor_alloc() {
        let code = gen("class P { field int x, y; static int n; constructor P new() { return this; } }").unwrap();
        assert_eq!(
            code,
            [
                "function P.new 0",
                "push constant 2",
                "call Memory.alloc 1",
                "pop pointer 0",
                "push pointer 0",
                "return",
            ]
        );
    }

    #[test]
    fn test_keyword_constants() {
        let code = gen("class A { function boolean f() { return ~(true = false) | null; } }").unwrap();
        assert_eq!(
            &code[1..],
            [
                "push constant 1",
                "neg",
                "push constant 0",
                "eq",
                "not",
                "push constant 0",
                "or",
                "return",
            ]
        );
    }

    #[test]
    fn test_unqualified_call_in_function() {
        let code = gen("class A { function void f() { do g(3); return; } }").unwrap();
        assert_eq!(
            &code[1..4],
            ["push pointer 0", "push constant 3", "call A.g 2"]
        );
    }

    #[test]
    fn test_undefined_receiver_is_class() {
        let code = gen("class A { function void f() { do Output.printInt(1 * 2); return; } }").unwrap();
        assert_eq!(
            &code[1..6],
            [
                "push constant 1",
                "push constant 2",
                "call Math.multiply 2",
                "call Output.printInt 1",
                "pop temp 0",
            ]
        );
    }

    #[test]
    fn test_duplicate_parameter() {
        let err = gen("class A { function void f(int a, int a) { return; } }").unwrap_err();
        assert!(matches!(
            err,
            CompileError::DuplicateDefinition {
                existing: SymbolKind::Argument,
                ..
            }
        ));
    }

    #[test]
    fn test_string_outside_word_range() {
        let err = gen("class A { function void f() { do Output.printString(\"smile \u{1F600}\"); return; } }")
            .unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedConstruct { .. }));

        let long = "x".repeat(usize::from(u16::MAX) + 1);
        let source = format!("class A {{ function void f() {{ do Output.printString(\"{long}\"); return; }} }}");
        let err = gen(&source).unwrap_err();
        assert!(matches!(err, CompileError::UnsupportedConstruct { .. }));

        let longest = "x".repeat(usize::from(u16::MAX));
        let source = format!("class A {{ function void f() {{ do Output.printString(\"{longest}\"); return; }} }}");
        let code = gen(&source).unwrap();
        assert_eq!(code[1], "push constant 65535");
    }

    #[test]
    fn test_undefined_variable() {
        let err = gen("class A { function void f() { let y = 1; return; } }").unwrap_err();
        match err {
            CompileError::UndefinedSymbol { name, .. } => assert_eq!(name, "y"),
            err => panic!("unexpected error {err:?}"),
        }
    }
}
