//! XML dumps of the token sequence and the syntax tree.
//!
//! Both formats match the reference output of the course tools,
//! so they can be compared line for line.
use crate::{
    parsing::{
        Class, ClassVarDec, Comma, CompilationUnit, Delimited, Expression, ExpressionList, Ident, ReturnType,
        Statements, Stmt, SubroutineBody, SubroutineCall, SubroutineDec, Term, Type, VarDec,
    },
    tokens::{Token, TokenKind},
};

/// Flat list of tokens wrapped in a `<tokens>` element.
pub fn tokens_to_xml(tokens: &[Token], source: &str) -> String {
    let mut writer = XmlWriter::new(source);
    writer.buf.push_str("<tokens>\n");
    for token in tokens.iter().filter(|token| token.kind != TokenKind::EOS) {
        writer.token(token);
    }
    writer.buf.push_str("</tokens>\n");
    writer.buf
}

/// Syntax tree with each grammar rule as a nested element.
pub fn tree_to_xml(unit: &CompilationUnit, source: &str) -> String {
    let mut writer = XmlWriter::new(source);
    writer.class(&unit.class);
    writer.buf
}

struct XmlWriter<'a> {
    buf: String,
    depth: usize,
    source: &'a str,
}

impl<'a> XmlWriter<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            buf: String::new(),
            depth: 0,
            source,
        }
    }

    fn indent(&mut self) {
        for _ in 0..self.depth {
            self.buf.push_str("  ");
        }
    }

    fn open(&mut self, tag: &str) {
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
        self.depth += 1;
    }

    fn close(&mut self, tag: &str) {
        self.depth -= 1;
        self.indent();
        self.buf.push_str("</");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    fn token(&mut self, token: &Token) {
        let tag = token.kind.xml_tag();
        self.indent();
        self.buf.push('<');
        self.buf.push_str(tag);
        self.buf.push_str("> ");
        escape_into(&mut self.buf, token.text(self.source));
        self.buf.push_str(" </");
        self.buf.push_str(tag);
        self.buf.push_str(">\n");
    }

    fn ident(&mut self, ident: &Ident) {
        self.token(&ident.token)
    }

    fn ty(&mut self, ty: &Type) {
        self.token(ty.token())
    }

    fn names(&mut self, names: &Delimited<Ident, Comma>) {
        for item in &names.items {
            self.ident(&item.item);
            if let Some(comma) = &item.delim {
                self.token(&comma.token);
            }
        }
    }
}

/// Tree walk
impl<'a> XmlWriter<'a> {
    fn class(&mut self, class: &Class) {
        self.open("class");
        self.token(&class.keyword);
        self.ident(&class.name);
        self.token(&class.left_brace);
        for var in &class.vars {
            self.class_var(var);
        }
        for subroutine in &class.subroutines {
            self.subroutine(subroutine);
        }
        self.token(&class.right_brace);
        self.close("class");
    }

    fn class_var(&mut self, var: &ClassVarDec) {
        self.open("classVarDec");
        self.token(&var.keyword);
        self.ty(&var.ty);
        self.names(&var.names);
        self.token(&var.semicolon);
        self.close("classVarDec");
    }

    fn subroutine(&mut self, subroutine: &SubroutineDec) {
        self.open("subroutineDec");
        self.token(&subroutine.keyword);
        match &subroutine.ret {
            ReturnType::Void(token) => self.token(token),
            ReturnType::Type(ty) => self.ty(ty),
        }
        self.ident(&subroutine.name);
        self.token(&subroutine.left_paren);

        self.open("parameterList");
        for item in &subroutine.params.params.items {
            self.ty(&item.item.ty);
            self.ident(&item.item.name);
            if let Some(comma) = &item.delim {
                self.token(&comma.token);
            }
        }
        self.close("parameterList");

        self.token(&subroutine.right_paren);
        self.body(&subroutine.body);
        self.close("subroutineDec");
    }

    fn body(&mut self, body: &SubroutineBody) {
        self.open("subroutineBody");
        self.token(&body.left_brace);
        for var in &body.vars {
            self.var(var);
        }
        self.statements(&body.statements);
        self.token(&body.right_brace);
        self.close("subroutineBody");
    }

    fn var(&mut self, var: &VarDec) {
        self.open("varDec");
        self.token(&var.keyword);
        self.ty(&var.ty);
        self.names(&var.names);
        self.token(&var.semicolon);
        self.close("varDec");
    }

    fn statements(&mut self, statements: &Statements) {
        self.open("statements");
        for stmt in &statements.stmts {
            self.stmt(stmt);
        }
        self.close("statements");
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Let(stmt) => {
                self.open("letStatement");
                self.token(&stmt.keyword);
                self.ident(&stmt.name);
                if let Some(index) = &stmt.index {
                    self.token(&index.left_bracket);
                    self.expr(&index.expr);
                    self.token(&index.right_bracket);
                }
                self.token(&stmt.eq);
                self.expr(&stmt.rhs);
                self.token(&stmt.semicolon);
                self.close("letStatement");
            }
            Stmt::If(stmt) => {
                self.open("ifStatement");
                self.token(&stmt.keyword);
                self.token(&stmt.left_paren);
                self.expr(&stmt.cond);
                self.token(&stmt.right_paren);
                self.token(&stmt.then_block.left_brace);
                self.statements(&stmt.then_block.statements);
                self.token(&stmt.then_block.right_brace);
                if let Some(else_branch) = &stmt.else_branch {
                    self.token(&else_branch.keyword);
                    self.token(&else_branch.block.left_brace);
                    self.statements(&else_branch.block.statements);
                    self.token(&else_branch.block.right_brace);
                }
                self.close("ifStatement");
            }
            Stmt::While(stmt) => {
                self.open("whileStatement");
                self.token(&stmt.keyword);
                self.token(&stmt.left_paren);
                self.expr(&stmt.cond);
                self.token(&stmt.right_paren);
                self.token(&stmt.body.left_brace);
                self.statements(&stmt.body.statements);
                self.token(&stmt.body.right_brace);
                self.close("whileStatement");
            }
            Stmt::Do(stmt) => {
                self.open("doStatement");
                self.token(&stmt.keyword);
                self.call(&stmt.call);
                self.token(&stmt.semicolon);
                self.close("doStatement");
            }
            Stmt::Return(stmt) => {
                self.open("returnStatement");
                self.token(&stmt.keyword);
                if let Some(value) = &stmt.value {
                    self.expr(value);
                }
                self.token(&stmt.semicolon);
                self.close("returnStatement");
            }
        }
    }

    fn expr(&mut self, expr: &Expression) {
        self.open("expression");
        self.term(&expr.head);
        for (op, term) in &expr.tail {
            self.token(&op.token);
            self.term(term);
        }
        self.close("expression");
    }

    fn term(&mut self, term: &Term) {
        self.open("term");
        match term {
            Term::Integer(int) => self.token(&int.token),
            Term::String(string) => self.token(&string.token),
            Term::Keyword(keyword) => self.token(&keyword.token),
            Term::Paren(paren) => {
                self.token(&paren.left_paren);
                self.expr(&paren.expr);
                self.token(&paren.right_paren);
            }
            Term::Unary(unary) => {
                self.token(&unary.op.token);
                self.term(&unary.term);
            }
            Term::Var(name) => self.ident(name),
            Term::Index(index) => {
                self.ident(&index.name);
                self.token(&index.index.left_bracket);
                self.expr(&index.index.expr);
                self.token(&index.index.right_bracket);
            }
            Term::Call(call) => self.call(call),
        }
        self.close("term");
    }

    /// Calls have no element of their own, their tokens are
    /// inlined into the enclosing term or statement.
    fn call(&mut self, call: &SubroutineCall) {
        if let Some(receiver) = &call.receiver {
            self.ident(&receiver.name);
            self.token(&receiver.dot);
        }
        self.ident(&call.name);
        self.token(&call.left_paren);
        self.expr_list(&call.args);
        self.token(&call.right_paren);
    }

    fn expr_list(&mut self, list: &ExpressionList) {
        self.open("expressionList");
        for item in &list.exprs.items {
            self.expr(&item.item);
            if let Some(comma) = &item.delim {
                self.token(&comma.token);
            }
        }
        self.close("expressionList");
    }
}

fn escape_into(buf: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '&' => buf.push_str("&amp;"),
            _ => buf.push(c),
        }
    }
}
