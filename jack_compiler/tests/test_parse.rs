use jack_compiler::{
    error::ErrorKind,
    lex::tokenize,
    parse_str,
    parsing::{ClassVarKind, ParseError, ReturnType, Stmt, SubroutineKind, Term},
    token_stream::{TokenError, MAX_DEPTH},
    tokens::{Symbol, TokenKind},
    xml::{tokens_to_xml, tree_to_xml},
};

const SQUARE: &str = include_str!("square.jack");
const MAIN: &str = include_str!("main.jack");

#[test]
fn test_parse_class() {
    let tree = parse_str("Square.jack", SQUARE).unwrap();
    let class = &tree.class;
    assert_eq!(class.name.as_str(), "Square");

    let vars: Vec<(ClassVarKind, usize)> = class.vars.iter().map(|var| (var.kind, var.names.len())).collect();
    assert_eq!(
        vars,
        [(ClassVarKind::Field, 2), (ClassVarKind::Field, 1), (ClassVarKind::Static, 1)]
    );

    let new = &class.subroutines[0];
    assert_eq!(new.kind, SubroutineKind::Constructor);
    assert!(matches!(&new.ret, ReturnType::Type(ty) if ty.name() == "Square"));
    assert_eq!(new.params.params.len(), 3);
    assert_eq!(new.body.statements.stmts.len(), 6);

    let area = &class.subroutines[5];
    assert_eq!(area.kind, SubroutineKind::Function);
    assert_eq!(area.body.local_count(), 1);
}

#[test]
fn test_parse_statements() {
    let tree = parse_str("Main.jack", MAIN).unwrap();
    let main = &tree.class.subroutines[0];
    assert_eq!(main.body.local_count(), 4);

    let stmts = &main.body.statements.stmts;
    assert!(matches!(stmts[0], Stmt::Let(_)));
    assert!(matches!(stmts[3], Stmt::While(_)));
    assert!(matches!(stmts.last(), Some(Stmt::Return(ret)) if ret.value.is_none()));

    match &stmts[3] {
        Stmt::While(stmt) => match &stmt.body.statements.stmts[0] {
            Stmt::Let(assign) => {
                assert!(assign.index.is_some());
                assert!(matches!(assign.rhs.head, Term::Call(ref call) if call.receiver.is_some()));
            }
            stmt => panic!("expected let statement, found {stmt:?}"),
        },
        stmt => panic!("expected while statement, found {stmt:?}"),
    }

    match &stmts[7] {
        Stmt::If(stmt) => assert!(stmt.else_branch.is_some()),
        stmt => panic!("expected if statement, found {stmt:?}"),
    }
}

#[test]
fn test_missing_semicolon() {
    let err = parse_str("A.jack", "class A { function void f() { var int x; let x = 1 } }").unwrap_err();
    match err.kind {
        ErrorKind::Parse(ParseError::Token(TokenError::Mismatch { expected, encountered })) => {
            assert_eq!(expected, TokenKind::Symbol(Symbol::Semicolon));
            assert_eq!(encountered.kind, TokenKind::Symbol(Symbol::RightBrace));
        }
        kind => panic!("unexpected error {kind}"),
    }
    let location = err.location.unwrap();
    assert_eq!((location.line, location.column), (1, 52));
}

#[test]
fn test_trailing_tokens() {
    let err = parse_str("A.jack", "class A { } class B { }").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Parse(ParseError::Token(TokenError::Mismatch {
            expected: TokenKind::EOS,
            ..
        }))
    ));
}

#[test]
fn test_unexpected_end() {
    let err = parse_str("A.jack", "class A { function void f() {").unwrap_err();
    match err.kind {
        ErrorKind::Parse(err) => assert!(matches!(
            err,
            ParseError::Token(ref token_err) if token_err.encountered().kind == TokenKind::EOS
        )),
        kind => panic!("unexpected error {kind}"),
    }
}

#[test]
fn test_xml_dumps() {
    let tokens = tokenize(SQUARE).unwrap();
    let xml = tokens_to_xml(&tokens, SQUARE);
    assert!(xml.starts_with("<tokens>\n<keyword> class </keyword>\n<identifier> Square </identifier>\n"));
    assert!(xml.contains("<symbol> &amp; </symbol>"));
    assert!(xml.contains("<symbol> &lt; </symbol>"));

    let tree = parse_str("Square.jack", SQUARE).unwrap();
    let xml = tree_to_xml(&tree, SQUARE);
    assert!(xml.starts_with("<class>\n  <keyword> class </keyword>\n"));
    assert!(xml.ends_with("  <symbol> } </symbol>\n</class>\n"));
    assert_eq!(xml.matches("<subroutineDec>").count(), 7);
    assert_eq!(xml.matches("<classVarDec>").count(), 3);
    assert_eq!(xml.matches("<expressionList>").count(), xml.matches("</expressionList>").count());
}

fn nested_parens(depth: usize) -> String {
    format!(
        "class A {{ function int f() {{ return {}1{}; }} }}",
        "(".repeat(depth),
        ")".repeat(depth)
    )
}

fn nested_loops(depth: usize) -> String {
    format!(
        "class A {{ function void f() {{ {}return;{} }} }}",
        "while (true) { ".repeat(depth),
        " }".repeat(depth)
    )
}

#[test]
fn test_nesting_within_limit() {
    assert!(parse_str("A.jack", &nested_parens(MAX_DEPTH / 4)).is_ok());
    assert!(parse_str("A.jack", &nested_loops(MAX_DEPTH / 4)).is_ok());
}

#[test]
fn test_nesting_too_deep() {
    for source in [nested_parens(5000), nested_loops(5000)] {
        let err = parse_str("A.jack", &source).unwrap_err();
        assert!(
            matches!(err.kind, ErrorKind::Parse(ParseError::Token(TokenError::Nesting { .. }))),
            "unexpected error {err}"
        );
    }
}
