use jack_compiler::{
    compile::{CompileError, SymbolKind},
    compile_str,
    error::ErrorKind,
    lex::LexError,
    render,
};
use std::collections::HashSet;

const SQUARE: &str = include_str!("square.jack");
const MAIN: &str = include_str!("main.jack");

fn compile(source: &str) -> Vec<String> {
    compile_str("Test.jack", source)
        .unwrap()
        .iter()
        .map(|ir| ir.to_string())
        .collect()
}

/// Instructions of one function, from its declaration up to the next one.
fn function<'a>(code: &'a [String], name: &str) -> &'a [String] {
    let header = format!("function {name} ");
    let start = code
        .iter()
        .position(|line| line.starts_with(&header))
        .unwrap_or_else(|| panic!("function {name} not found"));
    let end = code[start + 1..]
        .iter()
        .position(|line| line.starts_with("function "))
        .map(|offset| start + 1 + offset)
        .unwrap_or(code.len());
    &code[start..end]
}

#[test]
fn test_function_headers() {
    let code = compile(SQUARE);
    let headers: Vec<&str> = code
        .iter()
        .filter(|line| line.starts_with("function "))
        .map(String::as_str)
        .collect();
    assert_eq!(
        headers,
        [
            "function Square.new 0",
            "function Square.dispose 0",
            "function Square.draw 0",
            "function Square.incSize 0",
            "function Square.erase 0",
            "function Square.area 1",
            "function Square.getSize 0",
        ]
    );

    let code = compile(MAIN);
    assert_eq!(code[0], "function Main.main 4");
    assert_eq!(code.iter().filter(|line| line.starts_with("function ")).count(), 1);
}

#[test]
fn test_constructor() {
    let code = compile(SQUARE);
    assert_eq!(
        function(&code, "Square.new"),
        [
            "function Square.new 0",
            "push constant 3",
            "call Memory.alloc 1",
            "pop pointer 0",
            "push argument 0",
            "pop this 0",
            "push argument 1",
            "pop this 1",
            "push argument 2",
            "pop this 2",
            "push static 0",
            "push constant 1",
            "add",
            "pop static 0",
            "push pointer 0",
            "call Square.draw 1",
            "pop temp 0",
            "push pointer 0",
            "return",
        ]
    );
}

#[test]
fn test_method_receives_this() {
    let code = compile(SQUARE);
    assert_eq!(
        function(&code, "Square.dispose"),
        [
            "function Square.dispose 0",
            "push argument 0",
            "pop pointer 0",
            "push argument 0",
            "call Memory.deAlloc 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );

    // Unqualified calls inside a method pass the current object along.
    let inc_size = function(&code, "Square.incSize");
    let erase = inc_size.iter().position(|line| line == "call Square.erase 1").unwrap();
    assert_eq!(inc_size[erase - 1], "push argument 0");
}

#[test]
fn test_call_on_variable() {
    let code = compile(SQUARE);
    assert_eq!(
        function(&code, "Square.area"),
        [
            "function Square.area 1",
            "push argument 0",
            "call Square.getSize 1",
            "pop local 0",
            "push local 0",
            "push local 0",
            "call Math.multiply 2",
            "return",
        ]
    );

    let code = compile(
        "class Main {
            function void main() {
                var Foo obj;
                do obj.run();
                return;
            }
        }",
    );
    assert_eq!(
        code,
        [
            "function Main.main 1",
            "push local 0",
            "call Foo.run 1",
            "pop temp 0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_integer_constant() {
    let code = compile("class A { function int f() { return 42; } }");
    assert_eq!(code, ["function A.f 0", "push constant 42", "return"]);
}

#[test]
fn test_let_expression() {
    let code = compile("class A { function void f() { var int x; let x = 1 + 2; return; } }");
    assert_eq!(
        &code[1..5],
        ["push constant 1", "push constant 2", "add", "pop local 0"]
    );
}

#[test]
fn test_if_else_order() {
    let code = compile(
        "class A {
            function int f(boolean x) {
                if (x) { return 1; } else { return 0; }
            }
        }",
    );
    assert_eq!(
        code,
        [
            "function A.f 0",
            "push argument 0",
            "if-goto true.0",
            "push constant 0",
            "return",
            "goto end.0",
            "label true.0",
            "push constant 1",
            "return",
            "label end.0",
        ]
    );
}

#[test]
fn test_while_loop() {
    let code = compile(
        "class A {
            function void f() {
                var int i;
                while (i < 10) { let i = i + 1; }
                return;
            }
        }",
    );
    assert_eq!(
        code,
        [
            "function A.f 1",
            "label expression.0",
            "push local 0",
            "push constant 10",
            "lt",
            "if-goto true.0",
            "goto false.0",
            "label true.0",
            "push local 0",
            "push constant 1",
            "add",
            "pop local 0",
            "goto expression.0",
            "label false.0",
            "push constant 0",
            "return",
        ]
    );
}

#[test]
fn test_labels_unique_in_unit() {
    let code = compile(
        "class A {
            function void f() {
                var int i;
                while (i < 3) { if (i = 1) { let i = 2; } let i = i + 1; }
                return;
            }
            function void g() {
                var int i;
                while (i < 3) { let i = i + 1; }
                if (i > 1) { let i = 0; }
                return;
            }
        }",
    );

    let labels: Vec<&str> = code
        .iter()
        .filter_map(|line| line.strip_prefix("label "))
        .collect();
    let unique: HashSet<&str> = labels.iter().copied().collect();
    assert_eq!(labels.len(), unique.len());
    assert!(unique.contains("expression.2"));
    assert!(unique.contains("end.3"));
}

#[test]
fn test_string_constant() {
    let code = compile(MAIN);
    let big = code
        .iter()
        .position(|line| line == "push constant 3")
        .unwrap();
    assert_eq!(
        &code[big..big + 9],
        [
            "push constant 3",
            "call String.new 1",
            "push constant 66",
            "call String.appendChar 2",
            "push constant 105",
            "call String.appendChar 2",
            "push constant 103",
            "call String.appendChar 2",
            "call Output.printString 1",
        ]
    );
}

#[test]
fn test_array_access() {
    let code = compile(MAIN);

    // let a[i] = Keyboard.readInt(...);
    let store = code.iter().position(|line| line == "pop temp 0").unwrap();
    assert_eq!(&code[store - 3..store], ["push local 0", "push local 2", "add"]);
    let read = code[store..]
        .iter()
        .position(|line| line == "call Keyboard.readInt 1")
        .map(|offset| store + offset)
        .unwrap();
    assert_eq!(
        &code[read + 1..read + 4],
        ["push temp 0", "pop pointer 1", "pop that 0"]
    );

    // let sum = sum + a[i];
    let load = code.iter().position(|line| line == "push that 0").unwrap();
    assert_eq!(
        &code[load - 5..=load + 2],
        [
            "push local 3",
            "push local 0",
            "push local 2",
            "add",
            "pop pointer 1",
            "push that 0",
            "add",
            "pop local 3",
        ]
    );
}

#[test]
fn test_render_lines() {
    let code = compile_str("A.jack", "class A { function void f() { return; } }").unwrap();
    assert_eq!(render(&code), "function A.f 0\npush constant 0\nreturn\n");
}

#[test]
fn test_unknown_character() {
    let err = compile_str("Main.jack", "class Main {\n  let x = @;\n}\n").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Lex(LexError::UnknownCharacter { character: '@', .. })
    ));
    let location = err.location.as_ref().unwrap();
    assert_eq!((location.line, location.column), (2, 11));
    assert!(err.to_string().starts_with("Main.jack:2:11: "));
}

#[test]
fn test_duplicate_definition() {
    let err = compile_str("A.jack", "class A { field int x; static boolean x; }").unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Compile(CompileError::DuplicateDefinition {
            existing: SymbolKind::Field,
            ..
        })
    ));

    let err = compile_str(
        "A.jack",
        "class A { function void f(int a) { var char a; return; } }",
    )
    .unwrap_err();
    assert!(matches!(
        err.kind,
        ErrorKind::Compile(CompileError::DuplicateDefinition { .. })
    ));
}

#[test]
fn test_local_shadows_field() {
    let code = compile("class A { field int x; method int f() { var int x; let x = 1; return x; } }");
    assert!(code.contains(&"pop local 0".to_string()));
    assert!(!code.iter().any(|line| line == "pop this 0"));
}

#[test]
fn test_undefined_symbol() {
    let err = compile_str("A.jack", "class A { function void f() { let y = 1; return; } }").unwrap_err();
    match err.kind {
        ErrorKind::Compile(CompileError::UndefinedSymbol { name, .. }) => assert_eq!(name, "y"),
        kind => panic!("unexpected error {kind}"),
    }
}
