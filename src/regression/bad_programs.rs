use crate::compiler::Error;
use crate::lexer::LexErrorKind;
use crate::token::Position;
use crate::CompileError;

fn compile(program: &str) -> Result<(), Vec<Error>> {
    match crate::compile(program.trim()) {
        Err(CompileError::Lex(errors)) => panic!("{:?}", errors),
        Err(CompileError::Syntax(diagnostics)) => {
            Err(diagnostics.into_iter().map(|d| d.error).collect())
        }
        Ok(_) => Ok(()),
    }
}

#[test]
fn undeclared_identifier() {
    assert_eq!(
        Err(vec![Error::UndeclaredIdentifier("y".into())]),
        compile("begin y := 1 end.")
    );
}

#[test]
fn diagnostics_carry_positions() {
    match crate::compile("var x;\nbegin\n  x := y\nend.") {
        Err(CompileError::Syntax(diagnostics)) => {
            assert_eq!(diagnostics.len(), 1);
            assert_eq!(diagnostics[0].position, Position::new(3, 8));
            assert_eq!(
                diagnostics[0].to_string(),
                "line 3, column 8: undeclared identifier 'y'"
            );
        }
        other => panic!("{:?}", other.map(|_| ())),
    }
}

#[test]
fn redeclaration_in_same_block() {
    assert_eq!(
        Err(vec![Error::AlreadyDeclared("x".into())]),
        compile("var x, x; begin x := 1 end.")
    );
    assert_eq!(
        Err(vec![Error::AlreadyDeclared("a".into())]),
        compile("const a = 1; var a; begin end.")
    );
}

#[test]
fn assignment_targets() {
    assert_eq!(
        Err(vec![Error::AssignmentToNonVariable("c".into())]),
        compile("const c = 1; begin c := 2 end.")
    );
    assert_eq!(
        Err(vec![Error::AssignmentToNonVariable("p".into())]),
        compile("procedure p; ; begin p := 1 end.")
    );
    assert_eq!(
        Err(vec![Error::BecomesExpected]),
        compile("var x; begin x = 1 end.")
    );
}

#[test]
fn call_and_read_targets() {
    assert_eq!(
        Err(vec![Error::CallOfNonProcedure("x".into())]),
        compile("var x; call x.")
    );
    assert_eq!(
        Err(vec![Error::ReadIntoNonVariable("c".into())]),
        compile("const c = 1; read c.")
    );
    assert_eq!(
        Err(vec![Error::IdentifierExpected("call")]),
        compile("begin call end.")
    );
}

#[test]
fn missing_keywords_are_reported_and_assumed() {
    assert_eq!(
        Err(vec![Error::ThenExpected]),
        compile("var x; if x = 1 write x fi.")
    );
    assert_eq!(
        Err(vec![Error::DoExpected]),
        compile("var x; while x < 1 x := x * x.")
    );
    assert_eq!(
        Err(vec![Error::FiExpected]),
        compile("var x; begin if x = 0 then write x end.")
    );
}

#[test]
fn broken_expressions() {
    assert_eq!(
        Err(vec![Error::RightParenExpected]),
        compile("var x; write (x + x.")
    );
    assert_eq!(
        Err(vec![Error::FactorExpected]),
        compile("var x; write * x.")
    );
    assert_eq!(
        Err(vec![Error::ProcedureInExpression("p".into())]),
        compile("procedure p; ; write p.")
    );
}

#[test]
fn broken_condition_skips_the_statement() {
    // recovery stops at `fi`, which is then not a valid program end
    assert_eq!(
        Err(vec![Error::RelationExpected, Error::PeriodExpected]),
        compile("var x; if x then write x fi.")
    );
}

#[test]
fn compound_statements() {
    assert_eq!(
        Err(vec![Error::StatementSemicolonMissing]),
        compile("var x; begin x := 1 write x end.")
    );
    assert_eq!(
        Err(vec![Error::EndExpected]),
        compile("var x; begin x := x .")
    );
}

#[test]
fn declarations() {
    assert_eq!(
        Err(vec![Error::DeclarationSemicolonExpected]),
        compile("var x begin x := x end.")
    );
    assert_eq!(
        Err(vec![Error::ConstantEqualsExpected]),
        compile("const a := 1; begin end.")
    );
    assert_eq!(
        Err(vec![Error::ConstantValueExpected]),
        compile("const a = b; begin end.")
    );
    assert_eq!(
        Err(vec![Error::IdentifierExpected("var")]),
        compile("var 1; begin end.")
    );
    assert_eq!(
        Err(vec![Error::ProcedureSemicolonExpected]),
        compile("procedure p begin end; begin end.")
    );
}

#[test]
fn program_end() {
    assert_eq!(
        Err(vec![Error::PeriodExpected]),
        compile("var x; x := x")
    );
    assert_eq!(
        Err(vec![Error::TrailingInput("write".into())]),
        compile("begin end. write x")
    );
}

#[test]
fn errors_accumulate() {
    assert_eq!(
        Err(vec![
            Error::FactorExpected,
            Error::UndeclaredIdentifier("y".into()),
            Error::CallOfNonProcedure("x".into()),
        ]),
        compile("var x; begin x := ; y := 1; call x end.")
    );
}

#[test]
fn lexical_errors_stop_compilation() {
    match crate::compile("var x; begin x := 3 # 4 end.") {
        Err(CompileError::Lex(errors)) => {
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].kind, LexErrorKind::InvalidSymbol('#'));
            assert_eq!(errors[0].position, Position::new(1, 21));
        }
        other => panic!("{:?}", other.map(|_| ())),
    }
}

#[test]
fn deep_nesting_is_reported() {
    let parens = format!("write {}1{} .", "(".repeat(20_000), ")".repeat(20_000));
    assert_eq!(Err(vec![Error::NestingTooDeep]), compile(&parens));

    let blocks = format!("{}write 1{} .", "begin ".repeat(20_000), " end".repeat(20_000));
    let errors = compile(&blocks).unwrap_err();
    assert_eq!(errors[0], Error::NestingTooDeep);

    let conditionals = format!("{}write 1{} .", "if 1 = 1 then ".repeat(20_000), " fi".repeat(20_000));
    let errors = compile(&conditionals).unwrap_err();
    assert_eq!(errors[0], Error::NestingTooDeep);

    let procedures = format!("{}write 1 .", "procedure p; ".repeat(20_000));
    let errors = compile(&procedures).unwrap_err();
    assert_eq!(errors[0], Error::NestingTooDeep);
}

#[test]
fn moderate_nesting_compiles() {
    let parens = format!("write {}1{} .", "(".repeat(100), ")".repeat(100));
    assert_eq!(Ok(()), compile(&parens));
}
