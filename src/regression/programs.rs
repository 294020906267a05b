use super::{run, run_err};
use crate::sm::RuntimeError;

#[test]
fn constant_folding() {
    run("const a=5; var b; begin b:=a+3; write b end.", &[], &[8], 0);
}

#[test]
fn read_and_square() {
    run("var x; begin read x; write x*x end.", &[4], &[16], 1);
}

#[test]
fn empty_program() {
    run(".", &[], &[], 0);
}

#[test]
fn arithmetic() {
    run(
        "
        const m = 7;
        var a;
        begin
            a := -3;
            write a * m;
            write 17 / 5;
            write 17 mod 5;
            write -(2 + 3) * 2;
            write (1 + 2) * (3 + 4) - 5
        end.
        ",
        &[],
        &[-21, 3, 2, -10, 16],
        0,
    );
}

#[test]
fn relations() {
    run(
        "
        begin
            if 3 <> 4 then write 1 else write 0 fi;
            if 3 >= 4 then write 1 else write 0 fi;
            if 4 >= 4 then write 1 fi;
            if 5 < 4 then write 1 fi;
            if 2 = 2 then write 7 fi
        end.
        ",
        &[],
        &[1, 0, 1, 7],
        0,
    );
}

#[test]
fn while_sum() {
    run(
        "
        var i, s;
        begin
            i := 1; s := 0;
            while i <= 10 do begin
                s := s + i;
                i := i + 1
            end;
            write s
        end.
        ",
        &[],
        &[55],
        0,
    );
}

#[test]
fn comments() {
    run(
        "
        /* leading
           comment */
        var x;
        begin x := 2 /* inline */; write x end.
        ",
        &[],
        &[2],
        0,
    );
}

#[test]
fn reads_in_order() {
    run(
        "var a, b; begin read a; read b; write a - b end.",
        &[10, 3],
        &[7],
        2,
    );
}

#[test]
fn recursive_factorial() {
    run(
        "
        var n, f;
        procedure fact;
        begin
            if n > 1 then begin
                f := f * n;
                n := n - 1;
                call fact
            end fi
        end;
        begin read n; f := 1; call fact; write f end.
        ",
        &[5],
        &[120],
        1,
    );
}

#[test]
fn sibling_procedures() {
    run(
        "
        var r;
        procedure a; begin r := r + 1 end;
        procedure b; begin call a; call a end;
        begin r := 0; call b; call a; write r end.
        ",
        &[],
        &[3],
        0,
    );
}

#[test]
fn outer_variables_through_static_links() {
    run(
        "
        var x;
        procedure outer;
            var y;
            procedure inner;
            begin y := x * 2 end;
        begin call inner; write y end;
        begin x := 21; call outer end.
        ",
        &[],
        &[42],
        0,
    );
}

#[test]
fn shadowed_locals() {
    run(
        "
        var x;
        procedure p;
            var x;
            begin x := 2; write x end;
        begin x := 1; call p; write x end.
        ",
        &[],
        &[2, 1],
        0,
    );
}

#[test]
fn locals_survive_nested_calls() {
    // q runs while p's frame is live and must not clobber p's local
    run(
        "
        var g;
        procedure q;
            var t;
            begin t := 100; g := g + t end;
        procedure p;
            var t;
            begin t := 5; call q; write t; write g end;
        begin g := 1; call p; call p end.
        ",
        &[],
        &[5, 101, 5, 201],
        0,
    );
}

#[test]
fn division_by_zero() {
    let (err, output) = run_err("begin write 1; write 5 / 0; write 2 end.", &[]);
    assert!(matches!(err, RuntimeError::DivisionByZero { .. }), "{}", err);
    assert_eq!(output, vec![1]);
}

#[test]
fn modulo_by_zero() {
    let (err, _) = run_err("var z; begin z := 0; write 5 mod z end.", &[]);
    assert!(matches!(err, RuntimeError::ModuloByZero { .. }), "{}", err);
}

#[test]
fn read_past_end_of_input() {
    let (err, _) = run_err("var x; begin read x; read x end.", &[1]);
    assert!(matches!(err, RuntimeError::NoInput { .. }), "{}", err);
}

#[test]
fn unbounded_recursion() {
    let (err, _) = run_err("procedure p; call p; call p.", &[]);
    assert!(matches!(err, RuntimeError::StackOverflow { .. }), "{}", err);
}
