//! Random programs built from nested `if` and counted `while` loops,
//! paired with the output they must print.

use arbitrary::{Result, Unstructured};

use crate::types::Int;

const MAX_DEPTH: usize = 3;

const RELATIONS: [&str; 6] = ["=", "<>", "<", "<=", ">", ">="];

pub struct Generated {
    pub source: String,
    pub output: Vec<Int>,
}

enum Stmt {
    Write(Int),
    // value of the counter of the n-th enclosing loop
    WriteCounter(usize),
    If {
        lhs: Int,
        relation: &'static str,
        rhs: Int,
        then: Vec<Stmt>,
        otherwise: Option<Vec<Stmt>>,
    },
    Loop {
        times: Int,
        body: Vec<Stmt>,
    },
}

pub fn program(u: &mut Unstructured<'_>) -> Result<Generated> {
    let body = block(u, 0, 0)?;

    let counters = (0..MAX_DEPTH)
        .map(|i| format!("c{}", i))
        .collect::<Vec<_>>()
        .join(", ");
    let mut source = format!("var {};\nbegin\n", counters);
    render_block(&body, 0, &mut source);
    source.push_str("\nend.\n");

    let mut output = Vec::new();
    eval_block(&body, &mut Vec::new(), &mut output);

    Ok(Generated { source, output })
}

fn block(u: &mut Unstructured<'_>, depth: usize, loops: usize) -> Result<Vec<Stmt>> {
    let len = u.int_in_range(1..=2usize)?;
    (0..len).map(|_| stmt(u, depth, loops)).collect()
}

fn stmt(u: &mut Unstructured<'_>, depth: usize, loops: usize) -> Result<Stmt> {
    let choice = if depth >= MAX_DEPTH {
        u.int_in_range(0..=1u8)?
    } else {
        u.int_in_range(0..=3u8)?
    };

    let stmt = match choice {
        1 if loops > 0 => Stmt::WriteCounter(u.choose_index(loops)?),
        0 | 1 => Stmt::Write(u.int_in_range(0..=999)?),
        2 => Stmt::If {
            lhs: u.int_in_range(0..=9)?,
            relation: *u.choose(&RELATIONS)?,
            rhs: u.int_in_range(0..=9)?,
            then: block(u, depth + 1, loops)?,
            otherwise: if u.arbitrary()? {
                Some(block(u, depth + 1, loops)?)
            } else {
                None
            },
        },
        _ => Stmt::Loop {
            times: u.int_in_range(0..=3)?,
            body: block(u, depth + 1, loops + 1)?,
        },
    };

    Ok(stmt)
}

fn render_block(stmts: &[Stmt], loops: usize, out: &mut String) {
    for (i, stmt) in stmts.iter().enumerate() {
        if i > 0 {
            out.push_str(";\n");
        }
        render(stmt, loops, out);
    }
}

fn render(stmt: &Stmt, loops: usize, out: &mut String) {
    match stmt {
        Stmt::Write(value) => out.push_str(&format!("write {}", value)),
        Stmt::WriteCounter(n) => out.push_str(&format!("write c{}", n)),
        Stmt::If {
            lhs,
            relation,
            rhs,
            then,
            otherwise,
        } => {
            out.push_str(&format!("if {} {} {} then begin\n", lhs, relation, rhs));
            render_block(then, loops, out);
            out.push_str("\nend");
            if let Some(otherwise) = otherwise {
                out.push_str(" else begin\n");
                render_block(otherwise, loops, out);
                out.push_str("\nend");
            }
            out.push_str(" fi");
        }
        Stmt::Loop { times, body } => {
            let counter = format!("c{}", loops);
            out.push_str(&format!(
                "begin {c} := 0; while {c} < {n} do begin\n",
                c = counter,
                n = times
            ));
            render_block(body, loops + 1, out);
            out.push_str(&format!(";\n{c} := {c} + 1 end end", c = counter));
        }
    }
}

fn holds(lhs: Int, relation: &str, rhs: Int) -> bool {
    match relation {
        "=" => lhs == rhs,
        "<>" => lhs != rhs,
        "<" => lhs < rhs,
        "<=" => lhs <= rhs,
        ">" => lhs > rhs,
        _ => lhs >= rhs,
    }
}

fn eval_block(stmts: &[Stmt], counters: &mut Vec<Int>, out: &mut Vec<Int>) {
    for stmt in stmts {
        eval(stmt, counters, out);
    }
}

fn eval(stmt: &Stmt, counters: &mut Vec<Int>, out: &mut Vec<Int>) {
    match stmt {
        Stmt::Write(value) => out.push(*value),
        Stmt::WriteCounter(n) => out.push(counters[*n]),
        Stmt::If {
            lhs,
            relation,
            rhs,
            then,
            otherwise,
        } => {
            if holds(*lhs, relation, *rhs) {
                eval_block(then, counters, out);
            } else if let Some(otherwise) = otherwise {
                eval_block(otherwise, counters, out);
            }
        }
        Stmt::Loop { times, body } => {
            for i in 0..*times {
                counters.push(i);
                eval_block(body, counters, out);
                counters.pop();
            }
        }
    }
}
