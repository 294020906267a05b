use arbtest::arbtest;

use super::{generate, run};
use crate::types::Int;

#[test]
fn nested_control_flow() {
    arbtest(|u| {
        let generated = generate::program(u)?;
        run(&generated.source, &[], &generated.output, 0);
        Ok(())
    });
}

#[test]
fn frames_are_restored_after_recursion() {
    // `saved` lives in each activation and is read back after the
    // recursive call returns
    let program = "
        var n, acc;
        procedure sum;
            var saved;
            begin
                if n > 0 then begin
                    saved := n;
                    n := n - 1;
                    call sum;
                    acc := acc + saved
                end fi
            end;
        begin read n; acc := 0; call sum; write acc; write n end.
    ";

    arbtest(|u| {
        let n: Int = u.int_in_range(0..=60)?;
        run(program, &[n], &[n * (n + 1) / 2, 0], 1);
        Ok(())
    });
}
