use expr_vm::Vm;

fn eval(source: &str) -> String {
    let mut out = Vec::new();
    expr_vm::interpret(source, &mut out).unwrap();
    String::from_utf8(out).unwrap().trim().to_string()
}

#[test]
fn test_number() {
    assert_eq!("3.14", eval("3.14"));
}

#[test]
fn test_addition() {
    assert_eq!("3", eval("1 + 2"));
}

#[test]
fn test_division() {
    assert_eq!("2.5", eval("10 / 4"));
}

#[test]
fn test_literals() {
    assert_eq!("true", eval("true"));
    assert_eq!("false", eval("false"));
    assert_eq!("nil", eval("nil"));
}

#[test]
fn test_grouping() {
    assert_eq!("42", eval("(42)"));
    assert_eq!("9", eval("(1 + 2) * 3"));
}

#[test]
fn test_precedence() {
    assert_eq!("7", eval("1 + 2 * 3"));
    assert_eq!("7", eval("(-1 + 2) * 3 - -4"));
    assert_eq!("true", eval("3 > 2 == true"));
}

#[test]
fn test_associative() {
    // (((1 - 2) - 3), not (1 - (2 - 3))
    assert_eq!("-4", eval("1 - 2 - 3"));
    assert_eq!("1", eval("8 / 4 / 2"));
}

#[test]
fn test_unary() {
    assert_eq!("-5", eval("-5"));
    assert_eq!("5", eval("- -5"));
    assert_eq!("true", eval("!nil"));
    assert_eq!("true", eval("!!true"));
    assert_eq!("false", eval("!0"));
}

#[test]
fn test_equality() {
    assert_eq!("true", eval("nil == nil"));
    assert_eq!("true", eval("1 + 1 == 2"));
    assert_eq!("true", eval("1 != 2"));
    // values of different types never compare equal
    assert_eq!("false", eval("1 == true"));
    assert_eq!("false", eval("nil == false"));
}

#[test]
fn test_comparison() {
    assert_eq!("true", eval("1 < 2"));
    assert_eq!("true", eval("2 <= 2"));
    assert_eq!("false", eval("3 >= 4"));
    assert_eq!("true", eval("5 > 4"));
}

#[test]
fn test_mixed_comparisons() {
    assert_eq!("true", eval("!(5 - 4 > 3 * 2 == !nil)"));
}

#[test]
fn test_multi_line_source() {
    assert_eq!("3", eval("1 +\n2 // comment on the last line"));
}

#[test]
fn test_vm_survives_failed_interpret() {
    let mut out = Vec::new();
    {
        let mut vm = Vm::new(&mut out);
        vm.interpret("1 + 2").unwrap();
        vm.interpret("-true").unwrap_err();
        vm.interpret("3 * 3").unwrap();
    }
    assert_eq!("3\n9\n", String::from_utf8(out).unwrap());
}
