fn run(source: &str) -> String {
    sandbox::evaluate(source).expect("evaluation failed")
}

fn run_err(source: &str) -> String {
    sandbox::evaluate(source).expect_err("evaluation succeeded")
}

#[test]
fn primitives() {
    assert_eq!(run("1 + 2"), "3");
    assert_eq!(run("'hello'"), r#""hello""#);
    assert_eq!(run("null"), "null");
    assert_eq!(run("undefined"), "undefined");
    assert_eq!(run("0.1 + 0.2"), "0.30000000000000004");
    assert_eq!(run("NaN"), "NaN");
    assert_eq!(run("-0"), "-0");
}

#[test]
fn containers() {
    assert_eq!(run("[1, 'two', [3]]"), r#"[1, "two", [3]]"#);
    assert_eq!(run("{x: 1, 'y z': [2]}"), r#"{"x": 1, "y z": [2]}"#);
    assert_eq!(run("[]"), "[]");
}

#[test]
fn sqrt_is_total() {
    assert_eq!(run("sqrt(16)"), "Right(4)");
    assert_eq!(
        run("sqrt(-1)"),
        r#"Left("Cannot represent square root of negative number")"#
    );
}

#[test]
fn curried_and_uncurried_calls_agree() {
    for (curried, uncurried) in [
        ("S.add(1)(2)", "S.add(1, 2)"),
        ("S.concat([1])([2])", "S.concat([1], [2])"),
        ("S.maybe(0)(x => x + 1)(S.Just(1))", "S.maybe(0, x => x + 1, S.Just(1))"),
        ("R.subtract(10)(3)", "R.subtract(10, 3)"),
        ("S.reduce(S.add)(0)([1, 2, 3])", "S.reduce(S.add, 0, [1, 2, 3])"),
    ] {
        assert_eq!(run(curried), run(uncurried), "{} vs {}", curried, uncurried);
    }
}

#[test]
fn partial_application_shows_its_arguments() {
    assert_eq!(run("S.add(1)"), "add(1)");
    assert_eq!(run("S.map(S.inc).length"), "1");
}

#[test]
fn maybe_and_either() {
    assert_eq!(run("S.head([1, 2, 3])"), "Just(1)");
    assert_eq!(run("S.head([])"), "Nothing");
    assert_eq!(run("S.map(S.toUpper, S.Just('abc'))"), r#"Just("ABC")"#);
    assert_eq!(run("S.fromMaybe(0, S.Nothing)"), "0");
    assert_eq!(run("S.either(S.toUpper, S.show, S.Left('bad'))"), r#""BAD""#);
    assert_eq!(run("S.chain(sqrt, S.Right(9))"), "Right(3)");
    assert_eq!(run("S.justs([S.Just(1), S.Nothing, S.Just(3)])"), "[1, 3]");
    assert_eq!(run("S.parseInt(10, '42')"), "Just(42)");
    assert_eq!(run("S.Just(5).value"), "5");
    assert_eq!(run("sqrt(-4).isLeft"), "true");
}

#[test]
fn safety_library_rejects_bad_arguments() {
    assert_eq!(
        run_err("S.add('1', 2)"),
        r#"TypeError: add expected a Number but received "1""#
    );
    assert!(run_err("S.toUpper(1)").starts_with("TypeError: toUpper expected a String"));
}

#[test]
fn utility_library() {
    assert_eq!(run("R.map(x => x * 2, [1, 2, 3])"), "[2, 4, 6]");
    assert_eq!(run("R.compose(R.inc, R.multiply(2))(5)"), "11");
    assert_eq!(run("R.pipe(R.inc, R.multiply(2))(5)"), "12");
    assert_eq!(run("R.head([])"), "undefined");
    assert_eq!(run("R.always(7)('anything')"), "7");
    assert_eq!(run("R.filter(x => x % 2, [1, 2, 3])"), "[1, 3]");
    assert_eq!(run("R.reduce((acc, x) => acc + x, 10, [1, 2])"), "13");
}

#[test]
fn methods() {
    assert_eq!(run("'abc'.toUpperCase()"), r#""ABC""#);
    assert_eq!(run("[1, 2, 3].map(x => x + 1)"), "[2, 3, 4]");
    assert_eq!(run("[1, 2, 3].length"), "3");
    assert_eq!(run("'a-b-c'.split('-')"), r#"["a", "b", "c"]"#);
    assert_eq!(run("(1.005).toFixed(1)"), r#""1.0""#);
    assert_eq!(run("[1, 2].join(' + ')"), r#""1 + 2""#);
}

#[test]
fn functions_show_their_source() {
    assert_eq!(run("x => x + 1"), "x => x + 1");
    assert_eq!(run("(a, b) => a"), "(a, b) => a");
}

#[test]
fn statements() {
    assert_eq!(run("const x = 42"), "undefined");
    assert_eq!(run("let y = 1;"), "undefined");
    assert_eq!(run("global.z = [1]"), "[1]");
    assert_eq!(run("w = 'value'"), r#""value""#);
}

#[test]
fn realms_are_fresh() {
    run("global.leak = 1");
    assert_eq!(run_err("leak"), "ReferenceError: leak is not defined");
}

#[test]
fn errors_read_like_javascript() {
    assert_eq!(run_err("nope"), "ReferenceError: nope is not defined");
    assert_eq!(run_err("(1)(2)"), "TypeError: 1 is not a function");
    assert_eq!(
        run_err("null.x"),
        "TypeError: Cannot read properties of null (reading 'x')"
    );
    assert!(run_err("1 +").starts_with("SyntaxError: "));
}

#[test]
fn nesting_depth_is_bounded() {
    let nested = |depth: usize| format!("{}1{}", "[".repeat(depth), "]".repeat(depth));
    assert_eq!(run(&nested(3)), "[[[1]]]");
    assert_eq!(
        run_err(&nested(5000)),
        "SyntaxError: expression nested too deeply"
    );
}

#[test]
fn no_host_access() {
    assert_eq!(run_err("process"), "ReferenceError: process is not defined");
    assert_eq!(run_err("require('fs')"), "ReferenceError: require is not defined");
}

#[test]
fn sandbox_struct_delegates() {
    let sandbox = sandbox::Sandbox;
    assert_eq!(sandbox.evaluate("S.I(1)"), Ok("1".to_string()));
}
