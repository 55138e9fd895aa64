use Roundoff::prelude::*;

// Runs the six kernels from the standard roundoff-error regression suite
// (bspline0, bspline1, rigidBody1, doppler, turbine1, sineOrder3) through
// the default configuration (`interval` ranges, `affine` errors, `Float64`,
// both initial and operator roundoff tracked) and prints each result.
//
// These are demonstrations, not the regression test themselves - see the
// `Roundoff_driver` test suite for the assertions against the published
// expected error bounds.

fn driver() -> DataflowDriver {
    DataflowDriver::new()
}

fn r(n: i64, d: i64) -> Rational {
    Rational::new(n, d)
}

fn report(name: &str, expr: &Expr, params: Vec<Identifier>, config: Configuration) {
    let output = driver().analyze_function(expr, &params, &config).unwrap();
    println!("{name}: range = {}, error = {}", output.result_range, output.result_error);
}

fn bspline0() {
    let u = Identifier::fresh("u");
    let one_minus_u = Expr::sub(Expr::constant(Rational::one()), Expr::variable(u.clone()));
    let cubed = Expr::pow(one_minus_u, 3);
    let expr = Expr::div(cubed, Expr::constant(Rational::from_integer(6)));
    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("u", Interval::new(r(0, 1), r(7, 8)));
    report("bspline0", &expr, vec![u], config);
}

fn bspline1() {
    let u = Identifier::fresh("u");
    let u2 = Expr::mul(Expr::variable(u.clone()), Expr::variable(u.clone()));
    let u3 = Expr::mul(u2.clone(), Expr::variable(u.clone()));
    let term = Expr::sub(
        Expr::add(
            Expr::mul(Expr::constant(Rational::from_integer(3)), u3),
            Expr::constant(Rational::from_integer(4)),
        ),
        Expr::mul(Expr::constant(Rational::from_integer(6)), u2),
    );
    let expr = Expr::div(term, Expr::constant(Rational::from_integer(6)));
    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("u", Interval::new(r(7, 8), r(1, 1)));
    report("bspline1", &expr, vec![u], config);
}

fn rigid_body1() {
    let x1 = Identifier::fresh("x1");
    let x2 = Identifier::fresh("x2");
    let x3 = Identifier::fresh("x3");
    let term1 = Expr::neg(Expr::mul(Expr::variable(x1.clone()), Expr::variable(x2.clone())));
    let term2 = Expr::mul(
        Expr::constant(Rational::from_integer(2)),
        Expr::mul(Expr::variable(x2.clone()), Expr::variable(x3.clone())),
    );
    let term3 = Expr::variable(x1.clone());
    let term4 = Expr::variable(x3.clone());
    let expr = Expr::sub(Expr::sub(Expr::sub(term1, term2), term3), term4);
    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("x1", Interval::new(r(-15, 1), r(15, 1)))
        .with_input_range("x2", Interval::new(r(-15, 1), r(15, 1)))
        .with_input_range("x3", Interval::new(r(-15, 1), r(15, 1)));
    report("rigidBody1", &expr, vec![x1, x2, x3], config);
}

fn doppler() {
    let u = Identifier::fresh("u");
    let v = Identifier::fresh("v");
    let t = Identifier::fresh("T");
    let t1 = Expr::add(
        Expr::constant(Rational::new(3314, 10)),
        Expr::mul(Expr::constant(Rational::new(6, 10)), Expr::variable(t.clone())),
    );
    let t1_plus_u = Expr::add(t1.clone(), Expr::variable(u.clone()));
    let denom = Expr::mul(t1_plus_u.clone(), t1_plus_u);
    let numerator = Expr::neg(Expr::mul(t1, Expr::variable(v.clone())));
    let expr = Expr::div(numerator, denom);
    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("u", Interval::new(r(-100, 1), r(100, 1)))
        .with_input_range("v", Interval::new(r(20, 1), r(20000, 1)))
        .with_input_range("T", Interval::new(r(-30, 1), r(50, 1)));
    report("doppler", &expr, vec![u, v, t], config);
}

fn turbine1() {
    let v = Identifier::fresh("v");
    let w = Identifier::fresh("w");
    let r_ = Identifier::fresh("r");
    let denom = Expr::add(Expr::constant(Rational::one()), Expr::variable(r_.clone()));
    let expr = Expr::div(
        Expr::mul(Expr::variable(v.clone()), Expr::variable(w.clone())),
        denom,
    );
    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("v", Interval::new(r(-45, 10), r(-3, 10)))
        .with_input_range("w", Interval::new(r(4, 10), r(9, 10)))
        .with_input_range("r", Interval::new(r(38, 10), r(78, 10)));
    report("turbine1", &expr, vec![v, w, r_], config);
}

fn sine_order3() {
    let x = Identifier::fresh("x");
    let x3 = Expr::pow(Expr::variable(x.clone()), 3);
    let expr = Expr::sub(
        Expr::mul(Expr::constant(Rational::new(954, 1000)), Expr::variable(x.clone())),
        Expr::mul(Expr::constant(Rational::new(1, 10)), x3),
    );
    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("x", Interval::new(r(-2, 1), r(2, 1)));
    report("sineOrder3", &expr, vec![x], config);
}

fn main() {
    bspline0();
    bspline1();
    rigid_body1();
    doppler();
    turbine1();
    sine_order3();
}
