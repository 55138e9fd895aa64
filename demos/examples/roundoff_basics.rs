use Roundoff::prelude::*;

// The general workflow for using Roundoff is as follows:
//
// 1. Build an expression tree out of `Expr` constructors, one fresh
//    `Identifier` per free variable.
// 2. Describe each parameter's input range (and, optionally, precision and
//    input error) in a `Configuration`.
// 3. Hand both to a `DataflowDriver`.

fn main() {
    // f(x, y) = (x + y) * (x - y), x in [1, 2], y in [0, 1].
    let x = Identifier::fresh("x");
    let y = Identifier::fresh("y");

    let sum = Expr::add(Expr::variable(x.clone()), Expr::variable(y.clone()));
    let diff = Expr::sub(Expr::variable(x.clone()), Expr::variable(y.clone()));
    let f = Expr::mul(sum, diff);

    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("x", Interval::new(Rational::one(), Rational::from_integer(2)))
        .with_input_range("y", Interval::new(Rational::zero(), Rational::one()));

    let driver = DataflowDriver::new();
    let output = driver.analyze_function(&f, &[x, y], &config).unwrap();

    println!("range(f)   = {}", output.result_range);
    println!("error(f)   = {}", output.result_error);
    println!("nodes seen = {}", output.interm_ranges.len());
}
