use Roundoff::prelude::*;

// Demonstrates the `mixed-precision` option: one variable runs narrower
// than the rest of the kernel, so its `Let`-binding cast contributes an
// extra roundoff term that the analysis accounts for exactly once, at the
// binding site.

fn main() {
    let x = Identifier::fresh("x");
    let narrow = Identifier::fresh("x32");

    // let x32 = (x : f32) in x32 * x32
    let body = Expr::mul(Expr::variable(narrow.clone()), Expr::variable(narrow.clone()));
    let f = Expr::let_cast(
        narrow,
        Precision::Float32,
        Expr::variable(x.clone()),
        body,
    );

    let config = Configuration::uniform(Precision::Float64)
        .with_input_range("x", Interval::new(Rational::new(-1, 1), Rational::one()));

    let driver = DataflowDriver::new();
    let output = driver.analyze_function(&f, &[x], &config).unwrap();

    println!("range(x32*x32) = {}", output.result_range);
    println!("error(x32*x32) = {}", output.result_error);
}
