use std::f64::consts::E;

/// Logistic function 1 / (1 + e^-x).
pub fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + E.powf(-x))
}

/// Closed form e^-x / (1 + e^-x)^2, equal to sigmoid(x) * (1 - sigmoid(x)).
pub fn sigmoid_derivative(x: f64) -> f64 {
    let e = E.powf(-x);
    e / ((1.0 + e) * (1.0 + e))
}
