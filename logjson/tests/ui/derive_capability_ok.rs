use std::fmt;

use logjson::{Encoder, LogMarshaler, Loggable};

#[derive(Loggable)]
#[log(marshaler)]
struct Card {
    number: String,
}

impl LogMarshaler for Card {
    fn marshal_log_json(&self, encoder: &mut Encoder) {
        encoder.write_str(&self.number[..4]);
    }
}

#[derive(Loggable, serde::Serialize)]
#[log(serialize)]
struct Point<T> {
    x: T,
    y: T,
}

#[derive(Debug, Loggable)]
#[log(error)]
struct Failure;

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("failure")
    }
}

impl std::error::Error for Failure {}

fn main() {
    let _ = logjson::marshal(&Card { number: "4111111111111111".into() });
    let _ = logjson::marshal(&Point { x: 1, y: 2 });
    let _ = logjson::marshal(&Failure);
}
