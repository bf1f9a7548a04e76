use std::env;

use hourglass_demo::{app, Variant};

fn main() {
    env_logger::init();
    if let Err(err) = app::run(Variant::Grid, env::args().skip(1)) {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }
}
