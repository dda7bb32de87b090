use std::path::Path;
use std::process::ExitCode;

use pyrite::eval::{Evaluator, NnueModel};
use pyrite::search::Search;

fn main() -> ExitCode {
    env_logger::init();
    pyrite::init();

    let mut evaluator = Evaluator::simple();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--nnue" => {
                let Some(path) = args.next() else {
                    eprintln!("--nnue requires a weights file path");
                    return ExitCode::FAILURE;
                };
                match NnueModel::load(Path::new(&path)) {
                    Ok(model) => evaluator = Evaluator::nnue(model),
                    Err(err) => {
                        eprintln!("{path}: {err}");
                        return ExitCode::FAILURE;
                    }
                }
            }
            other => {
                eprintln!("unknown argument: {other}");
                eprintln!("usage: pyrite [--nnue <weights-file>]");
                return ExitCode::FAILURE;
            }
        }
    }

    pyrite::uci::run(Search::new(evaluator));
    ExitCode::SUCCESS
}
