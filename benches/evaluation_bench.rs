use std::str::FromStr;

use criterion::{Criterion, criterion_group, criterion_main};
use pyrite::board::{Position, legal_moves};
use pyrite::eval::{Evaluator, NnueEval, NnueModel};

fn bench_evaluation(c: &mut Criterion) {
    pyrite::init();
    let positions = vec![
        ("startpos", Position::default()),
        (
            "middlegame",
            Position::from_str(
                "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
            )
            .unwrap(),
        ),
        ("endgame", Position::from_str("8/5k2/8/8/8/8/4K3/4R3 w - - 0 1").unwrap()),
        (
            "complex",
            Position::from_str(
                "r1bq1rk1/pp2ppbp/2np2p1/2n5/P3PP2/N1P2N2/1PB3PP/R1B1QRK1 b - - 0 10",
            )
            .unwrap(),
        ),
    ];

    let mut simple = Evaluator::simple();
    for (name, pos) in &positions {
        c.bench_function(&format!("eval_simple_{name}"), |b| b.iter(|| simple.evaluate(pos)));
    }

    let mut nnue = NnueEval::new(NnueModel::synthetic(0xBE9C));
    for (name, pos) in &positions {
        c.bench_function(&format!("eval_nnue_full_{name}"), |b| b.iter(|| nnue.evaluate(pos)));
    }
}

fn bench_nnue_delta(c: &mut Criterion) {
    pyrite::init();
    let mut pos = Position::from_str(
        "r1bqkb1r/pppp1ppp/2n2n2/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 4 4",
    )
    .unwrap();
    let mv = legal_moves(&mut pos)[0];
    let mut nnue = NnueEval::new(NnueModel::synthetic(0xBE9C));
    let _ = nnue.evaluate(&pos);

    c.bench_function("eval_nnue_delta", |b| b.iter(|| nnue.delta_evaluate(&mut pos, mv, 0)));
}

criterion_group!(benches, bench_evaluation, bench_nnue_delta);
criterion_main!(benches);
