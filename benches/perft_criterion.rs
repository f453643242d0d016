use std::hint::black_box;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use plum_session::game_state::game_state::GameState;
use plum_session::move_generation::perft::{perft, perft_multi_threaded};

struct PerftCase {
    name: &'static str,
    fen: &'static str,
    depth: u8,
    nodes: usize,
}

const CASES: &[PerftCase] = &[
    PerftCase {
        name: "startpos",
        fen: "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
        depth: 3,
        nodes: 8_902,
    },
    PerftCase {
        name: "kiwipete",
        fen: "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1",
        depth: 2,
        nodes: 2_039,
    },
    PerftCase {
        name: "rook_endgame",
        fen: "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1",
        depth: 3,
        nodes: 2_812,
    },
];

fn bench_perft(c: &mut Criterion) {
    let mut group = c.benchmark_group("perft");
    group.warm_up_time(Duration::from_secs(1));
    group.measurement_time(Duration::from_secs(3));
    group.sample_size(20);

    for case in CASES {
        let game = GameState::from_fen(case.fen).expect("benchmark FEN should parse");
        let counted = perft(&game, case.depth).expect("perft should run");
        assert_eq!(counted.nodes, case.nodes, "node mismatch for {}", case.name);

        group.throughput(Throughput::Elements(case.nodes as u64));
        group.bench_with_input(BenchmarkId::new("single", case.name), &game, |b, game| {
            b.iter(|| perft(black_box(game), black_box(case.depth)).expect("perft should run").nodes)
        });
        group.bench_with_input(BenchmarkId::new("threaded", case.name), &game, |b, game| {
            b.iter(|| {
                perft_multi_threaded(black_box(game), black_box(case.depth))
                    .expect("perft should run")
                    .nodes
            })
        });
    }

    group.finish();
}

criterion_group!(perft_benches, bench_perft);
criterion_main!(perft_benches);
