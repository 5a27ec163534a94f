use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tetris::board::{Board, CellState};
use tetris::game::{GameConfig, GameSession};
use tetris::piece::{RandomPieceProvider, TetrominoType};

fn running_session() -> GameSession {
    let provider = Box::new(RandomPieceProvider::seeded(12345));
    let mut game = GameSession::with_provider(GameConfig::default(), provider);
    game.start();
    game
}

fn bench_tick(c: &mut Criterion) {
    let mut game = running_session();

    c.bench_function("game_tick_16ms", |b| {
        b.iter(|| {
            game.tick(black_box(16));
            if game.is_game_over() {
                game.start();
            }
            game.take_events();
        })
    });
}

fn bench_sweep(c: &mut Criterion) {
    c.bench_function("sweep_4_lines", |b| {
        b.iter(|| {
            let mut board = Board::new(10, 20);
            for y in 16..20 {
                for x in 0..10 {
                    board.set(x, y, CellState::Filled(TetrominoType::I));
                }
            }
            black_box(board.sweep());
        })
    });
}

fn bench_hard_drop(c: &mut Criterion) {
    let mut game = running_session();

    c.bench_function("hard_drop_and_spawn", |b| {
        b.iter(|| {
            game.hard_drop();
            if game.is_game_over() {
                game.start();
            }
            game.take_events();
        })
    });
}

fn bench_move(c: &mut Criterion) {
    let mut game = running_session();

    c.bench_function("move_horizontal", |b| {
        b.iter(|| {
            game.move_right();
            game.move_left();
            game.take_events();
        })
    });
}

fn bench_rotate(c: &mut Criterion) {
    let mut game = running_session();

    c.bench_function("rotate", |b| {
        b.iter(|| {
            game.rotate();
            game.take_events();
        })
    });
}

criterion_group!(
    benches,
    bench_tick,
    bench_sweep,
    bench_hard_drop,
    bench_move,
    bench_rotate
);
criterion_main!(benches);
