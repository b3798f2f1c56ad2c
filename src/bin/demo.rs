//! A thin command-line front end: solve one embedded puzzle (or a clue file)
//! and print the resulting grid. Exercises the library end to end; not part
//! of the core solving engine.

use std::fs;

use clap::{App, Arg};

use nonogram_core::{Board, Cell, ContradictionSolver, Method, PropagationDriver};

fn main() {
    #[cfg(feature = "logger")]
    env_logger::init();

    let matches = App::new("nonogram-demo")
        .version("0.1.0")
        .about("Solve a nonogram with the core engine and print the grid")
        .arg(
            Arg::with_name("FILE")
                .help("Clue file: one line per row, a blank line, then one line per column; comma-separated block sizes, empty line means no blocks")
                .index(1),
        )
        .get_matches();

    let (rows, columns) = match matches.value_of("FILE") {
        Some(path) => parse_clue_file(&fs::read_to_string(path).expect("reading clue file")),
        None => embedded_puzzle(),
    };

    let mut board = Board::monochrome(rows, columns).expect("clues describe a valid board");

    let mut driver = PropagationDriver::new(Method::Fsm);
    if let Err(err) = driver.solve(&mut board) {
        eprintln!("propagation stalled: {}", err);
    }

    if !board.is_solved_full() {
        let prober = ContradictionSolver::new(Method::Fsm);
        if let Err(err) = prober.run(&mut board) {
            eprintln!("probing failed: {}", err);
        }
    }

    print_board(&board);
    println!("solution rate: {:.4}", board.solution_rate());
}

fn print_board(board: &nonogram_core::Board) {
    for row in board.iter_rows() {
        let line: String = row.iter().map(render_cell).collect();
        println!("{}", line);
    }
}

fn render_cell(cell: &Cell) -> char {
    if cell.is_solved() {
        if cell.is_space() {
            '.'
        } else {
            '#'
        }
    } else {
        '?'
    }
}

fn parse_clue_file(content: &str) -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    let mut sections = content.split("\n\n");
    let rows = parse_section(sections.next().unwrap_or(""));
    let columns = parse_section(sections.next().unwrap_or(""));
    (rows, columns)
}

fn parse_section(section: &str) -> Vec<Vec<usize>> {
    section
        .lines()
        .map(|line| {
            line.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|s| s.parse().expect("block size must be a non-negative integer"))
                .collect()
        })
        .collect()
}

/// The "U" pentomino, solvable by propagation alone.
fn embedded_puzzle() -> (Vec<Vec<usize>>, Vec<Vec<usize>>) {
    (
        vec![vec![1, 1], vec![1, 1], vec![3]],
        vec![vec![3], vec![1], vec![3]],
    )
}
