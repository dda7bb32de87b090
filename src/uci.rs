//! UCI protocol wrapper. The search runs on a worker thread; the command
//! loop keeps reading and can raise the stop flag mid-search.

use std::io::{self, BufRead};
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use log::warn;

use crate::board::{Move, Position};
use crate::san;
use crate::search::{Search, SearchEvent};
use crate::types::{MATE_THRESHOLD, Score, VERY_GOOD};

pub const ENGINE_NAME: &str = "pyrite";

pub fn run(search: Search) {
    let stdin = io::stdin();

    let mut pos = Position::default();
    let mut search: Option<Search> = Some(search);
    let mut stop_flag: Arc<AtomicBool> = Arc::new(AtomicBool::new(false));
    let mut worker: Option<thread::JoinHandle<Search>> = None;

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some(&command) = tokens.first() else { continue };

        match command {
            "uci" => {
                println!("id name {ENGINE_NAME}");
                println!("id author pyrite authors");
                println!("option name depth type spin default 5 min 1 max 32");
                println!("option name quiescentlimit type spin default 2 min 0 max 16");
                println!("option name mtdf type check default true");
                println!("option name debug type check default false");
                println!("uciok");
            }
            "isready" => {
                join_worker(&mut worker, &mut search);
                println!("readyok");
            }
            "ucinewgame" => {
                join_worker(&mut worker, &mut search);
                pos = Position::default();
                if let Some(s) = search.as_mut() {
                    s.reset();
                }
            }
            "position" => {
                join_worker(&mut worker, &mut search);
                if let Err(err) = parse_position(&tokens, &mut pos) {
                    warn!("dropping position command: {err}");
                }
            }
            "go" => {
                join_worker(&mut worker, &mut search);
                let params = parse_go(&tokens);

                let Some(mut s) = search.take() else {
                    warn!("search state lost; ignoring go");
                    continue;
                };
                if let Some(depth) = params.depth {
                    s.max_depth = depth.clamp(1, 32);
                }
                s.millis_available = params.movetime.unwrap_or(0);
                s.soft_deadline = false;

                let flag = s.stop_handle();
                flag.store(false, Ordering::SeqCst);
                stop_flag = flag;

                let mut worker_pos = pos.clone();
                worker = Some(thread::spawn(move || {
                    let best = s.alphabeta(&mut worker_pos, &mut print_info);
                    println!("bestmove {}", uci_move(best));
                    s
                }));
            }
            "stop" => {
                stop_flag.store(true, Ordering::SeqCst);
                join_worker(&mut worker, &mut search);
            }
            "setoption" => {
                join_worker(&mut worker, &mut search);
                if let Some(s) = search.as_mut() {
                    parse_setoption(&tokens, s);
                }
            }
            "quit" => {
                stop_flag.store(true, Ordering::SeqCst);
                join_worker(&mut worker, &mut search);
                break;
            }
            "d" | "print" => println!("{pos}"),
            other => warn!("ignoring unknown command: {other}"),
        }
    }
}

fn join_worker(worker: &mut Option<thread::JoinHandle<Search>>, search: &mut Option<Search>) {
    if let Some(handle) = worker.take() {
        if let Ok(s) = handle.join() {
            *search = Some(s);
        }
    }
}

fn print_info(event: SearchEvent) {
    match event {
        SearchEvent::Depth { depth, score, nodes, pv, elapsed, .. } => {
            let millis = elapsed.as_millis().max(1) as u64;
            let nps = nodes * 1000 / millis;
            let pv_str: Vec<String> = pv.iter().map(|m| uci_move(*m)).collect();
            println!(
                "info depth {} {} nodes {} nps {} time {} pv {}",
                depth,
                format_score(score),
                nodes,
                nps,
                millis,
                pv_str.join(" ")
            );
        }
        SearchEvent::CurrMove { mv, number } => {
            println!("info currmove {} currmovenumber {}", uci_move(mv), number);
        }
    }
}

fn uci_move(mv: Move) -> String {
    mv.to_string()
}

/// Centipawns, or `mate N` once inside the forced-mate band.
fn format_score(score: Score) -> String {
    if score.abs() > MATE_THRESHOLD {
        let plies = VERY_GOOD - score.abs();
        let moves = (plies + 1) / 2;
        if score > 0 {
            format!("score mate {moves}")
        } else {
            format!("score mate -{moves}")
        }
    } else {
        format!("score cp {score}")
    }
}

fn parse_position(tokens: &[&str], pos: &mut Position) -> Result<(), crate::error::Error> {
    let mut idx = 1;
    match tokens.get(idx) {
        Some(&"startpos") => {
            *pos = Position::default();
            idx += 1;
        }
        Some(&"fen") => {
            idx += 1;
            let mut fen_parts = Vec::new();
            while idx < tokens.len() && tokens[idx] != "moves" && fen_parts.len() < 6 {
                fen_parts.push(tokens[idx]);
                idx += 1;
            }
            *pos = Position::from_str(&fen_parts.join(" "))?;
        }
        _ => return Err(crate::error::Error::InvalidFen(tokens.join(" "))),
    }

    if tokens.get(idx) == Some(&"moves") {
        for token in &tokens[idx + 1..] {
            let mv = san::parse_move(pos, token)?;
            pos.apply(mv);
        }
    }
    Ok(())
}

struct GoParams {
    depth: Option<u8>,
    movetime: Option<u64>,
}

fn parse_go(tokens: &[&str]) -> GoParams {
    let mut params = GoParams { depth: None, movetime: None };
    let mut iter = tokens.iter().skip(1);
    while let Some(&token) = iter.next() {
        match token {
            "depth" => params.depth = iter.next().and_then(|v| v.parse().ok()),
            "movetime" => params.movetime = iter.next().and_then(|v| v.parse().ok()),
            "infinite" => params.movetime = None,
            _ => {}
        }
    }
    params
}

fn parse_setoption(tokens: &[&str], search: &mut Search) {
    let name_idx = tokens.iter().position(|&t| t == "name");
    let value_idx = tokens.iter().position(|&t| t == "value");
    let (Some(ni), Some(vi)) = (name_idx, value_idx) else {
        warn!("dropping malformed setoption: {}", tokens.join(" "));
        return;
    };
    let name = tokens[ni + 1..vi].join(" ").to_lowercase();
    let value = tokens[vi + 1..].join(" ");

    match name.as_str() {
        "depth" => {
            if let Ok(depth) = value.parse::<u8>() {
                search.max_depth = depth.clamp(1, 32);
            }
        }
        "quiescentlimit" => {
            if let Ok(limit) = value.parse::<u8>() {
                search.quiescent_depth = limit.min(16);
                search.use_quiescence = limit > 0;
            }
        }
        "mtdf" => search.use_mtdf = value == "true" || value == "1",
        "debug" => search.debug = value == "true" || value == "1",
        other => warn!("ignoring unknown option: {other}"),
    }
}

/// Used by tests to run a search synchronously the way `go` does.
#[cfg(test)]
fn search_once(search: &mut Search, pos: &mut Position, movetime: Option<u64>) -> Move {
    search.millis_available = movetime.unwrap_or(0);
    search.alphabeta(pos, &mut |_| {})
}
