//! Exhaustive tests of move selection over every reachable position.

use inkplay_engine::{
    Board, EngineError, HeuristicStrategy, MinimaxStrategy, Position, SearchCache, Strategy,
    StrategyKind, Symbol, SymbolPair, audit_heuristic, is_full, winner,
};
use std::collections::HashSet;

/// Every reachable non-terminal board with the symbol to move.
fn reachable_positions() -> Vec<(Board, Symbol)> {
    fn walk(board: Board, to_move: Symbol, seen: &mut HashSet<(Board, Symbol)>) {
        if winner(&board).is_some() || is_full(&board) {
            return;
        }
        if !seen.insert((board, to_move)) {
            return;
        }
        for position in board.empty_positions() {
            walk(board.placed(position, to_move), to_move.opponent(), seen);
        }
    }

    let mut seen = HashSet::new();
    for first in [Symbol::X, Symbol::O] {
        walk(Board::new(), first, &mut seen);
    }
    let mut positions: Vec<_> = seen.into_iter().collect();
    positions.sort_by_key(|(board, symbol)| (board.key(), *symbol));
    positions
}

/// Plain minimax without pruning or memoization, scored `10 - depth` where
/// depth counts the moves played after the machine's candidate move.
fn reference_score(board: &Board, to_move: Symbol, ai: Symbol, depth: i32) -> i32 {
    if let Some(symbol) = winner(board) {
        return if symbol == ai { 10 - depth } else { depth - 10 };
    }
    if is_full(board) {
        return 0;
    }
    let scores = board.empty_positions().into_iter().map(|position| {
        reference_score(
            &board.placed(position, to_move),
            to_move.opponent(),
            ai,
            depth + 1,
        )
    });
    if to_move == ai {
        scores.max().unwrap()
    } else {
        scores.min().unwrap()
    }
}

fn reference_move_scores(board: &Board, symbols: SymbolPair) -> Vec<(Position, i32)> {
    board
        .empty_positions()
        .into_iter()
        .map(|position| {
            let child = board.placed(position, symbols.ai());
            let score = reference_score(&child, symbols.human(), symbols.ai(), 0);
            (position, score)
        })
        .collect()
}

#[test]
fn test_search_matches_unpruned_minimax_everywhere() {
    let strategy = MinimaxStrategy::new();
    for (board, to_move) in reachable_positions() {
        let symbols = SymbolPair::for_ai(to_move);
        let reference = reference_move_scores(&board, symbols);
        let best_score = reference.iter().map(|(_, s)| *s).max().unwrap();

        let mut evaluated = strategy.evaluate_moves(&board, symbols).unwrap();
        evaluated.sort_by_key(|m| m.position);
        let evaluated: Vec<_> = evaluated.iter().map(|m| (m.position, m.score)).collect();
        assert_eq!(evaluated, reference, "board {board} ai {to_move}");

        let chosen = strategy.best_move(&board, symbols).unwrap();
        let chosen_score = reference
            .iter()
            .find(|(p, _)| *p == chosen)
            .map(|(_, s)| *s)
            .unwrap();
        assert_eq!(chosen_score, best_score, "board {board} ai {to_move} chose {chosen}");
        if best_score >= 0 {
            assert!(chosen_score >= 0, "losing move on {board}");
        }
    }
}

#[test]
fn test_best_move_is_idempotent_and_cache_independent() {
    let warmed = MinimaxStrategy::with_cache(SearchCache::new());
    warmed.warm_up();
    for (board, to_move) in reachable_positions().into_iter().step_by(7) {
        let symbols = SymbolPair::for_ai(to_move);
        let cold = MinimaxStrategy::new();
        let first = cold.best_move(&board, symbols).unwrap();
        assert_eq!(cold.best_move(&board, symbols).unwrap(), first);
        assert_eq!(warmed.best_move(&board, symbols).unwrap(), first, "{board}");
    }
}

#[test]
fn test_documented_positions() {
    let strategy = MinimaxStrategy::new();
    let ai_o = SymbolPair::for_ai(Symbol::O);

    assert_eq!(strategy.best_move(&Board::new(), ai_o), Ok(Position::Center));

    let board = Board::from_notation("OO.|XX.|...").unwrap();
    assert_eq!(strategy.best_move(&board, ai_o), Ok(Position::TopRight));

    let board = Board::from_notation("XX.|OO.|...").unwrap();
    let chosen = strategy.best_move(&board, ai_o).unwrap();
    assert!(
        [Position::TopRight, Position::MiddleRight].contains(&chosen),
        "{chosen}"
    );
}

#[test]
fn test_full_and_won_boards_are_refused() {
    let ai_o = SymbolPair::for_ai(Symbol::O);
    let full = Board::from_notation("XOX|OXX|OXO").unwrap();
    let won = Board::from_notation("XXX|OO.|...").unwrap();

    for kind in [StrategyKind::Minimax, StrategyKind::Heuristic] {
        let strategy = kind.build(SearchCache::new());
        assert_eq!(strategy.best_move(&full, ai_o), Err(EngineError::NoLegalMove));
        assert!(matches!(
            strategy.best_move(&won, ai_o),
            Err(EngineError::IllegalState(_))
        ));
    }
}

/// Plays the heuristic against every possible sequence of human replies.
fn heuristic_losses(board: Board, to_move: Symbol, symbols: SymbolPair) -> usize {
    if let Some(symbol) = winner(&board) {
        return usize::from(symbol == symbols.human());
    }
    if is_full(&board) {
        return 0;
    }
    if to_move == symbols.ai() {
        let position = HeuristicStrategy::new().best_move(&board, symbols).unwrap();
        heuristic_losses(board.placed(position, to_move), to_move.opponent(), symbols)
    } else {
        board
            .empty_positions()
            .into_iter()
            .map(|p| heuristic_losses(board.placed(p, to_move), to_move.opponent(), symbols))
            .sum()
    }
}

#[test]
fn test_heuristic_never_loses() {
    for ai in [Symbol::X, Symbol::O] {
        let symbols = SymbolPair::for_ai(ai);
        for first in [ai, ai.opponent()] {
            assert_eq!(
                heuristic_losses(Board::new(), first, symbols),
                0,
                "ai {ai} first {first}"
            );
        }
    }
}

#[test]
fn test_heuristic_audit_finds_no_losing_choice_in_its_own_games() {
    let search = MinimaxStrategy::new();
    let symbols = SymbolPair::for_ai(Symbol::O);
    let heuristic = HeuristicStrategy::new();

    let mut frontier = vec![(Board::new(), Symbol::X), (Board::new(), Symbol::O)];
    while let Some((board, to_move)) = frontier.pop() {
        if winner(&board).is_some() || is_full(&board) {
            continue;
        }
        if to_move == symbols.ai() {
            if let Some(divergence) = audit_heuristic(&board, symbols, &search).unwrap() {
                assert!(!divergence.loses(), "{divergence:?}");
            }
            let position = heuristic.best_move(&board, symbols).unwrap();
            frontier.push((board.placed(position, to_move), to_move.opponent()));
        } else {
            for position in board.empty_positions() {
                frontier.push((board.placed(position, to_move), to_move.opponent()));
            }
        }
    }
}

#[test]
fn test_strategy_kind_deserializes_from_config_values() {
    let kind: StrategyKind = serde_json::from_str("\"heuristic\"").unwrap();
    assert_eq!(kind, StrategyKind::Heuristic);
    assert_eq!(StrategyKind::default(), StrategyKind::Minimax);
    assert_eq!(kind.build(SearchCache::new()).name(), "heuristic");
}
