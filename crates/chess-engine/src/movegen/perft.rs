//! Perft: leaf counts of the legal move tree, for checking the generator
//! against published numbers.

use super::generate_legal;
use crate::Position;

/// Number of leaf nodes `depth` plies below `position`.
pub fn perft(position: &Position, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }

    let moves = generate_legal(position);
    if depth == 1 {
        return moves.len() as u64;
    }

    moves
        .as_slice()
        .iter()
        .map(|m| perft(&position.make_move(*m), depth - 1))
        .sum()
}

/// Perft split by root move, sorted by UCI text. Handy for locating the
/// move whose subtree disagrees with a reference engine.
pub fn perft_divide(position: &Position, depth: u32) -> Vec<(String, u64)> {
    let mut results: Vec<(String, u64)> = generate_legal(position)
        .into_iter()
        .map(|m| {
            let nodes = perft(&position.make_move(m), depth.saturating_sub(1));
            (m.to_uci(), nodes)
        })
        .collect();
    results.sort_by(|a, b| a.0.cmp(&b.0));
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    const KIWIPETE: &str = "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1";
    const POSITION_3: &str = "8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1";
    const POSITION_4: &str = "r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1";
    const POSITION_5: &str = "rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8";

    fn check(fen: &str, expected: &[u64]) {
        let position = Position::from_fen(fen).unwrap();
        for (depth, &nodes) in expected.iter().enumerate() {
            assert_eq!(perft(&position, depth as u32 + 1), nodes, "{} depth {}", fen, depth + 1);
        }
    }

    #[test]
    fn startpos() {
        check(
            "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
            &[20, 400, 8902, 197_281],
        );
    }

    #[test]
    #[ignore]
    fn startpos_depth_5() {
        assert_eq!(perft(&Position::startpos(), 5), 4_865_609);
    }

    #[test]
    fn kiwipete() {
        check(KIWIPETE, &[48, 2039, 97_862]);
    }

    #[test]
    fn position_3_checks_and_en_passant() {
        check(POSITION_3, &[14, 191, 2812]);
    }

    #[test]
    fn position_4_promotions() {
        check(POSITION_4, &[6, 264, 9467]);
    }

    #[test]
    fn position_5() {
        check(POSITION_5, &[44, 1486, 62_379]);
    }

    #[test]
    fn divide_sums_to_perft() {
        let position = Position::from_fen(KIWIPETE).unwrap();
        let results = perft_divide(&position, 2);
        assert_eq!(results.len(), 48);
        assert_eq!(results.iter().map(|(_, n)| n).sum::<u64>(), 2039);
        assert!(results.windows(2).all(|w| w[0].0 <= w[1].0));
        assert!(results.iter().any(|(m, _)| m == "e1g1"));
    }

    #[test]
    fn depth_zero_is_one() {
        assert_eq!(perft(&Position::startpos(), 0), 1);
    }
}
