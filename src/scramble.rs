//! Random scramble sequences, one per puzzle type.
//!
//! The rest of the app treats the output as an opaque string; the only
//! structural rule enforced here is that two consecutive moves never
//! turn the same face.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::solve::PuzzleType;

struct MoveSet {
    faces: &'static [&'static str],
    modifiers: &'static [&'static str],
    tips: &'static [&'static str],
    length: usize,
}

const BIG_CUBE_FACES: &[&str] = &[
    "R", "L", "U", "D", "F", "B", "Rw", "Lw", "Uw", "Dw", "Fw", "Bw",
];

fn move_set(puzzle: PuzzleType) -> MoveSet {
    match puzzle {
        PuzzleType::TwoByTwo => MoveSet {
            faces: &["R", "U", "F"],
            modifiers: &["", "'", "2"],
            tips: &[],
            length: 9,
        },
        PuzzleType::ThreeByThree => MoveSet {
            faces: &["R", "L", "U", "D", "F", "B"],
            modifiers: &["", "'", "2"],
            tips: &[],
            length: 20,
        },
        PuzzleType::FourByFour => MoveSet {
            faces: BIG_CUBE_FACES,
            modifiers: &["", "'", "2"],
            tips: &[],
            length: 45,
        },
        PuzzleType::FiveByFive => MoveSet {
            faces: BIG_CUBE_FACES,
            modifiers: &["", "'", "2"],
            tips: &[],
            length: 60,
        },
        PuzzleType::Pyraminx => MoveSet {
            faces: &["R", "L", "U", "B"],
            modifiers: &["", "'"],
            tips: &["r", "l", "u", "b"],
            length: 10,
        },
    }
}

/// Generate a fresh scramble for `puzzle`.
pub fn generate(puzzle: PuzzleType) -> String {
    let set = move_set(puzzle);
    let mut rng = rand::thread_rng();
    let mut moves: Vec<String> = Vec::with_capacity(set.length + set.tips.len());
    let mut last_face = "";

    while moves.len() < set.length {
        let face = set.faces.choose(&mut rng).unwrap();
        if face.chars().next() == last_face.chars().next() {
            continue;
        }
        let modifier = set.modifiers.choose(&mut rng).unwrap();
        moves.push(format!("{face}{modifier}"));
        last_face = face;
    }

    // Pyraminx finishes with 0..=3 small tip turns.
    if !set.tips.is_empty() {
        let mut tips = set.tips.to_vec();
        tips.shuffle(&mut rng);
        let count = rng.gen_range(0..=3);
        for tip in tips.into_iter().take(count) {
            let modifier = if rng.gen_bool(0.5) { "'" } else { "" };
            moves.push(format!("{tip}{modifier}"));
        }
    }

    moves.join(" ")
}
