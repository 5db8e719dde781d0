//! The N×N×N cube
//!
//! Stickers are stored face-major (`face * n * n + row * n + col`). Each face
//! is read as seen from outside the cube, row 0 at the top. A move is a
//! clockwise quarter-turn of one outer layer, applied through a gather table
//! built once per puzzle from the 3D position of every sticker.

use crate::error::{ParseError, PuzzleError};
use crate::puzzle::{Puzzle, check_move_id};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::fmt;
use std::str::FromStr;

/// Number of faces on a cube.
pub const NUM_FACES: usize = 6;

/// Largest supported edge length.
pub const MAX_CUBE_SIZE: usize = 16;

/// Sticker colours. The solved cube paints face `f` with `Color::ALL[f]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Yellow = 1,
    Red = 2,
    Orange = 3,
    Green = 4,
    Blue = 5,
}

impl Color {
    pub const ALL: [Color; NUM_FACES] = [
        Color::White,
        Color::Yellow,
        Color::Red,
        Color::Orange,
        Color::Green,
        Color::Blue,
    ];

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    pub fn index(self) -> usize {
        self as usize
    }

    /// Upper-case display name.
    pub fn name(self) -> &'static str {
        match self {
            Color::White => "WHITE",
            Color::Yellow => "YELLOW",
            Color::Red => "RED",
            Color::Orange => "ORANGE",
            Color::Green => "GREEN",
            Color::Blue => "BLUE",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = String;

    /// Accepts a digit `0`-`5` or a colour name in any case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<usize>() {
            return Color::from_index(index)
                .ok_or_else(|| format!("no colour with index {}", index));
        }
        match s.to_lowercase().as_str() {
            "white" | "w" => Ok(Color::White),
            "yellow" | "y" => Ok(Color::Yellow),
            "red" | "r" => Ok(Color::Red),
            "orange" | "o" => Ok(Color::Orange),
            "green" | "g" => Ok(Color::Green),
            "blue" | "b" => Ok(Color::Blue),
            _ => Err(format!("unknown colour '{}'", s)),
        }
    }
}

/// Display-only label attached to every move of a puzzle.
///
/// Even-sized cubes label their quarter-turns `RIGHT`, odd-sized ones `LEFT`.
/// Both denote the same clockwise turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RotationLabel {
    Right,
    Left,
}

impl RotationLabel {
    pub fn for_size(size: usize) -> Self {
        if size % 2 == 0 {
            RotationLabel::Right
        } else {
            RotationLabel::Left
        }
    }
}

impl fmt::Display for RotationLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RotationLabel::Right => f.write_str("RIGHT"),
            RotationLabel::Left => f.write_str("LEFT"),
        }
    }
}

/// Clockwise quarter-turn of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CubeMove {
    pub face: u8,
    pub label: RotationLabel,
}

impl fmt::Display for CubeMove {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Rotate face {} {}", self.face, self.label)
    }
}

/// A full sticker assignment for a cube of edge length `size`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CubeState {
    size: u8,
    cells: Box<[Color]>,
}

impl CubeState {
    /// The solved cube of edge length `size`.
    pub fn solved(size: usize) -> Result<Self, ParseError> {
        check_size(size)?;
        Ok(Self {
            size: size as u8,
            cells: solved_cells(size),
        })
    }

    pub fn size(&self) -> usize {
        self.size as usize
    }

    pub fn get(&self, face: usize, row: usize, col: usize) -> Color {
        let n = self.size();
        self.cells[face * n * n + row * n + col]
    }

    /// The stickers of one face, row-major.
    pub fn face(&self, face: usize) -> &[Color] {
        let n = self.size();
        &self.cells[face * n * n..(face + 1) * n * n]
    }

    pub fn is_solved(&self) -> bool {
        (0..NUM_FACES).all(|f| {
            let face = self.face(f);
            face.iter().all(|&c| c == face[0])
        })
    }
}

impl fmt::Display for CubeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.size();
        for face in 0..NUM_FACES {
            writeln!(f, "Face {}:", face)?;
            for row in 0..n {
                let names: Vec<&str> = (0..n).map(|col| self.get(face, row, col).name()).collect();
                writeln!(f, "{}", names.join(" "))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn solved_cells(size: usize) -> Box<[Color]> {
    (0..NUM_FACES * size * size)
        .map(|i| Color::ALL[i / (size * size)])
        .collect()
}

fn check_size(size: usize) -> Result<(), ParseError> {
    if (1..=MAX_CUBE_SIZE).contains(&size) {
        Ok(())
    } else {
        Err(ParseError::UnsupportedSize(size))
    }
}

// --- Geometry ---
//
// Coordinates are doubled so every cubie centre is an integer in
// `-(n-1)..=(n-1)` with step 2. A face is described by its outward normal and
// the directions of increasing column and row as seen from outside.

type Vec3 = [i32; 3];

struct FaceFrame {
    normal: Vec3,
    right: Vec3,
    down: Vec3,
}

const FRAMES: [FaceFrame; NUM_FACES] = [
    // Up
    FaceFrame {
        normal: [0, 1, 0],
        right: [1, 0, 0],
        down: [0, 0, 1],
    },
    // Down
    FaceFrame {
        normal: [0, -1, 0],
        right: [1, 0, 0],
        down: [0, 0, -1],
    },
    // Front
    FaceFrame {
        normal: [0, 0, 1],
        right: [1, 0, 0],
        down: [0, -1, 0],
    },
    // Back
    FaceFrame {
        normal: [0, 0, -1],
        right: [-1, 0, 0],
        down: [0, -1, 0],
    },
    // Left
    FaceFrame {
        normal: [-1, 0, 0],
        right: [0, 0, 1],
        down: [0, -1, 0],
    },
    // Right
    FaceFrame {
        normal: [1, 0, 0],
        right: [0, 0, -1],
        down: [0, -1, 0],
    },
];

fn dot(a: Vec3, b: Vec3) -> i32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

fn cross(a: Vec3, b: Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Rotate `v` a quarter-turn clockwise as seen looking down `axis` onto the cube.
fn rotate_clockwise(v: Vec3, axis: Vec3) -> Vec3 {
    let along = dot(v, axis);
    let c = cross(v, axis);
    [
        along * axis[0] + c[0],
        along * axis[1] + c[1],
        along * axis[2] + c[2],
    ]
}

fn sticker_position(n: i32, face: usize, row: i32, col: i32) -> Vec3 {
    let frame = &FRAMES[face];
    let a = 2 * col - (n - 1);
    let b = 2 * row - (n - 1);
    let mut pos = [0; 3];
    for axis in 0..3 {
        pos[axis] = frame.normal[axis] * (n - 1) + frame.right[axis] * a + frame.down[axis] * b;
    }
    pos
}

fn sticker_index(n: i32, pos: Vec3, normal: Vec3) -> usize {
    let face = FRAMES
        .iter()
        .position(|frame| frame.normal == normal)
        .expect("rotating an axis-aligned normal yields another face normal");
    let frame = &FRAMES[face];
    let col = (dot(pos, frame.right) + n - 1) / 2;
    let row = (dot(pos, frame.down) + n - 1) / 2;
    let n = n as usize;
    face * n * n + row as usize * n + col as usize
}

/// Build the gather table for a clockwise turn of `face`: `out[i] = in[table[i]]`.
fn build_turn(n: usize, face: usize) -> Box<[u32]> {
    let ni = n as i32;
    let axis = FRAMES[face].normal;
    let mut table: Vec<u32> = (0..(NUM_FACES * n * n) as u32).collect();
    for src_face in 0..NUM_FACES {
        for row in 0..ni {
            for col in 0..ni {
                let pos = sticker_position(ni, src_face, row, col);
                if dot(pos, axis) != ni - 1 {
                    continue;
                }
                let dest = sticker_index(
                    ni,
                    rotate_clockwise(pos, axis),
                    rotate_clockwise(FRAMES[src_face].normal, axis),
                );
                let src = src_face * n * n + row as usize * n + col as usize;
                table[dest] = src as u32;
            }
        }
    }
    table.into_boxed_slice()
}

/// The cube puzzle for one edge length.
#[derive(Debug, Clone)]
pub struct CubePuzzle {
    size: usize,
    turns: Vec<Box<[u32]>>,
}

impl CubePuzzle {
    pub fn new(size: usize) -> Result<Self, ParseError> {
        check_size(size)?;
        let turns = (0..NUM_FACES).map(|face| build_turn(size, face)).collect();
        Ok(Self { size, turns })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn solved_state(&self) -> CubeState {
        CubeState {
            size: self.size as u8,
            cells: solved_cells(self.size),
        }
    }

    pub fn face_move(&self, face: u8) -> Result<CubeMove, PuzzleError> {
        check_move_id(face as u32, NUM_FACES as u32)?;
        Ok(CubeMove {
            face,
            label: RotationLabel::for_size(self.size),
        })
    }

    /// Apply face turns, given by id, to the solved cube.
    pub fn scramble(&self, faces: &[u32]) -> Result<CubeState, PuzzleError> {
        let moves = faces
            .iter()
            .map(|&id| self.move_from_id(id))
            .collect::<Result<Vec<_>, _>>()?;
        self.apply_path(&self.solved_state(), &moves)
    }

    /// Parse a scramble such as `"0 3 5"` or `"0,3,5"` into face ids.
    pub fn parse_scramble(&self, text: &str) -> Result<Vec<u32>, ParseError> {
        text.split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
            .map(|token| match token.parse::<u32>() {
                Ok(id) if (id as usize) < NUM_FACES => Ok(id),
                _ => Err(ParseError::BadMove(token.to_string())),
            })
            .collect()
    }

    /// Apply `length` random face turns to the solved cube.
    ///
    /// The same seed always produces the same scramble.
    pub fn random_scramble(&self, length: usize, seed: u64) -> (CubeState, Vec<CubeMove>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut state = self.solved_state();
        let mut moves = Vec::with_capacity(length);
        for _ in 0..length {
            let mv = CubeMove {
                face: rng.random_range(0..NUM_FACES as u8),
                label: RotationLabel::for_size(self.size),
            };
            state = self.turn(&state, mv.face as usize);
            moves.push(mv);
        }
        (state, moves)
    }

    /// Parse a cube from text: `6 * size` rows of `size` colours each.
    ///
    /// Colours are digits `0`-`5` or names. Blank lines, `#` comments and
    /// `Face N:` headers are skipped, so rendered cubes read back verbatim.
    pub fn parse_state(&self, text: &str) -> Result<CubeState, ParseError> {
        let n = self.size;
        let mut cells = Vec::with_capacity(NUM_FACES * n * n);
        let mut rows = 0;

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.split('#').next().unwrap_or("").trim();
            if line.is_empty() || line.to_lowercase().starts_with("face") {
                continue;
            }
            let tokens: Vec<&str> = line
                .split(|c: char| c.is_whitespace() || c == ',')
                .filter(|t| !t.is_empty())
                .collect();
            if tokens.len() != n {
                return Err(ParseError::RowLength {
                    line: line_no + 1,
                    expected: n,
                    found: tokens.len(),
                });
            }
            for token in tokens {
                let color = token.parse::<Color>().map_err(|_| ParseError::UnknownColor {
                    token: token.to_string(),
                    line: line_no + 1,
                })?;
                cells.push(color);
            }
            rows += 1;
        }

        if rows != NUM_FACES * n {
            return Err(ParseError::RowCount {
                expected: NUM_FACES * n,
                found: rows,
            });
        }

        Ok(CubeState {
            size: n as u8,
            cells: cells.into_boxed_slice(),
        })
    }

    fn turn(&self, state: &CubeState, face: usize) -> CubeState {
        let table = &self.turns[face];
        CubeState {
            size: state.size,
            cells: table.iter().map(|&src| state.cells[src as usize]).collect(),
        }
    }
}

impl Puzzle for CubePuzzle {
    type State = CubeState;
    type Move = CubeMove;

    fn move_count(&self) -> u32 {
        NUM_FACES as u32
    }

    /// Every face may always be turned.
    fn legal_moves(&self, _state: &CubeState) -> Vec<CubeMove> {
        let label = RotationLabel::for_size(self.size);
        (0..NUM_FACES as u8)
            .map(|face| CubeMove { face, label })
            .collect()
    }

    fn apply(&self, state: &CubeState, mv: CubeMove) -> Result<CubeState, PuzzleError> {
        check_move_id(mv.face as u32, NUM_FACES as u32)?;
        if state.size() != self.size {
            return Err(PuzzleError::ShapeMismatch(format!(
                "state is {0}x{0}x{0}, puzzle is {1}x{1}x{1}",
                state.size(),
                self.size
            )));
        }
        Ok(self.turn(state, mv.face as usize))
    }

    fn is_solved(&self, state: &CubeState) -> bool {
        state.is_solved()
    }

    fn move_id(&self, mv: CubeMove) -> u32 {
        mv.face as u32
    }

    fn move_from_id(&self, id: u32) -> Result<CubeMove, PuzzleError> {
        check_move_id(id, NUM_FACES as u32)?;
        self.face_move(id as u8)
    }
}
