use rand::Rng;
use serde::{Deserialize, Serialize};

/// Questions asked in one game before the score is submitted.
pub const QUESTIONS_PER_GAME: usize = 10;

/// Points for the fastest correct answer.
pub const MAX_POINTS_PER_QUESTION: u64 = 100;
/// Points for a correct answer, however slow.
pub const MIN_POINTS_PER_QUESTION: u64 = 10;

const MIN_M: u32 = 2;
const MAX_M: u32 = 40;
const MIN_HYPOTENUSE: u32 = 10;
const MAX_HYPOTENUSE: u32 = 600;

/// Primitive triples everyone knows by heart; neither they nor their
/// multiples are asked.
const EXCLUDED_PRIMITIVES: [(u32, u32, u32); 3] = [(3, 4, 5), (5, 12, 13), (7, 24, 25)];

/// A question: legs `a` and `b` are shown, the player answers `c`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PythagoreanTriple {
    pub a: u32,
    pub b: u32,
    pub c: u32,
}

impl PythagoreanTriple {
    /// Euclid's formula for `m > n >= 1`. `swap_legs` puts the even leg first.
    pub fn from_euclid(m: u32, n: u32, swap_legs: bool) -> Self {
        let odd_leg = m * m - n * n;
        let even_leg = 2 * m * n;
        let c = m * m + n * n;
        let (a, b) = if swap_legs {
            (even_leg, odd_leg)
        } else {
            (odd_leg, even_leg)
        };
        Self { a, b, c }
    }

    pub fn is_right_triangle(&self) -> bool {
        u64::from(self.a).pow(2) + u64::from(self.b).pow(2) == u64::from(self.c).pow(2)
    }

    /// The triple divided through by its common divisor.
    pub fn primitive(&self) -> Self {
        let d = gcd(self.a, gcd(self.b, self.c)).max(1);
        Self {
            a: self.a / d,
            b: self.b / d,
            c: self.c / d,
        }
    }

    fn is_excluded(&self) -> bool {
        let p = self.primitive();
        let (short, long) = (p.a.min(p.b), p.a.max(p.b));
        EXCLUDED_PRIMITIVES.contains(&(short, long, p.c))
    }

    /// Whether this triple may be asked.
    pub fn is_playable(&self) -> bool {
        !self.is_excluded() && (MIN_HYPOTENUSE..=MAX_HYPOTENUSE).contains(&self.c)
    }

    pub fn check(&self, answer: u32) -> bool {
        answer == self.c
    }
}

pub fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Draw triples until a playable one comes up.
pub fn generate_triple<R: Rng + ?Sized>(rng: &mut R) -> PythagoreanTriple {
    loop {
        let m = rng.random_range(MIN_M..=MAX_M);
        let n = rng.random_range(1..m);
        let triple = PythagoreanTriple::from_euclid(m, n, rng.random_bool(0.5));
        if triple.is_playable() {
            return triple;
        }
    }
}

/// Result of answering the current question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    Correct { awarded: u64 },
    Incorrect { expected: u32 },
    /// The game had already ended; nothing changed.
    GameOver,
}

/// One game: [`QUESTIONS_PER_GAME`] questions, a running score, and the
/// final score once the last question is answered or the game is stopped.
#[derive(Debug)]
pub struct QuizSession<R> {
    rng: R,
    current: PythagoreanTriple,
    question: usize,
    score: u64,
    finished: bool,
}

impl<R: Rng> QuizSession<R> {
    /// Start a game with its first question drawn.
    pub fn new(mut rng: R) -> Self {
        let current = generate_triple(&mut rng);
        Self {
            rng,
            current,
            question: 1,
            score: 0,
            finished: false,
        }
    }

    /// Answer the current question with hypotenuse `c`. A correct answer
    /// earns `points`, clamped to the per-question range; either way the
    /// game moves on to the next question or ends after the last one.
    pub fn answer(&mut self, c: u32, points: u64) -> AnswerOutcome {
        if self.finished {
            return AnswerOutcome::GameOver;
        }

        let outcome = if self.current.check(c) {
            let awarded = points.clamp(MIN_POINTS_PER_QUESTION, MAX_POINTS_PER_QUESTION);
            self.score += awarded;
            AnswerOutcome::Correct { awarded }
        } else {
            AnswerOutcome::Incorrect {
                expected: self.current.c,
            }
        };

        if self.question >= QUESTIONS_PER_GAME {
            self.finished = true;
        } else {
            self.question += 1;
            self.current = generate_triple(&mut self.rng);
        }
        outcome
    }
}

impl<R> QuizSession<R> {
    /// The question being asked, or `None` once the game is over.
    pub fn current(&self) -> Option<&PythagoreanTriple> {
        (!self.finished).then_some(&self.current)
    }

    /// 1-based number of the current question, never above
    /// [`QUESTIONS_PER_GAME`].
    pub fn question_number(&self) -> usize {
        self.question
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// End the game early, keeping the points earned so far.
    pub fn stop(&mut self) {
        self.finished = true;
    }

    /// The score to submit, available once the game has ended.
    pub fn final_score(&self) -> Option<u64> {
        self.finished.then_some(self.score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn euclid_produces_right_triangles() {
        let t = PythagoreanTriple::from_euclid(4, 1, false);
        assert_eq!(t, PythagoreanTriple { a: 15, b: 8, c: 17 });
        assert!(t.is_right_triangle());

        let swapped = PythagoreanTriple::from_euclid(4, 1, true);
        assert_eq!((swapped.a, swapped.b), (8, 15));
    }

    #[test]
    fn famous_families_are_excluded() {
        // 6-8-10 is a multiple of 3-4-5
        let t = PythagoreanTriple::from_euclid(3, 1, false);
        assert_eq!(t, PythagoreanTriple { a: 8, b: 6, c: 10 });
        assert!(!t.is_playable());

        // 5-12-13 in either leg order
        assert!(!PythagoreanTriple::from_euclid(3, 2, false).is_playable());
        assert!(!PythagoreanTriple::from_euclid(3, 2, true).is_playable());

        // 7-24-25
        assert!(!PythagoreanTriple::from_euclid(4, 3, false).is_playable());

        assert!(PythagoreanTriple::from_euclid(4, 1, false).is_playable());
    }

    #[test]
    fn hypotenuse_bounds() {
        // 2,1 -> 3-4-5, too small and excluded anyway
        assert!(!PythagoreanTriple::from_euclid(2, 1, false).is_playable());
        // 40,39 -> c = 3121
        assert!(!PythagoreanTriple::from_euclid(40, 39, false).is_playable());
    }

    #[test]
    fn check_compares_hypotenuse() {
        let t = PythagoreanTriple::from_euclid(5, 2, false);
        assert!(t.check(29));
        assert!(!t.check(28));
    }

    #[test]
    fn gcd_basics() {
        assert_eq!(gcd(12, 18), 6);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(17, 5), 1);
    }

    fn session(seed: u64) -> QuizSession<StdRng> {
        QuizSession::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn session_ends_after_the_last_question() {
        let mut game = session(7);
        for n in 1..=QUESTIONS_PER_GAME {
            assert!(!game.is_finished());
            assert_eq!(game.question_number(), n);
            let c = game.current().unwrap().c;
            assert_eq!(
                game.answer(c, MAX_POINTS_PER_QUESTION),
                AnswerOutcome::Correct {
                    awarded: MAX_POINTS_PER_QUESTION
                }
            );
        }
        assert!(game.is_finished());
        assert!(game.current().is_none());
        assert_eq!(game.question_number(), QUESTIONS_PER_GAME);
        assert_eq!(
            game.final_score(),
            Some(MAX_POINTS_PER_QUESTION * QUESTIONS_PER_GAME as u64)
        );
        assert_eq!(game.answer(1, 50), AnswerOutcome::GameOver);
    }

    #[test]
    fn wrong_answers_score_nothing_but_advance() {
        let mut game = session(11);
        let expected = game.current().unwrap().c;
        assert_eq!(
            game.answer(expected + 1, 80),
            AnswerOutcome::Incorrect { expected }
        );
        assert_eq!(game.score(), 0);
        assert_eq!(game.question_number(), 2);
    }

    #[test]
    fn points_are_clamped_to_the_question_range() {
        let mut game = session(3);
        let c = game.current().unwrap().c;
        assert_eq!(game.answer(c, 0), AnswerOutcome::Correct { awarded: 10 });
        let c = game.current().unwrap().c;
        assert_eq!(game.answer(c, 5000), AnswerOutcome::Correct { awarded: 100 });
        let c = game.current().unwrap().c;
        assert_eq!(game.answer(c, 55), AnswerOutcome::Correct { awarded: 55 });
        assert_eq!(game.score(), 165);
    }

    #[test]
    fn stopping_early_keeps_points() {
        let mut game = session(5);
        let c = game.current().unwrap().c;
        game.answer(c, 70);
        assert_eq!(game.final_score(), None);
        game.stop();
        assert_eq!(game.final_score(), Some(70));
        assert_eq!(game.answer(c, 70), AnswerOutcome::GameOver);
    }

    #[test]
    fn same_seed_asks_the_same_questions() {
        let mut a = session(42);
        let mut b = session(42);
        while let (Some(qa), Some(qb)) = (a.current().copied(), b.current().copied()) {
            assert_eq!(qa, qb);
            a.answer(qa.c, 10);
            b.answer(qb.c, 10);
        }
        assert!(a.is_finished() && b.is_finished());
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn generated_triples_are_playable(seed in any::<u64>()) {
                let mut rng = StdRng::seed_from_u64(seed);
                for _ in 0..QUESTIONS_PER_GAME {
                    let t = generate_triple(&mut rng);
                    prop_assert!(t.is_right_triangle());
                    prop_assert!(t.is_playable());
                }
            }

            #[test]
            fn session_score_stays_within_bounds(seed in any::<u64>(), answers in proptest::collection::vec((any::<bool>(), 0u64..200), QUESTIONS_PER_GAME)) {
                let mut game = session(seed);
                for (right, points) in answers {
                    let c = game.current().unwrap().c;
                    game.answer(if right { c } else { c + 1 }, points);
                }
                prop_assert!(game.is_finished());
                let score = game.final_score().unwrap();
                prop_assert!(score <= MAX_POINTS_PER_QUESTION * QUESTIONS_PER_GAME as u64);
            }

            #[test]
            fn euclid_is_always_right(m in 2u32..=40, n_frac in 0.0f64..1.0, swap in proptest::bool::ANY) {
                let n = 1 + ((f64::from(m - 1) * n_frac) as u32).min(m - 2);
                let t = PythagoreanTriple::from_euclid(m, n, swap);
                prop_assert!(t.is_right_triangle());
            }
        }
    }
}
