use std::time::{Duration, Instant};

use crate::schedule::{PLACEHOLDER_PASSAGE, STAGES_PER_DAY};

#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Input {
    pub char: char,
    pub outcome: Outcome,
}

/// What a keystroke did to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Typing,
    StageComplete { next: usize },
    Finished,
    Ignored,
}

/// Typing state of one pass over the day's three passages.
///
/// The stopwatch starts on the first keystroke of the first stage and stops
/// when the last character of the last stage is typed correctly. A stage only
/// advances once every character matches; mistakes must be erased.
#[derive(Debug, Clone)]
pub struct DailyRun {
    passages: [Vec<char>; STAGES_PER_DAY],
    stage: usize,
    input: Vec<Input>,
    started_at: Option<Instant>,
    finished_at: Option<Instant>,
    mistakes: usize,
}

impl DailyRun {
    pub fn new(passages: &[String; STAGES_PER_DAY]) -> Self {
        Self {
            passages: passages.clone().map(|p| {
                if p.is_empty() {
                    PLACEHOLDER_PASSAGE.chars().collect()
                } else {
                    p.chars().collect()
                }
            }),
            stage: 0,
            input: Vec::new(),
            started_at: None,
            finished_at: None,
            mistakes: 0,
        }
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn passage(&self, stage: usize) -> &[char] {
        &self.passages[stage.min(STAGES_PER_DAY - 1)]
    }

    pub fn current_passage(&self) -> &[char] {
        self.passage(self.stage)
    }

    pub fn input(&self) -> &[Input] {
        &self.input
    }

    pub fn cursor_pos(&self) -> usize {
        self.input.len()
    }

    pub fn mistakes(&self) -> usize {
        self.mistakes
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    pub fn has_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Sum of all three passages' lengths in characters.
    pub fn characters(&self) -> usize {
        self.passages.iter().map(Vec::len).sum()
    }

    pub fn elapsed(&self) -> Duration {
        match (self.started_at, self.finished_at) {
            (Some(start), Some(end)) => end.duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        }
    }

    fn stage_complete(&self) -> bool {
        let passage = self.current_passage();
        self.input.len() == passage.len()
            && self.input.iter().all(|i| i.outcome == Outcome::Correct)
    }

    pub fn write(&mut self, c: char) -> Progress {
        self.write_at(c, Instant::now())
    }

    /// [`write`](Self::write) with an explicit clock reading.
    pub fn write_at(&mut self, c: char, now: Instant) -> Progress {
        if self.has_finished() || self.input.len() >= self.current_passage().len() {
            return Progress::Ignored;
        }
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }

        let expected = self.current_passage()[self.input.len()];
        let outcome = if c == expected {
            Outcome::Correct
        } else {
            self.mistakes += 1;
            Outcome::Incorrect
        };
        self.input.push(Input { char: c, outcome });

        if !self.stage_complete() {
            return Progress::Typing;
        }
        if self.stage + 1 == STAGES_PER_DAY {
            self.finished_at = Some(now);
            Progress::Finished
        } else {
            self.stage += 1;
            self.input.clear();
            Progress::StageComplete { next: self.stage }
        }
    }

    pub fn backspace(&mut self) {
        if !self.has_finished() {
            self.input.pop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages(a: &str, b: &str, c: &str) -> [String; STAGES_PER_DAY] {
        [a.to_string(), b.to_string(), c.to_string()]
    }

    fn type_str(run: &mut DailyRun, s: &str) -> Progress {
        let mut last = Progress::Ignored;
        for c in s.chars() {
            last = run.write(c);
        }
        last
    }

    #[test]
    fn test_new_run() {
        let run = DailyRun::new(&passages("ab", "cde", "f"));
        assert_eq!(run.stage(), 0);
        assert_eq!(run.characters(), 6);
        assert!(!run.has_started());
        assert!(!run.has_finished());
        assert_eq!(run.elapsed(), Duration::ZERO);
    }

    #[test]
    fn test_full_run_advances_stages() {
        let mut run = DailyRun::new(&passages("ab", "cd", "ef"));
        assert_eq!(run.write('a'), Progress::Typing);
        assert!(run.has_started());
        assert_eq!(run.write('b'), Progress::StageComplete { next: 1 });
        assert_eq!(run.cursor_pos(), 0);
        assert_eq!(type_str(&mut run, "cd"), Progress::StageComplete { next: 2 });
        assert_eq!(type_str(&mut run, "ef"), Progress::Finished);
        assert!(run.has_finished());
        assert_eq!(run.write('x'), Progress::Ignored);
    }

    #[test]
    fn test_mistake_blocks_stage_until_erased() {
        let mut run = DailyRun::new(&passages("ab", "c", "d"));
        run.write('a');
        assert_eq!(run.write('x'), Progress::Typing);
        assert_eq!(run.input()[1].outcome, Outcome::Incorrect);
        // full length but wrong: further keys are ignored
        assert_eq!(run.write('b'), Progress::Ignored);
        run.backspace();
        assert_eq!(run.write('b'), Progress::StageComplete { next: 1 });
        assert_eq!(run.mistakes(), 1);
    }

    #[test]
    fn test_backspace_at_start_is_noop() {
        let mut run = DailyRun::new(&passages("a", "b", "c"));
        run.backspace();
        assert_eq!(run.cursor_pos(), 0);
    }

    #[test]
    fn test_stopwatch_spans_first_key_to_last() {
        let mut run = DailyRun::new(&passages("a", "b", "c"));
        let t0 = Instant::now();
        run.write_at('a', t0);
        run.write_at('b', t0 + Duration::from_secs(3));
        run.write_at('c', t0 + Duration::from_millis(7_500));
        assert!(run.has_finished());
        assert_eq!(run.elapsed(), Duration::from_millis(7_500));
    }

    #[test]
    fn test_multibyte_passages_count_chars() {
        let mut run = DailyRun::new(&passages("시작", "반", "다"));
        assert_eq!(run.characters(), 4);
        assert_eq!(type_str(&mut run, "시작"), Progress::StageComplete { next: 1 });
    }

    #[test]
    fn test_empty_passage_replaced_by_placeholder() {
        let run = DailyRun::new(&passages("", "b", "c"));
        assert_eq!(run.passage(0).len(), PLACEHOLDER_PASSAGE.chars().count());
    }

    #[test]
    fn test_backspace_after_finish_keeps_result() {
        let mut run = DailyRun::new(&passages("a", "b", "c"));
        type_str(&mut run, "abc");
        run.backspace();
        assert!(run.has_finished());
        assert_eq!(run.input().len(), 1);
    }
}
