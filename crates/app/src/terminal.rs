//! Line-oriented presentation of questions, plan and feedback.

use std::io::{self, BufRead, Write};

use quiz_core::matching::{MatchingBoard, TileSelection, TileSide};
use quiz_core::model::{AnswerOutcome, PlanStatus, QuestionFormat, StudyPlan};
use quiz_core::scoring::AnswerScorer;
use services::{AnswerResult, PresentedQuestion, QuestionBank, RoundSession};

/// What the learner did with a question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reply {
    Answered(AnswerOutcome),
    Quit,
}

pub struct Terminal<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Terminal<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Print `label` and read one trimmed line; `None` on end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_owned()))
    }

    fn is_quit(line: &str) -> bool {
        matches!(line, "q" | "quit" | ":q")
    }

    // ─── PLAN ────────────────────────────────────────────────────────────────

    pub fn show_plan(&mut self, plan: &StudyPlan) -> io::Result<()> {
        writeln!(self.output, "{} · {}", plan.course, plan.goal)?;
        for entry in &plan.entries {
            let marker = match entry.status {
                PlanStatus::Completed => "✓",
                PlanStatus::Current => "▶",
                PlanStatus::Upcoming => " ",
            };
            write!(
                self.output,
                "  {marker} Round {}: {}",
                entry.round_number, entry.concept
            )?;
            if entry.status == PlanStatus::Current && entry.size > 0 {
                write!(self.output, " ({}/{})", entry.progress, entry.size)?;
            }
            writeln!(self.output)?;
        }
        if plan.total_answered > 0 {
            writeln!(
                self.output,
                "Accuracy: {}% over {} answers",
                plan.accuracy_percent, plan.total_answered
            )?;
        }
        Ok(())
    }

    pub fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")
    }

    // ─── QUESTIONS ───────────────────────────────────────────────────────────

    /// Render `shown` in its format and collect the learner's answer.
    pub fn ask(
        &mut self,
        shown: &PresentedQuestion,
        session: &RoundSession,
        bank: &QuestionBank,
        scorer: &dyn AnswerScorer,
    ) -> io::Result<Reply> {
        let progress = session.progress();
        writeln!(
            self.output,
            "\n[{}/{}] {}",
            progress.completed, progress.total, shown.format
        )?;
        match shown.format {
            QuestionFormat::MultipleChoice | QuestionFormat::Completed => {
                self.ask_choice(shown)
            }
            QuestionFormat::Written => self.ask_written(shown, scorer),
            QuestionFormat::Flashcard => self.ask_flashcard(shown),
            QuestionFormat::Matching => match session.matching_board(bank, shown.id) {
                Ok(board) => self.ask_matching(board),
                Err(_) => self.ask_flashcard(shown),
            },
        }
    }

    fn ask_choice(&mut self, shown: &PresentedQuestion) -> io::Result<Reply> {
        writeln!(self.output, "{}", shown.prompt)?;
        for (index, option) in shown.options.iter().enumerate() {
            writeln!(self.output, "  {}. {option}", index + 1)?;
        }
        loop {
            let Some(line) = self.prompt("> ")? else {
                return Ok(Reply::Quit);
            };
            if Self::is_quit(&line) {
                return Ok(Reply::Quit);
            }
            let choice = match line.parse::<usize>() {
                Ok(n) if (1..=shown.options.len()).contains(&n) => shown.options[n - 1].as_str(),
                Ok(_) => {
                    writeln!(self.output, "Pick 1-{}.", shown.options.len())?;
                    continue;
                }
                Err(_) => line.as_str(),
            };
            return Ok(Reply::Answered(shown.grade_choice(choice)));
        }
    }

    fn ask_written(
        &mut self,
        shown: &PresentedQuestion,
        scorer: &dyn AnswerScorer,
    ) -> io::Result<Reply> {
        writeln!(self.output, "{}", shown.prompt)?;
        let Some(line) = self.prompt("Your answer: ")? else {
            return Ok(Reply::Quit);
        };
        if Self::is_quit(&line) {
            return Ok(Reply::Quit);
        }
        Ok(Reply::Answered(shown.grade_written(scorer, &line)))
    }

    fn ask_flashcard(&mut self, shown: &PresentedQuestion) -> io::Result<Reply> {
        writeln!(self.output, "{}", shown.prompt)?;
        let Some(line) = self.prompt("(Enter to reveal) ")? else {
            return Ok(Reply::Quit);
        };
        if Self::is_quit(&line) {
            return Ok(Reply::Quit);
        }
        writeln!(self.output, "→ {}", shown.correct_answer)?;
        Ok(Reply::Answered(AnswerOutcome::Reviewed))
    }

    fn ask_matching(&mut self, mut board: MatchingBoard) -> io::Result<Reply> {
        writeln!(self.output, "Match each prompt with its answer.")?;
        while !board.is_finished() {
            for (index, tile) in board.tiles().iter().enumerate() {
                let side = match tile.side {
                    TileSide::Prompt => "Q",
                    TileSide::Answer => "A",
                };
                let state = if tile.is_locked() {
                    "x"
                } else if board.armed() == Some(index) {
                    "*"
                } else {
                    " "
                };
                writeln!(self.output, "  [{state}] {}. {side}: {}", index + 1, tile.text)?;
            }
            let Some(line) = self.prompt("tile> ")? else {
                return Ok(Reply::Quit);
            };
            if Self::is_quit(&line) {
                return Ok(Reply::Quit);
            }
            let Some(index) = line.parse::<usize>().ok().and_then(|n| n.checked_sub(1)) else {
                writeln!(self.output, "Enter a tile number.")?;
                continue;
            };
            match board.select(index) {
                Ok(TileSelection::Paired { correct: true, .. }) => {
                    writeln!(self.output, "Match!")?;
                }
                Ok(TileSelection::Paired { correct: false, .. }) => {
                    writeln!(self.output, "Not a pair.")?;
                }
                Ok(TileSelection::Armed(_) | TileSelection::Disarmed(_)) => {}
                Err(err) => writeln!(self.output, "{err}")?,
            }
        }
        writeln!(
            self.output,
            "{} of {} pairs correct.",
            board.correct_pairs(),
            board.attempted_pairs()
        )?;
        Ok(Reply::Answered(board.outcome()))
    }

    // ─── FEEDBACK ────────────────────────────────────────────────────────────

    pub fn feedback(&mut self, shown: &PresentedQuestion, result: &AnswerResult) -> io::Result<()> {
        let transition = result.transition;
        if shown.format.counts_toward_mastery() {
            if transition.mastered() {
                writeln!(self.output, "Correct! Question mastered.")?;
            } else {
                writeln!(
                    self.output,
                    "Not quite. The answer is: {}",
                    shown.correct_answer
                )?;
            }
        }
        if transition.changed() && !transition.mastered() {
            writeln!(self.output, "Next time as {}.", transition.to)?;
        }
        if result.round_complete() {
            writeln!(self.output, "\nRound complete!")?;
        }
        Ok(())
    }
}
