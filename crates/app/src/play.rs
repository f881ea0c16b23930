//! Line-oriented terminal front end for one session.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};

use services::QuizSession;
use services::sessions::{Advance, EndReason, Phase, SessionReport, SessionSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Input {
    /// 1-based option index as shown on screen.
    Toggle(usize),
    Check,
    Next,
    Previous,
    Bookmark,
    Reveal,
    Help,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let line = line.trim();
    if let Ok(index) = line.parse::<usize>() {
        return if index == 0 {
            Err("options start at 1".into())
        } else {
            Ok(Input::Toggle(index))
        };
    }
    match line.to_ascii_lowercase().as_str() {
        "c" | "check" => Ok(Input::Check),
        "n" | "next" | "" => Ok(Input::Next),
        "p" | "prev" | "previous" => Ok(Input::Previous),
        "b" | "bookmark" => Ok(Input::Bookmark),
        "r" | "reveal" => Ok(Input::Reveal),
        "h" | "help" | "?" => Ok(Input::Help),
        "q" | "quit" | "exit" => Ok(Input::Quit),
        other => Err(format!("unknown input {other:?}, type h for help")),
    }
}

fn print_help() {
    println!("  <n>  toggle option n      c  check answer");
    println!("  n    next question        p  previous question");
    println!("  b    toggle bookmark      r  toggle reveal-all");
    println!("  q    leave the session");
}

/// Drive `session` from stdin until it ends, then print and save the result.
///
/// # Errors
///
/// Returns an error if stdin fails or the report cannot be serialized.
pub async fn run_session(
    mut session: QuizSession,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if session.phase() == Phase::Empty {
        println!("There are no questions for this session.");
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut watch = tokio::time::interval(Duration::from_millis(250));
    print_snapshot(&session.snapshot());

    while session.phase().is_active() {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    session.exit();
                    break;
                };
                match parse_input(&line) {
                    Ok(input) => apply(&mut session, input).await,
                    Err(msg) => println!("{msg}"),
                }
            }
            _ = watch.tick() => {}
        }
    }

    if session.phase() == Phase::Ended(EndReason::TimedOut) {
        println!("Time is up.");
    }
    let report = session.report();
    print_report(&report);
    match session.finalize_summary().await {
        Ok(id) => log::info!("session summary saved as #{id}"),
        Err(err) => log::warn!("could not save session summary: {err}"),
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(())
}

async fn apply(session: &mut QuizSession, input: Input) {
    let is_exam = session.kind().is_exam();
    let result = match input {
        Input::Toggle(index) => {
            let value = session
                .snapshot()
                .question
                .and_then(|q| q.answers.get(index - 1).cloned());
            match value {
                Some(value) => session.select_option(&value).map(|_| ()),
                None => {
                    println!("no option {index}");
                    return;
                }
            }
        }
        Input::Check => session.check().map(|_| ()),
        Input::Next if is_exam => session.exam_next().map(|_| ()),
        Input::Next => session.next().map(|advance| {
            if let Advance::Ended { destination } = advance {
                log::debug!("review finished, back to {destination:?}");
            }
        }),
        Input::Previous => session.previous().map(|_| ()),
        Input::Bookmark => {
            match session.toggle_bookmark().await {
                Some(toggle) if toggle.bookmarked => println!("bookmarked"),
                Some(_) => println!("bookmark removed"),
                None => println!("bookmark not changed"),
            }
            return;
        }
        Input::Reveal => {
            let reveal = !session.snapshot().reveal_all;
            session.set_reveal_all(reveal);
            println!("reveal-all {}", if reveal { "on" } else { "off" });
            return;
        }
        Input::Help => {
            print_help();
            return;
        }
        Input::Quit => {
            session.exit();
            return;
        }
    };
    match result {
        Ok(()) if session.phase().is_active() => print_snapshot(&session.snapshot()),
        Ok(()) => {}
        Err(rejected) => println!("{rejected}"),
    }
}

fn print_snapshot(snapshot: &SessionSnapshot) {
    let Some(question) = &snapshot.question else {
        return;
    };
    let clock = snapshot
        .clock_label
        .as_ref()
        .map_or_else(String::new, |label| format!("  [{label}]"));
    println!();
    println!(
        "{}/{}  {} ({}){clock}",
        snapshot.position, snapshot.total, question.number, question.category
    );
    println!("{}", question.text);
    if !question.translated_text.is_empty() {
        println!("  {}", question.translated_text);
    }
    for (i, answer) in question.answers.iter().enumerate() {
        let mark = if question.selected.contains(answer) {
            "x"
        } else {
            " "
        };
        let translated = question
            .translated_answers
            .get(i)
            .filter(|t| !t.is_empty())
            .map_or_else(String::new, |t| format!("  / {t}"));
        println!("  {}. [{mark}] {answer}{translated}", i + 1);
    }
    if let Some(image) = &question.image {
        println!("  image: {image}");
    }
    match (question.correct, &question.correct_answers) {
        (Some(true), _) => println!("Correct."),
        (Some(false), Some(correct)) => println!("Wrong. Correct: {}", correct.join(" | ")),
        (None, Some(correct)) if question.checked => {
            println!("Answer: {}", correct.join(" | "));
        }
        _ => {}
    }
}

fn print_report(report: &SessionReport) {
    println!();
    if report.nothing_answered() {
        println!("No questions answered.");
        return;
    }
    let score = report
        .score_percent
        .map_or_else(|| "-".to_string(), |p| format!("{p:.2}%"));
    println!(
        "{} correct, {} wrong, score {score}",
        report.correct_count, report.wrong_count
    );
    for wrong in &report.wrong {
        println!("  {} {}", wrong.number, wrong.text);
        println!("    correct: {}", wrong.correct_answers.join(" | "));
        println!("    yours:   {}", wrong.user_answers.join(" | "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_toggle_options() {
        assert_eq!(parse_input(" 2 "), Ok(Input::Toggle(2)));
        assert!(parse_input("0").is_err());
    }

    #[test]
    fn empty_line_moves_on() {
        assert_eq!(parse_input(""), Ok(Input::Next));
        assert_eq!(parse_input("C"), Ok(Input::Check));
        assert_eq!(parse_input("quit"), Ok(Input::Quit));
    }

    #[test]
    fn unknown_input_is_rejected() {
        assert!(parse_input("jump").is_err());
    }
}
