//! Interactive question menu
//!
//! Presents the ten questions, collects names for the chosen one, checks each
//! name exists before running the contract and formats the rows. Input goes
//! through a [`Prompter`]: [`TerminalPrompter`] (dialoguer) on a TTY,
//! [`LinePrompter`] for piped stdin and tests.

use std::collections::HashMap;
use std::io::{BufRead, Write};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use owo_colors::OwoColorize;
use serde::Serialize;
use crate::query::{Cell, ParamKind, QueryContract, QueryGateway, Row};
use crate::ui::theme;
use crate::Result;

/// Source of menu choices and typed names
pub trait Prompter {
    /// Next question number, or `None` to leave the menu
    fn choose_question(&mut self, questions: &[&QueryContract]) -> Result<Option<u8>>;

    /// Free-text answer to `prompt`
    fn ask(&mut self, prompt: &str) -> Result<String>;
}

/// Arrow-key menu and line editor for interactive terminals
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self { theme: ColorfulTheme::default() }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn choose_question(&mut self, questions: &[&QueryContract]) -> Result<Option<u8>> {
        let mut items: Vec<String> = questions
            .iter()
            .map(|q| format!("{}. {}", q.number, q.title))
            .collect();
        items.push("exit".to_string());

        let picked = Select::with_theme(&self.theme)
            .with_prompt("Choose a question")
            .items(&items)
            .default(0)
            .interact_opt()?;

        Ok(picked.and_then(|i| questions.get(i).map(|q| q.number)))
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        let answer: String = Input::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }
}

/// Numbered text menu over any reader/writer pair
pub struct LinePrompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// One trimmed line, `None` at end of input
    fn read_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn choose_question(&mut self, questions: &[&QueryContract]) -> Result<Option<u8>> {
        writeln!(self.output, "Choose a question number:")?;
        for q in questions {
            writeln!(self.output, "{}. {}", q.number, q.title)?;
        }
        writeln!(self.output, "exit - to exit")?;
        writeln!(self.output)?;

        loop {
            write!(self.output, "Choose a question number (1-{}): ", questions.len())?;
            self.output.flush()?;

            let Some(choice) = self.read_line()? else {
                return Ok(None);
            };
            if choice == "exit" {
                return Ok(None);
            }

            match choice.parse::<u8>() {
                Ok(n) if questions.iter().any(|q| q.number == n) => return Ok(Some(n)),
                _ => writeln!(
                    self.output,
                    "Invalid question number. Please enter a number from 1 to {}.",
                    questions.len()
                )?,
            }
        }
    }

    fn ask(&mut self, prompt: &str) -> Result<String> {
        write!(self.output, "{}: ", prompt)?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }
}

/// Outcome of one question
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Answer {
    /// Formatted result lines under an optional heading
    Listing { heading: Option<String>, lines: Vec<String> },
    /// Valid question, zero rows
    NoData { message: String },
    /// A typed name does not exist; nothing was run
    Rejected { message: String },
}

/// Ask one question end to end: collect names, validate, run, format
pub fn ask_question<P: Prompter>(gateway: &QueryGateway<'_>, prompter: &mut P, number: u8) -> Result<Answer> {
    let contract = gateway.catalog().get(number)?;

    let mut params = Vec::with_capacity(contract.arity());
    for kind in contract.params {
        let prompt = prompt_for(gateway, *kind)?;
        let value = prompter.ask(&prompt)?;
        if !gateway.exists(*kind, &value)? {
            tracing::debug!(kind = %kind, name = %value, "Rejected unknown name");
            return Ok(Answer::Rejected {
                message: format!("There is no such {}. Back to question selection.", kind),
            });
        }
        params.push(value);
    }

    run_checked(gateway, contract, &params)
}

/// Validate already-collected names, then run and format contract `number`
pub fn answer(gateway: &QueryGateway<'_>, number: u8, params: &[String]) -> Result<Answer> {
    let contract = gateway.catalog().get(number)?;

    for (kind, value) in contract.params.iter().zip(params) {
        if !gateway.exists(*kind, value)? {
            return Ok(Answer::Rejected {
                message: format!("There is no such {}. Back to question selection.", kind),
            });
        }
    }

    run_checked(gateway, contract, params)
}

/// Run a contract whose names are known to exist
fn run_checked(gateway: &QueryGateway<'_>, contract: &QueryContract, params: &[String]) -> Result<Answer> {
    if let [ParamKind::Lecturer, ParamKind::Subject] = contract.params {
        if let [lecturer, subject] = params {
            if !gateway.lecturer_teaches_subject(lecturer, subject)? {
                return Ok(Answer::Rejected {
                    message: format!("Lecturer {} does not teach {}.", lecturer, subject),
                });
            }
        }
    }

    let args: Vec<&str> = params.iter().map(String::as_str).collect();
    let rows = gateway.run_contract(contract, &args)?;
    Ok(render(contract.number, params, rows))
}

fn prompt_for(gateway: &QueryGateway<'_>, kind: ParamKind) -> Result<String> {
    let prompt = match kind {
        ParamKind::Subject => format!(
            "Enter the name of the course subject ({})",
            gateway.names(kind)?.join(", ")
        ),
        ParamKind::Group => format!("Enter a group name ({})", gateway.names(kind)?.join(", ")),
        ParamKind::Lecturer => "Enter the lecturer's name".to_string(),
        ParamKind::Student => "Enter the student name".to_string(),
    };
    Ok(prompt)
}

/// Turn contract rows into the answer shown for question `number`
pub fn render(number: u8, params: &[String], mut rows: Vec<Row>) -> Answer {
    let param = |i: usize| params.get(i).map(String::as_str).unwrap_or_default();

    if rows.is_empty() {
        let message = match number {
            8 => format!("No data for the lecturer {} and the subject {}.", param(0), param(1)),
            _ => "No data.".to_string(),
        };
        return Answer::NoData { message };
    }

    match number {
        1 => {
            sort_by_metric_desc(&mut rows);
            let lines = rows
                .iter()
                .take(5)
                .enumerate()
                .map(|(i, row)| format!("{}. {} average {}", i + 1, name(row), metric(row)))
                .collect();
            listing("Below is a list of the 5 people with the highest average:", lines)
        }
        2 => {
            sort_by_metric_desc(&mut rows);
            let best = &rows[0];
            Answer::Listing {
                heading: None,
                lines: vec![format!(
                    "{} has the highest average in {} and it is {}",
                    name(best),
                    param(0),
                    metric(best)
                )],
            }
        }
        3 | 4 => {
            let heading = if number == 3 {
                format!("Average grade for the subject {}:", param(0))
            } else {
                "Average grade in all subjects:".to_string()
            };
            let lines = rows
                .iter()
                .map(|row| format!("{} average {}", name(row), metric(row)))
                .collect();
            listing(&heading, lines)
        }
        7 => {
            let heading = format!(
                "For {} in {}, students obtained the following grades:",
                param(0),
                param(1)
            );
            listing(&heading, grouped_grades(&rows))
        }
        8 => Answer::Listing {
            heading: None,
            lines: rows
                .iter()
                .map(|row| {
                    format!(
                        "The average grade given by {} for the subject {} is {}.",
                        param(0),
                        name(row),
                        metric(row)
                    )
                })
                .collect(),
        },
        _ => {
            let heading = match number {
                5 => format!("Lecturer {} teaches the following subjects:", param(0)),
                6 => format!("List of people in the {}:", param(0)),
                9 => format!("Student {} attends the following subjects:", param(0)),
                10 => format!("List of subjects taught by {} for student {}:", param(0), param(1)),
                _ => "Results:".to_string(),
            };
            listing(&heading, numbered(&rows))
        }
    }
}

fn listing(heading: &str, lines: Vec<String>) -> Answer {
    Answer::Listing {
        heading: Some(heading.to_string()),
        lines,
    }
}

fn name(row: &Row) -> &Cell {
    row.get(1).unwrap_or(&Cell::Null)
}

fn metric(row: &Row) -> &Cell {
    row.get(2).unwrap_or(&Cell::Null)
}

fn sort_by_metric_desc(rows: &mut [Row]) {
    rows.sort_by(|a, b| {
        let a = metric(a).as_f64().unwrap_or(f64::MIN);
        let b = metric(b).as_f64().unwrap_or(f64::MIN);
        b.partial_cmp(&a).unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn numbered(rows: &[Row]) -> Vec<String> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| format!("{}. {}", i + 1, name(row)))
        .collect()
}

/// "Student: g1, g2" per student, students in first-seen order
fn grouped_grades(rows: &[Row]) -> Vec<String> {
    let mut order: Vec<String> = Vec::new();
    let mut grades: HashMap<String, Vec<String>> = HashMap::new();
    for row in rows {
        let student = name(row).to_string();
        if !grades.contains_key(&student) {
            order.push(student.clone());
        }
        grades.entry(student).or_default().push(metric(row).to_string());
    }

    order
        .into_iter()
        .map(|student| {
            let list = grades.get(&student).map(|g| g.join(", ")).unwrap_or_default();
            format!("{}: {}", student, list)
        })
        .collect()
}

/// Print one answer
pub fn write_answer<W: Write>(out: &mut W, answer: &Answer) -> Result<()> {
    match answer {
        Answer::Listing { heading, lines } => {
            if let Some(heading) = heading {
                writeln!(out, "{}", heading.style(theme().heading.clone()))?;
            }
            for line in lines {
                writeln!(out, "{}", line)?;
            }
        }
        Answer::NoData { message } => writeln!(out, "{}", message.style(theme().empty.clone()))?,
        Answer::Rejected { message } => writeln!(out, "{}", message.style(theme().rejected.clone()))?,
    }
    writeln!(out)?;
    Ok(())
}

/// Menu loop: choose, answer, repeat until the prompter says exit
pub fn run_menu<P: Prompter, W: Write>(gateway: &QueryGateway<'_>, prompter: &mut P, out: &mut W) -> Result<()> {
    let questions: Vec<&QueryContract> = gateway.catalog().iter().collect();

    while let Some(number) = prompter.choose_question(&questions)? {
        tracing::debug!(question = number, "Question selected");
        let answer = ask_question(gateway, prompter, number)?;
        write_answer(out, &answer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    #[test]
    fn test_top_five_sorted_and_truncated() {
        let rows: Vec<Row> = (1..=7)
            .map(|i| vec![Cell::Integer(i), text(&format!("S{}", i)), Cell::Real(i as f64 / 2.0)])
            .collect();

        let Answer::Listing { lines, .. } = render(1, &[], rows) else {
            panic!("expected listing");
        };
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "1. S7 average 3.5");
        assert_eq!(lines[4], "5. S3 average 1.5");
    }

    #[test]
    fn test_best_student_line() {
        let rows = vec![
            vec![Cell::Integer(1), text("Anna"), Cell::Real(4.5)],
            vec![Cell::Integer(2), text("Leon"), Cell::Real(5.25)],
        ];
        let answer = render(2, &["Physics".to_string()], rows);
        assert_eq!(
            answer,
            Answer::Listing {
                heading: None,
                lines: vec!["Leon has the highest average in Physics and it is 5.25".to_string()],
            }
        );
    }

    #[test]
    fn test_grades_grouped_by_student() {
        let rows = vec![
            vec![Cell::Integer(1), text("Anna"), Cell::Integer(5)],
            vec![Cell::Integer(2), text("Leon"), Cell::Integer(2)],
            vec![Cell::Integer(1), text("Anna"), Cell::Integer(3)],
        ];
        let params = ["Group A".to_string(), "Physics".to_string()];
        let Answer::Listing { heading, lines } = render(7, &params, rows) else {
            panic!("expected listing");
        };
        assert_eq!(heading.unwrap(), "For Group A in Physics, students obtained the following grades:");
        assert_eq!(lines, vec!["Anna: 5, 3", "Leon: 2"]);
    }

    #[test]
    fn test_empty_rows_are_no_data() {
        let params = ["Ada Lovelace".to_string(), "History".to_string()];
        assert_eq!(
            render(8, &params, Vec::new()),
            Answer::NoData { message: "No data for the lecturer Ada Lovelace and the subject History.".to_string() }
        );
        assert!(matches!(render(3, &["Art".to_string()], Vec::new()), Answer::NoData { .. }));
    }

    #[test]
    fn test_line_prompter_reprompts_on_invalid_choice() {
        let catalog = crate::query::QueryCatalog::builtin().unwrap();
        let questions: Vec<&QueryContract> = catalog.iter().collect();
        let input = std::io::Cursor::new("abc\n11\n4\n");
        let mut prompter = LinePrompter::new(input, Vec::new());

        assert_eq!(prompter.choose_question(&questions).unwrap(), Some(4));
        let shown = String::from_utf8(prompter.into_output()).unwrap();
        assert_eq!(shown.matches("Invalid question number").count(), 2);
        assert!(shown.contains("exit - to exit"));
    }

    #[test]
    fn test_line_prompter_exit_and_eof() {
        let catalog = crate::query::QueryCatalog::builtin().unwrap();
        let questions: Vec<&QueryContract> = catalog.iter().collect();

        let mut prompter = LinePrompter::new(std::io::Cursor::new("exit\n"), Vec::new());
        assert_eq!(prompter.choose_question(&questions).unwrap(), None);

        let mut prompter = LinePrompter::new(std::io::Cursor::new(""), Vec::new());
        assert_eq!(prompter.choose_question(&questions).unwrap(), None);
    }

    #[test]
    fn test_prompted_lecturer_must_teach_subject() {
        use crate::model::{StudentCandidate, SyntheticDataset};
        use crate::storage::SqliteStore;

        let dataset = SyntheticDataset {
            groups: vec!["Group A".into()],
            lecturers: vec!["Ada Lovelace".into(), "Alan Turing".into()],
            subjects: vec!["Mathematics".into(), "Physics".into()],
            students: vec![StudentCandidate { name: "Anna Nowak".into(), group: "Group A".into() }],
            grades: Vec::new(),
        };
        let mut store = SqliteStore::open_in_memory().unwrap();
        crate::seed::seed(&mut store, &dataset).unwrap();
        let catalog = crate::query::QueryCatalog::builtin().unwrap();
        let gateway = QueryGateway::new(&store, &catalog);

        let input = std::io::Cursor::new("Alan Turing\nMathematics\n");
        let mut prompter = LinePrompter::new(input, Vec::new());
        assert_eq!(
            ask_question(&gateway, &mut prompter, 8).unwrap(),
            Answer::Rejected { message: "Lecturer Alan Turing does not teach Mathematics.".to_string() }
        );

        let input = std::io::Cursor::new("Ada Lovelace\nMathematics\n");
        let mut prompter = LinePrompter::new(input, Vec::new());
        assert_eq!(
            ask_question(&gateway, &mut prompter, 8).unwrap(),
            Answer::NoData { message: "No data for the lecturer Ada Lovelace and the subject Mathematics.".to_string() }
        );

        let input = std::io::Cursor::new("Grace Hopper\n");
        let mut prompter = LinePrompter::new(input, Vec::new());
        assert_eq!(
            ask_question(&gateway, &mut prompter, 8).unwrap(),
            Answer::Rejected { message: "There is no such lecturer. Back to question selection.".to_string() }
        );
    }
}
