use std::path::Path;
use owo_colors::OwoColorize;
use crate::query::QueryContract;
use crate::seed::SeedOutcome;
use crate::ui::{theme, Icons};

/// Title line for a command's report
pub fn banner(text: &str) {
    println!("{} {}", Icons::BOOK, text.style(theme().heading.clone()));
}

pub fn done(message: &str) {
    println!("{} {}", Icons::CHECK, message.style(theme().done.clone()));
}

/// Non-fatal problem, printed to stderr
pub fn notice(message: &str) {
    eprintln!("{} {}", Icons::WARN, message.style(theme().empty.clone()));
}

/// Say whether `path` was freshly seeded or reused
pub fn seed_report(path: &Path, outcome: &SeedOutcome) {
    match outcome {
        SeedOutcome::Seeded(stats) => done(&format!(
            "Seeded {} with {} students and {} grades",
            path.display(),
            stats.students,
            stats.grades
        )),
        SeedOutcome::Skipped(_) => println!(
            "{} {}: {} exists, using it as is",
            Icons::DATABASE.style(theme().accent.clone()),
            "Database".style(theme().label.clone()),
            path.display()
        ),
    }
}

/// One catalog entry with the names it asks for
pub fn question_entry(contract: &QueryContract) {
    println!("{:>3}. {}", contract.number, contract.title);
    if contract.arity() > 0 {
        let params: Vec<String> = contract.params.iter().map(|p| format!("<{}>", p)).collect();
        println!("     {} {}", "asks for:".style(theme().label.clone()), params.join(" "));
    }
}
