//! The `interviewkit questions` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use interviewkit_core::model::Role;

use super::load_question_bank;

pub fn execute(role: Option<Role>, bank_path: Option<PathBuf>) -> Result<()> {
    let bank = load_question_bank(bank_path.as_deref())?;

    let mut table = Table::new();
    table.set_header(vec!["Role", "ID", "Category", "Difficulty", "Question"]);

    let mut shown = 0;
    for (r, q) in bank.iter().filter(|(r, _)| role.is_none() || role == Some(*r)) {
        table.add_row(vec![
            Cell::new(r),
            Cell::new(&q.id),
            Cell::new(q.category),
            Cell::new(q.difficulty),
            Cell::new(&q.prompt),
        ]);
        shown += 1;
    }

    if shown == 0 {
        match role {
            Some(role) => println!("No questions for role '{role}'."),
            None => println!("Question bank is empty."),
        }
        return Ok(());
    }

    println!("{table}");
    println!("{shown} question(s) from {}", bank.name);
    Ok(())
}
