//! Create and populate a database for manual testing.

use std::{error::Error, path::Path, process::exit};

use clap::Parser;
use rusqlite::Connection;
use time::macros::date;

use centsible::{
    Money, PasswordHash, ValidatedPassword,
    budget::{NewBudget, create_budget},
    category::{CategoryName, create_category},
    db::initialize,
    transaction::{NewTransaction, create_transaction},
    user::create_user,
};

/// Create a database populated with a demo user for manual testing.
///
/// The demo user logs in as demo@example.com with the password
/// "correct horse battery staple".
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path for the new SQLite database.
    #[arg(long)]
    db_path: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    if Path::new(&args.db_path).exists() {
        eprintln!("A file already exists at {}, refusing to overwrite it.", args.db_path);
        exit(1);
    }

    let conn = Connection::open(&args.db_path)?;
    initialize(&conn)?;

    // A deliberately weak demo password; skip the strength check.
    let password = ValidatedPassword::new_unchecked("correct horse battery staple");
    let user = create_user("demo@example.com", PasswordHash::new(password, 4)?, &conn)?;

    let groceries = create_category(CategoryName::new("Groceries")?, false, user.id, &conn)?;
    let rent = create_category(CategoryName::new("Rent")?, false, user.id, &conn)?;
    let salary = create_category(CategoryName::new("Salary")?, true, user.id, &conn)?;

    let expenses = [
        (4250, date!(2024 - 01 - 03), "Weekly shop", groceries.id),
        (3875, date!(2024 - 01 - 10), "Weekly shop", groceries.id),
        (5120, date!(2024 - 01 - 17), "Weekly shop", groceries.id),
        (120000, date!(2024 - 01 - 01), "January rent", rent.id),
        (4410, date!(2024 - 02 - 07), "Weekly shop", groceries.id),
        (120000, date!(2024 - 02 - 01), "February rent", rent.id),
    ];
    for (cents, date, description, category_id) in expenses {
        create_transaction(
            NewTransaction {
                user_id: user.id,
                amount: Money::from_cents(cents),
                date,
                description: description.to_owned(),
                category_id: Some(category_id),
                is_income: false,
            },
            &conn,
        )?;
    }

    for (date, description) in [
        (date!(2024 - 01 - 15), "January pay"),
        (date!(2024 - 02 - 15), "February pay"),
    ] {
        create_transaction(
            NewTransaction {
                user_id: user.id,
                amount: Money::from_cents(350000),
                date,
                description: description.to_owned(),
                category_id: Some(salary.id),
                is_income: true,
            },
            &conn,
        )?;
    }

    for (category_id, cents) in [(groceries.id, 20000), (rent.id, 120000)] {
        create_budget(
            NewBudget {
                user_id: user.id,
                category_id,
                amount: Money::from_cents(cents),
                start_date: date!(2024 - 01 - 01),
                end_date: date!(2024 - 01 - 31),
            },
            &conn,
        )?;
    }

    println!("Created demo database at {}", args.db_path);

    Ok(())
}
