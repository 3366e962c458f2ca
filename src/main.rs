//! split-settle CLI
//!
//! Run group-expense settlement from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Compute balances from a JSON group file
//! split-settle balances --input group.json
//!
//! # Full settlement: balances, transfer plan, reconciliation
//! split-settle settle --input group.json --format json
//!
//! # Generate a random group for testing
//! split-settle generate --participants 10 --expenses 30
//! ```

use rust_decimal::Decimal;
use split_settle::core::confirmation::{Confirmation, ConfirmationLog};
use split_settle::core::expense::{Expense, ExpenseLedger, ExpenseStatus};
use split_settle::core::participant::Roster;
use split_settle::engine::balance::Standing;
use split_settle::engine::SettlementEngine;
use split_settle::simulation::random_ledger::{generate_random_ledger, LedgerConfig};
use std::fs;
use std::process;

fn print_usage() {
    eprintln!(
        r#"split-settle — group-expense settlement and debt netting

USAGE:
    split-settle <COMMAND> [OPTIONS]

COMMANDS:
    balances    Compute net balances over approved expenses
    settle      Compute balances, a transfer plan, and reconciliation
    generate    Generate a random group file (for testing)
    help        Show this message

OPTIONS (balances, settle):
    --input <FILE>      Path to JSON group file
    --format <FORMAT>   Output format: text (default) or json

OPTIONS (generate):
    --participants <N>  Number of participants (default: 10)
    --expenses <N>      Number of expenses (default: 30)
    --approval-rate <F> Fraction of expenses approved (default: 0.8)
    --output <FILE>     Write to file instead of stdout

EXAMPLES:
    split-settle balances --input group.json
    split-settle settle --input group.json --format json
    split-settle generate --participants 5 --expenses 20 --output test.json"#
    );
}

/// JSON schema for input group files. Field names follow the surrounding
/// application's wire format.
#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpenseInput {
    amount: String,
    paid_by: String,
    split_between: Vec<String>,
    #[serde(default = "default_status")]
    status: String,
    #[serde(default)]
    description: Option<String>,
}

fn default_status() -> String {
    "approved".to_string()
}

#[derive(serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfirmationInput {
    from: String,
    to: String,
    amount: String,
    #[serde(default)]
    confirmed_by: Option<String>,
}

#[derive(serde::Deserialize)]
struct GroupFile {
    participants: Vec<String>,
    expenses: Vec<ExpenseInput>,
    #[serde(default)]
    confirmations: Vec<ConfirmationInput>,
}

#[derive(serde::Serialize)]
#[serde(rename_all = "camelCase")]
struct BalanceOutput {
    participant: String,
    balance: String,
    standing: String,
}

fn parse_amount(raw: &str) -> Decimal {
    raw.parse().unwrap_or_else(|e| {
        eprintln!("Invalid amount '{}': {}", raw, e);
        process::exit(1);
    })
}

fn parse_status(raw: &str) -> ExpenseStatus {
    match raw {
        "pending" => ExpenseStatus::Pending,
        "approved" => ExpenseStatus::Approved,
        "rejected" => ExpenseStatus::Rejected,
        other => {
            eprintln!("Invalid status '{}': expected pending, approved, or rejected", other);
            process::exit(1);
        }
    }
}

fn load_group(path: &str) -> (Roster, ExpenseLedger, ConfirmationLog) {
    let content = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error reading file '{}': {}", path, e);
        process::exit(1);
    });

    let file: GroupFile = serde_json::from_str(&content).unwrap_or_else(|e| {
        eprintln!("Error parsing JSON: {}", e);
        eprintln!("Expected format:");
        eprintln!(
            r#"{{
  "participants": ["Alice", "Bob", "Charlie"],
  "expenses": [
    {{ "amount": "300", "paidBy": "Alice", "splitBetween": ["Alice", "Bob", "Charlie"], "status": "approved" }}
  ],
  "confirmations": [
    {{ "from": "Charlie", "to": "Alice", "amount": "50" }}
  ]
}}"#
        );
        process::exit(1);
    });

    let roster = Roster::from_names(file.participants);

    let mut ledger = ExpenseLedger::new();
    for input in file.expenses {
        let mut expense = Expense::new(
            &input.paid_by,
            input.split_between,
            parse_amount(&input.amount),
            parse_status(&input.status),
        )
        .unwrap_or_else(|e| {
            eprintln!("Invalid expense: {}", e);
            process::exit(1);
        });
        if let Some(description) = input.description {
            expense = expense.with_description(description);
        }
        ledger.add(expense);
    }

    let mut confirmations = ConfirmationLog::new();
    for input in file.confirmations {
        let confirmed_by = input.confirmed_by.unwrap_or_else(|| input.to.clone());
        confirmations.add(Confirmation::new(
            input.from.as_str(),
            input.to.as_str(),
            parse_amount(&input.amount),
            confirmed_by,
        ));
    }

    (roster, ledger, confirmations)
}

fn parse_io_options(args: &[String]) -> (String, String) {
    let mut input_path = None;
    let mut format = "text".to_string();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--input" => {
                i += 1;
                input_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--input requires a file path");
                    process::exit(1);
                }));
            }
            "--format" => {
                i += 1;
                format = args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--format requires 'text' or 'json'");
                    process::exit(1);
                });
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let path = input_path.unwrap_or_else(|| {
        eprintln!("Error: --input <FILE> is required");
        process::exit(1);
    });
    (path, format)
}

fn cmd_balances(args: &[String]) {
    let (path, format) = parse_io_options(args);
    let (roster, ledger, _) = load_group(&path);

    let report = SettlementEngine::compute_balances(&ledger, &roster).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if format == "json" {
        let output: Vec<BalanceOutput> = report
            .balances()
            .iter()
            .map(|(participant, amount)| BalanceOutput {
                participant: participant.to_string(),
                balance: amount.to_string(),
                standing: match report.balances().standing(participant) {
                    Standing::ShouldReceive => "should_receive".to_string(),
                    Standing::ShouldPay => "should_pay".to_string(),
                    Standing::SettledUp => "settled_up".to_string(),
                },
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&output).unwrap());
    } else {
        println!("--- Balances ---");
        for (participant, amount) in report.balances().iter() {
            println!("  {:<20} {:>12}", participant.to_string(), amount);
        }
        for anomaly in report.anomalies() {
            eprintln!("warning: {}", anomaly);
        }
    }
}

fn cmd_settle(args: &[String]) {
    let (path, format) = parse_io_options(args);
    let (roster, ledger, confirmations) = load_group(&path);

    let report =
        SettlementEngine::settle(&ledger, &roster, &confirmations).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            process::exit(1);
        });

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&report).unwrap());
    } else {
        println!("{}", report);
    }
}

fn cmd_generate(args: &[String]) {
    let mut participants = 10usize;
    let mut expense_count = 30usize;
    let mut approval_rate = 0.8f64;
    let mut output_path: Option<String> = None;
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--participants" => {
                i += 1;
                participants = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--participants requires a number");
                    process::exit(1);
                });
            }
            "--expenses" => {
                i += 1;
                expense_count = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--expenses requires a number");
                    process::exit(1);
                });
            }
            "--approval-rate" => {
                i += 1;
                approval_rate = args.get(i).and_then(|s| s.parse().ok()).unwrap_or_else(|| {
                    eprintln!("--approval-rate requires a number in [0, 1]");
                    process::exit(1);
                });
            }
            "--output" => {
                i += 1;
                output_path = Some(args.get(i).cloned().unwrap_or_else(|| {
                    eprintln!("--output requires a file path");
                    process::exit(1);
                }));
            }
            _ => {
                eprintln!("Unknown option: {}", args[i]);
                process::exit(1);
            }
        }
        i += 1;
    }

    let config = LedgerConfig {
        participant_count: participants,
        avg_expenses_per_participant: expense_count / participants.max(1),
        approval_rate,
        ..Default::default()
    };

    let (roster, ledger) = generate_random_ledger(&config);

    #[derive(serde::Serialize)]
    #[serde(rename_all = "camelCase")]
    struct OutputExpense {
        amount: String,
        paid_by: String,
        split_between: Vec<String>,
        status: String,
    }

    #[derive(serde::Serialize)]
    struct OutputFile {
        participants: Vec<String>,
        expenses: Vec<OutputExpense>,
    }

    let output = OutputFile {
        participants: roster.members().iter().map(|p| p.to_string()).collect(),
        expenses: ledger
            .expenses()
            .iter()
            .map(|e| OutputExpense {
                amount: e.amount().to_string(),
                paid_by: e.paid_by().to_string(),
                split_between: e.split_between().to_vec(),
                status: match e.status() {
                    ExpenseStatus::Pending => "pending".to_string(),
                    ExpenseStatus::Approved => "approved".to_string(),
                    ExpenseStatus::Rejected => "rejected".to_string(),
                },
            })
            .collect(),
    };

    let json = serde_json::to_string_pretty(&output).unwrap();

    if let Some(path) = output_path {
        fs::write(&path, &json).unwrap_or_else(|e| {
            eprintln!("Error writing to '{}': {}", path, e);
            process::exit(1);
        });
        eprintln!(
            "Generated {} expenses across {} participants → {}",
            ledger.len(),
            participants,
            path
        );
    } else {
        println!("{}", json);
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let command = args[1].as_str();
    let rest = &args[2..];

    match command {
        "balances" => cmd_balances(rest),
        "settle" => cmd_settle(rest),
        "generate" => cmd_generate(rest),
        "help" | "--help" | "-h" => print_usage(),
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            process::exit(1);
        }
    }
}
