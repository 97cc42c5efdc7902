//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `studykit_core` linkage with a deterministic ping/version check.
//! - Decode a configuration document from a path argument and summarize it.

use std::process::ExitCode;
use studykit_core::{Decoded, Factory, Membership, TaskDescription};

fn main() -> ExitCode {
    println!("studykit_core ping={}", studykit_core::ping());
    println!("studykit_core version={}", studykit_core::core_version());

    let Some(path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };
    let bytes = match std::fs::read(&path) {
        Ok(bytes) => bytes,
        Err(err) => {
            eprintln!("failed to read `{path}`: {err}");
            return ExitCode::FAILURE;
        }
    };
    match Factory::standard().decode_category_slice(&bytes) {
        Ok((category, decoded)) => {
            println!("category={category}");
            print_summary(&decoded);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("decode failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn print_summary(decoded: &Decoded) {
    match decoded {
        Decoded::Task(TaskDescription::Generic(task)) => {
            println!("task={} steps={}", task.identifier, task.steps.len());
        }
        Decoded::Task(TaskDescription::Tracking(task)) => {
            println!("tracking={} items={}", task.identifier, task.items.len());
        }
        Decoded::ProfileManager(manager) => {
            println!("profile_items={}", manager.items().len());
        }
        Decoded::ProfileDataSource(source) => {
            let everyone = Membership::new();
            for (index, section) in source.sections().iter().enumerate() {
                println!(
                    "section[{index}] title={} decoded={} visible_without_groups={}",
                    section.title.as_deref().unwrap_or("-"),
                    section.decoded_len(),
                    section.items(&everyone).len()
                );
            }
        }
    }
}
