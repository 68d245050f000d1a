//! `fixd` - civic issue desk.
//!
//! Residents report and upvote city issues; administrators triage them.
//! State lives in memory for a single invocation.

use fixdelhi::run;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
