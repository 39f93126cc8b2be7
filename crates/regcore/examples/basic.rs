//! Basic regcore usage example.
//!
//! This example compiles patterns in both POSIX dialects and prints the
//! leftmost-longest match with its subexpressions.
//!
//! Run with: `cargo run --example basic`
//! Set `RUST_LOG=regcore=debug` to see compile logging.

use regcore::prelude::*;
use tracing_subscriber::EnvFilter;

fn show(re: &Regex, text: &str) -> Result<()> {
    match re.captures(text)? {
        Some(m) => {
            println!("   /{re}/ on {text:?}");
            for (i, group) in m.iter().enumerate() {
                match group {
                    Some(span) => {
                        println!("     {i}: {:?} {:?}", span.range(), &text[span.range()]);
                    }
                    None => println!("     {i}: (unmatched)"),
                }
            }
        }
        None => println!("   /{re}/ on {text:?}: no match"),
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("regcore Basic Example");
    println!("=====================\n");

    // Example 1: Leftmost-longest alternation
    println!("1. Alternation picks the longest match...");
    show(&Regex::new("a|ab|abc")?, "xabcd")?;

    // Example 2: Subexpressions
    println!("\n2. Subexpression spans...");
    show(&Regex::new("([0-9]{4})-([0-9]{2})-([0-9]{2})")?, "due 2024-06-30")?;
    show(&Regex::new("(a)|(b)")?, "b")?;

    // Example 3: Basic syntax
    println!("\n3. Basic (BRE) syntax...");
    let bre = Regex::builder(r"\([a-z]*\)=\(.*\)").extended(false).build()?;
    show(&bre, "key=value")?;

    // Example 4: Flags
    println!("\n4. Case-insensitive and newline-sensitive matching...");
    let re = Regex::builder("^error:.*$")
        .case_insensitive(true)
        .newline(true)
        .build()?;
    show(&re, "ok\nERROR: disk full\nok")?;

    // Example 5: Iterating over matches
    println!("\n5. All matches...");
    let words = Regex::new("[[:alpha:]]+")?;
    let text = b"one, two; three";
    for m in words.find_iter(text) {
        let span = m?.span();
        println!("   {:?} {}", span.range(), String::from_utf8_lossy(span.slice(text)));
    }

    // Example 6: Syntax errors
    println!("\n6. Syntax errors point into the pattern...");
    if let Err(err) = Regex::new("ab[cd") {
        println!("{err}");
    }

    Ok(())
}
