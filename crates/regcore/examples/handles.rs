//! Handle-based API example.
//!
//! This example shows the `regcomp`/`regexec`/`regfree` style interface:
//! patterns are referred to by opaque handles, and misuse is reported as
//! an error instead of corrupting memory.
//!
//! Run with: `cargo run --example handles`

use std::sync::Arc;
use std::thread;

use regcore::prelude::*;
use regcore::api;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("regcore Handles Example");
    println!("=======================\n");

    // Example 1: The process-wide manager
    println!("1. Compile, execute and release...");
    let handle = api::compile(br"\(ab*\)c", CompileFlags::empty())?;
    println!("   handle {handle} has {} subexpression(s)", api::subexpression_count(handle)?);
    if let Some(m) = api::exec(handle, b"xabbc", MatchFlags::empty())? {
        println!("   offsets: {:?}", m.offsets());
    }
    api::release(handle)?;

    // Example 2: Misuse is detected
    println!("\n2. Use after release...");
    match api::exec(handle, b"abc", MatchFlags::empty()) {
        Err(err) => println!("   refused: {err}"),
        Ok(_) => println!("   unexpectedly succeeded"),
    }

    // Example 3: Guards release on drop
    println!("\n3. Guarded handles...");
    let manager = HandleManager::new();
    {
        let guard = manager.compile_guarded(b"[0-9]+", CompileFlags::EXTENDED)?;
        let m = manager.exec(guard.handle(), b"port 8080", MatchFlags::empty())?;
        println!("   matched {:?}", m.map(|m| m.span().range()));
    }
    println!("   live handles after scope: {}", manager.len());

    // Example 4: Sharing a handle between threads
    println!("\n4. Concurrent searches...");
    let manager = Arc::new(HandleManager::new());
    let handle = manager.compile(b"([a-z]+)=([0-9]+)", CompileFlags::EXTENDED)?;
    let workers: Vec<_> = (0..4)
        .map(|i| {
            let manager = Arc::clone(&manager);
            thread::spawn(move || {
                let text = format!("worker{i} n={}", i * 7);
                manager.exec(handle, text.as_bytes(), MatchFlags::empty())
            })
        })
        .collect();
    for (i, worker) in workers.into_iter().enumerate() {
        match worker.join() {
            Ok(result) => println!("   worker {i}: {:?}", result?.map(|m| m.offsets())),
            Err(_) => println!("   worker {i} panicked"),
        }
    }
    manager.release(handle)?;
    println!("   stats: {:?}", manager.stats());

    Ok(())
}
