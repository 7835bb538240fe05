//! Insert, iterate, and clear a small array with the growth trail logged.
//!
//! ```text
//! RUST_LOG=trace cargo run -p dynarr-bench --example walkthrough
//! ```

use dynarr::DynArray;

fn main() {
    env_logger::init();

    let mut words: DynArray<String> = DynArray::new();
    words.emplace("hello");
    words.emplace_with(|| "hello world"[..5].to_owned());
    words.emplace_default();

    println!("{}", words.len());
    for word in &words {
        println!("{word}");
    }

    // A refused construction leaves the array as it was.
    let refused = words.try_emplace_with(|| "not a number".parse::<u32>().map(|n| n.to_string()));
    if let Err(err) = refused {
        log::warn!("insert rejected: {err}");
    }
    println!("{} (capacity {})", words.len(), words.capacity());

    words.clear();
    println!("{}", words.is_empty());
}
