//! Send a command word followed by two data words through a looped-back core.
//!
//! Run with: cargo run -p axis1553 --example loopback-demo

use axis1553::core::CoreConfig;
use axis1553::word::{StreamWord, SyncKind, Tag};
use axis1553::{Loopback, LoopbackError};

fn main() -> Result<(), LoopbackError> {
    let mut loopback = Loopback::new(CoreConfig::default())?;
    loopback.reset();

    let words = [
        StreamWord::new(0x0C21, Tag::command()),
        StreamWord::new(0xCAFE, Tag::data()),
        StreamWord::new(0xF00D, Tag::new(SyncKind::Data, true)),
    ];
    let timing = *loopback.core().timing();
    for rx in loopback.transfer(&words, 10_000)? {
        println!(
            "0x{:04X} {:>7} tuser={} delivered at {} ns",
            rx.word.data,
            rx.word.tag.sync.name(),
            rx.word.tag,
            timing.ticks_to_ns(rx.delivered_tick)
        );
    }
    println!("{:?}", loopback.core().stats());
    Ok(())
}
